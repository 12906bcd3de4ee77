//! The numbered operator menu.

use consolemail_core::{Console, Error, MessagingSession, ReadMode, Result};
use consolemail_mapi::{Flags, Provider};
use tracing::debug;

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Log on to the messaging system.
    Logon,
    /// Pick recipients from the address book.
    SelectRecipient,
    /// Type an address and resolve it.
    EnterRecipient,
    /// Resolve an address and show its details.
    GetDetails,
    /// Send to one typed recipient.
    SendNoUi,
    /// Send through the provider's dialog.
    SendUi,
    /// Send with an attachment.
    SendAttach,
    /// Save a new message to the store.
    CreateMessage,
    /// List inbox subjects.
    ListInbox,
    /// Read the next unread message.
    ReadMail,
    /// Log off.
    Logoff,
    /// Log off and quit.
    Exit,
    /// Print the menu again.
    Refresh,
}

impl MenuChoice {
    /// Every entry, in menu order.
    pub const ALL: [Self; 13] = [
        Self::Logon,
        Self::SelectRecipient,
        Self::EnterRecipient,
        Self::GetDetails,
        Self::SendNoUi,
        Self::SendUi,
        Self::SendAttach,
        Self::CreateMessage,
        Self::ListInbox,
        Self::ReadMail,
        Self::Logoff,
        Self::Exit,
        Self::Refresh,
    ];

    /// Parses the operator's selection.
    pub fn parse(input: &str) -> Option<Self> {
        let number: usize = input.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }

    /// Menu number, starting at 1.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).map_or(0, |i| i + 1)
    }

    /// Menu text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Logon => "Logon to messaging system.",
            Self::SelectRecipient => "Select recipient/Get e-mail address.",
            Self::EnterRecipient => "Enter email address/Get recipient.",
            Self::GetDetails => "Get details of recipient.",
            Self::SendNoUi => "Send Mail message to recipient with no UI.",
            Self::SendUi => "Send Mail message to recipient with UI.",
            Self::SendAttach => "Send Mail with attachment.",
            Self::CreateMessage => "Create new message.",
            Self::ListInbox => "List messages in Inbox.",
            Self::ReadMail => "Read next unread message.",
            Self::Logoff => "Logoff the message system.",
            Self::Exit => "Exit Client.",
            Self::Refresh => "Refresh Menu.",
        }
    }
}

/// Whether the loop keeps going after a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

fn say<C: Console>(console: &mut C, line: &str) -> Result<()> {
    Ok(console.write_line(line)?)
}

/// Prints the main menu.
///
/// # Errors
///
/// Returns console write errors.
pub fn print_menu<C: Console>(console: &mut C) -> Result<()> {
    say(console, "")?;
    say(console, "Console Messaging Client Main Menu.")?;
    say(console, "")?;
    say(console, "Please choose one of the following:")?;
    say(console, "")?;
    for choice in MenuChoice::ALL {
        say(console, &format!("[{:2}] {}", choice.number(), choice.label()))?;
    }
    Ok(())
}

/// Runs the menu until the operator exits or input ends.
///
/// Provider failures have already been explained by the session and do not
/// stop the loop.
///
/// # Errors
///
/// Returns console I/O errors.
pub fn run<P: Provider, C: Console>(session: &mut MessagingSession<P, C>) -> Result<()> {
    print_menu(session.console_mut())?;
    loop {
        let Some(line) = session.console_mut().read_line("\nEnter your choice: ")? else {
            debug!("End of input");
            exit(session);
            return Ok(());
        };
        let Some(choice) = MenuChoice::parse(&line) else {
            say(session.console_mut(), "Not a valid choice. Please try again.")?;
            continue;
        };
        debug!(?choice, "Menu choice");
        match dispatch(session, choice) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(Error::Io(e)) => return Err(Error::Io(e)),
            Err(err) if err.is_not_implemented() => {
                say(session.console_mut(), "Not yet implemented.")?;
            }
            Err(Error::Provider(_) | Error::NoInput) => {}
            Err(err) => say(session.console_mut(), &err.to_string())?,
        }
    }
}

fn exit<P: Provider, C: Console>(session: &mut MessagingSession<P, C>) {
    if session.is_logged_on() {
        let _ = session.logoff();
    }
}

fn dispatch<P: Provider, C: Console>(
    session: &mut MessagingSession<P, C>,
    choice: MenuChoice,
) -> Result<Flow> {
    match choice {
        MenuChoice::Logon => {
            session.logon()?;
        }
        MenuChoice::SelectRecipient => {
            for recipient in session.address()? {
                let line = recipient
                    .qualified_address()
                    .unwrap_or_else(|| recipient.display_name.clone());
                say(session.console_mut(), &line)?;
            }
        }
        MenuChoice::EnterRecipient => {
            if session.validate_session().is_err() {
                say(session.console_mut(), "Not logged on to messaging system.")?;
                return Ok(Flow::Continue);
            }
            let name = session.capture_text("Enter an e-mail address: ")?;
            session.resolve_name(&name)?;
        }
        MenuChoice::GetDetails => {
            let name = session.capture_text("Enter an e-mail address to resolve: ")?;
            let recipient = session.resolve_name(&name)?;
            session.get_details(&recipient)?;
        }
        MenuChoice::SendNoUi => session.send_message(Flags::NONE)?,
        MenuChoice::SendUi => session.send_message(Flags::DIALOG)?,
        MenuChoice::SendAttach => session.send_attach_mail()?,
        MenuChoice::CreateMessage => {
            session.create_message(Flags::NONE)?;
        }
        MenuChoice::ListInbox => {
            session.list_inbox_messages()?;
        }
        MenuChoice::ReadMail => {
            session.read_mail(ReadMode::Full, None)?;
        }
        MenuChoice::Logoff => {
            let result = session.logoff();
            print_menu(session.console_mut())?;
            result?;
        }
        MenuChoice::Exit => {
            exit(session);
            return Ok(Flow::Exit);
        }
        MenuChoice::Refresh => print_menu(session.console_mut())?,
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use consolemail_core::{LineConsole, Settings};
    use consolemail_mapi::{
        AddressRequest, LogonRequest, MapiError, Message, MessageId, Recipient, SessionHandle,
    };

    use super::*;

    /// Logs on and off; the address book is not implemented.
    #[derive(Default)]
    struct StubProvider {
        logoffs: u32,
    }

    impl Provider for StubProvider {
        fn logon(&mut self, _: &LogonRequest<'_>) -> consolemail_mapi::Result<SessionHandle> {
            Ok(SessionHandle::new(9).unwrap())
        }
        fn logoff(&mut self, _: SessionHandle, _: Flags) -> consolemail_mapi::Result<()> {
            self.logoffs += 1;
            Ok(())
        }
        fn resolve_name(
            &mut self,
            _: SessionHandle,
            name: &str,
            _: Flags,
        ) -> consolemail_mapi::Result<Recipient> {
            Ok(Recipient::new(name))
        }
        fn address(
            &mut self,
            _: SessionHandle,
            _: &AddressRequest<'_>,
        ) -> consolemail_mapi::Result<Vec<Recipient>> {
            Err(consolemail_mapi::Error::NotImplemented("MAPIAddress"))
        }
        fn details(
            &mut self,
            _: SessionHandle,
            _: &Recipient,
            _: Flags,
        ) -> consolemail_mapi::Result<()> {
            Ok(())
        }
        fn find_next(
            &mut self,
            _: SessionHandle,
            _: Option<&str>,
            _: Option<&MessageId>,
            _: Flags,
        ) -> consolemail_mapi::Result<MessageId> {
            Err(MapiError::NoMessages.into())
        }
        fn read_mail(
            &mut self,
            _: SessionHandle,
            _: &MessageId,
            _: Flags,
        ) -> consolemail_mapi::Result<Message> {
            Err(MapiError::InvalidMessage.into())
        }
        fn send_mail(
            &mut self,
            _: SessionHandle,
            _: &Message,
            _: Flags,
        ) -> consolemail_mapi::Result<()> {
            Ok(())
        }
        fn save_mail(
            &mut self,
            _: SessionHandle,
            _: &Message,
            _: Option<&MessageId>,
            _: Flags,
        ) -> consolemail_mapi::Result<MessageId> {
            Ok(MessageId::new("new"))
        }
    }

    type Session<'a> = MessagingSession<StubProvider, LineConsole<&'a [u8], Vec<u8>>>;

    fn run_script(input: &str) -> (String, u32) {
        let console = LineConsole::new(input.as_bytes(), Vec::new());
        let mut session: Session<'_> =
            MessagingSession::new(StubProvider::default(), console, Settings::default());
        run(&mut session).unwrap();
        let output = String::from_utf8(session.console().output().clone()).unwrap();
        (output, session.provider().logoffs)
    }

    #[test]
    fn test_parse_accepts_menu_numbers() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Logon));
        assert_eq!(MenuChoice::parse(" 12 "), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("13"), Some(MenuChoice::Refresh));
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for input in ["0", "14", "-1", "", "two", "1.5"] {
            assert_eq!(MenuChoice::parse(input), None, "{input:?}");
        }
    }

    #[test]
    fn test_numbers_match_positions() {
        for (index, choice) in MenuChoice::ALL.iter().enumerate() {
            assert_eq!(choice.number(), index + 1);
            assert_eq!(MenuChoice::parse(&choice.number().to_string()), Some(*choice));
        }
    }

    #[test]
    fn test_menu_lists_all_choices() {
        let mut console = LineConsole::new(&b""[..], Vec::new());
        print_menu(&mut console).unwrap();
        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(text.contains("[ 1] Logon to messaging system."));
        assert!(text.contains("[13] Refresh Menu."));
    }

    #[test]
    fn test_invalid_choice_is_reported() {
        let (output, _) = run_script("42\n12\n");
        assert!(output.contains("Not a valid choice. Please try again."));
    }

    #[test]
    fn test_not_implemented_notice() {
        let (output, _) = run_script("1\nprofile\n2\n12\n");
        assert!(output.contains("Not yet implemented."));
    }

    #[test]
    fn test_exit_logs_off() {
        let (output, logoffs) = run_script("1\nprofile\n12\n");
        assert!(output.contains("Logon successful."));
        assert!(output.contains("Logoff attempt succeeded."));
        assert_eq!(logoffs, 1);
    }

    #[test]
    fn test_end_of_input_behaves_like_exit() {
        let (_, logoffs) = run_script("1\nprofile\n");
        assert_eq!(logoffs, 1);
    }

    #[test]
    fn test_enter_recipient_needs_session() {
        let (output, _) = run_script("3\n12\n");
        assert!(output.contains("Not logged on to messaging system."));
        assert!(!output.contains("Enter an e-mail address: "));
    }

    #[test]
    fn test_logoff_reprints_menu() {
        let (output, _) = run_script("1\nprofile\n11\n12\n");
        assert_eq!(output.matches("Console Messaging Client Main Menu.").count(), 2);
    }
}

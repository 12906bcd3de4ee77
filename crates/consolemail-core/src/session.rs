//! The messaging session: one provider, one operator console, at most one
//! logged-on session handle.
//!
//! Every operation that needs a session checks for one before touching the
//! provider. Provider failures are explained on the console and returned
//! unchanged as [`Error::Provider`]; nothing is retried.

use std::collections::HashSet;
use std::path::PathBuf;

use consolemail_mapi::{
    AddressRequest, Attachment, Flags, InitGuard, InstallState, LogonRequest, MapiError,
    MapiLibrary, Message, MessageId, ProfileSource, Provider, Recipient, SessionHandle,
    provider_install_state,
};
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::diagnostics::{Diagnostic, NOT_LOGGED_ON, Operation};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::text::{bound_text, join_attachment_path};

/// Outcome of [`MessagingSession::logon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogonOutcome {
    /// A new session was started.
    LoggedOn,
    /// A session was already active; the provider was not called.
    AlreadyLoggedOn,
}

/// How much of a message [`MessagingSession::read_mail`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Subject, body and attachment names.
    #[default]
    Full,
    /// Subject and attachment names; the body is never printed.
    HeadersOnly,
}

/// A session with the messaging provider.
pub struct MessagingSession<P: Provider, C: Console> {
    provider: P,
    console: C,
    settings: Settings,
    handle: Option<SessionHandle>,
}

impl<P: Provider, C: Console> MessagingSession<P, C> {
    /// Creates a logged-off session.
    pub const fn new(provider: P, console: C, settings: Settings) -> Self {
        Self {
            provider,
            console,
            settings,
            handle: None,
        }
    }

    /// Returns the provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the operator console.
    pub const fn console(&self) -> &C {
        &self.console
    }

    /// Returns the operator console for direct I/O.
    pub const fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Returns the active settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns true while a session is active.
    pub const fn is_logged_on(&self) -> bool {
        self.handle.is_some()
    }

    /// Checks for an active session without printing anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSession` when logged off.
    pub const fn validate_session(&self) -> Result<()> {
        match self.handle {
            Some(_) => Ok(()),
            None => Err(Error::not_logged_on()),
        }
    }

    /// Logs on to a profile the operator names, letting the provider show its
    /// logon dialog.
    ///
    /// # Errors
    ///
    /// Returns the provider failure; the session stays logged off.
    pub fn logon(&mut self) -> Result<LogonOutcome> {
        if self.handle.is_some() {
            self.say("Already logged on to messaging system.");
            return Ok(LogonOutcome::AlreadyLoggedOn);
        }
        let profile = self.capture_text("Enter a profile name: ")?;
        self.say("Attempting to logon to messaging system.");
        let request = LogonRequest {
            profile: (!profile.is_empty()).then_some(profile.as_str()),
            password: None,
            flags: Flags::NEW_SESSION | Flags::LOGON_UI,
        };
        match self.provider.logon(&request) {
            Ok(handle) => {
                info!(%profile, "Logged on");
                self.handle = Some(handle);
                self.say("Logon successful.");
                Ok(LogonOutcome::LoggedOn)
            }
            Err(err) => Err(self.fail(Operation::Logon, "", err)),
        }
    }

    /// Ends the active session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSession` when logged off, or the provider failure, in
    /// which case the session stays active.
    pub fn logoff(&mut self) -> Result<()> {
        let session = self.session()?;
        match self.provider.logoff(session, Flags::NONE) {
            Ok(()) => {
                self.handle = None;
                info!("Logged off");
                self.say("Logoff attempt succeeded.");
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::Logoff, "", err)),
        }
    }

    /// Resolves `name` to a single recipient.
    ///
    /// # Errors
    ///
    /// Ambiguous and unknown names fail with their own codes.
    pub fn resolve_name(&mut self, name: &str) -> Result<Recipient> {
        let session = self.session()?;
        match self.provider.resolve_name(session, name, Flags::NONE) {
            Ok(recipient) => {
                self.say(&format!(
                    "{} resolved to a single address.",
                    recipient.display_name
                ));
                Ok(recipient)
            }
            Err(err) => Err(self.fail(Operation::ResolveName, name, err)),
        }
    }

    /// Lets the operator pick recipients from the address book dialog.
    ///
    /// # Errors
    ///
    /// Returns the provider failure.
    pub fn address(&mut self) -> Result<Vec<Recipient>> {
        let session = self.session()?;
        let request = AddressRequest {
            caption: &self.settings.address_caption,
            edit_fields: self.settings.address_edit_fields,
            labels: "",
            initial: &[],
            flags: Flags::NONE,
        };
        match self.provider.address(session, &request) {
            Ok(recipients) => {
                debug!(count = recipients.len(), "Address book selection");
                Ok(recipients)
            }
            Err(err) => Err(self.fail(Operation::Address, "", err)),
        }
    }

    /// Shows the provider's detail dialog for `recipient`.
    ///
    /// # Errors
    ///
    /// Returns the provider failure.
    pub fn get_details(&mut self, recipient: &Recipient) -> Result<()> {
        let session = self.session()?;
        match self.provider.details(session, recipient, Flags::NONE) {
            Ok(()) => {
                self.say("Call to MAPIDetails succeeded.");
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::Details, &recipient.display_name, err)),
        }
    }

    /// Saves a new message with the configured subject into the store.
    ///
    /// Returns an owned copy of the saved message and its new id.
    ///
    /// # Errors
    ///
    /// Returns the provider failure.
    pub fn create_message(&mut self, flags: Flags) -> Result<(Message, MessageId)> {
        let session = self.session()?;
        let message = Message::new(self.settings.created_subject.clone(), String::new());
        match self.provider.save_mail(session, &message, None, flags) {
            Ok(id) => {
                debug!(id = id.as_str(), "Saved new message");
                self.say("A new message has been created in your Inbox.");
                Ok((message, id))
            }
            Err(err) => Err(self.fail(Operation::SaveMail, "", err)),
        }
    }

    /// Finds the first message matching `flags`, or the next one after `seed`.
    ///
    /// Running out of messages is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns any other provider failure.
    pub fn find_message_id(
        &mut self,
        seed: Option<&MessageId>,
        flags: Flags,
    ) -> Result<Option<MessageId>> {
        let session = self.session()?;
        match self.provider.find_next(session, None, seed, flags) {
            Ok(id) => Ok(Some(id)),
            Err(err) if err.is(MapiError::NoMessages) => {
                self.say("No messages to print.");
                Ok(None)
            }
            Err(err) => Err(self.fail(Operation::FindNext, "", err)),
        }
    }

    /// Reads and prints a message.
    ///
    /// Without an `id`, reads the next unread message. Returns `Ok(None)`
    /// when there is nothing to read.
    ///
    /// # Errors
    ///
    /// Returns the provider failure.
    pub fn read_mail(
        &mut self,
        mode: ReadMode,
        id: Option<MessageId>,
    ) -> Result<Option<Message>> {
        self.session()?;
        let id = match id {
            Some(id) => id,
            None => match self.find_message_id(None, Flags::LONG_MSGID | Flags::UNREAD_ONLY)? {
                Some(id) => id,
                None => return Ok(None),
            },
        };
        let session = self.session()?;
        match self.provider.read_mail(session, &id, Flags::NONE) {
            Ok(message) => {
                self.show(&message, mode);
                Ok(Some(message))
            }
            Err(err) => Err(self.fail(Operation::ReadMail, id.as_str(), err)),
        }
    }

    /// Prints the subject of every inbox message in arrival order without
    /// marking any as read.
    ///
    /// A message that cannot be read is reported and skipped. Returns the
    /// ids in the order they were enumerated, stopping at the first id the
    /// provider hands back a second time.
    ///
    /// # Errors
    ///
    /// Returns a provider failure from the enumeration itself.
    pub fn list_inbox_messages(&mut self) -> Result<Vec<MessageId>> {
        let session = self.session()?;
        let find = Flags::GUARANTEE_FIFO | Flags::LONG_MSGID;
        let peek = Flags::PEEK | Flags::ENVELOPE_ONLY;
        let mut ids: Vec<MessageId> = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let id = match self.provider.find_next(session, None, ids.last(), find) {
                Ok(id) => id,
                Err(err) if err.is(MapiError::NoMessages) => break,
                Err(err) => return Err(self.fail(Operation::FindNext, "", err)),
            };
            if !seen.insert(id.clone()) {
                warn!(id = id.as_str(), "Provider returned an id already listed, stopping");
                break;
            }
            match self.provider.read_mail(session, &id, peek) {
                Ok(message) => self.say(&message.subject),
                Err(err) => self.report(Operation::ReadMail, id.as_str(), &err),
            }
            ids.push(id);
        }
        debug!(count = ids.len(), "Listed inbox");
        Ok(ids)
    }

    /// Sends the configured message to one recipient.
    ///
    /// Unless `flags` asks for the provider's dialog, the operator names the
    /// recipient first; a name that does not resolve stops the send.
    ///
    /// # Errors
    ///
    /// Returns the resolve or send failure.
    pub fn send_message(&mut self, flags: Flags) -> Result<()> {
        let session = self.session()?;
        let mut message = self.template();
        if !flags.contains(Flags::DIALOG) {
            let name = self.capture_text("Enter an e-mail address: ")?;
            message = message.to(self.resolve_name(&name)?);
        }
        self.send(session, &message, flags)
    }

    /// Sends the configured message with attachments to one recipient.
    ///
    /// The operator names the recipient, then a file name and the directory
    /// holding it. When more than one attachment is allowed, further files
    /// are asked for until a blank file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoInput`] when the first file name is blank, or input,
    /// path, resolve or send failures.
    pub fn send_attach_mail(&mut self) -> Result<()> {
        self.session()?;
        let name = self.capture_text("Enter an e-mail address: ")?;
        let recipient = self.resolve_name(&name)?;
        let mut attachments = Vec::new();
        while attachments.len() < self.settings.max_attachments {
            let file_name = self.capture_text("Enter file name (e.g. win.ini): ")?;
            if file_name.trim().is_empty() {
                if !attachments.is_empty() {
                    break;
                }
                self.say("A file name is required.");
                return Err(Error::NoInput);
            }
            let directory = self.capture_text("Enter path (e.g. c:\\windows\\): ")?;
            let full_path = join_attachment_path(
                &directory,
                &file_name,
                self.settings.max_path_length,
                self.settings.path_policy,
            )?;
            attachments.push(Attachment::new(file_name, full_path));
        }
        self.send_with_attachments(recipient, attachments)
    }

    /// Sends the configured message with `attachments` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyAttachments`] above the configured maximum, or
    /// the send failure.
    pub fn send_with_attachments(
        &mut self,
        recipient: Recipient,
        attachments: Vec<Attachment>,
    ) -> Result<()> {
        let session = self.session()?;
        self.check_attachment_count(attachments.len())?;
        let message = attachments
            .into_iter()
            .fold(self.template().to(recipient), Message::attach);
        self.send(session, &message, Flags::NONE)
    }

    /// Hands files to the provider's own compose window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyAttachments`] above the configured maximum,
    /// the provider failure, or `NotImplemented` when the provider lacks the
    /// entry point.
    pub fn send_documents(&mut self, paths: &[PathBuf]) -> Result<()> {
        self.session()?;
        self.check_attachment_count(paths.len())?;
        match self.provider.send_documents(paths, &[]) {
            Ok(()) => {
                self.say("Documents handed to the messaging system.");
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::SendDocuments, "", err)),
        }
    }

    /// Reads one line from the operator.
    ///
    /// Works with or without a session: when logged off, the provider is
    /// initialised for the duration of the call. The line is bounded by the
    /// configured text length and policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoInput`] at end of input, or [`Error::TextTooLong`]
    /// under the reject policy.
    pub fn capture_text(&mut self, prompt: &str) -> Result<String> {
        let _init = self
            .handle
            .is_none()
            .then(|| InitGuard::new(&mut self.provider));
        let line = self.console.read_line(prompt)?.ok_or(Error::NoInput)?;
        bound_text(
            line.trim_end_matches(['\r', '\n']),
            self.settings.max_text_length,
            self.settings.text_policy,
        )
    }

    fn session(&mut self) -> Result<SessionHandle> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        self.say(NOT_LOGGED_ON);
        Err(Error::not_logged_on())
    }

    fn template(&self) -> Message {
        Message::new(self.settings.subject.clone(), self.settings.note_text.clone())
    }

    fn check_attachment_count(&self, requested: usize) -> Result<()> {
        let limit = self.settings.max_attachments;
        if requested > limit {
            return Err(Error::TooManyAttachments { limit, requested });
        }
        Ok(())
    }

    fn send(&mut self, session: SessionHandle, message: &Message, flags: Flags) -> Result<()> {
        match self.provider.send_mail(session, message, flags) {
            Ok(()) => {
                info!(
                    recipients = message.recipients.len(),
                    attachments = message.attachments.len(),
                    "Message sent"
                );
                self.say("Message successfully sent.");
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::SendMail, "", err)),
        }
    }

    fn show(&mut self, message: &Message, mode: ReadMode) {
        if !message.subject.is_empty() {
            self.say(&format!("Subject: {}", message.subject));
        }
        if mode == ReadMode::Full && !message.note_text.is_empty() {
            self.say(&format!("Message Text: {}", message.note_text));
        } else {
            self.say("No message text.");
        }
        for attachment in &message.attachments {
            self.say(&format!("Attachment: {}", attachment.display_name()));
        }
    }

    fn say(&mut self, line: &str) {
        if let Err(e) = self.console.write_line(line) {
            warn!(error = %e, "Console write failed");
        }
    }

    fn report(&mut self, operation: Operation, subject: &str, err: &consolemail_mapi::Error) {
        warn!(entry_point = operation.entry_point(), error = %err, "Provider call failed");
        match err {
            consolemail_mapi::Error::Mapi(code) => {
                let report = Diagnostic::new(operation, *code, subject);
                self.say(&report.headline);
                self.say(&report.detail);
            }
            consolemail_mapi::Error::NotImplemented(_) => {}
            other => self.say(&other.to_string()),
        }
    }

    fn fail(&mut self, operation: Operation, subject: &str, err: consolemail_mapi::Error) -> Error {
        self.report(operation, subject, &err);
        err.into()
    }
}

impl<P: Provider, C: Console> Drop for MessagingSession<P, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            match self.provider.logoff(handle, Flags::NONE) {
                Ok(()) => info!("Logged off on teardown"),
                Err(err) => warn!(error = %err, "Logoff on teardown failed"),
            }
        }
    }
}

impl<P: Provider, C: Console> std::fmt::Debug for MessagingSession<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingSession")
            .field("handle", &self.handle)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Checks whether a provider is registered and tells the operator.
pub fn provider_installed(source: &dyn ProfileSource, console: &mut dyn Console) -> InstallState {
    let state = provider_install_state(source);
    let line = if state.is_installed() {
        "MAPI is installed."
    } else {
        "MAPI is not installed."
    };
    if let Err(e) = console.write_line(line) {
        warn!(error = %e, "Console write failed");
    }
    state
}

/// The platform's profile store for `settings.profile_file`.
///
/// # Errors
///
/// Fails if the profile file cannot be opened.
#[cfg(windows)]
pub fn profile_source(settings: &Settings) -> Result<Box<dyn ProfileSource>> {
    Ok(Box::new(consolemail_mapi::PrivateProfile::new(
        &settings.profile_file,
    )?))
}

/// The platform's profile store for `settings.profile_file`.
///
/// # Errors
///
/// Fails if the profile file exists but cannot be read.
#[cfg(not(windows))]
pub fn profile_source(settings: &Settings) -> Result<Box<dyn ProfileSource>> {
    let path = std::path::Path::new(&settings.profile_file);
    Ok(Box::new(consolemail_mapi::ProfileMap::load(path)?))
}

/// Checks the install marker, then binds the provider library into a new
/// logged-off session.
///
/// # Errors
///
/// Returns [`Error::NotInstalled`] when no provider is registered, or the
/// load failure.
pub fn open<C: Console>(
    settings: Settings,
    mut console: C,
) -> Result<MessagingSession<MapiLibrary, C>> {
    settings.validate()?;
    let source = profile_source(&settings)?;
    if !provider_installed(source.as_ref(), &mut console).is_installed() {
        return Err(Error::NotInstalled);
    }
    let library = MapiLibrary::load(&settings.library)?;
    info!(library = %settings.library, "Provider library loaded");
    Ok(MessagingSession::new(library, console, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mode_defaults_to_full() {
        assert_eq!(ReadMode::default(), ReadMode::Full);
    }
}

//! Operator-facing explanations of provider failures.
//!
//! Each failed provider call prints a headline naming the call and the raw
//! result code, then one line explaining the code in the context of that
//! call.

use std::fmt;

use consolemail_mapi::MapiError;

/// Printed when an operation needs a session and none is active.
pub const NOT_LOGGED_ON: &str = "Not logged on to messaging system.";

/// A provider call the session makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `MAPILogon`.
    Logon,
    /// `MAPILogoff`.
    Logoff,
    /// `MAPIResolveName`.
    ResolveName,
    /// `MAPIAddress`.
    Address,
    /// `MAPIDetails`.
    Details,
    /// `MAPISaveMail`.
    SaveMail,
    /// `MAPIFindNext`.
    FindNext,
    /// `MAPIReadMail`.
    ReadMail,
    /// `MAPISendMail`.
    SendMail,
    /// `MAPISendDocuments`.
    SendDocuments,
}

impl Operation {
    /// Exported name of the entry point.
    #[must_use]
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Logon => "MAPILogon",
            Self::Logoff => "MAPILogoff",
            Self::ResolveName => "MAPIResolveName",
            Self::Address => "MAPIAddress",
            Self::Details => "MAPIDetails",
            Self::SaveMail => "MAPISaveMail",
            Self::FindNext => "MAPIFindNext",
            Self::ReadMail => "MAPIReadMail",
            Self::SendMail => "MAPISendMail",
            Self::SendDocuments => "MAPISendDocuments",
        }
    }

    /// What did not happen because the call failed.
    #[must_use]
    pub const fn consequence(self) -> &'static str {
        match self {
            Self::Logon => "No session handle was returned.",
            Self::Logoff => "The session was not terminated.",
            Self::ResolveName => "The name was not resolved.",
            Self::Address => "No list of recipient entries was returned.",
            Self::Details => "No dialog box was displayed.",
            Self::SaveMail => "No message was saved.",
            Self::FindNext => "No message was found.",
            Self::ReadMail => "The message could not be read.",
            Self::SendMail => "No message was sent.",
            Self::SendDocuments => "No documents were sent.",
        }
    }

    /// First line of a failure report. `subject` is the name or message id
    /// the call was about, if any.
    #[must_use]
    pub fn headline(self, code: u32, subject: &str) -> String {
        match self {
            Self::Logon => format!("Logon attempt failed due to error code {code}."),
            Self::Logoff => format!("Logoff attempt failed due to error code {code}."),
            Self::ResolveName => format!(
                "{subject} did not resolve to a single address. The error code was {code}."
            ),
            Self::ReadMail => format!("Error retrieving message {subject} (error code {code})."),
            Self::SendMail => format!("Message did not get sent due to error code {code}."),
            _ => format!(
                "Call to {} failed due to error code {code}.",
                self.entry_point()
            ),
        }
    }

    /// Explains `err` for this call.
    #[must_use]
    pub fn explain(self, err: MapiError) -> String {
        let specific = match (self, err) {
            (Self::Logon, MapiError::UserAbort) => Some("The user canceled the logon dialog box."),
            (Self::Logoff, MapiError::Failure) => {
                Some("The flags were invalid or one or more unspecified errors occurred.")
            }
            (Self::Details, MapiError::AmbiguousRecipient) => Some(
                "The dialog box could not be displayed because the recipient has no entry identifier.",
            ),
            (Self::Details, MapiError::InvalidRecips) => {
                Some("The recipient was unknown or had an invalid entry identifier.")
            }
            (Self::FindNext, MapiError::Failure) => {
                Some("One or more unspecified errors occurred while matching the message type.")
            }
            (Self::SendMail, MapiError::AmbiguousRecipient) => Some(
                "A recipient matched more than one address list entry and no dialog was requested.",
            ),
            (Self::SendMail, MapiError::UnknownRecipient) => {
                Some("A recipient did not appear in the address list.")
            }
            _ => None,
        };
        let detail = specific.unwrap_or_else(|| err.description());
        match err {
            MapiError::NotSupported | MapiError::Unknown(_) => detail.to_string(),
            _ => format!("{detail} {}", self.consequence()),
        }
    }
}

/// A two-line failure report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Names the call and the result code.
    pub headline: String,
    /// Explains the code.
    pub detail: String,
}

impl Diagnostic {
    /// Builds the report for `err` raised by `operation`.
    #[must_use]
    pub fn new(operation: Operation, err: MapiError, subject: &str) -> Self {
        Self {
            headline: operation.headline(err.code(), subject),
            detail: operation.explain(err),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.headline, self.detail)
    }
}

//! Owned message, recipient and attachment types.
//!
//! Everything here is a deep copy: values never point into provider memory.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::flags::MessageFlags;

/// Longest message identifier the provider writes, including the terminator.
pub const MAX_MESSAGE_ID: usize = 512;

/// Format of `lpszDateReceived`.
pub const DATE_RECEIVED_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Role of a recipient on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecipientClass {
    /// Message originator.
    Originator,
    /// Primary recipient.
    #[default]
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
    /// A class value the provider defines but this binding does not.
    Other(u32),
}

impl RecipientClass {
    /// Maps the raw `ulRecipClass` value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Originator,
            1 => Self::To,
            2 => Self::Cc,
            3 => Self::Bcc,
            other => Self::Other(other),
        }
    }

    /// Returns the raw `ulRecipClass` value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Originator => 0,
            Self::To => 1,
            Self::Cc => 2,
            Self::Bcc => 3,
            Self::Other(raw) => raw,
        }
    }
}

/// Opaque address book entry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntryId(Vec<u8>);

impl EntryId {
    /// Wraps raw identifier bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the identifier bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Returns true if the provider supplied no identifier.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A resolved, addressable entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recipient {
    /// Recipient role.
    pub class: RecipientClass,
    /// Display name.
    pub display_name: String,
    /// Address without its type prefix.
    pub address: Option<String>,
    /// Address type such as `SMTP` or `EX`.
    pub address_type: Option<String>,
    /// Address book entry identifier.
    pub entry_id: EntryId,
}

impl Recipient {
    /// Creates a `To` recipient with a display name only.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Sets the address, splitting a `TYPE:address` prefix when present.
    #[must_use]
    pub fn with_address(mut self, raw: &str) -> Self {
        let (address_type, address) = split_address(raw);
        self.address_type = address_type.map(str::to_string);
        self.address = Some(address.to_string());
        self
    }

    /// Sets the entry identifier.
    #[must_use]
    pub fn with_entry_id(mut self, entry_id: EntryId) -> Self {
        self.entry_id = entry_id;
        self
    }

    /// Sets the recipient class.
    #[must_use]
    pub const fn with_class(mut self, class: RecipientClass) -> Self {
        self.class = class;
        self
    }

    /// Returns the address in provider form, `TYPE:address` when a type is known.
    #[must_use]
    pub fn qualified_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        Some(match self.address_type.as_deref() {
            Some(kind) => format!("{kind}:{address}"),
            None => address.to_string(),
        })
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address.as_deref() {
            Some(address) if !self.display_name.is_empty() => {
                write!(f, "{} <{address}>", self.display_name)
            }
            Some(address) => write!(f, "{address}"),
            None => write!(f, "{}", self.display_name),
        }
    }
}

/// Splits `SMTP:user@example.com` into its type and address.
///
/// The prefix must be an alphanumeric word of at least two characters.
fn split_address(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((kind, rest))
            if kind.len() > 1 && kind.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (Some(kind), rest)
        }
        _ => (None, raw),
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name shown to recipients.
    pub file_name: Option<String>,
    /// Full path of the file.
    pub path: PathBuf,
    /// Character position in the note text, if placed inline.
    pub position: Option<u32>,
}

impl Attachment {
    /// Creates an attachment that is not placed inline.
    #[must_use]
    pub fn new(file_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            path: path.into(),
            position: None,
        }
    }

    /// Name to show the operator.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Opaque identifier of a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An interpersonal message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub note_text: String,
    /// Custom message class; `None` for interpersonal mail.
    pub message_type: Option<String>,
    /// When the message arrived.
    pub date_received: Option<NaiveDateTime>,
    /// Conversation thread identifier.
    pub conversation_id: Option<String>,
    /// Message state bits.
    pub flags: MessageFlags,
    /// Sender.
    pub originator: Option<Recipient>,
    /// Recipients, in order.
    pub recipients: Vec<Recipient>,
    /// Attachments, in order.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a message with a subject and body.
    #[must_use]
    pub fn new(subject: impl Into<String>, note_text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            note_text: note_text.into(),
            ..Self::default()
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: Recipient) -> Self {
        self.recipients.push(recipient);
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Parses a provider date string.
    #[must_use]
    pub fn parse_date_received(raw: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw.trim(), DATE_RECEIVED_FORMAT).ok()
    }
}

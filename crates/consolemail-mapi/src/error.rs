//! Error types for Simple MAPI operations.

use thiserror::Error;

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-zero Simple MAPI result code.
///
/// Discriminants match the values the provider returns, so a code can be
/// printed back to the operator verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MapiError {
    /// The operator cancelled a provider dialog.
    #[error("user abort")]
    UserAbort,
    /// Unspecified provider failure.
    #[error("failure")]
    Failure,
    /// No default logon and the logon dialog did not complete.
    #[error("login failure")]
    LoginFailure,
    /// Not enough disk space for a temporary attachment file.
    #[error("disk full")]
    DiskFull,
    /// The provider ran out of memory.
    #[error("insufficient memory")]
    InsufficientMemory,
    /// Access to the store was denied.
    #[error("access denied")]
    AccessDenied,
    /// Too many sessions are open at once.
    #[error("too many sessions")]
    TooManySessions,
    /// Too many file attachments.
    #[error("too many files")]
    TooManyFiles,
    /// Too many recipients.
    #[error("too many recipients")]
    TooManyRecipients,
    /// An attachment path could not be found.
    #[error("attachment not found")]
    AttachmentNotFound,
    /// An attachment could not be opened.
    #[error("attachment open failure")]
    AttachmentOpenFailure,
    /// An attachment could not be written to a temporary file.
    #[error("attachment write failure")]
    AttachmentWriteFailure,
    /// A recipient is not in the address list.
    #[error("unknown recipient")]
    UnknownRecipient,
    /// A recipient class other than To, Cc or Bcc was used.
    #[error("bad recipient type")]
    BadRecipType,
    /// Enumeration reached the end of the matching messages.
    #[error("no messages")]
    NoMessages,
    /// The message identifier is invalid.
    #[error("invalid message")]
    InvalidMessage,
    /// Message text exceeds the provider limit.
    #[error("text too large")]
    TextTooLarge,
    /// The session handle is not valid.
    #[error("invalid session")]
    InvalidSession,
    /// The message type is not supported.
    #[error("type not supported")]
    TypeNotSupported,
    /// A name matched more than one address book entry.
    #[error("ambiguous recipient")]
    AmbiguousRecipient,
    /// The message is open elsewhere.
    #[error("message in use")]
    MessageInUse,
    /// The transport is unreachable.
    #[error("network failure")]
    NetworkFailure,
    /// The number of address edit fields is outside 0..=4.
    #[error("invalid edit fields")]
    InvalidEditFields,
    /// One or more recipients are invalid.
    #[error("invalid recipients")]
    InvalidRecips,
    /// The operation is not supported by the messaging system.
    #[error("not supported")]
    NotSupported,
    /// A code outside the documented table.
    #[error("unknown MAPI error code {0}")]
    Unknown(u32),
}

impl MapiError {
    /// Maps a raw result code; `0` (`SUCCESS_SUCCESS`) maps to `None`.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => return None,
            1 => Self::UserAbort,
            2 => Self::Failure,
            3 => Self::LoginFailure,
            4 => Self::DiskFull,
            5 => Self::InsufficientMemory,
            6 => Self::AccessDenied,
            8 => Self::TooManySessions,
            9 => Self::TooManyFiles,
            10 => Self::TooManyRecipients,
            11 => Self::AttachmentNotFound,
            12 => Self::AttachmentOpenFailure,
            13 => Self::AttachmentWriteFailure,
            14 => Self::UnknownRecipient,
            15 => Self::BadRecipType,
            16 => Self::NoMessages,
            17 => Self::InvalidMessage,
            18 => Self::TextTooLarge,
            19 => Self::InvalidSession,
            20 => Self::TypeNotSupported,
            21 => Self::AmbiguousRecipient,
            22 => Self::MessageInUse,
            23 => Self::NetworkFailure,
            24 => Self::InvalidEditFields,
            25 => Self::InvalidRecips,
            26 => Self::NotSupported,
            other => Self::Unknown(other),
        })
    }

    /// Returns the raw result code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::UserAbort => 1,
            Self::Failure => 2,
            Self::LoginFailure => 3,
            Self::DiskFull => 4,
            Self::InsufficientMemory => 5,
            Self::AccessDenied => 6,
            Self::TooManySessions => 8,
            Self::TooManyFiles => 9,
            Self::TooManyRecipients => 10,
            Self::AttachmentNotFound => 11,
            Self::AttachmentOpenFailure => 12,
            Self::AttachmentWriteFailure => 13,
            Self::UnknownRecipient => 14,
            Self::BadRecipType => 15,
            Self::NoMessages => 16,
            Self::InvalidMessage => 17,
            Self::TextTooLarge => 18,
            Self::InvalidSession => 19,
            Self::TypeNotSupported => 20,
            Self::AmbiguousRecipient => 21,
            Self::MessageInUse => 22,
            Self::NetworkFailure => 23,
            Self::InvalidEditFields => 24,
            Self::InvalidRecips => 25,
            Self::NotSupported => 26,
            Self::Unknown(code) => code,
        }
    }

    /// Returns true for recipient resolution outcomes.
    #[must_use]
    pub const fn is_recipient_error(self) -> bool {
        matches!(
            self,
            Self::AmbiguousRecipient
                | Self::UnknownRecipient
                | Self::InvalidRecips
                | Self::BadRecipType
        )
    }

    /// Returns true for attachment handling outcomes.
    #[must_use]
    pub const fn is_attachment_error(self) -> bool {
        matches!(
            self,
            Self::AttachmentNotFound
                | Self::AttachmentOpenFailure
                | Self::AttachmentWriteFailure
                | Self::DiskFull
        )
    }

    /// Returns true for capacity limit outcomes.
    #[must_use]
    pub const fn is_capacity_error(self) -> bool {
        matches!(
            self,
            Self::TooManyFiles | Self::TooManyRecipients | Self::TextTooLarge
        )
    }

    /// Human-readable meaning of the code, without operation context.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UserAbort => "The user canceled one of the dialog boxes.",
            Self::Failure => "One or more unspecified errors occurred.",
            Self::LoginFailure => {
                "There was no default logon, and the user failed to log on successfully when the logon dialog box was displayed."
            }
            Self::DiskFull => {
                "An attachment could not be written to a temporary file because there was not enough space on the disk."
            }
            Self::InsufficientMemory => "There was insufficient memory to proceed.",
            Self::AccessDenied => "Access to the message store was denied.",
            Self::TooManySessions => "The user had too many sessions open simultaneously.",
            Self::TooManyFiles => "There were too many file attachments.",
            Self::TooManyRecipients => "There were too many recipients.",
            Self::AttachmentNotFound => {
                "An attachment could not be located at the specified path."
            }
            Self::AttachmentOpenFailure => "The specified attachment could not be opened.",
            Self::AttachmentWriteFailure => {
                "An attachment could not be written to a temporary file. Check directory permissions."
            }
            Self::UnknownRecipient => {
                "The recipient could not be resolved to any address. The recipient might not exist or might be unknown."
            }
            Self::BadRecipType => "The type of a recipient was not MAPI_TO, MAPI_CC, or MAPI_BCC.",
            Self::NoMessages => "No messages matched the request.",
            Self::InvalidMessage => "An invalid message identifier was passed.",
            Self::TextTooLarge => "The text in the message was too large.",
            Self::InvalidSession => "An invalid session handle was used.",
            Self::TypeNotSupported => "The message type is not supported.",
            Self::AmbiguousRecipient => {
                "The recipient requested has not or could not be resolved to a unique address list entry."
            }
            Self::MessageInUse => "The message is in use by another operation.",
            Self::NetworkFailure => "The messaging system could not reach the network.",
            Self::InvalidEditFields => {
                "The number of edit fields was outside the range of 0 through 4."
            }
            Self::InvalidRecips => {
                "One or more recipients were invalid or did not resolve to any address."
            }
            Self::NotSupported => "The operation was not supported by the underlying messaging system.",
            Self::Unknown(_) => "Unknown error code.",
        }
    }
}

/// Turns a raw result code into a `Result`.
///
/// # Errors
///
/// Returns the matching [`MapiError`] for any non-zero code.
pub const fn check(code: u32) -> std::result::Result<(), MapiError> {
    match MapiError::from_code(code) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Errors raised by the binding layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider returned a non-zero result code.
    #[error("MAPI error {}: {}", .0.code(), .0)]
    Mapi(#[from] MapiError),

    /// The provider library could not be loaded.
    #[error("Failed to load {library}: {reason}")]
    Load {
        /// Library file name.
        library: String,
        /// Why loading failed.
        reason: String,
    },

    /// A required entry point is not exported by the provider library.
    #[error("Entry point {0} is missing from the provider library")]
    MissingEntryPoint(&'static str),

    /// Text cannot be passed to the provider (interior NUL or not UTF-8).
    #[error("Text cannot be passed to the messaging system: {0:?}")]
    InvalidText(String),

    /// The provider does not implement this entry point.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl Error {
    /// Returns the provider result code carried by this error, if any.
    #[must_use]
    pub const fn mapi(&self) -> Option<MapiError> {
        match self {
            Self::Mapi(err) => Some(*err),
            _ => None,
        }
    }

    /// Returns true if this is the given provider code.
    #[must_use]
    pub fn is(&self, code: MapiError) -> bool {
        self.mapi() == Some(code)
    }
}

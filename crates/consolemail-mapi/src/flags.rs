//! Option flags passed to Simple MAPI entry points.

use std::ops::{BitOr, BitOrAssign};

/// A set of `MAPI_*` option bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u32);

impl Flags {
    /// No options.
    pub const NONE: Self = Self(0);
    /// Show a logon dialog when needed.
    pub const LOGON_UI: Self = Self(0x0000_0001);
    /// Do not share an existing session.
    pub const NEW_SESSION: Self = Self(0x0000_0002);
    /// Let the provider show its send dialog.
    pub const DIALOG: Self = Self(0x0000_0008);
    /// Enumerate unread messages only.
    pub const UNREAD_ONLY: Self = Self(0x0000_0020);
    /// Read headers without body or attachments.
    pub const ENVELOPE_ONLY: Self = Self(0x0000_0040);
    /// Read without marking the message as read.
    pub const PEEK: Self = Self(0x0000_0080);
    /// Enumerate in delivery order.
    pub const GUARANTEE_FIFO: Self = Self(0x0000_0100);
    /// Deliver the body as the first attachment.
    pub const BODY_AS_FILE: Self = Self(0x0000_0200);
    /// Address book is read-only.
    pub const AB_NOMODIFY: Self = Self(0x0000_0400);
    /// Skip attachments when reading.
    pub const SUPPRESS_ATTACH: Self = Self(0x0000_0800);
    /// Download pending mail before the operation.
    pub const FORCE_DOWNLOAD: Self = Self(0x0000_1000);
    /// Use long (512 byte) message identifiers.
    pub const LONG_MSGID: Self = Self(0x0000_4000);
    /// Prompt for a password only.
    pub const PASSWORD_UI: Self = Self(0x0002_0000);

    /// Creates a flag set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Per-message state bits (`MAPI_UNREAD`, `MAPI_RECEIPT_REQUESTED`, `MAPI_SENT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageFlags(u32);

impl MessageFlags {
    /// The message has not been read.
    pub const UNREAD: Self = Self(0x0000_0001);
    /// A read receipt was requested.
    pub const RECEIPT_REQUESTED: Self = Self(0x0000_0002);
    /// The message has been sent.
    pub const SENT: Self = Self(0x0000_0004);

    /// Creates message flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

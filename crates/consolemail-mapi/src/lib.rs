//! # consolemail-mapi
//!
//! A typed binding to Simple MAPI, the Windows messaging API exported by
//! `MAPI32.DLL`.
//!
//! ## Features
//!
//! - **Capability table**: every entry point is bound once, by name, into
//!   [`EntryPoints`]; a missing export fails the load instead of a later call
//! - **Owned results**: recipients and messages the provider allocates are
//!   deep-copied and released through [`MapiBuffer`] exactly once
//! - **Typed result codes**: [`MapiError`] covers the full `MAPI_E_*` table
//! - **Provider seam**: the [`Provider`] trait lets callers run against test
//!   doubles on any platform
//!
//! ## Quick Start
//!
//! ```ignore
//! use consolemail_mapi::{Flags, LogonRequest, MapiLibrary, Message, Provider, Recipient};
//!
//! fn main() -> consolemail_mapi::Result<()> {
//!     let mut mapi = MapiLibrary::load(MapiLibrary::DEFAULT_LIBRARY)?;
//!     let session = mapi.logon(&LogonRequest {
//!         flags: Flags::LOGON_UI,
//!         ..LogonRequest::default()
//!     })?;
//!
//!     let ann = mapi.resolve_name(session, "Ann", Flags::NONE)?;
//!     let message = Message::new("Hello", "Sent from the console").to(ann);
//!     mapi.send_mail(session, &message, Flags::NONE)?;
//!
//!     mapi.logoff(session, Flags::NONE)
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ffi`]: raw structures, entry point signatures and [`MapiBuffer`]
//! - [`flags`]: option bits
//! - [`profile`]: provider install detection
//! - [`types`]: recipients, attachments, messages and message ids

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]

mod binding;
mod error;
pub mod ffi;
pub mod flags;
pub mod profile;
mod provider;
pub mod types;

pub use binding::{EntryPoints, MapiLibrary, RawProc};
pub use error::{Error, MapiError, Result, check};
pub use ffi::MapiBuffer;
pub use flags::{Flags, MessageFlags};
pub use profile::{InstallState, ProfileMap, ProfileSource, provider_install_state};
#[cfg(windows)]
pub use profile::PrivateProfile;
pub use provider::{AddressRequest, InitGuard, LogonRequest, Provider, SessionHandle};
pub use types::{
    Attachment, EntryId, MAX_MESSAGE_ID, Message, MessageId, Recipient, RecipientClass,
};

//! # consolemail-core
//!
//! The messaging session behind the consolemail console client.
//!
//! This crate provides:
//! - [`MessagingSession`]: logon/logoff, recipient resolution, address book
//!   selection, reading, listing, creating and sending mail over any
//!   [`consolemail_mapi::Provider`]
//! - The operator [`Console`] abstraction
//! - Operator-facing [`diagnostics`] for every provider failure
//! - Length limits for operator input and attachment paths
//! - Persisted [`Settings`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod console;
pub mod diagnostics;
mod error;
pub mod session;
pub mod settings;
pub mod text;

pub use console::{Console, LineConsole, StdConsole};
pub use diagnostics::{Diagnostic, Operation};
pub use error::{Error, Result};
pub use session::{
    LogonOutcome, MessagingSession, ReadMode, open, profile_source, provider_installed,
};
pub use settings::{LengthPolicy, Settings};
pub use text::{bound_text, join_attachment_path};

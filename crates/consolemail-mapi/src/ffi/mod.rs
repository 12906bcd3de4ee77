//! Raw Simple MAPI structures and entry point signatures.
//!
//! Layouts follow `mapi.h`. `ULONG` is 32 bits on every Windows target;
//! `LHANDLE` and `ULONG_PTR` are pointer sized.

#![allow(unsafe_code)]

mod buffer;
pub(crate) mod convert;

use std::ffi::{c_char, c_void};

pub use buffer::MapiBuffer;

/// `MapiRecipDesc`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MapiRecipDesc {
    /// Reserved, must be zero.
    pub reserved: u32,
    /// Recipient class (`MAPI_ORIG`, `MAPI_TO`, ...).
    pub recip_class: u32,
    /// Display name.
    pub name: *mut c_char,
    /// `TYPE:address`.
    pub address: *mut c_char,
    /// Size of `entry_id` in bytes.
    pub eid_size: u32,
    /// Opaque address book entry identifier.
    pub entry_id: *mut c_void,
}

/// `MapiFileDesc`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MapiFileDesc {
    /// Reserved, must be zero.
    pub reserved: u32,
    /// `MAPI_OLE` / `MAPI_OLE_STATIC`.
    pub flags: u32,
    /// Character position in the note text; `u32::MAX` for none.
    pub position: u32,
    /// Full path of the file.
    pub path_name: *mut c_char,
    /// Name shown to recipients.
    pub file_name: *mut c_char,
    /// Reserved file type descriptor.
    pub file_type: *mut c_void,
}

/// `MapiMessage`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MapiMessage {
    /// Reserved, must be zero.
    pub reserved: u32,
    /// Subject line.
    pub subject: *mut c_char,
    /// Body text.
    pub note_text: *mut c_char,
    /// Message class; null for interpersonal mail.
    pub message_type: *mut c_char,
    /// `YYYY/MM/DD HH:MM`.
    pub date_received: *mut c_char,
    /// Conversation thread identifier.
    pub conversation_id: *mut c_char,
    /// `MAPI_UNREAD`, `MAPI_RECEIPT_REQUESTED`, `MAPI_SENT`.
    pub flags: u32,
    /// Sender.
    pub originator: *mut MapiRecipDesc,
    /// Number of entries in `recips`.
    pub recip_count: u32,
    /// Recipient array.
    pub recips: *mut MapiRecipDesc,
    /// Number of entries in `files`.
    pub file_count: u32,
    /// Attachment array.
    pub files: *mut MapiFileDesc,
}

/// Position value meaning "not placed in the body".
pub const NO_POSITION: u32 = u32::MAX;

/// `MAPILogon`.
pub type LogonFn = unsafe extern "system" fn(
    ui_param: usize,
    profile: *const c_char,
    password: *const c_char,
    flags: u32,
    reserved: u32,
    session: *mut usize,
) -> u32;

/// `MAPILogoff`.
pub type LogoffFn =
    unsafe extern "system" fn(session: usize, ui_param: usize, flags: u32, reserved: u32) -> u32;

/// `MAPISendMail`.
pub type SendMailFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    message: *mut MapiMessage,
    flags: u32,
    reserved: u32,
) -> u32;

/// `MAPISendDocuments`.
pub type SendDocumentsFn = unsafe extern "system" fn(
    ui_param: usize,
    delimiter: *const c_char,
    paths: *const c_char,
    names: *const c_char,
    reserved: u32,
) -> u32;

/// `MAPIFindNext`. Writes at most [`crate::MAX_MESSAGE_ID`] bytes to `message_id`.
pub type FindNextFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    message_type: *const c_char,
    seed: *const c_char,
    flags: u32,
    reserved: u32,
    message_id: *mut c_char,
) -> u32;

/// `MAPIReadMail`. The returned message is freed with `MAPIFreeBuffer`.
pub type ReadMailFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    message_id: *const c_char,
    flags: u32,
    reserved: u32,
    message: *mut *mut MapiMessage,
) -> u32;

/// `MAPISaveMail`. `message_id` is both the id to replace and the result.
pub type SaveMailFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    message: *mut MapiMessage,
    flags: u32,
    reserved: u32,
    message_id: *mut c_char,
) -> u32;

/// `MAPIFreeBuffer`.
pub type FreeBufferFn = unsafe extern "system" fn(buffer: *mut c_void) -> u32;

/// `MAPIAddress`. The returned array is freed with `MAPIFreeBuffer`.
pub type AddressFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    caption: *const c_char,
    edit_fields: u32,
    labels: *const c_char,
    recip_count: u32,
    recips: *mut MapiRecipDesc,
    flags: u32,
    reserved: u32,
    new_count: *mut u32,
    new_recips: *mut *mut MapiRecipDesc,
) -> u32;

/// `MAPIDetails`.
pub type DetailsFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    recip: *mut MapiRecipDesc,
    flags: u32,
    reserved: u32,
) -> u32;

/// `MAPIResolveName`. The returned recipient is freed with `MAPIFreeBuffer`.
pub type ResolveNameFn = unsafe extern "system" fn(
    session: usize,
    ui_param: usize,
    name: *const c_char,
    flags: u32,
    reserved: u32,
    recip: *mut *mut MapiRecipDesc,
) -> u32;

/// `MAPIInitialize`; returns an `HRESULT`.
pub type InitializeFn = unsafe extern "system" fn(init: *mut c_void) -> i32;

/// `MAPIUninitialize`.
pub type UninitializeFn = unsafe extern "system" fn();

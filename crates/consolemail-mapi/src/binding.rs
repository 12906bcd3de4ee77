//! Capability table of provider entry points and the library-backed provider.

#![allow(unsafe_code)]

use std::path::PathBuf;
use std::ptr;

use tracing::{debug, warn};

use crate::error::{Error, MapiError, Result, check};
use crate::ffi::convert::{
    RawMessage, RawRecipients, c_string, message_from_raw, message_id_from_buffer,
    message_id_to_buffer, opt_ptr, recipient_from_raw, recipients_from_raw,
};
use crate::ffi::{
    AddressFn, DetailsFn, FindNextFn, FreeBufferFn, InitializeFn, LogoffFn, LogonFn, MapiBuffer,
    MapiMessage, MapiRecipDesc, ReadMailFn, ResolveNameFn, SaveMailFn, SendDocumentsFn,
    SendMailFn, UninitializeFn,
};
use crate::flags::Flags;
use crate::provider::{AddressRequest, LogonRequest, Provider, SessionHandle};
use crate::types::{MAX_MESSAGE_ID, Message, MessageId, Recipient};

/// Address of an exported function before it is given its real signature.
pub type RawProc = unsafe extern "system" fn() -> isize;

/// Separator for `MAPISendDocuments` path and name lists.
const DOCUMENT_DELIMITER: &str = ";";

/// Entry points bound once when the provider library is opened.
#[derive(Clone, Copy)]
pub struct EntryPoints {
    /// `MAPILogon`.
    pub logon: LogonFn,
    /// `MAPILogoff`.
    pub logoff: LogoffFn,
    /// `MAPISendMail`.
    pub send_mail: SendMailFn,
    /// `MAPISendDocuments`.
    pub send_documents: SendDocumentsFn,
    /// `MAPIFindNext`.
    pub find_next: FindNextFn,
    /// `MAPIReadMail`.
    pub read_mail: ReadMailFn,
    /// `MAPIResolveName`.
    pub resolve_name: ResolveNameFn,
    /// `MAPIAddress`.
    pub address: AddressFn,
    /// `MAPIFreeBuffer`.
    pub free_buffer: FreeBufferFn,
    /// `MAPIDetails`.
    pub details: DetailsFn,
    /// `MAPISaveMail`.
    pub save_mail: SaveMailFn,
    /// `MAPIInitialize`, when exported.
    pub initialize: Option<InitializeFn>,
    /// `MAPIUninitialize`, when exported.
    pub uninitialize: Option<UninitializeFn>,
}

impl EntryPoints {
    /// Exports that must be present.
    pub const REQUIRED: [&'static str; 11] = [
        "MAPILogon",
        "MAPILogoff",
        "MAPISendMail",
        "MAPISendDocuments",
        "MAPIFindNext",
        "MAPIReadMail",
        "MAPIResolveName",
        "MAPIAddress",
        "MAPIFreeBuffer",
        "MAPIDetails",
        "MAPISaveMail",
    ];

    /// Builds the table by looking up every export by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEntryPoint`] for the first required export
    /// that `lookup` cannot find.
    ///
    /// # Safety
    ///
    /// Every address `lookup` returns must have the real signature of the
    /// export it was looked up by.
    pub unsafe fn resolve<F>(mut lookup: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> Option<RawProc>,
    {
        macro_rules! required {
            ($name:literal, $signature:ty) => {{
                let proc = lookup($name).ok_or(Error::MissingEntryPoint($name))?;
                // SAFETY: the caller guarantees the export has this signature.
                unsafe { std::mem::transmute::<RawProc, $signature>(proc) }
            }};
        }

        let table = Self {
            logon: required!("MAPILogon", LogonFn),
            logoff: required!("MAPILogoff", LogoffFn),
            send_mail: required!("MAPISendMail", SendMailFn),
            send_documents: required!("MAPISendDocuments", SendDocumentsFn),
            find_next: required!("MAPIFindNext", FindNextFn),
            read_mail: required!("MAPIReadMail", ReadMailFn),
            resolve_name: required!("MAPIResolveName", ResolveNameFn),
            address: required!("MAPIAddress", AddressFn),
            free_buffer: required!("MAPIFreeBuffer", FreeBufferFn),
            details: required!("MAPIDetails", DetailsFn),
            save_mail: required!("MAPISaveMail", SaveMailFn),
            // SAFETY: as above.
            initialize: lookup("MAPIInitialize")
                .map(|proc| unsafe { std::mem::transmute::<RawProc, InitializeFn>(proc) }),
            // SAFETY: as above.
            uninitialize: lookup("MAPIUninitialize")
                .map(|proc| unsafe { std::mem::transmute::<RawProc, UninitializeFn>(proc) }),
        };
        Ok(table)
    }
}

impl std::fmt::Debug for EntryPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoints")
            .field("initialize", &self.initialize.is_some())
            .field("uninitialize", &self.uninitialize.is_some())
            .finish_non_exhaustive()
    }
}

/// Provider backed by the Simple MAPI DLL.
#[derive(Debug)]
pub struct MapiLibrary {
    entry: EntryPoints,
    #[cfg(windows)]
    _module: Option<loader::Module>,
}

impl MapiLibrary {
    /// Library opened when no other name is configured.
    pub const DEFAULT_LIBRARY: &'static str = "MAPI32.DLL";

    /// Wraps an already resolved table.
    #[must_use]
    pub const fn new(entry: EntryPoints) -> Self {
        Self {
            entry,
            #[cfg(windows)]
            _module: None,
        }
    }

    /// Loads `library` and binds its entry points.
    ///
    /// # Errors
    ///
    /// Fails if the library cannot be loaded or a required export is missing.
    #[cfg(windows)]
    pub fn load(library: &str) -> Result<Self> {
        let module = loader::Module::open(library)?;
        // SAFETY: names are looked up in a Simple MAPI library, whose exports
        // have the signatures declared in `crate::ffi`.
        let entry = unsafe { EntryPoints::resolve(|name| module.symbol(name)) }?;
        debug!(library, "Bound Simple MAPI entry points");
        Ok(Self {
            entry,
            _module: Some(module),
        })
    }

    /// Loads `library` and binds its entry points.
    ///
    /// # Errors
    ///
    /// Always fails: Simple MAPI only exists on Windows.
    #[cfg(not(windows))]
    pub fn load(library: &str) -> Result<Self> {
        Err(Error::Load {
            library: library.to_string(),
            reason: "Simple MAPI is only available on Windows".to_string(),
        })
    }

    /// Returns the bound table.
    #[must_use]
    pub const fn entry_points(&self) -> &EntryPoints {
        &self.entry
    }

    const fn buffer<T>(&self) -> MapiBuffer<T> {
        MapiBuffer::null(self.entry.free_buffer)
    }
}

impl Provider for MapiLibrary {
    fn logon(&mut self, request: &LogonRequest<'_>) -> Result<SessionHandle> {
        let profile = request.profile.map(c_string).transpose()?;
        let password = request.password.map(c_string).transpose()?;
        let mut session = 0_usize;
        debug!(profile = ?request.profile, flags = request.flags.bits(), "MAPILogon");
        // SAFETY: strings outlive the call and `session` is a valid out slot.
        let code = unsafe {
            (self.entry.logon)(
                0,
                opt_ptr(profile.as_ref()),
                opt_ptr(password.as_ref()),
                request.flags.bits(),
                0,
                &raw mut session,
            )
        };
        check(code)?;
        SessionHandle::new(session).ok_or_else(|| MapiError::Failure.into())
    }

    fn logoff(&mut self, session: SessionHandle, flags: Flags) -> Result<()> {
        debug!("MAPILogoff");
        // SAFETY: plain value arguments.
        let code = unsafe { (self.entry.logoff)(session.get(), 0, flags.bits(), 0) };
        Ok(check(code)?)
    }

    fn resolve_name(
        &mut self,
        session: SessionHandle,
        name: &str,
        flags: Flags,
    ) -> Result<Recipient> {
        let name_c = c_string(name)?;
        let mut out = self.buffer::<MapiRecipDesc>();
        debug!(name, "MAPIResolveName");
        // SAFETY: `name_c` outlives the call and `out` is a valid out slot.
        let code = unsafe {
            (self.entry.resolve_name)(session.get(), 0, name_c.as_ptr(), flags.bits(), 0, out.out_ptr())
        };
        check(code)?;
        // SAFETY: on success the provider returned one descriptor.
        let raw = unsafe { out.as_ref() }.ok_or(MapiError::Failure)?;
        // SAFETY: the descriptor is provider-initialised.
        Ok(unsafe { recipient_from_raw(raw) })
    }

    fn address(
        &mut self,
        session: SessionHandle,
        request: &AddressRequest<'_>,
    ) -> Result<Vec<Recipient>> {
        let caption = c_string(request.caption)?;
        let labels = c_string(request.labels)?;
        let mut initial = RawRecipients::new(request.initial)?;
        let initial_count = initial.count()?;
        let mut count = 0_u32;
        let mut out = self.buffer::<MapiRecipDesc>();
        debug!(edit_fields = request.edit_fields, "MAPIAddress");
        // SAFETY: every pointer argument outlives the call.
        let code = unsafe {
            (self.entry.address)(
                session.get(),
                0,
                caption.as_ptr(),
                request.edit_fields,
                labels.as_ptr(),
                initial_count,
                initial.as_mut_ptr(),
                request.flags.bits(),
                0,
                &raw mut count,
                out.out_ptr(),
            )
        };
        check(code)?;
        // SAFETY: on success `out` holds `count` descriptors.
        Ok(unsafe { recipients_from_raw(out.as_ptr(), count) })
    }

    fn details(&mut self, session: SessionHandle, recipient: &Recipient, flags: Flags) -> Result<()> {
        let mut raw = RawRecipients::new(std::slice::from_ref(recipient))?;
        debug!(name = %recipient.display_name, "MAPIDetails");
        // SAFETY: `raw` outlives the call.
        let code =
            unsafe { (self.entry.details)(session.get(), 0, raw.as_mut_ptr(), flags.bits(), 0) };
        Ok(check(code)?)
    }

    fn find_next(
        &mut self,
        session: SessionHandle,
        message_type: Option<&str>,
        seed: Option<&MessageId>,
        flags: Flags,
    ) -> Result<MessageId> {
        let message_type = message_type.map(c_string).transpose()?;
        let seed_c = seed.map(|id| c_string(id.as_str())).transpose()?;
        let mut buffer = vec![0_u8; MAX_MESSAGE_ID];
        debug!(seed = ?seed.map(MessageId::as_str), flags = flags.bits(), "MAPIFindNext");
        // SAFETY: `buffer` holds MAX_MESSAGE_ID bytes as the provider expects.
        let code = unsafe {
            (self.entry.find_next)(
                session.get(),
                0,
                opt_ptr(message_type.as_ref()),
                opt_ptr(seed_c.as_ref()),
                flags.bits(),
                0,
                buffer.as_mut_ptr().cast(),
            )
        };
        check(code)?;
        Ok(message_id_from_buffer(&buffer))
    }

    fn read_mail(&mut self, session: SessionHandle, id: &MessageId, flags: Flags) -> Result<Message> {
        let id_c = c_string(id.as_str())?;
        let mut out = self.buffer::<MapiMessage>();
        debug!(id = id.as_str(), flags = flags.bits(), "MAPIReadMail");
        // SAFETY: `id_c` outlives the call and `out` is a valid out slot.
        let code = unsafe {
            (self.entry.read_mail)(session.get(), 0, id_c.as_ptr(), flags.bits(), 0, out.out_ptr())
        };
        check(code)?;
        // SAFETY: on success the provider returned one message.
        let raw = unsafe { out.as_ref() }.ok_or(MapiError::Failure)?;
        // SAFETY: the message is provider-initialised.
        Ok(unsafe { message_from_raw(raw) })
    }

    fn send_mail(&mut self, session: SessionHandle, message: &Message, flags: Flags) -> Result<()> {
        let mut raw = RawMessage::new(message)?;
        debug!(
            recipients = message.recipients.len(),
            attachments = message.attachments.len(),
            flags = flags.bits(),
            "MAPISendMail"
        );
        // SAFETY: `raw` outlives the call.
        let code =
            unsafe { (self.entry.send_mail)(session.get(), 0, raw.as_mut_ptr(), flags.bits(), 0) };
        Ok(check(code)?)
    }

    fn save_mail(
        &mut self,
        session: SessionHandle,
        message: &Message,
        id: Option<&MessageId>,
        flags: Flags,
    ) -> Result<MessageId> {
        let mut raw = RawMessage::new(message)?;
        let mut buffer = vec![0_u8; MAX_MESSAGE_ID];
        if let Some(id) = id {
            message_id_to_buffer(id, &mut buffer)?;
        }
        debug!(replace = id.is_some(), "MAPISaveMail");
        // SAFETY: `raw` and `buffer` outlive the call; `buffer` is MAX_MESSAGE_ID bytes.
        let code = unsafe {
            (self.entry.save_mail)(
                session.get(),
                0,
                raw.as_mut_ptr(),
                flags.bits(),
                0,
                buffer.as_mut_ptr().cast(),
            )
        };
        check(code)?;
        Ok(message_id_from_buffer(&buffer))
    }

    fn send_documents(&mut self, paths: &[PathBuf], names: &[String]) -> Result<()> {
        let paths = paths
            .iter()
            .map(|path| {
                path.to_str()
                    .ok_or_else(|| Error::InvalidText(path.display().to_string()))
            })
            .collect::<Result<Vec<_>>>()?
            .join(DOCUMENT_DELIMITER);
        let paths_c = c_string(&paths)?;
        let names_c = (!names.is_empty())
            .then(|| c_string(&names.join(DOCUMENT_DELIMITER)))
            .transpose()?;
        let delimiter = c_string(DOCUMENT_DELIMITER)?;
        debug!(paths = %paths, "MAPISendDocuments");
        // SAFETY: all strings outlive the call.
        let code = unsafe {
            (self.entry.send_documents)(
                0,
                delimiter.as_ptr(),
                paths_c.as_ptr(),
                opt_ptr(names_c.as_ref()),
                0,
            )
        };
        Ok(check(code)?)
    }

    fn initialize(&mut self) -> Result<()> {
        let Some(initialize) = self.entry.initialize else {
            return Ok(());
        };
        // SAFETY: a null init block requests default initialisation.
        let hr = unsafe { initialize(ptr::null_mut()) };
        if hr < 0 {
            warn!(hr, "MAPIInitialize failed");
            return Err(MapiError::Failure.into());
        }
        Ok(())
    }

    fn uninitialize(&mut self) {
        if let Some(uninitialize) = self.entry.uninitialize {
            // SAFETY: paired with a successful `initialize`.
            unsafe { uninitialize() };
        }
    }
}

#[cfg(windows)]
mod loader {
    use std::ffi::CString;

    use windows_sys::Win32::Foundation::HMODULE;
    use windows_sys::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryA};

    use super::RawProc;
    use crate::error::{Error, Result};
    use crate::ffi::convert::c_string;

    /// A loaded DLL, freed on drop.
    #[derive(Debug)]
    pub(super) struct Module(HMODULE);

    impl Module {
        pub(super) fn open(library: &str) -> Result<Self> {
            let name = c_string(library)?;
            // SAFETY: `name` is NUL-terminated and outlives the call.
            let handle = unsafe { LoadLibraryA(name.as_ptr().cast()) };
            if handle.is_null() {
                return Err(Error::Load {
                    library: library.to_string(),
                    reason: std::io::Error::last_os_error().to_string(),
                });
            }
            Ok(Self(handle))
        }

        pub(super) fn symbol(&self, name: &'static str) -> Option<RawProc> {
            let name = CString::new(name).ok()?;
            // SAFETY: the module handle is live for `self`'s lifetime.
            unsafe { GetProcAddress(self.0, name.as_ptr().cast()) }
        }
    }

    impl Drop for Module {
        fn drop(&mut self) {
            // SAFETY: the handle came from LoadLibraryA and is freed once.
            unsafe { FreeLibrary(self.0) };
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_const_for_fn)]
mod tests {
    use std::cell::Cell;
    use std::ffi::{CStr, CString, c_char, c_void};

    use super::*;
    use crate::types::RecipientClass;

    thread_local! {
        static FREED: Cell<u32> = const { Cell::new(0) };
        static LAST_SUBJECT: std::cell::RefCell<Option<String>> = const { std::cell::RefCell::new(None) };
    }

    fn freed() -> u32 {
        FREED.with(Cell::get)
    }

    fn leak(text: &str) -> *mut c_char {
        CString::new(text).unwrap().into_raw()
    }

    unsafe fn read(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    fn write_id(out: *mut c_char, id: &str) {
        let bytes = CString::new(id).unwrap();
        let bytes = bytes.as_bytes_with_nul();
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr().cast(), out, bytes.len()) };
    }

    fn desc(name: &str, address: &str) -> MapiRecipDesc {
        MapiRecipDesc {
            reserved: 0,
            recip_class: 1,
            name: leak(name),
            address: leak(address),
            eid_size: 0,
            entry_id: ptr::null_mut(),
        }
    }

    // Fake buffers are leaked; only the release count matters here.
    unsafe extern "system" fn fake_free(_buffer: *mut c_void) -> u32 {
        FREED.with(|freed| freed.set(freed.get() + 1));
        0
    }

    unsafe extern "system" fn fake_logon(
        _ui: usize,
        profile: *const c_char,
        _password: *const c_char,
        _flags: u32,
        _reserved: u32,
        session: *mut usize,
    ) -> u32 {
        if !profile.is_null() && unsafe { read(profile) } == "locked" {
            return 3;
        }
        unsafe { *session = 0x42 };
        0
    }

    unsafe extern "system" fn fake_logoff(session: usize, _ui: usize, _flags: u32, _r: u32) -> u32 {
        if session == 0x42 { 0 } else { 19 }
    }

    unsafe extern "system" fn fake_send_mail(
        _session: usize,
        _ui: usize,
        message: *mut MapiMessage,
        _flags: u32,
        _reserved: u32,
    ) -> u32 {
        let message = unsafe { &*message };
        if message.recip_count == 0 {
            return 14;
        }
        let subject = unsafe { read(message.subject) };
        LAST_SUBJECT.with(|last| *last.borrow_mut() = Some(subject));
        0
    }

    unsafe extern "system" fn fake_send_documents(
        _ui: usize,
        delimiter: *const c_char,
        paths: *const c_char,
        _names: *const c_char,
        _reserved: u32,
    ) -> u32 {
        let delimiter = unsafe { read(delimiter) };
        let paths = unsafe { read(paths) };
        if paths.split(delimiter.as_str()).count() == 2 { 0 } else { 11 }
    }

    unsafe extern "system" fn fake_find_next(
        _session: usize,
        _ui: usize,
        _type: *const c_char,
        seed: *const c_char,
        _flags: u32,
        _reserved: u32,
        out: *mut c_char,
    ) -> u32 {
        let seed = (!seed.is_null()).then(|| unsafe { read(seed) });
        match seed.as_deref() {
            None | Some("") => write_id(out, "msg-1"),
            Some("msg-1") => write_id(out, "msg-2"),
            Some(_) => return 16,
        }
        0
    }

    unsafe extern "system" fn fake_read_mail(
        _session: usize,
        _ui: usize,
        id: *const c_char,
        _flags: u32,
        _reserved: u32,
        out: *mut *mut MapiMessage,
    ) -> u32 {
        let id = unsafe { read(id) };
        if id == "missing" {
            return 17;
        }
        let originator = Box::into_raw(Box::new(desc("Ann", "SMTP:ann@example.com")));
        let message = MapiMessage {
            reserved: 0,
            subject: leak(&format!("subject of {id}")),
            note_text: leak("body"),
            message_type: ptr::null_mut(),
            date_received: leak("2024/05/01 09:30"),
            conversation_id: ptr::null_mut(),
            flags: 1,
            originator,
            recip_count: 0,
            recips: ptr::null_mut(),
            file_count: 0,
            files: ptr::null_mut(),
        };
        unsafe { *out = Box::into_raw(Box::new(message)) };
        0
    }

    unsafe extern "system" fn fake_resolve_name(
        _session: usize,
        _ui: usize,
        name: *const c_char,
        _flags: u32,
        _reserved: u32,
        out: *mut *mut MapiRecipDesc,
    ) -> u32 {
        match unsafe { read(name) }.as_str() {
            "ann" => {
                let recipient = desc("Ann Example", "SMTP:ann@example.com");
                unsafe { *out = Box::into_raw(Box::new(recipient)) };
                0
            }
            "a" => 21,
            _ => 14,
        }
    }

    #[allow(clippy::too_many_arguments)]
    unsafe extern "system" fn fake_address(
        _session: usize,
        _ui: usize,
        _caption: *const c_char,
        _edit_fields: u32,
        _labels: *const c_char,
        _recip_count: u32,
        _recips: *mut MapiRecipDesc,
        _flags: u32,
        _reserved: u32,
        new_count: *mut u32,
        new_recips: *mut *mut MapiRecipDesc,
    ) -> u32 {
        let picked = vec![desc("Ann", "SMTP:ann@example.com"), desc("Bob", "SMTP:bob@example.com")];
        let picked = Box::leak(picked.into_boxed_slice());
        unsafe {
            *new_count = 2;
            *new_recips = picked.as_mut_ptr();
        }
        0
    }

    unsafe extern "system" fn fake_details(
        _session: usize,
        _ui: usize,
        recip: *mut MapiRecipDesc,
        _flags: u32,
        _reserved: u32,
    ) -> u32 {
        if recip.is_null() { 2 } else { 0 }
    }

    unsafe extern "system" fn fake_save_mail(
        _session: usize,
        _ui: usize,
        _message: *mut MapiMessage,
        _flags: u32,
        _reserved: u32,
        id: *mut c_char,
    ) -> u32 {
        let current = unsafe { read(id) };
        if current.is_empty() {
            write_id(id, "saved-1");
        }
        0
    }

    fn fake_table() -> EntryPoints {
        EntryPoints {
            logon: fake_logon,
            logoff: fake_logoff,
            send_mail: fake_send_mail,
            send_documents: fake_send_documents,
            find_next: fake_find_next,
            read_mail: fake_read_mail,
            resolve_name: fake_resolve_name,
            address: fake_address,
            free_buffer: fake_free,
            details: fake_details,
            save_mail: fake_save_mail,
            initialize: None,
            uninitialize: None,
        }
    }

    fn logged_on() -> (MapiLibrary, SessionHandle) {
        let mut library = MapiLibrary::new(fake_table());
        let session = library.logon(&LogonRequest::default()).unwrap();
        (library, session)
    }

    #[test]
    fn test_logon_returns_provider_handle() {
        let (_, session) = logged_on();
        assert_eq!(session.get(), 0x42);
    }

    #[test]
    fn test_logon_failure_carries_code() {
        let mut library = MapiLibrary::new(fake_table());
        let request = LogonRequest {
            profile: Some("locked"),
            ..LogonRequest::default()
        };
        let err = library.logon(&request).unwrap_err();
        assert_eq!(err.mapi(), Some(MapiError::LoginFailure));
    }

    #[test]
    fn test_logoff_reports_invalid_session() {
        let mut library = MapiLibrary::new(fake_table());
        let stale = SessionHandle::new(7).unwrap();
        let err = library.logoff(stale, Flags::NONE).unwrap_err();
        assert_eq!(err.mapi(), Some(MapiError::InvalidSession));
    }

    #[test]
    fn test_resolve_name_copies_and_frees_once() {
        let (mut library, session) = logged_on();
        let before = freed();
        let recipient = library.resolve_name(session, "ann", Flags::NONE).unwrap();
        assert_eq!(freed(), before + 1);
        assert_eq!(recipient.display_name, "Ann Example");
        assert_eq!(recipient.address.as_deref(), Some("ann@example.com"));
        assert_eq!(recipient.address_type.as_deref(), Some("SMTP"));
        assert_eq!(recipient.class, RecipientClass::To);
    }

    #[test]
    fn test_resolve_name_distinguishes_failures() {
        let (mut library, session) = logged_on();
        let before = freed();
        let ambiguous = library.resolve_name(session, "a", Flags::NONE).unwrap_err();
        let unknown = library.resolve_name(session, "zed", Flags::NONE).unwrap_err();
        assert_eq!(ambiguous.mapi(), Some(MapiError::AmbiguousRecipient));
        assert_eq!(unknown.mapi(), Some(MapiError::UnknownRecipient));
        assert_eq!(freed(), before);
    }

    #[test]
    fn test_address_returns_every_pick() {
        let (mut library, session) = logged_on();
        let request = AddressRequest {
            caption: "Console Address List",
            edit_fields: 4,
            labels: "",
            initial: &[],
            flags: Flags::NONE,
        };
        let before = freed();
        let picked = library.address(session, &request).unwrap();
        assert_eq!(freed(), before + 1);
        let names: Vec<_> = picked.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, ["Ann", "Bob"]);
    }

    #[test]
    fn test_details_passes_recipient() {
        let (mut library, session) = logged_on();
        let recipient = Recipient::new("Ann").with_address("SMTP:ann@example.com");
        library.details(session, &recipient, Flags::NONE).unwrap();
    }

    #[test]
    fn test_find_next_walks_ids_until_no_messages() {
        let (mut library, session) = logged_on();
        let first = library.find_next(session, None, None, Flags::GUARANTEE_FIFO).unwrap();
        let second = library
            .find_next(session, None, Some(&first), Flags::GUARANTEE_FIFO)
            .unwrap();
        let end = library
            .find_next(session, None, Some(&second), Flags::GUARANTEE_FIFO)
            .unwrap_err();
        assert_eq!(first.as_str(), "msg-1");
        assert_eq!(second.as_str(), "msg-2");
        assert_eq!(end.mapi(), Some(MapiError::NoMessages));
    }

    #[test]
    fn test_read_mail_copies_message_and_frees_once() {
        let (mut library, session) = logged_on();
        let before = freed();
        let message = library
            .read_mail(session, &MessageId::new("msg-1"), Flags::PEEK)
            .unwrap();
        assert_eq!(freed(), before + 1);
        assert_eq!(message.subject, "subject of msg-1");
        assert_eq!(message.note_text, "body");
        assert!(message.date_received.is_some());
        assert_eq!(message.originator.unwrap().display_name, "Ann");
    }

    #[test]
    fn test_read_mail_invalid_id() {
        let (mut library, session) = logged_on();
        let err = library
            .read_mail(session, &MessageId::new("missing"), Flags::NONE)
            .unwrap_err();
        assert_eq!(err.mapi(), Some(MapiError::InvalidMessage));
    }

    #[test]
    fn test_send_mail_marshals_subject() {
        let (mut library, session) = logged_on();
        let message = Message::new("Any subject", "Any note text").to(Recipient::new("Ann"));
        library.send_mail(session, &message, Flags::NONE).unwrap();
        let sent = LAST_SUBJECT.with(|last| last.borrow().clone());
        assert_eq!(sent.as_deref(), Some("Any subject"));
    }

    #[test]
    fn test_send_mail_without_recipients_is_rejected() {
        let (mut library, session) = logged_on();
        let err = library
            .send_mail(session, &Message::new("s", "n"), Flags::NONE)
            .unwrap_err();
        assert_eq!(err.mapi(), Some(MapiError::UnknownRecipient));
    }

    #[test]
    fn test_save_mail_returns_new_id() {
        let (mut library, session) = logged_on();
        let id = library
            .save_mail(session, &Message::new("s", "n"), None, Flags::NONE)
            .unwrap();
        assert_eq!(id.as_str(), "saved-1");
    }

    #[test]
    fn test_save_mail_keeps_replaced_id() {
        let (mut library, session) = logged_on();
        let existing = MessageId::new("msg-9");
        let id = library
            .save_mail(session, &Message::new("s", "n"), Some(&existing), Flags::NONE)
            .unwrap();
        assert_eq!(id, existing);
    }

    #[test]
    fn test_send_documents_joins_paths() {
        let mut library = MapiLibrary::new(fake_table());
        let paths = [PathBuf::from("C:\\a.txt"), PathBuf::from("C:\\b.txt")];
        library.send_documents(&paths, &[]).unwrap();
    }

    #[test]
    fn test_initialize_without_export_is_noop() {
        let mut library = MapiLibrary::new(fake_table());
        library.initialize().unwrap();
        library.uninitialize();
    }

    #[test]
    fn test_resolve_reports_first_missing_export() {
        // SAFETY: nothing is resolved.
        let err = unsafe { EntryPoints::resolve(|_| None) }.unwrap_err();
        assert!(matches!(err, Error::MissingEntryPoint("MAPILogon")));
    }

    #[test]
    fn test_resolve_leaves_optional_exports_unset() {
        unsafe extern "system" fn placeholder() -> isize {
            0
        }
        let mut asked = Vec::new();
        // SAFETY: the table is only inspected, never called.
        let table = unsafe {
            EntryPoints::resolve(|name| {
                asked.push(name);
                EntryPoints::REQUIRED.contains(&name).then_some(placeholder as RawProc)
            })
        }
        .unwrap();
        assert!(table.initialize.is_none());
        assert!(table.uninitialize.is_none());
        assert_eq!(asked.len(), EntryPoints::REQUIRED.len() + 2);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_load_fails_off_windows() {
        let err = MapiLibrary::load(MapiLibrary::DEFAULT_LIBRARY).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}

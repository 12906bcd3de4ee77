//! Marshalling between owned types and raw MAPI structures.

use std::ffi::{CStr, CString, c_char, c_void};
use std::path::{Path, PathBuf};
use std::ptr;

use super::{MapiFileDesc, MapiMessage, MapiRecipDesc, NO_POSITION};
use crate::error::{Error, MapiError, Result};
use crate::flags::MessageFlags;
use crate::types::{
    Attachment, DATE_RECEIVED_FORMAT, EntryId, Message, MessageId, Recipient, RecipientClass,
};

/// Converts text for the provider.
pub fn c_string(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::InvalidText(text.to_string()))
}

/// Pointer to an optional C string; null when absent.
pub fn opt_ptr(text: Option<&CString>) -> *const c_char {
    text.map_or(ptr::null(), |text| text.as_ptr())
}

/// Copies a provider string; null yields `None`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn string_from(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: upheld by the caller.
    let text = unsafe { CStr::from_ptr(ptr) };
    Some(text.to_string_lossy().into_owned())
}

/// Reads a message id the provider wrote into a caller buffer.
pub fn message_id_from_buffer(buffer: &[u8]) -> MessageId {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    MessageId::new(String::from_utf8_lossy(&buffer[..end]))
}

/// Copies a message id into a zeroed caller buffer, keeping the terminator.
pub fn message_id_to_buffer(id: &MessageId, buffer: &mut [u8]) -> Result<()> {
    let bytes = id.as_str().as_bytes();
    if bytes.len() >= buffer.len() || bytes.contains(&0) {
        return Err(Error::InvalidText(id.to_string()));
    }
    buffer[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Deep-copies one recipient.
///
/// # Safety
///
/// String pointers must be null or NUL-terminated; `entry_id` must be valid for
/// `eid_size` bytes when non-null.
pub unsafe fn recipient_from_raw(raw: &MapiRecipDesc) -> Recipient {
    // SAFETY: upheld by the caller.
    let (name, address) = unsafe { (string_from(raw.name), string_from(raw.address)) };
    let entry_id = if raw.entry_id.is_null() || raw.eid_size == 0 {
        EntryId::default()
    } else {
        // SAFETY: upheld by the caller.
        let bytes = unsafe {
            std::slice::from_raw_parts(raw.entry_id.cast::<u8>(), raw.eid_size as usize)
        };
        EntryId::new(bytes.to_vec())
    };
    let mut recipient = Recipient::new(name.unwrap_or_default())
        .with_class(RecipientClass::from_raw(raw.recip_class))
        .with_entry_id(entry_id);
    if let Some(address) = address {
        recipient = recipient.with_address(&address);
    }
    recipient
}

/// Deep-copies a recipient array.
///
/// # Safety
///
/// `ptr` must be null or point to `count` valid descriptors.
pub unsafe fn recipients_from_raw(ptr: *const MapiRecipDesc, count: u32) -> Vec<Recipient> {
    if ptr.is_null() || count == 0 {
        return Vec::new();
    }
    // SAFETY: upheld by the caller.
    let descs = unsafe { std::slice::from_raw_parts(ptr, count as usize) };
    descs
        .iter()
        // SAFETY: each descriptor comes from the same provider allocation.
        .map(|desc| unsafe { recipient_from_raw(desc) })
        .collect()
}

/// Deep-copies an attachment array.
///
/// # Safety
///
/// `ptr` must be null or point to `count` valid descriptors.
unsafe fn attachments_from_raw(ptr: *const MapiFileDesc, count: u32) -> Vec<Attachment> {
    if ptr.is_null() || count == 0 {
        return Vec::new();
    }
    // SAFETY: upheld by the caller.
    let descs = unsafe { std::slice::from_raw_parts(ptr, count as usize) };
    descs
        .iter()
        .map(|desc| {
            // SAFETY: strings of a provider descriptor are NUL-terminated.
            let (path, file_name) = unsafe { (string_from(desc.path_name), string_from(desc.file_name)) };
            Attachment {
                file_name,
                path: PathBuf::from(path.unwrap_or_default()),
                position: (desc.position != NO_POSITION).then_some(desc.position),
            }
        })
        .collect()
}

/// Deep-copies a message.
///
/// # Safety
///
/// `raw` must be a message the provider returned, with consistent counts.
pub unsafe fn message_from_raw(raw: &MapiMessage) -> Message {
    // SAFETY: upheld by the caller for every nested pointer.
    unsafe {
        Message {
            subject: string_from(raw.subject).unwrap_or_default(),
            note_text: string_from(raw.note_text).unwrap_or_default(),
            message_type: string_from(raw.message_type),
            date_received: string_from(raw.date_received)
                .as_deref()
                .and_then(Message::parse_date_received),
            conversation_id: string_from(raw.conversation_id),
            flags: MessageFlags::from_bits(raw.flags),
            originator: raw.originator.as_ref().map(|orig| recipient_from_raw(orig)),
            recipients: recipients_from_raw(raw.recips, raw.recip_count),
            attachments: attachments_from_raw(raw.files, raw.file_count),
        }
    }
}

/// Keeps marshalled strings and identifiers alive for the duration of a call.
#[derive(Debug, Default)]
struct Arena {
    strings: Vec<CString>,
    blobs: Vec<Vec<u8>>,
}

impl Arena {
    fn text(&mut self, text: &str) -> Result<*mut c_char> {
        let text = c_string(text)?;
        let ptr = text.as_ptr().cast_mut();
        self.strings.push(text);
        Ok(ptr)
    }

    fn opt_text(&mut self, text: Option<&str>) -> Result<*mut c_char> {
        text.map_or(Ok(ptr::null_mut()), |text| self.text(text))
    }

    fn path(&mut self, path: &Path) -> Result<*mut c_char> {
        let text = path
            .to_str()
            .ok_or_else(|| Error::InvalidText(path.display().to_string()))?;
        self.text(text)
    }

    fn recipient(&mut self, recipient: &Recipient) -> Result<MapiRecipDesc> {
        let (eid_size, entry_id) = if recipient.entry_id.is_empty() {
            (0, ptr::null_mut())
        } else {
            let mut blob = recipient.entry_id.as_bytes().to_vec();
            let size = u32::try_from(blob.len()).map_err(|_| MapiError::InvalidRecips)?;
            let ptr = blob.as_mut_ptr().cast::<c_void>();
            self.blobs.push(blob);
            (size, ptr)
        };
        Ok(MapiRecipDesc {
            reserved: 0,
            recip_class: recipient.class.as_raw(),
            name: self.text(&recipient.display_name)?,
            address: self.opt_text(recipient.qualified_address().as_deref())?,
            eid_size,
            entry_id,
        })
    }
}

/// A recipient array the provider can read for the duration of a call.
#[derive(Debug)]
pub struct RawRecipients {
    _arena: Arena,
    descs: Vec<MapiRecipDesc>,
}

impl RawRecipients {
    pub fn new(recipients: &[Recipient]) -> Result<Self> {
        let mut arena = Arena::default();
        let descs = recipients
            .iter()
            .map(|recipient| arena.recipient(recipient))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            _arena: arena,
            descs,
        })
    }

    pub fn count(&self) -> Result<u32> {
        u32::try_from(self.descs.len()).map_err(|_| MapiError::TooManyRecipients.into())
    }

    pub const fn as_mut_ptr(&mut self) -> *mut MapiRecipDesc {
        if self.descs.is_empty() {
            ptr::null_mut()
        } else {
            self.descs.as_mut_ptr()
        }
    }
}

/// A message the provider can read for the duration of a call.
#[derive(Debug)]
pub struct RawMessage {
    _arena: Arena,
    _originator: Option<Box<MapiRecipDesc>>,
    _recips: Vec<MapiRecipDesc>,
    _files: Vec<MapiFileDesc>,
    message: MapiMessage,
}

impl RawMessage {
    pub fn new(message: &Message) -> Result<Self> {
        let mut arena = Arena::default();

        let mut originator = message
            .originator
            .as_ref()
            .map(|orig| arena.recipient(orig).map(Box::new))
            .transpose()?;
        let mut recips = message
            .recipients
            .iter()
            .map(|recipient| arena.recipient(recipient))
            .collect::<Result<Vec<_>>>()?;
        let mut files = message
            .attachments
            .iter()
            .map(|attachment| -> Result<MapiFileDesc> {
                Ok(MapiFileDesc {
                    reserved: 0,
                    flags: 0,
                    position: attachment.position.unwrap_or(NO_POSITION),
                    path_name: arena.path(&attachment.path)?,
                    file_name: arena.opt_text(attachment.file_name.as_deref())?,
                    file_type: ptr::null_mut(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let date_received = message
            .date_received
            .map(|date| date.format(DATE_RECEIVED_FORMAT).to_string());

        let raw = MapiMessage {
            reserved: 0,
            subject: arena.text(&message.subject)?,
            note_text: arena.text(&message.note_text)?,
            message_type: arena.opt_text(message.message_type.as_deref())?,
            date_received: arena.opt_text(date_received.as_deref())?,
            conversation_id: arena.opt_text(message.conversation_id.as_deref())?,
            flags: message.flags.bits(),
            originator: originator
                .as_deref_mut()
                .map_or(ptr::null_mut(), ptr::from_mut),
            recip_count: u32::try_from(recips.len()).map_err(|_| MapiError::TooManyRecipients)?,
            recips: if recips.is_empty() {
                ptr::null_mut()
            } else {
                recips.as_mut_ptr()
            },
            file_count: u32::try_from(files.len()).map_err(|_| MapiError::TooManyFiles)?,
            files: if files.is_empty() {
                ptr::null_mut()
            } else {
                files.as_mut_ptr()
            },
        };

        Ok(Self {
            _arena: arena,
            _originator: originator,
            _recips: recips,
            _files: files,
            message: raw,
        })
    }

    pub const fn as_mut_ptr(&mut self) -> *mut MapiMessage {
        &raw mut self.message
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::MAX_MESSAGE_ID;

    #[test]
    fn test_message_id_buffer_stops_at_nul() {
        let mut buffer = [0_u8; 16];
        buffer[..5].copy_from_slice(b"00042");
        assert_eq!(message_id_from_buffer(&buffer).as_str(), "00042");
    }

    #[test]
    fn test_message_id_must_fit_with_terminator() {
        let mut buffer = [0_u8; 4];
        assert!(message_id_to_buffer(&MessageId::new("abcd"), &mut buffer).is_err());
        message_id_to_buffer(&MessageId::new("abc"), &mut buffer).unwrap();
        assert_eq!(&buffer, b"abc\0");
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        assert!(matches!(c_string("a\0b"), Err(Error::InvalidText(_))));
    }

    #[test]
    fn test_marshalled_message_reads_back() {
        let message = Message::new("Hello", "World")
            .to(Recipient::new("Ann")
                .with_address("SMTP:ann@example.com")
                .with_entry_id(EntryId::new(vec![1, 2, 3])))
            .attach(Attachment::new("a.txt", "C:\\tmp\\a.txt"));

        let mut raw = RawMessage::new(&message).unwrap();
        let copy = unsafe { message_from_raw(&*raw.as_mut_ptr()) };

        assert_eq!(copy, message);
    }

    #[test]
    fn test_empty_lists_marshal_as_null() {
        let mut raw = RawMessage::new(&Message::new("s", "")).unwrap();
        let msg = unsafe { &*raw.as_mut_ptr() };
        assert!(msg.recips.is_null());
        assert!(msg.files.is_null());
        assert!(msg.originator.is_null());
        assert_eq!(msg.recip_count, 0);

        let mut recips = RawRecipients::new(&[]).unwrap();
        assert!(recips.as_mut_ptr().is_null());
        assert_eq!(recips.count().unwrap(), 0);
    }

    proptest! {
        #[test]
        fn prop_message_id_survives_the_id_buffer(id in "[ -~]{0,511}") {
            let mut buffer = [0_u8; MAX_MESSAGE_ID];
            message_id_to_buffer(&MessageId::new(id.as_str()), &mut buffer).unwrap();
            let decoded = message_id_from_buffer(&buffer);
            prop_assert_eq!(decoded.as_str(), id.as_str());
        }

        #[test]
        fn prop_oversized_message_id_is_rejected(id in "[a-z]{512,600}") {
            let mut buffer = [0_u8; MAX_MESSAGE_ID];
            prop_assert!(message_id_to_buffer(&MessageId::new(id), &mut buffer).is_err());
            prop_assert!(buffer.iter().all(|&b| b == 0));
        }
    }
}

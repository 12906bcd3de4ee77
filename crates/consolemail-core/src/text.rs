//! Length limits on operator input and attachment paths.

use crate::error::{Error, Result};
use crate::settings::LengthPolicy;

/// Longest prefix of `text` that fits in `limit` bytes without splitting a character.
fn prefix(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Applies `policy` to text longer than `limit` bytes.
///
/// # Errors
///
/// Returns [`Error::TextTooLong`] when the text is too long and the policy is
/// [`LengthPolicy::Reject`].
pub fn bound_text(text: &str, limit: usize, policy: LengthPolicy) -> Result<String> {
    match policy {
        _ if text.len() <= limit => Ok(text.to_string()),
        LengthPolicy::Truncate => Ok(prefix(text, limit).to_string()),
        LengthPolicy::Reject => Err(Error::TextTooLong {
            limit,
            length: text.len(),
        }),
    }
}

/// Appends `file_name` to `directory` exactly as typed; no separator is inserted.
///
/// # Errors
///
/// Returns [`Error::PathTooLong`] when the joined path is longer than `limit`
/// bytes and the policy is [`LengthPolicy::Reject`].
pub fn join_attachment_path(
    directory: &str,
    file_name: &str,
    limit: usize,
    policy: LengthPolicy,
) -> Result<String> {
    let full = format!("{directory}{file_name}");
    match policy {
        _ if full.len() <= limit => Ok(full),
        LengthPolicy::Truncate => Ok(prefix(&full, limit).to_string()),
        LengthPolicy::Reject => Err(Error::PathTooLong {
            limit,
            length: full.len(),
        }),
    }
}

//! Detection of an installed Simple MAPI provider.
//!
//! Windows records the provider in the `[MAIL]` section of `WIN.INI`: a
//! non-zero `MAPI` value means Simple MAPI is available.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

/// Section holding the provider marker.
pub const MAIL_SECTION: &str = "MAIL";

/// Key whose value marks the provider as installed.
pub const MAPI_KEY: &str = "MAPI";

/// Read access to profile (INI) values.
pub trait ProfileSource {
    /// Looks up `key` in `section`. Lookups ignore case.
    fn lookup(&self, section: &str, key: &str) -> Option<String>;
}

/// Whether a provider is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// `[MAIL] MAPI` is set.
    Installed,
    /// The marker is missing, empty or `0`.
    NotInstalled,
}

impl InstallState {
    /// Returns `true` for [`InstallState::Installed`].
    #[must_use]
    pub const fn is_installed(self) -> bool {
        matches!(self, Self::Installed)
    }
}

/// Checks the provider marker in `source`.
#[must_use]
pub fn provider_install_state(source: &dyn ProfileSource) -> InstallState {
    let value = source.lookup(MAIL_SECTION, MAPI_KEY);
    debug!(value = ?value, "Checked provider marker");
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() && value != "0" => InstallState::Installed,
        _ => InstallState::NotInstalled,
    }
}

/// Profile values held in memory, parsed from INI text.
#[derive(Debug, Clone, Default)]
pub struct ProfileMap {
    values: BTreeMap<(String, String), String>,
}

impl ProfileMap {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one value.
    pub fn insert(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.values
            .insert((section.to_ascii_uppercase(), key.to_ascii_uppercase()), value.into());
    }

    /// Parses INI text. Comments start with `;` or `#`; malformed lines are
    /// skipped and the last duplicate wins.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut map = Self::new();
        let mut section = String::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
            } else if let Some((key, value)) = line.split_once('=') {
                map.insert(&section, key.trim(), value.trim());
            }
        }
        map
    }

    /// Reads and parses an INI file. A missing file yields an empty profile.
    ///
    /// # Errors
    ///
    /// Returns any other I/O error.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e),
        }
    }
}

impl ProfileSource for ProfileMap {
    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .get(&(section.to_ascii_uppercase(), key.to_ascii_uppercase()))
            .cloned()
    }
}

/// The system's private profile files, read through the Windows API.
#[cfg(windows)]
#[derive(Debug, Clone)]
pub struct PrivateProfile {
    file: std::ffi::CString,
}

#[cfg(windows)]
impl PrivateProfile {
    /// Opens `file`, e.g. `WIN.INI`.
    ///
    /// # Errors
    ///
    /// Fails if the name contains a NUL byte.
    pub fn new(file: &str) -> crate::Result<Self> {
        Ok(Self {
            file: crate::ffi::convert::c_string(file)?,
        })
    }
}

#[cfg(windows)]
impl ProfileSource for PrivateProfile {
    #[allow(unsafe_code)]
    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        use windows_sys::Win32::System::WindowsProgramming::GetPrivateProfileStringA;

        let section = std::ffi::CString::new(section).ok()?;
        let key = std::ffi::CString::new(key).ok()?;
        let mut buffer = [0_u8; 256];
        let capacity = u32::try_from(buffer.len()).ok()?;
        // SAFETY: all strings are NUL-terminated and `buffer` holds `capacity` bytes.
        let written = unsafe {
            GetPrivateProfileStringA(
                section.as_ptr().cast(),
                key.as_ptr().cast(),
                c"".as_ptr().cast(),
                buffer.as_mut_ptr(),
                capacity,
                self.file.as_ptr().cast(),
            )
        };
        let written = usize::try_from(written).ok()?;
        let value = String::from_utf8_lossy(&buffer[..written.min(buffer.len())]).into_owned();
        (!value.is_empty()).then_some(value)
    }
}

//! Theme resource collaborator

use std::io;

/// Resolves logical resource paths against the realm's email theme.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeResourceProvider: Send + Sync {
    /// Read the resource at `path`.
    ///
    /// `Ok(None)` means the theme has no such resource, which is not an
    /// error; `Err` means the resource exists but could not be read.
    fn resource(&self, path: &str) -> io::Result<Option<Vec<u8>>>;
}

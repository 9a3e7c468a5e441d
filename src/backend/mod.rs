//! The seam between [`ToastManager`](crate::ToastManager) and the OS.
//!
//! Everything platform specific (COM, WinRT activation factories, shell links)
//! lives behind [`ToastBackend`]. The manager only decides *what* to call and how
//! a failure is classified.

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::{error::PlatformError, events::ToastCallbacks};

pub mod memory;
#[cfg(windows)]
pub mod winrt;

pub use memory::MemoryBackend;
#[cfg(windows)]
pub use winrt::WinRtBackend;

pub trait ToastBackend {
    /// Platform object for one created notification.
    type Handle;

    /// Whether the toast notification APIs are available at all.
    fn is_compatible(&self) -> bool;

    /// Whether actions, audio, attribution, duration and scenario are understood.
    fn supports_modern_features(&self) -> bool;

    fn ensure_com(&mut self) -> Result<(), PlatformError>;

    /// Binds `aumi` to the current process.
    fn set_process_aumi(&mut self, aumi: &str) -> Result<(), PlatformError>;

    fn shortcut_exists(&self, path: &Path) -> bool;

    /// Loads the shortcut and reads its AUMI property. `Ok(None)` if the link has
    /// no readable AUMI.
    fn read_shortcut_aumi(&self, path: &Path) -> Result<Option<String>, PlatformError>;

    fn write_shortcut_aumi(&mut self, path: &Path, aumi: &str) -> Result<(), PlatformError>;

    /// Creates a shortcut to `target` carrying `aumi`.
    fn create_shortcut(
        &mut self,
        path: &Path,
        target: &Path,
        aumi: &str,
    ) -> Result<(), PlatformError>;

    fn create_toast(
        &mut self,
        aumi: &str,
        xml: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self::Handle, PlatformError>;

    fn register_callbacks(
        &mut self,
        handle: &Self::Handle,
        callbacks: ToastCallbacks,
    ) -> Result<(), PlatformError>;

    fn show(&mut self, aumi: &str, handle: &Self::Handle) -> Result<(), PlatformError>;

    fn hide(&mut self, aumi: &str, handle: &Self::Handle) -> Result<(), PlatformError>;
}

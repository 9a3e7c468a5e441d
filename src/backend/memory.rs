use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::ToastBackend;
use crate::{error::PlatformError, events::ToastCallbacks};

/// A toast handed to [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryToast {
    pub handle: u64,
    pub aumi: String,
    pub xml: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub shown: bool,
}

/// A shortcut file known to [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryShortcut {
    pub target: Option<PathBuf>,
    pub aumi: Option<String>,
}

/// Steps of the call sequence that can be told to fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailurePoints {
    pub com: bool,
    pub process_aumi: bool,
    pub shortcut_read: bool,
    pub shortcut_write: bool,
    pub shortcut_create: bool,
    pub create: bool,
    pub register: bool,
    pub show: bool,
    pub hide: bool,
}

/// In-process stand-in for the notification platform.
///
/// Records every call and keeps the registered callbacks so that OS events can
/// be fired by hand.
#[derive(Default)]
pub struct MemoryBackend {
    pub incompatible: bool,
    pub legacy: bool,
    pub fail: FailurePoints,
    process_aumi: Option<String>,
    shortcuts: HashMap<PathBuf, MemoryShortcut>,
    toasts: Vec<MemoryToast>,
    callbacks: HashMap<u64, ToastCallbacks>,
    hidden: Vec<u64>,
    next_handle: u64,
}

fn refused(step: &str) -> PlatformError {
    PlatformError::fail(format!("{step} refused"))
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incompatible() -> Self {
        Self {
            incompatible: true,
            ..Self::default()
        }
    }

    pub fn legacy() -> Self {
        Self {
            legacy: true,
            ..Self::default()
        }
    }

    pub fn process_aumi(&self) -> Option<&str> {
        self.process_aumi.as_deref()
    }

    pub fn add_shortcut(&mut self, path: impl Into<PathBuf>, aumi: Option<&str>) {
        self.shortcuts.insert(
            path.into(),
            MemoryShortcut {
                target: None,
                aumi: aumi.map(str::to_string),
            },
        );
    }

    pub fn shortcut(&self, path: &Path) -> Option<&MemoryShortcut> {
        self.shortcuts.get(path)
    }

    pub fn toasts(&self) -> &[MemoryToast] {
        &self.toasts
    }

    pub fn shown(&self) -> impl Iterator<Item = &MemoryToast> {
        self.toasts.iter().filter(|t| t.shown)
    }

    pub fn hidden(&self) -> &[u64] {
        &self.hidden
    }

    /// The sink registered for the toast `id`, to simulate OS events.
    pub fn callbacks_for_id(&self, id: i64) -> Option<&ToastCallbacks> {
        self.callbacks.values().find(|c| c.id() == id)
    }
}

impl ToastBackend for MemoryBackend {
    type Handle = u64;

    fn is_compatible(&self) -> bool {
        !self.incompatible
    }

    fn supports_modern_features(&self) -> bool {
        !self.legacy
    }

    fn ensure_com(&mut self) -> Result<(), PlatformError> {
        if self.fail.com {
            return Err(refused("CoInitializeEx"));
        }
        Ok(())
    }

    fn set_process_aumi(&mut self, aumi: &str) -> Result<(), PlatformError> {
        if self.fail.process_aumi {
            return Err(refused("SetCurrentProcessExplicitAppUserModelID"));
        }
        self.process_aumi = Some(aumi.to_string());
        Ok(())
    }

    fn shortcut_exists(&self, path: &Path) -> bool {
        self.shortcuts.contains_key(path)
    }

    fn read_shortcut_aumi(&self, path: &Path) -> Result<Option<String>, PlatformError> {
        if self.fail.shortcut_read {
            return Err(refused("IPersistFile::Load"));
        }
        self.shortcuts
            .get(path)
            .map(|s| s.aumi.clone())
            .ok_or_else(|| PlatformError::fail(format!("{} not found", path.display())))
    }

    fn write_shortcut_aumi(&mut self, path: &Path, aumi: &str) -> Result<(), PlatformError> {
        if self.fail.shortcut_write {
            return Err(refused("IPropertyStore::SetValue"));
        }
        match self.shortcuts.get_mut(path) {
            Some(shortcut) => {
                shortcut.aumi = Some(aumi.to_string());
                Ok(())
            }
            None => Err(PlatformError::fail(format!("{} not found", path.display()))),
        }
    }

    fn create_shortcut(
        &mut self,
        path: &Path,
        target: &Path,
        aumi: &str,
    ) -> Result<(), PlatformError> {
        if self.fail.shortcut_create {
            return Err(refused("IPersistFile::Save"));
        }
        self.shortcuts.insert(
            path.to_path_buf(),
            MemoryShortcut {
                target: Some(target.to_path_buf()),
                aumi: Some(aumi.to_string()),
            },
        );
        Ok(())
    }

    fn create_toast(
        &mut self,
        aumi: &str,
        xml: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<u64, PlatformError> {
        if self.fail.create {
            return Err(refused("CreateToastNotification"));
        }
        self.next_handle += 1;
        self.toasts.push(MemoryToast {
            handle: self.next_handle,
            aumi: aumi.to_string(),
            xml: xml.to_string(),
            expires_at,
            shown: false,
        });
        Ok(self.next_handle)
    }

    fn register_callbacks(
        &mut self,
        handle: &u64,
        callbacks: ToastCallbacks,
    ) -> Result<(), PlatformError> {
        if self.fail.register {
            return Err(refused("add_Activated"));
        }
        self.callbacks.insert(*handle, callbacks);
        Ok(())
    }

    fn show(&mut self, _aumi: &str, handle: &u64) -> Result<(), PlatformError> {
        if self.fail.show {
            return Err(refused("ToastNotifier::Show"));
        }
        let toast = self
            .toasts
            .iter_mut()
            .find(|t| t.handle == *handle)
            .ok_or_else(|| PlatformError::fail("unknown handle"))?;
        toast.shown = true;
        Ok(())
    }

    fn hide(&mut self, _aumi: &str, handle: &u64) -> Result<(), PlatformError> {
        if self.fail.hide {
            return Err(refused("ToastNotifier::Hide"));
        }
        self.hidden.push(*handle);
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.handle == *handle) {
            toast.shown = false;
        }
        Ok(())
    }
}

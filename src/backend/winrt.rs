//! Windows implementation of [`ToastBackend`] on top of the WinRT
//! `Windows.UI.Notifications` API and the shell link COM objects.
//!
//! <https://learn.microsoft.com/en-us/windows/apps/design/shell/tiles-and-notifications/send-local-toast-desktop-cpp-wrl>

use chrono::{DateTime, Utc};
use std::path::Path;
use std::thread::{self, ThreadId};
use widestring::U16CString;
use windows::{
    Data::Xml::Dom::XmlDocument,
    Foundation::{DateTime as WinDateTime, IReference, PropertyValue, TypedEventHandler},
    UI::Notifications::{
        ToastActivatedEventArgs, ToastDismissalReason, ToastDismissedEventArgs,
        ToastFailedEventArgs, ToastNotification, ToastNotificationManager, ToastNotifier,
        ToastTemplateType,
    },
    Win32::{
        Foundation::{RPC_E_CHANGED_MODE, TRUE},
        Storage::EnhancedStorage::PKEY_AppUserModel_ID,
        System::{
            Com::{
                CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx,
                CoUninitialize, IPersistFile, STGM_READWRITE,
            },
            LibraryLoader::{GetModuleHandleW, GetProcAddress},
            SystemInformation::OSVERSIONINFOW,
        },
        UI::Shell::{
            IShellLinkW, PropertiesSystem::IPropertyStore, SetCurrentProcessExplicitAppUserModelID,
            ShellLink,
        },
    },
};
use windows_core::{BSTR, HSTRING, IInspectable, Interface, PCWSTR, PROPVARIANT, s, w};

use super::ToastBackend;
use crate::{
    error::PlatformError,
    events::{DismissalReason, ToastCallbacks},
};

/// 100ns ticks between 1601-01-01 and the Unix epoch.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

/// Windows 8 and later report a major version above this one.
const MINIMUM_MODERN_MAJOR_VERSION: u32 = 6;

pub struct WinRtBackend {
    /// Thread whose COM initialization this backend has to balance.
    com_thread: Option<ThreadId>,
}

impl WinRtBackend {
    pub fn new() -> Self {
        Self { com_thread: None }
    }

    fn owns_com_on_current_thread(&self) -> bool {
        self.com_thread == Some(thread::current().id())
    }

    fn notifier(aumi: &str) -> Result<ToastNotifier, PlatformError> {
        Ok(ToastNotificationManager::CreateToastNotifierWithId(
            &HSTRING::from(aumi),
        )?)
    }
}

impl Default for WinRtBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WinRtBackend {
    fn drop(&mut self) {
        if self.owns_com_on_current_thread() {
            unsafe { CoUninitialize() };
        } else if self.com_thread.is_some() {
            tracing::warn!(target: "toast::backend", "Dropped off the COM thread, leaving COM initialized");
        }
    }
}

fn wide(path: &Path) -> Result<U16CString, PlatformError> {
    U16CString::from_os_str(path.as_os_str())
        .map_err(|e| PlatformError::fail(format!("invalid path {}: {e}", path.display())))
}

/// Real OS version; `GetVersionEx` lies to unmanifested processes.
fn os_major_version() -> u32 {
    type RtlGetVersion = unsafe extern "system" fn(*mut OSVERSIONINFOW) -> i32;

    unsafe {
        let Ok(ntdll) = GetModuleHandleW(w!("ntdll.dll")) else {
            return 0;
        };
        let Some(proc) = GetProcAddress(ntdll, s!("RtlGetVersion")) else {
            return 0;
        };
        let rtl_get_version: RtlGetVersion = std::mem::transmute(proc);

        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        if rtl_get_version(&mut info) == 0 {
            info.dwMajorVersion
        } else {
            0
        }
    }
}

fn to_win_datetime(at: DateTime<Utc>) -> Result<WinDateTime, PlatformError> {
    at.timestamp_millis()
        .checked_mul(10_000)
        .and_then(|ticks| ticks.checked_add(UNIX_EPOCH_TICKS))
        .map(|ticks| WinDateTime {
            UniversalTime: ticks,
        })
        .ok_or_else(|| PlatformError::fail(format!("{at} is out of range for a WinRT DateTime")))
}

fn load_shell_link(path: &Path) -> Result<(IShellLinkW, IPersistFile), PlatformError> {
    let path = wide(path)?;
    unsafe {
        let link: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)?;
        let file: IPersistFile = link.cast()?;
        file.Load(PCWSTR(path.as_ptr()), STGM_READWRITE)?;
        Ok((link, file))
    }
}

impl ToastBackend for WinRtBackend {
    type Handle = ToastNotification;

    fn is_compatible(&self) -> bool {
        ToastNotificationManager::GetTemplateContent(ToastTemplateType::ToastText01).is_ok()
    }

    fn supports_modern_features(&self) -> bool {
        os_major_version() > MINIMUM_MODERN_MAJOR_VERSION
    }

    fn ensure_com(&mut self) -> Result<(), PlatformError> {
        if self.owns_com_on_current_thread() {
            return Ok(());
        }

        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            // Another apartment model is already set up on this thread.
            return Ok(());
        }
        hr.ok()?;
        if self.com_thread.is_some() {
            // Only one initialization is tracked; balance this one right away
            // and rely on the process-wide MTA.
            unsafe { CoUninitialize() };
        } else {
            self.com_thread = Some(thread::current().id());
        }
        Ok(())
    }

    fn set_process_aumi(&mut self, aumi: &str) -> Result<(), PlatformError> {
        unsafe { SetCurrentProcessExplicitAppUserModelID(&HSTRING::from(aumi))? };
        Ok(())
    }

    fn shortcut_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_shortcut_aumi(&self, path: &Path) -> Result<Option<String>, PlatformError> {
        let (link, _file) = load_shell_link(path)?;
        let store: IPropertyStore = link.cast()?;
        let value = unsafe { store.GetValue(&PKEY_AppUserModel_ID)? };

        Ok(BSTR::try_from(&value)
            .ok()
            .map(|aumi| aumi.to_string())
            .filter(|aumi| !aumi.is_empty()))
    }

    fn write_shortcut_aumi(&mut self, path: &Path, aumi: &str) -> Result<(), PlatformError> {
        let (link, file) = load_shell_link(path)?;
        let store: IPropertyStore = link.cast()?;
        let target = wide(path)?;

        unsafe {
            store.SetValue(&PKEY_AppUserModel_ID, &PROPVARIANT::from(aumi))?;
            store.Commit()?;
            if file.IsDirty().is_ok() {
                file.Save(PCWSTR(target.as_ptr()), TRUE)?;
            }
        }
        Ok(())
    }

    fn create_shortcut(
        &mut self,
        path: &Path,
        target: &Path,
        aumi: &str,
    ) -> Result<(), PlatformError> {
        let link_path = wide(path)?;
        let exe_path = wide(target)?;
        let working_dir = wide(target.parent().unwrap_or(target))?;

        unsafe {
            let link: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)?;
            link.SetPath(PCWSTR(exe_path.as_ptr()))?;
            link.SetArguments(w!(""))?;
            link.SetWorkingDirectory(PCWSTR(working_dir.as_ptr()))?;

            let store: IPropertyStore = link.cast()?;
            store.SetValue(&PKEY_AppUserModel_ID, &PROPVARIANT::from(aumi))?;
            store.Commit()?;

            let file: IPersistFile = link.cast()?;
            file.Save(PCWSTR(link_path.as_ptr()), TRUE)?;
        }
        Ok(())
    }

    fn create_toast(
        &mut self,
        _aumi: &str,
        xml: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ToastNotification, PlatformError> {
        let doc = XmlDocument::new()?;
        doc.LoadXml(&HSTRING::from(xml))?;

        let toast = ToastNotification::CreateToastNotification(&doc)?;
        if let Some(at) = expires_at {
            let reference = PropertyValue::CreateDateTime(to_win_datetime(at)?)?
                .cast::<IReference<WinDateTime>>()?;
            toast.SetExpirationTime(&reference)?;
        }
        Ok(toast)
    }

    fn register_callbacks(
        &mut self,
        handle: &ToastNotification,
        callbacks: ToastCallbacks,
    ) -> Result<(), PlatformError> {
        let on_activated = callbacks.clone();
        handle.Activated(&TypedEventHandler::new(
            move |_, args: &Option<IInspectable>| {
                let arguments = args
                    .as_ref()
                    .and_then(|args| args.cast::<ToastActivatedEventArgs>().ok())
                    .and_then(|args| args.Arguments().ok())
                    .map(|arguments| arguments.to_string());
                on_activated.activated(arguments.as_deref());
                Ok(())
            },
        ))?;

        let on_dismissed = callbacks.clone();
        handle.Dismissed(&TypedEventHandler::new(
            move |_, args: &Option<ToastDismissedEventArgs>| {
                let Some(reason) = args.as_ref().and_then(|args| args.Reason().ok()) else {
                    return Ok(());
                };
                let reason = match reason {
                    ToastDismissalReason::UserCanceled => DismissalReason::UserCanceled,
                    ToastDismissalReason::ApplicationHidden => DismissalReason::ApplicationHidden,
                    ToastDismissalReason::TimedOut => DismissalReason::TimedOut,
                    other => {
                        tracing::warn!(target: "toast::backend", reason = other.0, "Unknown dismissal reason");
                        return Ok(());
                    }
                };
                on_dismissed.dismissed(reason);
                Ok(())
            },
        ))?;

        let on_failed = callbacks;
        handle.Failed(&TypedEventHandler::new(
            move |_, args: &Option<ToastFailedEventArgs>| {
                let error = args
                    .as_ref()
                    .and_then(|args| args.ErrorCode().ok())
                    .map(|code| windows_core::Error::from(code).message().to_string());
                on_failed.failed(error);
                Ok(())
            },
        ))?;

        Ok(())
    }

    fn show(&mut self, aumi: &str, handle: &ToastNotification) -> Result<(), PlatformError> {
        Self::notifier(aumi)?.Show(handle)?;
        Ok(())
    }

    fn hide(&mut self, aumi: &str, handle: &ToastNotification) -> Result<(), PlatformError> {
        Self::notifier(aumi)?.Hide(handle)?;
        Ok(())
    }
}

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::{
    backend::ToastBackend,
    error::ToastError,
    events::{ToastCallbacks, ToastEvent, ToastEvents},
    identity::AppIdentity,
    shortcut::{ShortcutPolicy, ShortcutResult, default_shell_links_dir, shell_link_path},
    template::ToastTemplate,
    xml::ToastXml,
};

/// Posts toasts for one application identity and re-publishes what the OS
/// reports about them.
///
/// Outstanding toasts are tracked by the id [`show_toast`](Self::show_toast)
/// returns until they are hidden or cleared.
pub struct ToastManager<B: ToastBackend> {
    // Declared before `backend`: handles must be released before the
    // backend tears the platform down.
    outstanding: HashMap<i64, B::Handle>,
    backend: B,
    identity: AppIdentity,
    shortcut_policy: ShortcutPolicy,
    shortcut_dir: Option<PathBuf>,
    initialized: bool,
    events: ToastEvents,
}

impl<B: ToastBackend> ToastManager<B> {
    pub fn new(backend: B) -> Self {
        if !backend.is_compatible() {
            tracing::warn!(target: "toast::manager", "Toast notifications are not supported on this system");
        }

        Self {
            backend,
            identity: AppIdentity::default(),
            shortcut_policy: ShortcutPolicy::default(),
            shortcut_dir: None,
            initialized: false,
            outstanding: HashMap::new(),
            events: ToastEvents::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn app_name(&self) -> &str {
        &self.identity.app_name
    }

    pub fn app_user_model_id(&self) -> &str {
        &self.identity.aumi
    }

    pub fn set_app_name(&mut self, app_name: impl Into<String>) {
        self.identity.app_name = app_name.into();
    }

    pub fn set_app_user_model_id(&mut self, aumi: impl Into<String>) {
        self.identity.aumi = aumi.into();
        tracing::debug!(target: "toast::manager", aumi = %self.identity.aumi, "App User Model Id set");
    }

    pub fn set_shortcut_policy(&mut self, policy: ShortcutPolicy) {
        self.shortcut_policy = policy;
    }

    pub fn shortcut_policy(&self) -> ShortcutPolicy {
        self.shortcut_policy
    }

    /// Overrides the Start-Menu programs directory the shortcut lives in.
    pub fn set_shortcut_dir(&mut self, dir: Option<PathBuf>) {
        self.shortcut_dir = dir;
    }

    pub fn is_compatible(&self) -> bool {
        self.backend.is_compatible()
    }

    pub fn is_supporting_modern_features(&self) -> bool {
        self.backend.supports_modern_features()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &ToastEvents {
        &self.events
    }

    /// Ids of the toasts shown and not yet hidden.
    pub fn outstanding(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.outstanding.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn shell_link_path(&self) -> Option<PathBuf> {
        let dir = self.shortcut_dir.clone().or_else(default_shell_links_dir)?;
        Some(shell_link_path(&dir, &self.identity.app_name))
    }

    /// Checks the OS, the identity and the shortcut, then binds the AUMI to the
    /// process.
    pub fn initialize(&mut self) -> Result<(), ToastError> {
        self.initialized = false;

        if !self.backend.is_compatible() {
            tracing::error!(target: "toast::manager", "System not supported");
            return Err(ToastError::SystemNotSupported);
        }

        if let Err(e) = self.identity.validate() {
            tracing::error!(target: "toast::manager", "Error while initializing, did you set up a valid AUMI and App name?");
            return Err(e);
        }

        if self.shortcut_policy != ShortcutPolicy::Ignore {
            let result = self.create_shortcut();
            if !result.is_ok() {
                tracing::error!(target: "toast::manager", ?result, "Shell link could not be validated or created");
                return Err(ToastError::ShellLinkNotCreated);
            }
        }

        if let Err(e) = self.backend.set_process_aumi(&self.identity.aumi) {
            tracing::error!(target: "toast::manager", error = %e, "Error while attaching the AUMI to the current process");
            return Err(ToastError::InvalidAppUserModelId);
        }

        self.initialized = true;
        tracing::info!(
            target: "toast::manager",
            app_name = %self.identity.app_name,
            aumi = %self.identity.aumi,
            "Toast manager initialized"
        );
        Ok(())
    }

    /// Makes sure a Start-Menu shortcut carrying the AUMI exists, as far as the
    /// shortcut policy allows.
    pub fn create_shortcut(&mut self) -> ShortcutResult {
        if !self.identity.is_complete() {
            tracing::error!(target: "toast::shortcut", "App User Model Id or App name is empty");
            return ShortcutResult::MissingParameters;
        }

        if !self.backend.is_compatible() {
            tracing::error!(target: "toast::shortcut", "OS is not compatible with toast notifications");
            return ShortcutResult::IncompatibleOs;
        }

        if let Err(e) = self.backend.ensure_com() {
            tracing::error!(target: "toast::shortcut", error = %e, "Error on COM library initialization");
            return ShortcutResult::ComInitFailure;
        }

        let Some(path) = self.shell_link_path() else {
            tracing::error!(target: "toast::shortcut", "No Start Menu directory for the shell link");
            return ShortcutResult::CreateFailed;
        };

        if self.backend.shortcut_exists(&path) {
            match self.validate_shortcut(&path) {
                Some(result) => return result,
                None => {
                    tracing::warn!(target: "toast::shortcut", path = %path.display(), "Existing shell link could not be fixed, recreating");
                }
            }
        } else {
            tracing::info!(target: "toast::shortcut", path = %path.display(), "Shell link not found");
        }

        if self.shortcut_policy != ShortcutPolicy::RequireCreate {
            return ShortcutResult::CreateFailed;
        }

        let target = match std::env::current_exe() {
            Ok(exe) => exe,
            Err(e) => {
                tracing::error!(target: "toast::shortcut", error = %e, "Could not resolve the executable path");
                return ShortcutResult::CreateFailed;
            }
        };

        match self
            .backend
            .create_shortcut(&path, &target, &self.identity.aumi)
        {
            Ok(()) => {
                tracing::info!(target: "toast::shortcut", path = %path.display(), "Shell link created");
                ShortcutResult::WasCreated
            }
            Err(e) => {
                tracing::error!(target: "toast::shortcut", error = %e, "Shell link creation failed");
                ShortcutResult::CreateFailed
            }
        }
    }

    /// `None` when the link has to be created from scratch.
    fn validate_shortcut(&mut self, path: &std::path::Path) -> Option<ShortcutResult> {
        let current = match self.backend.read_shortcut_aumi(path) {
            Ok(aumi) => aumi,
            Err(e) => {
                tracing::warn!(target: "toast::shortcut", error = %e, "Could not load shell link");
                return None;
            }
        };

        if current.as_deref() == Some(self.identity.aumi.as_str()) {
            return Some(ShortcutResult::Unchanged);
        }

        if self.shortcut_policy != ShortcutPolicy::RequireCreate {
            tracing::error!(target: "toast::shortcut", found = ?current, "Shell link AUMI mismatch and policy forbids changes");
            return Some(ShortcutResult::CreateFailed);
        }

        match self.backend.write_shortcut_aumi(path, &self.identity.aumi) {
            Ok(()) => {
                tracing::info!(target: "toast::shortcut", previous = ?current, "Shell link AUMI updated");
                Some(ShortcutResult::WasChanged)
            }
            Err(e) => {
                tracing::warn!(target: "toast::shortcut", error = %e, "Could not update shell link AUMI");
                None
            }
        }
    }

    /// Builds, registers and submits a toast. Returns its id.
    pub fn show_toast(&mut self, template: &ToastTemplate) -> Result<i64, ToastError> {
        if !self.initialized {
            tracing::error!(target: "toast::manager", "Error when launching the toast, manager is not initialized");
            return Err(ToastError::NotInitialized);
        }

        let xml = ToastXml::build(template, self.backend.supports_modern_features())
            .to_xml()
            .map_err(|e| {
                tracing::error!(target: "toast::manager", error = %e, "Toast xml could not be built");
                ToastError::Unknown
            })?;

        let expires_at = expiration_from_now(template.expiration());

        let aumi = self.identity.aumi.clone();
        let handle = self
            .backend
            .create_toast(&aumi, &xml, expires_at)
            .map_err(|e| {
                tracing::error!(target: "toast::manager", error = %e, "Toast could not be created");
                ToastError::Unknown
            })?;

        let id = self.next_id();
        let callbacks = ToastCallbacks::new(id, expires_at, self.events.clone());
        self.backend
            .register_callbacks(&handle, callbacks)
            .map_err(|e| {
                tracing::error!(target: "toast::manager", error = %e, "Toast handlers could not be registered");
                ToastError::InvalidHandler
            })?;

        tracing::trace!(target: "toast::manager", id, %xml, "Showing toast");
        self.backend.show(&aumi, &handle).map_err(|e| {
            tracing::error!(target: "toast::manager", error = %e, "Toast could not be displayed");
            ToastError::NotDisplayed
        })?;

        self.outstanding.insert(id, handle);
        Ok(id)
    }

    /// First 32 bits of a random UUID, unique among the outstanding toasts.
    fn next_id(&self) -> i64 {
        loop {
            let id = i64::from(uuid::Uuid::new_v4().as_fields().0);
            if !self.outstanding.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn hide_toast(&mut self, id: i64) -> Result<(), ToastError> {
        if !self.initialized {
            tracing::error!(target: "toast::manager", "Error when hiding the toast, manager is not initialized");
            return Err(ToastError::NotInitialized);
        }

        let Some(handle) = self.outstanding.remove(&id) else {
            return Err(ToastError::UnknownToast(id));
        };

        let aumi = self.identity.aumi.clone();
        self.backend.hide(&aumi, &handle).map_err(|e| {
            tracing::warn!(target: "toast::manager", id, error = %e, "Toast could not be hidden");
            ToastError::Unknown
        })
    }

    /// Hides every outstanding toast.
    pub fn clear(&mut self) {
        let aumi = self.identity.aumi.clone();
        for (id, handle) in self.outstanding.drain() {
            if let Err(e) = self.backend.hide(&aumi, &handle) {
                tracing::warn!(target: "toast::manager", id, error = %e, "Toast could not be hidden");
            }
        }
    }
}

/// `None` for "never expires", including offsets past the representable range.
fn expiration_from_now(milliseconds: i64) -> Option<DateTime<Utc>> {
    if milliseconds <= 0 {
        return None;
    }

    let expires_at = ChronoDuration::try_milliseconds(milliseconds)
        .and_then(|offset| Utc::now().checked_add_signed(offset));
    if expires_at.is_none() {
        tracing::warn!(target: "toast::manager", milliseconds, "Expiration out of range, toast will not expire");
    }
    expires_at
}

#[cfg(windows)]
impl ToastManager<crate::backend::WinRtBackend> {
    /// The process-wide manager backed by the Windows notification platform.
    pub fn instance() -> &'static std::sync::Mutex<Self> {
        static INSTANCE: std::sync::OnceLock<
            std::sync::Mutex<ToastManager<crate::backend::WinRtBackend>>,
        > = std::sync::OnceLock::new();
        INSTANCE.get_or_init(|| {
            std::sync::Mutex::new(ToastManager::new(crate::backend::WinRtBackend::new()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::MemoryBackend,
        error::PlatformError,
        events::DismissalReason,
        template::TemplateType,
    };
    use std::path::Path;

    const LINKS: &str = "start-menu-programs";

    fn manager(backend: MemoryBackend) -> ToastManager<MemoryBackend> {
        let mut manager = ToastManager::new(backend);
        manager.set_app_name("A-Soul");
        manager.set_app_user_model_id("skykey.qwintoast.example");
        manager.set_shortcut_dir(Some(PathBuf::from(LINKS)));
        manager
    }

    fn link() -> PathBuf {
        Path::new(LINKS).join("A-Soul.lnk")
    }

    fn ready() -> ToastManager<MemoryBackend> {
        let mut manager = manager(MemoryBackend::new());
        manager.initialize().unwrap();
        manager
    }

    fn template() -> ToastTemplate {
        let mut toast = ToastTemplate::new(TemplateType::Text02);
        toast.set_first_line("Hello").set_second_line("World");
        toast
    }

    #[test]
    fn test_initialize_success() {
        let manager = ready();
        assert!(manager.is_initialized());
        assert_eq!(
            manager.backend().process_aumi(),
            Some("skykey.qwintoast.example")
        );
        let shortcut = manager.backend().shortcut(&link()).unwrap();
        assert_eq!(shortcut.aumi.as_deref(), Some("skykey.qwintoast.example"));
        assert!(shortcut.target.is_some());
    }

    #[test]
    fn test_initialize_requires_identity() {
        let mut manager = manager(MemoryBackend::new());
        manager.set_app_name("");
        assert_eq!(manager.initialize(), Err(ToastError::InvalidParameters));
        assert!(!manager.is_initialized());

        let mut manager = self::manager(MemoryBackend::new());
        manager.set_app_user_model_id("");
        assert_eq!(manager.initialize(), Err(ToastError::InvalidParameters));
    }

    #[test]
    fn test_initialize_incompatible_os() {
        let mut manager = manager(MemoryBackend::incompatible());
        assert!(!manager.is_compatible());
        assert_eq!(manager.initialize(), Err(ToastError::SystemNotSupported));
        assert_eq!(manager.create_shortcut(), ShortcutResult::IncompatibleOs);
    }

    #[test]
    fn test_initialize_shortcut_failure() {
        let mut backend = MemoryBackend::new();
        backend.fail.shortcut_create = true;
        let mut manager = manager(backend);
        assert_eq!(manager.initialize(), Err(ToastError::ShellLinkNotCreated));
    }

    #[test]
    fn test_initialize_ignores_shortcut_when_asked() {
        let mut backend = MemoryBackend::new();
        backend.fail.shortcut_create = true;
        let mut manager = manager(backend);
        manager.set_shortcut_policy(ShortcutPolicy::Ignore);
        assert!(manager.initialize().is_ok());
        assert!(manager.backend().shortcut(&link()).is_none());
    }

    #[test]
    fn test_initialize_invalid_aumi() {
        let mut backend = MemoryBackend::new();
        backend.fail.process_aumi = true;
        let mut manager = manager(backend);
        assert_eq!(manager.initialize(), Err(ToastError::InvalidAppUserModelId));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_shortcut_unchanged_when_aumi_matches() {
        let mut backend = MemoryBackend::new();
        backend.add_shortcut(link(), Some("skykey.qwintoast.example"));
        let mut manager = manager(backend);
        assert_eq!(manager.create_shortcut(), ShortcutResult::Unchanged);
    }

    #[test]
    fn test_shortcut_aumi_is_rewritten() {
        let mut backend = MemoryBackend::new();
        backend.add_shortcut(link(), Some("old.aumi"));
        let mut manager = manager(backend);
        assert_eq!(manager.create_shortcut(), ShortcutResult::WasChanged);
        assert_eq!(
            manager.backend().shortcut(&link()).unwrap().aumi.as_deref(),
            Some("skykey.qwintoast.example")
        );
    }

    #[test]
    fn test_shortcut_no_create_policy() {
        let mut backend = MemoryBackend::new();
        backend.add_shortcut(link(), None);
        let mut manager = manager(backend);
        manager.set_shortcut_policy(ShortcutPolicy::RequireNoCreate);
        assert_eq!(manager.create_shortcut(), ShortcutResult::CreateFailed);

        let mut manager = self::manager(MemoryBackend::new());
        manager.set_shortcut_policy(ShortcutPolicy::RequireNoCreate);
        assert_eq!(manager.create_shortcut(), ShortcutResult::CreateFailed);
        assert_eq!(manager.initialize(), Err(ToastError::ShellLinkNotCreated));
    }

    #[test]
    fn test_shortcut_recreated_when_unreadable() {
        let mut backend = MemoryBackend::new();
        backend.add_shortcut(link(), Some("old.aumi"));
        backend.fail.shortcut_read = true;
        let mut manager = manager(backend);
        assert_eq!(manager.create_shortcut(), ShortcutResult::WasCreated);
    }

    #[test]
    fn test_shortcut_com_failure() {
        let mut backend = MemoryBackend::new();
        backend.fail.com = true;
        let mut manager = manager(backend);
        assert_eq!(manager.create_shortcut(), ShortcutResult::ComInitFailure);

        let mut manager = ToastManager::new(MemoryBackend::new());
        assert_eq!(manager.create_shortcut(), ShortcutResult::MissingParameters);
    }

    #[test]
    fn test_show_toast_requires_initialize() {
        let mut manager = manager(MemoryBackend::new());
        assert_eq!(
            manager.show_toast(&template()),
            Err(ToastError::NotInitialized)
        );
        assert!(manager.backend().toasts().is_empty());
        assert!(manager.outstanding().is_empty());
    }

    #[test]
    fn test_show_toast_tracks_id() {
        let mut manager = ready();
        let id = manager.show_toast(&template()).unwrap();
        assert!(id >= 0);
        assert_eq!(manager.outstanding(), vec![id]);

        let shown: Vec<_> = manager.backend().shown().collect();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].aumi, "skykey.qwintoast.example");
        assert!(shown[0].xml.contains(r#"<text id="1">Hello</text>"#));
        assert!(shown[0].expires_at.is_none());
    }

    #[test]
    fn test_show_toast_expiration() {
        let mut manager = ready();
        let mut toast = template();
        toast.set_expiration(60_000);
        let before = Utc::now();
        manager.show_toast(&toast).unwrap();

        let expires_at = manager.backend().toasts()[0].expires_at.unwrap();
        assert!(expires_at >= before + ChronoDuration::seconds(60));
    }

    #[test]
    fn test_show_toast_failure_classification() {
        let mut manager = ready();
        manager.backend_mut().fail.create = true;
        assert_eq!(manager.show_toast(&template()), Err(ToastError::Unknown));

        manager.backend_mut().fail.create = false;
        manager.backend_mut().fail.register = true;
        assert_eq!(
            manager.show_toast(&template()),
            Err(ToastError::InvalidHandler)
        );

        manager.backend_mut().fail.register = false;
        manager.backend_mut().fail.show = true;
        assert_eq!(manager.show_toast(&template()), Err(ToastError::NotDisplayed));

        assert!(manager.outstanding().is_empty());
    }

    #[test]
    fn test_legacy_os_gets_plain_xml() {
        let mut manager = manager(MemoryBackend::legacy());
        manager.initialize().unwrap();
        assert!(!manager.is_supporting_modern_features());

        let mut toast = template();
        toast.add_action("Yes");
        manager.show_toast(&toast).unwrap();
        assert!(!manager.backend().toasts()[0].xml.contains("<actions>"));
    }

    #[test]
    fn test_hide_unknown_id_has_no_side_effects() {
        let mut manager = ready();
        let id = manager.show_toast(&template()).unwrap();

        assert_eq!(
            manager.hide_toast(id + 1),
            Err(ToastError::UnknownToast(id + 1))
        );
        assert_eq!(manager.outstanding(), vec![id]);
        assert!(manager.backend().hidden().is_empty());
    }

    #[test]
    fn test_hide_toast() {
        let mut manager = ready();
        let id = manager.show_toast(&template()).unwrap();

        assert!(manager.hide_toast(id).is_ok());
        assert!(manager.outstanding().is_empty());
        assert_eq!(manager.backend().hidden().len(), 1);
        assert_eq!(manager.hide_toast(id), Err(ToastError::UnknownToast(id)));
    }

    #[test]
    fn test_hide_requires_initialize() {
        let mut manager = manager(MemoryBackend::new());
        assert_eq!(manager.hide_toast(1), Err(ToastError::NotInitialized));
    }

    #[test]
    fn test_clear_hides_everything() {
        let mut manager = ready();
        for _ in 0..3 {
            manager.show_toast(&template()).unwrap();
        }
        assert_eq!(manager.outstanding().len(), 3);

        manager.clear();
        assert!(manager.outstanding().is_empty());

        let mut hidden = manager.backend().hidden().to_vec();
        hidden.sort_unstable();
        assert_eq!(hidden, vec![1, 2, 3]);
        assert_eq!(manager.backend().shown().count(), 0);
    }

    #[test]
    fn test_hide_failure_still_forgets_toast() {
        let mut manager = ready();
        let id = manager.show_toast(&template()).unwrap();
        manager.backend_mut().fail.hide = true;

        assert_eq!(manager.hide_toast(id), Err(ToastError::Unknown));
        assert!(manager.outstanding().is_empty());
        assert_eq!(manager.hide_toast(id), Err(ToastError::UnknownToast(id)));
    }

    #[test]
    fn test_clear_empties_table_when_hides_fail() {
        let mut manager = ready();
        for _ in 0..2 {
            manager.show_toast(&template()).unwrap();
        }
        manager.backend_mut().fail.hide = true;

        manager.clear();
        assert!(manager.outstanding().is_empty());
        assert!(manager.backend().hidden().is_empty());
    }

    #[test]
    fn test_shortcut_recreated_when_rewrite_fails() {
        let mut backend = MemoryBackend::new();
        backend.add_shortcut(link(), Some("old.aumi"));
        backend.fail.shortcut_write = true;
        let mut manager = manager(backend);
        assert_eq!(manager.create_shortcut(), ShortcutResult::WasCreated);

        let shortcut = manager.backend().shortcut(&link()).unwrap();
        assert_eq!(shortcut.aumi.as_deref(), Some("skykey.qwintoast.example"));
        assert!(shortcut.target.is_some());
    }

    #[test]
    fn test_shortcut_rewrite_failure_without_create() {
        let mut backend = MemoryBackend::new();
        backend.add_shortcut(link(), Some("old.aumi"));
        backend.fail.shortcut_write = true;
        let mut manager = manager(backend);
        manager.set_shortcut_policy(ShortcutPolicy::RequireNoCreate);
        assert_eq!(manager.create_shortcut(), ShortcutResult::CreateFailed);
        assert_eq!(
            manager.backend().shortcut(&link()).unwrap().aumi.as_deref(),
            Some("old.aumi")
        );
    }

    #[test]
    fn test_huge_expiration_never_expires() {
        let mut manager = ready();
        let mut toast = ToastTemplate::new(TemplateType::Text01);
        toast.set_first_line("Later").set_expiration(i64::MAX);

        let id = manager.show_toast(&toast).unwrap();
        assert_eq!(manager.outstanding(), vec![id]);
        assert!(manager.backend().toasts()[0].expires_at.is_none());
    }

    #[test]
    fn test_expiration_from_now_bounds() {
        assert!(expiration_from_now(0).is_none());
        assert!(expiration_from_now(-5).is_none());
        assert!(expiration_from_now(i64::MAX).is_none());
        assert!(expiration_from_now(1_000).is_some());
    }

    type DropLog = std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>;

    struct TrackedHandle(DropLog);

    impl Drop for TrackedHandle {
        fn drop(&mut self) {
            self.0.lock().unwrap().push("handle");
        }
    }

    /// Forwards to a [`MemoryBackend`] and logs when it and its handles drop.
    struct TrackedBackend {
        inner: MemoryBackend,
        log: DropLog,
    }

    impl Drop for TrackedBackend {
        fn drop(&mut self) {
            self.log.lock().unwrap().push("backend");
        }
    }

    impl ToastBackend for TrackedBackend {
        type Handle = TrackedHandle;

        fn is_compatible(&self) -> bool {
            self.inner.is_compatible()
        }

        fn supports_modern_features(&self) -> bool {
            self.inner.supports_modern_features()
        }

        fn ensure_com(&mut self) -> Result<(), PlatformError> {
            self.inner.ensure_com()
        }

        fn set_process_aumi(&mut self, aumi: &str) -> Result<(), PlatformError> {
            self.inner.set_process_aumi(aumi)
        }

        fn shortcut_exists(&self, path: &Path) -> bool {
            self.inner.shortcut_exists(path)
        }

        fn read_shortcut_aumi(&self, path: &Path) -> Result<Option<String>, PlatformError> {
            self.inner.read_shortcut_aumi(path)
        }

        fn write_shortcut_aumi(&mut self, path: &Path, aumi: &str) -> Result<(), PlatformError> {
            self.inner.write_shortcut_aumi(path, aumi)
        }

        fn create_shortcut(
            &mut self,
            path: &Path,
            target: &Path,
            aumi: &str,
        ) -> Result<(), PlatformError> {
            self.inner.create_shortcut(path, target, aumi)
        }

        fn create_toast(
            &mut self,
            aumi: &str,
            xml: &str,
            expires_at: Option<DateTime<Utc>>,
        ) -> Result<TrackedHandle, PlatformError> {
            self.inner.create_toast(aumi, xml, expires_at)?;
            Ok(TrackedHandle(self.log.clone()))
        }

        fn register_callbacks(
            &mut self,
            _handle: &TrackedHandle,
            _callbacks: ToastCallbacks,
        ) -> Result<(), PlatformError> {
            Ok(())
        }

        fn show(&mut self, _aumi: &str, _handle: &TrackedHandle) -> Result<(), PlatformError> {
            Ok(())
        }

        fn hide(&mut self, _aumi: &str, _handle: &TrackedHandle) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    #[test]
    fn test_drop_releases_handles_before_backend() {
        let log = DropLog::default();
        let mut manager = ToastManager::new(TrackedBackend {
            inner: MemoryBackend::new(),
            log: log.clone(),
        });
        manager.set_app_name("A-Soul");
        manager.set_app_user_model_id("skykey.qwintoast.example");
        manager.set_shortcut_dir(Some(PathBuf::from(LINKS)));
        manager.initialize().unwrap();
        manager.show_toast(&template()).unwrap();
        manager.show_toast(&template()).unwrap();

        drop(manager);
        assert_eq!(*log.lock().unwrap(), vec!["handle", "handle", "backend"]);
    }

    #[test]
    fn test_events_are_forwarded() {
        let mut manager = ready();
        let mut rx = manager.subscribe();
        let mut toast = template();
        toast.add_action("Yes").add_action("No");
        let id = manager.show_toast(&toast).unwrap();

        let callbacks = manager.backend().callbacks_for_id(id).unwrap().clone();
        callbacks.activated(Some("1"));
        callbacks.dismissed(DismissalReason::ApplicationHidden);
        callbacks.failed(None);

        assert_eq!(
            rx.try_recv().unwrap(),
            ToastEvent::Activated { id, action: Some(1) }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ToastEvent::Dismissed {
                id,
                reason: DismissalReason::ApplicationHidden
            }
        );
        assert_eq!(rx.try_recv().unwrap(), ToastEvent::Failed { id, error: None });
    }

    #[test]
    fn test_reinitialize_resets_state_on_failure() {
        let mut manager = ready();
        manager.set_app_user_model_id("");
        assert_eq!(manager.initialize(), Err(ToastError::InvalidParameters));
        assert_eq!(
            manager.show_toast(&template()),
            Err(ToastError::NotInitialized)
        );
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How strictly the Start-Menu shortcut carrying the AUMI is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutPolicy {
    /// Don't check, create, or modify a shortcut.
    Ignore,
    /// Require a shortcut with matching AUMI, don't create or modify an existing one.
    RequireNoCreate,
    /// Require a shortcut with matching AUMI, create if missing, modify if not matching.
    #[default]
    RequireCreate,
}

impl ShortcutPolicy {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "ignore" => Some(ShortcutPolicy::Ignore),
            "require_no_create" => Some(ShortcutPolicy::RequireNoCreate),
            "require_create" => Some(ShortcutPolicy::RequireCreate),
            _ => None,
        }
    }
}

/// Outcome of [`ToastManager::create_shortcut`](crate::ToastManager::create_shortcut).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutResult {
    Unchanged,
    WasChanged,
    WasCreated,
    MissingParameters,
    IncompatibleOs,
    ComInitFailure,
    CreateFailed,
}

impl ShortcutResult {
    /// Numeric code: non-negative on success.
    pub fn code(&self) -> i32 {
        match self {
            ShortcutResult::Unchanged => 0,
            ShortcutResult::WasChanged => 1,
            ShortcutResult::WasCreated => 2,
            ShortcutResult::MissingParameters => -1,
            ShortcutResult::IncompatibleOs => -2,
            ShortcutResult::ComInitFailure => -3,
            ShortcutResult::CreateFailed => -4,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code() >= 0
    }
}

const START_MENU_PROGRAMS: [&str; 4] = ["Microsoft", "Windows", "Start Menu", "Programs"];

/// `%APPDATA%\Microsoft\Windows\Start Menu\Programs`
pub fn default_shell_links_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| START_MENU_PROGRAMS.iter().fold(dir, |p, s| p.join(s)))
}

pub fn shell_link_path(links_dir: &Path, app_name: &str) -> PathBuf {
    links_dir.join(format!("{app_name}.lnk"))
}

//! Windows toast notifications for desktop applications.
//!
//! A [`ToastTemplate`] describes the content of one notification. A
//! [`ToastManager`] binds the process to an application identity, keeps the
//! Start-Menu shortcut carrying that identity in shape, posts templates as
//! toasts and re-publishes activation, dismissal and failure events on a
//! broadcast channel.
//!
//! ```no_run
//! use wintoast::{ToastManager, ToastTemplate, TemplateType, backend::MemoryBackend};
//!
//! let mut manager = ToastManager::new(MemoryBackend::new());
//! manager.set_app_name("Example");
//! manager.set_app_user_model_id(wintoast::configure_aumi("acme.", "example", "", ""));
//! manager.initialize()?;
//!
//! let mut template = ToastTemplate::new(TemplateType::Text02);
//! template.set_first_line("Build finished").set_second_line("No warnings");
//! let id = manager.show_toast(&template)?;
//! manager.hide_toast(id)?;
//! # Ok::<(), wintoast::ToastError>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod logging;
pub mod manager;
pub mod shortcut;
pub mod template;
pub mod xml;

pub use backend::ToastBackend;
pub use config::ToastConfig;
pub use error::{PlatformError, ToastError};
pub use events::{DismissalReason, ToastEvent, ToastEvents};
pub use identity::{AppIdentity, configure_aumi};
pub use manager::ToastManager;
pub use shortcut::{ShortcutPolicy, ShortcutResult};
pub use template::{
    AudioOption, AudioSystemFile, Duration, Scenario, TemplateType, TextField, ToastTemplate,
};

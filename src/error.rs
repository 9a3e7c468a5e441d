use thiserror::Error;

/// Why a toast operation failed.
///
/// Every variant describes which step of the platform call sequence went wrong.
/// None of them is retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastError {
    #[error("The library has not been initialized")]
    NotInitialized,

    #[error("The OS does not support toast notifications")]
    SystemNotSupported,

    #[error("The library was not able to create a Shell Link for the app")]
    ShellLinkNotCreated,

    #[error("The AUMI is not a valid one")]
    InvalidAppUserModelId,

    #[error(
        "The parameters used to configure the library are not valid normally because an invalid AUMI or App Name"
    )]
    InvalidParameters,

    #[error("The toast event handlers could not be registered")]
    InvalidHandler,

    #[error("The toast was created correctly but it could not be displayed")]
    NotDisplayed,

    #[error("No outstanding toast with id {0}")]
    UnknownToast(i64),

    #[error("Unknown error")]
    Unknown,
}

/// A failed call into the platform notification layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("platform call failed (0x{code:08X}): {message}")]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

impl PlatformError {
    /// Generic failure code (`E_FAIL`).
    pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Self::E_FAIL, message)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for PlatformError {
    fn from(value: windows::core::Error) -> Self {
        Self {
            code: value.code().0,
            message: value.message().to_string(),
        }
    }
}

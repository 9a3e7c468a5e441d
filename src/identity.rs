use crate::error::ToastError;

/// Longest AUMI the shell accepts.
pub const MAX_AUMI_LENGTH: usize = 128;

/// Composes an Application User Model ID from its parts.
///
/// The version is only appended when a sub-product is given. Results longer
/// than [`MAX_AUMI_LENGTH`] characters are truncated.
pub fn configure_aumi(company: &str, product: &str, sub_product: &str, version: &str) -> String {
    let mut aumi = format!("{company}{product}");
    if !sub_product.is_empty() {
        aumi.push_str(sub_product);
        if !version.is_empty() {
            aumi.push_str(version);
        }
    }

    let length = aumi.chars().count();
    if length > MAX_AUMI_LENGTH {
        tracing::warn!(
            target: "toast::identity",
            length,
            max = MAX_AUMI_LENGTH,
            "AUMI too long, truncating"
        );
        aumi = aumi.chars().take(MAX_AUMI_LENGTH).collect();
    }

    aumi
}

/// App name and AUMI the toasts are posted under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_name: String,
    pub aumi: String,
}

impl AppIdentity {
    pub fn new(app_name: impl Into<String>, aumi: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            aumi: aumi.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.app_name.is_empty() && !self.aumi.is_empty()
    }

    pub fn validate(&self) -> Result<(), ToastError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(ToastError::InvalidParameters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_aumi_parts() {
        assert_eq!(
            configure_aumi("skykey", "qwintoast", "example", "20210828"),
            "skykeyqwintoastexample20210828"
        );
        assert_eq!(configure_aumi("acme", "app", "", "1.0"), "acmeapp");
        assert_eq!(configure_aumi("acme", "app", "cli", ""), "acmeappcli");
    }

    #[test]
    fn test_configure_aumi_is_capped() {
        let long = "x".repeat(200);
        let aumi = configure_aumi(&long, "app", "", "");
        assert_eq!(aumi.chars().count(), MAX_AUMI_LENGTH);
    }

    #[test]
    fn test_identity_validation() {
        assert!(AppIdentity::new("App", "Acme.App").validate().is_ok());
        assert_eq!(
            AppIdentity::new("", "Acme.App").validate(),
            Err(ToastError::InvalidParameters)
        );
        assert_eq!(
            AppIdentity::new("App", "").validate(),
            Err(ToastError::InvalidParameters)
        );
    }
}

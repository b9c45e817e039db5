//! Registration configuration
//!
//! All settings are injected into the backend at construction time.
use crate::{
    Error, Site,
    normalize::{EmailNormalizer, default_normalizer},
};
use std::sync::Arc;

pub const DEFAULT_ACCOUNT_ACTIVATION_DAYS: i64 = 7;
pub const DEFAULT_FROM_EMAIL: &str = "webmaster@localhost";

#[derive(Clone)]
pub struct RegistrationConfig {
    /// Replaces the default trim + lowercase normalizer when set
    pub email_normalizer: Option<EmailNormalizer>,
    /// Days an activation key stays valid; passed to the email templates
    pub account_activation_days: i64,
    /// Sender address of the activation email, used verbatim
    pub default_from_email: String,
    /// The site registry. `Some` enables it and every email uses this site.
    pub site: Option<Site>,
    pub registration_open: bool,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            email_normalizer: None,
            account_activation_days: DEFAULT_ACCOUNT_ACTIVATION_DAYS,
            default_from_email: DEFAULT_FROM_EMAIL.to_string(),
            site: None,
            registration_open: true,
        }
    }
}

impl std::fmt::Debug for RegistrationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationConfig")
            .field(
                "email_normalizer",
                &self.email_normalizer.as_ref().map(|_| "custom"),
            )
            .field("account_activation_days", &self.account_activation_days)
            .field("default_from_email", &self.default_from_email)
            .field("site", &self.site)
            .field("registration_open", &self.registration_open)
            .finish()
    }
}

impl RegistrationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from the environment.
    ///
    /// | Variable                  | Setting                                 |
    /// | ------------------------- | --------------------------------------- |
    /// | `ACCOUNT_ACTIVATION_DAYS` | `account_activation_days`               |
    /// | `DEFAULT_FROM_EMAIL`      | `default_from_email`                    |
    /// | `SITE_DOMAIN`             | enables the site registry               |
    /// | `SITE_NAME`               | site name, defaults to the domain       |
    /// | `REGISTRATION_OPEN`       | `registration_open`                     |
    ///
    /// The normalizer override cannot come from the environment; set it with
    /// [`RegistrationConfig::with_email_normalizer`].
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(days) = lookup("ACCOUNT_ACTIVATION_DAYS") {
            config.account_activation_days = days.trim().parse().map_err(|_| {
                Error::Config(format!("Invalid ACCOUNT_ACTIVATION_DAYS: {days}"))
            })?;
        }

        if let Some(from) = lookup("DEFAULT_FROM_EMAIL") {
            config.default_from_email = from;
        }

        if let Some(domain) = lookup("SITE_DOMAIN") {
            let name = lookup("SITE_NAME").unwrap_or_else(|| domain.clone());
            config.site = Some(Site::new(domain, name));
        }

        if let Some(open) = lookup("REGISTRATION_OPEN") {
            config.registration_open = match open.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(Error::Config(format!("Invalid REGISTRATION_OPEN: {open}")));
                }
            };
        }

        Ok(config)
    }

    pub fn with_email_normalizer<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.email_normalizer = Some(Arc::new(normalizer));
        self
    }

    pub fn with_account_activation_days(mut self, days: i64) -> Self {
        self.account_activation_days = days;
        self
    }

    pub fn with_default_from_email<S: Into<String>>(mut self, from: S) -> Self {
        self.default_from_email = from.into();
        self
    }

    pub fn with_site(mut self, site: Site) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_registration_open(mut self, open: bool) -> Self {
        self.registration_open = open;
        self
    }

    pub fn sites_enabled(&self) -> bool {
        self.site.is_some()
    }

    /// The configured normalizer, or the default one
    pub fn normalizer(&self) -> EmailNormalizer {
        self.email_normalizer
            .clone()
            .unwrap_or_else(default_normalizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistrationConfig::default();
        assert_eq!(config.account_activation_days, 7);
        assert_eq!(config.default_from_email, "webmaster@localhost");
        assert!(!config.sites_enabled());
        assert!(config.registration_open);
        assert_eq!((config.normalizer())(" A@B.COM "), "a@b.com");
    }

    #[test]
    fn test_from_lookup() {
        let config = RegistrationConfig::from_lookup(lookup(&[
            ("ACCOUNT_ACTIVATION_DAYS", "3"),
            ("DEFAULT_FROM_EMAIL", "noreply@example.com"),
            ("SITE_DOMAIN", "example.com"),
            ("SITE_NAME", "Example"),
            ("REGISTRATION_OPEN", "false"),
        ]))
        .unwrap();

        assert_eq!(config.account_activation_days, 3);
        assert_eq!(config.default_from_email, "noreply@example.com");
        assert_eq!(config.site, Some(Site::new("example.com", "Example")));
        assert!(!config.registration_open);
    }

    #[test]
    fn test_site_name_defaults_to_domain() {
        let config =
            RegistrationConfig::from_lookup(lookup(&[("SITE_DOMAIN", "example.com")])).unwrap();
        assert_eq!(config.site, Some(Site::new("example.com", "example.com")));
    }

    #[test]
    fn test_invalid_activation_days() {
        let result =
            RegistrationConfig::from_lookup(lookup(&[("ACCOUNT_ACTIVATION_DAYS", "seven")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_normalizer_override() {
        let config = RegistrationConfig::new().with_email_normalizer(|email| email.to_string());
        assert_eq!((config.normalizer())(" Mixed@Case.COM"), " Mixed@Case.COM");
    }
}

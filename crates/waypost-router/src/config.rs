//! Router configuration
//!
//! Two layers, in the usual file → runtime split:
//! - [`RouterToml`] is what `waypost.toml` deserializes into. Every field is
//!   optional; a missing or empty file yields the defaults.
//! - [`RouterSettings`] is the validated runtime form handed to the router.
//!
//! ```toml
//! [router]
//! base = "app"
//! uid_seed = 42
//! opt_out_attribute = "data-router-ignore"
//! link_fallback = "#not-found"
//!
//! [router.errors]
//! 404 = "I cannot find that page"
//! ```

use crate::error::ErrorPayload;
use crate::path::normalize_base;
use crate::route::{Component, RouteSpec};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "waypost.toml";

/// Attribute that makes the router leave an anchor alone
pub const DEFAULT_OPT_OUT_ATTRIBUTE: &str = "data-router-ignore";

/// Returned by `link_or_fallback` when a link cannot be built
pub const DEFAULT_LINK_FALLBACK: &str = "#not-found";

/// Status used for loader and hook failures
pub const INTERNAL_ERROR_STATUS: u16 = 500;

fn default_error_messages() -> HashMap<u16, String> {
    [
        (400, "Bad Request"),
        (401, "Unauthorized"),
        (403, "Forbidden"),
        (404, "Not Found"),
        (INTERNAL_ERROR_STATUS, "Internal Error"),
    ]
    .into_iter()
    .map(|(status, message)| (status, message.to_string()))
    .collect()
}

// ============================================================================
// Runtime settings
// ============================================================================

/// Validated router settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSettings {
    /// Normalized base path (`/app`), `None` when routes live at the root
    pub base: Option<String>,
    /// Default message per status code
    pub errors: HashMap<u16, String>,
    /// Seed for generated route names; `None` draws a random seed
    pub uid_seed: Option<u64>,
    pub opt_out_attribute: String,
    pub link_fallback: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            base: None,
            errors: default_error_messages(),
            uid_seed: None,
            opt_out_attribute: DEFAULT_OPT_OUT_ATTRIBUTE.to_string(),
            link_fallback: DEFAULT_LINK_FALLBACK.to_string(),
        }
    }
}

impl RouterSettings {
    /// Loads settings from a TOML file (missing or empty file → defaults)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        RouterToml::load(path)?.to_settings()
    }

    /// Loads settings from `./waypost.toml`
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    /// Sets the base path; `"app"`, `"/app/"` and `"/app"` are equivalent
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = normalize_base(base);
        self
    }

    /// Overrides the default message for one status code
    pub fn with_error_message(mut self, status: u16, message: impl Into<String>) -> Self {
        self.errors.insert(status, message.into());
        self
    }

    pub fn with_uid_seed(mut self, seed: u64) -> Self {
        self.uid_seed = Some(seed);
        self
    }

    pub fn with_opt_out_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.opt_out_attribute = attribute.into();
        self
    }

    pub fn with_link_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.link_fallback = fallback.into();
        self
    }

    /// Message configured for `status`
    ///
    /// Unknown codes fall back to the internal-error message.
    pub fn error_message(&self, status: u16) -> String {
        self.errors
            .get(&status)
            .or_else(|| self.errors.get(&INTERNAL_ERROR_STATUS))
            .cloned()
            .unwrap_or_else(|| "Internal Error".to_string())
    }

    /// Fills an empty payload message from the configured defaults
    pub fn complete(&self, payload: ErrorPayload) -> ErrorPayload {
        if payload.message.is_empty() {
            ErrorPayload::new(payload.status, self.error_message(payload.status))
        } else {
            payload
        }
    }
}

// ============================================================================
// File form
// ============================================================================

/// Contents of `waypost.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterToml {
    #[serde(default)]
    pub router: RouterSection,
}

/// The `[router]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterSection {
    #[serde(default)]
    pub base: Option<String>,

    #[serde(default)]
    pub uid_seed: Option<u64>,

    #[serde(default)]
    pub opt_out_attribute: Option<String>,

    #[serde(default)]
    pub link_fallback: Option<String>,

    /// `[router.errors]`: status code → message, keys as written in TOML
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

impl RouterToml {
    /// Reads `path`; a missing or blank file means "all defaults"
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };

        if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        }
    }

    /// Convert to runtime settings
    pub fn to_settings(&self) -> Result<RouterSettings> {
        let section = &self.router;
        let mut settings = RouterSettings {
            base: section.base.as_deref().and_then(normalize_base),
            uid_seed: section.uid_seed,
            ..RouterSettings::default()
        };

        if let Some(attribute) = &section.opt_out_attribute {
            if attribute.trim().is_empty() {
                return Err(anyhow!("router.opt_out_attribute must not be empty"));
            }
            settings.opt_out_attribute = attribute.clone();
        }
        if let Some(fallback) = &section.link_fallback {
            settings.link_fallback = fallback.clone();
        }

        for (key, message) in &section.errors {
            let status = parse_status(key)?;
            settings.errors.insert(status, message.clone());
        }

        Ok(settings)
    }
}

fn parse_status(key: &str) -> Result<u16> {
    let status: u16 = key
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid status code in [router.errors]: {:?}", key))?;

    if !(100..=599).contains(&status) {
        return Err(anyhow!("Status code out of range in [router.errors]: {}", status));
    }
    Ok(status)
}

// ============================================================================
// Initialization input
// ============================================================================

/// Everything `Router::initialize` needs
pub struct RouterConfig<C> {
    pub routes: Vec<RouteSpec<C>>,
    pub settings: RouterSettings,
    /// Rendered around every route
    pub layout: Option<Component<C>>,
}

impl<C> RouterConfig<C> {
    pub fn new(routes: Vec<RouteSpec<C>>) -> Self {
        Self {
            routes,
            settings: RouterSettings::default(),
            layout: None,
        }
    }

    pub fn with_settings(mut self, settings: RouterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Root layout, wrapping every page
    pub fn with_layout(mut self, layout: C) -> Self {
        self.layout = Some(Component::Sync(layout));
        self
    }

    pub fn with_layout_component(mut self, layout: Component<C>) -> Self {
        self.layout = Some(layout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RouterSettings::default();
        assert_eq!(settings.base, None);
        assert_eq!(settings.error_message(404), "Not Found");
        assert_eq!(settings.error_message(400), "Bad Request");
        assert_eq!(settings.error_message(401), "Unauthorized");
        assert_eq!(settings.error_message(403), "Forbidden");
        assert_eq!(settings.opt_out_attribute, "data-router-ignore");
        assert_eq!(settings.link_fallback, "#not-found");
    }

    #[test]
    fn test_unknown_status_uses_internal_message() {
        let settings = RouterSettings::default();
        assert_eq!(settings.error_message(418), "Internal Error");
    }

    #[test]
    fn test_empty_config() {
        let settings = toml::from_str::<RouterToml>("")
            .unwrap()
            .to_settings()
            .unwrap();
        assert_eq!(settings, RouterSettings::default());
    }

    #[test]
    fn test_router_table() {
        let toml = r##"
            [router]
            base = "app/"
            uid_seed = 42
            link_fallback = "#missing"

            [router.errors]
            404 = "I cannot find that page"
        "##;
        let settings = toml::from_str::<RouterToml>(toml)
            .unwrap()
            .to_settings()
            .unwrap();

        assert_eq!(settings.base.as_deref(), Some("/app"));
        assert_eq!(settings.uid_seed, Some(42));
        assert_eq!(settings.link_fallback, "#missing");
        assert_eq!(settings.error_message(404), "I cannot find that page");
        assert_eq!(settings.error_message(403), "Forbidden");
    }

    #[test]
    fn test_non_numeric_error_key() {
        let toml = r#"
            [router.errors]
            missing = "nope"
        "#;
        let err = toml::from_str::<RouterToml>(toml)
            .unwrap()
            .to_settings()
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_empty_opt_out_attribute_rejected() {
        let toml = r#"
            [router]
            opt_out_attribute = " "
        "#;
        assert!(toml::from_str::<RouterToml>(toml)
            .unwrap()
            .to_settings()
            .is_err());
    }

    #[test]
    fn test_root_base_is_none() {
        assert_eq!(RouterSettings::default().with_base("/").base, None);
        assert_eq!(RouterSettings::default().with_base("").base, None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("waypost-config-does-not-exist.toml");
        let settings = RouterSettings::load(&path).unwrap();
        assert_eq!(settings, RouterSettings::default());
    }

    #[test]
    fn test_blank_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("waypost-blank-{}.toml", std::process::id()));
        fs::write(&path, "  \n\n").unwrap();

        let settings = RouterSettings::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings, RouterSettings::default());
    }

    #[test]
    fn test_malformed_file_names_the_path() {
        let path = std::env::temp_dir().join(format!("waypost-broken-{}.toml", std::process::id()));
        fs::write(&path, "[router\n").unwrap();

        let err = RouterSettings::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(err.to_string().contains("waypost-broken"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("waypost-config-{}.toml", std::process::id()));
        fs::write(&path, "[router]\nbase = \"/docs\"\n").unwrap();

        let settings = RouterSettings::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.base.as_deref(), Some("/docs"));
    }

    #[test]
    fn test_complete_fills_empty_message() {
        let settings = RouterSettings::default().with_error_message(401, "Sign in first");
        assert_eq!(
            settings.complete(ErrorPayload::from(401)),
            ErrorPayload::new(401, "Sign in first")
        );
        assert_eq!(
            settings.complete(ErrorPayload::new(401, "custom")),
            ErrorPayload::new(401, "custom")
        );
    }
}

//! Suite configuration
//!
//! Values come from environment variables with fixed fallbacks. The config is
//! read once and handed to whatever builds the suite; nothing below this module
//! touches the environment.

use serde::{Deserialize, Serialize};

/// Default portal URL when `BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "https://smb.pie.portalshell.int.hp.com";

/// Default staging URL when `STAGE_URL` is unset
pub const DEFAULT_STAGE_URL: &str = "https://smb.stage.portalshell.int.hp.com";

/// Environment variable names
pub mod env_keys {
    /// Portal base URL
    pub const BASE_URL: &str = "BASE_URL";
    /// Staging URL
    pub const STAGE_URL: &str = "STAGE_URL";
    /// Login user
    pub const USERNAME: &str = "PORTAL_USERNAME";
    /// Login password
    pub const PASSWORD: &str = "PORTAL_PASSWORD";
    /// Chromium executable for the browser backend
    pub const CHROMIUM_PATH: &str = "CHROMIUM_PATH";
    /// `0`/`false` to run the browser with a visible window
    pub const HEADLESS: &str = "PORTAL_HEADLESS";
}

/// Portal endpoints and credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal base URL
    pub base_url: String,
    /// Staging URL
    pub stage_url: String,
    /// Login user (may be empty)
    pub username: String,
    /// Login password (may be empty)
    pub password: String,
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("base_url", &self.base_url)
            .field("stage_url", &self.stage_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stage_url: DEFAULT_STAGE_URL.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl PortalConfig {
    /// Read the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup
    ///
    /// Every fallback to a default is logged at WARN so a run against the
    /// built-in URLs is never silent.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: value_or_default(&lookup, env_keys::BASE_URL, defaults.base_url, true),
            stage_url: value_or_default(&lookup, env_keys::STAGE_URL, defaults.stage_url, true),
            username: value_or_default(&lookup, env_keys::USERNAME, defaults.username, false),
            password: value_or_default(&lookup, env_keys::PASSWORD, defaults.password, false),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the staging URL
    #[must_use]
    pub fn with_stage_url(mut self, url: impl Into<String>) -> Self {
        self.stage_url = url.into();
        self
    }

    /// Set login credentials
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Whether both username and password are set
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

fn value_or_default<F>(lookup: &F, key: &str, default: String, show_default: bool) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value,
        None => {
            if show_default {
                tracing::warn!(key, default = %default, "environment variable unset, using default");
            } else {
                tracing::warn!(key, "environment variable unset, using empty default");
            }
            default
        }
    }
}

/// Browser launch options for the CDP backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}

impl BrowserOptions {
    /// Read browser options from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read browser options through an arbitrary key lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        options.chromium_path = lookup(env_keys::CHROMIUM_PATH);
        if let Some(flag) = lookup(env_keys::HEADLESS) {
            options.headless = !matches!(flag.trim(), "0" | "false" | "no");
        }
        options
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracing_support::{CapturedEvent, LogCapture};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod portal_config_tests {
        use super::*;

        #[test]
        fn test_defaults_when_env_empty() {
            let config = PortalConfig::from_lookup(|_| None);
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.stage_url, DEFAULT_STAGE_URL);
            assert!(config.username.is_empty());
            assert!(config.password.is_empty());
            assert!(!config.has_credentials());
        }

        #[test]
        fn test_env_overrides_defaults() {
            let config = PortalConfig::from_lookup(lookup_from(&[
                ("BASE_URL", "https://portal.local"),
                ("PORTAL_USERNAME", "admin"),
                ("PORTAL_PASSWORD", "hunter2"),
            ]));
            assert_eq!(config.base_url, "https://portal.local");
            assert_eq!(config.stage_url, DEFAULT_STAGE_URL);
            assert_eq!(config.username, "admin");
            assert!(config.has_credentials());
        }

        fn warnings(capture: &LogCapture) -> Vec<CapturedEvent> {
            capture
                .events()
                .into_iter()
                .filter(|event| event.level == tracing::Level::WARN)
                .collect()
        }

        #[test]
        fn test_each_unset_url_logs_a_warning() {
            let capture = LogCapture::new();
            let config = capture.run(|| {
                PortalConfig::from_lookup(lookup_from(&[
                    ("PORTAL_USERNAME", "admin"),
                    ("PORTAL_PASSWORD", "hunter2"),
                ]))
            });
            assert_eq!(config.base_url, DEFAULT_BASE_URL);

            let warned = warnings(&capture);
            assert_eq!(warned.len(), 2);
            assert_eq!(warned[0].field("key"), Some("BASE_URL"));
            assert_eq!(warned[0].field("default"), Some(DEFAULT_BASE_URL));
            assert_eq!(warned[1].field("key"), Some("STAGE_URL"));
            assert_eq!(warned[1].field("default"), Some(DEFAULT_STAGE_URL));
        }

        #[test]
        fn test_unset_credentials_warn_without_value() {
            let capture = LogCapture::new();
            capture.run(|| {
                PortalConfig::from_lookup(lookup_from(&[
                    ("BASE_URL", "https://portal.local"),
                    ("STAGE_URL", "https://stage.local"),
                ]))
            });
            let keys: Vec<_> = warnings(&capture)
                .iter()
                .map(|event| event.field("key").map(str::to_string))
                .collect();
            assert_eq!(
                keys,
                vec![Some("PORTAL_USERNAME".to_string()), Some("PORTAL_PASSWORD".to_string())]
            );
        }

        #[test]
        fn test_no_warning_when_everything_is_set() {
            let capture = LogCapture::new();
            capture.run(|| {
                PortalConfig::from_lookup(lookup_from(&[
                    ("BASE_URL", "https://portal.local"),
                    ("STAGE_URL", "https://stage.local"),
                    ("PORTAL_USERNAME", "admin"),
                    ("PORTAL_PASSWORD", "hunter2"),
                ]))
            });
            assert!(warnings(&capture).is_empty());
        }

        #[test]
        fn test_debug_redacts_password() {
            let config = PortalConfig::default().with_credentials("admin", "hunter2");
            let debug = format!("{config:?}");
            assert!(debug.contains("admin"));
            assert!(!debug.contains("hunter2"));
        }

        #[test]
        fn test_builders() {
            let config = PortalConfig::default()
                .with_base_url("http://a")
                .with_stage_url("http://b");
            assert_eq!(config.base_url, "http://a");
            assert_eq!(config.stage_url, "http://b");
        }
    }

    mod browser_options_tests {
        use super::*;

        #[test]
        fn test_default_is_headless() {
            let options = BrowserOptions::from_lookup(|_| None);
            assert!(options.headless);
            assert!(options.sandbox);
            assert_eq!(options.chromium_path, None);
        }

        #[test]
        fn test_headless_flag_parsing() {
            let options = BrowserOptions::from_lookup(lookup_from(&[
                ("PORTAL_HEADLESS", "false"),
                ("CHROMIUM_PATH", "/usr/bin/chromium"),
            ]));
            assert!(!options.headless);
            assert_eq!(options.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        }

        #[test]
        fn test_builders() {
            let options = BrowserOptions::default()
                .with_headless(false)
                .with_no_sandbox()
                .with_viewport(800, 600);
            assert!(!options.headless);
            assert!(!options.sandbox);
            assert_eq!((options.viewport_width, options.viewport_height), (800, 600));
        }
    }
}

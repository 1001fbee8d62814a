//! WebDriver surface configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::wait::Poller;

/// Configuration for driving the console through a WebDriver endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// URL of the running WebDriver server (chromedriver).
    pub webdriver_url: String,
    /// Browser executable; the driver's default when unset.
    pub chrome_binary: Option<PathBuf>,
    /// Browser profile directory, kept between runs so the console login
    /// survives.
    pub user_data_dir: Option<PathBuf>,
    /// How long to wait for an element to appear, in milliseconds.
    pub element_timeout_ms: u64,
    /// Delay between element polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            chrome_binary: None,
            user_data_dir: None,
            element_timeout_ms: 5000,
            poll_interval_ms: 250,
        }
    }
}

impl WebDriverConfig {
    #[must_use]
    pub fn poller(&self) -> Poller {
        Poller {
            timeout: Duration::from_millis(self.element_timeout_ms),
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// W3C capabilities for a Chrome session.
    ///
    /// Images are disabled to speed up the admin pages.
    #[must_use]
    pub fn capabilities(&self) -> Value {
        let mut args = vec![
            "--disable-extensions".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--window-size=1920,1080".to_string(),
        ];
        if let Some(dir) = &self.user_data_dir {
            args.insert(0, format!("--user-data-dir={}", dir.display()));
        }
        let mut options = json!({
            "args": args,
            "prefs": { "profile.managed_default_content_settings.images": 2 },
        });
        if let Some(binary) = &self.chrome_binary {
            options["binary"] = json!(binary.display().to_string());
        }
        json!({
            "browserName": "chrome",
            "goog:chromeOptions": options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = WebDriverConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.element_timeout_ms, 5000);
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.chrome_binary.is_none());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            webdriver_url = "http://chromedriver:4444"
            chrome_binary = "/opt/chrome/chrome"
            user_data_dir = "/var/lib/leadrouter/profile"
            element_timeout_ms = 8000
            poll_interval_ms = 100
        "#;
        let config: WebDriverConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.webdriver_url, "http://chromedriver:4444");
        assert_eq!(config.chrome_binary, Some(PathBuf::from("/opt/chrome/chrome")));
        assert_eq!(config.element_timeout_ms, 8000);
        assert_eq!(config.poller().interval, Duration::from_millis(100));
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: WebDriverConfig = toml::from_str(r#"element_timeout_ms = 1000"#).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.poller().timeout, Duration::from_secs(1));
    }

    #[test]
    fn should_build_chrome_capabilities_with_profile_and_binary() {
        let config = WebDriverConfig {
            chrome_binary: Some(PathBuf::from("/usr/bin/chromium")),
            user_data_dir: Some(PathBuf::from("/tmp/profile")),
            ..WebDriverConfig::default()
        };
        let caps = config.capabilities();
        let options = &caps["goog:chromeOptions"];
        assert_eq!(caps["browserName"], "chrome");
        assert_eq!(options["binary"], "/usr/bin/chromium");
        assert_eq!(options["args"][0], "--user-data-dir=/tmp/profile");
        assert_eq!(
            options["prefs"]["profile.managed_default_content_settings.images"],
            2
        );
    }

    #[test]
    fn should_omit_binary_when_unset() {
        let caps = WebDriverConfig::default().capabilities();
        assert!(caps["goog:chromeOptions"].get("binary").is_none());
    }
}

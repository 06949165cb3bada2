use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};
use crate::render::Template;
use crate::{CertError, Result};

pub const MAX_PIXEL_RATIO: f32 = 4.0;

/// Runtime settings. Every field has a default, so a config file only needs
/// to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Url,
    pub user_agent: String,
    /// Device pixels per layout pixel in exported images.
    pub pixel_ratio: f32,
    pub template: Template,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL)
                .expect("default API base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            pixel_ratio: 1.0,
            template: Template::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Loading config from {}", path.as_ref().display());
        let bytes = fs::read(path.as_ref())?;
        let config: Config = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pixel_ratio > 0.0 && self.pixel_ratio <= MAX_PIXEL_RATIO) {
            return Err(CertError::Config(format!(
                "pixel_ratio must be in (0, {}], got {}",
                MAX_PIXEL_RATIO, self.pixel_ratio
            )));
        }
        if self.api_base_url.cannot_be_a_base() {
            return Err(CertError::Config(format!(
                "{} cannot be used as an API base",
                self.api_base_url
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CertError::Config("user_agent is empty".to_owned()));
        }
        if StrftimeItems::new(&self.template.date_format)
            .any(|item| matches!(item, Item::Error))
        {
            return Err(CertError::Config(format!(
                "invalid date_format {:?}",
                self.template.date_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempdir::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://api.github.com/");
        assert_eq!(config.template.issuer_name, "[Your Project Name]");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new("gh_certificate_test").unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"pixel_ratio": 2, "template": {"issuer_name": "Rustaceans"}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.template.issuer_name, "Rustaceans");
        assert_eq!(config.template.title, "Certificate of Appreciation");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = TempDir::new("gh_certificate_test").unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(CertError::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new("gh_certificate_test").unwrap();
        assert!(matches!(
            Config::load(dir.path().join("absent.json")),
            Err(CertError::Io(_))
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(4.5)]
    #[case(f32::NAN)]
    fn rejects_bad_pixel_ratio(#[case] pixel_ratio: f32) {
        let config = Config {
            pixel_ratio,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CertError::Config(_))));
    }

    #[test]
    fn rejects_bad_date_format() {
        let mut config = Config::default();
        config.template.date_format = "%Q".to_owned();
        assert!(matches!(config.validate(), Err(CertError::Config(_))));
    }
}

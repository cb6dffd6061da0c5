//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::theme::Theme;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,

    // Directory
    pub content_dir: String,
    pub assets_dir: String,

    // Contact
    pub messages_file: String,

    // Appearance
    pub default_theme: Theme,

    // Checkout
    #[serde(default)]
    pub checkout: CheckoutConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Settings for the one-off checkout product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub product: String,
    pub currency: String,
    /// Price in the currency's minor unit
    pub unit_amount: u32,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            product: "Coffee".to_string(),
            currency: "eur".to_string(),
            unit_amount: 200,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),

            content_dir: "posts".to_string(),
            assets_dir: "assets".to_string(),

            messages_file: "messages.ndjson".to_string(),

            default_theme: Theme::Dark,

            checkout: CheckoutConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize the configuration back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "posts");
        assert_eq!(config.default_theme, Theme::Dark);
        assert_eq!(config.checkout.unit_amount, 200);
    }

    #[test]
    fn test_load_partial_yaml() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            tmp.path(),
            "title: Max's Blog\ndefault_theme: light\ncheckout:\n  product: Tea\n",
        )
        .unwrap();

        let config = SiteConfig::load(tmp.path()).unwrap();
        assert_eq!(config.title, "Max's Blog");
        assert_eq!(config.default_theme, Theme::Light);
        assert_eq!(config.checkout.product, "Tea");
        // Unset keys keep their defaults
        assert_eq!(config.content_dir, "posts");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = SiteConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: SiteConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.title, config.title);
    }
}

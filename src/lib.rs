//! folio-rs: a personal blog and portfolio site server
//!
//! Posts live on disk as one folder per slug, each holding a markdown
//! document with YAML front-matter and the post's images. The content
//! pipeline loads those into `Post` records and renders them into themed
//! HTML; the server wraps the pipeline with listing pages, a contact form,
//! a theme toggle, and a checkout flow.

pub mod checkout;
pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod server;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::Path;

use content::PostStore;

/// The site application: configuration plus resolved paths
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content root (one directory per post)
    pub content_dir: std::path::PathBuf,
    /// Static asset root
    pub assets_dir: std::path::PathBuf,
    /// Contact message store file
    pub messages_path: std::path::PathBuf,
}

impl Site {
    /// Create a site from a base directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let assets_dir = base_dir.join(&config.assets_dir);
        let messages_path = base_dir.join(&config.messages_file);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            assets_dir,
            messages_path,
        })
    }

    /// Post store over the site's content root
    pub fn store(&self) -> PostStore {
        PostStore::new(&self.content_dir)
    }
}

//! Post store - loads posts from the content root
//!
//! The content root holds one directory per post, keyed by slug, with the
//! post document at `<root>/<slug>/<slug>.md` and companion images alongside
//! it. Breaking that convention fails the load.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{FrontMatter, Post};

/// Loader failure taxonomy
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("post not found: {0}")]
    NotFound(String),

    #[error("failed to parse post `{slug}`: {reason}")]
    Parse { slug: String, reason: String },

    #[error("content root unavailable: {path}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads posts from the content root directory
pub struct PostStore {
    content_dir: PathBuf,
}

impl PostStore {
    /// Create a store over a content root
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
        }
    }

    /// List available post identifiers (the slugs of the content root's
    /// per-post directories).
    pub fn list_identifiers(&self) -> Result<Vec<String>, ContentError> {
        // Surface an unreadable root as StorageUnavailable rather than an
        // empty listing.
        fs::read_dir(&self.content_dir).map_err(|e| ContentError::StorageUnavailable {
            path: self.content_dir.clone(),
            source: e,
        })?;

        let mut identifiers = Vec::new();
        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    identifiers.push(name.to_string());
                }
            }
        }

        Ok(identifiers)
    }

    /// Load a single post by identifier. A trailing `.md` on the identifier
    /// is stripped, so `my-post` and `my-post.md` name the same post.
    pub fn load_post(&self, identifier: &str) -> Result<Post, ContentError> {
        let slug = identifier.trim_end_matches(".md").to_string();

        // Identifiers come straight off the URL; anything that could step
        // outside the content root is treated as a post that does not exist.
        if slug.is_empty() || slug.contains(['/', '\\']) || slug.contains("..") {
            return Err(ContentError::NotFound(slug));
        }

        let path = self.content_dir.join(&slug).join(format!("{}.md", slug));

        if !path.is_file() {
            return Err(ContentError::NotFound(slug));
        }

        let raw = fs::read_to_string(&path).map_err(|e| ContentError::StorageUnavailable {
            path: path.clone(),
            source: e,
        })?;

        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| ContentError::Parse {
            slug: slug.clone(),
            reason: e.to_string(),
        })?;

        let date = fm.require_date().map_err(|e| ContentError::Parse {
            slug: slug.clone(),
            reason: e.to_string(),
        })?;

        let title = fm.title.unwrap_or_else(|| slug.clone());

        let mut post = Post::new(slug, title, date);
        post.excerpt = fm.excerpt;
        post.image = fm.image;
        post.is_featured = fm.is_featured;
        post.content = body.to_string();
        post.extra = fm.extra;

        Ok(post)
    }

    /// Load every post, ordered by descending date (most recent first).
    ///
    /// A single malformed post fails the whole listing; a post silently
    /// vanishing from the index is the worse failure mode. Run `check` to
    /// locate the offending document.
    pub fn all_posts(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts = Vec::new();
        for identifier in self.list_identifiers()? {
            let post = self.load_post(&identifier).inspect_err(|e| {
                tracing::error!("failed to load post {}: {}", identifier, e);
            })?;
            posts.push(post);
        }

        // Sort by date descending (newest first)
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(posts)
    }

    /// Featured posts: a pure filter over `all_posts`, same order.
    pub fn featured_posts(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts = self.all_posts()?;
        posts.retain(|p| p.is_featured);
        Ok(posts)
    }
}

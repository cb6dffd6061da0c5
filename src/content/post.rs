//! Post model

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A blog post loaded from the content store.
///
/// Records are built fresh on every load and never mutated afterwards;
/// every downstream consumer treats them as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier, doubling as the storage folder name and URL segment
    pub slug: String,

    /// Post title
    pub title: String,

    /// Short summary shown in listing views
    pub excerpt: Option<String>,

    /// Publication date
    pub date: DateTime<Local>,

    /// Cover image filename, relative to the post's asset folder
    pub image: Option<String>,

    /// Whether the post appears in the featured listing
    pub is_featured: bool,

    /// Raw markdown body (front-matter stripped)
    pub content: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a post with minimal required fields
    pub fn new(slug: String, title: String, date: DateTime<Local>) -> Self {
        Self {
            slug,
            title,
            excerpt: None,
            date,
            image: None,
            is_featured: false,
            content: String::new(),
            extra: HashMap::new(),
        }
    }

    /// Path of the cover image under the public asset root
    pub fn image_path(&self, asset_root: &str) -> Option<String> {
        self.image
            .as_ref()
            .map(|img| format!("{}/{}/{}", asset_root.trim_end_matches('/'), self.slug, img))
    }

    /// Get the previous (more recent) post in a date-descending list
    pub fn prev<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos > 0 {
            Some(&posts[pos - 1])
        } else {
            None
        }
    }

    /// Get the next (older) post in a date-descending list
    pub fn next<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos < posts.len() - 1 {
            Some(&posts[pos + 1])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(slug: &str, day: u32) -> Post {
        Post::new(
            slug.to_string(),
            slug.to_string(),
            Local.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_image_path() {
        let mut p = post("getting-started", 1);
        p.image = Some("cover.png".to_string());
        assert_eq!(
            p.image_path("/assets/img/posts"),
            Some("/assets/img/posts/getting-started/cover.png".to_string())
        );
    }

    #[test]
    fn test_prev_next_navigation() {
        let posts = vec![post("c", 3), post("b", 2), post("a", 1)];
        assert_eq!(posts[1].prev(&posts).unwrap().slug, "c");
        assert_eq!(posts[1].next(&posts).unwrap().slug, "a");
        assert!(posts[0].prev(&posts).is_none());
        assert!(posts[2].next(&posts).is_none());
    }
}

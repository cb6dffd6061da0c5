//! Create a new post

use anyhow::Result;
use std::fs;

use crate::Site;

/// Create `posts/<slug>/<slug>.md` with a front-matter skeleton.
/// The slug is derived from the title; the folder doubles as the post's
/// asset directory.
pub fn run(site: &Site, title: &str) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title produces an empty slug: {:?}", title);
    }

    let post_dir = site.content_dir.join(&slug);
    let file_path = post_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("Post already exists: {:?}", file_path);
    }

    fs::create_dir_all(&post_dir)?;

    let content = format!(
        "---\ntitle: {}\nexcerpt: ''\ndate: {}\nisFeatured: false\n---\n\n",
        title,
        now.format("%Y-%m-%d")
    );
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_post_round_trips_through_store() {
        let tmp = TempDir::new().unwrap();
        crate::commands::init::init_site(tmp.path()).unwrap();
        let site = Site::new(tmp.path()).unwrap();

        run(&site, "Getting Started with Rust").unwrap();

        let store = site.store();
        let post = store.load_post("getting-started-with-rust").unwrap();
        assert_eq!(post.title, "Getting Started with Rust");
        assert!(!post.is_featured);
    }

    #[test]
    fn test_new_refuses_duplicate() {
        let tmp = TempDir::new().unwrap();
        crate::commands::init::init_site(tmp.path()).unwrap();
        let site = Site::new(tmp.path()).unwrap();

        run(&site, "Once").unwrap();
        assert!(run(&site, "Once").is_err());
    }
}

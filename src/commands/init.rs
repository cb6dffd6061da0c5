//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Scaffold a site in the given directory: config, content root with a
/// welcome post in the dir-per-slug layout, and the asset tree.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("assets/img/posts"))?;
    fs::create_dir_all(target_dir.join("assets/css"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Already a site: {:?} exists", config_path);
    }

    let config_content = r#"# Site
title: My Blog
description: ''
author: John Doe
language: en

# URL
url: http://localhost:4000

# Directory
content_dir: posts
assets_dir: assets

# Contact
messages_file: messages.ndjson

# Appearance
default_theme: dark

# Checkout
checkout:
  product: Coffee
  currency: eur
  unit_amount: 200
"#;
    fs::write(&config_path, config_content)?;

    // Welcome post under posts/welcome/welcome.md
    let welcome_dir = target_dir.join("posts/welcome");
    fs::create_dir_all(&welcome_dir)?;
    let welcome = format!(
        r#"---
title: Welcome
excerpt: Your first post.
date: {}
isFeatured: true
---

# Welcome

This post lives at `posts/welcome/welcome.md`. Put its images next to it
and reference them by filename:

```md
![A caption](diagram.png)
```
"#,
        chrono::Local::now().format("%Y-%m-%d")
    );
    fs::write(welcome_dir.join("welcome.md"), welcome)?;

    let css = r#"body { max-width: 46rem; margin: 0 auto; font-family: sans-serif; }
body.dark { background: #1c1f26; color: #e8e8e8; }
body.light { background: #fcfcfc; color: #1c1f26; }
.posts-grid { list-style: none; display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; padding: 0; }
.image-container { text-align: center; }
.code-snippet { position: relative; }
.code-snippet .copy-btn { position: absolute; top: 0.5rem; right: 0.5rem; }
"#;
    fs::write(target_dir.join("assets/css/site.css"), css)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        assert!(tmp.path().join("_config.yml").is_file());
        let store = crate::content::PostStore::new(tmp.path().join("posts"));
        let posts = store.all_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "welcome");
        assert!(posts[0].is_featured);
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();
        assert!(init_site(tmp.path()).is_err());
    }
}

//! Validate the content store
//!
//! A malformed post fails every listing view, so this command walks the
//! whole store and reports each offending document instead of stopping at
//! the first one.

use anyhow::Result;

use crate::Site;

/// Load every post and report per-post failures. Errors out if any post
/// fails to load.
pub fn run(site: &Site) -> Result<()> {
    let store = site.store();
    let identifiers = store.list_identifiers()?;

    let mut failures = 0;
    for identifier in &identifiers {
        match store.load_post(identifier) {
            Ok(post) => {
                println!("  ok   {} ({})", identifier, post.date.format("%Y-%m-%d"));
            }
            Err(e) => {
                failures += 1;
                println!("  FAIL {}: {}", identifier, e);
            }
        }
    }

    println!(
        "{} posts checked, {} failed",
        identifiers.len(),
        failures
    );

    if failures > 0 {
        anyhow::bail!("{} posts failed to load", failures);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_passes_on_clean_store() {
        let tmp = TempDir::new().unwrap();
        crate::commands::init::init_site(tmp.path()).unwrap();
        let site = Site::new(tmp.path()).unwrap();
        assert!(run(&site).is_ok());
    }

    #[test]
    fn test_check_fails_on_broken_post() {
        let tmp = TempDir::new().unwrap();
        crate::commands::init::init_site(tmp.path()).unwrap();

        let broken = tmp.path().join("posts/broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("broken.md"), "no front-matter here\n").unwrap();

        let site = Site::new(tmp.path()).unwrap();
        assert!(run(&site).is_err());
    }
}

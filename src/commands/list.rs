//! List site content

use anyhow::Result;

use crate::Site;

/// Print posts, date-descending
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let store = site.store();

    match content_type {
        "post" | "posts" => {
            let posts = store.all_posts()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {}{}",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    if post.is_featured { " [featured]" } else { "" }
                );
            }
        }
        "featured" => {
            let posts = store.featured_posts()?;
            println!("Featured posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {}", post.date.format("%Y-%m-%d"), post.title);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, featured",
                content_type
            );
        }
    }

    Ok(())
}

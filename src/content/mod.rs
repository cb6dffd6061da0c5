//! Content module - post records, front-matter parsing, loading and rendering

mod frontmatter;
pub mod markdown;
mod post;
pub mod store;

pub use frontmatter::FrontMatter;
pub use markdown::PostRenderer;
pub use post::Post;
pub use store::{ContentError, PostStore};

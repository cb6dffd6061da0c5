//! Embedded page templates using the Tera template engine
//!
//! All templates are compiled into the binary; there is no on-disk theme
//! directory to resolve at runtime.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::markdown::ASSET_ROOT;
use crate::content::Post;
use crate::theme::Theme;

/// Template renderer with embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies arrive pre-rendered as HTML, so autoescaping is off
        // for these templates.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("home.html", include_str!("folio/home.html")),
            ("posts.html", include_str!("folio/posts.html")),
            ("post.html", include_str!("folio/post.html")),
            ("contact.html", include_str!("folio/contact.html")),
            ("success.html", include_str!("folio/success.html")),
            ("fail.html", include_str!("folio/fail.html")),
            (
                "partials/nav.html",
                include_str!("folio/partials/nav.html"),
            ),
            (
                "partials/post_grid.html",
                include_str!("folio/partials/post_grid.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Base context every page shares: site identity and active theme
    pub fn base_context(&self, site_title: &str, theme: Theme) -> Context {
        let mut context = Context::new();
        context.insert("site_title", site_title);
        context.insert("theme", theme.as_str());
        context.insert("toggle_theme", theme.toggled().as_str());
        context
    }
}

/// A post prepared for listing templates
#[derive(Debug, Clone, Serialize)]
pub struct PostItemData {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub image: Option<String>,
}

impl PostItemData {
    pub fn from_post(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            image: post.image_path(ASSET_ROOT),
        }
    }
}

/// Tera filter: format a YYYY-MM-DD date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "LL".to_string(),
    };

    // "LL" renders like "May 30, 2023"
    if format == "LL" {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Ok(tera::Value::String(date.format("%B %d, %Y").to_string()));
        }
    }

    Ok(tera::Value::String(s))
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{} ...",
            truncated.trim_end()
        )))
    }
}

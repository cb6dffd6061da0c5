//! Post body rendering with image rewriting and syntax highlighting
//!
//! The renderer does not reimplement markdown: pulldown-cmark does the
//! conversion, and exactly two node shapes are intercepted on the way
//! through the event stream. A paragraph whose sole child is an image
//! becomes a dimensioned embed resolved against the post's asset folder,
//! and a language-tagged fenced code block becomes a highlighted,
//! copy-enabled snippet. Everything else passes through untouched.

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::Post;
use crate::theme::Theme;

/// Public root under which per-post image folders are served
pub const ASSET_ROOT: &str = "/assets/img/posts";

/// Fixed presentation size for embedded images. Deliberate simplification:
/// no intrinsic-size detection, every embed renders at the same dimensions.
pub const IMAGE_WIDTH: u32 = 600;
pub const IMAGE_HEIGHT: u32 = 300;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// What a buffered top-level paragraph turned out to be
enum ParagraphKind<'a> {
    /// Sole child is an image reference
    Image { dest: String, alt: String },
    Plain(Vec<Event<'a>>),
}

/// Renders a post's markdown body to themed HTML.
///
/// Stateless across calls; the active theme is an explicit parameter.
pub struct PostRenderer;

impl PostRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a post body to HTML under the given theme
    pub fn render(&self, post: &Post, theme: Theme) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(&post.content, options);

        let mut events: Vec<Event> = Vec::new();
        let mut paragraph: Option<Vec<Event>> = None;
        let mut code_block: Option<(String, String)> = None;

        for event in parser {
            match event {
                // Language-tagged fenced code blocks are intercepted;
                // untagged fences and indented blocks take the default path.
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang)))
                    if !lang.is_empty() =>
                {
                    code_block = Some((lang.to_string(), String::new()));
                }
                Event::End(TagEnd::CodeBlock) if code_block.is_some() => {
                    let (lang, code) = code_block.take().unwrap_or_default();
                    let snippet = self.code_snippet(&code, &lang, theme);
                    events.push(Event::Html(CowStr::from(snippet)));
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }

                Event::Start(Tag::Paragraph) if paragraph.is_none() => {
                    paragraph = Some(Vec::new());
                }
                Event::End(TagEnd::Paragraph) if paragraph.is_some() => {
                    let buffered = paragraph.take().unwrap_or_default();
                    match classify_paragraph(buffered) {
                        ParagraphKind::Image { dest, alt } => {
                            let embed = image_embed(&post.slug, &dest, &alt);
                            events.push(Event::Html(CowStr::from(embed)));
                        }
                        ParagraphKind::Plain(inner) => {
                            events.push(Event::Start(Tag::Paragraph));
                            events.extend(inner);
                            events.push(Event::End(TagEnd::Paragraph));
                        }
                    }
                }

                other => match paragraph.as_mut() {
                    Some(buffer) => buffer.push(other),
                    None => events.push(other),
                },
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Build the highlighted, copy-enabled snippet for a fenced code block
    fn code_snippet(&self, code: &str, lang: &str, theme: Theme) -> String {
        // The fenced block carries a trailing newline; drop it so the
        // snippet's extractable text is exactly the code.
        let code = code.strip_suffix('\n').unwrap_or(code);

        let syntax = SYNTAX_SET
            .find_syntax_by_token(lang)
            .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang))
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());

        let palette = THEME_SET
            .themes
            .get(theme.syntect_theme())
            .or_else(|| THEME_SET.themes.values().next());

        let highlighted = palette
            .and_then(|p| highlighted_html_for_string(code, &SYNTAX_SET, syntax, p).ok())
            .unwrap_or_else(|| {
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang,
                    html_escape(code)
                )
            });

        // The copy button reads the adjacent block's textContent, so it
        // always copies what the visitor sees, never the markdown source.
        format!(
            r#"<div class="code-snippet"><button type="button" class="copy-btn" onclick="copySnippet(this)" aria-label="Copy code snippet"><i class="fa-solid fa-copy"></i></button>{}</div>"#,
            highlighted
        )
    }
}

impl Default for PostRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether a buffered paragraph is an image paragraph.
///
/// The shape must be exactly one image span filling the paragraph: its
/// start first, its end last, nothing but the alt text in between.
fn classify_paragraph(events: Vec<Event>) -> ParagraphKind {
    let image_starts = events
        .iter()
        .filter(|e| matches!(e, Event::Start(Tag::Image { .. })))
        .count();

    let sole_image = image_starts == 1
        && matches!(events.first(), Some(Event::Start(Tag::Image { .. })))
        && matches!(events.last(), Some(Event::End(TagEnd::Image)));

    if sole_image {
        if let Some(Event::Start(Tag::Image { dest_url, .. })) = events.first() {
            let alt: String = events
                .iter()
                .filter_map(|e| match e {
                    Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
                    _ => None,
                })
                .collect();
            return ParagraphKind::Image {
                dest: dest_url.to_string(),
                alt,
            };
        }
    }

    ParagraphKind::Plain(events)
}

/// Resolve an image reference against the post's asset folder.
/// The filename from the markup is kept verbatim, only prefixed.
fn image_embed(slug: &str, filename: &str, alt: &str) -> String {
    format!(
        r#"<div class="image-container"><img class="post-image" src="{}/{}/{}" alt="{}" width="{}" height="{}"></div>"#,
        ASSET_ROOT,
        slug,
        html_escape(filename),
        html_escape(alt),
        IMAGE_WIDTH,
        IMAGE_HEIGHT
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn post_with(slug: &str, body: &str) -> Post {
        let mut post = Post::new(slug.to_string(), slug.to_string(), Local::now());
        post.content = body.to_string();
        post
    }

    /// Text content of an HTML fragment, the way `textContent` would see it
    fn strip_tags(html: &str) -> String {
        let mut out = String::new();
        let mut in_tag = false;
        for c in html.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                c if !in_tag => out.push(c),
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_plain_prose_passes_through() {
        let renderer = PostRenderer::new();
        let post = post_with("p", "Hello *world*!\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(html.contains("<p>Hello <em>world</em>!</p>"));
    }

    #[test]
    fn test_headings_pass_through() {
        let renderer = PostRenderer::new();
        let post = post_with("p", "# Title\n\nBody.\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(html.contains("<h1>Title</h1>"));
    }

    #[test]
    fn test_image_paragraph_is_rewritten() {
        let renderer = PostRenderer::new();
        let post = post_with("my-post", "![bar](foo.png)\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(html.contains(r#"src="/assets/img/posts/my-post/foo.png""#));
        assert!(html.contains(r#"alt="bar""#));
        assert!(html.contains(r#"width="600""#));
        assert!(html.contains(r#"height="300""#));
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_inline_image_stays_in_paragraph() {
        let renderer = PostRenderer::new();
        let post = post_with("my-post", "See ![bar](foo.png) here.\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(html.contains("<p>"));
        assert!(!html.contains("image-container"));
    }

    #[test]
    fn test_two_images_stay_in_paragraph() {
        let renderer = PostRenderer::new();
        let post = post_with("my-post", "![a](a.png) ![b](b.png)\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(!html.contains("image-container"));
    }

    #[test]
    fn test_code_block_text_is_exact() {
        let renderer = PostRenderer::new();
        let post = post_with("p", "```js\nconst x = 1;\n```\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(html.contains("code-snippet"));
        assert!(html.contains("copySnippet"));
        assert_eq!(strip_tags(&html).trim(), "const x = 1;");
    }

    #[test]
    fn test_untagged_fence_takes_default_path() {
        let renderer = PostRenderer::new();
        let post = post_with("p", "```\nplain text\n```\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(!html.contains("code-snippet"));
        assert!(html.contains("<pre><code>plain text"));
    }

    #[test]
    fn test_theme_changes_palette_not_text() {
        let renderer = PostRenderer::new();
        let post = post_with("p", "Intro.\n\n```js\nconst x = 1;\n```\n");
        let dark = renderer.render(&post, Theme::Dark).unwrap();
        let light = renderer.render(&post, Theme::Light).unwrap();
        assert_ne!(dark, light);
        assert_eq!(strip_tags(&dark), strip_tags(&light));
    }

    #[test]
    fn test_unknown_language_still_renders_snippet() {
        let renderer = PostRenderer::new();
        let post = post_with("p", "```nosuchlang\nabc\n```\n");
        let html = renderer.render(&post, Theme::Dark).unwrap();
        assert!(html.contains("code-snippet"));
        assert_eq!(strip_tags(&html).trim(), "abc");
    }
}

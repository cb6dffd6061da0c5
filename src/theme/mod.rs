//! Light/dark theme selection
//!
//! The active theme is explicit input everywhere it matters: the renderer
//! takes it as a parameter and the server reads it from the `theme` cookie
//! per request. There is no ambient theme state.

use serde::{Deserialize, Serialize};

/// The visitor-selected color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Parse a theme name; anything unrecognized falls back to dark.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    /// Extract the theme from a request's `Cookie` header value.
    /// Returns `None` when no theme cookie is set, so the caller can fall
    /// back to the site's configured default.
    pub fn from_cookie_header(header: Option<&str>) -> Option<Self> {
        header.and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                (name.trim() == "theme").then(|| Theme::parse(value))
            })
        })
    }

    /// Syntect color scheme for code blocks under this theme
    pub fn syntect_theme(&self) -> &'static str {
        match self {
            Theme::Dark => "base16-ocean.dark",
            Theme::Light => "InspiredGitHub",
        }
    }

    /// Name used in cookies and CSS body classes
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

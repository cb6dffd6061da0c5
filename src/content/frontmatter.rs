//! Front-matter parsing
//!
//! Posts carry a YAML front-matter block delimited by `---` fences. Unlike
//! loose blog pipelines that shrug off a broken block, a malformed or missing
//! block here is a hard error: listing views sort on `date`, so a post that
//! cannot state its metadata must fail loudly instead of sorting ambiguously.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a front-matter block fails to parse
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing front-matter block")]
    MissingBlock,

    #[error("unterminated front-matter block")]
    UnterminatedBlock,

    #[error("invalid front-matter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("missing required field `date`")]
    MissingDate,

    #[error("unparseable date: {0:?}")]
    InvalidDate(String),
}

/// Front-matter data from a post document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from a post document.
    /// Returns (front_matter, body).
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start();

        let rest = content
            .strip_prefix("---")
            .ok_or(FrontMatterError::MissingBlock)?;

        // The close must be a whole `---` line; matching on a bare "---"
        // substring would let trailing whitespace on the fence leak into
        // the body.
        let mut scanned = 0;
        let mut close = None;
        for line in rest.split_inclusive('\n') {
            if scanned > 0 && line.trim_end() == "---" {
                close = Some((scanned, scanned + line.len()));
                break;
            }
            scanned += line.len();
        }
        let (yaml_end, body_start) = close.ok_or(FrontMatterError::UnterminatedBlock)?;

        let yaml_content = &rest[..yaml_end];
        let body = rest[body_start..].trim_start_matches(['\n', '\r']);

        let fm: FrontMatter = serde_yaml::from_str(yaml_content)?;
        Ok((fm, body))
    }

    /// Parse the mandatory `date` field into a DateTime
    pub fn require_date(&self) -> Result<DateTime<Local>, FrontMatterError> {
        let raw = self.date.as_deref().ok_or(FrontMatterError::MissingDate)?;
        parse_date_string(raw).ok_or_else(|| FrontMatterError::InvalidDate(raw.to_string()))
    }
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(
                dt,
                *Local::now().offset(),
            ));
        }
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::from_naive_utc_and_offset(
                dt,
                *Local::now().offset(),
            ));
        }
    }

    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    None
}

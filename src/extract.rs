//! Extraction and post-processing of generated text.
//!
//! Any missing level of the response envelope (no candidates, no content, no
//! parts, no text) and any body that is not valid JSON all map to
//! [`Error::EmptyResponse`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl ResponseEnvelope {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Text of the first part of the first candidate, if every level is present.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
    }
}

/// Pull the generated text out of a raw response body.
pub fn extract(body: &str) -> Result<String> {
    let envelope = ResponseEnvelope::parse(body).map_err(|_| Error::EmptyResponse)?;
    match envelope.first_text() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(Error::EmptyResponse),
    }
}

/// How a display surface represents emphasis and quotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    #[default]
    Html,
    Terminal,
    Plain,
}

impl RenderStyle {
    fn emphasis(&self, inner: &str) -> String {
        match self {
            RenderStyle::Html => format!("<strong>{}</strong>", inner),
            RenderStyle::Terminal => format!("\x1b[1m{}\x1b[0m", inner),
            RenderStyle::Plain => inner.to_string(),
        }
    }

    fn quotes(&self) -> (&'static str, &'static str) {
        match self {
            RenderStyle::Html => ("&ldquo;", "&rdquo;"),
            RenderStyle::Terminal | RenderStyle::Plain => ("\u{201c}", "\u{201d}"),
        }
    }
}

/// Paired `**` markers, shortest match first.
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Replace every `**text**` pair with the style's native emphasis.
pub fn render_emphasis(text: &str, style: RenderStyle) -> String {
    EMPHASIS_RE
        .replace_all(text, |caps: &regex::Captures| style.emphasis(&caps[1]))
        .into_owned()
}

/// Strip surrounding straight quotes and wrap in the style's quotation glyphs.
pub fn quote_testimonial(text: &str, style: RenderStyle) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    let (open, close) = style.quotes();
    format!("{}{}{}", open, trimmed, close)
}

//! Structured error types for the Carte layout engine.
//!
//! Template problems surface before any layout is attempted, as a complete
//! list of issues. Layout problems are fatal and carry enough context to
//! find the offending tile; the engine never shrinks or drops content to
//! recover.

use thiserror::Error;

use crate::layout::TileType;
use crate::template::TemplateIssue;

/// Errors raised while loading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The JSON could not be read as a template at all.
    #[error("Failed to parse template: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
    /// The template parsed but breaks the schema rules.
    #[error("Template is invalid ({} issue(s)):{}", .0.len(), issue_list(.0))]
    Invalid(Vec<TemplateIssue>),
}

impl From<serde_json::Error> for TemplateError {
    fn from(e: serde_json::Error) -> Self {
        let hint = parse_hint(&e);
        TemplateError::Parse { source: e, hint }
    }
}

/// Errors raised while paginating. All of them are unrecoverable for the
/// given template/page combination.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(
        "Body region height is {body_height:.2}pt on a {page_height:.2}pt page; \
         the template's header, title and footer regions leave no room for content"
    )]
    BodyTooSmall { body_height: f64, page_height: f64 },

    #[error(
        "Content width is {content_width:.2}pt on a {page_width:.2}pt page; \
         the left and right margins leave no room for the grid"
    )]
    ContentTooNarrow { content_width: f64, page_width: f64 },

    #[error(
        "Tile '{tile_id}' ({tile_type:?}) needs {height:.2}pt but a fresh page body \
         holds only {body_height:.2}pt (page {page_index})"
    )]
    TileTooLarge {
        tile_id: String,
        tile_type: TileType,
        height: f64,
        body_height: f64,
        page_index: usize,
    },

    /// The inputs could not be serialized for hashing.
    #[error("Failed to hash layout inputs: {0}")]
    InputHash(#[source] serde_json::Error),
}

/// The unified error type returned by the JSON entry points.
#[derive(Debug, Error)]
pub enum CarteError {
    /// Menu or selection JSON failed to parse.
    #[error("Failed to parse {what}: {source}{}", hint_suffix(.hint))]
    Parse {
        what: &'static str,
        source: serde_json::Error,
        hint: String,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Failed to serialize layout: {0}")]
    Serialize(serde_json::Error),
}

impl CarteError {
    /// Wrap a menu or selection parse failure with a hint.
    pub fn parse(what: &'static str, e: serde_json::Error) -> Self {
        let hint = parse_hint(&e);
        CarteError::Parse {
            what,
            source: e,
            hint,
        }
    }
}

fn parse_hint(e: &serde_json::Error) -> String {
    match e.classify() {
        serde_json::error::Category::Syntax => {
            "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
        }
        serde_json::error::Category::Data => {
            "The JSON is valid but doesn't match the expected schema. Check field names and types."
                .to_string()
        }
        serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
        serde_json::error::Category::Io => String::new(),
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

fn issue_list(issues: &[TemplateIssue]) -> String {
    issues.iter().map(|i| format!("\n  - {}", i)).collect()
}

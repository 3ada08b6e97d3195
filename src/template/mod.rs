//! # Templates
//!
//! A template is the declarative half of a layout: page size, region
//! heights, the body grid, the tile variants and their spans, pagination
//! policies and filler rules. It is loaded once from JSON, validated against
//! the schema in [`validate`], and then shared read-only by every layout run
//! that uses it.
//!
//! Unknown fields are rejected at parse time so a typo in a policy name
//! fails loudly instead of silently falling back to a default.

pub mod validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::layout::PageType;
use crate::model::{Edges, PageSize};

pub use validate::TemplateIssue;

/// A typed, validated layout template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Template {
    pub id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub page: TemplatePage,
    #[serde(default)]
    pub regions: RegionHeights,
    pub body: GridConfig,
    /// Tile variant definitions keyed by variant.
    pub tiles: BTreeMap<TileVariant, TileVariantDef>,
    #[serde(default)]
    pub policies: Policies,
    #[serde(default)]
    pub filler: FillerConfig,
}

impl Template {
    /// Parse and validate a template from JSON.
    pub fn from_json(json: &str) -> Result<Template, TemplateError> {
        let template: Template = serde_json::from_str(json)?;
        template.validate().map_err(TemplateError::Invalid)?;
        tracing::debug!(
            template = %template.id,
            version = %template.version,
            cols = template.body.cols,
            variants = template.tiles.len(),
            "loaded template"
        );
        Ok(template)
    }

    pub fn variant(&self, variant: TileVariant) -> Option<&TileVariantDef> {
        self.tiles.get(&variant)
    }

    /// Resolved (colSpan, rowSpan) for a variant.
    ///
    /// Section headers and dividers default to the full grid width; every
    /// other variant defaults to a single cell.
    pub fn spans(&self, variant: TileVariant) -> (usize, usize) {
        let default_cols = match variant {
            TileVariant::SectionHeader | TileVariant::Divider => self.body.cols,
            _ => 1,
        };
        let def = self.variant(variant);
        let col_span = def.and_then(|d| d.col_span).unwrap_or(default_cols);
        let row_span = def.and_then(|d| d.row_span).unwrap_or(1);
        (col_span, row_span)
    }

    /// Content budget for a variant, or an unlimited one.
    pub fn budget(&self, variant: TileVariant) -> ContentBudget {
        self.variant(variant)
            .and_then(|d| d.budget.clone())
            .unwrap_or_default()
    }

    /// Whether the template turns fillers on at all.
    pub fn fillers_enabled(&self) -> bool {
        self.filler.enabled && !self.filler.tile_defs.is_empty()
    }
}

/// Page size and default margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplatePage {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

impl Default for TemplatePage {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

fn default_margin() -> Edges {
    Edges::uniform(36.0)
}

/// Fixed heights of the non-body regions, in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RegionHeights {
    pub header: f64,
    pub title: f64,
    pub footer: f64,
}

/// Body grid parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GridConfig {
    pub cols: usize,
    pub row_height: f64,
    #[serde(default)]
    pub gap_x: f64,
    #[serde(default)]
    pub gap_y: f64,
}

/// The kinds of tile a template can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileVariant {
    Logo,
    Title,
    SectionHeader,
    /// Image card; items without a photo get a placeholder image box.
    ItemCard,
    ItemTextRow,
    FeaturedCard,
    Divider,
    FooterInfo,
}

impl TileVariant {
    pub fn key(self) -> &'static str {
        match self {
            TileVariant::Logo => "logo",
            TileVariant::Title => "title",
            TileVariant::SectionHeader => "sectionHeader",
            TileVariant::ItemCard => "itemCard",
            TileVariant::ItemTextRow => "itemTextRow",
            TileVariant::FeaturedCard => "featuredCard",
            TileVariant::Divider => "divider",
            TileVariant::FooterInfo => "footerInfo",
        }
    }
}

/// One tile variant's definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TileVariantDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<ContentBudget>,
}

/// Text/image allowance for a variant. Used for clamping content only;
/// placement never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentBudget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_name_chars: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chars_per_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_box_height: Option<f64>,
}

/// How the last partially-filled row of a page is shifted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowBalancing {
    #[default]
    Left,
    Center,
    Right,
}

/// Pagination policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Policies {
    pub last_row_balancing: RowBalancing,
    pub show_logo_on_pages: Vec<PageType>,
    pub repeat_section_header_on_continuation: bool,
    /// Items that must share a page with their section header.
    pub section_header_keep_with_next_items: usize,
    pub max_featured_per_section: usize,
    pub section_dividers: bool,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            last_row_balancing: RowBalancing::Left,
            show_logo_on_pages: vec![PageType::Single, PageType::First],
            repeat_section_header_on_continuation: true,
            section_header_keep_with_next_items: 1,
            max_featured_per_section: 0,
            section_dividers: false,
        }
    }
}

/// Decorative filler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FillerConfig {
    pub enabled: bool,
    pub safe_zones: Vec<SafeZone>,
    pub tile_defs: Vec<FillerTileDef>,
    pub selection_policy: SelectionPolicy,
}

/// A rectangle of grid cells eligible for fillers. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SafeZone {
    pub start_row: RowRef,
    pub end_row: RowRef,
    #[serde(default)]
    pub start_col: usize,
    /// Defaults to the last grid column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col: Option<usize>,
}

/// A safe-zone row bound: a literal index or a symbolic marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowRef {
    Index(usize),
    Marker(RowMarker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowMarker {
    /// The last grid row the body region can hold.
    #[serde(rename = "LAST")]
    Last,
    /// The maximum `gridRow` among placed body tiles.
    #[serde(rename = "LAST_CONTENT")]
    LastContent,
}

/// A decorative tile that may occupy empty safe-zone cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FillerTileDef {
    pub id: String,
    #[serde(default = "default_span")]
    pub col_span: usize,
    #[serde(default = "default_span")]
    pub row_span: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Page types this filler is meant for (`BY_PAGE_TYPE`); empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_types: Vec<PageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FillerTileDef {
    pub fn serves(&self, page_type: PageType) -> bool {
        self.page_types.is_empty() || self.page_types.contains(&page_type)
    }
}

fn default_span() -> usize {
    1
}

/// How filler tile defs are picked for empty cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionPolicy {
    #[default]
    Sequential,
    ByPageType,
    RandomSeeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "id": "grid-4",
        "version": "1.0.0",
        "regions": { "header": 60, "title": 30, "footer": 24 },
        "body": { "cols": 4, "rowHeight": 100, "gapX": 8, "gapY": 8 },
        "tiles": {
            "sectionHeader": { "rowSpan": 1 },
            "itemCard": {},
            "itemTextRow": { "budget": { "descriptionLines": 2, "charsPerLine": 30 } }
        }
    }"#;

    #[test]
    fn test_from_json_minimal() {
        let t = Template::from_json(MINIMAL).unwrap();
        assert_eq!(t.body.cols, 4);
        assert_eq!(t.page.size, PageSize::A4);
        assert!((t.page.margin.top - 36.0).abs() < 0.001);
        assert_eq!(t.policies.section_header_keep_with_next_items, 1);
        assert!(!t.fillers_enabled());
    }

    #[test]
    fn test_spans_defaults() {
        let t = Template::from_json(MINIMAL).unwrap();
        assert_eq!(t.spans(TileVariant::SectionHeader), (4, 1));
        assert_eq!(t.spans(TileVariant::ItemCard), (1, 1));
        assert_eq!(t.spans(TileVariant::Divider), (4, 1));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = MINIMAL.replace("\"gapY\": 8", "\"gapY\": 8, \"gutter\": 3");
        let err = Template::from_json(&json).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn test_row_ref_forms() {
        let zone: SafeZone =
            serde_json::from_str(r#"{"startRow": 2, "endRow": "LAST_CONTENT", "startCol": 1}"#)
                .unwrap();
        assert_eq!(zone.start_row, RowRef::Index(2));
        assert_eq!(zone.end_row, RowRef::Marker(RowMarker::LastContent));
        assert_eq!(zone.end_col, None);
    }

    #[test]
    fn test_policy_enums_screaming_case() {
        let p: Policies = serde_json::from_str(
            r#"{"lastRowBalancing": "CENTER", "showLogoOnPages": ["SINGLE", "FINAL"]}"#,
        )
        .unwrap();
        assert_eq!(p.last_row_balancing, RowBalancing::Center);
        assert_eq!(p.show_logo_on_pages, vec![PageType::Single, PageType::Final]);
        assert!(p.repeat_section_header_on_continuation);
    }
}

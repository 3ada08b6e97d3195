//! Schema validation for templates.
//!
//! Every rule runs and every failure is collected, so an author fixing a
//! template sees the whole list at once. A template that returns any issue
//! is never used for layout.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::{RowRef, SelectionPolicy, Template, TileVariant};
use crate::layout::PageType;

/// One discrete validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateIssue {
    /// JSON-ish path of the offending field (e.g. `body.cols`).
    pub path: String,
    pub message: String,
}

impl TemplateIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

const REQUIRED_VARIANTS: [TileVariant; 3] = [
    TileVariant::SectionHeader,
    TileVariant::ItemCard,
    TileVariant::ItemTextRow,
];

impl Template {
    /// Check the template against the schema rules.
    pub fn validate(&self) -> Result<(), Vec<TemplateIssue>> {
        let mut issues = Vec::new();

        self.check_identity(&mut issues);
        self.check_page(&mut issues);
        self.check_grid(&mut issues);
        self.check_variants(&mut issues);
        self.check_filler(&mut issues);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    fn check_identity(&self, issues: &mut Vec<TemplateIssue>) {
        if self.id.trim().is_empty() {
            issues.push(TemplateIssue::new("id", "must not be empty"));
        }
        if self.version.trim().is_empty() {
            issues.push(TemplateIssue::new("version", "must not be empty"));
        }
    }

    fn check_page(&self, issues: &mut Vec<TemplateIssue>) {
        let (width, height) = self.page.size.dimensions();
        if !(width > 0.0 && height > 0.0) {
            issues.push(TemplateIssue::new(
                "page.size",
                format!("dimensions must be positive, got {}x{}", width, height),
            ));
        }

        let m = &self.page.margin;
        for (name, value) in [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
        ] {
            if value < 0.0 {
                issues.push(TemplateIssue::new(
                    format!("page.margin.{}", name),
                    "must not be negative",
                ));
            }
        }
        if m.horizontal() >= width {
            issues.push(TemplateIssue::new(
                "page.margin",
                "left + right margins leave no content width",
            ));
        }
        if m.vertical() >= height {
            issues.push(TemplateIssue::new(
                "page.margin",
                "top + bottom margins leave no content height",
            ));
        }

        let r = &self.regions;
        for (name, value) in [("header", r.header), ("title", r.title), ("footer", r.footer)] {
            if value < 0.0 {
                issues.push(TemplateIssue::new(
                    format!("regions.{}", name),
                    "must not be negative",
                ));
            }
        }
    }

    fn check_grid(&self, issues: &mut Vec<TemplateIssue>) {
        let g = &self.body;
        if g.cols == 0 {
            issues.push(TemplateIssue::new("body.cols", "must be at least 1"));
        }
        if !(g.row_height > 0.0) {
            issues.push(TemplateIssue::new("body.rowHeight", "must be positive"));
        }
        if g.gap_x < 0.0 {
            issues.push(TemplateIssue::new("body.gapX", "must not be negative"));
        }
        if g.gap_y < 0.0 {
            issues.push(TemplateIssue::new("body.gapY", "must not be negative"));
        }
    }

    fn check_variants(&self, issues: &mut Vec<TemplateIssue>) {
        for variant in REQUIRED_VARIANTS {
            if self.variant(variant).is_none() {
                issues.push(TemplateIssue::new(
                    format!("tiles.{}", variant.key()),
                    "required variant is missing",
                ));
            }
        }
        if self.policies.max_featured_per_section > 0
            && self.variant(TileVariant::FeaturedCard).is_none()
        {
            issues.push(TemplateIssue::new(
                "tiles.featuredCard",
                "required when policies.maxFeaturedPerSection > 0",
            ));
        }
        if self.policies.section_dividers && self.variant(TileVariant::Divider).is_none() {
            issues.push(TemplateIssue::new(
                "tiles.divider",
                "required when policies.sectionDividers is set",
            ));
        }

        for (variant, def) in &self.tiles {
            let path = format!("tiles.{}", variant.key());
            if def.col_span == Some(0) {
                issues.push(TemplateIssue::new(format!("{}.colSpan", path), "must be at least 1"));
            }
            if def.row_span == Some(0) {
                issues.push(TemplateIssue::new(format!("{}.rowSpan", path), "must be at least 1"));
            }
            if let Some(span) = def.col_span {
                if self.body.cols > 0 && span > self.body.cols {
                    issues.push(TemplateIssue::new(
                        format!("{}.colSpan", path),
                        format!("{} exceeds the grid's {} columns", span, self.body.cols),
                    ));
                }
            }
            if let Some(budget) = &def.budget {
                if budget.description_lines.is_some() != budget.chars_per_line.is_some() {
                    issues.push(TemplateIssue::new(
                        format!("{}.budget", path),
                        "descriptionLines and charsPerLine must be given together",
                    ));
                }
                if budget.image_box_height.is_some_and(|h| h < 0.0) {
                    issues.push(TemplateIssue::new(
                        format!("{}.budget.imageBoxHeight", path),
                        "must not be negative",
                    ));
                }
            }
        }
    }

    fn check_filler(&self, issues: &mut Vec<TemplateIssue>) {
        let f = &self.filler;
        let cols = self.body.cols;

        if f.enabled && f.tile_defs.is_empty() {
            issues.push(TemplateIssue::new(
                "filler.tileDefs",
                "at least one tile def is required when fillers are enabled",
            ));
        }

        let mut seen = HashSet::new();
        for (i, def) in f.tile_defs.iter().enumerate() {
            let path = format!("filler.tileDefs[{}]", i);
            if def.id.trim().is_empty() {
                issues.push(TemplateIssue::new(format!("{}.id", path), "must not be empty"));
            } else if !seen.insert(def.id.as_str()) {
                issues.push(TemplateIssue::new(
                    format!("{}.id", path),
                    format!("duplicate filler id '{}'", def.id),
                ));
            }
            if def.col_span == 0 || def.row_span == 0 {
                issues.push(TemplateIssue::new(path.clone(), "spans must be at least 1"));
            }
            if cols > 0 && def.col_span > cols {
                issues.push(TemplateIssue::new(
                    format!("{}.colSpan", path),
                    format!("{} exceeds the grid's {} columns", def.col_span, cols),
                ));
            }
        }

        for (i, zone) in f.safe_zones.iter().enumerate() {
            let path = format!("filler.safeZones[{}]", i);
            let end_col = zone.end_col.unwrap_or(cols.saturating_sub(1));
            if cols > 0 && end_col >= cols {
                issues.push(TemplateIssue::new(
                    format!("{}.endCol", path),
                    format!("column {} is outside the {}-column grid", end_col, cols),
                ));
            }
            if zone.start_col > end_col {
                issues.push(TemplateIssue::new(
                    format!("{}.startCol", path),
                    "must not be greater than endCol",
                ));
            }
            if let (RowRef::Index(start), RowRef::Index(end)) = (zone.start_row, zone.end_row) {
                if start > end {
                    issues.push(TemplateIssue::new(
                        format!("{}.startRow", path),
                        "must not be greater than endRow",
                    ));
                }
            }
        }

        if f.enabled && f.selection_policy == SelectionPolicy::ByPageType {
            for page_type in [
                PageType::Single,
                PageType::First,
                PageType::Continuation,
                PageType::Final,
            ] {
                if !f.tile_defs.iter().any(|d| d.serves(page_type)) {
                    issues.push(TemplateIssue::new(
                        "filler.tileDefs",
                        format!("no tile def serves page type {:?} under BY_PAGE_TYPE", page_type),
                    ));
                }
            }
        }
    }
}

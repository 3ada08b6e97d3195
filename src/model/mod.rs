//! # Menu Model
//!
//! The input representation for the layout engine. A menu is an ordered list
//! of sections, each an ordered list of priced items. This is the shape the
//! menu normalizer hands us; nothing here knows about pages or tiles.
//!
//! Order matters. Sections and items carry a `sortOrder` and are always
//! walked ascending by it; ties keep their input order, so two runs over the
//! same menu see the same sequence.

use serde::{Deserialize, Serialize};

use crate::template::Template;

/// A normalized menu ready for layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMenu {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sections: Vec<MenuSection>,
    #[serde(default)]
    pub metadata: MenuMetadata,
}

impl EngineMenu {
    /// Sections in processing order (ascending `sortOrder`, stable).
    pub fn ordered_sections(&self) -> Vec<&MenuSection> {
        let mut sections: Vec<&MenuSection> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.sort_order);
        sections
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// A titled group of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl MenuSection {
    /// Items in processing order (ascending `sortOrder`, stable).
    pub fn ordered_items(&self) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = self.items.iter().collect();
        items.sort_by_key(|i| i.sort_order);
        items
    }
}

/// A single priced dish or drink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    /// Dietary / spice markers ("vegan", "gf", "spicy", ...).
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Venue-level data shown in the page chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuMetadata {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_info: Option<VenueInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Default for MenuMetadata {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            venue_name: None,
            venue_info: None,
            logo_url: None,
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Contact and social details printed in the footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub social: Vec<String>,
}

impl VenueInfo {
    /// Whether anything here is worth a footer tile.
    pub fn has_contact(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.address)
            || filled(&self.phone)
            || filled(&self.email)
            || filled(&self.website)
            || self.social.iter().any(|s| !s.trim().is_empty())
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Page geometry for one layout run: size plus margins, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub margin: Edges,
}

impl PageSpec {
    pub fn new(size: PageSize, margin: Edges) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            margin,
        }
    }

    /// Page geometry declared by a template, optionally with caller margins.
    pub fn from_template(template: &Template, margin_override: Option<Edges>) -> Self {
        Self::new(
            template.page.size,
            margin_override.unwrap_or(template.page.margin),
        )
    }

    /// Width of the content box (page minus horizontal margins).
    pub fn content_width(&self) -> f64 {
        self.width - self.margin.horizontal()
    }

    /// Height of the content box (page minus vertical margins).
    pub fn content_height(&self) -> f64 {
        self.height - self.margin.vertical()
    }
}

/// Per-run switches chosen by the caller (export job, preview, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    /// Render every item as a text row instead of an image card.
    pub text_only: bool,
    /// Allow decorative fillers (the template must enable them too).
    pub fillers_enabled: bool,
    /// Passed through to renderers as a per-page flag.
    pub textures_enabled: bool,
    /// Reserve the title region and place the menu title on every page.
    pub show_menu_title: bool,
    /// Restrict fillers to tile defs tagged with this pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_pattern: Option<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            text_only: false,
            fillers_enabled: true,
            textures_enabled: false,
            show_menu_title: true,
            filler_pattern: None,
        }
    }
}

//! # Carte
//!
//! A page-native grid layout engine for digital menus.
//!
//! Most menu exporters lay items out on one long scrolling canvas and then
//! cut it into pages. That produces section headers stranded at the bottom
//! of a page, half-empty last rows, and page breaks through the middle of a
//! card.
//!
//! Carte does the opposite: **the page is the unit of layout.** Every tile
//! is placed with the page's body grid as a hard constraint. When the next
//! item doesn't fit, the page is finished and a new one opens. Tiles flow
//! *into* pages.
//!
//! The output is a [`LayoutDocument`]: pages of absolutely positioned tiles
//! that a renderer (HTML preview, PDF export, image export) draws without
//! any further layout decisions.
//!
//! ## Architecture
//!
//! ```text
//! Input (menu JSON + template JSON + selection)
//!       ↓
//!   [model]      - Normalized menu, page geometry, caller switches
//!   [template]   - Typed, validated grid template
//!       ↓
//!   [layout]     - Streaming paginator
//!                    region → geometry → page_break → balance → filler
//!       ↓
//!   LayoutDocument (JSON)
//! ```

pub mod error;
pub mod layout;
pub mod model;
pub mod template;
pub mod text;

#[cfg(any(test, feature = "invariants"))]
pub mod invariants;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{CarteError, LayoutError, TemplateError};
pub use layout::{
    assign_page_types, paginate, paginate_with_options, LayoutDocument, LayoutOptions, PageLayout,
    PageType, Region, RegionId, TileContent, TileInstance, TileType,
};
pub use model::{EngineMenu, PageSpec, SelectionConfig};
pub use template::{Template, TemplateIssue};

/// Lay out a menu described as JSON and return the layout as JSON.
///
/// The page geometry comes from the template. An empty `selection_json`
/// means default selection switches.
pub fn paginate_json(menu_json: &str, template_json: &str, selection_json: &str) -> Result<String, CarteError> {
    let menu: EngineMenu = serde_json::from_str(menu_json).map_err(|e| CarteError::parse("menu", e))?;
    let selection: SelectionConfig = if selection_json.trim().is_empty() {
        SelectionConfig::default()
    } else {
        serde_json::from_str(selection_json).map_err(|e| CarteError::parse("selection", e))?
    };
    let template = Template::from_json(template_json)?;
    let page_spec = PageSpec::from_template(&template, None);

    let document = paginate(&menu, &template, &page_spec, &selection)?;
    serde_json::to_string_pretty(&document).map_err(CarteError::Serialize)
}

//! # Streaming Paginator
//!
//! This is the heart of Carte.
//!
//! A menu is laid out by walking it once, section by section, item by item,
//! and committing each tile to a page and a grid cell as it goes. There is
//! no global optimisation and no backtracking: once a tile is on a page it
//! stays there. Only its `x` may move later, when the page's last row is
//! balanced.
//!
//! The algorithm:
//!
//! 1. Open a page with its regions and static chrome. The grid cursor sits
//!    at row 0, column 0 of the body.
//! 2. For each non-empty section, ask: "do the header and its first `k`
//!    items fit together on this page?" If not, finish the page first. A
//!    header is never left alone at the bottom of a page.
//! 3. Place the header on a fresh row, then each item at the cursor. Before
//!    placing an item, predict whether it fits (including any column wrap).
//!    If it doesn't, finish the page, open a new one, repeat the header as a
//!    continuation header, and place the item there.
//! 4. Finishing a page balances its last item row, fills empty safe-zone
//!    cells with decorative tiles, and adds the logo/footer chrome.
//! 5. When everything is placed, finish the last page and label page types.
//!
//! Page type is already known when a page is finished: a page closed by a
//! break always has a successor, and only the final close is the last page.
//! That is what lets `BY_PAGE_TYPE` fillers and the logo policy run per page
//! without a second pass.
//!
//! A tile taller than the body of a fresh page can never be placed; that is
//! an error, not something to shrink or drop. The same holds for a header
//! that cannot share a fresh page with its first `k` items.

pub mod balance;
pub mod debug;
pub mod filler;
pub mod geometry;
pub mod page_break;
pub mod region;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::model::{EngineMenu, MenuItem, MenuSection, PageSpec, SelectionConfig, VenueInfo};
use crate::template::{Template, TileVariant};
use crate::text::{apply_budget, clamp_chars};

use balance::balance_last_row;
use debug::{BreakReason, DebugInfo, PlacementEvent, PlacementLog};
use filler::{fill_page, FillRequest};
use geometry::{select_item_variant, Footprint, GridMetrics, EPSILON};
use page_break::{decide_section_start, fits_in_current_page, sequence_extent, BreakDecision, GridCursor, Span};
use region::{compute_regions, BODY};

/// Decorative fillers sit behind content.
pub const LAYER_FILLER: u32 = 0;
pub const LAYER_CONTENT: u32 = 1;
/// Logo, title and footer chrome.
pub const LAYER_CHROME: u32 = 2;

const HEADER: usize = 0;
const TITLE: usize = 1;
const FOOTER: usize = 3;

// ── Output types ────────────────────────────────────────────────

/// Classification of a page by its position in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    #[default]
    Single,
    First,
    Continuation,
    Final,
}

impl PageType {
    pub fn for_position(index: usize, is_last: bool) -> Self {
        match (index, is_last) {
            (0, true) => PageType::Single,
            (0, false) => PageType::First,
            (_, true) => PageType::Final,
            _ => PageType::Continuation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionId {
    Header,
    Title,
    Body,
    Footer,
}

/// A horizontal band of the content box. Coordinates are relative to the
/// content box's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileType {
    Logo,
    Title,
    SectionHeader,
    ItemCard,
    ItemTextRow,
    FeaturedCard,
    Divider,
    FooterInfo,
    Filler,
}

impl TileType {
    /// Menu item tiles (any variant).
    pub fn is_item(self) -> bool {
        matches!(
            self,
            TileType::ItemCard | TileType::ItemTextRow | TileType::FeaturedCard
        )
    }
}

impl From<TileVariant> for TileType {
    fn from(v: TileVariant) -> Self {
        match v {
            TileVariant::Logo => TileType::Logo,
            TileVariant::Title => TileType::Title,
            TileVariant::SectionHeader => TileType::SectionHeader,
            TileVariant::ItemCard => TileType::ItemCard,
            TileVariant::ItemTextRow => TileType::ItemTextRow,
            TileVariant::FeaturedCard => TileType::FeaturedCard,
            TileVariant::Divider => TileType::Divider,
            TileVariant::FooterInfo => TileType::FooterInfo,
        }
    }
}

/// What a tile shows. Renderers switch on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TileContent {
    #[serde(rename_all = "camelCase")]
    Logo {
        logo_url: Option<String>,
        venue_name: Option<String>,
    },
    Title { text: String },
    #[serde(rename_all = "camelCase")]
    SectionHeader {
        section_id: String,
        name: String,
        /// Repeated at the top of a page the section continues onto.
        continued: bool,
    },
    Item(ItemContent),
    #[serde(rename_all = "camelCase")]
    Divider { before_section_id: String },
    #[serde(rename_all = "camelCase")]
    Filler {
        filler_id: String,
        style: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    FooterInfo {
        venue_name: Option<String>,
        info: VenueInfo,
    },
}

/// Item text and media after budget clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    pub item_id: String,
    pub section_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Image card without a photo: draw a placeholder box.
    pub placeholder_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_box_height: Option<f64>,
    pub indicators: Vec<String>,
    pub featured: bool,
    pub truncated: bool,
}

/// One positioned tile.
///
/// `width`/`height` are the grid footprint. `gridRow`/`gridCol` are
/// recorded at placement and are the logical position; after centering,
/// `x` may no longer equal the column's left edge. Chrome tiles fill their
/// region and carry unit spans at (0, 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub tile_type: TileType,
    pub region_id: RegionId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub col_span: usize,
    pub row_span: usize,
    pub grid_row: usize,
    pub grid_col: usize,
    pub layer: u32,
    pub content: TileContent,
}

impl TileInstance {
    /// Section id for headers and items.
    pub fn section_id(&self) -> Option<&str> {
        match &self.content {
            TileContent::SectionHeader { section_id, .. } => Some(section_id),
            TileContent::Item(item) => Some(&item.section_id),
            _ => None,
        }
    }
}

/// A finished page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub page_index: usize,
    pub page_type: PageType,
    pub regions: Vec<Region>,
    /// Reading order: logo, title, body content, fillers, footer.
    pub tiles: Vec<TileInstance>,
    /// Renderers may draw a background texture.
    pub texture: bool,
}

impl PageLayout {
    pub fn body_tiles(&self) -> impl Iterator<Item = &TileInstance> {
        self.tiles.iter().filter(|t| t.region_id == RegionId::Body)
    }

    pub fn tiles_of(&self, tile_type: TileType) -> impl Iterator<Item = &TileInstance> {
        self.tiles.iter().filter(move |t| t.tile_type == tile_type)
    }
}

/// The complete layout of a menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub template_id: String,
    pub template_version: String,
    pub page_spec: PageSpec,
    pub pages: Vec<PageLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl LayoutDocument {
    /// All item tiles in document order.
    pub fn item_tiles(&self) -> impl Iterator<Item = &TileInstance> {
        self.pages
            .iter()
            .flat_map(|p| p.tiles.iter())
            .filter(|t| t.tile_type.is_item())
    }
}

/// Knobs that don't affect the layout itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Attach the placement log and input hash to the document.
    pub debug: bool,
}

// ── Entry points ────────────────────────────────────────────────

/// Lay out a menu into pages.
pub fn paginate(
    menu: &EngineMenu,
    template: &Template,
    page_spec: &PageSpec,
    selection: &SelectionConfig,
) -> Result<LayoutDocument, LayoutError> {
    paginate_with_options(menu, template, page_spec, selection, &LayoutOptions::default())
}

/// Lay out a menu into pages, optionally recording the debug channel.
pub fn paginate_with_options(
    menu: &EngineMenu,
    template: &Template,
    page_spec: &PageSpec,
    selection: &SelectionConfig,
    options: &LayoutOptions,
) -> Result<LayoutDocument, LayoutError> {
    let regions = compute_regions(page_spec, template, selection.show_menu_title)?;
    let metrics = GridMetrics::new(&template.body, &regions[BODY]);
    let input_hash = debug::input_hash(menu, template, page_spec, selection)
        .map_err(LayoutError::InputHash)?;

    let mut ctx = LayoutContext::new(
        menu,
        template,
        selection,
        regions,
        metrics,
        input_hash,
        options.debug,
    );
    ctx.run()?;
    let document = ctx.into_document(page_spec);

    tracing::debug!(
        menu = %menu.id,
        template = %template.id,
        pages = document.pages.len(),
        items = menu.item_count(),
        "paginated menu"
    );
    Ok(document)
}

/// Label pages SINGLE / FIRST / CONTINUATION / FINAL by position.
pub fn assign_page_types(pages: &mut [PageLayout]) {
    let last = pages.len().saturating_sub(1);
    for (i, page) in pages.iter_mut().enumerate() {
        page.page_type = PageType::for_position(i, i == last);
    }
}

// ── Pagination state ────────────────────────────────────────────

/// An item with its variant and footprint decided.
struct PlannedItem<'a> {
    item: &'a MenuItem,
    variant: TileVariant,
    footprint: Footprint,
}

impl PlannedItem<'_> {
    fn span(&self) -> Span {
        Span::cell(self.footprint.col_span, self.footprint.row_span)
    }
}

/// All mutable state of one pagination run. Owned by the call that
/// created it and dropped when the document is returned.
struct LayoutContext<'a> {
    menu: &'a EngineMenu,
    template: &'a Template,
    selection: &'a SelectionConfig,
    regions: [Region; 4],
    metrics: GridMetrics,
    input_hash: String,
    pages: Vec<PageLayout>,
    /// The open page.
    page: PageLayout,
    cursor: GridCursor,
    /// Body tiles placed on the open page.
    body_tiles: usize,
    log: PlacementLog,
}

impl<'a> LayoutContext<'a> {
    fn new(
        menu: &'a EngineMenu,
        template: &'a Template,
        selection: &'a SelectionConfig,
        regions: [Region; 4],
        metrics: GridMetrics,
        input_hash: String,
        debug: bool,
    ) -> Self {
        let mut ctx = Self {
            menu,
            template,
            selection,
            regions,
            metrics,
            input_hash,
            pages: Vec::new(),
            page: PageLayout::default(),
            cursor: GridCursor::default(),
            body_tiles: 0,
            log: PlacementLog::new(debug),
        };
        ctx.open_page(0);
        ctx
    }

    fn run(&mut self) -> Result<(), LayoutError> {
        let menu = self.menu;
        let sections: Vec<&MenuSection> = menu
            .ordered_sections()
            .into_iter()
            .filter(|s| !s.items.is_empty())
            .collect();

        for (index, section) in sections.into_iter().enumerate() {
            self.layout_section(section, index > 0)?;
        }

        self.close_page(true);
        assign_page_types(&mut self.pages);
        Ok(())
    }

    fn into_document(self, page_spec: &PageSpec) -> LayoutDocument {
        let debug = if self.log.is_enabled() {
            Some(DebugInfo {
                input_hash: self.input_hash,
                generated_at_ms: debug::now_ms(),
                events: self.log.into_events(),
            })
        } else {
            None
        };
        LayoutDocument {
            template_id: self.template.id.clone(),
            template_version: self.template.version.clone(),
            page_spec: *page_spec,
            pages: self.pages,
            debug,
        }
    }

    fn layout_section(&mut self, section: &'a MenuSection, has_previous: bool) -> Result<(), LayoutError> {
        let template = self.template;
        let policies = &template.policies;
        let items = self.plan_items(section);

        let header = Footprint::for_variant(template, TileVariant::SectionHeader, &self.metrics);
        let header_id = format!("section-{}", section.id);
        self.ensure_fits_fresh_page(&header_id, TileType::SectionHeader, header.height)?;

        let mut divider = if has_previous && policies.section_dividers {
            let fp = Footprint::for_variant(template, TileVariant::Divider, &self.metrics);
            self.ensure_fits_fresh_page(&format!("divider-{}", section.id), TileType::Divider, fp.height)?;
            Some(fp)
        } else {
            None
        };

        // Keep-with-next: divider, header and the first k items move together.
        let keep = policies.section_header_keep_with_next_items.min(items.len());
        let mut lead = Vec::with_capacity(keep + 2);
        if let Some(fp) = divider {
            lead.push(Span::row_band(fp.col_span, fp.row_span));
        }
        lead.push(Span::row_band(header.col_span, header.row_span));
        lead.extend(items.iter().take(keep).map(|p| p.span()));

        let mut decision = decide_section_start(&self.cursor, &lead, &self.metrics, self.body_tiles > 0);
        if decision == BreakDecision::NeverFits && divider.take().is_some() {
            tracing::debug!(section = %section.id, "divider leaves no room for the section lead; dropped");
            lead.remove(0);
            decision = decide_section_start(&self.cursor, &lead, &self.metrics, self.body_tiles > 0);
        }
        match decision {
            BreakDecision::Place => {}
            BreakDecision::MoveToNextPage => {
                tracing::debug!(
                    section = %section.id,
                    page = self.page.page_index,
                    keep,
                    "section header would be stranded; starting a new page"
                );
                self.break_page(BreakReason::KeepWithNext {
                    section_id: section.id.clone(),
                });
            }
            BreakDecision::NeverFits => {
                return Err(LayoutError::TileTooLarge {
                    tile_id: header_id,
                    tile_type: TileType::SectionHeader,
                    height: sequence_extent(&lead, &self.metrics),
                    body_height: self.metrics.body_height,
                    page_index: self.fresh_page_index(),
                });
            }
        }

        if let Some(fp) = divider {
            let content = TileContent::Divider {
                before_section_id: section.id.clone(),
            };
            self.place_body(format!("divider-{}", section.id), TileType::Divider, fp, true, content);
        }
        let content = header_content(section, false);
        self.place_body(header_id, TileType::SectionHeader, header, true, content);

        for planned in &items {
            let tile_id = format!("item-{}", planned.item.id);
            let tile_type = TileType::from(planned.variant);
            self.ensure_fits_fresh_page(&tile_id, tile_type, planned.footprint.height)?;

            if !fits_in_current_page(&self.cursor, planned.span(), &self.metrics) {
                self.break_page(BreakReason::Overflow {
                    tile_id: tile_id.clone(),
                });

                if policies.repeat_section_header_on_continuation {
                    let id = format!("section-{}-p{}", section.id, self.page.page_index);
                    let content = header_content(section, true);
                    self.place_body(id, TileType::SectionHeader, header, true, content);

                    if !fits_in_current_page(&self.cursor, planned.span(), &self.metrics) {
                        return Err(LayoutError::TileTooLarge {
                            tile_id,
                            tile_type,
                            height: header.height + self.metrics.gap_y + planned.footprint.height,
                            body_height: self.metrics.body_height,
                            page_index: self.page.page_index,
                        });
                    }
                }
            }

            let content = self.item_content(section, planned);
            self.place_body(tile_id, tile_type, planned.footprint, false, content);
        }
        Ok(())
    }

    /// Decide variant and footprint for each item of a section, in order.
    fn plan_items(&self, section: &'a MenuSection) -> Vec<PlannedItem<'a>> {
        let mut featured = 0;
        section
            .ordered_items()
            .into_iter()
            .map(|item| {
                let variant = select_item_variant(item, self.template, self.selection, featured);
                if variant == TileVariant::FeaturedCard {
                    featured += 1;
                }
                PlannedItem {
                    item,
                    variant,
                    footprint: Footprint::for_variant(self.template, variant, &self.metrics),
                }
            })
            .collect()
    }

    fn item_content(&self, section: &MenuSection, planned: &PlannedItem) -> TileContent {
        let item = planned.item;
        let budget = self.template.budget(planned.variant);
        let text = apply_budget(&item.name, item.description.as_deref(), &budget);
        let image_card = planned.variant != TileVariant::ItemTextRow;

        TileContent::Item(ItemContent {
            item_id: item.id.clone(),
            section_id: section.id.clone(),
            name: text.name,
            description: text.description,
            price: item.price,
            currency: self.menu.metadata.currency.clone(),
            image_url: if image_card { item.image_url.clone() } else { None },
            placeholder_image: image_card && item.image_url.is_none(),
            image_box_height: if image_card { budget.image_box_height } else { None },
            indicators: item.indicators.clone(),
            featured: planned.variant == TileVariant::FeaturedCard,
            truncated: text.truncated,
        })
    }

    fn ensure_fits_fresh_page(&self, tile_id: &str, tile_type: TileType, height: f64) -> Result<(), LayoutError> {
        if height > self.metrics.body_height + EPSILON {
            return Err(LayoutError::TileTooLarge {
                tile_id: tile_id.to_string(),
                tile_type,
                height,
                body_height: self.metrics.body_height,
                page_index: self.fresh_page_index(),
            });
        }
        Ok(())
    }

    /// Index of the first page with an empty body from here on.
    fn fresh_page_index(&self) -> usize {
        self.page.page_index + usize::from(self.body_tiles > 0)
    }

    /// Commit a tile to the body grid at the cursor.
    fn place_body(
        &mut self,
        id: String,
        tile_type: TileType,
        footprint: Footprint,
        own_row: bool,
        content: TileContent,
    ) {
        let span = Span {
            cols: footprint.col_span,
            rows: footprint.row_span,
            own_row,
        };
        let (row, col) = self.cursor.place(span, self.metrics.cols);
        let tile = TileInstance {
            id,
            tile_type,
            region_id: RegionId::Body,
            x: self.metrics.column_x(col),
            y: self.metrics.row_y(row),
            width: footprint.width,
            height: footprint.height,
            col_span: footprint.col_span,
            row_span: footprint.row_span,
            grid_row: row,
            grid_col: col,
            layer: LAYER_CONTENT,
            content,
        };

        let page_index = self.page.page_index;
        self.log.record(|| PlacementEvent::Placed {
            page_index,
            tile_id: tile.id.clone(),
            tile_type,
            grid_row: row,
            grid_col: col,
        });
        self.page.tiles.push(tile);
        self.body_tiles += 1;
    }

    fn chrome_tile(&self, id: String, tile_type: TileType, region: &Region, content: TileContent) -> TileInstance {
        TileInstance {
            id,
            tile_type,
            region_id: region.id,
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            col_span: 1,
            row_span: 1,
            grid_row: 0,
            grid_col: 0,
            layer: LAYER_CHROME,
            content,
        }
    }

    fn open_page(&mut self, page_index: usize) {
        let mut tiles = Vec::new();
        let title = self.regions[TITLE];
        if self.selection.show_menu_title && title.height > 0.0 {
            let text = match self.template.budget(TileVariant::Title).max_name_chars {
                Some(max) => clamp_chars(&self.menu.name, max),
                None => self.menu.name.clone(),
            };
            tiles.push(self.chrome_tile(
                format!("title-p{}", page_index),
                TileType::Title,
                &title,
                TileContent::Title { text },
            ));
        }

        self.page = PageLayout {
            page_index,
            page_type: PageType::Single,
            regions: self.regions.to_vec(),
            tiles,
            texture: self.selection.textures_enabled,
        };
        self.cursor = GridCursor::default();
        self.body_tiles = 0;
        self.log.record(|| PlacementEvent::NewPage { page_index });
    }

    fn break_page(&mut self, reason: BreakReason) {
        let page_index = self.page.page_index;
        self.log.record(|| PlacementEvent::PageBreak { page_index, reason });
        self.close_page(false);
        self.open_page(page_index + 1);
    }

    /// Balance, fill and add per-type chrome to the open page, then move it
    /// to the finished list.
    fn close_page(&mut self, is_last: bool) {
        let mut page = std::mem::take(&mut self.page);
        let page_type = PageType::for_position(page.page_index, is_last);
        page.page_type = page_type;

        let policies = &self.template.policies;
        if let Some(offset) = balance_last_row(&mut page.tiles, policies.last_row_balancing, &self.metrics) {
            tracing::debug!(page = page.page_index, offset, "balanced last row");
        }

        let fillers = if self.template.fillers_enabled() && self.selection.fillers_enabled {
            let request = FillRequest {
                config: &self.template.filler,
                page_index: page.page_index,
                page_type,
                seed: debug::page_seed(&self.input_hash, page.page_index),
                pattern: self.selection.filler_pattern.as_deref(),
            };
            fill_page(&mut page.tiles, &self.metrics, &request)
        } else {
            0
        };
        if fillers > 0 {
            tracing::debug!(page = page.page_index, fillers, "placed fillers");
        }

        let metadata = &self.menu.metadata;
        let header = self.regions[HEADER];
        if header.height > 0.0 && policies.show_logo_on_pages.contains(&page_type) {
            let logo = self.chrome_tile(
                format!("logo-p{}", page.page_index),
                TileType::Logo,
                &header,
                TileContent::Logo {
                    logo_url: metadata.logo_url.clone(),
                    venue_name: metadata.venue_name.clone(),
                },
            );
            page.tiles.insert(0, logo);
        }

        let footer = self.regions[FOOTER];
        if let Some(info) = metadata.venue_info.as_ref().filter(|i| i.has_contact()) {
            if footer.height > 0.0 {
                let tile = self.chrome_tile(
                    format!("footer-p{}", page.page_index),
                    TileType::FooterInfo,
                    &footer,
                    TileContent::FooterInfo {
                        venue_name: metadata.venue_name.clone(),
                        info: info.clone(),
                    },
                );
                page.tiles.push(tile);
            }
        }

        let page_index = page.page_index;
        let tile_count = page.tiles.len();
        self.log.record(|| PlacementEvent::FinalizePage {
            page_index,
            page_type,
            tile_count,
            fillers,
        });
        self.pages.push(page);
    }
}

fn header_content(section: &MenuSection, continued: bool) -> TileContent {
    TileContent::SectionHeader {
        section_id: section.id.clone(),
        name: section.name.clone(),
        continued,
    }
}

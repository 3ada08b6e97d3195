//! # Debug Channel
//!
//! An optional placement log plus the input hash used for cache keys and
//! filler seeds. The log is recorded only when asked for; the hash is always
//! computed because `RANDOM_SEEDED` fillers derive their seeds from it.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{PageType, TileType};
use crate::model::{EngineMenu, PageSpec, SelectionConfig};
use crate::template::Template;

/// Debug payload attached to a [`LayoutDocument`](super::LayoutDocument).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Hex SHA-256 of the canonical inputs.
    pub input_hash: String,
    /// Unix milliseconds at generation. The only field that differs between
    /// identical runs.
    pub generated_at_ms: u64,
    pub events: Vec<PlacementEvent>,
}

/// One step of the pagination run, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlacementEvent {
    #[serde(rename_all = "camelCase")]
    NewPage { page_index: usize },
    #[serde(rename_all = "camelCase")]
    Placed {
        page_index: usize,
        tile_id: String,
        tile_type: TileType,
        grid_row: usize,
        grid_col: usize,
    },
    #[serde(rename_all = "camelCase")]
    PageBreak {
        page_index: usize,
        reason: BreakReason,
    },
    #[serde(rename_all = "camelCase")]
    FinalizePage {
        page_index: usize,
        page_type: PageType,
        tile_count: usize,
        fillers: usize,
    },
}

/// Why a page was closed early.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BreakReason {
    /// A section header and its kept items would not fit together.
    #[serde(rename_all = "camelCase")]
    KeepWithNext { section_id: String },
    /// A tile did not fit in the remaining body space.
    #[serde(rename_all = "camelCase")]
    Overflow { tile_id: String },
}

/// Ordered event sink. A disabled log drops everything.
#[derive(Debug, Default)]
pub struct PlacementLog {
    enabled: bool,
    events: Vec<PlacementEvent>,
}

impl PlacementLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    /// Record an event; the closure only runs when logging is on.
    pub fn record(&mut self, event: impl FnOnce() -> PlacementEvent) {
        if self.enabled {
            self.events.push(event());
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn into_events(self) -> Vec<PlacementEvent> {
        self.events
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashedInputs<'a> {
    menu: &'a EngineMenu,
    template: &'a Template,
    page_spec: &'a PageSpec,
    selection: &'a SelectionConfig,
}

/// Hex SHA-256 over the canonical JSON of all layout inputs.
pub fn input_hash(
    menu: &EngineMenu,
    template: &Template,
    page_spec: &PageSpec,
    selection: &SelectionConfig,
) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    serde_json::to_writer(
        &mut hasher,
        &HashedInputs {
            menu,
            template,
            page_spec,
            selection,
        },
    )?;
    Ok(to_hex(&hasher.finalize()))
}

/// Seed for a page's pseudo-random choices, stable across runs.
pub fn page_seed(input_hash: &str, page_index: usize) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(input_hash.as_bytes());
    hasher.update((page_index as u64).to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Wall-clock milliseconds for the debug timestamp.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

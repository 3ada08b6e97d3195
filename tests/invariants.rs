//! # Layout Invariant Sweep
//!
//! Runs the post-hoc invariant checker over a spread of generated menus and
//! template policies. Every layout must come back clean.
//!
//! Feature-gated behind `invariants`:
//! ```bash
//! cargo test --features invariants
//! ```

#![cfg(feature = "invariants")]

use carte::invariants::{check_document, InvariantViolation};
use carte::model::*;
use carte::template::Template;
use carte::*;
use serde_json::{json, Value};

// ── Helpers ────────────────────────────────────────────────────

fn template(cols: usize, balancing: &str, policy: &str, dividers: bool) -> Template {
    let value: Value = json!({
        "id": format!("sweep-{}", cols),
        "version": "1",
        "page": { "size": "Letter" },
        "regions": { "header": 64, "title": 32, "footer": 28 },
        "body": { "cols": cols, "rowHeight": 120, "gapX": 10, "gapY": 10 },
        "tiles": {
            "sectionHeader": { "rowSpan": 1 },
            "itemCard": {},
            "itemTextRow": { "colSpan": if cols > 1 { 2 } else { 1 } },
            "featuredCard": { "colSpan": if cols > 2 { 2 } else { 1 }, "rowSpan": 2 },
            "divider": {},
            "footerInfo": {}
        },
        "policies": {
            "lastRowBalancing": balancing,
            "maxFeaturedPerSection": 1,
            "sectionDividers": dividers,
            "sectionHeaderKeepWithNextItems": 2
        },
        "filler": {
            "enabled": true,
            "safeZones": [
                { "startRow": "LAST_CONTENT", "endRow": "LAST" },
                { "startRow": 0, "endRow": 1, "startCol": 0, "endCol": 0 }
            ],
            "tileDefs": [
                { "id": "dot", "pageTypes": ["SINGLE", "FIRST", "CONTINUATION", "FINAL"] },
                { "id": "wide", "colSpan": if cols > 1 { 2 } else { 1 } },
                { "id": "tall", "rowSpan": 2, "pageTypes": ["FINAL"] }
            ],
            "selectionPolicy": policy
        }
    });
    Template::from_json(&value.to_string()).unwrap()
}

/// Deterministic menu shapes: section sizes cycle through a fixed pattern.
fn menu(seed: usize) -> EngineMenu {
    let sizes = [1, 7, 0, 13, 4, 22, 3];
    let sections = (0..4)
        .map(|s| {
            let n = sizes[(seed + s * 3) % sizes.len()];
            MenuSection {
                id: format!("s{}", s),
                name: format!("Section {}", s),
                sort_order: s as i32,
                items: (0..n)
                    .map(|i| MenuItem {
                        id: format!("s{}-{}", s, i),
                        name: format!("Item {}", i),
                        description: None,
                        price: 5.0 + i as f64,
                        image_url: None,
                        sort_order: i as i32,
                        indicators: vec![],
                        is_featured: (i + seed) % 5 == 0,
                    })
                    .collect(),
            }
        })
        .collect();
    EngineMenu {
        id: format!("sweep-{}", seed),
        name: "Sweep".to_string(),
        sections,
        metadata: MenuMetadata {
            venue_info: Some(VenueInfo {
                website: Some("example.com".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

fn assert_clean(doc: &LayoutDocument, template: &Template) {
    let violations: Vec<InvariantViolation> = check_document(doc, template);
    assert!(
        violations.is_empty(),
        "{} violation(s):\n{}",
        violations.len(),
        violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n")
    );
}

// ── Sweeps ─────────────────────────────────────────────────────

#[test]
fn test_sweep_columns_and_balancing() {
    for cols in [1, 2, 3, 4, 6] {
        for balancing in ["LEFT", "CENTER", "RIGHT"] {
            let t = template(cols, balancing, "SEQUENTIAL", false);
            for seed in 0..7 {
                let m = menu(seed);
                let doc = paginate(&m, &t, &PageSpec::from_template(&t, None), &SelectionConfig::default()).unwrap();
                assert_eq!(doc.item_tiles().count(), m.item_count());
                assert_clean(&doc, &t);
            }
        }
    }
}

#[test]
fn test_sweep_filler_policies_with_dividers() {
    for policy in ["SEQUENTIAL", "BY_PAGE_TYPE", "RANDOM_SEEDED"] {
        let t = template(4, "CENTER", policy, true);
        for seed in 0..7 {
            let doc = paginate(&menu(seed), &t, &PageSpec::from_template(&t, None), &SelectionConfig::default()).unwrap();
            assert_clean(&doc, &t);
        }
    }
}

#[test]
fn test_sweep_text_only_without_title() {
    let t = template(3, "RIGHT", "RANDOM_SEEDED", true);
    let selection = SelectionConfig {
        text_only: true,
        show_menu_title: false,
        ..Default::default()
    };
    for seed in 0..7 {
        let doc = paginate(&menu(seed), &t, &PageSpec::from_template(&t, None), &selection).unwrap();
        assert_clean(&doc, &t);
    }
}

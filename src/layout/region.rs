//! # Region Calculator
//!
//! Splits a page's content box into four stacked regions: header, title,
//! body, footer. Regions start at `y = 0` of the content box, never overlap
//! and leave no gaps; the body absorbs whatever height the fixed regions
//! leave over. Margins that leave no width or height are fatal.

use super::{Region, RegionId};
use crate::error::LayoutError;
use crate::model::PageSpec;
use crate::template::Template;

/// Index of the body region in the array returned by [`compute_regions`].
pub const BODY: usize = 2;

/// Compute the header/title/body/footer regions for one page.
///
/// The title region collapses to zero height when the menu title is hidden.
pub fn compute_regions(
    page_spec: &PageSpec,
    template: &Template,
    show_menu_title: bool,
) -> Result<[Region; 4], LayoutError> {
    let width = page_spec.content_width();
    if width <= 0.0 {
        return Err(LayoutError::ContentTooNarrow {
            content_width: width,
            page_width: page_spec.width,
        });
    }
    let content_height = page_spec.content_height();

    let header = template.regions.header;
    let title = if show_menu_title {
        template.regions.title
    } else {
        0.0
    };
    let footer = template.regions.footer;
    let body = content_height - header - title - footer;

    if body <= 0.0 {
        return Err(LayoutError::BodyTooSmall {
            body_height: body,
            page_height: page_spec.height,
        });
    }

    let mut y = 0.0;
    let mut stack = |id: RegionId, height: f64| {
        let region = Region {
            id,
            x: 0.0,
            y,
            width,
            height,
        };
        y += height;
        region
    };

    Ok([
        stack(RegionId::Header, header),
        stack(RegionId::Title, title),
        stack(RegionId::Body, body),
        stack(RegionId::Footer, footer),
    ])
}

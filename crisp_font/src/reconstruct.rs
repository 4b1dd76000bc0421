//! Turns a grid-packed "wide" atlas plus a font's metrics into the tight,
//! single-row atlas the engine actually draws from. The grid-layout math and
//! the four-phase ink scan are a hard contract with `builder` — both sides
//! must compute identical cell rectangles and identical `dx`/`dy`.

use crate::atlas::{AtlasData, AtlasImage, AtlasPositioning, GlyphPosition};
use crate::charset::character_set;
use crate::convert::{cast_u32, round_px};
use crate::error::ReconstructError;
use crate::geometry::PixelRect;
use crate::identity::FontIdentity;
use crate::metrics::FontMetrics;

/// Precomputed grid placement for every character the wide atlas holds.
struct GridLayout {
    cell_height: u32,
    /// `(char, cell rectangle)` in canonical order.
    cells: Vec<(char, PixelRect)>,
}

fn build_grid_layout(metrics: &FontMetrics, pixel_density: f64) -> GridLayout {
    let chars: Vec<char> = character_set()
        .iter()
        .copied()
        .filter(|&c| metrics.character_metrics(c).is_some())
        .collect();

    let n = chars.len();
    let columns = (n as f64).sqrt().ceil() as usize;
    let columns = columns.max(1);
    let cell_height = metrics.cell_height_phys_px(pixel_density);

    let mut column_widths = vec![0u32; columns];
    for (i, &c) in chars.iter().enumerate() {
        let col = i % columns;
        let w = metrics
            .cell_width_phys_px(c, pixel_density)
            .expect("character came from the canonical set filter above");
        column_widths[col] = column_widths[col].max(w);
    }

    let mut column_x = vec![0u32; columns];
    let mut running = 0u32;
    for col in 0..columns {
        column_x[col] = running;
        running += column_widths[col];
    }

    let cells = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let col = i % columns;
            let row = i / columns;
            (
                c,
                PixelRect::new(column_x[col], cast_u32(row) * cell_height, column_widths[col], cell_height),
            )
        })
        .collect();

    GridLayout { cell_height, cells }
}

/// Four-phase early-exit alpha scan: bottom, then top, then left, then right.
/// Returns `None` if the cell has no opaque pixel (an empty glyph, e.g. space).
/// The returned rectangle is relative to the cell's own top-left corner.
pub(crate) fn scan_cell_bounds(image: &AtlasImage, cell: PixelRect) -> Option<PixelRect> {
    if cell.is_empty() {
        return None;
    }
    let (cell_x, cell_y) = (cell.x, cell.y);

    let row_has_ink = |y: u32| (cell.x..cell.right()).any(|x| image.alpha_at(x, y) > 0);

    let bottom = (cell.y..cell.bottom()).rev().find(|&y| row_has_ink(y))?;
    let top = (cell.y..=bottom).find(|&y| row_has_ink(y))?;

    let col_has_ink = |x: u32| (top..=bottom).any(|y| image.alpha_at(x, y) > 0);

    let left = (cell.x..cell.right()).find(|&x| col_has_ink(x))?;
    let right = (cell.x..cell.right()).rev().find(|&x| col_has_ink(x))?;

    Some(PixelRect::new(left - cell_x, top - cell_y, right - left + 1, bottom - top + 1))
}

/// Reconstructs a tight atlas and its positioning from a wide atlas.
pub struct AtlasReconstructor;

impl AtlasReconstructor {
    /// Reconstructs `AtlasData` for `id` from `wide_atlas`, using `metrics`
    /// for cell geometry and `pixel_density` (from `id`) for physical-pixel
    /// scaling.
    pub fn reconstruct(
        id: &FontIdentity,
        metrics: &FontMetrics,
        wide_atlas: &AtlasImage,
    ) -> Result<AtlasData, ReconstructError> {
        let pixel_density = id.pixel_density();
        let layout = build_grid_layout(metrics, pixel_density);

        let expected_width = layout.cells.iter().map(|&(_, cell)| cell.right()).max().unwrap_or(0);
        let expected_height = layout.cells.iter().map(|&(_, cell)| cell.bottom()).max().unwrap_or(0);
        if wide_atlas.width < expected_width || wide_atlas.height < expected_height {
            return Err(ReconstructError::DimensionMismatch {
                id: id.clone(),
                actual_w: wide_atlas.width,
                actual_h: wide_atlas.height,
                expected_w: expected_width,
                expected_h: expected_height,
            });
        }

        let mut scanned = Vec::with_capacity(layout.cells.len());
        for &(c, cell) in &layout.cells {
            if let Some(bounds) = scan_cell_bounds(wide_atlas, cell) {
                scanned.push((c, cell, bounds));
            }
        }

        let tight_width: u32 = scanned.iter().map(|(_, _, b)| b.width).sum();
        let tight_height: u32 = scanned.iter().map(|(_, _, b)| b.height).max().unwrap_or(0);

        if scanned.is_empty() {
            return Ok(AtlasData::new(AtlasImage::new(0, 0, Vec::new()), AtlasPositioning::new()));
        }
        if tight_width == 0 || tight_height == 0 {
            return Err(ReconstructError::ReconstructionMismatch(id.clone()));
        }

        let mut tight_pixels = vec![0u8; tight_width as usize * tight_height as usize * 4];
        let mut positioning = AtlasPositioning::new();
        let mut cursor = 0u32;

        for (c, cell, bounds) in scanned {
            for row in 0..bounds.height {
                for col in 0..bounds.width {
                    let src = wide_atlas.rgba_at(cell.x + bounds.x + col, cell.y + bounds.y + row);
                    let dst_x = cursor + col;
                    let dst_y = row;
                    let idx = (dst_y as usize * tight_width as usize + dst_x as usize) * 4;
                    tight_pixels[idx..idx + 4].copy_from_slice(&src);
                }
            }

            let char_metrics = metrics
                .character_metrics(c)
                .expect("character came from the canonical set filter in build_grid_layout");

            let distance_from_char_bottom_to_cell_bottom =
                layout.cell_height as i64 - (bounds.y as i64 + bounds.height as i64 - 1) - 1;
            let dx = -round_px(char_metrics.actual_bounding_box_left) * pixel_density + bounds.x as f64;
            let dy = -(bounds.height as f64) - distance_from_char_bottom_to_cell_bottom as f64 + pixel_density;

            positioning.insert(
                c,
                GlyphPosition {
                    tight_width: bounds.width,
                    tight_height: bounds.height,
                    x_in_atlas: cursor,
                    y_in_atlas: 0,
                    dx,
                    dy,
                },
            );

            cursor += bounds.width;
        }

        Ok(AtlasData::new(AtlasImage::new(tight_width, tight_height, tight_pixels), positioning))
    }
}

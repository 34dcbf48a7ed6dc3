//! Page and cell geometry for contact sheets.
//!
//! All lengths are PDF points. The coordinate origin is the bottom-left corner of
//! the page, so row 0 sits at the top edge and higher rows move down.

use serde::{Deserialize, Serialize};

use crate::layout::presets::LayoutPreset;

/// A4 width: 210mm at 72pt/in.
pub const A4_WIDTH_PT: f64 = 595.275_590_551_181_2;
/// A4 height: 297mm at 72pt/in.
pub const A4_HEIGHT_PT: f64 = 841.889_763_779_527_7;

const STRETCH_OUTER_MARGIN: f64 = 10.0;
const STRETCH_INNER_MARGIN: f64 = 5.0;
const FIT_OUTER_MARGIN: f64 = 20.0;
const FIT_INNER_MARGIN: f64 = 10.0;

/// How an image is sized inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Fill the placeable area exactly, ignoring the source aspect ratio.
    Stretch,
    /// Scale to fit while keeping width/height ratio, centered in the cell.
    PreserveAspect,
}

impl PlacementMode {
    pub fn from_stretch(stretch: bool) -> Self {
        if stretch {
            PlacementMode::Stretch
        } else {
            PlacementMode::PreserveAspect
        }
    }
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// True when `other` lies inside `self`, allowing `eps` of float slack.
    pub fn contains(&self, other: &Rect, eps: f64) -> bool {
        other.x >= self.x - eps
            && other.y >= self.y - eps
            && other.right() <= self.right() + eps
            && other.top() <= self.top() + eps
    }
}

/// Grid position of one slot on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub column: usize,
    pub row: usize,
}

/// Derived page measurements, computed once per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub preset: LayoutPreset,
    pub mode: PlacementMode,
    pub page_width: f64,
    pub page_height: f64,
    pub outer_margin: f64,
    pub inner_margin: f64,
    pub cell_width: f64,
    pub cell_height: f64,
    pub max_image_width: f64,
    pub max_image_height: f64,
}

impl PageGeometry {
    /// Geometry for an A4 page.
    pub fn a4(preset: LayoutPreset, mode: PlacementMode) -> Self {
        Self::new(preset, mode, A4_WIDTH_PT, A4_HEIGHT_PT)
    }

    pub fn new(preset: LayoutPreset, mode: PlacementMode, page_width: f64, page_height: f64) -> Self {
        let (outer_margin, inner_margin) = match mode {
            PlacementMode::Stretch => (STRETCH_OUTER_MARGIN, STRETCH_INNER_MARGIN),
            PlacementMode::PreserveAspect => (FIT_OUTER_MARGIN, FIT_INNER_MARGIN),
        };

        let cell_width = (page_width - 2.0 * outer_margin) / preset.columns() as f64;
        let cell_height = (page_height - 2.0 * outer_margin) / preset.rows() as f64;

        PageGeometry {
            preset,
            mode,
            page_width,
            page_height,
            outer_margin,
            inner_margin,
            cell_width,
            cell_height,
            max_image_width: cell_width - 2.0 * inner_margin,
            max_image_height: cell_height - 2.0 * inner_margin,
        }
    }

    /// Row-major grid position for the `slot`-th image on a page.
    pub fn slot(&self, slot: usize) -> GridSlot {
        let columns = self.preset.columns();
        GridSlot {
            column: slot % columns,
            row: slot / columns,
        }
    }

    /// The full cell rectangle for a grid position.
    pub fn cell(&self, slot: GridSlot) -> Rect {
        Rect {
            x: self.outer_margin + slot.column as f64 * self.cell_width,
            y: self.page_height - self.outer_margin - (slot.row as f64 + 1.0) * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    /// The cell shrunk by the inner margin: the largest area an image may occupy.
    pub fn placeable(&self, slot: GridSlot) -> Rect {
        let cell = self.cell(slot);
        Rect {
            x: cell.x + self.inner_margin,
            y: cell.y + self.inner_margin,
            width: self.max_image_width,
            height: self.max_image_height,
        }
    }
}

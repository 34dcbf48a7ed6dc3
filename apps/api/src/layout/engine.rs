//! Contact-sheet layout engine.
//!
//! `build_document` is a pure function of its inputs: it reads pixel dimensions,
//! resolves the grid once, and folds the images into pages in a single pass.
//! It does no I/O and never logs; failures come back as [`LayoutError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::geometry::{GridSlot, PageGeometry, PlacementMode, Rect};
use crate::layout::presets::LayoutPreset;

/// Anything the engine can lay out. Only the pixel size is read.
pub trait PixelDimensions {
    fn pixel_width(&self) -> u32;
    fn pixel_height(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("no images to export")]
    NoImages,

    #[error("image {index} has invalid dimensions {width}x{height}")]
    InvalidImage { index: usize, width: u32, height: u32 },
}

/// One image positioned on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    /// Position of the image in the input sequence.
    pub image_index: usize,
    pub slot: GridSlot,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub placements: Vec<PlacedImage>,
}

/// A fully laid-out contact sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn placements(&self) -> impl Iterator<Item = &PlacedImage> {
        self.pages.iter().flat_map(|p| p.placements.iter())
    }
}

/// Lays out `images` on A4 pages using the preset named by `layout_key`.
///
/// Unknown keys use the 4-image grid. A lone image is always placed on the 1×1
/// grid. The last page keeps the full grid's cell size even when partly filled.
pub fn build_document<I: PixelDimensions>(
    images: &[I],
    layout_key: &str,
    stretch: bool,
) -> Result<Document, LayoutError> {
    if images.is_empty() {
        return Err(LayoutError::NoImages);
    }

    let preset = if images.len() == 1 {
        LayoutPreset::Single
    } else {
        LayoutPreset::from_key(layout_key)
    };
    let geometry = PageGeometry::a4(preset, PlacementMode::from_stretch(stretch));
    let per_page = preset.images_per_page();

    let mut pages = Vec::with_capacity(images.len().div_ceil(per_page));
    let mut current: Vec<PlacedImage> = Vec::with_capacity(per_page);

    for (index, image) in images.iter().enumerate() {
        let (width, height) = (image.pixel_width(), image.pixel_height());
        if width == 0 || height == 0 {
            return Err(LayoutError::InvalidImage {
                index,
                width,
                height,
            });
        }

        let slot = geometry.slot(current.len());
        current.push(PlacedImage {
            image_index: index,
            slot,
            rect: place_in_cell(&geometry, slot, width, height),
        });

        if current.len() == per_page {
            pages.push(Page {
                placements: std::mem::replace(&mut current, Vec::with_capacity(per_page)),
            });
        }
    }

    if !current.is_empty() {
        pages.push(Page {
            placements: current,
        });
    }

    Ok(Document { geometry, pages })
}

/// Target rectangle for an image of `width`×`height` pixels in `slot`.
pub fn place_in_cell(geometry: &PageGeometry, slot: GridSlot, width: u32, height: u32) -> Rect {
    match geometry.mode {
        PlacementMode::Stretch => geometry.placeable(slot),
        PlacementMode::PreserveAspect => {
            let cell = geometry.cell(slot);
            let (max_w, max_h) = (geometry.max_image_width, geometry.max_image_height);
            let aspect = width as f64 / height as f64;

            let (new_w, new_h) = if aspect > max_w / max_h {
                (max_w, max_w / aspect)
            } else {
                (max_h * aspect, max_h)
            };

            Rect {
                x: cell.x + (cell.width - new_w) / 2.0,
                y: cell.y + (cell.height - new_h) / 2.0,
                width: new_w,
                height: new_h,
            }
        }
    }
}

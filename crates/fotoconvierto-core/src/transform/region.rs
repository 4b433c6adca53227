//! Integer pixel regions and sub-image extraction.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel
//! - A region covers columns `x..x + width` and rows `y..y + height`

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// An axis-aligned rectangle of whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering a whole `width x height` image.
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the pixel at (x, y) lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersect with a `width x height` image.
    ///
    /// The result may be empty when the region lies entirely outside.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        Self::new(x, y, right - x, bottom - y)
    }
}

/// Copy a region of `image` into a new image.
///
/// The region is clamped to the image bounds first. Returns `None` when the
/// clamped region is empty.
///
/// # Arguments
///
/// * `image` - Source image
/// * `region` - Pixel region to extract
///
/// # Returns
///
/// A new `DecodedImage` containing exactly the region's pixels.
pub fn extract_region(image: &DecodedImage, region: PixelRegion) -> Option<DecodedImage> {
    let region = region.clamp_to(image.width, image.height);
    if region.is_empty() {
        return None;
    }

    // Fast path: full region returns a clone
    if region == PixelRegion::full(image.width, image.height) {
        return Some(image.clone());
    }

    let row_bytes = (region.width * 3) as usize;
    let mut output = Vec::with_capacity(row_bytes * region.height as usize);

    // Copy pixel data row by row
    for src_y in region.y..region.bottom() {
        let start = ((src_y * image.width + region.x) * 3) as usize;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    Some(DecodedImage::new(region.width, region.height, output))
}

//! Composable image orientation (the eight symmetries of a rectangle).
//!
//! Rotate and flip operations never touch the source bitmap. Each one is
//! folded into a single `Orientation` value, which is applied once when the
//! oriented view is rendered. Repeated rotations therefore cost one redraw
//! and never accumulate resampling loss.
//!
//! # Representation
//!
//! An orientation is "mirror horizontally (optional), then rotate clockwise
//! by `quarter_turns` x 90 degrees". Every combination of quarter turns and
//! flips reduces to exactly one of these eight values.
//!
//! # Coordinate System
//!
//! Points are continuous pixel-edge coordinates: a `w x h` image spans
//! `[0, w] x [0, h]` with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

use super::PixelRegion;
use crate::decode::DecodedImage;

/// A rotation by a multiple of 90 degrees combined with an optional mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OrientationRecord")]
pub struct Orientation {
    /// Clockwise quarter turns applied after the mirror (0..=3).
    quarter_turns: u8,
    /// Whether the image is mirrored horizontally before rotating.
    mirrored: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrientationRecord {
    #[serde(default)]
    quarter_turns: u8,
    #[serde(default)]
    mirrored: bool,
}

impl From<OrientationRecord> for Orientation {
    fn from(record: OrientationRecord) -> Self {
        Orientation::new(record.quarter_turns, record.mirrored)
    }
}

impl Orientation {
    /// The orientation that leaves an image untouched.
    pub const IDENTITY: Orientation = Orientation {
        quarter_turns: 0,
        mirrored: false,
    };

    /// Create an orientation; quarter turns are reduced modulo 4.
    pub const fn new(quarter_turns: u8, mirrored: bool) -> Self {
        Self {
            quarter_turns: quarter_turns % 4,
            mirrored,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        self.quarter_turns
    }

    pub fn is_mirrored(self) -> bool {
        self.mirrored
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Clockwise rotation in degrees (0, 90, 180 or 270).
    pub fn rotation_degrees(self) -> u16 {
        self.quarter_turns as u16 * 90
    }

    /// Whether applying this orientation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        self.quarter_turns % 2 == 1
    }

    /// This orientation followed by a clockwise quarter turn.
    pub fn then_rotate_cw(self) -> Self {
        Self::new(self.quarter_turns + 1, self.mirrored)
    }

    /// This orientation followed by a counter-clockwise quarter turn.
    pub fn then_rotate_ccw(self) -> Self {
        Self::new(self.quarter_turns + 3, self.mirrored)
    }

    /// This orientation followed by a horizontal mirror.
    ///
    /// A mirror conjugates a rotation into its inverse, so the accumulated
    /// turns are negated as the mirror moves to the front.
    pub fn then_flip_horizontal(self) -> Self {
        Self::new(4 - self.quarter_turns, !self.mirrored)
    }

    /// This orientation followed by a vertical mirror (a horizontal mirror plus a half turn).
    pub fn then_flip_vertical(self) -> Self {
        Self::new(6 - self.quarter_turns, !self.mirrored)
    }

    /// Apply `self` first, then `next`.
    pub fn then(self, next: Orientation) -> Self {
        if next.mirrored {
            Self::new(next.quarter_turns + 4 - self.quarter_turns, !self.mirrored)
        } else {
            Self::new(next.quarter_turns + self.quarter_turns, self.mirrored)
        }
    }

    /// The orientation that undoes this one.
    pub fn inverse(self) -> Self {
        if self.mirrored {
            self
        } else {
            Self::new(4 - self.quarter_turns, false)
        }
    }

    /// Dimensions of a `width x height` image after applying this orientation.
    pub fn oriented_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Map a point of a `width x height` source into the oriented image.
    pub fn map_point(self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let (mut x, mut y) = if self.mirrored { (width - x, y) } else { (x, y) };
        let (mut w, mut h) = (width, height);
        for _ in 0..self.quarter_turns {
            // Clockwise: the top-left corner moves to the top-right.
            (x, y) = (h - y, x);
            (w, h) = (h, w);
        }
        (x, y)
    }

    /// Map a region of a `width x height` source into the oriented image.
    pub fn map_region(self, region: PixelRegion, width: u32, height: u32) -> PixelRegion {
        let (w, h) = (width as f64, height as f64);
        let (x0, y0) = self.map_point(region.x as f64, region.y as f64, w, h);
        let (x1, y1) = self.map_point(
            (region.x + region.width) as f64,
            (region.y + region.height) as f64,
            w,
            h,
        );
        PixelRegion {
            x: x0.min(x1).round() as u32,
            y: y0.min(y1).round() as u32,
            width: (x1 - x0).abs().round() as u32,
            height: (y1 - y0).abs().round() as u32,
        }
    }

    /// Render `image` in this orientation.
    pub fn apply(self, image: &DecodedImage) -> DecodedImage {
        if self.is_identity() {
            return image.clone();
        }
        let Some(mut rgb) = image.to_rgb_image() else {
            return image.clone();
        };

        if self.mirrored {
            image::imageops::flip_horizontal_in_place(&mut rgb);
        }
        let rotated = match self.quarter_turns {
            1 => image::imageops::rotate90(&rgb),
            2 => image::imageops::rotate180(&rgb),
            3 => image::imageops::rotate270(&rgb),
            _ => rgb,
        };

        DecodedImage::from_rgb_image(rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 image where each pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn all() -> Vec<Orientation> {
        (0..4)
            .flat_map(|q| [Orientation::new(q, false), Orientation::new(q, true)])
            .collect()
    }

    #[test]
    fn test_identity_apply_is_clone() {
        let img = coordinate_image(3, 2);
        assert_eq!(Orientation::IDENTITY.apply(&img), img);
    }

    #[test]
    fn test_rotate_cw_moves_top_left_to_top_right() {
        let img = coordinate_image(3, 2);
        let rotated = Orientation::IDENTITY.then_rotate_cw().apply(&img);
        assert_eq!((rotated.width, rotated.height), (2, 3));
        // Source (0,0) is now the top-right pixel.
        assert_eq!(rotated.pixel(1, 0), [0, 0, 0]);
        // Source bottom-left (0,1) is now the top-left pixel.
        assert_eq!(rotated.pixel(0, 0), [0, 1, 0]);
    }

    #[test]
    fn test_four_quarter_turns_is_identity() {
        let mut o = Orientation::IDENTITY;
        for _ in 0..4 {
            o = o.then_rotate_cw();
        }
        assert!(o.is_identity());
    }

    #[test]
    fn test_ccw_undoes_cw() {
        for o in all() {
            assert_eq!(o.then_rotate_cw().then_rotate_ccw(), o);
        }
    }

    #[test]
    fn test_double_flips_cancel() {
        for o in all() {
            assert_eq!(o.then_flip_horizontal().then_flip_horizontal(), o);
            assert_eq!(o.then_flip_vertical().then_flip_vertical(), o);
        }
    }

    #[test]
    fn test_horizontal_then_vertical_flip_is_half_turn() {
        let o = Orientation::IDENTITY.then_flip_horizontal().then_flip_vertical();
        assert_eq!(o, Orientation::new(2, false));
    }

    #[test]
    fn test_composed_matches_sequential_pixels() {
        let img = coordinate_image(4, 3);
        let steps: [fn(Orientation) -> Orientation; 4] = [
            Orientation::then_rotate_cw,
            Orientation::then_flip_horizontal,
            Orientation::then_rotate_ccw,
            Orientation::then_flip_vertical,
        ];

        let mut composed = Orientation::IDENTITY;
        let mut baked = img.clone();
        for step in steps {
            let single = step(Orientation::IDENTITY);
            baked = single.apply(&baked);
            composed = step(composed);
        }
        assert_eq!(composed.apply(&img), baked);
    }

    #[test]
    fn test_then_agrees_with_step_methods() {
        for a in all() {
            assert_eq!(a.then(Orientation::new(1, false)), a.then_rotate_cw());
            assert_eq!(a.then(Orientation::new(0, true)), a.then_flip_horizontal());
            assert_eq!(a.then(Orientation::new(2, true)), a.then_flip_vertical());
        }
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        for o in all() {
            assert!(o.then(o.inverse()).is_identity(), "{:?}", o);
            assert!(o.inverse().then(o).is_identity(), "{:?}", o);
        }
    }

    #[test]
    fn test_oriented_dimensions() {
        assert_eq!(Orientation::new(1, false).oriented_dimensions(800, 400), (400, 800));
        assert_eq!(Orientation::new(2, true).oriented_dimensions(800, 400), (800, 400));
    }

    #[test]
    fn test_map_region_round_trip() {
        let region = PixelRegion::new(1, 2, 5, 3);
        for o in all() {
            let (ow, oh) = o.oriented_dimensions(10, 8);
            let mapped = o.map_region(region, 10, 8);
            let back = o.inverse().map_region(mapped, ow, oh);
            assert_eq!(back, region, "{:?}", o);
        }
    }

    #[test]
    fn test_map_region_matches_pixels() {
        let img = coordinate_image(6, 4);
        let region = PixelRegion::new(1, 1, 3, 2);
        for o in all() {
            let oriented = o.apply(&img);
            let mapped = o.map_region(region, 6, 4);
            // Every pixel inside the mapped region came from inside the source region.
            for y in mapped.y..mapped.y + mapped.height {
                for x in mapped.x..mapped.x + mapped.width {
                    let [sx, sy, _] = oriented.pixel(x, y);
                    assert!(region.contains(sx as u32, sy as u32), "{:?} at ({}, {})", o, x, y);
                }
            }
        }
    }

    #[test]
    fn test_deserialize_normalizes_turns() {
        let o: Orientation = serde_json::from_str(r#"{"quarterTurns":5,"mirrored":true}"#).unwrap();
        assert_eq!(o, Orientation::new(1, true));
    }
}

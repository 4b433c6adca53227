//! Geometry for the interactive crop selection.
//!
//! All coordinates are backing pixels of the oriented canonical image,
//! with the origin at the top-left corner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::transform::PixelRegion;

/// A position in backing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The crop selection rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `width x height` rectangle centred on a `canvas_width x canvas_height` canvas.
    pub fn centered(canvas_width: f64, canvas_height: f64, width: f64, height: f64) -> Self {
        Self::new(
            (canvas_width - width) / 2.0,
            (canvas_height - height) / 2.0,
            width,
            height,
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive hit test against the rectangle's edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Flip negative extents so width and height are non-negative.
    pub fn normalized(mut self) -> Self {
        if self.width < 0.0 {
            self.x += self.width;
            self.width = -self.width;
        }
        if self.height < 0.0 {
            self.y += self.height;
            self.height = -self.height;
        }
        self
    }

    /// Slide the rectangle back inside the canvas without resizing it.
    pub fn constrained(mut self, canvas_width: f64, canvas_height: f64) -> Self {
        if self.x < 0.0 {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = 0.0;
        }
        if self.right() > canvas_width {
            self.x = (canvas_width - self.width).max(0.0);
        }
        if self.bottom() > canvas_height {
            self.y = (canvas_height - self.height).max(0.0);
        }
        self
    }

    /// Scale both sides by one factor so the size fits `max_width x max_height`.
    pub fn shrunk_to(mut self, max_width: f64, max_height: f64) -> Self {
        let scale = fit_scale(self.width, max_width).min(fit_scale(self.height, max_height));
        if scale < 1.0 {
            self.width *= scale;
            self.height *= scale;
        }
        self
    }

    /// Shrink a normalized rectangle toward its corner `fixed` until it lies
    /// inside the canvas. The aspect ratio is kept.
    pub fn fitted_from(self, fixed: Point, canvas_width: f64, canvas_height: f64) -> Self {
        let grows_right = (fixed.x - self.x).abs() <= (fixed.x - self.right()).abs();
        let grows_down = (fixed.y - self.y).abs() <= (fixed.y - self.bottom()).abs();
        let room_x = if grows_right { canvas_width - fixed.x } else { fixed.x };
        let room_y = if grows_down { canvas_height - fixed.y } else { fixed.y };

        let shrunk = self.shrunk_to(room_x.max(0.0), room_y.max(0.0));
        if shrunk == self {
            return self;
        }
        let x = if grows_right { fixed.x } else { fixed.x - shrunk.width };
        let y = if grows_down { fixed.y } else { fixed.y - shrunk.height };
        CropRect::new(x, y, shrunk.width, shrunk.height)
    }

    /// Centre of `handle`.
    pub fn handle_position(&self, handle: Handle) -> Point {
        match handle {
            Handle::TopLeft => Point::new(self.x, self.y),
            Handle::TopRight => Point::new(self.right(), self.y),
            Handle::BottomLeft => Point::new(self.x, self.bottom()),
            Handle::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// The handle whose `size x size` square contains `p`, checked in
    /// [`Handle::ALL`] order.
    pub fn handle_at(&self, p: Point, size: f64) -> Option<Handle> {
        let half = size / 2.0;
        Handle::ALL.into_iter().find(|&handle| {
            let c = self.handle_position(handle);
            p.x >= c.x - half && p.x <= c.x + half && p.y >= c.y - half && p.y <= c.y + half
        })
    }

    /// Round to whole pixels and intersect with the canvas.
    pub fn to_region(&self, canvas_width: u32, canvas_height: u32) -> PixelRegion {
        let x = self.x.round();
        let y = self.y.round();
        let w = self.width.round();
        let h = self.height.round();

        let left = x.clamp(0.0, canvas_width as f64);
        let top = y.clamp(0.0, canvas_height as f64);
        let right = (x + w).clamp(left, canvas_width as f64);
        let bottom = (y + h).clamp(top, canvas_height as f64);

        PixelRegion::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
    }

    /// Dimension label shown above the selection, e.g. `"400 × 300"`.
    pub fn label(&self) -> String {
        format!("{} × {}", self.width.round(), self.height.round())
    }
}

/// A corner resize affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::TopRight => Handle::BottomLeft,
            Handle::BottomLeft => Handle::TopRight,
            Handle::BottomRight => Handle::TopLeft,
        }
    }

    pub fn cursor(self) -> CursorHint {
        match self {
            Handle::TopLeft | Handle::BottomRight => CursorHint::NwseResize,
            Handle::TopRight | Handle::BottomLeft => CursorHint::NeswResize,
        }
    }

    /// Rebuild `origin` with this corner moved to `p`; the opposite corner stays put.
    pub fn drag(self, origin: CropRect, p: Point) -> CropRect {
        let CropRect {
            x,
            y,
            width,
            height,
        } = origin;
        match self {
            Handle::TopLeft => CropRect::new(p.x, p.y, x + width - p.x, y + height - p.y),
            Handle::TopRight => CropRect::new(x, p.y, p.x - x, y + height - p.y),
            Handle::BottomLeft => CropRect::new(p.x, y, x + width - p.x, p.y - y),
            Handle::BottomRight => CropRect::new(x, y, p.x - x, p.y - y),
        }
    }
}

fn fit_scale(extent: f64, room: f64) -> f64 {
    if extent > room && extent > 0.0 {
        room / extent
    } else {
        1.0
    }
}

/// Pointer cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
    Move,
    NwseResize,
    NeswResize,
}

impl CursorHint {
    /// CSS `cursor` keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Crosshair => "crosshair",
            CursorHint::Move => "move",
            CursorHint::NwseResize => "nwse-resize",
            CursorHint::NeswResize => "nesw-resize",
        }
    }
}

impl fmt::Display for CursorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

/// Maps client (CSS pixel) positions onto the canvas backing store.
///
/// The canvas element may be displayed at a different size than its
/// backing resolution; pointer events arrive in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasMapping {
    pub backing_width: f64,
    pub backing_height: f64,
    /// Bounding client rect of the canvas element.
    pub display_left: f64,
    pub display_top: f64,
    pub display_width: f64,
    pub display_height: f64,
}

impl CanvasMapping {
    /// Convert a client position to backing pixels.
    ///
    /// A zero-sized display maps with scale 1.
    pub fn to_backing(&self, client_x: f64, client_y: f64) -> Point {
        let scale_x = scale(self.backing_width, self.display_width);
        let scale_y = scale(self.backing_height, self.display_height);
        Point::new(
            (client_x - self.display_left) * scale_x,
            (client_y - self.display_top) * scale_y,
        )
    }
}

fn scale(backing: f64, display: f64) -> f64 {
    if display > 0.0 && display.is_finite() {
        backing / display
    } else {
        1.0
    }
}

/// Named aspect ratios offered by the crop tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectPreset {
    #[default]
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "3:2")]
    ThreeTwo,
    #[serde(rename = "16:9")]
    SixteenNine,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 5] = [
        AspectPreset::Free,
        AspectPreset::Square,
        AspectPreset::FourThree,
        AspectPreset::ThreeTwo,
        AspectPreset::SixteenNine,
    ];

    /// Width / height, or `None` for free-form.
    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectPreset::Free => None,
            AspectPreset::Square => Some(1.0),
            AspectPreset::FourThree => Some(4.0 / 3.0),
            AspectPreset::ThreeTwo => Some(3.0 / 2.0),
            AspectPreset::SixteenNine => Some(16.0 / 9.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectPreset::Free => "free",
            AspectPreset::Square => "1:1",
            AspectPreset::FourThree => "4:3",
            AspectPreset::ThreeTwo => "3:2",
            AspectPreset::SixteenNine => "16:9",
        }
    }
}

impl FromStr for AspectPreset {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AspectPreset::ALL
            .into_iter()
            .find(|preset| preset.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| EditorError::InvalidFormat(format!("unknown aspect preset {s}")))
    }
}

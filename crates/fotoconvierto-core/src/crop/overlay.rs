//! Overlay geometry for drawing the crop selection.
//!
//! The host draws: a dimmed canvas with the selection cut out, the
//! selection border, rule-of-thirds guides, a square at each corner handle
//! and the dimension label above the selection.

use serde::Serialize;

use super::{CropRect, Handle, Point};

/// Distance of the dimension label's baseline above the selection.
const LABEL_OFFSET: f64 = 10.0;

/// A straight guide line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

/// Everything needed to draw the crop overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropOverlay {
    pub rect: CropRect,
    /// Square hit area of each corner handle.
    pub handles: Vec<(Handle, CropRect)>,
    /// Two vertical then two horizontal rule-of-thirds lines.
    pub guides: Vec<Line>,
    pub label: String,
    /// Centre of the label's baseline.
    pub label_anchor: Point,
}

impl CropOverlay {
    pub fn new(rect: CropRect, handle_size: f64) -> Self {
        let half = handle_size / 2.0;
        let handles = Handle::ALL
            .into_iter()
            .map(|handle| {
                let c = rect.handle_position(handle);
                (handle, CropRect::new(c.x - half, c.y - half, handle_size, handle_size))
            })
            .collect();

        let third_w = rect.width / 3.0;
        let third_h = rect.height / 3.0;
        let mut guides = Vec::with_capacity(4);
        for i in 1..=2 {
            let x = rect.x + third_w * i as f64;
            guides.push(Line {
                from: Point::new(x, rect.y),
                to: Point::new(x, rect.bottom()),
            });
        }
        for i in 1..=2 {
            let y = rect.y + third_h * i as f64;
            guides.push(Line {
                from: Point::new(rect.x, y),
                to: Point::new(rect.right(), y),
            });
        }

        Self {
            rect,
            handles,
            guides,
            label: rect.label(),
            label_anchor: Point::new(rect.x + rect.width / 2.0, rect.y - LABEL_OFFSET),
        }
    }
}

//! Window geometry shared by the engine and the UI layer

use serde::{Deserialize, Serialize};

/// A window rectangle in screen coordinates (logical pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Bounds {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Same size, moved to the given position
    pub fn with_position(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Same position, resized
    pub fn with_size(self, width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }

    /// Keep at least part of the window reachable: the title bar must stay
    /// below the top of the screen and the left edge may not go negative
    /// beyond `min_visible` pixels of the window.
    pub fn constrained_onscreen(self, min_visible: i32) -> Self {
        let min_x = -(self.width - min_visible).max(0);
        Self {
            x: self.x.max(min_x),
            y: self.y.max(0),
            ..self
        }
    }
}

/// Minimum and maximum window sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeLimits {
    /// Minimum width
    pub min_width: i32,
    /// Minimum height
    pub min_height: i32,
    /// Maximum width
    pub max_width: i32,
    /// Maximum height
    pub max_height: i32,
}

impl ResizeLimits {
    /// Create resize limits
    pub const fn new(min_width: i32, min_height: i32, max_width: i32, max_height: i32) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    /// Clamp a size into the limits
    pub fn clamp(&self, width: i32, height: i32) -> (i32, i32) {
        (
            width.clamp(self.min_width, self.max_width),
            height.clamp(self.min_height, self.max_height),
        )
    }
}

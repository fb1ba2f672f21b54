//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in the coordinate units of the source data.
///
/// Serializes as a feature-service extent: `[[min_x, min_y], [max_x, max_y]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[[f64; 2]; 2]", from = "[[f64; 2]; 2]")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A degenerate box covering a single point.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Grow the box so that it covers `(x, y)`.
    pub fn expand_to(self, x: f64, y: f64) -> Self {
        Self {
            min_x: self.min_x.min(x),
            min_y: self.min_y.min(y),
            max_x: self.max_x.max(x),
            max_y: self.max_y.max(y),
        }
    }

    /// Fold a coordinate ring into its bounding box.
    ///
    /// The accumulator starts empty and is seeded with the first visited
    /// point, so an empty ring has no box.
    pub fn from_ring(ring: &[[f64; 2]]) -> Option<Self> {
        ring.iter().fold(None, |acc, [x, y]| match acc {
            None => Some(Self::from_point(*x, *y)),
            Some(bbox) => Some(bbox.expand_to(*x, *y)),
        })
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// The `[[min_x, min_y], [max_x, max_y]]` corner pair.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_x, self.min_y], [self.max_x, self.max_y]]
    }
}

impl From<BoundingBox> for [[f64; 2]; 2] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.corners()
    }
}

impl From<[[f64; 2]; 2]> for BoundingBox {
    fn from([[min_x, min_y], [max_x, max_y]]: [[f64; 2]; 2]) -> Self {
        Self::new(min_x, min_y, max_x, max_y)
    }
}

//! Placement representation for positioned modules.

use crate::evaluator::Extent;
use crate::module::Module;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of a placement report: a module's size and lower-left corner.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Module name.
    pub name: String,
    /// Width of the module.
    pub width: f64,
    /// Height of the module.
    pub height: f64,
    /// X coordinate of the lower-left corner.
    pub x: f64,
    /// Y coordinate of the lower-left corner.
    pub y: f64,
}

impl Placement {
    /// Snapshots a module's current placement.
    pub fn from_module(module: &Module) -> Self {
        let (x, y) = module.placement();
        Self {
            name: module.name().to_string(),
            width: module.width(),
            height: module.height(),
            x,
            y,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Returns true if the interiors of the two rectangles intersect by more
    /// than `tolerance` along both axes.
    pub fn overlaps(&self, other: &Placement, tolerance: f64) -> bool {
        let dx = self.right().min(other.right()) - self.x.max(other.x);
        let dy = self.top().min(other.top()) - self.y.max(other.y);
        dx > tolerance && dy > tolerance
    }
}

/// Smallest origin-anchored box containing every placement.
pub fn bounding_extent(placements: &[Placement]) -> Extent {
    placements.iter().fold(
        Extent {
            width: 0.0,
            height: 0.0,
        },
        |acc, p| Extent {
            width: acc.width.max(p.right()),
            height: acc.height.max(p.top()),
        },
    )
}

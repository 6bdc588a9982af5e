//! Annealing result representation.

use crate::expression::PolishExpression;
use crate::module::ModuleCatalog;
use crate::placement::Placement;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why the outer annealing loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// Rejected moves reached the configured share of tried moves.
    RejectRatio,
    /// Temperature fell to the floor.
    TemperatureFloor,
    /// Wall-clock limit exceeded.
    TimeLimit,
    /// Fewer than two modules: there is only one floorplan.
    TrivialInstance,
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct FloorplanResult {
    /// Best expression found.
    pub best_expression: PolishExpression,

    /// Bounding area of the best expression.
    pub best_cost: f64,

    /// Bounding area of the initial chain expression.
    pub initial_cost: f64,

    /// Catalog with placements laid out from the best expression.
    pub catalog: ModuleCatalog,

    /// Outer-loop attempts (temperature steps) performed.
    pub attempts: u32,

    /// Moves tried across all attempts (failed moves excluded).
    pub moves_tried: u64,

    /// Moves accepted, downhill or uphill.
    pub accepted: u64,

    /// Accepted moves that increased the cost.
    pub uphill: u64,

    /// Moves rolled back by the Metropolis test.
    pub rejected: u64,

    /// Move attempts that found nothing to change.
    pub failed_moves: u64,

    /// Temperature after the last cooling step.
    pub final_temperature: f64,

    /// Wall-clock time of the run.
    pub elapsed: Duration,

    /// Best cost after each attempt.
    pub history: Vec<f64>,

    /// Why the run ended.
    pub stop_reason: StopReason,
}

impl FloorplanResult {
    /// Placement rows in catalog order.
    pub fn placements(&self) -> Vec<Placement> {
        self.catalog.iter().map(Placement::from_module).collect()
    }

    /// Module area over bounding area (1.0 means no dead space).
    pub fn utilization(&self) -> f64 {
        if self.best_cost > 0.0 {
            self.catalog.total_module_area() / self.best_cost
        } else {
            0.0
        }
    }

    /// Best expression as module names and partition symbols.
    pub fn expression_names(&self) -> Vec<String> {
        self.best_expression.to_names(&self.catalog)
    }

    /// Builds a serializable summary.
    pub fn summary(&self) -> FloorplanSummary {
        FloorplanSummary {
            best_cost: self.best_cost,
            initial_cost: self.initial_cost,
            utilization: self.utilization(),
            expression: self.expression_names(),
            attempts: self.attempts,
            moves_tried: self.moves_tried,
            elapsed_ms: self.elapsed.as_millis() as u64,
            stop_reason: self.stop_reason,
            history: self.history.clone(),
            placements: self.placements(),
        }
    }
}

/// Flat, serializable view of a [`FloorplanResult`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FloorplanSummary {
    /// Bounding area of the best floorplan.
    pub best_cost: f64,
    /// Bounding area of the initial floorplan.
    pub initial_cost: f64,
    /// Module area over bounding area.
    pub utilization: f64,
    /// Best expression.
    pub expression: Vec<String>,
    /// Outer-loop attempts.
    pub attempts: u32,
    /// Moves tried.
    pub moves_tried: u64,
    /// Run time in milliseconds.
    pub elapsed_ms: u64,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Best cost per attempt.
    pub history: Vec<f64>,
    /// Final placements.
    pub placements: Vec<Placement>,
}

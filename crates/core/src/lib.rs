//! # U-Floorplan Core
//!
//! Slicing-tree floorplanning by Simulated Annealing.
//!
//! A floorplan of `n` rectangular modules is encoded as a normalized polish
//! expression: a postfix sequence of module operands and `H`/`V` partition
//! operators. The annealer mutates that expression with three neighborhood
//! moves and minimizes the bounding-box area of the resulting layout.
//!
//! ## Core Components
//!
//! - **Module catalog**: `Module`, `ModuleCatalog`
//! - **Expression**: `PolishExpression`, `Token`, `Partition`
//! - **Evaluator**: `compute_area`, `compute_layout`, `SlicingTree`
//! - **Moves**: `MoveKind` (M1 operand swap, M2 chain invert, M3 operand/operator swap)
//! - **Annealing**: `SaConfig`, `SaRunner`, `FloorplanResult`
//!
//! ## Example
//!
//! ```rust
//! use u_floorplan_core::{Module, ModuleCatalog, SaConfig, SaRunner};
//!
//! let catalog = ModuleCatalog::from_modules(vec![
//!     Module::from_area("A", 4.0, 1.0)?,
//!     Module::from_area("B", 6.0, 1.5)?,
//! ])?;
//! let config = SaConfig::default().with_run_multiplier(10).with_seed(7);
//! let result = SaRunner::new(config, catalog)?.run()?;
//! assert!((result.best_cost - 10.0).abs() < 1e-9);
//! # Ok::<(), u_floorplan_core::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod evaluator;
pub mod expression;
pub mod module;
pub mod moves;
pub mod placement;
pub mod result;
pub mod sa;

// Re-exports
pub use error::{Error, Result};
pub use evaluator::{compute_area, compute_layout, Extent, Node, Room, SlicingTree};
pub use expression::{Partition, PolishExpression, Token};
pub use module::{Module, ModuleCatalog};
pub use moves::{MoveKind, DEFAULT_M3_RETRY_BUDGET};
pub use placement::{bounding_extent, Placement};
pub use result::{FloorplanResult, FloorplanSummary, StopReason};
pub use sa::{AttemptReport, ProgressCallback, SaConfig, SaRunner};

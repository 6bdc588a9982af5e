//! Simulated Annealing over slicing-tree expressions.
//!
//! The runner starts from the chain expression and repeatedly mutates it in
//! place. Each temperature step is one *attempt*: moves are tried until either
//! `max_runs` uphill moves were accepted or `2 * max_runs` moves were tried,
//! where `max_runs = run_multiplier * module_count`. A rejected move restores
//! the snapshot taken before it.
//!
//! The search stops when an attempt rejects at least `reject_ratio_limit` of
//! its moves, when the temperature reaches the floor, or when the time limit
//! is exceeded. The best expression is then laid out into the catalog.

use crate::evaluator::{compute_area, compute_layout};
use crate::expression::PolishExpression;
use crate::module::ModuleCatalog;
use crate::moves::{MoveKind, DEFAULT_M3_RETRY_BUDGET};
use crate::result::{FloorplanResult, StopReason};
use crate::{Error, Result};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the annealing search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SaConfig {
    /// Starting temperature; also the reference for move selection bands.
    pub max_temperature: f64,
    /// The search stops once the temperature is at or below this value.
    pub min_temperature: f64,
    /// Geometric cooling factor applied after every attempt.
    pub cooling_rate: f64,
    /// Moves per attempt scale with `run_multiplier * module_count`.
    pub run_multiplier: usize,
    /// Wall-clock limit checked between attempts (None = unlimited).
    pub time_limit: Option<Duration>,
    /// Reject share of an attempt that ends the search.
    pub reject_ratio_limit: f64,
    /// Candidate operands M3 inspects before reporting failure.
    pub m3_retry_budget: usize,
    /// Consecutive failed moves that end an attempt (None = `2 * max_runs`).
    pub max_failed_selections: Option<usize>,
    /// RNG seed (None = seeded from OS entropy).
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            max_temperature: 1000.0,
            min_temperature: 10.0,
            cooling_rate: 0.9,
            run_multiplier: 5000,
            time_limit: Some(Duration::from_secs(5 * 60)),
            reject_ratio_limit: 0.95,
            m3_retry_budget: DEFAULT_M3_RETRY_BUDGET,
            max_failed_selections: None,
            seed: None,
        }
    }
}

impl SaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the starting temperature.
    pub fn with_max_temperature(mut self, temp: f64) -> Self {
        self.max_temperature = temp.max(0.001);
        self
    }

    /// Sets the temperature floor.
    pub fn with_min_temperature(mut self, temp: f64) -> Self {
        self.min_temperature = temp.max(0.0);
        self
    }

    /// Sets the cooling factor.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate.clamp(0.001, 0.9999);
        self
    }

    /// Sets the run multiplier.
    pub fn with_run_multiplier(mut self, multiplier: usize) -> Self {
        self.run_multiplier = multiplier.max(1);
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Removes the time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Sets the reject ratio that ends the search.
    pub fn with_reject_ratio_limit(mut self, ratio: f64) -> Self {
        self.reject_ratio_limit = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the M3 retry budget.
    pub fn with_m3_retry_budget(mut self, budget: usize) -> Self {
        self.m3_retry_budget = budget.max(1);
        self
    }

    /// Caps consecutive failed moves within one attempt.
    pub fn with_max_failed_selections(mut self, cap: usize) -> Self {
        self.max_failed_selections = Some(cap.max(1));
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks values that the setters cannot clamp on their own.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_temperature.is_finite() && self.max_temperature > 0.0) {
            return Err(Error::ConfigError(format!(
                "max_temperature must be positive, got {}",
                self.max_temperature
            )));
        }
        if !(self.min_temperature >= 0.0 && self.min_temperature < self.max_temperature) {
            return Err(Error::ConfigError(format!(
                "min_temperature {} must be in [0, {})",
                self.min_temperature, self.max_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(Error::ConfigError(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if self.run_multiplier == 0 || self.m3_retry_budget == 0 {
            return Err(Error::ConfigError(
                "run_multiplier and m3_retry_budget must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reject_ratio_limit) {
            return Err(Error::ConfigError(format!(
                "reject_ratio_limit must be in [0, 1], got {}",
                self.reject_ratio_limit
            )));
        }
        Ok(())
    }
}

/// Statistics of one outer-loop attempt.
#[derive(Debug, Clone)]
pub struct AttemptReport {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Temperature the attempt ran at.
    pub temperature: f64,
    /// Best cost after the attempt.
    pub best_cost: f64,
    /// Cost of the live expression after the attempt.
    pub current_cost: f64,
    /// Moves tried in this attempt.
    pub moves_tried: u64,
    /// Uphill moves accepted in this attempt.
    pub uphill: u64,
    /// Moves rejected in this attempt.
    pub rejected: u64,
    /// `rejected / moves_tried`, or None when no move was tried.
    pub reject_ratio: Option<f64>,
    /// Time since the run started.
    pub elapsed: Duration,
}

/// Progress callback invoked after every attempt.
pub type ProgressCallback<'a> = Box<dyn FnMut(&AttemptReport) + 'a>;

#[derive(Debug, Default)]
struct Totals {
    moves_tried: u64,
    accepted: u64,
    uphill: u64,
    rejected: u64,
    failed_moves: u64,
}

/// Simulated Annealing floorplanner.
pub struct SaRunner {
    config: SaConfig,
    catalog: ModuleCatalog,
}

impl SaRunner {
    /// Creates a runner over a non-empty catalog.
    pub fn new(config: SaConfig, catalog: ModuleCatalog) -> Result<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self { config, catalog })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Returns the input catalog.
    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Area of the chain expression the search starts from.
    pub fn initial_cost(&self) -> Result<f64> {
        compute_area(&PolishExpression::new_chain(self.catalog.len()), &self.catalog)
    }

    fn make_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Runs the search with the configured seed.
    pub fn run(&self) -> Result<FloorplanResult> {
        self.run_with_rng(&mut self.make_rng())
    }

    /// Runs the search, reporting every attempt to `callback`.
    pub fn run_with_progress(&self, callback: ProgressCallback<'_>) -> Result<FloorplanResult> {
        self.anneal(&mut self.make_rng(), callback)
    }

    /// Runs the search with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<FloorplanResult> {
        self.anneal(rng, |_: &AttemptReport| {})
    }

    fn anneal<R, F>(&self, rng: &mut R, mut progress: F) -> Result<FloorplanResult>
    where
        R: Rng,
        F: FnMut(&AttemptReport),
    {
        let start = Instant::now();
        let cfg = &self.config;
        let module_count = self.catalog.len();
        let (max_runs, max_moves) = attempt_budget(cfg.run_multiplier, module_count);
        let max_failed = cfg
            .max_failed_selections
            .map(|cap| cap as u64)
            .unwrap_or(max_moves);

        let mut expr = PolishExpression::new_chain(module_count);
        let initial_cost = self.initial_cost()?;
        let mut current_cost = initial_cost;
        let mut best = expr.clone();
        let mut best_cost = initial_cost;

        let mut temperature = cfg.max_temperature;
        let mut attempts = 0u32;
        let mut totals = Totals::default();
        let mut history = Vec::new();

        let stop_reason = if module_count < 2 {
            StopReason::TrivialInstance
        } else {
            loop {
                let mut moves_tried = 0u64;
                let mut uphill = 0u64;
                let mut rejected = 0u64;
                let mut failed_in_row = 0u64;

                while uphill < max_runs && moves_tried < max_moves {
                    let kind = MoveKind::select(temperature / cfg.max_temperature, rng.gen());
                    let snapshot = expr.clone();

                    if !expr.apply_move(kind, cfg.m3_retry_budget, rng) {
                        totals.failed_moves += 1;
                        failed_in_row += 1;
                        if failed_in_row >= max_failed {
                            log::warn!(
                                "Attempt {}: {} consecutive failed moves, ending attempt",
                                attempts + 1,
                                failed_in_row
                            );
                            break;
                        }
                        continue;
                    }
                    failed_in_row = 0;
                    moves_tried += 1;

                    let new_cost = compute_area(&expr, &self.catalog)?;
                    let delta = new_cost - current_cost;

                    // Metropolis criterion
                    if delta <= 0.0 || rng.gen::<f64>() < (-delta / temperature).exp() {
                        totals.accepted += 1;
                        if delta > 0.0 {
                            uphill += 1;
                        }
                        current_cost = new_cost;
                        if new_cost < best_cost {
                            best = expr.clone();
                            best_cost = new_cost;
                        }
                    } else {
                        expr = snapshot;
                        rejected += 1;
                    }
                }

                attempts += 1;
                totals.moves_tried += moves_tried;
                totals.uphill += uphill;
                totals.rejected += rejected;
                history.push(best_cost);

                // An attempt without tried moves says nothing about rejection.
                let reject_ratio =
                    (moves_tried > 0).then(|| rejected as f64 / moves_tried as f64);

                let report = AttemptReport {
                    attempt: attempts,
                    temperature,
                    best_cost,
                    current_cost,
                    moves_tried,
                    uphill,
                    rejected,
                    reject_ratio,
                    elapsed: start.elapsed(),
                };
                log::debug!(
                    "SA floorplan attempt {}: temp={:.4}, best_cost={:.4}, moves={}, reject_ratio={:?}",
                    report.attempt,
                    report.temperature,
                    report.best_cost,
                    report.moves_tried,
                    report.reject_ratio
                );
                progress(&report);

                temperature *= cfg.cooling_rate;

                if reject_ratio.map_or(false, |r| r >= cfg.reject_ratio_limit) {
                    break StopReason::RejectRatio;
                }
                if temperature <= cfg.min_temperature {
                    break StopReason::TemperatureFloor;
                }
                if let Some(limit) = cfg.time_limit {
                    if start.elapsed() > limit {
                        break StopReason::TimeLimit;
                    }
                }
            }
        };

        log::info!(
            "SA floorplan finished after {} attempts ({:?}): best_cost={:.4}, initial_cost={:.4}",
            attempts,
            stop_reason,
            best_cost,
            initial_cost
        );

        let mut catalog = self.catalog.clone();
        compute_layout(&best, &mut catalog)?;

        Ok(FloorplanResult {
            best_expression: best,
            best_cost,
            initial_cost,
            catalog,
            attempts,
            moves_tried: totals.moves_tried,
            accepted: totals.accepted,
            uphill: totals.uphill,
            rejected: totals.rejected,
            failed_moves: totals.failed_moves,
            final_temperature: temperature,
            elapsed: start.elapsed(),
            history,
            stop_reason,
        })
    }
}

/// Uphill-move and tried-move limits of one attempt, saturating on overflow.
fn attempt_budget(run_multiplier: usize, module_count: usize) -> (u64, u64) {
    let max_runs = u64::try_from(run_multiplier.saturating_mul(module_count))
        .unwrap_or(u64::MAX);
    (max_runs, max_runs.saturating_mul(2))
}

//! Neighborhood moves over polish expressions.
//!
//! # Moves
//!
//! - **M1 operand swap**: exchange two random operands. Prefix counts are untouched.
//! - **M2 chain invert**: flip a random operator and the operator run around it.
//! - **M3 operand/operator swap**: exchange an operand with an adjacent
//!   operator when the result stays a normalized polish expression.
//!
//! Every move keeps a valid expression valid. A move that finds nothing to do
//! reports `false` and leaves the expression unchanged.

use crate::expression::{PolishExpression, Token};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of candidate operands M3 inspects before giving up.
pub const DEFAULT_M3_RETRY_BUDGET: usize = 100;

/// Move families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveKind {
    /// M1.
    OperandSwap,
    /// M2.
    ChainInvert,
    /// M3.
    OperandOperatorSwap,
}

impl MoveKind {
    /// Picks a move family from the temperature ratio `temperature / max_temperature`
    /// and a uniform draw in `[0, 1)`.
    ///
    /// | ratio        | M1   | M2   | M3   |
    /// |--------------|------|------|------|
    /// | >= 0.75      | 0.25 | 0.37 | 0.38 |
    /// | 0.25 .. 0.75 | 0.33 | 0.33 | 0.34 |
    /// | < 0.25       | 0.37 | 0.38 | 0.25 |
    pub fn select(temperature_ratio: f64, draw: f64) -> Self {
        let (m1, m2) = if temperature_ratio >= 0.75 {
            (0.25, 0.62)
        } else if temperature_ratio >= 0.25 {
            (0.33, 0.66)
        } else {
            (0.37, 0.75)
        };

        if draw < m1 {
            MoveKind::OperandSwap
        } else if draw < m2 {
            MoveKind::ChainInvert
        } else {
            MoveKind::OperandOperatorSwap
        }
    }

    /// Short label (`M1`, `M2`, `M3`).
    pub fn label(self) -> &'static str {
        match self {
            MoveKind::OperandSwap => "M1",
            MoveKind::ChainInvert => "M2",
            MoveKind::OperandOperatorSwap => "M3",
        }
    }
}

impl PolishExpression {
    /// Samples indices uniformly until one of the requested class is found.
    ///
    /// Returns `None` when the expression has no token of that class.
    pub fn find_element<R: Rng>(&self, want_operator: bool, rng: &mut R) -> Option<usize> {
        let available = if want_operator {
            self.operator_total()
        } else {
            self.operand_total()
        };
        if available == 0 {
            return None;
        }
        loop {
            let idx = rng.gen_range(0..self.len());
            if self.tokens()[idx].is_operator() == want_operator {
                return Some(idx);
            }
        }
    }

    /// Applies a move of the given family.
    pub fn apply_move<R: Rng>(
        &mut self,
        kind: MoveKind,
        m3_retry_budget: usize,
        rng: &mut R,
    ) -> bool {
        match kind {
            MoveKind::OperandSwap => self.apply_operand_swap(rng),
            MoveKind::ChainInvert => self.apply_chain_invert(rng),
            MoveKind::OperandOperatorSwap => {
                self.apply_operand_operator_swap(m3_retry_budget, rng)
            }
        }
    }

    /// M1: swaps two distinct operands. Fails only with fewer than two operands.
    pub fn apply_operand_swap<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.operand_total() < 2 {
            return false;
        }
        let Some(first) = self.find_element(false, rng) else {
            return false;
        };
        let second = loop {
            match self.find_element(false, rng) {
                Some(idx) if idx != first => break idx,
                Some(_) => continue,
                None => return false,
            }
        };
        self.swap_operands(first, second);
        true
    }

    /// M2: flips a random operator, then the operators directly to its left
    /// and directly to its right. Fails only if there is no operator.
    pub fn apply_chain_invert<R: Rng>(&mut self, rng: &mut R) -> bool {
        let Some(start) = self.find_element(true, rng) else {
            return false;
        };
        self.invert_chain(start);
        true
    }

    /// Flips the maximal operator run containing `start`.
    ///
    /// Applying it twice with the same `start` restores the expression.
    pub fn invert_chain(&mut self, start: usize) {
        self.invert_at(start);

        let mut left = start;
        while left > 0 && self.tokens()[left - 1].is_operator() {
            left -= 1;
            self.invert_at(left);
        }

        let mut right = start;
        while right + 1 < self.len() && self.tokens()[right + 1].is_operator() {
            right += 1;
            self.invert_at(right);
        }
    }

    /// M3: swaps an operand with an adjacent operator.
    ///
    /// Up to `retry_budget` random operands are inspected. For each, the
    /// operator on its left is tried first, then the one on its right. A swap
    /// is kept only if it cannot create two equal adjacent operators and the
    /// balloting property holds at both positions afterwards.
    pub fn apply_operand_operator_swap<R: Rng>(
        &mut self,
        retry_budget: usize,
        rng: &mut R,
    ) -> bool {
        if self.operator_total() == 0 {
            return false;
        }
        for _ in 0..retry_budget {
            let Some(operand) = self.find_element(false, rng) else {
                return false;
            };

            if operand > 0 && self.can_shift_operator_right(operand) {
                if self.swap_adjacent(operand, operand - 1) {
                    return true;
                }
                self.swap_adjacent(operand - 1, operand);
            }

            if operand + 1 < self.len() && self.can_shift_operator_left(operand) {
                if self.swap_adjacent(operand, operand + 1) {
                    return true;
                }
                self.swap_adjacent(operand + 1, operand);
            }
        }
        log::trace!("M3 found no legal swap in {} tries", retry_budget);
        false
    }

    /// Whether the operator at `operand - 1` may move to `operand`.
    fn can_shift_operator_right(&self, operand: usize) -> bool {
        let tokens = self.tokens();
        let Token::Operator(moving) = tokens[operand - 1] else {
            return false;
        };
        // Operators up to the operator's new position; unchanged by the swap.
        if 2 * self.operator_counts()[operand] >= operand + 1 {
            return false;
        }
        match tokens.get(operand + 1) {
            Some(Token::Operator(next)) => *next != moving,
            _ => true,
        }
    }

    /// Whether the operator at `operand + 1` may move to `operand`.
    fn can_shift_operator_left(&self, operand: usize) -> bool {
        let tokens = self.tokens();
        let Token::Operator(moving) = tokens[operand + 1] else {
            return false;
        };
        // After the swap the prefix ending at `operand` holds this many operators.
        if 2 * self.operator_counts()[operand + 1] >= operand + 1 {
            return false;
        }
        match operand.checked_sub(1).map(|i| tokens[i]) {
            Some(Token::Operator(prev)) => prev != moving,
            _ => true,
        }
    }
}

//! Normalized polish expressions encoding slicing trees.
//!
//! An expression over `n` modules is a postfix sequence of `n` operands and
//! `n - 1` operators. Two prefix-count arrays make the balloting check at any
//! index O(1):
//!
//! - `operand_count[i]`: operands in `tokens[..=i]`
//! - `operator_count[i]`: operators in `tokens[..=i]`
//!
//! A valid expression satisfies `operand_count[i] > operator_count[i]` for
//! every `i` and never has two adjacent operators of the same partition type.

use crate::module::ModuleCatalog;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slicing cut type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Partition {
    /// `H`: children stacked, first child at the bottom.
    Horizontal,
    /// `V`: children side by side, first child on the left.
    Vertical,
}

impl Partition {
    /// Returns the opposite cut.
    pub fn invert(self) -> Self {
        match self {
            Partition::Horizontal => Partition::Vertical,
            Partition::Vertical => Partition::Horizontal,
        }
    }

    /// Returns the single-letter symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Partition::Horizontal => "H",
            Partition::Vertical => "V",
        }
    }
}

impl FromStr for Partition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "H" => Ok(Partition::Horizontal),
            "V" => Ok(Partition::Vertical),
            other => Err(Error::InvalidToken(other.to_string())),
        }
    }
}

impl TryFrom<&str> for Partition {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One element of a polish expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Token {
    /// Index of a module in the catalog.
    Operand(usize),
    /// A partition combining the two preceding subtrees.
    Operator(Partition),
}

impl Token {
    /// Returns true for `H`/`V` tokens.
    pub fn is_operator(self) -> bool {
        matches!(self, Token::Operator(_))
    }

    /// Returns the partition if this is an operator.
    pub fn partition(self) -> Option<Partition> {
        match self {
            Token::Operator(p) => Some(p),
            Token::Operand(_) => None,
        }
    }
}

/// A polish expression together with its prefix-count arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolishExpression {
    tokens: Vec<Token>,
    operand_count: Vec<usize>,
    operator_count: Vec<usize>,
}

impl PolishExpression {
    /// Builds the initial chain-shaped expression over `module_count` modules.
    ///
    /// Modules are taken in catalog order: first operand, second operand, `V`,
    /// then one `V` after every following operand (`0 1 V 2 V 3 V ...`).
    pub fn new_chain(module_count: usize) -> Self {
        let mut tokens = Vec::with_capacity((2 * module_count).saturating_sub(1));
        for idx in 0..module_count {
            tokens.push(Token::Operand(idx));
            if idx >= 1 {
                tokens.push(Token::Operator(Partition::Vertical));
            }
        }
        Self::from_tokens(tokens)
    }

    /// Wraps a token sequence and computes its prefix counts.
    ///
    /// No validation is done; see [`PolishExpression::validate`].
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut expr = Self {
            tokens,
            operand_count: Vec::new(),
            operator_count: Vec::new(),
        };
        expr.rebuild_counts();
        expr
    }

    /// Parses module names and `H`/`V` symbols against a catalog.
    pub fn from_names<S: AsRef<str>>(catalog: &ModuleCatalog, names: &[S]) -> Result<Self> {
        let tokens = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                match name.parse::<Partition>() {
                    Ok(p) => Ok(Token::Operator(p)),
                    Err(_) => catalog
                        .index_of(name)
                        .map(Token::Operand)
                        .ok_or_else(|| Error::UnknownModule(name.to_string())),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let expr = Self::from_tokens(tokens);
        expr.validate(catalog.len())?;
        Ok(expr)
    }

    /// Replaces the held sequence wholesale and recomputes the prefix counts.
    pub fn update_expression(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.rebuild_counts();
    }

    fn rebuild_counts(&mut self) {
        self.operand_count.clear();
        self.operator_count.clear();
        let (mut operands, mut operators) = (0, 0);
        for token in &self.tokens {
            if token.is_operator() {
                operators += 1;
            } else {
                operands += 1;
            }
            self.operand_count.push(operands);
            self.operator_count.push(operators);
        }
    }

    /// Returns the token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the operand prefix counts.
    pub fn operand_counts(&self) -> &[usize] {
        &self.operand_count
    }

    /// Returns the operator prefix counts.
    pub fn operator_counts(&self) -> &[usize] {
        &self.operator_count
    }

    /// Number of tokens (`2n - 1` for a valid expression).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the expression holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Total number of operands.
    pub fn operand_total(&self) -> usize {
        self.operand_count.last().copied().unwrap_or(0)
    }

    /// Total number of operators.
    pub fn operator_total(&self) -> usize {
        self.operator_count.last().copied().unwrap_or(0)
    }

    /// Balloting property at `index`: more operands than operators so far.
    pub fn check_balloting(&self, index: usize) -> bool {
        self.operand_count[index] > self.operator_count[index]
    }

    /// Exchanges two tokens without touching the prefix counts.
    ///
    /// Only valid when both tokens are of the same class (operand/operand),
    /// which leaves every prefix count unchanged.
    pub fn swap_operands(&mut self, i: usize, j: usize) {
        debug_assert_eq!(self.tokens[i].is_operator(), self.tokens[j].is_operator());
        self.tokens.swap(i, j);
    }

    /// Exchanges two adjacent tokens and maintains the prefix counts.
    ///
    /// Returns whether the balloting property holds at both positions after
    /// the swap. Calling it again with the same positions undoes the swap.
    pub fn swap_adjacent(&mut self, i: usize, j: usize) -> bool {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        assert_eq!(hi - lo, 1, "swap_adjacent needs neighbouring positions");

        // Only the count at `lo` changes; `hi` sees both tokens either way.
        match (self.tokens[lo].is_operator(), self.tokens[hi].is_operator()) {
            (false, true) => {
                self.operand_count[lo] -= 1;
                self.operator_count[lo] += 1;
            }
            (true, false) => {
                self.operand_count[lo] += 1;
                self.operator_count[lo] -= 1;
            }
            _ => {}
        }
        self.tokens.swap(lo, hi);

        self.check_balloting(lo) && self.check_balloting(hi)
    }

    /// Flips the partition at `index`. Panics if it is an operand.
    pub(crate) fn invert_at(&mut self, index: usize) {
        match &mut self.tokens[index] {
            Token::Operator(p) => *p = p.invert(),
            Token::Operand(_) => panic!("token {} is not an operator", index),
        }
    }

    /// Checks every structural invariant for an expression over `module_count`
    /// modules: length, class totals, balloting, normalization and that each
    /// module appears exactly once.
    pub fn validate(&self, module_count: usize) -> Result<()> {
        let expected_len = (2 * module_count).saturating_sub(1);
        if self.tokens.len() != expected_len {
            return Err(Error::InvalidExpression(format!(
                "length {} != {} for {} modules",
                self.tokens.len(),
                expected_len,
                module_count
            )));
        }
        if self.operand_total() != module_count {
            return Err(Error::InvalidExpression(format!(
                "{} operands for {} modules",
                self.operand_total(),
                module_count
            )));
        }

        let mut seen = vec![false; module_count];
        for (i, token) in self.tokens.iter().enumerate() {
            if !self.check_balloting(i) {
                return Err(Error::InvalidExpression(format!(
                    "balloting violated at index {}",
                    i
                )));
            }
            match *token {
                Token::Operand(m) => {
                    if m >= module_count || std::mem::replace(&mut seen[m], true) {
                        return Err(Error::InvalidExpression(format!(
                            "operand {} at index {} is out of range or repeated",
                            m, i
                        )));
                    }
                }
                Token::Operator(p) => {
                    if i > 0 && self.tokens[i - 1] == Token::Operator(p) {
                        return Err(Error::InvalidExpression(format!(
                            "adjacent {} operators at index {}",
                            p,
                            i - 1
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Renders the tokens as module names and partition symbols.
    pub fn to_names(&self, catalog: &ModuleCatalog) -> Vec<String> {
        self.tokens
            .iter()
            .map(|token| match *token {
                Token::Operand(m) => catalog.get(m).name().to_string(),
                Token::Operator(p) => p.symbol().to_string(),
            })
            .collect()
    }

    /// Returns a `Display` adapter printing the expression with module names.
    pub fn display<'a>(&'a self, catalog: &'a ModuleCatalog) -> ExpressionDisplay<'a> {
        ExpressionDisplay {
            expr: self,
            catalog,
        }
    }
}

/// Space-separated rendering of an expression.
pub struct ExpressionDisplay<'a> {
    expr: &'a PolishExpression,
    catalog: &'a ModuleCatalog,
}

impl fmt::Display for ExpressionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.expr.to_names(self.catalog).iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;

    fn catalog(names: &[&str]) -> ModuleCatalog {
        ModuleCatalog::from_modules(
            names
                .iter()
                .map(|n| Module::from_area(*n, 4.0, 1.0).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_partition_parse_and_invert() {
        assert_eq!("H".parse::<Partition>().unwrap(), Partition::Horizontal);
        assert_eq!(Partition::try_from("V").unwrap(), Partition::Vertical);
        assert!(matches!(
            "X".parse::<Partition>(),
            Err(Error::InvalidToken(s)) if s == "X"
        ));
        assert_eq!(Partition::Horizontal.invert(), Partition::Vertical);
        assert_eq!(Partition::Vertical.invert().invert(), Partition::Vertical);
    }

    #[test]
    fn test_chain_shape() {
        for n in 1..8 {
            let expr = PolishExpression::new_chain(n);
            assert_eq!(expr.len(), 2 * n - 1);
            assert_eq!(expr.operand_total(), n);
            assert_eq!(expr.operator_total(), n - 1);
            expr.validate(n).unwrap();
        }
    }

    #[test]
    fn test_chain_three_modules() {
        let cat = catalog(&["A", "B", "C"]);
        let expr = PolishExpression::new_chain(3);
        assert_eq!(expr.to_names(&cat), vec!["A", "B", "V", "C", "V"]);
        assert_eq!(expr.operand_counts(), &[1, 2, 2, 3, 3]);
        assert_eq!(expr.operator_counts(), &[0, 0, 1, 1, 2]);
        assert!((0..expr.len()).all(|i| expr.check_balloting(i)));
        assert_eq!(expr.display(&cat).to_string(), "A B V C V");
    }

    #[test]
    fn test_empty_chain() {
        let expr = PolishExpression::new_chain(0);
        assert!(expr.is_empty());
        expr.validate(0).unwrap();
    }

    #[test]
    fn test_from_names() {
        let cat = catalog(&["A", "B", "C"]);
        let expr = PolishExpression::from_names(&cat, &["A", "B", "C", "H", "V"]).unwrap();
        assert_eq!(expr.tokens()[3], Token::Operator(Partition::Horizontal));

        assert!(matches!(
            PolishExpression::from_names(&cat, &["A", "Q", "V", "C", "V"]),
            Err(Error::UnknownModule(n)) if n == "Q"
        ));
        assert!(PolishExpression::from_names(&cat, &["A", "V", "B", "C", "V"]).is_err());
        assert!(PolishExpression::from_names(&cat, &["A", "B", "C", "V", "V"]).is_err());
        assert!(PolishExpression::from_names(&cat, &["A", "A", "V", "C", "V"]).is_err());
    }

    #[test]
    fn test_update_expression_round_trip() {
        let cat = catalog(&["A", "B", "C", "D"]);
        let target =
            PolishExpression::from_names(&cat, &["A", "B", "H", "C", "D", "H", "V"]).unwrap();

        let mut expr = PolishExpression::new_chain(4);
        expr.update_expression(target.tokens().to_vec());

        assert_eq!(expr.tokens(), target.tokens());
        let fresh = PolishExpression::from_tokens(expr.tokens().to_vec());
        assert_eq!(expr.operand_counts(), fresh.operand_counts());
        assert_eq!(expr.operator_counts(), fresh.operator_counts());
    }

    #[test]
    fn test_swap_adjacent_maintains_counts() {
        let cat = catalog(&["A", "B", "C"]);
        // A B V C V -> A B C V V is not normalized but the counts must track.
        let mut expr = PolishExpression::new_chain(3);
        let ok = expr.swap_adjacent(3, 2);
        assert!(ok);
        assert_eq!(expr.to_names(&cat), vec!["A", "B", "C", "V", "V"]);
        let fresh = PolishExpression::from_tokens(expr.tokens().to_vec());
        assert_eq!(expr.operand_counts(), fresh.operand_counts());
        assert_eq!(expr.operator_counts(), fresh.operator_counts());

        // Undo restores the original verbatim.
        expr.swap_adjacent(2, 3);
        assert_eq!(expr, PolishExpression::new_chain(3));
    }

    #[test]
    fn test_swap_adjacent_reports_balloting_failure() {
        // A B V C V: moving the first V left gives A V B C V.
        let mut expr = PolishExpression::new_chain(3);
        assert!(!expr.swap_adjacent(1, 2));
        assert!(!expr.check_balloting(1));
        expr.swap_adjacent(1, 2);
        assert_eq!(expr, PolishExpression::new_chain(3));
    }

    #[test]
    #[should_panic]
    fn test_swap_adjacent_rejects_distant_positions() {
        let mut expr = PolishExpression::new_chain(3);
        expr.swap_adjacent(0, 2);
    }

    #[test]
    fn test_swap_operands_keeps_counts() {
        let mut expr = PolishExpression::new_chain(3);
        let before = (expr.operand_counts().to_vec(), expr.operator_counts().to_vec());
        expr.swap_operands(0, 3);
        assert_eq!(expr.tokens()[0], Token::Operand(2));
        assert_eq!(expr.tokens()[3], Token::Operand(0));
        assert_eq!(expr.operand_counts(), &before.0[..]);
        assert_eq!(expr.operator_counts(), &before.1[..]);
    }
}

//! Property tests: every move keeps a polish expression valid.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_floorplan_core::{
    compute_area, compute_layout, Module, ModuleCatalog, MoveKind, PolishExpression,
    DEFAULT_M3_RETRY_BUDGET,
};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_move() -> impl Strategy<Value = MoveKind> {
    prop_oneof![
        Just(MoveKind::OperandSwap),
        Just(MoveKind::ChainInvert),
        Just(MoveKind::OperandOperatorSwap),
    ]
}

/// A catalog of `n` modules with arbitrary positive sizes.
fn arb_catalog(max: usize) -> impl Strategy<Value = ModuleCatalog> {
    prop::collection::vec((0.5f64..50.0, 0.25f64..4.0), 1..max).prop_map(|specs| {
        ModuleCatalog::from_modules(
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (area, ratio))| {
                    Module::from_area(format!("m{}", i), area, ratio).unwrap()
                }),
        )
        .unwrap()
    })
}

/// Drives a chain expression through a sequence of moves.
fn scramble(n: usize, moves: &[MoveKind], seed: u64) -> PolishExpression {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut expr = PolishExpression::new_chain(n);
    for kind in moves {
        expr.apply_move(*kind, DEFAULT_M3_RETRY_BUDGET, &mut rng);
    }
    expr
}

fn assert_counts_fresh(expr: &PolishExpression) {
    let fresh = PolishExpression::from_tokens(expr.tokens().to_vec());
    assert_eq!(expr.operand_counts(), fresh.operand_counts());
    assert_eq!(expr.operator_counts(), fresh.operator_counts());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn chain_has_expected_shape(n in 1usize..60) {
        let expr = PolishExpression::new_chain(n);
        prop_assert_eq!(expr.len(), 2 * n - 1);
        prop_assert_eq!(expr.operand_total(), n);
        prop_assert_eq!(expr.operator_total(), n - 1);
        prop_assert!(expr.validate(n).is_ok());
    }

    #[test]
    fn moves_preserve_validity(
        n in 2usize..20,
        moves in prop::collection::vec(arb_move(), 0..200),
        seed in any::<u64>(),
    ) {
        let expr = scramble(n, &moves, seed);
        prop_assert!(expr.validate(n).is_ok(), "{:?}", expr.tokens());
        assert_counts_fresh(&expr);
    }

    #[test]
    fn operand_swap_preserves_counts(
        n in 2usize..20,
        moves in prop::collection::vec(arb_move(), 0..50),
        seed in any::<u64>(),
    ) {
        let mut expr = scramble(n, &moves, seed);
        let operands = expr.operand_counts().to_vec();
        let operators = expr.operator_counts().to_vec();

        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        prop_assert!(expr.apply_operand_swap(&mut rng));
        prop_assert_eq!(expr.operand_counts(), &operands[..]);
        prop_assert_eq!(expr.operator_counts(), &operators[..]);
    }

    #[test]
    fn chain_invert_is_an_involution(
        n in 2usize..20,
        moves in prop::collection::vec(arb_move(), 0..50),
        seed in any::<u64>(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut expr = scramble(n, &moves, seed);
        let original = expr.clone();
        let operators: Vec<usize> = (0..expr.len())
            .filter(|&i| expr.tokens()[i].is_operator())
            .collect();
        let start = operators[pick.index(operators.len())];

        expr.invert_chain(start);
        prop_assert!(expr.validate(n).is_ok());
        expr.invert_chain(start);
        prop_assert_eq!(expr, original);
    }

    #[test]
    fn successful_m3_keeps_swapped_positions_valid(
        n in 3usize..20,
        moves in prop::collection::vec(arb_move(), 0..50),
        seed in any::<u64>(),
    ) {
        let mut expr = scramble(n, &moves, seed);
        let before = expr.clone();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));

        if expr.apply_operand_operator_swap(DEFAULT_M3_RETRY_BUDGET, &mut rng) {
            let changed: Vec<usize> = (0..expr.len())
                .filter(|&i| expr.tokens()[i] != before.tokens()[i])
                .collect();
            prop_assert_eq!(changed.len(), 2);
            prop_assert_eq!(changed[1], changed[0] + 1);
            for &i in &changed {
                prop_assert!(expr.check_balloting(i));
            }
            prop_assert!(expr.validate(n).is_ok());
        } else {
            prop_assert_eq!(expr, before);
        }
    }

    #[test]
    fn update_expression_round_trip(
        n in 1usize..20,
        moves in prop::collection::vec(arb_move(), 0..100),
        seed in any::<u64>(),
    ) {
        let source = scramble(n, &moves, seed);
        let mut target = PolishExpression::new_chain(n);
        target.update_expression(source.tokens().to_vec());

        prop_assert_eq!(target.tokens(), source.tokens());
        assert_counts_fresh(&target);
    }

    #[test]
    fn evaluation_is_deterministic(
        mut catalog in arb_catalog(15),
        moves in prop::collection::vec(arb_move(), 0..100),
        seed in any::<u64>(),
    ) {
        let n = catalog.len();
        let expr = scramble(n, &moves, seed);

        let area = compute_area(&expr, &catalog).unwrap();
        prop_assert_eq!(compute_area(&expr, &catalog).unwrap(), area);
        prop_assert!(area + 1e-9 >= catalog.total_module_area() * (1.0 - 1e-12));

        let first = compute_layout(&expr, &mut catalog).unwrap();
        let placed: Vec<(f64, f64)> = catalog.iter().map(|m| m.placement()).collect();
        let second = compute_layout(&expr, &mut catalog).unwrap();
        let replaced: Vec<(f64, f64)> = catalog.iter().map(|m| m.placement()).collect();

        prop_assert_eq!(first, area);
        prop_assert_eq!(second, area);
        prop_assert_eq!(placed, replaced);
    }
}

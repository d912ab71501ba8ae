//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. PnL offset invariance — a constant added to one leg leaves PnL unchanged
//! 2. Rebalance cadence — the hedge ratio only changes on rebalance bars
//! 3. Pre-pass equality — the vectorised hedge ratio series is bit-identical
//! 4. Inventory invariant — positions never exceed the per-leg cap, for
//!    band multiples and for target notional caps
//! 5. Warmup — no position and no PnL before the first fit

use proptest::prelude::*;
use spreadlab_core::components::signal::{map_angle, unit_vector};
use spreadlab_core::domain::{LegPosition, PairBar};
use spreadlab_core::engine::{estimate_series, run_backtest, PnlLedger};
use spreadlab_core::synthetic::{generate_pair, SyntheticPairConfig};
use spreadlab_core::{EngineConfig, StrategyConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_series() -> impl Strategy<Value = Vec<PairBar>> {
    (any::<u64>(), 400..900usize, 0.5..0.99_f64).prop_map(|(seed, bars, persistence)| {
        generate_pair(&SyntheticPairConfig {
            bars,
            seed,
            persistence,
            ..Default::default()
        })
    })
}

fn arb_strategy() -> impl Strategy<Value = StrategyConfig> {
    prop_oneof![
        (1.0..3.0_f64, 0.0..0.9_f64, 10..80usize).prop_map(|(entry, exit, window)| {
            StrategyConfig::ZScore {
                entry_threshold: entry,
                exit_threshold: exit,
                window,
            }
        }),
        (0.001..0.02_f64, 1..5u32, 2..10usize).prop_map(|(entry, hold, trend)| {
            StrategyConfig::Ecm {
                entry_threshold: entry,
                exit_threshold: entry / 10.0,
                entry_hold_required: hold,
                trend_window: trend,
                regression_window: None,
            }
        }),
        (-1.0..=1.0_f64, -1.0..=1.0_f64, 1.0..20.0_f64, 1..6u32).prop_map(
            |(signal_angle, trading_angle, margin_factor, nc2l)| StrategyConfig::RotatedBand {
                signal_angle,
                trading_angle,
                margin_factor,
                nc2l,
            }
        ),
    ]
}

fn arb_price_path() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((50.0..150.0_f64, 20.0..80.0_f64), 2..60)
}

fn arb_positions(n: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-50.0..50.0_f64, -50.0..50.0_f64), n)
}

fn bars_from(prices: &[(f64, f64)], offset_a: f64, offset_b: f64) -> Vec<PairBar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| {
            PairBar::new(
                base + chrono::Duration::minutes(i as i64),
                a + offset_a,
                b + offset_b,
            )
        })
        .collect()
}

fn ledger_pnl(bars: &[PairBar], positions: &[(f64, f64)]) -> f64 {
    let mut ledger = PnlLedger::new();
    ledger.open();
    for i in 1..bars.len() {
        let (qa, qb) = positions[i - 1];
        ledger.mark(&LegPosition::new(qa, qb), &bars[i - 1], &bars[i]);
    }
    ledger.cumulative()
}

// ── 1. PnL Offset Invariance ─────────────────────────────────────────

proptest! {
    /// Adding a constant to every price of one leg does not change PnL.
    #[test]
    fn pnl_invariant_to_price_offset(
        (prices, positions) in arb_price_path()
            .prop_flat_map(|p| { let n = p.len(); (Just(p), arb_positions(n)) }),
        offset in -40.0..1000.0_f64,
        on_leg_a in any::<bool>(),
    ) {
        let base = ledger_pnl(&bars_from(&prices, 0.0, 0.0), &positions);
        let (oa, ob) = if on_leg_a { (offset, 0.0) } else { (0.0, offset) };
        let shifted = ledger_pnl(&bars_from(&prices, oa, ob), &positions);
        let tol = 1e-9 * (1.0 + offset.abs()) * positions.len() as f64 * 50.0;
        prop_assert!((base - shifted).abs() <= tol, "base={base}, shifted={shifted}");
    }
}

// ── 2–5. Engine Invariants ───────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The hedge ratio is a step function that only moves on rebalance bars.
    #[test]
    fn hedge_ratio_changes_only_on_cadence(
        bars in arb_series(),
        lookback in 20..200usize,
        rebalance in 1..40usize,
        strategy in arb_strategy(),
    ) {
        let cfg = EngineConfig::new(lookback, rebalance, 1000.0, strategy);
        let result = run_backtest(&cfg, &bars).unwrap();
        for i in 1..result.records.len() {
            let prev = result.records[i - 1].hedge_ratio;
            let curr = result.records[i].hedge_ratio;
            if prev.to_bits() != curr.to_bits() {
                prop_assert_eq!(i % rebalance, 0, "ratio moved at bar {}", i);
                prop_assert!(i >= lookback);
            }
        }
    }

    /// The one-pass hedge ratio series matches the sequential loop bit for bit.
    #[test]
    fn prepass_matches_sequential(
        bars in arb_series(),
        lookback in 20..200usize,
        rebalance in 1..40usize,
    ) {
        let cfg = EngineConfig::new(lookback, rebalance, 1000.0, StrategyConfig::zscore_default());
        let result = run_backtest(&cfg, &bars).unwrap();
        let a: Vec<f64> = bars.iter().map(|b| b.price_a).collect();
        let b: Vec<f64> = bars.iter().map(|b| b.price_b).collect();
        let prepass = estimate_series(&a, &b, lookback, rebalance);
        for (i, r) in result.records.iter().enumerate() {
            prop_assert_eq!(r.hedge_ratio.to_bits(), prepass[i].to_bits(), "bar {}", i);
        }
    }

    /// Band positions never exceed nc2l orders along the trading vector.
    #[test]
    fn band_inventory_within_cap(
        bars in arb_series(),
        signal_angle in -1.0..=1.0_f64,
        trading_angle in -1.0..=1.0_f64,
        margin_factor in 0.5..10.0_f64,
        nc2l in 1..6u32,
        order_size in 1.0..2000.0_f64,
    ) {
        let cfg = EngineConfig::new(
            50,
            5,
            order_size,
            StrategyConfig::RotatedBand { signal_angle, trading_angle, margin_factor, nc2l },
        );
        let result = run_backtest(&cfg, &bars).unwrap();
        let tv = unit_vector(map_angle(trading_angle));
        let unit = LegPosition::new(order_size * tv.0, order_size * tv.1);
        let limit = unit.abs().scaled(nc2l as f64);
        for r in &result.records {
            let held = LegPosition::new(r.position_a, r.position_b);
            prop_assert!(held.within(&limit), "{:?} exceeds {:?}", held, limit);
        }
    }

    /// Target-sized strategies only trade on rebalance bars, and on every bar
    /// each leg holds at most `multiple × order_size` of notional valued at
    /// the prices of the bar that set the position.
    #[test]
    fn target_positions_bounded_and_on_cadence(
        bars in arb_series(),
        rebalance in 1..20usize,
        multiple in 1..4u32,
        strategy in arb_strategy().prop_filter("target strategies", |s| {
            !matches!(s, StrategyConfig::RotatedBand { .. })
        }),
    ) {
        let mut cfg = EngineConfig::new(100, rebalance, 1000.0, strategy);
        cfg.inventory_limit_multiple = multiple;
        let result = run_backtest(&cfg, &bars).unwrap();
        for i in result.trade_bars() {
            prop_assert_eq!(i % rebalance, 0);
        }

        let cap = 1000.0 * multiple as f64 * (1.0 + 1e-12);
        let mut set_at = 0;
        for (i, r) in result.records.iter().enumerate() {
            if i > 0 {
                let prev = &result.records[i - 1];
                if prev.position_a != r.position_a || prev.position_b != r.position_b {
                    set_at = i;
                }
            }
            let priced = &bars[set_at];
            prop_assert!(
                (r.position_a * priced.price_a).abs() <= cap,
                "leg A notional {} over cap at bar {}", r.position_a * priced.price_a, i
            );
            prop_assert!(
                (r.position_b * priced.price_b).abs() <= cap,
                "leg B notional {} over cap at bar {}", r.position_b * priced.price_b, i
            );
        }
    }

    /// Before the first fit there is no position and no PnL.
    #[test]
    fn flat_until_first_fit(
        bars in arb_series(),
        lookback in 20..300usize,
        rebalance in 1..40usize,
        strategy in arb_strategy(),
    ) {
        let cfg = EngineConfig::new(lookback, rebalance, 1000.0, strategy);
        let result = run_backtest(&cfg, &bars).unwrap();
        let first = result.first_active().unwrap_or(result.records.len());
        prop_assert!(first >= lookback);
        for r in &result.records[..first] {
            prop_assert!(r.hedge_ratio.is_nan());
            prop_assert_eq!(r.position_a, 0.0);
            prop_assert_eq!(r.position_b, 0.0);
            prop_assert_eq!(r.pnl, 0.0);
        }
    }
}

//! Criterion benchmarks for trailguard hot paths.
//!
//! Benchmarks:
//! 1. Adaptive pricing pipeline (full evaluate per tick)
//! 2. Stop resolution (cached fast path vs full scan)
//! 3. Trailing state machine (hold and modify ticks)

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::{DateTime, Utc};
use trailguard::domain::{
    stop_tag, OrderId, OrderStatus, PipDefinition, Position, PositionId, ProtectiveOrder, Side,
};
use trailguard::policy;
use trailguard::tracker::{resolve_active_stop, OrderRef};
use trailguard::trailing::{TrailingConfig, TrailingState};
use trailguard::Config;

// ── Helpers ──────────────────────────────────────────────────────────

fn ts() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-15T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn stop_order(id: u64, trigger: f64, status: OrderStatus) -> ProtectiveOrder {
    ProtectiveOrder {
        id: OrderId(id),
        symbol: "EURUSD".into(),
        side: Side::Short,
        trigger_price: trigger,
        status,
        tags: vec![stop_tag(&PositionId::from("P-1"))],
    }
}

/// An order history with `n` terminal predecessors and one live stop.
fn order_history(n: u64) -> Vec<ProtectiveOrder> {
    let mut orders: Vec<ProtectiveOrder> = (1..=n)
        .map(|i| stop_order(i, 1.0850, OrderStatus::Canceled))
        .collect();
    orders.push(stop_order(n + 1, 1.0870, OrderStatus::Accepted));
    orders
}

fn long_position() -> Position {
    Position {
        id: PositionId::from("P-1"),
        symbol: "EURUSD".into(),
        side: Side::Long,
        entry_price: 1.0900,
        opened_at: ts(),
    }
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_policy_evaluate(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("policy_evaluate_all_stages", |b| {
        b.iter(|| {
            policy::evaluate(
                black_box(&config.policy),
                black_box(10.0),
                black_box(60.0),
                black_box(Some(12.0)),
                black_box(Some(27.5)),
                black_box(ts()),
            )
        })
    });
}

fn bench_stop_resolution(c: &mut Criterion) {
    let position_id = PositionId::from("P-1");
    let orders = order_history(200);

    c.bench_function("resolve_cold_scan_200", |b| {
        b.iter(|| {
            let mut cache = OrderRef::unknown();
            resolve_active_stop(black_box(&mut cache), &position_id, black_box(&orders))
        })
    });

    c.bench_function("resolve_cached_fast_path_200", |b| {
        let mut cache = OrderRef::unknown();
        resolve_active_stop(&mut cache, &position_id, &orders).unwrap();
        b.iter(|| resolve_active_stop(black_box(&mut cache), &position_id, black_box(&orders)))
    });
}

fn bench_trailing_tick(c: &mut Criterion) {
    let config = TrailingConfig {
        activation_threshold_pips: 20.0,
        trailing_distance_pips: 10.0,
    };
    let pip = PipDefinition::new(0.0001, 5).unwrap();
    let orders = order_history(10);

    c.bench_function("trailing_hold_tick", |b| {
        let mut state = TrailingState::new(&long_position());
        // Arm and commit once; pullback ticks below the stop then hold
        state.on_tick(&config, &pip, 1.0930, 10.0, &orders).unwrap();
        state.commit_modify(1.0920);
        b.iter(|| {
            state
                .on_tick(&config, &pip, black_box(1.0915), 10.0, &orders)
                .unwrap()
        })
    });

    c.bench_function("trailing_arm_and_modify_tick", |b| {
        b.iter(|| {
            let mut state = TrailingState::new(&long_position());
            state
                .on_tick(&config, &pip, black_box(1.0930), 10.0, &orders)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_policy_evaluate,
    bench_stop_resolution,
    bench_trailing_tick
);
criterion_main!(benches);

use std::hint::black_box;

use alloy_primitives::{B256, U256};
use criterion::{Criterion, criterion_group, criterion_main};

use clamm_engine::Pool;
use clamm_engine::math::math_helpers::mul_div;
use clamm_engine::math::swap_math::compute_swap_step;
use clamm_engine::math::tick_math::{get_sqrt_price_at_tick, get_tick_at_sqrt_price};
use clamm_engine::pool::liquidity::ModifyLiquidityParams;
use clamm_engine::pool::swap::SwapParams;

fn bench_tick_math(c: &mut Criterion) {
    let price = get_sqrt_price_at_tick(123_456).unwrap();

    c.bench_function("tick_math/get_sqrt_price_at_tick", |b| {
        b.iter(|| get_sqrt_price_at_tick(black_box(123_456)).unwrap())
    });
    c.bench_function("tick_math/get_tick_at_sqrt_price", |b| {
        b.iter(|| get_tick_at_sqrt_price(black_box(price)).unwrap())
    });
}

fn bench_mul_div(c: &mut Criterion) {
    let a = U256::from_limbs([u64::MAX, u64::MAX, 0xdead, 0]);
    let b_ = U256::from_limbs([u64::MAX, 0xbeef, 0, 0]);
    let d = U256::from_limbs([12345, 1, 0, 0]);

    c.bench_function("math_helpers/mul_div_wide", |b| {
        b.iter(|| mul_div(black_box(a), black_box(b_), black_box(d)).unwrap())
    });
}

fn bench_swap_step(c: &mut Criterion) {
    let current = get_sqrt_price_at_tick(0).unwrap();
    let target = get_sqrt_price_at_tick(-60).unwrap();

    c.bench_function("swap_math/compute_swap_step", |b| {
        b.iter(|| {
            compute_swap_step(
                black_box(current),
                black_box(target),
                black_box(2_000_000_000_000u128),
                black_box(U256::from(1_000_000u64)),
                true,
                3000,
            )
            .unwrap()
        })
    });
}

fn bench_pool_swap(c: &mut Criterion) {
    let mut pool = Pool::new();
    pool.initialize(get_sqrt_price_at_tick(0).unwrap(), 3000)
        .unwrap();
    for (lower, upper) in [(-600, 600), (-1200, -600), (600, 1200)] {
        pool.modify_liquidity(ModifyLiquidityParams {
            owner: alloy_primitives::Address::with_last_byte(1),
            tick_lower: lower,
            tick_upper: upper,
            liquidity_delta: 10_000_000_000,
            tick_spacing: 60,
            salt: B256::ZERO,
        })
        .unwrap();
    }

    let params = SwapParams {
        zero_for_one: true,
        amount_specified: U256::from(500_000_000u64),
        exact_output: false,
        sqrt_price_limit_x96: get_sqrt_price_at_tick(-900).unwrap(),
        tick_spacing: 60,
    };

    c.bench_function("pool/swap_across_ticks", |b| {
        b.iter(|| {
            let mut scratch = pool.clone();
            scratch.swap(black_box(params)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_tick_math,
    bench_mul_div,
    bench_swap_step,
    bench_pool_swap,
);
criterion_main!(benches);

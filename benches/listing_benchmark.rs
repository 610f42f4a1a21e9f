use criterion::{criterion_group, criterion_main, Criterion};
use point_rewards_client::models::{Category, Points, Prize};
use point_rewards_client::views::{CategoryFilter, PrizeFilter, PrizeSortField};
use std::hint::black_box;

fn synthetic_catalog(n: usize) -> Vec<Prize> {
    let categories = [Category::Cash, Category::Voucher, Category::Gift];
    (0..n)
        .map(|i| Prize {
            id: i as i64,
            name: format!("奖品 {}", i),
            description: Some(format!("Prize number {} in the benchmark catalog", i)),
            image: None,
            points: Points(((i * 37) % 5000) as f64 + 0.5),
            category: categories[i % categories.len()].clone(),
            stock: ((i * 13) % 40) as u32,
            created_at: None,
        })
        .collect()
}

fn benchmark_prize_listing(c: &mut Criterion) {
    let prizes = synthetic_catalog(10_000);

    let mut group = c.benchmark_group("prize_listing");

    let mut sorted = PrizeFilter::default();
    sorted.sort.toggle(PrizeSortField::Points);
    group.bench_function("sort_by_points", |b| {
        b.iter(|| sorted.apply(black_box(&prizes)).len())
    });

    let searched = PrizeFilter {
        search: "number 99".to_string(),
        category: CategoryFilter::Only(Category::Gift),
        ..PrizeFilter::default()
    };
    group.bench_function("search_and_category", |b| {
        b.iter(|| searched.apply(black_box(&prizes)).len())
    });

    let mut by_status = PrizeFilter::default();
    by_status.sort.toggle(PrizeSortField::Status);
    group.bench_function("sort_by_stock_status", |b| {
        b.iter(|| by_status.apply(black_box(&prizes)).len())
    });

    group.finish();
}

criterion_group!(benches, benchmark_prize_listing);
criterion_main!(benches);

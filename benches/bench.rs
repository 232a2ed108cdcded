// Criterion benchmarks for places core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use places_core::core::{
    distance::{distance_meters, haversine_distance},
    filters::filter_places,
    PlaceSearch, StaticCatalog,
};
use places_core::models::{Location, Place};
use std::sync::Arc;
use std::time::Duration;

const CATEGORIES: [&str; 6] = ["Restaurant", "Hotel", "Shopping", "Cafe", "Hospital", "Gas Station"];

fn create_place(id: usize, with_coordinates: bool) -> Place {
    let offset = (id as f64 * 0.001) % 0.5;
    Place {
        id: id.to_string(),
        name: format!("Place {}", id),
        address: format!("{} Market Street", id),
        category: CATEGORIES[id % CATEGORIES.len()].to_string(),
        rating: Some(3.0 + (id % 20) as f32 / 10.0),
        image_url: None,
        phone: None,
        opening_hours: None,
        is_open: Some(id % 4 != 0),
        distance: Some(((id * 37) % 5000) as f64),
        website: None,
        price_level: None,
        coordinates: with_coordinates.then(|| Location::new(37.7749 + offset, -122.4194 + offset)),
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(37.7749),
                black_box(-122.4194),
                black_box(37.8044),
                black_box(-122.2712),
            )
        });
    });
}

fn bench_distance_meters(c: &mut Criterion) {
    let here = Location::new(37.7749, -122.4194);
    let there = Location::new(37.8044, -122.2712);

    c.bench_function("distance_meters", |b| {
        b.iter(|| distance_meters(black_box(&here), black_box(&there)));
    });
}

fn bench_filter_places(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_places");

    for place_count in [10, 100, 1000, 10_000].iter() {
        let places: Vec<Place> = (0..*place_count).map(|i| create_place(i, false)).collect();

        group.bench_with_input(BenchmarkId::new("query_and_category", place_count), place_count, |b, _| {
            b.iter(|| filter_places(black_box(&places), black_box("market"), black_box("lodging")));
        });

        group.bench_with_input(BenchmarkId::new("all", place_count), place_count, |b, _| {
            b.iter(|| filter_places(black_box(&places), black_box(""), black_box("all")));
        });
    }

    group.finish();
}

fn bench_search_nearby(c: &mut Criterion) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(e) => panic!("failed to build runtime: {}", e),
    };
    let here = Location::new(37.7749, -122.4194);

    let mut group = c.benchmark_group("search_nearby");

    for place_count in [100, 1000].iter() {
        let places: Vec<Place> = (0..*place_count).map(|i| create_place(i, i % 2 == 0)).collect();
        let engine = PlaceSearch::new(Arc::new(StaticCatalog::new(places)))
            .with_latency(Duration::ZERO, Duration::ZERO);

        group.bench_with_input(BenchmarkId::new("mixed_coordinates", place_count), place_count, |b, _| {
            b.iter(|| runtime.block_on(engine.search_nearby(black_box(&here), black_box("all"))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_distance_meters,
    bench_filter_places,
    bench_search_nearby
);

criterion_main!(benches);

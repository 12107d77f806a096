//! Benchmarks for the per-frame hot path.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use sparkfield::draw::{draw, CommandRecorder};
use sparkfield::field::{step, StepContext};
use sparkfield::particle::{spawn_field, SeededSource};
use sparkfield::{Color, PixelCanvas, SparklesConfig};

fn field(width: u32, height: u32) -> Vec<sparkfield::Particle> {
    let config = SparklesConfig::default();
    spawn_field(&config, width, height, &mut SeededSource::new(7))
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for &(width, height) in &[(320u32, 240u32), (1280, 720)] {
        let mut particles = field(width, height);
        let bounds = Vec2::new(width as f32, height as f32);
        let mut t = 0.0;
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &bounds,
            |b, &bounds| {
                b.iter(|| {
                    t += 22.2;
                    step(black_box(&mut particles), &StepContext::new(bounds, 0.2, 0.8, t));
                })
            },
        );
    }

    group.finish();
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");
    let particles = field(1280, 720);

    group.bench_function("record", |b| {
        let mut recorder = CommandRecorder::new(1280, 720);
        b.iter(|| {
            draw(&mut recorder, black_box(&particles), Color::WHITE);
            recorder.take()
        })
    });

    group.bench_function("rasterize_1280x720", |b| {
        let mut canvas = PixelCanvas::new("bench", 1280, 720);
        b.iter(|| {
            sparkfield::DrawContext::clear(&mut canvas);
            draw(&mut canvas, black_box(&particles), Color::WHITE);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_draw);
criterion_main!(benches);

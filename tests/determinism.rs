//! Identical inputs give identical fields.

use sparkfield::offscreen::render_frames;
use sparkfield::prelude::*;
use sparkfield::Particle;

fn run(host: &OffscreenHost, sparkles: &mut Sparkles<OffscreenHost>, frames: usize) {
    for _ in 0..frames {
        for frame in host.tick() {
            sparkles.on_frame(frame, host.now());
        }
    }
}

fn trajectories(source: &mut impl ParticleSource) -> Vec<Vec<Particle>> {
    let host = OffscreenHost::new(Size::new(320, 240));
    let mut sparkles = Sparkles::mount_with_source(host.clone(), SparklesConfig::default(), source).unwrap();

    let mut snapshots = Vec::new();
    for _ in 0..20 {
        run(&host, &mut sparkles, 10);
        snapshots.push(sparkles.particles().to_vec());
    }
    snapshots
}

#[test]
fn same_seed_same_trajectories() {
    let a = trajectories(&mut SeededSource::new(42));
    let b = trajectories(&mut SeededSource::new(42));
    assert_eq!(a, b);

    let c = trajectories(&mut SeededSource::new(43));
    assert_ne!(a, c);
}

#[test]
fn same_sequence_same_trajectories() {
    let values = [0.1, 0.9, 0.35, 0.72, 0.5, 0.05, 0.61, 0.44, 0.83, 0.27, 0.18, 0.66];
    let a = trajectories(&mut SequenceSource::new(values));
    let b = trajectories(&mut SequenceSource::new(values));
    assert_eq!(a, b);
}

#[test]
fn same_seed_same_pixels() {
    let size = Size::new(160, 90);
    let (a, _) = render_frames(SparklesConfig::default(), size, 30, &mut SeededSource::new(9)).unwrap();
    let (b, _) = render_frames(SparklesConfig::default(), size, 30, &mut SeededSource::new(9)).unwrap();
    assert_eq!(a.to_premultiplied_bytes(), b.to_premultiplied_bytes());
}

#[test]
fn invariants_hold_over_a_long_run() {
    let config = SparklesConfig::default().with_speed_factor(25.0);
    let host = OffscreenHost::new(Size::new(180, 120));
    let mut sparkles = Sparkles::mount_with_source(host.clone(), config.clone(), &mut SeededSource::new(1)).unwrap();

    for _ in 0..100 {
        run(&host, &mut sparkles, 10);
        for p in sparkles.particles() {
            assert!((0.0..180.0).contains(&p.position.x), "x = {}", p.position.x);
            assert!((0.0..120.0).contains(&p.position.y), "y = {}", p.position.y);
            assert!(p.alpha >= config.alpha_floor && p.alpha <= config.alpha_ceiling);
        }
    }
}

use cgmath::Vector3;
use ember_scene::data_structures::particle::{Emitter, EmitterConfig};

use crate::common::test_utils::{assert_close, assert_vec_close, emitter_config};

mod common;

#[test]
fn lifetime_fraction_is_monotonic_in_age() {
    let emitter = Emitter::new(emitter_config(10, 0.0, 5.0));
    let mut previous = emitter.lifetime_fraction(0.0);
    assert_eq!(previous, 0.0);
    for step in 1..=100 {
        let fraction = emitter.lifetime_fraction(step as f32 * 0.05);
        assert!(fraction >= previous, "fraction fell at step {step}");
        previous = fraction;
    }
    assert_eq!(emitter.lifetime_fraction(5.0), 1.0);
    assert_eq!(emitter.lifetime_fraction(50.0), 1.0);
}

#[test]
fn zero_lifetime_is_fully_aged() {
    let emitter = Emitter::new(emitter_config(10, 0.0, 0.0));
    assert_eq!(emitter.lifetime_fraction(0.0), 1.0);
}

#[test]
fn one_second_at_default_rate_spawns_one_hundred() {
    let mut emitter = Emitter::new(EmitterConfig::default());
    emitter.update(1.0);
    assert_eq!(emitter.live_count(), 100);
    assert_eq!(emitter.spawn_counter(), 0.0);
}

#[test]
fn fractional_spawns_carry_over() {
    let mut emitter = Emitter::new(emitter_config(10, 2.0, 5.0));
    emitter.update(0.25);
    assert_eq!(emitter.live_count(), 0);
    assert_eq!(emitter.spawn_counter(), 0.5);
    emitter.update(0.25);
    assert_eq!(emitter.live_count(), 1);
    assert_eq!(emitter.spawn_counter(), 0.0);
}

#[test]
fn pool_never_exceeds_capacity() {
    let mut emitter = Emitter::new(emitter_config(10, 0.0, 5.0));
    emitter.emit(25);
    assert_eq!(emitter.live_count(), 10);

    // The fifteen oldest were recycled, the newest ten survive oldest first
    let ids: Vec<u64> = emitter.live_particles().map(|p| p.id).collect();
    assert_eq!(ids, (15..25).collect::<Vec<_>>());
}

#[test]
fn high_rate_stays_within_pool() {
    let mut emitter = Emitter::new(emitter_config(50, 1000.0, 5.0));
    for _ in 0..10 {
        emitter.update(0.1);
        assert!(emitter.live_count() <= emitter.capacity());
    }
    assert_eq!(emitter.live_count(), 50);
}

#[test]
fn huge_spawn_rate_fills_pool_and_returns() {
    let mut emitter = Emitter::new(emitter_config(10, 1e8, 5.0));
    emitter.update(0.25);
    assert_eq!(emitter.live_count(), emitter.capacity());
    assert!(emitter.spawn_counter() < 1.0);

    // Ids still count every requested spawn, newest ten survive
    let ids: Vec<u64> = emitter.live_particles().map(|p| p.id).collect();
    let last = ids[9];
    assert_eq!(ids, (last - 9..=last).collect::<Vec<_>>());
    assert!(last >= 10);
}

#[test]
fn recycled_slot_starts_fresh() {
    let mut emitter = Emitter::new(emitter_config(2, 0.0, 5.0));
    emitter.emit(2);
    emitter.update(1.0);
    emitter.emit(1);

    let live: Vec<_> = emitter.live_particles().copied().collect();
    assert_eq!(live.len(), 2);
    assert_eq!(live[0].id, 1);
    assert_eq!(live[0].age, 1.0);
    assert_eq!(live[1].id, 2);
    assert_eq!(live[1].age, 0.0);
    assert_eq!(live[1].position, emitter.config().start_position);
    assert_eq!(live[1].velocity, emitter.config().start_velocity);
}

#[test]
fn particles_retire_at_end_of_lifetime() {
    let mut emitter = Emitter::new(emitter_config(10, 0.0, 1.0));
    emitter.emit(3);
    emitter.update(0.5);
    assert_eq!(emitter.live_count(), 3);
    emitter.update(0.5);
    assert_eq!(emitter.live_count(), 0);

    // Freed slots are reused
    emitter.emit(10);
    assert_eq!(emitter.live_count(), 10);
}

#[test]
fn instance_data_follows_age() {
    let mut emitter = Emitter::new(emitter_config(10, 0.0, 4.0));
    emitter.emit(1);
    emitter.update(2.0);

    let mut instances = Vec::new();
    emitter.write_instances(&mut instances);
    assert_eq!(instances.len(), 1);
    let raw = instances[0];

    // p0 + v*t + a*t^2/2 with the default start values
    assert_vec_close(raw.position.into(), Vector3::new(-2.0, 2.0, 0.0));
    assert_close(raw.size, 0.1 + (5.0 - 0.1) * 0.5);
    assert_close(raw.color[1], 0.1 + (0.6 - 0.1) * 0.5);
    assert_close(raw.color[3], 0.1);
}

#[test]
fn write_instances_lists_oldest_first() {
    let mut emitter = Emitter::new(emitter_config(10, 0.0, 4.0));
    emitter.emit(1);
    emitter.update(1.0);
    emitter.emit(1);

    let mut instances = Vec::new();
    emitter.write_instances(&mut instances);
    assert_eq!(instances.len(), 2);
    assert!(instances[0].size > instances[1].size);

    emitter.update(4.0);
    emitter.write_instances(&mut instances);
    assert!(instances.is_empty());
}

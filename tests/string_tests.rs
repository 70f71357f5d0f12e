use verlet_world::{ParticleString, StringConfig, Vec2, World, WorldConfig};

fn hanging_world() -> World<Vec2<f32>> {
    World::new(
        WorldConfig::new()
            .with_gravity(Vec2::new(0.0, -9.81))
            .with_time_step(1.0 / 60.0)
            .with_iterations(8),
    )
    .unwrap()
}

#[test]
fn string_swings_under_gravity() {
    let mut world = hanging_world();
    let string = ParticleString::new(
        &mut world,
        Vec2::new(0.0, 10.0),
        Vec2::new(10.0, 10.0),
        10,
        StringConfig::default(),
    )
    .unwrap();
    string.pin(&mut world, 0).unwrap();

    for _ in 0..120 {
        world.step().unwrap();
    }

    let head = world.position(string.head()).unwrap();
    let tail = world.position(string.tail()).unwrap();
    assert_eq!(head, Vec2::new(0.0, 10.0));
    assert!(tail.y < head.y, "tail should drop below the pinned head");
}

#[test]
fn pinned_at_both_ends_keeps_length() {
    let mut world = hanging_world();
    let string = ParticleString::new(
        &mut world,
        Vec2::new(0.0, 10.0),
        Vec2::new(10.0, 10.0),
        10,
        StringConfig::default(),
    )
    .unwrap();
    string.pin(&mut world, 0).unwrap();
    string.pin(&mut world, 10).unwrap();

    for _ in 0..300 {
        world.step().unwrap();
    }

    let length = string.length(&world).unwrap();
    // Gravity stretches it a little against the springs; it must not sag freely.
    assert!(length >= 10.0 - 1e-3, "length {length}");
    assert!(length < 11.0, "length {length}");
}

#[test]
fn move_pin_drags_the_head() {
    let mut world = hanging_world();
    let string = ParticleString::new(
        &mut world,
        Vec2::new(0.0, 0.0),
        Vec2::new(5.0, 0.0),
        5,
        StringConfig::default(),
    )
    .unwrap();
    string.pin(&mut world, 0).unwrap();
    string.move_pin(&mut world, 0, Vec2::new(3.0, 4.0)).unwrap();
    world.step().unwrap();
    assert_eq!(world.position(string.head()), Some(Vec2::new(3.0, 4.0)));
}

#[test]
fn unpinned_string_falls() {
    let mut world = hanging_world();
    let string = ParticleString::new(
        &mut world,
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
        4,
        StringConfig { strength: 0.5, weight: 2.0 },
    )
    .unwrap();
    string.pin(&mut world, 0).unwrap();
    string.unpin(&mut world, 0).unwrap();
    world.step().unwrap();
    let positions = string.positions(&world).unwrap();
    assert_eq!(positions.len(), 5);
    assert!(positions.iter().all(|p| p.y < 0.0));
}

#[test]
fn removed_particle_breaks_positions() {
    let mut world = hanging_world();
    let string = ParticleString::new(
        &mut world,
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
        4,
        StringConfig::default(),
    )
    .unwrap();
    world.remove_particle_and_springs(string.particles()[2]).unwrap();
    assert!(string.positions(&world).is_err());
    assert_eq!(world.spring_count(), 2);
}

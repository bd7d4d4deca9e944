//! End-to-end scenarios for the three demo worlds, driven by synthetic frame inputs.

use approx::assert_relative_eq;

use wizard_demos::{
    lin_alg::Vec3,
    sim::{
        dragon::{DragonConfig, DragonWorld},
        race::{RaceConfig, RaceWorld},
        shooter::{ShooterConfig, ShooterWorld},
        Locomotion, Projectile,
    },
    InputsCommanded,
};

const DT: f32 = 0.05;

fn idle() -> InputsCommanded {
    InputsCommanded::default()
}

fn firing() -> InputsCommanded {
    InputsCommanded {
        fire: true,
        ..Default::default()
    }
}

/// A shooter whose snake starts far behind the player, out of the line of fire.
fn shooter_without_snake_in_the_way() -> ShooterWorld {
    let mut config = ShooterConfig::default();
    config.snake.start_position = [0., 0., 200.];
    ShooterWorld::new(config)
}

#[test]
fn shot_travels_in_a_straight_line() {
    let mut world = shooter_without_snake_in_the_way();

    let events = world.step(&firing(), 0.01);
    assert!(events.fired);
    assert_eq!(world.projectiles.len(), 1);

    let before = world.projectiles[0].position;
    let velocity = world.projectiles[0].velocity;
    assert_relative_eq!(velocity.magnitude(), 20., epsilon = 0.0001);

    world.step(&idle(), 0.1);

    let moved = world.projectiles[0].position - before;
    assert_relative_eq!(moved.x, 0., epsilon = 0.0001);
    assert_relative_eq!(moved.y, 0., epsilon = 0.0001);
    assert_relative_eq!(moved.z, -2., epsilon = 0.0001);
}

#[test]
fn out_of_range_shot_is_removed_without_a_hit() {
    let mut world = shooter_without_snake_in_the_way();

    world.step(&firing(), 0.01);
    assert_eq!(world.projectiles.len(), 1);

    // 60 units in one step; the range is 50.
    let events = world.step(&idle(), 3.);
    assert_eq!(events.hits, 0);
    assert!(world.projectiles.is_empty());
}

#[test]
fn cooldown_blocks_rapid_fire() {
    let mut world = shooter_without_snake_in_the_way();

    assert!(world.step(&firing(), DT).fired);
    world.step(&idle(), DT);
    assert!(!world.step(&firing(), DT).fired);

    world.step(&idle(), 0.5);
    assert!(world.step(&firing(), DT).fired);
    assert_eq!(world.projectiles.len(), 2);
}

#[test]
fn snake_hit_flashes_without_stacking() {
    let mut world = ShooterWorld::new(ShooterConfig::default());
    world.step(&idle(), DT);

    let head = world.snake.head().map(|s| s.position).unwrap();
    world
        .projectiles
        .push(Projectile::new(head, Vec3::new_zero()));

    let events = world.step(&idle(), 0.001);
    assert_eq!(events.hits, 1);
    assert_eq!(world.hit_count, 1);
    assert!(world.projectiles.is_empty());
    assert!(world.flash.is_active());

    // Let the flash partly fade, then hit again: it restarts at full.
    world.step(&idle(), 0.1);
    assert!(world.flash.remaining() < world.flash.duration());

    let head = world.snake.head().map(|s| s.position).unwrap();
    world
        .projectiles
        .push(Projectile::new(head, Vec3::new_zero()));
    world.step(&idle(), 0.);

    assert_eq!(world.hit_count, 2);
    assert_relative_eq!(world.flash.remaining(), world.flash.duration());
}

#[test]
fn shooter_falls_to_the_ground_then_flies() {
    let mut world = shooter_without_snake_in_the_way();
    let ground = world.config.movement.ground_level;

    for _ in 0..40 {
        world.step(&idle(), DT);
    }
    assert_relative_eq!(world.camera.position.y, ground);

    let toggle = InputsCommanded {
        toggle_flight: true,
        ..Default::default()
    };

    // Holding the key toggles once.
    world.step(&toggle, DT);
    world.step(&toggle, DT);
    assert_eq!(world.controller.mode, Locomotion::Flight);
    assert_eq!(world.controller.vertical_velocity, 0.);

    let climb = InputsCommanded {
        up: true,
        ..Default::default()
    };
    for _ in 0..20 {
        world.step(&climb, DT);
    }
    assert!(world.camera.position.y > ground + 4.);

    world.step(&idle(), DT);
    world.step(&toggle, DT);
    assert_eq!(world.controller.mode, Locomotion::Grounded);
}

/// The dragon hovers at eye level straight ahead, so every fireball connects.
fn dragon_in_the_line_of_fire() -> DragonWorld {
    let mut config = DragonConfig::default();
    config.dragon.hover_height = config.camera_start[1];
    config.dragon.bob_amplitude = 0.;
    DragonWorld::new(config)
}

#[test]
fn ten_fireballs_kill_the_dragon_and_it_fades() {
    let mut world = dragon_in_the_line_of_fire();
    let mut hits = 0;

    for i in 0..100 {
        let inputs = if i % 2 == 0 { firing() } else { idle() };
        hits += world.step(&inputs, DT).hits;
        if !world.dragon.alive() {
            break;
        }
    }

    assert_eq!(hits, 10);
    assert!(!world.dragon.alive());
    assert!(world.dragon.visible());

    world.step(&idle(), DT);
    assert!(world.dragon.alpha() < 1.);

    // Dead dragons aren't targets; keep firing through where it was.
    for i in 0..100 {
        let inputs = if i % 2 == 0 { firing() } else { idle() };
        assert_eq!(world.step(&inputs, DT).hits, 0);
    }

    assert!(!world.dragon.visible());
    assert_relative_eq!(world.dragon.alpha(), 0.);
}

#[test]
fn fireballs_light_the_scene() {
    let mut world = dragon_in_the_line_of_fire();

    world.step(&firing(), DT);
    world.step(&idle(), DT);
    world.step(&firing(), DT);

    // The staff tip, plus one per fireball in flight.
    assert_eq!(world.projectiles.len(), 2);
    assert_eq!(world.point_lights().len(), 3);
}

#[test]
fn cars_lap_their_circles() {
    let mut world = RaceWorld::new(RaceConfig::default());

    // A little over 6 seconds, at 60 degrees a second.
    for _ in 0..121 {
        world.step(&idle(), DT);
    }

    let lead = &world.cars[0];
    assert_eq!(lead.laps(), 1);
    assert_relative_eq!(lead.display_angle(), 3., epsilon = 0.01);

    for car in &world.cars {
        let p = car.position();
        assert_relative_eq!((p.x * p.x + p.z * p.z).sqrt(), car.radius, epsilon = 0.0001);
    }

    assert_eq!(world.point_lights().len(), 10);
}

//! Two cars racing around a track at night, watched from a free-flying camera.

use std::path::{Path, PathBuf};

use wizard_demos::{
    config,
    lin_alg::{Mat4, Vec3},
    run,
    sim::race::{RaceConfig, RaceWorld},
    EngineUpdates, Entity, InputSettings, InputsCommanded, Lighting, Mesh, Scene, Sun,
    TextureSource, UiSettings,
};

const WINDOW_TITLE: &str = "Car Race";
const WINDOW_SIZE: (f32, f32) = (1_200., 800.);

const MESH_GROUND: usize = 0;
const MESH_TRACK: usize = 1;
const MESH_CUBE: usize = 2;
const MESH_LAMP: usize = 3;
const MESH_CAR: usize = 4;

const TEX_GRASS: usize = 0;
const TEX_ASPHALT: usize = 1;
const TEX_BLEACHER: usize = 2;
const TEX_LAMP: usize = 3;
/// One per car, cycling.
const TEX_CARS: [usize; 2] = [4, 5];

const BLEACHER_COUNT: usize = 4;
const BLEACHER_DISTANCE: f32 = 15.;

struct App {
    world: RaceWorld,
    fps: f32,
}

fn texture(file: &str, fallback: [u8; 4]) -> TextureSource {
    TextureSource::File {
        path: PathBuf::from("assets/textures").join(file),
        fallback,
    }
}

fn make_scene(world: &RaceWorld) -> Scene {
    let cfg = &world.config;
    let half_width = cfg.track_width / 2.;

    let meshes = vec![
        Mesh::new_plane(100., 25.),
        Mesh::new_ring(cfg.track_radius - half_width, cfg.track_radius + half_width, 64),
        Mesh::new_cube(1.),
        Mesh::new_lamp(cfg.lamps.height),
        Mesh::new_car(),
    ];

    let textures = vec![
        texture("grass.jpg", [40, 90, 35, 255]),
        texture("asphalt.jpg", [50, 50, 55, 255]),
        texture("bleacher.jpg", [150, 150, 160, 255]),
        texture("lamp.jpg", [90, 90, 90, 255]),
        texture("car.jpg", [255, 0, 0, 255]),
        texture("cargreen.jpg", [0, 200, 0, 255]),
    ];

    Scene {
        meshes,
        textures,
        entities: static_entities(world),
        camera: world.camera.clone(),
        lighting: Lighting {
            ambient_intensity: 0.15,
            // Moonlight.
            sun: Sun {
                color: Vec3::new(0.6, 0.6, 0.9),
                intensity: 0.2,
                ..Default::default()
            },
            point_lights: world.point_lights(),
            ..Default::default()
        },
        background_color: (0.1, 0.1, 0.2),
        window_title: WINDOW_TITLE.to_owned(),
        window_size: WINDOW_SIZE,
        ..Default::default()
    }
}

/// Ground, track, bleachers, and lamps. These never move.
fn static_entities(world: &RaceWorld) -> Vec<Entity> {
    let mut result = vec![
        Entity::new(MESH_GROUND, TEX_GRASS, Mat4::new_identity()),
        Entity::new(
            MESH_TRACK,
            TEX_ASPHALT,
            Mat4::new_translation(Vec3::new(0., 0.01, 0.)),
        ),
    ];

    // Leans the stands back, away from the track.
    let mut shear = Mat4::new_identity();
    shear.set(2, 1, -0.5);

    for i in 0..BLEACHER_COUNT {
        let angle = i as f32 * 360. / BLEACHER_COUNT as f32;
        let a = angle.to_radians();
        let pos = Vec3::new(BLEACHER_DISTANCE * a.cos(), 2., BLEACHER_DISTANCE * a.sin());

        let transform = Mat4::new_translation(pos)
            * Mat4::new_rotation_y(-(angle + 90.).to_radians())
            * Mat4::new_scale(Vec3::new(8., 4., 2.))
            * shear;

        result.push(Entity::new(MESH_CUBE, TEX_BLEACHER, transform));
    }

    let lamps = &world.config.lamps;
    for (i, pos) in lamps.positions().into_iter().enumerate() {
        let angle = i as f32 * 360. / lamps.count as f32;
        let transform =
            Mat4::new_translation(pos) * Mat4::new_rotation_y(-(angle - 90.).to_radians());

        result.push(Entity::new(MESH_LAMP, TEX_LAMP, transform));
    }

    result
}

fn render_handler(
    app: &mut App,
    scene: &mut Scene,
    inputs: &InputsCommanded,
    dt: f32,
) -> EngineUpdates {
    if dt > 0. {
        app.fps = 0.9 * app.fps + 0.1 / dt;
    }

    app.world.step(inputs, dt);

    scene.camera.position = app.world.camera.position;
    scene.camera.yaw = app.world.camera.yaw;
    scene.camera.pitch = app.world.camera.pitch;

    let mut entities = static_entities(&app.world);
    for (i, car) in app.world.cars.iter().enumerate() {
        entities.push(Entity::new(
            MESH_CAR,
            TEX_CARS[i % TEX_CARS.len()],
            car.transform(),
        ));
    }
    scene.entities = entities;

    scene.lighting.point_lights = app.world.point_lights();

    EngineUpdates {
        entities: true,
        camera: true,
        lighting: true,
        ..Default::default()
    }
}

fn gui_handler(app: &mut App, ctx: &egui::Context, _scene: &mut Scene) -> EngineUpdates {
    egui::Window::new("Race")
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.0}", app.fps));

            for (i, car) in app.world.cars.iter().enumerate() {
                ui.label(format!(
                    "Car {}: {:.0}°, lap {}",
                    i + 1,
                    car.display_angle(),
                    car.laps()
                ));
            }
        });

    EngineUpdates::default()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config: RaceConfig = config::load_or_default(Path::new("config/car_race.ron"));
    let world = RaceWorld::new(config);
    let scene = make_scene(&world);

    let app = App { world, fps: 60. };

    if let Err(e) = run(
        app,
        scene,
        InputSettings::default(),
        UiSettings::default(),
        render_handler,
        gui_handler,
    ) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

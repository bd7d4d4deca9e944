//! A wizard with a staff, shooting at a snake that slithers towards them. F toggles flight.

use std::path::{Path, PathBuf};

use wizard_demos::{
    assets::obj_mesh_or,
    config,
    lin_alg::{Mat4, Vec3},
    run,
    sim::shooter::{ShooterConfig, ShooterWorld},
    EngineUpdates, Entity, InputSettings, InputsCommanded, Lighting, Mesh, PointLight, Scene,
    ShadowCaster, Sun, TextureSource, UiSettings,
};

const WINDOW_TITLE: &str = "Wizard Shooter";
const WINDOW_SIZE: (f32, f32) = (1_200., 800.);

const MESH_GROUND: usize = 0;
const MESH_SKY: usize = 1;
const MESH_HEAD: usize = 2;
const MESH_NECK: usize = 3;
const MESH_STAFF: usize = 4;
const MESH_PROJECTILE: usize = 5;

const TEX_GRASS: usize = 0;
const TEX_SKY: usize = 1;
const TEX_HEAD: usize = 2;
const TEX_NECK: usize = 3;
const TEX_STAFF: usize = 4;
const TEX_PROJECTILE: usize = 5;

const PROJECTILE_COLOR: [f32; 3] = [1., 0.8, 0.2];
const FLASH_COLOR: [f32; 3] = [1., 0., 0.];

struct App {
    world: ShooterWorld,
    fps: f32,
}

fn texture(file: &str, fallback: [u8; 4]) -> TextureSource {
    TextureSource::File {
        path: PathBuf::from("assets/textures").join(file),
        fallback,
    }
}

fn make_scene(world: &ShooterWorld) -> Scene {
    let meshes = vec![
        Mesh::new_plane(100., 50.),
        Mesh::new_dome(90., 16, 32),
        obj_mesh_or(Path::new("assets/models/dragon_head.obj"), || {
            Mesh::new_cube(10.)
        }),
        obj_mesh_or(Path::new("assets/models/fish.obj"), || {
            Mesh::new_cube(3.)
        }),
        obj_mesh_or(Path::new("assets/models/staff.obj"), || {
            Mesh::new_box(0.4, 4., 0.4)
        }),
        Mesh::new_cube(1.),
    ];

    let textures = vec![
        texture("grass.jpg", [60, 140, 50, 255]),
        TextureSource::Color([128, 178, 255, 255]),
        texture("dragon_texture.jpg", [90, 150, 60, 255]),
        texture("fish_texture.jpg", [110, 160, 80, 255]),
        texture("brick.jpg", [120, 80, 50, 255]),
        TextureSource::Color([255, 160, 40, 255]),
    ];

    Scene {
        meshes,
        textures,
        camera: world.camera.clone(),
        lighting: Lighting {
            ambient_intensity: 0.3,
            sun: Sun {
                color: Vec3::new(1., 1., 0.9),
                ..Default::default()
            },
            shadow: ShadowCaster {
                half_extent: 30.,
                far: 60.,
                ..Default::default()
            },
            ..Default::default()
        },
        background_color: (0.5, 0.7, 1.),
        window_title: WINDOW_TITLE.to_owned(),
        window_size: WINDOW_SIZE,
        ..Default::default()
    }
}

/// Ground and sky, the snake, the held staff, then projectiles.
fn build_entities(world: &ShooterWorld) -> Vec<Entity> {
    let cam = &world.camera;
    let flash = world.flash.fraction();

    let mut result = vec![
        Entity::new(MESH_GROUND, TEX_GRASS, Mat4::new_identity()),
        Entity::new(MESH_SKY, TEX_SKY, Mat4::new_translation(cam.position))
            .with_emissive(1.)
            .no_shadow(),
    ];

    for segment in &world.snake.segments {
        let transform = Mat4::new_translation(segment.position)
            * Mat4::new_rotation_x(segment.rotation.x)
            * Mat4::new_rotation_y(segment.rotation.y)
            * Mat4::new_rotation_z(segment.rotation.z)
            * Mat4::new_scale(Vec3::new(0.3, 0.2, 0.3));

        result.push(Entity::new(MESH_NECK, TEX_NECK, transform).with_flash(FLASH_COLOR, flash));
    }

    if let Some(head) = world.snake.head() {
        let facing = world.snake.head_facing(cam.position);
        let transform = Mat4::new_translation(head.position)
            * Mat4::new_rotation_y(facing.y)
            * Mat4::new_rotation_x(-facing.x)
            * Mat4::new_scaler(0.1);

        result.push(Entity::new(MESH_HEAD, TEX_HEAD, transform).with_flash(FLASH_COLOR, flash));
    }

    result.push(Entity::new(MESH_STAFF, TEX_STAFF, world.staff_transform()).no_shadow());

    for projectile in &world.projectiles {
        let transform = Mat4::new_translation(projectile.position) * Mat4::new_scaler(0.3);
        result.push(
            Entity::new(MESH_PROJECTILE, TEX_PROJECTILE, transform)
                .with_emissive(0.8)
                .no_shadow(),
        );
    }

    result
}

fn update_lighting(lighting: &mut Lighting, world: &ShooterWorld) {
    let sun_pos = world.sun_position();

    lighting.sun.direction = (-sun_pos).to_normalized();
    lighting.shadow.position = sun_pos;
    lighting.shadow.target = Vec3::new_zero();

    lighting.point_lights = world
        .projectiles
        .iter()
        .map(|p| PointLight::new(p.position, PROJECTILE_COLOR.into(), 1.))
        .collect();
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

    scene.entities = build_entities(&app.world);
    update_lighting(&mut scene.lighting, &app.world);

    EngineUpdates {
        entities: true,
        camera: true,
        lighting: true,
        ..Default::default()
    }
}

fn gui_handler(app: &mut App, ctx: &egui::Context, _scene: &mut Scene) -> EngineUpdates {
    let world = &app.world;

    egui::Window::new("Wizard")
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.0}", app.fps));
            ui.label(format!("Mode: {:?}", world.controller.mode));
            ui.label(format!("Projectiles: {}", world.projectiles.len()));
            ui.label(format!("Hits: {}", world.hit_count));

            let ready = 1. - world.staff.cooldown_fraction(world.time);
            ui.add(egui::ProgressBar::new(ready).text("Staff"));
        });

    EngineUpdates::default()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config: ShooterConfig = config::load_or_default(Path::new("config/wizard_shooter.ron"));
    let world = ShooterWorld::new(config);
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

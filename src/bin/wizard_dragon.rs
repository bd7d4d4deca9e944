//! A wizard throwing fireballs at a hovering dragon, among rocks. Ten hits bring it down.

use std::path::{Path, PathBuf};

use wizard_demos::{
    assets::obj_mesh_or,
    config,
    lin_alg::{Mat4, Vec3},
    run,
    sim::dragon::{DragonConfig, DragonWorld},
    EngineUpdates, Entity, InputSettings, InputsCommanded, Lighting, Mesh, Scene, ShadowCaster,
    Sun, TextureSource, UiSettings,
};

const WINDOW_TITLE: &str = "Wizard vs Dragon";
const WINDOW_SIZE: (f32, f32) = (1_024., 768.);

const MESH_GROUND: usize = 0;
const MESH_ROCK: usize = 1;
const MESH_STAFF: usize = 2;
const MESH_DRAGON: usize = 3;
const MESH_FIREBALL: usize = 4;

const TEX_GROUND: usize = 0;
const TEX_ROCK: usize = 1;
const TEX_STAFF: usize = 2;
const TEX_DRAGON: usize = 3;
const TEX_FIREBALL: usize = 4;

const ROCK_COUNT: usize = 10;
const LIGHT_POS: Vec3 = Vec3::new(50., 80., 20.);

struct App {
    world: DragonWorld,
    fps: f32,
}

fn texture(file: &str, fallback: [u8; 4]) -> TextureSource {
    TextureSource::File {
        path: PathBuf::from("assets/textures").join(file),
        fallback,
    }
}

fn make_scene(world: &DragonWorld) -> Scene {
    let meshes = vec![
        obj_mesh_or(Path::new("assets/models/plane.obj"), || {
            Mesh::new_plane(2., 20.)
        }),
        obj_mesh_or(Path::new("assets/models/rock.obj"), || Mesh::new_cube(1.)),
        obj_mesh_or(Path::new("assets/models/staff.obj"), || {
            Mesh::new_box(0.2, 2., 0.2)
        }),
        obj_mesh_or(Path::new("assets/models/dragon_body.obj"), || {
            Mesh::new_box(1.5, 1., 3.)
        }),
        obj_mesh_or(Path::new("assets/models/quad.obj"), || Mesh::new_quad(1.)),
    ];

    let textures = vec![
        texture("rocky_ground.jpg", [110, 100, 90, 255]),
        texture("rock.jpg", [130, 130, 130, 255]),
        texture("wood.jpg", [120, 80, 40, 255]),
        texture("dragon_skin.jpg", [60, 120, 60, 255]),
        texture("fireball.png", [255, 140, 0, 255]),
    ];

    let mut camera = world.camera.clone();
    camera.far = 200.;
    camera.update_proj_mat();

    Scene {
        meshes,
        textures,
        camera,
        lighting: Lighting {
            ambient_intensity: 0.25,
            sun: Sun {
                direction: (-LIGHT_POS).to_normalized(),
                color: Vec3::new(1., 1., 0.8),
                intensity: 1.,
            },
            shadow: ShadowCaster {
                position: LIGHT_POS,
                target: Vec3::new(0., 10., 0.),
                half_extent: 40.,
                near: 1.,
                far: 150.,
            },
            ..Default::default()
        },
        background_color: (0.1, 0.2, 0.3),
        window_title: WINDOW_TITLE.to_owned(),
        window_size: WINDOW_SIZE,
        ..Default::default()
    }
}

/// Ground and rocks, the dragon while it's visible, the staff, then fireballs.
fn build_entities(world: &DragonWorld) -> Vec<Entity> {
    let cam = &world.camera;

    let mut result = vec![Entity::new(
        MESH_GROUND,
        TEX_GROUND,
        Mat4::new_scaler(50.),
    )];

    for i in 0..ROCK_COUNT {
        let pos = Vec3::new(i as f32 * 8. - 40., 0., -15.);
        result.push(Entity::new(
            MESH_ROCK,
            TEX_ROCK,
            Mat4::new_translation(pos) * Mat4::new_scaler(2.),
        ));
    }

    let dragon = &world.dragon;
    if dragon.visible() {
        let (tint, strength) = dragon.hit_flash();
        let mut entity = Entity::new(MESH_DRAGON, TEX_DRAGON, dragon.transform(world.time))
            .with_color([1., 1., 1., dragon.alpha()])
            .with_flash(tint, strength);
        entity.casts_shadow = dragon.alive();
        result.push(entity);
    }

    result.push(Entity::new(MESH_STAFF, TEX_STAFF, world.staff_transform()).no_shadow());

    let billboard = cam.billboard_mat();
    for projectile in &world.projectiles {
        let transform = Mat4::new_translation(projectile.position) * billboard;
        result.push(
            Entity::new(MESH_FIREBALL, TEX_FIREBALL, transform)
                .with_emissive(1.)
                .no_shadow(),
        );
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

    scene.entities = build_entities(&app.world);
    scene.lighting.point_lights = app.world.point_lights();

    EngineUpdates {
        entities: true,
        camera: true,
        lighting: true,
        ..Default::default()
    }
}

fn gui_handler(app: &mut App, ctx: &egui::Context, _scene: &mut Scene) -> EngineUpdates {
    let world = &app.world;

    egui::Window::new("Dragon")
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.0}", app.fps));

            if world.dragon.alive() {
                ui.add(
                    egui::ProgressBar::new(world.dragon.health_fraction())
                        .text(format!("Health: {}", world.dragon.health)),
                );
            } else {
                ui.label("Dragon defeated");
            }

            ui.label(format!("Fireballs: {}", world.projectiles.len()));
        });

    EngineUpdates::default()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config: DragonConfig = config::load_or_default(Path::new("config/wizard_dragon.ron"));
    let world = DragonWorld::new(config);
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

//! Two cars circling an oval track at night, under lamp posts.

use serde::Deserialize;

use crate::{
    camera::Camera,
    input::InputsCommanded,
    lighting::PointLight,
    lin_alg::{Mat4, Vec3},
    sim::controller::{Controller, Locomotion, LookSettings, MoveSettings},
};

/// Height of a car's origin above the ground.
const CAR_HEIGHT: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct Car {
    /// Degrees around the track, counter-clockwise seen from above, with 0 on +X.
    pub angle_deg: f32,
    /// Degrees per second.
    pub speed_deg: f32,
    pub radius: f32,
    start_deg: f32,
}

impl Car {
    pub fn new(angle_deg: f32, speed_deg: f32, radius: f32) -> Self {
        Self {
            angle_deg,
            speed_deg,
            radius,
            start_deg: angle_deg,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.angle_deg += self.speed_deg * dt;
    }

    pub fn position(&self) -> Vec3 {
        let a = self.angle_deg.to_radians();
        Vec3::new(self.radius * a.cos(), CAR_HEIGHT, self.radius * a.sin())
    }

    /// Unit tangent in the direction of travel.
    pub fn direction(&self) -> Vec3 {
        let a = self.angle_deg.to_radians();
        Vec3::new(-a.sin(), 0., a.cos())
    }

    /// The car model's nose points along +X; this turns it to face `direction`.
    pub fn transform(&self) -> Mat4 {
        Mat4::new_translation(self.position())
            * Mat4::new_rotation_y(-(self.angle_deg + 90.).to_radians())
    }

    /// Whole laps completed since the start.
    pub fn laps(&self) -> u32 {
        ((self.angle_deg - self.start_deg) / 360.).max(0.).floor() as u32
    }

    /// Angle shown to the user, in 0..360.
    pub fn display_angle(&self) -> f32 {
        self.angle_deg.rem_euclid(360.)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LampSettings {
    pub count: usize,
    pub radius: f32,
    pub height: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for LampSettings {
    fn default() -> Self {
        Self {
            count: 6,
            radius: 10.,
            height: 4.,
            color: [1., 1., 0.8],
            intensity: 2.,
        }
    }
}

impl LampSettings {
    /// Base positions of the lamp posts, evenly spaced around the track.
    pub fn positions(&self) -> Vec<Vec3> {
        (0..self.count)
            .map(|i| {
                let a = (i as f32 * 360. / self.count as f32).to_radians();
                Vec3::new(self.radius * a.cos(), 0., self.radius * a.sin())
            })
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub look: LookSettings,
    pub movement: MoveSettings,
    pub camera_start: [f32; 3],
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub fov_deg: f32,
    pub cars: Vec<(f32, f32, f32)>,
    pub lamps: LampSettings,
    /// Headlights sit this far ahead of the car's center.
    pub headlight_offset: f32,
    pub headlight_intensity: f32,
    pub track_radius: f32,
    pub track_width: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            look: LookSettings {
                sensitivity: 60.,
                scale_with_dt: true,
                pitch_limit: 85.,
            },
            movement: MoveSettings {
                speed: 5.,
                fast_speed: 10.,
                ..Default::default()
            },
            camera_start: [0., 5., 15.],
            camera_yaw: -90.,
            camera_pitch: -20.,
            fov_deg: 70.,
            // (start angle, speed, radius)
            cars: vec![(0., 60., 8.), (-20., 58., 8.6)],
            lamps: LampSettings::default(),
            headlight_offset: 0.6,
            headlight_intensity: 1.5,
            track_radius: 8.,
            track_width: 2.,
        }
    }
}

pub struct RaceWorld {
    pub config: RaceConfig,
    pub camera: Camera,
    pub controller: Controller,
    pub cars: Vec<Car>,
    pub time: f32,
}

impl RaceWorld {
    pub fn new(config: RaceConfig) -> Self {
        let mut camera = Camera::new(
            Vec3::from(config.camera_start),
            config.camera_yaw,
            config.camera_pitch,
        );
        camera.fov_y = config.fov_deg.to_radians();
        camera.update_proj_mat();

        let cars = config
            .cars
            .iter()
            .map(|&(angle, speed, radius)| Car::new(angle, speed, radius))
            .collect();

        Self {
            camera,
            controller: Controller::new(Locomotion::FreeFly, false),
            cars,
            time: 0.,
            config,
        }
    }

    pub fn step(&mut self, inputs: &InputsCommanded, dt: f32) {
        self.time += dt;

        self.controller.update(
            &mut self.camera,
            inputs,
            &self.config.look,
            &self.config.movement,
            dt,
        );

        for car in &mut self.cars {
            car.update(dt);
        }
    }

    /// Lamp lights first, then two headlights per car.
    pub fn point_lights(&self) -> Vec<PointLight> {
        let lamps = &self.config.lamps;
        let lamp_color = Vec3::from(lamps.color);

        let mut result: Vec<PointLight> = lamps
            .positions()
            .into_iter()
            .map(|p| PointLight::new(p + Vec3::new(0., lamps.height, 0.), lamp_color, lamps.intensity))
            .collect();

        for car in &self.cars {
            let pos = car.position()
                + car.direction() * self.config.headlight_offset
                + Vec3::new(0., 0.1, 0.);

            for _ in 0..2 {
                result.push(PointLight::new(
                    pos,
                    Vec3::new(1., 1., 1.),
                    self.config.headlight_intensity,
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn car_stays_on_its_circle() {
        let mut car = Car::new(-20., 58., 8.6);
        for _ in 0..500 {
            car.update(0.037);
            assert_relative_eq!(car.position().ground_projected().magnitude(), 8.6, epsilon = 1e-4);
            assert_eq!(car.position().y, 0.5);
        }
    }

    #[test]
    fn direction_is_the_tangent() {
        let car = Car::new(37., 60., 8.);
        let radial = car.position().ground_projected();
        assert_relative_eq!(radial.dot(car.direction()), 0., epsilon = 1e-4);

        // The model's +X nose lines up with the direction of travel.
        let nose = car.transform().rotation_part().transform_point(Vec3::new(1., 0., 0.));
        assert_relative_eq!(nose.x, car.direction().x, epsilon = 1e-5);
        assert_relative_eq!(nose.z, car.direction().z, epsilon = 1e-5);
    }

    #[test]
    fn laps_count_full_circles() {
        let mut car = Car::new(0., 60., 8.);
        car.update(5.9);
        assert_eq!(car.laps(), 0);
        car.update(0.2);
        assert_eq!(car.laps(), 1);
        assert_relative_eq!(car.display_angle(), 6., epsilon = 1e-3);
    }

    #[test]
    fn ten_point_lights() {
        let world = RaceWorld::new(RaceConfig::default());
        let lights = world.point_lights();
        assert_eq!(lights.len(), 10);
        assert_relative_eq!(lights[0].position.x, 10.);
        assert_relative_eq!(lights[0].position.y, 4.);

        let car = &world.cars[0];
        assert_relative_eq!(lights[6].position.z, 0.6, epsilon = 1e-5);
        assert_relative_eq!(lights[6].position.x, car.position().x, epsilon = 1e-5);
    }
}

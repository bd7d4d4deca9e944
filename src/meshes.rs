//! This module generates meshes. Indices are counter-clockwise viewed from the front face.

use std::f32::consts::TAU;

use crate::{
    lin_alg::{Mat4, Vec3, Vec4},
    types::{Mesh, Vertex},
};

/// Appends one quad. `u` and `v` are half-extents along the face, with `u x v` pointing along
/// `normal`.
fn push_quad(mesh: &mut Mesh, center: Vec3, u: Vec3, v: Vec3, normal: Vec3, uv_scale: f32) {
    let start = mesh.vertices.len() as u32;

    let corners = [
        (center - u - v, [0., uv_scale]),
        (center + u - v, [uv_scale, uv_scale]),
        (center + u + v, [uv_scale, 0.]),
        (center - u + v, [0., 0.]),
    ];

    for (pos, uv) in corners {
        mesh.vertices.push(Vertex::new(pos.into(), uv, normal));
    }

    mesh.indices
        .extend_from_slice(&[start, start + 1, start + 2, start, start + 2, start + 3]);
}

impl Mesh {
    /// A box centered on the origin, with hard edges. Each face maps the full texture.
    pub fn new_box(x: f32, y: f32, z: f32) -> Self {
        let (hx, hy, hz) = (x / 2., y / 2., z / 2.);
        let mut result = Self::default();

        // (normal, u, v)
        let faces = [
            (Vec3::new(1., 0., 0.), Vec3::new(0., 0., -hz), Vec3::new(0., hy, 0.), hx),
            (Vec3::new(-1., 0., 0.), Vec3::new(0., 0., hz), Vec3::new(0., hy, 0.), hx),
            (Vec3::new(0., 1., 0.), Vec3::new(hx, 0., 0.), Vec3::new(0., 0., -hz), hy),
            (Vec3::new(0., -1., 0.), Vec3::new(hx, 0., 0.), Vec3::new(0., 0., hz), hy),
            (Vec3::new(0., 0., 1.), Vec3::new(hx, 0., 0.), Vec3::new(0., hy, 0.), hz),
            (Vec3::new(0., 0., -1.), Vec3::new(-hx, 0., 0.), Vec3::new(0., hy, 0.), hz),
        ];

        for (normal, u, v, depth) in faces {
            push_quad(&mut result, normal * depth, u, v, normal, 1.);
        }

        result
    }

    pub fn new_cube(side_len: f32) -> Self {
        Self::new_box(side_len, side_len, side_len)
    }

    /// A flat square on the XZ plane, facing up. The texture repeats `uv_repeat` times per side.
    pub fn new_plane(size: f32, uv_repeat: f32) -> Self {
        let mut result = Self::default();
        let h = size / 2.;

        push_quad(
            &mut result,
            Vec3::new_zero(),
            Vec3::new(h, 0., 0.),
            Vec3::new(0., 0., -h),
            Vec3::new(0., 1., 0.),
            uv_repeat,
        );

        result
    }

    /// A unit square facing +Z, for billboards.
    pub fn new_quad(size: f32) -> Self {
        let mut result = Self::default();
        let h = size / 2.;

        push_quad(
            &mut result,
            Vec3::new_zero(),
            Vec3::new(h, 0., 0.),
            Vec3::new(0., h, 0.),
            Vec3::new(0., 0., 1.),
            1.,
        );

        result
    }

    /// A flat ring on the XZ plane, facing up. Used for the race track.
    pub fn new_ring(inner_radius: f32, outer_radius: f32, segments: u32) -> Self {
        let mut result = Self::default();
        let up = Vec3::new(0., 1., 0.);

        for i in 0..=segments {
            let frac = i as f32 / segments as f32;
            let (sin, cos) = (frac * TAU).sin_cos();

            result.vertices.push(Vertex::new(
                [inner_radius * cos, 0., inner_radius * sin],
                [frac * segments as f32, 0.],
                up,
            ));
            result.vertices.push(Vertex::new(
                [outer_radius * cos, 0., outer_radius * sin],
                [frac * segments as f32, 1.],
                up,
            ));
        }

        for i in 0..segments {
            let inner = i * 2;
            let outer = inner + 1;
            let inner_next = inner + 2;
            let outer_next = inner + 3;

            result
                .indices
                .extend_from_slice(&[inner, outer_next, outer, inner, inner_next, outer_next]);
        }

        result
    }

    /// A sphere seen from the inside, for a sky dome. Normals point inward.
    pub fn new_dome(radius: f32, rings: u32, segments: u32) -> Self {
        let mut result = Self::default();

        for r in 0..=rings {
            let theta = r as f32 / rings as f32 * TAU / 2.;
            // Pole rows collapse to a single point.
            let ring = if r == 0 || r == rings { 0. } else { theta.sin() };
            for s in 0..=segments {
                let phi = s as f32 / segments as f32 * TAU;
                let dir = Vec3::new(ring * phi.cos(), theta.cos(), ring * phi.sin());

                result.vertices.push(Vertex::new(
                    (dir * radius).into(),
                    [s as f32 / segments as f32, r as f32 / rings as f32],
                    -dir,
                ));
            }
        }

        let row = segments + 1;
        for r in 0..rings {
            for s in 0..segments {
                let a = r * row + s;
                let b = (r + 1) * row + s;

                result.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        result
    }

    /// Merges meshes into one, applying a transform to each. Normals use the inverse transpose.
    pub fn combine(parts: &[(Mesh, Mat4)]) -> Self {
        let mut result = Self::default();

        for (mesh, transform) in parts {
            let start = result.vertices.len() as u32;
            let normal_mat = transform
                .inverse()
                .unwrap_or_default()
                .transpose()
                .rotation_part();

            for v in &mesh.vertices {
                let pos = transform.transform_point(v.position.into());
                let n: Vec3 = v.normal.into();
                let n = (normal_mat * Vec4::new(n.x, n.y, n.z, 0.)).xyz().to_normalized();

                result.vertices.push(Vertex::new(pos.into(), v.tex_coords, n));
            }

            result
                .indices
                .extend(mesh.indices.iter().map(|i| i + start));
        }

        result
    }

    /// A small race car, lengthwise along +X, resting on its wheels.
    pub fn new_car() -> Self {
        let wheel = Self::new_box(0.15, 0.15, 0.08);
        let mut parts = vec![
            (Self::new_box(1.4, 0.3, 0.6), Mat4::new_identity()),
            // windshield
            (
                Self::new_box(0.8, 0.2, 0.5),
                Mat4::new_translation(Vec3::new(-0.1, 0.25, 0.)),
            ),
        ];

        for (x, z) in [(0.5, 0.4), (0.5, -0.4), (-0.5, 0.4), (-0.5, -0.4)] {
            parts.push((
                wheel.clone(),
                Mat4::new_translation(Vec3::new(x, -0.25, z)),
            ));
        }

        Self::combine(&parts)
    }

    /// A street lamp: a pole with two angled fixtures at its top. The base is at the origin.
    pub fn new_lamp(height: f32) -> Self {
        let fixture = Self::new_box(1.5, 0.15, 0.8);
        let tilt = 30_f32.to_radians();

        Self::combine(&[
            (
                Self::new_box(0.15, height, 0.15),
                Mat4::new_translation(Vec3::new(0., height / 2., 0.)),
            ),
            (
                fixture.clone(),
                Mat4::new_translation(Vec3::new(0.6, height, 0.)) * Mat4::new_rotation_z(-tilt),
            ),
            (
                fixture,
                Mat4::new_translation(Vec3::new(-0.6, height, 0.)) * Mat4::new_rotation_z(tilt),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Checks the geometric winding of each triangle against its stored normal.
    fn assert_winding_matches_normals(mesh: &Mesh) {
        for tri in mesh.indices.chunks(3) {
            let a: Vec3 = mesh.vertices[tri[0] as usize].position.into();
            let b: Vec3 = mesh.vertices[tri[1] as usize].position.into();
            let c: Vec3 = mesh.vertices[tri[2] as usize].position.into();
            let face = (b - a).cross(c - a);
            if face.magnitude() < 1e-6 {
                continue; // degenerate at the dome's poles
            }
            let n: Vec3 = mesh.vertices[tri[0] as usize].normal.into();
            assert!(face.dot(n) > 0., "triangle {tri:?} winds against its normal");
        }
    }

    #[test]
    fn box_faces_point_outward() {
        let mesh = Mesh::new_box(1.4, 0.3, 0.6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_winding_matches_normals(&mesh);

        for v in &mesh.vertices {
            assert_relative_eq!(v.position[0].abs(), 0.7);
        }
    }

    #[test]
    fn plane_and_ring_face_up() {
        assert_winding_matches_normals(&Mesh::new_plane(100., 50.));
        assert_winding_matches_normals(&Mesh::new_ring(7., 9., 64));
    }

    #[test]
    fn dome_faces_inward() {
        assert_winding_matches_normals(&Mesh::new_dome(80., 8, 16));
    }

    #[test]
    fn dome_poles_are_points() {
        let dome = Mesh::new_dome(80., 8, 16);
        let row = 17;
        let first = &dome.vertices[..row];
        let last = &dome.vertices[dome.vertices.len() - row..];

        for v in first.iter().chain(last) {
            assert_eq!(v.position[0], 0.);
            assert_eq!(v.position[2], 0.);
        }
        assert_relative_eq!(last[0].position[1], -80.);
    }

    #[test]
    fn combine_offsets_indices() {
        let car = Mesh::new_car();
        assert_eq!(car.vertices.len(), 24 * 6);
        assert!(car.indices.iter().all(|&i| (i as usize) < car.vertices.len()));
        assert_winding_matches_normals(&car);
        assert_winding_matches_normals(&Mesh::new_lamp(4.));
    }
}

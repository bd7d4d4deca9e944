//! Loads meshes and images from disk, substituting fallbacks when they're missing or malformed.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use image::RgbaImage;

use crate::{
    error::AssetError,
    lin_alg::Vec3,
    types::{Mesh, Vertex},
};

/// Used when an OBJ face has no normal.
const DEFAULT_NORMAL: Vec3 = Vec3::new(0., 1., 0.);

/// Load a model from an OBJ file. All objects and groups are merged into one mesh.
pub fn load_obj_mesh(path: &Path) -> Result<Mesh, AssetError> {
    let file = File::open(path)?;
    let mesh = parse_obj(BufReader::new(file))?;

    if mesh.indices.is_empty() {
        return Err(AssetError::EmptyMesh(path.to_owned()));
    }
    Ok(mesh)
}

/// Polygons are triangulated as fans. Missing normals default to up and missing UVs to 0.
/// OBJ's V axis points up; WGPU's points down, so V is flipped.
pub fn parse_obj(input: impl Read) -> Result<Mesh, AssetError> {
    let model_data = obj::ObjData::load_buf(input)?;
    let mut result = Mesh::default();

    for object in &model_data.objects {
        for group in &object.groups {
            for poly in &group.polys {
                for end_index in 2..poly.0.len() {
                    for &index in &[0, end_index - 1, end_index] {
                        let obj::IndexTuple(position_id, texture_id, normal_id) = poly.0[index];

                        let Some(position) = model_data.position.get(position_id) else {
                            continue;
                        };

                        let tex_coords = texture_id
                            .and_then(|i| model_data.texture.get(i))
                            .map(|uv| [uv[0], 1. - uv[1]])
                            .unwrap_or([0., 0.]);

                        let normal = normal_id
                            .and_then(|i| model_data.normal.get(i))
                            .map(|&n| Vec3::from(n))
                            .unwrap_or(DEFAULT_NORMAL);

                        result.indices.push(result.vertices.len() as u32);
                        result
                            .vertices
                            .push(Vertex::new(*position, tex_coords, normal));
                    }
                }
            }
        }
    }

    // A skipped corner leaves a partial triangle.
    let whole = result.indices.len() / 3 * 3;
    result.indices.truncate(whole);

    Ok(result)
}

/// Loads an OBJ, or logs the failure and uses `fallback` instead.
pub fn obj_mesh_or(path: &Path, fallback: impl FnOnce() -> Mesh) -> Mesh {
    match load_obj_mesh(path) {
        Ok(mesh) => {
            log::info!(
                "Loaded {} ({} triangles)",
                path.display(),
                mesh.indices.len() / 3
            );
            mesh
        }
        Err(e) => {
            log::warn!("Using a fallback mesh for {}: {e}", path.display());
            fallback()
        }
    }
}

pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    Ok(image::open(path)?.into_rgba8())
}

/// Loads an image, or logs the failure and uses a 1x1 image of `fallback` instead.
pub fn image_or_color(path: &Path, fallback: [u8; 4]) -> RgbaImage {
    match load_image(path) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("Failed to load texture {}: {e}", path.display());
            solid_image(fallback)
        }
    }
}

pub fn solid_image(color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(1, 1, image::Rgba(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_NO_NORMALS: &str = "\
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn quad_is_triangulated_with_default_normals() {
        let mesh = parse_obj(QUAD_NO_NORMALS.as_bytes()).unwrap();

        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0., 1., 0.]));
        // V is flipped.
        assert_eq!(mesh.vertices[0].tex_coords, [0., 1.]);
    }

    #[test]
    fn explicit_normals_are_kept() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = parse_obj(src.as_bytes()).unwrap();

        assert_eq!(mesh.vertices.len(), 3);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0., 0., 1.]));
        assert!(mesh.vertices.iter().all(|v| v.tex_coords == [0., 0.]));
    }

    #[test]
    fn missing_file_uses_fallback() {
        let mesh = obj_mesh_or(Path::new("does/not/exist.obj"), || Mesh::new_cube(1.));
        assert_eq!(mesh.vertices.len(), 24);

        assert!(matches!(
            load_obj_mesh(Path::new("does/not/exist.obj")),
            Err(AssetError::Io(_))
        ));
    }

    #[test]
    fn missing_image_is_one_pixel_of_fallback() {
        let img = image_or_color(Path::new("does/not/exist.png"), [255, 0, 0, 255]);
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}

//! Files a sketch may load at startup: the aurora model and the genie image.

use std::path::{Path, PathBuf};

use image::imageops::flip_vertical_in_place;
use image::RgbaImage;

use crate::gpu::MeshData;
use crate::gpu::Vertex;

/// Node (or mesh) names the aurora sketch pulls out of its model.
pub const AURORA_MESH_NAMES: [&str; 4] = ["aurora1", "aurora2", "aurora3", "aurora4"];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("model {path} has no mesh named '{name}'")]
    MissingMesh { path: PathBuf, name: String },
    #[error("mesh '{name}' in {path} has no vertex positions")]
    MissingPositions { path: PathBuf, name: String },
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Loads the four aurora meshes, in `AURORA_MESH_NAMES` order.
///
/// Node transforms are ignored: the meshes are drawn in the model's own
/// space. Missing normals and UVs are zero-filled; unindexed primitives get
/// sequential indices.
pub fn load_aurora_meshes(path: &Path) -> Result<Vec<MeshData>, AssetError> {
    let (document, buffers, _) = gltf::import(path).map_err(|source| AssetError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    let meshes = AURORA_MESH_NAMES
        .iter()
        .map(|name| {
            let mesh = find_mesh(&document, name).ok_or_else(|| AssetError::MissingMesh {
                path: path.to_path_buf(),
                name: name.to_string(),
            })?;
            read_mesh(&mesh, &buffers).ok_or_else(|| AssetError::MissingPositions {
                path: path.to_path_buf(),
                name: name.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        path = %path.display(),
        vertices = meshes.iter().map(|mesh| mesh.vertices.len()).sum::<usize>(),
        "loaded aurora model"
    );
    Ok(meshes)
}

fn find_mesh<'a>(document: &'a gltf::Document, name: &str) -> Option<gltf::Mesh<'a>> {
    document
        .nodes()
        .filter(|node| node.name() == Some(name))
        .find_map(|node| node.mesh())
        .or_else(|| document.meshes().find(|mesh| mesh.name() == Some(name)))
}

fn read_mesh(mesh: &gltf::Mesh<'_>, buffers: &[gltf::buffer::Data]) -> Option<MeshData> {
    let mut data = MeshData::default();
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
        let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|normals| normals.collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uvs| uvs.into_f32().collect())
            .unwrap_or_default();

        let base = data.vertices.len() as u32;
        for (index, position) in positions.iter().enumerate() {
            data.vertices.push(Vertex {
                position: *position,
                normal: normals.get(index).copied().unwrap_or([0.0; 3]),
                uv: uvs.get(index).copied().unwrap_or([0.0; 2]),
            });
        }
        match reader.read_indices() {
            Some(indices) => data.indices.extend(indices.into_u32().map(|i| base + i)),
            None => data.indices.extend(base..base + positions.len() as u32),
        }
    }
    (!data.vertices.is_empty()).then_some(data)
}

/// Decodes an image and flips it so row 0 is the bottom, matching UV v = 0.
pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    let mut image = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    flip_vertical_in_place(&mut image);
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded image"
    );
    Ok(image)
}

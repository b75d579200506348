use std::io::{BufReader, Cursor};

use crate::{
    model::{self, diffuse_layout},
    texture::Texture,
};

/**
 * This module contains all logic for loading the model asset from external files.
 */

/// The one asset this demo loads, relative to the assets directory.
pub const MODEL_ASSET_PATH: &str = "models/scene.gltf";

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = location.origin().unwrap();
    let base = reqwest::Url::parse(&format!("{}/assets/", origin)).unwrap();
    base.join(file_name).unwrap()
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name);
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}

/// Fetch and parse a gltf file into a renderable [`model::Model`].
///
/// Reads every primitive's positions, normals, tex coords and indices into
/// vertex/index buffers and resolves each material's base color texture,
/// whether embedded in a buffer view or referenced by URI. Materials without
/// a texture get a solid color stand-in from their base color factor so the
/// model pipeline never has to special-case them.
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<model::Model> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                };
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = diffuse_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr.base_color_texture() {
            Some(tex) => match tex.texture().source().source() {
                gltf::image::Source::View { view, mime_type } => Texture::from_bytes(
                    device,
                    queue,
                    &buffer_data[view.buffer().index()][view.offset()..view.offset() + view.length()],
                    file_name,
                    mime_type.split('/').next_back(),
                )?,
                gltf::image::Source::Uri { uri, mime_type } => {
                    let bytes = load_binary(uri).await?;
                    Texture::from_bytes(
                        device,
                        queue,
                        &bytes,
                        uri,
                        mime_type.and_then(|mt| mt.split('/').next_back()),
                    )?
                }
            },
            // Untextured material: bake the base color factor into a small
            // solid texture instead of branching in the shader.
            None => {
                let factor = pbr.base_color_factor();
                let rgba = factor.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
                Texture::create_solid_color(rgba, 2, 2, device, queue)
            }
        };
        let name = material.name().unwrap_or(file_name);
        materials.push(model::Material::new(device, name, diffuse_texture, &layout));
    }
    if materials.is_empty() {
        // A mesh can reference the gltf default material, which carries no
        // entry in the materials array.
        let white = Texture::create_solid_color([255, 255, 255, 255], 2, 2, device, queue);
        materials.push(model::Material::new(device, file_name, white, &layout));
    }

    // Load meshes
    let mut meshes = Vec::new();
    for mesh in gltf.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(buffer_data[buffer.index()].as_slice()));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .map(|iter| iter.collect())
                .unwrap_or_default();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_default();
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_default();

            let vertices: Vec<model::ModelVertex> = positions
                .iter()
                .enumerate()
                .map(|(i, position)| model::ModelVertex {
                    position: *position,
                    tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                    normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                })
                .collect();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                // Non-indexed primitive: index the vertices in order.
                None => (0..vertices.len() as u32).collect(),
            };

            let name = mesh.name().unwrap_or(file_name).to_string();
            let material = primitive
                .material()
                .index()
                .unwrap_or(0)
                .min(materials.len() - 1);
            meshes.push(mk_mesh(device, name, &vertices, &indices, material));
        }
    }

    if meshes.is_empty() {
        anyhow::bail!("gltf file {} contains no mesh primitives", file_name);
    }

    Ok(model::Model { meshes, materials })
}

fn mk_mesh(
    device: &wgpu::Device,
    name: String,
    vertices: &[model::ModelVertex],
    indices: &[u32],
    material: usize,
) -> model::Mesh {
    use wgpu::util::DeviceExt;

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", name)),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", name)),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name,
        vertex_buffer,
        index_buffer,
        num_elements: indices.len() as u32,
        material,
    }
}

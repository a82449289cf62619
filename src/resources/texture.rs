use anyhow::Context;
use futures::executor::block_on;

use crate::data_structures::{
    model::Material,
    texture::{MaterialTextures, Texture},
};

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("No window available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("Page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        // TODO: let callers configure the asset root instead of ./assets
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}

/// Read and decode an image file, using its extension as the format hint.
pub async fn load_texture(
    file_name: &str,
    is_normal_map: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name)
        .await
        .with_context(|| format!("Failed to read texture file {file_name}"))?;
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str());
    Texture::from_bytes(device, queue, &data, file_name, extension, is_normal_map)
}

/// Load the diffuse and normal textures a material names.
///
/// Missing names fall back to solid-colour defaults so every material has
/// the same texture set.
// TODO: make this async so wasm32 callers don't block on texture fetches
pub fn load_material_textures(
    material: &Material,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<MaterialTextures> {
    let diffuse = match &material.diffuse_texture {
        Some(file_name) => block_on(load_texture(file_name, false, device, queue))?,
        None => Texture::create_default_diffuse(device, queue),
    };
    let normal = match &material.normal_texture {
        Some(file_name) => block_on(load_texture(file_name, true, device, queue))?,
        None => Texture::create_default_normal_map(1, 1, device, queue),
    };
    log::debug!("loaded textures of material {}", material.name);
    Ok(MaterialTextures { diffuse, normal })
}

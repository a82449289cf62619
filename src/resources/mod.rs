/**
 * This module contains all logic for producing model data: generated geometry
 * and textures loaded from external files.
 */
pub mod grid;
pub mod texture;

pub use grid::{GridConfig, PlaneVertex, make_plane};
pub use texture::{load_binary, load_material_textures, load_texture};

//! Engine data structures: models, bounds, vertex views and textures.
//!
//! - `model` contains mesh and material descriptors and the [`Model`](model::Model)
//!   container that stages, bounds and uploads them
//! - `bounding_box` holds axis-aligned bounds and their min/max folds
//! - `vertex_view` reads typed attributes out of strided vertex bytes
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod bounding_box;
pub mod model;
pub mod texture;
pub mod vertex_view;

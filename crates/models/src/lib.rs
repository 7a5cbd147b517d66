//! Data model for user-submitted map annotations.

pub mod errors;
pub mod geometry;
pub mod map_object;

pub use geometry::{LatLng, LayerType, Ring, Shape};
pub use map_object::{Category, MapObject, MapObjectPatch, NewMapObject, Status};

//! Interactive map: camera, markers, placement mode, fly-to animation.

pub mod view;

pub use view::{MapResponse, MapView, MarkerId};

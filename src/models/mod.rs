pub mod common;
pub mod image;
pub mod text;
pub mod website;

pub use common::*;
pub use image::*;
pub use text::*;
pub use website::*;

pub mod errors;
pub mod image_encoder;

pub use errors::{Result, RosterError};
pub use image_encoder::{compress_to_jpeg, encode_inline_photo};

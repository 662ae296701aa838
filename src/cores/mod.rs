pub mod errors;
pub mod image_models;

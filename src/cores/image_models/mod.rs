pub mod image_controller;
pub mod openai;

pub mod api_doc;
pub mod health;
pub mod models_api;
pub mod schemas;

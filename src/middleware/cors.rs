use actix_cors::Cors;

use crate::configs::settings::CorsConfig;

fn allows_any(values: &[String]) -> bool {
    values.iter().any(|v| v.trim() == "*")
}

// Build the CORS layer from configuration; "*" opens the corresponding list completely.
pub fn build_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default().max_age(config.max_age);

    if allows_any(&config.allow_origins) {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allow_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    if allows_any(&config.allow_methods) {
        cors = cors.allow_any_method();
    } else {
        cors = cors.allowed_methods(config.allow_methods.iter().map(String::as_str));
    }

    if allows_any(&config.allow_headers) {
        cors = cors.allow_any_header();
    } else {
        cors = cors.allowed_headers(config.allow_headers.iter().map(String::as_str));
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }
    cors
}

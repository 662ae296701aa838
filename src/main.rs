use actix_web::{web, App, HttpServer};
use std::io::{self, ErrorKind};
use std::sync::Arc;
use std::{fs::File, io::BufReader};
use utoipa_swagger_ui::SwaggerUi;

mod apis;
mod configs;
mod cores;
mod middleware;
mod utils;

use crate::configs::settings::Config;
use crate::cores::image_models::image_controller::ImageService;
use crate::cores::image_models::openai::OpenAIImageService;
use crate::middleware::access_log::AccessLog;
use crate::middleware::cors::build_cors;
use crate::utils::log::init_logging;

#[cfg(test)]
mod test;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(ErrorKind::Other, format!("{}: {}", context, err))
}

fn load_tls_config(cert_path: &str, key_path: &str) -> io::Result<rustls::ServerConfig> {
    let mut certs_file = BufReader::new(File::open(cert_path)?);
    let mut key_file = BufReader::new(File::open(key_path)?);

    let tls_certs = rustls_pemfile::certs(&mut certs_file).collect::<Result<Vec<_>, _>>()?;
    let tls_key = rustls_pemfile::private_key(&mut key_file)?
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, format!("no private key found in {}", key_path)))?;

    rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(tls_certs, tls_key)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::load().map_err(|e| startup_error("Configuration error", e))?;
    init_logging(&config.log_config_file).map_err(|e| startup_error("Logging setup failed", e))?;
    if !dotenv_loaded {
        log::info!("No .env file found, using system environment variables");
    }
    log::debug!("Loaded configuration: {:?}", config);

    // One provider client for the whole process
    let image_service: Arc<dyn ImageService> = Arc::new(
        OpenAIImageService::new(&config).map_err(|e| startup_error("Provider client setup failed", e))?,
    );
    let image_service = web::Data::from(image_service);
    let openapi = apis::api_doc::openapi(&config);
    let cors_config = config.cors.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&cors_config))
            .wrap(AccessLog)
            .app_data(image_service.clone())
            .configure(apis::health::configure)
            .configure(apis::models_api::image::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    });
    if config.workers > 0 {
        server = server.workers(config.workers);
    }

    let addr = (config.host.as_str(), config.port);
    let server = match config.tls_files() {
        Some((cert, key)) => {
            log::info!("Starting {} with TLS on {}:{}", config.title, config.host, config.port);
            server.bind_rustls_0_23(addr, load_tls_config(cert, key)?)?
        }
        None => {
            log::info!("Starting {} on {}:{}", config.title, config.host, config.port);
            server.bind(addr)?
        }
    };

    server.run().await?;
    log::info!("Shutting down {}", config.title);
    Ok(())
}

use std::path::Path;
use std::time::Duration;

use actix_web::HttpRequest;
use chrono::Local;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

// Load log4rs from the YAML file, or fall back to a console logger when there is none.
pub fn init_logging(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if Path::new(config_path).exists() {
        log4rs::init_file(config_path, Default::default())?;
        return Ok(());
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    log::warn!("Log config {} not found, logging to stdout", config_path);
    Ok(())
}

// Access log and error log line, nginx style
pub fn log_line(
    req: &HttpRequest,
    status_code: u16,
    elapsed: Duration,
    error_message: Option<&str>,
) -> String {
    let referer = req.headers()
        .get("Referer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    let user_agent = req.headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let client_ip = req.peer_addr().map(|addr| addr.ip().to_string()).unwrap_or_else(|| "unknown".to_string());

    let mut line = format!(
        "{client_ip} - - [{time}] \"{request_method} {request_uri} {http_version:?}\" {status_code} \"{referer}\" \"{user_agent}\" {elapsed_ms}ms",
        client_ip = client_ip,
        time = Local::now().format("%d/%b/%Y:%H:%M:%S %z"),
        request_method = req.method(),
        request_uri = req.uri(),
        http_version = req.version(),
        status_code = status_code,
        referer = referer,
        user_agent = user_agent,
        elapsed_ms = elapsed.as_millis(),
    );
    if let Some(msg) = error_message {
        line.push_str(&format!(" \"{}\"", msg));
    }
    line
}

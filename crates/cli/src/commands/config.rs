use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use datachat_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let doc = config_file_doc.as_ref();
    let file = config_file_path.as_deref();

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "warehouse.project",
        &config.warehouse.project,
        field_source("warehouse.project", Some("DATACHAT_WAREHOUSE_PROJECT"), doc, file),
    ));
    lines.push(render_line(
        "warehouse.dataset",
        config.warehouse.dataset.as_deref().unwrap_or("<unset>"),
        field_source("warehouse.dataset", Some("DATACHAT_WAREHOUSE_DATASET"), doc, file),
    ));
    lines.push(render_line(
        "warehouse.max_connections",
        &config.warehouse.max_connections.to_string(),
        field_source(
            "warehouse.max_connections",
            Some("DATACHAT_WAREHOUSE_MAX_CONNECTIONS"),
            doc,
            file,
        ),
    ));
    lines.push(render_line(
        "warehouse.timeout_secs",
        &config.warehouse.timeout_secs.to_string(),
        field_source("warehouse.timeout_secs", Some("DATACHAT_WAREHOUSE_TIMEOUT_SECS"), doc, file),
    ));

    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", config.llm.provider),
        field_source("llm.provider", Some("DATACHAT_LLM_PROVIDER"), doc, file),
    ));
    lines.push(render_line(
        "llm.model",
        &config.llm.model,
        field_source("llm.model", Some("DATACHAT_LLM_MODEL"), doc, file),
    ));
    lines.push(render_line(
        "llm.location",
        &config.llm.location,
        field_source("llm.location", Some("DATACHAT_LLM_LOCATION"), doc, file),
    ));

    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "llm.api_key",
        llm_api_key,
        field_source("llm.api_key", Some("DATACHAT_LLM_API_KEY"), doc, file),
    ));
    lines.push(render_line(
        "llm.base_url",
        config.llm.base_url.as_deref().unwrap_or("<unset>"),
        field_source("llm.base_url", Some("DATACHAT_LLM_BASE_URL"), doc, file),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        field_source("server.bind_address", Some("DATACHAT_SERVER_BIND_ADDRESS"), doc, file),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        field_source("server.port", Some("DATACHAT_SERVER_PORT"), doc, file),
    ));

    lines.push(render_line(
        "frontend.backend_url",
        &config.frontend.backend_url,
        field_source("frontend.backend_url", Some("DATACHAT_BACKEND_URL"), doc, file),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source("logging.level", Some("DATACHAT_LOGGING_LEVEL"), doc, file),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source("logging.format", Some("DATACHAT_LOGGING_FORMAT"), doc, file),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("datachat.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/datachat.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

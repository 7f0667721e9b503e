use config::ConfigError;
use serde::Deserialize;
use service::CommentLimits;
use std::collections::HashMap;

const ENV_PREFIX: &str = "AGORA_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub comments: CommentSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct CommentSettings {
    pub default_per_page: u32,
    pub max_per_page: u32,
    pub max_content_length: usize,
    // 批量操作一次最多处理的 id 数
    pub bulk_limit: usize,
}

impl CommentSettings {
    pub fn limits(&self) -> CommentLimits {
        CommentLimits {
            default_per_page: self.default_per_page,
            max_per_page: self.max_per_page,
            max_content_length: self.max_content_length,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/agora.db")?
            .set_default("comments.default_per_page", 15)?
            .set_default("comments.max_per_page", 100)?
            .set_default("comments.max_content_length", 1000)?
            .set_default("comments.bulk_limit", 100)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .map_err(|e| ConfigError::Message(e.to_string()))?,
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

// AGORA_SERVER__PORT=8080 映射为 server.port
fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}

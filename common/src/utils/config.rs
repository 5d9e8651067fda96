use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::utils::embedding::EmbeddingBackend;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    pub surrealdb_address: String,
    pub surrealdb_username: String,
    pub surrealdb_password: String,
    pub surrealdb_namespace: String,
    pub surrealdb_database: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    /// Destructive full rebuild of the vector table on startup. Off unless
    /// explicitly requested.
    #[serde(default)]
    pub recreate_index: bool,
    pub api_read_key: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_http_port() -> u16 {
    8000
}

fn default_data_file() -> String {
    "./all_drug_data.json".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_the_optional_fields() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "openai_api_key": "sk-test",
            "surrealdb_address": "mem://",
            "surrealdb_username": "root",
            "surrealdb_password": "root",
            "surrealdb_namespace": "ns",
            "surrealdb_database": "db",
            "api_read_key": "read-key",
        }))
        .expect("deserialize with defaults");

        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.embedding_dimensions, 1536);
        assert_eq!(config.embedding_backend, EmbeddingBackend::OpenAI);
        assert!(!config.recreate_index);
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.upstream_timeout_secs, 30);
    }
}

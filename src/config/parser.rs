use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses, and validates a TOML configuration file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// SHA-256 of the configuration file content, hex-encoded.
///
/// Logged at startup so crawl runs can be correlated with the exact
/// configuration they ran under.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its content hash.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"
seeds = ["http://www.uol.com.br/"]

[crawler]
workers = 4
min-interval-secs = 30
accepted-suffixes = [".br"]

[user-agent]
crawler-name = "aranha"
crawler-version = "1.0"
contact-url = "http://example.br/about"
contact-email = "admin@example.br"

[store]
root = "/tmp/crawl-store"
"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_temp(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.workers, 4);
        assert_eq!(config.crawler.min_interval_secs, 30);
        assert_eq!(config.crawler.accepted_suffixes, vec![".br"]);
        assert_eq!(config.seeds, vec!["http://www.uol.com.br/"]);
        assert_eq!(config.store.root, "/tmp/crawl-store");
    }

    #[test]
    fn test_defaults_are_applied() {
        let minimal = r#"
[crawler]

[user-agent]
crawler-name = "aranha"
crawler-version = "1.0"
contact-url = "http://example.br/about"
contact-email = "admin@example.br"

[store]
root = "/tmp/crawl-store"
"#;
        let file = write_temp(minimal);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.workers, 20);
        assert_eq!(config.crawler.min_interval_secs, 30);
        assert_eq!(config.crawler.stats_interval_secs, 10);
        assert!(config.crawler.accepted_suffixes.is_empty());
        assert!(config.seeds.is_empty());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let file = write_temp("this is not toml [[[");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = write_temp(VALID_CONFIG);
        let first = compute_config_hash(file.path()).unwrap();
        let second = compute_config_hash(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_load_with_hash() {
        let file = write_temp(VALID_CONFIG);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.crawler.workers, 4);
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}

use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Deserializer};
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marginalia")]
#[command(about = "Runs the marginalia book catalog service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".marginalia")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: u16,
    #[serde(default, deserialize_with = "non_empty")]
    pub public_dir: Option<PathBuf>,
    #[serde(default, deserialize_with = "non_empty")]
    pub turso_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_sync_interval() -> u64 {
    60
}

// `${VAR}` with VAR unset substitutes to an empty string, which means "not set".
fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()).map(T::from))
}

impl App {
    pub fn get_db(&self) -> &str {
        return &self.database;
    }

    pub fn get_port(&self) -> u16 {
        return self.port;
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::parse(&yaml_str)
    }

    fn parse(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str);
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Expands `${VAR}` and `${VAR:-default}`. Substituted values are not
    /// scanned again, and an unterminated `${` is kept as written.
    fn substitute_env_vars(yaml_str: &str) -> String {
        let mut expanded = String::with_capacity(yaml_str.len());
        let mut rest = yaml_str;

        while let Some((literal, reference)) = rest.split_once("${") {
            let Some((name, tail)) = reference.split_once('}') else {
                break;
            };
            expanded.push_str(literal);
            expanded.push_str(&Config::resolve_env(name));
            rest = tail;
        }

        expanded.push_str(rest);
        expanded
    }

    fn resolve_env(name: &str) -> String {
        match name.split_once(":-") {
            Some((var, fallback)) => env::var(var).unwrap_or_else(|_| fallback.to_owned()),
            None => env::var(name).unwrap_or_else(|_| {
                tracing::warn!("environment variable '{}' not found", name);
                String::new()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substitute_defaults_and_missing() {
        let out = Config::substitute_env_vars(
            "port: ${MARGINALIA_TEST_UNSET_PORT:-3000}\ntoken: ${MARGINALIA_TEST_UNSET_TOKEN}\n",
        );
        assert_eq!(out, "port: 3000\ntoken: \n");
    }

    #[test]
    fn test_substitute_adjacent_references() {
        let out = Config::substitute_env_vars(
            "url: ${MARGINALIA_TEST_UNSET_HOST:-localhost}:${MARGINALIA_TEST_UNSET_PORT:-3000}/db",
        );
        assert_eq!(out, "url: localhost:3000/db");
    }

    #[test]
    fn test_substitute_leaves_unterminated_reference() {
        let out = Config::substitute_env_vars("name: ${OOPS");
        assert_eq!(out, "name: ${OOPS");
    }

    #[test]
    fn test_parse_local_config() {
        let cfg = Config::parse(
            r#"
app:
  database: books.db
  port: ${MARGINALIA_TEST_UNSET_PORT:-8080}
  turso_url: ${MARGINALIA_TEST_UNSET_URL}
  turso_auth_token: ""
"#,
        )
        .unwrap();

        assert_eq!(cfg.app.get_db(), "books.db");
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.app.sync_interval_seconds, 60);
        assert!(cfg.app.public_dir.is_none());
        assert!(cfg.app.turso_url.is_none());
        assert!(cfg.app.turso_auth_token.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "app:\n  database: lib.db\n  port: 3001\n  public_dir: ./public\n  sync_interval_seconds: 5"
        )
        .unwrap();

        let cfg = Config::new(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.app.get_port(), 3001);
        assert_eq!(cfg.app.public_dir, Some(PathBuf::from("./public")));
        assert_eq!(cfg.app.sync_interval_seconds, 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::new("/definitely/not/here/config.yaml").is_err());
    }
}

use serde::de::Deserialize;

use clap::ArgMatches;
use config::{Config, ConfigError, Value, File, FileFormat, Environment};

use crate::error::*;

/// `APP_<SECTION>__<KEY>` overrides `<section>.<key>`, e.g.
/// `APP_ARTICLE__DEFAULT_LIMIT` -> `article.default_limit`.
fn env_overrides() -> Environment {
  Environment::with_prefix("app")
    .prefix_separator("_")
    .separator("__")
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub conf: Config
}

impl AppConfig {
  pub fn new_clap(cli: &ArgMatches) -> Result<Self> {
    // Load defaults
    let mut builder = Config::builder()
      .add_source(File::with_name("conf/default"));

    if let Some(config_file) = cli.get_one::<String>("config") {
      builder = builder.add_source(File::with_name(config_file));
    } else {
      // Get RUN_MODE from environment
      let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
      builder = builder
        .add_source(File::with_name(&format!("conf/{}", env)).required(false))
        // Allow overrides from environment
        .add_source(env_overrides());
    }

    Ok(AppConfig {
      conf: builder.build()?,
    })
  }

  /// Build a config from an in-memory TOML document.
  pub fn from_toml(toml: &str) -> Result<Self> {
    let conf = Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?;
    Ok(AppConfig {
      conf,
    })
  }

  pub fn get<'de, T: Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
    Ok(self.conf.get(key).map(Some).or_else(|e| {
      match e {
        ConfigError::NotFound(_) => Ok(None),
        err => Err(err),
      }
    })?)
  }

  pub fn get_str(&self, key: &str) -> Result<Option<String>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_string(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_int(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_bool(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_array(&self, key: &str) -> Result<Option<Vec<Value>>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_array(val)?)
    } else {
      None
    };
    Ok(val)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CONF: &str = r#"
debug = true

[db]
url = "postgres://localhost/nc_news_test"

[api]
listen = "127.0.0.1:9090"
workers = 2
services = ["Topic", "Article"]
"#;

  #[test]
  fn typed_getters() {
    let config = AppConfig::from_toml(CONF).unwrap();
    assert_eq!(config.get_bool("debug").unwrap(), Some(true));
    assert_eq!(config.get_str("db.url").unwrap().as_deref(),
      Some("postgres://localhost/nc_news_test"));
    assert_eq!(config.get_int("api.workers").unwrap(), Some(2));
    let services = config.get_array("api.services").unwrap().unwrap();
    assert_eq!(services.len(), 2);
  }

  #[test]
  fn missing_keys_are_none() {
    let config = AppConfig::from_toml(CONF).unwrap();
    assert_eq!(config.get_int("api.backlog").unwrap(), None);
    assert_eq!(config.get_str("article.default_img_url").unwrap(), None);
  }

  #[test]
  fn env_overrides_keep_underscored_keys() {
    let vars = vec![
      ("APP_ARTICLE__DEFAULT_LIMIT".to_string(), "5".to_string()),
      ("APP_DB__URL".to_string(), "postgres://db/nc_news".to_string()),
    ];
    let conf = Config::builder()
      .add_source(File::from_str(CONF, FileFormat::Toml))
      .add_source(env_overrides().source(Some(vars.into_iter().collect())))
      .build().unwrap();
    let config = AppConfig { conf };
    assert_eq!(config.get_int("article.default_limit").unwrap(), Some(5));
    assert_eq!(config.get_str("db.url").unwrap().as_deref(), Some("postgres://db/nc_news"));
    assert_eq!(config.get_int("api.workers").unwrap(), Some(2));
  }

  #[test]
  fn wrong_types_are_errors() {
    let config = AppConfig::from_toml(CONF).unwrap();
    assert!(config.get_int("db.url").is_err());
  }
}

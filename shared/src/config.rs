use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{KvError, KvKey};
use crate::{
    DEFAULT_CATEGORIES_KEY, DEFAULT_PRODUCTS_KEY, DEFAULT_WINDOW_SIZE, LEGACY_CATEGORIES_KEY,
    MAX_WINDOW_SIZE,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window size must be between 1 and {max}, got {got}")]
    InvalidWindowSize { got: usize, max: usize },

    #[error("products and categories cannot share the key '{0}'")]
    KeyCollision(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(#[from] KvError),

    #[error("malformed config: {0}")]
    Malformed(String),
}

/// Tunables for the catalog core. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Cards visible at once in the storefront carousel.
    pub window_size: usize,
    pub products_key: String,
    pub categories_key: String,
    pub key_namespace: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            products_key: DEFAULT_PRODUCTS_KEY.to_string(),
            categories_key: DEFAULT_CATEGORIES_KEY.to_string(),
            key_namespace: None,
        }
    }
}

impl CatalogConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::InvalidWindowSize {
                got: self.window_size,
                max: MAX_WINDOW_SIZE,
            });
        }
        if self.products_key == self.categories_key {
            return Err(ConfigError::KeyCollision(self.products_key.clone()));
        }
        self.products_key()?;
        self.categories_key()?;
        Ok(())
    }

    pub fn products_key(&self) -> Result<KvKey, ConfigError> {
        self.key(&self.products_key)
    }

    pub fn categories_key(&self) -> Result<KvKey, ConfigError> {
        self.key(&self.categories_key)
    }

    /// Fallback read key for categories. Only the default categories key has
    /// one, and only while no other collection is stored there.
    pub fn legacy_categories_key(&self) -> Result<Option<KvKey>, ConfigError> {
        if self.categories_key != DEFAULT_CATEGORIES_KEY
            || self.products_key == LEGACY_CATEGORIES_KEY
        {
            return Ok(None);
        }
        Ok(Some(self.key(LEGACY_CATEGORIES_KEY)?))
    }

    fn key(&self, name: &str) -> Result<KvKey, ConfigError> {
        let key = match &self.key_namespace {
            Some(ns) => KvKey::namespaced(ns.clone(), name)?,
            None => KvKey::new(name)?,
        };
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 3);
        assert_eq!(config.products_key().unwrap().raw(), "products");
        assert_eq!(config.categories_key().unwrap().raw(), "categories");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CatalogConfig::from_json(r#"{ "window_size": 4, "key_namespace": "shop" }"#)
            .unwrap();
        assert_eq!(config.window_size, 4);
        assert_eq!(config.products_key().unwrap().raw(), "shop:products");
    }

    #[test]
    fn rejects_zero_window() {
        let err = CatalogConfig::from_json(r#"{ "window_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindowSize { got: 0, .. }));
    }

    #[test]
    fn rejects_shared_keys() {
        let config = CatalogConfig {
            categories_key: "products".into(),
            ..CatalogConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::KeyCollision(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            CatalogConfig::from_json("not json"),
            Err(ConfigError::Malformed(_))
        ));
    }
}

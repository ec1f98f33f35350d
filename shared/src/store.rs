use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::capabilities::{KvBackend, KvKey, MemoryKv};
use crate::config::{CatalogConfig, ConfigError};
use crate::error::PersistenceError;
use crate::model::Product;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub products: KvKey,
    pub categories: KvKey,
    /// Read when `categories` has never been written.
    pub legacy_categories: Option<KvKey>,
}

impl StoreKeys {
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            products: config.products_key()?,
            categories: config.categories_key()?,
            legacy_categories: config.legacy_categories_key()?,
        })
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            products: KvKey::trusted(crate::DEFAULT_PRODUCTS_KEY),
            categories: KvKey::trusted(crate::DEFAULT_CATEGORIES_KEY),
            legacy_categories: Some(KvKey::trusted(crate::LEGACY_CATEGORIES_KEY)),
        }
    }
}

/// Typed view over a [`KvBackend`]. Collections are stored whole, as JSON
/// arrays; there is no partial update.
pub struct Store {
    backend: Box<dyn KvBackend>,
    keys: StoreKeys,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("keys", &self.keys).finish()
    }
}

impl Store {
    pub fn new(backend: impl KvBackend + 'static, keys: StoreKeys) -> Self {
        Self {
            backend: Box::new(backend),
            keys,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryKv::new(), StoreKeys::default())
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Load a collection, reporting why it could not be read.
    pub fn try_load<T: DeserializeOwned>(&self, key: &KvKey) -> Result<Vec<T>, PersistenceError> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(Vec::new());
        };
        // `null` is what a cleared web store hands back.
        let items: Option<Vec<T>> =
            serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Serialization {
                key: key.raw(),
                message: e.to_string(),
            })?;
        Ok(items.unwrap_or_default())
    }

    /// Load a collection; missing or unreadable content is an empty one.
    pub fn load<T: DeserializeOwned>(&self, key: &KvKey) -> Vec<T> {
        match self.try_load(key) {
            Ok(items) => {
                debug!(key = %key, count = items.len(), "collection loaded");
                items
            }
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unreadable collection");
                Vec::new()
            }
        }
    }

    pub fn save<T: Serialize>(&mut self, key: &KvKey, items: &[T]) -> Result<(), PersistenceError> {
        let data = serde_json::to_vec(items).map_err(|e| PersistenceError::Serialization {
            key: key.raw(),
            message: e.to_string(),
        })?;
        self.backend.set(key, data)?;
        debug!(key = %key, count = items.len(), "collection saved");
        Ok(())
    }

    pub fn load_products(&self) -> Vec<Product> {
        self.load(&self.keys.products)
    }

    pub fn load_categories(&self) -> Vec<String> {
        if let Some(legacy) = &self.keys.legacy_categories {
            if matches!(self.backend.get(&self.keys.categories), Ok(None)) {
                debug!(key = %legacy, "categories key absent, reading legacy key");
                return self.load(legacy);
            }
        }
        self.load(&self.keys.categories)
    }

    pub fn save_products(&mut self, products: &[Product]) -> Result<(), PersistenceError> {
        let key = self.keys.products.clone();
        self.save(&key, products)
    }

    pub fn save_categories(&mut self, categories: &[String]) -> Result<(), PersistenceError> {
        let key = self.keys.categories.clone();
        self.save(&key, categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductDraft, ProductId};

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product::from_draft(ProductId::new(id), ProductDraft::new(name, price, "X", ""))
    }

    #[test]
    fn absent_key_loads_empty() {
        let store = Store::in_memory();
        assert!(store.load_products().is_empty());
        assert!(store.load_categories().is_empty());
    }

    #[test]
    fn null_loads_empty() {
        let kv = MemoryKv::new();
        kv.insert_raw("categories", "null");
        let store = Store::new(kv, StoreKeys::default());
        assert_eq!(store.try_load::<String>(&store.keys().categories).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn malformed_content_loads_empty() {
        let kv = MemoryKv::new();
        kv.insert_raw("products", "{not json");
        kv.insert_raw("categories", r#"{"a":1}"#);
        let store = Store::new(kv, StoreKeys::default());

        assert!(store.load_products().is_empty());
        assert!(store.load_categories().is_empty());
        assert!(matches!(
            store.try_load::<Product>(&store.keys().products),
            Err(PersistenceError::Serialization { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_order_and_values() {
        let kv = MemoryKv::new();
        let mut store = Store::new(kv.clone(), StoreKeys::default());
        let products = vec![product("1", "B", 5), product("2", "A", 10)];

        store.save_products(&products).unwrap();
        store
            .save_categories(&["Toys".to_string(), "Books".to_string()])
            .unwrap();

        let reopened = Store::new(kv.clone(), StoreKeys::default());
        assert_eq!(reopened.load_products(), products);
        assert_eq!(reopened.load_categories(), vec!["Toys", "Books"]);
        assert_eq!(kv.get_raw("categories"), Some(br#"["Toys","Books"]"#.to_vec()));
    }

    #[test]
    fn save_is_total_replacement() {
        let mut store = Store::in_memory();
        store.save_products(&[product("1", "A", 1), product("2", "B", 2)]).unwrap();
        store.save_products(&[product("3", "C", 3)]).unwrap();

        let loaded = store.load_products();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "C");
    }

    #[test]
    fn categories_fall_back_to_legacy_key() {
        let kv = MemoryKv::new();
        kv.insert_raw("categorys", r#"["Books"]"#);
        let mut store = Store::new(kv.clone(), StoreKeys::default());
        assert_eq!(store.load_categories(), vec!["Books"]);

        // Once written, the current key wins and the legacy one is left alone.
        store.save_categories(&["Toys".to_string()]).unwrap();
        assert_eq!(store.load_categories(), vec!["Toys"]);
        assert_eq!(kv.get_raw("categorys"), Some(br#"["Books"]"#.to_vec()));
    }

    #[test]
    fn custom_categories_key_has_no_fallback() {
        let kv = MemoryKv::new();
        kv.insert_raw("categorys", r#"["Books"]"#);
        let config = CatalogConfig {
            categories_key: "tags".into(),
            ..CatalogConfig::default()
        };
        let store = Store::new(kv, StoreKeys::from_config(&config).unwrap());
        assert!(store.load_categories().is_empty());
    }

    #[test]
    fn namespaced_keys_are_isolated() {
        let kv = MemoryKv::new();
        let config = CatalogConfig {
            key_namespace: Some("shop".into()),
            ..CatalogConfig::default()
        };
        let mut store = Store::new(kv.clone(), StoreKeys::from_config(&config).unwrap());
        store.save_categories(&["Books".to_string()]).unwrap();

        assert!(kv.get_raw("shop:categories").is_some());
        assert!(kv.get_raw("categories").is_none());
    }
}

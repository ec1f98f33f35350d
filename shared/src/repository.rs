use tracing::{info, instrument, warn};

use crate::capabilities::KvBackend;
use crate::config::{CatalogConfig, ConfigError};
use crate::error::{CatalogError, PersistenceError, ValidationError};
use crate::model::{EditSession, Product, ProductDraft, ProductId};
use crate::store::{Store, StoreKeys};

/// Result of a mutation that was applied in memory. `warning` is set when the
/// change could not be written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Persisted<T> {
    pub value: T,
    pub warning: Option<PersistenceError>,
}

impl<T> Persisted<T> {
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_durable(&self) -> bool {
        self.warning.is_none()
    }
}

/// Authoritative product and category lists, mirrored to a [`Store`].
///
/// Records are addressed by [`ProductId`]; indices only appear at the edges,
/// where a shell refers to a table row.
#[derive(Debug)]
pub struct Repository {
    store: Store,
    products: Vec<Product>,
    categories: Vec<String>,
}

impl Repository {
    #[instrument(skip(store))]
    pub fn new(store: Store) -> Self {
        let products = store.load_products();
        let categories = store.load_categories();
        info!(
            products = products.len(),
            categories = categories.len(),
            "repository loaded"
        );
        Self {
            store,
            products,
            categories,
        }
    }

    pub fn open(
        backend: impl KvBackend + 'static,
        config: &CatalogConfig,
    ) -> Result<Self, ConfigError> {
        let keys = StoreKeys::from_config(config)?;
        Ok(Self::new(Store::new(backend, keys)))
    }

    pub fn in_memory() -> Self {
        Self::new(Store::in_memory())
    }

    /// Discard the in-memory mirror and read both collections again.
    pub fn reload(&mut self) {
        self.products = self.store.load_products();
        self.categories = self.store.load_categories();
        info!(
            products = self.products.len(),
            categories = self.categories.len(),
            "repository reloaded"
        );
    }

    pub fn list_products(&self) -> &[Product] {
        &self.products
    }

    pub fn list_categories(&self) -> &[String] {
        &self.categories
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn position(&self, id: &ProductId) -> Option<usize> {
        self.products.iter().position(|p| &p.id == id)
    }

    pub fn get(&self, index: usize) -> Result<&Product, CatalogError> {
        self.products.get(index).ok_or(CatalogError::Index {
            index,
            len: self.products.len(),
        })
    }

    #[instrument(skip(self))]
    pub fn add_category(&mut self, name: &str) -> Result<Persisted<String>, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty.into());
        }
        if self.categories.iter().any(|c| c == name) {
            return Err(ValidationError::Duplicate {
                name: name.to_string(),
            }
            .into());
        }

        self.categories.push(name.to_string());
        let warning = self.persist_categories();
        info!(total = self.categories.len(), "category added");
        Ok(Persisted {
            value: name.to_string(),
            warning,
        })
    }

    /// Create a product, or update the session's target. The returned session
    /// is always inactive.
    #[instrument(skip(self, data))]
    pub fn upsert_product(
        &mut self,
        data: ProductDraft,
        session: EditSession,
    ) -> Result<Persisted<EditSession>, CatalogError> {
        match session.target() {
            Some(id) => {
                let product = self
                    .products
                    .iter_mut()
                    .find(|p| &p.id == id)
                    .ok_or_else(|| CatalogError::StaleIndex { id: id.clone() })?;
                product.apply(data);
                info!(id = %id, "product updated");
            }
            None => {
                let product = Product::from_draft(ProductId::generate(), data);
                info!(id = %product.id, "product created");
                self.products.push(product);
            }
        }

        let warning = self.persist_products();
        Ok(Persisted {
            value: EditSession::inactive(),
            warning,
        })
    }

    /// Remove the product at `index`. Later products shift down by one, so
    /// any index the caller holds past this point is invalid.
    #[instrument(skip(self))]
    pub fn delete_product(&mut self, index: usize) -> Result<Persisted<Product>, CatalogError> {
        if index >= self.products.len() {
            return Err(CatalogError::Index {
                index,
                len: self.products.len(),
            });
        }
        let removed = self.products.remove(index);
        info!(id = %removed.id, remaining = self.products.len(), "product deleted");
        let warning = self.persist_products();
        Ok(Persisted {
            value: removed,
            warning,
        })
    }

    pub fn delete_product_by_id(
        &mut self,
        id: &ProductId,
    ) -> Result<Persisted<Product>, CatalogError> {
        let index = self
            .position(id)
            .ok_or_else(|| CatalogError::StaleIndex { id: id.clone() })?;
        self.delete_product(index)
    }

    /// Start editing the product at `index`; returns its fields for pre-fill.
    pub fn begin_edit(&self, index: usize) -> Result<(EditSession, ProductDraft), CatalogError> {
        let product = self.get(index)?;
        Ok((EditSession::editing(product.id.clone()), product.to_draft()))
    }

    fn persist_products(&mut self) -> Option<PersistenceError> {
        match self.store.save_products(&self.products) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "products kept in memory only");
                Some(e)
            }
        }
    }

    fn persist_categories(&mut self) -> Option<PersistenceError> {
        match self.store.save_categories(&self.categories) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "categories kept in memory only");
                Some(e)
            }
        }
    }
}

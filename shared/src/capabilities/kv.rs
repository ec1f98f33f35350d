use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_PREFIX_LENGTH: usize = 64;
/// Browsers cap local storage at roughly 5 MiB per origin.
pub const MAX_VALUE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey {
    namespace: Option<String>,
    key: String,
}

impl KvKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self {
            namespace: None,
            key,
        })
    }

    pub fn namespaced(namespace: impl Into<String>, key: impl Into<String>) -> Result<Self, KvError> {
        let namespace = namespace.into();
        Self::validate_namespace(&namespace)?;
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self {
            namespace: Some(namespace),
            key,
        })
    }

    /// For compile-time constants already known to pass validation.
    pub(crate) fn trusted(key: &'static str) -> Self {
        Self {
            namespace: None,
            key: key.to_string(),
        }
    }

    /// The key as the backend sees it.
    pub fn raw(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{}", self.key),
            None => self.key.clone(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn validate_key(key: &str) -> Result<(), KvError> {
        if key.is_empty() {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.trim().is_empty() {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be only whitespace".to_string(),
            });
        }

        if key.contains('\0') {
            return Err(KvError::InvalidKey {
                key: key.replace('\0', "\\0"),
                reason: "key cannot contain null bytes".to_string(),
            });
        }

        if key.contains("..") {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot contain path traversal sequences".to_string(),
            });
        }

        if key.starts_with('/') || key.starts_with('\\') {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot start with path separator".to_string(),
            });
        }

        if key.chars().any(|c| c.is_control() && c != '\t') {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key contains invalid control characters".to_string(),
            });
        }

        Ok(())
    }

    fn validate_namespace(prefix: &str) -> Result<(), KvError> {
        if prefix.is_empty() {
            return Err(KvError::InvalidKey {
                key: prefix.to_string(),
                reason: "namespace cannot be empty".to_string(),
            });
        }
        if prefix.len() > MAX_PREFIX_LENGTH {
            return Err(KvError::InvalidKey {
                key: prefix.to_string(),
                reason: format!("namespace exceeds maximum length of {MAX_PREFIX_LENGTH} bytes"),
            });
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(KvError::InvalidKey {
                key: prefix.to_string(),
                reason: "namespace contains invalid characters".to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for KvKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw())
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("quota exceeded: {size} bytes exceeds maximum of {max} bytes")]
    QuotaExceeded { size: usize, max: usize },

    #[error("storage error: {message} (code: {code:?})")]
    Storage {
        code: StorageErrorCode,
        message: String,
    },

    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl KvError {
    pub fn storage(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageErrorCode {
    Unknown,
    ConnectionFailed,
    Corrupted,
    DiskFull,
    PermissionDenied,
    Busy,
    Locked,
    IoError,
}

/// Durable key-value persistence. Every `set` replaces the whole value.
pub trait KvBackend: Send {
    fn get(&self, key: &KvKey) -> Result<Option<Vec<u8>>, KvError>;
    fn set(&mut self, key: &KvKey, value: Vec<u8>) -> Result<(), KvError>;
    fn remove(&mut self, key: &KvKey) -> Result<bool, KvError>;
}

fn check_quota(value: &[u8]) -> Result<(), KvError> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(KvError::QuotaExceeded {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}

/// In-memory backend. Clones share the same map, so a shell or a test can
/// keep a handle and look at what the core wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing validation and quota. Useful to stage
    /// legacy or corrupted content.
    pub fn insert_raw(&self, raw_key: impl Into<String>, value: impl Into<Vec<u8>>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(raw_key.into(), value.into());
        }
    }

    pub fn get_raw(&self, raw_key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(raw_key).cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &KvKey) -> Result<Option<Vec<u8>>, KvError> {
        let entries = self.entries.lock().map_err(|_| KvError::LockPoisoned)?;
        Ok(entries.get(&key.raw()).cloned())
    }

    fn set(&mut self, key: &KvKey, value: Vec<u8>) -> Result<(), KvError> {
        check_quota(&value)?;
        let mut entries = self.entries.lock().map_err(|_| KvError::LockPoisoned)?;
        entries.insert(key.raw(), value);
        Ok(())
    }

    fn remove(&mut self, key: &KvKey) -> Result<bool, KvError> {
        let mut entries = self.entries.lock().map_err(|_| KvError::LockPoisoned)?;
        Ok(entries.remove(&key.raw()).is_some())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::sqlite::SqliteKv;

#[cfg(not(target_arch = "wasm32"))]
mod sqlite {
    use std::path::Path;

    use rusqlite::{params, Connection, OptionalExtension};

    use super::{check_quota, KvBackend, KvError, KvKey, StorageErrorCode};

    /// SQLite-backed store with one row per key.
    pub struct SqliteKv {
        conn: Connection,
    }

    impl std::fmt::Debug for SqliteKv {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SqliteKv")
                .field("path", &self.conn.path())
                .finish()
        }
    }

    fn map_sqlite(e: &rusqlite::Error) -> KvError {
        let code = match e {
            rusqlite::Error::SqliteFailure(err, _) => match err.code {
                rusqlite::ErrorCode::DatabaseBusy => StorageErrorCode::Busy,
                rusqlite::ErrorCode::DatabaseLocked => StorageErrorCode::Locked,
                rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase => {
                    StorageErrorCode::Corrupted
                }
                rusqlite::ErrorCode::DiskFull => StorageErrorCode::DiskFull,
                rusqlite::ErrorCode::PermissionDenied | rusqlite::ErrorCode::ReadOnly => {
                    StorageErrorCode::PermissionDenied
                }
                rusqlite::ErrorCode::CannotOpen => StorageErrorCode::ConnectionFailed,
                rusqlite::ErrorCode::SystemIoFailure => StorageErrorCode::IoError,
                _ => StorageErrorCode::Unknown,
            },
            _ => StorageErrorCode::Unknown,
        };
        KvError::storage(code, e.to_string())
    }

    impl SqliteKv {
        pub fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
            let conn = Connection::open(path).map_err(|e| map_sqlite(&e))?;
            Self::initialize(conn)
        }

        pub fn open_in_memory() -> Result<Self, KvError> {
            let conn = Connection::open_in_memory().map_err(|e| map_sqlite(&e))?;
            Self::initialize(conn)
        }

        fn initialize(conn: Connection) -> Result<Self, KvError> {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value BLOB NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                "#,
            )
            .map_err(|e| map_sqlite(&e))?;
            Ok(Self { conn })
        }
    }

    impl KvBackend for SqliteKv {
        fn get(&self, key: &KvKey) -> Result<Option<Vec<u8>>, KvError> {
            self.conn
                .query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    params![key.raw()],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()
                .map_err(|e| map_sqlite(&e))
        }

        fn set(&mut self, key: &KvKey, value: Vec<u8>) -> Result<(), KvError> {
            check_quota(&value)?;
            self.conn
                .execute(
                    r#"
                    INSERT INTO kv (key, value, updated_at)
                    VALUES (?1, ?2, strftime('%s', 'now'))
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at
                    "#,
                    params![key.raw(), value],
                )
                .map_err(|e| map_sqlite(&e))?;
            Ok(())
        }

        fn remove(&mut self, key: &KvKey) -> Result<bool, KvError> {
            let removed = self
                .conn
                .execute("DELETE FROM kv WHERE key = ?1", params![key.raw()])
                .map_err(|e| map_sqlite(&e))?;
            Ok(removed > 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation_empty() {
        let result = KvKey::new("");
        assert!(matches!(result, Err(KvError::InvalidKey { .. })));
    }

    #[test]
    fn test_key_validation_whitespace() {
        assert!(KvKey::new("   ").is_err());
    }

    #[test]
    fn test_key_validation_null_byte() {
        assert!(KvKey::new("key\0value").is_err());
    }

    #[test]
    fn test_key_validation_path_traversal() {
        assert!(KvKey::new("../etc/passwd").is_err());
        assert!(KvKey::new("/products").is_err());
    }

    #[test]
    fn test_key_validation_too_long() {
        let long_key = "a".repeat(MAX_KEY_LENGTH + 1);
        assert!(KvKey::new(long_key).is_err());
    }

    #[test]
    fn test_key_validation_control_chars() {
        assert!(KvKey::new("key\x01value").is_err());
    }

    #[test]
    fn test_plain_key_is_raw() {
        let key = KvKey::new("products").unwrap();
        assert_eq!(key.raw(), "products");
        assert_eq!(key.namespace(), None);
    }

    #[test]
    fn test_namespaced_key() {
        let key = KvKey::namespaced("shop-1", "categories").unwrap();
        assert_eq!(key.raw(), "shop-1:categories");
        assert!(KvKey::namespaced("", "categories").is_err());
        assert!(KvKey::namespaced("bad namespace!", "categories").is_err());
    }

    #[test]
    fn test_memory_kv_round_trip_and_shared_handle() {
        let kv = MemoryKv::new();
        let mut writer = kv.clone();
        let key = KvKey::new("products").unwrap();

        assert_eq!(kv.get(&key).unwrap(), None);
        writer.set(&key, b"[]".to_vec()).unwrap();
        assert_eq!(kv.get(&key).unwrap(), Some(b"[]".to_vec()));
        assert_eq!(kv.get_raw("products"), Some(b"[]".to_vec()));

        assert!(writer.remove(&key).unwrap());
        assert!(!writer.remove(&key).unwrap());
        assert!(kv.is_empty());
    }

    #[test]
    fn test_memory_kv_quota() {
        let mut kv = MemoryKv::new();
        let key = KvKey::new("products").unwrap();
        let result = kv.set(&key, vec![b' '; MAX_VALUE_SIZE + 1]);
        assert!(matches!(result, Err(KvError::QuotaExceeded { .. })));
        assert_eq!(kv.get(&key).unwrap(), None);
    }

    #[test]
    fn test_sqlite_kv_upsert_replaces_value() {
        let mut kv = SqliteKv::open_in_memory().unwrap();
        let key = KvKey::new("categories").unwrap();

        kv.set(&key, br#"["Books"]"#.to_vec()).unwrap();
        kv.set(&key, br#"["Books","Toys"]"#.to_vec()).unwrap();

        assert_eq!(kv.get(&key).unwrap(), Some(br#"["Books","Toys"]"#.to_vec()));
        assert!(kv.remove(&key).unwrap());
        assert_eq!(kv.get(&key).unwrap(), None);
    }

    #[test]
    fn test_sqlite_kv_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let key = KvKey::namespaced("shop", "products").unwrap();

        {
            let mut kv = SqliteKv::open(&path).unwrap();
            kv.set(&key, b"[1,2,3]".to_vec()).unwrap();
        }

        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(kv.get(&key).unwrap(), Some(b"[1,2,3]".to_vec()));
    }
}

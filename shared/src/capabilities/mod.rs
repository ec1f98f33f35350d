//! Crux capabilities and the key-value persistence the repository writes to.

mod kv;

#[cfg(not(target_arch = "wasm32"))]
pub use self::kv::SqliteKv;
pub use self::kv::{
    KvBackend, KvError, KvKey, MemoryKv, StorageErrorCode, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};

// Persistence is not a Crux capability. The repository writes through a
// `KvBackend` before `update` returns.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
}

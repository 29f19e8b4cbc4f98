//! Folio Core
//!
//! Persisted, observable user preferences:
//!
//! - **Storage**: a key-value medium (`get_item` / `set_item`) injected into
//!   every store, with in-memory, no-op and JSON-file implementations
//! - **Preferences**: a store holding one value out of a fixed set, seeded from
//!   storage, mutated through `set` / `toggle`, observed through `subscribe`
//! - **Preference kinds**: the [`Theme`] and [`Language`] enums
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use folio_core::{MemoryStorage, PreferenceStore, Theme};
//!
//! let storage = MemoryStorage::new();
//! let theme = PreferenceStore::for_kind::<Theme>(Arc::new(storage.clone()));
//! assert_eq!(theme.get(), "dark");
//!
//! let _sub = theme.subscribe(|value| println!("theme is now {value}"));
//! theme.set("light").unwrap();
//! assert_eq!(storage.get("theme").as_deref(), Some("light"));
//!
//! theme.toggle();
//! assert_eq!(theme.get_as::<Theme>(), Some(Theme::Dark));
//! ```

mod error;
pub mod preference;
pub mod storage;
pub mod values;

pub use error::{PreferenceError, StorageError};
pub use preference::{PreferenceDef, PreferenceStore, Subscription};
pub use storage::{FileStorage, MemoryStorage, NullStorage, Storage};
pub use values::{Language, PreferenceValue, Theme};

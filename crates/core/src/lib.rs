//! # binuuid core
//!
//! Storage-side use of the [`binuuid`] codec: tables whose primary keys are 16-byte binary
//! UUIDs rather than 36-character strings.
//!
//! - [`KeyCodec`] turns a per-entity [`CodecConfig`] into key generation, display rendering
//!   and lookup normalisation.
//! - [`KeyedTable`] is an in-memory table keyed by those binary keys, with separate lookup entry
//!   points for string and raw-byte identifiers.
//!
//! **No persistence**: durable storage and query building belong to the host application.

mod error;
pub mod keys;
pub mod table;

pub use binuuid::{CodecConfig, NameSpec, UuidVersion};
pub use error::{CoreError, CoreResult};
pub use keys::{KeyCodec, StorageKey};
pub use table::{KeyedTable, RowView};

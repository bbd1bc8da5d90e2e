//! Binary UUID key codec.
//!
//! Relational tables that use UUID primary keys usually store them as 36-character strings.
//! This crate provides the conversions needed to store them as `BINARY(16)` instead, plus an
//! *optimized* ordering that keeps time-based (version 1) UUIDs clustered in B-tree indexes.
//!
//! ## Representations
//!
//! | Name       | Shape                                  | Example                                |
//! |------------|----------------------------------------|----------------------------------------|
//! | canonical  | 36 chars, lowercase, hyphenated        | `123e4567-e89b-12d3-a456-426614174000` |
//! | raw bytes  | 16 bytes, standard UUID byte order     | `12 3e 45 67 e8 9b 12 d3 a4 56 ..`     |
//! | hex        | 32 chars, lowercase, no hyphens        | `123e4567e89b12d3a456426614174000`     |
//! | optimized  | 32 chars, time-high first, no hyphens  | `12d3e89b123e4567a456426614174000`     |
//!
//! All conversions are pure functions; see [`codec`] for the permutation behind the optimized
//! form.
//!
//! ## Generation
//! [`generate`] produces a [`UuidValue`] for version 1, 3, 4 or 5. Versions 3 and 5 are
//! name-based and require a [`NameSpec`].
//!
//! ## Configuration
//! Per-entity settings (optimized storage and UUID version) live in [`CodecConfig`], which is
//! resolved once at startup and passed explicitly to callers.

pub mod codec;
mod config;
mod generate;

// Re-export public types
pub use codec::{
    is_canonical, is_optimized, normalize_bytes, optimize_bytes, to_hex_string, to_normal,
    to_optimized, to_raw_bytes,
};
pub use config::{optimized_from_env_value, version_from_env_value, CodecConfig};
pub use generate::{generate, NameSpec, UuidValue, UuidVersion};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Input did not match the fixed length/charset contract of the requested conversion.
    #[error("Invalid format: {0}")]
    Format(String),
    /// A new UUID could not be generated.
    #[error("Generation failed: {0}")]
    Generation(String),
    /// A configuration value could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;

//! Primary key handling for binary UUID columns.
//!
//! A table stores each key as 16 bytes. With `optimized` set those bytes are in time-high-first
//! order (see [`binuuid::codec`]); otherwise they are the standard UUID byte order.
//!
//! Identifiers arriving from outside (CLI arguments, request paths) are strings. They are
//! normalised to the stored byte order here, before any lookup happens.

use crate::{CoreError, CoreResult};
use binuuid::{
    generate, is_canonical, is_optimized, optimize_bytes, to_hex_string, to_normal, to_raw_bytes,
    CodecConfig, NameSpec, UuidError, UuidValue,
};

/// A binary primary key exactly as stored.
pub type StorageKey = [u8; 16];

/// Key generation and conversion for one entity type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyCodec {
    config: CodecConfig,
}

impl KeyCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Generates the key for a newly created row.
    ///
    /// `name` is required when the configured version is 3 or 5 and ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Key`] wrapping [`UuidError::Generation`] if generation fails.
    pub fn new_key(&self, name: Option<&NameSpec>) -> CoreResult<StorageKey> {
        let value = generate(self.config.version, name)?;
        let key = if self.config.optimized {
            value.optimized_bytes()
        } else {
            value.bytes()
        };
        tracing::debug!(
            id = %value,
            optimized = self.config.optimized,
            "allocated key"
        );
        Ok(key)
    }

    /// Renders a stored key as a canonical hyphenated UUID string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Key`] if `key` is not 16 bytes.
    pub fn display_id(&self, key: &[u8]) -> CoreResult<String> {
        let hex = to_hex_string(key)?;
        if self.config.optimized {
            Ok(to_normal(&hex)?)
        } else {
            Ok(UuidValue::parse(&hex)?.canonical())
        }
    }

    /// Normalises a string identifier to the stored key.
    ///
    /// Accepts the canonical hyphenated form or the 32-character form, in either case. With
    /// `optimized` set, the 32-character form is read as the optimized string and the canonical
    /// form is reordered; otherwise both decode directly.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Key`] wrapping [`UuidError::Format`] for anything else.
    pub fn key_from_string(&self, id: &str) -> CoreResult<StorageKey> {
        let id = id.trim().to_ascii_lowercase();
        if is_canonical(&id) {
            let raw = to_raw_bytes(&id)?;
            return Ok(if self.config.optimized {
                optimize_bytes(raw)
            } else {
                raw
            });
        }
        if is_optimized(&id) {
            return Ok(to_raw_bytes(&id)?);
        }
        Err(UuidError::Format(format!(
            "expected a canonical or 32-character UUID, got '{}'",
            id
        ))
        .into())
    }

    /// Validates a raw binary identifier already in stored byte order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Key`] wrapping [`UuidError::Format`] if `raw` is not 16 bytes.
    pub fn key_from_raw(&self, raw: &[u8]) -> CoreResult<StorageKey> {
        StorageKey::try_from(raw).map_err(|_| {
            CoreError::Key(UuidError::Format(format!(
                "expected 16 bytes, got {}",
                raw.len()
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binuuid::{to_optimized, Uuid, UuidVersion};

    const SAMPLE: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn plain() -> KeyCodec {
        KeyCodec::new(CodecConfig::new(false, UuidVersion::V4))
    }

    fn optimized() -> KeyCodec {
        KeyCodec::new(CodecConfig::new(true, UuidVersion::V1))
    }

    #[test]
    fn test_new_key_plain_is_standard_order() {
        let codec = plain();
        let key = codec.new_key(None).unwrap();
        let value = UuidValue::from_bytes(key);
        assert_eq!(value.version(), Some(UuidVersion::V4));
        assert_eq!(codec.display_id(&key).unwrap(), value.canonical());
    }

    #[test]
    fn test_new_key_optimized_is_reordered() {
        let codec = optimized();
        let key = codec.new_key(None).unwrap();
        let display = codec.display_id(&key).unwrap();

        // The stored bytes are the optimized string, not the canonical bytes.
        assert_eq!(to_hex_string(&key).unwrap(), to_optimized(&display).unwrap());
        assert_eq!(
            UuidValue::parse(&display).unwrap().version(),
            Some(UuidVersion::V1)
        );
    }

    #[test]
    fn test_new_key_name_based() {
        let codec = KeyCodec::new(CodecConfig::new(false, UuidVersion::V5));
        let name = NameSpec::new(Uuid::NAMESPACE_DNS, "python.org");

        let key = codec.new_key(Some(&name)).unwrap();
        assert_eq!(
            codec.display_id(&key).unwrap(),
            "886313e1-3b8a-5372-9b90-0c9aee199e5d"
        );

        let err = codec.new_key(None).unwrap_err();
        assert!(matches!(err, CoreError::Key(UuidError::Generation(_))));
    }

    #[test]
    fn test_key_from_string_plain() {
        let codec = plain();
        let from_canonical = codec.key_from_string(SAMPLE).unwrap();
        let from_hex = codec
            .key_from_string("123e4567e89b12d3a456426614174000")
            .unwrap();
        let from_upper = codec
            .key_from_string("123E4567-E89B-12D3-A456-426614174000")
            .unwrap();

        assert_eq!(from_canonical, to_raw_bytes(SAMPLE).unwrap());
        assert_eq!(from_canonical, from_hex);
        assert_eq!(from_canonical, from_upper);
    }

    #[test]
    fn test_key_from_string_optimized() {
        let codec = optimized();
        let from_canonical = codec.key_from_string(SAMPLE).unwrap();
        let from_optimized = codec
            .key_from_string("12d3e89b123e4567a456426614174000")
            .unwrap();

        assert_eq!(from_canonical, from_optimized);
        assert_eq!(codec.display_id(&from_canonical).unwrap(), SAMPLE);
    }

    #[test]
    fn test_key_from_string_rejects_malformed() {
        let codec = optimized();
        for id in ["", "123e4567", "123e4567-e89b-12d3-a456-42661417400z", "12d3-e89b"] {
            let err = codec.key_from_string(id).unwrap_err();
            assert!(err.is_malformed_key(), "expected malformed key for '{}'", id);
        }
    }

    #[test]
    fn test_key_from_raw() {
        let codec = plain();
        let raw = to_raw_bytes(SAMPLE).unwrap();
        assert_eq!(codec.key_from_raw(&raw).unwrap(), raw);
        assert!(codec.key_from_raw(&raw[..15]).unwrap_err().is_malformed_key());
    }

    #[test]
    fn test_display_id_rejects_wrong_length() {
        assert!(plain().display_id(&[0u8; 4]).is_err());
        assert!(optimized().display_id(&[0u8; 20]).is_err());
    }
}

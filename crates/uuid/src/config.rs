//! Per-entity key configuration.
//!
//! Resolve these values once at startup and pass them into the codec callers. The helpers below
//! parse optional string values without reading the process environment themselves, so that
//! tests and multi-threaded callers see consistent behaviour.

use crate::{UuidError, UuidResult, UuidVersion};

/// How keys for one entity type are generated and stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecConfig {
    /// Store keys in optimized (time-high-first) byte order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub optimized: bool,
    /// Version used when generating new keys.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: UuidVersion,
}

impl CodecConfig {
    pub fn new(optimized: bool, version: UuidVersion) -> Self {
        Self { optimized, version }
    }

    /// Version 1 keys stored in optimized order.
    pub fn time_ordered() -> Self {
        Self::new(true, UuidVersion::V1)
    }
}

/// Parse the UUID version from an optional string value.
///
/// Accepts `4` or `v4` style values. If `value` is `None`, blank, or names an unsupported
/// version (including numbers too large for any version), returns [`UuidVersion::V4`].
///
/// # Errors
///
/// Returns [`UuidError::Config`] if `value` is not a decimal number.
pub fn version_from_env_value(value: Option<String>) -> UuidResult<UuidVersion> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let Some(value) = value else {
        return Ok(UuidVersion::default());
    };

    let digits = value.strip_prefix(['v', 'V']).unwrap_or(value.as_str());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UuidError::Config(format!(
            "UUID version must be numeric, got '{}'",
            value
        )));
    }

    // Overflowing tags are unsupported rather than malformed.
    let tag: Option<u32> = digits.parse().ok();
    let version = UuidVersion::from_tag(tag);
    if tag != Some(u32::from(version.tag())) {
        tracing::warn!(tag = digits, "unsupported UUID version, falling back to v4");
    }
    Ok(version)
}

/// Parse the optimized-storage flag from an optional string value.
///
/// `None` or blank means `false`.
///
/// # Errors
///
/// Returns [`UuidError::Config`] unless the value is one of `true/false/1/0/yes/no/on/off`
/// (case-insensitive).
pub fn optimized_from_env_value(value: Option<String>) -> UuidResult<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(UuidError::Config(format!(
            "optimized flag must be a boolean, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert!(!config.optimized);
        assert_eq!(config.version, UuidVersion::V4);
    }

    #[test]
    fn test_time_ordered_config() {
        let config = CodecConfig::time_ordered();
        assert!(config.optimized);
        assert_eq!(config.version, UuidVersion::V1);
    }

    #[test]
    fn test_version_from_env_value_absent_or_blank() {
        assert_eq!(version_from_env_value(None).unwrap(), UuidVersion::V4);
        assert_eq!(
            version_from_env_value(Some("   ".into())).unwrap(),
            UuidVersion::V4
        );
    }

    #[test]
    fn test_version_from_env_value_supported() {
        assert_eq!(
            version_from_env_value(Some("1".into())).unwrap(),
            UuidVersion::V1
        );
        assert_eq!(
            version_from_env_value(Some(" v5 ".into())).unwrap(),
            UuidVersion::V5
        );
        assert_eq!(
            version_from_env_value(Some("V3".into())).unwrap(),
            UuidVersion::V3
        );
    }

    #[test]
    fn test_version_from_env_value_unsupported_falls_back() {
        assert_eq!(
            version_from_env_value(Some("2".into())).unwrap(),
            UuidVersion::V4
        );
        assert_eq!(
            version_from_env_value(Some("9".into())).unwrap(),
            UuidVersion::V4
        );
    }

    #[test]
    fn test_version_from_env_value_non_numeric() {
        match version_from_env_value(Some("random".into())) {
            Err(UuidError::Config(msg)) => assert!(msg.contains("must be numeric")),
            other => panic!("Expected Config error, got {:?}", other),
        }
        assert!(version_from_env_value(Some("v".into())).is_err());
        assert!(version_from_env_value(Some("+4".into())).is_err());
        assert!(version_from_env_value(Some("-1".into())).is_err());
    }

    #[test]
    fn test_version_from_env_value_out_of_range_falls_back() {
        for value in ["300", "999", "v256", "99999999999999999999"] {
            assert_eq!(
                version_from_env_value(Some(value.into())).unwrap(),
                UuidVersion::V4,
                "expected fallback for '{}'",
                value
            );
        }
    }

    #[test]
    fn test_optimized_from_env_value() {
        assert!(!optimized_from_env_value(None).unwrap());
        assert!(!optimized_from_env_value(Some("".into())).unwrap());
        assert!(!optimized_from_env_value(Some("false".into())).unwrap());
        assert!(optimized_from_env_value(Some("TRUE".into())).unwrap());
        assert!(optimized_from_env_value(Some(" 1 ".into())).unwrap());
        assert!(optimized_from_env_value(Some("yes".into())).unwrap());
        assert!(optimized_from_env_value(Some("maybe".into())).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_deserialize_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());

        let config: CodecConfig =
            serde_json::from_str(r#"{"optimized": true, "version": 1}"#).unwrap();
        assert_eq!(config, CodecConfig::time_ordered());
    }
}

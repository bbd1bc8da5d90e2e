//! UUID generation and the immutable [`UuidValue`] wrapper.

use crate::codec::{optimize_bytes, to_raw_bytes, RAW_LEN};
use crate::{UuidError, UuidResult};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{fmt, str::FromStr};
use uuid::{Builder, ContextV1, Timestamp, Uuid};

/// Clock sequence shared by every version 1 UUID generated in this process.
static CLOCK_SEQUENCE: OnceLock<ContextV1> = OnceLock::new();

/// The generation algorithm used for a new UUID.
///
/// Stored and configured as its integer tag (1, 3, 4 or 5).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum UuidVersion {
    /// Time and node based.
    V1,
    /// Name based, MD5.
    V3,
    /// Random.
    #[default]
    V4,
    /// Name based, SHA-1.
    V5,
}

impl UuidVersion {
    /// Selects a version from an optional tag, falling back to [`UuidVersion::V4`] when the tag
    /// is absent or not one of 1, 3, 4, 5.
    ///
    /// # Arguments
    ///
    /// * `tag` - Requested version number, if any.
    ///
    /// # Returns
    ///
    /// Returns the matching version, or [`UuidVersion::V4`].
    pub fn from_tag(tag: Option<u32>) -> Self {
        match tag {
            Some(1) => Self::V1,
            Some(3) => Self::V3,
            Some(5) => Self::V5,
            _ => Self::V4,
        }
    }

    /// Returns the integer tag for this version.
    pub fn tag(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5 => 5,
        }
    }

    /// Returns true for the name-based versions (3 and 5).
    pub fn is_name_based(self) -> bool {
        matches!(self, Self::V3 | Self::V5)
    }
}

impl TryFrom<u8> for UuidVersion {
    type Error = UuidError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 | 3 | 4 | 5 => Ok(Self::from_tag(Some(u32::from(tag)))),
            other => Err(UuidError::Config(format!(
                "unsupported UUID version {}, expected one of 1, 3, 4, 5",
                other
            ))),
        }
    }
}

impl From<UuidVersion> for u8 {
    fn from(version: UuidVersion) -> Self {
        version.tag()
    }
}

impl fmt::Display for UuidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.tag())
    }
}

/// Namespace and name input for the name-based versions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameSpec {
    pub namespace: Uuid,
    pub name: Vec<u8>,
}

impl NameSpec {
    pub fn new(namespace: Uuid, name: impl AsRef<[u8]>) -> Self {
        Self {
            namespace,
            name: name.as_ref().to_vec(),
        }
    }

    /// Resolves a namespace given either as a well-known label (`dns`, `url`, `oid`, `x500`) or
    /// as a UUID string.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::Format`] if `input` is neither a known label nor a valid UUID.
    pub fn namespace_from_str(input: &str) -> UuidResult<Uuid> {
        match input.trim().to_ascii_lowercase().as_str() {
            "dns" => Ok(Uuid::NAMESPACE_DNS),
            "url" => Ok(Uuid::NAMESPACE_URL),
            "oid" => Ok(Uuid::NAMESPACE_OID),
            "x500" => Ok(Uuid::NAMESPACE_X500),
            other => Ok(Uuid::from_bytes(to_raw_bytes(other)?)),
        }
    }
}

/// Generates a new UUID of the requested version.
///
/// Version 1 reads the system clock, version 4 draws from the OS entropy source, and versions
/// 3 and 5 hash `name`. No state is kept between calls apart from the version 1 clock sequence.
///
/// # Arguments
///
/// * `version` - Generation algorithm to use.
/// * `name` - Namespace and name; only read for versions 3 and 5, where it is required.
///
/// # Returns
///
/// Returns a new [`UuidValue`] exposing both its canonical string and its raw bytes.
///
/// # Errors
///
/// Returns [`UuidError::Generation`] if the entropy source or system clock is unavailable, or if
/// a name-based version is requested without a [`NameSpec`].
pub fn generate(version: UuidVersion, name: Option<&NameSpec>) -> UuidResult<UuidValue> {
    let uuid = match version {
        UuidVersion::V1 => new_v1()?,
        UuidVersion::V3 => {
            let spec = require_name(version, name)?;
            Uuid::new_v3(&spec.namespace, &spec.name)
        }
        UuidVersion::V4 => new_v4()?,
        UuidVersion::V5 => {
            let spec = require_name(version, name)?;
            Uuid::new_v5(&spec.namespace, &spec.name)
        }
    };

    tracing::debug!(version = version.tag(), "generated uuid");
    Ok(UuidValue(uuid))
}

fn require_name(version: UuidVersion, name: Option<&NameSpec>) -> UuidResult<&NameSpec> {
    name.ok_or_else(|| {
        UuidError::Generation(format!(
            "version {} requires a namespace and name",
            version.tag()
        ))
    })
}

fn fill_random(buf: &mut [u8]) -> UuidResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| UuidError::Generation(format!("entropy source unavailable: {}", e)))
}

fn new_v4() -> UuidResult<Uuid> {
    let mut bytes = [0u8; RAW_LEN];
    fill_random(&mut bytes)?;
    Ok(Builder::from_random_bytes(bytes).into_uuid())
}

fn new_v1() -> UuidResult<Uuid> {
    // 6 bytes of node id followed by 2 bytes of clock sequence seed.
    let mut random = [0u8; 8];
    fill_random(&mut random)?;

    let mut node_id = [0u8; 6];
    node_id.copy_from_slice(&random[..6]);
    // Random node ids must carry the multicast bit (RFC 4122 section 4.5).
    node_id[0] |= 0x01;

    let context =
        CLOCK_SEQUENCE.get_or_init(|| ContextV1::new(u16::from_be_bytes([random[6], random[7]])));

    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| UuidError::Generation(format!("system clock before unix epoch: {}", e)))?;
    let ts = Timestamp::from_unix(
        context,
        since_epoch.as_secs(),
        since_epoch.subsec_nanos(),
    );

    Ok(Uuid::new_v1(ts, &node_id))
}

/// An immutable UUID value with access to each of its representations.
///
/// Created by [`generate`] or by parsing external input with [`UuidValue::parse`]. Conversions
/// return new values and never modify the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct UuidValue(Uuid);

impl UuidValue {
    /// Wraps raw bytes in standard UUID byte order.
    pub fn from_bytes(bytes: [u8; RAW_LEN]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parses a canonical or 32-character hex UUID string.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::Format`] under the same rules as [`to_raw_bytes`].
    pub fn parse(input: &str) -> UuidResult<Self> {
        Ok(Self::from_bytes(to_raw_bytes(input)?))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// 36-character lowercase hyphenated form.
    pub fn canonical(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// 16 raw bytes in standard UUID byte order.
    pub fn bytes(&self) -> [u8; RAW_LEN] {
        *self.0.as_bytes()
    }

    /// 32-character lowercase hex form of [`UuidValue::bytes`].
    pub fn hex(&self) -> String {
        self.0.simple().to_string()
    }

    /// Raw bytes in optimized (time-high-first) order.
    pub fn optimized_bytes(&self) -> [u8; RAW_LEN] {
        optimize_bytes(self.bytes())
    }

    /// 32-character optimized form.
    pub fn optimized(&self) -> String {
        Uuid::from_bytes(self.optimized_bytes()).simple().to_string()
    }

    /// The version this value was generated with, if it is one of 1, 3, 4, 5.
    pub fn version(&self) -> Option<UuidVersion> {
        match self.0.get_version_num() {
            1 => Some(UuidVersion::V1),
            3 => Some(UuidVersion::V3),
            4 => Some(UuidVersion::V4),
            5 => Some(UuidVersion::V5),
            _ => None,
        }
    }

    /// The creation time embedded in a version 1 value.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if self.version() != Some(UuidVersion::V1) {
            return None;
        }
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
    }
}

impl From<Uuid> for UuidValue {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UuidValue> for String {
    fn from(value: UuidValue) -> Self {
        value.canonical()
    }
}

impl TryFrom<String> for UuidValue {
    type Error = UuidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for UuidValue {
    /// Formats the value in canonical hyphenated form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for UuidValue {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

//! In-memory table keyed by binary UUIDs.
//!
//! Rows are held in key order, the same order a B-tree primary key index would use, so the
//! effect of the optimized byte order on locality is visible through [`KeyedTable::iter`].

use crate::keys::{KeyCodec, StorageKey};
use crate::{CoreError, CoreResult, NameSpec};
use serde::Serialize;
use std::collections::BTreeMap;

/// A row rendered for output, with its key in display form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowView<'a, T> {
    /// Canonical hyphenated identifier.
    pub id: String,
    /// Lowercase hex of the bytes as stored.
    pub stored_key: String,
    pub record: &'a T,
}

/// Rows of `T` under 16-byte primary keys generated by a [`KeyCodec`].
#[derive(Clone, Debug)]
pub struct KeyedTable<T> {
    keys: KeyCodec,
    rows: BTreeMap<StorageKey, T>,
}

impl<T> KeyedTable<T> {
    pub fn new(keys: KeyCodec) -> Self {
        Self {
            keys,
            rows: BTreeMap::new(),
        }
    }

    pub fn keys(&self) -> &KeyCodec {
        &self.keys
    }

    /// Inserts `record` under a freshly generated key and returns that key.
    ///
    /// # Errors
    ///
    /// Fails if key generation fails (including a name-based version configured without a
    /// name) or if the generated key is already present.
    pub fn create(&mut self, record: T) -> CoreResult<StorageKey> {
        self.insert_new(record, None)
    }

    /// Like [`KeyedTable::create`], supplying the namespace and name for versions 3 and 5.
    ///
    /// Name-based keys are deterministic, so creating twice with the same name fails with
    /// [`CoreError::DuplicateKey`].
    pub fn create_named(&mut self, record: T, name: &NameSpec) -> CoreResult<StorageKey> {
        self.insert_new(record, Some(name))
    }

    fn insert_new(&mut self, record: T, name: Option<&NameSpec>) -> CoreResult<StorageKey> {
        let key = self.keys.new_key(name)?;
        if self.rows.contains_key(&key) {
            return Err(CoreError::DuplicateKey(self.keys.display_id(&key)?));
        }
        self.rows.insert(key, record);
        Ok(key)
    }

    /// Looks up a row by a canonical or 32-character string identifier.
    ///
    /// Returns `Ok(None)` for a well-formed identifier with no row.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`CoreError::is_malformed_key`] is true if `id` is not a
    /// well-formed identifier.
    pub fn find_by_canonical_or_optimized_string(&self, id: &str) -> CoreResult<Option<&T>> {
        let key = self.keys.key_from_string(id).inspect_err(|e| {
            tracing::warn!("rejected string identifier: {}", e);
        })?;
        Ok(self.rows.get(&key))
    }

    /// Looks up a row by its key bytes exactly as stored.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`CoreError::is_malformed_key`] is true if `raw` is not 16
    /// bytes.
    pub fn find_by_raw_bytes(&self, raw: &[u8]) -> CoreResult<Option<&T>> {
        let key = self.keys.key_from_raw(raw).inspect_err(|e| {
            tracing::warn!("rejected raw identifier: {}", e);
        })?;
        Ok(self.rows.get(&key))
    }

    /// Removes and returns the row for a string identifier.
    pub fn remove(&mut self, id: &str) -> CoreResult<Option<T>> {
        let key = self.keys.key_from_string(id)?;
        Ok(self.rows.remove(&key))
    }

    /// Display form of a stored key.
    pub fn display_id(&self, key: &StorageKey) -> CoreResult<String> {
        self.keys.display_id(key)
    }

    /// Rows in stored key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StorageKey, &T)> {
        self.rows.iter()
    }

    /// Rows in stored key order, rendered for output.
    pub fn views(&self) -> CoreResult<Vec<RowView<'_, T>>> {
        self.rows
            .iter()
            .map(|(key, record)| {
                Ok(RowView {
                    id: self.keys.display_id(key)?,
                    stored_key: binuuid::to_hex_string(key)?,
                    record,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

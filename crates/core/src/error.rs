use binuuid::UuidError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("key error: {0}")]
    Key(#[from] UuidError),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
}

impl CoreError {
    /// True when the caller supplied an identifier that is not a well-formed UUID.
    ///
    /// Callers decide whether this means "not found" or "bad request".
    pub fn is_malformed_key(&self) -> bool {
        matches!(self, CoreError::Key(UuidError::Format(_)))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

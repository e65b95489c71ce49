use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// JSON documents are stored as TEXT columns.
pub(crate) fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn from_json_text<T: DeserializeOwned>(text: &str) -> Result<T, StorageError> {
    serde_json::from_str(text).map_err(ser)
}

pub(crate) fn done_to_i64(done: bool) -> i64 {
    i64::from(done)
}

pub(crate) fn done_from_i64(v: i64) -> Result<bool, StorageError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StorageError::Serialization(format!(
            "invalid done flag: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_flag_rejects_garbage() {
        assert!(done_from_i64(1).unwrap());
        assert!(!done_from_i64(0).unwrap());
        assert!(matches!(
            done_from_i64(7),
            Err(StorageError::Serialization(_))
        ));
    }
}

//! KV store storage - named entries holding opaque bytes.

use crate::define_simple_storage;
use anyhow::Result;

define_simple_storage! {
    /// KV store storage with byte-level API.
    pub struct KvStoreStorage { table: "kv_store" }
}

impl KvStoreStorage {
    /// Read an entry as UTF-8 text.
    pub fn get_text(&self, key: &str) -> Result<Option<String>> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(String::from_utf8(bytes)?)),
            None => Ok(None),
        }
    }

    /// Write a UTF-8 entry, replacing any previous value.
    pub fn put_text(&self, key: &str, value: &str) -> Result<()> {
        self.put_raw(key, value.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::Database;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn setup() -> (KvStoreStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = KvStoreStorage::new(db).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_put_and_get_raw() {
        let (storage, _temp_dir) = setup();

        storage.put_raw("entry", b"payload").unwrap();
        assert_eq!(storage.get_raw("entry").unwrap(), Some(b"payload".to_vec()));
        assert!(storage.get_raw("missing").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_whole_value() {
        let (storage, _temp_dir) = setup();

        storage.put_text("entry", "a much longer first value").unwrap();
        storage.put_text("entry", "short").unwrap();
        assert_eq!(storage.get_text("entry").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_delete() {
        let (storage, _temp_dir) = setup();

        storage.put_text("entry", "value").unwrap();
        assert!(storage.delete("entry").unwrap());
        assert!(!storage.delete("entry").unwrap());
        assert!(storage.get_raw("entry").unwrap().is_none());
    }

    #[test]
    fn test_get_text_rejects_invalid_utf8() {
        let (storage, _temp_dir) = setup();

        storage.put_raw("entry", &[0xff, 0xfe]).unwrap();
        assert!(storage.get_text("entry").is_err());
    }
}

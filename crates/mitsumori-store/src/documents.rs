//! Named collections of JSON records keyed by id

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use mitsumori_types::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

type Collection = BTreeMap<String, Value>;

/// File-backed document store
///
/// Every call reads the collection file fresh, so several handles on the same
/// directory see each other's writes.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents_dir: PathBuf,
}

impl DocumentStore {
    /// Create or open a store under `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        let documents_dir = store_dir.join("documents");
        fs::create_dir_all(&documents_dir)?;
        Ok(Self { documents_dir })
    }

    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidPath(collection.to_string()).into());
        }
        Ok(self.documents_dir.join(format!("{}.json", collection)))
    }

    fn read_collection(&self, collection: &str) -> Result<Collection> {
        let path = self.collection_path(collection)?;
        if !path.exists() {
            return Ok(Collection::new());
        }
        let reader = BufReader::new(File::open(&path)?);
        serde_json::from_reader(reader).map_err(|e| {
            StoreError::Corrupted(format!("{}: {}", path.display(), e)).into()
        })
    }

    fn write_collection(&self, collection: &str, records: &Collection) -> Result<()> {
        let path = self.collection_path(collection)?;
        let tmp_path = path.with_extension("json.tmp");
        {
            let writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(writer, records)?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Insert or replace the record stored under `id`
    pub fn put<T: Serialize>(&self, collection: &str, id: &str, record: &T) -> Result<()> {
        let mut records = self.read_collection(collection)?;
        records.insert(id.to_string(), serde_json::to_value(record)?);
        self.write_collection(collection, &records)?;
        tracing::debug!(collection, id, "document saved");
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let mut records = self.read_collection(collection)?;
        match records.remove(id) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// All records of a collection, ordered by id
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<(String, T)>> {
        self.read_collection(collection)?
            .into_iter()
            .map(|(id, value)| -> Result<(String, T)> { Ok((id, serde_json::from_value(value)?)) })
            .collect()
    }

    /// Remove a record; returns false if it did not exist
    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut records = self.read_collection(collection)?;
        if records.remove(id).is_none() {
            return Ok(false);
        }
        self.write_collection(collection, &records)?;
        tracing::debug!(collection, id, "document deleted");
        Ok(true)
    }

    pub fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.read_collection(collection)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitsumori_types::Error;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Paint {
        name: String,
        price: u64,
    }

    fn paint(name: &str, price: u64) -> Paint {
        Paint {
            name: name.to_string(),
            price,
        }
    }

    #[test]
    fn test_put_get_roundtrip_across_handles() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        store.put("paints", "p1", &paint("日本ペイント", 4800)).unwrap();

        let reopened = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        let loaded: Option<Paint> = reopened.get("paints", "p1").unwrap();
        assert_eq!(loaded, Some(paint("日本ペイント", 4800)));
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        let all: Vec<(String, Paint)> = store.list("paints").unwrap();
        assert!(all.is_empty());
        assert_eq!(store.get::<Paint>("paints", "nope").unwrap(), None);
    }

    #[test]
    fn test_put_replaces_and_delete_reports() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        store.put("paints", "p1", &paint("a", 1)).unwrap();
        store.put("paints", "p1", &paint("b", 2)).unwrap();
        store.put("paints", "p2", &paint("c", 3)).unwrap();
        assert_eq!(store.count("paints").unwrap(), 2);

        assert!(store.delete("paints", "p1").unwrap());
        assert!(!store.delete("paints", "p1").unwrap());
        let all: Vec<(String, Paint)> = store.list("paints").unwrap();
        assert_eq!(all, vec![("p2".to_string(), paint("c", 3))]);
    }

    #[test]
    fn test_rejects_bad_collection_name() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        let err = store.put("../escape", "x", &paint("a", 1)).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_corrupted_collection_is_reported() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        fs::write(store.documents_dir().join("paints.json"), "{not json").unwrap();
        let err = store.list::<Paint>("paints").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Corrupted(_))));
    }
}

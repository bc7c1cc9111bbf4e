use super::{VectorStore, Vocabulary};
use crate::core::common::{codec, WordVecError};
use crate::core::types::ItemId;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// In-memory store: a vocabulary plus a flat `id * dimension` vector table.
///
/// This is what ingestion produces and what the offline build reads.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryVectorStore {
    dimension: usize,
    vocabulary: Vocabulary,
    vectors: Vec<f32>,
}

/// On-disk shape of the store.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    dimension: u64,
    keywords: Vec<String>,
    vectors: Vec<f32>,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    dimension: u64,
    keywords: &'a [String],
    vectors: &'a [f32],
}

impl InMemoryVectorStore {
    /// Creates an empty store for `dimension`-length vectors.
    ///
    /// # Errors
    /// `InvalidInput` if `dimension` is 0.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(WordVecError::InvalidInput("dimension must be greater than 0".to_string()));
        }
        Ok(Self { dimension, vocabulary: Vocabulary::new(), vectors: Vec::new() })
    }

    /// Stores `vector` under `keyword` and returns its id.
    ///
    /// A keyword seen before keeps its id and has its vector replaced.
    ///
    /// # Errors
    /// `DimensionMismatch` for a wrong-length vector; `InvalidInput` for a
    /// non-finite component.
    pub fn insert(&mut self, keyword: &str, vector: &[f32]) -> Result<ItemId> {
        if vector.len() != self.dimension {
            return Err(WordVecError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if !vector.iter().all(|x| x.is_finite()) {
            return Err(WordVecError::InvalidInput(format!(
                "vector for '{keyword}' contains NaN or infinite values"
            )));
        }

        let (id, inserted) = self.vocabulary.get_or_insert(keyword)?;
        if inserted {
            self.vectors.extend_from_slice(vector);
        } else {
            let start = id as usize * self.dimension;
            self.vectors[start..start + self.dimension].copy_from_slice(vector);
        }
        Ok(id)
    }

    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Splits the store into its vocabulary, dropping the vector table.
    #[must_use]
    pub fn into_vocabulary(self) -> Vocabulary {
        self.vocabulary
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = StoreFileRef {
            dimension: self.dimension as u64,
            keywords: self.vocabulary.keywords(),
            vectors: &self.vectors,
        };
        codec::save_to_file(path.as_ref(), &file)
    }

    /// # Errors
    /// `Io` if the file is unreadable; `Serialization` if it is malformed or
    /// its keyword and vector tables disagree.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file: StoreFile = codec::load_from_file(path.as_ref())?;
        let dimension = usize::try_from(file.dimension)
            .ok()
            .filter(|&d| d > 0)
            .ok_or_else(|| WordVecError::Serialization(format!("invalid dimension {}", file.dimension)))?;
        if file.keywords.len().checked_mul(dimension) != Some(file.vectors.len()) {
            return Err(WordVecError::Serialization(format!(
                "{} keywords but {} floats at dimension {dimension}",
                file.keywords.len(),
                file.vectors.len()
            )));
        }
        let vocabulary = Vocabulary::from_keywords(file.keywords)
            .map_err(|e| WordVecError::Serialization(e.to_string()))?;
        Ok(Self { dimension, vocabulary, vectors: file.vectors })
    }
}

impl VectorStore for InMemoryVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vocabulary.len()
    }

    fn get_vector(&self, id: ItemId) -> Result<&[f32]> {
        if (id as usize) >= self.vocabulary.len() {
            return Err(WordVecError::item_not_found(id));
        }
        let start = id as usize * self.dimension;
        Ok(&self.vectors[start..start + self.dimension])
    }

    fn get_id(&self, keyword: &str) -> Result<ItemId> {
        self.vocabulary.id_of(keyword).ok_or_else(|| WordVecError::keyword_not_found(keyword))
    }

    fn get_keyword(&self, id: ItemId) -> Result<&str> {
        self.vocabulary.keyword_of(id).ok_or_else(|| WordVecError::item_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_store() -> InMemoryVectorStore {
        let mut store = InMemoryVectorStore::new(2).unwrap();
        store.insert("A", &[1.0, 0.0]).unwrap();
        store.insert("B", &[0.0, 1.0]).unwrap();
        store
    }

    #[test]
    fn test_lookups() {
        let store = sample_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_id("B").unwrap(), 1);
        assert_eq!(store.get_keyword(0).unwrap(), "A");
        assert_eq!(store.get_vector(1).unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn test_missing_entries_are_not_found() {
        let store = sample_store();
        assert!(matches!(store.get_id("C"), Err(WordVecError::NotFound(_))));
        assert!(matches!(store.get_keyword(5), Err(WordVecError::NotFound(_))));
        assert!(matches!(store.get_vector(2), Err(WordVecError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_keyword_overwrites_vector() {
        let mut store = sample_store();
        assert_eq!(store.insert("A", &[3.0, 4.0]).unwrap(), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_vector(0).unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn test_insert_validation() {
        let mut store = sample_store();
        assert!(matches!(
            store.insert("C", &[1.0]),
            Err(WordVecError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(store.insert("C", &[f32::NAN, 1.0]), Err(WordVecError::InvalidInput(_))));
        assert_eq!(store.len(), 2);
        assert!(InMemoryVectorStore::new(0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wordvector.bin");
        let store = sample_store();
        store.save(&path).unwrap();
        assert_eq!(InMemoryVectorStore::load(&path).unwrap(), store);
    }

    #[test]
    fn test_load_rejects_inconsistent_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        let file = StoreFile { dimension: 2, keywords: vec!["A".into(), "B".into()], vectors: vec![1.0, 0.0, 0.5] };
        codec::save_to_file(&path, &file).unwrap();
        assert!(matches!(InMemoryVectorStore::load(&path), Err(WordVecError::Serialization(_))));
    }
}

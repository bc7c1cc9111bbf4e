use crate::core::common::{codec, WordVecError};
use crate::core::types::ItemId;
use crate::Result;
use std::collections::HashMap;
use std::path::Path;

/// Dense two-way mapping between keywords and item ids.
///
/// Ids are handed out in insertion order starting at 0. Persisted as the
/// ordered keyword list; the reverse map is rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    keywords: Vec<String>,
    ids: HashMap<String, ItemId>,
}

impl Vocabulary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a vocabulary from keywords listed in id order.
    ///
    /// # Errors
    /// `InvalidInput` on a repeated keyword or more keywords than ids.
    pub fn from_keywords(keywords: Vec<String>) -> Result<Self> {
        let mut ids = HashMap::with_capacity(keywords.len());
        for (index, keyword) in keywords.iter().enumerate() {
            let id = ItemId::try_from(index)
                .map_err(|_| WordVecError::InvalidInput("vocabulary exceeds the id space".to_string()))?;
            if ids.insert(keyword.clone(), id).is_some() {
                return Err(WordVecError::InvalidInput(format!(
                    "keyword '{keyword}' appears more than once"
                )));
            }
        }
        Ok(Self { keywords, ids })
    }

    /// Returns the id of `keyword`, assigning the next id if it is new.
    /// The flag is `true` when the keyword was inserted by this call.
    ///
    /// # Errors
    /// `InvalidInput` when the id space is exhausted.
    pub fn get_or_insert(&mut self, keyword: &str) -> Result<(ItemId, bool)> {
        if let Some(&id) = self.ids.get(keyword) {
            return Ok((id, false));
        }
        let id = ItemId::try_from(self.keywords.len())
            .map_err(|_| WordVecError::InvalidInput("vocabulary exceeds the id space".to_string()))?;
        self.keywords.push(keyword.to_string());
        self.ids.insert(keyword.to_string(), id);
        Ok((id, true))
    }

    #[must_use]
    pub fn id_of(&self, keyword: &str) -> Option<ItemId> {
        self.ids.get(keyword).copied()
    }

    #[must_use]
    pub fn keyword_of(&self, id: ItemId) -> Option<&str> {
        self.keywords.get(id as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords in id order.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        codec::save_to_file(path.as_ref(), &self.keywords)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let keywords: Vec<String> = codec::load_from_file(path.as_ref())?;
        Self::from_keywords(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.get_or_insert("apple").unwrap(), (0, true));
        assert_eq!(vocab.get_or_insert("banana").unwrap(), (1, true));
        assert_eq!(vocab.get_or_insert("apple").unwrap(), (0, false));

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.id_of("banana"), Some(1));
        assert_eq!(vocab.keyword_of(0), Some("apple"));
        assert_eq!(vocab.id_of("cherry"), None);
        assert_eq!(vocab.keyword_of(2), None);
    }

    #[test]
    fn test_from_keywords_rejects_duplicates() {
        let result = Vocabulary::from_keywords(vec!["a".into(), "b".into(), "a".into()]);
        assert!(matches!(result, Err(WordVecError::InvalidInput(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocabulary.bin");
        let vocab = Vocabulary::from_keywords(vec!["北京".into(), "上海".into(), "深圳".into()]).unwrap();
        vocab.save(&path).unwrap();

        let loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded, vocab);
        assert_eq!(loaded.id_of("深圳"), Some(2));
    }
}

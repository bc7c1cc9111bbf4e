use crate::core::common::WordVecError;
use crate::core::config::Config;
use crate::core::indexing::{AnnForest, SearchBudget};
use crate::core::segment::Segmenter;
use crate::core::store::VectorStore;
use crate::core::types::{ItemId, ScoredKeyword};
use crate::core::vector::{add_assign, cosine_similarity};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Result-count and search-effort settings for a [`QueryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Used when a request asks for no count, or for zero or fewer results.
    pub default_num_results: usize,
    /// Hard cap on the result count of any request.
    pub max_num_results: usize,
    pub search_budget: SearchBudget,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            default_num_results: 10,
            max_num_results: 100,
            search_budget: SearchBudget::Limited(10_000),
        }
    }
}

impl From<&Config> for QueryOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_num_results: config.default_num_results,
            max_num_results: config.max_num_results,
            search_budget: SearchBudget::from_raw(config.search_budget),
        }
    }
}

/// Answers similarity queries against an immutable forest and store.
///
/// Every method takes `&self`; share one engine behind an `Arc` across all
/// request workers.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    forest: Arc<AnnForest>,
    store: Arc<dyn VectorStore>,
    segmenter: Option<Arc<Segmenter>>,
    options: QueryOptions,
}

impl QueryEngine {
    /// # Errors
    /// `BuildInvariantViolation` if the forest is not built; `InvalidInput`
    /// if forest and store disagree on dimension or item count, or the
    /// result-count options are inconsistent.
    pub fn new(forest: Arc<AnnForest>, store: Arc<dyn VectorStore>, options: QueryOptions) -> Result<Self> {
        if !forest.is_built() {
            return Err(WordVecError::BuildInvariantViolation(
                "query engine needs a built forest".to_string(),
            ));
        }
        if forest.dimension() != store.dimension() || forest.len() != store.len() {
            return Err(WordVecError::InvalidInput(format!(
                "forest ({} items of dimension {}) does not match store ({} items of dimension {})",
                forest.len(),
                forest.dimension(),
                store.len(),
                store.dimension()
            )));
        }
        if options.default_num_results == 0 || options.max_num_results < options.default_num_results {
            return Err(WordVecError::InvalidInput(format!(
                "need 1 <= default_num_results ({}) <= max_num_results ({})",
                options.default_num_results, options.max_num_results
            )));
        }
        Ok(Self { forest, store, segmenter: None, options })
    }

    /// Enables segmentation of single unknown phrases in [`Self::similar_keywords`].
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: Arc<Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.forest.dimension()
    }

    /// Effective result count: absent, zero or negative requests get the
    /// default, anything above the cap gets the cap.
    #[must_use]
    pub fn clamp_num_results(&self, requested: Option<i64>) -> usize {
        match requested.and_then(|n| usize::try_from(n).ok()) {
            None | Some(0) => self.options.default_num_results,
            Some(n) => n.min(self.options.max_num_results),
        }
    }

    /// Keywords most similar to the sum of `keywords`' vectors.
    ///
    /// If the first keyword is unknown, a lone keyword is segmented into
    /// dictionary words when a segmenter is configured; otherwise the request
    /// fails with `NotFound`. Later unknown keywords are skipped.
    ///
    /// # Errors
    /// `NotFound`, `EmptyQuery` when nothing resolves, `DegenerateVector` for a
    /// zero aggregate, or any failure resolving a result keyword.
    pub fn similar_keywords(&self, keywords: &[String], num_results: Option<i64>) -> Result<Vec<ScoredKeyword>> {
        let first = keywords
            .first()
            .ok_or_else(|| WordVecError::EmptyQuery("no keywords given".to_string()))?;

        let segmented;
        let terms: &[String] = match self.store.get_id(first) {
            Ok(_) => keywords,
            Err(WordVecError::NotFound(_)) if keywords.len() == 1 && self.segmenter.is_some() => {
                segmented = self.segmenter.as_ref().map(|s| s.segment(first)).unwrap_or_default();
                debug!(phrase = %first, segments = ?segmented, "segmented unknown phrase");
                &segmented
            }
            Err(e) => return Err(e),
        };

        let query = self.aggregate(terms)?;
        self.nearest(&query, self.clamp_num_results(num_results))
    }

    /// Keywords most similar to a raw vector.
    ///
    /// # Errors
    /// `DimensionMismatch` if `vector` has the wrong length, plus the failures
    /// of ranking and keyword resolution.
    pub fn similar_keywords_from_vector(&self, vector: &[f32], num_results: Option<i64>) -> Result<Vec<ScoredKeyword>> {
        if vector.len() != self.dimension() {
            return Err(WordVecError::DimensionMismatch { expected: self.dimension(), actual: vector.len() });
        }
        self.nearest(vector, self.clamp_num_results(num_results))
    }

    /// Elementwise sum of the vectors of `keywords`. Every keyword must exist.
    ///
    /// # Errors
    /// `EmptyQuery` for an empty list, `NotFound` for any unknown keyword.
    pub fn word_vector(&self, keywords: &[String]) -> Result<Vec<f32>> {
        if keywords.is_empty() {
            return Err(WordVecError::EmptyQuery("no keywords given".to_string()));
        }
        let mut sum = vec![0.0; self.dimension()];
        for keyword in keywords {
            let id = self.store.get_id(keyword)?;
            add_assign(&mut sum, self.store.get_vector(id)?)?;
        }
        Ok(sum)
    }

    /// Exact cosine similarity between two stored keywords.
    ///
    /// # Errors
    /// `NotFound` for an unknown keyword, `DegenerateVector` if either
    /// vector is zero.
    pub fn similarity_score(&self, keyword1: &str, keyword2: &str) -> Result<f32> {
        let v1 = self.store.get_vector(self.store.get_id(keyword1)?)?;
        let v2 = self.store.get_vector(self.store.get_id(keyword2)?)?;
        cosine_similarity(v1, v2)
    }

    /// Scores `candidates` exactly against `query`, best first, ties by
    /// ascending id, truncated to `num_results`.
    ///
    /// # Errors
    /// `DegenerateVector` if the query or any candidate vector is zero,
    /// `NotFound` for an unknown candidate id.
    pub fn rank_candidates(
        &self,
        query: &[f32],
        candidates: &[ItemId],
        num_results: usize,
    ) -> Result<Vec<(ItemId, f32)>> {
        let mut scored = candidates
            .iter()
            .map(|&id| Ok((id, cosine_similarity(query, self.forest.get_item(id)?)?)))
            .collect::<Result<Vec<(ItemId, f32)>>>()?;
        scored.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(num_results);
        Ok(scored)
    }

    /// Sum of the vectors of the keywords that resolve; unknown ones are skipped.
    fn aggregate(&self, keywords: &[String]) -> Result<Vec<f32>> {
        let mut sum = vec![0.0; self.dimension()];
        let mut resolved = 0usize;
        for keyword in keywords {
            let id = match self.store.get_id(keyword) {
                Ok(id) => id,
                Err(WordVecError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            add_assign(&mut sum, self.store.get_vector(id)?)?;
            resolved += 1;
        }
        if resolved == 0 {
            return Err(WordVecError::EmptyQuery(format!("none of {keywords:?} is in the vocabulary")));
        }
        debug!(resolved, requested = keywords.len(), "aggregated query vector");
        Ok(sum)
    }

    fn nearest(&self, query: &[f32], num_results: usize) -> Result<Vec<ScoredKeyword>> {
        let candidates = self.forest.search_candidates(query, num_results, self.options.search_budget)?;
        let ranked = self.rank_candidates(query, &candidates, num_results)?;
        debug!(candidates = candidates.len(), returned = ranked.len(), "query answered");
        ranked
            .into_iter()
            .map(|(id, similarity)| Ok(ScoredKeyword::new(self.store.get_keyword(id)?, similarity)))
            .collect()
    }
}

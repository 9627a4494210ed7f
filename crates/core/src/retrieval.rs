//! Fact retrieval for symptom descriptions.
//!
//! Combines [`extract_keywords`] with a [`FactStore`] lookup. Non-blank input always yields
//! `min(k, store size)` facts: keyword matches first, then general facts in table order to fill
//! the remaining slots. When nothing matches, the first `k` facts of the store are used.

use crate::facts::FactStore;
use crate::keywords::extract_keywords;
use crate::models::MedicalFact;
use std::sync::Arc;

/// Retrieval failed for a reason internal to the knowledge base.
#[derive(Debug, thiserror::Error)]
#[error("Failed to retrieve medical facts: {0}")]
pub struct RetrievalError(String);

#[derive(Clone, Debug)]
pub struct Retriever {
    store: Arc<FactStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<FactStore>, top_k: usize) -> Self {
        tracing::info!("Retriever initialised with top_k={}", top_k);
        Self { store, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    /// Retrieves up to the configured number of facts for `symptoms`.
    pub fn retrieve(&self, symptoms: &str) -> Result<Vec<MedicalFact>, RetrievalError> {
        self.retrieve_top(symptoms, self.top_k)
    }

    /// Retrieves up to `k` facts for `symptoms`.
    ///
    /// # Returns
    /// An empty list for blank input. Otherwise the best keyword matches topped up with general
    /// facts, or only the first `k` facts of the store when no keyword can be extracted or none
    /// matches.
    ///
    /// # Errors
    /// Returns [`RetrievalError`] if `k` is zero.
    pub fn retrieve_top(&self, symptoms: &str, k: usize) -> Result<Vec<MedicalFact>, RetrievalError> {
        if k == 0 {
            return Err(RetrievalError(
                "retrieval fan-out must be at least 1".into(),
            ));
        }

        if symptoms.trim().is_empty() {
            tracing::warn!("Empty symptoms provided to retriever");
            return Ok(Vec::new());
        }

        let keywords = extract_keywords(symptoms);
        if keywords.is_empty() {
            tracing::warn!("No keywords extracted from symptoms, using general facts");
            return Ok(self.general_facts(k));
        }
        tracing::debug!("Extracted keywords: {:?}", keywords);

        let facts = self.store.get_by_keywords(&keywords, k);
        if facts.is_empty() {
            tracing::info!("No matching facts found, using general facts");
            return Ok(self.general_facts(k));
        }

        tracing::info!("Retrieved {} relevant medical facts", facts.len());
        Ok(self.fill_with_general_facts(facts, k))
    }

    fn fill_with_general_facts(&self, mut facts: Vec<MedicalFact>, k: usize) -> Vec<MedicalFact> {
        for fact in self.store.get_all() {
            if facts.len() >= k {
                break;
            }
            if !facts.iter().any(|f| f.id == fact.id) {
                facts.push(fact.clone());
            }
        }
        facts
    }

    fn general_facts(&self, k: usize) -> Vec<MedicalFact> {
        self.store.get_all().iter().take(k).cloned().collect()
    }
}

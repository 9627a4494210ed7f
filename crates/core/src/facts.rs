//! Medical fact store.
//!
//! A fixed, in-memory table of [`MedicalFact`] records answering keyword-overlap queries. The
//! built-in table is initialised once per process and never mutated afterwards, so it is shared
//! between threads without synchronisation.

use crate::models::MedicalFact;
use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTIN_FACTS: Lazy<Arc<FactStore>> = Lazy::new(|| Arc::new(FactStore::new(seed_facts())));

/// Read-only collection of medical facts.
#[derive(Clone, Debug, Default)]
pub struct FactStore {
    facts: Vec<MedicalFact>,
}

impl FactStore {
    /// Creates a store over the given facts, kept in the given order.
    pub fn new(facts: Vec<MedicalFact>) -> Self {
        Self { facts }
    }

    /// Returns the process-wide built-in knowledge base.
    pub fn builtin() -> Arc<FactStore> {
        Arc::clone(&BUILTIN_FACTS)
    }

    /// All facts in table order.
    pub fn get_all(&self) -> &[MedicalFact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns up to `limit` facts matching the given keywords, best match first.
    ///
    /// A user keyword matches a fact when it is a substring of one of the fact's keywords or
    /// contains one of them (case-insensitive). Each user keyword counts once per fact and the
    /// count is weighted by the fact's reliability score. Facts scoring zero are left out; ties
    /// keep table order.
    pub fn get_by_keywords<S: AsRef<str>>(&self, keywords: &[S], limit: usize) -> Vec<MedicalFact> {
        let user_keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();

        let mut scored: Vec<(f64, &MedicalFact)> = self
            .facts
            .iter()
            .filter_map(|fact| {
                let fact_keywords: Vec<String> =
                    fact.keywords.iter().map(|k| k.to_lowercase()).collect();

                let matches = user_keywords
                    .iter()
                    .filter(|user_kw| {
                        fact_keywords.iter().any(|fact_kw| {
                            fact_kw.contains(user_kw.as_str()) || user_kw.contains(fact_kw.as_str())
                        })
                    })
                    .count();

                (matches > 0).then(|| (matches as f64 * fact.reliability_score, fact))
            })
            .collect();

        // Vec::sort_by is stable, so equal scores keep table order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, fact)| fact.clone())
            .collect()
    }
}

fn seed(
    id: &str,
    fact: &str,
    category: &str,
    keywords: &[&str],
    source: &str,
    reliability_score: f64,
) -> MedicalFact {
    MedicalFact {
        id: id.to_owned(),
        fact: fact.to_owned(),
        category: category.to_owned(),
        keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        source: Some(source.to_owned()),
        reliability_score,
    }
}

fn seed_facts() -> Vec<MedicalFact> {
    vec![
        seed(
            "fever_001",
            "Fever is typically defined as a body temperature above 100.4°F (38°C). It's often a sign of infection or inflammation.",
            "Fever",
            &["fever", "temperature", "hot", "chills", "sweating"],
            "Mayo Clinic",
            0.95,
        ),
        seed(
            "infection_001",
            "Common symptoms of viral infections include fever, fatigue, body aches, and respiratory symptoms.",
            "Infection",
            &["infection", "viral", "bacterial", "flu", "cold"],
            "CDC",
            0.95,
        ),
        seed(
            "respiratory_001",
            "Shortness of breath, especially when accompanied by chest pain, can indicate serious conditions requiring immediate medical attention.",
            "Respiratory",
            &["shortness of breath", "difficulty breathing", "chest pain", "wheezing"],
            "American Lung Association",
            0.98,
        ),
        seed(
            "respiratory_002",
            "Persistent cough lasting more than 3 weeks should be evaluated by a healthcare provider.",
            "Respiratory",
            &["cough", "persistent", "chronic"],
            "American Thoracic Society",
            0.90,
        ),
        seed(
            "headache_001",
            "Migraines often present with throbbing pain, nausea, sensitivity to light and sound, and can last 4-72 hours.",
            "Neurological",
            &["migraine", "headache", "throbbing", "nausea", "light sensitivity"],
            "American Migraine Foundation",
            0.92,
        ),
        seed(
            "headache_002",
            "Sudden severe headache (thunderclap headache) requires immediate medical evaluation as it may indicate serious conditions.",
            "Neurological",
            &["sudden headache", "severe headache", "thunderclap"],
            "Mayo Clinic",
            0.98,
        ),
        seed(
            "digestive_001",
            "Gastroenteritis (stomach flu) typically causes nausea, vomiting, diarrhea, and abdominal cramps, usually resolving within 1-3 days.",
            "Digestive",
            &["nausea", "vomiting", "diarrhea", "stomach", "abdominal", "cramps"],
            "CDC",
            0.93,
        ),
        seed(
            "digestive_002",
            "Severe abdominal pain, especially with fever or bloody stools, requires prompt medical evaluation.",
            "Digestive",
            &["severe abdominal pain", "bloody stool", "fever"],
            "American Gastroenterological Association",
            0.95,
        ),
        seed(
            "cardiac_001",
            "Chest pain, especially when radiating to the arm, jaw, or back, along with shortness of breath, may indicate a heart condition requiring immediate attention.",
            "Cardiovascular",
            &["chest pain", "heart", "cardiac", "arm pain", "jaw pain"],
            "American Heart Association",
            0.99,
        ),
        seed(
            "fatigue_001",
            "Chronic fatigue can be caused by various factors including sleep disorders, anemia, thyroid issues, or mental health conditions.",
            "General",
            &["fatigue", "tiredness", "exhaustion", "weakness"],
            "Mayo Clinic",
            0.88,
        ),
        seed(
            "skin_001",
            "Rash with fever, especially in children, should be evaluated by a healthcare provider to rule out serious conditions.",
            "Dermatological",
            &["rash", "skin", "redness", "itching"],
            "American Academy of Dermatology",
            0.90,
        ),
        seed(
            "pain_001",
            "Acute pain that is severe, sudden, or accompanied by other symptoms like fever or loss of function should be evaluated promptly.",
            "General",
            &["severe pain", "acute pain", "sudden pain"],
            "American Pain Society",
            0.87,
        ),
        seed(
            "mental_001",
            "Persistent feelings of sadness, anxiety, or changes in sleep and appetite patterns may indicate mental health concerns that benefit from professional support.",
            "Mental Health",
            &["sadness", "anxiety", "depression", "mood"],
            "National Institute of Mental Health",
            0.90,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fact(id: &str, keywords: &[&str], reliability_score: f64) -> MedicalFact {
        MedicalFact {
            id: id.into(),
            fact: format!("fact {id}"),
            category: "Test".into(),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            source: None,
            reliability_score,
        }
    }

    fn ids(facts: &[MedicalFact]) -> Vec<&str> {
        facts.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_builtin_table_ids_are_unique() {
        let store = FactStore::builtin();
        let mut seen = std::collections::HashSet::new();
        for fact in store.get_all() {
            assert!(seen.insert(fact.id.clone()), "duplicate id {}", fact.id);
            assert!(fact.reliability_score > 0.0 && fact.reliability_score <= 1.0);
        }
        assert_eq!(store.len(), 13);
    }

    #[test]
    fn test_higher_weighted_fact_ranks_first() {
        let store = FactStore::new(vec![
            fact("fever", &["fever", "chills"], 0.95),
            fact("cough", &["cough", "sore throat"], 1.0),
        ]);
        let found = store.get_by_keywords(&["fever", "cough"], 5);
        assert_eq!(ids(&found), vec!["cough", "fever"]);
    }

    #[test]
    fn test_match_count_outweighs_reliability() {
        let store = FactStore::new(vec![
            fact("single", &["fever"], 1.0),
            fact("double", &["fever", "chills"], 0.6),
        ]);
        let found = store.get_by_keywords(&["fever", "chills"], 5);
        assert_eq!(ids(&found), vec!["double", "single"]);
    }

    #[test]
    fn test_substring_match_is_bidirectional_and_case_insensitive() {
        let store = FactStore::new(vec![
            fact("phrase", &["Chest Pain"], 1.0),
            fact("short", &["rash"], 1.0),
        ]);
        // user keyword inside fact keyword
        assert_eq!(ids(&store.get_by_keywords(&["chest"], 5)), vec!["phrase"]);
        // fact keyword inside user keyword
        assert_eq!(ids(&store.get_by_keywords(&["RASHES"], 5)), vec!["short"]);
    }

    #[test]
    fn test_each_user_keyword_counts_once_per_fact() {
        let store = FactStore::new(vec![
            fact("many", &["pain", "painful", "pains"], 1.0),
            fact("two", &["pain", "ache"], 0.9),
        ]);
        // "pain" hits three keywords of "many" but only scores 1.0 there; "two" scores 1.8.
        let found = store.get_by_keywords(&["pain", "ache"], 5);
        assert_eq!(ids(&found), vec!["two", "many"]);
    }

    #[test]
    fn test_zero_score_facts_are_excluded() {
        let store = FactStore::new(vec![
            fact("a", &["fever"], 1.0),
            fact("b", &["rash"], 1.0),
        ]);
        assert_eq!(ids(&store.get_by_keywords(&["fever"], 5)), vec!["a"]);
        assert!(store.get_by_keywords(&["elbow"], 5).is_empty());
        assert!(store.get_by_keywords::<&str>(&[], 5).is_empty());
    }

    #[test]
    fn test_ties_keep_table_order_and_limit_applies() {
        let store = FactStore::new(vec![
            fact("first", &["cough"], 0.9),
            fact("second", &["cough"], 0.9),
            fact("third", &["cough"], 0.9),
        ]);
        assert_eq!(
            ids(&store.get_by_keywords(&["cough"], 2)),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_builtin_chest_pain_lookup_prefers_cardiac() {
        let store = FactStore::builtin();
        let found = store.get_by_keywords(&["chest pain"], 2);
        assert_eq!(ids(&found), vec!["cardiac_001", "respiratory_001"]);
    }
}

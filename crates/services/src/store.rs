use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use labs_core::model::Lab;
use labs_core::parser;
use storage::ContentSource;

/// In-memory collection of parsed labs plus a raw-document cache.
///
/// Labs keep catalog order. Queries are read-only views; only the progress
/// tracker and the navigation machine mutate labs, and never concurrently.
pub struct LabStore {
    labs: Vec<Lab>,
    cache: HashMap<String, String>,
    source: Arc<dyn ContentSource>,
}

impl LabStore {
    #[must_use]
    pub fn new(labs: Vec<Lab>, source: Arc<dyn ContentSource>) -> Self {
        Self {
            labs,
            cache: HashMap::new(),
            source,
        }
    }

    #[must_use]
    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    #[must_use]
    pub fn labs_mut(&mut self) -> &mut [Lab] {
        &mut self.labs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labs.is_empty()
    }

    #[must_use]
    pub fn find(&self, lab_id: &str) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.id() == lab_id)
    }

    pub(crate) fn find_mut(&mut self, lab_id: &str) -> Option<&mut Lab> {
        self.labs.iter_mut().find(|lab| lab.id() == lab_id)
    }

    /// Cached raw document text for a lab, if its detail document loaded.
    #[must_use]
    pub fn content(&self, lab_id: &str) -> Option<&str> {
        self.cache.get(lab_id).map(String::as_str)
    }

    /// Look up a lab, fetching and applying its detail document on first
    /// access.
    ///
    /// Returns `None` for ids not present in the catalog. A failed fetch is
    /// logged and leaves the lab with catalog-level metadata only; the lab
    /// is still returned.
    pub async fn get(&mut self, lab_id: &str) -> Option<&Lab> {
        let index = self.labs.iter().position(|lab| lab.id() == lab_id)?;

        if !self.cache.contains_key(lab_id) {
            match self.source.fetch_lab_document(lab_id).await {
                Ok(text) => self.apply_document(index, text),
                Err(err) => warn!(lab_id, %err, "failed to fetch lab document"),
            }
        }

        Some(&self.labs[index])
    }

    /// Parse a fetched document and fold it into the lab at `index`.
    pub(crate) fn apply_document(&mut self, index: usize, text: String) {
        let lab = &mut self.labs[index];
        let document = parser::parse_lab_document(&text, lab.id());
        if let Some(details) = document.details {
            lab.set_details(details.level, details.persona, details.duration, details.purpose);
        }
        lab.set_use_cases(document.use_cases);
        lab.set_images(document.images);
        lab.set_content(text.clone());
        self.cache.insert(lab.id().to_owned(), text);
    }

    /// Case-insensitive substring search over title, description, persona
    /// and id.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Lab> {
        let query = query.to_lowercase();
        self.labs
            .iter()
            .filter(|lab| {
                lab.title().to_lowercase().contains(&query)
                    || lab.description().to_lowercase().contains(&query)
                    || lab.persona().to_lowercase().contains(&query)
                    || lab.id().to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Labs whose persona contains the given persona, case-insensitively.
    #[must_use]
    pub fn by_persona(&self, persona: &str) -> Vec<&Lab> {
        let persona = persona.to_lowercase();
        self.labs
            .iter()
            .filter(|lab| lab.persona().to_lowercase().contains(&persona))
            .collect()
    }

    /// Labs whose level matches exactly.
    #[must_use]
    pub fn by_level(&self, level: &str) -> Vec<&Lab> {
        self.labs.iter().filter(|lab| lab.level() == level).collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryContentSource;

    fn lab(id: &str, title: &str, description: &str, level: &str, persona: &str) -> Lab {
        Lab::new(
            id,
            title,
            format!("./labs/{id}/"),
            description,
            level,
            "30 minutes",
            persona,
        )
        .unwrap()
    }

    fn store() -> LabStore {
        let labs = vec![
            lab("intro-lab", "Intro Lab", "start here", "100", "Maker"),
            lab("connector-lab", "Connector Lab", "plumbing", "300", "Developer"),
        ];
        LabStore::new(labs, Arc::new(InMemoryContentSource::new()))
    }

    #[test]
    fn search_matches_across_fields_without_mutation() {
        let store = store();
        assert_eq!(store.search("INTRO").len(), 1);
        assert_eq!(store.search("plumbing").len(), 1);
        assert_eq!(store.search("developer").len(), 1);
        assert_eq!(store.search("connector-lab").len(), 1);
        assert_eq!(store.search("nothing").len(), 0);
        // The view is a filter, not a mutation.
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn filters_by_persona_and_level() {
        let store = store();
        assert_eq!(store.by_persona("maker").len(), 1);
        assert_eq!(store.by_level("300").len(), 1);
        assert_eq!(store.by_level("3").len(), 0, "level is an exact match");
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_ids() {
        let mut store = store();
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn get_fetches_and_applies_the_detail_document() {
        let source = InMemoryContentSource::new();
        source.insert_document(
            "intro-lab",
            "## 🚀 Use Case #1: Setup\n1. Click **New**.\n2. Save.",
        );
        let labs = vec![lab("intro-lab", "Intro Lab", "start here", "100", "Maker")];
        let mut store = LabStore::new(labs, Arc::new(source));

        let found = store.get("intro-lab").await.unwrap();
        assert_eq!(found.use_cases().len(), 1);
        assert_eq!(found.total_steps(), 2);
        assert!(store.content("intro-lab").is_some());
    }

    #[tokio::test]
    async fn get_tolerates_a_missing_detail_document() {
        let mut store = store();
        let found = store.get("intro-lab").await.unwrap();
        assert!(found.use_cases().is_empty());
        assert_eq!(found.level(), "100", "catalog metadata survives");
        assert!(store.content("intro-lab").is_none());
    }
}

use std::sync::Arc;

use tracing::{error, info};

use labs_core::model::Lab;
use labs_core::parser;
use storage::ContentSource;

use crate::store::LabStore;

/// Loads the catalog and every lab's detail document into a `LabStore`.
pub struct LabLoader {
    source: Arc<dyn ContentSource>,
}

impl LabLoader {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Fetch and parse the catalog, then each lab's detail document.
    ///
    /// Detail fetches are awaited one at a time so store order matches
    /// catalog order. An individual lab's failure leaves that lab with
    /// catalog-level data only; a missing catalog falls back to the
    /// built-in lab list. This never fails and never returns an empty
    /// application state.
    pub async fn initialize(&self) -> LabStore {
        let catalog = match self.source.fetch_catalog().await {
            Ok(text) => text,
            Err(err) => {
                error!(%err, "catalog unavailable, falling back to built-in labs");
                return LabStore::new(fallback_labs(), Arc::clone(&self.source));
            }
        };

        let labs = parser::parse_catalog(&catalog);
        let mut store = LabStore::new(labs, Arc::clone(&self.source));

        let ids: Vec<String> = store.labs().iter().map(|lab| lab.id().to_owned()).collect();
        for id in ids {
            // `get` fetches, parses and caches; failures are logged there.
            let _ = store.get(&id).await;
        }

        info!(labs = store.len(), "catalog loaded");
        store
    }
}

/// Built-in labs used when the catalog itself cannot be loaded.
fn fallback_labs() -> Vec<Lab> {
    let starter = Lab::new(
        "getting-started",
        "Getting started with the lab studio",
        "./labs/getting-started/",
        "Tour the studio and run your first guided lab.",
        "100",
        "15 minutes",
        "Maker",
    );
    let builder = Lab::new(
        "agent-basics",
        "Build and publish your first agent",
        "./labs/agent-basics/",
        "Create an agent, ground it on your content, and publish it.",
        "200",
        "25 minutes",
        "Maker",
    );
    // The built-in definitions are static and known-valid.
    [starter, builder].into_iter().flatten().collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

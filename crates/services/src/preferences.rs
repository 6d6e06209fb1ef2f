use std::sync::Arc;

use tracing::warn;

use labs_core::model::Preferences;
use labs_core::Clock;
use storage::PreferencesRepository;

/// Round-trips user preferences through storage.
///
/// Like the other persistence consumers, a broken store degrades to an
/// in-memory session rather than an error.
pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
    clock: Clock,
    preferences: Preferences,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferencesRepository>, clock: Clock) -> Self {
        let preferences = match repo.load_preferences() {
            Ok(saved) => saved.unwrap_or_default(),
            Err(err) => {
                warn!(%err, "preferences unreadable, using defaults");
                Preferences::default()
            }
        };
        Self {
            repo,
            clock,
            preferences,
        }
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Switch between dark and light and persist the choice.
    pub fn toggle_theme(&mut self) {
        self.preferences.theme = self.preferences.theme.toggled();
        self.save();
    }

    /// Record the current time as the last visit and persist it.
    pub fn touch(&mut self) {
        self.preferences.last_visited = self.clock.now_millis();
        self.save();
    }

    fn save(&self) {
        if let Err(err) = self.repo.save_preferences(&self.preferences) {
            warn!(%err, "failed to persist preferences");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use labs_core::model::Theme;
    use labs_core::time::{fixed_clock, fixed_now};
    use storage::InMemoryStore;

    #[test]
    fn defaults_when_nothing_is_saved() {
        let service = PreferencesService::new(Arc::new(InMemoryStore::new()), fixed_clock());
        assert_eq!(service.preferences().theme, Theme::Dark);
        assert_eq!(service.preferences().last_visited, 0);
    }

    #[test]
    fn toggle_and_touch_persist() {
        let store = InMemoryStore::new();
        let mut service = PreferencesService::new(Arc::new(store.clone()), fixed_clock());
        service.toggle_theme();
        service.touch();

        let reloaded = PreferencesService::new(Arc::new(store), fixed_clock());
        assert_eq!(reloaded.preferences().theme, Theme::Light);
        assert_eq!(
            reloaded.preferences().last_visited,
            fixed_now().timestamp_millis()
        );
    }
}

use serde::{Deserialize, Serialize};

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Persisted user preferences.
///
/// `last_visited` is epoch milliseconds, serialized under the original
/// `lastVisited` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    #[serde(rename = "lastVisited")]
    pub last_visited: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let preferences = Preferences {
            theme: Theme::Light,
            last_visited: 1_700_000_000_000,
        };
        let raw = serde_json::to_string(&preferences).unwrap();
        assert!(raw.contains("\"theme\":\"light\""));
        assert!(raw.contains("\"lastVisited\":1700000000000"));
    }

    #[test]
    fn theme_toggles_both_ways() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}

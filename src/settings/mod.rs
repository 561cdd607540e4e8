use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DecodeReason;
use crate::games::GameEntry;
use crate::storage::{namespaced_key, KeyValueStore};
use crate::{Error, Result};

const ACCENT_COLOR_KEY: &str = "accent-color";
const LAST_TAB_KEY: &str = "last-tab";

/// Portable settings file: the game list plus UI preferences.
///
/// Every field is optional on import; a missing field leaves the matching
/// setting untouched. Fields that were present but had the wrong shape are
/// dropped during decoding and listed in `rejected`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<GameEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub rejected: Vec<DecodeReason>,
}

impl SettingsEnvelope {
    /// Decode an import file.
    ///
    /// Only text that isn't a JSON object at all is an error. Each known
    /// field is checked on its own: a badly shaped field is left out and its
    /// reason recorded, the others are kept. Unknown fields are ignored.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::Decode(DecodeReason::InvalidJson(e.to_string())))?;

        let Value::Object(root) = value else {
            return Err(Error::Decode(DecodeReason::NotAnObject));
        };

        let mut rejected = Vec::new();

        let games = match root.get("games") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => match decode_games(items) {
                Ok(games) => Some(games),
                Err(reason) => {
                    rejected.push(reason);
                    None
                }
            },
            Some(_) => {
                rejected.push(DecodeReason::GamesNotArray);
                None
            }
        };

        let accent_color = string_field(&root, "accentColor", &mut rejected);
        let active_tab = string_field(&root, "activeTab", &mut rejected);

        Ok(Self {
            games,
            accent_color,
            active_tab,
            exported_at: root
                .get("exportedAt")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
            rejected,
        })
    }

    /// Pretty-printed JSON with 2-space indentation, suitable for hand editing.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// Entries only need to be objects; missing or null text fields decode as "".
fn decode_games(items: &[Value]) -> std::result::Result<Vec<GameEntry>, DecodeReason> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<GameEntry>(item.clone())
                .map_err(|_| DecodeReason::MalformedEntry(index))
        })
        .collect()
}

fn string_field(
    root: &Map<String, Value>,
    field: &'static str,
    rejected: &mut Vec<DecodeReason>,
) -> Option<String> {
    match root.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            rejected.push(DecodeReason::FieldNotString(field));
            None
        }
    }
}

/// `#rrggbb` check used for accent colors.
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Receiver for the preference fields of an imported envelope.
pub trait PreferenceSink {
    fn accent_color_changed(&mut self, color: &str);
    fn active_tab_changed(&mut self, tab: &str);
}

/// Accent color and last active tab, stored next to the game list.
pub struct Preferences<S: KeyValueStore> {
    storage: S,
    accent_key: String,
    tab_key: String,
    default_accent: String,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(storage: S, key_prefix: &str, default_accent: &str) -> Self {
        Self {
            storage,
            accent_key: namespaced_key(key_prefix, ACCENT_COLOR_KEY),
            tab_key: namespaced_key(key_prefix, LAST_TAB_KEY),
            default_accent: default_accent.to_string(),
        }
    }

    pub fn accent_color(&self) -> String {
        self.read(&self.accent_key)
            .unwrap_or_else(|| self.default_accent.clone())
    }

    pub fn set_accent_color(&mut self, color: &str) -> Result<()> {
        let color = color.trim();
        if !is_hex_color(color) {
            return Err(Error::Validation(format!(
                "Invalid accent color: '{}'. Expected #rrggbb",
                color
            )));
        }

        self.storage.set(&self.accent_key, color)?;
        log::info!("Accent color set to {}", color);
        Ok(())
    }

    pub fn active_tab(&self) -> Option<String> {
        self.read(&self.tab_key)
    }

    pub fn set_active_tab(&mut self, tab: &str) -> Result<()> {
        let tab = tab.trim();
        if tab.is_empty() {
            return Err(Error::Validation("Tab identifier cannot be empty".to_string()));
        }

        self.storage.set(&self.tab_key, tab)?;
        Ok(())
    }

    /// Forget both preferences; the accent color reverts to the default.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.remove(&self.accent_key)?;
        self.storage.remove(&self.tab_key)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                log::warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }
}

impl<S: KeyValueStore> PreferenceSink for Preferences<S> {
    // Imported values are stored as given; a bad color in a hand-edited file
    // shouldn't abort the rest of the import.
    fn accent_color_changed(&mut self, color: &str) {
        if let Err(e) = self.storage.set(&self.accent_key, color) {
            log::warn!("Failed to save accent color: {}", e);
        }
    }

    fn active_tab_changed(&mut self, tab: &str) {
        if let Err(e) = self.storage.set(&self.tab_key, tab) {
            log::warn!("Failed to save active tab: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn decode_err(text: &str) -> DecodeReason {
        match SettingsEnvelope::from_json(text) {
            Err(Error::Decode(reason)) => reason,
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_full_envelope() {
        let envelope = SettingsEnvelope::from_json(
            r##"{
                "games": [{"name": "Chess", "url": "https://chess.example", "image": "c.png"},
                          {"name": "Go", "url": "https://go.example"}],
                "accentColor": "#336699",
                "activeTab": "settings",
                "somethingElse": 42
            }"##,
        )
        .unwrap();

        assert_eq!(
            envelope.games.unwrap(),
            vec![
                GameEntry::new("Chess", "https://chess.example", "c.png"),
                GameEntry::new("Go", "https://go.example", ""),
            ]
        );
        assert_eq!(envelope.accent_color.as_deref(), Some("#336699"));
        assert_eq!(envelope.active_tab.as_deref(), Some("settings"));
    }

    #[test]
    fn test_decode_partial_envelope() {
        let envelope = SettingsEnvelope::from_json(r#"{"activeTab": "loader"}"#).unwrap();
        assert_eq!(envelope.games, None);
        assert_eq!(envelope.accent_color, None);
        assert_eq!(envelope.active_tab.as_deref(), Some("loader"));
    }

    #[test]
    fn test_decode_rejects_non_object_documents() {
        assert!(matches!(decode_err("not json"), DecodeReason::InvalidJson(_)));
        assert_eq!(decode_err("[1, 2]"), DecodeReason::NotAnObject);
        assert_eq!(decode_err("\"just a string\""), DecodeReason::NotAnObject);
    }

    #[test]
    fn test_decode_drops_only_bad_fields() {
        let envelope =
            SettingsEnvelope::from_json(r##"{"games": "nope", "accentColor": "#000000"}"##)
                .unwrap();
        assert_eq!(envelope.games, None);
        assert_eq!(envelope.accent_color.as_deref(), Some("#000000"));
        assert_eq!(envelope.rejected, vec![DecodeReason::GamesNotArray]);

        let envelope = SettingsEnvelope::from_json(
            r#"{"games": [{"name": "a", "url": "b"}], "accentColor": 5, "activeTab": []}"#,
        )
        .unwrap();
        assert_eq!(envelope.games, Some(vec![GameEntry::new("a", "b", "")]));
        assert_eq!(envelope.accent_color, None);
        assert_eq!(
            envelope.rejected,
            vec![
                DecodeReason::FieldNotString("accentColor"),
                DecodeReason::FieldNotString("activeTab"),
            ]
        );
    }

    #[test]
    fn test_decode_passes_incomplete_entries_through() {
        let envelope = SettingsEnvelope::from_json(
            r#"{"games": [{"name": "NoUrl"}, {"name": "x", "url": "y", "image": null}]}"#,
        )
        .unwrap();

        assert!(envelope.rejected.is_empty());
        assert_eq!(
            envelope.games.unwrap(),
            vec![GameEntry::new("NoUrl", "", ""), GameEntry::new("x", "y", "")]
        );
    }

    #[test]
    fn test_decode_rejects_non_object_entries() {
        let envelope =
            SettingsEnvelope::from_json(r#"{"games": [{"name": "a", "url": "b"}, 7]}"#).unwrap();
        assert_eq!(envelope.games, None);
        assert_eq!(envelope.rejected, vec![DecodeReason::MalformedEntry(1)]);
    }

    #[test]
    fn test_export_is_pretty_camel_case() {
        let envelope = SettingsEnvelope {
            games: Some(vec![GameEntry::new("A", "https://a", "")]),
            accent_color: Some("#4caf50".to_string()),
            active_tab: None,
            exported_at: None,
            rejected: Vec::new(),
        };

        let json = envelope.to_json_pretty().unwrap();
        assert!(json.contains("\n  \"games\": ["));
        assert!(json.contains("\"accentColor\": \"#4caf50\""));
        assert!(!json.contains("activeTab"));

        let decoded = SettingsEnvelope::from_json(&json).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#4caf50"));
        assert!(is_hex_color("#ABCDEF"));
        assert!(!is_hex_color("4caf50"));
        assert!(!is_hex_color("#4caf5"));
        assert!(!is_hex_color("#4caf5g"));
    }

    #[test]
    fn test_preferences_default_and_reset() {
        let mut prefs = Preferences::new(MemoryStore::new(), "test", "#4caf50");
        assert_eq!(prefs.accent_color(), "#4caf50");
        assert_eq!(prefs.active_tab(), None);

        prefs.set_accent_color("#123456").unwrap();
        prefs.set_active_tab("loader").unwrap();
        assert_eq!(prefs.accent_color(), "#123456");
        assert_eq!(prefs.active_tab().as_deref(), Some("loader"));

        prefs.reset().unwrap();
        assert_eq!(prefs.accent_color(), "#4caf50");
        assert_eq!(prefs.active_tab(), None);
    }

    #[test]
    fn test_preferences_validation() {
        let mut prefs = Preferences::new(MemoryStore::new(), "test", "#4caf50");
        assert!(matches!(prefs.set_accent_color("red"), Err(Error::Validation(_))));
        assert!(matches!(prefs.set_active_tab("  "), Err(Error::Validation(_))));
        assert_eq!(prefs.accent_color(), "#4caf50");
    }
}

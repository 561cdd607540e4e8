use serde::{Deserialize, Deserializer, Serialize};

use crate::settings::{PreferenceSink, SettingsEnvelope};
use crate::storage::{namespaced_key, KeyValueStore};
use crate::{Error, Result};

/// Image shown for entries that don't carry one.
pub const PLACEHOLDER_IMAGE: &str = "assets/placeholder.png";

const GAMES_KEY: &str = "games";

const SEED_GAMES: [(&str, &str); 3] = [
    ("2048", "https://play2048.co/"),
    ("Tetris", "https://tetris.com/play-tetris"),
    ("Wordle", "https://www.nytimes.com/games/wordle/index.html"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl GameEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            image: image.into(),
        }
    }

    pub fn display_image(&self) -> &str {
        if self.image.trim().is_empty() {
            PLACEHOLDER_IMAGE
        } else {
            &self.image
        }
    }

    /// Open the entry's URL in the system browser.
    pub fn open(&self) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Validation(format!("'{}' has no URL", self.name)));
        }

        log::info!("Opening '{}' at {}", self.name, url);
        webbrowser::open(url).map_err(|e| Error::Browser(e.to_string()))
    }
}

/// Fresh copy of the default entries used when nothing is persisted.
pub fn seed_list() -> Vec<GameEntry> {
    SEED_GAMES
        .iter()
        .map(|(name, url)| GameEntry::new(*name, *url, ""))
        .collect()
}

/// Called with the full list after every mutation.
pub type ChangeListener = Box<dyn FnMut(&[GameEntry])>;

/// Owner of the game shortcut list.
///
/// Every mutation is written through to the backing [`KeyValueStore`]
/// immediately and then announced to the registered listeners. Storage
/// write failures are logged and otherwise ignored.
pub struct GameListStore<S: KeyValueStore> {
    storage: S,
    key: String,
    games: Vec<GameEntry>,
    listeners: Vec<ChangeListener>,
}

impl<S: KeyValueStore> GameListStore<S> {
    /// Open the store, restoring the persisted list or falling back to the seed.
    pub fn new(storage: S, key_prefix: &str) -> Self {
        let mut store = Self {
            storage,
            key: namespaced_key(key_prefix, GAMES_KEY),
            games: Vec::new(),
            listeners: Vec::new(),
        };
        store.games = store.load();
        store
    }

    /// Read the persisted list. Missing or undecodable data yields the seed list.
    pub fn load(&self) -> Vec<GameEntry> {
        let saved = match self.storage.get(&self.key) {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                log::debug!("No saved games under '{}', using defaults", self.key);
                return seed_list();
            }
            Err(e) => {
                log::warn!("Failed to read saved games: {}", e);
                return seed_list();
            }
        };

        match serde_json::from_str::<Vec<GameEntry>>(&saved) {
            Ok(games) => games,
            Err(e) => {
                log::warn!("Ignoring unreadable saved games: {}", e);
                seed_list()
            }
        }
    }

    pub fn games(&self) -> &[GameEntry] {
        &self.games
    }

    pub fn get(&self, index: usize) -> Option<&GameEntry> {
        self.games.get(index)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub fn add(&mut self, name: &str, url: &str, image: Option<&str>) -> Result<()> {
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() || url.is_empty() {
            return Err(Error::Validation(
                "Please enter both game name and URL".to_string(),
            ));
        }

        let image = image.map(str::trim).unwrap_or_default();
        self.games.push(GameEntry::new(name, url, image));
        log::info!("Added game '{}'", name);

        self.commit();
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;

        let removed = self.games.remove(index);
        log::info!("Removed game '{}'", removed.name);

        self.commit();
        Ok(())
    }

    /// Move the entry at `from` so that it ends up at position `to`.
    ///
    /// `to` is applied after the entry has been taken out of the list, so
    /// moving forward lands the entry exactly on `to` rather than before it.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to {
            return Ok(());
        }

        let entry = self.games.remove(from);
        self.games.insert(to, entry);
        log::debug!("Moved game from {} to {}", from, to);

        self.commit();
        Ok(())
    }

    /// Swap in `entries` as-is. No content validation happens here.
    pub fn replace_all(&mut self, entries: Vec<GameEntry>) {
        self.games = entries;
        self.commit();
    }

    pub fn to_envelope(&self, accent_color: &str, active_tab: Option<&str>) -> SettingsEnvelope {
        SettingsEnvelope {
            games: Some(self.games.clone()),
            accent_color: Some(accent_color.to_string()),
            active_tab: active_tab.map(str::to_string),
            exported_at: None,
            rejected: Vec::new(),
        }
    }

    /// Apply whichever fields of `envelope` are present.
    ///
    /// Fields dropped while decoding don't stop the others from being
    /// applied; the first of them is returned afterwards as a decode error.
    pub fn apply_envelope(
        &mut self,
        envelope: SettingsEnvelope,
        sink: &mut impl PreferenceSink,
    ) -> Result<()> {
        if let Some(color) = envelope.accent_color.as_deref() {
            sink.accent_color_changed(color);
        }

        if let Some(games) = envelope.games {
            log::info!("Importing {} game(s)", games.len());
            self.replace_all(games);
        }

        if let Some(tab) = envelope.active_tab.as_deref() {
            sink.active_tab_changed(tab);
        }

        for reason in &envelope.rejected {
            log::warn!("Ignored imported setting: {}", reason);
        }

        match envelope.rejected.into_iter().next() {
            Some(reason) => Err(Error::Decode(reason)),
            None => Ok(()),
        }
    }

    /// Restore the seed list and drop the persisted copy.
    pub fn reset_to_default(&mut self) {
        self.games = seed_list();

        if let Err(e) = self.storage.remove(&self.key) {
            log::warn!("Failed to clear saved games: {}", e);
        }

        self.notify();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.games.len() {
            return Err(Error::Index {
                index,
                len: self.games.len(),
            });
        }
        Ok(())
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.games)
            .map_err(Error::from)
            .and_then(|json| self.storage.set(&self.key, &json));

        if let Err(e) = result {
            log::warn!("Failed to save games: {}", e);
        }
    }

    fn notify(&mut self) {
        for listener in self.listeners.iter_mut() {
            listener(&self.games);
        }
    }
}

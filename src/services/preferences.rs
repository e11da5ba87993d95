use serde::{Deserialize, Serialize};

use crate::storage::{Persisted, Storage};

pub const PREFERENCES_STORAGE_KEY: &str = "app-storage";
pub const SEARCH_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppPreferences {
    pub search_history: Vec<String>,
    pub theme: Theme,
}

impl AppPreferences {
    /// Новый запрос встаёт в начало истории; пустые и повторные игнорируются,
    /// история ограничена [`SEARCH_HISTORY_LIMIT`] записями.
    pub fn add_search(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.search_history.iter().any(|q| q == query) {
            return false;
        }
        self.search_history.insert(0, query.to_string());
        self.search_history.truncate(SEARCH_HISTORY_LIMIT);
        true
    }

    pub fn remove_search(&mut self, query: &str) -> bool {
        let before = self.search_history.len();
        self.search_history.retain(|q| q != query);
        self.search_history.len() != before
    }
}

#[derive(Clone)]
pub struct PreferencesStore {
    inner: Persisted<AppPreferences>,
}

impl PreferencesStore {
    pub async fn load(storage: Storage) -> Self {
        Self {
            inner: Persisted::load(storage, PREFERENCES_STORAGE_KEY).await,
        }
    }

    pub async fn get(&self) -> AppPreferences {
        self.inner.get().await
    }

    pub async fn theme(&self) -> Theme {
        self.inner.read(|p| p.theme).await
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.inner.update(|p| p.theme = theme).await;
    }

    pub async fn search_history(&self) -> Vec<String> {
        self.inner.read(|p| p.search_history.clone()).await
    }

    pub async fn add_to_search_history(&self, query: &str) -> bool {
        self.inner.update(|p| p.add_search(query)).await
    }

    pub async fn remove_from_search_history(&self, query: &str) -> bool {
        self.inner.update(|p| p.remove_search(query)).await
    }

    pub async fn clear_search_history(&self) {
        self.inner.update(|p| p.search_history.clear()).await;
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Movie;
use crate::storage::{Persisted, Storage};

pub const FAVORITES_STORAGE_KEY: &str = "favorite-storage";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Favorites {
    pub favorites: Vec<Movie>,
}

impl Favorites {
    pub fn contains(&self, movie_id: i64) -> bool {
        self.favorites.iter().any(|m| m.id == movie_id)
    }

    pub fn add(&mut self, movie: Movie) -> bool {
        if self.contains(movie.id) {
            return false;
        }
        self.favorites.push(movie);
        true
    }

    pub fn remove(&mut self, movie_id: i64) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|m| m.id != movie_id);
        self.favorites.len() != before
    }
}

/// Избранные фильмы, сохраняются между запусками.
#[derive(Clone)]
pub struct FavoritesStore {
    inner: Persisted<Favorites>,
}

impl FavoritesStore {
    pub async fn load(storage: Storage) -> Self {
        Self {
            inner: Persisted::load(storage, FAVORITES_STORAGE_KEY).await,
        }
    }

    pub async fn list(&self) -> Vec<Movie> {
        self.inner.read(|f| f.favorites.clone()).await
    }

    pub async fn is_favorite(&self, movie_id: i64) -> bool {
        self.inner.read(|f| f.contains(movie_id)).await
    }

    pub async fn add(&self, movie: Movie) -> bool {
        let movie_id = movie.id;
        let added = self.inner.update(|f| f.add(movie)).await;
        debug!("Favorites: add {} -> {}", movie_id, added);
        added
    }

    pub async fn remove(&self, movie_id: i64) -> bool {
        self.inner.update(|f| f.remove(movie_id)).await
    }

    /// Возвращает `true`, если фильм теперь в избранном.
    pub async fn toggle(&self, movie: Movie) -> bool {
        self.inner
            .update(|f| {
                if f.contains(movie.id) {
                    f.remove(movie.id);
                    false
                } else {
                    f.add(movie)
                }
            })
            .await
    }

    pub async fn clear(&self) {
        self.inner.update(|f| f.favorites.clear()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_is_deduplicated_by_id() {
        let store = FavoritesStore::load(Storage::in_memory()).await;
        assert!(store.add(movie(1)).await);
        assert!(!store.add(movie(1)).await);
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn toggle_and_remove() {
        let store = FavoritesStore::load(Storage::in_memory()).await;
        assert!(store.toggle(movie(5)).await);
        assert!(store.is_favorite(5).await);
        assert!(!store.toggle(movie(5)).await);
        assert!(!store.is_favorite(5).await);
        assert!(!store.remove(5).await);
    }

    #[tokio::test]
    async fn favorites_survive_reload() {
        let storage = Storage::in_memory();
        let store = FavoritesStore::load(storage.clone()).await;
        store.add(movie(1)).await;
        store.add(movie(2)).await;

        let reloaded = FavoritesStore::load(storage.clone()).await;
        let ids: Vec<i64> = reloaded.list().await.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);

        reloaded.clear().await;
        assert!(FavoritesStore::load(storage).await.list().await.is_empty());
    }
}

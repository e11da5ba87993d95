//! Доступ к каталогу фильмов: TMDb через кеш и повторы.
//!
//! Свежая запись из кеша отдаётся без запроса. Иначе идём в API с повторами;
//! если запрос всё равно упал, а в кеше есть устаревшая запись, отдаём её.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tracing::{debug, warn};

use crate::cache::{CachePolicy, Lookup, QueryCache};
use crate::config::RetryConfig;
use crate::helpers::{is_valid_search_query, primary_trailer, sanitize_search_query};
use crate::models::{Genre, ImageResponse, Movie, MovieDetail, Page, VideoResponse};
use crate::query_keys::{self, QueryKey};
use crate::services::retry::RetryPolicy;
use crate::tmdb_client::{ApiError, TmdbClient};

#[derive(Clone)]
pub struct MovieService {
    client: TmdbClient,
    cache: QueryCache,
    retry: RetryPolicy,
    search_retry: RetryPolicy,
}

impl MovieService {
    pub fn new(client: TmdbClient, cache: QueryCache, retry: &RetryConfig) -> Self {
        Self {
            client,
            cache,
            retry: RetryPolicy::movies(retry),
            search_retry: RetryPolicy::search(retry),
        }
    }

    pub fn client(&self) -> &TmdbClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn cached<T, F, Fut>(
        &self,
        key: QueryKey,
        policy: CachePolicy,
        retry: RetryPolicy,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let stale = match self.cache.lookup::<T>(&key).await {
            Lookup::Fresh(value) => {
                debug!("Cache HIT {}", key);
                return Ok(value);
            }
            Lookup::Stale(value) => Some(value),
            Lookup::Miss => None,
        };

        debug!("Cache MISS {}", key);
        match retry.run(&key.to_string(), fetch).await {
            Ok(value) => {
                self.cache.store(&key, &value, policy).await;
                Ok(value)
            }
            Err(e) => match stale {
                Some(value) => {
                    warn!("Serving stale {} after error: {}", key, e);
                    Ok(value)
                }
                None => Err(e),
            },
        }
    }

    pub async fn upcoming_movies(&self, page: u32) -> Result<Page<Movie>, ApiError> {
        let page = page.max(1);
        self.cached(query_keys::movies::upcoming(page), CachePolicy::MOVIES, self.retry, || {
            self.client.get_upcoming_movies(page)
        })
        .await
    }

    pub async fn movie_details(&self, movie_id: i64) -> Result<MovieDetail, ApiError> {
        self.cached(query_keys::movies::detail(movie_id), CachePolicy::DETAILS, self.retry, || {
            self.client.get_movie_details(movie_id)
        })
        .await
    }

    pub async fn movie_videos(&self, movie_id: i64) -> Result<VideoResponse, ApiError> {
        self.cached(query_keys::movies::videos(movie_id), CachePolicy::DETAILS, self.retry, || {
            self.client.get_movie_videos(movie_id)
        })
        .await
    }

    pub async fn movie_images(&self, movie_id: i64) -> Result<ImageResponse, ApiError> {
        self.cached(query_keys::movies::images(movie_id), CachePolicy::DETAILS, self.retry, || {
            self.client.get_movie_images(movie_id)
        })
        .await
    }

    /// Запрос очищается; короче двух символов - пустая страница без обращения к API.
    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>, ApiError> {
        let query = sanitize_search_query(query);
        if !is_valid_search_query(&query) {
            return Ok(Page::empty());
        }
        let page = page.max(1);
        self.cached(
            query_keys::search::movies(&query, page),
            CachePolicy::SEARCH,
            self.search_retry,
            || self.client.search_movies(&query, page),
        )
        .await
    }

    pub async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let response = self
            .cached(query_keys::genres::movies(), CachePolicy::DETAILS, self.retry, || {
                self.client.get_genres()
            })
            .await?;
        Ok(response.genres)
    }

    /// Ключ трейлера на YouTube; ошибки превращаются в `None`.
    pub async fn movie_trailer(&self, movie_id: i64) -> Option<String> {
        match self.movie_videos(movie_id).await {
            Ok(videos) => primary_trailer(&videos.results).map(str::to_string),
            Err(e) => {
                warn!("Error getting trailer for movie ID {}: {}", movie_id, e);
                None
            }
        }
    }

    pub async fn refresh_movies(&self) -> usize {
        self.cache.invalidate_prefix(&query_keys::movies::all()).await
    }
}

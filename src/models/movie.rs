//! Типы ответов TMDb API.
//!
//! Все структуры терпимы к отсутствующим полям: `/search/multi` возвращает
//! вперемешку фильмы, сериалы и людей, и у части записей нет `title`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub genre_ids: Vec<i64>,
    pub adult: bool,
    pub original_language: String,
    pub original_title: String,
    pub popularity: f64,
    pub video: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionCompany {
    pub id: i64,
    pub logo_path: Option<String>,
    pub name: String,
    pub origin_country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub english_name: String,
    pub iso_639_1: String,
    pub name: String,
}

/// Detailed movie record from `/movie/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<ProductionCompany>,
    pub spoken_languages: Vec<Language>,
    pub status: String,
    pub tagline: String,
    pub budget: u64,
    pub revenue: u64,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
}

impl MovieDetail {
    /// "2h 5m"; `None` when runtime is unknown or zero.
    pub fn formatted_runtime(&self) -> Option<String> {
        match self.runtime {
            Some(minutes) if minutes > 0 => Some(format!("{}h {}m", minutes / 60, minutes % 60)),
            _ => None,
        }
    }

    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(|g| g.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub id: String,
    pub iso_639_1: String,
    pub iso_3166_1: String,
    pub key: String,
    pub name: String,
    pub site: String,
    pub size: u32,
    #[serde(rename = "type")]
    pub video_type: String,
    pub official: bool,
    pub published_at: String,
}

impl Video {
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.video_type == "Trailer"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoResponse {
    pub id: i64,
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieImage {
    pub aspect_ratio: f64,
    pub height: u32,
    pub iso_639_1: Option<String>,
    pub file_path: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub width: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageResponse {
    pub id: i64,
    pub backdrops: Vec<MovieImage>,
    pub logos: Vec<MovieImage>,
    pub posters: Vec<MovieImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreResponse {
    pub genres: Vec<Genre>,
}

/// Конверт списочных эндпоинтов: `page`, `results`, `total_pages`, `total_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Номер следующей страницы для бесконечной прокрутки.
    pub fn next_page(&self) -> Option<u32> {
        if self.page > 0 && self.total_pages > 0 && self.page < self.total_pages {
            Some(self.page + 1)
        } else {
            None
        }
    }
}

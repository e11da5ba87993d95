use crate::models::Video;

pub fn is_valid_movie_id(raw: &str) -> bool {
    raw.trim().parse::<i64>().map(|id| id > 0).unwrap_or(false)
}

/// Оставляет латинские буквы, цифры, `_`, пробелы и `-`.
pub fn sanitize_search_query(query: &str) -> String {
    query
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '-')
        .collect()
}

pub fn is_valid_search_query(query: &str) -> bool {
    query.trim().chars().count() >= 2
}

/// Официальный YouTube-трейлер, иначе любой YouTube-трейлер.
pub fn primary_trailer(videos: &[Video]) -> Option<&str> {
    videos
        .iter()
        .find(|v| v.is_youtube_trailer() && v.official)
        .or_else(|| videos.iter().find(|v| v.is_youtube_trailer()))
        .map(|v| v.key.as_str())
}

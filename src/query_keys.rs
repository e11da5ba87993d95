//! Ключи кеша запросов: иерархические, чтобы инвалидировать целые ветки
//! (например, всё под `movies`).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        QueryKey(parts.into_iter().map(|p| p.to_string()).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn child(&self, part: impl ToString) -> Self {
        let mut parts = self.0.clone();
        parts.push(part.to_string());
        QueryKey(parts)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(":"))
    }
}

pub mod movies {
    use super::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::new(["movies"])
    }

    pub fn upcoming(page: u32) -> QueryKey {
        all().child("upcoming").child(page)
    }

    pub fn detail(id: i64) -> QueryKey {
        all().child("detail").child(id)
    }

    pub fn videos(id: i64) -> QueryKey {
        all().child("videos").child(id)
    }

    pub fn images(id: i64) -> QueryKey {
        all().child("images").child(id)
    }
}

pub mod search {
    use super::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::new(["search"])
    }

    pub fn movies(query: &str, page: u32) -> QueryKey {
        all().child("movies").child(query).child(page)
    }
}

pub mod genres {
    use super::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::new(["genres"])
    }

    pub fn movies() -> QueryKey {
        all().child("movies")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_nest_under_their_root() {
        assert_eq!(movies::upcoming(2).to_string(), "movies:upcoming:2");
        assert!(movies::detail(7).starts_with(&movies::all()));
        assert!(!search::movies("dune", 1).starts_with(&movies::all()));
        assert_eq!(genres::movies().parts(), ["genres", "movies"]);
    }

    #[test]
    fn prefix_matches_whole_segments_only() {
        let key = QueryKey::new(["movies_extra", "1"]);
        assert!(!key.starts_with(&movies::all()));
    }
}

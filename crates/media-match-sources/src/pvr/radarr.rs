use async_trait::async_trait;
use media_match_config::{PvrInstanceConfig, RewriteRule};
use media_match_models::{ExternalIds, LibraryType, PvrRecord};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{build_client, get_json, join_url};
use crate::{Pvr, SourceError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieItem {
    title: String,
    path: String,
    imdb_id: Option<String>,
    tmdb_id: Option<u64>,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    status: String,
}

impl From<MovieItem> for PvrRecord {
    fn from(movie: MovieItem) -> Self {
        PvrRecord {
            title: movie.title,
            path: movie.path,
            external_ids: ExternalIds {
                imdb_id: movie.imdb_id,
                tmdb_id: movie.tmdb_id,
                tvdb_id: None,
            },
            has_file: movie.has_file,
            status: movie.status,
        }
    }
}

pub struct RadarrClient {
    name: String,
    url: String,
    rewrite: RewriteRule,
    client: Client,
}

impl RadarrClient {
    pub fn new(config: &PvrInstanceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            rewrite: config.rewrite.clone(),
            client: build_client(&config.api_key)?,
        })
    }
}

#[async_trait]
impl Pvr for RadarrClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn library_type(&self) -> LibraryType {
        LibraryType::Movie
    }

    fn rewrite_rule(&self) -> &RewriteRule {
        &self.rewrite
    }

    async fn list_items(&self) -> Result<Vec<PvrRecord>, SourceError> {
        let url = join_url(&self.url, "api/v3/movie");
        let context = format!("failed retrieving radarr library {:?}", self.name);
        let movies: Vec<MovieItem> = get_json(&self.client, &url, &context).await?;

        debug!(pvr = %self.name, count = movies.len(), "Retrieved radarr movies");
        Ok(movies.into_iter().map(PvrRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_into_record() {
        let json = r#"[
            {"title": "Movie", "path": "/movies/Movie (2000)", "imdbId": "tt0000001",
             "tmdbId": 603, "hasFile": true, "status": "released", "monitored": true},
            {"title": "Missing", "path": "/movies/Missing (2010)", "tmdbId": 0, "hasFile": false}
        ]"#;
        let movies: Vec<MovieItem> = serde_json::from_str(json).unwrap();
        let records: Vec<PvrRecord> = movies.into_iter().map(PvrRecord::from).collect();

        assert_eq!(records[0].external_ids.imdb_id.as_deref(), Some("tt0000001"));
        assert_eq!(records[0].external_ids.tmdb_id, Some(603));
        assert!(records[0].is_present());

        assert_eq!(records[1].external_ids.imdb_id, None);
        assert_eq!(records[1].status, "");
        assert!(!records[1].is_present());
    }
}

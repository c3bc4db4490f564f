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
struct SeriesItem {
    title: String,
    path: String,
    tvdb_id: Option<u64>,
    #[serde(default)]
    status: String,
    // v2 reported the size at the top level, v3 nests it in statistics
    #[serde(default)]
    size_on_disk: Option<u64>,
    #[serde(default)]
    statistics: Option<SeriesStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesStatistics {
    #[serde(default)]
    size_on_disk: u64,
}

impl SeriesItem {
    fn size_on_disk(&self) -> u64 {
        self.statistics
            .as_ref()
            .map(|s| s.size_on_disk)
            .or(self.size_on_disk)
            .unwrap_or(0)
    }

    fn into_record(self) -> PvrRecord {
        PvrRecord {
            has_file: self.size_on_disk() > 0,
            external_ids: ExternalIds {
                tvdb_id: self.tvdb_id,
                ..ExternalIds::default()
            },
            title: self.title,
            path: self.path,
            status: self.status,
        }
    }
}

pub struct SonarrClient {
    name: String,
    url: String,
    rewrite: RewriteRule,
    client: Client,
}

impl SonarrClient {
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
impl Pvr for SonarrClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn library_type(&self) -> LibraryType {
        LibraryType::Tv
    }

    fn rewrite_rule(&self) -> &RewriteRule {
        &self.rewrite
    }

    async fn list_items(&self) -> Result<Vec<PvrRecord>, SourceError> {
        let url = join_url(&self.url, "api/v3/series");
        let context = format!("failed retrieving sonarr library {:?}", self.name);
        let series: Vec<SeriesItem> = get_json(&self.client, &url, &context).await?;

        debug!(pvr = %self.name, count = series.len(), "Retrieved sonarr series");
        Ok(series.into_iter().map(SeriesItem::into_record).collect())
    }
}

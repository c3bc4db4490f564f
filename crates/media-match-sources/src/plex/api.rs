use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, trace};

use crate::{MediaServer, SourceError};

/// HTTP client for the Plex Media Server commands used to fix matches
pub struct PlexClient {
    client: Client,
    url: String,
}

impl PlexClient {
    pub fn new(url: &str, token: &str) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-plex-token"),
            HeaderValue::from_str(token)
                .map_err(|_| SourceError::Config("invalid plex token format".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static("x-plex-client-identifier"),
            HeaderValue::from_static("arrmatch"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Config(format!("failed to create plex http client: {}", e)))?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    fn metadata_endpoint(&self, metadata_id: i64, action: &str) -> String {
        self.endpoint(&format!("library/metadata/{}/{}", metadata_id, action))
    }

    /// Send a mutating request; transport failures are `Unavailable`, any
    /// non-success response is `Fatal`
    async fn send_command(
        &self,
        url: String,
        query: &[(&str, &str)],
        context: String,
    ) -> Result<(), SourceError> {
        trace!(url = %url, "Sending plex command");

        let response = self
            .client
            .request(Method::PUT, &url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(context.clone(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::Fatal {
                context,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MediaServer for PlexClient {
    async fn check_available(&self) -> Result<(), SourceError> {
        let context = "could not check plex availability";
        let response = self
            .client
            .get(self.endpoint("myplex/account"))
            .send()
            .await
            .map_err(|e| SourceError::unavailable(context, e))?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::unavailable(context, response.status()));
        }

        debug!(url = %self.url, "Plex is available");
        Ok(())
    }

    async fn split(&self, metadata_id: i64) -> Result<(), SourceError> {
        self.send_command(
            self.metadata_endpoint(metadata_id, "split"),
            &[],
            format!("could not split plex metadata_item {}", metadata_id),
        )
        .await
    }

    async fn match_item(&self, metadata_id: i64, title: &str, guid: &str) -> Result<(), SourceError> {
        self.send_command(
            self.metadata_endpoint(metadata_id, "match"),
            &[("guid", guid), ("name", title)],
            format!("could not match plex metadata_item {}", metadata_id),
        )
        .await
    }
}

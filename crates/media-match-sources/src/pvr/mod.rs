pub mod radarr;
pub mod sonarr;

pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::SourceError;

/// Client sending the `X-Api-Key` header every *arr API expects
fn build_client(api_key: &str) -> Result<Client, SourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_str(api_key)
            .map_err(|_| SourceError::Config("invalid pvr api key format".to_string()))?,
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| SourceError::Config(format!("failed to create pvr http client: {}", e)))
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str, context: &str) -> Result<T, SourceError> {
    trace!(url = %url, "Requesting pvr library");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::unavailable(context, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Fatal {
            context: context.to_string(),
            status: status.as_u16(),
        });
    }

    response.json::<T>().await.map_err(|source| SourceError::Decode {
        context: context.to_string(),
        source,
    })
}

//! ArcGIS FeatureServer layer client.
//!
//! Pages through `{layer}/query` as GeoJSON until the server stops reporting
//! `exceededTransferLimit`.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::geojson::{feature_collection_from_value, parse_feature_collection};
use crate::network::RawNetwork;
use crate::{LrsError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 2000;

/// A feature layer of an ArcGIS FeatureServer
pub struct ArcGisLayer {
    client: Client,
    layer_url: Url,
    page_size: usize,
}

impl ArcGisLayer {
    pub fn new(layer_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("milepost/0.1 (linear referencing)")
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            layer_url: Url::parse(layer_url)?,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Field names of the layer, in service order
    pub async fn fetch_fields(&self) -> Result<Vec<String>> {
        let url = query_url(
            &self.layer_url,
            &[
                ("where", "1=1"),
                ("outFields", "*"),
                ("f", "json"),
                ("resultRecordCount", "1"),
            ],
        )?;

        let body: Value = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body["fields"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Fetch every feature of the layer
    pub async fn fetch_network(&self) -> Result<RawNetwork> {
        info!("Fetching route features from {}", self.layer_url);

        let mut network = RawNetwork::default();
        let mut offset = 0usize;
        let page_size = self.page_size.to_string();

        loop {
            let offset_param = offset.to_string();
            let url = query_url(
                &self.layer_url,
                &[
                    ("where", "1=1"),
                    ("outFields", "*"),
                    ("f", "geojson"),
                    ("resultOffset", offset_param.as_str()),
                    ("resultRecordCount", page_size.as_str()),
                ],
            )?;

            debug!("Fetching page at offset {}", offset);
            let page: Value = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let count = page["features"].as_array().map_or(0, |f| f.len());
            if count == 0 {
                break;
            }

            let more = exceeded_transfer_limit(&page);
            network.extend(parse_feature_collection(feature_collection_from_value(page)?));
            offset += count;

            if !more {
                break;
            }
        }

        // Service field order is the authority for route column detection
        match self.fetch_fields().await {
            Ok(fields) if !fields.is_empty() => network.columns = fields,
            Ok(_) => {}
            Err(e) => warn!("Could not list layer fields: {}", e),
        }

        info!("Fetched {} route features", network.len());
        Ok(network)
    }
}

/// Build `{layer}/query?...` from a layer URL
pub fn query_url(layer_url: &Url, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = layer_url.clone();
    url.path_segments_mut()
        .map_err(|_| LrsError::Config(format!("'{}' is not a feature layer URL", layer_url)))?
        .pop_if_empty()
        .push("query");
    url.query_pairs_mut().clear().extend_pairs(params.iter());
    Ok(url)
}

/// Whether a query page says more features are available.
///
/// JSON responses carry the flag at the top level, GeoJSON ones under
/// `properties`.
pub fn exceeded_transfer_limit(page: &Value) -> bool {
    page["exceededTransferLimit"].as_bool().unwrap_or(false)
        || page["properties"]["exceededTransferLimit"]
            .as_bool()
            .unwrap_or(false)
}

use crate::domain::model::OsmNode;
use crate::domain::ports::{ConfigProvider, OsmDataSource};
use crate::utils::error::{PosError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_OSM_API_URL: &str = "https://www.openstreetmap.org/api/0.6";

#[derive(Debug, Deserialize)]
struct NodeResponse {
    #[serde(default)]
    elements: Vec<NodeElement>,
}

#[derive(Debug, Deserialize)]
struct NodeElement {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: Option<BTreeMap<String, serde_json::Value>>,
}

/// Fetches nodes from the OpenStreetMap API (`GET {api_url}/node/{id}.json`).
pub struct OsmApiClient {
    api_url: String,
    client: Client,
}

impl OsmApiClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            api_url: config.osm_api_url().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn node_url(&self, node_id: u64) -> String {
        format!("{}/node/{}.json", self.api_url, node_id)
    }

    async fn request_node(&self, node_id: u64) -> std::result::Result<NodeResponse, String> {
        let url = self.node_url(node_id);
        tracing::debug!("Making OSM API request to: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        tracing::debug!("OSM API response status: {}", response.status());

        let response = response
            .error_for_status()
            .map_err(|e| format!("unexpected status: {}", e))?;

        response
            .json::<NodeResponse>()
            .await
            .map_err(|e| format!("invalid response body: {}", e))
    }
}

#[async_trait]
impl OsmDataSource for OsmApiClient {
    async fn fetch_node(&self, node_id: u64) -> Result<OsmNode> {
        if node_id == 0 {
            tracing::error!("OSM node IDs start at 1, refusing to fetch node 0");
            return Err(PosError::OsmNodeNotFound { node_id });
        }

        tracing::info!("Fetching OSM node {} from OpenStreetMap API", node_id);

        let payload = self.request_node(node_id).await.map_err(|reason| {
            tracing::error!("Failed to fetch OSM node {}: {}", node_id, reason);
            PosError::OsmNodeNotFound { node_id }
        })?;

        let Some(element) = payload.elements.into_iter().next() else {
            tracing::error!("OSM node {} not found or response is empty", node_id);
            return Err(PosError::OsmNodeNotFound { node_id });
        };

        let tags: BTreeMap<String, String> = element
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(text) => (key, text),
                other => (key, other.to_string()),
            })
            .collect();

        tracing::info!(
            "Successfully fetched OSM node {} with {} tags",
            node_id,
            tags.len()
        );

        Ok(OsmNode {
            node_id,
            latitude: element.lat,
            longitude: element.lon,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlConfig;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> OsmApiClient {
        let mut config = TomlConfig::default();
        config.osm.api_url = server.url("/api/0.6");
        config.osm.timeout_seconds = 2;
        OsmApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_node_parses_coordinates_and_tags() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/5589879349.json");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({
                        "version": "0.6",
                        "elements": [{
                            "type": "node",
                            "id": 5589879349u64,
                            "lat": 49.4122362,
                            "lon": 8.7077883,
                            "tags": {
                                "amenity": "cafe",
                                "name": "Rada Coffee & Rösterei",
                                "level": 0
                            }
                        }]
                    }));
            })
            .await;

        let node = client_for(&server).fetch_node(5589879349).await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(node.node_id, 5589879349);
        assert_eq!(node.latitude, Some(49.4122362));
        assert_eq!(node.longitude, Some(8.7077883));
        assert_eq!(node.tag("name"), Some("Rada Coffee & Rösterei"));
        assert_eq!(node.tag("level"), Some("0"));
    }

    #[tokio::test]
    async fn test_missing_coordinates_and_tags_default_to_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/7.json");
                then.status(200)
                    .json_body(serde_json::json!({"elements": [{"type": "node", "id": 7}]}));
            })
            .await;

        let node = client_for(&server).fetch_node(7).await.unwrap();

        assert_eq!(node.latitude, None);
        assert_eq!(node.longitude, None);
        assert!(node.tags.is_empty());
    }

    #[tokio::test]
    async fn test_null_tags_decode_as_empty_mapping() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/8.json");
                then.status(200).json_body(serde_json::json!({
                    "elements": [{"type": "node", "id": 8, "lat": 1.0, "lon": 2.0, "tags": null}]
                }));
            })
            .await;

        let node = client_for(&server).fetch_node(8).await.unwrap();

        assert_eq!(node.node_id, 8);
        assert_eq!(node.latitude, Some(1.0));
        assert_eq!(node.longitude, Some(2.0));
        assert!(node.tags.is_empty());
    }

    #[tokio::test]
    async fn test_every_failure_becomes_node_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/1.json");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/2.json");
                then.status(500);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/3.json");
                then.status(200).json_body(serde_json::json!({"elements": []}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/0.6/node/4.json");
                then.status(200).body("<osm></osm>");
            })
            .await;

        let client = client_for(&server);
        for node_id in 1..=4 {
            match client.fetch_node(node_id).await {
                Err(PosError::OsmNodeNotFound { node_id: id }) => assert_eq!(id, node_id),
                other => panic!("node {}: expected OsmNodeNotFound, got {:?}", node_id, other),
            }
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_node_not_found() {
        let mut config = TomlConfig::default();
        config.osm.api_url = "http://127.0.0.1:9".to_string();
        config.osm.timeout_seconds = 1;
        let client = OsmApiClient::new(&config).unwrap();

        assert!(matches!(
            client.fetch_node(42).await,
            Err(PosError::OsmNodeNotFound { node_id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_node_zero_is_rejected_without_request() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200);
            })
            .await;

        let result = client_for(&server).fetch_node(0).await;

        assert!(matches!(result, Err(PosError::OsmNodeNotFound { node_id: 0 })));
        api_mock.assert_hits_async(0).await;
    }
}

//! HTTP transport for the hero collection
//!
//! Maps each operation onto the REST endpoint:
//!
//! | op | request |
//! |---|---|
//! | list | `GET {base}/{collection}` |
//! | get | `GET {base}/{collection}/{id}` |
//! | list_where | `GET {base}/{collection}?name={substring}` |
//! | create | `POST {base}/{collection}` |
//! | update | `PUT {base}/{collection}` |
//! | delete | `DELETE {base}/{collection}/{id}` |
//!
//! Mutating requests carry `Content-Type: application/json`.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use contracts::{Ack, HeroId, HeroRecord, HeroTransport, NewHero, TransportConfig, TransportError};

use crate::error::{from_reqwest, Result};

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 256;

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpHeroTransport {
    client: Client,
    collection_url: String,
}

impl HttpHeroTransport {
    /// Build a client from transport settings
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let collection_url = collection_url(&config.base_url, &config.collection);
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| from_reqwest("CLIENT", &collection_url, e))?;

        debug!(url = %collection_url, "HTTP transport ready");

        Ok(Self {
            client,
            collection_url,
        })
    }

    /// `{base}/{collection}`
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// `{base}/{collection}/{id}`
    pub fn item_url(&self, id: HeroId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    async fn send(&self, method: Method, url: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| from_reqwest(method.as_str(), url, e))?;

        let status = response.status();
        trace!(%method, url, status = status.as_u16(), "response received");
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        truncate_body(&mut body);
        Err(TransportError::status(
            method.as_str(),
            url,
            status.as_u16(),
            body,
        ))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(method.clone(), url, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| from_reqwest(method.as_str(), url, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::decode(method.as_str(), url, e.to_string()))
    }

    async fn fetch_ack(&self, method: Method, url: &str, request: RequestBuilder) -> Result<Ack> {
        let response = self.send(method.clone(), url, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| from_reqwest(method.as_str(), url, e))?;
        decode_ack(&bytes).map_err(|e| TransportError::decode(method.as_str(), url, e))
    }
}

impl HeroTransport for HttpHeroTransport {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(name = "http_transport_get", skip(self))]
    async fn get(&self, id: HeroId) -> Result<HeroRecord> {
        let url = self.item_url(id);
        let request = self.client.get(&url);
        self.fetch_json(Method::GET, &url, request).await
    }

    #[instrument(name = "http_transport_list", skip(self))]
    async fn list(&self) -> Result<Vec<HeroRecord>> {
        let url = self.collection_url.as_str();
        let request = self.client.get(url);
        self.fetch_json(Method::GET, url, request).await
    }

    #[instrument(name = "http_transport_list_where", skip(self))]
    async fn list_where(&self, name: &str) -> Result<Vec<HeroRecord>> {
        let url = self.collection_url.as_str();
        let request = self.client.get(url).query(&[("name", name)]);
        self.fetch_json(Method::GET, url, request).await
    }

    #[instrument(name = "http_transport_create", skip(self, hero), fields(name = %hero.name))]
    async fn create(&self, hero: &NewHero) -> Result<HeroRecord> {
        let url = self.collection_url.as_str();
        let request = self.client.post(url).json(hero);
        self.fetch_json(Method::POST, url, request).await
    }

    #[instrument(name = "http_transport_update", skip(self, hero), fields(id = hero.id))]
    async fn update(&self, hero: &HeroRecord) -> Result<Ack> {
        let url = self.collection_url.as_str();
        let request = self.client.put(url).json(hero);
        self.fetch_ack(Method::PUT, url, request).await
    }

    #[instrument(name = "http_transport_delete", skip(self))]
    async fn delete(&self, id: HeroId) -> Result<Ack> {
        let url = self.item_url(id);
        let request = self
            .client
            .delete(&url)
            .header(CONTENT_TYPE, "application/json");
        self.fetch_ack(Method::DELETE, &url, request).await
    }
}

fn collection_url(base_url: &str, collection: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        collection.trim_matches('/')
    )
}

fn decode_ack(bytes: &[u8]) -> std::result::Result<Ack, String> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Ack::empty());
    }
    serde_json::from_slice(bytes)
        .map(Ack::with_body)
        .map_err(|e| e.to_string())
}

fn truncate_body(body: &mut String) {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
}

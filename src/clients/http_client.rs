//! # HTTP Client
//!
//! [`OrderQuery`] over the backend's REST API using `reqwest`.

use crate::clients::{OrderQuery, QueryError, TrackTarget};
use crate::model::{Order, UserId, WireOrder};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the backend order API.
#[derive(Clone, Debug)]
pub struct HttpOrderQuery {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpOrderQuery {
    /// Builds a client rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// `timeout` bounds each request; `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, QueryError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| QueryError::Transport(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(QueryError::Transport(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, QueryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                QueryError::Transport(format!("base url cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, QueryError> {
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(QueryError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Request failed");
            return Err(QueryError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        debug!(%url, bytes = body.len(), "Response received");
        serde_json::from_slice(&body).map_err(|e| QueryError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl OrderQuery for HttpOrderQuery {
    #[instrument(skip(self, target), fields(endpoint = %target))]
    async fn fetch(&self, target: &TrackTarget) -> Result<Order, QueryError> {
        let url = self.endpoint(&target.segments())?;
        let wire: WireOrder = self.get_json(url).await?;
        Ok(Order::try_from(wire)?)
    }

    #[instrument(skip(self))]
    async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, QueryError> {
        let url = self.endpoint(&["orders", "user", user_id.0.as_str()])?;
        let wire: Vec<WireOrder> = self.get_json(url).await?;
        wire.into_iter()
            .map(|w| Order::try_from(w).map_err(QueryError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderId;

    #[test]
    fn test_endpoints_join_under_base_path() {
        let client = HttpOrderQuery::new("http://localhost:8080/api", None).unwrap();
        let target = TrackTarget::Order(OrderId::from("42"));
        assert_eq!(
            client.endpoint(&target.segments()).unwrap().as_str(),
            "http://localhost:8080/api/orders/42"
        );

        let client = HttpOrderQuery::new("http://localhost:8080/api/", None).unwrap();
        let target = TrackTarget::LatestActive(UserId::from("7"));
        assert_eq!(
            client.endpoint(&target.segments()).unwrap().as_str(),
            "http://localhost:8080/api/orders/user/7/latest-active"
        );
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let client = HttpOrderQuery::new("http://localhost:8080/api", None).unwrap();
        let target = TrackTarget::Order(OrderId::from("a/b"));
        assert_eq!(
            client.endpoint(&target.segments()).unwrap().as_str(),
            "http://localhost:8080/api/orders/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpOrderQuery::new("not a url", None),
            Err(QueryError::Transport(_))
        ));
        assert!(matches!(
            HttpOrderQuery::new("mailto:orders@example.com", None),
            Err(QueryError::Transport(_))
        ));
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{OrderDetail, OrderId, OrderRow, StatusId, StatusOption},
    error::ApiError,
    protocol::{ListOrdersQuery, Page, StatusListResponse, UpdateStatusRequest},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
pub mod token_store;

pub use error::ClientError;
pub use token_store::{FileTokenStore, StaticTokenStore, TokenStore, TOKEN_KEY};

const ORDERS_PATH: &str = "pedidosmontink/pedidos/";
const STATUSES_PATH: &str = "pedidosmontink/pedidos/status/";

/// Operations the orders view needs from the backend.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn list_statuses(&self) -> Result<Vec<StatusOption>, ClientError>;
    async fn list_orders(&self, query: &ListOrdersQuery) -> Result<Page<OrderRow>, ClientError>;
    async fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail, ClientError>;
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status_id: StatusId,
    ) -> Result<OrderDetail, ClientError>;
}

pub struct OrdersClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl OrdersClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        Self::with_http_client(Client::new(), base_url, tokens)
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        match self.tokens.token().await? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => {
                warn!("no auth token stored; sending request without authorization");
                Ok(request)
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.authorized(request).await?.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let error = ApiError::from_response(status.as_u16(), &body);
            debug!(%endpoint, status = status.as_u16(), message = %error.message, "backend returned error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                error,
            });
        }
        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl OrdersApi for OrdersClient {
    async fn list_statuses(&self) -> Result<Vec<StatusOption>, ClientError> {
        let endpoint = self.endpoint(STATUSES_PATH)?;
        let body: StatusListResponse = self
            .send_json(&endpoint, self.http.get(endpoint.clone()))
            .await?;
        info!(count = body.results.len(), "fetched order statuses");
        Ok(body.results)
    }

    async fn list_orders(&self, query: &ListOrdersQuery) -> Result<Page<OrderRow>, ClientError> {
        let endpoint = self.endpoint(ORDERS_PATH)?;
        let query = query.clone().normalized();
        let page: Page<OrderRow> = self
            .send_json(&endpoint, self.http.get(endpoint.clone()).query(&query))
            .await?;
        info!(
            page = query.page,
            page_size = query.page_size,
            rows = page.results.len(),
            total_pages = page.total_pages,
            "fetched orders page"
        );
        Ok(page)
    }

    async fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail, ClientError> {
        let endpoint = self.endpoint(&format!("{ORDERS_PATH}{order_id}/"))?;
        self.send_json(&endpoint, self.http.get(endpoint.clone()))
            .await
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status_id: StatusId,
    ) -> Result<OrderDetail, ClientError> {
        let endpoint = self.endpoint(&format!("{ORDERS_PATH}{order_id}/status/"))?;
        let detail: OrderDetail = self
            .send_json(
                &endpoint,
                self.http
                    .patch(endpoint.clone())
                    .json(&UpdateStatusRequest { status_id }),
            )
            .await?;
        info!(order_id = order_id.0, status_id = status_id.0, "updated order status");
        Ok(detail)
    }
}

/// Parses the API root and makes sure relative endpoint joins land beneath it.
pub fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: trimmed.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

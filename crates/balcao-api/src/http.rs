//! # HTTP Backend
//!
//! [`Backend`] over JSON/REST with `reqwest`.
//!
//! ## Endpoints
//! ```text
//! GET   api/catalog/?q=<text>                     lookup_catalog
//! GET   api/payment-methods/[?active=true]        payment_methods
//! GET   api/payment-methods/{id}/                 payment_method
//! POST  api/payment-methods/{id}/simulate/        simulate_fee
//! POST  api/{sales|purchase-orders|service-orders}/           create_order
//! POST  api/payments/                             create_payment_record
//! POST  api/{collection}/{id}/transition/         transition_order_status
//! GET   api/checklist-items/                      checklist_items
//! GET   api/warranty-terms/                       warranty_terms
//! ```
//!
//! ## Status Mapping
//! ```text
//! 401 → Unauthorized   403 → Forbidden   404 → NotFound
//! 400 → Validation     other non-2xx → Internal
//! ```

use async_trait::async_trait;
use balcao_core::{
    CatalogEntry, ChecklistItem, FeeBreakdown, Money, OrderKind, OrderRef, PaymentMethod,
    PaymentRecord, StatusAction, WarrantyTerm,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::wire::{
    order_collection, CreateOrderPayload, PaymentRecordPayload, SimulateFeeRequest,
    TransitionRequest,
};

/// Header carrying the draft id on order creation.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpBackend {
    /// Builds the client from a validated configuration.
    pub fn new(config: ApiConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(base_url = %config.base_url, "HTTP backend ready");
        Ok(Self { client, config })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get_with_query(path, &[]).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let url = self.config.url(path);
        debug!(%url, "GET");
        let request = self.authorize(self.client.get(&url).query(query));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<String>,
    ) -> ClientResult<T> {
        let url = self.config.url(path);
        debug!(%url, "POST");
        let mut request = self.authorize(self.client.post(&url).json(body));
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            warn!(%status, body = %text, "Backend returned an error");
            return Err(Self::error_for(status, text));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            // 204 and friends: let unit-like targets deserialize from `null`
            return serde_json::from_slice(b"null")
                .map_err(|_| ClientError::InvalidResponse("Empty response body".to_string()));
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    fn error_for(status: StatusCode, text: String) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Internal(format!("{}: {}", status, text)),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn lookup_catalog(&self, query: &str) -> ClientResult<Vec<CatalogEntry>> {
        self.get_with_query("api/catalog/", &[("q", query)]).await
    }

    async fn payment_methods(&self, active_only: bool) -> ClientResult<Vec<PaymentMethod>> {
        if active_only {
            self.get_with_query("api/payment-methods/", &[("active", "true")])
                .await
        } else {
            self.get("api/payment-methods/").await
        }
    }

    async fn payment_method(&self, id: i64) -> ClientResult<PaymentMethod> {
        self.get(&format!("api/payment-methods/{}/", id)).await
    }

    async fn simulate_fee(
        &self,
        method_id: i64,
        amount: Money,
        installments: u32,
    ) -> ClientResult<FeeBreakdown> {
        let body = SimulateFeeRequest {
            amount,
            installments,
        };
        self.post(
            &format!("api/payment-methods/{}/simulate/", method_id),
            &body,
            None,
        )
        .await
    }

    async fn create_order(&self, payload: &CreateOrderPayload) -> ClientResult<OrderRef> {
        let created: OrderRef = self
            .post(
                order_collection(payload.kind),
                payload,
                Some(payload.draft_id.to_string()),
            )
            .await?;
        info!(id = created.id, number = %created.number, "Order created");
        Ok(created)
    }

    async fn create_payment_record(
        &self,
        payload: &PaymentRecordPayload,
    ) -> ClientResult<PaymentRecord> {
        self.post("api/payments/", payload, None).await
    }

    async fn transition_order_status(
        &self,
        kind: OrderKind,
        order_id: i64,
        action: StatusAction,
    ) -> ClientResult<()> {
        let path = format!("{}{}/transition/", order_collection(kind), order_id);
        let _: serde_json::Value = self.post(&path, &TransitionRequest { action }, None).await?;
        Ok(())
    }

    async fn checklist_items(&self) -> ClientResult<Vec<ChecklistItem>> {
        self.get("api/checklist-items/").await
    }

    async fn warranty_terms(&self) -> ClientResult<Vec<WarrantyTerm>> {
        self.get("api/warranty-terms/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            HttpBackend::error_for(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            HttpBackend::error_for(StatusCode::NOT_FOUND, "gone".into()),
            ClientError::NotFound(ref s) if s == "gone"
        ));
        assert!(matches!(
            HttpBackend::error_for(StatusCode::BAD_REQUEST, "{}".into()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            HttpBackend::error_for(StatusCode::BAD_GATEWAY, String::new()),
            ClientError::Internal(_)
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(HttpBackend::new(config), Err(ClientError::Config(_))));
    }
}

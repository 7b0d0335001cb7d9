//! Backend REST endpoints

use serde_json::Value;

use comanda_core::StockVerdict;
use shared::client::{
    DeletePaymentRequest, PaymentHistory, PaymentHistoryRequest, StockCheckRequest,
    StockCheckResponse, TabLinesRequest, TabLinesResponse,
};

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;

/// Typed access to the backend's REST endpoints over any [`HttpClient`]
#[derive(Debug, Clone)]
pub struct ComandaApi<H> {
    http: H,
}

impl<H: HttpClient> ComandaApi<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// `verificar_quantidade`
    pub async fn check_stock(&self, item: &str, quantity: u32) -> ClientResult<StockCheckResponse> {
        let request = StockCheckRequest {
            item: item.to_string(),
            quantidade: quantity,
        };
        self.http.post("verificar_quantidade", &request).await
    }

    /// Stock check interpreted for the order being composed.
    ///
    /// An insufficient verdict is still `Ok`; callers decide whether to
    /// block with [`StockVerdict::into_result`].
    pub async fn verify_stock(
        &self,
        item: &str,
        quantity: u32,
        low_stock_threshold: f64,
    ) -> ClientResult<StockVerdict> {
        let response = self.check_stock(item, quantity).await?;
        let verdict = StockVerdict::from_response(&response, quantity, low_stock_threshold);
        tracing::debug!(item, quantity, ?verdict, "Stock checked");
        Ok(verdict)
    }

    /// `pegar_pedidos`: lines and amount due of one payment round
    pub async fn tab_lines(&self, tab_id: &str, round: u32) -> ClientResult<TabLinesResponse> {
        let request = TabLinesRequest {
            comanda: tab_id.to_string(),
            ordem: round,
        };
        self.http.post("pegar_pedidos", &request).await
    }

    /// `pegar_pagamentos_comanda`
    pub async fn payment_history(&self, tab_id: &str) -> ClientResult<PaymentHistory> {
        let request = PaymentHistoryRequest {
            comanda: tab_id.to_string(),
        };
        self.http.post("pegar_pagamentos_comanda", &request).await
    }

    /// `excluir_pagamento`
    pub async fn delete_payment(&self, tab_id: &str, payment_id: &str) -> ClientResult<()> {
        if payment_id.trim().is_empty() {
            return Err(ClientError::Validation("Payment id is required".into()));
        }
        let request = DeletePaymentRequest {
            comanda: tab_id.to_string(),
            pagamento_id: payment_id.to_string(),
        };
        let _: Value = self.http.post("excluir_pagamento", &request).await?;
        tracing::info!(tab = tab_id, payment = payment_id, "Payment deleted");
        Ok(())
    }
}

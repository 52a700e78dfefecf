//! Backend-to-console events and error modeling.

use client_core::ClientError;
use shared::{
    domain::{OrderDetail, OrderRow, StatusOption},
    error::ErrorCode,
    protocol::Page,
};

#[derive(Debug, Clone)]
pub enum UiEvent {
    StatusesLoaded(Vec<StatusOption>),
    StatusesFailed(UiError),
    OrdersLoaded {
        request_id: u64,
        page: Page<OrderRow>,
    },
    OrdersFailed {
        request_id: u64,
        error: UiError,
    },
    OrderDetailLoaded(OrderDetail),
    OrderStatusUpdated(OrderDetail),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadStatuses,
    LoadOrders,
    LoadOrderDetail,
    UpdateOrderStatus,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Api { error, .. } => match error.code {
                ErrorCode::Unauthorized | ErrorCode::Forbidden => UiErrorCategory::Auth,
                ErrorCode::Validation | ErrorCode::NotFound => UiErrorCategory::Validation,
                ErrorCode::RateLimited | ErrorCode::Internal => UiErrorCategory::Transport,
            },
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Decode { .. } | ClientError::InvalidBaseUrl { .. } => {
                UiErrorCategory::Validation
            }
            ClientError::TokenStoreIo { .. } | ClientError::TokenStoreFormat { .. } => {
                UiErrorCategory::Auth
            }
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("token")
        {
            UiErrorCategory::Auth
        } else if lower.contains("invalid") || lower.contains("malformed") {
            UiErrorCategory::Validation
        } else if lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("disconnected")
            || lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// One-line summary for the console status line.
    pub fn summary(&self) -> String {
        let what = match self.context {
            UiErrorContext::BackendStartup => "Falha ao iniciar",
            UiErrorContext::LoadStatuses => "Erro ao buscar lista de status",
            UiErrorContext::LoadOrders => "Erro ao buscar pedidos",
            UiErrorContext::LoadOrderDetail => "Erro ao buscar pedido",
            UiErrorContext::UpdateOrderStatus => "Erro ao atualizar status",
            UiErrorContext::General => "Erro",
        };
        let hint = match self.category {
            UiErrorCategory::Auth => " (verifique o token: orders-console login --token ...)",
            UiErrorCategory::Transport => " (backend inacessível)",
            UiErrorCategory::Validation | UiErrorCategory::Unknown => "",
        };
        format!("{what}: {}{hint}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ApiError;

    #[test]
    fn unauthorized_response_points_at_login() {
        let err = ClientError::Api {
            status: 401,
            error: ApiError::from_response(401, r#"{"detail":"Token inválido"}"#),
        };
        let ui = UiError::from_client_error(UiErrorContext::LoadOrders, &err);
        assert_eq!(ui.category, UiErrorCategory::Auth);
        let summary = ui.summary();
        assert!(summary.starts_with("Erro ao buscar pedidos: "));
        assert!(summary.contains("Token inválido"));
        assert!(summary.contains("login --token"));
    }

    #[test]
    fn message_heuristics_pick_a_category() {
        let ui = UiError::from_message(UiErrorContext::General, "connection refused");
        assert_eq!(ui.category, UiErrorCategory::Transport);
        assert!(ui.summary().contains("backend inacessível"));
        let ui = UiError::from_message(UiErrorContext::LoadStatuses, "something odd");
        assert_eq!(ui.category, UiErrorCategory::Unknown);
        assert_eq!(ui.summary(), "Erro ao buscar lista de status: something odd");
    }
}

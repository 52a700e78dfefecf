//! Backend commands queued from the console to the backend worker.

use shared::{
    domain::{OrderId, StatusId},
    protocol::ListOrdersQuery,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadStatuses,
    LoadOrders {
        request_id: u64,
        query: ListOrdersQuery,
    },
    LoadOrderDetail {
        order_id: OrderId,
    },
    UpdateOrderStatus {
        order_id: OrderId,
        status_id: StatusId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadStatuses => "load_statuses",
            Self::LoadOrders { .. } => "load_orders",
            Self::LoadOrderDetail { .. } => "load_order_detail",
            Self::UpdateOrderStatus { .. } => "update_order_status",
        }
    }
}

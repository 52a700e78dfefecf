//! View state of the orders list and the transitions driving it.
//!
//! Every user action returns the backend commands it needs; every backend
//! event is folded back in through [`OrdersViewState::apply_event`]. Orders
//! requests are numbered and only the response to the latest one is applied,
//! so a slow earlier response can never overwrite a newer page.

use chrono::NaiveDate;
use shared::{
    domain::{OrderDetail, OrderId, OrderRow, StatusId, StatusOption},
    protocol::{ListOrdersQuery, SortKey},
};
use tracing::debug;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Filter inputs as currently edited. They are read whenever orders are
/// fetched, not only when filters are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    pub search: String,
    pub status: Option<StatusId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct OrdersViewState {
    pub orders: Vec<OrderRow>,
    pub statuses: Vec<StatusOption>,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub order_by: SortKey,
    pub filters: FilterInputs,
    pub loading: bool,
    pub detail: Option<OrderDetail>,
    pub status_line: String,
    next_request_id: u64,
    latest_request_id: Option<u64>,
}

impl Default for OrdersViewState {
    fn default() -> Self {
        let query = ListOrdersQuery::default();
        Self::new(query.page_size, query.order_by)
    }
}

impl OrdersViewState {
    pub fn new(page_size: u32, order_by: SortKey) -> Self {
        Self {
            orders: Vec::new(),
            statuses: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
            order_by,
            filters: FilterInputs::default(),
            loading: false,
            detail: None,
            status_line: String::new(),
            next_request_id: 1,
            latest_request_id: None,
        }
    }

    /// Initial load: the status choices and the first page.
    pub fn mount(&mut self) -> Vec<BackendCommand> {
        vec![BackendCommand::LoadStatuses, self.fetch_orders()]
    }

    pub fn current_query(&self) -> ListOrdersQuery {
        ListOrdersQuery {
            page: self.page,
            page_size: self.page_size,
            search: Some(self.filters.search.clone()),
            status: self.filters.status,
            order_by: self.order_by.clone(),
            date_from: self.filters.date_from,
            date_to: self.filters.date_to,
        }
        .normalized()
    }

    fn fetch_orders(&mut self) -> BackendCommand {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.latest_request_id = Some(request_id);
        self.loading = true;
        BackendCommand::LoadOrders {
            request_id,
            query: self.current_query(),
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filters.search = text.into();
    }

    pub fn set_status_filter(&mut self, status: Option<StatusId>) {
        self.filters.status = status;
    }

    pub fn set_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.filters.date_from = from;
        self.filters.date_to = to;
    }

    /// Applies the edited filters: back to the first page, then refetch.
    pub fn apply_filters(&mut self) -> BackendCommand {
        self.page = 1;
        self.fetch_orders()
    }

    pub fn refresh(&mut self) -> BackendCommand {
        self.fetch_orders()
    }

    /// Moves to `page`, clamped to the known page range. Refetches only when
    /// the page actually changes.
    pub fn set_page(&mut self, page: u32) -> Option<BackendCommand> {
        let page = page.clamp(1, self.total_pages.max(1));
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(self.fetch_orders())
    }

    pub fn next_page(&mut self) -> Option<BackendCommand> {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<BackendCommand> {
        self.set_page(self.page.saturating_sub(1))
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Option<BackendCommand> {
        if page_size == 0 {
            self.status_line = "Tamanho de página deve ser maior que zero".to_string();
            return None;
        }
        if page_size == self.page_size {
            return None;
        }
        self.page_size = page_size;
        Some(self.fetch_orders())
    }

    pub fn set_order_by(&mut self, order_by: SortKey) -> Option<BackendCommand> {
        if order_by == self.order_by {
            return None;
        }
        self.order_by = order_by;
        Some(self.fetch_orders())
    }

    pub fn show_order(&self, order_id: OrderId) -> BackendCommand {
        BackendCommand::LoadOrderDetail { order_id }
    }

    pub fn change_order_status(&self, order_id: OrderId, status_id: StatusId) -> BackendCommand {
        BackendCommand::UpdateOrderStatus {
            order_id,
            status_id,
        }
    }

    pub fn status_name(&self, status_id: StatusId) -> Option<&str> {
        self.statuses
            .iter()
            .find(|s| s.id == status_id)
            .map(|s| s.name.as_str())
    }

    fn is_latest(&self, request_id: u64) -> bool {
        self.latest_request_id == Some(request_id)
    }

    /// Folds a backend event into the view; returns follow-up commands.
    pub fn apply_event(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::StatusesLoaded(statuses) => {
                self.statuses = statuses;
            }
            UiEvent::StatusesFailed(error) => {
                self.status_line = error.summary();
            }
            UiEvent::OrdersLoaded { request_id, page } => {
                if !self.is_latest(request_id) {
                    debug!(request_id, "dropping stale orders response");
                    return Vec::new();
                }
                self.orders = page.results;
                self.total_pages = page.total_pages;
                self.loading = false;
            }
            UiEvent::OrdersFailed { request_id, error } => {
                if !self.is_latest(request_id) {
                    debug!(request_id, "dropping stale orders failure");
                    return Vec::new();
                }
                self.loading = false;
                self.status_line = error.summary();
            }
            UiEvent::OrderDetailLoaded(detail) => {
                self.detail = Some(detail);
            }
            UiEvent::OrderStatusUpdated(detail) => {
                self.status_line = format!(
                    "Pedido #{} atualizado para '{}'",
                    detail.order_number, detail.status.name
                );
                self.detail = Some(detail);
                return vec![self.refresh()];
            }
            UiEvent::Error(error) => {
                self.status_line = error.summary();
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;

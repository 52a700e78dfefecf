use super::*;

use chrono::DateTime;
use shared::{domain::Money, protocol::Page};

use crate::controller::events::{UiError, UiErrorContext};

fn row(id: i64) -> OrderRow {
    OrderRow {
        id: OrderId(id),
        order_number: 1000 + id,
        customer_name: format!("Cliente {id}"),
        product_name: "Caneca".into(),
        quantity: 1,
        amount: Money::from_cents(4990),
        status_name: "Novo".into(),
        status_color: None,
        created_at: DateTime::parse_from_rfc3339("2024-05-01T13:45:00-03:00").expect("ts"),
    }
}

fn loaded(request_id: u64, ids: &[i64], total_pages: u32) -> UiEvent {
    UiEvent::OrdersLoaded {
        request_id,
        page: Page {
            results: ids.iter().copied().map(row).collect(),
            total_pages,
            count: None,
        },
    }
}

fn orders_request(cmd: &BackendCommand) -> (u64, ListOrdersQuery) {
    match cmd {
        BackendCommand::LoadOrders { request_id, query } => (*request_id, query.clone()),
        other => panic!("expected LoadOrders, got {other:?}"),
    }
}

fn mounted_with_pages(total_pages: u32) -> OrdersViewState {
    let mut state = OrdersViewState::default();
    let commands = state.mount();
    let (request_id, _) = orders_request(&commands[1]);
    state.apply_event(loaded(request_id, &[1, 2], total_pages));
    state
}

#[test]
fn mount_loads_statuses_and_first_page() {
    let mut state = OrdersViewState::default();
    let commands = state.mount();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], BackendCommand::LoadStatuses);

    let (_, query) = orders_request(&commands[1]);
    assert_eq!(query.page, 1);
    assert_eq!(query.page_size, 10);
    assert_eq!(query.order_by.to_string(), "-criado_em");
    assert!(query.search.is_none());
    assert!(query.status.is_none());
    assert!(state.loading);
}

#[test]
fn apply_filters_always_resets_to_first_page() {
    let mut state = mounted_with_pages(5);
    let (_, query) = orders_request(&state.set_page(4).expect("page change"));
    assert_eq!(query.page, 4);

    state.set_search("maria");
    state.set_status_filter(Some(StatusId(2)));
    let (_, query) = orders_request(&state.apply_filters());
    assert_eq!(state.page, 1);
    assert_eq!(query.page, 1);
    assert_eq!(query.search.as_deref(), Some("maria"));
    assert_eq!(query.status, Some(StatusId(2)));

    // Already on page 1: still refetches.
    let (_, query) = orders_request(&state.apply_filters());
    assert_eq!(query.page, 1);
}

#[test]
fn editing_filters_does_not_fetch_on_its_own() {
    let mut state = mounted_with_pages(3);
    state.set_search("joão");
    state.set_date_range(NaiveDate::from_ymd_opt(2024, 1, 1), None);
    assert!(!state.loading);

    // The next page fetch reads whatever is in the inputs.
    let (_, query) = orders_request(&state.next_page().expect("next page"));
    assert_eq!(query.page, 2);
    assert_eq!(query.search.as_deref(), Some("joão"));
    assert_eq!(query.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
}

#[test]
fn page_changes_refetch_only_when_page_moves() {
    let mut state = mounted_with_pages(3);
    assert!(state.set_page(1).is_none());
    assert!(state.previous_page().is_none());

    let (_, query) = orders_request(&state.set_page(99).expect("clamped"));
    assert_eq!(query.page, 3);
    assert!(state.next_page().is_none());
}

#[test]
fn page_size_and_sort_changes_refetch() {
    let mut state = mounted_with_pages(3);
    assert!(state.set_page_size(10).is_none());
    assert!(state.set_page_size(0).is_none());
    assert!(!state.status_line.is_empty());

    let (_, query) = orders_request(&state.set_page_size(50).expect("size change"));
    assert_eq!(query.page_size, 50);

    assert!(state.set_order_by(SortKey::descending("criado_em")).is_none());
    let (_, query) =
        orders_request(&state.set_order_by(SortKey::ascending("numero_pedido")).expect("sort"));
    assert_eq!(query.order_by.to_string(), "numero_pedido");
}

#[test]
fn stale_responses_never_overwrite_newer_pages() {
    let mut state = mounted_with_pages(5);
    let (first, _) = orders_request(&state.set_page(2).expect("page 2"));
    let (second, _) = orders_request(&state.set_page(3).expect("page 3"));

    state.apply_event(loaded(second, &[30, 31], 5));
    assert!(!state.loading);
    state.apply_event(loaded(first, &[20, 21], 5));

    assert_eq!(state.page, 3);
    let ids: Vec<i64> = state.orders.iter().map(|o| o.id.0).collect();
    assert_eq!(ids, vec![30, 31]);

    state.apply_event(UiEvent::OrdersFailed {
        request_id: first,
        error: UiError::from_message(UiErrorContext::LoadOrders, "connection reset"),
    });
    assert!(state.status_line.is_empty());
}

#[test]
fn failed_fetch_keeps_previous_rows() {
    let mut state = mounted_with_pages(2);
    let (request_id, _) = orders_request(&state.refresh());
    state.apply_event(UiEvent::OrdersFailed {
        request_id,
        error: UiError::from_message(UiErrorContext::LoadOrders, "HTTP 401 unauthorized"),
    });
    assert!(!state.loading);
    assert_eq!(state.orders.len(), 2);
    assert!(state.status_line.contains("Erro ao buscar pedidos"));
}

#[test]
fn status_list_failure_leaves_choices_empty() {
    let mut state = OrdersViewState::default();
    state.apply_event(UiEvent::StatusesFailed(UiError::from_message(
        UiErrorContext::LoadStatuses,
        "connection refused",
    )));
    assert!(state.statuses.is_empty());
    assert!(state.status_line.contains("status"));
}

#[test]
fn status_update_refreshes_current_page() {
    let mut state = mounted_with_pages(2);
    let detail: OrderDetail = serde_json::from_value(serde_json::json!({
        "id": 1,
        "numero_pedido": 1001,
        "nome_cliente": "Maria",
        "valor_pedido": "10.00",
        "status": {"id": 3, "nome": "Enviado"},
        "criado_em": "2024-05-01T13:45:00-03:00"
    }))
    .expect("detail");

    let follow_up = state.apply_event(UiEvent::OrderStatusUpdated(detail));
    assert_eq!(follow_up.len(), 1);
    let (_, query) = orders_request(&follow_up[0]);
    assert_eq!(query.page, state.page);
    assert!(state.status_line.contains("Enviado"));
    assert_eq!(state.detail.as_ref().map(|d| d.order_number), Some(1001));
}

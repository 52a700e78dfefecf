use super::*;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use client_core::{ClientError, OrdersApi};
use crossbeam_channel::bounded;
use shared::{
    domain::{Money, OrderDetail, OrderRow, StatusOption},
    error::{ApiError, ErrorCode},
    protocol::{ListOrdersQuery, Page},
};

use crate::backend_bridge::runtime;
use crate::ui::table::EMPTY_PLACEHOLDER;

#[derive(Default)]
struct FakeApi {
    total_orders: i64,
    slow_page: Option<u32>,
    fail_orders: bool,
    panic_orders: bool,
    queries: Mutex<Vec<ListOrdersQuery>>,
}

fn row(id: i64) -> OrderRow {
    OrderRow {
        id: OrderId(id),
        order_number: 1000 + id,
        customer_name: format!("Cliente {id}"),
        product_name: "Caneca".into(),
        quantity: 1,
        amount: Money::from_cents(1000),
        status_name: "Novo".into(),
        status_color: None,
        created_at: DateTime::parse_from_rfc3339("2024-05-01T13:45:00-03:00").expect("ts"),
    }
}

fn unauthorized() -> ClientError {
    ClientError::Api {
        status: 401,
        error: ApiError::new(ErrorCode::Unauthorized, "Token inválido"),
    }
}

#[async_trait]
impl OrdersApi for FakeApi {
    async fn list_statuses(&self) -> Result<Vec<StatusOption>, ClientError> {
        Ok(vec![StatusOption {
            id: StatusId(1),
            name: "Novo".into(),
            description: None,
            css_color: Some("#2196f3".into()),
            position: Some(1),
            active: Some(true),
        }])
    }

    async fn list_orders(&self, query: &ListOrdersQuery) -> Result<Page<OrderRow>, ClientError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.clone());
        if self.slow_page == Some(query.page) {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        if self.panic_orders {
            panic!("orders handler crashed");
        }
        if self.fail_orders {
            return Err(unauthorized());
        }
        let size = i64::from(query.page_size);
        let start = (i64::from(query.page) - 1) * size + 1;
        let end = (start + size - 1).min(self.total_orders);
        let total_pages = (self.total_orders + size - 1) / size;
        Ok(Page {
            results: (start..=end).map(row).collect(),
            total_pages: u32::try_from(total_pages).expect("page count"),
            count: Some(u64::try_from(self.total_orders).expect("count")),
        })
    }

    async fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail, ClientError> {
        Ok(detail(order_id, StatusId(1)))
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status_id: StatusId,
    ) -> Result<OrderDetail, ClientError> {
        Ok(detail(order_id, status_id))
    }
}

fn detail(order_id: OrderId, status_id: StatusId) -> OrderDetail {
    serde_json::from_value(serde_json::json!({
        "id": order_id.0,
        "titulo": "Pedido",
        "numero_pedido": 1000 + order_id.0,
        "nome_cliente": "Maria",
        "valor_pedido": "1234.50",
        "status": {"id": status_id.0, "nome": if status_id.0 == 1 { "Novo" } else { "Enviado" }},
        "criado_em": "2024-05-01T13:45:00-03:00"
    }))
    .expect("detail")
}

fn start_app(api: Arc<FakeApi>) -> OrdersApp {
    let (cmd_tx, cmd_rx) = bounded(64);
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    runtime::launch(api, cmd_rx, ui_tx).expect("launch backend");
    OrdersApp::new(
        OrdersViewState::default(),
        cmd_tx,
        ui_rx,
        RenderOptions {
            color: false,
            offset: FixedOffset::west_opt(3 * 3600).expect("offset"),
        },
    )
}

#[test]
fn parses_console_lines() {
    assert_eq!(parse_action("   ").expect("blank"), None);
    assert_eq!(
        parse_action("buscar João Silva").expect("search"),
        Some(UiAction::Search("João Silva".into()))
    );
    assert_eq!(
        parse_action("status all").expect("status"),
        Some(UiAction::StatusFilter(None))
    );
    assert_eq!(
        parse_action("status 3").expect("status"),
        Some(UiAction::StatusFilter(Some(StatusId(3))))
    );
    assert_eq!(
        parse_action("de 2024-05-01").expect("date"),
        Some(UiAction::DateFrom(NaiveDate::from_ymd_opt(2024, 5, 1)))
    );
    assert_eq!(parse_action("ate -").expect("date"), Some(UiAction::DateTo(None)));
    assert_eq!(
        parse_action("ordenar numero_pedido").expect("sort"),
        Some(UiAction::Sort(SortKey::ascending("numero_pedido")))
    );
    assert_eq!(
        parse_action("mudar-status 7 2").expect("set status"),
        Some(UiAction::ChangeStatus(OrderId(7), StatusId(2)))
    );
    assert!(parse_action("pagina dois").is_err());
    assert!(parse_action("de 01/05/2024").is_err());
    assert!(parse_action("mudar-status 7").is_err());
    assert!(parse_action("voar").is_err());
}

#[test]
fn scripted_session_filters_and_pages() {
    let api = Arc::new(FakeApi {
        total_orders: 25,
        ..FakeApi::default()
    });
    let mut app = start_app(Arc::clone(&api));

    let script = "pagina 3\nbuscar maria\nfiltrar\nprox\nsair\npagina 2\n";
    let mut out = Vec::new();
    app.run(script.as_bytes(), &mut out).expect("run");
    let out = String::from_utf8(out).expect("utf8");

    assert!(out.contains("Página 3 de 3"));
    assert!(out.contains("Página 2 de 3"));
    assert!(out.contains("Status: all=Todos  1=Novo"));

    let queries = api.queries.lock().expect("queries");
    let pages: Vec<u32> = queries.iter().map(|q| q.page).collect();
    // mount, pagina 3, filtrar, prox; nothing after sair.
    assert_eq!(pages, vec![1, 3, 1, 2]);
    assert_eq!(queries[0].search, None);
    assert_eq!(queries[2].search.as_deref(), Some("maria"));
    assert_eq!(queries[3].search.as_deref(), Some("maria"));
    assert_eq!(app.state.page, 2);
}

#[test]
fn slow_earlier_response_does_not_win() {
    let api = Arc::new(FakeApi {
        total_orders: 30,
        slow_page: Some(2),
        ..FakeApi::default()
    });
    let mut app = start_app(api);
    app.mount();
    app.wait_idle().expect("mount");

    assert!(app.handle_action(UiAction::GoToPage(2)));
    assert!(app.handle_action(UiAction::GoToPage(3)));
    app.wait_idle().expect("idle");

    assert_eq!(app.state.page, 3);
    let ids: Vec<i64> = app.state.orders.iter().map(|o| o.id.0).collect();
    assert_eq!(ids, (21..=30).collect::<Vec<_>>());
    assert!(!app.state.loading);
}

#[test]
fn fetch_failure_keeps_rows_and_reports_on_status_line() {
    let api = Arc::new(FakeApi {
        fail_orders: true,
        ..FakeApi::default()
    });
    let mut app = start_app(api);
    app.mount();
    app.wait_idle().expect("mount");

    assert!(app.state.orders.is_empty());
    assert!(!app.state.loading);
    let screen = app.render();
    assert!(screen.contains(EMPTY_PLACEHOLDER));
    assert!(screen.contains("Erro ao buscar pedidos"));
    assert!(screen.contains("login --token"));
}

#[test]
fn panicking_backend_task_still_answers_the_console() {
    let api = Arc::new(FakeApi {
        panic_orders: true,
        ..FakeApi::default()
    });
    let mut app = start_app(api);
    app.mount();
    app.wait_idle().expect("mount answers despite the panic");

    assert!(!app.state.loading);
    assert_eq!(app.state.statuses.len(), 1);
    assert!(app.state.status_line.contains("Erro ao buscar pedidos"));
    assert!(app.state.status_line.contains("backend task failed"));
}

#[test]
fn status_change_refreshes_the_page_and_detail_is_shown() {
    let api = Arc::new(FakeApi {
        total_orders: 3,
        ..FakeApi::default()
    });
    let mut app = start_app(Arc::clone(&api));

    let script = "ver 2\nmudar-status 2 5\n";
    let mut out = Vec::new();
    app.run(script.as_bytes(), &mut out).expect("run");
    let out = String::from_utf8(out).expect("utf8");

    assert!(out.contains("Pedido #1002 (2)"));
    assert!(out.contains("Valor: R$ 1.234,50"));
    assert!(out.contains("Pedido #1002 atualizado para 'Enviado'"));
    assert_eq!(api.queries.lock().expect("queries").len(), 2);
}

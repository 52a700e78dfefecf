//! Text rendering of the orders view. Pure functions of view state.

use chrono::FixedOffset;
use shared::domain::{OrderDetail, OrderRow, StatusOption};

use crate::controller::reducer::OrdersViewState;
use crate::ui::format::{
    format_brl, format_datetime, format_order_number, format_product, status_badge,
    status_badge_width,
};

pub const TITLE: &str = "Pedidos Recebidos";
pub const EMPTY_PLACEHOLDER: &str = "Nenhum pedido encontrado";
pub const LOADING_PLACEHOLDER: &str = "Carregando...";
const HEADERS: [&str; 6] = ["Nº Pedido", "Cliente", "Produto", "Valor", "Status", "Data"];
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color: bool,
    pub offset: FixedOffset,
}

struct Cell {
    width: usize,
    rendered: String,
}

impl Cell {
    fn plain(text: String) -> Self {
        Self {
            width: text.chars().count(),
            rendered: text,
        }
    }
}

fn row_cells(order: &OrderRow, opts: &RenderOptions) -> [Cell; 6] {
    [
        Cell::plain(format_order_number(order.order_number)),
        Cell::plain(order.customer_name.clone()),
        Cell::plain(format_product(&order.product_name, order.quantity)),
        Cell::plain(format_brl(order.amount)),
        Cell {
            width: status_badge_width(&order.status_name),
            rendered: status_badge(
                &order.status_name,
                order.status_color.as_deref(),
                opts.color,
            ),
        },
        Cell::plain(format_datetime(&order.created_at, opts.offset)),
    ]
}

fn push_padded(line: &mut String, cell: &Cell, width: usize) {
    line.push_str(&cell.rendered);
    line.extend(std::iter::repeat(' ').take(width.saturating_sub(cell.width)));
}

/// Orders table; an empty page renders a single placeholder row.
pub fn render_orders_table(orders: &[OrderRow], opts: &RenderOptions) -> String {
    let rows: Vec<[Cell; 6]> = orders.iter().map(|o| row_cells(o, opts)).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells.iter()) {
            *width = (*width).max(cell.width);
        }
    }
    let total_width = widths.iter().sum::<usize>() + COLUMN_GAP.len() * (widths.len() - 1);

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(header.join(COLUMN_GAP).trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(total_width));
    out.push('\n');

    if rows.is_empty() {
        let pad = total_width.saturating_sub(EMPTY_PLACEHOLDER.chars().count()) / 2;
        out.push_str(&" ".repeat(pad));
        out.push_str(EMPTY_PLACEHOLDER);
        out.push('\n');
        return out;
    }

    for cells in &rows {
        let mut line = String::new();
        for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
            if i > 0 {
                line.push_str(COLUMN_GAP);
            }
            push_padded(&mut line, cell, width);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn status_filter_label(state: &OrdersViewState) -> String {
    match state.filters.status {
        None => "Todos".to_string(),
        Some(id) => match state.status_name(id) {
            Some(name) => format!("{name} ({id})"),
            None => format!("#{id}"),
        },
    }
}

pub fn render_filters(state: &OrdersViewState) -> String {
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "Buscar: \"{}\" | Status: {} | De: {} | Até: {} | Ordenação: {} | Por página: {}",
        state.filters.search,
        status_filter_label(state),
        date(state.filters.date_from),
        date(state.filters.date_to),
        state.order_by,
        state.page_size,
    )
}

pub fn render_status_options(statuses: &[StatusOption]) -> String {
    let mut out = String::from("Status: all=Todos");
    for status in statuses {
        out.push_str(&format!("  {}={}", status.id, status.name));
    }
    out
}

pub fn render_pagination(state: &OrdersViewState) -> String {
    format!("Página {} de {}", state.page, state.total_pages.max(1))
}

/// Whole screen: title, filter bar, table (or loading indicator), pagination.
pub fn render_view(state: &OrdersViewState, opts: &RenderOptions) -> String {
    let mut out = format!("{TITLE}\n{}\n\n", render_filters(state));
    if state.loading {
        out.push_str(LOADING_PLACEHOLDER);
        out.push('\n');
    } else {
        out.push_str(&render_orders_table(&state.orders, opts));
        out.push('\n');
        out.push_str(&render_pagination(state));
        out.push('\n');
    }
    if !state.status_line.is_empty() {
        out.push_str(&state.status_line);
        out.push('\n');
    }
    out
}

pub fn render_order_detail(detail: &OrderDetail, opts: &RenderOptions) -> String {
    let mut lines = vec![
        format!(
            "Pedido {} ({})",
            format_order_number(detail.order_number),
            detail.id
        ),
        format!("Título: {}", detail.title),
        format!(
            "Status: {}",
            status_badge(
                &detail.status.name,
                detail.status.css_color.as_deref(),
                opts.color
            )
        ),
        format!("Cliente: {}", detail.customer_name),
        format!("Documento: {}", detail.customer_document),
        format!("E-mail: {}", detail.customer_email),
        format!("Valor: {}", format_brl(detail.amount)),
    ];
    if let Some(cost) = detail.shipping_cost {
        lines.push(format!("Frete: {}", format_brl(cost)));
    }
    if let Some(method) = detail.shipping_method {
        lines.push(format!("Método de envio: {method}"));
    }
    if let Some(label) = &detail.shipping_label_url {
        lines.push(format!("Etiqueta: {label}"));
    }
    lines.push(format!(
        "Criado em: {}",
        format_datetime(&detail.created_at, opts.offset)
    ));
    if let Some(updated_at) = &detail.updated_at {
        lines.push(format!(
            "Atualizado em: {}",
            format_datetime(updated_at, opts.offset)
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;

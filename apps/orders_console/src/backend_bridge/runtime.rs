//! Backend worker: owns the tokio runtime and runs each queued command as its own task.

use std::{sync::Arc, thread};

use client_core::OrdersApi;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    api: Arc<dyn OrdersApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("orders-backend".into())
        .spawn(move || run_worker(api, cmd_rx, ui_tx))
}

fn run_worker(api: Arc<dyn OrdersApi>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to build backend runtime: {err}");
            let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            return;
        }
    };

    runtime.block_on(async move {
        while let Ok(cmd) = cmd_rx.recv() {
            debug!(command = cmd.name(), "backend: received command");
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            // No cancellation: a slow request may finish after a newer one.
            tokio::spawn(async move {
                let pending = cmd.clone();
                let task = tokio::spawn(async move { handle_command(api.as_ref(), cmd).await });
                let event = match task.await {
                    Ok(event) => event,
                    Err(err) => {
                        error!(command = pending.name(), "backend task aborted: {err}");
                        task_failed_event(pending, &err.to_string())
                    }
                };
                let _ = ui_tx.send(event);
            });
        }
        debug!("backend: command queue closed");
    });
}

/// Every dispatched command must answer, even when its task panics.
fn task_failed_event(cmd: BackendCommand, reason: &str) -> UiEvent {
    let message = format!("backend task failed: {reason}");
    match cmd {
        BackendCommand::LoadStatuses => {
            UiEvent::StatusesFailed(UiError::from_message(UiErrorContext::LoadStatuses, message))
        }
        BackendCommand::LoadOrders { request_id, .. } => UiEvent::OrdersFailed {
            request_id,
            error: UiError::from_message(UiErrorContext::LoadOrders, message),
        },
        BackendCommand::LoadOrderDetail { .. } => {
            UiEvent::Error(UiError::from_message(UiErrorContext::LoadOrderDetail, message))
        }
        BackendCommand::UpdateOrderStatus { .. } => {
            UiEvent::Error(UiError::from_message(UiErrorContext::UpdateOrderStatus, message))
        }
    }
}

pub async fn handle_command(api: &dyn OrdersApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::LoadStatuses => match api.list_statuses().await {
            Ok(statuses) => UiEvent::StatusesLoaded(statuses),
            Err(err) => {
                error!("Erro ao buscar lista de status: {err}");
                UiEvent::StatusesFailed(UiError::from_client_error(
                    UiErrorContext::LoadStatuses,
                    &err,
                ))
            }
        },
        BackendCommand::LoadOrders { request_id, query } => {
            match api.list_orders(&query).await {
                Ok(page) => UiEvent::OrdersLoaded { request_id, page },
                Err(err) => {
                    error!(request_id, page = query.page, "Erro ao buscar pedidos: {err}");
                    UiEvent::OrdersFailed {
                        request_id,
                        error: UiError::from_client_error(UiErrorContext::LoadOrders, &err),
                    }
                }
            }
        }
        BackendCommand::LoadOrderDetail { order_id } => match api.order_detail(order_id).await {
            Ok(detail) => UiEvent::OrderDetailLoaded(detail),
            Err(err) => {
                error!(order_id = order_id.0, "failed to load order detail: {err}");
                UiEvent::Error(UiError::from_client_error(
                    UiErrorContext::LoadOrderDetail,
                    &err,
                ))
            }
        },
        BackendCommand::UpdateOrderStatus {
            order_id,
            status_id,
        } => match api.update_order_status(order_id, status_id).await {
            Ok(detail) => UiEvent::OrderStatusUpdated(detail),
            Err(err) => {
                error!(
                    order_id = order_id.0,
                    status_id = status_id.0,
                    "failed to update order status: {err}"
                );
                UiEvent::Error(UiError::from_client_error(
                    UiErrorContext::UpdateOrderStatus,
                    &err,
                ))
            }
        },
    }
}

//! Interactive console shell: parses control lines into view actions,
//! dispatches backend commands and redraws after each round trip.

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use crossbeam_channel::{Receiver, Sender};
use shared::{
    domain::{OrderId, StatusId},
    protocol::SortKey,
};
use tracing::debug;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent, orchestration::dispatch_backend_command, reducer::OrdersViewState,
};
use crate::ui::table::{render_order_detail, render_status_options, render_view, RenderOptions};

pub const HELP: &str = "\
Comandos:
  buscar <texto>          define o texto de busca (vazio limpa)
  status <id|all>         define o filtro de status
  de <aaaa-mm-dd|->       data inicial
  ate <aaaa-mm-dd|->      data final
  filtrar                 aplica os filtros (volta para a página 1)
  pagina <n> | prox | ant navega entre páginas
  tamanho <n>             itens por página
  ordenar <campo|-campo>  ordenação (ex.: -criado_em, numero_pedido)
  atualizar               recarrega a página atual
  ver <id>                detalhes de um pedido
  mudar-status <id> <status_id>
  statuses                lista os status disponíveis
  ajuda | sair";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Search(String),
    StatusFilter(Option<StatusId>),
    DateFrom(Option<NaiveDate>),
    DateTo(Option<NaiveDate>),
    ApplyFilters,
    GoToPage(u32),
    NextPage,
    PreviousPage,
    PageSize(u32),
    Sort(SortKey),
    Refresh,
    ShowOrder(OrderId),
    ChangeStatus(OrderId, StatusId),
    ListStatuses,
    Help,
    Quit,
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .with_context(|| format!("data inválida '{raw}', use aaaa-mm-dd"))
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("{what} inválido: '{}'", raw.trim()))
}

/// Parses one console line. Blank lines yield `None`.
pub fn parse_action(line: &str) -> Result<Option<UiAction>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(v, r)| (v, r.trim()))
        .unwrap_or((line, ""));

    let action = match verb.to_lowercase().as_str() {
        "buscar" | "search" => UiAction::Search(rest.to_string()),
        "status" => match rest.to_lowercase().as_str() {
            "" | "all" | "todos" => UiAction::StatusFilter(None),
            id => UiAction::StatusFilter(Some(parse_number(id, "status")?)),
        },
        "de" | "from" => UiAction::DateFrom(parse_optional_date(rest)?),
        "ate" | "até" | "to" => UiAction::DateTo(parse_optional_date(rest)?),
        "filtrar" | "filter" => UiAction::ApplyFilters,
        "pagina" | "página" | "page" => UiAction::GoToPage(parse_number(rest, "página")?),
        "prox" | "next" | "n" => UiAction::NextPage,
        "ant" | "prev" | "p" => UiAction::PreviousPage,
        "tamanho" | "size" => UiAction::PageSize(parse_number(rest, "tamanho")?),
        "ordenar" | "sort" => UiAction::Sort(
            rest.parse()
                .map_err(|_| anyhow!("ordenação inválida: '{rest}'"))?,
        ),
        "atualizar" | "refresh" | "r" => UiAction::Refresh,
        "ver" | "show" => UiAction::ShowOrder(parse_number(rest, "pedido")?),
        "mudar-status" | "set-status" => {
            let mut parts = rest.split_whitespace();
            let (Some(order), Some(status), None) = (parts.next(), parts.next(), parts.next())
            else {
                bail!("uso: mudar-status <id> <status_id>");
            };
            UiAction::ChangeStatus(
                parse_number(order, "pedido")?,
                parse_number(status, "status")?,
            )
        }
        "statuses" => UiAction::ListStatuses,
        "ajuda" | "help" | "?" => UiAction::Help,
        "sair" | "quit" | "exit" | "q" => UiAction::Quit,
        other => bail!("comando desconhecido '{other}'; digite 'ajuda'"),
    };
    Ok(Some(action))
}

pub struct OrdersApp {
    pub state: OrdersViewState,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    render: RenderOptions,
    outstanding: usize,
}

impl OrdersApp {
    pub fn new(
        state: OrdersViewState,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        render: RenderOptions,
    ) -> Self {
        Self {
            state,
            cmd_tx,
            ui_rx,
            render,
            outstanding: 0,
        }
    }

    fn dispatch(&mut self, commands: impl IntoIterator<Item = BackendCommand>) {
        for cmd in commands {
            if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status_line) {
                self.outstanding += 1;
            }
        }
    }

    pub fn mount(&mut self) {
        let commands = self.state.mount();
        self.dispatch(commands);
    }

    /// Applies one action. Returns `false` when the user asked to quit.
    pub fn handle_action(&mut self, action: UiAction) -> bool {
        self.state.status_line.clear();
        let commands: Vec<BackendCommand> = match action {
            UiAction::Search(text) => {
                self.state.set_search(text);
                Vec::new()
            }
            UiAction::StatusFilter(status) => {
                self.state.set_status_filter(status);
                Vec::new()
            }
            UiAction::DateFrom(date) => {
                let to = self.state.filters.date_to;
                self.state.set_date_range(date, to);
                Vec::new()
            }
            UiAction::DateTo(date) => {
                let from = self.state.filters.date_from;
                self.state.set_date_range(from, date);
                Vec::new()
            }
            UiAction::ApplyFilters => vec![self.state.apply_filters()],
            UiAction::GoToPage(page) => self.state.set_page(page).into_iter().collect(),
            UiAction::NextPage => self.state.next_page().into_iter().collect(),
            UiAction::PreviousPage => self.state.previous_page().into_iter().collect(),
            UiAction::PageSize(size) => self.state.set_page_size(size).into_iter().collect(),
            UiAction::Sort(key) => self.state.set_order_by(key).into_iter().collect(),
            UiAction::Refresh => vec![self.state.refresh()],
            UiAction::ShowOrder(order_id) => {
                self.state.detail = None;
                vec![self.state.show_order(order_id)]
            }
            UiAction::ChangeStatus(order_id, status_id) => {
                vec![self.state.change_order_status(order_id, status_id)]
            }
            UiAction::ListStatuses | UiAction::Help => Vec::new(),
            UiAction::Quit => return false,
        };
        self.dispatch(commands);
        true
    }

    /// Blocks until every dispatched command has reported back.
    pub fn wait_idle(&mut self) -> Result<()> {
        while self.outstanding > 0 {
            let event = self
                .ui_rx
                .recv()
                .context("backend worker stopped before answering")?;
            self.outstanding -= 1;
            let follow_up = self.state.apply_event(event);
            self.dispatch(follow_up);
        }
        debug!("console idle");
        Ok(())
    }

    pub fn render(&self) -> String {
        render_view(&self.state, &self.render)
    }

    /// Line-driven loop until `sair` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        self.mount();
        if self.state.loading {
            writeln!(out, "Carregando...")?;
        }
        self.wait_idle()?;
        write!(out, "{}", self.render())?;
        writeln!(out, "{}", render_status_options(&self.state.statuses))?;

        for line in input.lines() {
            let line = line.context("failed to read console input")?;
            let action = match parse_action(&line) {
                Ok(Some(action)) => action,
                Ok(None) => continue,
                Err(err) => {
                    writeln!(out, "{err:#}")?;
                    continue;
                }
            };

            let show_detail = matches!(action, UiAction::ShowOrder(_));
            let show_help = action == UiAction::Help;
            let show_statuses = action == UiAction::ListStatuses;
            if !self.handle_action(action) {
                break;
            }
            self.wait_idle()?;

            if show_help {
                writeln!(out, "{HELP}")?;
            } else if show_statuses {
                writeln!(out, "{}", render_status_options(&self.state.statuses))?;
            } else if show_detail {
                match &self.state.detail {
                    Some(detail) => write!(out, "{}", render_order_detail(detail, &self.render))?,
                    None => writeln!(out, "{}", self.state.status_line)?,
                }
            } else {
                write!(out, "{}", self.render())?;
            }
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;

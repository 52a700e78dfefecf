use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use client_core::{FileTokenStore, OrdersApi, OrdersClient, TokenStore};
use crossbeam_channel::{bounded, unbounded};
use shared::{
    domain::{OrderId, StatusId},
    protocol::{ListOrdersQuery, SortKey},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use config::{load_settings, Settings};
use controller::reducer::OrdersViewState;
use ui::{
    app::OrdersApp,
    table::{render_order_detail, render_orders_table, RenderOptions},
};

#[derive(Parser, Debug)]
#[command(name = "orders-console", version, about = "Browse and filter received orders")]
struct Cli {
    /// TOML config file (defaults to ./orders-console.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// API root, e.g. http://localhost:8000/api
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Key-value file holding the bearer token
    #[arg(long, global = true)]
    storage: Option<PathBuf>,
    #[arg(long, global = true)]
    no_color: bool,
    /// -v for info, -vv for debug logs on stderr
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive list with search, status filter and pagination (default)
    Browse,
    /// Print a single page of orders
    List(ListArgs),
    /// Print the available order statuses
    Statuses,
    /// Print one order in detail
    Show { order_id: OrderId },
    /// Move an order to another status
    SetStatus {
        order_id: OrderId,
        status_id: StatusId,
    },
    /// Store the bearer token used for every request
    Login {
        #[arg(long)]
        token: String,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    status: Option<StatusId>,
    /// Field to sort by; prefix with '-' for descending
    #[arg(long, allow_hyphen_values = true)]
    order_by: Option<SortKey>,
    /// Created on or after (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Print the raw page as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(settings: &Settings, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }
    if let Some(storage) = cli.storage {
        settings.storage_path = storage;
    }
    if cli.no_color {
        settings.color = false;
    }
    init_tracing(&settings, cli.verbose);

    let tokens = Arc::new(FileTokenStore::new(&settings.storage_path));
    let api = Arc::new(
        OrdersClient::new(&settings.api_base_url, tokens.clone())
            .context("failed to build orders client")?,
    );
    info!(base_url = %api.base_url(), storage = %settings.storage_path.display(), "orders console starting");

    let render = RenderOptions {
        color: settings.color,
        offset: settings.display_offset(),
    };

    match cli.command.unwrap_or(Command::Browse) {
        Command::Browse => browse(api, &settings, render),
        command => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to build runtime")?;
            runtime.block_on(run_once(command, api.as_ref(), tokens.as_ref(), &settings, render))
        }
    }
}

fn browse(api: Arc<OrdersClient>, settings: &Settings, render: RenderOptions) -> Result<()> {
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = unbounded();
    let worker = runtime::launch(api, cmd_rx, ui_tx).context("failed to start backend worker")?;

    let state = OrdersViewState::new(settings.page_size, settings.order_by.clone());
    let mut app = OrdersApp::new(state, cmd_tx, ui_rx, render);
    let result = app.run(std::io::stdin().lock(), std::io::stdout().lock());

    drop(app);
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    result
}

async fn run_once(
    command: Command,
    api: &dyn OrdersApi,
    tokens: &dyn TokenStore,
    settings: &Settings,
    render: RenderOptions,
) -> Result<()> {
    match command {
        Command::Browse => bail!("browse needs the interactive console"),
        Command::List(args) => {
            let query = ListOrdersQuery {
                page: args.page,
                page_size: args.page_size.unwrap_or(settings.page_size),
                search: args.search,
                status: args.status,
                order_by: args.order_by.unwrap_or_else(|| settings.order_by.clone()),
                date_from: args.from,
                date_to: args.to,
            }
            .normalized();
            let page = api
                .list_orders(&query)
                .await
                .context("Erro ao buscar pedidos")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", render_orders_table(&page.results, &render));
                println!("\nPágina {} de {}", query.page, page.total_pages.max(1));
            }
        }
        Command::Statuses => {
            let statuses = api
                .list_statuses()
                .await
                .context("Erro ao buscar lista de status")?;
            for status in statuses {
                match status.description {
                    Some(description) if !description.is_empty() => {
                        println!("{}\t{}\t{description}", status.id, status.name)
                    }
                    _ => println!("{}\t{}", status.id, status.name),
                }
            }
        }
        Command::Show { order_id } => {
            let detail = api
                .order_detail(order_id)
                .await
                .with_context(|| format!("Erro ao buscar pedido {order_id}"))?;
            print!("{}", render_order_detail(&detail, &render));
        }
        Command::SetStatus {
            order_id,
            status_id,
        } => {
            let detail = api
                .update_order_status(order_id, status_id)
                .await
                .with_context(|| format!("Erro ao atualizar status do pedido {order_id}"))?;
            print!("{}", render_order_detail(&detail, &render));
        }
        Command::Login { token } => {
            tokens.set_token(&token).await?;
            println!("Token salvo em {}", settings.storage_path.display());
        }
    }
    Ok(())
}

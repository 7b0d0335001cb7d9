//! Command-line access to a comanda backend

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use comanda_client::logger::init_logger;
use comanda_client::{
    ClientConfig, ComandaApi, MessageClient, MessageClientConfig, RefreshOutcome, SessionUpdate,
    TabList, TabSession,
};
use comanda_core::money::format_brl;

#[derive(Debug, Parser)]
#[command(name = "comanda", version, about = "Comanda point-of-sale client")]
struct Cli {
    /// REST base URL (overrides COMANDA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Message channel address (overrides COMANDA_MESSAGE_ADDR)
    #[arg(long, global = true)]
    message_addr: Option<String>,

    /// Log filter (overrides LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether an item has enough stock
    CheckStock {
        item: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Follow a tab's events until interrupted
    Watch {
        tab: String,
        #[arg(long, default_value = "monitor")]
        operator: String,
    },
    /// List open and closed tabs whose number starts with `prefix`
    Tabs {
        #[arg(default_value = "")]
        prefix: String,
    },
    /// List a tab's payments, optionally deleting one
    Payments {
        tab: String,
        #[arg(long)]
        delete: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logger(cli.log_level.as_deref());

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    if let Some(addr) = cli.message_addr {
        config.message_addr = Some(addr);
    }

    match cli.command {
        Command::CheckStock { item, quantity } => check_stock(&config, &item, quantity).await,
        Command::Watch { tab, operator } => watch(&config, &tab, operator).await,
        Command::Tabs { prefix } => tabs(&config, &prefix).await,
        Command::Payments { tab, delete } => payments(&config, &tab, delete.as_deref()).await,
    }
}

async fn check_stock(config: &ClientConfig, item: &str, quantity: u32) -> Result<()> {
    let api = ComandaApi::new(config.build_http_client()?);
    let verdict = api
        .verify_stock(item, quantity, config.low_stock_threshold)
        .await
        .context("stock check failed")?;
    match verdict.message(item) {
        Some(message) => println!("{message}"),
        None => println!("{item}: ok"),
    }
    if !verdict.is_available() {
        std::process::exit(2);
    }
    Ok(())
}

async fn connect(config: &ClientConfig) -> Result<MessageClient> {
    let Some(addr) = config.message_addr.as_deref() else {
        bail!("COMANDA_MESSAGE_ADDR or --message-addr is required");
    };
    MessageClient::connect(
        addr,
        &config.client_name,
        config.token.clone(),
        MessageClientConfig::lan(),
    )
    .await
    .with_context(|| format!("cannot reach {addr}"))
}

async fn tabs(config: &ClientConfig, prefix: &str) -> Result<()> {
    let client = connect(config).await?;
    let mut list = TabList::open(&client);
    if list.refresh().await? == RefreshOutcome::TimedOut {
        bail!("no tab list received");
    }
    list.directory_mut().set_query(prefix);
    let directory = list.directory();
    println!("Abertas:");
    for entry in directory.open() {
        println!("  {}", entry.comanda);
    }
    println!("Fechadas:");
    for entry in directory.closed() {
        println!("  {} (rodada {})", entry.comanda, entry.ordem);
    }
    client.close().await.ok();
    Ok(())
}

async fn watch(config: &ClientConfig, tab: &str, operator: String) -> Result<()> {
    let client = connect(config).await?;

    let mut session = TabSession::from_config(&client, config, tab, operator);
    session.refresh().await?;
    print_tab(&session);

    loop {
        let update = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = session.next_update() => update,
        };
        match update {
            Some(SessionUpdate::Snapshot) => print_tab(&session),
            Some(SessionUpdate::Deleted) => println!("Comanda {tab} fechada"),
            Some(SessionUpdate::ServerError(message)) => eprintln!("Erro: {message}"),
            Some(SessionUpdate::StockAlert(alert)) => {
                println!("Estoque baixo: {} ({} restantes)", alert.item, alert.quantidade)
            }
            Some(SessionUpdate::Ignored) => {}
            None => bail!("message channel closed"),
        }
    }
    client.close().await.ok();
    Ok(())
}

fn print_tab(session: &TabSession) {
    let snapshot = session.tab().snapshot();
    println!(
        "Comanda {}: pago {} / a pagar {} / total {}",
        snapshot.tab_id,
        format_brl(snapshot.amount_paid),
        format_brl(snapshot.amount_due),
        format_brl(snapshot.amount_total)
    );
    for line in &snapshot.lines {
        println!(
            "  {:>3}x {} {} ({} pago)",
            line.quantity,
            line.name,
            format_brl(line.line_total),
            line.quantity_paid
        );
    }
}

async fn payments(config: &ClientConfig, tab: &str, delete: Option<&str>) -> Result<()> {
    let api = ComandaApi::new(config.build_http_client()?);
    if let Some(id) = delete {
        api.delete_payment(tab, id)
            .await
            .with_context(|| format!("cannot delete payment {id}"))?;
        println!("Pagamento {id} removido");
    }
    let history = api.payment_history(tab).await?;
    for payment in &history.0 {
        println!(
            "{:>6} {:>12} {}",
            payment.id.as_deref().unwrap_or("-"),
            format_brl(payment.amount),
            payment.method.as_deref().unwrap_or("")
        );
    }
    println!("Total: {}", format_brl(history.total()));
    Ok(())
}

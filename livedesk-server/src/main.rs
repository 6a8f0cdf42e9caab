use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use livedesk_core::Error;

mod context;
mod server;

use context::ServerContext;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "livedesk")]
#[command(author, version, about = "LiveDesk - visitor sessions and admin notifications for live chat")]
pub struct Args {
    /// Address the webhook server binds to
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub server_addr: SocketAddr,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://livedesk@localhost:5432/livedesk")]
    pub db_url: String,

    /// Where visitor records and message contexts live
    #[arg(long, value_enum, default_value = "postgres")]
    pub store: StoreKind,

    /// Chat that receives visitor cards
    #[arg(long, env = "LIVEDESK_ADMIN_CHAT_ID", default_value = "")]
    pub admin_chat_id: String,

    /// Messaging adapter endpoint; views are only logged when absent
    #[arg(long)]
    pub transport_url: Option<String>,

    /// Widget base URL for pushing admin replies
    #[arg(long)]
    pub widget_url: Option<String>,

    #[arg(long, default_value = "Asia/Kolkata")]
    pub timezone: String,

    #[arg(long, default_value = "Rappo")]
    pub brand_name: String,

    #[arg(long, default_value_t = 5)]
    pub delivery_timeout_secs: u64,

    /// Post new visitor messages as short quotes with an Expand button
    #[arg(long)]
    pub compact_notifications: bool,
}

impl Args {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("livedesk=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "LiveDesk starting. addr={}, store={:?}, admin_chat={}",
        args.server_addr, args.store, args.admin_chat_id
    );

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }
    info!("Main finished. Goodbye!");
}

async fn run_server(args: Args) -> Result<(), Error> {
    let ctx = ServerContext::new(&args).await?;
    server::serve(args.server_addr, ctx).await
}

use clap::Parser;
use hakiyetu_mpesa::application::coordinator::PaymentCoordinator;
use hakiyetu_mpesa::config::MpesaConfig;
use hakiyetu_mpesa::infrastructure::daraja::DarajaGateway;
use hakiyetu_mpesa::infrastructure::in_memory::InMemoryPaymentStore;
use hakiyetu_mpesa::interfaces::http::{AppState, serve};
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind the HTTP API to
    #[arg(long, default_value = "127.0.0.1:5000", env = "MPESA_BIND_ADDR")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Arc::new(MpesaConfig::from_env().into_diagnostic()?);
    info!(
        environment = %config.environment,
        short_code = %config.short_code,
        "loaded Daraja configuration"
    );

    let gateway = DarajaGateway::new(config).into_diagnostic()?;
    let coordinator = PaymentCoordinator::new(
        Box::new(gateway),
        Box::new(InMemoryPaymentStore::new()),
    );

    let state = Arc::new(AppState { coordinator });
    serve(cli.bind, state).await.into_diagnostic()
}

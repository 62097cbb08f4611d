use anyhow::Context;
use common_observability::GatewayMetrics;
use prodamus_service::{
    router, AppState, LegacyConfig, LegacyInvoiceClient, MerchantCredentials, ProdamusDriver,
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let credentials = MerchantCredentials::from_env()?;
    info!(domain = %credentials.domain, sys = %credentials.sys, "Loaded prodamus credentials");
    let driver = ProdamusDriver::new(credentials).context("invalid prodamus credentials")?;
    let metrics = GatewayMetrics::new().context("failed to register metrics")?;

    let mut state = AppState::new(Arc::new(driver), metrics);
    if let Some(legacy) = LegacyConfig::from_env()? {
        info!(api_url = %legacy.api_url, "Legacy invoice flow enabled");
        let client = LegacyInvoiceClient::new(legacy).context("invalid legacy configuration")?;
        state = state.with_legacy(client);
    }

    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8086".to_string())
        .parse()?;
    let addr = SocketAddr::new(host.parse()?, port);
    info!("starting prodamus-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use cpanel_backup::{
    BackupOptions, CancellationToken, CpanelClientBuilder, CpanelResult, EndpointConfig,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> CpanelResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("CPANEL_CONFIG").ok())
        .unwrap_or_else(|| "cpanel.json".to_string());

    let endpoint = EndpointConfig::from_file(&config_path).await?;
    let client = CpanelClientBuilder::from_endpoint(endpoint).build()?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let artifact = client.full_backup(BackupOptions::default(), &cancel).await?;
    println!("Backup ready: {}", artifact.file_name());

    Ok(())
}

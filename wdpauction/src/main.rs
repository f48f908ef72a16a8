use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};
use wdpauction::BaseArgs;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    // Library events go to stderr, so stdout stays clean for the report.
    // RUST_LOG controls the verbosity.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = BaseArgs::parse();
    args.evaluate().await
}

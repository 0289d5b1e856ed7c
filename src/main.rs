mod action;

use clap::Parser;
use whatsapp_cloud::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = action::AppArgs::parse();
    logger::setup_simple_logger(args.verbose)?;

    args.run().await
}

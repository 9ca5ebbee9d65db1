mod cli;
mod peaks;
mod prelude;
mod series;
mod service;
mod store;
mod surplus;
mod wire;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    peaks::PeakDetector,
    prelude::*,
    store::{MemoryStore, ReadingStore, StoreClient},
    surplus::{SurplusClient, SurplusPipeline},
};

#[tokio::main]
async fn main() -> Result {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sundial=info")),
        )
        .init();

    match Args::parse().command {
        Command::Store(args) => {
            let store: Arc<dyn ReadingStore> = Arc::new(MemoryStore::new());
            service::serve(service::store::router(store), &args.bind).await
        }

        Command::Surplus(args) => {
            let store = StoreClient::try_new(args.store_url)?;
            let pipeline = Arc::new(SurplusPipeline::new(Arc::new(store)));
            service::serve(service::surplus::router(pipeline), &args.bind).await
        }

        Command::Peaks(args) => {
            let source = SurplusClient::try_new(args.surplus_url)?;
            let detector = Arc::new(PeakDetector::new(Arc::new(source)));
            service::serve(service::peaks::router(detector), &args.bind).await
        }
    }
}

use clap::{Parser, Subcommand};
use reqwest::Url;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the hourly reading store.
    #[clap(name = "store")]
    Store(StoreArgs),

    /// Serve the surplus pipeline over a remote reading store.
    #[clap(name = "surplus")]
    Surplus(SurplusArgs),

    /// Serve the consumption-peak detector over a remote surplus pipeline.
    #[clap(name = "peaks")]
    Peaks(PeaksArgs),
}

#[derive(Parser)]
pub struct StoreArgs {
    /// Address to listen on.
    #[clap(long, default_value = "0.0.0.0:5003", env = "STORE_BIND")]
    pub bind: String,
}

#[derive(Parser)]
pub struct SurplusArgs {
    /// Address to listen on.
    #[clap(long, default_value = "0.0.0.0:5005", env = "SURPLUS_BIND")]
    pub bind: String,

    /// Base URL of the reading-store service.
    #[clap(long = "store-url", default_value = "http://localhost:5003", env = "STORE_SERVICE_URL")]
    pub store_url: Url,
}

#[derive(Parser)]
pub struct PeaksArgs {
    /// Address to listen on.
    #[clap(long, default_value = "0.0.0.0:5006", env = "PEAKS_BIND")]
    pub bind: String,

    /// Base URL of the surplus service.
    #[clap(
        long = "surplus-url",
        default_value = "http://localhost:5005",
        env = "SURPLUS_SERVICE_URL"
    )]
    pub surplus_url: Url,
}

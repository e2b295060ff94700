use clap::{
    crate_authors,
    crate_description,
    crate_name,
    crate_version,
    Args,
    Parser,
};

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run synthetic bidders against an in-process room engine.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Path to a YAML file with the room tunables and the auctioned
    /// products.
    #[arg(long = "config")]
    #[arg(env = "SIMULATOR_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,

    /// Synthetic bidders attached to each room.
    #[arg(long = "bidders")]
    #[arg(env = "SIMULATOR_BIDDERS")]
    #[arg(default_value = "4")]
    pub bidders: usize,

    /// Mean pause between one bidder's submissions, in milliseconds.
    #[arg(long = "bid-interval-ms")]
    #[arg(default_value = "250")]
    pub bid_interval_ms: u64,

    /// Largest raise a bidder puts on top of the current highest bid, in
    /// minor currency units.
    #[arg(long = "max-raise")]
    #[arg(default_value = "500")]
    pub max_raise: u64,
}

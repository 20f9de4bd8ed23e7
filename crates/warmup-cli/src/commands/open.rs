use clap::Args;
use warmup_core::DeepLink;

use super::workout::{self, RunOptions};

#[derive(Args)]
pub struct OpenArgs {
    /// Deep link, e.g. "warmupapp://start"
    url: String,
    #[command(flatten)]
    options: RunOptions,
}

pub fn run(args: OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    match DeepLink::parse(&args.url) {
        Some(DeepLink::StartWorkout) => workout::start(None, &args.options),
        None => {
            tracing::info!(url = %args.url, "ignoring unrecognized deep link");
            println!("ignored: {}", args.url);
            Ok(())
        }
    }
}

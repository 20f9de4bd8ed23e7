use clap::Subcommand;
use warmup_core::widget::status_path;
use warmup_core::{Config, WidgetStatus};

#[derive(Subcommand)]
pub enum WidgetAction {
    /// Print the latest workout status, as the widget sees it
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the status file location
    Path,
}

pub fn run(action: WidgetAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let path = status_path(&config.widget.container_id);

    match action {
        WidgetAction::Status { json } => {
            let status = WidgetStatus::load(&path).unwrap_or_else(WidgetStatus::not_running);
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                for line in status.summary() {
                    println!("{line}");
                }
            }
        }
        WidgetAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

use std::io::BufRead;
use std::time::Duration;

use clap::{Args, Subcommand};
use tokio::sync::mpsc;
use warmup_core::workout::format_clock;
use warmup_core::{
    Catalog, Config, Event, Feedback, FileStatusMirror, Haptic, RunnerCommand, TickRunner,
    WorkoutEngine,
};

const COMMAND_HELP: &str = "Type s + Enter to skip, q + Enter to cancel, Enter to finish once done";

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Start a warmup and follow it in the terminal (Ctrl-C cancels)
    ///
    /// Reads commands from stdin: `s` skips the current exercise, `q`
    /// cancels, an empty line dismisses the completed workout.
    Start {
        /// Routine id; falls back to the configured default
        #[arg(long)]
        routine: Option<String>,
        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Milliseconds per workout second
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,
    /// Print events as JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

/// Prints cues instead of speaking and vibrating.
struct TerminalFeedback {
    quiet: bool,
}

impl Feedback for TerminalFeedback {
    fn speak(&mut self, text: &str) {
        if !self.quiet {
            println!("  say: {text}");
        }
    }

    fn haptic(&mut self, kind: Haptic) {
        if !self.quiet {
            let name = match kind {
                Haptic::Start => "start",
                Haptic::Success => "success",
                Haptic::Click => "click",
                Haptic::Notification => "notification",
            };
            println!("  haptic: {name}");
        }
    }
}

fn parse_command(line: &str) -> Option<RunnerCommand> {
    match line.trim() {
        "s" | "skip" => Some(RunnerCommand::Skip),
        "q" | "quit" | "cancel" => Some(RunnerCommand::Cancel),
        "" | "done" => Some(RunnerCommand::Acknowledge),
        _ => None,
    }
}

/// Forward stdin lines as runner commands. The channel closes at EOF.
fn spawn_stdin_reader(tx: mpsc::Sender<RunnerCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                None => eprintln!("{COMMAND_HELP}"),
            }
        }
    });
}

fn describe(engine: &WorkoutEngine, event: &Event) -> Option<String> {
    let line = match event {
        Event::WorkoutStarted { routine_id, exercise_count, .. } => {
            format!("Starting {routine_id} ({exercise_count} exercise(s))")
        }
        Event::StartSkipped { reason, .. } => format!("Cannot start: {reason}"),
        Event::ExerciseStarted { exercise_name, duration_secs, .. } => format!(
            "[{}] {exercise_name} for {}",
            engine.position(),
            format_clock(u64::from(*duration_secs))
        ),
        Event::HalfwayReached { .. } => format!("Halfway, {} left", engine.formatted_time_remaining()),
        Event::ExerciseSkipped { .. } => "Skipped".to_string(),
        Event::ExerciseCompleted { total_progress, .. } => {
            format!("Exercise done, {:.0}% complete", total_progress * 100.0)
        }
        Event::RestStarted { next_exercise_name, duration_secs, .. } => {
            format!("Rest {duration_secs}s, next: {next_exercise_name}")
        }
        Event::WorkoutCompleted { elapsed_secs, .. } => {
            format!("Warmup complete in {}", format_clock(*elapsed_secs))
        }
        Event::WorkoutCancelled { .. } => "Warmup cancelled".to_string(),
        Event::Spoken { .. } | Event::Haptic { .. } | Event::StateSnapshot { .. } => return None,
    };
    Some(line)
}

/// Run `routine` to completion, mirroring status for the widget.
pub fn start(routine: Option<String>, options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = WorkoutEngine::from_config(Catalog::builtin(), &config);
    let mirror = FileStatusMirror::for_container(&config.widget.container_id)?;
    let feedback = TerminalFeedback { quiet: options.json };
    let mut runner = TickRunner::new(engine, feedback, mirror)
        .with_period(Duration::from_millis(options.tick_ms.max(1)));

    let json = options.json;
    if !json {
        println!("{COMMAND_HELP}");
    }
    let (tx, mut commands) = mpsc::channel(8);
    spawn_stdin_reader(tx);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let phase = runtime.block_on(async {
        let stop = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        runner
            .run(routine.as_deref(), stop, &mut commands, |engine, event| {
                if json {
                    if let Ok(line) = serde_json::to_string(event) {
                        println!("{line}");
                    }
                } else if let Some(line) = describe(engine, event) {
                    println!("{line}");
                }
            })
            .await
    });

    tracing::debug!(?phase, "workout runner finished");
    Ok(())
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkoutAction::Start { routine, options } => start(routine, &options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_lines_map_to_commands() {
        assert_eq!(parse_command("s"), Some(RunnerCommand::Skip));
        assert_eq!(parse_command(" skip \n"), Some(RunnerCommand::Skip));
        assert_eq!(parse_command("q"), Some(RunnerCommand::Cancel));
        assert_eq!(parse_command(""), Some(RunnerCommand::Acknowledge));
        assert_eq!(parse_command("jump"), None);
    }
}

use clap::Subcommand;
use warmup_core::{Catalog, Config};

#[derive(Subcommand)]
pub enum RoutineAction {
    /// List the available routines
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one routine and its exercises
    Show {
        /// Routine id (e.g. "basic_warmup")
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RoutineAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::builtin();

    match action {
        RoutineAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.list_routines())?);
                return Ok(());
            }
            let config = Config::load_or_default();
            let default_id = catalog
                .default_routine(config.settings.default_routine_id.as_deref())
                .map(|r| r.id.clone());
            for routine in catalog.list_routines() {
                let marker = if Some(&routine.id) == default_id.as_ref() { "*" } else { " " };
                println!(
                    "{marker} {:<16} {:<16} {} exercise(s), {}",
                    routine.id,
                    routine.name,
                    routine.exercises.len(),
                    routine.formatted_total()
                );
            }
        }
        RoutineAction::Show { id, json } => {
            let routine = catalog
                .get_routine(&id)
                .ok_or_else(|| format!("no routine with id '{id}'"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(routine)?);
                return Ok(());
            }
            println!("{} ({})", routine.name, routine.formatted_total());
            println!("{}", routine.description);
            println!("Rest between exercises: {}s", routine.rest_duration_secs);
            if routine.auto_start_run {
                println!("Starts run tracking when finished");
            }
            for (i, exercise) in routine.exercises.iter().enumerate() {
                println!(
                    "  {}. {} - {}s [{}]",
                    i + 1,
                    exercise.name,
                    exercise.duration_secs,
                    exercise.icon()
                );
            }
        }
    }
    Ok(())
}

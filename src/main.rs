// ==========================================
// Competition Scheduler - CLI entry point
// ==========================================
// Read-only inspection of a stored schedule.
// Usage: competition-scheduler [--db PATH] <command> <competition_id>
//   validate    conflicts + stats (default)
//   conflicts   conflict list only
//   unscheduled entries without a slot
// Output: pretty JSON on stdout, logs on stderr
// ==========================================

use anyhow::{bail, Context};

use competition_scheduler::app::{get_default_db_path, AppState};
use competition_scheduler::{logging, ConstraintOverrides, APP_NAME, VERSION};

struct CliArgs {
    db_path: String,
    command: String,
    competition_id: String,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut db_path = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--db" {
            let value = iter.next().context("--db requires a path")?;
            db_path = Some(value.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    let (command, competition_id) = match positional.as_slice() {
        [competition_id] => ("validate".to_string(), competition_id.clone()),
        [command, competition_id] => (command.clone(), competition_id.clone()),
        _ => bail!("usage: competition-scheduler [--db PATH] <validate|conflicts|unscheduled> <competition_id>"),
    };

    Ok(CliArgs {
        db_path: db_path.unwrap_or_else(get_default_db_path),
        command,
        competition_id,
    })
}

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!(version = VERSION, "{}", APP_NAME);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    tracing::info!(db_path = %cli.db_path, "using database");
    let state = AppState::new(cli.db_path.clone()).context("failed to initialize application state")?;

    let overrides = ConstraintOverrides::default();
    let output = match cli.command.as_str() {
        "validate" => {
            let report = state
                .scheduling_api
                .validate_schedule(&cli.competition_id, &overrides)?;
            serde_json::to_string_pretty(&report)?
        }
        "conflicts" => {
            let conflicts = state
                .scheduling_api
                .get_conflicts(&cli.competition_id, &overrides)?;
            serde_json::to_string_pretty(&conflicts)?
        }
        "unscheduled" => {
            let entries = state
                .scheduling_api
                .get_unscheduled_entries(&cli.competition_id)?;
            serde_json::to_string_pretty(&entries)?
        }
        other => bail!("unknown command: {}", other),
    };

    println!("{}", output);
    Ok(())
}

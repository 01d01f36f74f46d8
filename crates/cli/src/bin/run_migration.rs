use clap::Parser;
use pressroom_cli::commands::migrate::{self, EXAMPLE, USAGE};
use pressroom_cli::utils::parse_failure_code;
use pressroom_core::{CoreError, MigrateConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "run-migration")]
#[command(about = "Apply (up) or revert (down) a single SQL migration", version)]
struct Cli {
    /// Migration directory name (e.g., 001_create_articles_table)
    migration_name: String,

    /// Which script to run: up or down
    direction: String,

    /// Migrations root, overrides MIGRATIONS_DIR
    #[arg(long)]
    migrations_dir: Option<PathBuf>,
}

fn fail(error: &CoreError, config: Option<&MigrateConfig>) -> ExitCode {
    tracing::debug!(error = ?error, "migration aborted");
    eprintln!("❌ {}", error);
    for hint in migrate::hints_for(error, config) {
        eprintln!("{}", hint);
    }
    ExitCode::FAILURE
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = parse_failure_code(&e);
            if code == 0 {
                let _ = e.print();
            } else {
                eprintln!("{}", USAGE);
                eprintln!("{}", EXAMPLE);
            }
            return ExitCode::from(code);
        }
    };

    let loaded = std::env::current_dir()
        .map_err(CoreError::from)
        .and_then(|cwd| migrate::load(&cli.direction, &cwd));
    let (direction, config) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e, None),
    };
    let config = match cli.migrations_dir {
        Some(dir) => config.with_migrations_dir(dir),
        None => config,
    };

    let result = match migrate::prepare(&cli.migration_name, direction, &config) {
        Ok(prepared) => migrate::run(prepared).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e, Some(&config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arguments_exit_with_failure() {
        let err = Cli::try_parse_from(["run-migration"]).err().unwrap();
        assert_eq!(parse_failure_code(&err), 1);

        let err = Cli::try_parse_from(["run-migration", "001_create_articles_table"])
            .err()
            .unwrap();
        assert_eq!(parse_failure_code(&err), 1);

        let err = Cli::try_parse_from(["run-migration", "a", "up", "extra"])
            .err()
            .unwrap();
        assert_eq!(parse_failure_code(&err), 1);
    }

    #[test]
    fn test_help_exits_cleanly() {
        let err = Cli::try_parse_from(["run-migration", "--help"]).err().unwrap();
        assert_eq!(parse_failure_code(&err), 0);
    }

    #[test]
    fn test_direction_is_left_to_the_runner() {
        let cli = Cli::try_parse_from(["run-migration", "001_create_articles_table", "sideways"])
            .unwrap();
        assert_eq!(cli.direction, "sideways");
        assert!(cli.migrations_dir.is_none());
    }
}

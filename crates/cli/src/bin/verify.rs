use clap::Parser;
use pressroom_cli::commands::verify;
use pressroom_cli::utils::parse_failure_code;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "verify")]
#[command(about = "Check that the migration setup is complete and the database is reachable", version)]
struct Cli {
    /// Project root to inspect, overrides PROJECT_ROOT
    #[arg(long)]
    root: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(&e));
        }
    };

    let config = match pressroom_cli::bootstrap() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    let config = match cli.root {
        Some(root) => config.with_project_root(root),
        None => config,
    };

    verify::run(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stray_argument_exits_with_one() {
        let err = Cli::try_parse_from(["verify", "extra"]).err().unwrap();
        assert_eq!(parse_failure_code(&err), 1);

        let err = Cli::try_parse_from(["verify", "--unknown"]).err().unwrap();
        assert_eq!(parse_failure_code(&err), 1);
    }

    #[test]
    fn test_root_flag() {
        let cli = Cli::try_parse_from(["verify", "--root", "/srv/app"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/app")));

        let err = Cli::try_parse_from(["verify", "--version"]).err().unwrap();
        assert_eq!(parse_failure_code(&err), 0);
    }
}

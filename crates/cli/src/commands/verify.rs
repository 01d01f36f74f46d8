//! Migration setup verification.
//!
//! A fixed, ordered pipeline of independent checks. No check gates a later
//! one; each yields status lines that feed the error and warning counters.
//! The summary is printed once, after the database check has finished or
//! been skipped.

use pressroom_core::{MigrateConfig, DATABASE_URL};
use pressroom_orm::migrations::inspect;
use pressroom_orm::MigrationRunner;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::utils::{host_matches, mask_database_url};

pub const RUNNER_SCRIPT: &str = "migrations/run-migration";
pub const ALIAS_MANIFEST: &str = ".cargo/config.toml";
pub const WORKSPACE_MANIFEST: &str = "Cargo.toml";
pub const ARTICLES_TABLE: &str = "articles";

pub const REQUIRED_FILES: [&str; 7] = [
    RUNNER_SCRIPT,
    "migrations/README.md",
    "migrations/TESTING_GUIDE.md",
    "migrations/QUICK_REFERENCE.md",
    "migrations/001_create_articles_table/up.sql",
    "migrations/001_create_articles_table/down.sql",
    "crates/orm/src/articles.rs",
];

pub const SQL_FILES: [&str; 2] = [
    "migrations/001_create_articles_table/up.sql",
    "migrations/001_create_articles_table/down.sql",
];

pub const REQUIRED_ALIASES: [&str; 3] = ["migrate", "migrate-articles-up", "migrate-articles-down"];

const DOCUMENTATION: [(&str, &str); 3] = [
    ("migrations/README.md", "Complete guide"),
    ("migrations/TESTING_GUIDE.md", "Testing against a hosted database"),
    ("migrations/QUICK_REFERENCE.md", "Quick commands"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
    /// Informational, never counted
    Info,
    Skipped,
}

impl CheckStatus {
    fn icon(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅",
            CheckStatus::Warning => "⚠️ ",
            CheckStatus::Error => "❌",
            CheckStatus::Info => "ℹ️ ",
            CheckStatus::Skipped => "⏭️ ",
        }
    }
}

/// One status line produced by a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckOutcome {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            hint: None,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Info, message)
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Skipped, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "  {} {}", self.status.icon(), self.message)?;
        if let Some(hint) = &self.hint {
            writeln!(out, "     {}", hint)?;
        }
        Ok(())
    }
}

/// Counters and status lines accumulated over one run
#[derive(Debug, Default)]
pub struct VerificationReport {
    pub errors: usize,
    pub warnings: usize,
    pub outcomes: Vec<CheckOutcome>,
}

impl VerificationReport {
    pub fn record(&mut self, outcome: CheckOutcome) {
        match outcome.status {
            CheckStatus::Error => self.errors += 1,
            CheckStatus::Warning => self.warnings += 1,
            CheckStatus::Pass | CheckStatus::Info | CheckStatus::Skipped => {}
        }
        self.outcomes.push(outcome);
    }

    /// Warnings never affect the exit code
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

pub struct Verifier {
    root: PathBuf,
    config: MigrateConfig,
}

impl Verifier {
    pub fn new(config: MigrateConfig) -> Self {
        Self {
            root: config.project_root.clone(),
            config,
        }
    }

    /// Run every check in order, printing to stdout as it goes
    pub async fn run(&self) -> VerificationReport {
        let mut report = VerificationReport::default();
        if let Err(e) = self.run_to(&mut io::stdout(), &mut report).await {
            tracing::warn!("failed to write verification output: {}", e);
        }
        report
    }

    /// Run every check in order, writing headings and status lines to `out`
    pub async fn run_to(&self, out: &mut impl Write, report: &mut VerificationReport) -> io::Result<()> {
        heading(out, "📁 Checking required files...")?;
        record_all(out, report, self.check_required_files())?;
        heading(out, "🔐 Checking environment configuration...")?;
        record_all(out, report, self.check_environment())?;
        heading(out, "📦 Checking dependencies...")?;
        record_all(out, report, self.check_dependencies())?;
        heading(out, "🔧 Checking migration script permissions...")?;
        record_all(out, report, self.check_script_permissions())?;
        heading(out, "📝 Checking cargo aliases...")?;
        record_all(out, report, self.check_aliases())?;
        heading(out, "🔍 Validating SQL files...")?;
        record_all(out, report, self.check_sql_files())?;
        // Written before connecting so a slow connection shows where it is
        heading(out, "🔌 Testing database connection...")?;
        record_all(out, report, self.check_database().await)
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn check_required_files(&self) -> Vec<CheckOutcome> {
        REQUIRED_FILES
            .iter()
            .map(|file| {
                if self.path(file).exists() {
                    CheckOutcome::pass(*file)
                } else {
                    CheckOutcome::error(format!("{} - NOT FOUND", file))
                }
            })
            .collect()
    }

    pub fn check_environment(&self) -> Vec<CheckOutcome> {
        let Some(url) = self.config.database_url.as_deref() else {
            return vec![CheckOutcome::warning(format!("{} is not set", DATABASE_URL))
                .with_hint("Set it in .env.local to run migrations")];
        };

        let mut outcomes = vec![CheckOutcome::pass(format!(
            "{} is set ({})",
            DATABASE_URL,
            mask_database_url(url)
        ))];

        let expected = &self.config.expected_host;
        outcomes.push(match host_matches(url, expected) {
            Some(true) => CheckOutcome::pass(format!("Using hosted database ({})", expected)),
            Some(false) => {
                CheckOutcome::warning(format!("Not a {} URL (this is OK for testing)", expected))
            }
            None => CheckOutcome::warning(format!("{} could not be parsed as a URL", DATABASE_URL)),
        });

        outcomes
    }

    /// The workspace manifest must declare sqlx with the postgres driver
    pub fn check_dependencies(&self) -> Vec<CheckOutcome> {
        let manifest = match read_toml(&self.path(WORKSPACE_MANIFEST)) {
            Ok(manifest) => manifest,
            Err(e) => {
                return vec![CheckOutcome::error(format!("Cannot read {}: {}", WORKSPACE_MANIFEST, e))]
            }
        };

        let sqlx = manifest
            .get("workspace")
            .and_then(|w| w.get("dependencies"))
            .and_then(|d| d.get("sqlx"))
            .or_else(|| manifest.get("dependencies").and_then(|d| d.get("sqlx")));

        let has_postgres = sqlx
            .and_then(|dep| dep.get("features"))
            .and_then(|f| f.as_array())
            .map(|features| features.iter().any(|f| f.as_str() == Some("postgres")))
            .unwrap_or(false);

        match (sqlx.is_some(), has_postgres) {
            (true, true) => vec![CheckOutcome::pass("sqlx with the postgres driver declared")],
            (true, false) => vec![CheckOutcome::error("sqlx is declared without the postgres feature")
                .with_hint("Add \"postgres\" to the sqlx features, then run: cargo fetch")],
            (false, _) => vec![CheckOutcome::error("sqlx not found in Cargo.toml")
                .with_hint("Add sqlx with the postgres feature, then run: cargo fetch")],
        }
    }

    pub fn check_script_permissions(&self) -> Vec<CheckOutcome> {
        match fs::metadata(self.path(RUNNER_SCRIPT)) {
            Ok(metadata) if is_executable(&metadata) => {
                vec![CheckOutcome::pass("Migration script is executable")]
            }
            Ok(_) => vec![CheckOutcome::warning("Migration script is not executable")
                .with_hint(format!("Run: chmod +x {}", RUNNER_SCRIPT))],
            Err(_) => vec![CheckOutcome::error("Cannot check script permissions")],
        }
    }

    pub fn check_aliases(&self) -> Vec<CheckOutcome> {
        let manifest = match read_toml(&self.path(ALIAS_MANIFEST)) {
            Ok(manifest) => manifest,
            Err(e) => return vec![CheckOutcome::error(format!("Cannot read {}: {}", ALIAS_MANIFEST, e))],
        };

        let aliases = manifest.get("alias").and_then(|a| a.as_table());

        REQUIRED_ALIASES
            .iter()
            .map(|alias| {
                if aliases.is_some_and(|table| table.contains_key(*alias)) {
                    CheckOutcome::pass(format!("cargo {}", alias))
                } else {
                    CheckOutcome::error(format!("cargo {} - NOT FOUND", alias))
                }
            })
            .collect()
    }

    pub fn check_sql_files(&self) -> Vec<CheckOutcome> {
        SQL_FILES
            .iter()
            .map(|file| match fs::read_to_string(self.path(file)) {
                Ok(content) if !content.trim().is_empty() => {
                    CheckOutcome::pass(format!("{} ({} bytes)", file, content.len()))
                }
                Ok(_) => CheckOutcome::error(format!("{} - EMPTY FILE", file)),
                Err(_) => CheckOutcome::error(format!("{} - CANNOT READ", file)),
            })
            .collect()
    }

    pub async fn check_database(&self) -> Vec<CheckOutcome> {
        let Some(url) = self.config.database_url.as_deref() else {
            return vec![CheckOutcome::skipped(format!("Skipped ({} not set)", DATABASE_URL))];
        };

        let mut runner = match MigrationRunner::connect(url).await {
            Ok(runner) => runner,
            Err(e) => return vec![CheckOutcome::error(format!("Database connection failed: {}", e))],
        };

        if let Err(e) = inspect::ping(runner.connection()).await {
            return vec![CheckOutcome::error(format!("Database connection failed: {}", e))];
        }

        let mut outcomes = vec![CheckOutcome::pass("Database connection successful")];

        outcomes.push(match inspect::table_exists(runner.connection(), ARTICLES_TABLE).await {
            Ok(true) => CheckOutcome::info("Articles table already exists")
                .with_hint("Run: cargo migrate-articles-down (to drop)"),
            Ok(false) => CheckOutcome::info("Articles table does not exist yet")
                .with_hint("Run: cargo migrate-articles-up (to create)"),
            Err(e) => CheckOutcome::error(format!("Failed to inspect schema: {}", e)),
        });

        if let Err(e) = runner.close().await {
            tracing::warn!("failed to close database connection cleanly: {}", e);
        }

        outcomes
    }
}

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", title)?;
    out.flush()
}

fn record_all(
    out: &mut impl Write,
    report: &mut VerificationReport,
    outcomes: Vec<CheckOutcome>,
) -> io::Result<()> {
    for outcome in outcomes {
        tracing::debug!(status = ?outcome.status, message = %outcome.message, "check finished");
        outcome.write_to(out)?;
        report.record(outcome);
    }
    Ok(())
}

fn read_toml(path: &Path) -> Result<toml::Value, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map_err(|e| e.to_string())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o100 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

/// Summary block printed once after the last check
pub fn render_summary(report: &VerificationReport) -> String {
    let rule = "=".repeat(50);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        format!("📊 {}", console::style("VERIFICATION SUMMARY").bold()),
        rule,
    ];

    if report.is_success() {
        lines.push(console::style("✅ All required checks passed!").green().to_string());
        if report.warnings > 0 {
            lines.push(format!("⚠️  {} warning(s) found", report.warnings));
        }
        lines.push("\n🚀 You can now run migrations:".to_string());
        lines.push("   cargo migrate-articles-up".to_string());
    } else {
        lines.push(
            console::style(format!("❌ {} error(s) found", report.errors))
                .red()
                .to_string(),
        );
        if report.warnings > 0 {
            lines.push(format!("⚠️  {} warning(s) found", report.warnings));
        }
        lines.push("\n📖 Please review the output above and fix any issues.".to_string());
    }

    lines.push("\n📚 Documentation:".to_string());
    for (file, description) in DOCUMENTATION {
        lines.push(format!("   {} - {}", file, description));
    }

    lines.join("\n")
}

/// Entry point for the `verify` binary
pub async fn run(config: MigrateConfig) -> ExitCode {
    println!("🔍 Verifying migration setup in {}", config.project_root.display());

    let report = Verifier::new(config).run().await;
    println!("{}", render_summary(&report));

    tracing::info!(errors = report.errors, warnings = report.warnings, "verification finished");
    report.exit_code()
}

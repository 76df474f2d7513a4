// Copyright (C) 2024-2026 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations CI runs, plus two database helpers:
//!
//! - `cargo xtask migrate --database <path>` applies pending migrations to a
//!   `SQLite` file, creating it if needed.
//! - `cargo xtask verify-migrations` applies every migration to a scratch
//!   database, checks the resulting schema against the tables the
//!   persistence crate queries, reverts everything, and re-applies to prove
//!   the down migrations leave nothing behind.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{collections::BTreeMap, io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables and columns the persistence crate reads and writes.
const EXPECTED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "audit_events",
        &[
            "action_json",
            "actor_json",
            "after_snapshot",
            "before_snapshot",
            "cause_json",
            "created_at",
            "event_id",
            "tournament_id",
        ],
    ),
    (
        "tournaments",
        &[
            "aggregate_json",
            "format",
            "name",
            "status",
            "tournament_id",
            "updated_at",
            "version",
        ],
    ),
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Apply pending migrations to a `SQLite` database file
    #[command(visible_alias = "mg")]
    Migrate {
        /// Path to the database file
        #[arg(long)]
        database: String,
    },

    /// Check that migrations apply, match the expected schema, and revert cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::Migrate { database } => migrate(&database),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run lib and doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Opens a `SQLite` database with foreign keys enforced.
fn open(database_url: &str) -> Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)
        .wrap_err_with(|| format!("Failed to open SQLite database {database_url}"))?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys")?;
    Ok(conn)
}

/// Apply pending migrations to a `SQLite` database file
fn migrate(database: &str) -> Result<()> {
    let mut conn = open(database)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations to {database}: {e}"))?;

    if applied.is_empty() {
        tracing::info!("{database} is already up to date");
    }
    for version in applied {
        tracing::info!("Applied migration {version}");
    }
    Ok(())
}

/// Verify migrations against an in-memory database
///
/// 1. Applies every migration
/// 2. Introspects the schema and checks it against `EXPECTED_SCHEMA`
/// 3. Reverts every migration and checks no tables remain
/// 4. Re-applies and checks the schema is identical to the first pass
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting migration verification");
    let mut conn = open(":memory:")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    let first = introspect_schema(&mut conn)?;
    check_expected(&first)?;
    tracing::info!("Schema matches the persistence layer");

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let reverted = introspect_schema(&mut conn)?;
    if !reverted.is_empty() {
        return Err(eyre!(
            "Down migrations left tables behind: {}",
            reverted.keys().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    tracing::info!("Down migrations removed every table");

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;
    let second = introspect_schema(&mut conn)?;
    if first != second {
        return Err(eyre!(
            "Schema differs after revert and re-apply:\nfirst:  {first:?}\nsecond: {second:?}"
        ));
    }

    tracing::info!("Migration verification passed");
    Ok(())
}

/// Column name, declared type and NOT NULL flag per table
type Schema = BTreeMap<String, Vec<(String, String, bool)>>;

/// Introspect the user tables of a `SQLite` database
fn introspect_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
    }

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    let mut schema = Schema::new();
    for table in tables {
        let mut columns: Vec<(String, String, bool)> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load::<ColumnInfo>(conn)
                .wrap_err_with(|| format!("Failed to get columns for table {}", table.name))?
                .into_iter()
                .map(|c| (c.name, c.r#type.to_uppercase(), c.notnull != 0))
                .collect();
        columns.sort();
        schema.insert(table.name, columns);
    }
    Ok(schema)
}

/// Check the migrated schema has exactly the expected tables and columns
fn check_expected(schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for (table, expected) in EXPECTED_SCHEMA {
        let Some(columns) = schema.get(*table) else {
            errors.push(format!("  - Table '{table}' is missing"));
            continue;
        };
        let actual: Vec<&str> = columns.iter().map(|(name, _, _)| name.as_str()).collect();
        if actual != *expected {
            errors.push(format!(
                "  - Table '{table}' has columns {actual:?}, expected {expected:?}"
            ));
        }
    }
    for table in schema.keys() {
        if !EXPECTED_SCHEMA.iter().any(|(name, _)| name == table) {
            errors.push(format!("  - Unexpected table '{table}'"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(eyre!("Schema check FAILED:\n{}", errors.join("\n")))
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

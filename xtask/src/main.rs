use anyhow::{
    Context,
    Result,
    ensure,
};
use clap::{
    Parser,
    Subcommand,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    process::Command,
};

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Lucky Slip helper tasks (clippy, tests, formatting)",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run clippy for the entire workspace with warnings-as-errors
    Clippy,
    /// Run unit and integration tests
    Test {
        /// Only run the integration tests under tests/
        #[arg(long)]
        integration_only: bool,
    },
    /// Check formatting without rewriting files
    Fmt,
    /// Formatting, clippy and tests, in that order
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = repo_root()?;

    match cli.command {
        Commands::Clippy => run_clippy(&root)?,
        Commands::Test { integration_only } => run_tests(&root, integration_only)?,
        Commands::Fmt => check_fmt(&root)?,
        Commands::Ci => {
            check_fmt(&root)?;
            run_clippy(&root)?;
            run_tests(&root, false)?;
        }
    }

    Ok(())
}

fn repo_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask has no parent directory")
}

fn run_clippy(root: &Path) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy")
        .arg("--workspace")
        .arg("--all-targets")
        .arg("--all-features")
        .arg("--")
        .arg("-D")
        .arg("warnings")
        .current_dir(root);
    run_command(cmd, "cargo clippy")
}

fn run_tests(root: &Path, integration_only: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("test").arg("-p").arg("lucky-slip").current_dir(root);
    if integration_only {
        cmd.arg("--test").arg("*");
    }
    run_command(cmd, "cargo test -p lucky-slip")
}

fn check_fmt(root: &Path) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all").arg("--check").current_dir(root);
    run_command(cmd, "cargo fmt --check")
}

fn run_command(mut cmd: Command, label: &str) -> Result<()> {
    println!("Running: {}", label);
    let status = cmd
        .status()
        .with_context(|| format!("failed to run {label}"))?;
    ensure!(status.success(), "{label} failed with status {status}");
    Ok(())
}

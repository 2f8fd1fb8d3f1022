use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for modelview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, shaders, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Check that every bundled WGSL stage declares its entry point
    Shaders,
    /// Launch the desktop viewer
    Run {
        /// OBJ model to open
        #[arg(long)]
        model: Option<PathBuf>,
        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt --check", &["fmt", "--all", "--", "--check"])?;
            run_clippy()?;
            check_shaders(Path::new("assets/shaders"))?;
            cargo("test", &["test", "--workspace"])?;
            cargo("doc", &["doc", "--workspace", "--no-deps"])?;
        }
        Commands::Fmt => cargo("fmt --check", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Doc => cargo("doc", &["doc", "--workspace", "--no-deps"])?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Shaders => check_shaders(Path::new("assets/shaders"))?,
        Commands::Run { model, config } => {
            let model = model.map(|p| p.display().to_string());
            let config = config.map(|p| p.display().to_string());
            let mut args = vec!["run", "-p", "modelview-desktop", "--release", "--"];
            if let Some(model) = &model {
                args.extend(["--model", model.as_str()]);
            }
            if let Some(config) = &config {
                args.extend(["--config", config.as_str()]);
            }
            cargo("run", &args)?;
        }
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed");
    }
    Ok(())
}

fn run_clippy() -> Result<()> {
    cargo(
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn check_shaders(dir: &Path) -> Result<()> {
    println!("==> Checking shaders in {}", dir.display());
    let mut checked = 0;
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let (attribute, entry_point) = if name.ends_with(".vert.wgsl") {
            ("@vertex", "fn vs_main")
        } else if name.ends_with(".frag.wgsl") {
            ("@fragment", "fn fs_main")
        } else {
            continue;
        };
        let source = std::fs::read_to_string(&path)?;
        if !source.contains(attribute) || !source.contains(entry_point) {
            anyhow::bail!("{} must declare `{attribute} {entry_point}`", path.display());
        }
        checked += 1;
    }
    println!("    {checked} stage(s) ok");
    Ok(())
}

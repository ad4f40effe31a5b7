use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "manto",
    version,
    about = "Molecular-surface QSAR descriptor calculation and ensemble modeling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Worker pool size; defaults to the available hardware parallelism.
    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute descriptors for every observation of a project.
    Descriptors(DescriptorsArgs),
    /// Fit the regression ensemble from previously computed descriptors.
    Model(ModelArgs),
    /// Compute descriptors and fit the ensemble in one run.
    Screen(ScreenArgs),
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project directory holding the settings files and structures.
    pub project: PathBuf,

    /// Observation settings file, relative to the project directory.
    #[arg(long, default_value = "observations.json")]
    pub observations: String,

    /// Descriptor settings file, relative to the project directory.
    #[arg(long, default_value = "descriptors.json")]
    pub descriptors: String,

    /// Descriptor checkpoint file, relative to the project directory.
    #[arg(long, default_value = "descriptorList.json")]
    pub checkpoint: String,
}

#[derive(Debug, Args)]
pub struct DescriptorsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Compute observations on the worker pool; disables checkpointed
    /// resume.
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Ensemble configuration file (TOML), relative to the project
    /// directory.
    #[arg(long, default_value = "model.toml")]
    pub config: String,

    /// Fit ensemble members on the worker pool.
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Ensemble configuration file (TOML), relative to the project
    /// directory.
    #[arg(long, default_value = "model.toml")]
    pub config: String,

    /// Use the worker pool for both the descriptor batch and the ensemble.
    #[arg(long)]
    pub parallel: bool,
}

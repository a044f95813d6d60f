//! Drives benchmark sweeps of the stars collective transport through `mpirun`.
//!
//! A sweep is a fixed cross product of topology, rail count, process count, collective and
//! algorithm. Each point becomes one shell command whose output is appended to a log file
//! picked by topology and matrix kind.

use thiserror::Error;

pub mod argument;
pub mod collective;
pub mod command;
pub mod config;
pub mod hostfile;
pub mod log_target;
pub mod matrix;
pub mod runner;

pub use collective::{Collective, CollectiveSpec};
pub use matrix::{MatrixKind, RunConfiguration, Topology};
pub use runner::{ExecutionResult, Launcher, RunSummary, Runner, ShellLauncher};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0:?} does not exist, please set it first!")]
    MissingHostfile(std::path::PathBuf),
    #[error("unknown collective: {0}")]
    UnknownCollective(String),
    #[error("unknown matrix kind: {0}")]
    UnknownMatrixKind(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry point shared by the binaries: set up logging, parse the options and run.
/// An error here makes the binary exit non-zero.
pub fn run_from_args(kind: MatrixKind) -> anyhow::Result<()> {
    use structopt::StructOpt;

    logging::init_log();

    let opt = argument::Opt::from_args();
    log::info!("Opts: {:#?}", opt);

    run_with_opt(kind, &opt, std::io::stdout().lock())
}

/// Run the sweep described by `opt`, or with `--dry-run` print it to `out` as
/// `[<log file>] <command>` lines without touching the filesystem.
pub fn run_with_opt<W: std::io::Write>(
    kind: MatrixKind,
    opt: &argument::Opt,
    mut out: W,
) -> anyhow::Result<()> {
    let setting = match &opt.config {
        Some(path) => {
            log::info!("parsing runner configuration from file: {:?}", path);
            config::read_config(path)?
        }
        None => config::RunnerSetting::default(),
    };
    log::info!("setting: {:#?}", setting);

    let mut runner = Runner::with_shell(kind, setting);
    if opt.dry_run {
        for (target, cmd) in runner.plan() {
            writeln!(out, "[{}] {}", target, cmd)?;
        }
        return Ok(());
    }

    let summary = runner.run().map_err(|e| {
        log::error!("{}", e);
        e
    })?;
    if summary.failed > 0 {
        log::warn!(
            "{} of {} runs did not exit cleanly, check the logs",
            summary.failed,
            summary.launched
        );
    }
    Ok(())
}

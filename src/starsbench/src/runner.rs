use std::fs::File;
use std::process::{Command, ExitStatus};

use crate::command::build_command;
use crate::config::RunnerSetting;
use crate::hostfile::Hostfile;
use crate::log_target::LogTarget;
use crate::matrix::{Matrix, MatrixKind, RunConfiguration, Topology};
use crate::Error;

/// Exit status of one launched command. The output itself only lives in the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExecutionResult {
    fn from(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        ExecutionResult {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "Exited with code: {}", code),
            (None, Some(sig)) => write!(f, "Process terminated by signal: {}", sig),
            (None, None) => write!(f, "Exited with unknown status"),
        }
    }
}

/// Runs one command line to completion with its output going to `log`.
pub trait Launcher {
    fn launch(&mut self, cmd_str: &str, log: &File) -> anyhow::Result<ExecutionResult>;
}

/// Hands the command line to `sh -c`, so the launcher sees exactly what is written to the log.
#[derive(Debug, Clone, Default)]
pub struct ShellLauncher {
    envs: Vec<(String, String)>,
}

impl ShellLauncher {
    pub fn new(envs: Vec<(String, String)>) -> Self {
        ShellLauncher { envs }
    }
}

impl Launcher for ShellLauncher {
    fn launch(&mut self, cmd_str: &str, log: &File) -> anyhow::Result<ExecutionResult> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(cmd_str);
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }
        let status = utils::cmd_helper::run_into_file(cmd, log)?;
        Ok(status.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub launched: usize,
    /// Non-zero exits and commands that could not be started
    pub failed: usize,
}

pub struct Runner<L> {
    matrix: Matrix,
    setting: RunnerSetting,
    launcher: L,
}

impl Runner<ShellLauncher> {
    pub fn with_shell(kind: MatrixKind, setting: RunnerSetting) -> Self {
        let launcher = ShellLauncher::new(setting.env_pairs());
        Runner::new(kind, setting, launcher)
    }
}

impl<L: Launcher> Runner<L> {
    pub fn new(kind: MatrixKind, setting: RunnerSetting, launcher: L) -> Self {
        Runner {
            matrix: Matrix::new(kind),
            setting,
            launcher,
        }
    }

    pub fn kind(&self) -> MatrixKind {
        self.matrix.kind()
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn command_for(&self, config: &RunConfiguration) -> String {
        build_command(config, &self.setting.launcher, &self.setting.hostfile_path()).render()
    }

    /// Every command of the sweep in launch order, with the file it is logged to.
    pub fn plan(&self) -> Vec<(LogTarget, String)> {
        Topology::ALL
            .iter()
            .flat_map(|&topo| {
                let target = LogTarget::new(topo, self.kind());
                self.matrix
                    .configurations(topo)
                    .into_iter()
                    .map(move |c| (target, c))
            })
            .map(|(target, c)| (target, self.command_for(&c)))
            .collect()
    }

    /// Run the whole sweep. Only a missing hostfile or an unusable log file stops it, a failed
    /// benchmark is left for whoever reads the logs.
    pub fn run(&mut self) -> Result<RunSummary, Error> {
        let hostfile = Hostfile::from_path(self.setting.hostfile_path())?;
        log::info!("hostfile {:?}: {:?}", hostfile.path, hostfile.hosts);
        if hostfile.hosts.len() < 2 {
            log::warn!(
                "hostfile {:?} lists {} host(s), two-node runs expect 2",
                hostfile.path,
                hostfile.hosts.len()
            );
        }

        let log_dir = self.setting.log_dir_path();
        let mut summary = RunSummary::default();
        for &topo in &Topology::ALL {
            let target = LogTarget::new(topo, self.kind());
            let file = target.open(&log_dir)?;
            log::info!(
                "starting {} sweep on {}, logging to {:?}",
                self.kind(),
                topo,
                target.path(&log_dir)
            );

            for config in self.matrix.configurations(topo) {
                self.run_one(&config, &file, &mut summary)?;
            }
        }

        log::info!(
            "{} sweep done: {} launched, {} failed",
            self.kind(),
            summary.launched,
            summary.failed
        );
        Ok(summary)
    }

    fn run_one(
        &mut self,
        config: &RunConfiguration,
        file: &File,
        summary: &mut RunSummary,
    ) -> Result<(), Error> {
        let cmd_str = self.command_for(config);
        // the command is on disk before the job starts, in case it never returns
        utils::fs::append_line(file, &cmd_str)?;

        log::debug!("launching: {:?}", config);
        summary.launched += 1;
        match self.launcher.launch(&cmd_str, file) {
            Ok(result) if result.success() => {}
            Ok(result) => {
                summary.failed += 1;
                log::warn!("{}, cmd: {}", result, cmd_str);
            }
            Err(e) => {
                summary.failed += 1;
                log::error!("failed to launch: {}, cmd: {}", e, cmd_str);
            }
        }

        let interval = self.setting.interval();
        if interval.as_nanos() > 0 {
            log::trace!("sleep for {:?}", interval);
            std::thread::sleep(interval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_display() {
        let ok = ExecutionResult {
            code: Some(0),
            signal: None,
        };
        assert!(ok.success());
        let killed = ExecutionResult {
            code: None,
            signal: Some(9),
        };
        assert!(!killed.success());
        assert_eq!(killed.to_string(), "Process terminated by signal: 9");
    }

    #[test]
    fn plan_is_deterministic() {
        let setting = RunnerSetting::default();
        let a = Runner::with_shell(MatrixKind::Performance, setting.clone()).plan();
        let b = Runner::with_shell(MatrixKind::Performance, setting).plan();
        assert_eq!(a, b);
        // 2 rails * 2 procs * 8 pairs, per topology
        assert_eq!(a.len(), 64);
        assert!(a[..32].iter().all(|(t, _)| t.topology == Topology::SingleNode));
        assert!(a[32..].iter().all(|(t, _)| t.topology == Topology::TwoNodes));
    }

    #[test]
    fn shell_launcher_passes_envs() {
        let path = std::env::temp_dir().join(format!("starsbench_shell_{}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let file = utils::fs::open_with_create_append(&path).unwrap();

        let mut launcher = ShellLauncher::new(vec![("STARS_PROBE".to_owned(), "42".to_owned())]);
        let result = launcher.launch("echo probe=$STARS_PROBE", &file).unwrap();
        assert!(result.success());
        let result = launcher.launch("exit 7", &file).unwrap();
        assert_eq!(result.code, Some(7));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "probe=42\n");
        std::fs::remove_file(&path).unwrap();
    }
}

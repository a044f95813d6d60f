use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_hostfile() -> PathBuf {
    PathBuf::from("hf_2")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_launcher() -> String {
    "mpirun".to_owned()
}

fn default_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerSetting {
    /// Directory the hostfile and log directory are resolved against
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Host list for two-node runs, must exist before anything is launched
    #[serde(default = "default_hostfile")]
    pub hostfile: PathBuf,

    /// Where the result files are appended
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// The MPI job launcher
    #[serde(default = "default_launcher")]
    pub launcher: String,

    /// Pause after every run so connections and rail caches drain
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Extra environment variables for every child process
    #[serde(default)]
    pub envs: toml::value::Table,
}

impl Default for RunnerSetting {
    fn default() -> Self {
        RunnerSetting {
            workdir: default_workdir(),
            hostfile: default_hostfile(),
            log_dir: default_log_dir(),
            launcher: default_launcher(),
            interval_secs: default_interval_secs(),
            envs: Default::default(),
        }
    }
}

impl RunnerSetting {
    pub fn hostfile_path(&self) -> PathBuf {
        self.workdir.join(&self.hostfile)
    }

    pub fn log_dir_path(&self) -> PathBuf {
        self.workdir.join(&self.log_dir)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// `envs` flattened to strings; non-string values use their TOML representation.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.envs
            .iter()
            .map(|(k, v)| {
                let v = match v.as_str() {
                    Some(s) => s.to_owned(),
                    None => v.to_string(),
                };
                (k.clone(), v)
            })
            .collect()
    }
}

pub fn read_config<P: AsRef<Path>>(path: P) -> anyhow::Result<RunnerSetting> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("fail to read {:?}: {}", path.as_ref(), e))?;
    let setting = toml::from_str(&content)?;
    Ok(setting)
}

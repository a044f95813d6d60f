use std::fs::File;
use std::path::{Path, PathBuf};

use crate::matrix::{MatrixKind, Topology};

/// One of the four append-only result files, keyed by topology and matrix kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogTarget {
    pub topology: Topology,
    pub kind: MatrixKind,
}

impl LogTarget {
    pub fn new(topology: Topology, kind: MatrixKind) -> Self {
        LogTarget { topology, kind }
    }

    pub fn file_name(&self) -> String {
        format!("planc_stars_data_{}_{}", self.kind.tag(), self.topology.tag())
    }

    pub fn path<P: AsRef<Path>>(&self, log_dir: P) -> PathBuf {
        log_dir.as_ref().join(self.file_name())
    }

    /// Create `log_dir` if needed and open the file for appending.
    pub fn open<P: AsRef<Path>>(&self, log_dir: P) -> std::io::Result<File> {
        std::fs::create_dir_all(&log_dir)?;
        utils::fs::open_with_create_append(self.path(log_dir))
    }
}

impl std::fmt::Display for LogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_distinct_files() {
        let names: Vec<_> = [MatrixKind::Functional, MatrixKind::Performance]
            .iter()
            .flat_map(|&k| Topology::ALL.iter().map(move |&t| LogTarget::new(t, k).file_name()))
            .collect();
        assert_eq!(
            names,
            [
                "planc_stars_data_function_1node",
                "planc_stars_data_function_2nodes",
                "planc_stars_data_performance_1node",
                "planc_stars_data_performance_2nodes",
            ]
        );
        assert_eq!(
            LogTarget::new(Topology::TwoNodes, MatrixKind::Functional).path("log"),
            Path::new("log/planc_stars_data_function_2nodes")
        );
    }
}

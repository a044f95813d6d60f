use std::path::{Path, PathBuf};

use crate::Error;

/// Host list handed to the launcher through `--hostfile`. Its format belongs to the launcher,
/// we only read it to report what the two-node runs are going to use.
#[derive(Debug, Clone, Default)]
pub struct Hostfile {
    pub path: PathBuf,
    pub hosts: Vec<String>,
}

impl Hostfile {
    /// Fail unless `path` exists.
    pub fn check<P: AsRef<Path>>(path: P) -> Result<(), Error> {
        if path.as_ref().exists() {
            Ok(())
        } else {
            Err(Error::MissingHostfile(path.as_ref().to_path_buf()))
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Hostfile, Error> {
        Self::check(&path)?;
        // only existence is required, whatever the launcher accepts is fine by us
        let content = match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::warn!("cannot list hosts of {:?}: {}", path.as_ref(), e);
                String::new()
            }
        };
        let hosts = content
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| l.to_owned())
            .collect();
        Ok(Hostfile {
            path: path.as_ref().to_path_buf(),
            hosts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("starsbench_no_such_hostfile");
        match Hostfile::check(&path) {
            Err(Error::MissingHostfile(p)) => assert_eq!(p, path),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let path = std::env::temp_dir().join(format!("starsbench_hf_{}", std::process::id()));
        std::fs::write(&path, "node1 slots=128\n\n# node9\nnode2 slots=128\n").unwrap();
        let hf = Hostfile::from_path(&path).unwrap();
        assert_eq!(hf.hosts, vec!["node1 slots=128", "node2 slots=128"]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn non_utf8_hostfile_is_accepted() {
        let path = std::env::temp_dir().join(format!("starsbench_hf_latin1_{}", std::process::id()));
        std::fs::write(&path, b"# r\xe9seau A\nnode1 slots=128\nnode2 slots=128\n").unwrap();
        let hf = Hostfile::from_path(&path).unwrap();
        assert_eq!(hf.hosts, vec!["node1 slots=128", "node2 slots=128"]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unreadable_hostfile_lists_no_hosts() {
        let dir = std::env::temp_dir().join(format!("starsbench_hf_dir_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let hf = Hostfile::from_path(&dir).unwrap();
        assert!(hf.hosts.is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

use std::path::Path;

use crate::matrix::{MatrixKind, RunConfiguration, Topology};

/// Smallest message of the performance sweep, in bytes.
const MIN_MESSAGE_BYTES: u64 = 32768;
/// Iterations and warmup iterations of a functional run.
const FUNCTIONAL_ITERS: u32 = 10;

/// A launcher command line assembled token by token, rendered as one shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpirunCommand {
    tokens: Vec<String>,
}

impl MpirunCommand {
    pub fn new<S: Into<String>>(launcher: S) -> Self {
        MpirunCommand {
            tokens: vec![launcher.into()],
        }
    }

    pub fn arg<S: Into<String>>(&mut self, arg: S) -> &mut Self {
        self.tokens.push(arg.into());
        self
    }

    /// `-x NAME=VALUE`
    pub fn env<V: std::fmt::Display>(&mut self, name: &str, value: V) -> &mut Self {
        self.arg("-x").arg(format!("{}={}", name, value))
    }

    /// `-x NAME`, forward the variable from the invoking shell
    pub fn export(&mut self, name: &str) -> &mut Self {
        self.arg("-x").arg(name)
    }

    pub fn render(&self) -> String {
        self.tokens.join(" ")
    }
}

impl std::fmt::Display for MpirunCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Single-quote `token` for `sh -c` unless it only holds characters the shell leaves alone.
pub fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:=,@%".contains(c));
    if plain {
        token.to_owned()
    } else {
        format!("'{}'", token.replace('\'', "'\\''"))
    }
}

/// Transport subset handed to the stars planner.
pub fn transports(config: &RunConfiguration) -> &'static str {
    match (config.kind, config.topology) {
        (MatrixKind::Functional, Topology::SingleNode) => "all",
        _ => "rc_acc",
    }
}

pub fn build_command(config: &RunConfiguration, launcher: &str, hostfile: &Path) -> MpirunCommand {
    let mut cmd = MpirunCommand::new(launcher);
    cmd.arg("-np").arg(config.num_procs.to_string());
    if let Some(ppn) = config.procs_per_node {
        cmd.arg("-N")
            .arg(ppn.to_string())
            .arg("--hostfile")
            .arg(shell_quote(&hostfile.display().to_string()));
    }
    cmd.arg("--allow-run-as-root");
    if config.kind == MatrixKind::Functional {
        cmd.arg("--map-by").arg("numa");
    }
    cmd.arg("--mca")
        .arg("coll_ucg_max_rcache_size")
        .arg("2")
        .arg("--mca")
        .arg("btl")
        .arg("^openib");

    cmd.env("UCG_PLANC", "all")
        .export("PATH")
        .export("LD_LIBRARY_PATH")
        .env("UCG_PLANC_STARS_MAX_RAILS", config.max_rails)
        .env("UCG_PLANC_STARS_RC_ROCE_LOCAL_SUBNET", "y")
        .env("UCX_RC_VERBS_ROCE_LOCAL_SUBNET", "y")
        .env("UCX_UD_VERBS_ROCE_LOCAL_SUBNET", "y")
        .env("UCG_PLANC_STARS_TLS", transports(config))
        .env("UCX_LOG_LEVEL", "error")
        .env("UCG_LOG_LEVEL", "error")
        .env(
            &config.collective.attr_env(),
            format!("I:{}", config.algorithm),
        );

    cmd.arg(config.collective.benchmark());
    match config.max_message_mb {
        Some(mb) => {
            let max_bytes = mb as u64 * 1024 * 1024;
            cmd.arg("-m").arg(format!("{}:{}", MIN_MESSAGE_BYTES, max_bytes));
        }
        None => {
            cmd.arg("-i")
                .arg(FUNCTIONAL_ITERS.to_string())
                .arg("-x")
                .arg(FUNCTIONAL_ITERS.to_string());
        }
    }
    if config.validate {
        cmd.arg("-c");
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::Collective;

    fn first(kind: MatrixKind, topo: Topology, pred: impl Fn(&RunConfiguration) -> bool) -> String {
        let config = Matrix::new(kind)
            .configurations(topo)
            .into_iter()
            .find(|c| pred(c))
            .unwrap();
        build_command(&config, "mpirun", Path::new("/work/hf_2")).render()
    }

    #[test]
    fn functional_single_node() {
        let cmd = first(MatrixKind::Functional, Topology::SingleNode, |_| true);
        assert_eq!(
            cmd,
            "mpirun -np 7 --allow-run-as-root --map-by numa \
             --mca coll_ucg_max_rcache_size 2 --mca btl ^openib \
             -x UCG_PLANC=all -x PATH -x LD_LIBRARY_PATH \
             -x UCG_PLANC_STARS_MAX_RAILS=3 -x UCG_PLANC_STARS_RC_ROCE_LOCAL_SUBNET=y \
             -x UCX_RC_VERBS_ROCE_LOCAL_SUBNET=y -x UCX_UD_VERBS_ROCE_LOCAL_SUBNET=y \
             -x UCG_PLANC_STARS_TLS=all -x UCX_LOG_LEVEL=error -x UCG_LOG_LEVEL=error \
             -x UCG_PLANC_STARS_IBCAST_ATTR=I:1 osu_ibcast -i 10 -x 10 -c"
        );
        assert!(!cmd.contains("--hostfile"));
    }

    #[test]
    fn functional_barrier_has_no_check() {
        let cmd = first(MatrixKind::Functional, Topology::TwoNodes, |c| {
            c.collective == Collective::Ibarrier
        });
        assert!(cmd.ends_with("osu_ibarrier -i 10 -x 10"));
        assert!(cmd.contains("-np 15 -N 7 --hostfile /work/hf_2"));
        assert!(cmd.contains("UCG_PLANC_STARS_TLS=rc_acc"));
    }

    #[test]
    fn performance_message_bound() {
        let cmd = first(MatrixKind::Performance, Topology::TwoNodes, |c| {
            c.collective == Collective::Ibcast && c.algorithm == 3 && c.num_procs == 512
        });
        assert!(cmd.ends_with("osu_ibcast -m 32768:536870912"));
        assert!(cmd.contains("-np 512 -N 256 --hostfile"));
        assert!(!cmd.contains("--map-by"));

        let cmd = first(MatrixKind::Performance, Topology::SingleNode, |c| {
            c.collective == Collective::Ialltoallv
        });
        assert!(cmd.starts_with("mpirun -np 160 --allow-run-as-root"));
        assert!(cmd.ends_with("osu_ialltoallv -m 32768:1048576"));
        assert!(cmd.contains("UCG_PLANC_STARS_TLS=rc_acc"));
    }

    #[test]
    fn hostfile_with_space_is_quoted() {
        let config = Matrix::new(MatrixKind::Functional)
            .configurations(Topology::TwoNodes)
            .remove(0);
        let cmd = build_command(&config, "mpirun", Path::new("/data/stars run/hf_2")).render();
        assert!(cmd.contains("--hostfile '/data/stars run/hf_2' --allow-run-as-root"));

        assert_eq!(shell_quote("/work/hf_2"), "/work/hf_2");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}

use crate::collective::{default_collectives, Collective, CollectiveSpec};
use crate::Error;

/// Process count the offloaded ialltoallv supports on a single node.
const ALLTOALLV_MAX_PROCS_1NODE: u32 = 160;
/// Process count the offloaded ialltoallv supports across two nodes.
const ALLTOALLV_MAX_PROCS_2NODES: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// Correctness sweep on small, odd process counts
    Functional,
    /// Bandwidth/latency sweep on large process counts
    Performance,
}

impl MatrixKind {
    /// The word used in log file names.
    pub fn tag(&self) -> &'static str {
        match self {
            MatrixKind::Functional => "function",
            MatrixKind::Performance => "performance",
        }
    }
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixKind::Functional => write!(f, "functional"),
            MatrixKind::Performance => write!(f, "performance"),
        }
    }
}

impl std::str::FromStr for MatrixKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "functional" | "function" | "func" => Ok(MatrixKind::Functional),
            "performance" | "perf" => Ok(MatrixKind::Performance),
            other => Err(Error::UnknownMatrixKind(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    SingleNode,
    TwoNodes,
}

impl Topology {
    /// Sweep order: all single-node runs come before two-node runs.
    pub const ALL: [Topology; 2] = [Topology::SingleNode, Topology::TwoNodes];

    pub fn num_nodes(&self) -> u32 {
        match self {
            Topology::SingleNode => 1,
            Topology::TwoNodes => 2,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Topology::SingleNode => "1node",
            Topology::TwoNodes => "2nodes",
        }
    }

    pub fn needs_hostfile(&self) -> bool {
        self.num_nodes() > 1
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The two outer dimensions of a sweep for one topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTable {
    pub rails: Vec<u32>,
    pub procs: Vec<u32>,
}

/// One point of the sweep. Built per iteration and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub kind: MatrixKind,
    pub topology: Topology,
    pub num_procs: u32,
    /// `-N`, only set for multi-node runs
    pub procs_per_node: Option<u32>,
    pub max_rails: u32,
    pub collective: Collective,
    pub algorithm: u32,
    pub validate: bool,
    /// Upper bound of the message size sweep in MiB, performance runs only
    pub max_message_mb: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Matrix {
    kind: MatrixKind,
    collectives: Vec<CollectiveSpec>,
}

impl Matrix {
    pub fn new(kind: MatrixKind) -> Self {
        Matrix {
            kind,
            collectives: default_collectives().to_vec(),
        }
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    pub fn collectives(&self) -> &[CollectiveSpec] {
        &self.collectives
    }

    pub fn sweep_table(&self, topology: Topology) -> SweepTable {
        let (rails, procs) = match (self.kind, topology) {
            (MatrixKind::Functional, Topology::SingleNode) => (vec![3, 5], vec![7, 19, 47]),
            (MatrixKind::Functional, Topology::TwoNodes) => (vec![2, 4], vec![15, 39, 95]),
            (MatrixKind::Performance, _) => (vec![2, 4], vec![256, 512]),
        };
        SweepTable { rails, procs }
    }

    /// Enumerate every configuration of `topology`, ordered rails, procs, collective,
    /// algorithm from outer to inner.
    pub fn configurations(&self, topology: Topology) -> Vec<RunConfiguration> {
        let table = self.sweep_table(topology);
        let mut configs = Vec::new();
        for &max_rails in &table.rails {
            for &procs in &table.procs {
                for spec in &self.collectives {
                    for &algorithm in &spec.algorithms {
                        configs.push(self.build(topology, max_rails, procs, spec, algorithm));
                    }
                }
            }
        }
        configs
    }

    fn build(
        &self,
        topology: Topology,
        max_rails: u32,
        nominal_procs: u32,
        spec: &CollectiveSpec,
        algorithm: u32,
    ) -> RunConfiguration {
        let (num_procs, validate, max_message_mb) = match self.kind {
            MatrixKind::Functional => (nominal_procs, spec.validation, None),
            MatrixKind::Performance => {
                let num_procs = capped_procs(topology, spec.collective, nominal_procs);
                let size = match (spec.collective, algorithm) {
                    // the long-message bcast algorithms scale with the communicator
                    (Collective::Ibcast, 3) | (Collective::Ibcast, 4) => num_procs,
                    _ => 1,
                };
                (num_procs, false, Some(size))
            }
        };

        RunConfiguration {
            kind: self.kind,
            topology,
            num_procs,
            procs_per_node: if topology.needs_hostfile() {
                Some(num_procs / topology.num_nodes())
            } else {
                None
            },
            max_rails,
            collective: spec.collective,
            algorithm,
            validate,
            max_message_mb,
        }
    }
}

/// ialltoallv in offload mode does not support more than 256 processes yet.
fn capped_procs(topology: Topology, collective: Collective, nominal: u32) -> u32 {
    if collective != Collective::Ialltoallv || !(nominal == 256 || nominal == 512) {
        return nominal;
    }
    match topology {
        Topology::SingleNode => ALLTOALLV_MAX_PROCS_1NODE,
        Topology::TwoNodes => ALLTOALLV_MAX_PROCS_2NODES,
    }
}

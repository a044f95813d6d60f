use crate::Error;

/// Non-blocking collectives exercised by the osu micro-benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collective {
    Ibcast,
    Iallgatherv,
    Iscatterv,
    Ibarrier,
    Ialltoallv,
}

impl Collective {
    pub const ALL: [Collective; 5] = [
        Collective::Ibcast,
        Collective::Iallgatherv,
        Collective::Iscatterv,
        Collective::Ibarrier,
        Collective::Ialltoallv,
    ];

    pub fn name(&self) -> &'static str {
        use Collective::*;
        match self {
            Ibcast => "ibcast",
            Iallgatherv => "iallgatherv",
            Iscatterv => "iscatterv",
            Ibarrier => "ibarrier",
            Ialltoallv => "ialltoallv",
        }
    }

    /// The environment variable that pins the stars algorithm for this collective.
    pub fn attr_env(&self) -> String {
        format!("UCG_PLANC_STARS_{}_ATTR", self.name().to_uppercase())
    }

    /// The benchmark executable, e.g. `osu_ibcast`.
    pub fn benchmark(&self) -> String {
        format!("osu_{}", self.name())
    }
}

impl std::fmt::Display for Collective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Collective {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collective::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s.trim())
            .ok_or_else(|| Error::UnknownCollective(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectiveSpec {
    pub collective: Collective,
    /// Algorithm ids accepted by `UCG_PLANC_STARS_<COLL>_ATTR=I:<id>`
    pub algorithms: Vec<u32>,
    /// Whether the benchmark can check the result (`-c`)
    pub validation: bool,
}

lazy_static::lazy_static! {
    static ref COLLECTIVES: Vec<CollectiveSpec> = Collective::ALL
        .iter()
        .map(|&collective| CollectiveSpec {
            collective,
            algorithms: match collective {
                Collective::Ibcast => vec![1, 2, 3, 4],
                _ => vec![1],
            },
            // a barrier carries no payload to validate
            validation: collective != Collective::Ibarrier,
        })
        .collect();
}

pub fn default_collectives() -> &'static [CollectiveSpec] {
    &COLLECTIVES
}

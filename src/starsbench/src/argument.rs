use structopt::StructOpt;

#[derive(Debug, Clone, StructOpt)]
#[structopt(about = "Sweep the stars collectives with mpirun and append the output to log files.")]
pub struct Opt {
    /// The configure file, every setting has a default
    #[structopt(short = "c", long = "config")]
    pub config: Option<std::path::PathBuf>,

    /// Print the commands of the sweep without launching anything
    #[structopt(long = "dry-run")]
    pub dry_run: bool,
}

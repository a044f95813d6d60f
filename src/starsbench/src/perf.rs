// Performance sweep of the stars collectives.
// Needs the MPI environment loaded in the invoking shell and `hf_2` in the working directory.

fn main() -> anyhow::Result<()> {
    starsbench::run_from_args(starsbench::MatrixKind::Performance)
}

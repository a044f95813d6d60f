use std::fs::File;
use std::process::{Command, ExitStatus};

pub fn get_command_str(cmd: &Command) -> String {
    let prog = cmd.get_program().to_string_lossy();
    let args = cmd.get_args().map(|x| x.to_string_lossy());
    std::iter::once(prog).chain(args).collect::<Vec<_>>().join(" ")
}

/// Spawn `cmd` with both stdout and stderr appended to `sink`, and block until it exits.
///
/// A non-zero exit is not an error here, the caller decides what to do with the status.
pub fn run_into_file(mut cmd: Command, sink: &File) -> anyhow::Result<ExitStatus> {
    let cmd_str = get_command_str(&cmd);
    log::debug!("executing command: {}", cmd_str);

    cmd.stdout(sink.try_clone()?).stderr(sink.try_clone()?);
    let mut child = cmd
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to spawn: {}, cmd: {}", e, cmd_str))?;
    let status = child.wait()?;
    log::trace!("command finished with {}, cmd: {}", status, cmd_str);
    Ok(status)
}

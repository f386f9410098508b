use std::{ffi::OsStr, process::ExitStatus};

use tokio::process::Command;

pub fn cmd_program<I, S>(program: &str, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

/// Exit code of a finished process; `-N` when it was killed by signal `N`.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;

    use super::*;

    #[test]
    fn plain_exit_code() {
        assert_eq!(exit_code(&ExitStatus::from_raw(2 << 8)), 2);
        assert_eq!(exit_code(&ExitStatus::from_raw(0)), 0);
    }

    #[test]
    fn signal_is_negated() {
        // raw wait status 9 == terminated by SIGKILL
        assert_eq!(exit_code(&ExitStatus::from_raw(9)), -9);
    }
}

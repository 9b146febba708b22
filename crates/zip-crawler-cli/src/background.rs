use std::env;
use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};

/// Moves the rest of the run out of the invoking terminal.
pub trait ProcessRunner {
    /// Start a detached copy of the run with `args`, returning its pid.
    fn detach(&self, args: Vec<OsString>) -> io::Result<u32>;
}

/// Re-executes the current binary in a new session with null stdio. Logging
/// to the log file carries on in the child.
pub struct SelfRespawn;

impl ProcessRunner for SelfRespawn {
    fn detach(&self, args: Vec<OsString>) -> io::Result<u32> {
        let mut cmd = Command::new(env::current_exe()?);
        cmd.args(args)
            .env(DETACHED_ENV, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    // New session, so the terminal closing does not take us down.
                    if libc::setsid() == -1 {
                        return Err(io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let child = cmd.spawn()?;
        Ok(child.id())
    }
}

/// Set in the environment of the detached child.
pub const DETACHED_ENV: &str = "ZIP_CRAWLER_DETACHED";

/// Whether this process is already the detached copy of a run.
pub fn is_detached() -> bool {
    marks_detached(env::var_os(DETACHED_ENV))
}

fn marks_detached(value: Option<OsString>) -> bool {
    value.is_some_and(|v| v == "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_marker() {
        assert!(marks_detached(Some(OsString::from("1"))));
        assert!(!marks_detached(Some(OsString::from("0"))));
        assert!(!marks_detached(None));
    }
}

use std::{
    io::{self, Read, Write},
    path::Path,
    process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Completion of one of the pipe workers.
pub(crate) enum Event {
    InputWritten(io::Result<()>),
    Stdout(io::Result<Vec<u8>>),
    Stderr(io::Result<Vec<u8>>),
}

pub(crate) struct Pipes {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// A spawned process that is killed and reaped when dropped, unless it has
/// already been waited on.
///
/// On Unix the process leads a new process group, and killing it kills the
/// whole group. Programs that start helpers sharing their stdout or stderr
/// would otherwise keep the pipes open after the kill.
pub(crate) struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    pub fn spawn(executable: &Path) -> io::Result<Self> {
        let mut command = Command::new(executable);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt as _;
            command.process_group(0);
        }
        let child = command.spawn()?;
        log::debug!("spawned {:?} (pid {})", executable, child.id());

        Ok(Self {
            child,
            reaped: false,
        })
    }

    pub fn take_pipes(&mut self) -> io::Result<Pipes> {
        let missing = |name: &str| io::Error::other(format!("child {name} is not piped"));
        Ok(Pipes {
            stdin: self.child.stdin.take().ok_or_else(|| missing("stdin"))?,
            stdout: self.child.stdout.take().ok_or_else(|| missing("stdout"))?,
            stderr: self.child.stderr.take().ok_or_else(|| missing("stderr"))?,
        })
    }

    /// Waits for the process to exit. Returns `None` if `deadline` passed
    /// first, in which case the process has been killed and reaped.
    pub fn wait_until(&mut self, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
        let Some(deadline) = deadline else {
            let status = self.child.wait()?;
            self.reaped = true;
            return Ok(Some(status));
        };

        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            let now = Instant::now();
            if now >= deadline {
                self.terminate();
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Kills the process if it is still running and reaps it.
    pub fn terminate(&mut self) {
        if self.reaped {
            return;
        }
        // kill fails for a process that already exited; wait still reaps it
        if let Err(err) = self.kill() {
            log::debug!("kill pid {}: {}", self.child.id(), err);
        }
        if let Err(err) = self.child.wait() {
            log::warn!("failed to reap pid {}: {}", self.child.id(), err);
        }
        self.reaped = true;
    }

    #[cfg(unix)]
    fn kill(&mut self) -> io::Result<()> {
        use nix::{
            sys::signal::{killpg, Signal},
            unistd::Pid,
        };

        let group = Pid::from_raw(self.child.id() as i32);
        killpg(group, Signal::SIGKILL).map_err(io::Error::from)
    }

    #[cfg(not(unix))]
    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Writes the whole input and closes the pipe so the process sees
/// end-of-input.
pub(crate) fn feed(mut stdin: ChildStdin, input: &[u8]) -> io::Result<()> {
    match stdin.write_all(input) {
        Ok(()) => Ok(()),
        // the process stopped reading; its exit status tells whether that is a failure
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("process closed its input before reading everything");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn drain<R: Read>(mut pipe: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    pipe.read_to_end(&mut buffer)?;
    Ok(buffer)
}

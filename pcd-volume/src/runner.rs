use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use pcd_exporter::text::SerializedBuffer;
use tempfile::NamedTempFile;

use crate::{
    config::RunnerConfig,
    error::{Error, Result},
    pipe::{self, ChildGuard, Event},
};

/// Progress of a [`PipeRunner`] through one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Launched,
    InputWritten,
    Draining,
    Exited,
    Persisted,
    Failed(String),
}

/// Everything the external process wrote before exiting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultBuffer {
    stdout: Vec<u8>,
    stderr: String,
}

impl ResultBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.stdout
    }

    /// Diagnostic output, decoded lossily.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn len(&self) -> usize {
        self.stdout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

pub trait Runner {
    /// Feeds `input` to the external process and persists what it printed.
    fn execute(&mut self, input: &SerializedBuffer) -> Result<ResultBuffer>;
}

/// Runs the external volume program over stdin/stdout pipes.
///
/// Input is written while stdout and stderr are drained, each on its own
/// scoped thread, so inputs larger than the pipe capacity cannot deadlock.
/// The output file is only replaced once the process exited successfully
/// and its whole output has been captured.
#[derive(Debug)]
pub struct PipeRunner {
    executable: PathBuf,
    output: PathBuf,
    timeout: Option<Duration>,
    state: RunState,
}

impl PipeRunner {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            executable: config.executable_path.clone(),
            output: config.output_path.clone(),
            timeout: config.timeout,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("pipe runner: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn run(&mut self, input: &SerializedBuffer) -> Result<ResultBuffer> {
        let mut child = ChildGuard::spawn(&self.executable).map_err(|source| Error::Launch {
            executable: self.executable.clone(),
            source,
        })?;
        self.transition(RunState::Launched);

        let result = self.exchange(&mut child, input.as_bytes())?;
        self.persist(&result)?;

        Ok(result)
    }

    fn exchange(&mut self, child: &mut ChildGuard, input: &[u8]) -> Result<ResultBuffer> {
        let deadline = self
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        let pipes = child.take_pipes().map_err(Error::Pipe)?;
        let (sender, events) = channel::unbounded();

        crossbeam::scope(|s| {
            let stdin = pipes.stdin;
            let tx = sender.clone();
            s.spawn(move |_| {
                let _ = tx.send(Event::InputWritten(pipe::feed(stdin, input)));
            });

            let stdout = pipes.stdout;
            let tx = sender.clone();
            s.spawn(move |_| {
                let _ = tx.send(Event::Stdout(pipe::drain(stdout)));
            });

            let stderr = pipes.stderr;
            let tx = sender;
            s.spawn(move |_| {
                let _ = tx.send(Event::Stderr(pipe::drain(stderr)));
            });

            let result = self.collect(child, &events, deadline);
            if result.is_err() {
                // unblocks the workers before the scope joins them
                child.terminate();
            }
            result
        })
        .map_err(|_| Error::Pipe(io::Error::other("pipe worker panicked")))?
    }

    fn collect(
        &mut self,
        child: &mut ChildGuard,
        events: &Receiver<Event>,
        deadline: Option<Instant>,
    ) -> Result<ResultBuffer> {
        let mut input_written = false;
        let mut stdout: Option<Vec<u8>> = None;
        let mut stderr: Option<Vec<u8>> = None;

        while !(input_written && stdout.is_some() && stderr.is_some()) {
            let event = match deadline {
                Some(deadline) => match events.recv_deadline(deadline) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(self.time_out(child, events, stderr));
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match events.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            match event {
                Event::InputWritten(written) => {
                    written.map_err(Error::Pipe)?;
                    input_written = true;
                    self.transition(RunState::InputWritten);
                    self.transition(RunState::Draining);
                }
                Event::Stdout(bytes) => stdout = Some(bytes.map_err(Error::Pipe)?),
                Event::Stderr(bytes) => stderr = Some(bytes.map_err(Error::Pipe)?),
            }
        }

        let stderr = String::from_utf8_lossy(&stderr.unwrap_or_default()).into_owned();
        let status = match child.wait_until(deadline).map_err(Error::Pipe)? {
            Some(status) => status,
            None => {
                return Err(Error::Timeout {
                    timeout: self.timeout.unwrap_or_default(),
                    stderr,
                })
            }
        };
        self.transition(RunState::Exited);

        if !status.success() {
            return Err(Error::ProcessFailed { status, stderr });
        }
        if !stderr.trim().is_empty() {
            log::debug!("external process stderr:\n{}", stderr.trim_end());
        }

        Ok(ResultBuffer {
            stdout: stdout.unwrap_or_default(),
            stderr,
        })
    }

    fn time_out(
        &mut self,
        child: &mut ChildGuard,
        events: &Receiver<Event>,
        stderr: Option<Vec<u8>>,
    ) -> Error {
        log::warn!(
            "{:?} did not finish within {:?}, killing it",
            self.executable,
            self.timeout.unwrap_or_default()
        );
        child.terminate();

        // the workers finish once the process is gone
        let mut stderr = stderr;
        for event in events.iter() {
            if let Event::Stderr(Ok(bytes)) = event {
                stderr = Some(bytes);
            }
        }

        Error::Timeout {
            timeout: self.timeout.unwrap_or_default(),
            stderr: String::from_utf8_lossy(&stderr.unwrap_or_default()).into_owned(),
        }
    }

    /// Replaces the output file with the captured output in one step, so a
    /// failed write never leaves a truncated file behind. A symlinked output
    /// is written through, and the file keeps its permissions.
    fn persist(&mut self, result: &ResultBuffer) -> Result<()> {
        let target = fs::canonicalize(&self.output).unwrap_or_else(|_| self.output.clone());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_error = |source: io::Error| Error::Io {
            path: self.output.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
        if let Some(permissions) = output_permissions(&target) {
            file.as_file().set_permissions(permissions).map_err(io_error)?;
        }
        file.write_all(result.as_bytes()).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(&target).map_err(|err| io_error(err.error))?;

        log::info!("wrote {} bytes to {:?}", result.len(), self.output);
        self.transition(RunState::Persisted);
        Ok(())
    }
}

/// Permissions of the file being replaced, or 0644 for a new one.
fn output_permissions(target: &Path) -> Option<fs::Permissions> {
    if let Ok(metadata) = fs::metadata(target) {
        return Some(metadata.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        Some(fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

impl Runner for PipeRunner {
    fn execute(&mut self, input: &SerializedBuffer) -> Result<ResultBuffer> {
        self.state = RunState::Idle;
        match self.run(input) {
            Ok(result) => Ok(result),
            Err(err) => {
                self.transition(RunState::Failed(err.to_string()));
                Err(err)
            }
        }
    }
}

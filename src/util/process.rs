//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

use crate::core::errors::DistError;

/// Builder for subprocess execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable for the child only.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set several environment variables for the child only.
    pub fn envs<'a>(mut self, vars: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (k, v) in vars {
            self.env.insert(k.clone(), v.clone());
        }
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get an environment override, if set.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Execute the command with stdout passed through to ours.
    ///
    /// Stderr is echoed line by line as it arrives and also captured, so a
    /// failure can still report it. The returned stdout is always empty.
    pub fn exec_streaming(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let mut stderr = Vec::new();
        if let Some(pipe) = child.stderr.take() {
            let mut reader = BufReader::new(pipe);
            let mut line = Vec::new();
            while reader
                .read_until(b'\n', &mut line)
                .with_context(|| format!("failed to read stderr of `{}`", self.program.display()))?
                > 0
            {
                // Losing the echo is not worth failing the build over
                let _ = io::stderr().write_all(&line);
                stderr.extend_from_slice(&line);
                line.clear();
            }
        }

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        Ok(Output {
            status,
            stdout: Vec::new(),
            stderr,
        })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Runs external commands.
///
/// Everything that spawns a process goes through this, so runs can be
/// recorded in tests without a real toolchain.
pub trait Executor {
    /// Run `cmd` to completion and return its captured output.
    fn exec(&self, cmd: &ProcessBuilder) -> Result<Output>;

    /// Run `cmd` with its output shown live. Only stderr is captured.
    fn exec_streaming(&self, cmd: &ProcessBuilder) -> Result<Output> {
        self.exec(cmd)
    }

    /// Run `cmd` and turn a non-zero exit into [`DistError::Tool`].
    fn exec_and_check(&self, cmd: &ProcessBuilder) -> Result<Output> {
        tracing::debug!("running `{}`", cmd.display_command());
        check_status(cmd, self.exec(cmd)?)
    }

    /// [`Executor::exec_streaming`], with a non-zero exit turned into
    /// [`DistError::Tool`].
    fn stream_and_check(&self, cmd: &ProcessBuilder) -> Result<Output> {
        tracing::debug!("running `{}`", cmd.display_command());
        check_status(cmd, self.exec_streaming(cmd)?)
    }
}

fn check_status(cmd: &ProcessBuilder, output: Output) -> Result<Output> {
    if !output.status.success() {
        return Err(DistError::Tool {
            command: cmd.display_command(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }
    Ok(output)
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn exec(&self, cmd: &ProcessBuilder) -> Result<Output> {
        cmd.exec()
    }

    fn exec_streaming(&self, cmd: &ProcessBuilder) -> Result<Output> {
        cmd.exec_streaming()
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

/// Find the Go toolchain.
pub fn find_go() -> Option<PathBuf> {
    find_executable("go")
}

//! Test utilities and mocks for rockbuild unit tests.
//!
//! Provides a recording [`MockExecutor`] standing in for the external
//! toolchain and a [`MemoryFetcher`] standing in for the network.
//!
//! # Example
//!
//! ```rust,ignore
//! let exec = MockExecutor::new();
//! exec.expect_failure("make -j", 2, "compiler exploded");
//!
//! let fetcher = MemoryFetcher::new(source_tarball("rocksdb-7.8.3", &[]));
//! ```

pub mod fixtures;

use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;

use crate::core::errors::DistError;
use crate::sources::tarball::Fetch;
use crate::util::process::{Executor, ProcessBuilder};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> Output {
        Output {
            status: exit_status(self.status),
            stdout: self.stdout.clone().into_bytes(),
            stderr: self.stderr.clone().into_bytes(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

type Hook = Box<dyn Fn(&ProcessBuilder) + Send>;

struct Expectation {
    /// Matched as a substring of the full command line.
    pattern: String,
    output: MockProcessOutput,
}

/// Mock process executor.
///
/// Commands matching no expectation succeed with empty output. Every call
/// is recorded, including its environment and working directory.
#[derive(Default)]
pub struct MockExecutor {
    expectations: Mutex<Vec<Expectation>>,
    hooks: Mutex<Vec<(String, Hook)>>,
    calls: Mutex<Vec<ProcessBuilder>>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `pattern` with `output`.
    pub fn expect(&self, pattern: &str, output: MockProcessOutput) -> &Self {
        self.expectations.lock().unwrap().push(Expectation {
            pattern: pattern.to_string(),
            output,
        });
        self
    }

    pub fn expect_stdout(&self, pattern: &str, stdout: &str) -> &Self {
        self.expect(pattern, MockProcessOutput::success(stdout))
    }

    pub fn expect_failure(&self, pattern: &str, status: i32, stderr: &str) -> &Self {
        self.expect(pattern, MockProcessOutput::failure(status, stderr))
    }

    /// Run `hook` whenever a command containing `pattern` executes, before
    /// its output is returned. Used to fake side effects such as installs.
    pub fn on_exec(
        &self,
        pattern: &str,
        hook: impl Fn(&ProcessBuilder) + Send + 'static,
    ) -> &Self {
        self.hooks
            .lock()
            .unwrap()
            .push((pattern.to_string(), Box::new(hook)));
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<ProcessBuilder> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.display_command()).collect()
    }
}

impl Executor for MockExecutor {
    fn exec(&self, cmd: &ProcessBuilder) -> Result<Output> {
        let line = cmd.display_command();
        self.calls.lock().unwrap().push(cmd.clone());

        for (pattern, hook) in self.hooks.lock().unwrap().iter() {
            if line.contains(pattern.as_str()) {
                hook(cmd);
            }
        }

        let output = self
            .expectations
            .lock()
            .unwrap()
            .iter()
            .find(|e| line.contains(e.pattern.as_str()))
            .map(|e| e.output.clone())
            .unwrap_or_default();

        Ok(output.to_output())
    }
}

/// Serves one archive from memory, or fails like an unreachable host.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    body: Option<Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        MemoryFetcher {
            body: Some(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A fetcher whose every request fails.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DistError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.body
            .clone()
            .ok_or_else(|| DistError::fetch(url, "connection refused"))
    }
}

/// Write `files` (relative path, content) under `root`.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

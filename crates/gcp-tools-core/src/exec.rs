//! Subprocess invocation for the gcloud and gh CLIs.
//!
//! All remote state lives behind two external binaries; this module is the
//! single place a process is spawned. `CommandRunner` is the seam that lets
//! probes, steps, and the orchestrator run against a scripted mock in tests.
//!
//! Output is fully buffered via `Command::output()` — some listing calls
//! return multi-megabyte JSON, so no size cap is applied.

use std::process::Stdio;

use crate::error::{GcpToolsError, Result};

/// Captured output of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns one external process per call. Implemented by `SystemRunner` in
/// production and by a scripted mock in tests.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Real runner over `std::process::Command`.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let output = std::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Render an argv vector for error messages and logs.
pub fn render(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

/// Fail-fast executor used by the provisioning steps.
///
/// A non-zero exit aborts the whole run — provisioning is not safely
/// resumable mid-step, so there is no retry and no partial result. Stderr
/// from a successful command is logged as a warning and otherwise ignored.
pub struct Executor<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run a command without fail-fast semantics. Used by probes, which
    /// interpret failures themselves.
    pub fn probe(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.runner.run(program, args)
    }

    /// Run a mutating command; non-zero exit is a fatal `StepFailed`.
    /// Returns trimmed stdout.
    pub fn execute(&self, program: &str, args: &[String], label: &str) -> Result<String> {
        let command = render(program, args);
        let output = self
            .runner
            .run(program, args)
            .map_err(|e| GcpToolsError::StepFailed {
                label: label.to_string(),
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.stderr.trim().is_empty() {
            tracing::warn!(step = label, stderr = %output.stderr.trim(), "command wrote to stderr");
        }

        if !output.success() {
            return Err(GcpToolsError::StepFailed {
                label: label.to_string(),
                command,
                message: stderr_summary(&output.stderr),
            });
        }

        Ok(output.stdout.trim().to_string())
    }

    /// Like `execute`, but empty stdout is an error. Used for lookups whose
    /// value is required downstream (project number resolution).
    pub fn execute_nonempty(&self, program: &str, args: &[String], label: &str) -> Result<String> {
        let stdout = self.execute(program, args, label)?;
        if stdout.is_empty() {
            return Err(GcpToolsError::EmptyOutput {
                label: label.to_string(),
                command: render(program, args),
            });
        }
        Ok(stdout)
    }
}

/// gcloud prints the actionable `ERROR:` line last; surface that one.
fn stderr_summary(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return "exited with non-zero status".to_string();
    }
    trimmed.lines().last().unwrap_or(trimmed).trim().to_string()
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Scripted runner: each rule is a substring matched against the rendered
    /// command line; the first matching rule's output is returned. Unmatched
    /// commands succeed with empty stdout. Every call is recorded.
    pub struct MockRunner {
        rules: Vec<(String, CommandOutput)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockRunner {
        pub fn new() -> Self {
            Self {
                rules: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn stub(mut self, needle: &str, output: CommandOutput) -> Self {
            self.rules.push((needle.to_string(), output));
            self
        }

        pub fn stub_ok(self, needle: &str, stdout: &str) -> Self {
            self.stub(
                needle,
                CommandOutput {
                    code: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
            )
        }

        pub fn stub_fail(self, needle: &str, stderr: &str) -> Self {
            self.stub(
                needle,
                CommandOutput {
                    code: Some(1),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
            )
        }

        pub fn recorded(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count_containing(&self, needle: &str) -> usize {
            self.recorded().iter().filter(|c| c.contains(needle)).count()
        }
    }

    impl CommandRunner for MockRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
            let rendered = render(program, args);
            self.calls.lock().unwrap().push(rendered.clone());
            for (needle, output) in &self.rules {
                if rendered.contains(needle.as_str()) {
                    return Ok(output.clone());
                }
            }
            Ok(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockRunner;
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn execute_trims_stdout() {
        let runner = MockRunner::new().stub_ok("projects describe", "  123456789\n");
        let exec = Executor::new(&runner);
        let out = exec
            .execute("gcloud", &args(&["projects", "describe", "p"]), "describe")
            .unwrap();
        assert_eq!(out, "123456789");
    }

    #[test]
    fn execute_nonzero_exit_is_step_failed() {
        let runner = MockRunner::new().stub_fail("projects create", "ERROR: permission denied");
        let exec = Executor::new(&runner);
        let err = exec
            .execute(
                "gcloud",
                &args(&["projects", "create", "p"]),
                "project creation",
            )
            .unwrap_err();
        match err {
            GcpToolsError::StepFailed {
                label,
                command,
                message,
            } => {
                assert_eq!(label, "project creation");
                assert!(command.contains("gcloud projects create p"));
                assert!(message.contains("permission denied"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn execute_nonempty_rejects_blank_output() {
        let runner = MockRunner::new().stub_ok("projects describe", "   \n");
        let exec = Executor::new(&runner);
        let err = exec
            .execute_nonempty(
                "gcloud",
                &args(&["projects", "describe", "p"]),
                "project number lookup",
            )
            .unwrap_err();
        assert!(matches!(err, GcpToolsError::EmptyOutput { .. }));
    }

    #[test]
    fn step_failed_message_uses_last_stderr_line() {
        let runner =
            MockRunner::new().stub_fail("link", "WARNING: something\nERROR: billing quota");
        let exec = Executor::new(&runner);
        let err = exec
            .execute("gcloud", &args(&["billing", "link"]), "billing link")
            .unwrap_err();
        assert!(err.to_string().contains("ERROR: billing quota"));
    }
}

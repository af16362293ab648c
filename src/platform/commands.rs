//! Command-backed sample source.
//!
//! Runs one external program per metric (`vcgencmd` on a Raspberry Pi,
//! `free` for memory) and returns its stdout.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::stats::{MetricKind, SampleSource};
use crate::error::{Result, StatError};

/// Program plus arguments, run without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The command line as it would be typed, for log and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Default command for each metric on a Raspberry Pi
pub fn default_command(kind: MetricKind) -> CommandSpec {
    match kind {
        MetricKind::CpuClock => CommandSpec::new("vcgencmd", ["measure_clock", "arm"]),
        MetricKind::GpuClock => CommandSpec::new("vcgencmd", ["measure_clock", "core"]),
        MetricKind::Temperature => CommandSpec::new("vcgencmd", ["measure_temp"]),
        MetricKind::Voltage => CommandSpec::new("vcgencmd", ["measure_volts"]),
        MetricKind::Throttle => CommandSpec::new("vcgencmd", ["get_throttled"]),
        MetricKind::Memory => CommandSpec::new("free", ["-m"]),
    }
}

/// Runs a command per metric, killing any that outlive `timeout`.
#[derive(Debug, Clone)]
pub struct CommandSampleSource {
    commands: HashMap<MetricKind, CommandSpec>,
    timeout: Duration,
}

impl CommandSampleSource {
    pub fn new(timeout: Duration) -> Self {
        let commands = MetricKind::ALL
            .into_iter()
            .map(|kind| (kind, default_command(kind)))
            .collect();

        Self { commands, timeout }
    }

    /// Replace the command used for `kind`
    pub fn with_command(mut self, kind: MetricKind, command: CommandSpec) -> Self {
        self.commands.insert(kind, command);
        self
    }

    pub fn command(&self, kind: MetricKind) -> Option<&CommandSpec> {
        self.commands.get(&kind)
    }

    async fn run(&self, spec: &CommandSpec) -> Result<String> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StatError::command_failed(spec.display(), e.to_string()))?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| StatError::command_timeout(spec.display(), self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StatError::command_failed(
                spec.display(),
                format!("{} {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        log::debug!("Ran `{}`: {:?}", spec.display(), stdout.trim());
        Ok(stdout)
    }
}

#[async_trait]
impl SampleSource for CommandSampleSource {
    async fn fetch(&mut self, kind: MetricKind) -> Result<String> {
        let spec = self
            .commands
            .get(&kind)
            .ok_or_else(|| StatError::command_failed(kind.name(), "no command configured"))?;
        self.run(spec).await
    }
}

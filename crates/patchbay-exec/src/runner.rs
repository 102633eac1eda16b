use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::process::Command;
use std::process::Stdio;

use serde::Deserialize;
use serde::Serialize;

/// Captured result of one blocking external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn err(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
        }
    }
}

/// Boundary to the outside world. Everything the session does to the host
/// funnels through an implementation of this trait.
pub trait CommandRunner {
    /// Runs a command to completion and captures its output. Blocking: the
    /// session never overlaps two external invocations.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<RunOutput>;

    /// Spawns a child that outlives this process. Fire-and-forget: the child
    /// is never joined and its exit is never observed.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> io::Result<()>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<RunOutput> {
        (**self).run(program, args)
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> io::Result<()> {
        (**self).spawn_detached(program, args)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<RunOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> io::Result<()> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // The child handle is dropped without wait(): the process keeps
        // running after this session exits.
        Ok(())
    }
}

/// Simulation double: records every invocation in order and replays scripted
/// outputs keyed by program name; unscripted programs succeed with empty
/// output. Single-threaded by design, matching the session's sequential
/// command loop.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    scripted: RefCell<HashMap<String, RunOutput>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, program: &str, output: RunOutput) {
        self.scripted
            .borrow_mut()
            .insert(program.to_string(), output);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, prefix: &str, program: &str, args: &[&str]) {
        let mut call = String::new();
        call.push_str(prefix);
        call.push_str(program);
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.borrow_mut().push(call);
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<RunOutput> {
        self.record("", program, args);
        Ok(self
            .scripted
            .borrow()
            .get(program)
            .cloned()
            .unwrap_or_else(|| RunOutput::ok("")))
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> io::Result<()> {
        self.record("spawn:", program, args);
        Ok(())
    }
}

//! Launching the compile command.

use std::cell::RefCell;
use std::io;
use std::process::{Child, Command, Stdio};
use std::rc::Rc;

use tracing::{debug, info, warn};

/// Something that can start a shell command without waiting for it.
pub trait CommandRunner {
    /// Start `command`.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the command could not be started.
    fn run(&mut self, command: &str) -> io::Result<()>;
}

/// Runs commands through the platform shell and lets them run to
/// completion on their own. Handles to finished children are reaped before
/// each spawn; a running child is never waited on or killed, not even when
/// the runner is dropped.
#[derive(Debug, Default)]
pub struct ShellRunner {
    children: Vec<Child>,
}

impl ShellRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Children that had not exited at the last reap.
    #[must_use]
    pub fn running(&self) -> usize {
        self.children.len()
    }

    fn reap(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "command finished");
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!(pid = child.id(), "cannot poll command: {err}");
                false
            }
        });
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) -> io::Result<()> {
        self.reap();
        let child = shell(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        info!(pid = child.id(), command, "started");
        self.children.push(child);
        Ok(())
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// Records commands instead of running them. Clones share one log, so a
/// caller can keep a handle after boxing the runner into an editor.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingRunner {
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &str) -> io::Result<()> {
        self.log.borrow_mut().push(command.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[cfg(not(windows))]
    #[test]
    fn shell_runner_reaps_only_finished_children() {
        let mut runner = ShellRunner::new();
        runner.run("true").unwrap();
        std::thread::sleep(Duration::from_millis(300));
        runner.run("sleep 2").unwrap();
        assert_eq!(runner.running(), 1);
        runner.run("true").unwrap();
        assert_eq!(runner.running(), 2);
    }

    #[cfg(not(windows))]
    #[test]
    fn command_outlives_the_runner() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("built");
        let mut runner = ShellRunner::new();
        runner
            .run(&format!("sleep 0.5; touch '{}'", marker.display()))
            .unwrap();
        drop(runner);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !marker.exists() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(marker.exists(), "command stopped when its runner dropped");
    }

    #[test]
    fn recording_runner_keeps_order() {
        let handle = RecordingRunner::default();
        let mut runner = handle.clone();
        runner.run("make").unwrap();
        runner.run("make test").unwrap();
        assert_eq!(handle.commands(), vec!["make", "make test"]);
    }
}

//! External engine command construction and invocation.
//!
//! The invocation template is an ordered token list accumulated during
//! option translation and rendered to a command line in a single step at
//! invocation time. The subprocess is blocking: there is no timeout and no
//! cancellation, so a hung engine hangs the run.

use crate::error::{MapError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Default engine wrapper executable.
pub const DEFAULT_ENGINE: &str = "gatework-abc";

/// The external engine invocation template.
///
/// The first token is the program; the rest are its arguments, in order.
/// Per-unit arguments (the box description) are appended at invocation
/// time, never stored in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    tokens: Vec<String>,
}

impl EngineCommand {
    /// Template invoking the default engine wrapper.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_ENGINE)
    }

    /// Template invoking a specific program.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    /// Append an argument token.
    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// The program token.
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// The argument tokens, in order.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Render the template for display.
    pub fn display(&self) -> String {
        self.tokens.join(" ")
    }
}

impl Default for EngineCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the engine over an exported fragment.
///
/// Blocks until the subprocess exits. The workspace becomes the working
/// directory and the box description is passed as an explicit `-box`
/// argument. Captured output is re-logged; stderr lines surface as
/// warnings. A spawn failure or abnormal exit aborts the run.
pub fn invoke(command: &EngineCommand, workspace: &Path, box_file: &Path) -> Result<()> {
    let program = command.program();
    debug!(command = %command.display(), "invoking external engine");

    let output = Command::new(program)
        .args(command.args())
        .arg("-box")
        .arg(box_file)
        .current_dir(workspace)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| MapError::EngineSpawn {
            program: program.to_string(),
            source,
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!(engine = program, "{line}");
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        warn!(engine = program, "{line}");
    }

    if !output.status.success() {
        return Err(MapError::EngineFailed {
            program: program.to_string(),
            status: output.status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_accumulates_tokens_in_order() {
        let mut cmd = EngineCommand::new();
        cmd.push("-lut");
        cmd.push("4");
        cmd.push("-fast");
        assert_eq!(cmd.program(), DEFAULT_ENGINE);
        assert_eq!(cmd.args(), ["-lut", "4", "-fast"]);
        assert_eq!(cmd.display(), format!("{DEFAULT_ENGINE} -lut 4 -fast"));
    }

    #[test]
    fn successful_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = EngineCommand::with_program("true");
        invoke(&cmd, dir.path(), &dir.path().join("input.box")).unwrap();
    }

    #[test]
    fn abnormal_exit_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = EngineCommand::with_program("sh");
        cmd.push("-c");
        cmd.push("exit 3");
        let err = invoke(&cmd, dir.path(), &dir.path().join("input.box")).unwrap_err();
        match err {
            MapError::EngineFailed { program, status } => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = EngineCommand::with_program("gatework-engine-that-does-not-exist");
        let err = invoke(&cmd, dir.path(), &dir.path().join("input.box")).unwrap_err();
        assert!(matches!(err, MapError::EngineSpawn { .. }));
    }
}

use std::{
    io::{self, Write},
    process::{Command, ExitStatus, Stdio},
};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Could not run `{0}`")]
    Spawn(String, #[source] io::Error),
    #[error("Could not write to `{0}`")]
    Write(String, #[source] io::Error),
    #[error("`{0}` exited with {1}")]
    Failed(String, ExitStatus),
}

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// An external program that reads the new clipboard contents from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardProgram {
    program: String,
    args: Vec<String>,
}

impl ClipboardProgram {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Picks the clipboard tool for the running platform.
    pub fn detect() -> Self {
        Self::for_platform(
            std::env::consts::OS,
            std::env::var_os("WAYLAND_DISPLAY").is_some(),
        )
    }

    pub fn for_platform(os: &str, wayland: bool) -> Self {
        match os {
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => {
                if wayland {
                    Self::new("wl-copy", &[])
                } else {
                    Self::new("xclip", &["-selection", "clipboard"])
                }
            }
            "windows" => Self::new("clip", &[]),
            _ => Self::new("pbcopy", &[]),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Clipboard for ClipboardProgram {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::Spawn(self.program.clone(), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| ClipboardError::Write(self.program.clone(), e))?;
        }

        let status = child
            .wait()
            .map_err(|e| ClipboardError::Spawn(self.program.clone(), e))?;
        if !status.success() {
            return Err(ClipboardError::Failed(self.program.clone(), status));
        }

        tracing::debug!(program = %self.program, "copied code to the clipboard");

        Ok(())
    }
}

use std::io::{self, Write};

use crate::{clipboard::Clipboard, OtpCode};

/// `<code>\t(<remaining>sec)`, or just `<code>` when `minimalist`.
pub fn format_code(code: &OtpCode, remaining: u64, minimalist: bool) -> String {
    if minimalist {
        code.to_string()
    } else {
        format!("{code}\t({remaining}sec)")
    }
}

/// Prints codes and hands them over to the clipboard.
pub struct CodeEmitter<'a> {
    minimalist: bool,
    clipboard: Option<&'a dyn Clipboard>,
}

impl<'a> CodeEmitter<'a> {
    pub fn new(minimalist: bool) -> Self {
        Self {
            minimalist,
            clipboard: None,
        }
    }

    /// Copies every emitted code with `clipboard`. Callers only set this when
    /// printing to a terminal with the clipboard enabled.
    pub fn with_clipboard(&mut self, clipboard: &'a dyn Clipboard) -> &mut Self {
        self.clipboard = Some(clipboard);

        self
    }

    /// A failed clipboard copy is only a warning, the code is printed either way.
    pub fn emit(&self, out: &mut dyn Write, code: &OtpCode, remaining: u64) -> io::Result<()> {
        writeln!(out, "{}", format_code(code, remaining, self.minimalist))?;
        out.flush()?;

        if let Some(clipboard) = self.clipboard {
            if let Err(e) = clipboard.copy(&code.to_string()) {
                tracing::warn!("Couldn't put code on the clipboard: {e}");
            }
        }

        Ok(())
    }
}

use std::{io::Write, path::PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser};

use crate::{
    clipboard::{Clipboard, ClipboardProgram},
    config::{self, Config},
    emitter::CodeEmitter,
    generator::CodeGenerator,
    holdoff::{remaining_seconds, Clock, HoldoffScheduler, SystemClock},
    labels::{self, ListingStyle},
    Error,
};

const LONG_ABOUT: &str = "\
Return a TOTP code for a provided label along with its validity
period. If the generated code is valid for fewer than the holdoff
(5 seconds unless configured) the command pauses and prints the
next code instead.

Hook your shell into 'otp -t' for tab completion.

Requires a YAML file with a list of secrets, ~/.otp-secrets.yaml by
default. It is expected to be formatted as follows:

otpsecrets:
  label-one: <secret>
  another-code: <secret>
  ...
holdoff: 5            # optional, seconds in [0, 30)
use_clipboard: true   # optional
generator: builtin    # optional, builtin or oathtool";

#[derive(Debug, Parser)]
#[command(name = "otp", version, about = "Print TOTP codes for labelled secrets", long_about = LONG_ABOUT)]
pub struct Args {
    /// The label to look up
    pub label: Option<String>,

    /// List available labels
    #[arg(short, long)]
    pub list_labels: bool,

    /// List suitable for tab completion
    #[arg(short, long)]
    pub tab_complete: bool,

    /// Disable the holdoff feature
    #[arg(short, long)]
    pub force: bool,

    /// Secrets YAML file [default: ~/.otp-secrets.yaml]
    #[arg(short, long, value_name = "PATH", env = "OTP_SECRETS_FILE")]
    pub secrets_file: Option<PathBuf>,

    /// Don't print the time remaining for the current code
    #[arg(short, long)]
    pub minimalist: bool,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListLabels,
    TabComplete,
    Lookup(String),
}

impl Args {
    /// Checks that exactly one mode was asked for.
    pub fn mode(&self) -> Result<Mode, clap::Error> {
        match (&self.label, self.list_labels, self.tab_complete) {
            (None, false, false) => Err(usage_error(
                ErrorKind::MissingRequiredArgument,
                "You need to provide a label to look up when not using --list-labels or --tab-complete",
            )),
            (_, true, true) => Err(usage_error(
                ErrorKind::ArgumentConflict,
                "--list-labels and --tab-complete are mutually exclusive",
            )),
            (Some(_), true, false) | (Some(_), false, true) => Err(usage_error(
                ErrorKind::ArgumentConflict,
                "a label cannot be combined with --list-labels or --tab-complete",
            )),
            (None, true, false) => Ok(Mode::ListLabels),
            (None, false, true) => Ok(Mode::TabComplete),
            (Some(label), false, false) => Ok(Mode::Lookup(label.clone())),
        }
    }

    pub fn secrets_file(&self) -> PathBuf {
        self.secrets_file
            .clone()
            .unwrap_or_else(config::default_config_path)
    }
}

fn usage_error(kind: ErrorKind, message: &str) -> clap::Error {
    Args::command().error(kind, message)
}

/// Everything a mode needs, borrowed for the length of one invocation.
pub struct Session<'a> {
    pub config: &'a Config,
    pub clock: &'a dyn Clock,
    pub generator: &'a dyn CodeGenerator,
    /// Set only when the code should also land on the clipboard.
    pub clipboard: Option<&'a dyn Clipboard>,
}

impl Session<'_> {
    pub fn dispatch(
        &self,
        mode: &Mode,
        args: &Args,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), Error> {
        match mode {
            Mode::ListLabels => self.print_labels(ListingStyle::Lines, out),
            Mode::TabComplete => self.print_labels(ListingStyle::TabComplete, out),
            Mode::Lookup(label) => self.print_code(label, args, out, err),
        }
    }

    fn print_labels(&self, style: ListingStyle, out: &mut dyn Write) -> Result<(), Error> {
        let listing = labels::format_listing(&labels::list(self.config), style);
        writeln!(out, "{listing}")?;

        Ok(())
    }

    fn print_code(
        &self,
        label: &str,
        args: &Args,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), Error> {
        let Some(secret) = labels::resolve(self.config, label) else {
            writeln!(out, "{}", labels::not_found_message(label))?;
            return Ok(());
        };

        let mut scheduler = HoldoffScheduler::new(self.config.holdoff());
        scheduler.with_force(args.force);
        scheduler.wait(self.clock, err)?;

        let now = self.clock.now();
        let code = self.generator.generate(secret, now)?;

        let mut emitter = CodeEmitter::new(args.minimalist);
        if let Some(clipboard) = self.clipboard {
            emitter.with_clipboard(clipboard);
        }
        emitter.emit(out, &code, remaining_seconds(now, scheduler.interval()))?;

        Ok(())
    }
}

/// Codes go to the clipboard only when printed to a terminal and the secrets
/// file does not turn `use_clipboard` off.
pub fn wants_clipboard(config: &Config, interactive: bool) -> bool {
    interactive && config.use_clipboard()
}

/// Loads the secrets file and runs `mode` against it with the real clock,
/// generator and clipboard. `interactive` tells whether `out` is a terminal.
pub fn run(
    args: &Args,
    mode: &Mode,
    out: &mut dyn Write,
    err: &mut dyn Write,
    interactive: bool,
) -> Result<(), Error> {
    let config = Config::load(&args.secrets_file())?;
    let generator = config.generator().build();
    let clipboard = ClipboardProgram::detect();

    let session = Session {
        config: &config,
        clock: &SystemClock,
        generator: generator.as_ref(),
        clipboard: wants_clipboard(&config, interactive).then_some(&clipboard as &dyn Clipboard),
    };

    session.dispatch(mode, args, out, err)
}

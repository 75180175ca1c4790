use std::process::Command;

use serde::Deserialize;

use crate::{totp::Totp, OtpCode, OtpError};

const OATHTOOL_PROGRAM: &str = "oathtool";

/// Turns a shared secret into the code for a given instant.
pub trait CodeGenerator {
    fn generate(&self, secret: &str, seconds_since_epoch: u64) -> Result<OtpCode, OtpError>;
}

/// Which [`CodeGenerator`] the secrets file asks for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    #[default]
    Builtin,
    Oathtool,
}

impl GeneratorKind {
    pub fn build(self) -> Box<dyn CodeGenerator> {
        match self {
            Self::Builtin => Box::new(Builtin),
            Self::Oathtool => Box::new(Oathtool::default()),
        }
    }
}

/// RFC 6238 in process. Secrets may be base32 strings or `otpauth://totp/` URIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Builtin;

impl CodeGenerator for Builtin {
    fn generate(&self, secret: &str, seconds_since_epoch: u64) -> Result<OtpCode, OtpError> {
        Totp::from_secret(secret)?.generate(seconds_since_epoch)
    }
}

/// Runs `oathtool -b --totp <secret>`.
///
/// `otpauth://` URIs are reduced to their base32 secret first. oathtool reads
/// the clock itself, so the instant handed to [`CodeGenerator::generate`] is
/// ignored.
#[derive(Debug, Clone)]
pub struct Oathtool {
    program: String,
}

impl Default for Oathtool {
    fn default() -> Self {
        Self {
            program: OATHTOOL_PROGRAM.to_string(),
        }
    }
}

impl Oathtool {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CodeGenerator for Oathtool {
    fn generate(&self, secret: &str, _seconds_since_epoch: u64) -> Result<OtpCode, OtpError> {
        let totp = Totp::from_secret(secret)?;

        let output = Command::new(&self.program)
            .args(["-b", "--totp", totp.secret.as_str()])
            .output()
            .map_err(|e| OtpError::GeneratorSpawn(self.program.clone(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OtpError::GeneratorFailed(
                self.program.clone(),
                output.status,
                stderr,
            ));
        }

        String::from_utf8_lossy(&output.stdout).parse()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn builtin_matches_rfc_vector() {
        let code = Builtin
            .generate("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", 1111111109)
            .unwrap();

        assert_eq!("081804", code.to_string());
    }

    #[rstest]
    fn builtin_reports_bad_secret() {
        assert!(matches!(
            Builtin.generate("1!", 0),
            Err(OtpError::SecretDecode(_))
        ));
    }

    #[rstest]
    #[case(GeneratorKind::Builtin)]
    fn kind_builds_generator(#[case] kind: GeneratorKind) {
        let generator = kind.build();

        assert!(generator
            .generate("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", 59)
            .is_ok());
    }

    #[rstest]
    fn missing_oathtool_is_spawn_error() {
        let generator = Oathtool::with_program("definitely-not-an-installed-oathtool");

        assert!(matches!(
            generator.generate("GEZDGNBV", 0),
            Err(OtpError::GeneratorSpawn(program, _)) if program == "definitely-not-an-installed-oathtool"
        ));
    }

    #[cfg(unix)]
    #[rstest]
    fn oathtool_failure_is_reported() {
        // `false` ignores its arguments and exits 1
        let generator = Oathtool::with_program("false");

        assert!(matches!(
            generator.generate("GEZDGNBV", 0),
            Err(OtpError::GeneratorFailed(_, _, _))
        ));
    }

    #[cfg(target_os = "linux")]
    #[rstest]
    fn oathtool_stderr_is_kept() {
        // GNU ls accepts `-b` but not `--totp`, and says so on stderr
        let generator = Oathtool::with_program("ls");

        let error = generator.generate("GEZDGNBV", 0).unwrap_err();

        assert!(
            matches!(&error, OtpError::GeneratorFailed(_, _, stderr) if stderr.contains("--totp")),
            "{error}"
        );
        assert!(error.to_string().contains("--totp"), "{error}");
    }

    #[cfg(unix)]
    #[rstest]
    fn oathtool_receives_base32_from_uri() {
        // `echo` prints back what oathtool would have been given
        let generator = Oathtool::with_program("echo");

        let result = generator.generate(
            "otpauth://totp/john?secret=GEZDGNBVGY3TQOJQ&issuer=ACME",
            0,
        );

        assert!(matches!(
            result,
            Err(OtpError::InvalidCode(output)) if output.trim() == "-b --totp GEZDGNBVGY3TQOJQ"
        ));
    }

    #[rstest]
    fn oathtool_rejects_unsupported_uri() {
        let generator = Oathtool::with_program("definitely-not-an-installed-oathtool");

        let result = generator.generate("otpauth://totp/john?secret=GEZDGNBV&period=10", 0);

        assert!(matches!(
            result,
            Err(OtpError::UnsupportedParameters { period: 10, .. })
        ));
    }

    #[cfg(unix)]
    #[rstest]
    fn oathtool_output_must_be_numeric() {
        // `echo` prints its arguments back: "-b --totp GEZDGNBV"
        let generator = Oathtool::with_program("echo");

        assert!(matches!(
            generator.generate("GEZDGNBV", 0),
            Err(OtpError::InvalidCode(_))
        ));
    }
}

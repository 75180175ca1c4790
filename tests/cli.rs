use std::path::PathBuf;

use clap::Parser;
use otp_secrets::{
    cli::{self, Args},
    config::ConfigError,
    Error,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test_config.yml")
}

fn execute(argv: &[&str]) -> Result<String, Error> {
    let fixture = fixture_path();
    let args = Args::try_parse_from(
        ["otp", "--secrets-file", fixture.to_str().unwrap()]
            .into_iter()
            .chain(argv.iter().copied()),
    )
    .unwrap();
    let mode = args.mode().unwrap();
    let mut out = Vec::new();

    cli::run(&args, &mode, &mut out, &mut Vec::new(), false)?;

    Ok(String::from_utf8(out).unwrap().trim().to_string())
}

fn split_code_line(line: &str) -> (&str, u64) {
    let (code, remaining) = line.split_once('\t').unwrap();
    let remaining = remaining
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix("sec)"))
        .unwrap()
        .parse()
        .unwrap();

    (code, remaining)
}

fn is_six_digits(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

#[rstest]
fn print_labels() {
    assert_eq!("bar\nfoo", execute(&["--list-labels"]).unwrap());
}

#[rstest]
fn shell_autocomplete() {
    assert_eq!("bar foo", execute(&["--tab-complete"]).unwrap());
}

#[rstest]
fn generate_code() {
    let output = execute(&["--force", "foo"]).unwrap();

    let (code, remaining) = split_code_line(&output);
    assert!(is_six_digits(code), "{output}");
    assert!((1..=30).contains(&remaining), "{output}");
}

#[rstest]
fn generate_code_without_time() {
    let output = execute(&["--force", "--minimalist", "foo"]).unwrap();

    assert!(is_six_digits(&output), "{output}");
}

#[rstest]
fn generate_code_with_holdoff() {
    // May sleep up to the default holdoff of 5 seconds. The clock is read
    // again after the decision, so a second may have passed in between.
    let output = execute(&["bar"]).unwrap();

    let (code, remaining) = split_code_line(&output);
    assert!(is_six_digits(code), "{output}");
    assert!(remaining >= 4, "{output}");
}

#[rstest]
fn unknown_label() {
    assert_eq!(
        "Couldn't find label 'baz' in the yaml. (Try the -l switch?)",
        execute(&["baz"]).unwrap()
    );
}

#[rstest]
fn missing_secrets_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let args = Args::try_parse_from(["otp", "-s", path.to_str().unwrap(), "-l"]).unwrap();
    let mode = args.mode().unwrap();

    let error = cli::run(&args, &mode, &mut Vec::new(), &mut Vec::new(), false).unwrap_err();

    assert!(matches!(error, Error::Config(ConfigError::NotFound(_))));
}

#[rstest]
fn unparseable_secrets_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "otpsecrets: [foo\n").unwrap();
    let args = Args::try_parse_from(["otp", "-s", path.to_str().unwrap(), "-t"]).unwrap();
    let mode = args.mode().unwrap();

    let error = cli::run(&args, &mode, &mut Vec::new(), &mut Vec::new(), false).unwrap_err();

    assert!(matches!(error, Error::Config(ConfigError::Parse(_))));
    assert!(error.to_string().starts_with("Problem parsing YAML"));
}

// tests/config.rs

use std::fs;
use std::io::Write;
use std::time::Duration;

use htmlsplice::build::SinkTarget;
use htmlsplice::config::{
    load_and_validate, resolve_settings, ConfigFile, DEFAULT_PORT, DEFAULT_RELOAD_PATH,
};
use htmlsplice::errors::SpliceError;
use htmlsplice::types::SecondViewerPolicy;
use htmlsplice_test_utils::builders::{cli_args, ConfigFileBuilder};
use tempfile::{tempdir, NamedTempFile};

#[test]
fn full_config_file_parses() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[build]
input = "web"
outfile = "dist/index.html"

[watch]
ignore = "^\\.#"
shutdown_grace_ms = 250

[serve]
port = 9000
reload_path = "/live"
on_second_viewer = "reject"
open = true
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.build.input.as_deref(), Some(std::path::Path::new("web")));
    assert_eq!(cfg.watch.ignore.as_deref(), Some(r"^\.#"));
    assert_eq!(cfg.watch.shutdown_grace_ms, 250);
    assert_eq!(cfg.serve.port, 9000);
    assert_eq!(cfg.serve.reload_path, "/live");
    assert_eq!(cfg.serve.on_second_viewer, SecondViewerPolicy::Reject);
    assert!(cfg.serve.open);
}

#[test]
fn empty_config_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.serve.port, DEFAULT_PORT);
    assert_eq!(cfg.serve.reload_path, DEFAULT_RELOAD_PATH);
    assert_eq!(cfg.serve.on_second_viewer, SecondViewerPolicy::Replace);
}

#[test]
fn unknown_keys_are_toml_errors() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[serve]\nprot = 1\n").unwrap();
    assert!(matches!(
        load_and_validate(file.path()),
        Err(SpliceError::TomlError(_))
    ));
}

#[test]
fn bad_reload_path_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[serve]\nreload_path = \"hotreload\"\n").unwrap();
    match load_and_validate(file.path()) {
        Err(SpliceError::ConfigError(msg)) => assert!(msg.contains("reload path"), "{msg}"),
        other => panic!("unexpected: {other:?}"),
    }

    let raw = ConfigFileBuilder::new().reload_path("/").raw();
    assert!(ConfigFile::try_from(raw).is_err());
}

#[test]
fn zero_grace_is_rejected() {
    let raw = ConfigFileBuilder::new().shutdown_grace_ms(0).raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(SpliceError::ConfigError(_))
    ));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("absent.toml")),
        Err(SpliceError::IoError(_))
    ));
}

#[test]
fn command_line_overrides_config_file() {
    let dir = tempdir().unwrap();
    let from_file = dir.path().join("file_input");
    let from_cli = dir.path().join("cli_input");
    fs::create_dir_all(&from_file).unwrap();
    fs::create_dir_all(&from_cli).unwrap();

    let cfg = ConfigFileBuilder::new()
        .input(&from_file)
        .port(9000)
        .ignore("from-file")
        .shutdown_grace_ms(100)
        .build();
    let args = cli_args([
        from_cli.to_str().unwrap(),
        "--port",
        "7000",
        "--on-second-viewer",
        "reject",
        "-w",
    ]);

    let settings = resolve_settings(&args, cfg).unwrap();
    assert_eq!(settings.input_dir, from_cli);
    assert_eq!(settings.serve.port, 7000);
    assert_eq!(settings.serve.policy, SecondViewerPolicy::Reject);
    assert_eq!(settings.ignore.as_deref(), Some("from-file"));
    assert_eq!(settings.shutdown_grace, Duration::from_millis(100));
    assert_eq!(settings.sink, SinkTarget::Stdout);
    assert!(settings.watch);
    assert!(!settings.serving_enabled(), "no outfile means no server");
}

#[test]
fn serving_needs_watch_outfile_and_port() {
    let dir = tempdir().unwrap();
    let input = dir.path().to_str().unwrap().to_string();
    let out = dir.path().join("out.html");
    let out = out.to_str().unwrap();

    let s = resolve_settings(&cli_args([input.as_str(), "-o", out, "-w"]), ConfigFile::default())
        .unwrap();
    assert!(s.serving_enabled());
    assert_eq!(s.serve.port, DEFAULT_PORT);

    let s = resolve_settings(
        &cli_args([input.as_str(), "-o", out, "-w", "--port", "0"]),
        ConfigFile::default(),
    )
    .unwrap();
    assert!(!s.serving_enabled());

    let s = resolve_settings(&cli_args([input.as_str(), "-o", out]), ConfigFile::default())
        .unwrap();
    assert!(!s.serving_enabled());
}

#[test]
fn missing_input_is_a_config_error() {
    let args = cli_args(Vec::<String>::new());
    match resolve_settings(&args, ConfigFile::default()) {
        Err(SpliceError::ConfigError(msg)) => assert!(msg.contains("no input directory")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn input_must_be_an_existing_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let absent = dir.path().join("absent");
    let err = resolve_settings(&cli_args([absent.to_str().unwrap()]), ConfigFile::default())
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");

    let err = resolve_settings(&cli_args([file.to_str().unwrap()]), ConfigFile::default())
        .unwrap_err();
    assert!(err.to_string().contains("is not a directory"), "{err}");
}

#[test]
fn outfile_naming_a_directory_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().to_str().unwrap();
    let trailing = format!("{}/out/", input);

    let err = resolve_settings(&cli_args([input, "-o", trailing.as_str()]), ConfigFile::default())
        .unwrap_err();
    assert!(err.to_string().contains("is a directory path"), "{err}");

    let err = resolve_settings(&cli_args([input, "-o", input]), ConfigFile::default())
        .unwrap_err();
    assert!(err.to_string().contains("is a directory path"), "{err}");
}

#[test]
fn invalid_ignore_pattern_is_accepted_at_load() {
    let raw = ConfigFileBuilder::new().ignore("(unclosed").raw();
    assert!(ConfigFile::try_from(raw).is_ok());
}

#[test]
fn second_viewer_policy_defaults_to_replace_and_parses_loosely() {
    assert_eq!(SecondViewerPolicy::default(), SecondViewerPolicy::Replace);
    assert_eq!(" Reject ".parse::<SecondViewerPolicy>(), Ok(SecondViewerPolicy::Reject));
    assert!("kick".parse::<SecondViewerPolicy>().is_err());
}

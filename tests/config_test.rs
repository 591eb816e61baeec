use clap::Parser;
use crashdrop::cli::Cli;
use crashdrop::config::{ini_parser::IniConfig, Config};
use crashdrop::multipart::parser::parse_body;
use crashdrop::run_with_config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_ini_parser_report_file() {
    let ini_content = r#"
# Collector used by the nightly builds
[collector]
url = http://crash.example.com:8080/submit

[auth]
username = reporter

[parameters]
prod = MyApp
ver = 1.0.3
build = nightly#1042   # inline comment
"#;

    let ini = IniConfig::parse(ini_content).expect("Failed to parse INI");

    assert_eq!(
        ini.get_string("collector", "url"),
        Some("http://crash.example.com:8080/submit".to_string())
    );
    assert_eq!(ini.get_string("auth", "username"), Some("reporter".to_string()));
    assert_eq!(ini.get_string("auth", "password"), None);

    let params = ini.section_entries("parameters");
    assert_eq!(
        params,
        vec![
            ("build".to_string(), "nightly#1042".to_string()),
            ("prod".to_string(), "MyApp".to_string()),
            ("ver".to_string(), "1.0.3".to_string()),
        ]
    );
}

#[test]
fn test_config_precedence_cli_highest() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("test.ini");

    fs::write(
        &config_file,
        r#"
[collector]
url = http://ini.example.com/submit

[parameters]
prod = MyApp
ver = 1.0

[logging]
verbose = false
detailed = true
"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "crashdrop",
        "--url",
        "http://cli.example.com/submit",
        "--dump",
        "crash.dmp",
        "-p",
        "ver=2.0",
        "--verbose",
        "--config-file",
        config_file.to_str().unwrap(),
    ])
    .expect("Failed to parse arguments");

    let config = Config::load(&cli).expect("Failed to load config");

    assert_eq!(config.url.as_deref(), Some("http://cli.example.com/submit"));
    assert_eq!(config.parameters.get("prod"), Some("MyApp"));
    assert_eq!(config.parameters.get("ver"), Some("2.0"));
    assert!(config.verbose);
    assert!(config.detailed_logging);
    assert_eq!(config.log_level(), "debug");
}

#[test]
fn test_dry_run_writes_body() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("crash.dmp");
    let output = temp_dir.path().join("body.bin");
    fs::write(&dump, b"MDMP\x00\x01").unwrap();

    let cli = Cli::try_parse_from([
        "crashdrop",
        "--dump",
        dump.to_str().unwrap(),
        "-p",
        "prod=MyApp",
        "--dry-run",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    cli.validate().unwrap();

    let config = Config::from_sources(&IniConfig::new(), &cli).unwrap();
    run_with_config(&config).unwrap();

    let body = fs::read(&output).unwrap();
    // The body starts with "--<boundary>\r\n"
    let first_line_end = body.windows(2).position(|w| w == b"\r\n").unwrap();
    let boundary = std::str::from_utf8(&body[2..first_line_end]).unwrap();

    let parts = parse_body(&body, boundary).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].text().unwrap(), "MyApp");
    assert_eq!(parts[1].data, b"MDMP\x00\x01");
}

#[test]
fn test_dry_run_refuses_invalid_parameters() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("crash.dmp");
    let output = temp_dir.path().join("body.bin");
    fs::write(&dump, b"MDMP").unwrap();

    let cli = Cli::try_parse_from([
        "crashdrop",
        "--dump",
        dump.to_str().unwrap(),
        "-p",
        "say \"hi\"=x",
        "--dry-run",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let config = Config::from_sources(&IniConfig::new(), &cli).unwrap();
    let err = run_with_config(&config).unwrap_err();
    assert!(err.is_validation_error());
    assert!(!output.exists());
}

#[test]
fn test_password_only_config_file_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("auth.ini");
    fs::write(
        &config_file,
        "[collector]\nurl = http://127.0.0.1:9/submit\n\n[auth]\npassword = hunter2\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "crashdrop",
        "--dump",
        "crash.dmp",
        "--config-file",
        config_file.to_str().unwrap(),
    ])
    .unwrap();

    let err = Config::load(&cli).unwrap_err();
    assert!(err.contains("without a username"));
}

//! Configuration management for crashdrop
//! Supports INI files with CLI argument overrides

pub mod ini_parser;

use crate::cli::Cli;
use crate::report::ReportParameters;
use ini_parser::IniConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    // Collector settings
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    // Report contents
    pub dump: PathBuf,
    pub parameters: ReportParameters,

    // Dry run settings
    pub dry_run: bool,
    pub output: Option<PathBuf>,

    // Logging settings
    pub verbose: bool,
    pub detailed_logging: bool,
}

impl Config {
    /// Load configuration with precedence: CLI args > INI file > Defaults
    pub fn load(cli: &Cli) -> Result<Self, String> {
        let ini = match Self::find_config_file(cli)? {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                IniConfig::load_file(&path)?
            }
            None => {
                log::info!("No configuration file found, using defaults and CLI overrides");
                IniConfig::new()
            }
        };
        Self::from_sources(&ini, cli)
    }

    /// Combine an already parsed INI file with the command line
    pub fn from_sources(ini: &IniConfig, cli: &Cli) -> Result<Self, String> {
        let config = Self {
            url: Self::get_url(ini, cli),
            username: Self::get_username(ini, cli),
            password: Self::get_password(ini, cli),

            dump: cli.dump.clone(),
            parameters: Self::get_parameters(ini, cli),

            dry_run: cli.dry_run,
            output: cli.output.clone(),

            verbose: Self::get_verbose(ini, cli),
            detailed_logging: Self::get_detailed_logging(ini, cli),
        };

        if config.url.is_none() && !config.dry_run {
            return Err(
                "No collector URL given: pass --url or set url in the [collector] section"
                    .to_string(),
            );
        }

        // Basic auth needs the username; a lone password would never be sent
        if config.password.is_some() && config.username.is_none() {
            return Err("Password configured without a username: \
                 set --username or username in the [auth] section"
                .to_string());
        }

        Ok(config)
    }

    /// Find configuration file in order of preference
    fn find_config_file(cli: &Cli) -> Result<Option<PathBuf>, String> {
        // 1. Explicit --config-file
        if let Some(ref config_path) = cli.config_file {
            let path = PathBuf::from(config_path);
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(format!(
                    "Config file specified but not found: {config_path}"
                ));
            }
        }

        // 2. Current directory
        for candidate in ["crashdrop.ini", "crashdrop.conf"] {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 3. User config directory (~/.config/crashdrop/config.ini)
        if let Some(home_dir) = std::env::var_os("HOME") {
            let user_config = Path::new(&home_dir)
                .join(".config")
                .join("crashdrop")
                .join("config.ini");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // 4. System config (Unix-like systems)
        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/crashdrop/config.ini");
            if system_config.exists() {
                return Ok(Some(system_config));
            }
        }

        Ok(None)
    }

    // Configuration value getters with precedence: CLI > INI > Default

    fn get_url(ini: &IniConfig, cli: &Cli) -> Option<String> {
        cli.url
            .clone()
            .or_else(|| ini.get_string("collector", "url"))
    }

    fn get_username(ini: &IniConfig, cli: &Cli) -> Option<String> {
        cli.username
            .clone()
            .or_else(|| ini.get_string("auth", "username"))
    }

    fn get_password(ini: &IniConfig, cli: &Cli) -> Option<String> {
        cli.password
            .clone()
            .or_else(|| ini.get_string("auth", "password"))
    }

    fn get_parameters(ini: &IniConfig, cli: &Cli) -> ReportParameters {
        let mut parameters: ReportParameters =
            ini.section_entries("parameters").into_iter().collect();
        let overrides: ReportParameters = cli.params.iter().cloned().collect();
        parameters.merge(&overrides);
        parameters
    }

    fn get_verbose(ini: &IniConfig, cli: &Cli) -> bool {
        cli.verbose || ini.get_bool_or("logging", "verbose", false)
    }

    fn get_detailed_logging(ini: &IniConfig, cli: &Cli) -> bool {
        cli.detailed_logging || ini.get_bool_or("logging", "detailed", false)
    }

    /// Log level implied by the logging flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.detailed_logging {
            "info"
        } else {
            "warn"
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Configuration Summary:");
        log::info!(
            "  Collector: {}",
            self.url.as_deref().unwrap_or("(none, dry run)")
        );
        log::info!("  Minidump: {}", self.dump.display());
        log::info!("  Parameters: {}", self.parameters.len());
        for (name, value) in self.parameters.iter() {
            log::info!("    {name} = {value}");
        }
        log::info!(
            "  Authentication: {}",
            if self.username.is_some() {
                "Enabled"
            } else {
                "Disabled"
            }
        );
        log::info!("  Dry Run: {}", self.dry_run);
        if let Some(ref output) = self.output {
            log::info!("  Output: {}", output.display());
        }
        log::info!("  Verbose Logging: {}", self.verbose);
        log::info!("  Detailed Logging: {}", self.detailed_logging);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_cli(dump: PathBuf) -> Cli {
        Cli {
            url: None,
            dump,
            params: Vec::new(),
            username: None,
            password: None,
            verbose: false,
            detailed_logging: false,
            dry_run: false,
            output: None,
            config_file: None,
        }
    }

    #[test]
    fn test_config_from_ini_only() {
        let ini = IniConfig::parse(
            r#"
[collector]
url = http://crash.example.com/submit

[auth]
username = reporter
password = hunter2

[parameters]
prod = MyApp
ver = 1.0

[logging]
verbose = true
"#,
        )
        .unwrap();

        let cli = create_test_cli(PathBuf::from("crash.dmp"));
        let config = Config::from_sources(&ini, &cli).unwrap();

        assert_eq!(config.url.as_deref(), Some("http://crash.example.com/submit"));
        assert_eq!(config.username.as_deref(), Some("reporter"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.parameters.get("prod"), Some("MyApp"));
        assert_eq!(config.parameters.get("ver"), Some("1.0"));
        assert!(config.verbose);
        assert!(!config.detailed_logging);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_cli_overrides_ini() {
        let ini = IniConfig::parse(
            r#"
[collector]
url = http://ini.example.com/submit

[parameters]
prod = MyApp
ver = 1.0
"#,
        )
        .unwrap();

        let mut cli = create_test_cli(PathBuf::from("crash.dmp"));
        cli.url = Some("http://cli.example.com/submit".to_string());
        cli.params = vec![
            ("ver".to_string(), "2.0".to_string()),
            ("channel".to_string(), "beta".to_string()),
        ];
        cli.detailed_logging = true;

        let config = Config::from_sources(&ini, &cli).unwrap();
        assert_eq!(config.url.as_deref(), Some("http://cli.example.com/submit"));
        assert_eq!(config.parameters.get("prod"), Some("MyApp"));
        assert_eq!(config.parameters.get("ver"), Some("2.0"));
        assert_eq!(config.parameters.get("channel"), Some("beta"));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_url_required_unless_dry_run() {
        let ini = IniConfig::new();
        let mut cli = create_test_cli(PathBuf::from("crash.dmp"));

        let result = Config::from_sources(&ini, &cli);
        assert!(result.unwrap_err().contains("No collector URL"));

        cli.dry_run = true;
        let config = Config::from_sources(&ini, &cli).unwrap();
        assert_eq!(config.url, None);
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_password_without_username_is_rejected() {
        let ini = IniConfig::parse(
            r#"
[collector]
url = http://crash.example.com/submit

[auth]
password = hunter2
"#,
        )
        .unwrap();
        let cli = create_test_cli(PathBuf::from("crash.dmp"));

        let err = Config::from_sources(&ini, &cli).unwrap_err();
        assert!(err.contains("Password configured without a username"));

        // A username from either source completes the pair
        let mut cli = create_test_cli(PathBuf::from("crash.dmp"));
        cli.username = Some("reporter".to_string());
        let config = Config::from_sources(&ini, &cli).unwrap();
        assert_eq!(config.username.as_deref(), Some("reporter"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));

        let ini = IniConfig::parse("[auth]\nusername = reporter\n").unwrap();
        let mut cli = create_test_cli(PathBuf::from("crash.dmp"));
        cli.password = Some("hunter2".to_string());
        cli.dry_run = true;
        let config = Config::from_sources(&ini, &cli).unwrap();
        assert_eq!(config.username.as_deref(), Some("reporter"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_config_load_with_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("test.ini");
        fs::write(
            &config_file,
            "[collector]\nurl = http://127.0.0.1:9000/\n[parameters]\nprod = FromFile\n",
        )
        .unwrap();

        let mut cli = create_test_cli(temp_dir.path().join("crash.dmp"));
        cli.config_file = Some(config_file.to_string_lossy().to_string());

        let config = Config::load(&cli).unwrap();
        assert_eq!(config.url.as_deref(), Some("http://127.0.0.1:9000/"));
        assert_eq!(config.parameters.get("prod"), Some("FromFile"));
    }

    #[test]
    fn test_config_file_discovery_nonexistent() {
        let mut cli = create_test_cli(PathBuf::from("crash.dmp"));
        cli.config_file = Some("/nonexistent/path.ini".to_string());

        let result = Config::load(&cli);
        assert!(result
            .unwrap_err()
            .contains("Config file specified but not found"));
    }

    #[test]
    fn test_config_print_summary() {
        let mut cli = create_test_cli(PathBuf::from("crash.dmp"));
        cli.dry_run = true;
        cli.params = vec![("prod".to_string(), "MyApp".to_string())];
        let config = Config::from_sources(&IniConfig::new(), &cli).unwrap();

        // This should not panic
        config.print_summary();
    }
}

use super::Host;
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `devgate.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let base_dir = Utf8PathBuf::from(".");
    let config_path = args.config.as_ref();

    match Config::load(&base_dir, config_path) {
        Ok(_) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file found)");
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};

    fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn validate(path: Utf8PathBuf) -> (TestHost, Result<()>) {
        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(path) });
        (host, result)
    }

    #[test]
    fn test_generated_config_is_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("devgate.toml")).unwrap();

        let mut init_host = TestHost::new();
        init_config(&mut init_host, &InitArgs { output: Some(config_path.clone()) }).unwrap();
        assert!(init_host.output_text().contains("Generated default configuration file"));

        let (host, result) = validate(config_path);
        assert!(result.is_ok(), "default configuration should validate: {result:?}");
        assert!(host.output_text().starts_with("Configuration file is valid\nConfig file: "));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    fn test_invalid_toml_syntax() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(&temp_dir, "invalid.toml", "per_page = [\n");

        let (host, result) = validate(path);
        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    fn test_unknown_field() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(&temp_dir, "unknown.toml", "unknown_field = \"value\"\n");

        let (_, result) = validate(path);
        assert!(result.is_err(), "unknown field should fail validation");
    }

    #[test]
    fn test_invalid_duration_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(&temp_dir, "duration.toml", "cache_max_age = \"not a valid duration\"\n");

        let (_, result) = validate(path);
        assert!(result.is_err(), "invalid duration should fail validation");
    }

    #[test]
    fn test_out_of_range_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(&temp_dir, "range.toml", "per_page = 500\n");

        let (host, result) = validate(path);
        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(&temp_dir, "empty.toml", "# Empty config file\n");

        let (_, result) = validate(path);
        assert!(result.is_ok(), "empty config should be valid (uses defaults)");
    }

    #[test]
    fn test_partial_config_is_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(&temp_dir, "partial.toml", "cache_max_age = \"1h\"\nmax_retries = 0\n");

        let (_, result) = validate(path);
        assert!(result.is_ok());
    }
}

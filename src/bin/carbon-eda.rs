use carbon_eda::config::{CliConfig, Config};
use carbon_eda::core::constants::output_formats;
use carbon_eda::pipeline;
use carbon_eda::reporting::logging;
use carbon_eda::ui::{Cli, Commands, ProgressReporter, cli_to_config, display_outcome};

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    match run_carbon_eda_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Main logic extracted from main() for testing
pub async fn run_carbon_eda_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli)?;

    // Load and merge configuration
    let config = load_and_merge_config(&cli_config)?;

    // Setup logging and output settings
    let output_settings = setup_output_settings(&cli_config, &config);
    logging::init_logger(output_settings.verbose, output_settings.quiet);
    logging::log_config_info(&config);

    let mut progress = create_progress_reporter(&output_settings);

    let outcome = match cli.command {
        Some(Commands::Generate) => pipeline::generate(&config, &mut progress).await,
        None => pipeline::run(&config, &mut progress).await,
    }
    .inspect_err(|e| {
        progress.finish_and_clear();
        logging::log_error("Run failed", Some(e));
    })?;

    display_outcome(
        &outcome,
        &output_settings.output_format,
        output_settings.quiet,
    )?;
    Ok(0)
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations().inspect_err(|e| {
            logging::log_error("Could not load config file", Some(e));
        })?
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Settings for output formatting and display
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub output_format: String,
    pub show_progress: bool,
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let verbose = config.verbose.unwrap_or(false);
    let output_format = config.output_format().to_string();
    let show_progress =
        !quiet && !cli_config.no_progress && output_format == output_formats::TEXT;

    OutputSettings {
        quiet,
        verbose,
        output_format,
        show_progress,
    }
}

pub fn create_progress_reporter(output_settings: &OutputSettings) -> ProgressReporter {
    ProgressReporter::new(output_settings.show_progress)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use std::io::Write;

    fn cli_config() -> CliConfig {
        CliConfig {
            no_config: true,
            ..CliConfig::default()
        }
    }

    #[test]
    fn test_load_and_merge_config_no_config_flag() -> Result<(), Box<dyn std::error::Error>> {
        let mut cli = cli_config();
        cli.record_count = Some(77);
        let config = load_and_merge_config(&cli)?;
        assert_eq!(config.record_count, Some(77));
        Ok(())
    }

    #[test]
    fn test_load_and_merge_config_with_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"record_count = 50\nclusters = 2\n")?;

        let cli = CliConfig {
            config_file: Some(file.path().display().to_string()),
            clusters: Some(4),
            ..CliConfig::default()
        };
        let config = load_and_merge_config(&cli)?;
        assert_eq!(config.record_count, Some(50));
        // CLI takes precedence
        assert_eq!(config.clusters, Some(4));
        Ok(())
    }

    #[test]
    fn test_load_and_merge_config_invalid_merged_value() {
        let mut cli = cli_config();
        cli.record_count = Some(0);
        assert!(load_and_merge_config(&cli).is_err());
    }

    #[test]
    fn test_setup_output_settings() {
        let config = Config::default();
        let settings = setup_output_settings(&cli_config(), &config);
        assert!(!settings.quiet);
        assert!(settings.show_progress);
        assert_eq!(settings.output_format, output_formats::TEXT);

        let quiet = CliConfig {
            quiet: true,
            ..cli_config()
        };
        assert!(!setup_output_settings(&quiet, &config).show_progress);

        let json = Config {
            output_format: Some(output_formats::JSON.to_string()),
            ..Config::default()
        };
        let settings = setup_output_settings(&cli_config(), &json);
        assert!(!settings.show_progress);
        assert!(!create_progress_reporter(&settings).is_enabled());
    }
}

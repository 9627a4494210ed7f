mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::config::log_filter_from_env;
use triage_core::prompt::format_facts_for_listing;
use triage_core::validation::parse_prompt_variant;
use triage_core::{DiagnosisAnalyzer, TriageConfig, TriageError};

use crate::output::{format_json, format_text, resolve_save_target, save, OutputFormat};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Symptom triage assistant CLI")]
#[command(after_help = "Examples:
  triage \"I have a headache and feel nauseous\"
  triage \"Chest pain and shortness of breath\" --lifestyle
  triage \"Fever and sore throat\" --save json
  triage \"Fatigue and dizziness\" --prompt role")]
struct Cli {
    /// Describe your symptoms (enclose in quotes if multiple words)
    symptoms: String,
    /// Provide detailed explanation (always enabled)
    #[arg(long)]
    details: bool,
    /// Include lifestyle and wellness suggestions
    #[arg(long)]
    lifestyle: bool,
    /// Save output to file ('json', 'txt', or a file path)
    #[arg(long)]
    save: Option<String>,
    /// Prompting strategy
    #[arg(long, default_value = "zero", value_parser = ["zero", "few", "chain", "role"])]
    prompt: String,
    /// Skip medical disclaimer (not recommended)
    #[arg(long)]
    no_disclaimer: bool,
    /// Print the medical facts retrieved for the symptoms before the analysis
    #[arg(long)]
    show_facts: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // stdout carries the report; logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_new(log_filter_from_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.symptoms.trim().is_empty() {
        return Err(TriageError::Validation("Please provide symptoms to analyze.".into()).into());
    }
    let variant = parse_prompt_variant(&cli.prompt)?;
    if cli.details {
        tracing::debug!("--details requested; detailed output is always enabled");
    }

    let config = TriageConfig::from_env()?;
    let analyzer = DiagnosisAnalyzer::from_config(&config)?;

    if cli.show_facts {
        let facts = analyzer.retriever().retrieve(&cli.symptoms)?;
        println!("{}", format_facts_for_listing(&facts));
    }

    let preview: String = cli.symptoms.chars().take(50).collect();
    tracing::info!("Analyzing symptoms: {}...", preview);

    let report = analyzer
        .analyze(&cli.symptoms, variant, cli.lifestyle)?
        .to_report();

    let target = cli
        .save
        .as_deref()
        .map(|arg| resolve_save_target(arg, &chrono::Local::now()));
    let format = target
        .as_ref()
        .map(|t| t.format)
        .unwrap_or(OutputFormat::Text);

    let rendered = match format {
        OutputFormat::Json => format_json(&report)?,
        OutputFormat::Text => format_text(&report, !cli.no_disclaimer),
    };
    println!("{rendered}");

    if let Some(target) = target {
        match save(&target.path, &rendered) {
            Ok(()) => println!("\n✅ Results saved to: {}", target.path.display()),
            Err(e) => {
                tracing::error!("Failed to save output: {}", e);
                println!("\n❌ Failed to save output: {e}");
            }
        }
    }

    Ok(())
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<TriageError>() {
        Some(TriageError::Validation(msg)) => {
            tracing::error!("Validation error: {}", msg);
            eprintln!("\n❌ Error: {msg}\n");
        }
        Some(TriageError::Configuration(msg)) => {
            tracing::error!("Configuration error: {}", msg);
            eprintln!("\n❌ Configuration Error: {msg}\n");
            eprintln!("Please set your GEMINI_API_KEY environment variable:");
            eprintln!("  Windows: set GEMINI_API_KEY=your_key_here");
            eprintln!("  Linux/Mac: export GEMINI_API_KEY=your_key_here");
        }
        Some(TriageError::Gateway { source, .. }) => {
            tracing::error!("API error: {}", source);
            eprintln!("\n❌ Service temporarily unavailable. Please try again later.");
            eprintln!("If the problem persists, check your API key and internet connection.\n");
        }
        _ => {
            tracing::error!("Unexpected error: {:#}", err);
            eprintln!("\n❌ An unexpected error occurred. Please check the logs for details.");
            eprintln!("Error: {err}\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "triage",
            "fever and sore throat",
            "--lifestyle",
            "--save",
            "json",
            "--prompt",
            "role",
            "--no-disclaimer",
        ])
        .unwrap();
        assert_eq!(cli.symptoms, "fever and sore throat");
        assert!(cli.lifestyle);
        assert_eq!(cli.save.as_deref(), Some("json"));
        assert_eq!(cli.prompt, "role");
        assert!(cli.no_disclaimer);
        assert!(!cli.show_facts);
    }

    #[test]
    fn test_unknown_prompt_is_rejected() {
        assert!(Cli::try_parse_from(["triage", "fever", "--prompt", "cot"]).is_err());
        let cli = Cli::try_parse_from(["triage", "fever"]).unwrap();
        assert_eq!(cli.prompt, "zero");
    }

    #[test]
    fn test_blank_symptoms_fail_validation_before_configuration() {
        let cli = Cli::try_parse_from(["triage", "   "]).unwrap();
        let err = run(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TriageError>(),
            Some(TriageError::Validation(_))
        ));
    }
}

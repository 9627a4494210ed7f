//! Rendering and saving of analysis reports.

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use triage_core::DiagnosisReport;

const RULE_WIDTH: usize = 70;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Pretty-printed JSON of the external representation.
pub fn format_json(report: &DiagnosisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Human-readable report.
pub fn format_text(report: &DiagnosisReport, show_disclaimer: bool) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = vec![
        heavy.clone(),
        "🏥 Symptom Triage - Analysis Results".into(),
        heavy.clone(),
        String::new(),
    ];

    if report.flagged {
        lines.push(format!(
            "⚠️  URGENCY LEVEL: {}",
            report.urgency_level.as_str().to_uppercase()
        ));
        lines.push(String::new());
    }

    if !report.possible_conditions.is_empty() {
        lines.push("📋 Possible Conditions:".into());
        lines.push(light.clone());
        for (i, cond) in report.possible_conditions.iter().enumerate() {
            lines.push(format!("\n{}. {}", i + 1, cond.condition));
            lines.push(format!("   Confidence: {}", cond.confidence));
            lines.push(format!("   Urgency: {}", cond.urgency));
            lines.push(format!("   Reasoning: {}", cond.reasoning));
            lines.push(format!("   Recommendation: {}", cond.recommendation));
            if !cond.related_symptoms.is_empty() {
                lines.push(format!(
                    "   Related Symptoms: {}",
                    cond.related_symptoms.join(", ")
                ));
            }
        }
        lines.push(String::new());
    }

    push_numbered(&mut lines, "📝 Recommended Next Steps:", &light, &report.next_steps);
    push_numbered(
        &mut lines,
        "💡 Lifestyle Suggestions:",
        &light,
        &report.lifestyle_suggestions,
    );

    if show_disclaimer && !report.disclaimer.is_empty() {
        lines.push("⚠️  Important Notice:".into());
        lines.push(light);
        lines.push(format!("   {}", report.disclaimer));
        lines.push(String::new());
    }

    lines.push(heavy);
    lines.join("\n")
}

fn push_numbered(lines: &mut Vec<String>, title: &str, rule: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(title.into());
    lines.push(rule.into());
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("   {}. {}", i + 1, item));
    }
    lines.push(String::new());
}

/// Where and how `--save` writes the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

/// Resolves a `--save` argument.
///
/// `json` and `txt` produce a timestamped `diagnosis_YYYYmmdd_HHMMSS` file in the current
/// directory. Anything else is a path; a `.json` extension selects JSON, otherwise text.
pub fn resolve_save_target<Tz: TimeZone>(arg: &str, now: &DateTime<Tz>) -> SaveTarget
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.format("%Y%m%d_%H%M%S");
    match arg.to_lowercase().as_str() {
        "json" => SaveTarget {
            path: PathBuf::from(format!("diagnosis_{stamp}.json")),
            format: OutputFormat::Json,
        },
        "txt" => SaveTarget {
            path: PathBuf::from(format!("diagnosis_{stamp}.txt")),
            format: OutputFormat::Text,
        },
        _ => {
            let path = PathBuf::from(arg);
            let format = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
                _ => OutputFormat::Text,
            };
            SaveTarget { path, format }
        }
    }
}

/// Writes `contents` to `path`, creating missing parent directories.
pub fn save(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

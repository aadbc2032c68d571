use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use rustc_hash::FxHashMap;
use rzls_conf::DiagnosticSeverity as SeverityOverride;
use rzls_conf::DiagnosticsConfig;
use rzls_tag_helpers::Checksum;
use rzls_tag_helpers::DiagnosticSeverity;
use rzls_tag_helpers::RazorDiagnostic;
use rzls_tag_helpers::TagHelperDescriptor;

use super::setup;
use super::Command;
use crate::args::Args;
use crate::catalog::read_catalog;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Check {
    /// Catalog files to check.
    #[arg(required = true)]
    paths: Vec<Utf8PathBuf>,

    /// Treat these diagnostic codes as errors (e.g. RZ3008,RZ3010).
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Ignore these diagnostic codes, or code prefixes (e.g. RZ30).
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,
}

impl Command for Check {
    async fn execute(&self, args: &Args) -> Result<Exit> {
        let (settings, _guard) = setup(args)?;
        let config = build_diagnostics_config(&settings.diagnostics, &self.select, &self.ignore);

        let mut error_count: usize = 0;
        let mut warning_count: usize = 0;
        for path in &self.paths {
            let descriptors = read_catalog(path)?;
            let findings = check_descriptors(&descriptors, &config);
            for finding in &findings {
                if !args.global.quiet {
                    println!("{path}: {finding}");
                }
                match finding.severity {
                    DiagnosticSeverity::Error => error_count += 1,
                    DiagnosticSeverity::Warning => warning_count += 1,
                }
            }
            tracing::info!(%path, descriptors = descriptors.len(), findings = findings.len(), "Checked catalog");
        }

        if error_count > 0 {
            let error_word = if error_count == 1 { "error" } else { "errors" };
            Ok(Exit::error().with_message(format!(
                "Found {error_count} {error_word} and {warning_count} warnings."
            )))
        } else {
            Ok(Exit::success())
        }
    }
}

/// One reported problem in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finding {
    pub descriptor: String,
    pub code: &'static str,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [{}]: {}",
            self.severity.as_str(),
            self.code,
            self.descriptor,
            self.message
        )
    }
}

/// Code reported for a catalog entry equal by value to an earlier one.
pub(crate) const DUPLICATE_DESCRIPTOR: &str = "RZ9001";

pub(crate) fn check_descriptors(
    descriptors: &[TagHelperDescriptor],
    config: &DiagnosticsConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: FxHashMap<Checksum, &str> = FxHashMap::default();

    for descriptor in descriptors {
        for diagnostic in descriptor.all_diagnostics() {
            if let Some(finding) = apply_override(descriptor, diagnostic, config) {
                findings.push(finding);
            }
        }

        if let Some(first) = seen.get(&descriptor.checksum()) {
            let duplicate = RazorDiagnostic::new(
                DUPLICATE_DESCRIPTOR,
                DiagnosticSeverity::Warning,
                format!("Duplicate of an earlier entry for '{first}'; it will be ignored."),
            );
            findings.extend(apply_override(descriptor, &duplicate, config));
        } else {
            seen.insert(descriptor.checksum(), descriptor.display_name());
        }
    }
    findings
}

fn apply_override(
    descriptor: &TagHelperDescriptor,
    diagnostic: &RazorDiagnostic,
    config: &DiagnosticsConfig,
) -> Option<Finding> {
    let severity = match config.severity_for(diagnostic.id()) {
        Some(SeverityOverride::Off) => return None,
        Some(SeverityOverride::Error) => DiagnosticSeverity::Error,
        Some(SeverityOverride::Warning | SeverityOverride::Info | SeverityOverride::Hint) => {
            DiagnosticSeverity::Warning
        }
        None => diagnostic.severity(),
    };
    Some(Finding {
        descriptor: descriptor.display_name().to_string(),
        code: diagnostic.id(),
        severity,
        message: diagnostic.message().to_string(),
    })
}

fn build_diagnostics_config(
    base: &DiagnosticsConfig,
    select: &[String],
    ignore: &[String],
) -> DiagnosticsConfig {
    let mut config = base.clone();
    for code in select {
        config.severity.insert(code.clone(), SeverityOverride::Error);
    }
    for code in ignore {
        config.severity.insert(code.clone(), SeverityOverride::Off);
    }
    config
}

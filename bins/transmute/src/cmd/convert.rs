use std::path::Path;

use transmute_engine::{Converter, ConverterConfig, Kind, KindReport};

use crate::config::{ConvertArgs, DEFAULT_CONFIG};
use crate::error::CliError;

pub async fn run(args: ConvertArgs) -> Result<(), CliError> {
    tracing::info!("transmute starting");

    // --- Load config ---
    let mut config = match &args.config {
        Some(path) => {
            let config = ConverterConfig::load(path)?;
            tracing::info!(config = %path, "loaded config");
            config
        }
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            let config = ConverterConfig::load(DEFAULT_CONFIG)?;
            tracing::info!(config = DEFAULT_CONFIG, "loaded config");
            config
        }
        None => {
            tracing::info!("no config file, using defaults");
            ConverterConfig::default()
        }
    };
    if let Some(source) = args.source {
        config.source_dir = source;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    let settings = config.into_settings();
    tracing::info!(
        source = %settings.source_dir.display(),
        output = %settings.output_dir.display(),
        "paths resolved"
    );

    // --- Convert ---
    let kinds = if args.kinds.is_empty() {
        Kind::ALL.to_vec()
    } else {
        args.kinds
    };
    let converter = Converter::new(settings)?;
    let results = if args.sync {
        converter.convert_all_sync(&kinds)
    } else {
        converter.convert_all(&kinds).await
    };

    let total = results.len();
    let mut reports = Vec::with_capacity(total);
    let mut failed = 0;
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(_) => failed += 1,
        }
    }

    // --- Report ---
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", summary(report));
        }
    }

    if failed > 0 {
        return Err(CliError::KindsFailed(failed, total));
    }
    Ok(())
}

fn summary(report: &KindReport) -> String {
    if report.skipped {
        return format!("{:<10} skipped (no input)", report.kind);
    }
    format!(
        "{:<10} {} files, {} entries, {} failed, {} ms",
        report.kind, report.files, report.entries, report.failed, report.elapsed_ms
    )
}

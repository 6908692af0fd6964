//! Recompile a source file on every change

use std::time::Duration;

use alchemy_runtime::{CompileReport, CompileService};
use anyhow::Result;

use super::{format_diagnostic, load_compiler};

/// Run the watch command until Ctrl+C
pub async fn run(config_path: &str, file: &str, interval_ms: u64) -> Result<()> {
    let compiler = load_compiler(config_path)?;
    let service = CompileService::spawn(compiler);
    let mut reports = service.subscribe();

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_source: Option<String> = None;
    tracing::info!("Watching {} (Ctrl+C to stop)", file);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,

            _ = ticker.tick() => match tokio::fs::read_to_string(file).await {
                Ok(source) if last_source.as_deref() != Some(source.as_str()) => {
                    let generation = service.submit_from(source.clone(), file);
                    tracing::debug!("{} changed, submitted generation {}", file, generation);
                    last_source = Some(source);
                }
                Ok(_) => {}
                Err(err) => tracing::warn!("Could not read {}: {}", file, err),
            },

            changed = reports.changed() => {
                if changed.is_err() {
                    break;
                }
                let report = reports.borrow_and_update().clone();
                if let Some(report) = report {
                    print_report(file, &report);
                }
            }
        }
    }

    let stats = service.stats();
    service.shutdown().await?;
    tracing::info!(
        "Stopped watching {}: {} published, {} superseded, {} unchanged",
        file,
        stats.published,
        stats.superseded,
        stats.unchanged
    );
    Ok(())
}

fn print_report(file: &str, report: &CompileReport) {
    let output = &report.output;
    if output.is_ok() {
        println!(
            "[{}] ✓ {}: {} nodes, {} edges",
            report.generation,
            file,
            output.nodes.len(),
            output.edges.len()
        );
    } else {
        for diagnostic in &output.errors {
            eprintln!(
                "[{}] {}",
                report.generation,
                format_diagnostic(file, diagnostic)
            );
        }
    }
}

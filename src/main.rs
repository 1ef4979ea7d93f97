use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ponto::artifact::ArtifactFormat;
use ponto::cli::{Cli, Command};
use ponto::config::PontoConfig;
use ponto::jobs::{Document, JobManager, JobState, ManagerSettings, Providers};
use ponto::layout::LayoutVariant;
use ponto::source::{DumpMode, TextDumpPages};
use ponto::ui::ExtractionProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PontoConfig::load_from(path)?,
        None => PontoConfig::load()?,
    };
    init_tracing(&config, cli.verbose);

    match cli.command {
        Command::Extract {
            document,
            pages,
            layout,
            output,
            format,
            cells,
        } => {
            let format = format.map(ArtifactFormat::from).unwrap_or(config.artifact_format);
            extract(&config, &document, &pages, layout.into(), output, format, cells).await
        }
        Command::Layouts => {
            print!("{}", config.signature_table()?.to_toml()?);
            Ok(())
        }
    }
}

// PONTO_LOG tem precedência; depois `log_filter` do arquivo; `--verbose` força debug.
fn init_tracing(config: &PontoConfig, verbose: bool) {
    let filter = EnvFilter::try_from_env("PONTO_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ponto=debug")
        } else {
            EnvFilter::new(config.log_filter())
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn extract(
    config: &PontoConfig,
    document: &Path,
    pages: &str,
    layout: LayoutVariant,
    output: Option<PathBuf>,
    format: ArtifactFormat,
    cells: bool,
) -> Result<()> {
    let bytes = std::fs::read(document)
        .with_context(|| format!("não foi possível ler {}", document.display()))?;
    let name = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let providers = if cells {
        Providers::uniform(Arc::new(TextDumpPages::new(DumpMode::Cells)))
    } else {
        Providers::new(
            Arc::new(TextDumpPages::new(DumpMode::Cells)),
            Arc::new(TextDumpPages::new(DumpMode::Lines)),
        )
    };
    let settings = ManagerSettings {
        format,
        ..ManagerSettings::from(config)
    };
    let manager = JobManager::new(settings, config.signature_table()?, providers);

    let progress = ExtractionProgress::start(&name);
    let id = manager
        .submit(Some(Document::new(name, bytes)), Some(pages), layout)
        .await?;

    let snapshot = loop {
        let snapshot = manager.progress(id)?;
        progress.update(&snapshot);
        if snapshot.state.is_terminal() {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    };

    if snapshot.state == JobState::Failed {
        if let Some(error) = &snapshot.error {
            progress.fail(error);
        }
        manager.discard(id).await?;
        bail!("extração falhou");
    }

    let artifact = manager.fetch(id).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(&artifact.filename));
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("não foi possível gravar {}", path.display()))?;
    manager.discard(id).await?;
    progress.complete(&path, &snapshot.message);
    Ok(())
}

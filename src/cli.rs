//! Interface de linha de comando do ponto baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (extract, layouts)
//! e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::artifact::ArtifactFormat;
use crate::layout::LayoutVariant;

/// Extrai marcações de folhas de ponto para CSV ou JSON.
#[derive(Debug, Parser)]
#[command(name = "ponto", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Arquivo de configuração (padrão: `ponto.toml` no diretório atual).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Layout aceito pela CLI, mapeado para [`LayoutVariant`] internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// Uma linha por data `DD/MM/AAAA`.
    #[value(alias = "1")]
    Jornada,
    /// Marcadores `Seg 01/11/21` com cabeçalho de competência.
    #[value(alias = "2")]
    Competencia,
    /// Período `d.m.aaaa a d.m.aaaa`, dia a dia.
    #[value(alias = "3")]
    Periodo,
}

impl From<LayoutArg> for LayoutVariant {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Jornada => LayoutVariant::Jornada,
            LayoutArg::Competencia => LayoutVariant::Competencia,
            LayoutArg::Periodo => LayoutVariant::Periodo,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ArtifactFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ArtifactFormat::Csv,
            FormatArg::Json => ArtifactFormat::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extrai as marcações de um documento já convertido em texto.
    Extract {
        /// Texto do documento, com páginas separadas por form feed.
        document: PathBuf,

        /// Páginas: `all`, `n` ou `n-m`.
        #[arg(long, short, default_value = "all")]
        pages: String,

        /// Layout do documento.
        #[arg(long, short)]
        layout: LayoutArg,

        /// Onde gravar o resultado (padrão: nome gerado no diretório atual).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Formato do resultado; sobrescreve `artifact_format`.
        #[arg(long)]
        format: Option<FormatArg>,

        /// Lê todas as páginas como células (tabulação, `;` ou espaços duplos).
        #[arg(long, default_value_t = false)]
        cells: bool,
    },

    /// Mostra a tabela de assinaturas de layout em uso, em TOML.
    Layouts,
}

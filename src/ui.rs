//! Interface de terminal do ponto: spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`ExtractionProgress`] acompanha visualmente
//! uma tarefa de extração enquanto o gerenciador a executa.

use std::path::Path;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::jobs::{JobError, JobProgress};

/// Indicador visual de progresso para uma tarefa no terminal.
///
/// Exibe um spinner com o percentual e a mensagem da etapa atual, e
/// mensagens coloridas para sucesso (verde) e falha (vermelho).
pub struct ExtractionProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
    // Estilo esmaecido para detalhes.
    dim: Style,
}

impl ExtractionProgress {
    /// Inicia o spinner com o nome do documento.
    pub fn start(document: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Enviando {document}..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Atualiza a mensagem do spinner com o último snapshot da tarefa.
    pub fn update(&self, snapshot: &JobProgress) {
        self.pb
            .set_message(format!("[{:>3}%] {}", snapshot.percent, snapshot.message));
    }

    /// Finaliza o spinner e mostra onde o resultado foi gravado.
    pub fn complete(&self, output: &Path, message: &str) {
        self.pb.finish_and_clear();
        println!(
            "  {} {} {}",
            self.green.apply_to("✓"),
            output.display(),
            self.dim.apply_to(message)
        );
    }

    /// Finaliza o spinner e mostra o erro da tarefa.
    pub fn fail(&self, error: &JobError) {
        self.pb.finish_and_clear();
        eprintln!("  {} {}", self.red.apply_to("✗"), error);
    }
}

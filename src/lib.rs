//! Extração e normalização de marcações de folhas de ponto escaneadas,
//! executada em tarefas assíncronas.
//!
//! Fluxo: [`jobs::JobManager::submit`] guarda o documento e agenda a tarefa;
//! o worker lê as páginas por um [`source::PageProvider`] e passa cada uma
//! pelo [`extract::ExtractionPipeline`] (localizador, segmentador, extrator,
//! validador e reconciliador); o resultado vira um arquivo CSV ou JSON
//! entregue por [`jobs::JobManager::fetch`].

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod layout;
pub mod parse;
pub mod source;
pub mod ui;

pub use error::{PontoError, Result};

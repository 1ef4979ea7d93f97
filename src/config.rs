//! Configuração do ponto carregada a partir de `ponto.toml`.
//!
//! A struct [`PontoConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `PONTO_WORK_DIR` tem precedência sobre o arquivo.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::artifact::ArtifactFormat;
use crate::layout::{SignatureOverride, SignatureTable};

/// Configuração de nível superior carregada de `ponto.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PontoConfig {
    /// Diretório raiz dos arquivos temporários de cada tarefa.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Atraso em milissegundos entre o primeiro download e a remoção da tarefa.
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,

    /// Formato do arquivo de resultado.
    #[serde(default)]
    pub artifact_format: ArtifactFormat,

    /// Filtro do `tracing`, usado quando `PONTO_LOG` não está definido.
    #[serde(default)]
    pub log_filter: Option<String>,

    /// Substituições da tabela de assinaturas, por layout.
    #[serde(default)]
    pub layouts: BTreeMap<String, SignatureOverride>,
}

// Valor padrão do diretório de trabalho: `<tmp>/ponto`.
fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("ponto")
}

// Valor padrão do atraso de limpeza: 2000ms.
fn default_grace_delay_ms() -> u64 {
    2000
}

pub fn default_log_filter() -> &'static str {
    "ponto=info"
}

impl Default for PontoConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            grace_delay_ms: default_grace_delay_ms(),
            artifact_format: ArtifactFormat::default(),
            log_filter: None,
            layouts: BTreeMap::new(),
        }
    }
}

impl PontoConfig {
    /// Carrega a configuração de `ponto.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("ponto.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<PontoConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(dir) = std::env::var("PONTO_WORK_DIR")
            && !dir.is_empty()
        {
            config.work_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(default_log_filter())
    }

    /// Tabela de assinaturas efetiva: embutida mais as substituições.
    pub fn signature_table(&self) -> crate::error::Result<SignatureTable> {
        SignatureTable::with_overrides(&self.layouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutVariant;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = PontoConfig::default();
        assert_eq!(config.grace_delay(), Duration::from_millis(2000));
        assert_eq!(config.artifact_format, ArtifactFormat::Csv);
        assert_eq!(config.log_filter(), "ponto=info");
        assert!(config.work_dir.ends_with("ponto"));
        assert!(config.layouts.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            grace_delay_ms = 500
            artifact_format = "json"

            [layouts.periodo]
            footer_keywords = ["assinatura", "rubrica"]
        "#;
        let config: PontoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.grace_delay_ms, 500);
        assert_eq!(config.artifact_format, ArtifactFormat::Json);
        assert!(config.work_dir.ends_with("ponto"));

        let table = config.signature_table().unwrap();
        assert_eq!(
            table.get(LayoutVariant::Periodo).footer_keywords,
            vec!["assinatura".to_string(), "rubrica".to_string()]
        );
    }

    #[test]
    fn unknown_layout_override_is_rejected() {
        let config: PontoConfig = toml::from_str("[layouts.modelo9]\nfooter_keywords = []").unwrap();
        assert!(config.signature_table().is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_filter = \"ponto=debug\"").unwrap();
        let config = PontoConfig::load_from(file.path()).unwrap();
        assert_eq!(config.log_filter(), "ponto=debug");
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let config = PontoConfig::load_from(Path::new("nao-existe/ponto.toml")).unwrap();
        assert_eq!(config.grace_delay_ms, 2000);
    }
}

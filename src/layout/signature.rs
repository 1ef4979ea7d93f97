//! Tabela de assinaturas de layout: palavras-chave de cabeçalho, rodapé,
//! dias especiais e colunas que não são marcações.
//!
//! As listas foram ajustadas à mão contra documentos reais e são tratadas
//! como dados de configuração versionados. Qualquer campo pode ser
//! sobrescrito em `ponto.toml` (ver [`SignatureOverride`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LayoutVariant;
use crate::error::{PontoError, Result};
use crate::parse::KeywordMatcher;

/// Versão dos dados embutidos. Incrementar ao alterar qualquer lista padrão.
pub const SIGNATURE_VERSION: u32 = 1;

/// Palavras-chave que identificam um layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSignature {
    /// Conjuntos de tokens de cabeçalho; uma linha casa se contiver todos os
    /// tokens de algum conjunto. Vazio: a página inteira é a região de linhas.
    #[serde(default)]
    pub header_sets: Vec<Vec<String>>,
    /// Palavras que encerram a tabela.
    #[serde(default)]
    pub footer_keywords: Vec<String>,
    /// Palavras que marcam o dia como sem marcações (folga, férias, atestado...).
    #[serde(default)]
    pub special_day_keywords: Vec<String>,
    /// Rótulos de colunas vizinhas (totais, extras, faltas, assinatura).
    #[serde(default)]
    pub non_punch_keywords: Vec<String>,
}

/// Substituição parcial de uma assinatura, lida de `[layouts.<variante>]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignatureOverride {
    pub header_sets: Option<Vec<Vec<String>>>,
    pub footer_keywords: Option<Vec<String>>,
    pub special_day_keywords: Option<Vec<String>>,
    pub non_punch_keywords: Option<Vec<String>>,
}

impl LayoutSignature {
    fn apply(&mut self, over: &SignatureOverride) {
        if let Some(v) = &over.header_sets {
            self.header_sets = v.clone();
        }
        if let Some(v) = &over.footer_keywords {
            self.footer_keywords = v.clone();
        }
        if let Some(v) = &over.special_day_keywords {
            self.special_day_keywords = v.clone();
        }
        if let Some(v) = &over.non_punch_keywords {
            self.non_punch_keywords = v.clone();
        }
    }

    pub fn builtin(variant: LayoutVariant) -> Self {
        match variant {
            LayoutVariant::Jornada => Self {
                header_sets: sets(&[
                    &["Dia", "Marcação"],
                    &["Data", "Marcação"],
                    &["Dia", "Situação"],
                    &["Data", "Situação"],
                    &["Dia", "Jornada"],
                ]),
                footer_keywords: list(&[
                    "assinatura",
                    "funcionário",
                    "chefia",
                    "visto",
                    "total",
                    "observações",
                ]),
                special_day_keywords: list(&[
                    "FOLG",
                    "COMP",
                    "FER",
                    "INTEGRAÇÃO",
                    "INTERAÇÃO",
                    "ATESTADO",
                    "MÉDICO",
                    "FALTA",
                    "LICENÇA",
                    "FÉRIAS",
                ]),
                non_punch_keywords: list(&[
                    "MARCAÇÃO OU",
                    "FALTAS",
                    "FALTA",
                    "FALTS",
                    "FALT",
                    "FAULT",
                    "AD.NOT",
                    "AD NOT",
                    "AD-NOT",
                    "ADNOT",
                    "A.NOT",
                    "ANOT",
                    "H.E.100%",
                    "H E 100%",
                    "HE 100%",
                    "H.E100%",
                    "HE.100%",
                    "HE100%",
                    "H.E.100",
                    "HE.100",
                    "H.E50%",
                    "HE.50%",
                    "HE50%",
                    "H.E.50",
                    "HE.50",
                    "H.E.NEG",
                    "H E NEG",
                    "HE NEG",
                    "HENEG",
                    "H.NEG",
                    "HNEG",
                    "H NEG",
                    "H-NEG",
                    "H.N",
                    "HN",
                    "NEG",
                    "C.DIA",
                    "CDIA",
                    "C DIA",
                    "C-DIA",
                    "COMP.DIA",
                    "C.D",
                    "CD",
                    "S.POS",
                    "SPOS",
                    "S POS",
                    "S-POS",
                    "S.P",
                    "SP",
                    "POS",
                    "S.NEG",
                    "SNEG",
                    "S NEG",
                    "S-NEG",
                    "S.N",
                    "SN",
                    "H.SUP",
                    "HSUP",
                    "H SUP",
                    "H-SUP",
                    "H.S",
                    "HS",
                    "SUP",
                    "SALDO",
                    "SALD",
                    "SAL",
                    "TOTAL",
                    "TOT",
                    "VISTO",
                    "CHEFIA",
                    "ASSINATURA",
                    "FUNCIONARIO",
                    "FUNCIONÁRIO",
                    "ATESTADO",
                    "MEDICO",
                    "MÉDICO",
                    "LICENÇA",
                    "LICENCA",
                    "FALTA JUSTIFICADA",
                    "FALTA ABONADA",
                    "FÉRIAS",
                    "FERIAS",
                ]),
            },
            LayoutVariant::Competencia => Self {
                header_sets: Vec::new(),
                footer_keywords: list(&["assinatura"]),
                special_day_keywords: list(&[
                    "FOLGA",
                    "FERIADO",
                    "FÉRIAS",
                    "FERIAS",
                    "ATESTADO",
                    "COMPENSADO",
                    "DSR",
                    "FALTA",
                ]),
                non_punch_keywords: list(&[
                    "SALDO",
                    "TOTAL",
                    "H.E",
                    "EXTRA",
                    "ABONO",
                    "ASSINATURA",
                ]),
            },
            LayoutVariant::Periodo => Self {
                header_sets: sets(&[&["Dia", "Entrada"], &["Data", "Entrada"], &["Dia", "Jornada"]]),
                footer_keywords: list(&["assinatura", "total", "observações"]),
                special_day_keywords: list(&[
                    "FOLGA",
                    "FERIADO",
                    "FÉRIAS",
                    "FERIAS",
                    "ATESTADO",
                    "LICENÇA",
                    "COMPENSADO",
                    "DSR",
                    "FALTA",
                ]),
                non_punch_keywords: list(&[
                    "TOTAL",
                    "SALDO",
                    "H.E",
                    "EXTRA",
                    "NOTURNO",
                    "ABONO",
                    "ASSINATURA",
                    "OBS",
                ]),
            },
        }
    }

    /// Compila as listas em matchers; falha se algum padrão for inválido.
    pub fn compile(&self) -> Result<CompiledSignature> {
        let header_sets = self
            .header_sets
            .iter()
            .filter(|set| set.iter().any(|t| !t.trim().is_empty()))
            .map(|set| {
                set.iter()
                    .filter(|t| !t.trim().is_empty())
                    .map(|token| KeywordMatcher::words(std::slice::from_ref(token)))
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(CompiledSignature {
            header_sets,
            footer: KeywordMatcher::words(&self.footer_keywords)?,
            special_days: KeywordMatcher::substrings(&self.special_day_keywords)?,
            non_punch: KeywordMatcher::substrings(&self.non_punch_keywords)?,
        })
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sets(items: &[&[&str]]) -> Vec<Vec<String>> {
    items.iter().map(|set| list(set)).collect()
}

/// Matchers prontos para uso no pipeline.
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub header_sets: Vec<Vec<KeywordMatcher>>,
    pub footer: KeywordMatcher,
    pub special_days: KeywordMatcher,
    pub non_punch: KeywordMatcher,
}

/// Tabela completa: assinaturas embutidas com as substituições da configuração.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureTable {
    pub version: u32,
    pub layouts: BTreeMap<LayoutVariant, LayoutSignature>,
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self {
            version: SIGNATURE_VERSION,
            layouts: LayoutVariant::ALL
                .into_iter()
                .map(|v| (v, LayoutSignature::builtin(v)))
                .collect(),
        }
    }
}

impl SignatureTable {
    /// Aplica as substituições de `[layouts.*]`. Chaves desconhecidas são erro.
    pub fn with_overrides(overrides: &BTreeMap<String, SignatureOverride>) -> Result<Self> {
        let mut table = Self::default();
        for (key, over) in overrides {
            let variant: LayoutVariant = key
                .parse()
                .map_err(|_| PontoError::Config(format!("layout desconhecido: {key}")))?;
            if let Some(sig) = table.layouts.get_mut(&variant) {
                sig.apply(over);
            }
        }
        for (variant, sig) in &table.layouts {
            sig.compile()
                .map_err(|e| PontoError::Config(format!("layout {variant}: {e}")))?;
        }
        Ok(table)
    }

    pub fn get(&self, variant: LayoutVariant) -> LayoutSignature {
        self.layouts
            .get(&variant)
            .cloned()
            .unwrap_or_else(|| LayoutSignature::builtin(variant))
    }

    pub fn compile(&self, variant: LayoutVariant) -> Result<CompiledSignature> {
        self.get(variant).compile()
    }

    /// Renders the effective table as TOML, keyed by variant name.
    pub fn to_toml(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Doc<'a> {
            version: u32,
            layouts: BTreeMap<&'static str, &'a LayoutSignature>,
        }
        let doc = Doc {
            version: self.version,
            layouts: self.layouts.iter().map(|(v, s)| (v.as_str(), s)).collect(),
        };
        toml::to_string_pretty(&doc).map_err(|e| PontoError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_covers_every_variant() {
        let table = SignatureTable::default();
        assert_eq!(table.version, SIGNATURE_VERSION);
        for v in LayoutVariant::ALL {
            assert!(table.layouts.contains_key(&v));
            table.compile(v).unwrap();
        }
    }

    #[test]
    fn competencia_uses_whole_page() {
        let sig = LayoutSignature::builtin(LayoutVariant::Competencia);
        assert!(sig.header_sets.is_empty());
        assert!(sig.compile().unwrap().header_sets.is_empty());
    }

    #[test]
    fn override_replaces_only_given_fields() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "jornada".to_string(),
            SignatureOverride {
                footer_keywords: Some(vec!["rodapé".into()]),
                ..Default::default()
            },
        );
        let table = SignatureTable::with_overrides(&overrides).unwrap();
        let sig = table.get(LayoutVariant::Jornada);
        assert_eq!(sig.footer_keywords, vec!["rodapé".to_string()]);
        assert_eq!(
            sig.header_sets,
            LayoutSignature::builtin(LayoutVariant::Jornada).header_sets
        );
    }

    #[test]
    fn override_with_unknown_layout_is_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("modelo9".to_string(), SignatureOverride::default());
        let err = SignatureTable::with_overrides(&overrides).unwrap_err();
        assert!(matches!(err, PontoError::Config(_)));
    }

    #[test]
    fn to_toml_is_keyed_by_name() {
        let rendered = SignatureTable::default().to_toml().unwrap();
        assert!(rendered.contains("[layouts.jornada]"));
        assert!(rendered.contains("version = 1"));
    }
}

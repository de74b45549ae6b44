//! # Erros de Construção
//!
//! Apenas a **construção** de objetos pode falhar: compilar um padrão, validar
//! `capture_length`, carregar um documento. Consultas (`matches`, `locate`,
//! seleção de seções) nunca retornam erro: "não encontrado" é um resultado
//! normal, representado por `Option`, `bool` ou um iterador vazio.

use std::path::PathBuf;

use thiserror::Error;

/// Erros possíveis ao construir padrões e documentos.
#[derive(Debug, Error)]
pub enum Error {
    /// Uma expressão regular (principal, de negação ou de requisito) não compilou.
    #[error("Regex inválida `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// `capture_length` não divide o número de grupos de captura do padrão.
    #[error("capture_length {capture_length} incompatível com {groups} grupos de captura")]
    CaptureLength { capture_length: usize, groups: usize },

    /// O documento ficou sem texto (nem literal, nem arquivo).
    #[error("Texto ausente para o documento `{name}` (arquivo: {file:?})")]
    EmptyDocument { name: String, file: Option<PathBuf> },

    /// Rótulo de codificação desconhecido para o `encoding_rs`.
    #[error("Codificação desconhecida: {0}")]
    UnknownEncoding(String),

    /// Falha de leitura do arquivo do documento.
    #[error("Erro de I/O em {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Especificação de padrão em JSON malformada.
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias de resultado usado em todo o crate.
pub type Result<T> = std::result::Result<T, Error>;

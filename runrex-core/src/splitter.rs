//! # Segmentação em Sentenças
//!
//! O núcleo não impõe uma estratégia de segmentação: qualquer tipo que
//! implemente [`SentenceSplitter`] pode ser usado. O contrato é simples:
//! devolver segmentos `(texto, início, fim)` que cobrem o texto inteiro, em
//! ordem, sem lacunas. Espaços nas bordas são aparados depois, pela `Sentence`.
//!
//! ## Estratégias incluídas
//!
//! - **Newline** ([`NewlineSplitter`], padrão): cada segmento termina logo após um `\n`.
//! - **Regex** ([`RegexSplitter`]): cada segmento termina após um match do delimitador.
//! - **Unicode** ([`UnicodeSplitter`]): fronteiras de sentença do UAX #29
//!   (`unicode-segmentation`), opcionalmente tratando quebras simples de linha
//!   como espaço (parágrafos continuam separados por linhas em branco).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use runrex_core::splitter::{SentenceSplitter, SplitterMode};
//!
//! let splitter = SplitterMode::Newline.build();
//! let segments = splitter.split("first line\nsecond line");
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[1].start, 11);
//! ```

use std::rc::Rc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

/// Um trecho do texto de entrada com seus offsets de byte `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'t> {
    pub text: &'t str,
    pub start: usize,
    pub end: usize,
}

/// Estratégia plugável de segmentação.
pub trait SentenceSplitter {
    /// Segmentos contíguos que cobrem `text` de ponta a ponta.
    fn split<'t>(&self, text: &'t str) -> Vec<Segment<'t>>;
}

/// Corta `text` logo após cada offset de `ends`; o restante vira o último segmento.
fn split_after<'t>(text: &'t str, ends: impl IntoIterator<Item = usize>) -> Vec<Segment<'t>> {
    let mut segments = Vec::new();
    let mut start = 0;
    for end in ends {
        if end < start {
            continue;
        }
        segments.push(Segment {
            text: &text[start..end],
            start,
            end,
        });
        start = end;
    }
    segments.push(Segment {
        text: &text[start..],
        start,
        end: text.len(),
    });
    segments
}

/// Uma sentença por linha.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewlineSplitter;

impl SentenceSplitter for NewlineSplitter {
    fn split<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        split_after(text, text.match_indices('\n').map(|(i, nl)| i + nl.len()))
    }
}

/// Segmentação por um delimitador regex arbitrário.
#[derive(Debug, Clone)]
pub struct RegexSplitter {
    delimiter: Regex,
}

impl RegexSplitter {
    pub fn new(delimiter: &str) -> Result<Self> {
        let delimiter = Regex::new(delimiter).map_err(|source| Error::InvalidRegex {
            pattern: delimiter.to_string(),
            source,
        })?;
        Ok(Self { delimiter })
    }
}

impl SentenceSplitter for RegexSplitter {
    fn split<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        split_after(text, self.delimiter.find_iter(text).map(|m| m.end()))
    }
}

/// Fronteiras de sentença do Unicode (UAX #29).
#[derive(Debug, Clone, Copy)]
pub struct UnicodeSplitter {
    /// Trata `\n` isolado como espaço; `\n\n` continua sendo quebra de parágrafo.
    pub ignore_newlines: bool,
}

impl Default for UnicodeSplitter {
    fn default() -> Self {
        Self {
            ignore_newlines: true,
        }
    }
}

/// Troca cada `\n` isolado por espaço. Ambos ocupam um byte, então os offsets
/// do texto resultante continuam válidos no original.
fn join_single_newlines(text: &str) -> String {
    let bytes = text.as_bytes();
    let joined: Vec<u8> = bytes
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let lone = b == b'\n'
                && (i == 0 || bytes[i - 1] != b'\n')
                && bytes.get(i + 1) != Some(&b'\n');
            if lone {
                b' '
            } else {
                b
            }
        })
        .collect();
    // somente bytes ASCII foram trocados por ASCII
    String::from_utf8(joined).unwrap_or_else(|_| text.to_string())
}

impl SentenceSplitter for UnicodeSplitter {
    fn split<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let ends: Vec<usize> = if self.ignore_newlines {
            join_single_newlines(text)
                .split_sentence_bound_indices()
                .map(|(i, s)| i + s.len())
                .collect()
        } else {
            text.split_sentence_bound_indices()
                .map(|(i, s)| i + s.len())
                .collect()
        };
        let mut segments = split_after(text, ends);
        // o último corte coincide com o fim do texto: descarta o resto vazio
        if segments.len() > 1 && segments.last().is_some_and(|s| s.text.is_empty()) {
            segments.pop();
        }
        segments
    }
}

/// Seleção declarativa (serializável) das estratégias incluídas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitterMode {
    /// Uma sentença por linha.
    #[default]
    Newline,
    /// UAX #29, ignorando quebras simples de linha.
    Unicode,
}

impl SplitterMode {
    pub fn build(self) -> Rc<dyn SentenceSplitter> {
        match self {
            SplitterMode::Newline => Rc::new(NewlineSplitter),
            SplitterMode::Unicode => Rc::new(UnicodeSplitter::default()),
        }
    }
}

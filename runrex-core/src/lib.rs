//! # runrex-core: Extração de Informação Baseada em Regras
//!
//! Este crate implementa o núcleo de um motor de extração de informação por
//! regras: expressões regulares com restrições (negação e requisitos) aplicadas
//! a documentos segmentados em sentenças. É pensado para textos clínicos e
//! administrativos, onde a pergunta típica é "esta nota menciona X, sem negar,
//! e perto de Y?".
//!
//! ## Arquitetura
//!
//! O dado flui do texto bruto até os matches registrados:
//!
//! 1.  **Documento** ([`document`]): texto bruto, limpeza (remoção de blocos
//!     `HISTORY:`, normalização de `rótulo:\n`) e segmentação.
//! 2.  **Segmentação** ([`splitter`]): estratégia plugável; por linha,
//!     por regex ou por fronteiras Unicode.
//! 3.  **Sentenças** ([`sentence`]): trechos aparados com offsets absolutos.
//! 4.  **Seções** ([`section`]): grupos de sentenças vistos como um texto só,
//!     obtidos por seleção com contexto ou por divisão em rótulos.
//! 5.  **Padrões** ([`pattern`]): regex principal + negações + requisitos,
//!     com compressão de grupos alternativos.
//! 6.  **Histórico** ([`matches`]): todo match encontrado é registrado no
//!     [`MatchCask`] compartilhado pelo documento e suas visões.
//!
//! Todos os contêineres implementam [`SentenceView`] ([`view`]), então um
//! "algoritmo" escrito contra o trait funciona igual para sentença, seção ou
//! documento.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use runrex_core::{Document, MatchOptions, Pattern, PatternSpec, SentenceView};
//!
//! let text = "HPI: patient reports chest pain.\nDenies fever.\nPLAN: follow up in two weeks.";
//! let doc = Document::new("note-1", text)?;
//!
//! // 1. Padrões: dor torácica, exceto quando negada na mesma sentença
//! let pain = PatternSpec::new("chest pain").negates(["denies", r"\bno\b"]).compile()?;
//! let fever = Pattern::new("fever")?;
//!
//! // 2. Algoritmo: percorre as sentenças e coleta as que casam
//! let hits: Vec<&str> = doc
//!     .iter()
//!     .filter(|s| s.has_pattern(&pain, MatchOptions::default()))
//!     .map(|s| s.text())
//!     .collect();
//! assert_eq!(hits, ["HPI: patient reports chest pain."]);
//!
//! // 3. Offsets absolutos, relativos ao texto limpo do documento
//! let located = doc.locate(&fever, 0).unwrap();
//! assert_eq!(&doc.text()[located.start..located.end], "fever");
//!
//! // 4. Tudo que casou fica no histórico do documento
//! assert_eq!(doc.matches().texts().len(), 2);
//! # Ok::<(), runrex_core::Error>(())
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pattern`]: Compilação e avaliação de padrões com restrições.
//! - [`document`]: Ponto de entrada; carrega, limpa, seleciona e divide.
//! - [`error`]: Erros de construção (regex inválida, documento vazio, I/O).

pub mod document;
pub mod error;
pub mod matches;
pub mod pattern;
pub mod section;
pub mod sentence;
pub mod splitter;
pub mod view;

pub use document::{Document, DocumentOptions, Scope, SectionSpan};
pub use error::{Error, Result};
pub use matches::{Capture, Located, Match, MatchCask};
pub use pattern::{MatchOptions, Pattern, PatternSpec, DEFAULT_SEPARATOR};
pub use section::{Section, Sections};
pub use sentence::{Sentence, Sentences};
pub use splitter::{
    NewlineSplitter, RegexSplitter, Segment, SentenceSplitter, SplitterMode, UnicodeSplitter,
};
pub use view::{MatchMode, SentenceView};

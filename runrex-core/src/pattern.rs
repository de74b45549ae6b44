//! # Padrões com Restrições
//!
//! Um [`Pattern`] é uma expressão regular principal acompanhada de três listas
//! de regexes auxiliares:
//!
//! - **negates**: se qualquer uma casar, o match é rejeitado;
//! - **requires**: pelo menos uma precisa casar (quando a lista não é vazia);
//! - **requires_all**: todas precisam casar.
//!
//! As restrições são avaliadas sobre o **texto pesquisado inteiro** (a sentença,
//! a seção ou o documento), nessa ordem, parando na primeira falha.
//!
//! ## Espaços em branco
//!
//! Antes de compilar, cada espaço literal do código-fonte do padrão é trocado
//! pelo regex separador (padrão `\W+`). A troca vale igualmente para o padrão
//! principal, as negações e os requisitos, então `"heart failure"` também casa
//! `"heart-failure"` ou `"heart,  failure"`.
//!
//! ## Compressão de grupos
//!
//! Em padrões do tipo `(?:(A)|(B)|(C))`, só um dos grupos participa do match.
//! Com `capture_length = k`, os grupos brutos são divididos em tuplas de `k`
//! elementos e a primeira tupla cujo primeiro elemento participou vira o
//! "grupo lógico" do match (ver [`group_compress`]).
//!
//! ## Exemplo
//!
//! ```rust
//! use runrex_core::{MatchOptions, PatternSpec};
//!
//! let pattern = PatternSpec::new("chest pain")
//!     .negates(["no chest pain"])
//!     .compile()
//!     .unwrap();
//!
//! assert!(pattern.matches("Reports chest-pain since Monday.", MatchOptions::default()).is_some());
//! assert!(pattern.matches("Denies: no chest pain.", MatchOptions::default()).is_none());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use regex::{CaptureMatches, Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::matches::{Capture, Match};

/// Separador padrão: um ou mais caracteres que não são de palavra.
pub const DEFAULT_SEPARATOR: &str = r"\W+";

/// Flags por chamada que desligam grupos de restrições.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub ignore_negation: bool,
    pub ignore_requires: bool,
    pub ignore_requires_all: bool,
}

impl MatchOptions {
    pub fn ignoring_negation() -> Self {
        Self {
            ignore_negation: true,
            ..Self::default()
        }
    }

    pub fn ignoring_requirements() -> Self {
        Self {
            ignore_requires: true,
            ignore_requires_all: true,
            ..Self::default()
        }
    }
}

/// Formato-fonte de um padrão, (des)serializável.
///
/// Campos ausentes no JSON recebem os valores de [`PatternSpec::default`]:
/// separador `\W+`, sem compressão e sem diferenciar maiúsculas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSpec {
    /// Regex principal (não compilada).
    pub pattern: String,
    pub negates: Vec<String>,
    /// Requisitos "qualquer um".
    pub requires: Vec<String>,
    /// Requisitos "todos".
    pub requires_all: Vec<String>,
    /// Regex que substitui cada espaço literal; `None` desliga a troca.
    pub separator: Option<String>,
    /// Largura de cada alternativa para compressão de grupos.
    pub capture_length: Option<usize>,
    /// Grupos nomeados a manter; os demais viram não-capturantes.
    pub retain_groups: Option<Vec<String>>,
    pub case_insensitive: bool,
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            negates: vec![],
            requires: vec![],
            requires_all: vec![],
            separator: Some(DEFAULT_SEPARATOR.to_string()),
            capture_length: None,
            retain_groups: None,
            case_insensitive: true,
        }
    }
}

impl PatternSpec {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn negates<I, S>(mut self, negates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.negates = negates.into_iter().map(Into::into).collect();
        self
    }

    pub fn requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    pub fn requires_all<I, S>(mut self, requires_all: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires_all = requires_all.into_iter().map(Into::into).collect();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Compila os espaços literalmente.
    pub fn without_separator(mut self) -> Self {
        self.separator = None;
        self
    }

    pub fn capture_length(mut self, capture_length: usize) -> Self {
        self.capture_length = Some(capture_length);
        self
    }

    pub fn retain_groups<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retain_groups = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lê uma lista de especificações (`[{"pattern": ...}, ...]`).
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compila o padrão principal e todas as restrições.
    ///
    /// Falha se qualquer regex for inválida ou se `capture_length` não dividir
    /// o número de grupos de captura do padrão principal.
    pub fn compile(&self) -> Result<Pattern> {
        let separator = self.separator.as_deref();
        let mut source = rewrite_whitespace(&self.pattern, separator);
        if let Some(retain) = &self.retain_groups {
            source = strip_unretained_groups(&source, retain);
        }
        let regex = build_regex(&source, self.case_insensitive)?;

        let compile_all = |sources: &[String]| -> Result<Vec<Regex>> {
            sources
                .iter()
                .map(|s| build_regex(&rewrite_whitespace(s, separator), self.case_insensitive))
                .collect()
        };
        let negates = compile_all(&self.negates)?;
        let requires = compile_all(&self.requires)?;
        let requires_all = compile_all(&self.requires_all)?;

        if let Some(capture_length) = self.capture_length {
            let groups = regex.captures_len() - 1;
            if capture_length == 0 || groups % capture_length != 0 {
                return Err(Error::CaptureLength {
                    capture_length,
                    groups,
                });
            }
        }

        trace!(
            source = regex.as_str(),
            negates = negates.len(),
            requires = requires.len(),
            requires_all = requires_all.len(),
            "padrão compilado"
        );

        Ok(Pattern {
            regex,
            negates,
            requires,
            requires_all,
            capture_length: self.capture_length,
            match_count: AtomicUsize::new(0),
        })
    }
}

fn rewrite_whitespace(source: &str, separator: Option<&str>) -> String {
    match separator {
        Some(sep) if !sep.is_empty() => source.replace(' ', sep),
        _ => source.to_string(),
    }
}

fn named_group() -> &'static Regex {
    static NAMED_GROUP: OnceLock<Regex> = OnceLock::new();
    NAMED_GROUP.get_or_init(|| {
        Regex::new(r"\(\?P?<([A-Za-z_][A-Za-z0-9_]*)>").expect("named group regex is valid")
    })
}

fn strip_unretained_groups(source: &str, retain: &[String]) -> String {
    named_group()
        .replace_all(source, |caps: &Captures| {
            if retain.iter().any(|name| name == &caps[1]) {
                caps[0].to_string()
            } else {
                "(?:".to_string()
            }
        })
        .into_owned()
}

fn build_regex(source: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source_err| Error::InvalidRegex {
            pattern: source.to_string(),
            source: source_err,
        })
}

/// Divide `groups` em tuplas de `capture_length` e devolve a primeira cujo
/// primeiro elemento está presente, isto é, a alternativa que de fato casou.
pub fn group_compress<T: Clone>(
    groups: &[Option<T>],
    capture_length: usize,
) -> Option<Vec<Option<T>>> {
    if capture_length == 0 {
        return None;
    }
    groups
        .chunks_exact(capture_length)
        .find(|chunk| chunk[0].is_some())
        .map(<[Option<T>]>::to_vec)
}

/// Regex principal + restrições, imutável após a construção.
///
/// O contador de matches é atômico para que o padrão possa ser compartilhado
/// entre threads (ver `Sentences::par_locate_all`).
#[derive(Debug)]
pub struct Pattern {
    regex: Regex,
    negates: Vec<Regex>,
    requires: Vec<Regex>,
    requires_all: Vec<Regex>,
    capture_length: Option<usize>,
    match_count: AtomicUsize,
}

impl Pattern {
    /// Atalho para `PatternSpec::new(source).compile()`.
    pub fn new(source: &str) -> Result<Self> {
        PatternSpec::new(source).compile()
    }

    /// Código-fonte compilado (após a troca de espaços).
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn capture_length(&self) -> Option<usize> {
        self.capture_length
    }

    /// Quantos matches confirmados este padrão já produziu (diagnóstico).
    pub fn match_count(&self) -> usize {
        self.match_count.load(Ordering::Relaxed)
    }

    fn confirm(&self, text: &str, options: MatchOptions) -> bool {
        if !options.ignore_negation && self.negates.iter().any(|rx| rx.is_match(text)) {
            return false;
        }
        if !options.ignore_requires
            && !self.requires.is_empty()
            && !self.requires.iter().any(|rx| rx.is_match(text))
        {
            return false;
        }
        if !options.ignore_requires_all && !self.requires_all.iter().all(|rx| rx.is_match(text)) {
            return false;
        }
        true
    }

    fn to_match(&self, caps: &Captures<'_>) -> Match {
        self.match_count.fetch_add(1, Ordering::Relaxed);
        let whole = caps.get(0).map(Capture::from).unwrap_or_else(|| Capture {
            text: String::new(),
            start: 0,
            end: 0,
        });
        let groups: Vec<Option<Capture>> =
            caps.iter().skip(1).map(|g| g.map(Capture::from)).collect();
        let compressed = self
            .capture_length
            .and_then(|k| group_compress(&groups, k));
        Match::new(whole, groups, compressed)
    }

    /// Primeiro match do padrão principal em `text`, se as restrições ativas
    /// forem satisfeitas.
    pub fn matches(&self, text: &str, options: MatchOptions) -> Option<Match> {
        let caps = self.regex.captures(text)?;
        if !self.confirm(text, options) {
            return None;
        }
        Some(self.to_match(&caps))
    }

    /// Todos os matches não sobrepostos, da esquerda para a direita, cada um
    /// filtrado pelas restrições. Preguiçoso; chamar de novo recomeça do início.
    pub fn find_all<'p, 't>(&'p self, text: &'t str, options: MatchOptions) -> FindAll<'p, 't> {
        FindAll {
            pattern: self,
            text,
            options,
            captures: self.regex.captures_iter(text),
        }
    }

    /// Texto do grupo `group` do primeiro match confirmado.
    pub fn match_group(&self, text: &str, group: usize) -> Option<String> {
        self.matches(text, MatchOptions::default())
            .and_then(|m| m.group(group).map(str::to_string))
    }

    /// Substitui todos os matches do padrão principal, sem aplicar restrições.
    /// `replacement` aceita expansões `$1`/`$name`.
    pub fn substitute<'t>(&self, replacement: &str, text: &'t str) -> Cow<'t, str> {
        self.regex.replace_all(text, replacement)
    }

    /// Texto após o primeiro match do padrão principal (ou `text` inteiro).
    pub fn skip_past<'t>(&self, text: &'t str) -> &'t str {
        match self.regex.find(text) {
            Some(m) => {
                self.match_count.fetch_add(1, Ordering::Relaxed);
                &text[m.end()..]
            }
            None => text,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Iterador de [`Pattern::find_all`].
pub struct FindAll<'p, 't> {
    pattern: &'p Pattern,
    text: &'t str,
    options: MatchOptions,
    captures: CaptureMatches<'p, 't>,
}

impl Iterator for FindAll<'_, '_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        for caps in self.captures.by_ref() {
            if self.pattern.confirm(self.text, self.options) {
                return Some(self.pattern.to_match(&caps));
            }
        }
        None
    }
}

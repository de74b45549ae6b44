//! # Documento
//!
//! O [`Document`] é o dono do texto bruto e do texto limpo derivado dele. A
//! construção é feita em uma única passagem:
//!
//! 1. **Remoção de histórico**: blocos `HISTORY: ... ` são trocados por `\n`
//!    até o próximo rótulo em maiúsculas (`EXAM:`, `PLAN:`...).
//! 2. **Normalização de dois-pontos**: `rótulo:\n` vira `rótulo: `, para que o
//!    rótulo fique na mesma sentença que o seu conteúdo.
//! 3. **Segmentação**: o texto limpo é dividido em [`Sentences`] pelo splitter.
//!
//! Depois disso o documento é somente-leitura, exceto pelo histórico de
//! matches, compartilhado com todas as sentenças e seções derivadas.
//!
//! Os offsets das sentenças se referem ao texto limpo ([`SentenceView::text`]);
//! o texto original continua disponível em [`Document::raw_text`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::OnceLock;

use encoding_rs::Encoding;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::matches::{Located, MatchCask};
use crate::pattern::{MatchOptions, Pattern};
use crate::section::{Section, Sections};
use crate::sentence::{Sentence, Sentences};
use crate::splitter::{SentenceSplitter, SplitterMode};
use crate::view::{MatchMode, SentenceView};

/// Configuração de carregamento de documentos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Rótulo de codificação (WHATWG), ex: `"utf-8"`, `"latin1"`.
    pub encoding: String,
    pub splitter: SplitterMode,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            splitter: SplitterMode::default(),
        }
    }
}

impl DocumentOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Onde um padrão é avaliado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Dentro de cada sentença, isoladamente.
    #[default]
    Sentence,
    /// No texto bruto inteiro, de uma vez (padrões que atravessam sentenças).
    Document,
}

/// Forma da seção devolvida por [`Document::select_all_sections`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionSpan {
    /// Apenas as sentenças qualificadas (e seu contexto).
    #[default]
    Exact,
    /// Da primeira à última sentença qualificada, incluindo tudo entre elas.
    Range,
}

fn history_block() -> &'static Regex {
    static HISTORY: OnceLock<Regex> = OnceLock::new();
    HISTORY.get_or_init(|| Regex::new(r"HISTORY:.*?([A-Z]+:)").expect("history regex is valid"))
}

fn colon_break() -> &'static Regex {
    static COLON_BREAK: OnceLock<Regex> = OnceLock::new();
    COLON_BREAK.get_or_init(|| Regex::new(r": *\n").expect("colon regex is valid"))
}

/// Troca cada bloco `HISTORY:` por `\n`, preservando o rótulo seguinte.
/// A busca recomeça no rótulo, então um novo `HISTORY:` logo em seguida
/// também é removido.
fn remove_history(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut last = 0;
    while let Some(caps) = history_block().captures_at(text, last) {
        let (Some(block), Some(label)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        cleaned.push_str(&text[last..block.start()]);
        cleaned.push('\n');
        trace!(start = block.start(), end = label.start(), "bloco de histórico removido");
        last = label.start();
    }
    cleaned.push_str(&text[last..]);
    cleaned
}

fn clean_text(text: &str) -> String {
    colon_break().replace_all(&remove_history(text), ": ").into_owned()
}

/// Documento segmentado em sentenças, com histórico de matches compartilhado.
pub struct Document {
    name: String,
    text: String,
    sentences: Sentences,
    matches: MatchCask,
    splitter: Rc<dyn SentenceSplitter>,
}

impl Document {
    /// Documento a partir de texto literal, segmentado por linha.
    pub fn new(name: &str, text: &str) -> Result<Self> {
        Self::with_splitter(name, text, SplitterMode::default().build())
    }

    pub fn with_splitter(
        name: &str,
        text: &str,
        splitter: Rc<dyn SentenceSplitter>,
    ) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::EmptyDocument {
                name: name.to_string(),
                file: None,
            });
        }
        Ok(Self::assemble(name.to_string(), text.to_string(), splitter))
    }

    /// Carrega o texto de `path`, decodificando com `options.encoding`.
    pub fn from_file(name: &str, path: impl AsRef<Path>, options: &DocumentOptions) -> Result<Self> {
        let path = path.as_ref();
        let encoding = Encoding::for_label(options.encoding.as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(options.encoding.clone()))?;
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(
                path = %path.display(),
                encoding = used.name(),
                "bytes inválidos substituídos por U+FFFD"
            );
        }
        if text.is_empty() {
            return Err(Error::EmptyDocument {
                name: name.to_string(),
                file: Some(path.to_path_buf()),
            });
        }
        debug!(path = %path.display(), encoding = used.name(), "documento carregado");
        Ok(Self::assemble(
            name.to_string(),
            text.into_owned(),
            options.splitter.build(),
        ))
    }

    fn assemble(name: String, text: String, splitter: Rc<dyn SentenceSplitter>) -> Self {
        let cleaned = clean_text(&text);
        let matches = MatchCask::new();
        let sentences = Sentences::new(cleaned, matches.clone(), splitter.as_ref());
        debug!(
            document = %name,
            bytes = text.len(),
            sentences = sentences.len(),
            "documento segmentado"
        );
        Self {
            name,
            text,
            sentences,
            matches,
            splitter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Texto original, sem limpeza.
    pub fn raw_text(&self) -> &str {
        &self.text
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sentence> {
        self.sentences.iter()
    }

    /// Avalia o padrão por sentença ou no texto bruto inteiro.
    pub fn has_pattern_in(&self, pattern: &Pattern, options: MatchOptions, scope: Scope) -> bool {
        match scope {
            Scope::Sentence => self.sentences.has_pattern(pattern, options),
            Scope::Document => match pattern.matches(&self.text, options) {
                Some(m) => {
                    self.matches.add(m);
                    true
                }
                None => false,
            },
        }
    }

    pub fn has_patterns_in(
        &self,
        patterns: &[&Pattern],
        mode: MatchMode,
        options: MatchOptions,
        scope: Scope,
    ) -> bool {
        mode.evaluate(patterns, |p| self.has_pattern_in(p, options, scope))
    }

    /// Grupo `group` do primeiro match no texto bruto inteiro.
    pub fn extract(&self, pattern: &Pattern, group: usize) -> Option<String> {
        let m = pattern.matches(&self.text, MatchOptions::default())?;
        let value = m.group(group).map(str::to_string);
        self.matches.add(m);
        value
    }

    /// Primeiro padrão (em ordem) que produz um valor, com seu índice.
    pub fn extract_any(&self, patterns: &[&Pattern], group: usize) -> Option<(usize, String)> {
        patterns
            .iter()
            .enumerate()
            .find_map(|(i, p)| self.extract(p, group).map(|value| (i, value)))
    }

    /// Mesmo que `locate_all`, avaliando as sentenças em paralelo.
    pub fn par_locate_all(&self, pattern: &Pattern, group: usize) -> Vec<Located> {
        self.sentences.par_locate_all(pattern, group)
    }

    fn qualifies(
        sentence: &Sentence,
        patterns: &[&Pattern],
        negations: &[&Pattern],
        mode: MatchMode,
    ) -> bool {
        sentence.has_patterns(patterns, mode, MatchOptions::default())
            && !sentence.has_patterns(negations, MatchMode::Any, MatchOptions::default())
    }

    fn window(&self, index: usize, context: usize) -> (usize, usize) {
        let last = self.sentences.len().saturating_sub(1);
        (index.saturating_sub(context), index.saturating_add(context).min(last))
    }

    /// Uma seção por sentença qualificada, com até `context` vizinhas de cada
    /// lado. Janelas sobrepostas não são fundidas.
    pub fn select_sections<'a>(
        &'a self,
        patterns: &'a [&'a Pattern],
        negations: &'a [&'a Pattern],
        mode: MatchMode,
        context: usize,
    ) -> impl Iterator<Item = Section> + 'a {
        let sentences = self.sentences.sentences();
        sentences
            .iter()
            .enumerate()
            .filter(move |(_, sentence)| Self::qualifies(sentence, patterns, negations, mode))
            .map(move |(index, _)| {
                let (lo, hi) = self.window(index, context);
                trace!(document = %self.name, index, lo, hi, "sentença selecionada");
                Section::new(sentences[lo..=hi].to_vec(), self.matches.clone())
            })
    }

    /// Uma única seção com a união de todas as sentenças qualificadas (e seu
    /// contexto), ou `None` se nenhuma qualificar.
    pub fn select_all_sections(
        &self,
        patterns: &[&Pattern],
        negations: &[&Pattern],
        mode: MatchMode,
        context: usize,
        span: SectionSpan,
    ) -> Option<Section> {
        let sentences = self.sentences.sentences();
        let mut selected = BTreeSet::new();
        for (index, sentence) in sentences.iter().enumerate() {
            if Self::qualifies(sentence, patterns, negations, mode) {
                let (lo, hi) = self.window(index, context);
                selected.extend(lo..=hi);
            }
        }
        debug!(document = %self.name, selected = selected.len(), "seleção agregada");

        let first = *selected.first()?;
        let last = *selected.last()?;
        let members = if selected.len() == 1 {
            vec![sentences[first].clone()]
        } else {
            match span {
                SectionSpan::Range => sentences[first..=last].to_vec(),
                SectionSpan::Exact => selected.iter().map(|&i| sentences[i].clone()).collect(),
            }
        };
        Some(Section::new(members, self.matches.clone()))
    }

    /// Novo documento a partir do texto bruto sem os matches dos padrões
    /// (substituição incondicional). `None` se não sobrar texto.
    pub fn remove_patterns(&self, patterns: &[&Pattern]) -> Option<Document> {
        let text = patterns
            .iter()
            .fold(self.text.clone(), |text, p| p.substitute("", &text).into_owned());
        if text.is_empty() {
            debug!(document = %self.name, "nada restou após remover padrões");
            return None;
        }
        Some(Self::assemble(self.name.clone(), text, Rc::clone(&self.splitter)))
    }

    /// Particiona o texto bruto nos matches de `label`: o texto entre um rótulo
    /// e o próximo vira a seção cujo nome é o grupo `group` do rótulo.
    pub fn split(&self, label: &str, group: usize) -> Result<Sections> {
        let label_rx = Regex::new(label).map_err(|source| Error::InvalidRegex {
            pattern: label.to_string(),
            source,
        })?;
        let mut sections = Sections::new();
        let mut open: Option<(String, usize)> = None;
        for caps in label_rx.captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if let Some((name, start)) = open.take() {
                let body = &self.text[start..whole.start()];
                sections.add(&name, body, start, &self.matches, self.splitter.as_ref());
            }
            open = caps
                .get(group)
                .filter(|g| !g.as_str().is_empty())
                .map(|g| (g.as_str().to_string(), whole.end()));
        }
        if let Some((name, start)) = open {
            sections.add(&name, &self.text[start..], start, &self.matches, self.splitter.as_ref());
        }
        debug!(document = %self.name, sections = sections.len(), "documento dividido");
        Ok(sections)
    }
}

impl SentenceView for Document {
    fn sentences(&self) -> &[Sentence] {
        self.sentences.sentences()
    }

    /// Texto limpo, ao qual os offsets das sentenças se referem.
    fn text(&self) -> &str {
        self.sentences.text()
    }

    fn matches(&self) -> &MatchCask {
        &self.matches
    }

    fn has_pattern(&self, pattern: &Pattern, options: MatchOptions) -> bool {
        self.has_pattern_in(pattern, options, Scope::Sentence)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Sentence;
    type IntoIter = std::slice::Iter<'a, Sentence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences.iter()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("bytes", &self.text.len())
            .field("sentences", &self.sentences.len())
            .field("matches", &self.matches.len())
            .finish_non_exhaustive()
    }
}

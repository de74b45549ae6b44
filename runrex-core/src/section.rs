//! # Seções
//!
//! Uma [`Section`] é um subconjunto ordenado (não necessariamente contíguo) das
//! sentenças de um documento, visto como um único texto: as sentenças membro
//! são unidas com `\n`. Padrões avaliados na seção rodam sobre esse texto
//! unido, o que permite casar expressões que atravessam sentenças vizinhas.
//!
//! Seções podem ser somadas (`a + b`): as sentenças são concatenadas (sem
//! ordenar nem remover repetidas) e o histórico resultante é uma cópia do da
//! esquerda estendida com os matches da direita. Nenhum operando é alterado.
//!
//! [`Sections`] é o mapa nome → seção produzido por `Document::split`.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use crate::matches::MatchCask;
use crate::pattern::{MatchOptions, Pattern};
use crate::sentence::Sentence;
use crate::splitter::SentenceSplitter;
use crate::view::SentenceView;

/// Grupo de sentenças tratado como um único texto.
#[derive(Debug, Clone, Default)]
pub struct Section {
    sentences: Vec<Sentence>,
    text: String,
    matches: MatchCask,
}

impl Section {
    /// Seção que registra matches em `matches` (normalmente o histórico do documento).
    pub fn new(sentences: Vec<Sentence>, matches: MatchCask) -> Self {
        let text = sentences
            .iter()
            .map(|s| s.text())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            sentences,
            text,
            matches,
        }
    }

    /// Seção com histórico próprio, semeado com cópias dos matches já
    /// registrados pelas sentenças membro.
    pub fn isolated(sentences: Vec<Sentence>) -> Self {
        let matches = MatchCask::new();
        let mut seen: Vec<&MatchCask> = Vec::new();
        for sentence in &sentences {
            let cask = sentence.matches();
            if !seen.iter().any(|c| c.shares_with(cask)) {
                matches.add_all(cask.snapshot());
                seen.push(cask);
            }
        }
        Self::new(sentences, matches)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Verdadeiro se há sentenças e o texto unido não está em branco.
    pub fn has_content(&self) -> bool {
        !self.sentences.is_empty() && !self.text.trim().is_empty()
    }

    /// Quantos dos padrões casam em algum lugar da seção.
    ///
    /// Sempre avalia todos os padrões (sem curto-circuito), por isso não há
    /// modo "todos" aqui.
    pub fn count_patterns(&self, patterns: &[&Pattern], options: MatchOptions) -> usize {
        patterns
            .iter()
            .filter(|p| self.has_pattern(p, options))
            .count()
    }
}

impl SentenceView for Section {
    fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn matches(&self) -> &MatchCask {
        &self.matches
    }

    fn has_pattern(&self, pattern: &Pattern, options: MatchOptions) -> bool {
        match pattern.matches(&self.text, options) {
            Some(m) => {
                self.matches.add(m);
                true
            }
            None => false,
        }
    }
}

impl Add<&Section> for &Section {
    type Output = Section;

    fn add(self, other: &Section) -> Section {
        let matches = self.matches.copy();
        matches.add_all(other.matches.snapshot());
        let sentences = self
            .sentences
            .iter()
            .chain(other.sentences.iter())
            .cloned()
            .collect();
        Section::new(sentences, matches)
    }
}

impl Add for Section {
    type Output = Section;

    fn add(self, other: Section) -> Section {
        &self + &other
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Seções nomeadas; as chaves são sempre maiúsculas.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    sections: BTreeMap<String, Section>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere (ou substitui) a seção `name`.
    pub fn insert(&mut self, name: &str, section: Section) {
        self.sections.insert(name.to_uppercase(), section);
    }

    /// Segmenta `text` (que começa no byte `base` do documento) e guarda o
    /// resultado como a seção `name`.
    pub(crate) fn add(
        &mut self,
        name: &str,
        text: &str,
        base: usize,
        matches: &MatchCask,
        splitter: &dyn SentenceSplitter,
    ) {
        let sentences = splitter
            .split(text)
            .into_iter()
            .filter(|segment| !segment.text.trim().is_empty())
            .map(|segment| Sentence::at(segment.text, base + segment.start, matches.clone()))
            .collect();
        self.insert(name, Section::new(sentences, matches.clone()));
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(&name.to_uppercase())
    }

    /// A seção `name`, ou uma seção vazia se não existir.
    pub fn section(&self, name: &str) -> Section {
        self.get(name).cloned().unwrap_or_default()
    }

    /// Soma das seções pedidas, na ordem dada; nomes ausentes são ignorados.
    pub fn combine<S: AsRef<str>>(&self, names: &[S]) -> Section {
        names
            .iter()
            .filter_map(|name| self.get(name.as_ref()))
            .fold(Section::empty(), |acc, section| &acc + section)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::NewlineSplitter;
    use crate::view::MatchMode;

    fn section(lines: &[&str]) -> Section {
        let cask = MatchCask::new();
        let sentences = lines
            .iter()
            .map(|line| Sentence::at(line, 0, cask.clone()))
            .collect();
        Section::new(sentences, cask)
    }

    #[test]
    fn test_section_joins_text() {
        let s = section(&["  first one. ", "second one."]);
        assert_eq!(s.text(), "first one.\nsecond one.");
        assert_eq!(s.to_string(), s.text());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_section_has_content() {
        assert!(!Section::empty().has_content());
        assert!(!section(&["   "]).has_content());
        assert!(section(&["text"]).has_content());
    }

    #[test]
    fn test_section_pattern_across_sentences() {
        let pattern = Pattern::new(r"pain\s+radiating").unwrap();
        let s = section(&["chest pain", "radiating to the arm"]);
        assert!(s.has_pattern(&pattern, MatchOptions::default()));
        assert_eq!(s.matches().len(), 1);
    }

    #[test]
    fn test_section_has_patterns_all_and_any() {
        let pain = Pattern::new("pain").unwrap();
        let fever = Pattern::new("fever").unwrap();
        let cough = Pattern::new("cough").unwrap();
        let s = section(&["chest pain", "no cough but fever"]);
        let options = MatchOptions::default();
        assert!(s.has_patterns(&[&pain, &fever], MatchMode::All, options));
        assert!(!s.has_patterns(&[&pain, &Pattern::new("rash").unwrap()], MatchMode::All, options));
        assert!(s.has_patterns(&[&Pattern::new("rash").unwrap(), &cough], MatchMode::Any, options));
    }

    #[test]
    fn test_section_count_patterns_evaluates_every_pattern() {
        let pain = Pattern::new("pain").unwrap();
        let rash = Pattern::new("rash").unwrap();
        let fever = Pattern::new("fever").unwrap();
        let s = section(&["chest pain", "fever"]);
        assert_eq!(s.count_patterns(&[&pain, &rash, &fever], MatchOptions::default()), 2);
        assert_eq!(s.matches().len(), 2);
    }

    #[test]
    fn test_section_add_concatenates_and_copies_history() {
        let left = section(&["a", "b"]);
        let right = section(&["b", "c"]);
        let pattern = Pattern::new("b").unwrap();
        assert!(left.has_pattern(&pattern, MatchOptions::default()));
        assert!(right.has_pattern(&pattern, MatchOptions::default()));

        let sum = &left + &right;
        let texts: Vec<&str> = sum.sentences().iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["a", "b", "b", "c"]);
        assert_eq!(sum.matches().len(), 2);
        assert!(!sum.matches().shares_with(left.matches()));

        assert!(sum.has_pattern(&pattern, MatchOptions::default()));
        assert_eq!(left.matches().len(), 1);
        assert_eq!(right.matches().len(), 1);

        let owned = left + right;
        assert_eq!(owned.len(), 4);
    }

    #[test]
    fn test_section_isolated_history() {
        let cask = MatchCask::new();
        let sentence = Sentence::at("this one", 0, cask.clone());
        let other = Sentence::at("this too", 9, cask.clone());
        let pattern = Pattern::new("this").unwrap();
        assert!(sentence.has_pattern(&pattern, MatchOptions::default()));

        let s = Section::isolated(vec![sentence, other]);
        assert_eq!(s.matches().len(), 1);
        assert!(s.has_pattern(&pattern, MatchOptions::default()));
        assert_eq!(s.matches().len(), 2);
        assert_eq!(cask.len(), 1);
    }

    #[test]
    fn test_sections_lookup_and_combine() {
        let cask = MatchCask::new();
        let mut sections = Sections::new();
        sections.add("history", "old notes\nmore notes", 10, &cask, &NewlineSplitter);
        sections.add("Plan", "follow up", 40, &cask, &NewlineSplitter);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections.names().collect::<Vec<_>>(), vec!["HISTORY", "PLAN"]);
        let history = sections.get("History").unwrap();
        assert_eq!(history.sentences()[1].start(), 20);
        assert!(history.matches().shares_with(&cask));

        assert!(!sections.section("missing").has_content());
        let combined = sections.combine(&["plan", "missing", "history"]);
        assert_eq!(combined.text(), "follow up\nold notes\nmore notes");
    }
}

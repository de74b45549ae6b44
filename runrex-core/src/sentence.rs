//! # Sentenças com Offsets Absolutos
//!
//! Uma [`Sentence`] é um trecho aparado do texto do documento. Ela guarda os
//! offsets de byte `[start, end)` do trecho **depois** de remover espaços nas
//! bordas, então `end - start == text.len()` sempre vale.
//!
//! Os offsets devolvidos por `locate`/`locate_all` são o offset do match dentro
//! da sentença somado a `start`: ficam relativos ao documento, não importa
//! quantas camadas de segmentação existam entre os dois.

use std::fmt;
use std::ops::{Index, Range};

use rayon::prelude::*;

use crate::matches::{Located, Match, MatchCask};
use crate::pattern::{MatchOptions, Pattern};
use crate::splitter::{NewlineSplitter, SentenceSplitter};
use crate::view::SentenceView;

/// Unidade mínima de texto, aparada e posicionada.
#[derive(Debug, Clone)]
pub struct Sentence {
    text: String,
    start: usize,
    end: usize,
    matches: MatchCask,
}

impl Sentence {
    /// Sentença avulsa: offset 0 e histórico próprio.
    pub fn new(text: &str) -> Self {
        Self::at(text, 0, MatchCask::new())
    }

    /// Sentença cujo texto (ainda não aparado) começa no byte `start` do
    /// documento, registrando matches em `matches`.
    pub fn at(text: &str, start: usize, matches: MatchCask) -> Self {
        let left = text.trim_start();
        let leading = text.len() - left.len();
        let trimmed = left.trim_end();
        let start = start + leading;
        Self {
            text: trimmed.to_string(),
            start,
            end: start + trimmed.len(),
            matches,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Primeiro match do padrão nesta sentença (grupo `group`), com offsets
    /// absolutos. O match é registrado no histórico.
    pub fn locate(&self, pattern: &Pattern, group: usize) -> Option<Located> {
        let m = pattern.matches(&self.text, MatchOptions::default())?;
        let located = Located::from_match(&m, group, self.start);
        self.matches.add(m);
        located
    }

    /// Todos os matches do padrão nesta sentença, com offsets absolutos.
    /// Preguiçoso: cada match é registrado no histórico ao ser produzido.
    pub fn locate_all<'a>(
        &'a self,
        pattern: &'a Pattern,
        group: usize,
    ) -> impl Iterator<Item = Located> + 'a {
        pattern
            .find_all(&self.text, MatchOptions::default())
            .filter_map(move |m| {
                let located = Located::from_match(&m, group, self.start);
                self.matches.add(m);
                located
            })
    }
}

impl SentenceView for Sentence {
    fn sentences(&self) -> &[Sentence] {
        std::slice::from_ref(self)
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

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Sequência ordenada de sentenças construída uma única vez por um splitter.
///
/// Segmentos em branco são descartados; os demais compartilham o mesmo
/// histórico de matches.
#[derive(Debug, Clone, Default)]
pub struct Sentences {
    text: String,
    sentences: Vec<Sentence>,
    matches: MatchCask,
}

impl Sentences {
    pub fn new(text: impl Into<String>, matches: MatchCask, splitter: &dyn SentenceSplitter) -> Self {
        let text = text.into();
        let sentences = splitter
            .split(&text)
            .into_iter()
            .filter(|segment| !segment.text.trim().is_empty())
            .map(|segment| Sentence::at(segment.text, segment.start, matches.clone()))
            .collect();
        Self {
            text,
            sentences,
            matches,
        }
    }

    /// Segmenta por linha, com um histórico novo.
    pub fn from_text(text: &str) -> Self {
        Self::new(text, MatchCask::new(), &NewlineSplitter)
    }

    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sentence> {
        self.sentences.iter()
    }

    /// Mesmo resultado de `locate_all`, avaliando as sentenças em paralelo.
    ///
    /// Cada worker coleta em um buffer isolado; os matches entram no histórico
    /// depois, na ordem das sentenças.
    pub fn par_locate_all(&self, pattern: &Pattern, group: usize) -> Vec<Located> {
        let texts: Vec<&str> = self.sentences.iter().map(|s| s.text.as_str()).collect();
        let found: Vec<Vec<Match>> = texts
            .par_iter()
            .map(|text| pattern.find_all(text, MatchOptions::default()).collect())
            .collect();

        let mut located = Vec::new();
        for (sentence, matches) in self.sentences.iter().zip(found) {
            for m in matches {
                located.extend(Located::from_match(&m, group, sentence.start));
                sentence.matches.add(m);
            }
        }
        located
    }
}

impl SentenceView for Sentences {
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
        self.sentences.iter().any(|s| s.has_pattern(pattern, options))
    }
}

impl Index<usize> for Sentences {
    type Output = Sentence;

    fn index(&self, index: usize) -> &Sentence {
        &self.sentences[index]
    }
}

impl<'a> IntoIterator for &'a Sentences {
    type Item = &'a Sentence;
    type IntoIter = std::slice::Iter<'a, Sentence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MatchMode;

    #[test]
    fn test_sentence_trim_invariant() {
        let sentence = Sentence::new("\t I want this, or that.\n");
        assert_eq!(sentence.text(), "I want this, or that.");
        assert_eq!(sentence.start(), 2);
        assert_eq!(sentence.end() - sentence.start(), sentence.text().len());
    }

    #[test]
    fn test_sentence_locate_offsets() {
        let pattern = Pattern::new("(this|that)").unwrap();
        let sentence = Sentence::new("\t I want this, or that.\n");
        let located = sentence.locate(&pattern, 0).unwrap();
        assert_eq!(located, Located { text: "this".into(), start: 9, end: 13 });
        assert_eq!(sentence.matches().len(), 1);
    }

    #[test]
    fn test_sentence_offsets_relative_to_document() {
        let pattern = Pattern::new("(this|that)").unwrap();
        let raw = "  and that one\n";
        let base = 40;
        let sentence = Sentence::at(raw, base, MatchCask::new());
        let located = sentence.locate(&pattern, 1).unwrap();
        assert_eq!(&raw[located.start - base..located.end - base], located.text);
        assert_eq!(located.text, "that");
    }

    #[test]
    fn test_sentence_locate_missing() {
        let pattern = Pattern::new("absent").unwrap();
        let sentence = Sentence::new("nothing to see");
        assert!(sentence.locate(&pattern, 0).is_none());
        assert!(sentence.matches().is_empty());
    }

    #[test]
    fn test_sentence_locate_all() {
        let pattern = Pattern::new("(this|that)").unwrap();
        let sentence = Sentence::new(" I want this, or that.\n");
        let found: Vec<Located> = sentence.locate_all(&pattern, 0).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1], Located { text: "that".into(), start: 17, end: 21 });
        assert_eq!(sentence.matches().len(), 2);
    }

    #[test]
    fn test_sentence_has_patterns_modes() {
        let this = Pattern::new("this").unwrap();
        let other = Pattern::new("other").unwrap();
        let sentence = Sentence::new("I want this");
        assert!(sentence.has_patterns(&[&other, &this], MatchMode::Any, MatchOptions::default()));
        assert!(!sentence.has_patterns(&[&this, &other], MatchMode::All, MatchOptions::default()));
        assert!(sentence.has_patterns(&[], MatchMode::All, MatchOptions::default()));
        assert!(!sentence.has_patterns(&[], MatchMode::Any, MatchOptions::default()));
    }

    #[test]
    fn test_sentences_skip_blank_segments() {
        let sentences = Sentences::from_text(" I want this, or that.\n\n But not that");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text(), "But not that");
        assert_eq!(sentences[1].start(), 25);
    }

    #[test]
    fn test_sentences_locate_absolute() {
        let pattern = Pattern::new("(this|that)").unwrap();
        let sentences = Sentences::from_text(" I want this, or that.\n These and those.");
        let located = sentences.locate(&pattern, 0).unwrap();
        assert_eq!(located, Located { text: "this".into(), start: 8, end: 12 });
    }

    #[test]
    fn test_sentences_locate_all_across_sentences() {
        let pattern = Pattern::new("(this|that)").unwrap();
        let sentences = Sentences::from_text(" I want this, or that.\n\n But not that");
        assert_eq!(sentences.locate_all(&pattern, 0).count(), 3);
        assert_eq!(sentences.matches().len(), 3);
    }

    #[test]
    fn test_sentences_first_matching() {
        let pattern = Pattern::new("not").unwrap();
        let sentences = Sentences::from_text("first\nbut not second\nnot third");
        let sentence = sentences.first_matching(&pattern, MatchOptions::default()).unwrap();
        assert_eq!(sentence.text(), "but not second");
        assert!(sentences.has_pattern(&pattern, MatchOptions::default()));
    }

    #[test]
    fn test_par_locate_all_matches_sequential_order() {
        let pattern = Pattern::new("(this|that)").unwrap();
        let text = "this\nnone here\nthat and this\n  that";
        let sequential: Vec<Located> = Sentences::from_text(text).locate_all(&pattern, 0).collect();
        let sentences = Sentences::from_text(text);
        let parallel = sentences.par_locate_all(&pattern, 0);
        assert_eq!(parallel, sequential);
        let recorded: Vec<String> = sentences
            .matches()
            .snapshot()
            .iter()
            .map(|m| m.as_str().to_string())
            .collect();
        assert_eq!(recorded, vec!["this", "that", "this", "that"]);
    }
}

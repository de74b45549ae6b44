//! # Correspondências e o Histórico Compartilhado (`MatchCask`)
//!
//! Toda avaliação de padrão que dá certo gera um [`Match`]: uma cópia
//! independente (owned) do trecho casado, com os grupos de captura e seus
//! offsets. Os matches são acumulados em um [`MatchCask`].
//!
//! ## Compartilhamento
//!
//! O `MatchCask` é um *handle* com contagem de referências: clonar o cask
//! (`clone()`) devolve outro handle para o **mesmo** histórico. É assim que
//! `Document`, todas as suas `Sentence`s e as `Section`s derivadas escrevem
//! em um único log. Para obter um histórico isolado, use [`MatchCask::copy`].

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Um grupo de captura: texto e offsets de byte relativos ao texto pesquisado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub text: String,
    /// Byte inicial (inclusivo).
    pub start: usize,
    /// Byte final (exclusivo).
    pub end: usize,
}

impl From<regex::Match<'_>> for Capture {
    fn from(m: regex::Match<'_>) -> Self {
        Self {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        }
    }
}

/// Uma ocorrência do padrão principal que passou pelas restrições.
///
/// Quando o padrão tem `capture_length`, os grupos brutos são "comprimidos"
/// na tupla da alternativa que de fato casou; os acessores por índice
/// (`group`, `start`, `end`) passam a ler dessa tupla para `index > 0`.
/// O índice 0 é sempre o match inteiro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    whole: Capture,
    groups: Vec<Option<Capture>>,
    compressed: Option<Vec<Option<Capture>>>,
}

impl Match {
    pub(crate) fn new(
        whole: Capture,
        groups: Vec<Option<Capture>>,
        compressed: Option<Vec<Option<Capture>>>,
    ) -> Self {
        Self {
            whole,
            groups,
            compressed,
        }
    }

    /// Texto completo do match.
    pub fn as_str(&self) -> &str {
        &self.whole.text
    }

    pub fn range(&self) -> Range<usize> {
        self.whole.start..self.whole.end
    }

    fn capture(&self, index: usize) -> Option<&Capture> {
        if index == 0 {
            return Some(&self.whole);
        }
        let groups = self.compressed.as_ref().unwrap_or(&self.groups);
        groups.get(index - 1).and_then(Option::as_ref)
    }

    /// Texto do grupo `index` (`None` se o grupo não participou do match).
    pub fn group(&self, index: usize) -> Option<&str> {
        self.capture(index).map(|c| c.text.as_str())
    }

    pub fn start(&self, index: usize) -> Option<usize> {
        self.capture(index).map(|c| c.start)
    }

    pub fn end(&self, index: usize) -> Option<usize> {
        self.capture(index).map(|c| c.end)
    }

    /// Grupos lógicos: a tupla comprimida se houver, senão os grupos brutos.
    pub fn groups(&self) -> Vec<Option<&str>> {
        self.compressed
            .as_ref()
            .unwrap_or(&self.groups)
            .iter()
            .map(|g| g.as_ref().map(|c| c.text.as_str()))
            .collect()
    }

    /// Grupos de captura brutos, na ordem do regex.
    pub fn raw_groups(&self) -> &[Option<Capture>] {
        &self.groups
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed.is_some()
    }
}

/// Resultado posicionado de `locate`: texto do grupo pedido e offsets
/// absolutos no texto (limpo) do documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Located {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Located {
    /// Converte o grupo `group` de `m` somando `base` aos offsets.
    pub(crate) fn from_match(m: &Match, group: usize, base: usize) -> Option<Self> {
        let capture = m.capture(group)?;
        Some(Self {
            text: capture.text.clone(),
            start: capture.start + base,
            end: capture.end + base,
        })
    }
}

/// Log ordenado, somente-inclusão, de matches.
///
/// Duplicatas não são removidas. `clone()` compartilha; `copy()` isola.
#[derive(Debug, Clone, Default)]
pub struct MatchCask {
    matches: Rc<RefCell<Vec<Match>>>,
}

impl MatchCask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, m: Match) {
        self.matches.borrow_mut().push(m);
    }

    pub fn add_all(&self, matches: impl IntoIterator<Item = Match>) {
        self.matches.borrow_mut().extend(matches);
    }

    /// Cópia rasa em um novo histórico independente.
    pub fn copy(&self) -> Self {
        Self {
            matches: Rc::new(RefCell::new(self.snapshot())),
        }
    }

    /// `true` se os dois handles apontam para o mesmo histórico.
    pub fn shares_with(&self, other: &MatchCask) -> bool {
        Rc::ptr_eq(&self.matches, &other.matches)
    }

    pub fn len(&self) -> usize {
        self.matches.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Match> {
        self.matches.borrow().get(index).cloned()
    }

    /// Cópia dos matches atuais, na ordem em que foram registrados.
    pub fn snapshot(&self) -> Vec<Match> {
        self.matches.borrow().clone()
    }

    /// Conjunto (ordenado) dos textos casados.
    pub fn texts(&self) -> BTreeSet<String> {
        self.matches
            .borrow()
            .iter()
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl fmt::Display for MatchCask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.texts())
    }
}

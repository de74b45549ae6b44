//! # Interface Comum dos Contêineres de Texto
//!
//! `Sentence`, `Sentences`, `Section` e `Document` expõem o mesmo conjunto de
//! capacidades: iterar sentenças, oferecer um texto, avaliar um padrão e
//! avaliar um conjunto de padrões. [`SentenceView`] reúne isso em um único
//! trait; cada tipo implementa só o que muda (`has_pattern`) e herda o resto.
//!
//! ## Semântica de agregação
//!
//! - [`MatchMode::Any`]: verdadeiro no primeiro padrão satisfeito (curto-circuito).
//! - [`MatchMode::All`]: falso no primeiro padrão não satisfeito; verdadeiro só
//!   depois que todos forem satisfeitos.

use serde::{Deserialize, Serialize};

use crate::matches::{Located, MatchCask};
use crate::pattern::{MatchOptions, Pattern};
use crate::sentence::Sentence;

/// Como combinar vários padrões em uma consulta agregada.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Pelo menos um padrão precisa casar.
    #[default]
    Any,
    /// Todos os padrões precisam casar.
    All,
}

impl MatchMode {
    /// Combina os resultados de `eval` sobre `items` com curto-circuito.
    pub fn evaluate<T>(self, items: impl IntoIterator<Item = T>, mut eval: impl FnMut(T) -> bool) -> bool {
        let mut items = items.into_iter();
        match self {
            MatchMode::Any => items.any(|item| eval(item)),
            MatchMode::All => items.all(|item| eval(item)),
        }
    }
}

/// Capacidades compartilhadas por todo contêiner de sentenças.
pub trait SentenceView {
    /// Sentenças membro, em ordem.
    fn sentences(&self) -> &[Sentence];

    /// Texto de referência do contêiner.
    fn text(&self) -> &str;

    /// Histórico de matches onde este contêiner registra suas avaliações.
    fn matches(&self) -> &MatchCask;

    /// Avalia um único padrão; registra o match no histórico quando houver.
    fn has_pattern(&self, pattern: &Pattern, options: MatchOptions) -> bool;

    fn has_patterns(&self, patterns: &[&Pattern], mode: MatchMode, options: MatchOptions) -> bool {
        mode.evaluate(patterns, |p| self.has_pattern(p, options))
    }

    /// Primeira sentença membro em que o padrão casa.
    fn first_matching(&self, pattern: &Pattern, options: MatchOptions) -> Option<&Sentence> {
        self.sentences()
            .iter()
            .find(|sentence| sentence.has_pattern(pattern, options))
    }

    /// Primeiro match (grupo `group`) na primeira sentença que casar, com
    /// offsets absolutos.
    fn locate(&self, pattern: &Pattern, group: usize) -> Option<Located> {
        self.sentences()
            .iter()
            .find_map(|sentence| sentence.locate(pattern, group))
    }

    /// Todos os matches de todas as sentenças, na ordem do texto.
    fn locate_all<'a>(
        &'a self,
        pattern: &'a Pattern,
        group: usize,
    ) -> impl Iterator<Item = Located> + 'a {
        self.sentences()
            .iter()
            .flat_map(move |sentence| sentence.locate_all(pattern, group))
    }

    fn len(&self) -> usize {
        self.sentences().len()
    }

    fn is_empty(&self) -> bool {
        self.sentences().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_mode_short_circuits() {
        let mut seen = Vec::new();
        assert!(MatchMode::Any.evaluate([false, true, true], |b| {
            seen.push(b);
            b
        }));
        assert_eq!(seen, vec![false, true]);

        seen.clear();
        assert!(!MatchMode::All.evaluate([true, false, true], |b| {
            seen.push(b);
            b
        }));
        assert_eq!(seen, vec![true, false]);

        assert!(MatchMode::All.evaluate(Vec::<bool>::new(), |b| b));
        assert!(!MatchMode::Any.evaluate(Vec::<bool>::new(), |b| b));
    }
}

//! Grammar model: productions, symbol classes, and load-time validation.

use indexmap::IndexSet;
use smartstring::alias::String;
use std::collections::HashMap;
use thiserror::Error;

/// The epsilon marker. A production whose right-hand side is the single
/// symbol `ε` derives the empty string; it is normalized to an empty
/// right-hand side at grammar load.
pub const EPSILON: &str = "ε";

/// The end-of-input terminal appended to every token stream.
pub const END_MARKER: &str = "$";

/// The augmented start non-terminal. Its only production, `S' → S`,
/// must carry production id 0.
pub const AUGMENTED_START: &str = "S'";

/// A single production `left → right`.
///
/// `id` is a dense index into the grammar's production list and is the
/// value stored in LR(0) items and reduce actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub id: usize,
    pub left: String,
    pub right: Vec<String>,
}

impl Production {
    pub fn new(id: usize, left: &str, right: &[&str]) -> Self {
        Self {
            id,
            left: left.into(),
            right: right.iter().map(|s| (*s).into()).collect(),
        }
    }

    /// True for `A → ε` productions (empty right-hand side after
    /// normalization).
    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    Empty,

    #[error("production ids are not dense: expected id {expected}, found {found}")]
    NonDenseIds { expected: usize, found: usize },

    #[error("production 0 must be S' -> {start}, found {found}")]
    MissingAugmented { start: String, found: String },

    #[error("augmented start S' has a second production (id {id})")]
    DuplicateAugmented { id: usize },

    #[error("production {id}: left symbol `{symbol}` is not a declared non-terminal")]
    UndeclaredLeft { id: usize, symbol: String },

    #[error("production {id}: unknown symbol `{symbol}` on the right-hand side")]
    UnknownSymbol { id: usize, symbol: String },

    #[error("production {id}: ε must be the sole right-hand-side symbol")]
    MisplacedEpsilon { id: usize },
}

/// An immutable context-free grammar.
///
/// Construction validates the production list against the declared
/// symbol sets; afterwards the grammar only answers read-only queries.
/// Symbols partition into terminals, non-terminals, and the epsilon
/// marker; the sets must be disjoint by construction of the caller.
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<Production>,
    nonterminals: IndexSet<String>,
    terminals: IndexSet<String>,
    start: String,
    by_left: HashMap<String, Vec<usize>>,
}

impl Grammar {
    /// Validates and builds a grammar.
    ///
    /// Checks, in order: the list is non-empty; ids are dense from 0;
    /// production 0 is `S' → start` and no other production has left
    /// `S'`; every left symbol is a declared non-terminal; every
    /// right-hand-side symbol is a declared terminal or non-terminal,
    /// or `ε` standing alone. ε right-hand sides are normalized to
    /// empty vectors.
    pub fn try_new(
        mut productions: Vec<Production>,
        nonterminals: IndexSet<String>,
        terminals: IndexSet<String>,
        start: &str,
    ) -> Result<Self, GrammarError> {
        if productions.is_empty() {
            return Err(GrammarError::Empty);
        }
        for (expected, prod) in productions.iter().enumerate() {
            if prod.id != expected {
                return Err(GrammarError::NonDenseIds {
                    expected,
                    found: prod.id,
                });
            }
        }

        let first = &productions[0];
        if first.left != AUGMENTED_START
            || first.right.len() != 1
            || first.right[0] != start
        {
            let found = format!(
                "{} -> {}",
                first.left,
                first
                    .right
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            return Err(GrammarError::MissingAugmented {
                start: start.into(),
                found: found.into(),
            });
        }
        if let Some(dup) = productions[1..]
            .iter()
            .find(|p| p.left == AUGMENTED_START)
        {
            return Err(GrammarError::DuplicateAugmented { id: dup.id });
        }

        for prod in &mut productions {
            if !nonterminals.contains(prod.left.as_str()) {
                return Err(GrammarError::UndeclaredLeft {
                    id: prod.id,
                    symbol: prod.left.clone(),
                });
            }
            if prod.right.iter().any(|s| s == EPSILON) {
                if prod.right.len() != 1 {
                    return Err(GrammarError::MisplacedEpsilon { id: prod.id });
                }
                prod.right.clear();
                continue;
            }
            for sym in &prod.right {
                if !terminals.contains(sym.as_str()) && !nonterminals.contains(sym.as_str()) {
                    return Err(GrammarError::UnknownSymbol {
                        id: prod.id,
                        symbol: sym.clone(),
                    });
                }
            }
        }

        let mut by_left: HashMap<String, Vec<usize>> = HashMap::new();
        for prod in &productions {
            by_left.entry(prod.left.clone()).or_default().push(prod.id);
        }

        Ok(Self {
            productions,
            nonterminals,
            terminals,
            start: start.into(),
            by_left,
        })
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: usize) -> &Production {
        &self.productions[id]
    }

    /// Ids of all productions with the given left-hand side, in id
    /// order. Empty for unknown symbols and terminals.
    pub fn productions_for(&self, left: &str) -> &[usize] {
        self.by_left.get(left).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.contains(symbol)
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }

    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    pub fn terminals(&self) -> &IndexSet<String> {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &IndexSet<String> {
        &self.nonterminals
    }
}

/// Convenience constructor for the declared symbol sets.
pub fn symbol_set(symbols: &[&str]) -> IndexSet<String> {
    symbols.iter().map(|s| (*s).into()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_productions() -> Vec<Production> {
        vec![
            Production::new(0, "S'", &["S"]),
            Production::new(1, "S", &["a", "S"]),
            Production::new(2, "S", &["ε"]),
        ]
    }

    fn toy_grammar() -> Result<Grammar, GrammarError> {
        Grammar::try_new(
            toy_productions(),
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
    }

    #[test]
    fn builds_and_normalizes_epsilon() {
        let g = toy_grammar().unwrap();
        assert_eq!(g.productions().len(), 3);
        assert!(g.production(2).is_epsilon());
        assert!(g.production(2).right.is_empty());
        assert_eq!(g.productions_for("S"), &[1, 2]);
        assert_eq!(g.start_symbol(), "S");
        assert!(g.is_terminal("a"));
        assert!(g.is_nonterminal("S'"));
        assert!(!g.is_terminal("S"));
    }

    #[test]
    fn rejects_non_dense_ids() {
        let mut prods = toy_productions();
        prods[2].id = 7;
        let err = Grammar::try_new(
            prods,
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GrammarError::NonDenseIds {
                expected: 2,
                found: 7
            }
        ));
    }

    #[test]
    fn rejects_missing_augmented_production() {
        let prods = vec![
            Production::new(0, "S", &["a"]),
        ];
        let err = Grammar::try_new(
            prods,
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::MissingAugmented { .. }));
    }

    #[test]
    fn rejects_second_augmented_production() {
        let mut prods = toy_productions();
        prods.push(Production::new(3, "S'", &["S"]));
        let err = Grammar::try_new(
            prods,
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateAugmented { id: 3 }));
    }

    #[test]
    fn rejects_unknown_rhs_symbol() {
        let mut prods = toy_productions();
        prods[1] = Production::new(1, "S", &["b", "S"]);
        let err = Grammar::try_new(
            prods,
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap_err();
        assert!(
            matches!(err, GrammarError::UnknownSymbol { id: 1, ref symbol } if symbol == "b")
        );
    }

    #[test]
    fn rejects_epsilon_mixed_into_rhs() {
        let mut prods = toy_productions();
        prods[2] = Production::new(2, "S", &["a", "ε"]);
        let err = Grammar::try_new(
            prods,
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::MisplacedEpsilon { id: 2 }));
    }

    #[test]
    fn rejects_undeclared_left_symbol() {
        let prods = vec![
            Production::new(0, "S'", &["S"]),
            Production::new(1, "S", &["a"]),
            Production::new(2, "T", &["a"]),
        ];
        let err = Grammar::try_new(
            prods,
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap_err();
        assert!(
            matches!(err, GrammarError::UndeclaredLeft { id: 2, ref symbol } if symbol == "T")
        );
    }
}

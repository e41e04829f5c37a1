//! FIRST and FOLLOW set computation.
//!
//! Both functions are least fixpoints over finite sets of terminals:
//! the engine iterates over all productions until a full pass grows no
//! set. The change flag is global, not per-production, because a later
//! production can enable an earlier one within the same pass.

use crate::grammar::{AUGMENTED_START, END_MARKER, EPSILON, Grammar};
use smartstring::alias::String;
use std::collections::{BTreeSet, HashMap};

type SymbolSet = BTreeSet<String>;

/// Computed FIRST and FOLLOW sets for a grammar.
///
/// Built once at construction; afterwards [`first`](Self::first),
/// [`first_of_string`](Self::first_of_string), and
/// [`follow`](Self::follow) are read-only queries. Ill-formed grammars
/// are rejected structurally by [`Grammar::try_new`], so construction
/// itself cannot fail.
#[derive(Debug)]
pub struct FirstFollow {
    first: HashMap<String, SymbolSet>,
    follow: HashMap<String, SymbolSet>,
    empty: SymbolSet,
}

impl FirstFollow {
    pub fn new(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        Self {
            first,
            follow,
            empty: SymbolSet::new(),
        }
    }

    /// FIRST of a single symbol. `{a}` for a terminal `a`, `{ε}` for
    /// the epsilon marker, the computed set for a non-terminal, and the
    /// empty set for symbols the grammar does not know.
    pub fn first(&self, symbol: &str) -> &SymbolSet {
        self.first.get(symbol).unwrap_or(&self.empty)
    }

    /// FIRST of a symbol string under the all-nullable-prefix rule.
    /// The empty string yields `{ε}`.
    pub fn first_of_string(&self, symbols: &[String]) -> SymbolSet {
        first_of(&self.first, symbols)
    }

    /// FOLLOW of a non-terminal. Never contains `ε`; contains `$` for
    /// every non-terminal that can end a sentential form.
    pub fn follow(&self, nonterminal: &str) -> &SymbolSet {
        self.follow.get(nonterminal).unwrap_or(&self.empty)
    }
}

fn first_of(first: &HashMap<String, SymbolSet>, symbols: &[String]) -> SymbolSet {
    let mut result = SymbolSet::new();
    let mut all_nullable = true;
    for sym in symbols {
        let first_sym = first.get(sym.as_str()).cloned().unwrap_or_default();
        for s in &first_sym {
            if s != EPSILON {
                result.insert(s.clone());
            }
        }
        if !first_sym.contains(EPSILON) {
            all_nullable = false;
            break;
        }
    }
    if all_nullable {
        result.insert(EPSILON.into());
    }
    result
}

fn compute_first(grammar: &Grammar) -> HashMap<String, SymbolSet> {
    let mut first: HashMap<String, SymbolSet> = HashMap::new();
    for term in grammar.terminals() {
        first.insert(term.clone(), SymbolSet::from([term.clone()]));
    }
    for nt in grammar.nonterminals() {
        first.insert(nt.clone(), SymbolSet::new());
    }
    first.insert(EPSILON.into(), SymbolSet::from([String::from(EPSILON)]));

    let mut changed = true;
    while changed {
        changed = false;
        for prod in grammar.productions() {
            let mut all_nullable = true;
            for sym in &prod.right {
                // Snapshot FIRST(sym) to avoid borrowing two entries at once.
                let first_sym = first.get(sym.as_str()).cloned().unwrap_or_default();
                let entry = first.get_mut(prod.left.as_str()).unwrap();
                for s in &first_sym {
                    if s != EPSILON && entry.insert(s.clone()) {
                        changed = true;
                    }
                }
                if !first_sym.contains(EPSILON) {
                    all_nullable = false;
                    break;
                }
            }
            // ε-productions have an empty right-hand side and fall
            // straight through to the nullable case.
            if all_nullable {
                let entry = first.get_mut(prod.left.as_str()).unwrap();
                if entry.insert(EPSILON.into()) {
                    changed = true;
                }
            }
        }
    }
    first
}

fn compute_follow(
    grammar: &Grammar,
    first: &HashMap<String, SymbolSet>,
) -> HashMap<String, SymbolSet> {
    let mut follow: HashMap<String, SymbolSet> = HashMap::new();
    for nt in grammar.nonterminals() {
        follow.insert(nt.clone(), SymbolSet::new());
    }
    follow
        .get_mut(AUGMENTED_START)
        .unwrap()
        .insert(END_MARKER.into());

    let mut changed = true;
    while changed {
        changed = false;
        for prod in grammar.productions() {
            for (i, sym) in prod.right.iter().enumerate() {
                if !grammar.is_nonterminal(sym) {
                    continue;
                }
                let first_rest = first_of(first, &prod.right[i + 1..]);
                let rest_nullable = first_rest.contains(EPSILON);

                let entry = follow.get_mut(sym.as_str()).unwrap();
                for s in &first_rest {
                    if s != EPSILON && entry.insert(s.clone()) {
                        changed = true;
                    }
                }
                if rest_nullable {
                    let follow_left = follow.get(prod.left.as_str()).cloned().unwrap_or_default();
                    let entry = follow.get_mut(sym.as_str()).unwrap();
                    for s in follow_left {
                        if entry.insert(s) {
                            changed = true;
                        }
                    }
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Production, symbol_set};

    fn set(items: &[&str]) -> SymbolSet {
        items.iter().map(|s| String::from(*s)).collect()
    }

    /// The dragon-book expression grammar:
    /// E -> E + T | T; T -> T * F | F; F -> ( E ) | id
    fn expr_grammar() -> Grammar {
        Grammar::try_new(
            vec![
                Production::new(0, "S'", &["E"]),
                Production::new(1, "E", &["E", "+", "T"]),
                Production::new(2, "E", &["T"]),
                Production::new(3, "T", &["T", "*", "F"]),
                Production::new(4, "T", &["F"]),
                Production::new(5, "F", &["(", "E", ")"]),
                Production::new(6, "F", &["id"]),
            ],
            symbol_set(&["S'", "E", "T", "F"]),
            symbol_set(&["+", "*", "(", ")", "id", "$"]),
            "E",
        )
        .unwrap()
    }

    /// A grammar with nullable chains:
    /// Z -> d | X Y Z; Y -> ε | c; X -> Y | a
    fn nullable_grammar() -> Grammar {
        Grammar::try_new(
            vec![
                Production::new(0, "S'", &["Z"]),
                Production::new(1, "Z", &["d"]),
                Production::new(2, "Z", &["X", "Y", "Z"]),
                Production::new(3, "Y", &["ε"]),
                Production::new(4, "Y", &["c"]),
                Production::new(5, "X", &["Y"]),
                Production::new(6, "X", &["a"]),
            ],
            symbol_set(&["S'", "Z", "Y", "X"]),
            symbol_set(&["a", "c", "d", "$"]),
            "Z",
        )
        .unwrap()
    }

    #[test]
    fn first_of_terminal_is_itself() {
        let ff = FirstFollow::new(&expr_grammar());
        assert_eq!(*ff.first("id"), set(&["id"]));
        assert_eq!(*ff.first("+"), set(&["+"]));
        assert_eq!(*ff.first(EPSILON), set(&[EPSILON]));
    }

    #[test]
    fn first_sets_of_expression_grammar() {
        let ff = FirstFollow::new(&expr_grammar());
        assert_eq!(*ff.first("E"), set(&["(", "id"]));
        assert_eq!(*ff.first("T"), set(&["(", "id"]));
        assert_eq!(*ff.first("F"), set(&["(", "id"]));
    }

    #[test]
    fn follow_sets_of_expression_grammar() {
        let ff = FirstFollow::new(&expr_grammar());
        assert_eq!(*ff.follow("E"), set(&["+", ")", "$"]));
        assert_eq!(*ff.follow("T"), set(&["+", "*", ")", "$"]));
        assert_eq!(*ff.follow("F"), set(&["+", "*", ")", "$"]));
        assert!(ff.follow("S'").contains(END_MARKER));
    }

    #[test]
    fn nullable_first_sets() {
        let ff = FirstFollow::new(&nullable_grammar());
        assert_eq!(*ff.first("Y"), set(&["c", EPSILON]));
        assert_eq!(*ff.first("X"), set(&["a", "c", EPSILON]));
        assert_eq!(*ff.first("Z"), set(&["a", "c", "d"]));
    }

    #[test]
    fn nullable_follow_sets() {
        let ff = FirstFollow::new(&nullable_grammar());
        assert_eq!(*ff.follow("Z"), set(&["$"]));
        assert_eq!(*ff.follow("X"), set(&["a", "c", "d"]));
        assert_eq!(*ff.follow("Y"), set(&["a", "c", "d"]));
    }

    #[test]
    fn follow_never_contains_epsilon() {
        let g = nullable_grammar();
        let ff = FirstFollow::new(&g);
        for nt in g.nonterminals() {
            assert!(!ff.follow(nt).contains(EPSILON), "FOLLOW({nt}) holds ε");
        }
    }

    #[test]
    fn first_of_string_handles_nullable_prefix() {
        let ff = FirstFollow::new(&nullable_grammar());
        let ys: Vec<String> = vec!["Y".into(), "c".into()];
        assert_eq!(ff.first_of_string(&ys), set(&["c"]));
        let yz: Vec<String> = vec!["Y".into(), "Z".into()];
        assert_eq!(ff.first_of_string(&yz), set(&["a", "c", "d"]));
        let y: Vec<String> = vec!["Y".into()];
        assert_eq!(ff.first_of_string(&y), set(&["c", EPSILON]));
        assert_eq!(ff.first_of_string(&[]), set(&[EPSILON]));
    }

    #[test]
    fn reachable_nonterminals_have_nonempty_first() {
        let g = expr_grammar();
        let ff = FirstFollow::new(&g);
        for nt in ["E", "T", "F"] {
            assert!(!ff.first(nt).is_empty(), "FIRST({nt}) is empty");
        }
    }
}

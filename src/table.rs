//! SLR(1) ACTION/GOTO table construction and the debug serializer.

use crate::grammar::{AUGMENTED_START, END_MARKER, Grammar};
use crate::items::{ItemSet, canonical_collection, goto};
use crate::sets::FirstFollow;
use indexmap::IndexSet;
use smartstring::alias::String;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// A parse action. Undefined `(state, terminal)` pairs are implicit
/// errors and are represented by absence from the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(prod) => write!(f, "r{prod}"),
            Action::Accept => write!(f, "acc"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    /// Two distinct actions competed for the same `(state, terminal)`
    /// cell. The grammar is not SLR(1); no precedence scheme is
    /// consulted.
    #[error("{kind} conflict in state {state} on `{terminal}`: {existing} vs {incoming}")]
    Conflict {
        kind: &'static str,
        state: usize,
        terminal: String,
        existing: Action,
        incoming: Action,
    },
}

fn conflict_kind(a: Action, b: Action) -> &'static str {
    match (a, b) {
        (Action::Reduce(_), Action::Reduce(_)) => "reduce/reduce",
        _ => "shift/reduce",
    }
}

/// The SLR(1) parse tables for a grammar.
///
/// One ACTION row and one GOTO row per state of the canonical
/// collection; the item sets themselves are discarded once the tables
/// are filled. The tables are immutable after construction and may be
/// shared freely across threads.
#[derive(Debug)]
pub struct ParseTable {
    actions: Vec<HashMap<String, Action>>,
    gotos: Vec<HashMap<String, usize>>,
}

impl ParseTable {
    /// Builds the ACTION and GOTO tables for `grammar`.
    ///
    /// Walks the canonical collection: complete items reduce on every
    /// terminal in FOLLOW of their left-hand side (the accept item
    /// instead accepts on `$`); after-dot terminals shift to the goto
    /// state; after-dot non-terminals fill the GOTO row. The first
    /// cell that would receive two distinct actions aborts construction
    /// with [`TableError::Conflict`].
    pub fn build(grammar: &Grammar) -> Result<Self, TableError> {
        let ff = FirstFollow::new(grammar);
        let states = canonical_collection(grammar);

        let mut actions: Vec<HashMap<String, Action>> = vec![HashMap::new(); states.len()];
        let mut gotos: Vec<HashMap<String, usize>> = vec![HashMap::new(); states.len()];

        for (i, state) in states.iter().enumerate() {
            for item in state {
                let prod = grammar.production(item.prod);
                if !item.is_complete(grammar) {
                    continue;
                }
                if prod.left == AUGMENTED_START {
                    insert_action(&mut actions[i], i, END_MARKER.into(), Action::Accept)?;
                } else {
                    for terminal in ff.follow(&prod.left) {
                        insert_action(
                            &mut actions[i],
                            i,
                            terminal.clone(),
                            Action::Reduce(item.prod),
                        )?;
                    }
                }
            }

            let mut symbols: IndexSet<String> = IndexSet::new();
            for item in state {
                if let Some(sym) = item.next_symbol(grammar) {
                    symbols.insert(sym.into());
                }
            }
            for sym in &symbols {
                let target = goto(grammar, state, sym);
                let Some(j) = find_state(&states, &target) else {
                    continue;
                };
                if grammar.is_terminal(sym) {
                    insert_action(&mut actions[i], i, sym.clone(), Action::Shift(j))?;
                } else {
                    gotos[i].insert(sym.clone(), j);
                }
            }
        }

        log::debug!(
            "built SLR(1) tables: {} states, {} productions",
            states.len(),
            grammar.productions().len()
        );
        Ok(Self { actions, gotos })
    }

    pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        self.actions.get(state)?.get(terminal).copied()
    }

    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.gotos.get(state)?.get(nonterminal).copied()
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// Writes the tab-separated table dump.
    ///
    /// Columns: state, one column per terminal in sorted order (cells
    /// `sN`, `rN`, `acc`, or blank), a `|` separator, then one column
    /// per non-terminal in sorted order (numeric goto target or blank).
    /// Rows are states in ascending order. Pure debug aid.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut terminals: Vec<&String> = self
            .actions
            .iter()
            .flat_map(|row| row.keys())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        terminals.sort();
        let mut nonterminals: Vec<&String> = self
            .gotos
            .iter()
            .flat_map(|row| row.keys())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        nonterminals.sort();

        write!(out, "State\t")?;
        for sym in &terminals {
            write!(out, "{sym}\t")?;
        }
        write!(out, "|\t")?;
        for sym in &nonterminals {
            write!(out, "{sym}\t")?;
        }
        writeln!(out)?;

        for (i, row) in self.actions.iter().enumerate() {
            write!(out, "State {i}\t")?;
            for sym in &terminals {
                match row.get(sym.as_str()) {
                    Some(action) => write!(out, "{action}\t")?,
                    None => write!(out, "\t")?,
                }
            }
            write!(out, "|\t")?;
            for sym in &nonterminals {
                match self.gotos[i].get(sym.as_str()) {
                    Some(target) => write!(out, "{target}\t")?,
                    None => write!(out, "\t")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Writes the dump of [`write`](Self::write) to a file.
    pub fn dump_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }
}

fn find_state(states: &[ItemSet], target: &ItemSet) -> Option<usize> {
    states.iter().position(|s| s == target)
}

fn insert_action(
    row: &mut HashMap<String, Action>,
    state: usize,
    terminal: String,
    incoming: Action,
) -> Result<(), TableError> {
    match row.get(terminal.as_str()) {
        Some(&existing) if existing != incoming => Err(TableError::Conflict {
            kind: conflict_kind(existing, incoming),
            state,
            terminal,
            existing,
            incoming,
        }),
        _ => {
            row.insert(terminal, incoming);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Production, symbol_set};

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

    #[test]
    fn builds_expression_grammar_table() {
        let g = expr_grammar();
        let table = ParseTable::build(&g).unwrap();
        assert_eq!(table.state_count(), 12);

        // State 0 shifts on the FIRST terminals of E and nothing else.
        assert!(matches!(table.action(0, "("), Some(Action::Shift(_))));
        assert!(matches!(table.action(0, "id"), Some(Action::Shift(_))));
        assert_eq!(table.action(0, "+"), None);
        assert_eq!(table.action(0, "$"), None);
        assert!(table.goto(0, "E").is_some());
        assert!(table.goto(0, "T").is_some());
        assert!(table.goto(0, "F").is_some());
        assert!(table.goto(0, "S'").is_none());
    }

    #[test]
    fn exactly_one_accept_state() {
        let g = expr_grammar();
        let table = ParseTable::build(&g).unwrap();
        let accepts = (0..table.state_count())
            .filter(|&s| table.action(s, "$") == Some(Action::Accept))
            .count();
        assert_eq!(accepts, 1);
    }

    #[test]
    fn shift_targets_exist() {
        let g = expr_grammar();
        let table = ParseTable::build(&g).unwrap();
        for state in 0..table.state_count() {
            for terminal in ["+", "*", "(", ")", "id", "$"] {
                if let Some(Action::Shift(j)) = table.action(state, terminal) {
                    assert!(j < table.state_count());
                }
            }
        }
    }

    #[test]
    fn right_recursion_is_not_a_conflict() {
        // S -> a S | a needs one token of lookahead but is SLR(1):
        // the complete item reduces only on FOLLOW(S) = {$}.
        let g = Grammar::try_new(
            vec![
                Production::new(0, "S'", &["S"]),
                Production::new(1, "S", &["a", "S"]),
                Production::new(2, "S", &["a"]),
            ],
            symbol_set(&["S'", "S"]),
            symbol_set(&["a", "$"]),
            "S",
        )
        .unwrap();
        assert!(ParseTable::build(&g).is_ok());
    }

    #[test]
    fn ambiguous_expression_grammar_has_shift_reduce_conflict() {
        // E -> E + E | n: after E + E the lookahead + can be shifted
        // or reduced, and + is in FOLLOW(E).
        let g = Grammar::try_new(
            vec![
                Production::new(0, "S'", &["E"]),
                Production::new(1, "E", &["E", "+", "E"]),
                Production::new(2, "E", &["n"]),
            ],
            symbol_set(&["S'", "E"]),
            symbol_set(&["+", "n", "$"]),
            "E",
        )
        .unwrap();
        let err = ParseTable::build(&g).unwrap_err();
        let TableError::Conflict {
            kind, terminal, ..
        } = err;
        assert_eq!(kind, "shift/reduce");
        assert_eq!(terminal, "+");
    }

    #[test]
    fn reduce_reduce_conflict_is_reported() {
        // A and B both derive x and share FOLLOW = {$}.
        let g = Grammar::try_new(
            vec![
                Production::new(0, "S'", &["S"]),
                Production::new(1, "S", &["A"]),
                Production::new(2, "S", &["B"]),
                Production::new(3, "A", &["x"]),
                Production::new(4, "B", &["x"]),
            ],
            symbol_set(&["S'", "S", "A", "B"]),
            symbol_set(&["x", "$"]),
            "S",
        )
        .unwrap();
        let err = ParseTable::build(&g).unwrap_err();
        let TableError::Conflict {
            kind,
            terminal,
            existing,
            incoming,
            ..
        } = err;
        assert_eq!(kind, "reduce/reduce");
        assert_eq!(terminal, "$");
        assert!(matches!(existing, Action::Reduce(_)));
        assert!(matches!(incoming, Action::Reduce(_)));
    }

    #[test]
    fn dump_format_is_tab_separated() {
        let g = expr_grammar();
        let table = ParseTable::build(&g).unwrap();
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();
        let text = std::string::String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), table.state_count() + 1);
        assert!(lines[0].starts_with("State\t"));
        assert!(lines[0].contains("|\t"));
        // Terminal columns come sorted before the separator.
        let header: Vec<&str> = lines[0].split('\t').collect();
        let bar = header.iter().position(|c| *c == "|").unwrap();
        let terms = &header[1..bar];
        let mut sorted = terms.to_vec();
        sorted.sort();
        assert_eq!(terms, &sorted[..]);
        assert!(text.contains("acc"));
        assert!(lines[1].starts_with("State 0\t"));
    }
}

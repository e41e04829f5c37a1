//! LR(0) item machinery: CLOSURE, GOTO, and the canonical collection.

use crate::grammar::Grammar;
use indexmap::IndexSet;
use smartstring::alias::String;
use std::collections::BTreeSet;

/// An LR(0) item: a production index and a dot position.
///
/// The dot marks how much of the production's right-hand side has been
/// recognized. `dot == right.len()` makes the item *complete* (a reduce
/// candidate); for an ε-production the item is complete at dot 0.
/// Items reference productions by id rather than by pointer, so item
/// sets compare and hash by value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Item {
    /// The index of the production in the grammar.
    pub prod: usize,

    /// The position of the dot within the production's right-hand side.
    pub dot: usize,
}

impl Item {
    pub fn new(prod: usize, dot: usize) -> Self {
        Self { prod, dot }
    }

    /// True when the dot sits past the last right-hand-side symbol.
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot == grammar.production(self.prod).right.len()
    }

    /// The symbol immediately after the dot, if any.
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g str> {
        grammar
            .production(self.prod)
            .right
            .get(self.dot)
            .map(|s| s.as_str())
    }

    /// Renders the item as `A -> α . β` for diagnostics.
    pub fn display(&self, grammar: &Grammar) -> std::string::String {
        let prod = grammar.production(self.prod);
        let mut out = format!("{} ->", prod.left);
        for (i, sym) in prod.right.iter().enumerate() {
            if i == self.dot {
                out.push_str(" .");
            }
            out.push(' ');
            out.push_str(sym);
        }
        if self.dot == prod.right.len() {
            out.push_str(" .");
        }
        out
    }
}

/// A set of LR(0) items. Identity is set equality, independent of the
/// order in which items were discovered.
pub type ItemSet = BTreeSet<Item>;

/// Computes the LR(0) *closure* of a set of items.
///
/// For each item with a non-terminal `B` immediately after the dot,
/// adds the fresh item `(q, 0)` for every production `q` of `B`,
/// repeating until no new item is added.
///
/// # Returns
/// The full closure containing the original and all derived items. The
/// result is unique up to set identity, so
/// `closure(closure(I)) == closure(I)`.
pub fn closure(grammar: &Grammar, items: &ItemSet) -> ItemSet {
    let mut c = items.clone();
    let mut inserted = true;
    while inserted {
        inserted = false;
        // Iterate over a snapshot to avoid borrowing issues.
        for item in c.clone() {
            let Some(sym) = item.next_symbol(grammar) else {
                continue;
            };
            if grammar.is_nonterminal(sym) {
                for &q in grammar.productions_for(sym) {
                    if c.insert(Item::new(q, 0)) {
                        inserted = true;
                    }
                }
            }
        }
    }
    c
}

/// Computes the LR(0) *goto* function for an item set and a symbol.
///
/// Advances every item whose after-dot symbol equals `symbol`, then
/// returns the closure of the advanced items. An empty result signals
/// that the set has no transition on `symbol`.
pub fn goto(grammar: &Grammar, items: &ItemSet, symbol: &str) -> ItemSet {
    let mut moved = ItemSet::new();
    for item in items {
        if item.next_symbol(grammar) == Some(symbol) {
            moved.insert(Item::new(item.prod, item.dot + 1));
        }
    }
    closure(grammar, &moved)
}

/// Constructs the canonical collection of LR(0) item sets.
///
/// State 0 is `closure({(0, 0)})`, the closure of the initial item of
/// the augmented production. A worklist pass expands each state on
/// every symbol appearing after a dot; a non-empty goto result that is
/// not already present (by set equality) is appended and gets the next
/// state id. Discovery is deterministic: items are visited in
/// `(prod, dot)` order and after-dot symbols in first-seen order.
pub fn canonical_collection(grammar: &Grammar) -> Vec<ItemSet> {
    let start = ItemSet::from([Item::new(0, 0)]);
    let mut states = vec![closure(grammar, &start)];

    let mut next = 0;
    while next < states.len() {
        let state = states[next].clone();

        let mut symbols: IndexSet<String> = IndexSet::new();
        for item in &state {
            if let Some(sym) = item.next_symbol(grammar) {
                symbols.insert(sym.into());
            }
        }

        for sym in &symbols {
            let target = goto(grammar, &state, sym);
            if !target.is_empty() && !states.contains(&target) {
                states.push(target);
            }
        }
        next += 1;
    }
    states
}

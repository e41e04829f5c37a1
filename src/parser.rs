//! Table-driven shift/reduce parser with panic-mode error recovery.

use crate::grammar::{END_MARKER, Grammar};
use crate::lexer::Lexer;
use crate::table::{Action, ParseTable, TableError};
use crate::token::Token;
use smartstring::alias::String;
use std::io::{self, Write};
use thiserror::Error;

/// Terminal names that resynchronize panic-mode recovery.
const SYNC_TERMINALS: &[&str] = &["SEMICOLON", END_MARKER];

/// A concrete syntax tree node.
///
/// Terminal nodes carry the lexeme in `value` and have no children;
/// non-terminal nodes carry the reduction's children in left-to-right
/// grammar order and an empty `value`. Nodes own their children, so a
/// parse result is a tree with no sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub symbol: String,
    pub value: String,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn leaf(symbol: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn interior(symbol: impl Into<String>, children: Vec<SyntaxNode>) -> Self {
        Self {
            symbol: symbol.into(),
            value: String::new(),
            children,
        }
    }

    /// In-order leaves of the tree. For an accepted parse these are the
    /// shifted tokens in input order.
    pub fn leaves(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SyntaxNode>) {
        if self.children.is_empty() && !self.value.is_empty() {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Writes the tree with indentation equal to depth, one node per
    /// line, leaves as `symbol (value)`.
    pub fn write_indented<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_at(out, 0)
    }

    fn write_at<W: Write>(&self, out: &mut W, depth: usize) -> io::Result<()> {
        for _ in 0..depth {
            write!(out, "  ")?;
        }
        if self.value.is_empty() {
            writeln!(out, "{}", self.symbol)?;
        } else {
            writeln!(out, "{} ({})", self.symbol, self.value)?;
        }
        for child in &self.children {
            child.write_at(out, depth + 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("syntax error at line {line}: recovery failed at `{lexeme}`")]
    RecoveryFailed { line: usize, lexeme: String },

    #[error("missing GOTO entry for `{symbol}` in state {state}")]
    MissingGoto { state: usize, symbol: String },

    #[error("parse stack underflow")]
    StackUnderflow,
}

/// Per-parse counters, logged at debug level on acceptance.
#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
    pub recovered_errors: usize,
}

struct ParseContext {
    tokens: Vec<Token>,
    pos: usize,
    states: Vec<usize>,
    nodes: Vec<SyntaxNode>,
    stats: ParserStats,
}

impl ParseContext {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            states: vec![0],
            nodes: Vec::new(),
            stats: ParserStats::default(),
        }
    }

    fn current_state(&self) -> usize {
        self.states[self.states.len() - 1]
    }

    fn dump(&self) {
        let mut output = std::string::String::new();
        for (i, state) in self.states.iter().enumerate() {
            output.push_str(&format!("<{state}>"));
            if let Some(node) = self.nodes.get(i) {
                output.push_str(&format!(" {} ", node.symbol));
            }
        }
        log::trace!("{output}");
    }
}

/// An SLR(1) parser: a grammar plus the tables built from it.
///
/// Construction runs table construction to completion; afterwards the
/// parser is immutable and distinct parses are independent, so a shared
/// reference can serve callers on any number of threads.
pub struct SlrParser {
    grammar: Grammar,
    table: ParseTable,
}

impl SlrParser {
    /// Builds the parse tables for `grammar`. Grammar conflicts
    /// surface here as [`TableError`].
    pub fn try_new(grammar: Grammar) -> Result<Self, TableError> {
        let table = ParseTable::build(&grammar)?;
        Ok(Self { grammar, table })
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Scans `source` and parses the resulting token sequence.
    pub fn parse(&self, source: &str) -> Result<SyntaxNode, ParseError> {
        self.parse_tokens(Lexer::new(source).tokenize())
    }

    /// Parses an explicit token sequence. The `$` sentinel is appended
    /// here with line 0; callers supply only the real tokens.
    pub fn parse_tokens(&self, mut tokens: Vec<Token>) -> Result<SyntaxNode, ParseError> {
        tokens.push(Token::eof(0));
        let mut ctx = ParseContext::new(tokens);
        ctx.stats.tokens = ctx.tokens.len();

        while ctx.pos < ctx.tokens.len() {
            let state = ctx.current_state();
            let token = &ctx.tokens[ctx.pos];
            let terminal = token.terminal_name();
            if log::log_enabled!(log::Level::Trace) {
                ctx.dump();
            }

            match self.table.action(state, &terminal) {
                Some(Action::Shift(next)) => {
                    log::trace!("shift {next} on `{}`", token.lexeme);
                    let leaf = SyntaxNode::leaf(terminal, token.lexeme.clone());
                    ctx.states.push(next);
                    ctx.nodes.push(leaf);
                    ctx.pos += 1;
                    ctx.stats.shifts += 1;
                }
                Some(Action::Reduce(prod_id)) => {
                    self.reduce(&mut ctx, prod_id)?;
                }
                Some(Action::Accept) => {
                    log::debug!("accepted: {:?}", ctx.stats);
                    let root = ctx.nodes.pop().ok_or(ParseError::StackUnderflow)?;
                    if !ctx.nodes.is_empty() {
                        return Err(ParseError::StackUnderflow);
                    }
                    return Ok(root);
                }
                None => {
                    self.recover(&mut ctx)?;
                }
            }
        }
        Err(ParseError::UnexpectedEof)
    }

    fn reduce(&self, ctx: &mut ParseContext, prod_id: usize) -> Result<(), ParseError> {
        let prod = self.grammar.production(prod_id);
        log::trace!("reduce by {} -> {}", prod.left, prod.right.join(" "));

        let count = prod.right.len();
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            ctx.states.pop().ok_or(ParseError::StackUnderflow)?;
            children.push(ctx.nodes.pop().ok_or(ParseError::StackUnderflow)?);
        }
        children.reverse();

        let state = ctx.current_state();
        let next = self
            .table
            .goto(state, &prod.left)
            .ok_or_else(|| ParseError::MissingGoto {
                state,
                symbol: prod.left.clone(),
            })?;
        ctx.states.push(next);
        ctx.nodes.push(SyntaxNode::interior(prod.left.clone(), children));
        ctx.stats.reductions += 1;
        Ok(())
    }

    /// Panic-mode recovery.
    ///
    /// Reports the offending token, then discards input up to the next
    /// synchronizing terminal. If that terminal is `$` the error is
    /// fatal: there is no further input to resynchronize with. If some
    /// stacked state can act on the synchronizing terminal, the stacks
    /// are cut back to it and parsing resumes there; otherwise the
    /// terminal itself is discarded and the same search runs for the
    /// token after it.
    fn recover(&self, ctx: &mut ParseContext) -> Result<(), ParseError> {
        let offending = &ctx.tokens[ctx.pos];
        log::error!(
            "syntax error at line {}: unexpected token `{}`",
            offending.line,
            offending.lexeme
        );
        ctx.stats.recovered_errors += 1;

        while !SYNC_TERMINALS.contains(&ctx.tokens[ctx.pos].terminal_name().as_str()) {
            ctx.pos += 1;
        }
        let terminal = ctx.tokens[ctx.pos].terminal_name();
        if terminal == END_MARKER {
            return Err(ParseError::UnexpectedEof);
        }

        if self.cut_to_viable_state(ctx, &terminal) {
            return Ok(());
        }

        // No state accepts the synchronizing terminal; drop it and try
        // to resume in front of the following token.
        ctx.pos += 1;
        let terminal = ctx.tokens[ctx.pos].terminal_name();
        if self.cut_to_viable_state(ctx, &terminal) {
            return Ok(());
        }

        let token = &ctx.tokens[ctx.pos];
        Err(ParseError::RecoveryFailed {
            line: token.line,
            lexeme: token.lexeme.clone(),
        })
    }

    /// Pops state/node pairs until the top state has a defined ACTION
    /// for `terminal`. A state that can shift the terminal wins over a
    /// deeper state that can only reduce: resuming on a reduce inside
    /// the aborted construct would replay the very parse the error cut
    /// short. Returns false, leaving the stacks untouched, when no
    /// stacked state qualifies.
    fn cut_to_viable_state(&self, ctx: &mut ParseContext, terminal: &str) -> bool {
        let shiftable = (0..ctx.states.len()).rev().find(|&i| {
            matches!(
                self.table.action(ctx.states[i], terminal),
                Some(Action::Shift(_))
            )
        });
        let keep = shiftable.or_else(|| {
            (0..ctx.states.len())
                .rev()
                .find(|&i| self.table.action(ctx.states[i], terminal).is_some())
        });
        let Some(keep) = keep else {
            return false;
        };
        ctx.states.truncate(keep + 1);
        ctx.nodes.truncate(keep);
        true
    }
}

//! Token categories and the token-type → grammar-terminal mapping.

use once_cell::sync::Lazy;
use smartstring::alias::String;
use std::collections::HashMap;

/// Terminal name produced for tokens the mapping does not know. It
/// matches no ACTION entry, so unmapped input drives the parser into
/// error recovery.
pub const UNKNOWN_TERMINAL: &str = "UNKNOWN";

/// Coarse token classification produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Identifier,
    Number,
    Operator,
    /// A lone `=` in assignment position. `==` stays [`Operator`].
    Assignment,
    Delimiter,
    Str,
    Eof,
    Unknown,
}

/// A lexical token: classification, lexeme, and 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: TokenType,
    pub lexeme: String,
    pub line: usize,
}

static OPERATOR_TERMINALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("+", "PLUS"),
        ("-", "MINUS"),
        ("*", "MUL"),
        ("/", "DIV"),
        ("=", "ASSIGN"),
        ("==", "EQ"),
        ("!=", "NEQ"),
        ("<", "LT"),
        ("<=", "LEQ"),
        (">", "GT"),
        (">=", "GEQ"),
        ("&&", "AND"),
        ("||", "OR"),
        ("!", "NOT"),
        ("++", "INC"),
        ("--", "DEC"),
        ("+=", "ADD_ASSIGN"),
        ("-=", "SUB_ASSIGN"),
        ("*=", "MUL_ASSIGN"),
        ("/=", "DIV_ASSIGN"),
    ])
});

static DELIMITER_TERMINALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("(", "LEFT_PAREN"),
        (")", "RIGHT_PAREN"),
        ("{", "LEFT_BRACE"),
        ("}", "RIGHT_BRACE"),
        (";", "SEMICOLON"),
        (",", "COMMA"),
    ])
});

const TYPE_KEYWORDS: &[&str] = &["int", "float", "bool"];
const CONTROL_KEYWORDS: &[&str] = &["if", "else", "while", "for"];

impl Token {
    pub fn new(ty: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            ty,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// The end-of-input sentinel appended by the parse driver.
    pub fn eof(line: usize) -> Self {
        Self::new(TokenType::Eof, "$", line)
    }

    /// Maps this token to the grammar terminal name the parse tables
    /// are keyed by.
    ///
    /// Type keywords pass through unchanged, control keywords are
    /// upper-cased, operators and delimiters go through fixed tables,
    /// and anything unmapped becomes [`UNKNOWN_TERMINAL`].
    pub fn terminal_name(&self) -> String {
        match self.ty {
            TokenType::Identifier => "IDENTIFIER".into(),
            TokenType::Number => "NUMBER".into(),
            TokenType::Str => "STRING".into(),
            TokenType::Eof => "$".into(),
            TokenType::Assignment => "ASSIGNMENT".into(),
            TokenType::Keyword => {
                let lexeme = self.lexeme.as_str();
                if TYPE_KEYWORDS.contains(&lexeme) {
                    self.lexeme.clone()
                } else if CONTROL_KEYWORDS.contains(&lexeme) {
                    lexeme.to_uppercase().into()
                } else {
                    UNKNOWN_TERMINAL.into()
                }
            }
            TokenType::Operator => OPERATOR_TERMINALS
                .get(self.lexeme.as_str())
                .copied()
                .unwrap_or(UNKNOWN_TERMINAL)
                .into(),
            TokenType::Delimiter => DELIMITER_TERMINALS
                .get(self.lexeme.as_str())
                .copied()
                .unwrap_or(UNKNOWN_TERMINAL)
                .into(),
            TokenType::Unknown => UNKNOWN_TERMINAL.into(),
        }
    }
}

/// True when `text` is a single- or double-character operator lexeme.
pub(crate) fn is_operator_lexeme(text: &str) -> bool {
    OPERATOR_TERMINALS.contains_key(text)
}

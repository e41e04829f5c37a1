//! Character-level scanner for the demo language.
//!
//! Classifies the source into the coarse token categories of
//! [`TokenType`]: keywords vs. identifiers, numbers with at most one
//! decimal point, double-quoted strings with escapes, operators with
//! maximal two-character munch, delimiters, and `Unknown` for anything
//! else. Line and block comments are skipped. A lone `=` is classified
//! as the assignment category; `==` and the compound-assignment forms
//! stay operators.

use crate::token::{Token, TokenType, is_operator_lexeme};
use smartstring::alias::String;

const KEYWORDS: &[&str] = &[
    "int", "float", "double", "char", "void", "bool", "if", "else", "while", "for", "return",
    "class", "struct", "true", "false",
];

const DELIMITERS: &[char] = &['(', ')', '{', '}', '[', ']', ';', ',', '.', ':'];

const OPERATOR_STARTS: &[char] = &['+', '-', '*', '/', '=', '<', '>', '!', '&', '|'];

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    /// Scans the whole source and returns the token sequence. The `$`
    /// sentinel is *not* appended here; the parse driver owns that.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(current) = self.peek(0) {
            if current.is_whitespace() {
                self.consume();
                if current == '\n' {
                    self.line += 1;
                }
            } else if current.is_ascii_digit() {
                tokens.push(self.read_number());
            } else if current.is_alphabetic() || current == '_' {
                tokens.push(self.read_identifier());
            } else if current == '"' {
                tokens.push(self.read_string());
            } else if current == '/' && self.peek(1) == Some('/') {
                self.skip_line_comment();
            } else if current == '/' && self.peek(1) == Some('*') {
                self.skip_block_comment();
            } else if OPERATOR_STARTS.contains(&current) {
                tokens.push(self.read_operator());
            } else if DELIMITERS.contains(&current) {
                self.consume();
                tokens.push(Token::new(
                    TokenType::Delimiter,
                    current.to_string(),
                    self.line,
                ));
            } else {
                self.consume();
                log::trace!("unknown character {current:?} at line {}", self.line);
                tokens.push(Token::new(
                    TokenType::Unknown,
                    current.to_string(),
                    self.line,
                ));
            }
        }
        tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn consume(&mut self) {
        self.pos += 1;
    }

    fn read_number(&mut self) -> Token {
        let mut value = String::new();
        let mut has_decimal = false;
        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() {
                value.push(c);
                self.consume();
            } else if c == '.' && !has_decimal {
                has_decimal = true;
                value.push(c);
                self.consume();
            } else {
                break;
            }
        }
        Token::new(TokenType::Number, value, self.line)
    }

    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_alphanumeric() || c == '_' {
                value.push(c);
                self.consume();
            } else {
                break;
            }
        }
        let ty = if KEYWORDS.contains(&value.as_str()) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(ty, value, self.line)
    }

    fn read_string(&mut self) -> Token {
        let mut value = String::new();
        self.consume();
        while let Some(c) = self.peek(0) {
            match c {
                '\\' => {
                    self.consume();
                    if let Some(next) = self.peek(0) {
                        value.push(match next {
                            'n' => '\n',
                            't' => '\t',
                            '"' => '"',
                            '\\' => '\\',
                            other => other,
                        });
                        self.consume();
                    }
                }
                '"' => {
                    self.consume();
                    break;
                }
                _ => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                    self.consume();
                }
            }
        }
        Token::new(TokenType::Str, value, self.line)
    }

    fn skip_line_comment(&mut self) {
        self.consume();
        self.consume();
        while let Some(c) = self.peek(0) {
            self.consume();
            if c == '\n' {
                self.line += 1;
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.consume();
        self.consume();
        while let Some(c) = self.peek(0) {
            if c == '*' && self.peek(1) == Some('/') {
                self.consume();
                self.consume();
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.consume();
        }
    }

    fn read_operator(&mut self) -> Token {
        let mut value = String::new();
        let first = self.peek(0).unwrap_or('\0');
        value.push(first);
        self.consume();

        // Maximal munch: prefer the two-character operator when the
        // table knows it.
        if let Some(next) = self.peek(0) {
            let mut two = value.clone();
            two.push(next);
            if is_operator_lexeme(&two) {
                value = two;
                self.consume();
            }
        }

        if value == "=" {
            Token::new(TokenType::Assignment, value, self.line)
        } else if is_operator_lexeme(&value) {
            Token::new(TokenType::Operator, value, self.line)
        } else {
            Token::new(TokenType::Unknown, value, self.line)
        }
    }
}

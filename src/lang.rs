//! The demo imperative-language grammar.
//!
//! Statements are declarations, assignments, `if`/`else`, and `while`
//! loops; expressions are the single comparison/arithmetic shape
//! `IDENTIFIER OPERATOR NUMBER`. Terminal names match what
//! [`Token::terminal_name`](crate::token::Token::terminal_name)
//! produces, so the scanner and the tables agree by construction.

use crate::grammar::{Grammar, Production, symbol_set};

/// Builds the demo-language grammar. The grammar is SLR(1); building
/// its parse table cannot fail.
pub fn grammar() -> Grammar {
    let productions = vec![
        Production::new(0, "S'", &["Program"]),
        Production::new(1, "Program", &["Statements"]),
        Production::new(2, "Statements", &["Statement", "Statements"]),
        Production::new(3, "Statements", &["ε"]),
        Production::new(4, "Statement", &["DeclStmt"]),
        Production::new(5, "Statement", &["AssignStmt"]),
        Production::new(6, "Statement", &["IfStmt"]),
        Production::new(7, "Statement", &["WhileStmt"]),
        Production::new(8, "Statement", &["Compute"]),
        Production::new(9, "DeclStmt", &["Type", "IDENTIFIER", "SEMICOLON"]),
        Production::new(
            10,
            "AssignStmt",
            &["IDENTIFIER", "ASSIGNMENT", "NUMBER", "SEMICOLON"],
        ),
        Production::new(
            11,
            "Compute",
            &["IDENTIFIER", "ASSIGNMENT", "Expr", "SEMICOLON"],
        ),
        Production::new(
            12,
            "IfStmt",
            &[
                "IF",
                "LEFT_PAREN",
                "Expr",
                "RIGHT_PAREN",
                "LEFT_BRACE",
                "Statements",
                "RIGHT_BRACE",
                "ElsePart",
            ],
        ),
        Production::new(
            13,
            "ElsePart",
            &["ELSE", "LEFT_BRACE", "Statements", "RIGHT_BRACE"],
        ),
        Production::new(14, "ElsePart", &["ε"]),
        Production::new(
            15,
            "WhileStmt",
            &[
                "WHILE",
                "LEFT_PAREN",
                "Expr",
                "RIGHT_PAREN",
                "LEFT_BRACE",
                "Statements",
                "RIGHT_BRACE",
            ],
        ),
        Production::new(16, "Expr", &["IDENTIFIER", "OPERATOR", "NUMBER"]),
        Production::new(17, "OPERATOR", &["PLUS"]),
        Production::new(18, "OPERATOR", &["MINUS"]),
        Production::new(19, "OPERATOR", &["MUL"]),
        Production::new(20, "OPERATOR", &["DIV"]),
        Production::new(21, "OPERATOR", &["LT"]),
        Production::new(22, "OPERATOR", &["GT"]),
        Production::new(23, "Type", &["int"]),
        Production::new(24, "Type", &["float"]),
        Production::new(25, "Type", &["bool"]),
    ];

    let nonterminals = symbol_set(&[
        "S'",
        "Program",
        "Statements",
        "Statement",
        "DeclStmt",
        "AssignStmt",
        "Compute",
        "IfStmt",
        "ElsePart",
        "WhileStmt",
        "Expr",
        "OPERATOR",
        "Type",
    ]);
    let terminals = symbol_set(&[
        "IDENTIFIER",
        "NUMBER",
        "SEMICOLON",
        "ASSIGNMENT",
        "IF",
        "ELSE",
        "WHILE",
        "LEFT_PAREN",
        "RIGHT_PAREN",
        "LEFT_BRACE",
        "RIGHT_BRACE",
        "PLUS",
        "MINUS",
        "MUL",
        "DIV",
        "LT",
        "GT",
        "int",
        "float",
        "bool",
        "$",
    ]);

    // The demo grammar is fixed and well-formed; a construction error
    // here is a bug in this module.
    match Grammar::try_new(productions, nonterminals, terminals, "Program") {
        Ok(grammar) => grammar,
        Err(err) => unreachable!("demo grammar failed validation: {err}"),
    }
}

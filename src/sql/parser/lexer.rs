//! SQL Lexer - Tokenizes query text into a flat stream of tokens

use std::{fmt::Display, iter::Peekable, str::Chars};

use super::ast::Operator;

/// Represents a single lexical token in the query text
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Reserved keyword
    Keyword(Keyword),
    /// Any other bare word: table or column names, numbers, `*`, `a.b`
    Ident(String),
    /// Quoted literal with the quotes stripped
    String(String),
    /// Comparison operator
    Operator(Operator),
    /// A `!` not followed by `=`
    Bang,
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(keyword) => f.write_str(keyword.to_str()),
            Token::Ident(ident) => f.write_str(ident),
            Token::String(v) => write!(f, "'{}'", v),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Bang => f.write_str("!"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
        }
    }
}

/// Reserved keywords
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    // DDL keywords
    Create,
    Table,
    AutoIncrement,
    // Data type keywords
    String,
    Integer,
    Float,
    // DML keywords
    Select,
    From,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Where,
    Null,
    // Join keywords
    Join,
    Inner,
    Left,
    Right,
    On,
    // Logical operators
    And,
    Or,
    // Transaction keywords
    Begin,
    Commit,
    Rollback,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "AUTO_INCREMENT" => Keyword::AutoIncrement,
            "STRING" => Keyword::String,
            "INTEGER" => Keyword::Integer,
            "FLOAT" => Keyword::Float,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "UPDATE" => Keyword::Update,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            "WHERE" => Keyword::Where,
            "NULL" => Keyword::Null,
            "JOIN" => Keyword::Join,
            "INNER" => Keyword::Inner,
            "LEFT" => Keyword::Left,
            "RIGHT" => Keyword::Right,
            "ON" => Keyword::On,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "BEGIN" => Keyword::Begin,
            "COMMIT" => Keyword::Commit,
            "ROLLBACK" => Keyword::Rollback,
            _ => return None,
        })
    }

    /// Returns the uppercase string representation of the keyword
    pub fn to_str(&self) -> &'static str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::AutoIncrement => "AUTO_INCREMENT",
            Keyword::String => "STRING",
            Keyword::Integer => "INTEGER",
            Keyword::Float => "FLOAT",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
            Keyword::Where => "WHERE",
            Keyword::Null => "NULL",
            Keyword::Join => "JOIN",
            Keyword::Inner => "INNER",
            Keyword::Left => "LEFT",
            Keyword::Right => "RIGHT",
            Keyword::On => "ON",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Begin => "BEGIN",
            Keyword::Commit => "COMMIT",
            Keyword::Rollback => "ROLLBACK",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Splits query text into tokens. Never fails: an unterminated quote
/// swallows the rest of the input into one string token.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).collect()
}

/// Lexical analyzer over the query text
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan()
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given query text
    pub fn new(text: &'a str) -> Self {
        Self {
            iter: text.chars().peekable(),
        }
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.peek().filter(|&c| predicate(*c))?;
        self.iter.next()
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    /// Removes whitespace from the input stream
    fn erase_whitespace(&mut self) {
        self.next_while(|c| c.is_whitespace());
    }

    /// Scans and returns the next token
    fn scan(&mut self) -> Option<Token> {
        self.erase_whitespace();
        match *self.iter.peek()? {
            q @ ('\'' | '"') => Some(self.scan_string(q)),
            '=' | '!' | '<' | '>' => self.scan_operator(),
            '(' | ')' | ',' | ';' => self.scan_symbol(),
            _ => self.scan_word(),
        }
    }

    /// Scans a quoted literal; the closing quote must match the opening one
    fn scan_string(&mut self, quote: char) -> Token {
        self.iter.next();
        let mut val = String::new();
        for c in self.iter.by_ref() {
            if c == quote {
                break;
            }
            val.push(c);
        }
        Token::String(val)
    }

    /// Scans an operator, greedily pairing `<=`, `>=`, `!=` and `<>`
    fn scan_operator(&mut self) -> Option<Token> {
        Some(match self.iter.next()? {
            '=' => Token::Operator(Operator::Equal),
            '!' if self.next_if(|c| c == '=').is_some() => Token::Operator(Operator::NotEqual),
            '!' => Token::Bang,
            '<' if self.next_if(|c| c == '=').is_some() => Token::Operator(Operator::LessEqual),
            '<' if self.next_if(|c| c == '>').is_some() => Token::Operator(Operator::NotEqual),
            '<' => Token::Operator(Operator::Less),
            '>' if self.next_if(|c| c == '=').is_some() => Token::Operator(Operator::GreaterEqual),
            _ => Token::Operator(Operator::Greater),
        })
    }

    /// Scans a single-character punctuation token
    fn scan_symbol(&mut self) -> Option<Token> {
        Some(match self.iter.next()? {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            _ => Token::Semicolon,
        })
    }

    /// Scans a bare word up to whitespace, punctuation, an operator or a quote
    fn scan_word(&mut self) -> Option<Token> {
        let val = self.next_while(|c| {
            !c.is_whitespace()
                && !matches!(
                    c,
                    '(' | ')' | ',' | ';' | '=' | '!' | '<' | '>' | '\'' | '"'
                )
        })?;
        // Returns Keyword if matched, otherwise the word as written
        Some(Keyword::from_str(&val).map_or(Token::Ident(val), Token::Keyword))
    }
}

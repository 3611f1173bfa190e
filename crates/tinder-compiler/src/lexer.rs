//! Hand-rolled lexer for Tinder source text.
//!
//! Tinder is a line-oriented directive language (`set`, `if`, `for`,
//! `jump`, ...), so the lexer tracks newlines as significant tokens
//! rather than treating them as ordinary whitespace.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    /// A string literal containing `[[NAME]]` interpolation markers,
    /// pre-split into alternating literal/lookup fragments.
    InterpStr(Vec<StrFragment>),
    Newline,
    Eof,

    // punctuation / operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    At,
    Dot,
    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Hash,

    // keywords
    KwSet,
    KwConst,
    KwIf,
    KwElseif,
    KwElse,
    KwEndif,
    KwFor,
    KwEndfor,
    KwForeach,
    KwIn,
    KwAt,
    KwFrom,
    KwAnd,
    KwOr,
    KwNot,
    KwBreak,
    KwContinue,
    KwJump,
    KwReturn,
    KwWrite,
    KwYield,
    KwStop,
    KwImport,
    KwCatch,
    KwInput,
    KwInc,
    KwDec,
    KwPut,
    KwSwap,
    KwCall,
    KwNone,
    KwTrue,
    KwFalse,
    KwBefore,
    KwAfter,
    KwAs,
    KwTo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrFragment {
    Literal(String),
    Lookup(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: u32,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LexError {}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                tokens.push(Token { kind: TokenKind::Newline, line });
                line += 1;
                i += 1;
            }
            ' ' | '\t' | '\r' => i += 1,
            '`' if i + 1 < chars.len() && chars[i + 1] == '`' => {
                // Comments run from `` to end of line; a single
                // backtick has no meaning in Tinder source.
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '"' => {
                let start_line = line;
                i += 1;
                let mut fragments = Vec::new();
                let mut buf = String::new();
                let mut plain = true;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '[' && i + 1 < chars.len() && chars[i + 1] == '[' {
                        if !buf.is_empty() {
                            fragments.push(StrFragment::Literal(std::mem::take(&mut buf)));
                        }
                        i += 2;
                        let mut name = String::new();
                        while i + 1 < chars.len() && !(chars[i] == ']' && chars[i + 1] == ']') {
                            name.push(chars[i]);
                            i += 1;
                        }
                        if i + 1 >= chars.len() {
                            return Err(LexError { line, message: "unterminated [[ interpolation ]]".into() });
                        }
                        i += 2;
                        fragments.push(StrFragment::Lookup(name));
                        plain = false;
                        continue;
                    }
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        i += 1;
                        buf.push(match chars[i] {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                        i += 1;
                        continue;
                    }
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    buf.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(LexError { line: start_line, message: "unterminated string literal".into() });
                }
                i += 1; // closing quote
                if plain {
                    tokens.push(Token { kind: TokenKind::Str(buf), line: start_line });
                } else {
                    if !buf.is_empty() {
                        fragments.push(StrFragment::Literal(buf));
                    }
                    tokens.push(Token { kind: TokenKind::InterpStr(fragments), line: start_line });
                }
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n: f64 = text
                    .parse()
                    .map_err(|_| LexError { line, message: format!("invalid number literal {text:?}") })?;
                tokens.push(Token { kind: TokenKind::Number(n), line });
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                // Operator word-aliases: two-word forms
                // peek past intervening whitespace for their second
                // word and consume it on a match, collapsing to the
                // same token their symbolic form would produce.
                match text.as_str() {
                    "is" => {
                        if let Some(after) = peek_word(&chars, i) {
                            if after.word == "not" {
                                i = after.end;
                                tokens.push(Token { kind: TokenKind::NotEq, line });
                                continue;
                            }
                        }
                        tokens.push(Token { kind: TokenKind::EqEq, line });
                        continue;
                    }
                    "less" => {
                        if let Some(after) = peek_word(&chars, i) {
                            if after.word == "than" {
                                i = after.end;
                                tokens.push(Token { kind: TokenKind::Lt, line });
                                continue;
                            }
                        }
                    }
                    "greater" => {
                        if let Some(after) = peek_word(&chars, i) {
                            if after.word == "than" {
                                i = after.end;
                                tokens.push(Token { kind: TokenKind::Gt, line });
                                continue;
                            }
                        }
                    }
                    "else" => {
                        if let Some(after) = peek_word(&chars, i) {
                            if after.word == "if" {
                                i = after.end;
                                tokens.push(Token { kind: TokenKind::KwElseif, line });
                                continue;
                            }
                        }
                    }
                    "plus" => {
                        tokens.push(Token { kind: TokenKind::Plus, line });
                        continue;
                    }
                    "times" => {
                        tokens.push(Token { kind: TokenKind::Star, line });
                        continue;
                    }
                    "div" => {
                        tokens.push(Token { kind: TokenKind::Slash, line });
                        continue;
                    }
                    "mod" => {
                        tokens.push(Token { kind: TokenKind::Percent, line });
                        continue;
                    }
                    _ => {}
                }
                tokens.push(Token { kind: keyword_or_ident(&text), line });
            }
            _ => {
                let (kind, advance) = lex_punct(&chars, i, line)?;
                tokens.push(Token { kind, line });
                i += advance;
            }
        }
    }
    tokens.push(Token { kind: TokenKind::Eof, line });
    Ok(tokens)
}

fn keyword_or_ident(text: &str) -> TokenKind {
    match text {
        "set" => TokenKind::KwSet,
        "const" => TokenKind::KwConst,
        "if" => TokenKind::KwIf,
        "elseif" => TokenKind::KwElseif,
        "else" => TokenKind::KwElse,
        "endif" => TokenKind::KwEndif,
        "for" => TokenKind::KwFor,
        "endfor" => TokenKind::KwEndfor,
        "foreach" => TokenKind::KwForeach,
        "in" => TokenKind::KwIn,
        "at" => TokenKind::KwAt,
        "from" => TokenKind::KwFrom,
        "and" => TokenKind::KwAnd,
        "or" => TokenKind::KwOr,
        "not" => TokenKind::KwNot,
        "break" => TokenKind::KwBreak,
        "continue" => TokenKind::KwContinue,
        "jump" => TokenKind::KwJump,
        "return" => TokenKind::KwReturn,
        "write" => TokenKind::KwWrite,
        "yield" => TokenKind::KwYield,
        "stop" => TokenKind::KwStop,
        "import" => TokenKind::KwImport,
        "catch" => TokenKind::KwCatch,
        "input" => TokenKind::KwInput,
        "inc" => TokenKind::KwInc,
        "dec" => TokenKind::KwDec,
        "put" => TokenKind::KwPut,
        "swap" => TokenKind::KwSwap,
        "call" => TokenKind::KwCall,
        "none" => TokenKind::KwNone,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        "before" => TokenKind::KwBefore,
        "after" => TokenKind::KwAfter,
        "as" => TokenKind::KwAs,
        "to" => TokenKind::KwTo,
        _ => TokenKind::Ident(text.to_string()),
    }
}

struct PeekWord {
    word: String,
    end: usize,
}

/// Looks past whitespace (not newlines) starting at `pos` for the next
/// word, without consuming anything. Used to recognize two-word
/// operator aliases (`is not`, `less than`, `greater than`) by
/// lookahead instead of backtracking.
fn peek_word(chars: &[char], pos: usize) -> Option<PeekWord> {
    let mut j = pos;
    while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
        j += 1;
    }
    let start = j;
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    if j == start {
        return None;
    }
    Some(PeekWord { word: chars[start..j].iter().collect(), end: j })
}

fn lex_punct(chars: &[char], i: usize, line: u32) -> Result<(TokenKind, usize), LexError> {
    let two = |a: char, b: char| i + 1 < chars.len() && chars[i] == a && chars[i + 1] == b;
    if two('=', '=') {
        return Ok((TokenKind::EqEq, 2));
    }
    if two('!', '=') {
        return Ok((TokenKind::NotEq, 2));
    }
    if two('<', '=') {
        return Ok((TokenKind::LtEq, 2));
    }
    if two('>', '=') {
        return Ok((TokenKind::GtEq, 2));
    }
    // `//` is the symbolic form of `div` (spec's operator-alias table);
    // a single `/` is accepted too since nothing else in the grammar
    // claims that lexeme.
    if two('/', '/') {
        return Ok((TokenKind::Slash, 2));
    }
    let kind = match chars[i] {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '=' => TokenKind::Eq,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        '@' => TokenKind::At,
        '.' => TokenKind::Dot,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '#' => TokenKind::Hash,
        other => return Err(LexError { line, message: format!("unexpected character {other:?}") }),
    };
    Ok((kind, 1))
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod lexer_tests;

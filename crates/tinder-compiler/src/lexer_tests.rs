use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_a_set_statement() {
    assert_eq!(
        kinds("set health = 10"),
        vec![
            TokenKind::KwSet,
            TokenKind::Ident("health".into()),
            TokenKind::Eq,
            TokenKind::Number(10.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_interpolated_string() {
    let got = kinds(r#""hp: [[health]]!""#);
    assert_eq!(
        got,
        vec![
            TokenKind::InterpStr(vec![
                StrFragment::Literal("hp: ".into()),
                StrFragment::Lookup("health".into()),
                StrFragment::Literal("!".into()),
            ]),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn plain_string_has_no_fragments() {
    let got = kinds(r#""hello""#);
    assert_eq!(got, vec![TokenKind::Str("hello".into()), TokenKind::Eof]);
}

#[test]
fn comments_are_skipped() {
    let got = kinds("set x = 1 `` a comment\nset y = 2");
    assert!(got.iter().any(|k| matches!(k, TokenKind::Newline)));
    assert!(!got.iter().any(|k| matches!(k, TokenKind::Ident(s) if s == "a")));
}

#[test]
fn hash_lexes_as_a_token_not_a_comment() {
    assert_eq!(kinds("#quit"), vec![TokenKind::Hash, TokenKind::Ident("quit".into()), TokenKind::Eof]);
}

#[test]
fn word_alias_is_not_lexes_as_equality() {
    assert_eq!(kinds("x is 1"), vec![TokenKind::Ident("x".into()), TokenKind::EqEq, TokenKind::Number(1.0), TokenKind::Eof]);
}

#[test]
fn word_alias_is_not_lexes_as_inequality() {
    assert_eq!(
        kinds("x is not 1"),
        vec![TokenKind::Ident("x".into()), TokenKind::NotEq, TokenKind::Number(1.0), TokenKind::Eof]
    );
}

#[test]
fn word_alias_less_than_lexes_as_lt() {
    assert_eq!(
        kinds("x less than 1"),
        vec![TokenKind::Ident("x".into()), TokenKind::Lt, TokenKind::Number(1.0), TokenKind::Eof]
    );
}

#[test]
fn tracks_line_numbers_across_newlines() {
    let toks = lex("set x = 1\nset y = 2").unwrap();
    let second_set = toks.iter().filter(|t| t.kind == TokenKind::KwSet).nth(1).unwrap();
    assert_eq!(second_set.line, 2);
}

#[test]
fn unterminated_string_is_an_error() {
    assert!(lex("\"unterminated").is_err());
}

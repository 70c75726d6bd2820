// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn tokenizes_plain_literal() {
    let tokens = tokenize_segment("file.txt").unwrap();
    assert_eq!(tokens, vec![Token::Literal("file.txt".into())]);
}

#[test]
fn tokenizes_question_and_star() {
    let tokens = tokenize_segment("a?b*c").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Literal("a".into()),
            Token::AnyChar,
            Token::Literal("b".into()),
            Token::AnySequence,
            Token::Literal("c".into()),
        ]
    );
}

#[test]
fn tokenizes_bracket_with_range_and_literal_set() {
    let tokens = tokenize_segment("[a-cX]").unwrap();
    assert_eq!(
        tokens,
        vec![Token::Bracket { negate: false, chars: vec!['X'], ranges: vec![('a', 'c')] }]
    );
}

#[test]
fn tokenizes_negated_bracket() {
    let tokens = tokenize_segment("[!abc]").unwrap();
    assert_eq!(
        tokens,
        vec![Token::Bracket { negate: true, chars: vec!['a', 'b', 'c'], ranges: vec![] }]
    );
}

#[test]
fn unterminated_bracket_is_an_error() {
    assert!(tokenize_segment("[abc").is_err());
}

#[test]
fn brace_expansion_is_rejected() {
    assert!(tokenize_segment("*.{tmp,log}").is_err());
}

#[test]
fn bracket_matches_char_is_case_insensitive() {
    let tokens = tokenize_segment("[a-c]").unwrap();
    assert!(tokens[0].matches_char('B'));
    assert!(!tokens[0].matches_char('x'));
}

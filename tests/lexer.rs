use aurora::{
    ErrorKind, Token,
    lexer::{Lexer, tokenize},
    number::PromotedFloat,
    token::{BinaryLogic, Bracket, Comparison, Operator, Quote, Separator},
};

fn lex(source: &str) -> Vec<Token> {
    tokenize(source).expect("source should tokenize")
}

fn lex_error(source: &str) -> ErrorKind {
    tokenize(source)
        .expect_err("source should be rejected")
        .kind()
        .expect("error carries a diagnostic")
}

#[test]
fn method_call_tokens() {
    assert_eq!(
        lex(r#"Terminal.write("Hi")"#),
        vec![
            Token::word("Terminal"),
            Token::Separator(Separator::Dot),
            Token::word("write"),
            Token::Bracket(Bracket::ROUND_OPEN),
            Token::string("Hi"),
            Token::Bracket(Bracket::ROUND_CLOSE),
        ]
    );
}

#[test]
fn minus_is_an_operator_unless_it_leads_a_number() {
    assert_eq!(
        lex("3 - 4"),
        vec![Token::int(3), Token::Operator(Operator::Minus), Token::int(4)]
    );
    assert_eq!(lex("3 -4"), vec![Token::int(3), Token::int(-4)]);
    assert_eq!(lex("-"), vec![Token::Operator(Operator::Minus)]);
}

#[test]
fn numbers_take_at_most_one_dot() {
    assert_eq!(lex("1.5"), vec![Token::Float(PromotedFloat::Single(1.5))]);
    assert_eq!(
        lex("1.25.3"),
        vec![
            Token::float(1.25f32),
            Token::Separator(Separator::Dot),
            Token::int(3),
        ]
    );
}

#[test]
fn reserved_words_and_symbols() {
    assert_eq!(
        lex("x >= 2 && true"),
        vec![
            Token::word("x"),
            Token::Comparison(Comparison::GreaterOrEqual),
            Token::int(2),
            Token::BinaryLogic(BinaryLogic::And),
            Token::Boolean(true),
        ]
    );
    assert_eq!(
        lex("a Equal b Xor false"),
        vec![
            Token::word("a"),
            Token::Comparison(Comparison::Equal),
            Token::word("b"),
            Token::BinaryLogic(BinaryLogic::Xor),
            Token::Boolean(false),
        ]
    );
    assert_eq!(
        lex("end = 1"),
        vec![Token::word("end"), Token::Equals, Token::int(1)]
    );
}

#[test]
fn string_escapes() {
    assert_eq!(
        lex(r"'it\'s'"),
        vec![Token::String {
            text: "it's".to_string(),
            quote: Quote::Single,
        }]
    );
    assert_eq!(lex(r#""a\nb""#), vec![Token::string("a\nb")]);
    assert_eq!(lex(r#""a\qb""#), vec![Token::string(r"a\qb")]);
}

#[test]
fn quotes_survive_in_repr_only() {
    let token = Token::string("Hi");
    assert_eq!(token.repr(), "\"Hi\"");
    assert_eq!(token.to_string(), "Hi");
    assert_eq!(Token::Null.to_string(), "null");
}

#[test]
fn malformed_input() {
    assert_eq!(lex_error(r#""abc"#), ErrorKind::UnclosedDelimiter);
    assert_eq!(lex_error("a => b"), ErrorKind::InvalidSyntax);
    assert_eq!(lex_error("a @ b"), ErrorKind::UnexpectedToken);
}

#[test]
fn end_of_input_is_reported_once_exhausted() {
    let mut lexer = Lexer::new("x");
    assert_eq!(lexer.next_token().expect("word"), Token::word("x"));
    assert_eq!(lexer.next_token().expect("end"), Token::EndOfInput);
    assert_eq!(lexer.next_token().expect("end"), Token::EndOfInput);
    assert!(lex("   ").is_empty());
}

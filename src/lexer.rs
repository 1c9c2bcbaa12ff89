use crate::{
    diagnostics::{ErrorKind, Result, fatal},
    number::{PromotedFloat, PromotedInt},
    token::{BinaryLogic, Bracket, Comparison, Operator, Quote, Separator, Token},
};

/// Characters that start a symbol run (`==`, `&&`, `=`, ...).
const SYMBOLS: [char; 6] = ['!', '=', '&', '|', '<', '>'];

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = match self.peeked.take() {
            Some(pair) => Some(pair),
            None => self.chars.next(),
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
        }
        next
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn collect_while<F>(&mut self, start: usize, mut predicate: F) -> &'a str
    where
        F: FnMut(char) -> bool,
    {
        while let Some((_, ch)) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
        let source = self.source;
        &source[start..self.current]
    }

    fn skip_whitespace(&mut self) {
        while let Some((_, ch)) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    /// Digits with at most one `.`; `-` is only accepted as the first
    /// character, and a lone `-` is subtraction.
    fn number(&mut self, start: usize) -> Result<Token> {
        let mut seen_dot = false;
        let lexeme = self.collect_while(start, |ch| match ch {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        });
        if lexeme == "-" {
            return Ok(Token::Operator(Operator::Minus));
        }
        if seen_dot {
            Ok(Token::Float(PromotedFloat::parse(lexeme)?))
        } else {
            Ok(Token::Integer(PromotedInt::parse(lexeme)?))
        }
    }

    fn word(&mut self, start: usize) -> Token {
        let lexeme = self.collect_while(start, char::is_alphabetic);
        classify_word(lexeme)
    }

    fn string(&mut self, start: usize, quote: Quote) -> Result<Token> {
        let mut text = String::new();
        while let Some((_, ch)) = self.bump() {
            match ch {
                '\\' => match self.bump() {
                    Some((_, esc)) => match unescape(esc) {
                        Some(resolved) => text.push(resolved),
                        None => {
                            text.push('\\');
                            text.push(esc);
                        }
                    },
                    None => break,
                },
                ch if ch == quote.symbol() => return Ok(Token::String { text, quote }),
                ch => text.push(ch),
            }
        }
        Err(fatal(
            ErrorKind::UnclosedDelimiter,
            format!(
                "unterminated string literal starting at column {}: {}",
                start + 1,
                &self.source[start..]
            ),
        ))
    }

    fn symbol(&mut self, start: usize) -> Result<Token> {
        let lexeme = self.collect_while(start, |ch| SYMBOLS.contains(&ch));
        if let Some(kind) = Comparison::from_spelling(lexeme) {
            return Ok(Token::Comparison(kind));
        }
        if let Some(kind) = BinaryLogic::from_spelling(lexeme) {
            return Ok(Token::BinaryLogic(kind));
        }
        if lexeme == "=" {
            return Ok(Token::Equals);
        }
        Err(fatal(
            ErrorKind::InvalidSyntax,
            format!("invalid symbol '{lexeme}'"),
        ))
    }

    /// Returns [`Token::EndOfInput`] once the line is exhausted.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let Some((start, ch)) = self.bump() else {
            return Ok(Token::EndOfInput);
        };

        if ch.is_ascii_digit() || ch == '-' {
            return self.number(start);
        }
        if ch.is_alphabetic() {
            return Ok(self.word(start));
        }
        if let Some(op) = Operator::from_char(ch) {
            return Ok(Token::Operator(op));
        }
        if let Some(bracket) = Bracket::from_char(ch) {
            return Ok(Token::Bracket(bracket));
        }
        if let Some(quote) = Quote::from_char(ch) {
            return self.string(start, quote);
        }
        if let Some(sep) = Separator::from_char(ch) {
            return Ok(Token::Separator(sep));
        }
        if SYMBOLS.contains(&ch) {
            return self.symbol(start);
        }
        Err(fatal(
            ErrorKind::UnexpectedToken,
            format!("invalid character '{ch}' at column {}", start + 1),
        ))
    }

    /// The terminating [`Token::EndOfInput`] is not included.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Token::EndOfInput => break,
                token => tokens.push(token),
            }
        }
        log::trace!("tokenized {} token(s)", tokens.len());
        Ok(tokens)
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

fn classify_word(lexeme: &str) -> Token {
    match lexeme {
        "true" => Token::Boolean(true),
        "false" => Token::Boolean(false),
        _ => {
            if let Some(kind) = BinaryLogic::from_spelling(lexeme) {
                Token::BinaryLogic(kind)
            } else if let Some(kind) = Comparison::from_spelling(lexeme) {
                Token::Comparison(kind)
            } else {
                Token::Word(lexeme.to_string())
            }
        }
    }
}

fn unescape(esc: char) -> Option<char> {
    let resolved = match esc {
        '"' => '"',
        '\'' => '\'',
        'n' => '\n',
        't' => '\t',
        '\\' => '\\',
        _ => return None,
    };
    Some(resolved)
}

use std::fmt;

use crate::number::{PromotedFloat, PromotedInt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
}

impl Operator {
    pub fn from_char(ch: char) -> Option<Self> {
        let op = match ch {
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Star,
            '/' => Self::Slash,
            '^' => Self::Caret,
            _ => return None,
        };
        Some(op)
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Star => '*',
            Self::Slash => '/',
            Self::Caret => '^',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Round,
    Square,
    Curly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub kind: BracketKind,
    pub open: bool,
}

impl Bracket {
    pub const ROUND_OPEN: Self = Self {
        kind: BracketKind::Round,
        open: true,
    };
    pub const ROUND_CLOSE: Self = Self {
        kind: BracketKind::Round,
        open: false,
    };

    pub fn from_char(ch: char) -> Option<Self> {
        let (kind, open) = match ch {
            '(' => (BracketKind::Round, true),
            ')' => (BracketKind::Round, false),
            '[' => (BracketKind::Square, true),
            ']' => (BracketKind::Square, false),
            '{' => (BracketKind::Curly, true),
            '}' => (BracketKind::Curly, false),
            _ => return None,
        };
        Some(Self { kind, open })
    }

    pub const fn symbol(self) -> char {
        match (self.kind, self.open) {
            (BracketKind::Round, true) => '(',
            (BracketKind::Round, false) => ')',
            (BracketKind::Square, true) => '[',
            (BracketKind::Square, false) => ']',
            (BracketKind::Curly, true) => '{',
            (BracketKind::Curly, false) => '}',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    /// Accepts both the symbolic and the spelled-out form.
    pub fn from_spelling(text: &str) -> Option<Self> {
        let kind = match text {
            "==" | "Equal" => Self::Equal,
            "!=" | "NotEqual" => Self::NotEqual,
            ">" | "Greater" => Self::Greater,
            "<" | "Less" => Self::Less,
            ">=" | "GreaterOrEqual" => Self::GreaterOrEqual,
            "<=" | "LessOrEqual" => Self::LessOrEqual,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryLogic {
    Or,
    And,
    Not,
    Xor,
}

impl BinaryLogic {
    pub fn from_spelling(text: &str) -> Option<Self> {
        let kind = match text {
            "||" | "Or" => Self::Or,
            "&&" | "And" => Self::And,
            "!" | "Not" => Self::Not,
            "Xor" => Self::Xor,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Not => "!",
            Self::Xor => "Xor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Dot,
    Comma,
    Semicolon,
}

impl Separator {
    pub fn from_char(ch: char) -> Option<Self> {
        let sep = match ch {
            '.' => Self::Dot,
            ',' => Self::Comma,
            ';' => Self::Semicolon,
            _ => return None,
        };
        Some(sep)
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Comma => ',',
            Self::Semicolon => ';',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            _ => None,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

/// Discriminant of a [`Token`], used for type checks and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Word,
    Integer,
    Float,
    String,
    Boolean,
    Operator,
    Bracket,
    Comparison,
    BinaryLogic,
    Separator,
    Equals,
    Null,
    EndOfInput,
}

impl TokenKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Word => "WORD",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Operator => "OPERATOR",
            Self::Bracket => "BRACKET",
            Self::Comparison => "COMPARISON",
            Self::BinaryLogic => "BINARY_OPERATION",
            Self::Separator => "SEPARATOR",
            Self::Equals => "EQUALS",
            Self::Null => "NULL",
            Self::EndOfInput => "END_OF_FILE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified unit of source text. Tokens double as the runtime values of
/// the language: every evaluation produces one.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    Integer(PromotedInt),
    Float(PromotedFloat),
    String { text: String, quote: Quote },
    Boolean(bool),
    Operator(Operator),
    Bracket(Bracket),
    Comparison(Comparison),
    BinaryLogic(BinaryLogic),
    Separator(Separator),
    Equals,
    Null,
    EndOfInput,
}

impl Token {
    pub fn word(name: impl Into<String>) -> Self {
        Self::Word(name.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::String {
            text: text.into(),
            quote: Quote::Double,
        }
    }

    pub fn int(value: impl Into<PromotedInt>) -> Self {
        Self::Integer(value.into())
    }

    pub fn float(value: impl Into<PromotedFloat>) -> Self {
        Self::Float(value.into())
    }

    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Word(_) => TokenKind::Word,
            Self::Integer(_) => TokenKind::Integer,
            Self::Float(_) => TokenKind::Float,
            Self::String { .. } => TokenKind::String,
            Self::Boolean(_) => TokenKind::Boolean,
            Self::Operator(_) => TokenKind::Operator,
            Self::Bracket(_) => TokenKind::Bracket,
            Self::Comparison(_) => TokenKind::Comparison,
            Self::BinaryLogic(_) => TokenKind::BinaryLogic,
            Self::Separator(_) => TokenKind::Separator,
            Self::Equals => TokenKind::Equals,
            Self::Null => TokenKind::Null,
            Self::EndOfInput => TokenKind::EndOfInput,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    pub fn is_bracket(&self, bracket: Bracket) -> bool {
        matches!(self, Self::Bracket(b) if *b == bracket)
    }

    pub fn is_separator(&self, separator: Separator) -> bool {
        matches!(self, Self::Separator(s) if *s == separator)
    }

    /// Source-like rendering: strings keep their quotes. Variable and class
    /// lookups key on this text.
    pub fn repr(&self) -> String {
        match self {
            Self::String { text, quote } => {
                let q = quote.symbol();
                format!("{q}{text}{q}")
            }
            other => other.to_string(),
        }
    }
}

/// User-facing rendering: strings appear without quotes.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(name) => f.write_str(name),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String { text, .. } => f.write_str(text),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Operator(op) => write!(f, "{}", op.symbol()),
            Self::Bracket(bracket) => write!(f, "{}", bracket.symbol()),
            Self::Comparison(cmp) => f.write_str(cmp.symbol()),
            Self::BinaryLogic(logic) => f.write_str(logic.symbol()),
            Self::Separator(sep) => write!(f, "{}", sep.symbol()),
            Self::Equals => f.write_str("="),
            Self::Null => f.write_str("null"),
            Self::EndOfInput => Ok(()),
        }
    }
}

/// Renders a token run back into compact source text for messages.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(Token::repr).collect()
}

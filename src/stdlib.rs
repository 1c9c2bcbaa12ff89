use crate::{
    diagnostics::{AuroraError, Diagnostic, ErrorKind, Result, fatal},
    number::{PromotedFloat, PromotedInt},
    registry::{CallContext, Class, ClassRegistry, Keywords, Param, bind_arguments},
    token::{Token, TokenKind},
};

const BLACK: &str = "\x1b[30m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const BLACK_BG: &str = "\x1b[40m";
const RED_BG: &str = "\x1b[41m";
const GREEN_BG: &str = "\x1b[42m";
const YELLOW_BG: &str = "\x1b[43m";
const BLUE_BG: &str = "\x1b[44m";
const MAGENTA_BG: &str = "\x1b[45m";
const CYAN_BG: &str = "\x1b[46m";
const WHITE_BG: &str = "\x1b[47m";

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Seeds the built-in classes. Must run before the first line.
pub fn install(registry: &mut ClassRegistry) {
    registry.register(
        Class::new("Terminal")
            .with_method("write", terminal_write)
            .with_method("read", terminal_read)
            .with_method("readInt", terminal_read_int)
            .with_method("readFloat", terminal_read_float)
            .with_method("readBool", terminal_read_bool)
            .with_method("clear", terminal_clear)
            .with_attribute("color", || Token::string(WHITE)),
    );
    registry.register(Class::new("Integer").with_method("create", integer_create));
    registry.register(Class::new("Float").with_method("create", float_create));
    registry.register(Class::new("String").with_method("create", string_create));
    registry.register(
        Class::new("Boolean")
            .with_method("create", boolean_create)
            .with_method("toStyle", boolean_to_style),
    );
    registry.register(
        Class::new("Variables")
            .with_method("create", variables_create)
            .with_method("edit", variables_edit),
    );
    registry.register(
        Class::new("Colors")
            .with_attribute("BLACK", || Token::string(BLACK))
            .with_attribute("RED", || Token::string(RED))
            .with_attribute("GREEN", || Token::string(GREEN))
            .with_attribute("YELLOW", || Token::string(YELLOW))
            .with_attribute("BLUE", || Token::string(BLUE))
            .with_attribute("MAGENTA", || Token::string(MAGENTA))
            .with_attribute("CYAN", || Token::string(CYAN))
            .with_attribute("WHITE", || Token::string(WHITE))
            .with_attribute("BLACK_BG", || Token::string(BLACK_BG))
            .with_attribute("RED_BG", || Token::string(RED_BG))
            .with_attribute("GREEN_BG", || Token::string(GREEN_BG))
            .with_attribute("YELLOW_BG", || Token::string(YELLOW_BG))
            .with_attribute("BLUE_BG", || Token::string(BLUE_BG))
            .with_attribute("MAGENTA_BG", || Token::string(MAGENTA_BG))
            .with_attribute("CYAN_BG", || Token::string(CYAN_BG))
            .with_attribute("WHITE_BG", || Token::string(WHITE_BG))
            .with_method("rgb", colors_rgb)
            .with_method("hex", colors_hex),
    );
}

fn terminal_write(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let end = match keywords.get("end") {
        None => "\n".to_string(),
        Some(Token::String { text, .. }) => text.clone(),
        Some(other) => {
            ctx.raise(
                ErrorKind::TypeMismatch,
                "Terminal.write 'end' argument requests a string",
            )?;
            other.to_string()
        }
    };
    for value in positionals {
        ctx.console.enqueue(value.to_string());
    }
    ctx.console.enqueue(end);
    ctx.console.flush()?;
    Ok(Token::Null)
}

/// Prompts with the optional message and blocks for one line.
fn prompt(ctx: &mut CallContext<'_>, positionals: &[Token], keywords: &Keywords) -> Result<String> {
    let args = bind_arguments(
        ctx,
        positionals,
        keywords,
        &[Param::new("message", TokenKind::String)],
        false,
    )?;
    if let Some(message) = args.get("message") {
        ctx.console.enqueue(message.to_string());
    }
    ctx.console.flush()?;
    ctx.console.read_line()
}

fn terminal_read(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    prompt(ctx, positionals, keywords).map(Token::string)
}

fn terminal_read_int(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let input = prompt(ctx, positionals, keywords)?;
    Ok(Token::Integer(PromotedInt::parse(input.trim())?))
}

fn terminal_read_float(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let input = prompt(ctx, positionals, keywords)?;
    Ok(Token::Float(PromotedFloat::parse(input.trim())?))
}

fn terminal_read_bool(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let input = prompt(ctx, positionals, keywords)?;
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Token::Boolean(true)),
        "false" => Ok(Token::Boolean(false)),
        other => {
            ctx.raise(
                ErrorKind::TypeMismatch,
                format!("'{other}' is not a boolean value"),
            )?;
            Ok(Token::Null)
        }
    }
}

fn terminal_clear(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    if !positionals.is_empty() || !keywords.is_empty() {
        ctx.raise(
            ErrorKind::ArgumentSurplus,
            "Terminal.clear does not take any arguments",
        )?;
    }
    ctx.console.enqueue(CLEAR_SCREEN);
    ctx.console.flush()?;
    log::debug!("(screen cleared)");
    Ok(Token::Null)
}

fn integer_create(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    create_typed(ctx, positionals, keywords, "Integer")
}

fn float_create(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    create_typed(ctx, positionals, keywords, "Float")
}

fn string_create(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    create_typed(ctx, positionals, keywords, "String")
}

fn boolean_create(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    create_typed(ctx, positionals, keywords, "Boolean")
}

/// Shared body of the `<Type>.create(name; value)` factories.
fn create_typed(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
    class: &str,
) -> Result<Token> {
    let args = bind_arguments(
        ctx,
        positionals,
        keywords,
        &[Param::any("name"), Param::any("value")],
        false,
    )?;
    let name = args.get("name").ok_or_else(|| {
        fatal(
            ErrorKind::ArgumentDeficit,
            format!("missing required argument 'name' in {class}.create"),
        )
    })?;
    let name = variable_name(name)?;
    let kind = VariableType::from_name(class)?;
    let value = match args.get("value") {
        Some(value) => match kind.coerce(value)? {
            Some(coerced) => coerced,
            None => {
                ctx.raise(
                    ErrorKind::TypeMismatch,
                    format!(
                        "parameter 'value' expected a value of type {}, found {}",
                        kind.token_kind(),
                        value.kind()
                    ),
                )?;
                value.clone()
            }
        },
        None => kind.default_value(),
    };
    ctx.variables.set(&name, value.clone())?;
    Ok(value)
}

fn boolean_to_style(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let args = bind_arguments(
        ctx,
        positionals,
        keywords,
        &[
            Param::new("variable", TokenKind::Boolean),
            Param::new("optionStyle", TokenKind::String),
        ],
        false,
    )?;
    let value = match args.get("variable") {
        Some(Token::Boolean(value)) => *value,
        Some(other) => {
            return Err(fatal(
                ErrorKind::TypeMismatch,
                format!("Boolean.toStyle expected a boolean variable, not {}", other.kind()),
            ));
        }
        None => {
            return Err(fatal(
                ErrorKind::ArgumentDeficit,
                "missing required argument 'variable' in Boolean.toStyle",
            ));
        }
    };
    let style = args.get("optionStyle").ok_or_else(|| {
        fatal(
            ErrorKind::ArgumentDeficit,
            "missing required argument 'optionStyle' in Boolean.toStyle",
        )
    })?;
    let rendered = match (style.to_string().as_str(), value) {
        ("word", true) => "true",
        ("word", false) => "false",
        ("char", true) => "y",
        ("char", false) => "n",
        ("number", true) | ("binary", true) => "1",
        ("number", false) => "2",
        ("binary", false) => "0",
        (other, _) => {
            return Err(fatal(
                ErrorKind::UnsupportedOperation,
                format!("cannot convert boolean with option style '{other}'"),
            ));
        }
    };
    Ok(Token::string(rendered))
}

fn variables_create(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let mut args = bind_arguments(ctx, positionals, keywords, &[Param::any("type")], true)?;
    let kind = args.shift_remove("type").ok_or_else(|| {
        fatal(
            ErrorKind::ArgumentDeficit,
            "missing required argument 'type' in Variables.create",
        )
    })?;
    let kind = VariableType::from_name(&kind.to_string())?;
    if args.is_empty() {
        return Err(fatal(
            ErrorKind::ArgumentDeficit,
            "Variables.create needs at least one variable to declare",
        ));
    }

    for (key, value) in args {
        if key.starts_with("extra_positional_") {
            let name = variable_name(&value)?;
            ctx.variables.set(&name, kind.default_value())?;
            continue;
        }
        let coerced = kind.coerce(&value)?.ok_or_else(|| {
            fatal(
                ErrorKind::TypeMismatch,
                format!("{} does not match expected type {}", value.kind(), kind.token_kind()),
            )
        })?;
        ctx.variables.set(&key, coerced)?;
    }
    Ok(Token::Null)
}

fn variables_edit(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    if !keywords.is_empty() {
        ctx.raise(
            ErrorKind::ArgumentSurplus,
            "Variables.edit does not take any keyword arguments",
        )?;
    }
    let (name, value) = match positionals {
        [] => {
            return Err(fatal(
                ErrorKind::ArgumentDeficit,
                "Variables.edit is missing argument 'name'",
            ));
        }
        [_] => {
            return Err(fatal(
                ErrorKind::ArgumentDeficit,
                "Variables.edit is missing argument 'value'",
            ));
        }
        [name, value, rest @ ..] => {
            if !rest.is_empty() {
                ctx.raise(
                    ErrorKind::ArgumentSurplus,
                    "Variables.edit takes exactly two arguments",
                )?;
            }
            (name, value)
        }
    };
    let name = variable_name(name)?;
    ctx.variables.set(&name, value.clone())?;
    Ok(Token::Null)
}

fn colors_rgb(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let args = bind_arguments(
        ctx,
        positionals,
        keywords,
        &[
            Param::new("red", TokenKind::Integer),
            Param::new("green", TokenKind::Integer),
            Param::new("blue", TokenKind::Integer),
            Param::new("background", TokenKind::Boolean),
        ],
        false,
    )?;
    let red = channel(args.get("red"), "red")?;
    let green = channel(args.get("green"), "green")?;
    let blue = channel(args.get("blue"), "blue")?;
    Ok(Token::string(rgb_escape(red, green, blue, background(args.get("background")))))
}

fn colors_hex(
    ctx: &mut CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
) -> Result<Token> {
    let args = bind_arguments(
        ctx,
        positionals,
        keywords,
        &[
            Param::new("value", TokenKind::String),
            Param::new("background", TokenKind::Boolean),
        ],
        false,
    )?;
    let hex = args
        .get("value")
        .ok_or_else(|| fatal(ErrorKind::ArgumentDeficit, "Colors.hex is missing argument 'value'"))?
        .to_string();
    let (red, green, blue) = parse_hex(&hex).ok_or_else(|| {
        fatal(
            ErrorKind::InvalidSyntax,
            format!("'{hex}' is not a hexadecimal color of the form #RRGGBB"),
        )
    })?;
    Ok(Token::string(rgb_escape(red, green, blue, background(args.get("background")))))
}

fn channel(value: Option<&Token>, name: &str) -> Result<u8> {
    match value {
        None => Err(fatal(
            ErrorKind::ArgumentDeficit,
            format!("Colors.rgb is missing argument '{name}'"),
        )),
        Some(Token::Integer(n)) => n
            .to_usize()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| {
                fatal(
                    ErrorKind::OutOfRange,
                    format!("'{name}' must be between 0 and 255, found {n}"),
                )
            }),
        Some(other) => Err(fatal(
            ErrorKind::OutOfRange,
            format!("'{name}' must be an integer between 0 and 255, found {}", other.repr()),
        )),
    }
}

fn background(value: Option<&Token>) -> bool {
    matches!(value, Some(Token::Boolean(true)))
}

fn rgb_escape(red: u8, green: u8, blue: u8, background: bool) -> String {
    let mode = if background { 4 } else { 3 };
    format!("\x1b[{mode}8;2;{red};{green};{blue}m")
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let part = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((part(0..2)?, part(2..4)?, part(4..6)?))
}

/// Name of a variable to declare or overwrite. A string names the variable
/// directly, which is how an already-defined variable is referred to; a bare
/// word for a defined variable has already evaluated to its value.
fn variable_name(token: &Token) -> Result<String> {
    match token {
        Token::Word(name) | Token::String { text: name, .. } => Ok(name.clone()),
        other => Err(AuroraError::from(
            Diagnostic::new(
                ErrorKind::TypeMismatch,
                format!("a variable name must be a word, found {} {}", other.kind(), other.repr()),
            )
            .with_note("quote the name to redefine an existing variable"),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableType {
    Integer,
    Float,
    String,
    Boolean,
}

impl VariableType {
    /// Case-insensitive; accepts the `CLASS<Name>` placeholder a class name
    /// evaluates to.
    fn from_name(name: &str) -> Result<Self> {
        let bare = name
            .strip_prefix("CLASS<")
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(name);
        match bare.to_ascii_lowercase().as_str() {
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            _ => Err(fatal(
                ErrorKind::TypeMismatch,
                format!("there is no type '{bare}'"),
            )),
        }
    }

    const fn token_kind(self) -> TokenKind {
        match self {
            Self::Integer => TokenKind::Integer,
            Self::Float => TokenKind::Float,
            Self::String => TokenKind::String,
            Self::Boolean => TokenKind::Boolean,
        }
    }

    fn default_value(self) -> Token {
        match self {
            Self::Integer => Token::int(0),
            Self::Float => Token::float(0.0f32),
            Self::String => Token::string(""),
            Self::Boolean => Token::Boolean(false),
        }
    }

    /// `None` when `value` cannot stand in for this type. Integers widen to
    /// floats.
    fn coerce(self, value: &Token) -> Result<Option<Token>> {
        let coerced = match (self, value) {
            (Self::Float, Token::Integer(n)) => Some(Token::Float(n.to_float()?)),
            _ if value.kind() == self.token_kind() => Some(value.clone()),
            _ => None,
        };
        Ok(coerced)
    }
}

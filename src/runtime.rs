use crate::{
    ast::{Expr, Node},
    console::Console,
    diagnostics::{AuroraError, Diagnostic, ErrorKind, ErrorPolicy, Result, fatal},
    environment::{self, Variables},
    lexer,
    number::{PromotedFloat, PromotedInt},
    parser::{Evaluator, Parser},
    registry::{CallContext, ClassRegistry, Keywords},
    stdlib,
    token::{Operator, Token, render},
};

pub const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 250;
/// Longest string, in bytes, that `+` or `*` may produce.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1 << 24;

/// Runs source one line at a time against a persistent variable store and
/// class registry.
pub struct Interpreter {
    variables: Variables,
    registry: ClassRegistry,
    console: Console,
    policy: ErrorPolicy,
    max_depth: usize,
    max_string_length: usize,
    depth: usize,
    line: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_console(Console::stdio())
    }

    pub fn with_console(console: Console) -> Self {
        let mut registry = ClassRegistry::new();
        stdlib::install(&mut registry);
        Self {
            variables: Variables::new(),
            registry,
            console,
            policy: ErrorPolicy::default(),
            max_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            depth: 0,
            line: 0,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    pub fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    /// Number of the line most recently started.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Runs every line of `source` in order and returns the value of the
    /// last non-blank one. The first fatal error stops the run.
    pub fn run_source(&mut self, source: &str) -> Result<Token> {
        let mut last = Token::Null;
        for line in source.lines() {
            let value = self.run_line(line)?;
            if !line.trim().is_empty() {
                last = value;
            }
        }
        Ok(last)
    }

    /// Advances the line counter, then lexes, builds and evaluates `line`.
    /// Blank lines evaluate to `null`.
    pub fn run_line(&mut self, line: &str) -> Result<Token> {
        self.line += 1;
        self.variables.define_system(environment::LINE_NUMBER, Token::int(line_number(self.line)));
        if line.trim().is_empty() {
            return Ok(Token::Null);
        }
        if self.line == 42 {
            log::debug!("[Line 42] You have discovered the meaning of life. Use it wisely.");
        }
        self.run_line_inner(line).map_err(|err| attach_line(err, self.line))
    }

    fn run_line_inner(&mut self, line: &str) -> Result<Token> {
        let tokens = lexer::tokenize(line)?;
        log::trace!("evaluating line {}: {}", self.line, render(&tokens));
        self.eval_tokens(&tokens)
    }

    /// Evaluates an already tokenized statement.
    pub fn eval_tokens(&mut self, tokens: &[Token]) -> Result<Token> {
        self.depth = 0;
        let expr = Parser::new(self).parse_expression(tokens)?;
        self.evaluate(&expr)
    }

    /// A plain node yields its value; a `name = value` node yields the name
    /// as a word followed by the value.
    pub fn evaluate_argument(&mut self, expr: &Expr) -> Result<Vec<Token>> {
        let value = self.evaluate(expr)?;
        Ok(match &expr.keyword {
            Some(name) => vec![Token::word(name.clone()), value],
            None => vec![value],
        })
    }

    /// Only words name variables and classes.
    fn evaluate_literal(&self, token: &Token) -> Token {
        let Token::Word(name) = token else {
            return token.clone();
        };
        if let Some(value) = self.variables.lookup(name) {
            return value.clone();
        }
        if self.registry.contains(name) {
            return Token::string(format!("CLASS<{name}>"));
        }
        token.clone()
    }

    fn call_method(&mut self, class: &str, method: &str, arguments: &[Expr]) -> Result<Token> {
        let callback = self.registry.resolve(class)?.method(method)?;

        let mut positionals = Vec::new();
        let mut keywords = Keywords::new();
        for argument in arguments {
            let mut parts = self.evaluate_argument(argument)?.into_iter();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(value), None, None) => positionals.push(value),
                (Some(Token::Word(name)), Some(value), None) => {
                    keywords.insert(name, value);
                }
                (Some(_), Some(_), None) => {
                    return Err(fatal(
                        ErrorKind::InvalidSyntax,
                        "keyword arguments must be named by a word",
                    ));
                }
                _ => {
                    return Err(fatal(
                        ErrorKind::System,
                        "an argument evaluated to an unexpected number of elements",
                    ));
                }
            }
        }

        log::trace!(
            "calling {class}.{method} with {} positional and {} keyword argument(s)",
            positionals.len(),
            keywords.len()
        );
        let mut ctx = CallContext {
            variables: &mut self.variables,
            console: &mut self.console,
            policy: &self.policy,
            line: self.line,
        };
        callback(&mut ctx, &positionals, &keywords)
    }

    /// Replaces each unescaped `{name}` with the variable's display text.
    /// Unknown names stay as written.
    fn interpolate(&self, text: &str) -> Result<String> {
        let mut result = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.clone().next() {
                    Some('{') => {
                        chars.next();
                        result.push('{');
                    }
                    _ => result.push('\\'),
                },
                '{' => {
                    let rest = chars.as_str();
                    let Some(end) = rest.find('}') else {
                        result.push('{');
                        continue;
                    };
                    let name = &rest[..end];
                    match self.variables.lookup(name) {
                        Some(value) => {
                            log::trace!("interpolating '{name}' as {}", value.repr());
                            result.push_str(&value.to_string());
                        }
                        None => {
                            self.policy.raise(
                                Diagnostic::new(
                                    ErrorKind::VarNotDefined,
                                    format!("the variable '{name}' is undefined, kept as written"),
                                )
                                .with_line(self.line),
                            )?;
                            result.push('{');
                            result.push_str(name);
                            result.push('}');
                        }
                    }
                    chars = rest[end + 1..].chars();
                }
                other => result.push(other),
            }
        }
        Ok(result)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for Interpreter {
    fn evaluate(&mut self, expr: &Expr) -> Result<Token> {
        match &expr.node {
            Node::Empty => Ok(Token::Null),
            Node::Literal(token) => Ok(self.evaluate_literal(token)),
            Node::ClassRef(token) => Ok(Token::Word(token.to_string())),
            Node::AttributeAccess { class, attribute } => {
                let getter = self.registry.resolve(class)?.attribute(attribute)?;
                Ok(getter())
            }
            Node::MethodCall {
                class,
                method,
                arguments,
            } => self.call_method(class, method, arguments),
        }
    }

    fn combine(&mut self, mut left: Expr, right: &Expr) -> Result<Expr> {
        if left.is_empty() {
            left.node = Node::Literal(self.evaluate(right)?);
            left.pending = right.pending;
            return Ok(left);
        }
        let Some(op) = left.pending else {
            return Err(fatal(
                ErrorKind::System,
                "tried to combine expressions without an operator",
            ));
        };
        let lhs = self.evaluate(&left)?;
        let rhs = self.evaluate(right)?;
        left.node = Node::Literal(apply_operator(&lhs, op, &rhs, self.max_string_length)?);
        left.pending = right.pending;
        Ok(left)
    }

    fn enter_expression(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(fatal(
                ErrorKind::ExpressionDepthExceeded,
                format!("more than {} nested expressions on one line", self.max_depth),
            ));
        }
        Ok(())
    }

    fn materialize(&mut self, token: Token) -> Result<Token> {
        match token {
            Token::String { text, quote } => Ok(Token::String {
                text: self.interpolate(&text)?,
                quote,
            }),
            other => Ok(other),
        }
    }
}

/// Applies `op` to two evaluated operands. Operands are never reordered, so
/// a chain folds strictly left to right. String results longer than
/// `max_string_length` bytes are `OutOfRange`.
pub fn apply_operator(
    left: &Token,
    op: Operator,
    right: &Token,
    max_string_length: usize,
) -> Result<Token> {
    match (left, right) {
        (Token::String { text: a, quote }, Token::String { text: b, .. }) => match op {
            Operator::Plus if a.len() + b.len() > max_string_length => Err(fatal(
                ErrorKind::OutOfRange,
                format!("concatenation would exceed {max_string_length} bytes"),
            )),
            Operator::Plus => Ok(Token::String {
                text: format!("{a}{b}"),
                quote: *quote,
            }),
            _ => Err(unsupported(left, op, right)),
        },
        (Token::String { text, quote }, Token::Integer(count)) => match op {
            Operator::Star => Ok(Token::String {
                text: repeat(text, count, max_string_length)?,
                quote: *quote,
            }),
            _ => Err(unsupported(left, op, right)),
        },
        (Token::Integer(a), Token::Integer(b)) => match op {
            Operator::Plus => Ok(Token::Integer(a + b)),
            Operator::Minus => Ok(Token::Integer(a - b)),
            Operator::Star => Ok(Token::Integer(a * b)),
            Operator::Slash if b.is_zero() => Err(division_by_zero()),
            Operator::Slash => Ok(Token::Float(&a.to_float()? / &b.to_float()?)),
            Operator::Caret => Err(unsupported(left, op, right)),
        },
        (Token::Integer(a), Token::Float(b)) => float_arithmetic(a, op, b, b.is_zero())
            .ok_or_else(|| unsupported(left, op, right))?,
        (Token::Float(a), Token::Integer(b)) => float_arithmetic(a, op, b, b.is_zero())
            .ok_or_else(|| unsupported(left, op, right))?,
        (Token::Float(a), Token::Float(b)) => float_arithmetic(a, op, b, b.is_zero())
            .ok_or_else(|| unsupported(left, op, right))?,
        _ => Err(fatal(
            ErrorKind::TypeMismatch,
            format!("cannot evaluate {} {} {}", left.kind(), op.symbol(), right.kind()),
        )),
    }
}

/// `None` when the operator has no float meaning.
fn float_arithmetic<'a, L, R>(
    left: &'a L,
    op: Operator,
    right: &'a R,
    divisor_is_zero: bool,
) -> Option<Result<Token>>
where
    &'a L: std::ops::Add<&'a R, Output = PromotedFloat>
        + std::ops::Sub<&'a R, Output = PromotedFloat>
        + std::ops::Mul<&'a R, Output = PromotedFloat>
        + std::ops::Div<&'a R, Output = PromotedFloat>,
{
    let value = match op {
        Operator::Plus => left + right,
        Operator::Minus => left - right,
        Operator::Star => left * right,
        Operator::Slash if divisor_is_zero => return Some(Err(division_by_zero())),
        Operator::Slash => left / right,
        Operator::Caret => return None,
    };
    Some(Ok(Token::Float(value)))
}

fn repeat(text: &str, count: &PromotedInt, max_length: usize) -> Result<String> {
    count
        .to_usize()
        .filter(|count| {
            text.len()
                .checked_mul(*count)
                .is_some_and(|length| length <= max_length)
        })
        .map(|count| text.repeat(count))
        .ok_or_else(|| {
            fatal(
                ErrorKind::OutOfRange,
                format!("cannot repeat a string {count} times"),
            )
        })
}

fn unsupported(left: &Token, op: Operator, right: &Token) -> AuroraError {
    fatal(
        ErrorKind::UnsupportedOperation,
        format!("unsupported operation: {} {} {}", left.kind(), op.symbol(), right.kind()),
    )
}

fn division_by_zero() -> AuroraError {
    fatal(ErrorKind::DivisionByZero, "cannot divide by zero")
}

fn line_number(line: usize) -> i64 {
    i64::try_from(line).unwrap_or(i64::MAX)
}

fn attach_line(err: AuroraError, line: usize) -> AuroraError {
    match err {
        AuroraError::Diagnostic(diag) if diag.line.is_none() => {
            AuroraError::Diagnostic(diag.with_line(line))
        }
        other => other,
    }
}

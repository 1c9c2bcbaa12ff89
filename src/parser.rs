//! Builds expression trees from the tokens of one line.
//!
//! Construction is interleaved with evaluation: a finished member access
//! followed by more tokens is reduced to a literal on the spot, and sibling
//! segments are folded left to right as soon as they are built. The parser
//! therefore drives an [`Evaluator`] rather than returning a pure tree.

use crate::{
    ast::{Expr, Node},
    diagnostics::{ErrorKind, Result, fatal},
    token::{Bracket, Separator, Token, render},
};

/// Hooks the builder needs from the runtime.
pub trait Evaluator {
    /// Reduces a node to a single token.
    fn evaluate(&mut self, expr: &Expr) -> Result<Token>;

    /// Joins `left` with `right` through `left`'s pending operator.
    fn combine(&mut self, left: Expr, right: &Expr) -> Result<Expr>;

    /// Called once per segment-and-fold pass; errors when nesting runs too
    /// deep.
    fn enter_expression(&mut self) -> Result<()>;

    /// Final text of a source token as it becomes a node value.
    fn materialize(&mut self, token: Token) -> Result<Token>;
}

pub struct Parser<'e, E: Evaluator> {
    evaluator: &'e mut E,
}

impl<'e, E: Evaluator> Parser<'e, E> {
    pub fn new(evaluator: &'e mut E) -> Self {
        Self { evaluator }
    }

    /// Parses a whole line (or bracketed sub-expression) into one node.
    pub fn parse_expression(&mut self, tokens: &[Token]) -> Result<Expr> {
        self.evaluator.enter_expression()?;
        let mut nodes = Vec::new();
        for run in segment(tokens) {
            nodes.push(self.parse_run(run)?);
        }
        self.fold(nodes)
    }

    fn parse_run(&mut self, run: &[Token]) -> Result<Expr> {
        if !run
            .first()
            .is_some_and(|token| token.is_bracket(Bracket::ROUND_OPEN))
        {
            return self.build(run);
        }

        let close = matching_close(run, 0).ok_or_else(|| {
            fatal(
                ErrorKind::UnclosedDelimiter,
                format!("missing close bracket in expression {}", render(run)),
            )
        })?;
        let mut grouped = self.parse_expression(&run[1..close])?;
        match &run[close + 1..] {
            [] => {}
            [Token::Operator(op)] => grouped.pending = Some(*op),
            rest => {
                return Err(fatal(
                    ErrorKind::UnexpectedToken,
                    format!("unexpected '{}' after bracketed expression", render(rest)),
                ));
            }
        }
        Ok(grouped)
    }

    fn fold(&mut self, nodes: Vec<Expr>) -> Result<Expr> {
        let mut nodes = nodes.into_iter();
        let mut current = nodes.next().unwrap_or_default();
        for next in nodes {
            if current.pending.is_none() {
                log::debug!("dropping segment with no joining operator: {next:?}");
                break;
            }
            current = self.evaluator.combine(current, &next)?;
        }
        Ok(current)
    }

    /// Runs the node-construction state machine over one segment.
    pub fn build(&mut self, tokens: &[Token]) -> Result<Expr> {
        let mut expr = Expr::new();
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            index += 1;
            log::trace!("building node: token = {}, kind = {:?}", token.repr(), expr.kind());

            match std::mem::take(&mut expr.node) {
                Node::Empty => {
                    expr.node = Node::Literal(self.evaluator.materialize(token.clone())?);
                }
                Node::Literal(value) => {
                    expr.node = Node::Literal(value);
                    self.apply_to_literal(&mut expr, token);
                }
                Node::ClassRef(value) if matches!(token, Token::Word(_)) => {
                    expr.node = Node::ClassRef(value).into_attribute(token.to_string());
                }
                node @ Node::AttributeAccess { .. } if token.is_bracket(Bracket::ROUND_OPEN) => {
                    let (spans, end) = split_arguments(tokens, index)?;
                    index = end;
                    let mut arguments = Vec::with_capacity(spans.len());
                    for span in spans {
                        arguments.push(self.parse_expression(span)?);
                    }
                    expr.node = node.into_method_call(arguments);
                }
                node => {
                    expr.node = node;
                    self.reduce(&mut expr)?;
                    self.apply_to_literal(&mut expr, token);
                }
            }
        }
        Ok(expr)
    }

    /// Evaluates the finished node and reseeds it as a literal, keeping the
    /// keyword and pending operator.
    fn reduce(&mut self, expr: &mut Expr) -> Result<()> {
        let value = self.evaluator.evaluate(expr)?;
        expr.node = Node::Literal(value);
        Ok(())
    }

    fn apply_to_literal(&mut self, expr: &mut Expr, token: &Token) {
        match token {
            Token::Operator(op) => expr.pending = Some(*op),
            Token::Separator(Separator::Dot) => {
                expr.node = std::mem::take(&mut expr.node).into_class_ref();
            }
            Token::Equals => {
                if let Node::Literal(value) = std::mem::take(&mut expr.node) {
                    expr.keyword = Some(value.to_string());
                }
            }
            other => log::debug!("ignoring '{}' after a complete literal", other.repr()),
        }
    }
}

/// Splits on top-level operators; each operator stays at the end of the run
/// it closes.
pub fn segment(tokens: &[Token]) -> Vec<&[Token]> {
    let mut runs = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, token) in tokens.iter().enumerate() {
        if token.is_bracket(Bracket::ROUND_OPEN) {
            depth += 1;
        } else if token.is_bracket(Bracket::ROUND_CLOSE) {
            depth -= 1;
        } else if token.is_operator() && depth <= 0 {
            runs.push(&tokens[start..=idx]);
            start = idx + 1;
        }
    }
    runs.push(&tokens[start..]);
    runs
}

/// Splits the argument list that opens just before `start` on top-level
/// `;`. Returns the argument spans and the index after the closing bracket.
pub fn split_arguments(tokens: &[Token], start: usize) -> Result<(Vec<&[Token]>, usize)> {
    let mut spans = Vec::new();
    let mut depth = 1usize;
    let mut arg_start = start;
    for (idx, token) in tokens.iter().enumerate().skip(start) {
        if depth == 1 && token.is_separator(Separator::Semicolon) {
            spans.push(&tokens[arg_start..idx]);
            arg_start = idx + 1;
        } else if token.is_bracket(Bracket::ROUND_OPEN) {
            depth += 1;
        } else if token.is_bracket(Bracket::ROUND_CLOSE) {
            depth -= 1;
            if depth == 0 {
                if arg_start < idx {
                    spans.push(&tokens[arg_start..idx]);
                }
                return Ok((spans, idx + 1));
            }
        }
    }
    Err(fatal(
        ErrorKind::UnclosedDelimiter,
        format!("missing close bracket in expression {}", render(tokens)),
    ))
}

fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        if token.is_bracket(Bracket::ROUND_OPEN) {
            depth += 1;
        } else if token.is_bracket(Bracket::ROUND_CLOSE) {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

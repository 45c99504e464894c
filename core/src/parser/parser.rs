use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::options::EvaluatorOptions;
use crate::parser::error::{FormulaSyntaxError, SyntaxErrorKind, convert_pest_error};
use crate::parser::parsed_expr::{Expr, ExprKind, ParsedExpr};
use crate::parser::syntax::{BinaryOp, Span, UnaryOp};

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left)
        )                                               // `*`, `/`
        .op(Op::prefix(Rule::neg))                       // `-`
        ;
}

#[derive(Parser)]
#[grammar = "parser/formula.pest"]
pub struct FormulaParser;

/// Parse a formula with the default length and nesting limits.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<ParsedExpr<'a>, FormulaSyntaxError> {
    parse_with_limits(arena, source, &EvaluatorOptions::default())
}

/// Parse a formula, enforcing `options.max_length` and `options.max_depth`.
///
/// The length guard runs before anything else looks at the text, so an
/// over-long formula is rejected at 1:1 without being parsed.
pub fn parse_with_limits<'a>(
    arena: &'a Bump,
    source: &'a str,
    options: &EvaluatorOptions,
) -> Result<ParsedExpr<'a>, FormulaSyntaxError> {
    let length = source.chars().count();
    if length > options.max_length {
        return Err(FormulaSyntaxError::new(
            SyntaxErrorKind::TooLong {
                length,
                max_length: options.max_length,
            },
            1,
            1,
            Span::new(0, source.len()),
        ));
    }

    check_nesting(source, options.max_depth)?;

    let mut pairs = FormulaParser::parse(Rule::main, source)
        .map_err(|err| convert_pest_error(err, source))?;
    let expression = pairs
        .next()
        .and_then(|main| main.into_inner().next())
        .ok_or_else(|| missing(source, Span::new(0, source.len()), "expression"))?;

    let expr = build_expr(arena, source, expression)?;
    tracing::trace!(%expr, "parsed formula");
    Ok(ParsedExpr { expr, source })
}

/// Rejects formulas whose tree would nest deeper than `max_depth`, before
/// the recursive grammar and Pratt parser ever see them.
///
/// Depth is the number of open parentheses plus the unary `-` operators still
/// waiting for their operand, at any point of the text.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), FormulaSyntaxError> {
    // Pending unary operators per open group; the first entry is top level.
    let mut pending: Vec<usize> = vec![0];
    let mut depth = 0usize;
    let mut expects_operand = true;

    for (offset, c) in source.char_indices() {
        let deeper = match c {
            '(' => {
                pending.push(0);
                expects_operand = true;
                true
            }
            '-' if expects_operand => {
                if let Some(count) = pending.last_mut() {
                    *count += 1;
                }
                true
            }
            '+' | '-' | '*' | '/' => {
                expects_operand = true;
                false
            }
            ')' => {
                if pending.len() > 1 {
                    depth -= 1 + pending.pop().unwrap_or(0);
                }
                depth -= complete_operand(&mut pending);
                expects_operand = false;
                false
            }
            c if c.is_whitespace() => false,
            _ => {
                if expects_operand {
                    depth -= complete_operand(&mut pending);
                }
                expects_operand = false;
                false
            }
        };

        if deeper {
            depth += 1;
            if depth > max_depth {
                return Err(FormulaSyntaxError::at(
                    source,
                    Span::new(offset, offset + c.len_utf8()),
                    SyntaxErrorKind::TooDeeplyNested { max_depth },
                ));
            }
        }
    }
    Ok(())
}

/// An operand ends the unary chain in front of it; returns the chain length.
fn complete_operand(pending: &mut [usize]) -> usize {
    pending.last_mut().map_or(0, std::mem::take)
}

fn build_expr<'a>(
    arena: &'a Bump,
    source: &'a str,
    pair: Pair<'a, Rule>,
) -> Result<&'a Expr<'a>, FormulaSyntaxError> {
    let span = Span::from(pair.as_span());
    match pair.as_rule() {
        Rule::expression => PRATT_PARSER
            .map_primary(|primary| build_expr(arena, source, primary))
            .map_prefix(|op, operand| {
                let operand = operand?;
                let op_span = Span::from(op.as_span());
                let op = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    rule => return Err(unhandled(source, op_span, rule)),
                };
                let span = Span::combine(&op_span, &operand.span);
                Ok(alloc(arena, ExprKind::Unary { op, expr: operand }, span))
            })
            .map_infix(|left, op, right| {
                let left = left?;
                let right = right?;
                let op = match op.as_rule() {
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    rule => return Err(unhandled(source, Span::from(op.as_span()), rule)),
                };
                let span = Span::combine(&left.span, &right.span);
                Ok(alloc(arena, ExprKind::Binary { op, left, right }, span))
            })
            .parse(pair.into_inner()),

        Rule::grouped => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| missing(source, span.clone(), "grouped expression"))?;
            let inner = build_expr(arena, source, inner)?;
            Ok(alloc(arena, ExprKind::Grouped(inner), span))
        }

        Rule::number => {
            let text = pair.as_str();
            let value = text.replace('_', "").parse::<f64>().map_err(|_| {
                FormulaSyntaxError::at(
                    source,
                    span.clone(),
                    SyntaxErrorKind::Parse {
                        detail: format!("invalid number literal `{}`", text),
                    },
                )
            })?;
            Ok(alloc(arena, ExprKind::Number(value), span))
        }

        Rule::ident => Ok(alloc(arena, ExprKind::Ident(pair.as_str()), span)),

        rule => Err(unhandled(source, span, rule)),
    }
}

fn alloc<'a>(arena: &'a Bump, kind: ExprKind<'a>, span: Span) -> &'a Expr<'a> {
    arena.alloc(Expr { kind, span })
}

fn missing(source: &str, span: Span, what: &str) -> FormulaSyntaxError {
    FormulaSyntaxError::at(
        source,
        span,
        SyntaxErrorKind::Parse {
            detail: format!("missing {}", what),
        },
    )
}

fn unhandled(source: &str, span: Span, rule: Rule) -> FormulaSyntaxError {
    FormulaSyntaxError::at(
        source,
        span,
        SyntaxErrorKind::Parse {
            detail: format!("unhandled rule: {:?}", rule),
        },
    )
}

//! Expression parser
//!
//! Turns option assignments (`name = expression`) and bare expressions
//! into `Expr` trees using the pest grammar in `grammar.pest`.

use crate::ast::Expr;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use strata_core::{
    BinaryOp, BoolOp, CompareOp, ErrorKind, Integer, StrataError, StrataResult, UnaryOp, Value,
};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct ExprParser;

/// Parse `name = expression`
pub fn parse_statement(input: &str) -> StrataResult<(String, Expr)> {
    let statement = parse_rule(Rule::statement, input)?;
    let mut inner = statement.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| syntax_error("missing option name"))?;
    let value = inner.next().ok_or_else(|| syntax_error("missing option value"))?;
    Ok((name, build_expr(value)?))
}

/// Parse a bare expression (a top level `a, b` is a tuple)
pub fn parse_expression(input: &str) -> StrataResult<Expr> {
    let expression = parse_rule(Rule::expression, input)?;
    let value = expression
        .into_inner()
        .next()
        .ok_or_else(|| syntax_error("empty expression"))?;
    build_expr(value)
}

/// Whether `text` can name a section or option
pub fn is_identifier(text: &str) -> bool {
    ExprParser::parse(Rule::name, text).is_ok()
}

fn parse_rule(rule: Rule, input: &str) -> StrataResult<Pair<'_, Rule>> {
    let mut pairs = ExprParser::parse(rule, input).map_err(|e| {
        let (line, col) = match e.line_col {
            LineColLocation::Pos(pos) | LineColLocation::Span(pos, _) => pos,
        };
        syntax_error(format!("{} at {}:{}", e.variant.message(), line, col))
    })?;
    pairs.next().ok_or_else(|| syntax_error("empty input"))
}

fn syntax_error(message: impl Into<String>) -> StrataError {
    StrataError::new(ErrorKind::Syntax, message)
}

fn is_keyword_token(pair: &Pair<'_, Rule>) -> bool {
    matches!(
        pair.as_rule(),
        Rule::kw_if | Rule::kw_else | Rule::kw_or | Rule::kw_and | Rule::kw_not | Rule::EOI
    )
}

/// Child pairs that carry operands or operators
fn operands(pair: Pair<'_, Rule>) -> Vec<Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword_token(p)).collect()
}

fn build_all(pairs: Vec<Pair<'_, Rule>>) -> StrataResult<Vec<Expr>> {
    pairs.into_iter().map(build_expr).collect()
}

fn build_expr(pair: Pair<'_, Rule>) -> StrataResult<Expr> {
    match pair.as_rule() {
        Rule::conditional => {
            let mut parts = operands(pair);
            if parts.len() == 1 {
                return build_expr(parts.remove(0));
            }
            let mut parts = build_all(parts)?.into_iter();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(if_true), Some(condition), Some(if_false)) => Ok(Expr::Conditional {
                    condition: Box::new(condition),
                    if_true: Box::new(if_true),
                    if_false: Box::new(if_false),
                }),
                _ => Err(syntax_error("incomplete conditional expression")),
            }
        }
        Rule::disjunction | Rule::conjunction => {
            let op = if pair.as_rule() == Rule::disjunction { BoolOp::Or } else { BoolOp::And };
            let mut parts = operands(pair);
            if parts.len() == 1 {
                return build_expr(parts.remove(0));
            }
            Ok(Expr::BoolOp(op, build_all(parts)?))
        }
        Rule::inversion => {
            let mut inner = pair.into_inner();
            match inner.next() {
                Some(p) if p.as_rule() == Rule::kw_not => {
                    let operand = inner.next().ok_or_else(|| syntax_error("missing operand of 'not'"))?;
                    Ok(Expr::unary(UnaryOp::Not, build_expr(operand)?))
                }
                Some(p) => build_expr(p),
                None => Err(syntax_error("empty expression")),
            }
        }
        Rule::comparison => {
            let mut parts = operands(pair).into_iter();
            let first = parts.next().ok_or_else(|| syntax_error("empty comparison"))?;
            let first = build_expr(first)?;
            let mut rest = Vec::new();
            while let (Some(op), Some(operand)) = (parts.next(), parts.next()) {
                rest.push((compare_op(op)?, build_expr(operand)?));
            }
            if rest.is_empty() {
                Ok(first)
            } else {
                Ok(Expr::Compare(Box::new(first), rest))
            }
        }
        Rule::bit_or | Rule::bit_xor | Rule::bit_and | Rule::shift | Rule::arith | Rule::term => {
            let mut parts = operands(pair).into_iter();
            let first = parts.next().ok_or_else(|| syntax_error("missing operand"))?;
            let mut left = build_expr(first)?;
            while let (Some(op), Some(operand)) = (parts.next(), parts.next()) {
                left = Expr::binary(binary_op(&op)?, left, build_expr(operand)?);
            }
            Ok(left)
        }
        Rule::factor => {
            let mut inner = pair.into_inner();
            let first = inner.next().ok_or_else(|| syntax_error("empty factor"))?;
            let op = match first.as_rule() {
                Rule::op_neg => UnaryOp::Neg,
                Rule::op_pos => UnaryOp::Pos,
                Rule::op_invert => UnaryOp::Invert,
                _ => return build_expr(first),
            };
            let operand = inner.next().ok_or_else(|| syntax_error("missing unary operand"))?;
            Ok(Expr::unary(op, build_expr(operand)?))
        }
        Rule::power => {
            let mut inner = pair.into_inner();
            let base = inner.next().ok_or_else(|| syntax_error("empty power"))?;
            let base = build_expr(base)?;
            // skip the `**` token
            match inner.nth(1) {
                Some(exponent) => Ok(Expr::binary(BinaryOp::Pow, base, build_expr(exponent)?)),
                None => Ok(base),
            }
        }
        Rule::bare_tuple | Rule::tuple => Ok(Expr::Tuple(build_all(operands(pair))?)),
        Rule::list => Ok(Expr::List(build_all(operands(pair))?)),
        Rule::paren => {
            let inner = pair.into_inner().next().ok_or_else(|| syntax_error("empty parentheses"))?;
            build_expr(inner)
        }
        Rule::dict => {
            let mut entries = Vec::new();
            for entry in pair.into_inner() {
                let mut kv = entry.into_inner();
                match (kv.next(), kv.next()) {
                    (Some(k), Some(v)) => entries.push((build_expr(k)?, build_expr(v)?)),
                    _ => return Err(syntax_error("incomplete dict entry")),
                }
            }
            Ok(Expr::Dict(entries))
        }
        Rule::call => build_call(pair),
        Rule::reference => Ok(Expr::Reference(
            pair.into_inner().map(|p| p.as_str().to_string()).collect(),
        )),
        Rule::integer => {
            let text = pair.as_str();
            Integer::parse(text, 0)
                .map(|i| Expr::Literal(Value::Int(i)))
                .map_err(|e| syntax_error(e.to_string()))
        }
        Rule::float => {
            let text = pair.as_str().replace('_', "");
            text.parse::<f64>()
                .map(|f| Expr::Literal(Value::Float(f)))
                .map_err(|_| syntax_error(format!("invalid float literal '{}'", pair.as_str())))
        }
        Rule::strings => {
            let mut text = String::new();
            for string in pair.into_inner() {
                text.push_str(&decode_string(string)?);
            }
            Ok(Expr::Literal(Value::Str(text)))
        }
        Rule::true_lit => Ok(Expr::Literal(Value::Bool(true))),
        Rule::false_lit => Ok(Expr::Literal(Value::Bool(false))),
        Rule::none_lit => Ok(Expr::Literal(Value::None)),
        other => Err(syntax_error(format!("unexpected {:?}", other))),
    }
}

fn build_call(pair: Pair<'_, Rule>) -> StrataResult<Expr> {
    let mut inner = pair.into_inner();
    let function = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| syntax_error("missing function name"))?;
    let mut args = Vec::new();
    let mut keywords = Vec::new();
    for arg in inner {
        if arg.as_rule() == Rule::keyword_arg {
            let mut kv = arg.into_inner();
            match (kv.next(), kv.next()) {
                (Some(k), Some(v)) => keywords.push((k.as_str().to_string(), build_expr(v)?)),
                _ => return Err(syntax_error("incomplete keyword argument")),
            }
        } else if keywords.is_empty() {
            args.push(build_expr(arg)?);
        } else {
            return Err(syntax_error("positional argument follows keyword argument"));
        }
    }
    Ok(Expr::Call { function, args, keywords })
}

fn compare_op(pair: Pair<'_, Rule>) -> StrataResult<CompareOp> {
    let op = pair.into_inner().next().ok_or_else(|| syntax_error("missing comparison operator"))?;
    Ok(match op.as_rule() {
        Rule::op_eq => CompareOp::Eq,
        Rule::op_ne => CompareOp::NotEq,
        Rule::op_lt => CompareOp::Lt,
        Rule::op_le => CompareOp::LtE,
        Rule::op_gt => CompareOp::Gt,
        Rule::op_ge => CompareOp::GtE,
        Rule::op_is => CompareOp::Is,
        Rule::op_is_not => CompareOp::IsNot,
        Rule::op_in => CompareOp::In,
        Rule::op_not_in => CompareOp::NotIn,
        other => return Err(syntax_error(format!("unexpected comparison {:?}", other))),
    })
}

fn binary_op(pair: &Pair<'_, Rule>) -> StrataResult<BinaryOp> {
    Ok(match pair.as_rule() {
        Rule::op_add => BinaryOp::Add,
        Rule::op_sub => BinaryOp::Sub,
        Rule::op_mul => BinaryOp::Mul,
        Rule::op_div => BinaryOp::Div,
        Rule::op_floordiv => BinaryOp::FloorDiv,
        Rule::op_mod => BinaryOp::Mod,
        Rule::op_lshift => BinaryOp::LShift,
        Rule::op_rshift => BinaryOp::RShift,
        Rule::op_bit_or => BinaryOp::BitOr,
        Rule::op_bit_xor => BinaryOp::BitXor,
        Rule::op_bit_and => BinaryOp::BitAnd,
        other => return Err(syntax_error(format!("unexpected operator {:?}", other))),
    })
}

fn decode_string(pair: Pair<'_, Rule>) -> StrataResult<String> {
    let mut raw = false;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::string_prefix => raw = part.as_str().eq_ignore_ascii_case("r"),
            _ => {
                let body = part.into_inner().next().map(|b| b.as_str()).unwrap_or("");
                return if raw { Ok(body.to_string()) } else { unescape(body) };
            }
        }
    }
    Err(syntax_error("empty string literal"))
}

/// Resolve backslash escapes; unknown escapes keep their backslash
fn unescape(body: &str) -> StrataResult<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = match chars.next() {
            Some(e) => e,
            None => {
                out.push('\\');
                break;
            }
        };
        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char_from_code(code, body)?);
            }
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = (0..width).filter_map(|_| chars.next()).collect();
                let code = match u32::from_str_radix(&hex, 16) {
                    Ok(code) if hex.len() == width => code,
                    _ => {
                        return Err(syntax_error(format!(
                            "truncated \\{}{} escape in string literal",
                            escape, hex
                        )))
                    }
                };
                out.push(char_from_code(code, body)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn char_from_code(code: u32, body: &str) -> StrataResult<char> {
    char::from_u32(code).ok_or_else(|| {
        syntax_error(format!("invalid character escape {:#x} in '{}'", code, body))
    })
}

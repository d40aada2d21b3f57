//! Source renderer
//!
//! Turns expressions back into source text and whole trees back into
//! documents. Compound expressions come out fully parenthesized, so the
//! text re-parses to the same tree shape whatever the precedence.

use crate::ast::Expr;
use crate::tree::{LayoutEntry, Node, NodeId, Tree};
use strata_core::{float_repr, BinaryOp, StrataError, StrataResult, UnaryOp, Value};

/// Render one expression as source text
pub fn render(expr: &Expr) -> StrataResult<String> {
    let mut out = String::new();
    write_expr(expr, &mut out)?;
    Ok(out)
}

/// Quote a string literal.
///
/// Single quotes unless the text holds a `'`, tripled when it holds a
/// newline. Text holding both quote characters is rejected.
pub fn render_string(text: &str) -> StrataResult<String> {
    let has_single = text.contains('\'');
    if has_single && text.contains('"') {
        return Err(StrataError::ambiguous_quoting(text));
    }
    let delimiter = if has_single { "\"" } else { "'" };
    let delimiter = if text.contains('\n') { delimiter.repeat(3) } else { delimiter.to_string() };

    let mut out = String::with_capacity(text.len() + 2 * delimiter.len());
    out.push_str(&delimiter);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push('\n'),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push_str(&delimiter);
    Ok(out)
}

fn write_expr(expr: &Expr, out: &mut String) -> StrataResult<()> {
    match expr {
        Expr::Literal(value) => write_value(value, out)?,
        Expr::Reference(path) => out.push_str(&path.join(".")),
        Expr::Unary(UnaryOp::Not, operand) => {
            out.push_str("(not ");
            write_expr(operand, out)?;
            out.push(')');
        }
        Expr::Unary(op, operand) => {
            out.push_str(op.symbol());
            write_expr(operand, out)?;
        }
        Expr::Binary(op, left, right) => {
            out.push('(');
            if *op == BinaryOp::Pow && is_signed(left) {
                out.push('(');
                write_expr(left, out)?;
                out.push(')');
            } else {
                write_expr(left, out)?;
            }
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(right, out)?;
            out.push(')');
        }
        Expr::BoolOp(op, operands) => {
            out.push('(');
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                    out.push_str(op.symbol());
                    out.push(' ');
                }
                write_expr(operand, out)?;
            }
            out.push(')');
        }
        Expr::Compare(first, rest) => {
            out.push('(');
            write_expr(first, out)?;
            for (op, operand) in rest {
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                write_expr(operand, out)?;
            }
            out.push(')');
        }
        Expr::Conditional { condition, if_true, if_false } => {
            out.push('(');
            write_expr(if_true, out)?;
            out.push_str(" if ");
            write_expr(condition, out)?;
            out.push_str(" else ");
            write_expr(if_false, out)?;
            out.push(')');
        }
        Expr::List(items) => {
            out.push('[');
            write_list(items, out, write_expr)?;
            out.push(']');
        }
        Expr::Tuple(items) => write_tuple(items, out, write_expr)?,
        Expr::Dict(entries) => write_dict(entries.iter().map(|(k, v)| (k, v)), out, write_expr)?,
        Expr::Call { function, args, keywords } => {
            out.push_str(function);
            out.push('(');
            write_list(args, out, write_expr)?;
            for (i, (name, value)) in keywords.iter().enumerate() {
                if i > 0 || !args.is_empty() {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push('=');
                write_expr(value, out)?;
            }
            out.push(')');
        }
    }
    Ok(())
}

/// Operands that would bind wrongly as the left side of `**`
fn is_signed(expr: &Expr) -> bool {
    match expr {
        Expr::Unary(..) => true,
        Expr::Literal(Value::Int(i)) => i.is_negative(),
        Expr::Literal(Value::Float(f)) => f.is_sign_negative(),
        _ => false,
    }
}

fn write_value(value: &Value, out: &mut String) -> StrataResult<()> {
    match value {
        Value::None | Value::Bool(_) | Value::Int(_) => out.push_str(&value.repr()),
        Value::Float(f) if f.is_nan() => out.push_str("float('nan')"),
        Value::Float(f) if f.is_infinite() => {
            out.push_str(if *f > 0.0 { "float('inf')" } else { "float('-inf')" })
        }
        Value::Float(f) => out.push_str(&float_repr(*f)),
        Value::Str(s) => out.push_str(&render_string(s)?),
        Value::List(items) => {
            out.push('[');
            write_list(items, out, write_value)?;
            out.push(']');
        }
        Value::Tuple(items) => write_tuple(items, out, write_value)?,
        Value::Dict(entries) => write_dict(entries.iter().map(|(k, v)| (k, v)), out, write_value)?,
        Value::Set(items) if items.is_empty() => out.push_str("set()"),
        Value::Set(items) => {
            out.push_str("set([");
            write_list(items, out, write_value)?;
            out.push_str("])");
        }
        Value::Type(name) => {
            return Err(StrataError::unsupported(format!(
                "type object '{}' has no source form",
                name
            )))
        }
    }
    Ok(())
}

type Writer<T> = fn(&T, &mut String) -> StrataResult<()>;

fn write_list<T>(items: &[T], out: &mut String, write: Writer<T>) -> StrataResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write(item, out)?;
    }
    Ok(())
}

fn write_tuple<T>(items: &[T], out: &mut String, write: Writer<T>) -> StrataResult<()> {
    out.push('(');
    write_list(items, out, write)?;
    if items.len() == 1 {
        out.push(',');
    }
    out.push(')');
    Ok(())
}

fn write_dict<'a, T: 'a>(
    entries: impl ExactSizeIterator<Item = (&'a T, &'a T)>,
    out: &mut String,
    write: Writer<T>,
) -> StrataResult<()> {
    if entries.len() == 0 {
        out.push_str("{}");
        return Ok(());
    }
    out.push_str("{ ");
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write(key, out)?;
        out.push_str(": ");
        write(value, out)?;
    }
    out.push_str(" }");
    Ok(())
}

/// Render a whole tree, keeping blank lines and comments in place.
///
/// With `indent` set, the body of each section is indented one space
/// deeper than its header.
pub fn print_tree(tree: &Tree, indent: bool) -> StrataResult<String> {
    let mut out = String::new();
    print_section(tree, NodeId::ROOT, 0, indent, &mut out)?;
    Ok(out)
}

fn print_section(
    tree: &Tree,
    id: NodeId,
    level: usize,
    indent: bool,
    out: &mut String,
) -> StrataResult<()> {
    let Some(section) = tree.section(id) else { return Ok(()) };
    let mut level = level;
    if id != NodeId::ROOT {
        out.push_str(&" ".repeat(level));
        out.push_str(&"[".repeat(section.depth));
        out.push_str(&section.name);
        out.push_str(&"]".repeat(section.depth));
        out.push('\n');
        if indent {
            level += 1;
        }
    }
    let pad = " ".repeat(level);
    for entry in &section.layout {
        match entry {
            LayoutEntry::Blank => out.push('\n'),
            LayoutEntry::Comment(text) => {
                out.push_str(&pad);
                out.push_str(text);
                out.push('\n');
            }
            LayoutEntry::Child(child) => match tree.node(*child) {
                Some(Node::Section(_)) => print_section(tree, *child, level, indent, out)?,
                Some(Node::Option(option)) => {
                    let source = render(&option.expr).map_err(|e| e.in_option(tree.path(*child)))?;
                    out.push_str(&pad);
                    out.push_str(&option.name);
                    out.push_str(" = ");
                    out.push_str(&source);
                    out.push('\n');
                }
                None => {}
            },
        }
    }
    Ok(())
}

//! Expression model
//!
//! Option values are kept as expression trees and only reduced to values
//! when read. Nodes are plain data; evaluation lives in `eval`, text
//! rendering in `render`.

use serde::{Deserialize, Serialize};
use strata_core::{BinaryOp, BoolOp, CompareOp, UnaryOp, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Number, string, boolean or `None`
    Literal(Value),
    /// Dotted path such as `Section.Sub.key`
    Reference(Vec<String>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `and` / `or` over two or more operands
    BoolOp(BoolOp, Vec<Expr>),
    /// Chained comparison `first op1 e1 op2 e2 ...`
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    Conditional {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Call {
        function: String,
        args: Vec<Expr>,
        keywords: Vec<(String, Expr)>,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn reference(path: &str) -> Self {
        Expr::Reference(path.split('.').map(str::to_string).collect())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn call(function: &str, args: Vec<Expr>) -> Self {
        Expr::Call { function: function.to_string(), args, keywords: Vec::new() }
    }

    /// Expression whose evaluation yields `value`, or `None` when no
    /// source form exists (type objects)
    pub fn from_value(value: &Value) -> Option<Expr> {
        Some(match value {
            Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
                Expr::Literal(value.clone())
            }
            Value::List(items) => Expr::List(Self::from_values(items)?),
            Value::Tuple(items) => Expr::Tuple(Self::from_values(items)?),
            Value::Dict(entries) => Expr::Dict(
                entries
                    .iter()
                    .map(|(k, v)| Some((Self::from_value(k)?, Self::from_value(v)?)))
                    .collect::<Option<Vec<_>>>()?,
            ),
            Value::Set(items) if items.is_empty() => Expr::call("set", Vec::new()),
            Value::Set(items) => Expr::call("set", vec![Expr::List(Self::from_values(items)?)]),
            Value::Type(_) => return None,
        })
    }

    fn from_values(items: &[Value]) -> Option<Vec<Expr>> {
        items.iter().map(Self::from_value).collect()
    }

    /// Whether any reference node occurs in the tree
    pub fn has_references(&self) -> bool {
        match self {
            Expr::Literal(_) => false,
            Expr::Reference(_) => true,
            Expr::Unary(_, operand) => operand.has_references(),
            Expr::Binary(_, left, right) => left.has_references() || right.has_references(),
            Expr::BoolOp(_, operands) | Expr::List(operands) | Expr::Tuple(operands) => {
                operands.iter().any(Expr::has_references)
            }
            Expr::Compare(first, rest) => {
                first.has_references() || rest.iter().any(|(_, e)| e.has_references())
            }
            Expr::Conditional { condition, if_true, if_false } => {
                condition.has_references() || if_true.has_references() || if_false.has_references()
            }
            Expr::Dict(entries) => entries.iter().any(|(k, v)| k.has_references() || v.has_references()),
            Expr::Call { args, keywords, .. } => {
                args.iter().any(Expr::has_references) || keywords.iter().any(|(_, e)| e.has_references())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_containers() {
        let value = Value::Tuple(vec![Value::int(1), Value::List(vec![Value::from("a")])]);
        let expr = Expr::from_value(&value).unwrap();
        assert_eq!(
            expr,
            Expr::Tuple(vec![Expr::literal(1), Expr::List(vec![Expr::literal("a")])])
        );
    }

    #[test]
    fn test_from_value_set_becomes_call() {
        let value = Value::set(vec![Value::int(2)]).unwrap();
        let expr = Expr::from_value(&value).unwrap();
        assert_eq!(expr, Expr::call("set", vec![Expr::List(vec![Expr::literal(2)])]));
        assert!(Expr::from_value(&Value::Type("int".into())).is_none());
    }

    #[test]
    fn test_has_references() {
        assert!(!Expr::binary(BinaryOp::Add, Expr::literal(1), Expr::literal(2)).has_references());
        let conditional = Expr::Conditional {
            condition: Box::new(Expr::literal(true)),
            if_true: Box::new(Expr::literal(1)),
            if_false: Box::new(Expr::reference("a.b")),
        };
        assert!(conditional.has_references());
    }
}

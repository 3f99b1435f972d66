//! Formula evaluation
//!
//! Walks an [`Expr`] against a [`Scope`] and a [`Capabilities`] set.
//! Null is the "undefined" of the formula world: missing properties,
//! unknown members and failed conversions all evaluate to it, and
//! arithmetic on null stays null. Type mismatches the language has no
//! sensible answer for are [`Error::FormulaEval`].

use std::cmp::Ordering;

use regex::Regex;

use super::ast::{BinaryOp, Expr, Literal, StringOp, UnaryOp};
use super::{Capabilities, Scope};
use crate::model::Value;
use crate::{Error, Result};

/// One evaluation run: the capability set plus the variable scope.
pub struct Evaluator<'c, 's, C: ?Sized> {
    caps: &'c mut C,
    scope: &'s Scope,
}

impl<'c, 's, C: Capabilities + ?Sized> Evaluator<'c, 's, C> {
    pub fn new(caps: &'c mut C, scope: &'s Scope) -> Self {
        Self { caps, scope }
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(lit) => Ok(literal(lit)),

            Expr::Variable(name) => self.variable(name),

            Expr::Member { expr, key } => {
                let target = self.eval(expr)?;
                Ok(target.get(key).cloned().unwrap_or(Value::Null))
            }

            Expr::FunctionCall { name, args } => self.call(name, args),

            Expr::BinaryOp { left, op, right } => self.binary(left, *op, right),

            Expr::UnaryOp { op, expr } => {
                let value = self.eval(expr)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Negate => negate(value),
                }
            }

            Expr::List(items) => {
                let values = items.iter().map(|item| self.eval(item)).collect::<Result<Vec<_>>>()?;
                Ok(Value::List(values))
            }

            Expr::Case { operand, whens, else_expr } => {
                let operand = operand.as_ref().map(|o| self.eval(o)).transpose()?;
                for (when, then) in whens {
                    let candidate = self.eval(when)?;
                    let hit = match &operand {
                        Some(operand) => operand.loose_eq(&candidate),
                        None => candidate.is_truthy(),
                    };
                    if hit {
                        return self.eval(then);
                    }
                }
                match else_expr {
                    Some(otherwise) => self.eval(otherwise),
                    None => Ok(Value::Null),
                }
            }

            Expr::Conditional { condition, then, otherwise } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }

            Expr::In { expr, list } => {
                let needle = self.eval(expr)?;
                let haystack = self.eval(list)?;
                let found = haystack
                    .as_list()
                    .is_some_and(|items| items.iter().any(|item| item.loose_eq(&needle)));
                Ok(Value::Bool(found))
            }

            Expr::IsNull { expr, negated } => {
                let is_null = self.eval(expr)?.is_null();
                Ok(Value::Bool(is_null != *negated))
            }

            Expr::StringOp { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let result = match (left.as_str(), right.as_str()) {
                    (Some(l), Some(r)) => match op {
                        StringOp::StartsWith => l.starts_with(r),
                        StringOp::EndsWith => l.ends_with(r),
                        StringOp::Contains => l.contains(r),
                    },
                    _ => false,
                };
                Ok(Value::Bool(result))
            }
        }
    }

    fn variable(&self, name: &str) -> Result<Value> {
        if name == "key" {
            return Ok(self.scope.key.clone().map(Value::String).unwrap_or(Value::Null));
        }
        self.scope
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::FormulaEval(format!("Unknown variable: {name}")))
    }

    fn binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<Value> {
        // Logical operators short-circuit.
        match op {
            BinaryOp::And => {
                let result = self.eval(left)?.is_truthy() && self.eval(right)?.is_truthy();
                return Ok(Value::Bool(result));
            }
            BinaryOp::Or => {
                let result = self.eval(left)?.is_truthy() || self.eval(right)?.is_truthy();
                return Ok(Value::Bool(result));
            }
            _ => {}
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match op {
            BinaryOp::Xor => Ok(Value::Bool(l.is_truthy() != r.is_truthy())),
            BinaryOp::Add => add(l, r),
            BinaryOp::Eq => Ok(Value::Bool(l.loose_eq(&r))),
            BinaryOp::Neq => Ok(Value::Bool(!l.loose_eq(&r))),
            BinaryOp::Lt => Ok(ordered(&l, &r, |o| o == Ordering::Less)),
            BinaryOp::Lte => Ok(ordered(&l, &r, |o| o != Ordering::Greater)),
            BinaryOp::Gt => Ok(ordered(&l, &r, |o| o == Ordering::Greater)),
            BinaryOp::Gte => Ok(ordered(&l, &r, |o| o != Ordering::Less)),
            BinaryOp::RegexMatch => regex_match(&l, &r),
            _ => arithmetic(op, &l, &r),
        }
    }

    // ========================================================================
    // Function dispatch
    // ========================================================================

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Value> {
        match name {
            // Capabilities
            "prop" | "propRaw" => {
                check_arity(name, args, 1, 2)?;
                let property = self.property_name(name, &args[0])?;
                let key = match args.get(1) {
                    Some(arg) => optional_text(self.eval(arg)?),
                    None => None,
                };
                self.property(name == "propRaw", &property, key.as_deref())
            }
            "dependentProp" | "dependentPropRaw" => {
                check_arity(name, args, 1, 1)?;
                let property = self.property_name(name, &args[0])?;
                let key = self.scope.key.clone();
                self.property(name == "dependentPropRaw", &property, key.as_deref())
            }
            "longestProp" => {
                check_arity(name, args, 0, 1)?;
                let property = match args.first() {
                    Some(arg) => optional_text(self.eval(arg)?),
                    None => None,
                };
                Ok(self.caps.longest_prop(property.as_deref())?.unwrap_or_default())
            }
            "isEdge" => {
                check_arity(name, args, 0, 0)?;
                Ok(Value::Bool(self.caps.is_edge()))
            }

            // Builtins
            "coalesce" => {
                for arg in args {
                    let value = self.eval(arg)?;
                    if !value.is_null() {
                        return Ok(value);
                    }
                }
                Ok(Value::Null)
            }
            "concat" => {
                let mut out = String::new();
                for arg in args {
                    out.push_str(&self.eval(arg)?.to_text());
                }
                Ok(Value::String(out))
            }
            "join" => {
                check_arity(name, args, 1, 2)?;
                let list = self.eval(&args[0])?;
                let separator = match args.get(1) {
                    Some(arg) => self.eval(arg)?.to_text(),
                    None => " ".to_string(),
                };
                Ok(match list {
                    Value::List(items) => Value::String(
                        items
                            .iter()
                            .filter(|item| !item.is_null())
                            .map(Value::to_text)
                            .collect::<Vec<_>>()
                            .join(&separator),
                    ),
                    Value::Null => Value::Null,
                    other => Value::String(other.to_text()),
                })
            }
            _ => {
                check_arity(name, args, 1, 1)?;
                let value = self.eval(&args[0])?;
                builtin(name, value)
            }
        }
    }

    fn property_name(&mut self, function: &str, arg: &Expr) -> Result<String> {
        match self.eval(arg)? {
            Value::String(name) if !name.is_empty() => Ok(name),
            other => Err(Error::FormulaEval(format!(
                "{function} expects a property name, got {}",
                other.type_name()
            ))),
        }
    }

    fn property(&mut self, raw: bool, name: &str, key: Option<&str>) -> Result<Value> {
        let result = if raw {
            self.caps.prop_raw(name, key)?
        } else {
            self.caps.prop(name, key)?
        };
        Ok(result.unwrap_or_default())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn check_arity(name: &str, args: &[Expr], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::FormulaEval(format!(
            "{name} takes {min}..={max} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn optional_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_text()),
    }
}

const BUILTINS: &[&str] = &[
    "trim", "toUpper", "toUpperCase", "toLower", "toLowerCase",
    "length", "size", "toString", "toNumber", "isEmpty",
];

fn builtin(name: &str, value: Value) -> Result<Value> {
    if !BUILTINS.contains(&name) {
        return Err(Error::FormulaEval(format!("Unknown function: {name}")));
    }
    if value.is_null() && name != "isEmpty" {
        return Ok(Value::Null);
    }
    let result = match name {
        "trim" => Value::String(value.to_text().trim().to_string()),
        "toUpper" | "toUpperCase" => Value::String(value.to_text().to_uppercase()),
        "toLower" | "toLowerCase" => Value::String(value.to_text().to_lowercase()),
        "length" | "size" => Value::Int(value.len() as i64),
        "toString" => Value::String(value.to_text()),
        "toNumber" => match &value {
            Value::Int(_) | Value::Float(_) => value,
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => value.to_number().map(Value::Float).unwrap_or_default(),
            },
            _ => Value::Null,
        },
        "isEmpty" => Value::Bool(match &value {
            Value::Null => true,
            Value::String(_) | Value::List(_) | Value::Map(_) => value.is_empty(),
            _ => false,
        }),
        _ => return Err(Error::FormulaEval(format!("Unknown function: {name}"))),
    };
    Ok(result)
}

fn negate(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(i) => Ok(i.checked_neg().map(Value::Int).unwrap_or(Value::Float(-(i as f64)))),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(type_error("-", &other, &Value::Null)),
    }
}

/// `+`: string concatenation when either side is a string, list append for
/// lists, numeric addition otherwise.
fn add(l: Value, r: Value) -> Result<Value> {
    match (l, r) {
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (Value::List(mut a), other) => {
            a.push(other);
            Ok(Value::List(a))
        }
        (l, r) if l.is_string() || r.is_string() => {
            Ok(Value::String(format!("{}{}", l.to_text(), r.to_text())))
        }
        (l, r) => arithmetic(BinaryOp::Add, &l, &r),
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> Result<Value> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        let (a, b) = (*a, *b);
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div if b == 0 => return Err(Error::FormulaEval("Division by zero".into())),
            BinaryOp::Div if a.checked_rem(b) == Some(0) => a.checked_div(b),
            BinaryOp::Mod if b == 0 => return Err(Error::FormulaEval("Division by zero".into())),
            BinaryOp::Mod => a.checked_rem(b),
            _ => None,
        };
        if let Some(result) = exact {
            return Ok(Value::Int(result));
        }
    }

    let (Some(a), Some(b)) = (l.as_float(), r.as_float()) else {
        return Err(type_error(op_symbol(op), l, r));
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Err(Error::FormulaEval("Division by zero".into())),
        BinaryOp::Div => a / b,
        BinaryOp::Mod if b == 0.0 => return Err(Error::FormulaEval("Division by zero".into())),
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        _ => return Err(type_error(op_symbol(op), l, r)),
    };
    Ok(Value::Float(result))
}

fn ordered(l: &Value, r: &Value, accept: impl Fn(Ordering) -> bool) -> Value {
    Value::Bool(l.compare(r).is_some_and(accept))
}

fn regex_match(l: &Value, r: &Value) -> Result<Value> {
    let (Some(text), Some(pattern)) = (l.as_str(), r.as_str()) else {
        return Ok(Value::Bool(false));
    };
    let re = Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| Error::FormulaEval(format!("Invalid regex '{pattern}': {e}")))?;
    Ok(Value::Bool(re.is_match(text)))
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "^",
        _ => "?",
    }
}

fn type_error(op: &str, l: &Value, r: &Value) -> Error {
    Error::FormulaEval(format!("Cannot apply '{op}' to {} and {}", l.type_name(), r.type_name()))
}

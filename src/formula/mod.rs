//! # Formula Language
//!
//! Schema-declared expressions computing titles, subtitles, times, display
//! values and validation results from an entity's properties.
//!
//! Parsing is a pure function of the formula text. Evaluation reaches the
//! entity only through [`Capabilities`], so the same evaluator serves
//! display formulas, element titles (wrapped in [`Recording`] to collect
//! provenance) and validation against synthetic entities.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use std::collections::BTreeMap;

use crate::model::Value;
use crate::Result;
use ast::Expr;

/// Parse formula text into an AST.
pub fn parse(formula: &str) -> Result<Expr> {
    let tokens = lexer::tokenize(formula)?;
    parser::parse_formula(&tokens)
}

// ============================================================================
// Capabilities
// ============================================================================

/// Property access a formula may perform on the entity it is evaluated for.
///
/// `None` results mean "no such value" and surface as `null` in the formula.
pub trait Capabilities {
    /// Display value of `name` (`prop`).
    fn prop(&mut self, name: &str, key: Option<&str>) -> Result<Option<Value>>;

    /// Raw value of `name` (`propRaw`). Compound properties yield a list.
    fn prop_raw(&mut self, name: &str, key: Option<&str>) -> Result<Option<Value>>;

    /// Longest user-visible display value, optionally restricted to `name`.
    fn longest_prop(&mut self, name: Option<&str>) -> Result<Option<Value>>;

    fn is_edge(&self) -> bool;

    /// Canonical IRI for a property name as the formula wrote it.
    fn canonical_name(&self, name: &str) -> String;
}

/// Wraps a capability set and records the canonical name of every property
/// access that produced a defined, non-empty result.
pub struct Recording<'c, C: ?Sized> {
    inner: &'c mut C,
    accessed: &'c mut Vec<String>,
}

impl<'c, C: Capabilities + ?Sized> Recording<'c, C> {
    pub fn new(inner: &'c mut C, accessed: &'c mut Vec<String>) -> Self {
        Self { inner, accessed }
    }

    fn record(&mut self, name: &str, result: &Option<Value>) {
        let contributed = match result {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };
        if contributed {
            self.accessed.push(self.inner.canonical_name(name));
        }
    }
}

impl<C: Capabilities + ?Sized> Capabilities for Recording<'_, C> {
    fn prop(&mut self, name: &str, key: Option<&str>) -> Result<Option<Value>> {
        let result = self.inner.prop(name, key)?;
        self.record(name, &result);
        Ok(result)
    }

    fn prop_raw(&mut self, name: &str, key: Option<&str>) -> Result<Option<Value>> {
        let result = self.inner.prop_raw(name, key)?;
        self.record(name, &result);
        Ok(result)
    }

    fn longest_prop(&mut self, name: Option<&str>) -> Result<Option<Value>> {
        let result = self.inner.longest_prop(name)?;
        if let Some(name) = name {
            self.record(name, &result);
        }
        Ok(result)
    }

    fn is_edge(&self) -> bool {
        self.inner.is_edge()
    }

    fn canonical_name(&self, name: &str) -> String {
        self.inner.canonical_name(name)
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Variables visible to a formula besides the capability functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Property key the formula was asked for; `key` in the formula text.
    pub key: Option<String>,
    /// Additional scope entries such as a relationship's `label`.
    pub variables: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new(key: Option<&str>) -> Self {
        Self { key: key.map(str::to_string), variables: BTreeMap::new() }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

// ============================================================================
// Formula
// ============================================================================

/// A parsed formula, ready to evaluate any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self { source: source.to_string(), expr: parse(source)? })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against `caps`. `None` when the result is null.
    pub fn evaluate<C: Capabilities + ?Sized>(
        &self,
        caps: &mut C,
        scope: &Scope,
    ) -> Result<Option<Value>> {
        let value = eval::Evaluator::new(caps, scope).eval(&self.expr)?;
        Ok(if value.is_null() { None } else { Some(value) })
    }
}

//! Formula AST
//!
//! Parsed formula expressions. Pure data: evaluation lives in
//! [`super::eval`].

/// A formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value: `1`, `'text'`, `true`, `null`
    Literal(Literal),
    /// Scope variable: `key`, `label`, or an additional-scope entry
    Variable(String),
    /// Member access: `item.displayName`
    Member { expr: Box<Expr>, key: String },
    /// Function call: `prop('firstName')`, `trim(x)`
    FunctionCall { name: String, args: Vec<Expr> },
    /// Binary operation: `a + b`, `x = y`
    BinaryOp { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    /// Unary operation: `NOT x`, `-y`
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// List literal: `[1, 2, 3]`
    List(Vec<Expr>),
    /// `CASE [operand] WHEN ... THEN ... ELSE ... END`
    Case {
        operand: Option<Box<Expr>>,
        whens: Vec<(Expr, Expr)>,
        else_expr: Option<Box<Expr>>,
    },
    /// `cond ? then : otherwise`
    Conditional { condition: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    /// IN predicate: `x IN [1, 2, 3]`
    In { expr: Box<Expr>, list: Box<Expr> },
    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },
    /// String operations: STARTS WITH, ENDS WITH, CONTAINS
    StringOp { left: Box<Expr>, op: StringOp, right: Box<Expr> },
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add, Sub, Mul, Div, Mod, Pow,
    // Comparison
    Eq, Neq, Lt, Lte, Gt, Gte,
    // Logical
    And, Or, Xor,
    // String
    RegexMatch,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

/// String-specific operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    StartsWith,
    EndsWith,
    Contains,
}

//! Formula recursive descent parser.
//!
//! Parses token streams into a single [`Expr`]. Precedence, loosest first:
//! `?:`, OR, XOR, AND, NOT, comparison, string ops, `+ -`, `* / %`, `^`,
//! unary minus, member access.

use crate::{Error, Result};
use super::ast::*;
use super::lexer::{Token, TokenKind};

/// Parser state: wraps a token slice with cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::FormulaSyntax {
            position: self.peek().span.start,
            message: msg,
        }
    }
}

/// Parse a complete formula from tokens. Trailing tokens are an error.
pub fn parse_formula(tokens: &[Token]) -> Result<Expr> {
    if tokens.is_empty() {
        return Err(Error::FormulaSyntax { position: 0, message: "Empty formula".into() });
    }
    let mut p = Parser::new(tokens);
    let expr = parse_expr(&mut p)?;
    if !p.at(TokenKind::Eof) {
        return Err(p.error(format!("Unexpected trailing token: '{}'", p.peek().text)));
    }
    Ok(expr)
}

// ============================================================================
// Expressions
// ============================================================================

type Level = fn(&mut Parser<'_>) -> Result<Expr>;

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right) }
}

/// One left-associative level: `next (op next)*`, where `op_for` picks the
/// operators that belong to this level.
fn left_assoc(p: &mut Parser, next: Level, op_for: fn(TokenKind) -> Option<BinaryOp>) -> Result<Expr> {
    let mut left = next(p)?;
    while let Some(op) = op_for(p.peek_kind()) {
        p.advance();
        let right = next(p)?;
        left = binary(left, op, right);
    }
    Ok(left)
}

fn parse_expr(p: &mut Parser) -> Result<Expr> {
    let condition = parse_or(p)?;
    if !p.eat(TokenKind::Question) {
        return Ok(condition);
    }
    let then = parse_expr(p)?;
    p.expect(TokenKind::Colon)?;
    // `a ? b : c ? d : e` nests to the right
    let otherwise = parse_expr(p)?;
    Ok(Expr::Conditional {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

fn parse_or(p: &mut Parser) -> Result<Expr> {
    left_assoc(p, parse_xor, |kind| (kind == TokenKind::Or).then_some(BinaryOp::Or))
}

fn parse_xor(p: &mut Parser) -> Result<Expr> {
    left_assoc(p, parse_and, |kind| (kind == TokenKind::Xor).then_some(BinaryOp::Xor))
}

fn parse_and(p: &mut Parser) -> Result<Expr> {
    left_assoc(p, parse_not, |kind| (kind == TokenKind::And).then_some(BinaryOp::And))
}

fn parse_not(p: &mut Parser) -> Result<Expr> {
    if !p.eat(TokenKind::Not) {
        return parse_comparison(p);
    }
    let expr = parse_not(p)?;
    Ok(Expr::UnaryOp { op: UnaryOp::Not, expr: Box::new(expr) })
}

/// At most one of `IS [NOT] NULL`, `IN list` or a relational operator,
/// applied to string-test operands.
fn parse_comparison(p: &mut Parser) -> Result<Expr> {
    let left = parse_string_test(p)?;
    let op = match p.peek_kind() {
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::Neq => BinaryOp::Neq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Lte => BinaryOp::Lte,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Gte => BinaryOp::Gte,
        TokenKind::RegexMatch => BinaryOp::RegexMatch,
        TokenKind::Is => {
            p.advance();
            let negated = p.eat(TokenKind::Not);
            p.expect(TokenKind::Null)?;
            return Ok(Expr::IsNull { expr: Box::new(left), negated });
        }
        TokenKind::In => {
            p.advance();
            let list = parse_additive(p)?;
            return Ok(Expr::In { expr: Box::new(left), list: Box::new(list) });
        }
        _ => return Ok(left),
    };
    p.advance();
    let right = parse_string_test(p)?;
    Ok(binary(left, op, right))
}

/// `STARTS WITH`, `ENDS WITH`, `CONTAINS`. The first two are two tokens.
fn parse_string_test(p: &mut Parser) -> Result<Expr> {
    let left = parse_additive(p)?;
    let (op, two_words) = match p.peek_kind() {
        TokenKind::Starts => (StringOp::StartsWith, true),
        TokenKind::Ends => (StringOp::EndsWith, true),
        TokenKind::Contains => (StringOp::Contains, false),
        _ => return Ok(left),
    };
    p.advance();
    if two_words {
        p.expect(TokenKind::With)?;
    }
    let right = parse_additive(p)?;
    Ok(Expr::StringOp { left: Box::new(left), op, right: Box::new(right) })
}

fn parse_additive(p: &mut Parser) -> Result<Expr> {
    left_assoc(p, parse_multiplicative, |kind| match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    })
}

fn parse_multiplicative(p: &mut Parser) -> Result<Expr> {
    left_assoc(p, parse_power, |kind| match kind {
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        _ => None,
    })
}

/// `^` binds tighter than `*` and nests to the right; its base may be negated.
fn parse_power(p: &mut Parser) -> Result<Expr> {
    let base = parse_negation(p)?;
    if !p.eat(TokenKind::Caret) {
        return Ok(base);
    }
    let exponent = parse_power(p)?;
    Ok(binary(base, BinaryOp::Pow, exponent))
}

fn parse_negation(p: &mut Parser) -> Result<Expr> {
    if !p.eat(TokenKind::Minus) {
        return parse_postfix(p);
    }
    let expr = parse_negation(p)?;
    Ok(Expr::UnaryOp { op: UnaryOp::Negate, expr: Box::new(expr) })
}

/// A primary followed by any number of `.key` lookups.
fn parse_postfix(p: &mut Parser) -> Result<Expr> {
    let mut expr = parse_primary(p)?;
    while p.eat(TokenKind::Dot) {
        let key = p.expect(TokenKind::Identifier)?.text.clone();
        expr = Expr::Member { expr: Box::new(expr), key };
    }
    Ok(expr)
}

fn parse_primary(p: &mut Parser) -> Result<Expr> {
    let tok = p.advance().clone();
    let literal = match tok.kind {
        TokenKind::Integer => Literal::Int(number(&tok)?),
        TokenKind::Float => Literal::Float(number(&tok)?),
        TokenKind::StringLiteral => Literal::String(tok.text),
        TokenKind::True => Literal::Bool(true),
        TokenKind::False => Literal::Bool(false),
        TokenKind::Null => Literal::Null,
        TokenKind::LParen => {
            let inner = parse_expr(p)?;
            p.expect(TokenKind::RParen)?;
            return Ok(inner);
        }
        TokenKind::LBracket => return Ok(Expr::List(parse_items(p, TokenKind::RBracket)?)),
        TokenKind::Case => return parse_case(p),
        TokenKind::Identifier if p.eat(TokenKind::LParen) => {
            let args = parse_items(p, TokenKind::RParen)?;
            return Ok(Expr::FunctionCall { name: tok.text, args });
        }
        TokenKind::Identifier => return Ok(Expr::Variable(tok.text)),
        kind => {
            return Err(Error::FormulaSyntax {
                position: tok.span.start,
                message: format!("Unexpected {kind:?} '{}' in expression", tok.text),
            });
        }
    };
    Ok(Expr::Literal(literal))
}

fn number<N: std::str::FromStr>(tok: &Token) -> Result<N> {
    tok.text.parse().map_err(|_| Error::FormulaSyntax {
        position: tok.span.start,
        message: format!("Invalid number '{}'", tok.text),
    })
}

/// Comma-separated expressions through the `close` token, which is consumed.
fn parse_items(p: &mut Parser, close: TokenKind) -> Result<Vec<Expr>> {
    let mut items = Vec::new();
    if p.eat(close) {
        return Ok(items);
    }
    loop {
        items.push(parse_expr(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(close)?;
    Ok(items)
}

/// Body of `CASE [operand] WHEN .. THEN .. [ELSE ..] END`, after `CASE`.
fn parse_case(p: &mut Parser) -> Result<Expr> {
    let operand = if p.at(TokenKind::When) { None } else { Some(Box::new(parse_expr(p)?)) };
    let mut whens = Vec::new();
    while p.eat(TokenKind::When) {
        let condition = parse_expr(p)?;
        p.expect(TokenKind::Then)?;
        whens.push((condition, parse_expr(p)?));
    }
    if whens.is_empty() {
        return Err(p.error("CASE without WHEN".into()));
    }
    let else_expr = if p.eat(TokenKind::Else) { Some(Box::new(parse_expr(p)?)) } else { None };
    p.expect(TokenKind::End)?;
    Ok(Expr::Case { operand, whens, else_expr })
}

// ============================================================================
// Tests
// ============================================================================

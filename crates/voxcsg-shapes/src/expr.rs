//! Arithmetic-only expressions over named parameters.
//!
//! Grammar: numeric literals, parameter names, `+ - * /`, unary sign and
//! parentheses. Nothing else is accepted, and evaluation only reads the
//! parameter map.

use std::collections::BTreeSet;

use thiserror::Error;
use voxcsg_core::shape::Parameters;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression produced a non-finite value")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Param(String),
    Neg(Box<Expr>),
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn parse(source: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_add_sub()?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
        }
    }

    pub fn evaluate(&self, params: &Parameters) -> Result<f64, ExprError> {
        let value = self.eval_inner(params)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExprError::NonFinite)
        }
    }

    fn eval_inner(&self, params: &Parameters) -> Result<f64, ExprError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Param(name) => params
                .get(name)
                .copied()
                .ok_or_else(|| ExprError::UnknownParameter(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval_inner(params)?),
            Expr::Binary { lhs, op, rhs } => {
                let a = lhs.eval_inner(params)?;
                let b = rhs.eval_inner(params)?;
                match op {
                    BinaryOp::Add => Ok(a + b),
                    BinaryOp::Sub => Ok(a - b),
                    BinaryOp::Mul => Ok(a * b),
                    BinaryOp::Div => {
                        if b == 0.0 {
                            return Err(ExprError::DivisionByZero);
                        }
                        Ok(a / b)
                    }
                }
            }
        }
    }

    /// Parameter names referenced by the expression.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Param(name) => {
                out.insert(name.as_str());
            }
            Expr::Neg(inner) => inner.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }
}

/// Parse and evaluate in one step.
pub fn evaluate(source: &str, params: &Parameters) -> Result<f64, ExprError> {
    Expr::parse(source)?.evaluate(params)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (offset, ch) = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                    i += 1;
                }
                // Optional exponent: e, E, then an optional sign and digits.
                if i < chars.len() && matches!(chars[i].1, 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j].1, '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].1.is_ascii_digit() {
                        while j < chars.len() && chars[j].1.is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(text.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || chars[i].1 == '_')
                {
                    i += 1;
                }
                let name: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                tokens.push(Token::Ident(name));
            }
            other => {
                return Err(ExprError::UnexpectedChar { ch: other, offset });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn match_kind(&mut self, kind: &Token) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn parse_add_sub(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_mul_div()?;
        loop {
            let op = if self.match_kind(&Token::Plus) {
                BinaryOp::Add
            } else if self.match_kind(&Token::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(expr);
            };
            let rhs = self.parse_mul_div()?;
            expr = Expr::Binary {
                lhs: Box::new(expr),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_mul_div(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.match_kind(&Token::Star) {
                BinaryOp::Mul
            } else if self.match_kind(&Token::Slash) {
                BinaryOp::Div
            } else {
                return Ok(expr);
            };
            let rhs = self.parse_unary()?;
            expr = Expr::Binary {
                lhs: Box::new(expr),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.match_kind(&Token::Minus) {
            self.descend()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.match_kind(&Token::Plus) {
            self.descend()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(inner);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let token = self.peek().cloned().ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        match token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Ident(name) => Ok(Expr::Param(name)),
            Token::LParen => {
                self.descend()?;
                let inner = self.parse_add_sub()?;
                self.depth -= 1;
                if self.match_kind(&Token::RParen) {
                    Ok(inner)
                } else {
                    match self.peek() {
                        Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
                        None => Err(ExprError::UnexpectedEnd),
                    }
                }
            }
            other => Err(ExprError::UnexpectedToken(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Parameters {
        let mut p = Parameters::new();
        p.insert("inner_length".into(), 100.0);
        p.insert("wall_thickness".into(), 1.6);
        p.insert("screw_diameter".into(), 3.0);
        p
    }

    #[test]
    fn test_precedence_and_parens() {
        let p = Parameters::new();
        assert_eq!(evaluate("1 + 2 * 3", &p).unwrap(), 7.0);
        assert_eq!(evaluate("(1 + 2) * 3", &p).unwrap(), 9.0);
        assert_eq!(evaluate("8 / 4 / 2", &p).unwrap(), 1.0);
        assert_eq!(evaluate("10 - 4 - 3", &p).unwrap(), 3.0);
        assert_eq!(evaluate("-(2 + 3) * +2", &p).unwrap(), -10.0);
        assert_eq!(evaluate("1.5e2", &p).unwrap(), 150.0);
    }

    #[test]
    fn test_parameters() {
        let v = evaluate("inner_length + 2 * wall_thickness", &params()).unwrap();
        assert!((v - 103.2).abs() < 1e-9);
        assert_eq!(evaluate("screw_diameter / 2", &params()).unwrap(), 1.5);
    }

    #[test]
    fn test_unknown_parameter() {
        let err = evaluate("inner_width * 2", &params()).unwrap_err();
        assert_eq!(err, ExprError::UnknownParameter("inner_width".into()));
    }

    #[test]
    fn test_rejects_code() {
        let p = params();
        assert!(matches!(
            evaluate("__import__('os')", &p),
            Err(ExprError::UnexpectedChar { ch: '\'', .. })
        ));
        assert!(matches!(
            evaluate("inner_length ** 2", &p),
            Err(ExprError::UnexpectedToken(_))
        ));
        assert!(matches!(
            evaluate("inner_length(1)", &p),
            Err(ExprError::UnexpectedToken(_))
        ));
        assert!(matches!(
            evaluate("a.b", &p),
            Err(ExprError::UnexpectedToken(_)) | Err(ExprError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_incomplete() {
        let p = Parameters::new();
        assert_eq!(evaluate("1 +", &p), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2", &p), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("", &p), Err(ExprError::UnexpectedEnd));
        assert!(matches!(evaluate("1 2", &p), Err(ExprError::UnexpectedToken(_))));
    }

    #[test]
    fn test_division_by_zero_and_overflow() {
        let p = Parameters::new();
        assert_eq!(evaluate("1 / (2 - 2)", &p), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("1e308 * 10", &p), Err(ExprError::NonFinite));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(Expr::parse(&deep), Err(ExprError::TooDeep));
        let unary = format!("{}1", "-".repeat(200));
        assert_eq!(Expr::parse(&unary), Err(ExprError::TooDeep));
    }

    #[test]
    fn test_variables() {
        let expr = Expr::parse("a * (b + a) - 3").unwrap();
        let vars: Vec<&str> = expr.variables().into_iter().collect();
        assert_eq!(vars, vec!["a", "b"]);
    }
}

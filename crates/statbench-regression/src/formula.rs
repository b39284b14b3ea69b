//! Symbolic model formulas
//!
//! A formula reads `response ~ rhs`. The response is an arithmetic
//! expression. The right-hand side is a sum of terms:
//!
//! - a column name, or `Q("name with spaces")`
//! - a transformation `log(x)`, `log10(x)`, `exp(x)`, `sqrt(x)`, `abs(x)`,
//!   each optionally written with an `np.` prefix
//! - `I(expr)` wrapping arithmetic with `+ - * / ** ^` and numeric literals
//! - `a:b` for the elementwise product of two terms
//! - `a*b` as shorthand for `a + b + a:b`
//! - `(a + b):c` grouping
//!
//! `+ 1` keeps the intercept, `- 1` and `+ 0` drop it. Subtracting any other
//! term removes it from the model. Term names are the source text they were
//! parsed from, so `np.log(x)` stays `np.log(x)` in the coefficient table.

use statbench_core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Column values by name, all of equal length
pub type ColumnMap = BTreeMap<String, Vec<f64>>;

/// Name given to the intercept column of formula models
pub const FORMULA_INTERCEPT: &str = "Intercept";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Log,
    Log10,
    Exp,
    Sqrt,
    Abs,
    /// `I(...)`: evaluate the argument as plain arithmetic
    Identity,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        if name == "I" {
            return Some(Self::Identity);
        }
        match name.strip_prefix("np.").unwrap_or(name) {
            "log" => Some(Self::Log),
            "log10" => Some(Self::Log10),
            "exp" => Some(Self::Exp),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Log => x.ln(),
            Self::Log10 => x.log10(),
            Self::Exp => x.exp(),
            Self::Sqrt => x.sqrt(),
            Self::Abs => x.abs(),
            Self::Identity => x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
        }
    }
}

/// Arithmetic over columns
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Number(f64),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Function,
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate over `n` rows of `data`
    ///
    /// Unknown columns are `ColumnNotFound`. Domain errors such as the log of
    /// a negative value yield NaN for that row.
    pub fn eval(&self, data: &ColumnMap, n: usize) -> Result<Vec<f64>> {
        Ok(match self {
            Expr::Column(name) => data
                .get(name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone()))?
                .clone(),
            Expr::Number(v) => vec![*v; n],
            Expr::Neg(inner) => inner.eval(data, n)?.into_iter().map(|x| -x).collect(),
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval(data, n)?;
                let b = rhs.eval(data, n)?;
                a.iter().zip(&b).map(|(x, y)| op.apply(*x, *y)).collect()
            }
            Expr::Call { func, arg } => arg.eval(data, n)?.into_iter().map(|x| func.apply(x)).collect(),
        })
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Column(name) => {
                out.insert(name.clone());
            }
            Expr::Number(_) => {}
            Expr::Neg(inner) | Expr::Call { arg: inner, .. } => inner.collect_columns(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_columns(out);
                rhs.collect_columns(out);
            }
        }
    }
}

/// One named factor of a term
#[derive(Debug, Clone)]
pub struct Factor {
    pub name: String,
    pub expr: Expr,
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Product of one or more factors, one design column
#[derive(Debug, Clone)]
pub struct Term {
    pub factors: Vec<Factor>,
}

impl Term {
    fn single(factor: Factor) -> Self {
        Self {
            factors: vec![factor],
        }
    }

    pub fn name(&self) -> String {
        self.factors
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(":")
    }

    fn factor_names(&self) -> BTreeSet<&str> {
        self.factors.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn eval(&self, data: &ColumnMap, n: usize) -> Result<Vec<f64>> {
        let mut values = vec![1.0; n];
        for factor in &self.factors {
            for (v, x) in values.iter_mut().zip(factor.expr.eval(data, n)?) {
                *v *= x;
            }
        }
        Ok(values)
    }
}

// `a:b` and `b:a` are the same term
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.factor_names() == other.factor_names()
    }
}

/// A parsed model formula
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    pub response: Factor,
    pub terms: Vec<Term>,
    pub intercept: bool,
}

impl Formula {
    /// Parse formula text
    ///
    /// Empty or malformed text is `InvalidInput`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statbench_regression::Formula;
    ///
    /// let formula = Formula::parse("np.log(y) ~ x * z - 1").unwrap();
    /// assert!(!formula.intercept);
    /// assert_eq!(formula.design_names(), vec!["x", "z", "x:z"]);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("formula is empty".to_string()));
        }
        let mut parser = Parser::new(text)?;

        let start = parser.start_offset();
        let expr = parser.arith()?;
        let response = Factor {
            name: parser.slice(start),
            expr,
        };
        parser.expect(&Token::Tilde, "'~'")?;
        let (terms, intercept) = parser.rhs_sum()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected {}", token.describe())));
        }

        Ok(Self {
            source: text.trim().to_string(),
            response,
            terms,
            intercept: intercept.unwrap_or(true),
        })
    }

    /// Every column the formula reads, response included
    pub fn columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.response.expr.collect_columns(&mut out);
        for factor in self.terms.iter().flat_map(|t| &t.factors) {
            factor.expr.collect_columns(&mut out);
        }
        out
    }

    /// Columns read by the right-hand side only
    pub fn predictor_columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for factor in self.terms.iter().flat_map(|t| &t.factors) {
            factor.expr.collect_columns(&mut out);
        }
        out
    }

    /// Design column names, intercept first
    pub fn design_names(&self) -> Vec<String> {
        let intercept = self.intercept.then(|| FORMULA_INTERCEPT.to_string());
        intercept.into_iter().chain(self.terms.iter().map(Term::name)).collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Formula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Tilde,
    Plus,
    Minus,
    Star,
    Slash,
    Colon,
    Power,
    LParen,
    RParen,
    Number(f64),
    Ident(String),
    Str(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Tilde => "'~'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Power => "'**'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Number(v) => format!("number {v}"),
            Token::Ident(name) => format!("name '{name}'"),
            Token::Str(s) => format!("string \"{s}\""),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let offset = |i: usize| chars.get(i).map_or(text.len(), |&(pos, _)| pos);
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);

    let mut tokens = Vec::new();
    let mut i = 0;
    while let Some(c) = at(i) {
        let start = offset(i);
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let (token, next) = match c {
            '~' => (Token::Tilde, i + 1),
            '+' => (Token::Plus, i + 1),
            '-' => (Token::Minus, i + 1),
            '/' => (Token::Slash, i + 1),
            ':' => (Token::Colon, i + 1),
            '^' => (Token::Power, i + 1),
            '(' => (Token::LParen, i + 1),
            ')' => (Token::RParen, i + 1),
            '*' if at(i + 1) == Some('*') => (Token::Power, i + 2),
            '*' => (Token::Star, i + 1),
            '"' | '\'' => {
                let mut j = i + 1;
                while at(j).is_some_and(|d| d != c) {
                    j += 1;
                }
                if at(j).is_none() {
                    return Err(Error::InvalidInput(format!(
                        "formula: unterminated string starting at offset {start}"
                    )));
                }
                (Token::Str(text[offset(i + 1)..offset(j)].to_string()), j + 1)
            }
            c if c.is_ascii_digit() || (c == '.' && at(i + 1).is_some_and(|d| d.is_ascii_digit())) => {
                let mut j = i;
                while at(j).is_some_and(|d| d.is_ascii_digit() || d == '.') {
                    j += 1;
                }
                if matches!(at(j), Some('e' | 'E')) {
                    let mut k = j + 1;
                    if matches!(at(k), Some('+' | '-')) {
                        k += 1;
                    }
                    if at(k).is_some_and(|d| d.is_ascii_digit()) {
                        while at(k).is_some_and(|d| d.is_ascii_digit()) {
                            k += 1;
                        }
                        j = k;
                    }
                }
                let literal = &text[start..offset(j)];
                let value = literal.parse::<f64>().map_err(|_| {
                    Error::InvalidInput(format!("formula: malformed number '{literal}'"))
                })?;
                (Token::Number(value), j)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut j = i;
                while at(j).is_some_and(|d| d.is_alphanumeric() || d == '_' || d == '.') {
                    j += 1;
                }
                (Token::Ident(text[start..offset(j)].to_string()), j)
            }
            other => {
                return Err(Error::InvalidInput(format!(
                    "formula: unexpected character '{other}' at offset {start}"
                )))
            }
        };
        tokens.push(Spanned {
            token,
            start,
            end: offset(next),
        });
        i = next;
    }
    Ok(tokens)
}

/// Right-hand-side element before it is folded into the term list
enum Piece {
    Intercept(bool),
    Terms(Vec<Term>),
}

fn push_unique(terms: &mut Vec<Term>, term: Term) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}

fn interact(left: &[Term], right: &[Term]) -> Vec<Term> {
    let mut out = Vec::new();
    for a in left {
        for b in right {
            let mut factors = a.factors.clone();
            for factor in &b.factors {
                if !factors.contains(factor) {
                    factors.push(factor.clone());
                }
            }
            push_unique(&mut out, Term { factors });
        }
    }
    out
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<()> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {what}, found {}", token.describe()))),
            None => Err(self.error(format!("expected {what}, found end of formula"))),
        }
    }

    fn start_offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.source.len(), |s| s.start)
    }

    /// Source text from `start` to the end of the last consumed token
    fn slice(&self, start: usize) -> String {
        let end = self.pos.checked_sub(1).map_or(start, |i| self.tokens[i].end);
        self.source[start..end.max(start)].trim().to_string()
    }

    fn error(&self, message: impl fmt::Display) -> Error {
        Error::InvalidInput(format!("formula '{}': {message}", self.source.trim()))
    }

    // arith := mul (('+' | '-') mul)*
    fn arith(&mut self) -> Result<Expr> {
        let mut lhs = self.mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.mul()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // mul := unary (('*' | '/') unary)*
    fn mul(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := primary ('**' unary)?, right associative
    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Power) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(v)) => Ok(Expr::Number(v)),
            Some(Token::LParen) => {
                let inner = self.arith()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) if self.peek() == Some(&Token::LParen) => self.call(&name),
            Some(Token::Ident(name)) => Ok(Expr::Column(name)),
            Some(token) => Err(self.error(format!("unexpected {}", token.describe()))),
            None => Err(self.error("unexpected end of formula")),
        }
    }

    fn call(&mut self, name: &str) -> Result<Expr> {
        self.expect(&Token::LParen, "'('")?;
        if name == "Q" {
            return match self.advance() {
                Some(Token::Str(column)) => {
                    self.expect(&Token::RParen, "')'")?;
                    Ok(Expr::Column(column))
                }
                _ => Err(self.error("Q() expects a quoted column name")),
            };
        }
        let func = Function::from_name(name)
            .ok_or_else(|| self.error(format!("unsupported function '{name}'")))?;
        let arg = self.arith()?;
        self.expect(&Token::RParen, "')'")?;
        Ok(Expr::Call {
            func,
            arg: Box::new(arg),
        })
    }

    /// Terms of a right-hand side and the intercept override, if any
    fn rhs_sum(&mut self) -> Result<(Vec<Term>, Option<bool>)> {
        let mut terms: Vec<Term> = Vec::new();
        let mut intercept = None;
        let mut subtract = false;
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            subtract = true;
        }
        loop {
            match self.product()? {
                // +1 and -0 keep the intercept, -1 and +0 drop it
                Piece::Intercept(one) => intercept = Some(one != subtract),
                Piece::Terms(new) => {
                    for term in new {
                        if subtract {
                            terms.retain(|t| t != &term);
                        } else {
                            push_unique(&mut terms, term);
                        }
                    }
                }
            }
            match self.peek() {
                Some(Token::Plus) => subtract = false,
                Some(Token::Minus) => subtract = true,
                _ => return Ok((terms, intercept)),
            }
            self.pos += 1;
        }
    }

    // product := interaction ('*' interaction)*
    fn product(&mut self) -> Result<Piece> {
        if let Some(Token::Number(v)) = self.peek() {
            let v = *v;
            if v == 0.0 || v == 1.0 {
                self.pos += 1;
                return Ok(Piece::Intercept(v == 1.0));
            }
            return Err(self.error(format!("numeric term {v} is not allowed outside I()")));
        }
        let mut terms = self.interaction()?;
        while self.peek() == Some(&Token::Star) {
            self.pos += 1;
            let rhs = self.interaction()?;
            let cross = interact(&terms, &rhs);
            for term in rhs.into_iter().chain(cross) {
                push_unique(&mut terms, term);
            }
        }
        Ok(Piece::Terms(terms))
    }

    // interaction := atom (':' atom)*
    fn interaction(&mut self) -> Result<Vec<Term>> {
        let mut terms = self.rhs_atom()?;
        while self.peek() == Some(&Token::Colon) {
            self.pos += 1;
            let rhs = self.rhs_atom()?;
            terms = interact(&terms, &rhs);
        }
        Ok(terms)
    }

    fn rhs_atom(&mut self) -> Result<Vec<Term>> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let (terms, intercept) = self.rhs_sum()?;
            if intercept.is_some() {
                return Err(self.error("intercept terms are not allowed inside parentheses"));
            }
            self.expect(&Token::RParen, "')'")?;
            return Ok(terms);
        }
        let start = self.start_offset();
        let expr = match self.advance() {
            Some(Token::Ident(name)) if self.peek() == Some(&Token::LParen) => self.call(&name)?,
            Some(Token::Ident(name)) => Expr::Column(name),
            Some(token) => return Err(self.error(format!("unexpected {}", token.describe()))),
            None => return Err(self.error("expected a term, found end of formula")),
        };
        Ok(vec![Term::single(Factor {
            name: self.slice(start),
            expr,
        })])
    }
}

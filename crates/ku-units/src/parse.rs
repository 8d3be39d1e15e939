//! Unit expression parser.
//!
//! Grammar (whitespace between operands means multiplication):
//!
//! ```text
//! product := power (('*' | '/' | <implicit>) power)*
//! power   := primary (('^' | '**') exponent)?
//! primary := symbol | number | '(' product ')'
//! ```
//!
//! Symbols are letters and underscores only. Digits written directly after
//! a symbol, optionally signed, are its exponent: `m3` is `m^3` and
//! `s-1` is `s^-1`. With a space in between (`s -1`) they are not.
//!
//! Symbols are resolved through the caller-supplied lookup, which is where
//! prefixes and registry definitions come in.

use crate::error::{UnitError, UnitResult};
use crate::unit::{PhysicalUnit, UnitFactor};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(String),
    Number(f64),
    Star,
    Slash,
    Caret,
    Minus,
    Plus,
    LParen,
    RParen,
}

/// Parse `input` into a unit, resolving each symbol with `resolve`.
///
/// `""`, `"1"` and `"dimensionless"` all yield the dimensionless unit.
pub(crate) fn parse_unit<F>(input: &str, resolve: F) -> UnitResult<PhysicalUnit>
where
    F: Fn(&str) -> UnitResult<UnitFactor>,
{
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "dimensionless" {
        return Ok(PhysicalUnit::dimensionless());
    }

    let tokens = tokenize(trimmed)?;
    let mut parser = Parser {
        input: trimmed,
        tokens,
        pos: 0,
        resolve,
    };
    let unit = parser.product()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    if !unit.scale().is_finite() || unit.scale() == 0.0 {
        return Err(UnitError::NonFinite { what: "unit scale" });
    }
    Ok(unit.with_declared(trimmed))
}

fn tokenize(input: &str) -> UnitResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            '*' | '·' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
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
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Scientific notation only when the exponent really is numeric,
                // so `2e` never swallows a following symbol.
                if i + 1 < chars.len()
                    && (chars[i] == 'e' || chars[i] == 'E')
                    && (chars[i + 1].is_ascii_digit()
                        || ((chars[i + 1] == '-' || chars[i + 1] == '+')
                            && chars.get(i + 2).is_some_and(|d| d.is_ascii_digit())))
                {
                    i += 2;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| UnitError::Parse {
                    input: input.to_string(),
                    reason: format!("bad number '{}'", text),
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Symbol(chars[start..i].iter().collect()));
                // `m3`, `s-1`: an exponent written straight after the symbol
                let digit_at = |j: usize| chars.get(j).is_some_and(|d| d.is_ascii_digit());
                if digit_at(i) || (matches!(chars.get(i), Some('-' | '+')) && digit_at(i + 1)) {
                    tokens.push(Token::Caret);
                }
            }
            other => {
                return Err(UnitError::Parse {
                    input: input.to_string(),
                    reason: format!("unexpected character '{}'", other),
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a, F> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    resolve: F,
}

impl<F> Parser<'_, F>
where
    F: Fn(&str) -> UnitResult<UnitFactor>,
{
    fn error(&self, reason: &str) -> UnitError {
        UnitError::Parse {
            input: self.input.to_string(),
            reason: reason.to_string(),
        }
    }

    fn in_range(&self, unit: Option<PhysicalUnit>) -> UnitResult<PhysicalUnit> {
        unit.ok_or_else(|| self.error("exponent out of range"))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn product(&mut self) -> UnitResult<PhysicalUnit> {
        let mut acc = self.power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.power()?;
                    acc = self.in_range(acc.checked_mul(&rhs))?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.power()?;
                    acc = self.in_range(acc.checked_div(&rhs))?;
                }
                Some(Token::Symbol(_)) | Some(Token::Number(_)) | Some(Token::LParen) => {
                    let rhs = self.power()?;
                    acc = self.in_range(acc.checked_mul(&rhs))?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn power(&mut self) -> UnitResult<PhysicalUnit> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.pos += 1;
            let exp = self.exponent()?;
            return self.in_range(base.checked_powi(exp));
        }
        Ok(base)
    }

    fn exponent(&mut self) -> UnitResult<i32> {
        let parenthesized = self.peek() == Some(&Token::LParen);
        if parenthesized {
            self.pos += 1;
        }
        let sign = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                -1
            }
            Some(Token::Plus) => {
                self.pos += 1;
                1
            }
            _ => 1,
        };
        let value = match self.peek() {
            Some(Token::Number(n)) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => *n as i32,
            _ => return Err(self.error("exponent must be an integer")),
        };
        self.pos += 1;
        if parenthesized {
            if self.peek() != Some(&Token::RParen) {
                return Err(self.error("unbalanced parentheses in exponent"));
            }
            self.pos += 1;
        }
        Ok(sign * value)
    }

    fn primary(&mut self) -> UnitResult<PhysicalUnit> {
        match self.peek().cloned() {
            Some(Token::Symbol(symbol)) => {
                self.pos += 1;
                let factor = (self.resolve)(&symbol)?;
                Ok(PhysicalUnit::from_factor(factor))
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(PhysicalUnit::from_parts(Vec::new(), n))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.product()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(self.error("unbalanced parentheses"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(_) => Err(self.error("expected a unit symbol, number or '('")),
            None => Err(self.error("unexpected end of input")),
        }
    }
}

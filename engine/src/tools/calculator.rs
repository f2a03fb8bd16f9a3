//! Calculator Tool
//!
//! Evaluates arithmetic expressions with a small recursive-descent parser.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('**' unary)?
//! primary := number | constant | function '(' args ')' | '(' expr ')'
//! ```
//!
//! Every nesting level (parentheses, function arguments, unary signs and
//! exponents) passes through `unary`, which caps the depth at [`MAX_DEPTH`].

use async_trait::async_trait;
use sdk::{EngineError, Parameters, Tool};
use serde_json::{json, Value};
use std::sync::OnceLock;

use regex::Regex;

/// Deepest nesting the parser accepts before rejecting the expression
pub const MAX_DEPTH: usize = 128;

static LEADING_PHRASE: OnceLock<Regex> = OnceLock::new();

fn leading_phrase() -> &'static Regex {
    LEADING_PHRASE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(calculate|compute|what\s+is|what's|solve|evaluate)\b")
            .expect("Invalid leading phrase pattern")
    })
}

#[derive(Debug, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

/// Normalize free text into a bare expression
pub fn clean_expression(raw: &str) -> String {
    let stripped = leading_phrase().replace(raw, "");
    stripped
        .trim()
        .trim_end_matches('?')
        .replace('×', "*")
        .replace('÷', "/")
        .replace('^', "**")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Evaluate a cleaned expression
pub fn evaluate(expression: &str) -> Result<f64, EngineError> {
    if expression.is_empty() {
        return Err(EngineError::Calculation("empty expression".to_string()));
    }

    let mut parser = Parser::new(expression);
    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{}'", c)));
    }
    if !value.is_finite() {
        return Err(EngineError::Calculation(format!(
            "result of '{}' is not a finite number",
            expression
        )));
    }
    Ok(value)
}

/// Whole numbers render without a fractional part, others to 10 decimals
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        let rounded = (value * 1e10).round() / 1e10;
        format!("{}", rounded)
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate arithmetic expressions"
    }

    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
        let expression = clean_expression(params.str("expression")?);
        let value = evaluate(&expression)?;
        Ok(json!(format_number(value)))
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> EngineError {
        EngineError::Calculation(format!("{} at position {}", message.into(), self.pos))
    }

    fn expr(&mut self) -> Result<f64, EngineError> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, EngineError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some('*') if self.peek_at(1) != Some('*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some('/') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(self.error("division by zero"));
                    }
                    value /= divisor;
                }
                Some('%') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(self.error("modulo by zero"));
                    }
                    // floored: the result takes the divisor's sign
                    value -= divisor * (value / divisor).floor();
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, EngineError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, EngineError> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, EngineError> {
        let base = self.primary()?;
        if self.peek() == Some('*') && self.peek_at(1) == Some('*') {
            self.pos += 2;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, EngineError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.identifier(),
            Some(c) => Err(self.error(format!("unexpected '{}'", c))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn number(&mut self) -> Result<f64, EngineError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }

        // exponent, only when digits follow
        if matches!(self.peek(), Some('e' | 'E')) {
            let digit_at = match self.peek_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digit_at), Some(c) if c.is_ascii_digit()) {
                self.pos += digit_at;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number '{}'", literal)))
    }

    fn identifier(&mut self) -> Result<f64, EngineError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .to_lowercase();

        if !self.eat('(') {
            return match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => Err(self.error(format!("unknown name '{}'", name))),
            };
        }

        let mut args = Vec::new();
        if !self.eat(')') {
            loop {
                args.push(self.expr()?);
                if self.eat(')') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.error("expected ',' or ')'"));
                }
            }
        }

        self.apply(&name, &args)
    }

    fn apply(&self, name: &str, args: &[f64]) -> Result<f64, EngineError> {
        let arity = |n: usize| -> Result<(), EngineError> {
            if args.len() == n {
                Ok(())
            } else {
                Err(self.error(format!(
                    "{}() takes {} argument(s), got {}",
                    name,
                    n,
                    args.len()
                )))
            }
        };

        let value = match name {
            "sqrt" => {
                arity(1)?;
                if args[0] < 0.0 {
                    return Err(self.error("square root of a negative number"));
                }
                args[0].sqrt()
            }
            "pow" => {
                arity(2)?;
                args[0].powf(args[1])
            }
            "abs" => {
                arity(1)?;
                args[0].abs()
            }
            "round" => {
                arity(1)?;
                args[0].round()
            }
            "floor" => {
                arity(1)?;
                args[0].floor()
            }
            "ceil" => {
                arity(1)?;
                args[0].ceil()
            }
            "sin" => {
                arity(1)?;
                args[0].sin()
            }
            "cos" => {
                arity(1)?;
                args[0].cos()
            }
            "tan" => {
                arity(1)?;
                args[0].tan()
            }
            "exp" => {
                arity(1)?;
                args[0].exp()
            }
            "log" => {
                arity(1)?;
                if args[0] <= 0.0 {
                    return Err(self.error("logarithm of a non-positive number"));
                }
                args[0].ln()
            }
            "log10" => {
                arity(1)?;
                if args[0] <= 0.0 {
                    return Err(self.error("logarithm of a non-positive number"));
                }
                args[0].log10()
            }
            "min" | "max" => {
                if args.is_empty() {
                    return Err(self.error(format!("{}() needs at least one argument", name)));
                }
                let fold: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
                args[1..].iter().copied().fold(args[0], fold)
            }
            other => return Err(self.error(format!("unknown function '{}'", other))),
        };

        Ok(value)
    }
}

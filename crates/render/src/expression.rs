//! Expression evaluator for `evaluate` and `condition` flow nodes
//!
//! A small Pratt parser over JSON values: number, string, boolean and null
//! literals, identifiers (dotted paths resolved through a lookup), unary
//! `!`/`-`, arithmetic, comparison, logical operators and the `?:` ternary.

use serde_json::{Number, Value};
use weave_core::{WeaveError, WeaveResult};
use weave_style::format_number;

use crate::visibility::is_truthy;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Question,
    Colon,
}

const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "%", "!",
];

fn tokenize(source: &str) -> WeaveResult<Vec<(Token, usize)>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) {
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let n = text
                .parse::<f64>()
                .map_err(|_| WeaveError::expression(start, format!("invalid number '{text}'")))?;
            tokens.push((Token::Number(n), start));
            continue;
        }
        if c == '"' || c == '\'' {
            i += 1;
            let mut text = String::new();
            loop {
                match chars.get(i) {
                    None => return Err(WeaveError::expression(start, "unterminated string")),
                    Some('\\') => {
                        if let Some(next) = chars.get(i + 1) {
                            text.push(*next);
                        }
                        i += 2;
                    }
                    Some(q) if *q == c => {
                        i += 1;
                        break;
                    }
                    Some(other) => {
                        text.push(*other);
                        i += 1;
                    }
                }
            }
            tokens.push((Token::Str(text), start));
            continue;
        }
        if c.is_alphabetic() || c == '_' || c == '$' {
            while i < chars.len()
                && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '$' | '.'))
            {
                i += 1;
            }
            tokens.push((Token::Ident(chars[start..i].iter().collect()), start));
            continue;
        }
        match c {
            '(' => tokens.push((Token::LParen, start)),
            ')' => tokens.push((Token::RParen, start)),
            '?' => tokens.push((Token::Question, start)),
            ':' => tokens.push((Token::Colon, start)),
            _ => {
                let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
                let op = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(*op))
                    .ok_or_else(|| WeaveError::expression(start, format!("unexpected '{c}'")))?;
                tokens.push((Token::Op(*op), start));
                i += op.len();
                continue;
            }
        }
        i += 1;
    }
    Ok(tokens)
}

fn binding_power(op: &str) -> Option<u8> {
    Some(match op {
        "||" => 2,
        "&&" => 3,
        "==" | "!=" | "===" | "!==" => 4,
        "<" | "<=" | ">" | ">=" => 5,
        "+" | "-" => 6,
        "*" | "/" | "%" => 7,
        _ => return None,
    })
}

const TERNARY_POWER: u8 = 1;
const PREFIX_POWER: u8 = 8;

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    lookup: &'a dyn Fn(&str) -> Option<Value>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, o)| *o).unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> WeaveResult<()> {
        let at = self.offset();
        match self.next() {
            Some(t) if t == expected => Ok(()),
            other => Err(WeaveError::expression(
                at,
                format!("expected {expected:?}, found {other:?}"),
            )),
        }
    }

    fn expression(&mut self, min_power: u8) -> WeaveResult<Value> {
        let mut left = self.prefix()?;
        loop {
            match self.peek() {
                Some(Token::Question) if min_power <= TERNARY_POWER => {
                    self.next();
                    let then = self.expression(TERNARY_POWER)?;
                    self.expect(Token::Colon)?;
                    let otherwise = self.expression(TERNARY_POWER)?;
                    left = if is_truthy(&left) { then } else { otherwise };
                }
                Some(Token::Op(op)) => {
                    let op = *op;
                    let Some(power) = binding_power(op) else {
                        break;
                    };
                    if power < min_power {
                        break;
                    }
                    let at = self.offset();
                    self.next();
                    let right = self.expression(power + 1)?;
                    left = binary(op, left, right, at)?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn prefix(&mut self) -> WeaveResult<Value> {
        let at = self.offset();
        match self.next() {
            Some(Token::Number(n)) => Ok(number(n)),
            Some(Token::Str(s)) => Ok(Value::String(s)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" | "undefined" => Ok(Value::Null),
                _ => (self.lookup)(&name)
                    .ok_or_else(|| WeaveError::expression(at, format!("unknown identifier '{name}'"))),
            },
            Some(Token::Op("!")) => Ok(Value::Bool(!is_truthy(&self.expression(PREFIX_POWER)?))),
            Some(Token::Op("-")) => {
                let v = self.expression(PREFIX_POWER)?;
                Ok(number(-as_number(&v, at)?))
            }
            Some(Token::LParen) => {
                let v = self.expression(0)?;
                self.expect(Token::RParen)?;
                Ok(v)
            }
            other => Err(WeaveError::expression(at, format!("unexpected {other:?}"))),
        }
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn as_number(value: &Value, at: usize) -> WeaveResult<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        _ => None,
    }
    .ok_or_else(|| WeaveError::expression(at, format!("{value} is not a number")))
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn binary(op: &str, left: Value, right: Value, at: usize) -> WeaveResult<Value> {
    let num = |v: &Value| as_number(v, at);
    Ok(match op {
        "+" if left.is_string() || right.is_string() => {
            Value::String(format!("{}{}", text(&left), text(&right)))
        }
        "+" => number(num(&left)? + num(&right)?),
        "-" => number(num(&left)? - num(&right)?),
        "*" => number(num(&left)? * num(&right)?),
        "/" | "%" => {
            let divisor = num(&right)?;
            if divisor == 0.0 {
                return Err(WeaveError::expression(at, "division by zero"));
            }
            let dividend = num(&left)?;
            number(if op == "/" { dividend / divisor } else { dividend % divisor })
        }
        "==" | "===" => Value::Bool(equals(&left, &right)),
        "!=" | "!==" => Value::Bool(!equals(&left, &right)),
        "<" | "<=" | ">" | ">=" => {
            let ordering = if let (Value::String(a), Value::String(b)) = (&left, &right) {
                a.cmp(b)
            } else {
                num(&left)?
                    .partial_cmp(&num(&right)?)
                    .ok_or_else(|| WeaveError::expression(at, "incomparable operands"))?
            };
            Value::Bool(match op {
                "<" => ordering.is_lt(),
                "<=" => ordering.is_le(),
                ">" => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
        "&&" => {
            if is_truthy(&left) {
                right
            } else {
                left
            }
        }
        "||" => {
            if is_truthy(&left) {
                left
            } else {
                right
            }
        }
        _ => return Err(WeaveError::expression(at, format!("unsupported operator '{op}'"))),
    })
}

/// Evaluate an expression; identifiers resolve through `lookup`
pub fn evaluate(source: &str, lookup: &dyn Fn(&str) -> Option<Value>) -> WeaveResult<Value> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(WeaveError::expression(0, "empty expression"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.chars().count(),
        lookup,
    };
    let value = parser.expression(0)?;
    if parser.pos < parser.tokens.len() {
        return Err(WeaveError::expression(parser.offset(), "trailing input"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(source: &str) -> Value {
        evaluate(source, &|name| match name {
            "count" => Some(json!(4)),
            "user.name" => Some(json!("Ada")),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3"), json!(7));
        assert_eq!(eval("(1 + 2) * 3"), json!(9));
        assert_eq!(eval("10 / 4"), json!(2.5));
        assert_eq!(eval("-count + 1"), json!(-3));
        assert_eq!(eval("7 % 4"), json!(3));
    }

    #[test]
    fn test_strings_and_comparison() {
        assert_eq!(eval("'Hi ' + user.name"), json!("Hi Ada"));
        assert_eq!(eval("count >= 4 && count < 5"), json!(true));
        assert_eq!(eval("user.name == \"Ada\""), json!(true));
        assert_eq!(eval("!(count > 10)"), json!(true));
    }

    #[test]
    fn test_ternary_and_logical_values() {
        assert_eq!(eval("count > 3 ? 'many' : 'few'"), json!("many"));
        assert_eq!(eval("null || 'fallback'"), json!("fallback"));
        assert_eq!(eval("false ? 1 : true ? 2 : 3"), json!(2));
    }

    #[test]
    fn test_errors() {
        let lookup = |_: &str| None;
        assert!(evaluate("1 / 0", &lookup).is_err());
        assert!(evaluate("missing + 1", &lookup).is_err());
        assert!(evaluate("1 +", &lookup).is_err());
        assert!(evaluate("(1", &lookup).is_err());
        assert!(evaluate("'open", &lookup).is_err());
        let err = evaluate("1 2", &lookup).unwrap_err();
        assert!(matches!(err, WeaveError::Expression { position: 2, .. }));
    }
}

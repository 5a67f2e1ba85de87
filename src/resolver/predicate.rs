//! Custom constraint predicates.
//!
//! A predicate is a small boolean expression over field presence and
//! values:
//!
//! ```text
//! present(id)  missing(id)  value(id) == 'lit'  value(id) != 'lit'
//! if <expr> then <expr>   <expr> and <expr>   <expr> or <expr>
//! not <expr>   ( <expr> )
//! ```
//!
//! `if a then b` is material implication. Binding strength, loosest
//! first: `if/then`, `or`, `and`, `not`.

use serde_json::Value;

/// Parsed predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Present(String),
    Missing(String),
    ValueEq(String, String),
    ValueNe(String, String),
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Implies(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Parse an expression, reporting the offending token on failure.
    pub fn parse(input: &str) -> Result<Self, String> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(format!("unexpected trailing `{tok}`")),
        }
    }

    /// Every field id the expression references.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Present(id)
            | Predicate::Missing(id)
            | Predicate::ValueEq(id, _)
            | Predicate::ValueNe(id, _) => out.push(id),
            Predicate::Not(inner) => inner.collect_ids(out),
            Predicate::And(a, b) | Predicate::Or(a, b) | Predicate::Implies(a, b) => {
                a.collect_ids(out);
                b.collect_ids(out);
            }
        }
    }

    /// Evaluate against a field lookup. `None` means the field resolved
    /// to no value.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> bool {
        match self {
            Predicate::Present(id) => lookup(id).is_some(),
            Predicate::Missing(id) => lookup(id).is_none(),
            Predicate::ValueEq(id, lit) => {
                lookup(id).is_some_and(|value| stringified(&value) == *lit)
            }
            Predicate::ValueNe(id, lit) => {
                lookup(id).is_some_and(|value| stringified(&value) != *lit)
            }
            Predicate::Not(inner) => !inner.eval(lookup),
            Predicate::And(a, b) => a.eval(lookup) && b.eval(lookup),
            Predicate::Or(a, b) => a.eval(lookup) || b.eval(lookup),
            Predicate::Implies(a, b) => !a.eval(lookup) || b.eval(lookup),
        }
    }
}

fn stringified(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(String),
    LParen,
    RParen,
    Eq,
    Ne,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{s}"),
            Token::Literal(s) => write!(f, "'{s}'"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Eq => f.write_str("=="),
            Token::Ne => f.write_str("!="),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err("expected `==`".into());
                }
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err("expected `!=`".into());
                }
                tokens.push(Token::Ne);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut lit = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => lit.push(ch),
                        None => return Err("unterminated string literal".into()),
                    }
                }
                tokens.push(Token::Literal(lit));
            }
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(w)) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(format!("expected `{expected}`, got `{tok}`")),
            None => Err(format!("expected `{expected}`, got end of input")),
        }
    }

    fn expr(&mut self) -> Result<Predicate, String> {
        if self.eat_keyword("if") {
            let cond = self.or_expr()?;
            if !self.eat_keyword("then") {
                return Err("expected `then` after `if` condition".into());
            }
            let body = self.or_expr()?;
            return Ok(Predicate::Implies(Box::new(cond), Box::new(body)));
        }
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Predicate, String> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Predicate, String> {
        let mut left = self.not_expr()?;
        while self.eat_keyword("and") {
            let right = self.not_expr()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Predicate, String> {
        if self.eat_keyword("not") {
            let inner = self.not_expr()?;
            return Ok(Predicate::Not(Box::new(inner)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Predicate, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(word)) => match word.as_str() {
                "present" => Ok(Predicate::Present(self.call_arg()?)),
                "missing" => Ok(Predicate::Missing(self.call_arg()?)),
                "value" => {
                    let id = self.call_arg()?;
                    match self.next() {
                        Some(Token::Eq) => {}
                        Some(Token::Ne) => {
                            let lit = self.literal()?;
                            return Ok(Predicate::ValueNe(id, lit));
                        }
                        other => {
                            return Err(format!(
                                "expected `==` or `!=` after value({id}), got {}",
                                describe(other)
                            ))
                        }
                    }
                    let lit = self.literal()?;
                    Ok(Predicate::ValueEq(id, lit))
                }
                other => Err(format!("unknown function `{other}`")),
            },
            other => Err(format!("expected expression, got {}", describe(other))),
        }
    }

    fn call_arg(&mut self) -> Result<String, String> {
        self.expect(Token::LParen)?;
        let id = match self.next() {
            Some(Token::Ident(id)) => id,
            other => return Err(format!("expected field id, got {}", describe(other))),
        };
        self.expect(Token::RParen)?;
        Ok(id)
    }

    fn literal(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Literal(lit)) => Ok(lit),
            Some(Token::Ident(word)) => Ok(word),
            other => Err(format!("expected literal, got {}", describe(other))),
        }
    }
}

fn describe(tok: Option<Token>) -> String {
    match tok {
        Some(tok) => format!("`{tok}`"),
        None => "end of input".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, Value)]) -> impl Fn(&str) -> Option<Value> {
        let map: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |id: &str| map.get(id).cloned()
    }

    #[test]
    fn present_and_missing() {
        let lookup = lookup_from(&[("all", json!(true))]);
        assert!(Predicate::parse("present(all)").unwrap().eval(&lookup));
        assert!(!Predicate::parse("missing(all)").unwrap().eval(&lookup));
        assert!(Predicate::parse("missing(limit)").unwrap().eval(&lookup));
    }

    #[test]
    fn value_comparisons_stringify() {
        let lookup = lookup_from(&[("output", json!("json")), ("limit", json!(5))]);
        assert!(Predicate::parse("value(output) == 'json'").unwrap().eval(&lookup));
        assert!(Predicate::parse("value(output) != 'text'").unwrap().eval(&lookup));
        assert!(Predicate::parse("value(limit) == '5'").unwrap().eval(&lookup));
    }

    #[test]
    fn value_comparison_on_missing_field_is_false() {
        let lookup = lookup_from(&[]);
        assert!(!Predicate::parse("value(output) == 'json'").unwrap().eval(&lookup));
        assert!(!Predicate::parse("value(output) != 'json'").unwrap().eval(&lookup));
    }

    #[test]
    fn implication_is_vacuously_true() {
        let lookup = lookup_from(&[]);
        let pred = Predicate::parse("if present(all) then missing(limit)").unwrap();
        assert!(pred.eval(&lookup));

        let lookup = lookup_from(&[("all", json!(true)), ("limit", json!(5))]);
        assert!(!pred.eval(&lookup));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let pred = Predicate::parse("present(a) or present(b) and present(c)").unwrap();
        // a or (b and c)
        let lookup = lookup_from(&[("a", json!(1))]);
        assert!(pred.eval(&lookup));
        let lookup = lookup_from(&[("b", json!(1))]);
        assert!(!pred.eval(&lookup));
    }

    #[test]
    fn parentheses_override_precedence() {
        let pred = Predicate::parse("(present(a) or present(b)) and present(c)").unwrap();
        let lookup = lookup_from(&[("a", json!(1))]);
        assert!(!pred.eval(&lookup));
        let lookup = lookup_from(&[("a", json!(1)), ("c", json!(1))]);
        assert!(pred.eval(&lookup));
    }

    #[test]
    fn not_negates() {
        let pred = Predicate::parse("not present(a)").unwrap();
        assert!(pred.eval(&lookup_from(&[])));
        assert!(!pred.eval(&lookup_from(&[("a", json!(1))])));
    }

    #[test]
    fn ids_are_collected_from_all_branches() {
        let pred = Predicate::parse("if present(a) then missing(b) or value(c) == 'x'").unwrap();
        assert_eq!(pred.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn unterminated_literal_fails() {
        assert!(Predicate::parse("value(a) == 'oops").is_err());
    }

    #[test]
    fn unknown_function_fails() {
        let err = Predicate::parse("defined(a)").unwrap_err();
        assert!(err.contains("defined"));
    }

    #[test]
    fn trailing_tokens_fail() {
        assert!(Predicate::parse("present(a) present(b)").is_err());
    }

    #[test]
    fn missing_then_fails() {
        let err = Predicate::parse("if present(a) missing(b)").unwrap_err();
        assert!(err.contains("then"));
    }

    #[test]
    fn empty_input_fails() {
        assert!(Predicate::parse("").is_err());
        assert!(Predicate::parse("   ").is_err());
    }
}

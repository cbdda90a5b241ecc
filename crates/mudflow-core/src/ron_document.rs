//! RON input for the document model.
//!
//! `ron`'s self-describing deserializer discards enum variant names and
//! refuses named structs when the visitor asks for string keys, so the value
//! structure is walked here and `ron` decodes only the leaf literals
//! (strings, chars, numbers).
//!
//! Mapping:
//! - `Name(field: v, ..)` and `(field: v, ..)` become maps
//! - a bare identifier (unit variant) becomes its name as a string
//! - `Name(v)` becomes `{"Name": v}`, `Name(a, b)` becomes `{"Name": [a, b]}`
//! - `(a, b)` becomes an array; `()` and `None` become null; `Some(v)` is `v`
//! - a char becomes a one-character string

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::document::value_kind;

/// Parse a RON document. Errors are `line:column: message`.
pub(crate) fn parse_ron(input: &str) -> Result<Value, String> {
    let mut parser = Parser { src: input, pos: 0 };
    parser.skip_ws()?;
    parser.skip_attributes()?;
    let value = parser.value()?;
    parser.skip_ws()?;
    if parser.pos < parser.src.len() {
        return Err(parser.error("trailing characters after value"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_raw_string(rest: &str) -> bool {
    rest.strip_prefix('r')
        .is_some_and(|r| r.trim_start_matches('#').starts_with('"'))
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{c}`")))
        }
    }

    fn error_at(&self, pos: usize, msg: impl Display) -> String {
        let before = &self.src[..pos];
        let line = before.matches('\n').count() + 1;
        let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        format!("{line}:{col}: {msg}")
    }

    fn error(&self, msg: impl Display) -> String {
        self.error_at(self.pos, msg)
    }

    fn unexpected(&self, expected: &str) -> String {
        match self.peek() {
            Some(c) => self.error(format!("expected {expected}, found `{c}`")),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    /// Whitespace, `//` line comments and nested `/* */` block comments.
    fn skip_ws(&mut self) -> Result<(), String> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if trimmed.starts_with("/*") {
                self.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), String> {
        let start = self.pos;
        let mut depth = 0usize;
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if rest.starts_with("*/") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            } else {
                self.bump();
            }
        }
        Err(self.error_at(start, "unterminated block comment"))
    }

    /// `#![enable(...)]` headers. Every form they enable is accepted anyway.
    fn skip_attributes(&mut self) -> Result<(), String> {
        while self.rest().starts_with("#!") {
            let start = self.pos;
            match self.rest().find(']') {
                Some(end) => self.pos += end + 1,
                None => return Err(self.error_at(start, "unterminated attribute")),
            }
            self.skip_ws()?;
        }
        Ok(())
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_ws()?;
        let rest = self.rest();
        match self.peek() {
            None => Err(self.error("expected a value, found end of input")),
            Some('"') => {
                let (start, lit) = self.quoted('"')?;
                self.decode::<String>(start, lit).map(Value::String)
            }
            Some('\'') => {
                let (start, lit) = self.quoted('\'')?;
                self.decode::<char>(start, lit)
                    .map(|c| Value::String(c.to_string()))
            }
            Some('b') if rest.starts_with("b\"") => {
                self.pos += 1;
                let (start, lit) = self.quoted('"')?;
                self.decode::<String>(start, lit).map(Value::String)
            }
            Some('r') if is_raw_string(rest) => self.raw_string().map(Value::String),
            Some('[') => self.seq(),
            Some('{') => self.map(),
            Some('(') => self.parens(None),
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            Some(c) if is_ident_start(c) => self.identified(),
            Some(_) => Err(self.unexpected("a value")),
        }
    }

    fn decode<T: DeserializeOwned>(&self, start: usize, literal: &str) -> Result<T, String> {
        ron::from_str(literal).map_err(|e| self.error_at(start, e.code))
    }

    /// Slice of a quoted literal, delimiters included.
    fn quoted(&mut self, delim: char) -> Result<(usize, &'a str), String> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated literal")),
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == delim => return Ok((start, &self.src[start..self.pos])),
                Some(_) => {}
            }
        }
    }

    fn raw_string(&mut self) -> Result<String, String> {
        let start = self.pos;
        self.pos += 1;
        let mut hashes = 0;
        while self.eat('#') {
            hashes += 1;
        }
        self.expect('"')?;
        let closing = format!("\"{}", "#".repeat(hashes));
        let rest = self.rest();
        match rest.find(&closing) {
            Some(end) => {
                self.pos += end + closing.len();
                Ok(rest[..end].to_string())
            }
            None => Err(self.error_at(start, "unterminated raw string")),
        }
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| is_ident_char(c) || matches!(c, '.' | '+' | '-'))
        {
            self.bump();
        }
        self.decode::<Value>(start, &self.src[start..self.pos])
    }

    fn ident(&mut self) -> &'a str {
        if self.rest().starts_with("r#") {
            self.pos += 2;
        }
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// A value that starts with an identifier: keyword, unit variant,
    /// struct or tuple variant.
    fn identified(&mut self) -> Result<Value, String> {
        let start = self.pos;
        let ident = self.ident();
        match ident {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "None" => return Ok(Value::Null),
            "inf" | "NaN" => return self.decode::<Value>(start, ident),
            _ => {}
        }

        self.skip_ws()?;
        if self.peek() != Some('(') {
            return Ok(Value::String(ident.to_string()));
        }
        if ident == "Some" {
            self.pos += 1;
            let inner = self.value()?;
            self.skip_ws()?;
            self.eat(',');
            self.skip_ws()?;
            self.expect(')')?;
            return Ok(inner);
        }
        self.parens(Some(ident))
    }

    fn seq(&mut self) -> Result<Value, String> {
        self.expect('[')?;
        let items = self.items(']')?;
        Ok(Value::Array(items))
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn items(&mut self, close: char) -> Result<Vec<Value>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_ws()?;
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws()?;
            if !self.eat(',') {
                self.skip_ws()?;
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn map(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws()?;
            if self.eat('}') {
                break;
            }
            let key_pos = self.pos;
            let key = match self.value()? {
                Value::String(s) => s,
                key @ (Value::Number(_) | Value::Bool(_)) => key.to_string(),
                other => {
                    return Err(self.error_at(
                        key_pos,
                        format!(
                            "map keys must be strings, numbers or booleans, found {}",
                            value_kind(&other)
                        ),
                    ))
                }
            };
            self.skip_ws()?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws()?;
            if !self.eat(',') {
                self.skip_ws()?;
                self.expect('}')?;
                break;
            }
        }
        Ok(Value::Object(map))
    }

    /// Whether the parenthesised body starts with `field:`.
    fn at_field(&mut self) -> bool {
        let save = self.pos;
        let found = self.peek().is_some_and(is_ident_start) && {
            self.ident();
            self.skip_ws().is_ok() && self.rest().starts_with(':')
        };
        self.pos = save;
        found
    }

    fn parens(&mut self, name: Option<&str>) -> Result<Value, String> {
        self.expect('(')?;
        self.skip_ws()?;
        if self.eat(')') {
            return Ok(name.map_or(Value::Null, |n| Value::String(n.to_string())));
        }

        if self.at_field() {
            let mut fields = Map::new();
            loop {
                self.skip_ws()?;
                if self.eat(')') {
                    break;
                }
                if !self.peek().is_some_and(is_ident_start) {
                    return Err(self.unexpected("a field name"));
                }
                let field = self.ident().to_string();
                self.skip_ws()?;
                self.expect(':')?;
                let value = self.value()?;
                fields.insert(field, value);
                self.skip_ws()?;
                if !self.eat(',') {
                    self.skip_ws()?;
                    self.expect(')')?;
                    break;
                }
            }
            return Ok(Value::Object(fields));
        }

        let mut items = self.items(')')?;
        Ok(match name {
            None => Value::Array(items),
            Some(name) => {
                let payload = if items.len() == 1 {
                    items.remove(0)
                } else {
                    Value::Array(items)
                };
                let mut map = Map::new();
                map.insert(name.to_string(), payload);
                Value::Object(map)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_struct_becomes_map() {
        let doc = parse_ron(r#"Config(name: "x", port: 1)"#).unwrap();
        assert_eq!(doc, json!({"name": "x", "port": 1}));
    }

    #[test]
    fn test_unit_variant_becomes_string() {
        let doc = parse_ron("(mode: Fast)").unwrap();
        assert_eq!(doc, json!({"mode": "Fast"}));
    }

    #[test]
    fn test_tuple_variant_keeps_name() {
        assert_eq!(parse_ron(r#"{"k": Bar(1)}"#).unwrap(), json!({"k": {"Bar": 1}}));
        assert_eq!(
            parse_ron("Point(1, 2)").unwrap(),
            json!({"Point": [1, 2]})
        );
    }

    #[test]
    fn test_options_tuples_and_units() {
        let doc = parse_ron("(a: Some(3), b: None, c: (1, \"x\"), d: ())").unwrap();
        assert_eq!(doc, json!({"a": 3, "b": null, "c": [1, "x"], "d": null}));
    }

    #[test]
    fn test_literals() {
        let doc = parse_ron(
            r##"(
    s: "tab\there",
    raw: r#"say "hi""#,
    ch: 'z',
    float: 1.5e3,
    neg: -7,
    yes: true,
)"##,
        )
        .unwrap();
        assert_eq!(
            doc,
            json!({
                "s": "tab\there",
                "raw": "say \"hi\"",
                "ch": "z",
                "float": 1500.0,
                "neg": -7,
                "yes": true
            })
        );
    }

    #[test]
    fn test_comments_and_extension_header() {
        let input = "#![enable(implicit_some)]\n// settings\n(\n  /* outer /* nested */ */ level: 2, // two\n)\n";
        assert_eq!(parse_ron(input).unwrap(), json!({"level": 2}));
    }

    #[test]
    fn test_field_order_preserved() {
        let doc = parse_ron("Config(zeta: 1, alpha: 2, mid: 3)").unwrap();
        let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_errors_carry_position() {
        let err = parse_ron("(\n  a: 1,\n  b: ?\n)").unwrap_err();
        assert!(err.starts_with("3:6: "), "got {err}");

        let err = parse_ron("[1, 2").unwrap_err();
        assert!(err.contains("end of input"), "got {err}");

        let err = parse_ron("(a: 1) extra").unwrap_err();
        assert!(err.contains("trailing characters"), "got {err}");
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_ron("(a: \"open)").unwrap_err();
        assert!(err.starts_with("1:5: unterminated"), "got {err}");
    }
}

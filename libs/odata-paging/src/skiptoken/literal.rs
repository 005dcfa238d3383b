//! Skip-token literal grammar.
//!
//! ```text
//! token    := ws? ( literal ( ws? ',' ws? literal )* )? ws?
//! literal  := 'null' | 'true' | 'false'
//!           | quoted
//!           | 'guid' quoted | 'datetime' quoted
//!           | '-'? digit+ ( '.' digit+ )? ( [eE] [+-]? digit+ )? [mMdD]?
//! quoted   := "'" form-url-encoded text without "'" "'"
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::Error;
use crate::entity::Slot;
use crate::metadata::EdmType;
use crate::value::{PrimitiveValue, parse_datetime};

/// Typed value of one skip-token literal.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Null,
    String(String),
    Integer(i64),
    Decimal(BigDecimal),
    Double(f64),
    Boolean(bool),
    Guid(Uuid),
    DateTime(NaiveDateTime),
}

/// One parsed literal and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    value: LiteralValue,
    position: usize,
    text: String,
}

impl Literal {
    #[must_use]
    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    /// Zero-based ordinal of the literal in its token.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Source text of the literal, as it appeared in the token.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Inferred type name used in error messages.
    #[must_use]
    pub fn edm_type_name(&self) -> &'static str {
        match &self.value {
            LiteralValue::Null => "null",
            LiteralValue::String(_) => "Edm.String",
            LiteralValue::Integer(i) if i32::try_from(*i).is_ok() => "Edm.Int32",
            LiteralValue::Integer(_) => "Edm.Int64",
            LiteralValue::Decimal(_) => "Edm.Decimal",
            LiteralValue::Double(_) => "Edm.Double",
            LiteralValue::Boolean(_) => "Edm.Boolean",
            LiteralValue::Guid(_) => "Edm.Guid",
            LiteralValue::DateTime(_) => "Edm.DateTime",
        }
    }

    /// Whether this literal may stand for a value of `edm_type`.
    #[must_use]
    pub fn is_compatible_with(&self, edm_type: EdmType) -> bool {
        match (&self.value, edm_type) {
            (LiteralValue::Null, _)
            | (LiteralValue::String(_), EdmType::String)
            | (LiteralValue::Boolean(_), EdmType::Boolean)
            | (LiteralValue::Guid(_), EdmType::Guid)
            | (LiteralValue::DateTime(_), EdmType::DateTime)
            | (
                LiteralValue::Integer(_),
                EdmType::Int64 | EdmType::Decimal | EdmType::Double | EdmType::Single,
            )
            | (
                LiteralValue::Decimal(_) | LiteralValue::Double(_),
                EdmType::Decimal | EdmType::Double | EdmType::Single,
            ) => true,
            (LiteralValue::Integer(i), EdmType::Byte) => u8::try_from(*i).is_ok(),
            (LiteralValue::Integer(i), EdmType::SByte) => i8::try_from(*i).is_ok(),
            (LiteralValue::Integer(i), EdmType::Int16) => i16::try_from(*i).is_ok(),
            (LiteralValue::Integer(i), EdmType::Int32) => i32::try_from(*i).is_ok(),
            _ => false,
        }
    }

    fn primitive(&self) -> Option<PrimitiveValue> {
        Some(match &self.value {
            LiteralValue::Null => return None,
            LiteralValue::String(s) => PrimitiveValue::String(s.clone()),
            LiteralValue::Integer(i) => PrimitiveValue::Int(*i),
            LiteralValue::Decimal(d) => PrimitiveValue::Decimal(d.clone()),
            LiteralValue::Double(f) => PrimitiveValue::Double(*f),
            LiteralValue::Boolean(b) => PrimitiveValue::Boolean(*b),
            LiteralValue::Guid(g) => PrimitiveValue::Guid(*g),
            LiteralValue::DateTime(dt) => PrimitiveValue::DateTime(*dt),
        })
    }

    /// Numeric literal read straight from its source digits, never through `f64`.
    fn source_decimal(&self) -> Option<BigDecimal> {
        match self.value {
            LiteralValue::Integer(_) | LiteralValue::Decimal(_) | LiteralValue::Double(_) => {
                let digits = self.text.trim_end_matches(['M', 'm', 'D', 'd']);
                BigDecimal::from_str(digits).ok()
            }
            _ => None,
        }
    }

    /// Key-object slot for a leaf of type `edm_type`.
    #[must_use]
    pub fn to_slot(&self, edm_type: Option<EdmType>) -> Slot {
        if edm_type == Some(EdmType::Decimal)
            && let Some(exact) = self.source_decimal()
        {
            return Slot::Value(PrimitiveValue::Decimal(exact));
        }
        let Some(value) = self.primitive() else {
            return Slot::Absent;
        };
        let coerced = edm_type
            .and_then(|t| value.coerce_to(t))
            .map(Cow::into_owned);
        Slot::Value(coerced.unwrap_or(value))
    }
}

fn syntax(msg: impl Into<String>) -> Error {
    Error::SkipTokenSyntax(msg.into())
}

fn percent_decode(body: &str) -> Result<String, Error> {
    urlencoding::decode(body)
        .map(Cow::into_owned)
        .map_err(|_| syntax(format!("'{body}' is not valid UTF-8 after percent-decoding")))
}

/// String bodies are form-encoded: `+` stands for a space.
fn decode_quoted(body: &str) -> Result<String, Error> {
    percent_decode(&body.replace('+', " "))
}

struct Lexer<'t> {
    src: &'t str,
    pos: usize,
}

impl<'t> Lexer<'t> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> &'t str {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Body of a `'...'` literal, positioned on the opening quote.
    fn quoted(&mut self) -> Result<&'t str, Error> {
        let open = self.pos;
        self.pos += 1;
        let body = self.eat_while(|b| b != b'\'');
        if !self.eat(b'\'') {
            return Err(syntax(format!(
                "unterminated string literal starting at offset {open}"
            )));
        }
        let mut after = Lexer {
            src: self.src,
            pos: self.pos,
        };
        after.skip_ws();
        if !matches!(after.peek(), None | Some(b',')) {
            return Err(syntax(format!(
                "unescaped single quote in literal starting at offset {open}"
            )));
        }
        Ok(body)
    }

    fn number(&mut self) -> Result<LiteralValue, Error> {
        let src = self.src;
        let start = self.pos;
        self.eat(b'-');
        if self.eat_while(|b| b.is_ascii_digit()).is_empty() {
            return Err(syntax(format!("malformed number at offset {start}")));
        }
        let mut integral = true;
        if self.eat(b'.') {
            integral = false;
            if self.eat_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(syntax(format!("missing digits after '.' at offset {start}")));
            }
        }
        if self.eat(b'e') || self.eat(b'E') {
            integral = false;
            if !self.eat(b'+') {
                self.eat(b'-');
            }
            if self.eat_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(syntax(format!("missing exponent digits at offset {start}")));
            }
        }
        let digits = &src[start..self.pos];

        let decimal = || {
            BigDecimal::from_str(digits)
                .map(LiteralValue::Decimal)
                .map_err(|_| syntax(format!("'{digits}' is not a valid decimal")))
        };
        match self.peek() {
            Some(b'M' | b'm') => {
                self.pos += 1;
                decimal()
            }
            Some(b'D' | b'd') => {
                self.pos += 1;
                digits
                    .parse::<f64>()
                    .map(LiteralValue::Double)
                    .map_err(|_| syntax(format!("'{digits}' is not a valid double")))
            }
            _ if integral => digits
                .parse::<i64>()
                .map(LiteralValue::Integer)
                .map_err(|_| syntax(format!("integer literal '{digits}' is out of range"))),
            _ => decimal(),
        }
    }

    fn keyword(&mut self) -> Result<LiteralValue, Error> {
        let start = self.pos;
        let word = self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        match (word, self.peek()) {
            ("null", _) => Ok(LiteralValue::Null),
            ("true", _) => Ok(LiteralValue::Boolean(true)),
            ("false", _) => Ok(LiteralValue::Boolean(false)),
            ("guid", Some(b'\'')) => {
                let body = percent_decode(self.quoted()?)?;
                Uuid::parse_str(&body)
                    .map(LiteralValue::Guid)
                    .map_err(|_| syntax(format!("'{body}' is not a valid guid")))
            }
            ("datetime", Some(b'\'')) => {
                let body = percent_decode(self.quoted()?)?;
                parse_datetime(&body)
                    .map(LiteralValue::DateTime)
                    .ok_or_else(|| syntax(format!("'{body}' is not a valid datetime")))
            }
            _ => {
                self.skip_ws();
                if self.peek() == Some(b'=') {
                    Err(syntax(format!(
                        "named values are not supported ('{word}=' at offset {start})"
                    )))
                } else {
                    Err(syntax(format!("unrecognized literal at offset {start}")))
                }
            }
        }
    }

    fn literal(&mut self) -> Result<LiteralValue, Error> {
        match self.peek() {
            Some(b'\'') => decode_quoted(self.quoted()?).map(LiteralValue::String),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(b) if b.is_ascii_alphabetic() => self.keyword(),
            _ => Err(syntax(format!("unrecognized literal at offset {}", self.pos))),
        }
    }
}

/// Parse a skip token into its literals.
///
/// An empty or all-whitespace token yields no literals.
///
/// # Errors
/// Returns `Error::SkipTokenSyntax` for leading, trailing or consecutive
/// commas, named values (`name=value`), unescaped quotes and malformed
/// literals.
pub fn parse_literals(text: &str) -> Result<Vec<Literal>, Error> {
    let mut lexer = Lexer { src: text, pos: 0 };
    lexer.skip_ws();
    if lexer.peek().is_none() {
        return Ok(Vec::new());
    }

    let mut literals = Vec::new();
    loop {
        lexer.skip_ws();
        let start = lexer.pos;
        match lexer.peek() {
            Some(b',') if literals.is_empty() => return Err(syntax("leading comma")),
            Some(b',') => {
                return Err(syntax(format!(
                    "empty value between commas at offset {start}"
                )));
            }
            None => return Err(syntax("trailing comma")),
            Some(_) => {}
        }

        let value = lexer.literal()?;
        literals.push(Literal {
            value,
            position: literals.len(),
            text: text[start..lexer.pos].to_owned(),
        });

        lexer.skip_ws();
        match lexer.peek() {
            None => break,
            Some(b',') => lexer.pos += 1,
            Some(b'=') => {
                return Err(syntax(format!(
                    "named values are not supported (offset {})",
                    lexer.pos
                )));
            }
            Some(_) => {
                return Err(syntax(format!(
                    "unexpected character at offset {}",
                    lexer.pos
                )));
            }
        }
    }
    Ok(literals)
}

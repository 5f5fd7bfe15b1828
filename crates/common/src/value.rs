//! Runtime value representation for IPPcode24.
//!
//! Values are what live in frame slots and on the data stack.

use std::fmt;

use crate::error::StructureError;

/// Type name of a value, as written in source (`int`, `bool`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Bool,
    String,
    Nil,
    Type,
}

impl ValueType {
    /// Returns the source spelling of this type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Nil => "nil",
            ValueType::Type => "type",
        }
    }

    /// Parse a type operand. Only the types `READ` can produce are accepted.
    pub fn parse_operand(text: &str) -> Result<Self, StructureError> {
        match text {
            "int" => Ok(ValueType::Int),
            "bool" => Ok(ValueType::Bool),
            "string" => Ok(ValueType::String),
            _ => Err(StructureError::InvalidTypeName(text.to_string())),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed runtime value. The type tag is derived from the variant, so a
/// value can never disagree with its own type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Character string, escapes already decoded.
    String(String),
    /// The single nil value.
    Nil,
    /// A type name used as a value.
    Type(ValueType),
}

impl Value {
    /// Returns the type tag for this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Bool(_) => ValueType::Bool,
            Value::String(_) => ValueType::String,
            Value::Nil => ValueType::Nil,
            Value::Type(_) => ValueType::Type,
        }
    }

    /// Parse a `type@text` literal into a value.
    ///
    /// String literals have their `\DDD` escapes decoded here, so every
    /// later consumer sees the final characters.
    pub fn parse_literal(ty: &str, text: &str) -> Result<Self, StructureError> {
        match ty {
            "int" => parse_int(text).map(Value::Int),
            "bool" => match text {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(StructureError::InvalidLiteral {
                    ty: "bool",
                    text: text.to_string(),
                }),
            },
            "nil" if text == "nil" => Ok(Value::Nil),
            "nil" => Err(StructureError::InvalidLiteral {
                ty: "nil",
                text: text.to_string(),
            }),
            "string" => decode_escapes(text).map(Value::String),
            other => Err(StructureError::UnknownLiteralType(other.to_string())),
        }
    }
}

/// Renders the value the way `WRITE` prints it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Nil => Ok(()),
            Value::Type(t) => f.write_str(t.name()),
        }
    }
}

/// Parse an integer literal: optional sign, then decimal, `0x` hex or
/// `0o` octal digits.
fn parse_int(text: &str) -> Result<i64, StructureError> {
    let invalid = || StructureError::InvalidLiteral {
        ty: "int",
        text: text.to_string(),
    };

    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(oct) = body
        .strip_prefix("0o")
        .or_else(|| body.strip_prefix("0O"))
    {
        (8, oct)
    } else {
        (10, body)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    // Parse the magnitude as i128 so that i64::MIN is representable.
    let magnitude = i128::from_str_radix(digits, radix).map_err(|_| invalid())?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| invalid())
}

/// Decode `\DDD` escape sequences into the character with that code.
///
/// Codes 128 and above become Unicode characters, so they are written out
/// as their UTF-8 encoding rather than as a single byte.
pub fn decode_escapes(text: &str) -> Result<String, StructureError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let digits: String = chars.by_ref().take(3).collect();
        let code = (digits.len() == 3 && digits.chars().all(|d| d.is_ascii_digit()))
            .then(|| digits.parse::<u32>().ok())
            .flatten()
            .and_then(char::from_u32)
            .ok_or_else(|| StructureError::InvalidEscape(text.to_string()))?;
        out.push(code);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_types() {
        assert_eq!(Value::Int(1).value_type(), ValueType::Int);
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
        assert_eq!(Value::String("a".into()).value_type(), ValueType::String);
        assert_eq!(Value::Nil.value_type(), ValueType::Nil);
        assert_eq!(Value::Type(ValueType::Int).value_type(), ValueType::Type);
    }

    #[test]
    fn display_matches_write_rendering() {
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Nil.to_string(), "");
        assert_eq!(Value::String("héllo".into()).to_string(), "héllo");
        assert_eq!(Value::Type(ValueType::String).to_string(), "string");
    }

    #[test]
    fn int_literals() {
        assert_eq!(Value::parse_literal("int", "5"), Ok(Value::Int(5)));
        assert_eq!(Value::parse_literal("int", "-7"), Ok(Value::Int(-7)));
        assert_eq!(Value::parse_literal("int", "+3"), Ok(Value::Int(3)));
        assert_eq!(Value::parse_literal("int", "0x1F"), Ok(Value::Int(31)));
        assert_eq!(Value::parse_literal("int", "-0o17"), Ok(Value::Int(-15)));
        assert_eq!(
            Value::parse_literal("int", "-9223372036854775808"),
            Ok(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn invalid_int_literals() {
        for text in ["", "-", "12a", "0x", "9223372036854775808", "1.5"] {
            assert!(
                matches!(
                    Value::parse_literal("int", text),
                    Err(StructureError::InvalidLiteral { ty: "int", .. })
                ),
                "'{text}' should be rejected"
            );
        }
    }

    #[test]
    fn bool_and_nil_literals() {
        assert_eq!(Value::parse_literal("bool", "true"), Ok(Value::Bool(true)));
        assert_eq!(Value::parse_literal("bool", "false"), Ok(Value::Bool(false)));
        assert!(Value::parse_literal("bool", "TRUE").is_err());
        assert_eq!(Value::parse_literal("nil", "nil"), Ok(Value::Nil));
        assert!(Value::parse_literal("nil", "").is_err());
    }

    #[test]
    fn unknown_literal_type() {
        assert_eq!(
            Value::parse_literal("float", "1.0"),
            Err(StructureError::UnknownLiteralType("float".into()))
        );
    }

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(decode_escapes(r"\065").unwrap(), "A");
        assert_eq!(decode_escapes(r"a\032b\035c").unwrap(), "a b#c");
        assert_eq!(decode_escapes(r"\092").unwrap(), "\\");
        assert_eq!(decode_escapes("").unwrap(), "");
    }

    #[test]
    fn high_escapes_decode_to_characters() {
        let decoded = decode_escapes(r"\200").unwrap();
        assert_eq!(decoded, "\u{c8}");
        assert_eq!(decoded.as_bytes(), [0xc3, 0x88]);
    }

    #[test]
    fn bad_escapes_are_rejected() {
        assert!(decode_escapes(r"\06").is_err());
        assert!(decode_escapes(r"\0a5").is_err());
        assert!(decode_escapes("\\").is_err());
    }

    #[test]
    fn type_operands() {
        assert_eq!(ValueType::parse_operand("int"), Ok(ValueType::Int));
        assert_eq!(ValueType::parse_operand("string"), Ok(ValueType::String));
        assert!(ValueType::parse_operand("nil").is_err());
        assert!(ValueType::parse_operand("INT").is_err());
    }
}

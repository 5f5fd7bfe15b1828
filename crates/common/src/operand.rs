//! Instruction operands: variable references, labels, literals and types.

use std::fmt;
use std::str::FromStr;

use crate::error::StructureError;
use crate::opcode::OperandKind;
use crate::value::{Value, ValueType};

/// Which frame a variable reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Global,
    Local,
    Temporary,
}

impl FrameKind {
    /// Returns the source prefix (`GF`, `LF`, `TF`).
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl FromStr for FrameKind {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GF" => Ok(FrameKind::Global),
            "LF" => Ok(FrameKind::Local),
            "TF" => Ok(FrameKind::Temporary),
            _ => Err(StructureError::InvalidFrame(s.to_string())),
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A variable reference: frame plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl VarRef {
    /// Create a reference, validating the name.
    pub fn new(frame: FrameKind, name: &str) -> Result<Self, StructureError> {
        validate_identifier(name)?;
        Ok(Self {
            frame,
            name: name.to_string(),
        })
    }

    /// Parse `GF@name` notation.
    pub fn parse(text: &str) -> Result<Self, StructureError> {
        let (frame, name) = text
            .split_once('@')
            .ok_or_else(|| StructureError::InvalidFrame(text.to_string()))?;
        Self::new(frame.parse()?, name)
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// One operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Reference to a variable in some frame.
    Var(VarRef),
    /// Name of a jump target.
    Label(String),
    /// A constant, already converted to its native representation.
    Literal(Value),
    /// A type name, as taken by `READ`.
    Type(ValueType),
}

impl Operand {
    /// Variable operand from `GF@name` notation.
    pub fn var(text: &str) -> Result<Self, StructureError> {
        VarRef::parse(text).map(Operand::Var)
    }

    /// Label operand; the name must be a valid identifier.
    pub fn label(name: &str) -> Result<Self, StructureError> {
        validate_identifier(name)?;
        Ok(Operand::Label(name.to_string()))
    }

    /// Literal operand from a type prefix and its text.
    pub fn literal(ty: &str, text: &str) -> Result<Self, StructureError> {
        Value::parse_literal(ty, text).map(Operand::Literal)
    }

    /// Type operand (`int`, `bool`, `string`).
    pub fn type_name(text: &str) -> Result<Self, StructureError> {
        ValueType::parse_operand(text).map(Operand::Type)
    }

    /// Parse a symbol written as either `GF@x` or `int@5`.
    pub fn symbol(text: &str) -> Result<Self, StructureError> {
        let (prefix, rest) = text
            .split_once('@')
            .ok_or_else(|| StructureError::UnknownLiteralType(text.to_string()))?;
        match prefix {
            "GF" | "LF" | "TF" => Self::var(text),
            _ => Self::literal(prefix, rest),
        }
    }

    /// Parse source text as the operand kind a signature position expects.
    pub fn parse_as(kind: OperandKind, text: &str) -> Result<Self, StructureError> {
        match kind {
            OperandKind::Var => Self::var(text),
            OperandKind::Symb => Self::symbol(text),
            OperandKind::Label => Self::label(text),
            OperandKind::Type => Self::type_name(text),
        }
    }

    /// Returns true if this operand may appear where `kind` is expected.
    pub fn fits(&self, kind: OperandKind) -> bool {
        matches!(
            (self, kind),
            (Operand::Var(_), OperandKind::Var)
                | (Operand::Var(_), OperandKind::Symb)
                | (Operand::Literal(_), OperandKind::Symb)
                | (Operand::Label(_), OperandKind::Label)
                | (Operand::Type(_), OperandKind::Type)
        )
    }
}

/// Identifiers are letters, digits and `_-$&%*!?`, not starting with a digit.
fn validate_identifier(name: &str) -> Result<(), StructureError> {
    let special = |c: char| "_-$&%*!?".contains(c);
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || special(first) => {
            chars.all(|c| c.is_alphanumeric() || special(c))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StructureError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_prefixes() {
        assert_eq!("GF".parse::<FrameKind>(), Ok(FrameKind::Global));
        assert_eq!("LF".parse::<FrameKind>(), Ok(FrameKind::Local));
        assert_eq!("TF".parse::<FrameKind>(), Ok(FrameKind::Temporary));
        assert_eq!(
            "gf".parse::<FrameKind>(),
            Err(StructureError::InvalidFrame("gf".into()))
        );
    }

    #[test]
    fn var_refs() {
        let v = VarRef::parse("LF@counter_1").unwrap();
        assert_eq!(v.frame, FrameKind::Local);
        assert_eq!(v.name, "counter_1");
        assert_eq!(v.to_string(), "LF@counter_1");
    }

    #[test]
    fn var_ref_rejects_bad_names() {
        assert!(matches!(
            VarRef::parse("GF@1abc"),
            Err(StructureError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            VarRef::parse("GF@"),
            Err(StructureError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            VarRef::parse("XF@a"),
            Err(StructureError::InvalidFrame(_))
        ));
        assert!(matches!(
            VarRef::parse("noframe"),
            Err(StructureError::InvalidFrame(_))
        ));
    }

    #[test]
    fn special_characters_in_identifiers() {
        assert!(Operand::label("$loop-end!").is_ok());
        assert!(Operand::label("*&%?").is_ok());
        assert!(Operand::label("a.b").is_err());
    }

    #[test]
    fn symbols() {
        assert_eq!(
            Operand::symbol("int@42"),
            Ok(Operand::Literal(Value::Int(42)))
        );
        assert_eq!(
            Operand::symbol(r"string@a\032b"),
            Ok(Operand::Literal(Value::String("a b".into())))
        );
        assert_eq!(Operand::symbol("string@"), Ok(Operand::Literal(Value::String(String::new()))));
        assert_eq!(
            Operand::symbol("TF@x"),
            Ok(Operand::Var(VarRef {
                frame: FrameKind::Temporary,
                name: "x".into()
            }))
        );
    }

    #[test]
    fn string_literal_may_contain_at_sign() {
        assert_eq!(
            Operand::symbol("string@a@b"),
            Ok(Operand::Literal(Value::String("a@b".into())))
        );
    }

    #[test]
    fn fits_kinds() {
        let var = Operand::var("GF@x").unwrap();
        let lit = Operand::literal("nil", "nil").unwrap();
        assert!(var.fits(OperandKind::Var));
        assert!(var.fits(OperandKind::Symb));
        assert!(lit.fits(OperandKind::Symb));
        assert!(!lit.fits(OperandKind::Var));
        assert!(!Operand::Label("l".into()).fits(OperandKind::Symb));
        assert!(Operand::Type(ValueType::Int).fits(OperandKind::Type));
    }
}

//! The type algebra.
//!
//! Source type expressions normalize into this small closed algebra. The
//! `Display` rendering is the uppercase form used throughout diagnostics
//! (`INTEGER`, `ARRAY OF REAL`, …), matching the reference compiler.

use std::fmt;

use pasc_util::Symbol;

/// A normalized type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Integer,
    Real,
    Boolean,
    Char,
    /// The string type (multi-character literals, bounded strings).
    Texto,
    /// Any enumerated type; enum constants carry this.
    Enum,
    Array(Box<Ty>),
    Set(Box<Ty>),
    File(Box<Ty>),
    /// A record type, identified by its (possibly synthesized) type symbol.
    /// The field map lives on that symbol in the scope tree.
    Record(Symbol),
}

impl Ty {
    /// True for `integer` and `real`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Integer | Ty::Real)
    }

    /// Assignment compatibility: equality plus the two permitted coercions,
    /// `integer → real` and `array of char ↔ texto`.
    pub fn assignable_from(&self, src: &Ty) -> bool {
        if self == src {
            return true;
        }
        match (self, src) {
            (Ty::Real, Ty::Integer) => true,
            (Ty::Texto, Ty::Array(elem)) if **elem == Ty::Char => true,
            (Ty::Array(elem), Ty::Texto) if **elem == Ty::Char => true,
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Integer => f.write_str("INTEGER"),
            Ty::Real => f.write_str("REAL"),
            Ty::Boolean => f.write_str("BOOLEAN"),
            Ty::Char => f.write_str("CHAR"),
            Ty::Texto => f.write_str("TEXTO"),
            Ty::Enum => f.write_str("ENUM"),
            Ty::Array(elem) => write!(f, "ARRAY OF {elem}"),
            Ty::Set(elem) => write!(f, "SET OF {elem}"),
            Ty::File(elem) => write!(f, "FILE OF {elem}"),
            Ty::Record(_) => f.write_str("RECORD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric() {
        assert!(Ty::Integer.is_numeric());
        assert!(Ty::Real.is_numeric());
        assert!(!Ty::Boolean.is_numeric());
        assert!(!Ty::Array(Box::new(Ty::Integer)).is_numeric());
    }

    #[test]
    fn test_assignable_equal_types() {
        assert!(Ty::Integer.assignable_from(&Ty::Integer));
        assert!(!Ty::Integer.assignable_from(&Ty::Real));
        assert!(!Ty::Boolean.assignable_from(&Ty::Integer));
    }

    #[test]
    fn test_integer_to_real_coercion() {
        assert!(Ty::Real.assignable_from(&Ty::Integer));
    }

    #[test]
    fn test_char_array_texto_coercion() {
        let char_array = Ty::Array(Box::new(Ty::Char));
        assert!(Ty::Texto.assignable_from(&char_array));
        assert!(char_array.assignable_from(&Ty::Texto));

        let int_array = Ty::Array(Box::new(Ty::Integer));
        assert!(!Ty::Texto.assignable_from(&int_array));
    }

    #[test]
    fn test_display_uppercase() {
        assert_eq!(Ty::Integer.to_string(), "INTEGER");
        assert_eq!(
            Ty::Array(Box::new(Ty::Real)).to_string(),
            "ARRAY OF REAL"
        );
        assert_eq!(Ty::Set(Box::new(Ty::Char)).to_string(), "SET OF CHAR");
    }
}

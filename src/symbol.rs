use std::fmt;

/// A coded symbol: a literal byte, the end-of-stream marker, or the marker
/// carried by internal tree nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u16);

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} is not a persistable symbol")]
pub struct InvalidSymbol(pub u16);

impl Symbol {
    /// Marks the logical end of an encoded stream.
    pub const PSEUDO_EOF: Symbol = Symbol(256);

    /// Carried by internal tree nodes, never by a leaf.
    pub const NOT_A_SYMBOL: Symbol = Symbol(257);

    pub fn value(self) -> u16 {
        self.0
    }

    /// Literal byte value, `None` for the two reserved symbols.
    pub fn as_byte(self) -> Option<u8> {
        u8::try_from(self.0).ok()
    }

    pub fn is_eof(self) -> bool {
        self == Self::PSEUDO_EOF
    }
}

impl From<u8> for Symbol {
    fn from(byte: u8) -> Self {
        Symbol(byte.into())
    }
}

impl TryFrom<u16> for Symbol {
    type Error = InvalidSymbol;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= Self::PSEUDO_EOF.0 {
            Ok(Symbol(value))
        } else {
            Err(InvalidSymbol(value))
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = match *self {
            Self::PSEUDO_EOF => "EOF".into(),
            Self::NOT_A_SYMBOL => "NAS".into(),
            Symbol(byte) if (0x20..0x7f).contains(&byte) => format!("{:?}", byte as u8 as char),
            Symbol(byte) => format!("0x{byte:02x}"),
        };
        f.pad(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[test]
    fn reserved_symbols_are_disjoint() {
        assert_ne!(Symbol::PSEUDO_EOF, Symbol::NOT_A_SYMBOL);
        assert_eq!(Symbol::PSEUDO_EOF.as_byte(), None);
        assert_eq!(Symbol::NOT_A_SYMBOL.as_byte(), None);
        assert!(Symbol::PSEUDO_EOF.is_eof());
    }

    #[test]
    fn not_a_symbol_is_rejected() {
        assert_eq!(Symbol::try_from(256u16), Ok(Symbol::PSEUDO_EOF));
        assert_eq!(Symbol::try_from(257u16), Err(InvalidSymbol(257)));
    }

    #[test]
    fn display() {
        assert_eq!(Symbol::from(b'a').to_string(), "'a'");
        assert_eq!(Symbol::from(b'\n').to_string(), "0x0a");
        assert_eq!(Symbol::PSEUDO_EOF.to_string(), "EOF");
        assert_eq!(format!("{:>4}", Symbol::PSEUDO_EOF), " EOF");
    }

    #[proptest]
    fn test_byte_symbols(byte: u8) {
        let symbol = Symbol::from(byte);
        prop_assert_eq!(symbol.as_byte(), Some(byte));
        prop_assert!(!symbol.is_eof());
        prop_assert_eq!(Symbol::try_from(symbol.value()), Ok(symbol));
    }
}

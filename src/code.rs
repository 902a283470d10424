use crate::{frequency::FrequencyTable, symbol::Symbol};
use bitvec::prelude::*;
use hashbrown::HashMap;

/// Path from the tree root to a leaf, zero child first.
pub type Code = BitBox<u8, Lsb0>;

/// Maps every symbol of an encoding tree to its bit path.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CodeTable {
    codes: HashMap<Symbol, Code>,
}

impl CodeTable {
    pub fn get(&self, symbol: Symbol) -> Option<&BitSlice<u8, Lsb0>> {
        Some(self.codes.get(&symbol)?.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &BitSlice<u8, Lsb0>)> + '_ {
        self.codes
            .iter()
            .map(|(symbol, code)| (*symbol, code.as_bitslice()))
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|code| code.len()).max().unwrap_or(0)
    }

    /// True when no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().all(|(symbol, code)| {
            self.codes
                .iter()
                .filter(|(other, _)| *other != symbol)
                .all(|(_, other)| !other.starts_with(code))
        })
    }

    /// Exact payload length in bits when encoding the input `table` was
    /// counted from.
    pub fn encoded_bits(&self, table: &FrequencyTable) -> u64 {
        table
            .iter()
            .map(|(symbol, count)| {
                let len = self.codes.get(&symbol).map_or(0, |code| code.len() as u64);
                count.saturating_mul(len)
            })
            .fold(0u64, u64::saturating_add)
    }
}

impl FromIterator<(Symbol, Code)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, Code)>>(iter: I) -> Self {
        CodeTable {
            codes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(bits: &BitSlice<u8, Lsb0>) -> Code {
        bits.to_bitvec().into_boxed_bitslice()
    }

    #[test]
    fn detects_prefix() {
        let table: CodeTable = [
            (Symbol::from(b'a'), code(bits![u8, Lsb0; 0])),
            (Symbol::from(b'b'), code(bits![u8, Lsb0; 0, 1])),
            (Symbol::PSEUDO_EOF, code(bits![u8, Lsb0; 1])),
        ]
        .into_iter()
        .collect();
        assert!(!table.is_prefix_free());
    }

    #[test]
    fn encoded_bits_weighs_codes() {
        let table: CodeTable = [
            (Symbol::from(b'a'), code(bits![u8, Lsb0; 1])),
            (Symbol::PSEUDO_EOF, code(bits![u8, Lsb0; 0])),
        ]
        .into_iter()
        .collect();
        assert!(table.is_prefix_free());
        assert_eq!(table.max_code_len(), 1);

        let frequencies = FrequencyTable::from_bytes(b"aaaa");
        assert_eq!(table.encoded_bits(&frequencies), 5);
    }

    #[test]
    fn single_empty_code_is_prefix_free() {
        let empty = BitVec::<u8, Lsb0>::new().into_boxed_bitslice();
        let table: CodeTable = [(Symbol::PSEUDO_EOF, empty)].into_iter().collect();
        assert!(table.is_prefix_free());
        assert_eq!(table.get(Symbol::PSEUDO_EOF).map(BitSlice::len), Some(0));
        assert_eq!(table.get(Symbol::from(b'a')), None);
    }
}

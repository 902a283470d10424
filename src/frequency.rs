use crate::{
    error::{Error, Result},
    symbol::Symbol,
};
use std::{
    collections::BTreeMap,
    io::{self, Read, Result as IoResult, Write},
};

pub type Map<K, V> = BTreeMap<K, V>;

/// Occurrence count of every symbol in an input, including exactly one
/// pseudo-EOF.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrequencyTable {
    counts: Map<Symbol, u64>,
}

/// Size in bytes of one persisted `(symbol, count)` entry.
const ENTRY_LEN: usize = 2 + 8;

impl FrequencyTable {
    /// Counts every byte of `reader` until it is exhausted.
    pub fn from_reader<R: Read>(mut reader: R) -> IoResult<Self> {
        let mut counter = Self::counter();
        io::copy(&mut reader, &mut counter)?;
        Ok(counter.finish())
    }

    pub fn from_bytes(input: &[u8]) -> Self {
        let mut counter = Self::counter();
        counter.update(input);
        counter.finish()
    }

    pub fn counter() -> Counter {
        Counter::default()
    }

    /// Builds a table from explicit counts.
    ///
    /// Fails unless pseudo-EOF is present with a non-zero count, every symbol
    /// is persistable and no symbol repeats.
    pub fn from_counts(counts: impl IntoIterator<Item = (Symbol, u64)>) -> Result<Self> {
        let mut table = Map::new();
        for (symbol, count) in counts {
            if symbol == Symbol::NOT_A_SYMBOL {
                return Err(Error::malformed("frequency table contains NOT_A_SYMBOL"));
            }
            if table.insert(symbol, count).is_some() {
                return Err(Error::malformed(format!("frequency table lists {symbol} twice")));
            }
        }

        match table.get(&Symbol::PSEUDO_EOF) {
            None if table.is_empty() => Err(Error::malformed("frequency table is empty")),
            None | Some(0) => Err(Error::malformed("frequency table has no end-of-stream entry")),
            Some(_) => Ok(FrequencyTable { counts: table }),
        }
    }

    pub fn get(&self, symbol: Symbol) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or_default()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts.iter().map(|(symbol, count)| (*symbol, *count))
    }

    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |total, count| total.saturating_add(*count))
    }

    /// Number of literal bytes the table describes.
    pub fn byte_count(&self) -> u64 {
        self.total() - self.get(Symbol::PSEUDO_EOF)
    }

    /// Length in bytes of the persisted form.
    pub fn serialized_len(&self) -> usize {
        2 + self.counts.len() * ENTRY_LEN
    }

    /// Persists the table: a little-endian `u16` entry count followed by
    /// `(u16 symbol, u64 count)` pairs in ascending symbol order.
    pub fn write_to<W: Write>(&self, mut writer: W) -> IoResult<()> {
        // at most 257 entries, always fits
        let len = self.counts.len() as u16;
        writer.write_all(&len.to_le_bytes())?;
        for (symbol, count) in &self.counts {
            writer.write_all(&symbol.value().to_le_bytes())?;
            writer.write_all(&count.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = u16::from_le_bytes(read_array(&mut reader)?);
        if len == 0 {
            return Err(Error::malformed("frequency table is empty"));
        }

        let mut entries = Vec::with_capacity(len.into());
        for _ in 0..len {
            let value = u16::from_le_bytes(read_array(&mut reader)?);
            let symbol =
                Symbol::try_from(value).map_err(|err| Error::malformed(err.to_string()))?;
            let count = u64::from_le_bytes(read_array(&mut reader)?);
            if let Some((previous, _)) = entries.last() {
                if *previous >= symbol {
                    return Err(Error::malformed(format!(
                        "frequency table entry {symbol} out of order"
                    )));
                }
            }
            entries.push((symbol, count));
        }

        Self::from_counts(entries)
    }
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buffer = [0u8; N];
    match reader.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            Err(Error::malformed("frequency table is truncated"))
        }
        Err(err) => Err(err.into()),
    }
}

/// Accumulates byte counts from everything written to it.
#[derive(Clone, Debug)]
pub struct Counter {
    counts: [u64; 256],
}

impl Default for Counter {
    fn default() -> Self {
        Counter { counts: [0; 256] }
    }
}

impl Counter {
    pub fn update(&mut self, input: &[u8]) {
        for byte in input {
            let count = &mut self.counts[usize::from(*byte)];
            *count = count.saturating_add(1);
        }
    }

    /// Closes the input, adding the single pseudo-EOF occurrence.
    pub fn finish(self) -> FrequencyTable {
        let mut counts: Map<Symbol, u64> = (0..=u8::MAX)
            .zip(self.counts)
            .filter(|(_, count)| *count > 0)
            .map(|(byte, count)| (Symbol::from(byte), count))
            .collect();
        counts.insert(Symbol::PSEUDO_EOF, 1);
        FrequencyTable { counts }
    }
}

impl Write for Counter {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

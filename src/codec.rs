//! Compression and decompression of whole inputs.
//!
//! A compressed stream is the persisted [`FrequencyTable`] immediately
//! followed by the payload bits, packed least-significant bit first and
//! zero-padded to a whole byte. The payload ends with the code of
//! [`Symbol::PSEUDO_EOF`], so no length field is needed.

use crate::{
    bits::{into_padded_bytes, BitCursor, BitSink, BitSource},
    code::CodeTable,
    error::{Error, Result},
    frequency::FrequencyTable,
    symbol::Symbol,
    tree::{EncodingTree, Node},
};
use bitstream_io::{BitReader, BitWrite, BitWriter, LittleEndian};
use bitvec::prelude::*;
use std::io::{BufReader, BufWriter, Read, Result as IoResult, Seek, SeekFrom, Write};

/// Writes the code of every byte of `input` to `sink`, then the code of
/// pseudo-EOF. Returns the number of bytes encoded.
pub fn encode<R: Read, S: BitSink>(input: R, codes: &CodeTable, mut sink: S) -> Result<u64> {
    let lookup = |symbol: Symbol| codes.get(symbol).ok_or(Error::InternalConsistency { symbol });

    let mut encoded = 0;
    for byte in BufReader::new(input).bytes() {
        sink.write_bits(lookup(Symbol::from(byte?))?)?;
        encoded += 1;
    }
    sink.write_bits(lookup(Symbol::PSEUDO_EOF)?)?;

    Ok(encoded)
}

/// Walks `tree` bit by bit, writing each decoded byte to `output` until the
/// pseudo-EOF leaf is reached. Returns the number of bytes decoded.
pub fn decode<S: BitSource, W: Write>(
    mut source: S,
    tree: &EncodingTree,
    mut output: W,
) -> Result<u64> {
    let root = tree.root();
    if root.is_leaf() {
        // the only code is the empty one, nothing was written
        return match root.symbol() {
            Symbol::PSEUDO_EOF => Ok(0),
            symbol => Err(Error::malformed(format!(
                "single-symbol tree for {symbol} cannot end a stream"
            ))),
        };
    }

    let mut node = root;
    let mut bit_position = 0u64;
    let mut decoded = 0u64;
    loop {
        let Some(bit) = source.read_bit()? else {
            tracing::warn!(bit_position, decoded, "bitstream truncated");
            return Err(Error::Truncated { bit_position });
        };
        bit_position += 1;

        let Some(next) = node.child(bit) else {
            return Err(Error::malformed("decoder stepped past a leaf"));
        };
        match next {
            Node::Internal { .. } => node = next,
            Node::Leaf { symbol, .. } => {
                let Some(byte) = symbol.as_byte() else {
                    break;
                };
                output.write_all(&[byte])?;
                decoded += 1;
                node = root;
            }
        }
    }

    Ok(decoded)
}

fn check_length(table: &FrequencyTable, decoded: u64) -> Result<()> {
    if decoded == table.byte_count() {
        Ok(())
    } else {
        Err(Error::malformed(format!(
            "decoded {decoded} bytes, frequency table describes {}",
            table.byte_count()
        )))
    }
}

/// In-memory compressed form: the frequency table and the packed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compressed {
    pub table: FrequencyTable,
    pub bits: Vec<u8>,
}

impl Compressed {
    /// Length in bytes of the persisted form.
    pub fn len(&self) -> usize {
        self.table.serialized_len() + self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> IoResult<()> {
        self.table.write_to(&mut writer)?;
        writer.write_all(&self.bits)
    }

    pub fn from_bytes(mut data: &[u8]) -> Result<Self> {
        let table = FrequencyTable::read_from(&mut data)?;
        Ok(Compressed {
            table,
            bits: data.to_vec(),
        })
    }
}

/// Sizes observed by a streaming compress or decompress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Stats {
    pub original_len: u64,
    pub compressed_len: u64,
    /// Distinct symbols, pseudo-EOF included.
    pub symbols: usize,
}

impl Stats {
    fn new(table: &FrequencyTable, codes: &CodeTable) -> Self {
        Stats {
            original_len: table.byte_count(),
            compressed_len: table.serialized_len() as u64 + codes.encoded_bits(table).div_ceil(8),
            symbols: table.len(),
        }
    }

    /// Compressed size relative to the original, `None` for empty inputs.
    pub fn ratio(&self) -> Option<f64> {
        (self.original_len > 0).then(|| self.compressed_len as f64 / self.original_len as f64)
    }
}

pub fn compress(input: &[u8]) -> Result<Compressed> {
    let table = FrequencyTable::from_bytes(input);
    let codes = EncodingTree::new(&table)?.code_table();

    let mut bits = BitVec::<u8, Lsb0>::new();
    encode(input, &codes, &mut bits)?;
    tracing::debug!(
        original_len = input.len(),
        payload_bits = bits.len(),
        symbols = table.len(),
        "compressed"
    );

    Ok(Compressed {
        table,
        bits: into_padded_bytes(bits),
    })
}

pub fn decompress(compressed: &Compressed) -> Result<Vec<u8>> {
    let tree = EncodingTree::new(&compressed.table)?;
    let mut output = Vec::new();
    let decoded = decode(BitCursor::from_bytes(&compressed.bits), &tree, &mut output)?;
    check_length(&compressed.table, decoded)?;
    Ok(output)
}

/// Compresses `input` from its current position to its end, writing the
/// frequency table and then the payload to `output`.
///
/// The input is read twice: once to count symbols, once to encode them.
pub fn compress_stream<R: Read + Seek, W: Write>(mut input: R, mut output: W) -> Result<Stats> {
    let start = input.stream_position()?;
    let table = FrequencyTable::from_reader(&mut input)?;
    input.seek(SeekFrom::Start(start))?;

    let codes = EncodingTree::new(&table)?.code_table();
    table.write_to(&mut output)?;
    {
        let mut writer = BitWriter::endian(&mut output, LittleEndian);
        encode(&mut input, &codes, &mut writer)?;
        writer.byte_align()?;
    }
    output.flush()?;

    let stats = Stats::new(&table, &codes);
    tracing::debug!(?stats, "compressed stream");
    Ok(stats)
}

/// Reads a frequency table and payload from `input`, writing the decoded
/// bytes to `output`.
pub fn decompress_stream<R: Read, W: Write>(mut input: R, output: W) -> Result<Stats> {
    let table = FrequencyTable::read_from(&mut input)?;
    let tree = EncodingTree::new(&table)?;

    let mut output = BufWriter::new(output);
    let decoded = decode(BitReader::endian(input, LittleEndian), &tree, &mut output)?;
    output.flush()?;
    check_length(&table, decoded)?;

    let stats = Stats::new(&table, &tree.code_table());
    tracing::debug!(?stats, "decompressed stream");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn truncated(err: &Error) -> bool {
        matches!(err, Error::Truncated { .. })
    }

    #[test]
    fn empty_input() {
        let compressed = compress(b"").unwrap();
        assert_eq!(compressed.table.len(), 1);
        assert_eq!(compressed.table.get(Symbol::PSEUDO_EOF), 1);
        assert!(compressed.bits.is_empty());
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn repeated_byte() {
        // a = 1, EOF = 0: bits 1111 0 packed from the low end
        let compressed = compress(b"aaaa").unwrap();
        assert_eq!(compressed.bits, [0b0000_1111]);
        assert_eq!(decompress(&compressed).unwrap(), b"aaaa");
    }

    #[test]
    fn single_byte() {
        let compressed = compress(b"x").unwrap();
        assert_eq!(decompress(&compressed).unwrap(), b"x");
    }

    #[test]
    fn truncated_payload() {
        let mut compressed = compress(b"hello, world").unwrap();
        compressed.bits.pop();
        let err = decompress(&compressed).unwrap_err();
        assert!(truncated(&err));
        assert!(err.is_malformed());
    }

    #[test]
    fn missing_payload() {
        let mut compressed = compress(b"hello").unwrap();
        compressed.bits.clear();
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, Error::Truncated { bit_position: 0 }));
    }

    #[test]
    fn length_disagrees_with_table() {
        let mut compressed = compress(b"aaaa").unwrap();
        // a a EOF
        compressed.bits = vec![0b0000_0011];
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, Error::MalformedStream { .. }));
    }

    #[test]
    fn decoding_stops_at_eof() {
        let tree = EncodingTree::new(&FrequencyTable::from_bytes(b"aaaa")).unwrap();
        let mut output: Vec<u8> = vec![];
        // a a EOF, then bits that must not be read
        let bits = bits![u8, Lsb0; 1, 1, 0, 1, 1, 1];
        let mut cursor = BitCursor::new(bits);
        assert_eq!(decode(&mut cursor, &tree, &mut output).unwrap(), 2);
        assert_eq!(output, b"aa");
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn unknown_byte_is_inconsistent() {
        let codes = EncodingTree::new(&FrequencyTable::from_bytes(b"ab"))
            .unwrap()
            .code_table();
        let mut bits = BitVec::<u8, Lsb0>::new();
        let err = encode(&b"abc"[..], &codes, &mut bits).unwrap_err();
        assert!(matches!(
            err,
            Error::InternalConsistency { symbol } if symbol == Symbol::from(b'c')
        ));
    }

    #[test]
    fn stream_layout_matches_container() {
        let input = b"it was the best of times, it was the worst of times";
        let compressed = compress(input).unwrap();
        let mut expected: Vec<u8> = vec![];
        compressed.write_to(&mut expected).unwrap();
        assert_eq!(expected.len(), compressed.len());

        let mut output: Vec<u8> = vec![];
        let stats = compress_stream(std::io::Cursor::new(&input[..]), &mut output).unwrap();
        assert_eq!(output, expected);
        assert_eq!(stats.original_len, input.len() as u64);
        assert_eq!(stats.compressed_len, expected.len() as u64);
        assert_eq!(Compressed::from_bytes(&output).unwrap(), compressed);
    }

    #[proptest]
    fn test_roundtrip(input: Vec<u8>) {
        let compressed = compress(&input).unwrap();
        prop_assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[proptest]
    fn test_repeated_roundtrip(byte: u8, #[strategy(0usize..512)] len: usize) {
        let input = vec![byte; len];
        let compressed = compress(&input).unwrap();
        prop_assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[proptest]
    fn test_deterministic(input: Vec<u8>) {
        prop_assert_eq!(compress(&input).unwrap(), compress(&input).unwrap());
    }

    #[proptest]
    fn test_stream_roundtrip(input: Vec<u8>) {
        let mut compressed: Vec<u8> = vec![];
        let stats = compress_stream(std::io::Cursor::new(&input), &mut compressed).unwrap();
        prop_assert_eq!(stats.compressed_len, compressed.len() as u64);

        let mut output: Vec<u8> = vec![];
        let stats = decompress_stream(&compressed[..], &mut output).unwrap();
        prop_assert_eq!(stats.original_len, input.len() as u64);
        prop_assert_eq!(output, input);
    }

    #[proptest]
    fn test_truncated_stream(#[filter(!#input.is_empty())] input: Vec<u8>) {
        let mut compressed = compress(&input).unwrap();
        compressed.bits.pop();
        prop_assert!(truncated(&decompress(&compressed).unwrap_err()));
    }
}

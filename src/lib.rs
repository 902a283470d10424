pub mod bits;
pub mod code;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod symbol;
pub mod tree;

pub use self::{
    code::CodeTable,
    codec::{compress, compress_stream, decompress, decompress_stream, Compressed, Stats},
    error::{Error, Result},
    frequency::FrequencyTable,
    symbol::Symbol,
    tree::EncodingTree,
};

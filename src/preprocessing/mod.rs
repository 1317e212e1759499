/// Tokenizer abstraction and the pretrained implementation
pub mod encoder;

/// Tokenization and padding policy
pub mod policy;

/// Split tokenization
pub mod tokenize;

/// Tokenizers converted from fairseq BPE vocabularies
pub mod fairseq;

/// Mini-batch collation
pub mod batcher;

pub use batcher::{Batch, Batcher};
pub use encoder::{Encoder, PretrainedTokenizer};
pub use fairseq::FairseqBpe;
pub use policy::{Padding, TokenizerPolicy};
pub use tokenize::{tokenize, TokenizationError, TokenizedExample, TokenizedSplit};

//! fairseq BPE vocabularies
//!
//! Some checkpoints (BERTweet among them) publish a fairseq dictionary and fastBPE merge codes
//! instead of a `tokenizer.json`. [`FairseqBpe`] rebuilds an equivalent `tokenizers` BPE model
//! from those two files.

use std::{fs, path::Path};

use tokenizers::{
    models::bpe::{Merges, Vocab, BPE},
    pre_tokenizers::whitespace::Whitespace,
    processors::template::TemplateProcessing,
    Tokenizer,
};

use super::{Encoder, PretrainedTokenizer};

/// The fairseq dictionary: one `<token> <count>` line per entry
pub static VOCAB_FILE: &str = "vocab.txt";

/// fastBPE merge codes: one `<left> <right> <count>` line per merge, in priority order
pub static CODES_FILE: &str = "bpe.codes";

/// Prepended to every fairseq dictionary, in id order
const SPECIAL_TOKENS: [&str; 4] = ["<s>", "<pad>", "</s>", "<unk>"];

const UNK_ID: u32 = 3;

/// Marks a dictionary piece that does not end a word
const CONTINUATION: &str = "@@";

/// Marks a merge piece that ends a word
const END_OF_WORD: &str = "</w>";

/// A BPE encoder built from a fairseq dictionary and fastBPE codes
pub struct FairseqBpe {
    tokenizer: PretrainedTokenizer,

    /// Ids at or above this are merge pieces missing from the dictionary
    vocab_size: u32,
}

impl FairseqBpe {
    /// Build the encoder from `vocab.txt`, `bpe.codes` and an optional `tokenizer_config.json`
    pub fn from_files(
        vocab_file: &Path,
        codes_file: &Path,
        config_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let dictionary = fs::read_to_string(vocab_file)?;
        let codes = fs::read_to_string(codes_file)?;

        Self::new(&dictionary, &codes, config_file)
    }

    /// Build the encoder from the contents of the dictionary and codes files
    pub fn new(dictionary: &str, codes: &str, config_file: Option<&Path>) -> anyhow::Result<Self> {
        let (tokenizer, vocab_size) = build(dictionary, codes)?;

        Ok(Self {
            tokenizer: PretrainedTokenizer::new(tokenizer, config_file)?,
            vocab_size,
        })
    }
}

impl Encoder for FairseqBpe {
    fn encode(&self, text: &str, max_length: usize) -> anyhow::Result<Vec<u32>> {
        let ids = self.tokenizer.encode(text, max_length)?;

        Ok(ids
            .into_iter()
            .map(|id| if id < self.vocab_size { id } else { UNK_ID })
            .collect())
    }

    fn pad_token_id(&self) -> u32 {
        self.tokenizer.pad_token_id()
    }

    fn model_max_length(&self) -> usize {
        self.tokenizer.model_max_length()
    }
}

/// Returns the tokenizer and the dictionary size
///
/// Dictionary pieces are keyed the way the BPE model produces them: `hel@@` becomes `hel`, and
/// a word-final `lo` becomes `lo</w>`. A merge whose result is not in the dictionary is
/// dropped, leaving the smaller pieces. Merge inputs missing from the dictionary get ids past
/// the dictionary size.
fn build(dictionary: &str, codes: &str) -> anyhow::Result<(Tokenizer, u32)> {
    let mut vocab: Vocab = SPECIAL_TOKENS
        .iter()
        .zip(0u32..)
        .map(|(token, id)| (token.to_string(), id))
        .collect();

    let mut next_id = SPECIAL_TOKENS.len() as u32;
    for token in dictionary.lines().filter_map(|line| line.split_whitespace().next()) {
        let piece = match token.strip_suffix(CONTINUATION) {
            Some(stem) => stem.to_string(),
            None => format!("{token}{END_OF_WORD}"),
        };

        vocab.entry(piece).or_insert(next_id);
        next_id += 1;
    }

    let vocab_size = next_id;

    let mut merges = Merges::new();
    for line in codes.lines() {
        let mut fields = line.split_whitespace();
        let (Some(left), Some(right)) = (fields.next(), fields.next()) else {
            continue;
        };

        if !vocab.contains_key(&format!("{left}{right}")) {
            continue;
        }

        for piece in [left, right] {
            if !vocab.contains_key(piece) {
                vocab.insert(piece.to_string(), next_id);
                next_id += 1;
            }
        }

        merges.push((left.to_string(), right.to_string()));
    }

    log::debug!(
        "Converted fairseq BPE: {} dictionary entries, {} merges",
        vocab_size,
        merges.len()
    );

    let model = BPE::builder()
        .vocab_and_merges(vocab, merges)
        .unk_token(SPECIAL_TOKENS[UNK_ID as usize].to_string())
        .end_of_word_suffix(END_OF_WORD.to_string())
        .build()
        .map_err(|e| anyhow!("Unable to build BPE model: {}", e))?;

    let template = TemplateProcessing::builder()
        .try_single("<s> $A </s>")
        .map_err(|e| anyhow!("Invalid template: {}", e))?
        .special_tokens(vec![(SPECIAL_TOKENS[0], 0), (SPECIAL_TOKENS[2], 2)])
        .build()
        .map_err(|e| anyhow!("Invalid template: {}", e))?;

    let mut tokenizer = Tokenizer::new(model);
    tokenizer
        .with_pre_tokenizer(Whitespace)
        .with_post_processor(template);

    Ok((tokenizer, vocab_size))
}

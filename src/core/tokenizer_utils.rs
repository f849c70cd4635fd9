/*
 * Token estimation for scanned file content. The scanner depends on the
 * `TokenCounterOperations` trait only; `TikTokenCounter` is the real estimate
 * (cl100k_base, the encoding used by the GPT-4 family) and
 * `WhitespaceTokenCounter` is the cheap word count used as a fallback and in
 * tests.
 */
use tiktoken_rs::CoreBPE;

pub trait TokenCounterOperations: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/*
 * Holds one BPE instance for the lifetime of the counter. Building the BPE is
 * the expensive part, and a scan counts tokens for every file. If the encoding
 * cannot be loaded, counting degrades to whitespace words.
 */
pub struct TikTokenCounter {
    bpe: Option<CoreBPE>,
}

impl TikTokenCounter {
    pub fn new() -> Self {
        let bpe = match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                log::error!(
                    "TikTokenCounter: Failed to load cl100k_base ({e:?}); falling back to whitespace counting."
                );
                None
            }
        };
        TikTokenCounter { bpe }
    }
}

impl Default for TikTokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounterOperations for TikTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => WhitespaceTokenCounter.count_tokens(text),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenCounter;

impl TokenCounterOperations for WhitespaceTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

//! Sentence-level text diff.
//!
//! Runs of adjacent text leaves are flattened to plain text, split into
//! sentences, and each distinct sentence is interned as one synthetic
//! character. A character diff over those codes is then a sentence diff,
//! which is expanded back into one text leaf per sentence.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use similar::ChangeTag;
use tracing::trace;
use vellum_model::{Mark, Node, Schema};

use crate::annotate::{create_diff_mark, DiffType};
use crate::config::TextMarkPolicy;
use crate::engine::DiffContext;
use crate::error::{DiffError, DiffResult};

/// A run of non-terminators followed by terminators and trailing
/// whitespace, or by the end of input.
static SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^.!?]*(?:[.!?]+\s*|$)").expect("sentence pattern is valid")
});

/// Number of Unicode scalar values, which bounds the distinct sentences a
/// single text diff can handle.
pub const MAX_SENTENCE_SYMBOLS: usize = 0x11_0000 - SURROGATE_COUNT;

const SURROGATE_START: usize = 0xD800;
const SURROGATE_COUNT: usize = 0x800;

/// Split text into sentences. Each sentence keeps its terminating
/// punctuation and trailing whitespace, so the pieces concatenate back to
/// the input.
pub fn tokenize_sentences(text: &str) -> Vec<&str> {
    SENTENCE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Request-scoped dictionary from sentences to synthetic character codes.
///
/// Codes are handed out in first-seen order, skipping the surrogate range.
#[derive(Debug)]
pub struct SentenceTable<'a> {
    codes: HashMap<&'a str, char>,
    sentences: Vec<&'a str>,
    limit: usize,
}

impl Default for SentenceTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SentenceTable<'a> {
    /// A table bounded only by the Unicode scalar space.
    pub fn new() -> Self {
        Self::with_limit(MAX_SENTENCE_SYMBOLS)
    }

    /// A table holding at most `limit` distinct sentences.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            codes: HashMap::new(),
            sentences: Vec::new(),
            limit: limit.min(MAX_SENTENCE_SYMBOLS),
        }
    }

    /// Number of distinct sentences interned so far.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// The code for `sentence`, assigning the next free one if unseen.
    pub fn intern(&mut self, sentence: &'a str) -> DiffResult<char> {
        if let Some(&code) = self.codes.get(sentence) {
            return Ok(code);
        }
        let index = self.sentences.len();
        let exhausted = DiffError::SentenceSymbolsExhausted { limit: self.limit };
        if index >= self.limit {
            return Err(exhausted);
        }
        let code = symbol_for(index).ok_or(exhausted)?;
        self.codes.insert(sentence, code);
        self.sentences.push(sentence);
        Ok(code)
    }

    /// Intern every sentence and return the resulting code string.
    pub fn encode(&mut self, sentences: &[&'a str]) -> DiffResult<String> {
        sentences.iter().map(|s| self.intern(s)).collect()
    }

    /// The sentence behind `code`.
    pub fn sentence(&self, code: char) -> Option<&'a str> {
        self.sentences.get(index_of(code)).copied()
    }

}

fn symbol_for(index: usize) -> Option<char> {
    let raw = if index < SURROGATE_START {
        index
    } else {
        index + SURROGATE_COUNT
    };
    u32::try_from(raw).ok().and_then(char::from_u32)
}

fn index_of(code: char) -> usize {
    let raw = code as usize;
    if raw < SURROGATE_START {
        raw
    } else {
        raw - SURROGATE_COUNT
    }
}

/// Flattened text of one side of a text diff, with the byte span and marks
/// of each source leaf.
struct TextSide<'a> {
    text: String,
    spans: Vec<(usize, usize, &'a [Mark])>,
}

impl<'a> TextSide<'a> {
    fn new(leaves: &'a [Node]) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let start = text.len();
            text.push_str(leaf.text().unwrap_or_default());
            spans.push((start, text.len(), leaf.marks()));
        }
        Self { text, spans }
    }

    /// Style marks of the leaf containing `start..end`, if one leaf does.
    fn style_marks(&self, schema: &Schema, start: usize, end: usize) -> Vec<Mark> {
        self.spans
            .iter()
            .find(|(s, e, _)| *s <= start && end <= *e)
            .map(|(_, _, marks)| {
                marks
                    .iter()
                    .filter(|m| !m.is(&schema.diff_mark))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Comparison key of a sentence: the sentence without trailing whitespace.
pub fn sentence_key(sentence: &str) -> &str {
    sentence.trim_end()
}

/// Diff two runs of text leaves sentence by sentence.
///
/// Returns one text leaf per sentence. Unchanged sentences carry no diff
/// mark; deleted and inserted ones carry the matching diff mark. Sentences
/// are compared without their trailing whitespace; when only that
/// whitespace changed, the sentence stays unchanged and the old and new
/// whitespace are emitted as their own deleted and inserted leaves. Other
/// marks on the input leaves are handled per [`TextMarkPolicy`].
pub fn patch_text_nodes(cx: &DiffContext<'_>, old: &[Node], new: &[Node]) -> DiffResult<Vec<Node>> {
    let old_side = TextSide::new(old);
    let new_side = TextSide::new(new);
    let old_sentences = tokenize_sentences(&old_side.text);
    let new_sentences = tokenize_sentences(&new_side.text);
    let old_keys: Vec<&str> = old_sentences.iter().map(|s| sentence_key(s)).collect();
    let new_keys: Vec<&str> = new_sentences.iter().map(|s| sentence_key(s)).collect();

    let limit = cx.config.max_sentence_symbols.unwrap_or(MAX_SENTENCE_SYMBOLS);
    let mut table = SentenceTable::with_limit(limit);
    let old_codes = table.encode(&old_keys)?;
    let new_codes = table.encode(&new_keys)?;
    trace!(
        old = old_sentences.len(),
        new = new_sentences.len(),
        distinct = table.len(),
        "diffing sentences"
    );

    let inserted = create_diff_mark(cx.schema, DiffType::Inserted)?;
    let deleted = create_diff_mark(cx.schema, DiffType::Deleted)?;
    let old_offsets = sentence_offsets(&old_sentences);
    let new_offsets = sentence_offsets(&new_sentences);

    let diff = cx
        .config
        .text_diff_config()
        .diff_chars(old_codes.as_str(), new_codes.as_str());

    let mut out = Vec::with_capacity(old_sentences.len().max(new_sentences.len()));
    for change in diff.iter_all_changes() {
        match (change.tag(), change.old_index(), change.new_index()) {
            (ChangeTag::Delete, Some(i), _) => {
                out.push(leaf(cx, &old_side, old_offsets[i], old_sentences[i], Some(&deleted))?);
            }
            (ChangeTag::Insert, _, Some(j)) => {
                out.push(leaf(cx, &new_side, new_offsets[j], new_sentences[j], Some(&inserted))?);
            }
            (ChangeTag::Equal, Some(i), Some(j)) => {
                let (old_sentence, new_sentence) = (old_sentences[i], new_sentences[j]);
                let key = new_keys[j];
                let old_space = &old_sentence[key.len()..];
                let new_space = &new_sentence[key.len()..];
                if old_space == new_space {
                    out.push(leaf(cx, &new_side, new_offsets[j], new_sentence, None)?);
                    continue;
                }
                if !key.is_empty() {
                    out.push(leaf(cx, &new_side, new_offsets[j], key, None)?);
                }
                if !old_space.is_empty() {
                    let start = old_offsets[i] + key.len();
                    out.push(leaf(cx, &old_side, start, old_space, Some(&deleted))?);
                }
                if !new_space.is_empty() {
                    let start = new_offsets[j] + key.len();
                    out.push(leaf(cx, &new_side, start, new_space, Some(&inserted))?);
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

/// Build one output leaf for `text`, found at byte `start` of `side`.
fn leaf(
    cx: &DiffContext<'_>,
    side: &TextSide<'_>,
    start: usize,
    text: &str,
    diff_mark: Option<&Mark>,
) -> DiffResult<Node> {
    let mut marks = match cx.config.text_marks {
        TextMarkPolicy::Discard => Vec::new(),
        TextMarkPolicy::PreserveWithinLeaf => {
            side.style_marks(cx.schema, start, start + text.len())
        }
    };
    marks.extend(diff_mark.cloned());
    Ok(cx.schema.text(text, marks)?)
}

fn sentence_offsets(sentences: &[&str]) -> Vec<usize> {
    sentences
        .iter()
        .scan(0, |pos, s| {
            let start = *pos;
            *pos += s.len();
            Some(start)
        })
        .collect()
}

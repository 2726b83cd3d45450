/// Sentence-aware text chunking
///
/// The toxicity model accepts bounded inputs, so long text is split into
/// chunks by greedily packing whole sentences up to the length bound.
/// Chunks are byte-range slices of the input: concatenating them (ignoring
/// the whitespace dropped at chunk boundaries) reconstructs the text
/// exactly. A single sentence longer than the bound becomes its own chunk.
use regex::Regex;
use std::sync::OnceLock;

/// Character budget per chunk, matching the scoring model's input bound.
pub const MAX_CHUNK_CHARS: usize = 512;

/// A sentence ends with `.`, `!` or `?` followed by whitespace.
fn sentence_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("sentence boundary pattern"))
}

/// Split `text` into trimmed chunks of at most `max_chars` characters,
/// never breaking inside a sentence.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offsets of sentence ends; the final sentence ends at the text end.
    let mut ends: Vec<usize> = sentence_boundary()
        .find_iter(text)
        .map(|m| m.end())
        .collect();
    if ends.last() != Some(&text.len()) {
        ends.push(text.len());
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut prev_end = 0usize;
    for end in ends {
        let fits = text[start..end].trim().len() <= max_chars;
        if prev_end > start && !fits {
            chunks.push(text[start..prev_end].trim());
            start = prev_end;
        }
        prev_end = end;
    }
    if prev_end > start {
        chunks.push(text[start..prev_end].trim());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("You are worthless and should quit.", MAX_CHUNK_CHARS);
        assert_eq!(chunks, vec!["You are worthless and should quit."]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_text("", MAX_CHUNK_CHARS).is_empty());
        assert!(chunk_text("   \n ", MAX_CHUNK_CHARS).is_empty());
    }

    #[test]
    fn test_chunks_reconstruct_input() {
        let text = "First sentence here. Second one follows!  Third, with  odd   spacing? Last.";
        let chunks = chunk_text(text, 30);

        assert!(chunks.len() > 1);
        let rebuilt: String = chunks.concat();
        assert_eq!(without_whitespace(&rebuilt), without_whitespace(text));
    }

    #[test]
    fn test_no_chunk_exceeds_bound() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= MAX_CHUNK_CHARS, "chunk of {} chars", chunk.len());
        }
    }

    #[test]
    fn test_oversized_sentence_stands_alone() {
        let long_sentence = format!("{}.", "a".repeat(600));
        let text = format!("{long_sentence} Short one.");
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], long_sentence);
        assert_eq!(chunks[1], "Short one.");
    }

    #[test]
    fn test_greedy_packing_fills_chunks() {
        // Each sentence is 10 chars; a 35-char budget packs three per chunk.
        let text = "aaaaaaaa. bbbbbbbb. cccccccc. dddddddd. eeeeeeee. ffffffff.";
        let chunks = chunk_text(text, 35);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "aaaaaaaa. bbbbbbbb. cccccccc.");
        assert_eq!(chunks[1], "dddddddd. eeeeeeee. ffffffff.");
    }

    #[test]
    fn test_text_without_punctuation_is_one_chunk() {
        let text = "words all the way down with no sentence ends";
        assert_eq!(chunk_text(text, MAX_CHUNK_CHARS), vec![text]);
    }
}

//! Recursive character splitting over a preference-ordered separator list.
//!
//! Splitting prefers paragraph breaks, then line breaks, then spaces, then
//! raw character windows. Adjacent chunks share a bounded overlap so that
//! retrieval does not lose context at chunk boundaries.
//!
//! Guarantees:
//! - every chunk is at most `chunk_size` characters, except when no separator
//!   can split a region further (then the oversized piece passes through);
//! - the overlap between adjacent chunks is at most `overlap` characters;
//! - concatenating all chunks (overlap-deduplicated) reconstructs the input.

/// Separators in preference order. The empty string means "split anywhere".
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A chunk of the input text together with its byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpan {
    /// Byte offset of the chunk within the input
    pub start: usize,
    pub text: String,
}

/// An indivisible piece produced by recursive splitting. Separators stay
/// attached to the preceding piece so concatenation reconstructs the input.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    offset: usize,
    text: &'a str,
    chars: usize,
}

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkSpan> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    let mut pieces = Vec::new();
    split_recursive(text, 0, &SEPARATORS, chunk_size, &mut pieces);
    merge_pieces(&pieces, chunk_size, overlap)
}

/// Break `text` into pieces of at most `chunk_size` characters, trying each
/// separator in order. A region where no separator applies is emitted whole.
fn split_recursive<'a>(
    text: &'a str,
    offset: usize,
    separators: &[&str],
    chunk_size: usize,
    out: &mut Vec<Piece<'a>>,
) {
    let chars = text.chars().count();
    if chars <= chunk_size {
        if !text.is_empty() {
            out.push(Piece { offset, text, chars });
        }
        return;
    }

    let Some((&sep, rest)) = separators.split_first() else {
        // No separator left that can split this region
        out.push(Piece { offset, text, chars });
        return;
    };

    if sep.is_empty() {
        // Last resort: fixed-size character windows
        let mut start = 0usize;
        let mut count = 0usize;
        for (byte_idx, _) in text.char_indices() {
            if count == chunk_size {
                let piece = &text[start..byte_idx];
                out.push(Piece {
                    offset: offset + start,
                    text: piece,
                    chars: chunk_size,
                });
                start = byte_idx;
                count = 0;
            }
            count += 1;
        }
        if start < text.len() {
            let piece = &text[start..];
            out.push(Piece {
                offset: offset + start,
                text: piece,
                chars: count,
            });
        }
        return;
    }

    let mut found = false;
    let mut prev_end = 0usize;
    for (idx, matched) in text.match_indices(sep) {
        found = true;
        let part_end = idx + matched.len();
        let part = &text[prev_end..part_end];
        if !part.is_empty() {
            split_recursive(part, offset + prev_end, rest, chunk_size, out);
        }
        prev_end = part_end;
    }

    if !found {
        // This separator does not occur here; fall through to the next one
        split_recursive(text, offset, rest, chunk_size, out);
        return;
    }
    if prev_end < text.len() {
        split_recursive(&text[prev_end..], offset + prev_end, rest, chunk_size, out);
    }
}

/// Merge pieces into chunks near `chunk_size`, carrying up to `overlap`
/// trailing characters of each chunk into the next.
fn merge_pieces(pieces: &[Piece<'_>], chunk_size: usize, overlap: usize) -> Vec<ChunkSpan> {
    let mut chunks = Vec::new();
    let mut window: Vec<Piece<'_>> = Vec::new();
    let mut window_chars = 0usize;

    for &piece in pieces {
        if !window.is_empty() && window_chars + piece.chars > chunk_size {
            flush_window(&window, &mut chunks);

            // Seed the next window with the tail of this one, bounded by `overlap`
            let mut kept = Vec::new();
            let mut kept_chars = 0usize;
            for prev in window.iter().rev() {
                if kept_chars + prev.chars > overlap {
                    break;
                }
                kept_chars += prev.chars;
                kept.push(*prev);
            }
            kept.reverse();
            window = kept;
            window_chars = kept_chars;

            // Drop carried pieces that would push the new window over budget
            while !window.is_empty() && window_chars + piece.chars > chunk_size {
                let dropped = window.remove(0);
                window_chars -= dropped.chars;
            }
        }

        window.push(piece);
        window_chars += piece.chars;
    }

    if !window.is_empty() {
        flush_window(&window, &mut chunks);
    }

    chunks
}

fn flush_window(window: &[Piece<'_>], chunks: &mut Vec<ChunkSpan>) {
    let start = window[0].offset;
    let mut text = String::new();
    for piece in window {
        text.push_str(piece.text);
    }
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return;
    }
    chunks.push(ChunkSpan {
        start,
        text: trimmed.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(split_text("", 100, 20).is_empty());
        assert!(split_text("   \n\n  ", 100, 20).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("short paragraph", 100, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short paragraph");
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let para1 = "a".repeat(60);
        let para2 = "b".repeat(60);
        let text = format!("{para1}\n\n{para2}");

        let chunks = split_text(&text, 80, 0);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.starts_with('a'));
        assert!(chunks[1].text.starts_with('b'));
    }

    #[test]
    fn test_size_bound_holds_for_splittable_text() {
        let words: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
        let text = words.join(" ");

        let chunks = split_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.text.chars().count() <= 100,
                "chunk exceeded size: {} chars",
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn test_unsplittable_region_overflows() {
        // A single 150-char word cannot be split by any non-empty separator,
        // but the character-window fallback still bounds it.
        let text = "x".repeat(150);
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.chars().count(), 100);
        assert_eq!(chunks[1].text.chars().count(), 50);
    }

    #[test]
    fn test_overlap_bounded_by_configuration() {
        let words: Vec<String> = (0..100).map(|i| format!("w{i:03}")).collect();
        let text = words.join(" ");

        let overlap = 20;
        let chunks = split_text(&text, 80, overlap);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let prev_end = pair[0].start + pair[0].text.len();
            // Adjacent chunks may share at most `overlap` characters
            assert!(
                prev_end.saturating_sub(pair[1].start) <= overlap,
                "overlap too large: prev_end={} next_start={}",
                prev_end,
                pair[1].start
            );
        }
    }

    #[test]
    fn test_coverage_no_content_loss() {
        let paragraphs: Vec<String> = (0..12)
            .map(|i| format!("paragraph {i} with several words inside it"))
            .collect();
        let text = paragraphs.join("\n\n");

        let chunks = split_text(&text, 90, 15);

        // Every character position of the input (modulo trailing whitespace)
        // must be covered by some chunk.
        let mut covered = vec![false; text.len()];
        for chunk in &chunks {
            for i in chunk.start..chunk.start + chunk.text.len() {
                covered[i] = true;
            }
        }
        for (i, c) in text.char_indices() {
            if !c.is_whitespace() {
                assert!(covered[i], "byte {i} ({c:?}) not covered by any chunk");
            }
        }
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = "first paragraph here\n\nsecond paragraph follows\n\nthird one";
        let chunks = split_text(text, 30, 5);
        for chunk in &chunks {
            let slice = &text[chunk.start..chunk.start + chunk.text.len()];
            assert_eq!(slice, chunk.text);
        }
    }

    #[test]
    fn test_cjk_text_splits_on_char_boundaries() {
        let text = "代码克隆检测".repeat(40);
        let chunks = split_text(&text, 50, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 50);
        }
    }

    #[test]
    fn test_zero_chunk_size_yields_nothing() {
        assert!(split_text("some text", 0, 0).is_empty());
    }
}

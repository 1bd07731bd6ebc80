//! Text normalization applied to every extracted document before chunking.

/// Lines shorter than this (after trimming) carry too little signal to index.
const MIN_LINE_CHARS: usize = 10;

/// Characters allowed through cleaning: word characters, CJK ideographs,
/// whitespace, and common punctuation. Everything else becomes a space.
fn is_allowed(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | '!'
                | '?'
                | ';'
                | ':'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '"'
                | '\''
                | '-'
                | '，'
                | '。'
                | '！'
                | '？'
                | '；'
                | '：'
                | '（'
                | '）'
        )
}

/// Normalize extracted text: strip disallowed characters, collapse runs of
/// spaces and tabs, and drop lines shorter than the minimum length.
pub fn clean_text(text: &str) -> String {
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut cleaned = String::with_capacity(line.len());
        let mut last_was_space = false;

        for c in line.chars() {
            let c = if is_allowed(c) { c } else { ' ' };
            if c == ' ' || c == '\t' {
                if !last_was_space {
                    cleaned.push(' ');
                }
                last_was_space = true;
            } else {
                cleaned.push(c);
                last_was_space = false;
            }
        }

        let cleaned = cleaned.trim();
        if cleaned.chars().count() > MIN_LINE_CHARS {
            lines.push(cleaned.to_string());
        }
    }

    lines.join("\n")
}

//! Message content heuristics.
//!
//! Plain substring and character scans; nothing here needs a parser.
//! Every group message runs through these predicates to grow the
//! behavior counters that later decide the pet's type at TEEN.

// ---------------------------------------------------------------------------
// Profanity
// ---------------------------------------------------------------------------

/// Stems counted as profanity, matched as lowercase substrings so
/// inflected forms are caught too.
const BAD_WORDS: [&str; 8] = [
    "fuck", "shit", "damn", "bitch", "crap", "bastard", "asshole", "piss",
];

/// Whether the text contains any profanity stem, case-insensitively.
#[must_use]
pub fn contains_profanity(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BAD_WORDS.iter().any(|stem| lowered.contains(stem))
}

// ---------------------------------------------------------------------------
// Shouting
// ---------------------------------------------------------------------------

/// Texts shorter than this are never counted as shouting.
const CAPS_MIN_CHARS: usize = 10;

/// Whether the text is mostly upper-case.
///
/// Needs at least [`CAPS_MIN_CHARS`] characters and at least one letter;
/// counts as shouting when strictly more than 70 percent of the letters
/// are upper-case. Non-letters are ignored by the ratio.
#[must_use]
pub fn is_mostly_caps(text: &str) -> bool {
    if text.chars().count() < CAPS_MIN_CHARS {
        return false;
    }
    let (letters, upper) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(total, upper), c| {
            (total + 1, upper + usize::from(c.is_uppercase()))
        });
    letters > 0 && upper * 10 > letters * 7
}

// ---------------------------------------------------------------------------
// Code snippets
// ---------------------------------------------------------------------------

/// Whether the text looks like a code snippet.
///
/// A handful of loose signatures: a fenced block, a declaration keyword
/// followed by a name (with an `=` for `const`/`let`/`var`, so "let me
/// know" stays plain chat), an empty call like `foo()`, an object
/// literal opening, or a matched markup tag pair.
#[must_use]
pub fn looks_like_code(text: &str) -> bool {
    text.contains("```")
        || keyword_signature(text)
        || empty_call(text)
        || object_literal(text)
        || markup_pair(text)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn keyword_signature(text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        match *token {
            "def" | "function" | "class" => {
                let named = tokens
                    .get(i + 1)
                    .is_some_and(|next| next.starts_with(is_word_char));
                if named {
                    return true;
                }
            }
            "import" => {
                if tokens.get(i + 1).is_some() {
                    return true;
                }
            }
            "const" | "let" | "var" => {
                if assignment_follows(&tokens, i) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// `kw name = ...` in any spacing variant, e.g. `let x = 1` or `let x=1`.
fn assignment_follows(tokens: &[&str], keyword_at: usize) -> bool {
    let Some(next) = tokens.get(keyword_at + 1) else {
        return false;
    };
    match next.find('=') {
        // `let x=1`: name and assignment share a token.
        Some(pos) if pos > 0 => next[..pos].chars().all(is_word_char),
        Some(_) => false,
        // `let x = 1` or `let x =1`: the `=` starts a later token.
        None => {
            next.chars().all(is_word_char)
                && tokens
                    .get(keyword_at + 2)
                    .is_some_and(|after| after.starts_with('='))
        }
    }
}

/// A word character immediately followed by `()`.
fn empty_call(text: &str) -> bool {
    let mut prev = ' ';
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '(' && chars.peek() == Some(&')') && is_word_char(prev) {
            return true;
        }
        prev = c;
    }
    false
}

/// `{ key: value` with optional whitespace.
fn object_literal(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if *c != '{' {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        let key_start = j;
        while j < chars.len() && is_word_char(chars[j]) {
            j += 1;
        }
        if j == key_start || j >= chars.len() || chars[j] != ':' {
            continue;
        }
        let mut k = j + 1;
        while k < chars.len() && chars[k].is_whitespace() {
            k += 1;
        }
        if k < chars.len() && is_word_char(chars[k]) {
            return true;
        }
    }
    false
}

/// `<tag>` followed somewhere later by `</tag2>`.
fn markup_pair(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    match tag_end(&chars, 0, false) {
        Some(open_end) => tag_end(&chars, open_end, true).is_some(),
        None => false,
    }
}

/// Index just past a `<name>` (or `</name>` when `closing`) at or after
/// `from`, if one exists.
fn tag_end(chars: &[char], from: usize, closing: bool) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '<' {
            let mut j = i + 1;
            if closing {
                if j < chars.len() && chars[j] == '/' {
                    j += 1;
                } else {
                    i += 1;
                    continue;
                }
            }
            let name_start = j;
            while j < chars.len() && is_word_char(chars[j]) {
                j += 1;
            }
            if j > name_start && j < chars.len() && chars[j] == '>' {
                return Some(j + 1);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profanity_matches_stems_case_insensitively() {
        assert!(contains_profanity("well SHIT happens"));
        assert!(contains_profanity("absolute bullshit"));
        assert!(!contains_profanity("what a lovely day"));
    }

    #[test]
    fn short_shouting_is_not_counted() {
        assert!(!is_mostly_caps("WTF!!"));
        assert!(is_mostly_caps("WHY IS THIS HAPPENING"));
    }

    #[test]
    fn caps_ratio_is_strictly_above_seventy_percent() {
        // Ten letters, exactly seven upper: not shouting.
        assert!(!is_mostly_caps("ABCDEFGhij"));
        // Eight upper crosses the line.
        assert!(is_mostly_caps("ABCDEFGHij"));
    }

    #[test]
    fn digits_and_punctuation_do_not_dilute_the_ratio() {
        assert!(is_mostly_caps("STOP!!! 111 NOW"));
        assert!(!is_mostly_caps("1234567890 ..."));
    }

    #[test]
    fn cyrillic_shouting_counts_too() {
        assert!(is_mostly_caps("ПРИВЕТ КАК ДЕЛА"));
    }

    #[test]
    fn declaration_keywords_need_a_name() {
        assert!(looks_like_code("def handle_message(update):"));
        assert!(looks_like_code("function greet please"));
        assert!(looks_like_code("import asyncio"));
        assert!(!looks_like_code("def"));
    }

    #[test]
    fn let_needs_an_assignment_to_count() {
        assert!(!looks_like_code("let me know when you arrive"));
        assert!(looks_like_code("let x = 5"));
        assert!(looks_like_code("const answer=42"));
        assert!(looks_like_code("var y =3"));
    }

    #[test]
    fn structural_signatures() {
        assert!(looks_like_code("just run main() again"));
        assert!(looks_like_code("{ name: value }"));
        assert!(looks_like_code("<b>bold</b>"));
        assert!(looks_like_code("```\nfn main() {}\n```"));
    }

    #[test]
    fn plain_chat_is_not_code() {
        assert!(!looks_like_code("see you at 5 (maybe)"));
        assert!(!looks_like_code("i am < 10 > 5 kinda"));
        assert!(!looks_like_code("brackets { } everywhere"));
    }
}

//! Character-class driven line splitters.
//!
//! Both splitters are string-literal aware: characters between quotes are
//! copied verbatim and never terminate or split a token. Both also emit
//! empty bookkeeping tokens at boundaries; downstream consumers are
//! expected to skip them.

use ahash::AHashMap;

/// The string-literal delimiter.
pub const STRING_QUOTE: char = '"';

/// Surround operators are always isolated in their own token.
const SURROUND_OPS: [char; 4] = ['(', ')', '[', ']'];

/// Removes leading and trailing spaces and tabs.
pub fn trim(text: &str) -> &str {
    text.trim_matches(|c| c == ' ' || c == '\t')
}

/// Splits an expression into lexical tokens by operator boundaries.
///
/// Tokens fall into four classes:
/// - string literals, kept whole including any operator characters;
/// - surround operators `( ) [ ]`, isolated in their own token
///   (`[47]` -> `[`, `47`, `]`);
/// - punctuation runs, fused while punctuation continues (`+=` stays one
///   token) but split at an alphanumeric border (`+=56` -> `+=`, `56`);
/// - alphanumeric/underscore runs, split at a punctuation border
///   (`test+552` -> `test`, `+`, `552`).
///
/// One carve-out from the punctuation rule: a dot extending a digits-only
/// token stays in the token, so decimal literals like `3.14` survive as a
/// single token while `p.x` still splits into a member access.
///
/// Whitespace terminates the current token. The bookkeeping leaves empty
/// tokens behind; callers filter them.
pub fn operator_split(expr: &str) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut has_alnum = false;
    let mut has_op = false;
    let mut in_string = false;
    for ch in expr.chars() {
        if ch == STRING_QUOTE {
            if has_alnum || has_op {
                has_alnum = false;
                has_op = false;
                out.push(String::new());
            }
            in_string = !in_string;
            last(&mut out).push(ch);
        } else if in_string {
            last(&mut out).push(ch);
        } else if ch == '.' && !last(&mut out).is_empty() && last(&mut out).chars().all(|c| c.is_ascii_digit()) {
            // Decimal literal: the dot continues the digit run.
            last(&mut out).push(ch);
        } else if ch.is_alphanumeric() || ch == '_' {
            if has_op {
                out.push(String::new());
                has_op = false;
            }
            last(&mut out).push(ch);
            has_alnum = true;
        } else if SURROUND_OPS.contains(&ch) {
            if last(&mut out).is_empty() {
                *last(&mut out) = ch.to_string();
            } else {
                out.push(ch.to_string());
            }
            out.push(String::new());
            has_alnum = false;
            has_op = false;
        } else if ch.is_ascii_punctuation() {
            if has_alnum {
                out.push(String::new());
                has_alnum = false;
            }
            last(&mut out).push(ch);
            has_op = true;
        } else if !last(&mut out).is_empty() {
            has_alnum = false;
            has_op = false;
            out.push(String::new());
        }
    }
    out
}

fn last(out: &mut Vec<String>) -> &mut String {
    out.last_mut().expect("splitter keeps one open token")
}

/// Per-character split behavior for [`filter_split`]: which characters
/// delimit, and whether a delimiter is discarded or kept as its own token.
#[derive(Debug, Clone, Default)]
pub struct SplitFilter {
    map: AHashMap<char, bool>,
}

impl SplitFilter {
    /// Every character of `chars` delimits and is discarded.
    #[must_use]
    pub fn skip(chars: &str) -> Self {
        let mut filter = Self::default();
        for ch in chars.chars() {
            filter.map.insert(ch, false);
        }
        filter
    }

    /// Every character of `chars` delimits; `keeps[i]` says whether the
    /// i-th character is kept as its own token, `default_keep` covers the
    /// rest.
    #[must_use]
    pub fn with_keeps(chars: &str, keeps: &[bool], default_keep: bool) -> Self {
        let mut filter = Self::default();
        for (i, ch) in chars.chars().enumerate() {
            filter.map.insert(ch, keeps.get(i).copied().unwrap_or(default_keep));
        }
        filter
    }

    /// `Some(keep)` when `ch` delimits.
    fn check(&self, ch: char) -> Option<bool> {
        self.map.get(&ch).copied()
    }
}

/// Splits `input` at the filter's delimiter characters.
///
/// With `honor_strings` set, delimiters between quotes are suppressed and
/// the quoted run is copied verbatim; `keep_quote` controls whether the
/// quote characters themselves stay in the token.
pub fn filter_split(input: &str, filter: &SplitFilter, honor_strings: bool, keep_quote: bool) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut in_string = false;
    for ch in input.chars() {
        if honor_strings && ch == STRING_QUOTE {
            in_string = !in_string;
            if keep_quote {
                last(&mut out).push(ch);
            }
        } else if in_string {
            last(&mut out).push(ch);
        } else if let Some(keep) = filter.check(ch) {
            if !last(&mut out).is_empty() {
                out.push(String::new());
            }
            if keep {
                *last(&mut out) = ch.to_string();
                out.push(String::new());
            }
        } else {
            last(&mut out).push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(expr: &str) -> Vec<String> {
        operator_split(expr).into_iter().filter(|t| !t.is_empty()).collect()
    }

    #[test]
    fn surround_operators_are_isolated() {
        assert_eq!(split("[47]"), ["[", "47", "]"]);
        assert_eq!(split("(a)"), ["(", "a", ")"]);
    }

    #[test]
    fn punctuation_fuses_until_an_alnum_border() {
        assert_eq!(split("+=56"), ["+=", "56"]);
        assert_eq!(split("test+552"), ["test", "+", "552"]);
        assert_eq!(split("a+b*2"), ["a", "+", "b", "*", "2"]);
    }

    #[test]
    fn string_literals_are_kept_whole() {
        assert_eq!(split("s = \"a + (b)\""), ["s", "=", "\"a + (b)\""]);
    }

    /// An unterminated quote runs to the end of the line.
    #[test]
    fn unterminated_string_is_open_ended() {
        assert_eq!(split("s = \"oops"), ["s", "=", "\"oops"]);
    }

    #[test]
    fn decimal_literals_stay_whole() {
        assert_eq!(split("pi = 3.14"), ["pi", "=", "3.14"]);
        assert_eq!(split("a+3.14"), ["a", "+", "3.14"]);
        // Member access still splits.
        assert_eq!(split("p.x"), ["p", ".", "x"]);
    }

    #[test]
    fn whitespace_terminates_tokens() {
        assert_eq!(split("int a = 5"), ["int", "a", "=", "5"]);
    }

    /// Segmenting any well-formed line yields balanced parentheses.
    #[test]
    fn paren_tokens_balance() {
        for line in ["a = (b + (c * d)) + (e)", "f = ((((x))))"] {
            let tokens = split(line);
            let open = tokens.iter().filter(|t| *t == "(").count();
            let close = tokens.iter().filter(|t| *t == ")").count();
            assert_eq!(open, close);
        }
    }

    #[test]
    fn filter_split_keeps_and_skips() {
        let filter = SplitFilter::with_keeps(" =", &[false], true);
        let tokens: Vec<String> = filter_split("a = 5", &filter, false, false)
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(tokens, ["a", "=", "5"]);
    }

    #[test]
    fn filter_split_honors_strings() {
        let filter = SplitFilter::with_keeps(" =", &[false], true);
        let kept: Vec<String> = filter_split("s = \"a = b\"", &filter, true, true)
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(kept, ["s", "=", "\"a = b\""]);

        let stripped: Vec<String> = filter_split("s = \"a = b\"", &filter, true, false)
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(stripped, ["s", "=", "a = b"]);
    }
}

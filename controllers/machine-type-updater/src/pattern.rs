//! Shell pattern matching for machine types.
//!
//! Patterns follow the slash-separated path matching used across the
//! Kubernetes tooling:
//!
//! - `*` matches any run of characters other than `/`
//! - `?` matches a single character other than `/`
//! - `[...]` matches a class of characters, `[^...]` its complement; classes
//!   hold single characters and `lo-hi` ranges
//! - `\c` matches the character `c` literally, also inside classes
//!
//! Matching is case sensitive and must cover the whole value. A malformed
//! pattern is reported as an error even when the value is empty.

use thiserror::Error;

const SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("syntax error in pattern")]
pub struct PatternError;

/// Reports whether `name` matches the shell pattern `pattern`.
pub fn match_pattern(pattern: &str, name: &str) -> Result<bool, PatternError> {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let mut pattern = pattern.as_slice();
    let mut name = name.as_slice();

    'chunks: while !pattern.is_empty() {
        let (star, chunk, rest) = scan_chunk(pattern);
        pattern = rest;

        // Trailing star takes the rest of the value, unless it spans a separator
        if star && chunk.is_empty() {
            return Ok(!name.contains(&SEPARATOR));
        }

        // The last chunk has to consume the whole value
        if let Some(rest) = match_chunk(chunk, name)? {
            if rest.is_empty() || !pattern.is_empty() {
                name = rest;
                continue;
            }
        }

        if star {
            // Let the star absorb more, one character at a time, never a separator
            let mut skip = 0;
            while skip < name.len() && name[skip] != SEPARATOR {
                if let Some(rest) = match_chunk(chunk, &name[skip + 1..])? {
                    if rest.is_empty() || !pattern.is_empty() {
                        name = rest;
                        continue 'chunks;
                    }
                }
                skip += 1;
            }
        }

        // No match; still reject a malformed remainder
        while !pattern.is_empty() {
            let (_, chunk, rest) = scan_chunk(pattern);
            pattern = rest;
            match_chunk(chunk, &[])?;
        }
        return Ok(false);
    }

    Ok(name.is_empty())
}

/// Splits off leading stars and the literal chunk up to the next star.
fn scan_chunk(pattern: &[char]) -> (bool, &[char], &[char]) {
    let mut pattern = pattern;
    let mut star = false;
    while let Some((&'*', rest)) = pattern.split_first() {
        pattern = rest;
        star = true;
    }

    let mut in_class = false;
    let mut end = 0;
    while end < pattern.len() {
        match pattern[end] {
            '\\' if end + 1 < pattern.len() => end += 1,
            '[' => in_class = true,
            ']' => in_class = false,
            '*' if !in_class => break,
            _ => {}
        }
        end += 1;
    }
    (star, &pattern[..end], &pattern[end..])
}

/// Matches a star-free chunk against the start of `value`, returning the
/// unmatched remainder.
///
/// The whole chunk is parsed even after a mismatch so syntax errors are
/// always reported.
fn match_chunk<'a>(chunk: &[char], value: &'a [char]) -> Result<Option<&'a [char]>, PatternError> {
    let mut chunk = chunk;
    let mut value = value;
    let mut failed = false;

    while let Some(&c) = chunk.first() {
        if !failed && value.is_empty() {
            failed = true;
        }
        match c {
            '[' => {
                let mut current = '\0';
                if !failed {
                    current = value[0];
                    value = &value[1..];
                }
                chunk = &chunk[1..];

                let negated = chunk.first() == Some(&'^');
                if negated {
                    chunk = &chunk[1..];
                }

                let mut matched = false;
                let mut ranges = 0;
                loop {
                    if ranges > 0 && chunk.first() == Some(&']') {
                        chunk = &chunk[1..];
                        break;
                    }
                    let (lo, rest) = class_char(chunk)?;
                    chunk = rest;
                    let mut hi = lo;
                    if chunk.first() == Some(&'-') {
                        let (end, rest) = class_char(&chunk[1..])?;
                        hi = end;
                        chunk = rest;
                    }
                    if lo <= current && current <= hi {
                        matched = true;
                    }
                    ranges += 1;
                }
                if matched == negated {
                    failed = true;
                }
            }
            '?' => {
                if !failed {
                    if value[0] == SEPARATOR {
                        failed = true;
                    }
                    value = &value[1..];
                }
                chunk = &chunk[1..];
            }
            _ => {
                let literal = if c == '\\' {
                    chunk = &chunk[1..];
                    *chunk.first().ok_or(PatternError)?
                } else {
                    c
                };
                if !failed {
                    if literal != value[0] {
                        failed = true;
                    }
                    value = &value[1..];
                }
                chunk = &chunk[1..];
            }
        }
    }

    Ok((!failed).then_some(value))
}

/// Reads one, possibly escaped, character of a class. The class must not
/// end right after it.
fn class_char(chunk: &[char]) -> Result<(char, &[char]), PatternError> {
    let chunk = match chunk.first() {
        None | Some('-') | Some(']') => return Err(PatternError),
        Some('\\') => &chunk[1..],
        Some(_) => chunk,
    };
    match chunk.split_first() {
        Some((&c, rest)) if !rest.is_empty() => Ok((c, rest)),
        _ => Err(PatternError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_table() {
        let cases: &[(&str, &str, bool)] = &[
            ("abc", "abc", true),
            ("*", "abc", true),
            ("*c", "abc", true),
            ("a*", "a", true),
            ("a*", "abc", true),
            ("a*", "ab/c", false),
            ("a*/b", "abc/b", true),
            ("a*/b", "a/c/b", false),
            ("a*b*c*d*e*/f", "axbxcxdxe/f", true),
            ("a*b*c*d*e*/f", "axbxcxdxexxx/f", true),
            ("a*b*c*d*e*/f", "axbxcxdxe/xxx/f", false),
            ("a*b*c*d*e*/f", "axbxcxdxexxx/fff", false),
            ("a*b?c*x", "abxbbxdbxebxczzx", true),
            ("a*b?c*x", "abxbbxdbxebxczzy", false),
            ("ab[c]", "abc", true),
            ("ab[b-d]", "abc", true),
            ("ab[e-g]", "abc", false),
            ("ab[^c]", "abc", false),
            ("ab[^b-d]", "abc", false),
            ("ab[^e-g]", "abc", true),
            ("a\\*b", "a*b", true),
            ("a\\*b", "ab", false),
            ("a?b", "a☺b", true),
            ("a[^a]b", "a☺b", true),
            ("a???b", "a☺b", false),
            ("a[^a][^a][^a]b", "a☺b", false),
            ("[a-ζ]*", "α", true),
            ("*[a-ζ]", "A", false),
            ("a?b", "a/b", false),
            ("a*b", "a/b", false),
            ("[\\]a]", "]", true),
            ("[\\-]", "-", true),
            ("[x\\-]", "x", true),
            ("[x\\-]", "-", true),
            ("[x\\-]", "z", false),
            ("[\\-x]", "x", true),
            ("[\\-x]", "-", true),
            ("[\\-x]", "a", false),
            ("*x", "xxx", true),
            ("**", "abc", true),
        ];
        for (pattern, name, expected) in cases {
            assert_eq!(
                match_pattern(pattern, name),
                Ok(*expected),
                "pattern {:?} against {:?}",
                pattern,
                name
            );
        }
    }

    #[test]
    fn test_malformed_patterns() {
        let cases: &[(&str, &str)] = &[
            ("[]a]", "]"),
            ("[-]", "-"),
            ("[x-]", "x"),
            ("[x-]", "z"),
            ("[-x]", "a"),
            ("\\", "a"),
            ("[a-b-c]", "a"),
            ("[", "a"),
            ("[^", "a"),
            ("[^bc", "a"),
            ("a[", "a"),
            ("a[", "ab"),
            ("a[", "x"),
            ("a/b[", "x"),
            ("[--", ""),
            ("*glob8.[", ""),
        ];
        for (pattern, name) in cases {
            assert_eq!(
                match_pattern(pattern, name),
                Err(PatternError),
                "pattern {:?} against {:?}",
                pattern,
                name
            );
        }
    }

    #[test]
    fn test_valid_patterns_against_empty_value() {
        for pattern in ["*glob8.*", "pc-q35-rhel[^78].*", "pc-**", "pc\\*", "?"] {
            assert!(match_pattern(pattern, "").is_ok(), "{:?}", pattern);
        }
        assert_eq!(match_pattern("*", ""), Ok(true));
        assert_eq!(match_pattern("?", ""), Ok(false));
    }
}

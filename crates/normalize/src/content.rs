use std::borrow::Cow;
use std::path::Path;

use crate::{LineEnding, LineEndingPolicy};

/// Number of leading bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8192;

/// Returns `true` when `data` looks binary.
///
/// The heuristic inspects at most the first [`BINARY_SNIFF_LEN`] bytes for a
/// NUL byte, matching git's own text detection. Binary files that carry no
/// early NUL slip through as text; that risk is accepted.
#[must_use]
pub fn is_binary(data: &[u8]) -> bool {
    let window = &data[..data.len().min(BINARY_SNIFF_LEN)];
    window.contains(&0)
}

/// Normalizes the line terminators of `data` to `ending`.
///
/// Binary input is returned unchanged. Text input is first collapsed to bare
/// `LF` (every `CRLF` pair and every lone `CR` become `LF`), then expanded
/// back to `CRLF` when requested. Collapsing first makes the transform
/// idempotent regardless of the terminator mix in the input.
///
/// Already-normalized input is returned borrowed, so callers can cheaply
/// detect whether a rewrite is needed:
///
/// ```
/// use normalize::{LineEnding, normalize_bytes};
/// use std::borrow::Cow;
///
/// let out = normalize_bytes(b"a\r\nb\n", LineEnding::Lf);
/// assert_eq!(out.as_ref(), b"a\nb\n");
///
/// assert!(matches!(
///     normalize_bytes(b"a\nb\n", LineEnding::Lf),
///     Cow::Borrowed(_)
/// ));
/// ```
#[must_use]
pub fn normalize_bytes(data: &[u8], ending: LineEnding) -> Cow<'_, [u8]> {
    if is_binary(data) {
        return Cow::Borrowed(data);
    }
    match ending {
        LineEnding::Lf => {
            if !data.contains(&b'\r') {
                return Cow::Borrowed(data);
            }
            Cow::Owned(collapse_to_lf(data))
        }
        LineEnding::Crlf => {
            if is_strict_crlf(data) {
                return Cow::Borrowed(data);
            }
            let collapsed = collapse_to_lf(data);
            Cow::Owned(expand_to_crlf(&collapsed))
        }
    }
}

/// Normalizes `data` for the file at `path` under `policy`.
///
/// This is the composed form used by the tree pass: the policy resolves the
/// terminator for the filename and [`normalize_bytes`] performs the rewrite.
#[must_use]
pub fn normalize_content<'a>(
    data: &'a [u8],
    path: &Path,
    policy: &LineEndingPolicy,
) -> Cow<'a, [u8]> {
    normalize_bytes(data, policy.resolve(path))
}

/// Replaces every `CRLF` pair and every remaining lone `CR` with `LF`.
fn collapse_to_lf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == b'\r' {
            out.push(b'\n');
            if data.get(i + 1) == Some(&b'\n') {
                i += 1;
            }
        } else {
            out.push(data[i]);
        }
        i += 1;
    }
    out
}

/// Expands every `LF` in collapsed input to `CRLF`.
fn expand_to_crlf(collapsed: &[u8]) -> Vec<u8> {
    let newlines = collapsed.iter().filter(|b| **b == b'\n').count();
    let mut out = Vec::with_capacity(collapsed.len() + newlines);
    for &byte in collapsed {
        if byte == b'\n' {
            out.push(b'\r');
        }
        out.push(byte);
    }
    out
}

/// Returns `true` when every `LF` is preceded by `CR` and every `CR` is
/// followed by `LF`.
fn is_strict_crlf(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'\r' => {
                if data.get(i + 1) != Some(&b'\n') {
                    return false;
                }
                i += 1;
            }
            b'\n' => return false,
            _ => {}
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn collapses_mixed_terminators_to_lf() {
        let out = normalize_bytes(b"a\r\nb\rc\nd", LineEnding::Lf);
        assert_eq!(out.as_ref(), b"a\nb\nc\nd");
    }

    #[test]
    fn expands_to_crlf_from_any_mix() {
        let out = normalize_bytes(b"a\nb\r\nc\r", LineEnding::Crlf);
        assert_eq!(out.as_ref(), b"a\r\nb\r\nc\r\n");
    }

    #[test]
    fn scenario_bare_lf_to_crlf() {
        let out = normalize_bytes(b"a\nb\n", LineEnding::Crlf);
        assert_eq!(out.as_ref(), b"a\r\nb\r\n");
    }

    #[test]
    fn scenario_mixed_to_lf() {
        let out = normalize_bytes(b"hello\r\nworld\n", LineEnding::Lf);
        assert_eq!(out.as_ref(), b"hello\nworld\n");
    }

    #[test]
    fn nul_in_sniff_window_passes_through() {
        let data = b"line one\n\x00binary\r\n";
        let out = normalize_bytes(data, LineEnding::Crlf);
        assert_eq!(out.as_ref(), data);
        assert!(is_binary(data));
    }

    #[test]
    fn nul_beyond_sniff_window_is_treated_as_text() {
        let mut data = vec![b'a'; BINARY_SNIFF_LEN];
        data.push(0);
        assert!(!is_binary(&data));
    }

    #[test]
    fn empty_input_is_unchanged() {
        assert_eq!(normalize_bytes(b"", LineEnding::Lf).as_ref(), b"");
        assert_eq!(normalize_bytes(b"", LineEnding::Crlf).as_ref(), b"");
    }

    #[test]
    fn already_normalized_input_is_borrowed() {
        assert!(matches!(
            normalize_bytes(b"a\r\nb\r\n", LineEnding::Crlf),
            std::borrow::Cow::Borrowed(_)
        ));
        assert!(matches!(
            normalize_bytes(b"a\nb\n", LineEnding::Lf),
            std::borrow::Cow::Borrowed(_)
        ));
    }

    #[test]
    fn policy_resolution_selects_the_transform() {
        let policy = LineEndingPolicy::default();
        let crlf = normalize_content(b"a\nb\n", Path::new("CMakeLists.txt"), &policy);
        assert_eq!(crlf.as_ref(), b"a\r\nb\r\n");
        let lf = normalize_content(b"a\r\nb\r\n", Path::new("README.md"), &policy);
        assert_eq!(lf.as_ref(), b"a\nb\n");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            for ending in [LineEnding::Lf, LineEnding::Crlf] {
                let once = normalize_bytes(&data, ending).into_owned();
                let twice = normalize_bytes(&once, ending).into_owned();
                prop_assert_eq!(&once, &twice);
            }
        }

        #[test]
        fn lf_output_has_no_carriage_return(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assume!(!is_binary(&data));
            let out = normalize_bytes(&data, LineEnding::Lf);
            prop_assert!(!out.contains(&b'\r'));
        }

        #[test]
        fn crlf_output_pairs_every_newline(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assume!(!is_binary(&data));
            let out = normalize_bytes(&data, LineEnding::Crlf);
            for (i, &b) in out.iter().enumerate() {
                if b == b'\n' {
                    prop_assert!(i > 0 && out[i - 1] == b'\r');
                }
                if b == b'\r' {
                    prop_assert!(out.get(i + 1) == Some(&b'\n'));
                }
            }
        }

        #[test]
        fn binary_input_is_identity(head in proptest::collection::vec(any::<u8>(), 0..64),
                                    tail in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut data = head;
            data.push(0);
            data.extend(tail);
            for ending in [LineEnding::Lf, LineEnding::Crlf] {
                let out = normalize_bytes(&data, ending);
                prop_assert_eq!(out.as_ref(), data.as_slice());
            }
        }
    }
}

//! A hand-rolled recursive-descent JSON decoder.
//!
//! This is a minimal, single-pass parser tuned for reading glTF documents,
//! not a general-purpose JSON library: it has no boolean literal support
//! (`true`/`false`/`null` tokens are not recognized — see [`Value`]) and a
//! leading-zero numeral is read as an octal literal rather than rejected.
//! Both quirks are deliberate ports of the engine this crate replaces, not
//! bugs; see the doc comments on [`parser::parse`] and [`Value`].
//!
//! ```rust
//! use scene_json::parse;
//!
//! let value = parse("inline", br#"{"asset": {"version": "2.0"}}"#).unwrap();
//! let asset = value.as_object().unwrap().get("asset").unwrap();
//! assert_eq!(
//!     asset.as_object().unwrap().get("version").unwrap().as_str().unwrap(),
//!     "2.0"
//! );
//! ```

mod error;
mod location;
mod parser;
mod value;

pub use error::JsonError;
pub use location::SourceLocation;
pub use parser::parse;
pub use value::{JsonObject, JsonString, Number, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_object_and_array() {
        let value = parse("t", br#"{"a": [1, 2.5, "x"], "b": {}}"#).unwrap();
        let obj = value.as_object().unwrap();
        let a = obj.get("a").unwrap().as_array().unwrap();
        assert_eq!(a[0].as_number().unwrap().strict_int(), Some(1));
        assert_eq!(a[1].as_number().unwrap().strict_float(), Some(2.5));
        assert_eq!(a[2].as_str().unwrap(), "x");
        assert!(obj.get("b").unwrap().as_object().unwrap().is_empty());
    }

    #[test]
    fn integer_has_no_dot_or_exponent() {
        let value = parse("t", b"42").unwrap();
        assert_eq!(value.as_number().unwrap().strict_int(), Some(42));
    }

    #[test]
    fn exponent_forces_float_even_without_dot() {
        let value = parse("t", b"5e2").unwrap();
        assert_eq!(value.as_number().unwrap().strict_float(), Some(500.0));
    }

    #[test]
    fn negative_exponent_divides() {
        let value = parse("t", b"5e-1").unwrap();
        assert_eq!(value.as_number().unwrap().strict_float(), Some(0.5));
    }

    #[test]
    fn leading_zero_is_octal_and_does_not_continue_into_fraction() {
        // "017.5" parses the octal run "017" (= 15) and stops there; the
        // parser never looks at the trailing ".5" because a single call to
        // `parse` reads exactly one value and does not require the input
        // be fully consumed.
        let value = parse("t", b"017.5").unwrap();
        assert_eq!(value.as_number().unwrap().strict_int(), Some(15));
    }

    #[test]
    fn unicode_escape_is_two_raw_bytes_not_utf8() {
        // `é` does not decode to the UTF-8 encoding of U+00E9 ('é');
        // it pushes the two hex-pair bytes 0x00 and 0xe9 verbatim.
        let value = parse("t", "\"\\u00e9\"".as_bytes()).unwrap();
        let s = value.as_str().unwrap();
        assert_eq!(s.as_bytes(), &[0x00, 0xe9]);
    }

    #[test]
    fn duplicate_object_key_last_wins_in_place() {
        let value = parse("t", br#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let obj = value.as_object().unwrap();
        let keys: Vec<_> = obj.iter().map(|(k, _)| k.as_str_lossy().to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(obj.get("a").unwrap().as_number().unwrap().strict_int(), Some(3));
    }

    #[test]
    fn trailing_comma_in_array_is_an_error() {
        assert!(parse("t", b"[1, 2,]").is_err());
    }

    #[test]
    fn empty_array_and_object_are_allowed() {
        assert!(parse("t", b"[]").unwrap().as_array().unwrap().is_empty());
        assert!(parse("t", b"{}").unwrap().as_object().unwrap().is_empty());
    }

    #[test]
    fn error_reports_line_and_column() {
        let err = parse("doc.json", b"{\n  \"a\": ,\n}").unwrap_err();
        assert_eq!(err.location.file.as_ref(), "doc.json");
        assert_eq!(err.location.line, 2);
    }
}

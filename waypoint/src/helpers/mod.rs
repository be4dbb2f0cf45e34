//! Helpers for decoding path data before it is matched.

use log::trace;
use percent_encoding::percent_decode_str;

use crate::error::DecodeError;

/// Represents data that has been successfully percent decoded and is valid UTF-8
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PercentDecoded {
    val: String,
}

impl PercentDecoded {
    /// Attempt to decode data that has been provided in a percent encoded format and ensure that
    /// the result is valid UTF-8.
    ///
    /// On success, the decoded data is returned as a `PercentDecoded` value, which allows a
    /// compile-time check that the decode has occurred in places where it's assumed to have
    /// occurred.
    ///
    /// A `%` which is not followed by two hex digits is rejected rather than passed through.
    pub fn new(raw: &str) -> Result<Self, DecodeError> {
        if !has_valid_escapes(raw) {
            trace!(" percent_decode: malformed escape, src: {}", raw);
            return Err(DecodeError {
                segment: raw.to_owned(),
            });
        }

        match percent_decode_str(raw).decode_utf8() {
            Ok(pd) => {
                trace!(" percent_decode: {}, src: {}", pd, raw);
                Ok(PercentDecoded {
                    val: pd.into_owned(),
                })
            }
            Err(_) => {
                trace!(" percent_decode: error, src: {}", raw);
                Err(DecodeError {
                    segment: raw.to_owned(),
                })
            }
        }
    }

    /// Consumes the wrapper, yielding the decoded text.
    pub fn into_string(self) -> String {
        self.val
    }
}

impl AsRef<str> for PercentDecoded {
    fn as_ref(&self) -> &str {
        &self.val
    }
}

fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_valid_percent_decode() {
        let pd = PercentDecoded::new("%41+%42%2B%63%20%64").unwrap();
        assert_eq!("A+B+c d", pd.as_ref());
    }

    #[test]
    fn rejects_truncated_escape() {
        assert!(PercentDecoded::new("abc%4").is_err());
        assert!(PercentDecoded::new("%zz").is_err());
        assert!(PercentDecoded::new("100%").is_err());
    }

    #[test]
    fn rejects_invalid_utf8() {
        let e = PercentDecoded::new("%ff%fe").unwrap_err();
        assert_eq!(e.segment, "%ff%fe");
    }
}

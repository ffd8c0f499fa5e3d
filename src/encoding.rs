//! Character-encoding resolution for fetched pages.
//!
//! Many Korean outlets still serve EUC-KR, often without a charset in the
//! `Content-Type` header or with the generic `ISO-8859-1` default that some
//! servers emit. Decoding such a page as Latin-1 or UTF-8 garbles the body,
//! so the charset is resolved in this order:
//!
//! 1. byte order mark
//! 2. the declared charset, unless it is the generic Latin-1 fallback
//! 3. a `<meta charset>` prescan of the first [`PRESCAN_BYTES`] bytes
//! 4. statistical sniffing with `chardetng`

use crate::models::RawDocument;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// How much of the document the `<meta charset>` prescan looks at.
pub const PRESCAN_BYTES: usize = 1024;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).unwrap()
});

/// Decode a fetched page into a UTF-8 string.
///
/// Malformed byte sequences are replaced with U+FFFD; decoding never fails.
pub fn decode_document(document: &RawDocument) -> String {
    let encoding = resolve_encoding(&document.bytes, document.declared_charset.as_deref());
    let (text, actual, had_errors) = encoding.decode(&document.bytes);
    debug!(
        encoding = actual.name(),
        had_errors,
        bytes = document.bytes.len(),
        "Decoded document"
    );
    text.into_owned()
}

/// Pick the encoding for `bytes` given an optional declared charset label.
///
/// # Arguments
///
/// * `bytes` - Raw page bytes as received
/// * `declared` - Charset label from the `Content-Type` header, if any
///
/// # Returns
///
/// The first encoding found by BOM, declaration, `<meta>` prescan or
/// sniffing, in that order. Sniffing always produces an answer.
pub fn resolve_encoding(bytes: &[u8], declared: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(encoding) = declared.and_then(label_to_encoding) {
        if !is_generic_fallback(encoding) {
            return encoding;
        }
        debug!(?declared, "Declared charset is the generic fallback; sniffing");
    }

    if let Some(encoding) = prescan_meta_charset(bytes) {
        if !is_generic_fallback(encoding) {
            return encoding;
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn label_to_encoding(label: &str) -> Option<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())?;
    // A document that is readable as ASCII cannot really be UTF-16.
    if encoding == UTF_16LE || encoding == UTF_16BE {
        Some(UTF_8)
    } else {
        Some(encoding)
    }
}

/// `ISO-8859-1`, `latin1` and `us-ascii` all map to windows-1252 in the
/// Encoding Standard; servers send them when they know nothing better.
fn is_generic_fallback(encoding: &'static Encoding) -> bool {
    encoding == WINDOWS_1252
}

fn prescan_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(PRESCAN_BYTES)]);
    let label = META_CHARSET.captures(&head)?.get(1)?.as_str().to_string();
    label_to_encoding(&label)
}

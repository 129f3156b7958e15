//! RFC 7468 textual encoding (PEM armor).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use zeroize::Zeroizing;

use crate::error::{malformed, KeyError};

const BEGIN: &str = "-----BEGIN ";
const DASHES: &str = "-----";

/// A decoded PEM block: its label and the DER it armors.
pub(crate) struct PemBlock {
    pub(crate) label: String,
    pub(crate) contents: Zeroizing<Vec<u8>>,
}

/// Decodes exactly one PEM block. Surrounding whitespace is ignored; any
/// other text before the BEGIN line or after the END line is an error.
pub(crate) fn decode(text: &str) -> Result<PemBlock, KeyError> {
    let rest = text
        .trim()
        .strip_prefix(BEGIN)
        .ok_or_else(|| malformed("missing PEM BEGIN line"))?;
    let (label, rest) = rest
        .split_once(DASHES)
        .ok_or_else(|| malformed("unterminated PEM BEGIN line"))?;

    if label.is_empty() || !label.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        return Err(malformed("invalid PEM label"));
    }

    let footer = format!("-----END {label}-----");
    let (body, trailer) = rest
        .split_once(footer.as_str())
        .ok_or_else(|| malformed(format!("missing PEM END line for `{label}`")))?;
    if !trailer.trim().is_empty() {
        return Err(malformed("unexpected data after PEM END line"));
    }

    let base64: Zeroizing<String> =
        Zeroizing::new(body.chars().filter(|c| !c.is_ascii_whitespace()).collect());
    let contents = STANDARD
        .decode(base64.as_bytes())
        .map_err(|e| malformed(format!("invalid PEM base64: {e}")))?;

    Ok(PemBlock {
        label: label.to_string(),
        contents: Zeroizing::new(contents),
    })
}

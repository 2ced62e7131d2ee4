//! Single-byte code page handling for character fields.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{DbfError, Result};

/// A legacy single-byte code page.
///
/// DBF files predate Unicode; character fields are raw bytes in whatever
/// code page the authoring system used. The supported source system writes
/// Central European Windows-1250.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CodePage {
    encoding: &'static Encoding,
}

impl CodePage {
    /// Windows-1250 (Central European), the source system's default.
    pub const WINDOWS_1250: Self = Self {
        encoding: encoding_rs::WINDOWS_1250,
    };

    /// Windows-1252 (Western European).
    pub const WINDOWS_1252: Self = Self {
        encoding: encoding_rs::WINDOWS_1252,
    };

    /// Resolve a code page from a label such as `cp1250` or `windows-1250`.
    ///
    /// `cpNNNN` spellings are normalized to their `windows-NNNN` labels
    /// before the lookup; anything `encoding_rs` does not know (or any
    /// multi-byte encoding) is rejected.
    pub fn for_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_lowercase();
        let web_label = match normalized.strip_prefix("cp") {
            Some(digits) if digits.chars().all(|c| c.is_ascii_digit()) => {
                format!("windows-{digits}")
            }
            _ => normalized.clone(),
        };
        let encoding = Encoding::for_label(web_label.as_bytes()).ok_or_else(|| {
            DbfError::UnsupportedCodePage {
                label: label.to_string(),
            }
        })?;
        if !encoding.is_single_byte() {
            return Err(DbfError::UnsupportedCodePage {
                label: label.to_string(),
            });
        }
        Ok(Self { encoding })
    }

    /// Resolve a code page from the DBF header's language driver byte.
    ///
    /// Returns `None` for driver ids this reader does not recognize; the
    /// caller falls back to its configured page.
    pub fn from_language_driver(driver: u8) -> Option<Self> {
        let encoding = match driver {
            0x03 => encoding_rs::WINDOWS_1252,
            0xC8 => encoding_rs::WINDOWS_1250,
            0xC9 => encoding_rs::WINDOWS_1251,
            0xCA => encoding_rs::WINDOWS_1254,
            0xCB => encoding_rs::WINDOWS_1253,
            _ => return None,
        };
        Some(Self { encoding })
    }

    /// Decode raw field bytes. Undecodable bytes become replacement
    /// characters rather than errors; a stray byte must not sink a table.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (decoded, _, _) = self.encoding.decode(bytes);
        decoded
    }

    /// The canonical label of the underlying encoding.
    pub fn label(&self) -> &'static str {
        self.encoding.name()
    }
}

impl Default for CodePage {
    fn default() -> Self {
        Self::WINDOWS_1250
    }
}

impl std::fmt::Debug for CodePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CodePage").field(&self.label()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp_labels_resolve() {
        assert_eq!(CodePage::for_label("cp1250").unwrap(), CodePage::WINDOWS_1250);
        assert_eq!(
            CodePage::for_label("windows-1250").unwrap(),
            CodePage::WINDOWS_1250
        );
        assert_eq!(CodePage::for_label("CP1252").unwrap(), CodePage::WINDOWS_1252);
        assert!(CodePage::for_label("cp99999").is_err());
        // Multi-byte encodings are not DBF code pages.
        assert!(CodePage::for_label("utf-16be").is_err());
    }

    #[test]
    fn central_european_round_trip() {
        // 0xF5 is ő in windows-1250 but õ in windows-1252.
        assert_eq!(CodePage::WINDOWS_1250.decode(&[0xF5]), "ő");
        assert_eq!(CodePage::WINDOWS_1252.decode(&[0xF5]), "õ");
    }

    #[test]
    fn language_driver_lookup() {
        assert_eq!(
            CodePage::from_language_driver(0xC8),
            Some(CodePage::WINDOWS_1250)
        );
        assert_eq!(CodePage::from_language_driver(0x00), None);
    }
}

//! Microsoft Word 97-2003 (.doc) binary format
//!
//! Converted to DOCX with `LibreOffice` in headless mode; the caller parses
//! the resulting DOCX.

use anyhow::{Context, Result};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

/// CFB (Compound File Binary) / OLE2 magic signature
///
/// All OLE-based Microsoft Office formats (DOC, XLS, PPT) start with these 8 bytes.
pub const CFB_MAGIC_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// True if the payload starts with the CFB/OLE2 signature.
#[inline]
#[must_use = "returns whether the payload is a compound file"]
pub fn is_cfb(bytes: &[u8]) -> bool {
    bytes.starts_with(&CFB_MAGIC_SIGNATURE)
}

/// Convert a .doc payload to DOCX bytes using `LibreOffice` (`soffice`).
///
/// # Errors
///
/// Returns an error if:
/// - The payload has no CFB signature
/// - `LibreOffice` is not installed
/// - Conversion fails
pub fn convert_to_docx(bytes: &[u8]) -> Result<Vec<u8>> {
    if !is_cfb(bytes) {
        anyhow::bail!("Invalid .doc file signature, expected CFB {CFB_MAGIC_SIGNATURE:02X?}");
    }

    let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
    let input = temp_dir.path().join("input.doc");
    let out_dir = temp_dir.path().join("out");
    std::fs::write(&input, bytes).context("Failed to stage .doc for conversion")?;
    std::fs::create_dir(&out_dir).context("Failed to create conversion output directory")?;

    debug!(bytes = bytes.len(), "Converting .doc with LibreOffice");
    let output = Command::new("soffice")
        .arg("--headless")
        .arg("--convert-to")
        .arg("docx:MS Word 2007 XML")
        .arg("--outdir")
        .arg(&out_dir)
        .arg(&input)
        .output()
        .context(
            "Failed to execute LibreOffice (soffice). \
             Ensure LibreOffice is installed and accessible.",
        )?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("LibreOffice conversion failed: {stderr}");
    }

    let docx_path = out_dir.join("input.docx");
    if !docx_path.exists() {
        anyhow::bail!("Converted DOCX not found at {}", docx_path.display());
    }

    std::fs::read(&docx_path).context("Failed to read converted DOCX")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cfb() {
        let mut bytes = CFB_MAGIC_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0; 8]);
        assert!(is_cfb(&bytes));
        assert!(!is_cfb(b"PK\x03\x04"));
        assert!(!is_cfb(&CFB_MAGIC_SIGNATURE[..4]));
    }

    #[test]
    fn test_convert_rejects_non_cfb() {
        let err = convert_to_docx(b"plain text").unwrap_err();
        assert!(err.to_string().contains("Invalid .doc file signature"));
    }
}

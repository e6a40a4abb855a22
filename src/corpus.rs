//! Loading a corpus into the initial symbol sequence.
//!
//! Every byte becomes the symbol of the same value; encoding is irrelevant.

use std::{fs, io, path::Path};

use crate::types::Symbol;

/// Maps each byte to its value as a [`Symbol`], NUL bytes included.
pub fn symbols_from_bytes(bytes: &[u8]) -> Vec<Symbol> {
    bytes.iter().map(|&b| b as Symbol).collect()
}

/// Maps the UTF-8 bytes of `text` to symbols.
pub fn symbols_from_str(text: &str) -> Vec<Symbol> {
    symbols_from_bytes(text.as_bytes())
}

/// Reads a whole file and maps its bytes to symbols.
///
/// # Errors
///
/// Returns any I/O error raised while reading `path`.
pub fn load_symbols<P: AsRef<Path>>(path: P) -> io::Result<Vec<Symbol>> {
    let bytes = fs::read(path.as_ref())?;
    debug!(
        path = %path.as_ref().display(),
        bytes = bytes.len(),
        "loaded corpus"
    );
    Ok(symbols_from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_from_str() {
        assert_eq!(symbols_from_str("ab"), vec![97, 98]);
    }

    #[test]
    fn test_multibyte_utf8() {
        // 'é' is [0xC3, 0xA9] in UTF-8.
        assert_eq!(symbols_from_str("é"), vec![0xC3, 0xA9]);
    }

    #[test]
    fn test_nul_bytes_kept() {
        assert_eq!(symbols_from_bytes(&[1, 0, 255]), vec![1, 0, 255]);
    }

    #[test]
    fn test_load_symbols_from_file() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let path = dir.path().join("corpus.txt");
        fs::write(&path, b"hello").expect("temp file should be writable");
        let symbols = load_symbols(&path).expect("temp file should be readable");
        assert_eq!(symbols, vec![104, 101, 108, 108, 111]);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        assert!(load_symbols(dir.path().join("missing.txt")).is_err());
    }
}

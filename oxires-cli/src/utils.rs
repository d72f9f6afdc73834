//! Utility functions for the CLI.

use oxires_lzw::{LzwConfig, LzwError};

/// Header written at the start of packed resource files.
pub const PACK_MAGIC: &[u8; 8] = b"OXIRES\0\x01";

/// Codec configuration for a `--bits` argument.
pub fn lzw_config(bits: u8) -> Result<LzwConfig, LzwError> {
    LzwConfig::new(bits)
}

/// Space saved by compression, in percent. Negative when the output grew.
pub fn space_savings(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - compressed as f64 / original as f64) * 100.0
    }
}

/// Space savings formatted for tables.
pub fn format_ratio(original: u64, compressed: u64) -> String {
    if original == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", space_savings(original, compressed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lzw_config() {
        assert_eq!(lzw_config(14).unwrap(), LzwConfig::RESOURCE);
        assert_eq!(lzw_config(12).unwrap().code_bits, 12);
        assert!(lzw_config(8).is_err());
        assert!(lzw_config(17).is_err());
    }

    #[test]
    fn test_ratio() {
        assert_eq!(format_ratio(0, 3), "-");
        assert_eq!(format_ratio(200, 50), "75.0%");
        assert_eq!(format_ratio(10, 15), "-50.0%");
    }
}

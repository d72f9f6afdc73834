//! LZW configuration.
//!
//! The resource format uses one fixed code width for the whole stream. The
//! top three code values are reserved:
//!
//! | Code              | Meaning                         |
//! |-------------------|---------------------------------|
//! | `0..=255`         | literal byte                    |
//! | `256..=max_code`  | dictionary string               |
//! | `max_code + 1`    | FLUSH: reset the dictionary     |
//! | `max_code + 2`    | END: all ones, end of stream    |

use crate::error::{LzwError, Result};

/// First code handed out by the dictionary; codes below are literals.
pub const FIRST_CODE: u32 = 256;

/// LZW configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwConfig {
    /// Width of every code in bits (9-16).
    pub code_bits: u8,
    /// Number of slots in the compressor's open-addressed hash table.
    ///
    /// Must be a prime larger than the code space so that probing visits
    /// every slot and always finds an empty one.
    pub table_size: usize,
    /// Number of misses tolerated on a full dictionary before the
    /// compressor emits a FLUSH code and starts over.
    pub flush_pause: u32,
}

impl LzwConfig {
    /// Configuration of compressed resource payloads: 14-bit codes.
    pub const RESOURCE: Self = Self {
        code_bits: 14,
        table_size: 18041,
        flush_pause: 1000,
    };

    /// Create a configuration for `code_bits`-wide codes.
    ///
    /// The hash table gets the smallest prime at least 10% above the code
    /// space; the flush pause is the resource default.
    pub fn new(code_bits: u8) -> Result<Self> {
        if !(9..=16).contains(&code_bits) {
            return Err(LzwError::InvalidBitWidth(code_bits));
        }
        let space = 1usize << code_bits;
        let mut table_size = space + space / 10;
        while !is_prime(table_size) {
            table_size += 1;
        }
        Ok(Self {
            code_bits,
            table_size,
            flush_pause: Self::RESOURCE.flush_pause,
        })
    }

    /// Set the flush pause.
    pub fn with_flush_pause(mut self, flush_pause: u32) -> Self {
        self.flush_pause = flush_pause;
        self
    }

    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<()> {
        if !(9..=16).contains(&self.code_bits) {
            return Err(LzwError::InvalidBitWidth(self.code_bits));
        }
        if self.table_size <= self.end_code() as usize || !is_prime(self.table_size) {
            return Err(LzwError::InvalidTableSize {
                table_size: self.table_size,
                code_bits: self.code_bits,
            });
        }
        Ok(())
    }

    /// The END code, the largest representable code value.
    pub fn end_code(&self) -> u32 {
        (1u32 << self.code_bits) - 1
    }

    /// The FLUSH code.
    pub fn flush_code(&self) -> u32 {
        self.end_code() - 1
    }

    /// The largest code the dictionary may assign.
    pub fn max_code(&self) -> u32 {
        self.end_code() - 2
    }

    /// Shift applied to the appended byte when hashing.
    pub fn hash_shift(&self) -> u32 {
        u32::from(self.code_bits) - 8
    }
}

impl Default for LzwConfig {
    fn default() -> Self {
        Self::RESOURCE
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_config() {
        let config = LzwConfig::RESOURCE;
        assert_eq!(config.end_code(), 16383);
        assert_eq!(config.flush_code(), 16382);
        assert_eq!(config.max_code(), 16381);
        assert_eq!(config.hash_shift(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_matches_resource() {
        assert_eq!(LzwConfig::new(14).unwrap(), LzwConfig::RESOURCE);
    }

    #[test]
    fn test_new_small_width() {
        let config = LzwConfig::new(9).unwrap();
        assert_eq!(config.table_size, 563);
        assert_eq!(config.max_code(), 509);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_widths() {
        assert!(matches!(LzwConfig::new(8), Err(LzwError::InvalidBitWidth(8))));
        assert!(matches!(LzwConfig::new(17), Err(LzwError::InvalidBitWidth(17))));
    }

    #[test]
    fn test_invalid_table_size() {
        let mut config = LzwConfig::RESOURCE;
        config.table_size = 16384;
        assert!(matches!(
            config.validate(),
            Err(LzwError::InvalidTableSize { .. })
        ));
        config.table_size = 18042;
        assert!(config.validate().is_err());
    }
}

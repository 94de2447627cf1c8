//! Rolling checksums for weak chunk matching
//!
//! Two Adler-style variants are understood. `Adler32` is the historical
//! default written into signature files: it truncates both components with
//! `& 0xFFFF` instead of reducing modulo 65521, so it is not a conforming
//! Adler-32. `Adler32V2` substitutes the proper modulus. Both are kept
//! bit-exact with the files already in the wild, which is why the arithmetic
//! below wraps unsigned values before reducing rather than using a
//! mathematically clean modular rotation.

/// Wire name of the legacy masked variant
pub const ADLER32_NAME: &str = "Adler32";

/// Wire name of the modulus-corrected variant
pub const ADLER32_V2_NAME: &str = "Adler32V2";

const MODULUS: u32 = 65521;

/// Weak 32-bit checksum over a byte window, updatable in O(1) as the window
/// slides by one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingChecksumAlgorithm {
    /// Legacy variant using 16-bit masks (default for new signatures)
    Adler32,
    /// Variant reducing modulo 65521
    Adler32V2,
}

impl RollingChecksumAlgorithm {
    /// Resolve an algorithm from its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ADLER32_NAME => Some(Self::Adler32),
            ADLER32_V2_NAME => Some(Self::Adler32V2),
            _ => None,
        }
    }

    /// The name recorded in signature files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Adler32 => ADLER32_NAME,
            Self::Adler32V2 => ADLER32_V2_NAME,
        }
    }

    /// Full checksum over a window.
    pub fn calculate(self, block: &[u8]) -> u32 {
        match self {
            Self::Adler32 => {
                let mut a: u32 = 1;
                let mut b: u32 = 0;
                for &z in block {
                    a = (a + u32::from(z)) & 0xFFFF;
                    b = (b + a) & 0xFFFF;
                }
                (b << 16) | a
            }
            Self::Adler32V2 => {
                let mut a: u32 = 1;
                let mut b: u32 = 0;
                for &z in block {
                    a = (a + u32::from(z)) % MODULUS;
                    b = (b + a) % MODULUS;
                }
                (b << 16) | a
            }
        }
    }

    /// Incremental update: slide the window one byte forward, dropping
    /// `remove` from the front and appending `add` at the back.
    pub fn rotate(self, checksum: u32, remove: u8, add: u8, chunk_size: usize) -> u32 {
        let mut b = (checksum >> 16) & 0xFFFF;
        let mut a = checksum & 0xFFFF;
        let remove = u32::from(remove);
        let add = u32::from(add);
        let weight = (chunk_size as u32).wrapping_mul(remove);

        match self {
            Self::Adler32 => {
                a = a.wrapping_sub(remove).wrapping_add(add) & 0xFFFF;
                b = b.wrapping_sub(weight).wrapping_add(a).wrapping_sub(1) & 0xFFFF;
            }
            Self::Adler32V2 => {
                a = (a.wrapping_sub(remove).wrapping_add(add) % MODULUS) & 0xFFFF;
                b = (b.wrapping_sub(weight).wrapping_add(a).wrapping_sub(1) % MODULUS) & 0xFFFF;
            }
        }

        (b << 16) | a
    }
}

impl Default for RollingChecksumAlgorithm {
    fn default() -> Self {
        Self::Adler32
    }
}

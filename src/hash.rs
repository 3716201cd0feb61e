//! 256-bit hash identities
//!
//! Record ids and index keys share one hash function (SHA-512/256) and one
//! 32-byte representation. Both render as lowercase hex.

use sha2::{Digest, Sha512_256};

/// Width in bytes of every hash produced by this crate
pub const HASH_LEN: usize = 32;

/// Hashes the concatenation of `parts` with SHA-512/256.
pub fn sha512_256(parts: &[&[u8]]) -> [u8; HASH_LEN] {
    let mut hasher = Sha512_256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Declares a transparent newtype over a 32-byte hash.
macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; $crate::hash::HASH_LEN]);

        impl $name {
            /// Wraps raw bytes.
            pub const fn from_bytes(bytes: [u8; $crate::hash::HASH_LEN]) -> Self {
                Self(bytes)
            }

            /// View the hash as bytes.
            pub fn as_bytes(&self) -> &[u8; $crate::hash::HASH_LEN] {
                &self.0
            }

            /// Returns true for the all-zero value.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Lowercase hex rendering.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parses exactly 64 hex characters.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let mut out = [0u8; $crate::hash::HASH_LEN];
                hex::decode_to_slice(s, &mut out)?;
                Ok(Self(out))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl From<[u8; $crate::hash::HASH_LEN]> for $name {
            fn from(bytes: [u8; $crate::hash::HASH_LEN]) -> Self {
                Self(bytes)
            }
        }
    };
}

pub(crate) use hash_newtype;

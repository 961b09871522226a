//! Content hashing over the RustCrypto digests.

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::services::HashService;

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// [`HashService`] backed by MD5.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hasher;

impl HashService for Md5Hasher {
    fn algorithm(&self) -> &str {
        "md5"
    }

    fn digest(&self, data: &[u8]) -> String {
        hex_digest::<Md5>(data)
    }
}

/// [`HashService`] backed by SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashService for Sha256Hasher {
    fn algorithm(&self) -> &str {
        "sha256"
    }

    fn digest(&self, data: &[u8]) -> String {
        hex_digest::<Sha256>(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_digest() {
        assert_eq!(
            Sha256Hasher.digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(Md5Hasher.digest(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            Sha256Hasher.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(Md5Hasher.digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn algorithm_name() {
        assert_eq!(Sha256Hasher.algorithm(), "sha256");
        assert_eq!(Md5Hasher.algorithm(), "md5");
    }
}

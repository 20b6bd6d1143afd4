use crate::{Digest, Hasher};
use sha3::{Digest as _, Keccak256 as IKeccak256};

/// Hashes `message` with Keccak-256 (the pre-standard SHA-3 variant used by Ethereum).
pub fn keccak256(message: &[u8]) -> Digest {
    Keccak256::hash(message)
}

/// Keccak-256 hasher.
#[derive(Clone, Default)]
pub struct Keccak256 {
    hasher: IKeccak256,
}

impl Hasher for Keccak256 {
    fn new() -> Self {
        Self {
            hasher: IKeccak256::new(),
        }
    }

    fn update(&mut self, message: &[u8]) {
        self.hasher.update(message);
    }

    fn finalize(&mut self) -> Digest {
        self.hasher.finalize_reset().into()
    }

    fn reset(&mut self) {
        self.hasher = IKeccak256::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_utils::hex;

    #[test]
    fn test_keccak256() {
        let message = b"hello world";

        // Generate initial hash
        let mut hasher = Keccak256::new();
        hasher.update(message);
        let hash = hasher.finalize();
        assert_eq!(
            hex(&hash),
            "47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad"
        );

        // Reuse hasher
        hasher.update(message);
        let hash = hasher.finalize();
        assert_eq!(
            hex(&hash),
            "47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad"
        );
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex(&keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_reset() {
        let mut hasher = Keccak256::new();
        hasher.update(b"discarded");
        hasher.reset();
        hasher.update(b"hello world");
        assert_eq!(hasher.finalize(), keccak256(b"hello world"));
    }
}

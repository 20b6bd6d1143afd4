use super::{
    group::{Element, Scalar, G1, G2},
    ops::{self, ADDRESS_LENGTH},
};
use crate::PrivateKeyExt;
use rand::{CryptoRng, Rng};

/// A BN254 private key.
///
/// The same scalar derives both the G1 and G2 public keys.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Scalar);

impl PrivateKeyExt for PrivateKey {
    fn from_rng<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let scalar = Scalar::rand(rng);
            if !scalar.is_zero() {
                return Self(scalar);
            }
        }
    }
}

impl PrivateKey {
    /// Returns the public key in G1.
    pub fn public_g1(&self) -> G1 {
        let mut public = G1::one();
        public.mul(&self.0);
        public
    }

    /// Returns the public key in G2.
    pub fn public_g2(&self) -> G2 {
        let mut public = G2::one();
        public.mul(&self.0);
        public
    }

    /// Signs a message that has already been mapped to G1.
    pub fn sign_hash(&self, hash: &G1) -> G1 {
        let mut signature = *hash;
        signature.mul(&self.0);
        signature
    }

    /// Signs the proof-of-possession message for `address` on `chain_id`.
    pub fn sign_registration(&self, address: &[u8; ADDRESS_LENGTH], chain_id: u64) -> G1 {
        self.sign_hash(&ops::registration_hash(address, chain_id))
    }

    /// Signs the registration message for `address` in `epoch` on `chain_id`.
    pub fn sign_epoch_registration(
        &self,
        address: &[u8; ADDRESS_LENGTH],
        epoch: u64,
        chain_id: u64,
    ) -> G1 {
        self.sign_hash(&ops::epoch_registration_hash(address, epoch, chain_id))
    }
}

// Avoid leaking the secret through debug output.
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_deterministic() {
        let a = PrivateKey::from_seed(42);
        let b = PrivateKey::from_seed(42);
        assert_eq!(a, b);
        assert_eq!(a.public_g1(), b.public_g1());
        assert_ne!(a.public_g1(), PrivateKey::from_seed(43).public_g1());
    }

    #[test]
    fn test_sign_registration() {
        let signer = PrivateKey::from_seed(5);
        let address = [1u8; ADDRESS_LENGTH];
        let signature = signer.sign_registration(&address, 1);
        let hash = ops::registration_hash(&address, 1);
        assert!(ops::verify(
            &hash,
            &signature,
            &signer.public_g1(),
            &signer.public_g2()
        ));
    }

    #[test]
    fn test_sign_epoch_registration() {
        let signer = PrivateKey::from_seed(6);
        let address = [2u8; ADDRESS_LENGTH];
        let signature = signer.sign_epoch_registration(&address, 4, 1);
        let g1 = signer.public_g1();
        let g2 = signer.public_g2();
        assert!(ops::verify(
            &ops::epoch_registration_hash(&address, 4, 1),
            &signature,
            &g1,
            &g2
        ));
        assert!(!ops::verify(
            &ops::epoch_registration_hash(&address, 5, 1),
            &signature,
            &g1,
            &g2
        ));
    }

    #[test]
    fn test_debug_redacted() {
        assert_eq!(format!("{:?}", PrivateKey::from_seed(0)), "PrivateKey(..)");
    }
}

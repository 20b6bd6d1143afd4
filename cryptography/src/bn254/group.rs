//! Group operations over BN254.
//!
//! This module wraps the arkworks BN254 implementation with fixed-size, big-endian
//! encodings compatible with Ethereum tooling (the layout consumed by the EIP-196/197
//! precompiles).
//!
//! # Warning
//!
//! Points decoded through [Read] are checked to be on the curve and (for G2) in the
//! prime-order subgroup. Points constructed any other way are assumed to be valid.

use super::Error;
use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{BigInt, BigInteger, Field, One, PrimeField, UniformRand, Zero};
use bytes::{Buf, BufMut};
use commonware_codec::{Error as CodecError, FixedSize, Read, ReadExt, Write};
use rand::RngCore;

/// Size (in bytes) of a serialized base field element.
pub const FIELD_ELEMENT_LENGTH: usize = 32;

/// Size (in bytes) of a serialized scalar.
pub const SCALAR_LENGTH: usize = 32;

/// Size (in bytes) of a serialized G1 element.
pub const G1_ELEMENT_BYTE_LENGTH: usize = 2 * FIELD_ELEMENT_LENGTH;

/// Size (in bytes) of a serialized G2 element.
pub const G2_ELEMENT_BYTE_LENGTH: usize = 4 * FIELD_ELEMENT_LENGTH;

/// An element of a group.
pub trait Element: Copy + Eq + PartialEq + Send + Sync {
    /// Returns the additive identity.
    fn zero() -> Self;

    /// Returns the group generator.
    fn one() -> Self;

    /// Adds to self in-place.
    fn add(&mut self, rhs: &Self);

    /// Multiplies self in-place.
    fn mul(&mut self, rhs: &Scalar);

    /// Returns true if this is the additive identity.
    fn is_zero(&self) -> bool;
}

/// An element of the BN254 scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar(pub(crate) Fr);

/// An element of G1, stored in affine form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G1(pub(crate) G1Affine);

/// An element of G2, stored in affine form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G2(pub(crate) G2Affine);

impl Scalar {
    /// Generates a random scalar using the provided RNG.
    pub fn rand<R: RngCore>(rng: &mut R) -> Self {
        Self(Fr::rand(rng))
    }

    /// Interprets `bytes` as a big-endian integer and reduces it modulo the group order.
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Returns the scalar for a small integer.
    pub fn from_u64(value: u64) -> Self {
        Self(Fr::from(value))
    }

    /// Returns the additive identity.
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// Returns true if the scalar is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Write for Scalar {
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.0.into_bigint().to_bytes_be());
    }
}

impl Read for Scalar {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let bytes = <[u8; SCALAR_LENGTH]>::read(buf)?;
        let scalar = Fr::from_bigint(bigint_from_be(&bytes))
            .ok_or(CodecError::Invalid("bn254::Scalar", "not canonical"))?;
        Ok(Self(scalar))
    }
}

impl FixedSize for Scalar {
    const SIZE: usize = SCALAR_LENGTH;
}

impl Element for G1 {
    fn zero() -> Self {
        Self(G1Affine::zero())
    }

    fn one() -> Self {
        Self(G1Affine::generator())
    }

    fn add(&mut self, rhs: &Self) {
        let mut sum: G1Projective = self.0.into_group();
        sum += &rhs.0;
        self.0 = sum.into_affine();
    }

    fn mul(&mut self, rhs: &Scalar) {
        self.0 = (self.0 * rhs.0).into_affine();
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Write for G1 {
    fn write(&self, buf: &mut impl BufMut) {
        // The identity is encoded as (0, 0), which is not a point on the curve.
        if self.0.is_zero() {
            buf.put_bytes(0, G1_ELEMENT_BYTE_LENGTH);
            return;
        }
        write_fq(buf, &self.0.x);
        write_fq(buf, &self.0.y);
    }
}

impl Read for G1 {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let bytes = <[u8; G1_ELEMENT_BYTE_LENGTH]>::read(buf)?;
        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self::zero());
        }
        let x = read_fq(&bytes[..32]).ok_or(CodecError::Invalid("bn254::G1", "x not canonical"))?;
        let y = read_fq(&bytes[32..]).ok_or(CodecError::Invalid("bn254::G1", "y not canonical"))?;
        let point = G1Affine::new_unchecked(x, y);

        // G1 has cofactor 1, so any point on the curve is in the prime-order subgroup.
        if !point.is_on_curve() {
            return Err(CodecError::Invalid("bn254::G1", "not on curve"));
        }
        Ok(Self(point))
    }
}

impl FixedSize for G1 {
    const SIZE: usize = G1_ELEMENT_BYTE_LENGTH;
}

impl Element for G2 {
    fn zero() -> Self {
        Self(G2Affine::zero())
    }

    fn one() -> Self {
        Self(G2Affine::generator())
    }

    fn add(&mut self, rhs: &Self) {
        let mut sum: G2Projective = self.0.into_group();
        sum += &rhs.0;
        self.0 = sum.into_affine();
    }

    fn mul(&mut self, rhs: &Scalar) {
        self.0 = (self.0 * rhs.0).into_affine();
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Write for G2 {
    fn write(&self, buf: &mut impl BufMut) {
        if self.0.is_zero() {
            buf.put_bytes(0, G2_ELEMENT_BYTE_LENGTH);
            return;
        }
        write_fq(buf, &self.0.x.c0);
        write_fq(buf, &self.0.x.c1);
        write_fq(buf, &self.0.y.c0);
        write_fq(buf, &self.0.y.c1);
    }
}

impl Read for G2 {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let bytes = <[u8; G2_ELEMENT_BYTE_LENGTH]>::read(buf)?;
        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self::zero());
        }
        let mut coordinates = [Fq::zero(); 4];
        for (coordinate, chunk) in coordinates
            .iter_mut()
            .zip(bytes.chunks_exact(FIELD_ELEMENT_LENGTH))
        {
            *coordinate =
                read_fq(chunk).ok_or(CodecError::Invalid("bn254::G2", "not canonical"))?;
        }
        let [x0, x1, y0, y1] = coordinates;
        let point = G2Affine::new_unchecked(Fq2::new(x0, x1), Fq2::new(y0, y1));
        if !point.is_on_curve() {
            return Err(CodecError::Invalid("bn254::G2", "not on curve"));
        }
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(CodecError::Invalid("bn254::G2", "not in subgroup"));
        }
        Ok(Self(point))
    }
}

impl FixedSize for G2 {
    const SIZE: usize = G2_ELEMENT_BYTE_LENGTH;
}

/// Builds a 256-bit integer from 32 big-endian bytes.
fn bigint_from_be(bytes: &[u8]) -> BigInt<4> {
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().rev().zip(bytes.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *limb = u64::from_be_bytes(word);
    }
    BigInt::new(limbs)
}

/// Decodes a canonical (less than the modulus) big-endian base field element.
fn read_fq(bytes: &[u8]) -> Option<Fq> {
    Fq::from_bigint(bigint_from_be(bytes))
}

fn write_fq(buf: &mut impl BufMut, element: &Fq) {
    buf.put_slice(&element.into_bigint().to_bytes_be());
}

/// Maps a 32-byte digest to a point in G1 using try-and-increment.
///
/// Starting from `x = digest mod p`, `x` is incremented until `x^3 + 3` is a quadratic
/// residue. Because `p = 3 mod 4`, the square root is computed as `(x^3 + 3)^((p + 1) / 4)`,
/// which always selects the same root for a given `x`.
pub fn map_to_curve(digest: &[u8; 32]) -> G1 {
    let b = Fq::from(3u64);
    let mut exponent = Fq::MODULUS;
    exponent.add_with_carry(&BigInt::from(1u64));
    exponent.div2();
    exponent.div2();

    let mut x = Fq::from_be_bytes_mod_order(digest);
    loop {
        let rhs = x.square() * x + b;
        let y = rhs.pow(exponent);
        if y.square() == rhs {
            return G1(G1Affine::new_unchecked(x, y));
        }
        x += Fq::one();
    }
}

/// Returns true if `e(p[0], q[0]) * e(p[1], q[1]) * ... == 1`.
pub fn pairing_check(p: &[G1], q: &[G2]) -> Result<bool, Error> {
    if p.len() != q.len() {
        return Err(Error::PairingLengthMismatch(p.len(), q.len()));
    }
    let result = Bn254::multi_pairing(p.iter().map(|p| p.0), q.iter().map(|q| q.0));
    Ok(result.0.is_one())
}

/// Returns the negation of a G2 element.
pub fn neg_g2(point: &G2) -> G2 {
    G2(-point.0)
}

use crate::KeyExchange;
use crate::curve::{FIELD_BYTES, PRIME256V1};
use crate::ecdh::{EcdhError, PointRejection, SharedSecret, compute_shared_secret};
use crate::point::ProjectivePoint;
use crypto_bigint::subtle::{Choice, ConstantTimeEq};
use crypto_bigint::{Encoding, U256};
use log::debug;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(feature = "rand")]
use crypto_bigint::RandomMod;
#[cfg(feature = "rand")]
use crypto_bigint::rand_core::{CryptoRngCore, OsRng};

/// A P-256 secret scalar `d` with `1 <= d < n`.
///
/// The scalar is wiped when the key is dropped. Comparison is only available
/// in constant time through [`ConstantTimeEq`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    scalar: U256,
}

impl PrivateKey {
    pub fn new(scalar: U256) -> Result<Self, EcdhError> {
        if bool::from(PRIME256V1.is_valid_scalar(&scalar)) {
            Ok(Self { scalar })
        } else {
            debug!("rejected private key: scalar outside [1, n-1]");
            Err(EcdhError::InvalidPrivateKey)
        }
    }

    /// Parses a big-endian scalar of exactly [`FIELD_BYTES`] bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, EcdhError> {
        if bytes.len() != FIELD_BYTES {
            debug!(
                "rejected private key: expected {FIELD_BYTES} bytes, got {}",
                bytes.len()
            );
            return Err(EcdhError::InvalidPrivateKey);
        }
        Self::new(U256::from_be_slice(bytes))
    }

    /// Draws a scalar uniformly from `[1, n-1]`.
    #[cfg(feature = "rand")]
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        loop {
            let scalar = U256::random_mod(rng, &PRIME256V1.n);
            if bool::from(PRIME256V1.is_valid_scalar(&scalar)) {
                return Self { scalar };
            }
        }
    }

    /// Returns `d * G`.
    pub fn public_key(&self) -> PublicKey {
        let point = ProjectivePoint::generator().mul(&self.scalar);
        let point = point
            .to_affine()
            .map_or(CurvePoint::Identity, |(x, y)| CurvePoint::Affine { x, y });
        PublicKey::P256(point)
    }

    pub fn to_be_bytes(&self) -> Zeroizing<[u8; FIELD_BYTES]> {
        Zeroizing::new(self.scalar.to_be_bytes())
    }

    pub(crate) fn scalar(&self) -> &U256 {
        &self.scalar
    }
}

impl ConstantTimeEq for PrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.scalar.ct_eq(&other.scalar)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

impl KeyExchange for PrivateKey {
    type Error = EcdhError;

    fn key_exchange(&self, public: &PublicKey) -> Result<SharedSecret, EcdhError> {
        compute_shared_secret(self, public)
    }
}

/// A point as handed over by a peer: either the point at infinity or raw,
/// unvalidated affine coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvePoint {
    Identity,
    Affine { x: U256, y: U256 },
}

impl CurvePoint {
    /// Builds an affine point from big-endian coordinates of exactly
    /// [`FIELD_BYTES`] bytes each. Curve membership is not checked here.
    pub fn from_be_bytes(x: &[u8], y: &[u8]) -> Result<Self, EcdhError> {
        if x.len() != FIELD_BYTES || y.len() != FIELD_BYTES {
            debug!("rejected public key: {}", PointRejection::InvalidLength);
            return Err(PointRejection::InvalidLength.into());
        }
        Ok(Self::Affine {
            x: U256::from_be_slice(x),
            y: U256::from_be_slice(y),
        })
    }

    /// Big-endian `(x, y)`, or `None` for the identity.
    pub fn to_be_bytes(&self) -> Option<([u8; FIELD_BYTES], [u8; FIELD_BYTES])> {
        match self {
            Self::Identity => None,
            Self::Affine { x, y } => Some((x.to_be_bytes(), y.to_be_bytes())),
        }
    }

    pub fn is_on_curve(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks that the point is a finite point of P-256 with canonical
    /// coordinates and lifts it for arithmetic.
    pub(crate) fn validate(&self) -> Result<ProjectivePoint, PointRejection> {
        let (x, y) = match self {
            Self::Identity => return Err(PointRejection::Identity),
            Self::Affine { x, y } => (x, y),
        };
        if !bool::from(PRIME256V1.is_reduced(x, y)) {
            return Err(PointRejection::CoordinateOutOfRange);
        }
        if !PRIME256V1.contains(x, y) {
            return Err(PointRejection::NotOnCurve);
        }
        Ok(ProjectivePoint::from_affine(x, y))
    }
}

/// A peer's public key handle.
///
/// Only [`PublicKey::P256`] can take part in an exchange; any other
/// representation is refused by [`PublicKey::as_curve_point`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    P256(CurvePoint),
    Other { algorithm: String },
}

impl PublicKey {
    pub fn from_coordinates(x: U256, y: U256) -> Self {
        Self::P256(CurvePoint::Affine { x, y })
    }

    pub fn as_curve_point(&self) -> Result<&CurvePoint, EcdhError> {
        match self {
            Self::P256(point) => Ok(point),
            Self::Other { algorithm } => {
                debug!("rejected public key: unsupported algorithm `{algorithm}`");
                Err(PointRejection::Unsupported.into())
            }
        }
    }
}

impl From<CurvePoint> for PublicKey {
    fn from(point: CurvePoint) -> Self {
        Self::P256(point)
    }
}

/// A private key together with the public key derived from it.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// Generates a key pair from the operating system's RNG.
    #[cfg(feature = "rand")]
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    #[cfg(feature = "rand")]
    pub fn generate_with(rng: &mut impl CryptoRngCore) -> Self {
        let key_pair = Self::from_private_key(PrivateKey::random(rng));
        log::trace!("generated P-256 key pair");
        key_pair
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl KeyExchange for KeyPair {
    type Error = EcdhError;

    fn key_exchange(&self, public: &PublicKey) -> Result<SharedSecret, EcdhError> {
        self.private_key.key_exchange(public)
    }
}

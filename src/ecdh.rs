//! Elliptic Curve Diffie-Hellman over P-256.
//!
//! The shared secret is the x-coordinate of `d * Q`, encoded big-endian on
//! exactly [`FIELD_BYTES`] bytes. No key derivation is applied; feed the
//! result through a KDF before using it as key material.

use crate::curve::FIELD_BYTES;
use crate::keys::{PrivateKey, PublicKey};
use crate::point::ProjectivePoint;
use crypto_bigint::subtle::{Choice, ConstantTimeEq};
use crypto_bigint::{Encoding, U256};
use log::{debug, trace};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EcdhError {
    #[error("Invalid public key: {0}.")]
    InvalidPublicKey(#[from] PointRejection),
    #[error("Invalid private key: scalar must be in [1, n-1].")]
    InvalidPrivateKey,
    #[error("Shared point is the point at infinity.")]
    DegenerateResult,
}

/// Why a public point was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PointRejection {
    #[error("point at infinity")]
    Identity,
    #[error("point is not on the curve")]
    NotOnCurve,
    #[error("coordinate is not reduced modulo p")]
    CoordinateOutOfRange,
    #[error("coordinate has the wrong length")]
    InvalidLength,
    #[error("unsupported key type")]
    Unsupported,
}

/// Raw ECDH output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; FIELD_BYTES]);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; FIELD_BYTES] {
        &self.0
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

/// Computes the shared secret between `private_key` and a peer's `public_key`.
///
/// The peer point is checked before any arithmetic: it must be a P-256 key,
/// finite, with canonical coordinates satisfying the curve equation. A result
/// at infinity is reported as [`EcdhError::DegenerateResult`] and never
/// encoded.
///
/// # Examples
///
/// ```
/// use ecdh_p256::{KeyPair, compute_shared_secret};
///
/// let alice = KeyPair::generate();
/// let bob = KeyPair::generate();
///
/// let shared_alice = compute_shared_secret(alice.private_key(), bob.public_key())?;
/// let shared_bob = compute_shared_secret(bob.private_key(), alice.public_key())?;
/// assert_eq!(shared_alice, shared_bob);
/// assert_eq!(shared_alice.as_bytes().len(), 32);
/// # Ok::<(), ecdh_p256::EcdhError>(())
/// ```
pub fn compute_shared_secret(
    private_key: &PrivateKey,
    public_key: &PublicKey,
) -> Result<SharedSecret, EcdhError> {
    let point = public_key.as_curve_point()?.validate().inspect_err(|reason| {
        debug!("rejected public key: {reason}");
    })?;
    diffie_hellman(private_key.scalar(), &point)
}

fn diffie_hellman(scalar: &U256, point: &ProjectivePoint) -> Result<SharedSecret, EcdhError> {
    let Some((x, _)) = point.mul(scalar).to_affine() else {
        debug!("scalar multiplication reached the point at infinity");
        return Err(EcdhError::DegenerateResult);
    };
    trace!("computed P-256 shared secret");
    Ok(SharedSecret(x.to_be_bytes()))
}

#[cfg(all(test, feature = "rand"))]
mod tests {
    use super::*;
    use crate::KeyExchange;
    use crate::curve::PRIME256V1;
    use crate::keys::{CurvePoint, KeyPair};
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    fn key_pair(seed: u64) -> KeyPair {
        KeyPair::generate_with(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn both_parties_agree() {
        let alice = key_pair(1);
        let bob = key_pair(2);
        let shared_by_alice = alice.key_exchange(bob.public_key()).unwrap();
        let shared_by_bob = bob.key_exchange(alice.public_key()).unwrap();
        assert_eq!(shared_by_alice, shared_by_bob);
        assert_ne!(shared_by_alice.as_bytes(), &[0u8; FIELD_BYTES]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let alice = key_pair(3);
        let bob = key_pair(4);
        let first = compute_shared_secret(alice.private_key(), bob.public_key()).unwrap();
        for _ in 0..4 {
            let again = compute_shared_secret(alice.private_key(), bob.public_key()).unwrap();
            assert_eq!(first.as_bytes(), again.as_bytes());
        }
    }

    #[test]
    fn secret_is_x_of_scaled_point() {
        // d * G with d = 1 makes the secret the x-coordinate of the peer key.
        let one = PrivateKey::new(U256::ONE).unwrap();
        let bob = key_pair(5);
        let secret = compute_shared_secret(&one, bob.public_key()).unwrap();
        let CurvePoint::Affine { x, .. } = bob.public_key().as_curve_point().unwrap() else {
            panic!("generated public key is the identity");
        };
        assert_eq!(secret.as_bytes(), &x.to_be_bytes());
    }

    #[test]
    fn leading_zero_bytes_are_kept() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let alice = KeyPair::generate_with(&mut rng);
        let (secret, bob) = loop {
            let bob = KeyPair::generate_with(&mut rng);
            let secret = alice.key_exchange(bob.public_key()).unwrap();
            if secret.as_bytes()[0] == 0 {
                break (secret, bob);
            }
        };
        assert_eq!(secret.as_ref().len(), FIELD_BYTES);
        assert_eq!(bob.key_exchange(alice.public_key()).unwrap(), secret);
    }

    #[test]
    fn identity_is_rejected() {
        let alice = key_pair(6);
        let err = alice
            .key_exchange(&PublicKey::P256(CurvePoint::Identity))
            .unwrap_err();
        assert_eq!(err, EcdhError::InvalidPublicKey(PointRejection::Identity));
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let alice = key_pair(7);
        let (gx, gy) = PRIME256V1.g;
        let err = alice
            .key_exchange(&PublicKey::from_coordinates(gx, gy.wrapping_add(&U256::ONE)))
            .unwrap_err();
        assert_eq!(err, EcdhError::InvalidPublicKey(PointRejection::NotOnCurve));

        // (0, 0) is how some encodings spell the identity; it is not on P-256.
        let err = alice
            .key_exchange(&PublicKey::from_coordinates(U256::ZERO, U256::ZERO))
            .unwrap_err();
        assert_eq!(err, EcdhError::InvalidPublicKey(PointRejection::NotOnCurve));
    }

    #[test]
    fn unreduced_coordinates_are_rejected() {
        let alice = key_pair(8);
        let (gx, _) = PRIME256V1.g;
        let err = alice
            .key_exchange(&PublicKey::from_coordinates(gx, U256::MAX))
            .unwrap_err();
        assert_eq!(
            err,
            EcdhError::InvalidPublicKey(PointRejection::CoordinateOutOfRange)
        );
    }

    #[test]
    fn unsupported_key_type_is_rejected() {
        let alice = key_pair(9);
        let err = alice
            .key_exchange(&PublicKey::Other {
                algorithm: "ed25519".to_owned(),
            })
            .unwrap_err();
        assert_eq!(err, EcdhError::InvalidPublicKey(PointRejection::Unsupported));
    }

    #[test]
    fn infinite_result_is_degenerate() {
        // Only reachable with a scalar that a PrivateKey refuses to hold.
        let n: U256 = *PRIME256V1.n;
        let err = diffie_hellman(&n, &ProjectivePoint::generator()).unwrap_err();
        assert_eq!(err, EcdhError::DegenerateResult);
        let err = diffie_hellman(&U256::ZERO, &ProjectivePoint::generator()).unwrap_err();
        assert_eq!(err, EcdhError::DegenerateResult);
    }

    #[test]
    fn error_messages_name_the_failure() {
        assert_eq!(
            EcdhError::from(PointRejection::NotOnCurve).to_string(),
            "Invalid public key: point is not on the curve."
        );
        assert_eq!(
            EcdhError::DegenerateResult.to_string(),
            "Shared point is the point at infinity."
        );
        assert!(EcdhError::InvalidPrivateKey.to_string().contains("private key"));
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = key_pair(10).key_exchange(key_pair(11).public_key()).unwrap();
        assert_eq!(format!("{secret:?}"), "SharedSecret { .. }");
    }

    /// Best-effort check that a ladder over a sparse scalar takes about as long
    /// as one over a dense scalar.
    // TODO: replace with a dudect-style statistical harness run outside the
    // unit test suite.
    #[test]
    #[ignore = "timing-sensitive; run manually on a quiet machine"]
    fn runtime_does_not_track_scalar_weight() {
        use std::time::{Duration, Instant};

        fn median(scalar: &U256, point: &ProjectivePoint) -> Duration {
            let mut samples: Vec<Duration> = (0..31)
                .map(|_| {
                    let start = Instant::now();
                    std::hint::black_box(point.mul(std::hint::black_box(scalar)));
                    start.elapsed()
                })
                .collect();
            samples.sort();
            samples[samples.len() / 2]
        }

        let point = ProjectivePoint::generator();
        let sparse = median(&U256::ONE, &point);
        let dense = median(&PRIME256V1.n.wrapping_sub(&U256::ONE), &point);
        let (lo, hi) = if sparse < dense { (sparse, dense) } else { (dense, sparse) };
        assert!(
            hi.as_secs_f64() / lo.as_secs_f64() < 1.25,
            "sparse {sparse:?} vs dense {dense:?}"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn agreement_is_symmetric(
            a in any::<[u8; 32]>().prop_filter_map("scalar out of range", |b| PrivateKey::from_be_bytes(&b).ok()),
            b in any::<[u8; 32]>().prop_filter_map("scalar out of range", |b| PrivateKey::from_be_bytes(&b).ok()),
        ) {
            let a_pub = a.public_key();
            let b_pub = b.public_key();
            let ab = compute_shared_secret(&a, &b_pub).unwrap();
            let ba = compute_shared_secret(&b, &a_pub).unwrap();
            prop_assert_eq!(ab.as_bytes(), ba.as_bytes());
            prop_assert_eq!(ab.as_bytes().len(), FIELD_BYTES);
        }

        #[test]
        fn agreement_is_deterministic(
            a in any::<[u8; 32]>().prop_filter_map("scalar out of range", |b| PrivateKey::from_be_bytes(&b).ok()),
            seed in any::<u64>(),
        ) {
            let peer = key_pair(seed);
            let first = compute_shared_secret(&a, peer.public_key()).unwrap();
            let second = compute_shared_secret(&a, peer.public_key()).unwrap();
            prop_assert_eq!(first.as_bytes(), second.as_bytes());
        }
    }
}

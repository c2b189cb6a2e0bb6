//! Elliptic Curve Diffie-Hellman key agreement over NIST P-256.
//!
//! Field and group arithmetic run in constant time with respect to the
//! private scalar. Peer points are validated before use, and a result at
//! infinity is an error rather than a predictable secret.
//!
//! ```
//! use ecdh_p256::{KeyExchange, KeyPair};
//!
//! let alice = KeyPair::generate();
//! let bob = KeyPair::generate();
//!
//! let shared_alice = alice.key_exchange(bob.public_key())?;
//! let shared_bob = bob.key_exchange(alice.public_key())?;
//! assert_eq!(shared_alice, shared_bob);
//! # Ok::<(), ecdh_p256::EcdhError>(())
//! ```

pub mod curve;
mod ecdh;
mod keys;
mod point;

pub use crypto_bigint::U256;
pub use ecdh::{EcdhError, PointRejection, SharedSecret, compute_shared_secret};
pub use keys::{CurvePoint, KeyPair, PrivateKey, PublicKey};

pub trait KeyExchange {
    type Error;

    fn key_exchange(&self, public: &PublicKey) -> Result<SharedSecret, Self::Error>;
}

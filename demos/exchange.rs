use ecdh_p256::{EcdhError, KeyExchange, KeyPair};
use std::process::ExitCode;

fn run() -> Result<(), EcdhError> {
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();

    let shared_alice = alice.key_exchange(bob.public_key())?;
    let shared_bob = bob.key_exchange(alice.public_key())?;

    println!("Shared Secret (Alice): {}", hex::encode(shared_alice.as_bytes()));
    println!("Shared Secret (Bob): {}", hex::encode(shared_bob.as_bytes()));
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Failed to compute shared secret: {err}");
            ExitCode::FAILURE
        }
    }
}

//! End-to-end tests for the container façade, exercised only through the
//! crate's public API (no internal module access).

use crypto_container::{Container, Pbkdf2Params, CIPHER_BLOCK_SIZE, KEY_SIZE};

fn derive_container(password: &[u8], salt: &[u8], rounds: u32) -> Container {
    let params = Pbkdf2Params::new(salt, rounds);
    let mut key_material = [0u8; KEY_SIZE + CIPHER_BLOCK_SIZE + 20];
    params
        .get_key::<crypto_container::HmacSha1>(password, &mut key_material)
        .unwrap();
    Container::from_key_material(&key_material).unwrap()
}

#[test]
fn round_trip_through_password_derived_container() {
    let container = derive_container(b"correct horse battery staple", b"integration-test-salt", 2000);
    let plaintext = b"data encrypted under a password-derived key";

    let blob = container.encode(plaintext).unwrap();
    let recovered = container.decode(&blob).unwrap();

    assert_eq!(recovered, plaintext);
}

#[test]
fn two_containers_from_different_passwords_do_not_interoperate() {
    let writer = derive_container(b"writer-password", b"shared-salt", 1000);
    let reader = derive_container(b"reader-password", b"shared-salt", 1000);

    let blob = writer.encode(b"only the writer's key should decode this").unwrap();
    assert!(reader.decode(&blob).is_err());
}

#[test]
fn empty_plaintext_is_rejected() {
    // CFB-128 has no block-alignment padding to fall back on for an empty
    // message, so the container rejects it rather than emit a zero-length
    // ciphertext.
    let container = derive_container(b"password", b"salt-value", 1000);
    assert!(container.encode(b"").is_err());
}

#[test]
fn large_plaintext_round_trips_across_many_cfb_blocks() {
    let container = derive_container(b"password", b"salt-value", 1000);
    let plaintext = [0x5Au8; 4096];
    let blob = container.encode(&plaintext).unwrap();
    let recovered = container.decode(&blob).unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn garbage_blob_is_rejected_as_malformed_der() {
    let container = derive_container(b"password", b"salt-value", 1000);
    let garbage = [0xFFu8; 32];
    assert!(container.decode(&garbage).is_err());
}

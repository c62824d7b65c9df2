/// BLAKE3 hash (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data with BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Derive a 32-byte key from input material with BLAKE3's KDF.
///
/// The context string provides domain separation; the same material with a
/// different context yields an unrelated key. Used to turn a pairing phrase
/// into session key material.
pub fn derive_key(context: &str, material: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(material);
    *hasher.finalize().as_bytes()
}

//! Leaf encoding - canonical address parsing and (address, amount) hashing.
//!
//! The encoding must match the on-chain verifier byte for byte: the canonical
//! 20-byte address followed by the amount as a 32-byte big-endian word, hashed
//! with Keccak-256, then hashed once more. The second round keeps a leaf from
//! ever colliding with an internal node, whose preimage is two 32-byte hashes.

use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

/// Fixed address width expected by the verifier contract.
pub const ADDRESS_BYTES: usize = 20;

/// Parses an address into its canonical 20-byte form.
///
/// Accepts a 0x-prefixed hex string of at most 40 digits, any case. Shorter
/// values are zero-extended on the left to the fixed width. Every membership
/// comparison and every leaf hash goes through this function, so case variants
/// of one address always collapse to the same bytes.
pub fn parse_address(input: &str) -> Result<[u8; ADDRESS_BYTES]> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::InvalidAddress(input.to_string()))?;

    if digits.is_empty() || digits.len() > ADDRESS_BYTES * 2 {
        return Err(Error::InvalidAddress(input.to_string()));
    }

    // Odd digit counts get a leading zero so hex decoding sees whole bytes.
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{digits}");
        padded.as_str()
    } else {
        digits
    };

    let bytes = hex::decode(digits).map_err(|_| Error::InvalidAddress(input.to_string()))?;

    let mut address = [0u8; ADDRESS_BYTES];
    address[ADDRESS_BYTES - bytes.len()..].copy_from_slice(&bytes);
    Ok(address)
}

/// Renders a canonical address back to its lowercase hex form.
pub fn format_address(address: &[u8; ADDRESS_BYTES]) -> String {
    format!("0x{}", hex::encode(address))
}

/// Encodes an (address, amount) pair into a 32-byte leaf.
///
/// Fails only on a malformed address.
pub fn encode_leaf(address: &str, amount: u128) -> Result<[u8; 32]> {
    let canonical = parse_address(address)?;
    Ok(leaf_from_parts(&canonical, amount))
}

/// Leaf hash over an already-canonicalized address.
///
/// Packing: address(20) || amount as u256 big-endian. Double Keccak-256.
pub fn leaf_from_parts(address: &[u8; ADDRESS_BYTES], amount: u128) -> [u8; 32] {
    let mut packed = [0u8; ADDRESS_BYTES + 32];
    packed[..ADDRESS_BYTES].copy_from_slice(address);
    packed[ADDRESS_BYTES + 16..].copy_from_slice(&amount.to_be_bytes());

    let inner: [u8; 32] = Keccak256::digest(packed).into();
    Keccak256::digest(inner).into()
}

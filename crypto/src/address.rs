//! Account address derivation from key-set hashes.
//!
//! Address format: `cng_` + base32(keys_hash, 52 chars) + base32(checksum, 8 chars)
//!
//! Checksum: first 5 bytes of Blake2b-256(keys_hash).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).
//! Total derived address length: 4 (prefix) + 52 + 8 = 64 characters.
//!
//! Zero addresses (`cng_zero` + currency) are recognized but carry no hash or
//! checksum; `decode_address` returns `None` for them.

use coinage_types::{Address, Hash};

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Number of base32 characters for the keys hash (256 bits → ceil(256/5) = 52).
const HASH_CHARS: usize = 52;
/// Number of base32 characters for the checksum (40 bits → 40/5 = 8).
const CHECKSUM_CHARS: usize = 8;

/// Encode a byte slice as base32 using the coinage alphabet.
fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    // Remaining bits (padded with zeros on the right).
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

/// Decode a base32 string into a fixed-size byte array. Returns `None` on
/// invalid characters or wrong length.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos < N {
                result[pos] = (buffer >> bits_in_buffer) as u8;
                pos += 1;
            }
        }
    }

    if pos < N {
        return None;
    }
    Some(result)
}

/// Derive a `cng_`-prefixed address from a key-set hash.
///
/// Process:
/// 1. Compute checksum = Blake2b-256(keys_hash)[0..5]
/// 2. Encode keys_hash as 52 base32 characters
/// 3. Encode checksum as 8 base32 characters
/// 4. Address = "cng_" + encoded_hash + encoded_checksum
pub fn derive_address(keys_hash: &Hash) -> Address {
    let hash_encoded = encode_base32(keys_hash.as_bytes());
    let checksum = crate::blake2b_256(keys_hash.as_bytes());
    let checksum_encoded = encode_base32(&checksum[..5]);
    let raw = format!("{}{}{}", Address::PREFIX, hash_encoded, checksum_encoded);
    Address::new(raw).expect("derived address body is always 60 base32 characters")
}

/// Extract the key-set hash from a derived address.
///
/// Returns `None` if the address is malformed, has an invalid checksum, or
/// is a zero address.
pub fn decode_address(address: &Address) -> Option<Hash> {
    let encoded = address.as_str().strip_prefix(Address::PREFIX)?;
    if encoded.len() != HASH_CHARS + CHECKSUM_CHARS {
        return None;
    }

    let hash_encoded = &encoded[..HASH_CHARS];
    let checksum_encoded = &encoded[HASH_CHARS..];

    let hash_bytes: [u8; 32] = decode_base32_fixed(hash_encoded)?;
    let checksum_bytes: [u8; 5] = decode_base32_fixed(checksum_encoded)?;

    let expected = &crate::blake2b_256(&hash_bytes)[..5];
    if checksum_bytes != *expected {
        return None;
    }

    Some(Hash::new(hash_bytes))
}

/// Validate an address string: either a zero address or a derived address
/// with a correct checksum.
pub fn validate_address(address: &Address) -> bool {
    if address.is_valid().is_err() {
        return false;
    }
    if address.is_zero_address() {
        return true;
    }
    decode_address(address).is_some()
}

//! Order-preserving encoding for indexed integers (spec §4.1, §8).
//!
//! Plaintexts live in `[0, 2^31 - 1]`; ciphertexts live in `[0, 2^63 - 1]`.
//! For any two plaintexts `a < b`, `encode(a) < encode(b)`, so `lt`/`lte`/
//! `gt`/`gte`/`eq` all compile straight onto the backing store's native
//! integer comparisons without ever decrypting a row.
//!
//! The scheme is a keyed recursive bisection of the plaintext domain,
//! mirrored by a matching bisection of the (much larger) ciphertext range.
//! At each node the domain splits in half; the node's *slack* — the extra
//! ciphertext headroom beyond what the domain strictly needs — is divided
//! between the two children by a key- and node-derived coin flip, so the
//! exact ciphertext boundaries are unpredictable without the key. This is
//! the same shape as the hypergeometric-sampling OPE construction (each
//! node commits to how much of its slack goes left vs. right); it differs
//! only in using a uniform split instead of reproducing the hypergeometric
//! distribution exactly, which keeps the implementation a plain HMAC-driven
//! loop instead of a statistical sampler.
//!
//! Encoding walks the tree from the root, narrowing `(lo_p, hi_p)` toward
//! the target plaintext and returning the left edge of the final singleton
//! node's ciphertext range. Decoding walks the same tree, choosing left or
//! right by comparing the ciphertext against each node's split point, until
//! the domain narrows to a single plaintext. Both directions recompute the
//! same splits from `(lo_p, hi_p, lo_c, hi_c, key)`, so no table is stored.

use crate::error::{CryptoError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const PLAINTEXT_MAX: u64 = (1u64 << 31) - 1;
pub const CIPHERTEXT_MAX: u64 = (1u64 << 63) - 1;

type HmacSha256 = Hmac<Sha256>;

/// One node of the recursion: draw a uniformly-keyed split of `[0, span]`.
fn keyed_offset(key: &[u8], lo_p: u64, hi_p: u64, lo_c: u64, hi_c: u64, span: u128) -> u128 {
	if span == 0 {
		return 0;
	}
	let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
	mac.update(&lo_p.to_be_bytes());
	mac.update(&hi_p.to_be_bytes());
	mac.update(&lo_c.to_be_bytes());
	mac.update(&hi_c.to_be_bytes());
	let digest = mac.finalize().into_bytes();
	let mut buf = [0u8; 16];
	buf.copy_from_slice(&digest[0..16]);
	u128::from_be_bytes(buf) % (span + 1)
}

/// A single bisection step shared by `encode` and `decode`. Returns the
/// split point `split_c`: plaintexts `<= mid_p` land in `[lo_c, split_c]`,
/// the rest in `[split_c + 1, hi_c]`.
fn split(key: &[u8], lo_p: u64, hi_p: u64, lo_c: u64, hi_c: u64) -> (u64, u64) {
	let mid_p = lo_p + (hi_p - lo_p) / 2;
	let left_domain = mid_p - lo_p + 1;
	let right_domain = hi_p - mid_p;
	let range_span = (hi_c - lo_c + 1) as u128;
	let min_l = left_domain as u128;
	let max_l = range_span - right_domain as u128;
	let l = min_l + keyed_offset(key, lo_p, hi_p, lo_c, hi_c, max_l - min_l);
	let split_c = lo_c + (l - 1) as u64;
	(mid_p, split_c)
}

/// Encode `plaintext` under `key`. `plaintext` must be within
/// `[0, PLAINTEXT_MAX]`.
pub fn encode(key: &[u8], plaintext: u64) -> Result<u64> {
	if plaintext > PLAINTEXT_MAX {
		return Err(CryptoError::OutOfDomain(plaintext));
	}
	let (mut lo_p, mut hi_p) = (0u64, PLAINTEXT_MAX);
	let (mut lo_c, mut hi_c) = (0u64, CIPHERTEXT_MAX);
	while lo_p != hi_p {
		let (mid_p, split_c) = split(key, lo_p, hi_p, lo_c, hi_c);
		if plaintext <= mid_p {
			hi_p = mid_p;
			hi_c = split_c;
		} else {
			lo_p = mid_p + 1;
			lo_c = split_c + 1;
		}
	}
	Ok(lo_c)
}

/// Decode `ciphertext` under `key`, recovering the original plaintext.
pub fn decode(key: &[u8], ciphertext: u64) -> Result<u64> {
	if ciphertext > CIPHERTEXT_MAX {
		return Err(CryptoError::OutOfRange(ciphertext));
	}
	let (mut lo_p, mut hi_p) = (0u64, PLAINTEXT_MAX);
	let (mut lo_c, mut hi_c) = (0u64, CIPHERTEXT_MAX);
	while lo_p != hi_p {
		let (mid_p, split_c) = split(key, lo_p, hi_p, lo_c, hi_c);
		if ciphertext <= split_c {
			hi_p = mid_p;
			hi_c = split_c;
		} else {
			lo_p = mid_p + 1;
			lo_c = split_c + 1;
		}
	}
	Ok(lo_p)
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: &[u8] = b"ope-test-key-material";

	#[test]
	fn round_trips() {
		for p in [0, 1, 2, 42, 1_000_000, PLAINTEXT_MAX / 2, PLAINTEXT_MAX - 1, PLAINTEXT_MAX] {
			let c = encode(KEY, p).unwrap();
			assert_eq!(decode(KEY, c).unwrap(), p, "round trip failed for {p}");
		}
	}

	#[test]
	fn preserves_order() {
		let mut plaintexts: Vec<u64> = vec![0, 1, 2, 3, 100, 999, 123_456, 2_000_000_000];
		plaintexts.sort_unstable();
		let ciphertexts: Vec<u64> =
			plaintexts.iter().map(|&p| encode(KEY, p).unwrap()).collect();
		let mut sorted_ciphertexts = ciphertexts.clone();
		sorted_ciphertexts.sort_unstable();
		assert_eq!(ciphertexts, sorted_ciphertexts);
	}

	#[test]
	fn is_deterministic() {
		assert_eq!(encode(KEY, 77_777).unwrap(), encode(KEY, 77_777).unwrap());
	}

	#[test]
	fn differs_across_keys() {
		assert_ne!(encode(b"key-one", 500).unwrap(), encode(b"key-two", 500).unwrap());
	}

	#[test]
	fn rejects_out_of_domain() {
		assert!(matches!(encode(KEY, PLAINTEXT_MAX + 1), Err(CryptoError::OutOfDomain(_))));
	}

	#[test]
	fn distinct_plaintexts_stay_distinct() {
		let a = encode(KEY, 10).unwrap();
		let b = encode(KEY, 11).unwrap();
		assert!(a < b);
	}
}

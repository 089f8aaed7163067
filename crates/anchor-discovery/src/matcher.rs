//! Matching candidate logs against a bundle digest.
//!
//! The anchoring event carries the digest as the first word of the log
//! data section. Matching deliberately avoids full ABI decoding: the
//! comparison needs only those 32 bytes, and a malformed foreign log
//! should be skipped rather than turned into a scan failure.

use alloy_rpc_types::Log;
use anchor_types::BundleHash;

/// Picks the newest log whose first data word equals the digest.
///
/// Logs with fewer than 32 bytes of data are skipped. Within a scan
/// window later entries are newer, so the search walks the slice in
/// reverse.
pub fn newest_matching_log<'a>(logs: &'a [Log], hash: &BundleHash) -> Option<&'a Log> {
	logs.iter().rev().find(|log| {
		let data = log.data().data.as_ref();
		data.len() >= 32 && &data[..32] == hash.as_bytes()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, Bytes, LogData, B256};

	const HASH: &str = "0x4444444444444444444444444444444444444444444444444444444444444444";

	fn log_with_data(block: u64, data: Vec<u8>) -> Log {
		Log {
			inner: alloy_primitives::Log {
				address: Address::ZERO,
				data: LogData::new_unchecked(vec![], Bytes::from(data)),
			},
			block_hash: None,
			block_number: Some(block),
			block_timestamp: None,
			transaction_hash: Some(B256::ZERO),
			transaction_index: None,
			log_index: None,
			removed: false,
		}
	}

	fn hash() -> BundleHash {
		HASH.parse().unwrap()
	}

	/// Digest word followed by the sender and timestamp words, the way the
	/// anchoring event actually encodes.
	fn full_event_data(hash: &BundleHash) -> Vec<u8> {
		let mut data = hash.as_bytes().to_vec();
		data.extend_from_slice(&[0u8; 64]);
		data
	}

	#[test]
	fn test_matches_digest_in_first_word() {
		let logs = vec![log_with_data(10, full_event_data(&hash()))];
		let found = newest_matching_log(&logs, &hash()).unwrap();
		assert_eq!(found.block_number, Some(10));
	}

	#[test]
	fn test_matches_bare_32_byte_data() {
		let logs = vec![log_with_data(10, hash().as_bytes().to_vec())];
		assert!(newest_matching_log(&logs, &hash()).is_some());
	}

	#[test]
	fn test_skips_short_data() {
		// First 16 bytes agree with the digest but the word is truncated
		let logs = vec![log_with_data(10, hash().as_bytes()[..16].to_vec())];
		assert!(newest_matching_log(&logs, &hash()).is_none());
	}

	#[test]
	fn test_skips_other_digests() {
		let other: BundleHash =
			"0x5555555555555555555555555555555555555555555555555555555555555555"
				.parse()
				.unwrap();
		let logs = vec![log_with_data(10, full_event_data(&other))];
		assert!(newest_matching_log(&logs, &hash()).is_none());
	}

	#[test]
	fn test_newest_of_several_matches_wins() {
		let logs = vec![
			log_with_data(10, full_event_data(&hash())),
			log_with_data(11, full_event_data(&hash())),
			log_with_data(12, hash().as_bytes()[..8].to_vec()),
		];

		let found = newest_matching_log(&logs, &hash()).unwrap();
		assert_eq!(found.block_number, Some(11));
	}

	#[test]
	fn test_empty_slice_yields_none() {
		assert!(newest_matching_log(&[], &hash()).is_none());
	}
}

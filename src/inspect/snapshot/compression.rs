use std::io::Read;

use crate::inspect::{InspectError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;
/// zstd frame magic used by compressed snapshots.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression mode detected for a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Plain JSON document.
	None,
	/// zstd-compressed JSON document.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Detect and decode compression, returning `(mode, decoded_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if looks_like_document(&raw) {
		return Ok((Compression::None, raw));
	}

	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw)?;
		return Ok((Compression::Zstd, out));
	}

	Err(InspectError::UnknownMagic { magic: leading_magic(&raw) })
}

fn looks_like_document(bytes: &[u8]) -> bool {
	bytes.iter().find(|byte| !byte.is_ascii_whitespace()) == Some(&b'{')
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	decoder.take(MAX_DECOMPRESSED_BYTES as u64 + 1).read_to_end(&mut out)?;

	if out.len() > MAX_DECOMPRESSED_BYTES {
		return Err(InspectError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
	}
	if !looks_like_document(&out) {
		return Err(InspectError::UnknownMagic { magic: leading_magic(&out) });
	}

	Ok(out)
}

fn leading_magic(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	for (slot, byte) in magic.iter_mut().zip(bytes) {
		*slot = *byte;
	}
	magic
}

use crate::inspect::{Endianness, InspectError, Result};

/// Bounded cursor over one region's bytes, addressed in foreign memory.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	base: u64,
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor over `bytes` whose first byte lives at `base`.
	pub fn new(bytes: &'a [u8], base: u64) -> Self {
		Self { bytes, base, pos: 0 }
	}

	/// Return the foreign address of the next unread byte.
	pub fn address(&self) -> u64 {
		self.base.wrapping_add(self.pos as u64)
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(InspectError::ReadOutOfBounds {
				address: self.address(),
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read an unsigned integer of 1, 2, 4, or 8 bytes and widen to `u64`.
	pub fn read_uint(&mut self, size: usize, endianness: Endianness) -> Result<Option<u64>> {
		if !matches!(size, 1 | 2 | 4 | 8) {
			return Ok(None);
		}

		let raw = self.read_exact(size)?;
		let mut buf = [0_u8; 8];
		let value = match endianness {
			Endianness::Little => {
				buf[..size].copy_from_slice(raw);
				u64::from_le_bytes(buf)
			}
			Endianness::Big => {
				buf[8 - size..].copy_from_slice(raw);
				u64::from_be_bytes(buf)
			}
		};
		Ok(Some(value))
	}

	/// Read a zero-terminated byte string without the terminator, scanning at most `max_len` bytes.
	///
	/// Returns the bytes and whether the scan stopped at `max_len` before a terminator.
	pub fn read_cstring_bytes(&mut self, max_len: usize) -> Result<(&'a [u8], bool)> {
		let start = self.pos;
		let window = &self.bytes[start..];
		let limit = window.len().min(max_len);

		match window[..limit].iter().position(|byte| *byte == 0) {
			Some(rel_end) => {
				self.pos = start + rel_end + 1;
				Ok((&window[..rel_end], false))
			}
			None if limit == max_len => {
				self.pos = start + limit;
				Ok((&window[..limit], true))
			}
			None => Err(InspectError::UnterminatedString { address: self.address() }),
		}
	}
}

use crate::inspect::snapshot::bytes::Cursor;
use crate::inspect::{InspectError, Result};

/// One captured span of foreign memory.
#[derive(Debug, Clone)]
pub struct Region {
	/// Base address of the first byte.
	pub start: u64,
	/// Captured bytes.
	pub bytes: Vec<u8>,
}

impl Region {
	/// Exclusive end address.
	pub fn end(&self) -> u64 {
		self.start.saturating_add(self.bytes.len() as u64)
	}
}

/// Sorted range index resolving foreign addresses to captured regions.
#[derive(Debug, Default)]
pub struct RegionIndex {
	starts: Vec<u64>,
	regions: Vec<Region>,
}

impl RegionIndex {
	/// Build a sorted index, rejecting overlapping and skipping empty regions.
	pub fn build(mut regions: Vec<Region>) -> Result<Self> {
		regions.retain(|region| !region.bytes.is_empty());
		regions.sort_by_key(|region| region.start);

		for pair in regions.windows(2) {
			if pair[1].start < pair[0].end() {
				return Err(InspectError::OverlappingRegions {
					first: pair[0].start,
					second: pair[1].start,
				});
			}
		}

		let starts = regions.iter().map(|region| region.start).collect();
		Ok(Self { starts, regions })
	}

	/// Resolve an address to its region and byte offset.
	pub fn resolve(&self, address: u64) -> Option<(&Region, usize)> {
		let idx = self.starts.partition_point(|start| *start <= address);
		if idx == 0 {
			return None;
		}

		let region = &self.regions[idx - 1];
		if address >= region.end() {
			return None;
		}

		Some((region, (address - region.start) as usize))
	}

	/// Cursor positioned at `address`, bounded by the end of its region.
	pub fn cursor_at(&self, address: u64) -> Result<Cursor<'_>> {
		let (region, offset) = self.resolve(address).ok_or(InspectError::UnmappedAddress { address })?;
		Ok(Cursor::new(&region.bytes[offset..], address))
	}

	/// Read `len` bytes starting at `address`.
	pub fn read(&self, address: u64, len: usize) -> Result<&[u8]> {
		self.cursor_at(address)?.read_exact(len)
	}

	/// Return all regions in address order.
	pub fn regions(&self) -> &[Region] {
		&self.regions
	}

	/// Total captured bytes.
	pub fn mapped_bytes(&self) -> usize {
		self.regions.iter().map(|region| region.bytes.len()).sum()
	}
}

use crate::inspect::snapshot::file::{BitRange, EnumVariantDef, Endianness, FieldDef, RegionDef, SnapshotFile, SymbolDef, TypeDef};
use crate::inspect::{InspectError, Result, Snapshot};

/// Programmatic snapshot construction.
///
/// Memory is declared with [`SnapshotBuilder::alloc`] and filled with `write_*`
/// calls; scalar writes are encoded with the pointer size and byte order set at
/// the time of the call. Writes outside every allocation fail at build time.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
	pointer_size: usize,
	endianness: Endianness,
	types: Vec<TypeDef>,
	allocations: Vec<(u64, usize)>,
	writes: Vec<(u64, Vec<u8>)>,
	symbols: Vec<SymbolDef>,
}

impl Default for SnapshotBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl SnapshotBuilder {
	/// Empty 64-bit little-endian snapshot.
	pub fn new() -> Self {
		Self {
			pointer_size: 8,
			endianness: Endianness::Little,
			types: Vec::new(),
			allocations: Vec::new(),
			writes: Vec::new(),
			symbols: Vec::new(),
		}
	}

	/// Set pointer width for subsequent pointer writes and the final type table.
	pub fn pointer_size(&mut self, size: usize) -> &mut Self {
		self.pointer_size = size;
		self
	}

	/// Set byte order for subsequent writes and the final type table.
	pub fn endianness(&mut self, endianness: Endianness) -> &mut Self {
		self.endianness = endianness;
		self
	}

	/// Add an LP64-style set of C primitive types.
	pub fn c_primitives(&mut self) -> &mut Self {
		let ints: [(&str, usize, bool); 10] = [
			("int", 4, true),
			("unsigned int", 4, false),
			("unsigned", 4, false),
			("long", 8, true),
			("unsigned long", 8, false),
			("int32_t", 4, true),
			("uint32_t", 4, false),
			("int64_t", 8, true),
			("uint64_t", 8, false),
			("size_t", self.pointer_size, false),
		];
		for (name, size, signed) in ints {
			self.types.push(TypeDef::Int {
				name: name.to_owned(),
				size,
				signed,
			});
		}
		self.types.push(TypeDef::Char { name: "char".to_owned() });
		self.types.push(TypeDef::Bool {
			name: "bool".to_owned(),
			size: 1,
		});
		self.types.push(TypeDef::Float {
			name: "float".to_owned(),
			size: 4,
		});
		self.types.push(TypeDef::Float {
			name: "double".to_owned(),
			size: 8,
		});
		self
	}

	/// Add any type definition.
	pub fn ty(&mut self, def: TypeDef) -> &mut Self {
		self.types.push(def);
		self
	}

	/// Add a struct type.
	pub fn struct_type(&mut self, name: &str, size: usize, fields: Vec<FieldDef>) -> &mut Self {
		self.ty(TypeDef::Struct {
			name: name.to_owned(),
			size,
			fields,
		})
	}

	/// Add an enum type.
	pub fn enum_type(&mut self, name: &str, size: usize, variants: &[(&str, i64)]) -> &mut Self {
		self.ty(TypeDef::Enum {
			name: name.to_owned(),
			size,
			variants: variants
				.iter()
				.map(|(variant, value)| EnumVariantDef {
					name: (*variant).to_owned(),
					value: *value,
				})
				.collect(),
		})
	}

	/// Add a typedef.
	pub fn alias(&mut self, name: &str, target: &str) -> &mut Self {
		self.ty(TypeDef::Alias {
			name: name.to_owned(),
			target: target.to_owned(),
		})
	}

	/// Add a function type.
	pub fn function_type(&mut self, name: &str) -> &mut Self {
		self.ty(TypeDef::Function { name: name.to_owned() })
	}

	/// Declare a zero-filled region.
	pub fn alloc(&mut self, address: u64, size: usize) -> &mut Self {
		self.allocations.push((address, size));
		self
	}

	/// Write raw bytes.
	pub fn write(&mut self, address: u64, bytes: impl Into<Vec<u8>>) -> &mut Self {
		self.writes.push((address, bytes.into()));
		self
	}

	/// Write an unsigned integer of `size` bytes (1, 2, 4, or 8).
	pub fn write_uint(&mut self, address: u64, size: usize, value: u64) -> &mut Self {
		let bytes = match self.endianness {
			Endianness::Little => value.to_le_bytes()[..size.min(8)].to_vec(),
			Endianness::Big => value.to_be_bytes()[8 - size.min(8)..].to_vec(),
		};
		self.write(address, bytes)
	}

	/// Write a pointer-sized value.
	pub fn write_ptr(&mut self, address: u64, value: u64) -> &mut Self {
		self.write_uint(address, self.pointer_size, value)
	}

	/// Write a 4-byte signed integer.
	pub fn write_i32(&mut self, address: u64, value: i32) -> &mut Self {
		self.write_uint(address, 4, u64::from(value as u32))
	}

	/// Write an 8-byte signed integer.
	pub fn write_i64(&mut self, address: u64, value: i64) -> &mut Self {
		self.write_uint(address, 8, value as u64)
	}

	/// Write an 8-byte float.
	pub fn write_f64(&mut self, address: u64, value: f64) -> &mut Self {
		self.write_uint(address, 8, value.to_bits())
	}

	/// Allocate and write a zero-terminated string.
	pub fn cstr(&mut self, address: u64, text: &str) -> &mut Self {
		let mut bytes = text.as_bytes().to_vec();
		bytes.push(0);
		self.alloc(address, bytes.len());
		self.write(address, bytes)
	}

	/// Name a code address.
	pub fn symbol(&mut self, address: u64, name: &str) -> &mut Self {
		self.symbols.push(SymbolDef {
			address,
			name: name.to_owned(),
		});
		self
	}

	/// Assemble the snapshot document.
	pub fn to_file(&self) -> Result<SnapshotFile> {
		let mut regions: Vec<(u64, Vec<u8>)> = self.allocations.iter().map(|(address, size)| (*address, vec![0_u8; *size])).collect();

		for (address, bytes) in &self.writes {
			let len = bytes.len() as u64;
			let target = regions
				.iter_mut()
				.find(|(start, buf)| *address >= *start && address.saturating_add(len) <= start.saturating_add(buf.len() as u64));
			let Some((start, buf)) = target else {
				return Err(InspectError::WriteOutsideAllocation {
					address: *address,
					len: bytes.len(),
				});
			};
			let offset = (*address - *start) as usize;
			buf[offset..offset + bytes.len()].copy_from_slice(bytes);
		}

		Ok(SnapshotFile {
			pointer_size: self.pointer_size,
			endianness: self.endianness,
			types: self.types.clone(),
			regions: regions
				.into_iter()
				.map(|(address, bytes)| RegionDef {
					address,
					bytes: hex::encode(bytes),
				})
				.collect(),
			symbols: self.symbols.clone(),
		})
	}

	/// Assemble and load the snapshot.
	pub fn build(&self) -> Result<Snapshot> {
		Snapshot::from_file(&self.to_file()?)
	}
}

/// Plain struct field.
pub fn field(name: &str, ty: &str, offset: usize) -> FieldDef {
	FieldDef {
		name: name.to_owned(),
		ty: ty.to_owned(),
		offset,
		bits: None,
	}
}

/// Bit-field inside the storage unit at `offset`.
pub fn bit_field(name: &str, ty: &str, offset: usize, shift: u8, width: u8) -> FieldDef {
	FieldDef {
		bits: Some(BitRange { shift, width }),
		..field(name, ty, offset)
	}
}

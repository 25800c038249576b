use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::inspect::{FieldDescriptor, HostValue, InspectError, Result};

mod builder;
mod bytes;
mod compression;
mod decl;
mod file;
mod memory;
mod types;

pub use builder::{SnapshotBuilder, bit_field, field};
pub use compression::Compression;
pub use decl::{TypeDecl, parse_type_decl};
pub use file::{BitRange, EnumVariantDef, Endianness, FieldDef, RegionDef, SnapshotFile, SymbolDef, TypeDef};
pub use memory::{Region, RegionIndex};
pub use types::{FieldLayout, TypeKind, TypeTable};

/// Maximum bytes shown when rendering a `char *` inline.
const RENDER_STRING_LIMIT: usize = 200;

/// Captured process memory with its type layout: the bundled inspection host.
#[derive(Debug)]
pub struct Snapshot {
	/// Compression mode of the source file.
	pub compression: Compression,
	types: TypeTable,
	memory: RegionIndex,
	symbols: BTreeMap<u64, Box<str>>,
}

impl Snapshot {
	/// Read, decompress, and parse a snapshot file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let raw = fs::read(path)?;
		let (compression, bytes) = compression::decode_bytes(raw)?;
		let document = SnapshotFile::parse(&bytes)?;

		let mut snapshot = Self::from_file(&document)?;
		snapshot.compression = compression;
		info!(
			path = %path.display(),
			compression = compression.as_str(),
			regions = snapshot.memory.regions().len(),
			"snapshot loaded"
		);
		Ok(snapshot)
	}

	/// Build a snapshot from an in-memory document.
	pub fn from_file(document: &SnapshotFile) -> Result<Self> {
		let types = TypeTable::build(document.pointer_size, document.endianness, &document.types)?;

		let mut regions = Vec::with_capacity(document.regions.len());
		for item in &document.regions {
			let bytes = hex::decode(item.bytes.trim()).map_err(|source| InspectError::InvalidRegionHex {
				address: item.address,
				source,
			})?;
			regions.push(Region { start: item.address, bytes });
		}
		let memory = RegionIndex::build(regions)?;

		let symbols = document.symbols.iter().map(|item| (item.address, item.name.as_str().into())).collect();
		debug!(types = document.types.len(), mapped_bytes = memory.mapped_bytes(), "snapshot built");

		Ok(Self {
			compression: Compression::None,
			types,
			memory,
			symbols,
		})
	}

	/// Type layout table.
	pub fn types(&self) -> &TypeTable {
		&self.types
	}

	/// Captured memory.
	pub fn memory(&self) -> &RegionIndex {
		&self.memory
	}

	/// Symbol name at an exact address.
	pub fn symbol(&self, address: u64) -> Option<&str> {
		self.symbols.get(&address).map(|name| name.as_ref())
	}

	/// Number of known symbols.
	pub fn symbol_count(&self) -> usize {
		self.symbols.len()
	}

	/// Object of type `type_name` stored at `address`.
	pub fn object_at(&self, type_name: &str, address: u64) -> Result<SnapValue<'_>> {
		SnapValue::new(self, parse_type_decl(type_name)?, Place::Memory(address), None)
	}

	/// Pointer value `address` of pointer type `type_name`.
	pub fn pointer_to(&self, type_name: &str, address: u64) -> Result<SnapValue<'_>> {
		let value = SnapValue::new(self, parse_type_decl(type_name)?, Place::Immediate(address), None)?;
		if !value.is_pointer() {
			return Err(InspectError::NotAPointer { type_name: value.type_name() });
		}
		Ok(value)
	}

	/// Pointer types take `address` as the pointer value; other types as the object address.
	pub fn value(&self, type_name: &str, address: u64) -> Result<SnapValue<'_>> {
		let decl = parse_type_decl(type_name)?;
		let canonical = self.types.canonical(&decl)?;
		let place = if canonical.ptr_depth > 0 { Place::Immediate(address) } else { Place::Memory(address) };
		SnapValue::new(self, decl, place, None)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
	Memory(u64),
	Immediate(u64),
}

/// Typed value inside a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapValue<'s> {
	snap: &'s Snapshot,
	decl: TypeDecl,
	canonical: TypeDecl,
	place: Place,
	bits: Option<BitRange>,
}

impl<'s> SnapValue<'s> {
	fn new(snap: &'s Snapshot, decl: TypeDecl, place: Place, bits: Option<BitRange>) -> Result<Self> {
		let canonical = snap.types.canonical(&decl)?;
		Ok(Self {
			snap,
			decl,
			canonical,
			place,
			bits,
		})
	}

	fn kind(&self) -> Option<&'s TypeKind> {
		if self.canonical.ptr_depth > 0 {
			return None;
		}
		self.snap.types.base_kind(&self.canonical).ok()
	}

	fn raw_bits(&self) -> Result<u64> {
		let address = match self.place {
			Place::Immediate(raw) => return Ok(raw),
			Place::Memory(address) => address,
		};

		let size = self.snap.types.size_of(&self.canonical)?;
		let mut cursor = self.snap.memory.cursor_at(address)?;
		let raw = cursor
			.read_uint(size, self.snap.types.endianness)?
			.ok_or_else(|| InspectError::UnsupportedScalarSize {
				type_name: self.type_name(),
				size,
			})?;

		Ok(match self.bits {
			Some(bits) => (raw >> bits.shift) & low_mask(bits.width),
			None => raw,
		})
	}

	fn bit_width(&self, size: usize) -> u32 {
		self.bits.map_or((size * 8) as u32, |bits| u32::from(bits.width))
	}

	fn pointer_value(&self) -> Result<u64> {
		if self.canonical.ptr_depth == 0 {
			return Err(InspectError::NotAPointer { type_name: self.type_name() });
		}
		self.raw_bits()
	}

	fn pointee_decl(&self) -> Option<TypeDecl> {
		self.decl.pointee().or_else(|| self.canonical.pointee())
	}

	fn try_render(&self) -> Result<String> {
		if self.canonical.ptr_depth > 0 {
			return self.render_pointer();
		}

		let Some(kind) = self.kind() else {
			return Err(InspectError::UnknownType {
				name: self.canonical.base.to_string(),
			});
		};

		Ok(match kind {
			TypeKind::Int { .. } => self.as_int()?.to_string(),
			TypeKind::Bool { .. } => (self.raw_bits()? != 0).to_string(),
			TypeKind::Char => {
				let raw = self.raw_bits()? as u8;
				format!("{raw} {:?}", char::from(raw))
			}
			TypeKind::Enum { variants, .. } => {
				let raw = self.as_int()?;
				match variants.iter().find(|(_, value)| *value == raw) {
					Some((name, _)) => name.to_string(),
					None => raw.to_string(),
				}
			}
			TypeKind::Float { size: 4 } => f32::from_bits(self.raw_bits()? as u32).to_string(),
			TypeKind::Float { size: 8 } => f64::from_bits(self.raw_bits()?).to_string(),
			TypeKind::Float { size } => {
				return Err(InspectError::UnsupportedScalarSize {
					type_name: self.type_name(),
					size: *size,
				});
			}
			TypeKind::Struct { .. } => "{...}".to_owned(),
			TypeKind::Void | TypeKind::Function | TypeKind::Alias { .. } => format!("<{}>", kind.label()),
		})
	}

	fn render_pointer(&self) -> Result<String> {
		let ptr = self.pointer_value()?;
		if ptr == 0 {
			return Ok("0x0".to_owned());
		}

		let target = self.canonical.pointee().map(|decl| self.snap.types.canonical(&decl)).transpose()?;
		let target_kind = target
			.as_ref()
			.filter(|decl| decl.ptr_depth == 0)
			.and_then(|decl| self.snap.types.base_kind(decl).ok());

		Ok(match target_kind {
			Some(TypeKind::Function) => match self.snap.symbol(ptr) {
				Some(name) => format!("0x{ptr:x} <{name}>"),
				None => format!("0x{ptr:x}"),
			},
			Some(TypeKind::Char) => match self.read_string(RENDER_STRING_LIMIT) {
				Ok(text) => format!("0x{ptr:x} {text:?}"),
				Err(err) => format!("0x{ptr:x} <error: {err}>"),
			},
			_ => format!("0x{ptr:x}"),
		})
	}
}

impl HostValue for SnapValue<'_> {
	fn type_name(&self) -> String {
		self.decl.to_string()
	}

	fn resolved_type_name(&self) -> String {
		TypeDecl {
			is_const: false,
			..self.canonical.clone()
		}
		.to_string()
	}

	fn is_pointer(&self) -> bool {
		self.canonical.ptr_depth > 0
	}

	fn is_struct(&self) -> bool {
		matches!(self.kind(), Some(TypeKind::Struct { .. }))
	}

	fn fields(&self) -> Vec<FieldDescriptor> {
		match self.kind() {
			Some(TypeKind::Struct { fields, .. }) => fields.iter().map(|field| FieldDescriptor::new(field.name.clone())).collect(),
			_ => Vec::new(),
		}
	}

	fn field(&self, name: &str) -> Result<Self> {
		let Some(TypeKind::Struct { fields, .. }) = self.kind() else {
			return Err(InspectError::NotAStruct { type_name: self.type_name() });
		};
		let Place::Memory(base) = self.place else {
			return Err(InspectError::NotAddressable { type_name: self.type_name() });
		};
		let layout = fields.iter().find(|field| field.name.as_ref() == name).ok_or_else(|| InspectError::MissingField {
			type_name: self.resolved_type_name(),
			field: name.to_owned(),
		})?;

		Self::new(self.snap, layout.ty.clone(), Place::Memory(base.wrapping_add(layout.offset as u64)), layout.bits)
	}

	fn dereference(&self) -> Result<Self> {
		let ptr = self.pointer_value()?;
		if ptr == 0 {
			return Err(InspectError::NullDeref { type_name: self.type_name() });
		}
		let target = self.pointee_decl().ok_or_else(|| InspectError::NotAPointer { type_name: self.type_name() })?;
		Self::new(self.snap, target, Place::Memory(ptr), None)
	}

	fn as_int(&self) -> Result<i64> {
		if self.canonical.ptr_depth > 0 {
			return Ok(self.raw_bits()? as i64);
		}

		match self.kind() {
			Some(TypeKind::Int { size, signed }) => {
				let raw = self.raw_bits()?;
				Ok(if *signed { sign_extend(raw, self.bit_width(*size)) } else { raw as i64 })
			}
			Some(TypeKind::Enum { size, .. }) => Ok(sign_extend(self.raw_bits()?, self.bit_width(*size))),
			Some(TypeKind::Bool { .. } | TypeKind::Char) => Ok(self.raw_bits()? as i64),
			_ => Err(InspectError::NotAScalar { type_name: self.type_name() }),
		}
	}

	fn add(&self, offset: usize) -> Result<Self> {
		let ptr = self.pointer_value()?;
		let target = self.canonical.pointee().ok_or_else(|| InspectError::NotAPointer { type_name: self.type_name() })?;
		let stride = self.snap.types.size_of(&target)?;
		let moved = ptr.wrapping_add((offset as u64).wrapping_mul(stride as u64));
		Self::new(self.snap, self.decl.clone(), Place::Immediate(moved), None)
	}

	fn cast(&self, type_name: &str) -> Result<Self> {
		Self::new(self.snap, parse_type_decl(type_name)?, self.place, self.bits)
	}

	fn address(&self) -> Option<u64> {
		match (self.place, self.bits) {
			(Place::Memory(address), None) => Some(address),
			_ => None,
		}
	}

	fn target_type_name(&self) -> Option<String> {
		self.pointee_decl().map(|decl| decl.to_string())
	}

	fn read_string(&self, max_len: usize) -> Result<String> {
		let ptr = self.pointer_value()?;
		if ptr == 0 {
			return Err(InspectError::NullDeref { type_name: self.type_name() });
		}

		let mut cursor = self.snap.memory.cursor_at(ptr)?;
		let (bytes, truncated) = cursor.read_cstring_bytes(max_len)?;
		let mut text = String::from_utf8_lossy(bytes).into_owned();
		if truncated {
			text.push_str("...");
		}
		Ok(text)
	}

	fn render(&self) -> String {
		self.try_render().unwrap_or_else(|err| format!("<error: {err}>"))
	}
}

fn low_mask(width: u8) -> u64 {
	if width >= 64 { u64::MAX } else { (1_u64 << width) - 1 }
}

fn sign_extend(raw: u64, width: u32) -> i64 {
	if width == 0 || width >= 64 {
		return raw as i64;
	}
	let shift = 64 - width;
	((raw << shift) as i64) >> shift
}

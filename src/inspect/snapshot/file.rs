use serde::{Deserialize, Serialize};

use crate::inspect::Result;

/// Byte order of the inspected process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
	/// Least significant byte first.
	#[default]
	Little,
	/// Most significant byte first.
	Big,
}

impl Endianness {
	/// Render as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}
}

/// On-disk snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
	/// Pointer width in bytes (4 or 8).
	#[serde(default = "default_pointer_size")]
	pub pointer_size: usize,
	/// Byte order of all scalar reads.
	#[serde(default)]
	pub endianness: Endianness,
	/// Type table.
	#[serde(default)]
	pub types: Vec<TypeDef>,
	/// Captured memory.
	#[serde(default)]
	pub regions: Vec<RegionDef>,
	/// Address-to-name symbols for function pointers.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub symbols: Vec<SymbolDef>,
}

fn default_pointer_size() -> usize {
	8
}

/// One type definition, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
	/// Integer of `size` bytes.
	Int {
		/// Type name.
		name: String,
		/// Width in bytes.
		size: usize,
		/// Two's complement signedness.
		#[serde(default)]
		signed: bool,
	},
	/// IEEE float of 4 or 8 bytes.
	Float {
		/// Type name.
		name: String,
		/// Width in bytes.
		size: usize,
	},
	/// Boolean stored in `size` bytes.
	Bool {
		/// Type name.
		name: String,
		/// Width in bytes.
		size: usize,
	},
	/// Single-byte character.
	Char {
		/// Type name.
		name: String,
	},
	/// Enumeration with named values.
	Enum {
		/// Type name.
		name: String,
		/// Width in bytes.
		size: usize,
		/// Enumerators.
		variants: Vec<EnumVariantDef>,
	},
	/// Struct with explicit field offsets.
	Struct {
		/// Type name (struct tag).
		name: String,
		/// Total size in bytes.
		size: usize,
		/// Field layout.
		fields: Vec<FieldDef>,
	},
	/// Typedef to another spelling.
	Alias {
		/// Alias name.
		name: String,
		/// Target spelling, may include stars.
		target: String,
	},
	/// Function type; only pointers to it are meaningful.
	Function {
		/// Type name.
		name: String,
	},
}

impl TypeDef {
	/// Defined type name.
	pub fn name(&self) -> &str {
		match self {
			Self::Int { name, .. }
			| Self::Float { name, .. }
			| Self::Bool { name, .. }
			| Self::Char { name }
			| Self::Enum { name, .. }
			| Self::Struct { name, .. }
			| Self::Alias { name, .. }
			| Self::Function { name } => name,
		}
	}
}

/// One named enumerator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumVariantDef {
	/// Enumerator name.
	pub name: String,
	/// Enumerator value.
	pub value: i64,
}

/// One struct field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
	/// Field name.
	pub name: String,
	/// C type spelling.
	#[serde(rename = "type")]
	pub ty: String,
	/// Byte offset of the field (or of its storage unit for bit-fields).
	pub offset: usize,
	/// Bit-field placement inside the storage unit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bits: Option<BitRange>,
}

/// Bit-field placement: value is `(unit >> shift) & ((1 << width) - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRange {
	/// Low bit index inside the storage unit.
	pub shift: u8,
	/// Bit count.
	pub width: u8,
}

/// One captured memory region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDef {
	/// Base address.
	pub address: u64,
	/// Hex-encoded bytes.
	pub bytes: String,
}

/// One code symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDef {
	/// Symbol address.
	pub address: u64,
	/// Symbol name.
	pub name: String,
}

impl SnapshotFile {
	/// Parse a JSON snapshot document.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		Ok(serde_json::from_slice(bytes)?)
	}

	/// Serialize as pretty JSON.
	pub fn to_json(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec_pretty(self)?)
	}
}

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, InspectError>;

/// Errors produced while loading snapshots and reading typed values.
#[derive(Debug, Error)]
pub enum InspectError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Snapshot document was not valid JSON for the expected schema.
	#[error("snapshot json: {0}")]
	Json(#[from] serde_json::Error),
	/// Region byte string was not valid hex.
	#[error("region at 0x{address:x} has invalid hex bytes: {source}")]
	InvalidRegionHex {
		/// Region base address.
		address: u64,
		/// Underlying decode failure.
		source: hex::FromHexError,
	},
	/// Unknown leading file magic.
	#[error("not a snapshot document or zstd frame (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Pointer width other than 4 or 8 bytes.
	#[error("unsupported pointer size {size} (expected 4 or 8)")]
	UnsupportedPointerSize {
		/// Declared pointer width.
		size: usize,
	},
	/// Scalar width the reader cannot decode.
	#[error("unsupported scalar size {size} for {type_name}")]
	UnsupportedScalarSize {
		/// Type being read.
		type_name: String,
		/// Declared byte width.
		size: usize,
	},
	/// Requested type name is not in the type table.
	#[error("unknown type: {name}")]
	UnknownType {
		/// Requested base type name.
		name: String,
	},
	/// Type table declared the same name twice.
	#[error("duplicate type definition: {name}")]
	DuplicateType {
		/// Offending type name.
		name: String,
	},
	/// Typedef chain loops back on itself.
	#[error("typedef cycle while resolving {name}")]
	AliasCycle {
		/// Alias where resolution started.
		name: String,
	},
	/// C type spelling could not be parsed.
	#[error("invalid type spelling: {spelling:?}")]
	InvalidTypeSpelling {
		/// Spelling as given.
		spelling: String,
	},
	/// Bit-field placement does not fit its storage unit.
	#[error("bit-field {type_name}.{field} (shift {shift}, width {width}) does not fit its storage")]
	InvalidBitField {
		/// Struct type name.
		type_name: String,
		/// Field name.
		field: String,
		/// Declared low bit.
		shift: u8,
		/// Declared bit count.
		width: u8,
	},
	/// Field lookup on a struct without that field.
	#[error("missing field {field} on {type_name}")]
	MissingField {
		/// Struct type name.
		type_name: String,
		/// Requested field name.
		field: String,
	},
	/// Operation requires a pointer value.
	#[error("expected pointer, got {type_name}")]
	NotAPointer {
		/// Actual type spelling.
		type_name: String,
	},
	/// Operation requires a struct value.
	#[error("expected struct, got {type_name}")]
	NotAStruct {
		/// Actual type spelling.
		type_name: String,
	},
	/// Operation requires an integer-like value.
	#[error("expected scalar, got {type_name}")]
	NotAScalar {
		/// Actual type spelling.
		type_name: String,
	},
	/// Value has no storage address.
	#[error("value of type {type_name} is not addressable")]
	NotAddressable {
		/// Actual type spelling.
		type_name: String,
	},
	/// Dereference of a null pointer.
	#[error("null pointer dereference of {type_name}")]
	NullDeref {
		/// Pointer type spelling.
		type_name: String,
	},
	/// Address does not fall in any captured region.
	#[error("cannot access memory at address 0x{address:x}")]
	UnmappedAddress {
		/// Requested address.
		address: u64,
	},
	/// Read started in a region but ran past its end.
	#[error("read of {need} bytes at 0x{address:x} exceeds region (remaining {rem})")]
	ReadOutOfBounds {
		/// Requested start address.
		address: u64,
		/// Requested bytes.
		need: usize,
		/// Bytes left in the region.
		rem: usize,
	},
	/// C string did not terminate inside its region.
	#[error("unterminated string at 0x{address:x}")]
	UnterminatedString {
		/// String start address.
		address: u64,
	},
	/// Two captured regions share addresses.
	#[error("regions overlap at 0x{first:x} and 0x{second:x}")]
	OverlappingRegions {
		/// Lower region base.
		first: u64,
		/// Higher region base.
		second: u64,
	},
	/// Builder write landed outside every allocation.
	#[error("write of {len} bytes at 0x{address:x} is outside every allocation")]
	WriteOutsideAllocation {
		/// Write start address.
		address: u64,
		/// Write length.
		len: usize,
	},
	/// CLI address argument was invalid.
	#[error("invalid address literal: {value}")]
	InvalidAddressLiteral {
		/// User-provided text.
		value: String,
	},
}

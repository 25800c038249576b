use serde::Serialize;

use crate::inspect::Result;

/// One field of a structured value's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	/// Field name as declared by the foreign type.
	pub name: Box<str>,
}

impl FieldDescriptor {
	/// Create a descriptor for a named field.
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self { name: name.into() }
	}
}

/// Rendering hint handed back to the host alongside a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayHint {
	/// Children are positional elements.
	Sequence,
	/// Children are key/value members.
	Mapping,
	/// Description is a scalar string.
	Scalar,
	/// Host default rendering.
	None,
}

/// Typed view over one value in an inspected (suspended) process.
///
/// Implementations are read-only. Every fallible read reports an error
/// instead of faulting; decoders decide whether that error means "absent".
pub trait HostValue: Clone {
	/// Declared type spelling, e.g. `const json_node *`.
	fn type_name(&self) -> String;

	/// Unqualified type spelling with typedefs resolved, e.g. `_event` for `const event`.
	fn resolved_type_name(&self) -> String;

	/// Whether the value is a pointer.
	fn is_pointer(&self) -> bool;

	/// Whether the value is a plain struct (not a pointer to one).
	fn is_struct(&self) -> bool;

	/// Field layout of a struct value, empty for everything else.
	fn fields(&self) -> Vec<FieldDescriptor>;

	/// Read a named field of a struct value.
	fn field(&self, name: &str) -> Result<Self>;

	/// Follow a pointer to its target.
	fn dereference(&self) -> Result<Self>;

	/// Integer interpretation of scalars, enums, and pointer addresses.
	fn as_int(&self) -> Result<i64>;

	/// Pointer arithmetic in units of the target type.
	fn add(&self, offset: usize) -> Result<Self>;

	/// Reinterpret the value as another type looked up by spelling.
	fn cast(&self, type_name: &str) -> Result<Self>;

	/// Storage address for values that live in memory.
	fn address(&self) -> Option<u64>;

	/// Spelling of the pointed-to type for pointers.
	fn target_type_name(&self) -> Option<String>;

	/// Read a zero-terminated string through a `char *`, up to `max_len` bytes.
	fn read_string(&self, max_len: usize) -> Result<String>;

	/// Host default textual rendering.
	fn render(&self) -> String;
}

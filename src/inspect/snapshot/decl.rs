use std::fmt;
use std::sync::Arc;

use crate::inspect::{InspectError, Result};

/// Parsed C type spelling: base name, `const` qualifier, and pointer depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDecl {
	/// Base type name without qualifiers or stars.
	pub base: Arc<str>,
	/// Pointer nesting depth (`*`, `**`, ...).
	pub ptr_depth: u8,
	/// Whether the spelling carried a leading `const`.
	pub is_const: bool,
}

impl TypeDecl {
	/// Unqualified, non-pointer declaration of `base`.
	pub fn named(base: impl Into<Arc<str>>) -> Self {
		Self {
			base: base.into(),
			ptr_depth: 0,
			is_const: false,
		}
	}

	/// Declaration of a pointer to this type.
	pub fn pointer_to(&self) -> Self {
		Self {
			ptr_depth: self.ptr_depth.saturating_add(1),
			..self.clone()
		}
	}

	/// Declaration of the pointed-to type, or `None` for non-pointers.
	pub fn pointee(&self) -> Option<Self> {
		let ptr_depth = self.ptr_depth.checked_sub(1)?;
		Some(Self { ptr_depth, ..self.clone() })
	}
}

impl fmt::Display for TypeDecl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_const {
			f.write_str("const ")?;
		}
		f.write_str(&self.base)?;
		if self.ptr_depth > 0 {
			f.write_str(" ")?;
			for _ in 0..self.ptr_depth {
				f.write_str("*")?;
			}
		}
		Ok(())
	}
}

/// Parse spellings like `json_node`, `const event *`, `struct _event*`, or `char **`.
pub fn parse_type_decl(raw: &str) -> Result<TypeDecl> {
	let invalid = || InspectError::InvalidTypeSpelling { spelling: raw.to_owned() };

	let trimmed = raw.trim();
	let stars_start = trimmed.find('*').unwrap_or(trimmed.len());
	let (head, stars) = trimmed.split_at(stars_start);

	let mut ptr_depth = 0_u8;
	for ch in stars.chars() {
		match ch {
			'*' => ptr_depth = ptr_depth.checked_add(1).ok_or_else(invalid)?,
			c if c.is_whitespace() => {}
			_ => return Err(invalid()),
		}
	}

	let mut is_const = false;
	let mut words = Vec::new();
	for word in head.split_whitespace() {
		match word {
			"const" | "volatile" => is_const |= word == "const",
			"struct" | "enum" | "union" if words.is_empty() => {}
			_ => words.push(word),
		}
	}

	if words.is_empty() {
		return Err(invalid());
	}
	let base = words.join(" ");
	if !base.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b' ') {
		return Err(invalid());
	}

	Ok(TypeDecl {
		base: Arc::from(base),
		ptr_depth,
		is_const,
	})
}

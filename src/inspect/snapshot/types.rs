use std::collections::HashMap;
use std::sync::Arc;

use crate::inspect::snapshot::decl::{TypeDecl, parse_type_decl};
use crate::inspect::snapshot::file::{BitRange, TypeDef};
use crate::inspect::{Endianness, InspectError, Result};

const MAX_ALIAS_DEPTH: usize = 32;

/// Resolved type information for a non-pointer base type.
#[derive(Debug, Clone)]
pub enum TypeKind {
	/// `void`; only pointers to it are meaningful.
	Void,
	/// Integer.
	Int {
		/// Width in bytes.
		size: usize,
		/// Two's complement signedness.
		signed: bool,
	},
	/// IEEE float.
	Float {
		/// Width in bytes.
		size: usize,
	},
	/// Boolean.
	Bool {
		/// Width in bytes.
		size: usize,
	},
	/// Single-byte character.
	Char,
	/// Enumeration.
	Enum {
		/// Width in bytes.
		size: usize,
		/// `(name, value)` enumerators in declaration order.
		variants: Vec<(Box<str>, i64)>,
	},
	/// Struct.
	Struct {
		/// Total size in bytes.
		size: usize,
		/// Fields in declaration order.
		fields: Vec<FieldLayout>,
	},
	/// Typedef.
	Alias {
		/// Target declaration.
		target: TypeDecl,
	},
	/// Function type.
	Function,
}

impl TypeKind {
	/// Stable lowercase label.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Void => "void",
			Self::Int { .. } => "int",
			Self::Float { .. } => "float",
			Self::Bool { .. } => "bool",
			Self::Char => "char",
			Self::Enum { .. } => "enum",
			Self::Struct { .. } => "struct",
			Self::Alias { .. } => "alias",
			Self::Function => "function",
		}
	}
}

/// One struct field with its parsed type.
#[derive(Debug, Clone)]
pub struct FieldLayout {
	/// Field name.
	pub name: Box<str>,
	/// Declared field type.
	pub ty: TypeDecl,
	/// Byte offset inside the struct.
	pub offset: usize,
	/// Bit-field placement.
	pub bits: Option<BitRange>,
}

/// Type layout of the inspected process.
#[derive(Debug)]
pub struct TypeTable {
	/// Pointer width in bytes.
	pub pointer_size: usize,
	/// Byte order.
	pub endianness: Endianness,
	kinds: HashMap<Arc<str>, TypeKind>,
	order: Vec<Arc<str>>,
}

impl TypeTable {
	/// Build and validate a type table; every referenced type must be defined.
	pub fn build(pointer_size: usize, endianness: Endianness, defs: &[TypeDef]) -> Result<Self> {
		if !matches!(pointer_size, 4 | 8) {
			return Err(InspectError::UnsupportedPointerSize { size: pointer_size });
		}

		let mut table = Self {
			pointer_size,
			endianness,
			kinds: HashMap::new(),
			order: Vec::new(),
		};
		table.insert("void", TypeKind::Void)?;

		for def in defs {
			let kind = match def {
				TypeDef::Int { size, signed, .. } => TypeKind::Int { size: *size, signed: *signed },
				TypeDef::Float { size, .. } => TypeKind::Float { size: *size },
				TypeDef::Bool { size, .. } => TypeKind::Bool { size: *size },
				TypeDef::Char { .. } => TypeKind::Char,
				TypeDef::Enum { size, variants, .. } => TypeKind::Enum {
					size: *size,
					variants: variants.iter().map(|item| (item.name.as_str().into(), item.value)).collect(),
				},
				TypeDef::Struct { size, fields, .. } => {
					let mut layout = Vec::with_capacity(fields.len());
					for field in fields {
						layout.push(FieldLayout {
							name: field.name.as_str().into(),
							ty: parse_type_decl(&field.ty)?,
							offset: field.offset,
							bits: field.bits,
						});
					}
					TypeKind::Struct { size: *size, fields: layout }
				}
				TypeDef::Alias { target, .. } => TypeKind::Alias {
					target: parse_type_decl(target)?,
				},
				TypeDef::Function { .. } => TypeKind::Function,
			};
			table.insert(def.name(), kind)?;
		}

		table.validate()?;
		Ok(table)
	}

	fn insert(&mut self, name: &str, kind: TypeKind) -> Result<()> {
		let key: Arc<str> = Arc::from(name);
		if self.kinds.contains_key(&key) {
			return Err(InspectError::DuplicateType { name: name.to_owned() });
		}
		self.kinds.insert(key.clone(), kind);
		self.order.push(key);
		Ok(())
	}

	fn validate(&self) -> Result<()> {
		for name in &self.order {
			match &self.kinds[name] {
				TypeKind::Struct { fields, .. } => {
					for field in fields {
						self.canonical(&field.ty)?;
						if let Some(bits) = field.bits {
							let storage_bits = self.size_of(&field.ty)? * 8;
							if bits.width == 0 || usize::from(bits.shift) + usize::from(bits.width) > storage_bits {
								return Err(InspectError::InvalidBitField {
									type_name: name.to_string(),
									field: field.name.to_string(),
									shift: bits.shift,
									width: bits.width,
								});
							}
						}
					}
				}
				TypeKind::Alias { .. } => {
					self.canonical(&TypeDecl::named(name.clone()))?;
				}
				_ => {}
			}
		}
		Ok(())
	}

	/// Look up a base type by name without resolving typedefs.
	pub fn lookup(&self, name: &str) -> Option<&TypeKind> {
		self.kinds.get(name)
	}

	/// Type names in definition order, starting with `void`.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.order.iter().map(|name| name.as_ref())
	}

	/// Resolve typedefs at the base of `decl`, accumulating pointer depth.
	pub fn canonical(&self, decl: &TypeDecl) -> Result<TypeDecl> {
		let mut current = decl.clone();
		for _ in 0..MAX_ALIAS_DEPTH {
			let kind = self.lookup(&current.base).ok_or_else(|| InspectError::UnknownType {
				name: current.base.to_string(),
			})?;
			let TypeKind::Alias { target } = kind else {
				return Ok(current);
			};
			current = TypeDecl {
				base: target.base.clone(),
				ptr_depth: target.ptr_depth.saturating_add(current.ptr_depth),
				is_const: target.is_const || current.is_const,
			};
		}
		Err(InspectError::AliasCycle { name: decl.base.to_string() })
	}

	/// Base kind of a canonical non-pointer declaration.
	pub fn base_kind(&self, canonical: &TypeDecl) -> Result<&TypeKind> {
		self.lookup(&canonical.base).ok_or_else(|| InspectError::UnknownType {
			name: canonical.base.to_string(),
		})
	}

	/// Storage size of a declaration; `void` and functions count as one byte.
	pub fn size_of(&self, decl: &TypeDecl) -> Result<usize> {
		let canonical = self.canonical(decl)?;
		if canonical.ptr_depth > 0 {
			return Ok(self.pointer_size);
		}

		Ok(match self.base_kind(&canonical)? {
			TypeKind::Void | TypeKind::Function | TypeKind::Char => 1,
			TypeKind::Int { size, .. } | TypeKind::Float { size } | TypeKind::Bool { size } | TypeKind::Enum { size, .. } | TypeKind::Struct { size, .. } => *size,
			TypeKind::Alias { .. } => return Err(InspectError::AliasCycle { name: decl.base.to_string() }),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{TypeKind, TypeTable};
	use crate::inspect::Endianness;
	use crate::inspect::snapshot::decl::parse_type_decl;
	use crate::inspect::snapshot::file::{FieldDef, TypeDef};

	fn defs() -> Vec<TypeDef> {
		vec![
			TypeDef::Int {
				name: "int".into(),
				size: 4,
				signed: true,
			},
			TypeDef::Struct {
				name: "_event".into(),
				size: 16,
				fields: vec![
					FieldDef {
						name: "fd".into(),
						ty: "int".into(),
						offset: 0,
						bits: None,
					},
					FieldDef {
						name: "next".into(),
						ty: "struct _event *".into(),
						offset: 8,
						bits: None,
					},
				],
			},
			TypeDef::Alias {
				name: "event".into(),
				target: "_event".into(),
			},
			TypeDef::Alias {
				name: "event_ptr".into(),
				target: "event *".into(),
			},
		]
	}

	#[test]
	fn typedef_chain_resolves_with_pointer_depth() {
		let table = TypeTable::build(8, Endianness::Little, &defs()).expect("builds");
		let decl = parse_type_decl("const event_ptr *").expect("parses");
		let canonical = table.canonical(&decl).expect("resolves");
		assert_eq!(canonical.base.as_ref(), "_event");
		assert_eq!(canonical.ptr_depth, 2);
		assert!(canonical.is_const);
	}

	#[test]
	fn sizes_follow_pointer_width() {
		let table = TypeTable::build(4, Endianness::Little, &defs()).expect("builds");
		assert_eq!(table.size_of(&parse_type_decl("event").expect("parses")).expect("size"), 16);
		assert_eq!(table.size_of(&parse_type_decl("event *").expect("parses")).expect("size"), 4);
		assert_eq!(table.size_of(&parse_type_decl("void").expect("parses")).expect("size"), 1);
	}

	#[test]
	fn undefined_field_type_is_rejected() {
		let mut defs = defs();
		defs.push(TypeDef::Struct {
			name: "broken".into(),
			size: 8,
			fields: vec![FieldDef {
				name: "x".into(),
				ty: "missing_t".into(),
				offset: 0,
				bits: None,
			}],
		});
		assert!(TypeTable::build(8, Endianness::Little, &defs).is_err());
	}

	#[test]
	fn alias_cycle_and_duplicates_are_rejected() {
		let cyclic = vec![
			TypeDef::Alias {
				name: "a".into(),
				target: "b".into(),
			},
			TypeDef::Alias {
				name: "b".into(),
				target: "a".into(),
			},
		];
		assert!(TypeTable::build(8, Endianness::Little, &cyclic).is_err());

		let dup = vec![TypeDef::Char { name: "void".into() }];
		assert!(TypeTable::build(8, Endianness::Little, &dup).is_err());
	}

	#[test]
	fn bad_pointer_size_is_rejected() {
		assert!(TypeTable::build(2, Endianness::Little, &[]).is_err());
	}

	#[test]
	fn lookup_keeps_aliases_unresolved() {
		let table = TypeTable::build(8, Endianness::Little, &defs()).expect("builds");
		assert!(matches!(table.lookup("event"), Some(TypeKind::Alias { .. })));
		assert_eq!(table.names().next(), Some("void"));
	}
}

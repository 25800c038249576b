use crate::inspect::FieldDescriptor;

/// Closed-world field-name allow-list for one container shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
	/// Label used in logs.
	pub name: &'static str,
	/// Fields that must all be present.
	pub required: &'static [&'static str],
	/// Fields that may be present.
	pub optional: &'static [&'static str],
}

/// Growable array: `length`/`nofree` bit-fields, capacity, element size, storage.
pub const ARRAY_SHAPE: FieldShape = FieldShape {
	name: "array",
	required: &["length", "nofree", "bufsiz", "elements"],
	optional: &["elemsz"],
};

impl FieldShape {
	/// Return whether `fields` is a subset of the allow-list covering every required name.
	///
	/// A single unrecognized field rejects the match.
	pub fn matches(&self, fields: &[FieldDescriptor]) -> bool {
		let mut seen = vec![false; self.required.len()];

		for field in fields {
			let name = field.name.as_ref();
			if let Some(slot) = self.required.iter().position(|candidate| *candidate == name) {
				seen[slot] = true;
			} else if !self.optional.contains(&name) {
				return false;
			}
		}

		seen.into_iter().all(|present| present)
	}
}

use tracing::trace;

use crate::inspect::HostValue;

/// Follow `path` one field at a time, treating null/zero or a missing field as absence.
///
/// Pointers are dereferenced before each field read; structs are read in place.
/// Nothing past the first absent step is read.
pub fn deref_chain<V: HostValue>(root: Option<V>, path: &[&str]) -> Option<V> {
	let mut current = root?;

	for (step, name) in path.iter().enumerate() {
		if is_absent(&current) {
			trace!(step, field = name, "chain stopped at null");
			return None;
		}

		let target = if current.is_pointer() {
			match current.dereference() {
				Ok(target) => target,
				Err(err) => {
					trace!(step, field = name, %err, "chain dereference failed");
					return None;
				}
			}
		} else {
			current
		};

		current = match target.field(name) {
			Ok(value) => value,
			Err(err) => {
				trace!(step, field = name, %err, "chain field read failed");
				return None;
			}
		};
	}

	if is_absent(&current) { None } else { Some(current) }
}

/// Try candidate paths in order; the first one yielding a present value wins.
pub fn probe_chain<V: HostValue>(root: &V, paths: &[&[&str]]) -> Option<V> {
	paths.iter().find_map(|path| deref_chain(Some(root.clone()), path))
}

/// Null pointers, zero scalars, and unreadable scalars are absent; structs never are.
pub fn is_absent<V: HostValue>(value: &V) -> bool {
	if value.is_struct() {
		return false;
	}
	value.as_int().map_or(true, |raw| raw == 0)
}

use tracing::debug;

use crate::inspect::printer::{Children, Decoder, Shape, absorb};
use crate::inspect::{DisplayHint, HostValue, Result};

/// Growable array: `length` valid slots out of `bufsiz` behind `elements`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayDecoder;

impl<V: HostValue> Decoder<V> for ArrayDecoder {
	fn shape(&self) -> Shape {
		Shape::Array
	}

	fn describe(&self, value: &V) -> Option<String> {
		absorb(Shape::Array, describe_array(value))
	}

	fn children<'a>(&self, value: &'a V) -> Children<'a, V> {
		let Some((length, elements)) = absorb(Shape::Array, array_storage(value)) else {
			return Box::new(std::iter::empty());
		};

		Box::new((0..length).map_while(move |index| match elements.add(index).and_then(|slot| slot.dereference()) {
			Ok(item) => Some((index.to_string(), item)),
			Err(err) => {
				debug!(index, %err, "array element unreadable");
				None
			}
		}))
	}

	fn display_hint(&self, _value: &V) -> DisplayHint {
		DisplayHint::Sequence
	}
}

fn describe_array<V: HostValue>(value: &V) -> Result<String> {
	let length = value.field("length")?.as_int()?;
	let capacity = value.field("bufsiz")?.as_int()?;
	let element_type = value.field("elements")?.target_type_name().unwrap_or_else(|| "?".to_owned());
	Ok(format!("array<{element_type}> of length {length} capacity {capacity}"))
}

/// Valid slot count and the storage pointer; a negative length counts as empty.
fn array_storage<V: HostValue>(value: &V) -> Result<(usize, V)> {
	let length = usize::try_from(value.field("length")?.as_int()?).unwrap_or(0);
	let elements = value.field("elements")?;
	Ok((length, elements))
}

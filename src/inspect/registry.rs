use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::inspect::{ARRAY_SHAPE, ArrayDecoder, Decoder, EventDecoder, EventListDecoder, FieldShape, HostValue, JsonNodeDecoder};

/// Decoder table: exact type spellings first, then structural shapes.
pub struct Registry<V> {
	by_type: HashMap<Box<str>, Arc<dyn Decoder<V>>>,
	structural: Vec<(FieldShape, Arc<dyn Decoder<V>>)>,
}

impl<V: HostValue> Default for Registry<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V: HostValue> Registry<V> {
	/// Empty table; every value falls back to host rendering.
	pub fn new() -> Self {
		Self {
			by_type: HashMap::new(),
			structural: Vec::new(),
		}
	}

	/// Table with the built-in decoders installed.
	pub fn standard() -> Self {
		let mut registry = Self::new();

		let event_list: Arc<dyn Decoder<V>> = Arc::new(EventListDecoder);
		let json_node: Arc<dyn Decoder<V>> = Arc::new(JsonNodeDecoder);
		registry.register_type("event *", event_list.clone());
		registry.register_type("const event *", event_list);
		registry.register_type("json_node *", json_node.clone());
		registry.register_type("const json_node *", json_node);
		registry.register_type("_event", Arc::new(EventDecoder));
		registry.register_structural(ARRAY_SHAPE, Arc::new(ArrayDecoder));

		registry
	}

	/// Bind a decoder to an exact type spelling; a later binding replaces an earlier one.
	pub fn register_type(&mut self, spelling: &str, decoder: Arc<dyn Decoder<V>>) -> &mut Self {
		self.by_type.insert(spelling.into(), decoder);
		self
	}

	/// Append a structural entry, consulted in registration order.
	pub fn register_structural(&mut self, shape: FieldShape, decoder: Arc<dyn Decoder<V>>) -> &mut Self {
		self.structural.push((shape, decoder));
		self
	}

	/// Number of installed entries.
	pub fn len(&self) -> usize {
		self.by_type.len() + self.structural.len()
	}

	/// Whether no decoder is installed.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Pick the decoder for `value`: declared spelling, resolved spelling, then shape.
	///
	/// Structural entries only apply to plain structs, never to pointers.
	pub fn classify(&self, value: &V) -> Option<&dyn Decoder<V>> {
		let declared = value.type_name();
		if let Some(decoder) = self.by_type.get(declared.as_str()) {
			trace!(type_name = %declared, shape = %decoder.shape(), "matched declared type");
			return Some(decoder.as_ref());
		}

		let resolved = value.resolved_type_name();
		if resolved != declared {
			if let Some(decoder) = self.by_type.get(resolved.as_str()) {
				trace!(type_name = %resolved, shape = %decoder.shape(), "matched resolved type");
				return Some(decoder.as_ref());
			}
		}

		if self.structural.is_empty() || value.is_pointer() || !value.is_struct() {
			return None;
		}

		let fields = value.fields();
		self.structural.iter().find(|(shape, _)| shape.matches(&fields)).map(|(shape, decoder)| {
			trace!(type_name = %declared, shape = shape.name, "matched field shape");
			decoder.as_ref()
		})
	}
}

use std::fmt;

use tracing::debug;

use crate::inspect::{DisplayHint, HostValue, Result};

mod array;
mod event;
mod json;

pub use array::ArrayDecoder;
pub use event::{EventDecoder, EventKind, EventListDecoder};
pub use json::{JsonNodeDecoder, JsonTag, MEMBER_LIST_LAYOUTS};

/// Upper bound on bytes read for one foreign string.
pub(crate) const STRING_READ_LIMIT: usize = 1 << 16;

/// Lazy `(label, child)` sequence; dropping it early needs no cleanup.
pub type Children<'a, V> = Box<dyn Iterator<Item = (String, V)> + 'a>;

/// Closed set of shapes this crate knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
	/// Growable array matched by field names.
	Array,
	/// Pointer to the head of an event queue.
	EventList,
	/// One event queue node.
	Event,
	/// Pointer to a tagged JSON node.
	JsonNode,
}

impl Shape {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Array => "array",
			Self::EventList => "event_list",
			Self::Event => "event",
			Self::JsonNode => "json_node",
		}
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Per-shape rendering: a one-line description plus lazily produced children.
///
/// Decoders never fail: unreadable memory becomes an absent description or an
/// empty enumeration.
pub trait Decoder<V: HostValue> {
	/// Shape handled by this decoder.
	fn shape(&self) -> Shape;

	/// One-line description, absent when there is nothing to say.
	fn describe(&self, value: &V) -> Option<String>;

	/// Lazily produced children.
	fn children<'a>(&self, value: &'a V) -> Children<'a, V> {
		let _ = value;
		Box::new(std::iter::empty())
	}

	/// How the host should lay out children.
	fn display_hint(&self, value: &V) -> DisplayHint {
		let _ = value;
		DisplayHint::None
	}
}

/// Convert a failed read into absence, logging it.
pub(crate) fn absorb<T>(shape: Shape, result: Result<T>) -> Option<T> {
	match result {
		Ok(value) => Some(value),
		Err(err) => {
			debug!(%shape, %err, "read absorbed");
			None
		}
	}
}

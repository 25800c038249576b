use tracing::debug;

use crate::inspect::printer::{Children, Decoder, STRING_READ_LIMIT, Shape, absorb};
use crate::inspect::{DisplayHint, HostValue, LinkWalk, Result, Termination, WalkOptions, deref_chain, is_absent};

/// Candidate paths from a `json_object` to its member list, tried in order.
///
/// Different builds of the hashmap store the list inline, behind `members`, or both.
pub const MEMBER_LIST_LAYOUTS: &[&[&str]] = &[&["members", "entries_list"], &["entries_list"], &["members"]];

/// Discriminant of a JSON node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonTag {
	/// `null`.
	Null,
	/// Signed integer payload.
	Integer,
	/// Floating point payload.
	Double,
	/// Boolean payload.
	Boolean,
	/// C string payload.
	String,
	/// Ordered node array.
	Array,
	/// Keyed member list.
	Object,
	/// Placeholder for elided content.
	Ellipsis,
	/// Opaque pointer payload.
	Pointer,
}

impl JsonTag {
	/// Map a `json_node_type_*` enumerator name to a tag.
	pub fn from_enumerator(name: &str) -> Option<Self> {
		Some(match name.strip_prefix("json_node_type_")? {
			"null" => Self::Null,
			"integer" => Self::Integer,
			"double" => Self::Double,
			"boolean" => Self::Boolean,
			"string" => Self::String,
			"array" => Self::Array,
			"object" => Self::Object,
			"ellipsis" => Self::Ellipsis,
			"pointer" => Self::Pointer,
			_ => return None,
		})
	}

	/// Struct that carries this tag's payload.
	pub fn payload_type(self) -> &'static str {
		match self {
			Self::Null => "json_null",
			Self::Integer => "json_integer",
			Self::Double => "json_double",
			Self::Boolean => "json_boolean",
			Self::String => "json_string",
			Self::Array => "json_array",
			Self::Object => "json_object",
			Self::Ellipsis => "json_ellipsis",
			Self::Pointer => "json_pointer",
		}
	}
}

/// Result of reading a node's tag.
enum TagRead {
	Known(JsonTag),
	Unknown,
}

/// Tagged JSON node behind a `json_node *`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNodeDecoder;

impl<V: HostValue> Decoder<V> for JsonNodeDecoder {
	fn shape(&self) -> Shape {
		Shape::JsonNode
	}

	fn describe(&self, value: &V) -> Option<String> {
		if is_absent(value) {
			return None;
		}

		let tag = match read_tag(value)? {
			TagRead::Known(tag) => tag,
			TagRead::Unknown => {
				let address = value.as_int().unwrap_or(0) as u64;
				return Some(format!("[unknown json node type] @ 0x{address:x}"));
			}
		};

		match tag {
			JsonTag::Null => Some("null".to_owned()),
			JsonTag::Ellipsis => Some("...".to_owned()),
			JsonTag::Integer | JsonTag::Double | JsonTag::Boolean | JsonTag::Pointer => absorb(Shape::JsonNode, payload(value, tag)?.field("value")).map(|item| item.render()),
			JsonTag::String => absorb(
				Shape::JsonNode,
				payload(value, tag)?.field("value").and_then(|item| item.read_string(STRING_READ_LIMIT)),
			),
			JsonTag::Array => {
				let count = absorb(Shape::JsonNode, payload(value, tag)?.field("num_elements").and_then(|item| item.as_int()))?;
				Some(if count == 0 { "{}".to_owned() } else { format!("array with {count} elements") })
			}
			JsonTag::Object => Some(match member_list(value) {
				Some(list) => format!("object with {} members", list.count),
				None => "{}".to_owned(),
			}),
		}
	}

	fn children<'a>(&self, value: &'a V) -> Children<'a, V> {
		match read_tag(value) {
			Some(TagRead::Known(JsonTag::Array)) => array_children(value),
			Some(TagRead::Known(JsonTag::Object)) => object_children(value),
			_ => Box::new(std::iter::empty()),
		}
	}

	fn display_hint(&self, value: &V) -> DisplayHint {
		match read_tag(value) {
			Some(TagRead::Known(JsonTag::String)) => DisplayHint::Scalar,
			Some(TagRead::Known(JsonTag::Array)) => DisplayHint::Sequence,
			Some(TagRead::Known(JsonTag::Object)) => DisplayHint::Mapping,
			_ => DisplayHint::None,
		}
	}
}

/// Tag of a non-null node; `None` when the node or its tag cannot be read.
///
/// The tag is read as an integer first so unmapped memory is not mistaken for an unknown tag.
fn read_tag<V: HostValue>(node: &V) -> Option<TagRead> {
	if is_absent(node) {
		return None;
	}
	let tag = absorb(Shape::JsonNode, node.dereference().and_then(|target| target.field("node_type")))?;
	absorb(Shape::JsonNode, tag.as_int())?;
	Some(match JsonTag::from_enumerator(&tag.render()) {
		Some(tag) => TagRead::Known(tag),
		None => TagRead::Unknown,
	})
}

/// Payload struct for `tag`, read through the node pointer.
fn payload<V: HostValue>(node: &V, tag: JsonTag) -> Option<V> {
	absorb(Shape::JsonNode, payload_pointer(node, tag).and_then(|pointer| pointer.dereference()))
}

fn payload_pointer<V: HostValue>(node: &V, tag: JsonTag) -> Result<V> {
	node.cast(&format!("{} *", tag.payload_type()))
}

fn array_children<'a, V: HostValue>(node: &'a V) -> Children<'a, V> {
	let storage = payload(node, JsonTag::Array).and_then(|array| {
		let count = absorb(Shape::JsonNode, array.field("num_elements").and_then(|item| item.as_int()))?;
		let elements = absorb(Shape::JsonNode, array.field("elements"))?;
		Some((usize::try_from(count).unwrap_or(0), elements))
	});
	let Some((count, elements)) = storage else {
		return Box::new(std::iter::empty());
	};

	Box::new((0..count).map_while(move |index| match elements.add(index).and_then(|slot| slot.dereference()) {
		Ok(item) => Some((index.to_string(), item)),
		Err(err) => {
			debug!(index, %err, "json array element unreadable");
			None
		}
	}))
}

/// Located member list of an object node.
struct MemberList<V> {
	count: i64,
	head: Option<V>,
	tail: Option<u64>,
}

/// First layout whose `length` is present and non-zero; `None` means no members.
fn member_list<V: HostValue>(node: &V) -> Option<MemberList<V>> {
	let object = absorb(Shape::JsonNode, payload_pointer(node, JsonTag::Object))?;

	MEMBER_LIST_LAYOUTS.iter().find_map(|layout| {
		let count = deref_chain(Some(object.clone()), &extend(layout, "length"))?.as_int().ok()?;
		let head = deref_chain(Some(object.clone()), &extend(layout, "head"));
		let tail = deref_chain(Some(object.clone()), &extend(layout, "tail")).and_then(|item| item.as_int().ok());
		debug!(layout = layout.join("."), count, "json member list located");
		Some(MemberList {
			count,
			head,
			tail: tail.map(|raw| raw as u64),
		})
	})
}

fn extend<'p>(layout: &[&'p str], last: &'p str) -> Vec<&'p str> {
	let mut path = layout.to_vec();
	path.push(last);
	path
}

fn object_children<'a, V: HostValue>(node: &'a V) -> Children<'a, V> {
	let Some(list) = member_list(node) else {
		return Box::new(std::iter::empty());
	};
	let Some(head_address) = list.head.as_ref().and_then(|head| head.as_int().ok()) else {
		return Box::new(std::iter::empty());
	};

	let termination = Termination::Sentinel {
		head: head_address as u64,
		tail: list.tail,
	};
	let walk = LinkWalk::new(list.head, termination, WalkOptions::default());
	Box::new(walk.map_while(|(index, link)| match member_entry(&link) {
		Ok(pair) => Some(pair),
		Err(err) => {
			debug!(index, %err, "json object member unreadable");
			None
		}
	}))
}

/// `(key, value)` stored in one list node's hashmap entry.
fn member_entry<V: HostValue>(link: &V) -> Result<(String, V)> {
	let entry = link.dereference()?.field("data")?.cast("ptr_hashmap_entry *")?.dereference()?;
	let key = entry.field("key")?.cast("char *")?.read_string(STRING_READ_LIMIT)?;
	let value = entry.field("value")?.cast("json_node *")?;
	Ok((key, value))
}

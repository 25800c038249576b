use std::fmt::Write as _;

use serde::Serialize;
use tracing::debug;

use crate::inspect::{Children, DisplayHint, HostValue, Registry};

/// Depth, width, and string limits for one render.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
	/// Maximum nesting depth; deeper children are not produced.
	pub max_depth: usize,
	/// Maximum children pulled per node.
	pub max_children: usize,
	/// Maximum characters kept from a description.
	pub max_string_len: usize,
	/// Consult the decoder registry; off means host default rendering only.
	pub use_printers: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			max_depth: 6,
			max_children: 64,
			max_string_len: 200,
			use_printers: true,
		}
	}
}

impl RenderOptions {
	/// Preset for one-screen summaries.
	pub fn compact() -> Self {
		Self {
			max_depth: 3,
			max_children: 8,
			max_string_len: 60,
			..Self::default()
		}
	}
}

/// One rendered value with its children.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
	/// Label assigned by the parent (index, key, or field name).
	pub label: String,
	/// Declared type spelling.
	pub type_name: String,
	/// Decoder shape that produced this node, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shape: Option<&'static str>,
	/// One-line description or host rendering.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Child layout.
	pub hint: DisplayHint,
	/// Produced children.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<Node>,
	/// Children exist but the depth limit stopped expansion.
	#[serde(skip_serializing_if = "is_false")]
	pub truncated: bool,
	/// More children exist than the width limit allowed.
	#[serde(skip_serializing_if = "is_false")]
	pub elided: bool,
}

fn is_false(value: &bool) -> bool {
	!*value
}

/// Render `value` and its descendants, pulling children lazily up to the limits.
pub fn render_tree<V: HostValue>(registry: &Registry<V>, label: &str, value: &V, options: &RenderOptions) -> Node {
	render_node(registry, label.to_owned(), value, options, 0)
}

fn render_node<V: HostValue>(registry: &Registry<V>, label: String, value: &V, options: &RenderOptions, depth: usize) -> Node {
	let decoder = if options.use_printers { registry.classify(value) } else { None };

	let mut node = Node {
		label,
		type_name: value.type_name(),
		shape: None,
		text: None,
		hint: DisplayHint::None,
		children: Vec::new(),
		truncated: false,
		elided: false,
	};

	let mut children = match decoder {
		Some(decoder) => {
			node.shape = Some(decoder.shape().as_str());
			node.text = decoder.describe(value).map(|text| truncate(&text, options.max_string_len));
			node.hint = decoder.display_hint(value);
			decoder.children(value)
		}
		None if value.is_struct() => struct_fields(value),
		None => {
			node.text = Some(truncate(&value.render(), options.max_string_len));
			return node;
		}
	};

	if depth >= options.max_depth {
		node.truncated = children.next().is_some();
		return node;
	}

	for (child_label, child) in children.by_ref().take(options.max_children) {
		node.children.push(render_node(registry, child_label, &child, options, depth + 1));
	}
	node.elided = children.next().is_some();
	node
}

/// Host default children of a struct: its fields in declaration order.
fn struct_fields<'a, V: HostValue>(value: &'a V) -> Children<'a, V> {
	Box::new(value.fields().into_iter().filter_map(move |field| match value.field(&field.name) {
		Ok(child) => Some((field.name.to_string(), child)),
		Err(err) => {
			debug!(field = %field.name, %err, "struct field unreadable");
			None
		}
	}))
}

/// Text layout of a rendered tree, one node per line.
pub fn format_tree(node: &Node) -> String {
	let mut out = String::new();
	write_node(&mut out, node, &node.label, 0);
	out
}

fn write_node(out: &mut String, node: &Node, label: &str, indent: usize) {
	let pad = "  ".repeat(indent);
	let text = match (&node.text, node.hint) {
		(Some(text), DisplayHint::Scalar) => format!("{text:?}"),
		(Some(text), _) => text.clone(),
		(None, _) => node.type_name.clone(),
	};

	if node.truncated {
		let _ = writeln!(out, "{pad}{label} = {text} {{ ... }}");
		return;
	}
	if node.children.is_empty() && !node.elided {
		let _ = writeln!(out, "{pad}{label} = {text}");
		return;
	}

	let _ = writeln!(out, "{pad}{label} = {text} {{");
	for child in &node.children {
		let child_label = match node.hint {
			DisplayHint::Sequence => format!("[{}]", child.label),
			DisplayHint::Mapping => format!("[{:?}]", child.label),
			DisplayHint::Scalar | DisplayHint::None => child.label.clone(),
		};
		write_node(out, child, &child_label, indent + 1);
	}
	if node.elided {
		let _ = writeln!(out, "{pad}  ...");
	}
	let _ = writeln!(out, "{pad}}}");
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}

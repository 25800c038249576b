//! Snapshot fixtures modelling the event loop, JSON tree, and growable array layouts.

#![allow(dead_code)]

use shapeprint::inspect::snapshot::{bit_field, field};
use shapeprint::inspect::{Snapshot, SnapshotBuilder};

pub const EVENT_SIZE: usize = 80;
pub const CALLBACK_ADDR: u64 = 0x40_0000;
pub const THREAD_PROC_ADDR: u64 = 0x40_0100;

pub const EVENT_DEFAULT: i32 = 0;
pub const EVENT_BG_TASK: i32 = 1;
pub const EVENT_SUBPROCESS: i32 = 2;
pub const EVENT_IO_READ: i32 = 3;
pub const EVENT_IO_WRITE: i32 = 4;

/// Where a `json_object` keeps its member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLayout {
	/// `members` is a hashmap whose `entries_list` is the list.
	Hashmap,
	/// `entries_list` is the list.
	EntriesList,
	/// `members` is the list.
	Members,
}

impl MemberLayout {
	pub const ALL: [MemberLayout; 3] = [MemberLayout::Hashmap, MemberLayout::EntriesList, MemberLayout::Members];
}

/// Fields of one event node.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventInit {
	pub kind: i32,
	pub ready: bool,
	pub canceled: bool,
	/// `fd` or `process`, sharing the union slot.
	pub handle: i32,
	pub thread_proc: u64,
	pub thread_data: u64,
	pub callback: u64,
	pub callback_data: u64,
}

/// Bump allocator over a [`SnapshotBuilder`] with the C layouts preinstalled.
pub struct Heap {
	builder: SnapshotBuilder,
	next: u64,
	layout: MemberLayout,
	member_links: Vec<u64>,
}

impl Heap {
	pub fn new() -> Self {
		Self::with_layout(MemberLayout::Hashmap)
	}

	pub fn with_layout(layout: MemberLayout) -> Self {
		let mut builder = SnapshotBuilder::new();
		builder.c_primitives();
		install_event_types(&mut builder);
		install_json_types(&mut builder, layout);
		install_array_types(&mut builder);
		builder.symbol(CALLBACK_ADDR, "on_ready").symbol(THREAD_PROC_ADDR, "worker_main");

		Self {
			builder,
			next: 0x10_0000,
			layout,
			member_links: Vec::new(),
		}
	}

	pub fn builder(&mut self) -> &mut SnapshotBuilder {
		&mut self.builder
	}

	pub fn build(&self) -> Snapshot {
		self.builder.build().expect("fixture snapshot builds")
	}

	/// Zero-filled block, 16-byte aligned, never adjacent to the previous one.
	pub fn alloc(&mut self, size: usize) -> u64 {
		let address = self.next;
		self.builder.alloc(address, size);
		self.next += (size as u64).div_ceil(16) * 16 + 16;
		address
	}

	pub fn cstr(&mut self, text: &str) -> u64 {
		let address = self.next;
		self.builder.cstr(address, text);
		self.next += (text.len() as u64 + 1).div_ceil(16) * 16 + 16;
		address
	}

	// Event loop

	pub fn event(&mut self, init: EventInit) -> u64 {
		let address = self.alloc(EVENT_SIZE);
		self.builder
			.write_i32(address, init.kind)
			.write(address + 4, vec![u8::from(init.canceled), u8::from(init.ready)])
			.write_i32(address + 16, init.handle)
			.write_ptr(address + 24, init.thread_proc)
			.write_ptr(address + 32, init.thread_data)
			.write_ptr(address + 40, init.callback)
			.write_ptr(address + 48, init.callback_data);
		address
	}

	pub fn set_next(&mut self, event: u64, next: u64) {
		self.builder.write_ptr(event + 72, next);
	}

	/// Allocate `count` default events linked in order, returning their addresses.
	pub fn event_chain(&mut self, count: usize) -> Vec<u64> {
		let nodes: Vec<u64> = (0..count)
			.map(|index| {
				self.event(EventInit {
					callback: CALLBACK_ADDR,
					callback_data: 0x100 + index as u64,
					..EventInit::default()
				})
			})
			.collect();
		for pair in nodes.windows(2) {
			self.set_next(pair[0], pair[1]);
		}
		nodes
	}

	// JSON tree

	fn node(&mut self, tag: i32, size: usize) -> u64 {
		let address = self.alloc(size);
		self.builder.write_i32(address, tag);
		address
	}

	pub fn json_null(&mut self) -> u64 {
		self.node(0, 8)
	}

	pub fn json_int(&mut self, value: i64) -> u64 {
		let address = self.node(1, 16);
		self.builder.write_i64(address + 8, value);
		address
	}

	pub fn json_double(&mut self, value: f64) -> u64 {
		let address = self.node(2, 16);
		self.builder.write_f64(address + 8, value);
		address
	}

	pub fn json_bool(&mut self, value: bool) -> u64 {
		let address = self.node(3, 16);
		self.builder.write(address + 8, vec![u8::from(value)]);
		address
	}

	pub fn json_string(&mut self, text: &str) -> u64 {
		let chars = self.cstr(text);
		let address = self.node(4, 16);
		self.builder.write_ptr(address + 8, chars);
		address
	}

	pub fn json_array(&mut self, items: &[u64]) -> u64 {
		let storage = self.alloc((items.len().max(1)) * 8);
		for (index, item) in items.iter().enumerate() {
			self.builder.write_ptr(storage + index as u64 * 8, *item);
		}
		let address = self.node(5, 32);
		self.builder
			.write_ptr(address + 8, storage)
			.write_ptr(address + 16, items.len().max(1) as u64)
			.write_ptr(address + 24, items.len() as u64);
		address
	}

	pub fn json_ellipsis(&mut self) -> u64 {
		self.node(7, 8)
	}

	pub fn json_pointer(&mut self, value: u64) -> u64 {
		let address = self.node(8, 16);
		self.builder.write_ptr(address + 8, value);
		address
	}

	pub fn json_unknown(&mut self) -> u64 {
		self.node(42, 8)
	}

	/// Object whose member list is null-terminated and records its tail.
	pub fn json_object(&mut self, members: &[(&str, u64)]) -> u64 {
		let list = self.member_list(members, false);
		self.object_with_list(list)
	}

	/// Object whose member list closes back on its head and records no tail.
	pub fn json_object_circular(&mut self, members: &[(&str, u64)]) -> u64 {
		let list = self.member_list(members, true);
		self.builder.write_ptr(list + 8, 0);
		self.object_with_list(list)
	}

	/// Object without any member container.
	pub fn json_object_bare(&mut self) -> u64 {
		self.node(6, 16)
	}

	/// `ptr_list` holding `members`, returning the list address.
	fn member_list(&mut self, members: &[(&str, u64)], circular: bool) -> u64 {
		let links: Vec<u64> = members
			.iter()
			.map(|(key, value)| {
				let key = self.cstr(key);
				let entry = self.alloc(16);
				self.builder.write_ptr(entry, key).write_ptr(entry + 8, *value);
				let link = self.alloc(24);
				self.builder.write_ptr(link, entry);
				link
			})
			.collect();

		for pair in links.windows(2) {
			self.builder.write_ptr(pair[0] + 8, pair[1]).write_ptr(pair[1] + 16, pair[0]);
		}
		if circular {
			if let (Some(first), Some(last)) = (links.first(), links.last()) {
				self.builder.write_ptr(last + 8, *first).write_ptr(first + 16, *last);
			}
		}

		let list = self.alloc(24);
		self.member_links = links.clone();
		self.builder
			.write_ptr(list, links.first().copied().unwrap_or(0))
			.write_ptr(list + 8, links.last().copied().unwrap_or(0))
			.write_ptr(list + 16, links.len() as u64);
		list
	}

	/// Links of the most recently built member list, in order.
	pub fn member_links(&self) -> &[u64] {
		&self.member_links
	}

	/// Point member link `link` at `next`.
	pub fn set_member_next(&mut self, link: u64, next: u64) {
		self.builder.write_ptr(link + 8, next);
	}

	fn object_with_list(&mut self, list: u64) -> u64 {
		let address = self.node(6, 16);
		match self.layout {
			MemberLayout::Hashmap => {
				let map = self.alloc(16);
				self.builder.write_ptr(map, list).write_ptr(address + 8, map);
			}
			MemberLayout::EntriesList | MemberLayout::Members => {
				self.builder.write_ptr(address + 8, list);
			}
		}
		address
	}

	// Growable arrays

	/// `int_array` with `values` stored and `capacity` slots.
	pub fn int_array(&mut self, values: &[i32], capacity: usize) -> u64 {
		let storage = self.alloc(capacity.max(values.len()).max(1) * 4);
		for (index, value) in values.iter().enumerate() {
			self.builder.write_i32(storage + index as u64 * 4, *value);
		}
		let address = self.alloc(32);
		self.builder
			.write_uint(address, 4, values.len() as u64 | (1 << 31))
			.write_ptr(address + 8, capacity as u64)
			.write_ptr(address + 16, 4)
			.write_ptr(address + 24, storage);
		address
	}

	/// Overwrite the `length` bit-field of an array without touching storage.
	pub fn set_array_length(&mut self, array: u64, length: u32) {
		self.builder.write_uint(array, 4, u64::from(length) | (1 << 31));
	}
}

impl Default for Heap {
	fn default() -> Self {
		Self::new()
	}
}

fn install_event_types(builder: &mut SnapshotBuilder) {
	builder
		.enum_type(
			"event_type",
			4,
			&[
				("event_type_default", 0),
				("event_type_bg_task", 1),
				("event_type_subprocess", 2),
				("event_type_io_read", 3),
				("event_type_io_write", 4),
			],
		)
		.function_type("event_callback")
		.function_type("thread_proc_fn")
		.struct_type(
			"_event",
			EVENT_SIZE,
			vec![
				field("type", "event_type", 0),
				field("is_canceled", "bool", 4),
				field("is_ready", "bool", 5),
				field("io_errno", "int", 8),
				field("fd", "int", 16),
				field("process", "int", 16),
				field("thread", "unsigned long", 16),
				field("thread_proc", "thread_proc_fn *", 24),
				field("thread_data", "void *", 32),
				field("callback", "event_callback *", 40),
				field("callback_data", "void *", 48),
				field("loop", "void *", 56),
				field("result", "void *", 64),
				field("next", "struct _event *", 72),
			],
		)
		.alias("event", "_event");
}

fn install_json_types(builder: &mut SnapshotBuilder, layout: MemberLayout) {
	builder
		.enum_type(
			"json_node_type",
			4,
			&[
				("json_node_type_null", 0),
				("json_node_type_integer", 1),
				("json_node_type_double", 2),
				("json_node_type_boolean", 3),
				("json_node_type_string", 4),
				("json_node_type_array", 5),
				("json_node_type_object", 6),
				("json_node_type_ellipsis", 7),
				("json_node_type_pointer", 8),
			],
		)
		.struct_type("json_node", 8, vec![field("node_type", "json_node_type", 0)])
		.struct_type("json_null", 8, vec![field("parent_struct", "json_node", 0)])
		.struct_type("json_ellipsis", 8, vec![field("parent_struct", "json_node", 0)])
		.struct_type("json_integer", 16, vec![field("parent_struct", "json_node", 0), field("value", "int64_t", 8)])
		.struct_type("json_double", 16, vec![field("parent_struct", "json_node", 0), field("value", "double", 8)])
		.struct_type("json_boolean", 16, vec![field("parent_struct", "json_node", 0), field("value", "bool", 8)])
		.struct_type("json_string", 16, vec![field("parent_struct", "json_node", 0), field("value", "char *", 8)])
		.struct_type("json_pointer", 16, vec![field("parent_struct", "json_node", 0), field("value", "void *", 8)])
		.struct_type(
			"json_array",
			32,
			vec![
				field("parent_struct", "json_node", 0),
				field("elements", "json_node **", 8),
				field("buffer_size", "size_t", 16),
				field("num_elements", "size_t", 24),
			],
		)
		.struct_type("ptr_list", 24, vec![field("head", "ptr_list_node *", 0), field("tail", "ptr_list_node *", 8), field("length", "size_t", 16)])
		.struct_type(
			"ptr_list_node",
			24,
			vec![field("data", "void *", 0), field("next", "ptr_list_node *", 8), field("prev", "ptr_list_node *", 16)],
		)
		.struct_type("ptr_hashmap_entry", 16, vec![field("key", "const void *", 0), field("value", "void *", 8)])
		.struct_type("ptr_hashmap", 16, vec![field("entries_list", "ptr_list *", 0), field("buckets", "void *", 8)]);

	let container = match layout {
		MemberLayout::Hashmap => field("members", "ptr_hashmap *", 8),
		MemberLayout::EntriesList => field("entries_list", "ptr_list *", 8),
		MemberLayout::Members => field("members", "ptr_list *", 8),
	};
	builder.struct_type("json_object", 16, vec![field("parent_struct", "json_node", 0), container]);
}

fn install_array_types(builder: &mut SnapshotBuilder) {
	builder
		.struct_type(
			"int_array",
			32,
			vec![
				bit_field("length", "unsigned int", 0, 0, 31),
				bit_field("nofree", "unsigned int", 0, 31, 1),
				field("bufsiz", "size_t", 8),
				field("elemsz", "size_t", 16),
				field("elements", "int *", 24),
			],
		)
		.struct_type(
			"lookalike",
			24,
			vec![field("length", "size_t", 0), field("bufsiz", "size_t", 8), field("elements", "int *", 16)],
		)
		.struct_type(
			"array_with_owner",
			40,
			vec![
				bit_field("length", "unsigned int", 0, 0, 31),
				bit_field("nofree", "unsigned int", 0, 31, 1),
				field("bufsiz", "size_t", 8),
				field("elements", "int *", 16),
				field("owner", "void *", 24),
			],
		);
}

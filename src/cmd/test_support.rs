use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use shapeprint::inspect::SnapshotBuilder;
use shapeprint::inspect::snapshot::field;

static SHAPEPRINT_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Address of a `json_node *` array holding the integers 10 and 20.
pub(crate) const JSON_ARRAY_ADDR: u64 = 0x1000;
/// Address of the first node of a two-event queue.
pub(crate) const EVENT_HEAD_ADDR: u64 = 0x2000;

/// Small snapshot with a JSON array and an event queue.
pub(crate) fn fixture_builder() -> SnapshotBuilder {
	let mut builder = SnapshotBuilder::new();
	builder
		.c_primitives()
		.enum_type("json_node_type", 4, &[("json_node_type_integer", 1), ("json_node_type_array", 5)])
		.struct_type("json_node", 8, vec![field("node_type", "json_node_type", 0)])
		.struct_type("json_integer", 16, vec![field("parent_struct", "json_node", 0), field("value", "int64_t", 8)])
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
		.enum_type("event_type", 4, &[("event_type_default", 0), ("event_type_io_read", 3)])
		.function_type("event_callback")
		.struct_type(
			"_event",
			48,
			vec![
				field("type", "event_type", 0),
				field("is_canceled", "bool", 4),
				field("is_ready", "bool", 5),
				field("fd", "int", 8),
				field("callback", "event_callback *", 16),
				field("callback_data", "void *", 24),
				field("next", "struct _event *", 32),
			],
		)
		.alias("event", "_event")
		// JSON array node, storage, and two integer nodes.
		.alloc(JSON_ARRAY_ADDR, 0x100)
		.write_i32(JSON_ARRAY_ADDR, 5)
		.write_ptr(JSON_ARRAY_ADDR + 8, JSON_ARRAY_ADDR + 0x40)
		.write_ptr(JSON_ARRAY_ADDR + 16, 2)
		.write_ptr(JSON_ARRAY_ADDR + 24, 2)
		.write_ptr(JSON_ARRAY_ADDR + 0x40, JSON_ARRAY_ADDR + 0x80)
		.write_ptr(JSON_ARRAY_ADDR + 0x48, JSON_ARRAY_ADDR + 0xA0)
		.write_i32(JSON_ARRAY_ADDR + 0x80, 1)
		.write_i64(JSON_ARRAY_ADDR + 0x88, 10)
		.write_i32(JSON_ARRAY_ADDR + 0xA0, 1)
		.write_i64(JSON_ARRAY_ADDR + 0xA8, 20)
		// Two-event queue: manual trigger, then a ready fd watcher.
		.alloc(EVENT_HEAD_ADDR, 96)
		.write_ptr(EVENT_HEAD_ADDR + 16, 0x40_0000)
		.write_ptr(EVENT_HEAD_ADDR + 32, EVENT_HEAD_ADDR + 48)
		.write_i32(EVENT_HEAD_ADDR + 48, 3)
		.write(EVENT_HEAD_ADDR + 53, vec![1])
		.write_i32(EVENT_HEAD_ADDR + 56, 5)
		.symbol(0x40_0000, "wake_loop");
	builder
}

/// Write the fixture as plain or zstd-compressed JSON under `dir`.
pub(crate) fn write_fixture(dir: &Path, compressed: bool) -> PathBuf {
	let json = fixture_builder().to_file().and_then(|file| file.to_json()).expect("fixture serializes");
	if compressed {
		let path = dir.join("fixture.snap.zst");
		let packed = zstd::encode_all(json.as_slice(), 3).expect("fixture compresses");
		std::fs::write(&path, packed).expect("fixture writes");
		path
	} else {
		let path = dir.join("fixture.snap.json");
		std::fs::write(&path, json).expect("fixture writes");
		path
	}
}

pub(crate) fn run_shapeprint(args: &[&str]) -> Output {
	Command::new(shapeprint_bin()).args(args).output().expect("shapeprint command executes")
}

pub(crate) fn run_shapeprint_json(args: &[&str]) -> serde_json::Value {
	let output = run_shapeprint(args);
	assert!(
		output.status.success(),
		"shapeprint command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

pub(crate) fn run_shapeprint_text(args: &[&str]) -> String {
	let output = run_shapeprint(args);
	assert!(
		output.status.success(),
		"shapeprint command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout should be utf-8")
}

fn shapeprint_bin() -> &'static PathBuf {
	SHAPEPRINT_BIN.get_or_init(resolve_shapeprint_bin)
}

fn resolve_shapeprint_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_shapeprint") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| manifest_dir.join("target"));

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "shapeprint.exe" } else { "shapeprint" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "shapeprint"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build shapeprint binary at {}", bin.display());

	bin
}

use tracing::debug;

use crate::inspect::printer::{Children, Decoder, Shape, absorb};
use crate::inspect::{DisplayHint, HostValue, LinkWalk, Termination, WalkOptions, is_absent};

/// What an event node waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
	/// Triggered by hand.
	ManualTrigger,
	/// Completion of a background thread.
	BackgroundTask,
	/// Subprocess exit.
	Subprocess,
	/// File descriptor became readable.
	IoReadable,
	/// File descriptor became writable.
	IoWritable,
}

impl EventKind {
	/// Map the foreign enumerator name to a kind.
	pub fn from_enumerator(name: &str) -> Option<Self> {
		Some(match name {
			"event_type_default" => Self::ManualTrigger,
			"event_type_bg_task" => Self::BackgroundTask,
			"event_type_subprocess" => Self::Subprocess,
			"event_type_io_read" => Self::IoReadable,
			"event_type_io_write" => Self::IoWritable,
			_ => return None,
		})
	}
}

/// Single event node (`struct _event`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDecoder;

impl<V: HostValue> Decoder<V> for EventDecoder {
	fn shape(&self) -> Shape {
		Shape::Event
	}

	fn describe(&self, value: &V) -> Option<String> {
		let discriminant = absorb(Shape::Event, value.field("type").and_then(|item| item.as_int().map(|_| item)))?;
		let Some(kind) = EventKind::from_enumerator(&discriminant.render()) else {
			return Some(format!("[unknown event type] @ 0x{:x}", value.address().unwrap_or(0)));
		};

		let callback = format!("callback: {}({}){}", field_text(value, "callback"), field_text(value, "callback_data"), status_suffix(value));

		Some(match kind {
			EventKind::ManualTrigger => format!("event<on manual trigger, {callback}>"),
			EventKind::BackgroundTask => format!(
				"event<on finish thread: {}({}), {callback}>",
				field_text(value, "thread_proc"),
				field_text(value, "thread_data")
			),
			EventKind::Subprocess => format!("event<on finish process: PID {}, {callback}>", field_text(value, "process")),
			EventKind::IoReadable => format!("event<on readable fd: {}, {callback}>", field_text(value, "fd")),
			EventKind::IoWritable => format!("event<on writable fd: {}, {callback}>", field_text(value, "fd")),
		})
	}
}

fn field_text<V: HostValue>(value: &V, name: &str) -> String {
	match value.field(name) {
		Ok(item) => item.render(),
		Err(err) => format!("<error: {err}>"),
	}
}

fn flag_set<V: HostValue>(value: &V, name: &str) -> bool {
	value.field(name).and_then(|item| item.as_int()).is_ok_and(|raw| raw != 0)
}

fn status_suffix<V: HostValue>(value: &V) -> &'static str {
	if flag_set(value, "is_ready") {
		"|READY"
	} else if flag_set(value, "is_canceled") {
		"|CANCELLED"
	} else {
		""
	}
}

/// Event queue reached through a pointer to its head node.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventListDecoder;

impl<V: HostValue> Decoder<V> for EventListDecoder {
	fn shape(&self) -> Shape {
		Shape::EventList
	}

	fn describe(&self, value: &V) -> Option<String> {
		is_absent(value).then(|| "event list (empty)".to_owned())
	}

	fn children<'a>(&self, value: &'a V) -> Children<'a, V> {
		let walk = LinkWalk::new(Some(value.clone()), Termination::NullTerminated, WalkOptions::default());
		Box::new(walk.map_while(|(index, node)| match node.dereference() {
			Ok(item) => Some((index.to_string(), item)),
			Err(err) => {
				debug!(index, %err, "event node unreadable");
				None
			}
		}))
	}

	fn display_hint(&self, _value: &V) -> DisplayHint {
		DisplayHint::Sequence
	}
}

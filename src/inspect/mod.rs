mod chain;
mod error;
mod host;
mod printer;
mod registry;
mod render;
mod shape;
/// Memory snapshot host: type table, captured regions, file format, builder.
pub mod snapshot;
mod walk;

/// Safe field-chain dereferencing and candidate-path probing.
pub use chain::{deref_chain, is_absent, probe_chain};
/// Error and result aliases.
pub use error::{InspectError, Result};
/// Host value interface consumed by every decoder.
pub use host::{DisplayHint, FieldDescriptor, HostValue};
/// Shape decoders and their tag types.
pub use printer::{ArrayDecoder, Children, Decoder, EventDecoder, EventKind, EventListDecoder, JsonNodeDecoder, JsonTag, MEMBER_LIST_LAYOUTS, Shape};
/// Declared-type and structural dispatch.
pub use registry::Registry;
/// Host display loop producing a rendered node tree.
pub use render::{Node, RenderOptions, format_tree, render_tree};
/// Closed-world field-name matching.
pub use shape::{ARRAY_SHAPE, FieldShape};
/// Frequently used snapshot types.
pub use snapshot::{Endianness, SnapValue, Snapshot, SnapshotBuilder};
/// Linked-list walk types.
pub use walk::{LinkWalk, Termination, WalkOptions, WalkStopReason};

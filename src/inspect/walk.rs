use std::collections::HashSet;

use tracing::{debug, warn};

use crate::inspect::{HostValue, deref_chain, is_absent};

/// How a linked traversal recognizes its last node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
	/// The chain ends at a null `next` pointer.
	NullTerminated,
	/// The chain is closed around a known head, optionally with a recorded tail.
	Sentinel {
		/// Address of the first node.
		head: u64,
		/// Address of the last node, when the container records one.
		tail: Option<u64>,
	},
}

/// Stop reason for a finished walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStopReason {
	/// Next pointer was null, missing, or unreadable.
	NullNext,
	/// The recorded tail node was yielded.
	Tail,
	/// Traversal came back around to the sentinel head.
	SentinelHead,
	/// A node address was visited twice.
	Cycle(u64),
	/// Step ceiling reached.
	StepLimit,
}

/// Linked-list traversal limits.
#[derive(Debug, Clone)]
pub struct WalkOptions {
	/// Field holding the next-node pointer.
	pub next_field: &'static str,
	/// Maximum number of nodes to yield.
	pub max_steps: usize,
}

impl Default for WalkOptions {
	fn default() -> Self {
		Self {
			next_field: "next",
			max_steps: 1 << 16,
		}
	}
}

/// Lazy walk over an unowned intrusive list, yielding `(index, node_pointer)`.
///
/// Every visited address is remembered, so a corrupt chain ends instead of looping.
pub struct LinkWalk<V> {
	current: Option<V>,
	termination: Termination,
	options: WalkOptions,
	visited: HashSet<u64>,
	index: usize,
	stop: Option<WalkStopReason>,
}

impl<V: HostValue> LinkWalk<V> {
	/// Start a walk at `head`, a pointer to the first node (null means empty).
	pub fn new(head: Option<V>, termination: Termination, options: WalkOptions) -> Self {
		Self {
			current: head,
			termination,
			options,
			visited: HashSet::new(),
			index: 0,
			stop: None,
		}
	}

	/// Reason the walk ended, once it has.
	pub fn stop_reason(&self) -> Option<WalkStopReason> {
		self.stop
	}

	fn finish(&mut self, reason: WalkStopReason) -> Option<(usize, V)> {
		match reason {
			WalkStopReason::Cycle(address) => warn!(address = format_args!("0x{address:x}"), steps = self.index, "linked list cycles"),
			WalkStopReason::StepLimit => warn!(max_steps = self.options.max_steps, "linked list walk hit step limit"),
			_ => debug!(?reason, steps = self.index, "linked list walk finished"),
		}
		self.current = None;
		self.stop = Some(reason);
		None
	}
}

impl<V: HostValue> Iterator for LinkWalk<V> {
	type Item = (usize, V);

	fn next(&mut self) -> Option<Self::Item> {
		if self.stop.is_some() {
			return None;
		}

		let Some(node) = self.current.take() else {
			return self.finish(WalkStopReason::NullNext);
		};
		if is_absent(&node) {
			return self.finish(WalkStopReason::NullNext);
		}

		let Ok(raw) = node.as_int() else {
			return self.finish(WalkStopReason::NullNext);
		};
		let address = raw as u64;

		if self.index >= self.options.max_steps {
			return self.finish(WalkStopReason::StepLimit);
		}

		if !self.visited.insert(address) {
			return match self.termination {
				Termination::Sentinel { head, .. } if head == address => self.finish(WalkStopReason::SentinelHead),
				_ => self.finish(WalkStopReason::Cycle(address)),
			};
		}

		let reached_tail = matches!(self.termination, Termination::Sentinel { tail: Some(tail), .. } if tail == address);
		if reached_tail {
			self.stop = Some(WalkStopReason::Tail);
		} else {
			self.current = deref_chain(Some(node.clone()), &[self.options.next_field]);
		}

		let index = self.index;
		self.index += 1;
		Some((index, node))
	}
}

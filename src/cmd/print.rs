use std::path::PathBuf;

use serde::Serialize;
use shapeprint::inspect::{HostValue, Node, Registry, RenderOptions, Result, Snapshot, format_tree, render_tree};

use crate::cmd::util::parse_address;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// C type spelling, e.g. `json_node *` or `struct _event`.
	#[arg(long = "type")]
	pub type_name: String,
	/// Pointer value for pointer types, object address otherwise.
	#[arg(long = "addr")]
	pub address: String,
	#[arg(long)]
	pub depth: Option<usize>,
	#[arg(long)]
	pub limit: Option<usize>,
	#[arg(long = "string-limit")]
	pub string_limit: Option<usize>,
	/// Start from the compact preset instead of the default limits.
	#[arg(long)]
	pub compact: bool,
	/// Skip shape decoders and use the plain host rendering.
	#[arg(long)]
	pub raw: bool,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct PrintReport<'a> {
	type_name: &'a str,
	resolved_type: String,
	address: String,
	tree: &'a Node,
}

/// Render one typed value through the decoder registry.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		type_name,
		address,
		depth,
		limit,
		string_limit,
		compact,
		raw,
		json,
	} = args;

	let address = parse_address(&address)?;
	let mut options = if compact { RenderOptions::compact() } else { RenderOptions::default() };
	if let Some(depth) = depth {
		options.max_depth = depth;
	}
	if let Some(limit) = limit {
		options.max_children = limit;
	}
	if let Some(string_limit) = string_limit {
		options.max_string_len = string_limit;
	}
	options.use_printers = !raw;

	let snapshot = Snapshot::open(&path)?;
	let value = snapshot.value(&type_name, address)?;
	let registry = Registry::standard();
	let tree = render_tree(&registry, &format!("0x{address:x}"), &value, &options);

	if json {
		let report = PrintReport {
			type_name: &type_name,
			resolved_type: value.resolved_type_name(),
			address: format!("0x{address:x}"),
			tree: &tree,
		};
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	print!("{}", format_tree(&tree));
	Ok(())
}

use std::path::PathBuf;

use serde::Serialize;
use shapeprint::inspect::{Result, Snapshot};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct Report {
	path: String,
	compression: &'static str,
	pointer_size: usize,
	endianness: &'static str,
	type_count: usize,
	region_count: usize,
	mapped_bytes: usize,
	symbol_count: usize,
	lowest_address: Option<String>,
	highest_address: Option<String>,
}

/// Print pointer width, byte order, and region statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let snapshot = Snapshot::open(&path)?;
	let regions = snapshot.memory().regions();
	let report = Report {
		path: path.display().to_string(),
		compression: snapshot.compression.as_str(),
		pointer_size: snapshot.types().pointer_size,
		endianness: snapshot.types().endianness.as_str(),
		type_count: snapshot.types().names().count(),
		region_count: regions.len(),
		mapped_bytes: snapshot.memory().mapped_bytes(),
		symbol_count: snapshot.symbol_count(),
		lowest_address: regions.first().map(|region| format!("0x{:x}", region.start)),
		highest_address: regions.last().map(|region| format!("0x{:x}", region.end())),
	};

	if json {
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	println!("path: {}", report.path);
	println!("compression: {}", report.compression);
	println!("pointer_size: {}", report.pointer_size);
	println!("endianness: {}", report.endianness);
	println!("types: {}", report.type_count);
	println!("regions: {}", report.region_count);
	println!("mapped_bytes: {}", report.mapped_bytes);
	println!("symbols: {}", report.symbol_count);
	println!("address_range: {} .. {}", report.lowest_address.as_deref().unwrap_or("-"), report.highest_address.as_deref().unwrap_or("-"));

	Ok(())
}

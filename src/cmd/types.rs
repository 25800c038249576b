use std::path::PathBuf;

use serde::Serialize;
use shapeprint::inspect::snapshot::{TypeDecl, TypeKind, TypeTable};
use shapeprint::inspect::{InspectError, Result, Snapshot};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct TypeRow {
	name: String,
	kind: &'static str,
	size: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	target: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	fields: Vec<FieldRow>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	variants: Vec<VariantRow>,
}

#[derive(Serialize)]
struct FieldRow {
	name: String,
	#[serde(rename = "type")]
	ty: String,
	offset: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	bits: Option<String>,
}

#[derive(Serialize)]
struct VariantRow {
	name: String,
	value: i64,
}

/// List every type, or print one type's full layout.
pub fn run(args: Args) -> Result<()> {
	let Args { path, name, json } = args;

	let snapshot = Snapshot::open(&path)?;
	let types = snapshot.types();

	let Some(name) = name else {
		let rows: Vec<TypeRow> = types.names().filter_map(|name| summary_row(types, name)).collect();
		if json {
			println!("{}", serde_json::to_string_pretty(&rows)?);
			return Ok(());
		}

		println!("path: {}", path.display());
		println!("types: {}", rows.len());
		println!("kind\tsize\tname");
		for row in &rows {
			println!("{}\t{}\t{}", row.kind, size_label(row.size), row.name);
		}
		return Ok(());
	};

	let row = detail_row(types, &name).ok_or(InspectError::UnknownType { name })?;
	if json {
		println!("{}", serde_json::to_string_pretty(&row)?);
		return Ok(());
	}

	println!("type: {}", row.name);
	println!("kind: {}", row.kind);
	println!("size: {}", size_label(row.size));
	if let Some(target) = &row.target {
		println!("target: {target}");
	}
	if !row.fields.is_empty() {
		println!("fields: {}", row.fields.len());
		println!("offset\ttype\tname");
		for field in &row.fields {
			match &field.bits {
				Some(bits) => println!("{}\t{}\t{} : {bits}", field.offset, field.ty, field.name),
				None => println!("{}\t{}\t{}", field.offset, field.ty, field.name),
			}
		}
	}
	for variant in &row.variants {
		println!("  {} = {}", variant.name, variant.value);
	}

	Ok(())
}

fn summary_row(types: &TypeTable, name: &str) -> Option<TypeRow> {
	let kind = types.lookup(name)?;
	Some(TypeRow {
		name: name.to_owned(),
		kind: kind.label(),
		size: types.size_of(&TypeDecl::named(name)).ok(),
		target: None,
		fields: Vec::new(),
		variants: Vec::new(),
	})
}

fn detail_row(types: &TypeTable, name: &str) -> Option<TypeRow> {
	let mut row = summary_row(types, name)?;
	match types.lookup(name)? {
		TypeKind::Struct { fields, .. } => {
			row.fields = fields
				.iter()
				.map(|field| FieldRow {
					name: field.name.to_string(),
					ty: field.ty.to_string(),
					offset: field.offset,
					bits: field.bits.map(|bits| format!("{}@{}", bits.width, bits.shift)),
				})
				.collect();
		}
		TypeKind::Enum { variants, .. } => {
			row.variants = variants
				.iter()
				.map(|(name, value)| VariantRow {
					name: name.to_string(),
					value: *value,
				})
				.collect();
		}
		TypeKind::Alias { target } => row.target = Some(target.to_string()),
		_ => {}
	}
	Some(row)
}

fn size_label(size: Option<usize>) -> String {
	size.map_or_else(|| "-".to_owned(), |size| size.to_string())
}

use shapeprint::inspect::{InspectError, Result};

/// Parse decimal or `0x`-prefixed hex address literal.
pub(crate) fn parse_address(value: &str) -> Result<u64> {
	let parsed = if let Some(stripped) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		u64::from_str_radix(&stripped.replace('_', ""), 16)
	} else {
		value.replace('_', "").parse::<u64>()
	};

	parsed.map_err(|_| InspectError::InvalidAddressLiteral { value: value.to_owned() })
}

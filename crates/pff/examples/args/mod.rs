use clap::Parser;

#[derive(Parser)]
#[command(version, about, long_about)]
pub struct Args {
    pub file: String,

    /// Node identifier to look up, decimal or 0x-prefixed hex.
    #[clap(long, value_parser = parse_node_id, default_value = "290")]
    pub node: u32,
}

fn parse_node_id(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|err| format!("invalid node identifier {value:?}: {err}"))
}

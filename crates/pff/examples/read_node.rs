use clap::Parser;
use outlook_pff::{NodeId, PffReader};

mod args;

fn main() -> anyhow::Result<()> {
    let args = args::Args::try_parse()?;

    let reader = PffReader::open(&args.file)?;
    let node = NodeId::from(args.node);

    let Some(found) = reader.read_node(node)? else {
        println!("{node:?} not found");
        return Ok(());
    };

    println!("{node:?}: {} bytes", found.payload().len());
    for chunk in found.payload().chunks(16).take(4) {
        let hex: Vec<_> = chunk.iter().map(|b| format!("{b:02X}")).collect();
        println!("  {}", hex.join(" "));
    }

    let descriptors = found.local_descriptors();
    println!("Local descriptors: {}", descriptors.len());
    for entry in descriptors.entries() {
        println!(
            "  {:?} -> data 0x{:X} sub {:?}",
            entry.node(),
            u64::from(entry.data()),
            entry.sub_descriptors().map(u64::from),
        );
    }

    Ok(())
}

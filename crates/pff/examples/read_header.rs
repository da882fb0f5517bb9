use clap::Parser;
use outlook_pff::PffReader;

mod args;

fn main() -> anyhow::Result<()> {
    let args = args::Args::try_parse()?;

    let reader = PffReader::open(&args.file)?;
    let context = reader.context();

    println!("Content Type: {:?}", context.content_type());
    println!("Format: {:?}", context.format());
    println!("Encryption: {:?}", context.crypt_method());
    println!("NBT Root Offset: 0x{:X}", context.node_btree());
    println!("BBT Root Offset: 0x{:X}", context.block_btree());

    Ok(())
}

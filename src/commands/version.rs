use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("rasp-stat version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

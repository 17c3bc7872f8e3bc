use cascade_codegen::{Builder, Result};

fn main() -> Result<()> {
    Builder::new().compile("tracked.json")?;
    Ok(())
}

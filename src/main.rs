use anyhow::Result;

fn main() -> Result<()> {
    chatshift::run()?;
    Ok(())
}

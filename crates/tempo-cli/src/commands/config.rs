//! Config command — prints the effective configuration

use anyhow::Result;

pub fn run(config: Option<&str>) -> Result<()> {
    let config = super::resolve_config(config)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

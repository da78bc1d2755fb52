use std::path::Path;

use anyhow::Result;

use viewer_configurator::schema::SchemaValidator;

use crate::cli;

pub async fn run_validate(file: &Path) -> Result<()> {
    let validator = SchemaValidator::bundled()?;
    let value = cli::read_json_file(file)?;

    let result = validator.validate_value(&value);
    if result.is_valid() {
        println!("✅ {} matches the config schema", file.display());
        return Ok(());
    }

    println!("❌ {} does not match the config schema:", file.display());
    for error in result.errors() {
        println!("   - {}", error);
    }
    anyhow::bail!("{} schema violation(s)", result.errors().len())
}

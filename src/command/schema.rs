use anyhow::{Context, Result};

use viewer_configurator::schema::schema_document;

pub async fn run_schema() -> Result<()> {
    let document =
        serde_json::to_string_pretty(&schema_document()).context("Failed to serialize schema")?;
    println!("{}", document);
    Ok(())
}

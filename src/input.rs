//! Reads the report's input to completion before any of it is parsed.
use anyhow::{Context, Result};
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::io::Read;

/// Returns everything `input` produces, as UTF-8 if it began with a UTF-16
/// Byte Order Mark, and with any UTF-8 Byte Order Mark removed. Input without
/// a Byte Order Mark is passed through unchanged, even if it isn't UTF-8.
pub fn read_all(input: impl Read) -> Result<Vec<u8>> {
    let mut reader = DecodeReaderBytesBuilder::new()
        .bom_sniffing(true) // Look at the BOM to detect UTF-16 and convert to UTF-8
        .strip_bom(true) // Remove the BOM before sending data to us
        .utf8_passthru(true) // Don't enforce UTF-8 (BOM or no BOM)
        .build(input);
    let mut contents = Vec::new();
    reader.read_to_end(&mut contents).context("Error reading standard input")?;
    Ok(contents)
}

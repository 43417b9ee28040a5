use serde::de::DeserializeOwned;
use std::path::Path;

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    Ok(value)
}

pub fn print_json<T: serde::Serialize>(label: &str, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}:", label);
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

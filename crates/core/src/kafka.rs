use std::fs;
use std::path::Path;
use tracing::info;

/// Reads a Java-style `key=value` properties file into client settings.
///
/// Blank lines and `#` comments are skipped, keys and values are trimmed.
pub fn load_kafka_config_from_file(
    properties_file_path: impl AsRef<Path>,
) -> std::io::Result<Vec<(String, String)>> {
    let path = properties_file_path.as_ref();
    let kafka_properties = fs::read_to_string(path)?;
    let properties = parse_kafka_properties(&kafka_properties);

    info!(
        message = "Loaded Kafka properties",
        path = %path.display(),
        count = properties.len(),
    );

    Ok(properties)
}

/// Parses properties text. Lines without `=` are ignored.
pub fn parse_kafka_properties(kafka_properties: &str) -> Vec<(String, String)> {
    kafka_properties
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

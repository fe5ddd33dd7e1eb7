use std::path::Path;

use super::QueryFileError;

/// Split text into queries: one per line, trailing whitespace and `\r`
/// trimmed, blank lines skipped, order kept.
pub fn parse_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a query file in one go.
pub async fn load_queries<P: AsRef<Path>>(path: P) -> Result<Vec<String>, QueryFileError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| QueryFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let queries = parse_queries(&text);
    if queries.is_empty() {
        return Err(QueryFileError::Empty(path.to_path_buf()));
    }
    log::info!("Loaded {} queries from {}", queries.len(), path.display());
    Ok(queries)
}

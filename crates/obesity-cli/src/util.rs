use anyhow::Result;
use std::path::Path;

/// Training data must be a `.csv` or `.tsv` file. Existence is left to the
/// loader, which reports a missing dataset as `DatasetNotFound`.
pub fn ensure_table_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => Ok(()),
        _ => anyhow::bail!("Training data must be a .csv or .tsv file: {}", path.display()),
    }
}

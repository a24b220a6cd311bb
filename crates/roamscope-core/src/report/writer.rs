use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a rendered report page to disk
pub struct ReportWriter;

impl ReportWriter {
    pub fn to_file(html: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                return Err(Error::Report(format!(
                    "output directory {} does not exist",
                    parent.display()
                )));
            }
        }

        tracing::debug!("Writing report to {}", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(html.as_bytes())?;
        writer.flush()?;

        tracing::info!("Report written to {} ({} bytes)", path.display(), html.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        ReportWriter::to_file("<html></html>", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("report.html");

        let result = ReportWriter::to_file("<html></html>", &path);
        assert!(matches!(result, Err(Error::Report(_))));
    }
}

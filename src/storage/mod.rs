// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::tables::ExtractionResult;
use crate::ic3::models::region_name;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_dir: base_path,
        })
    }

    /// Writes one CSV file per record set under the partition directory
    /// `year=<year>/region=<region_name>/`, plus a manifest describing what
    /// was written. An empty extraction result writes nothing.
    pub fn save_report(
        &self,
        result: &ExtractionResult,
        year: u32,
        region_code: u32,
    ) -> Result<Vec<PathBuf>, StorageError> {
        if result.is_empty() {
            return Ok(Vec::new());
        }

        let region = region_name(region_code);
        let partition_dir = self
            .base_dir
            .join(format!("year={}", year))
            .join(format!("region={}", region));

        if !partition_dir.exists() {
            fs::create_dir_all(&partition_dir)?;
        }

        let mut written = Vec::new();
        for (name, set) in result.tables() {
            let file_path = partition_dir.join(format!("{}.csv", name));

            let mut writer = csv::Writer::from_path(&file_path)?;
            writer.write_record(&set.columns)?;
            for row in &set.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;

            tracing::info!("Saved record set to {}", file_path.display());
            written.push(file_path);
        }

        written.push(self.save_manifest(&partition_dir, result, year, region_code, &region)?);

        Ok(written)
    }

    /// Sidecar describing the partition contents, for downstream readers.
    fn save_manifest(
        &self,
        partition_dir: &Path,
        result: &ExtractionResult,
        year: u32,
        region_code: u32,
        region: &str,
    ) -> Result<PathBuf, StorageError> {
        let tables: Vec<serde_json::Value> = result
            .tables()
            .iter()
            .map(|(name, set)| {
                serde_json::json!({
                    "name": name,
                    "columns": set.columns,
                    "row_count": set.rows.len(),
                })
            })
            .collect();

        let manifest = serde_json::json!({
            "year": year,
            "region_code": region_code,
            "region": region,
            "tables": tables,
            "extracted_at": chrono::Utc::now().to_rfc3339(),
        });

        let file_path = partition_dir.join("_manifest.json");
        let manifest_str = serde_json::to_string_pretty(&manifest)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&file_path, manifest_str)?;

        tracing::info!("Saved manifest to {}", file_path.display());

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tables::{ExtractionResult, RecordSet};

    fn temp_base(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ic3_scraper_test_{}_{}", tag, std::process::id()))
    }

    fn single_set_result() -> ExtractionResult {
        let set = RecordSet {
            columns: vec!["Crime Type".to_string(), "Victim Count".to_string()],
            rows: vec![vec!["Phishing".to_string(), "120".to_string()]],
        };
        ExtractionResult::from_tables(vec![("victim-count-by-crime-type".to_string(), set)])
    }

    #[test]
    fn test_save_report_writes_partitioned_csv() {
        let base = temp_base("save");
        let storage = StorageManager::new(&base).unwrap();

        let written = storage.save_report(&single_set_result(), 2019, 1).unwrap();
        // One record set plus the manifest.
        assert_eq!(written.len(), 2);

        let csv_path = base
            .join("year=2019")
            .join("region=Alabama")
            .join("victim-count-by-crime-type.csv");
        let contents = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(contents, "Crime Type,Victim Count\nPhishing,120\n");

        let manifest = fs::read_to_string(
            base.join("year=2019").join("region=Alabama").join("_manifest.json"),
        )
        .unwrap();
        assert!(manifest.contains("\"row_count\": 1"));
        assert!(manifest.contains("\"region\": \"Alabama\""));

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_empty_result_writes_nothing() {
        let base = temp_base("empty");
        let storage = StorageManager::new(&base).unwrap();

        let written = storage
            .save_report(&ExtractionResult::empty(), 2019, 1)
            .unwrap();
        assert!(written.is_empty());
        assert!(!base.join("year=2019").exists());

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_unknown_region_code_uses_placeholder_path() {
        let base = temp_base("placeholder");
        let storage = StorageManager::new(&base).unwrap();

        storage.save_report(&single_set_result(), 2019, 999).unwrap();
        assert!(base
            .join("year=2019")
            .join("region=UnknownRegion_999")
            .join("victim-count-by-crime-type.csv")
            .exists());

        fs::remove_dir_all(&base).unwrap();
    }
}

//! Output views of a filtering run and their CSV artifacts.

use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::dataset::{Dataset, PROFILE_URL_COLUMN};
use crate::error::Result;

/// File name of the labeled, unfiltered export.
pub const UNFILTERED_FILE: &str = "unfiltered_data.csv";
/// File name of the filtered export.
pub const FILTERED_FILE: &str = "filtered_data.csv";
/// File name of the headerless URL list.
pub const PROFILE_URLS_FILE: &str = "profile_urls.csv";

/// The labeled input and the rows a filter kept from it.
#[derive(Debug, Clone)]
pub struct Projection {
    pub labeled: Dataset,
    pub filtered: Dataset,
}

/// Row counts shown next to the previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectionSummary {
    pub unfiltered_rows: usize,
    pub filtered_rows: usize,
}

/// Serialized artifacts, ready to hand to a download or a file.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub unfiltered_csv: Vec<u8>,
    pub filtered_csv: Vec<u8>,
    pub profile_urls_csv: Vec<u8>,
}

/// Where [`Projection::write_to_dir`] put each artifact.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub unfiltered: PathBuf,
    pub filtered: PathBuf,
    pub profile_urls: PathBuf,
}

impl Projection {
    pub fn new(labeled: Dataset, filtered: Dataset) -> Self {
        Self { labeled, filtered }
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            unfiltered_rows: self.labeled.len(),
            filtered_rows: self.filtered.len(),
        }
    }

    /// Non-empty `Profile url` values of the filtered rows.
    pub fn profile_urls(&self) -> Result<Vec<String>> {
        profile_urls(&self.filtered)
    }

    pub fn artifacts(&self) -> Result<Artifacts> {
        Ok(Artifacts {
            unfiltered_csv: self.labeled.to_csv_bytes()?,
            filtered_csv: self.filtered.to_csv_bytes()?,
            profile_urls_csv: urls_csv(&self.profile_urls()?)?,
        })
    }

    /// Write the three artifacts into `dir`, overwriting earlier exports.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<ExportPaths> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let artifacts = self.artifacts()?;
        let paths = ExportPaths {
            unfiltered: dir.join(UNFILTERED_FILE),
            filtered: dir.join(FILTERED_FILE),
            profile_urls: dir.join(PROFILE_URLS_FILE),
        };

        std::fs::write(&paths.unfiltered, &artifacts.unfiltered_csv)?;
        std::fs::write(&paths.filtered, &artifacts.filtered_csv)?;
        std::fs::write(&paths.profile_urls, &artifacts.profile_urls_csv)?;

        info!(dir = %dir.display(), "Wrote export artifacts");
        Ok(paths)
    }
}

/// Non-empty `Profile url` values of `dataset`, in row order.
pub fn profile_urls(dataset: &Dataset) -> Result<Vec<String>> {
    Ok(dataset
        .column_values(PROFILE_URL_COLUMN)?
        .flatten()
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect())
}

/// One URL per line, no header.
pub fn urls_csv(urls: &[String]) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    for url in urls {
        wtr.write_record([url])?;
    }
    wtr.into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

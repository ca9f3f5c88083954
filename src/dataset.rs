use crate::enrich::enrich;
use crate::error::Result;
use crate::filter::{FilteredView, filter_records};
use crate::load::read_raw_csv;
use crate::structs::{DayType, EnrichedRecord, Facets, RawRecord, Season};
use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The enriched table, derived once from a source and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDataset {
    records: Vec<EnrichedRecord>,
    fingerprint: u64,
}

impl EnrichedDataset {
    /// Enriches raw rows into a dataset tagged with the fingerprint of their source.
    pub fn from_raw(raw_records: &[RawRecord], fingerprint: u64) -> Result<Self> {
        Ok(Self {
            records: enrich(raw_records)?,
            fingerprint,
        })
    }

    /// Parses and enriches the bytes of a delimited source.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = read_raw_csv(bytes)?;
        Self::from_raw(&raw, seahash::hash(bytes))
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// Distinct seasons present, in calendar order.
    pub fn seasons(&self) -> BTreeSet<Season> {
        self.records.iter().map(|r| r.season).collect()
    }

    /// The whole table as a view.
    pub fn view(&self) -> FilteredView<'_> {
        self.records.iter().collect()
    }

    pub fn filter(&self, facets: &Facets) -> FilteredView<'_> {
        filter_records(&self.records, facets)
    }
}

impl Facets {
    /// Every observed year and season selected, any day type.
    pub fn all(dataset: &EnrichedDataset) -> Self {
        Self::new(
            dataset.years(),
            dataset.seasons().into_iter().map(|s| s.label()),
            DayType::All,
        )
    }
}

/// Memoizes the enriched table of a single source, keyed on its content.
///
/// Loading the same bytes again hands back the cached table; changed bytes replace it.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(PathBuf, Arc<EnrichedDataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the enriched table for `path`, deriving it only when the file's
    /// path or content differs from the cached entry.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or enrichment fails. A failed load
    /// leaves the cache empty.
    pub fn load(&mut self, path: &Path) -> Result<Arc<EnrichedDataset>> {
        let bytes = fs::read(path)?;
        let fingerprint = seahash::hash(&bytes);

        if let Some((cached_path, dataset)) = &self.entry {
            if cached_path == path && dataset.fingerprint() == fingerprint {
                debug!("Cache hit for {} ({:016x})", path.display(), fingerprint);
                return Ok(Arc::clone(dataset));
            }
        }

        debug!("Cache miss for {} ({:016x})", path.display(), fingerprint);
        self.entry = None;
        let raw = read_raw_csv(bytes.as_slice())?;
        let dataset = Arc::new(EnrichedDataset::from_raw(&raw, fingerprint)?);
        self.entry = Some((path.to_path_buf(), Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// The cached table, if any.
    pub fn cached(&self) -> Option<Arc<EnrichedDataset>> {
        self.entry.as_ref().map(|(_, dataset)| Arc::clone(dataset))
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

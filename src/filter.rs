use crate::structs::{EnrichedRecord, Facets};
use log::debug;

/// Order-preserving subset of the enriched table matching a set of facets.
///
/// Borrows its records; it owns no data and is rebuilt on every facet change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a EnrichedRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a EnrichedRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EnrichedRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Narrows this view further.
    pub fn refine(&self, facets: &Facets) -> FilteredView<'a> {
        filter_records(self.iter(), facets)
    }
}

impl<'a> FromIterator<&'a EnrichedRecord> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a EnrichedRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a, 'b> IntoIterator for &'b FilteredView<'a> {
    type Item = &'a EnrichedRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, &'a EnrichedRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().copied()
    }
}

/// Returns the records satisfying every facet, in their original order.
///
/// A record is kept when its year is selected, its season label is selected, and
/// the day-type predicate holds for its working-day flag. Empty year or season
/// selections keep nothing; labels or years absent from the data match nothing.
pub fn filter_records<'a, I>(records: I, facets: &Facets) -> FilteredView<'a>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    let view: FilteredView<'a> = records
        .into_iter()
        .filter(|record| matches_facets(record, facets))
        .collect();
    debug!(
        "Filter kept {} records | years={:?} seasons={:?} day_type={:?}",
        view.len(),
        facets.years,
        facets.seasons,
        facets.day_type
    );
    view
}

/// Whether a single record passes all three facets.
pub fn matches_facets(record: &EnrichedRecord, facets: &Facets) -> bool {
    facets.years.contains(&record.year)
        && facets.seasons.contains(record.season.label())
        && facets.day_type.matches(record.workingday)
}

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: which records a query keeps
// ---------------------------------------------------------------------------

/// Compiled row predicate. Text needles are lower-cased once up front.
///
/// Every constraint is optional; an absent or empty one accepts everything.
/// A record passes when it satisfies all active constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    name_contains: Option<String>,
    citizenship_group: Option<String>,
    sex: Option<String>,
    birth_year_min: Option<i32>,
    birth_year_max: Option<i32>,
}

fn needle(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(str::to_lowercase)
}

impl RecordFilter {
    pub fn new(
        name_contains: Option<&str>,
        citizenship_group: Option<&str>,
        sex: Option<&str>,
        birth_year_min: Option<i32>,
        birth_year_max: Option<i32>,
    ) -> Self {
        Self {
            name_contains: needle(name_contains),
            citizenship_group: needle(citizenship_group),
            sex: needle(sex),
            birth_year_min,
            birth_year_max,
        }
    }

    /// Drop the name constraint (aggregation path).
    pub fn without_name(mut self) -> Self {
        self.name_contains = None;
        self
    }

    /// Whether `record` passes every active constraint.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(n) = &self.name_contains {
            if !record.name.to_lowercase().contains(n.as_str()) {
                return false;
            }
        }
        if let Some(c) = &self.citizenship_group {
            if record.citizenship_group.to_lowercase() != *c {
                return false;
            }
        }
        if let Some(s) = &self.sex {
            if record.sex.to_lowercase() != *s {
                return false;
            }
        }
        if self.birth_year_min.is_some_and(|min| record.birth_year < min) {
            return false;
        }
        if self.birth_year_max.is_some_and(|max| record.birth_year > max) {
            return false;
        }
        true
    }
}

/// Return indices of records that pass the filter, in dataset order.
pub fn filtered_indices(dataset: &Dataset, filter: &RecordFilter) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches(r))
        .map(|(i, _)| i)
        .collect()
}

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Record – one row of the source CSV
// ---------------------------------------------------------------------------

/// One birth-registration row: how many children with `name`, of the given
/// citizenship group and sex, were registered in `birth_year`.
///
/// Serialised with the dataset's own column labels so the wire shape matches
/// the CSV header. Deserialisation also accepts the English and snake_case
/// spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Nome", alias = "Name", alias = "name")]
    pub name: String,
    #[serde(
        rename = "Cittadinanza",
        alias = "CitizenshipGroup",
        alias = "citizenship_group"
    )]
    pub citizenship_group: String,
    #[serde(rename = "Sesso", alias = "Sex", alias = "sex")]
    pub sex: String,
    #[serde(rename = "Anno Nascita", alias = "BirthYear", alias = "birth_year")]
    pub birth_year: i32,
    #[serde(rename = "Occorrenze", alias = "Occurrences", alias = "occurrences")]
    pub occurrences: u64,
}

// ---------------------------------------------------------------------------
// Field – the closed set of addressable columns
// ---------------------------------------------------------------------------

/// A column of [`Record`] that can be sorted on or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    CitizenshipGroup,
    Sex,
    BirthYear,
    Occurrences,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::CitizenshipGroup,
        Field::Sex,
        Field::BirthYear,
        Field::Occurrences,
    ];

    /// Fields accepted as an aggregation key.
    pub const GROUPABLE: [Field; 4] = [
        Field::Name,
        Field::CitizenshipGroup,
        Field::Sex,
        Field::BirthYear,
    ];

    /// Column label used in the CSV header and in JSON rows.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Nome",
            Field::CitizenshipGroup => "Cittadinanza",
            Field::Sex => "Sesso",
            Field::BirthYear => "Anno Nascita",
            Field::Occurrences => "Occorrenze",
        }
    }

    /// snake_case identifier.
    pub fn ident(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::CitizenshipGroup => "citizenship_group",
            Field::Sex => "sex",
            Field::BirthYear => "birth_year",
            Field::Occurrences => "occurrences",
        }
    }

    /// English header spelling, also accepted in source files.
    pub fn english_header(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::CitizenshipGroup => "CitizenshipGroup",
            Field::Sex => "Sex",
            Field::BirthYear => "BirthYear",
            Field::Occurrences => "Occurrences",
        }
    }

    pub fn is_groupable(self) -> bool {
        self != Field::Occurrences
    }

    /// Whether `s` names this field in any accepted spelling.
    pub fn matches(self, s: &str) -> bool {
        let s = s.trim();
        s.eq_ignore_ascii_case(self.label())
            || s.eq_ignore_ascii_case(self.ident())
            || s.eq_ignore_ascii_case(self.english_header())
    }

    /// Accessor: the value of this field in `record`.
    pub fn value(self, record: &Record) -> FieldValue<'_> {
        match self {
            Field::Name => FieldValue::Text(&record.name),
            Field::CitizenshipGroup => FieldValue::Text(&record.citizenship_group),
            Field::Sex => FieldValue::Text(&record.sex),
            Field::BirthYear => FieldValue::Year(record.birth_year),
            Field::Occurrences => FieldValue::Count(record.occurrences),
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.matches(s))
            .ok_or_else(|| Error::InvalidField(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// FieldValue / GroupKey – comparable cell values
// ---------------------------------------------------------------------------

/// A borrowed cell value. Values of the same field always share a variant,
/// so the derived ordering is the natural ordering of that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Year(i32),
    Count(u64),
}

impl FieldValue<'_> {
    /// Owned aggregation key; counts are summed, never grouped on.
    pub fn group_key(self) -> Option<GroupKey> {
        match self {
            FieldValue::Text(s) => Some(GroupKey::Text(s.to_string())),
            FieldValue::Year(y) => Some(GroupKey::Number(i64::from(y))),
            FieldValue::Count(_) => None,
        }
    }
}

/// Owned group value of an aggregation row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Text(String),
    Number(i64),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Text(s) => write!(f, "{s}"),
            GroupKey::Number(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateRow – one row of a group-by-sum result
// ---------------------------------------------------------------------------

/// `{<field label>: key, "Occorrenze": total}` once serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    pub field: Field,
    pub key: GroupKey,
    pub total: u64,
}

impl Serialize for AggregateRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.field.label(), &self.key)?;
        map.serialize_entry(Field::Occurrences.label(), &self.total)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed facets for the viewer.
///
/// Records are private so nothing can be added or mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// Distinct citizenship groups, sorted.
    pub citizenship_groups: BTreeSet<String>,
    /// Distinct sexes, sorted.
    pub sexes: BTreeSet<String>,
    /// Smallest and largest birth year, `None` when empty.
    pub year_range: Option<(i32, i32)>,
}

impl Dataset {
    /// Build facet indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut citizenship_groups = BTreeSet::new();
        let mut sexes = BTreeSet::new();
        let mut year_range: Option<(i32, i32)> = None;

        for r in &records {
            citizenship_groups.insert(r.citizenship_group.clone());
            sexes.insert(r.sex.clone());
            year_range = Some(match year_range {
                Some((lo, hi)) => (lo.min(r.birth_year), hi.max(r.birth_year)),
                None => (r.birth_year, r.birth_year),
            });
        }

        Dataset {
            records,
            citizenship_groups,
            sexes,
            year_range,
        }
    }

    /// All records in file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

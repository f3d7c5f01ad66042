use std::collections::BTreeMap;
use std::str::FromStr;

use super::filter::{filtered_indices, RecordFilter};
use super::model::{AggregateRow, Dataset, Field, FieldValue, Record};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Sort direction. Defaults to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(Error::InvalidSortOrder(s.to_string())),
        }
    }
}

/// Everything one request asks of the engine.
///
/// Text filters that are `None` or empty impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub name_contains: Option<String>,
    pub citizenship_group: Option<String>,
    pub sex: Option<String>,
    pub birth_year_min: Option<i32>,
    pub birth_year_max: Option<i32>,
    pub sort_field: Option<Field>,
    pub sort_order: SortOrder,
    /// Aggregation key; required by [`aggregate`].
    pub group_field: Option<Field>,
}

impl QueryParams {
    /// The row predicate these parameters describe.
    pub fn filter(&self) -> RecordFilter {
        RecordFilter::new(
            self.name_contains.as_deref(),
            self.citizenship_group.as_deref(),
            self.sex.as_deref(),
            self.birth_year_min,
            self.birth_year_max,
        )
    }
}

// ---------------------------------------------------------------------------
// Filter + sort
// ---------------------------------------------------------------------------

/// Indices of the records selected by `params`, in result order.
///
/// Without a sort field the dataset order is kept. The sort is stable in
/// both directions: tied records keep their dataset order.
pub fn select_indices(dataset: &Dataset, params: &QueryParams) -> Result<Vec<usize>> {
    let mut indices = filtered_indices(dataset, &params.filter());

    if let Some(field) = params.sort_field {
        let records = dataset.records();
        indices.sort_by(|&a, &b| {
            let ord = field.value(&records[a]).cmp(&field.value(&records[b]));
            match params.sort_order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }

    Ok(indices)
}

/// Filtered and optionally sorted copy of the matching records.
pub fn filter_and_sort(dataset: &Dataset, params: &QueryParams) -> Result<Vec<Record>> {
    let records = dataset.records();
    Ok(select_indices(dataset, params)?
        .into_iter()
        .map(|i| records[i].clone())
        .collect())
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum `occurrences` per distinct value of `field` over `rows`.
///
/// Rows come out by total descending; equal totals are ordered by the group
/// value ascending.
pub fn group_totals<'a, I>(rows: I, field: Field) -> Result<Vec<AggregateRow>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if !field.is_groupable() {
        return Err(Error::InvalidField(field.label().to_string()));
    }

    let mut totals: BTreeMap<FieldValue<'a>, u64> = BTreeMap::new();
    for r in rows {
        let total = totals.entry(field.value(r)).or_default();
        *total = total.saturating_add(r.occurrences);
    }

    let mut out: Vec<AggregateRow> = totals
        .into_iter()
        .filter_map(|(value, total)| {
            Some(AggregateRow {
                field,
                key: value.group_key()?,
                total,
            })
        })
        .collect();
    // Stable: ties stay in key order.
    out.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(out)
}

/// Group-by-sum over the records passing the citizenship, sex and year
/// filters. The name filter does not apply here.
pub fn aggregate(dataset: &Dataset, params: &QueryParams) -> Result<Vec<AggregateRow>> {
    let field = params
        .group_field
        .ok_or_else(|| Error::InvalidField(String::new()))?;
    if !field.is_groupable() {
        return Err(Error::InvalidField(field.label().to_string()));
    }

    let filter = params.filter().without_name();
    group_totals(
        dataset.records().iter().filter(|r| filter.matches(r)),
        field,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::GroupKey;

    fn rec(name: &str, group: &str, sex: &str, year: i32, occ: u64) -> Record {
        Record {
            name: name.into(),
            citizenship_group: group.into(),
            sex: sex.into(),
            birth_year: year,
            occurrences: occ,
        }
    }

    fn mario_dataset() -> Dataset {
        Dataset::from_records(vec![
            rec("Mario", "Italiani", "M", 2020, 5),
            rec("Mario", "Stranieri", "M", 2020, 2),
        ])
    }

    #[test]
    fn mario_is_found_and_summed() {
        let ds = mario_dataset();
        let params = QueryParams {
            name_contains: Some("mario".into()),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&ds, &params).unwrap().len(), 2);

        let params = QueryParams {
            group_field: Some(Field::Name),
            ..Default::default()
        };
        let rows = aggregate(&ds, &params).unwrap();
        assert_eq!(
            rows,
            vec![AggregateRow {
                field: Field::Name,
                key: GroupKey::Text("Mario".into()),
                total: 7,
            }]
        );
    }

    #[test]
    fn no_matching_group_yields_empty_tables() {
        let ds = Dataset::from_records(vec![rec("Mario", "Italiani", "M", 2020, 5)]);
        let params = QueryParams {
            citizenship_group: Some("Stranieri".into()),
            group_field: Some(Field::Sex),
            ..Default::default()
        };
        assert!(filter_and_sort(&ds, &params).unwrap().is_empty());
        assert!(aggregate(&ds, &params).unwrap().is_empty());
    }

    #[test]
    fn tied_totals_are_ordered_by_key() {
        let ds = Dataset::from_records(vec![
            rec("Sofia", "Italiani", "F", 2020, 10),
            rec("Aurora", "Italiani", "F", 2020, 10),
            rec("Leo", "Italiani", "M", 2020, 12),
        ]);
        let params = QueryParams {
            group_field: Some(Field::Name),
            ..Default::default()
        };
        let first = aggregate(&ds, &params).unwrap();
        let keys: Vec<String> = first.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, ["Leo", "Aurora", "Sofia"]);
        assert_eq!(first, aggregate(&ds, &params).unwrap());
    }

    #[test]
    fn ascending_is_the_reverse_of_descending() {
        let ds = Dataset::from_records(vec![
            rec("A", "Italiani", "F", 2020, 3),
            rec("B", "Italiani", "F", 2020, 9),
            rec("C", "Italiani", "F", 2020, 1),
        ]);
        let mut params = QueryParams {
            sort_field: Some(Field::Occurrences),
            sort_order: SortOrder::Ascending,
            ..Default::default()
        };
        let asc = filter_and_sort(&ds, &params).unwrap();
        params.sort_order = SortOrder::Descending;
        let mut desc = filter_and_sort(&ds, &params).unwrap();
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc[0].name, "C");
    }

    #[test]
    fn ties_keep_dataset_order_in_both_directions() {
        let ds = Dataset::from_records(vec![
            rec("Zeno", "Italiani", "M", 2019, 1),
            rec("Anna", "Italiani", "F", 2020, 1),
            rec("Luca", "Italiani", "M", 2019, 1),
        ]);
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let params = QueryParams {
                sort_field: Some(Field::BirthYear),
                sort_order: order,
                ..Default::default()
            };
            let names: Vec<String> = filter_and_sort(&ds, &params)
                .unwrap()
                .into_iter()
                .filter(|r| r.birth_year == 2019)
                .map(|r| r.name)
                .collect();
            assert_eq!(names, ["Zeno", "Luca"]);
        }
    }

    #[test]
    fn no_sort_field_keeps_dataset_order() {
        let ds = mario_dataset();
        let out = filter_and_sort(&ds, &QueryParams::default()).unwrap();
        assert_eq!(out, ds.records());
    }

    #[test]
    fn inverted_year_bounds_are_empty_not_an_error() {
        let ds = mario_dataset();
        let params = QueryParams {
            birth_year_min: Some(2021),
            birth_year_max: Some(2019),
            group_field: Some(Field::BirthYear),
            ..Default::default()
        };
        assert!(filter_and_sort(&ds, &params).unwrap().is_empty());
        assert!(aggregate(&ds, &params).unwrap().is_empty());
    }

    #[test]
    fn aggregation_ignores_the_name_filter() {
        let ds = mario_dataset();
        let params = QueryParams {
            name_contains: Some("nobody".into()),
            group_field: Some(Field::Sex),
            ..Default::default()
        };
        assert_eq!(aggregate(&ds, &params).unwrap()[0].total, 7);
    }

    #[test]
    fn sort_field_resolved_from_its_label() {
        let ds = mario_dataset();
        assert!(matches!("colour".parse::<Field>(), Err(Error::InvalidField(_))));
        let params = QueryParams {
            sort_field: Some("Occorrenze".parse().unwrap()),
            sort_order: SortOrder::Ascending,
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&ds, &params).unwrap()[0].occurrences, 2);
    }

    #[test]
    fn occurrences_and_missing_group_field_are_rejected() {
        let ds = mario_dataset();
        let params = QueryParams {
            group_field: Some(Field::Occurrences),
            ..Default::default()
        };
        assert!(matches!(aggregate(&ds, &params), Err(Error::InvalidField(_))));
        assert!(matches!(
            aggregate(&ds, &QueryParams::default()),
            Err(Error::InvalidField(_))
        ));
    }

    #[test]
    fn year_groups_sort_numerically_on_ties() {
        let ds = Dataset::from_records(vec![
            rec("A", "Italiani", "F", 2021, 4),
            rec("B", "Italiani", "F", 2009, 4),
            rec("C", "Italiani", "F", 2015, 4),
        ]);
        let rows = group_totals(ds.records(), Field::BirthYear).unwrap();
        let years: Vec<GroupKey> = rows.into_iter().map(|r| r.key).collect();
        assert_eq!(
            years,
            [GroupKey::Number(2009), GroupKey::Number(2015), GroupKey::Number(2021)]
        );
    }

    #[test]
    fn sort_order_parses_short_and_long_forms() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!("descending".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!(matches!("up".parse::<SortOrder>(), Err(Error::InvalidSortOrder(_))));
        assert_eq!(SortOrder::default(), SortOrder::Descending);
    }
}

#[cfg(test)]
mod property {
    use proptest::prelude::*;

    use super::*;

    fn arb_record() -> impl Strategy<Value = Record> {
        (
            prop_oneof![Just("Mario"), Just("Maria"), Just("Luca"), Just("Anna"), Just("Leo")],
            prop_oneof![Just("Italiani"), Just("Stranieri")],
            prop_oneof![Just("M"), Just("F")],
            2010i32..2026,
            0u64..50,
        )
            .prop_map(|(name, group, sex, birth_year, occurrences)| Record {
                name: name.to_string(),
                citizenship_group: group.to_string(),
                sex: sex.to_string(),
                birth_year,
                occurrences,
            })
    }

    fn arb_params() -> impl Strategy<Value = QueryParams> {
        (
            prop::option::of(prop_oneof![Just("mar"), Just("A"), Just("")]),
            prop::option::of(prop_oneof![Just("italiani"), Just("STRANIERI")]),
            prop::option::of(prop_oneof![Just("m"), Just("F")]),
            prop::option::of(2008i32..2028),
            prop::option::of(2008i32..2028),
            prop::option::of(prop::sample::select(Field::ALL.to_vec())),
            prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)],
            prop::sample::select(Field::GROUPABLE.to_vec()),
        )
            .prop_map(|(name, group, sex, min, max, sort_field, sort_order, by)| {
                QueryParams {
                    name_contains: name.map(str::to_string),
                    citizenship_group: group.map(str::to_string),
                    sex: sex.map(str::to_string),
                    birth_year_min: min,
                    birth_year_max: max,
                    sort_field,
                    sort_order,
                    group_field: Some(by),
                }
            })
    }

    proptest! {
        #[test]
        fn result_is_exactly_the_matching_subset(
            records in prop::collection::vec(arb_record(), 0..40),
            params in arb_params(),
        ) {
            let ds = Dataset::from_records(records);
            let filter = params.filter();
            let mut got = select_indices(&ds, &params).unwrap();
            got.sort_unstable();
            let expected: Vec<usize> = (0..ds.len())
                .filter(|&i| filter.matches(&ds.records()[i]))
                .collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn queries_are_idempotent(
            records in prop::collection::vec(arb_record(), 0..40),
            params in arb_params(),
        ) {
            let ds = Dataset::from_records(records);
            prop_assert_eq!(
                filter_and_sort(&ds, &params).unwrap(),
                filter_and_sort(&ds, &params).unwrap()
            );
            prop_assert_eq!(aggregate(&ds, &params).unwrap(), aggregate(&ds, &params).unwrap());
        }

        #[test]
        fn sort_is_stable(
            records in prop::collection::vec(arb_record(), 0..40),
            params in arb_params(),
        ) {
            let ds = Dataset::from_records(records);
            let Some(field) = params.sort_field else { return Ok(()); };
            let out = select_indices(&ds, &params).unwrap();
            for w in out.windows(2) {
                let (a, b) = (&ds.records()[w[0]], &ds.records()[w[1]]);
                if field.value(a) == field.value(b) {
                    prop_assert!(w[0] < w[1]);
                }
            }
        }

        #[test]
        fn group_totals_add_up(
            records in prop::collection::vec(arb_record(), 0..40),
            params in arb_params(),
        ) {
            let ds = Dataset::from_records(records);
            let filter = params.filter().without_name();
            let expected: u64 = ds
                .records()
                .iter()
                .filter(|r| filter.matches(r))
                .map(|r| r.occurrences)
                .sum();
            let rows = aggregate(&ds, &params).unwrap();
            prop_assert_eq!(rows.iter().map(|r| r.total).sum::<u64>(), expected);
            prop_assert!(rows.windows(2).all(|w| w[0].total >= w[1].total));
        }
    }
}

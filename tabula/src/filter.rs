//! Filter stage.

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::registry::ColumnRegistry;
use crate::row::Row;
use crate::value::Value;

/// Operator applied by a column filter.
///
/// Text operators compare lower-cased stringified operands. Ordering
/// operators compare raw values and never match when the pair is not
/// orderable (see [`Value::compare`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Substring match.
    #[default]
    Contains,
    /// Whole-value match.
    Equals,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
}

/// A filter on one column.
///
/// An entry whose value is empty (null or `""`) is inactive and keeps every
/// row.
///
/// # Example
///
/// ```
/// use tabula::{ColumnFilter, FilterOperator};
///
/// let by_name = ColumnFilter::new("name", "jo");
/// assert_eq!(by_name.operator, FilterOperator::Contains);
///
/// let adults = ColumnFilter::new("age", 18i64).operator(FilterOperator::Gte);
/// assert_eq!(adults.operator, FilterOperator::Gte);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub column_id: String,
    pub value: Value,
    #[serde(default)]
    pub operator: FilterOperator,
}

impl ColumnFilter {
    /// Creates a `contains` filter.
    pub fn new(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column_id: column_id.into(),
            value: value.into(),
            operator: FilterOperator::default(),
        }
    }

    /// Sets the operator.
    pub fn operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Returns `true` if this entry takes part in filtering.
    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Keeps the rows that pass the global filter and every column filter.
///
/// The global filter matches when any filterable column's stringified value
/// contains it, ignoring case. Column filters on unknown or non-filterable
/// columns are skipped. Always returns a new vector.
pub fn filter_rows(
    rows: &[Row],
    filters: &[ColumnFilter],
    global_filter: &str,
    registry: &ColumnRegistry,
) -> Vec<Row> {
    let active: Vec<(&Column, &ColumnFilter)> = filters
        .iter()
        .filter(|filter| filter.is_active())
        .filter_map(|filter| {
            registry
                .resolve(&filter.column_id)
                .filter(|column| column.is_filterable())
                .map(|column| (column, filter))
        })
        .collect();

    let needle = global_filter.to_lowercase();
    let searchable: Vec<&Column> = if needle.is_empty() {
        Vec::new()
    } else {
        registry
            .columns()
            .iter()
            .filter(|column| column.is_filterable())
            .collect()
    };

    if active.is_empty() && needle.is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .filter(|row| {
            needle.is_empty() || matches_global(row, &searchable, &needle)
        })
        .filter(|row| {
            active
                .iter()
                .all(|(column, filter)| matches_filter(row, column, filter))
        })
        .cloned()
        .collect()
}

fn matches_global(row: &Row, columns: &[&Column], needle: &str) -> bool {
    columns.iter().any(|column| {
        column
            .value(row.original())
            .to_string()
            .to_lowercase()
            .contains(needle)
    })
}

fn matches_filter(row: &Row, column: &Column, filter: &ColumnFilter) -> bool {
    if let Some(filter_fn) = column.filter_fn() {
        return filter_fn(row, column.id(), &filter.value);
    }
    let value = column.value(row.original());
    if value.is_null() {
        return false;
    }
    matches_operator(&value, filter.operator, &filter.value)
}

/// Tests one value against an operator and a filter value.
pub fn matches_operator(value: &Value, operator: FilterOperator, filter_value: &Value) -> bool {
    match operator {
        FilterOperator::Contains
        | FilterOperator::Equals
        | FilterOperator::StartsWith
        | FilterOperator::EndsWith => {
            let haystack = value.to_string().to_lowercase();
            let needle = filter_value.to_string().to_lowercase();
            match operator {
                FilterOperator::Contains => haystack.contains(&needle),
                FilterOperator::Equals => haystack == needle,
                FilterOperator::StartsWith => haystack.starts_with(&needle),
                _ => haystack.ends_with(&needle),
            }
        }
        FilterOperator::Gt => value.compare(filter_value).is_some_and(|o| o.is_gt()),
        FilterOperator::Lt => value.compare(filter_value).is_some_and(|o| o.is_lt()),
        FilterOperator::Gte => value.compare(filter_value).is_some_and(|o| o.is_ge()),
        FilterOperator::Lte => value.compare(filter_value).is_some_and(|o| o.is_le()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::column::ColumnDef;
    use crate::record::Record;
    use crate::row::RowIdFn;
    use crate::row::default_row_id;
    use crate::row::materialize;

    fn people() -> (Arc<ColumnRegistry>, Vec<Row>) {
        let registry = Arc::new(
            ColumnRegistry::register([
                ColumnDef::accessor("name", "name"),
                ColumnDef::accessor("age", "age"),
                ColumnDef::accessor("secret", "secret").filterable(false),
            ])
            .unwrap(),
        );
        let records: Vec<Arc<Record>> = [
            ("John", Value::Int(40), "zzz"),
            ("Amy", Value::Int(17), "jo"),
            ("Joy", Value::Null, "x"),
        ]
        .into_iter()
        .map(|(name, age, secret)| {
            Arc::new(
                Record::new()
                    .set("id", name)
                    .set("name", name)
                    .set("age", age)
                    .set("secret", secret),
            )
        })
        .collect();
        let row_id: RowIdFn = Arc::new(default_row_id);
        let rows = materialize(&records, &registry, &row_id);
        (registry, rows)
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(Row::id).collect()
    }

    #[test]
    fn test_global_filter_is_case_insensitive() {
        let (registry, rows) = people();
        let filtered = filter_rows(&rows, &[], "jo", &registry);
        assert_eq!(ids(&filtered), ["John", "Joy"]);
        let filtered = filter_rows(&rows, &[], "JO", &registry);
        assert_eq!(ids(&filtered), ["John", "Joy"]);
    }

    #[test]
    fn test_global_filter_skips_non_filterable_columns() {
        let (registry, rows) = people();
        // "zzz" only appears in the non-filterable column.
        assert!(filter_rows(&rows, &[], "zzz", &registry).is_empty());
    }

    #[test]
    fn test_text_operators() {
        let john = Value::from("John");
        assert!(matches_operator(&john, FilterOperator::Contains, &Value::from("OH")));
        assert!(matches_operator(&john, FilterOperator::Equals, &Value::from("john")));
        assert!(!matches_operator(&john, FilterOperator::Equals, &Value::from("jo")));
        assert!(matches_operator(&john, FilterOperator::StartsWith, &Value::from("jo")));
        assert!(matches_operator(&john, FilterOperator::EndsWith, &Value::from("HN")));
        assert!(matches_operator(&Value::Int(42), FilterOperator::Contains, &Value::from("4")));
    }

    #[test]
    fn test_ordering_operators_fail_closed() {
        let age = Value::Int(18);
        assert!(matches_operator(&age, FilterOperator::Gte, &Value::Int(18)));
        assert!(!matches_operator(&age, FilterOperator::Gt, &Value::Int(18)));
        assert!(matches_operator(&age, FilterOperator::Lt, &Value::Float(18.5)));
        assert!(matches_operator(&age, FilterOperator::Lte, &Value::Int(18)));
        assert!(!matches_operator(&age, FilterOperator::Gt, &Value::from("1")));
        assert!(!matches_operator(&age, FilterOperator::Lt, &Value::from("99")));
    }

    #[test]
    fn test_ordering_operators_on_datetimes() {
        use chrono::TimeZone;
        use chrono::Utc;

        let cutoff = Value::from(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let before = Value::from(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
        let after = Value::from(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 1).unwrap());

        assert!(matches_operator(&after, FilterOperator::Gte, &cutoff));
        assert!(matches_operator(&cutoff, FilterOperator::Gte, &cutoff));
        assert!(!matches_operator(&before, FilterOperator::Gte, &cutoff));
        assert!(matches_operator(&before, FilterOperator::Lt, &cutoff));
        assert!(!matches_operator(&cutoff, FilterOperator::Lt, &cutoff));
        assert!(!matches_operator(&after, FilterOperator::Lt, &Value::from("2025")));
    }

    #[test]
    fn test_column_filters_and_null_values() {
        let (registry, rows) = people();
        let filters = [ColumnFilter::new("age", 18i64).operator(FilterOperator::Gte)];
        assert_eq!(ids(&filter_rows(&rows, &filters, "", &registry)), ["John"]);

        let filters = [ColumnFilter::new("age", 0i64).operator(FilterOperator::Gte)];
        // Joy has no age and fails every test.
        assert_eq!(
            ids(&filter_rows(&rows, &filters, "", &registry)),
            ["John", "Amy"]
        );
    }

    #[test]
    fn test_empty_filter_value_is_inactive() {
        let (registry, rows) = people();
        let filters = [
            ColumnFilter::new("age", ""),
            ColumnFilter::new("name", Value::Null).operator(FilterOperator::Equals),
        ];
        assert_eq!(filter_rows(&rows, &filters, "", &registry).len(), 3);
    }

    #[test]
    fn test_filters_combine_with_global() {
        let (registry, rows) = people();
        let filters = [ColumnFilter::new("name", "y")];
        assert_eq!(ids(&filter_rows(&rows, &filters, "jo", &registry)), ["Joy"]);
    }

    #[test]
    fn test_unknown_and_non_filterable_columns_are_skipped() {
        let (registry, rows) = people();
        let filters = [
            ColumnFilter::new("missing", "x"),
            ColumnFilter::new("secret", "nothing-matches"),
        ];
        assert_eq!(filter_rows(&rows, &filters, "", &registry).len(), 3);
    }

    #[test]
    fn test_custom_filter_replaces_operator() {
        let registry = Arc::new(
            ColumnRegistry::register([ColumnDef::accessor("tags", "tags").filter_fn(
                |row: &Row, column_id: &str, wanted: &Value| {
                    row.get_value(column_id)
                        .to_string()
                        .split(',')
                        .any(|tag| tag == wanted.to_string())
                },
            )])
            .unwrap(),
        );
        let records: Vec<Arc<Record>> = ["red,blue", "green", "blueish"]
            .into_iter()
            .map(|tags| Arc::new(Record::new().set("id", tags).set("tags", tags)))
            .collect();
        let row_id: RowIdFn = Arc::new(default_row_id);
        let rows = materialize(&records, &registry, &row_id);
        let filters = [ColumnFilter::new("tags", "blue")];
        assert_eq!(ids(&filter_rows(&rows, &filters, "", &registry)), ["red,blue"]);
    }
}

//! Sort stage.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::registry::ColumnRegistry;
use crate::row::Row;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// One key of the active sort. List order is tie-break priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortEntry {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortEntry {
    /// Creates an ascending entry.
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Creates a descending entry.
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Returns `true` for a descending entry.
    pub fn is_desc(&self) -> bool {
        self.direction == SortDirection::Desc
    }
}

/// Sorts rows by the given entries.
///
/// The sort is stable: rows that tie on every entry keep their input order.
/// Entries naming unknown or non-sortable columns are skipped. Always
/// returns a new vector.
pub fn sort_rows(rows: &[Row], entries: &[SortEntry], registry: &ColumnRegistry) -> Vec<Row> {
    let keys: Vec<(&Column, SortDirection)> = entries
        .iter()
        .filter_map(|entry| {
            registry
                .resolve(&entry.column_id)
                .filter(|column| column.is_sortable())
                .map(|column| (column, entry.direction))
        })
        .collect();

    if keys.is_empty() {
        return rows.to_vec();
    }

    // Default comparators read each value once up front.
    let values: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            keys.iter()
                .map(|(column, _)| match column.sort_fn() {
                    Some(_) => Value::Null,
                    None => column.value(row.original()),
                })
                .collect()
        })
        .collect();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        for (k, (column, direction)) in keys.iter().enumerate() {
            let ordering = match column.sort_fn() {
                Some(sort_fn) => {
                    let ordering = sort_fn(&rows[a], &rows[b], column.id());
                    match direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
                None => compare_values(&values[a][k], &values[b][k], *direction),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    order.into_iter().map(|i| rows[i].clone()).collect()
}

/// Default value ordering.
///
/// Nulls go after every non-null value in both directions; everything else
/// uses the natural ordering, reversed for [`SortDirection::Desc`].
pub fn compare_values(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.sort_cmp(b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

/// Computes the sort list after a user toggles a column.
///
/// An already-sorted column cycles `asc -> desc -> removed`. Passing `desc`
/// sets that direction instead of cycling. A column not yet sorted replaces
/// the whole list in single-sort mode and is appended in multi-sort mode.
pub fn toggle_sorting(
    current: &[SortEntry],
    column_id: &str,
    desc: Option<bool>,
    multi: bool,
) -> Vec<SortEntry> {
    let mut next: Vec<SortEntry> = if multi {
        current.to_vec()
    } else {
        current
            .iter()
            .filter(|entry| entry.column_id == column_id)
            .cloned()
            .collect()
    };

    let direction = |desc: bool| {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    };

    match next.iter().position(|entry| entry.column_id == column_id) {
        Some(i) => match (desc, next[i].direction) {
            (Some(desc), _) => next[i].direction = direction(desc),
            (None, SortDirection::Asc) => next[i].direction = SortDirection::Desc,
            (None, SortDirection::Desc) => {
                next.remove(i);
            }
        },
        None => next.push(SortEntry {
            column_id: column_id.to_string(),
            direction: direction(desc.unwrap_or(false)),
        }),
    }
    next
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

    fn rows(registry: &Arc<ColumnRegistry>, records: Vec<Record>) -> Vec<Row> {
        let records: Vec<Arc<Record>> = records.into_iter().map(Arc::new).collect();
        let row_id: RowIdFn = Arc::new(default_row_id);
        materialize(&records, registry, &row_id)
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(Row::id).collect()
    }

    fn score_registry() -> Arc<ColumnRegistry> {
        Arc::new(
            ColumnRegistry::register([
                ColumnDef::accessor("score", "score"),
                ColumnDef::accessor("name", "name"),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_nulls_last_ascending() {
        let registry = score_registry();
        let rows = rows(
            &registry,
            vec![
                Record::new().set("id", "a").set("score", Value::Null),
                Record::new().set("id", "b").set("score", 5i64),
                Record::new().set("id", "c").set("score", 2i64),
            ],
        );
        let sorted = sort_rows(&rows, &[SortEntry::asc("score")], &registry);
        assert_eq!(ids(&sorted), ["c", "b", "a"]);
    }

    #[test]
    fn test_nulls_last_descending() {
        let registry = score_registry();
        let rows = rows(
            &registry,
            vec![
                Record::new().set("id", "a").set("score", Value::Null),
                Record::new().set("id", "b").set("score", 5i64),
                Record::new().set("id", "c").set("score", 2i64),
            ],
        );
        let sorted = sort_rows(&rows, &[SortEntry::desc("score")], &registry);
        assert_eq!(ids(&sorted), ["b", "c", "a"]);
    }

    #[test]
    fn test_tie_break_chain_and_stability() {
        let registry = score_registry();
        let rows = rows(
            &registry,
            vec![
                Record::new().set("id", "1").set("score", 1i64).set("name", "b"),
                Record::new().set("id", "2").set("score", 2i64).set("name", "a"),
                Record::new().set("id", "3").set("score", 1i64).set("name", "a"),
                Record::new().set("id", "4").set("score", 1i64).set("name", "b"),
            ],
        );
        let sorted = sort_rows(
            &rows,
            &[SortEntry::asc("score"), SortEntry::asc("name")],
            &registry,
        );
        assert_eq!(ids(&sorted), ["3", "1", "4", "2"]);
    }

    #[test]
    fn test_custom_sort_is_reversed_for_desc() {
        let registry = Arc::new(
            ColumnRegistry::register([ColumnDef::accessor("len", "name").sort_fn(
                |a: &Row, b: &Row, column_id: &str| {
                    let len = |row: &Row| row.get_value(column_id).to_string().len();
                    len(a).cmp(&len(b))
                },
            )])
            .unwrap(),
        );
        let rows = rows(
            &registry,
            vec![
                Record::new().set("id", "a").set("name", "ccc"),
                Record::new().set("id", "b").set("name", "a"),
                Record::new().set("id", "c").set("name", "bb"),
            ],
        );
        assert_eq!(
            ids(&sort_rows(&rows, &[SortEntry::asc("len")], &registry)),
            ["b", "c", "a"]
        );
        assert_eq!(
            ids(&sort_rows(&rows, &[SortEntry::desc("len")], &registry)),
            ["a", "c", "b"]
        );
    }

    #[test]
    fn test_empty_and_unknown_entries_keep_order() {
        let registry = score_registry();
        let rows = rows(
            &registry,
            vec![
                Record::new().set("id", "x").set("score", 9i64),
                Record::new().set("id", "y").set("score", 1i64),
            ],
        );
        assert_eq!(ids(&sort_rows(&rows, &[], &registry)), ["x", "y"]);
        assert_eq!(
            ids(&sort_rows(&rows, &[SortEntry::asc("nope")], &registry)),
            ["x", "y"]
        );
    }

    #[test]
    fn test_non_sortable_entries_are_skipped() {
        let registry = Arc::new(
            ColumnRegistry::register([
                ColumnDef::accessor("score", "score").sortable(false),
                ColumnDef::accessor("name", "name"),
            ])
            .unwrap(),
        );
        let rows = rows(
            &registry,
            vec![
                Record::new().set("id", "x").set("score", 9i64).set("name", "b"),
                Record::new().set("id", "y").set("score", 1i64).set("name", "a"),
                Record::new().set("id", "z").set("score", 5i64).set("name", "b"),
            ],
        );
        assert_eq!(
            ids(&sort_rows(&rows, &[SortEntry::asc("score")], &registry)),
            ["x", "y", "z"]
        );
        assert_eq!(
            ids(&sort_rows(
                &rows,
                &[SortEntry::asc("score"), SortEntry::asc("name")],
                &registry
            )),
            ["y", "x", "z"]
        );
    }

    #[test]
    fn test_datetimes_sort_chronologically() {
        use chrono::TimeZone;
        use chrono::Utc;

        let registry = Arc::new(
            ColumnRegistry::register([ColumnDef::accessor("due", "due")]).unwrap(),
        );
        let rows = rows(
            &registry,
            vec![
                Record::new()
                    .set("id", "june")
                    .set("due", Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
                Record::new().set("id", "none").set("due", Value::Null),
                Record::new()
                    .set("id", "jan")
                    .set("due", Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()),
                Record::new()
                    .set("id", "march")
                    .set("due", Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
            ],
        );
        assert_eq!(
            ids(&sort_rows(&rows, &[SortEntry::asc("due")], &registry)),
            ["jan", "march", "june", "none"]
        );
        assert_eq!(
            ids(&sort_rows(&rows, &[SortEntry::desc("due")], &registry)),
            ["june", "march", "jan", "none"]
        );
    }

    #[test]
    fn test_toggle_cycles_asc_desc_removed() {
        let step1 = toggle_sorting(&[], "name", None, false);
        assert_eq!(step1, [SortEntry::asc("name")]);
        let step2 = toggle_sorting(&step1, "name", None, false);
        assert_eq!(step2, [SortEntry::desc("name")]);
        let step3 = toggle_sorting(&step2, "name", None, false);
        assert!(step3.is_empty());
    }

    #[test]
    fn test_toggle_single_replaces_multi_appends() {
        let current = vec![SortEntry::asc("name")];
        assert_eq!(
            toggle_sorting(&current, "score", None, false),
            [SortEntry::asc("score")]
        );
        assert_eq!(
            toggle_sorting(&current, "score", None, true),
            [SortEntry::asc("name"), SortEntry::asc("score")]
        );
    }

    #[test]
    fn test_toggle_explicit_direction() {
        let current = vec![SortEntry::asc("name"), SortEntry::asc("score")];
        assert_eq!(
            toggle_sorting(&current, "score", Some(true), true),
            [SortEntry::asc("name"), SortEntry::desc("score")]
        );
        assert_eq!(
            toggle_sorting(&[], "score", Some(true), false),
            [SortEntry::desc("score")]
        );
    }
}

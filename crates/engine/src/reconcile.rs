use std::collections::{BTreeSet, HashMap};
use ustva_core::{Cell, SchemaError, Table};

/// The only column reconciliation ever joins on.
pub const JOIN_KEY: &str = "Belegnummer";

/// Appended to a primary column whose name also exists in the secondary table.
pub const PRIMARY_SUFFIX: &str = "_Haupt";
/// Appended to a secondary column whose name also exists in the primary table.
pub const SECONDARY_SUFFIX: &str = "_Zusatz";

#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Both tables carry the join key; `table` holds the inner join.
    Matched { key: String, table: Table },
    /// No `Belegnummer` column on both sides. Not an error: the caller
    /// reports it and skips the reconciliation section.
    NoCommonKey { common_columns: Vec<String> },
}

impl Reconciliation {
    /// Number of reconciled records, or `None` when no join took place.
    pub fn match_count(&self) -> Option<usize> {
        match self {
            Reconciliation::Matched { table, .. } => Some(table.len()),
            Reconciliation::NoCommonKey { .. } => None,
        }
    }
}

/// Column names present in both tables, sorted.
pub fn common_columns<'a>(primary: &'a Table, secondary: &Table) -> BTreeSet<&'a str> {
    let theirs: BTreeSet<&str> = secondary.columns().iter().map(String::as_str).collect();
    primary
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|name| theirs.contains(name))
        .collect()
}

/// Only `Belegnummer` qualifies as a join key. Other shared columns are
/// never used, even when they exist.
pub fn select_join_key(common: &BTreeSet<&str>) -> Option<&'static str> {
    common.contains(JOIN_KEY).then_some(JOIN_KEY)
}

/// Find the join key and inner-join `primary` with `secondary` on it.
pub fn reconcile(primary: &Table, secondary: &Table) -> Result<Reconciliation, SchemaError> {
    let common = common_columns(primary, secondary);

    let Some(key) = select_join_key(&common) else {
        let common_columns: Vec<String> = common.into_iter().map(str::to_string).collect();
        tracing::warn!(?common_columns, "no common key for reconciliation");
        return Ok(Reconciliation::NoCommonKey { common_columns });
    };

    let table = inner_join(primary, secondary, key)?;
    tracing::info!(key, matches = table.len(), "datasets reconciled");
    Ok(Reconciliation::Matched {
        key: key.to_string(),
        table,
    })
}

/// Inner join on `key` using a hash index over the secondary table.
///
/// Output rows follow primary order, then secondary order for repeated
/// keys, so duplicate keys on both sides yield every pairing. Keys compare
/// exactly (type and value); empty keys never match.
/// Columns: all primary columns, then the secondary columns except the key,
/// with colliding names suffixed `_Haupt` / `_Zusatz`.
pub fn inner_join(primary: &Table, secondary: &Table, key: &str) -> Result<Table, SchemaError> {
    let left_key = primary.require_column(key)?;
    let right_key = secondary.require_column(key)?;

    let mut index: HashMap<&Cell, Vec<usize>> = HashMap::new();
    for (idx, row) in secondary.rows().iter().enumerate() {
        let cell = &row[right_key];
        if !cell.is_empty() {
            index.entry(cell).or_default().push(idx);
        }
    }

    let mut columns: Vec<String> = primary
        .columns()
        .iter()
        .map(|name| {
            if name != key && secondary.has_column(name) {
                format!("{name}{PRIMARY_SUFFIX}")
            } else {
                name.clone()
            }
        })
        .collect();
    let right_columns: Vec<usize> = (0..secondary.columns().len())
        .filter(|&idx| idx != right_key)
        .collect();
    columns.extend(right_columns.iter().map(|&idx| {
        let name = &secondary.columns()[idx];
        if primary.has_column(name) {
            format!("{name}{SECONDARY_SUFFIX}")
        } else {
            name.clone()
        }
    }));

    let mut joined = Table::new(columns)?;
    for left in primary.rows() {
        let Some(matches) = index.get(&left[left_key]) else {
            continue;
        };
        for &right_idx in matches {
            let right = &secondary.rows()[right_idx];
            let mut row = left.clone();
            row.extend(right_columns.iter().map(|&idx| right[idx].clone()));
            joined.push_row(row)?;
        }
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::from_rows(columns.iter().copied(), rows).unwrap()
    }

    fn ids(values: &[i64]) -> Vec<Vec<Cell>> {
        values.iter().map(|v| vec![Cell::Integer(*v)]).collect()
    }

    // ── key selection ─────────────────────────────────────────────────────────

    #[test]
    fn common_columns_is_an_intersection() {
        let a = table(&["Belegnummer", "Datum", "Betrag"], vec![]);
        let b = table(&["Betrag", "Kunde", "Belegnummer"], vec![]);
        let common: Vec<&str> = common_columns(&a, &b).into_iter().collect();
        assert_eq!(common, ["Belegnummer", "Betrag"]);
    }

    #[test]
    fn only_belegnummer_is_selected() {
        let with_key: BTreeSet<&str> = ["Belegnummer", "Datum"].into_iter().collect();
        assert_eq!(select_join_key(&with_key), Some("Belegnummer"));

        let without: BTreeSet<&str> = ["Datum", "Betrag"].into_iter().collect();
        assert_eq!(select_join_key(&without), None);
        assert_eq!(select_join_key(&BTreeSet::new()), None);
    }

    #[test]
    fn shared_other_column_is_not_a_key() {
        let a = table(&["Datum", "Betrag"], vec![vec![Cell::text("2024-01-15"), Cell::Integer(1)]]);
        let b = table(&["Datum", "Kunde"], vec![vec![Cell::text("2024-01-15"), Cell::text("X")]]);
        let result = reconcile(&a, &b).unwrap();
        assert_eq!(
            result,
            Reconciliation::NoCommonKey {
                common_columns: vec!["Datum".to_string()]
            }
        );
        assert_eq!(result.match_count(), None);
    }

    #[test]
    fn key_name_is_case_sensitive() {
        let a = table(&["belegnummer"], ids(&[1]));
        let b = table(&["belegnummer"], ids(&[1]));
        assert!(matches!(reconcile(&a, &b).unwrap(), Reconciliation::NoCommonKey { .. }));
    }

    // ── join ──────────────────────────────────────────────────────────────────

    #[test]
    fn inner_join_keeps_only_shared_keys() {
        let a = table(&["Belegnummer"], ids(&[1, 2, 3]));
        let b = table(&["Belegnummer"], ids(&[2, 3, 4]));
        let result = reconcile(&a, &b).unwrap();
        assert_eq!(result.match_count(), Some(2));

        let Reconciliation::Matched { key, table } = result else {
            panic!("expected a join");
        };
        assert_eq!(key, "Belegnummer");
        assert_eq!(table.rows(), ids(&[2, 3]).as_slice());
    }

    #[test]
    fn zero_matches_is_still_a_join() {
        let a = table(&["Belegnummer"], ids(&[1]));
        let b = table(&["Belegnummer"], ids(&[2]));
        assert_eq!(reconcile(&a, &b).unwrap().match_count(), Some(0));
    }

    #[test]
    fn keys_compare_exactly() {
        let a = table(
            &["Belegnummer"],
            vec![
                vec![Cell::Integer(1)],
                vec![Cell::text("R-2")],
                vec![Cell::text("r-3")],
                vec![Cell::Empty],
            ],
        );
        let b = table(
            &["Belegnummer"],
            vec![
                vec![Cell::text("1")],
                vec![Cell::text("R-2")],
                vec![Cell::text("R-3")],
                vec![Cell::Empty],
            ],
        );
        let joined = inner_join(&a, &b, JOIN_KEY).unwrap();
        assert_eq!(joined.rows(), [vec![Cell::text("R-2")]]);
    }

    #[test]
    fn colliding_columns_get_origin_suffixes() {
        let a = table(
            &["Belegnummer", "Betrag", "Steuersatz"],
            vec![vec![Cell::Integer(7), Cell::Integer(100), Cell::text("19%")]],
        );
        let b = table(
            &["Betrag", "Belegnummer", "Kunde"],
            vec![vec![Cell::Integer(99), Cell::Integer(7), Cell::text("Meier")]],
        );
        let joined = inner_join(&a, &b, JOIN_KEY).unwrap();
        assert_eq!(
            joined.columns(),
            ["Belegnummer", "Betrag_Haupt", "Steuersatz", "Betrag_Zusatz", "Kunde"]
        );
        assert_eq!(
            joined.rows()[0],
            vec![
                Cell::Integer(7),
                Cell::Integer(100),
                Cell::text("19%"),
                Cell::Integer(99),
                Cell::text("Meier")
            ]
        );
    }

    #[test]
    fn repeated_keys_pair_every_combination_in_order() {
        let a = table(
            &["Belegnummer", "Seite"],
            vec![
                vec![Cell::Integer(1), Cell::text("a1")],
                vec![Cell::Integer(1), Cell::text("a2")],
            ],
        );
        let b = table(
            &["Belegnummer", "Notiz"],
            vec![
                vec![Cell::Integer(1), Cell::text("b1")],
                vec![Cell::Integer(1), Cell::text("b2")],
            ],
        );
        let joined = inner_join(&a, &b, JOIN_KEY).unwrap();
        let pairs: Vec<(String, String)> = joined
            .rows()
            .iter()
            .map(|r| (r[1].to_string(), r[2].to_string()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("a1".to_string(), "b1".to_string()),
                ("a1".to_string(), "b2".to_string()),
                ("a2".to_string(), "b1".to_string()),
                ("a2".to_string(), "b2".to_string()),
            ]
        );
    }

    #[test]
    fn join_size_is_bounded_for_unique_keys() {
        let cases: [(&[i64], &[i64]); 4] = [
            (&[1, 2, 3], &[2, 3, 4]),
            (&[1, 2, 3, 4, 5], &[5]),
            (&[], &[1, 2]),
            (&[10, 20], &[10, 20, 30, 40]),
        ];
        for (left, right) in cases {
            let a = table(&["Belegnummer"], ids(left));
            let b = table(&["Belegnummer"], ids(right));
            let n = reconcile(&a, &b).unwrap().match_count().unwrap();
            assert!(n <= left.len().min(right.len()));
        }
    }

    #[test]
    fn suffix_clash_is_a_schema_error() {
        let a = table(&["Belegnummer", "Betrag", "Betrag_Haupt"], vec![]);
        let b = table(&["Belegnummer", "Betrag"], vec![]);
        assert_eq!(
            inner_join(&a, &b, JOIN_KEY),
            Err(SchemaError::DuplicateColumn("Betrag_Haupt".into()))
        );
    }
}

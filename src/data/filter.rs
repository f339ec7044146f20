use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, VehicleTable};

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the map is unconstrained; an empty set hides every row.
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Initialise a [`FilterState`] for `columns` with every value selected.
pub fn init_filter_state(table: &VehicleTable, columns: &[&str]) -> FilterState {
    columns
        .iter()
        .filter(|col| table.has_column(col))
        .map(|col| (col.to_string(), table.unique_values(col)))
        .collect()
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when its value for that column (null if the
/// cell is missing) is in the selected set.
pub fn filtered_indices(table: &VehicleTable, filters: &FilterState) -> Vec<usize> {
    (0..table.len())
        .filter(|&i| {
            filters
                .iter()
                .all(|(col, selected)| selected.contains(table.value(i, col)))
        })
        .collect()
}

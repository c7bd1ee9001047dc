//! Decoding one data row into records.
//!
//! Provides [`RowScanner`], which binds every declared field of a [`Record`] to the first
//! header leaf whose path ends with the field's declared path and decodes the cell under
//! that leaf. Fields whose path matches no leaf are left untouched, so a record may project
//! only part of a wide header.

use std::borrow::Cow;

use crate::{
    error::CellError,
    header::{HeaderNode, HeaderTree},
    record::{Field, Record},
};

/// Fits a row to `leaf_count` cells.
///
/// Longer rows lose their leading cells (the rightmost `leaf_count` are kept); shorter rows
/// are padded on the right with empty cells.
pub fn reconcile_row(row: &[String], leaf_count: usize) -> Vec<Cow<'_, str>> {
    let skip = row.len().saturating_sub(leaf_count);
    let mut cells: Vec<Cow<'_, str>> = row[skip..]
        .iter()
        .map(|c| Cow::Borrowed(c.as_str()))
        .collect();
    cells.resize(leaf_count, Cow::Borrowed(""));
    cells
}

#[derive(Debug, Clone)]
pub struct RowScanner<'t> {
    leaves: Vec<&'t HeaderNode>,
}

impl<'t> RowScanner<'t> {
    pub fn new(tree: &'t HeaderTree) -> Self {
        Self {
            leaves: tree.leaves(),
        }
    }

    pub fn from_leaves(leaves: Vec<&'t HeaderNode>) -> Self {
        Self { leaves }
    }

    pub fn leaves(&self) -> &[&'t HeaderNode] {
        &self.leaves
    }

    pub fn scan<R: Record>(&self, row: &[String], target: &mut R) -> Result<(), CellError> {
        self.scan_fields(&R::fields(), row, target)
    }

    /// Same as [`RowScanner::scan`] with a field table built by the caller, so batches can
    /// build it once.
    pub fn scan_fields<R>(
        &self,
        fields: &[Field<R>],
        row: &[String],
        target: &mut R,
    ) -> Result<(), CellError> {
        let cells = reconcile_row(row, self.leaves.len());
        for (field_index, field) in fields.iter().enumerate() {
            let declared = field.path().segments();
            let Some((leaf_index, leaf)) = self
                .leaves
                .iter()
                .enumerate()
                .find(|(_, leaf)| field.path().matches(leaf.path()))
            else {
                continue;
            };
            let col_index = leaf.col_range().0;
            field
                .decode_into(target, &cells[leaf_index], col_index)
                .map_err(|source| {
                    CellError::new(field_index, col_index, declared.to_vec(), source)
                })?;
        }
        Ok(())
    }

    /// True when the record's fields cover the leaves exactly, one to one and in order.
    pub fn is_header_consistent<R: Record>(&self) -> bool {
        self.fields_consistent(&R::fields())
    }

    pub fn fields_consistent<R>(&self, fields: &[Field<R>]) -> bool {
        fields.len() == self.leaves.len()
            && fields
                .iter()
                .zip(&self.leaves)
                .all(|(field, leaf)| field.path().matches(leaf.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn long_rows_keep_rightmost_cells() {
        let row = cells(&["1", "2", "3", "4", "5", "6", "7"]);
        let fitted = reconcile_row(&row, 5);
        assert_eq!(fitted, vec!["3", "4", "5", "6", "7"]);
    }

    #[test]
    fn short_rows_are_right_padded() {
        let row = cells(&["1", "2", "3"]);
        let fitted = reconcile_row(&row, 5);
        assert_eq!(fitted, vec!["1", "2", "3", "", ""]);
    }

    #[test]
    fn exact_rows_are_unchanged() {
        let row = cells(&["a", "b"]);
        assert_eq!(reconcile_row(&row, 2), vec!["a", "b"]);
        assert!(reconcile_row(&row, 0).is_empty());
    }
}

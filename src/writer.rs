//! Writing merged headers and record rows.
//!
//! [`HeaderLayout`] groups a record's declared paths by common prefix (keeping first-seen
//! order) into a header tree in which each group spans the columns of its descendants.
//! [`write_header`] emits that tree top-down: every group is merged across its columns and
//! styled, and every label is written at the top-left cell of its range.

use log::{debug, info};

use crate::{
    coords::coordinates_to_cell_name,
    error::{Error, Result},
    header::{HeaderNode, HeaderTree, Span},
    path::DeclaredPath,
    record::{Field, Record, declared_paths},
    workbook::{StyleId, Workbook},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    title: String,
    children: Vec<Group>,
}

impl Group {
    fn insert(&mut self, segments: &[String]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let idx = match self.children.iter().position(|c| c.title == *first) {
            Some(idx) => idx,
            None => {
                self.children.push(Group {
                    title: first.clone(),
                    children: Vec::new(),
                });
                self.children.len() - 1
            }
        };
        self.children[idx].insert(rest);
    }

    fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(Group::leaf_count).sum()
        }
    }

    /// Places this group's children starting at `col`, one header row per level.
    fn place(&self, node: &mut HeaderNode, mut col: usize, row: usize) {
        for child in &self.children {
            let span = child.leaf_count();
            let mut child_node = HeaderNode::child(
                node.path(),
                &Span {
                    value: child.title.clone(),
                    col_start: col,
                    col_end: col + span - 1,
                    row_start: row,
                    row_end: row,
                },
            );
            child.place(&mut child_node, col, row + 1);
            node.push_child(child_node);
            col += span;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    root: Group,
    depth: usize,
}

impl HeaderLayout {
    /// Fails when the paths do not all have the same number of segments.
    pub fn from_paths(paths: &[DeclaredPath]) -> Result<Self> {
        let mut root = Group {
            title: String::new(),
            children: Vec::new(),
        };
        let Some(first) = paths.first() else {
            return Ok(Self { root, depth: 0 });
        };
        let depth = first.len();
        for path in paths {
            if path.len() != depth {
                return Err(Error::PathDepthMismatch {
                    first: first.to_string(),
                    expected: depth,
                    path: path.to_string(),
                    found: path.len(),
                });
            }
            root.insert(path.segments());
        }
        Ok(Self { root, depth })
    }

    pub fn for_record<R: Record>() -> Result<Self> {
        Self::from_paths(&declared_paths::<R>())
    }

    /// Number of header rows; the first data row is `depth + 1`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn column_count(&self) -> usize {
        if self.root.children.is_empty() {
            0
        } else {
            self.root.leaf_count()
        }
    }

    pub fn to_tree(&self, sheet: &str) -> HeaderTree {
        let mut root = HeaderNode::root(sheet, self.column_count());
        self.root.place(&mut root, 1, 1);
        HeaderTree::from_root(root)
    }
}

/// Writes the header tree to every sheet in `sheets` and returns the number of header rows.
pub fn write_header<W: Workbook>(
    workbook: &mut W,
    sheets: &[String],
    tree: &HeaderTree,
    style: StyleId,
) -> Result<usize> {
    for child in tree.root().children() {
        write_node(workbook, sheets, child, style)?;
    }
    let depth = tree.depth();
    info!(
        "Wrote {} header row(s) over {} column(s) to {} sheet(s)",
        depth,
        tree.leaf_count(),
        sheets.len()
    );
    Ok(depth)
}

fn write_node<W: Workbook>(
    workbook: &mut W,
    sheets: &[String],
    node: &HeaderNode,
    style: StyleId,
) -> Result<()> {
    let (col_start, col_end) = node.col_range();
    let (row, _) = node.row_range();
    let start = coordinates_to_cell_name(col_start, row)?;
    if !node.is_leaf() {
        let end = coordinates_to_cell_name(col_end, row)?;
        for sheet in sheets {
            workbook.merge_range(sheet, &start, &end)?;
            workbook.set_cell_style(sheet, &start, &end, style)?;
        }
    }
    for sheet in sheets {
        workbook.set_cell_value(sheet, &start, node.value())?;
    }
    for child in node.children() {
        write_node(workbook, sheets, child, style)?;
    }
    Ok(())
}

/// Writes `records` below the header, starting at 1-based `first_row`.
///
/// Rows are split evenly across `sheets` in order; the last sheet also takes the remainder.
/// Each field goes to the column of the leaf its path matches in `tree`.
pub fn write_records<W: Workbook, R: Record>(
    workbook: &mut W,
    sheets: &[String],
    tree: &HeaderTree,
    records: &[R],
    first_row: usize,
) -> Result<()> {
    if records.is_empty() || sheets.is_empty() {
        return Ok(());
    }
    if records.len() < sheets.len() {
        return Err(Error::TooFewRows {
            rows: records.len(),
            sheets: sheets.len(),
        });
    }
    let fields: Vec<(usize, Field<R>)> = R::fields()
        .into_iter()
        .filter_map(|field| {
            let (_, leaf) = tree.find_leaf(field.path().segments())?;
            Some((leaf.col_range().0, field))
        })
        .collect();
    let per_sheet = records.len() / sheets.len();
    for (idx, sheet) in sheets.iter().enumerate() {
        let start = idx * per_sheet;
        let chunk = if idx == sheets.len() - 1 {
            &records[start..]
        } else {
            &records[start..start + per_sheet]
        };
        write_chunk(workbook, sheet, &fields, chunk, first_row)?;
        debug!("Wrote {} row(s) to sheet '{}'", chunk.len(), sheet);
    }
    Ok(())
}

fn write_chunk<W: Workbook, R>(
    workbook: &mut W,
    sheet: &str,
    fields: &[(usize, Field<R>)],
    records: &[R],
    first_row: usize,
) -> Result<()> {
    for (offset, record) in records.iter().enumerate() {
        let row = first_row + offset;
        for (col, field) in fields {
            let axis = coordinates_to_cell_name(*col, row)?;
            workbook.set_cell_value(sheet, &axis, &field.encode(record).encode())?;
        }
    }
    Ok(())
}

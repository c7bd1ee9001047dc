//! Header trees reconstructed from merged-cell spans.
//!
//! A sheet's header region is a stack of rows in which a label spanning several columns
//! (a merged range) sits above the labels of its sub-columns. The tree has a valueless
//! root covering every column; each node's children are the spans directly below it whose
//! columns lie inside its own. Leaves are the physical data columns.
//!
//! Spans come either from the sheet's merged ranges ([`HeaderTree::from_merge_cells`]) or
//! are synthesised from plain header rows ([`HeaderTree::from_header_rows`]), where a label
//! extends to the right until the next non-empty cell.

use itertools::Itertools;
use log::{debug, trace, warn};

use crate::{
    coords::cell_name_to_coordinates,
    error::{Error, Result},
    path::{PATH_SEPARATOR, suffix_matches},
    workbook::MergeCell,
};

/// One labelled rectangle of the header region, in 1-based sheet coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub value: String,
    pub col_start: usize,
    pub col_end: usize,
    pub row_start: usize,
    pub row_end: usize,
}

impl Span {
    pub fn from_merge_cell(cell: &MergeCell) -> Result<Self> {
        let (col_start, row_start) = cell_name_to_coordinates(cell.start_axis())?;
        let (col_end, row_end) = cell_name_to_coordinates(cell.end_axis())?;
        if col_end < col_start || row_end < row_start {
            return Err(Error::InvalidSpan {
                start: cell.start_axis().to_string(),
                end: cell.end_axis().to_string(),
                reason: "end precedes start",
            });
        }
        Ok(Self {
            value: cell.value().to_string(),
            col_start,
            col_end,
            row_start,
            row_end,
        })
    }
}

/// Groups plain header rows into spans.
///
/// Within a row a span starts at every non-empty cell and ends right before the next one;
/// the last span of a row reaches `width` (or the row's own length when that is larger).
/// Blank cells before the first label of a row are read as a vertical merge: a span from a
/// lower row whose columns lie entirely under them starts in that upper row instead.
pub fn spans_from_header_rows(rows: &[Vec<String>], width: usize) -> Vec<Span> {
    let mut spans = Vec::new();
    // last leading blank column of each row processed so far
    let mut leading_blank_ends: Vec<usize> = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        let row_number = row_idx + 1;
        let last_col = width.max(row.len());
        let mut row_spans: Vec<Span> = Vec::new();
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col = col_idx + 1;
            if let Some(previous) = row_spans.last_mut() {
                previous.col_end = col - 1;
            }
            row_spans.push(Span {
                value: cell.clone(),
                col_start: col,
                col_end: col,
                row_start: row_number,
                row_end: row_number,
            });
        }
        match row_spans.last_mut() {
            Some(last) => last.col_end = last_col,
            None => warn!("Header row {row_number} has no labels"),
        }
        leading_blank_ends.push(row_spans.first().map_or(last_col, |first| first.col_start - 1));

        for span in &mut row_spans {
            while span.row_start > 1 && span.col_end <= leading_blank_ends[span.row_start - 2] {
                span.row_start -= 1;
            }
        }
        spans.extend(row_spans);
    }
    spans
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    value: String,
    col_start: usize,
    col_end: usize,
    row_start: usize,
    row_end: usize,
    path: Vec<String>,
    children: Vec<HeaderNode>,
}

impl HeaderNode {
    pub(crate) fn root(name: &str, col_end: usize) -> Self {
        Self {
            value: name.to_string(),
            col_start: 1,
            col_end,
            row_start: 0,
            row_end: 0,
            path: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn child(parent_path: &[String], span: &Span) -> Self {
        let mut path = Vec::with_capacity(parent_path.len() + 1);
        path.extend_from_slice(parent_path);
        path.push(span.value.clone());
        Self {
            value: span.value.clone(),
            col_start: span.col_start,
            col_end: span.col_end,
            row_start: span.row_start,
            row_end: span.row_end,
            path,
            children: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child: HeaderNode) {
        self.children.push(child);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn col_range(&self) -> (usize, usize) {
        (self.col_start, self.col_end)
    }

    pub fn row_range(&self) -> (usize, usize) {
        (self.row_start, self.row_end)
    }

    pub fn col_span(&self) -> usize {
        self.col_end + 1 - self.col_start
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn children(&self) -> &[HeaderNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The valueless root of a sheet; only it has an empty path.
    pub fn is_dummy(&self) -> bool {
        self.path.is_empty()
    }

    pub fn leaves(&self) -> Vec<&HeaderNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a HeaderNode>) {
        if self.children.is_empty() {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Number of header levels below this node.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Last header row on the leftmost branch, i.e. the row right above the first data row.
    pub fn rows_begin_index(&self) -> usize {
        let mut node = self;
        while let Some(first) = node.children.first() {
            node = first;
        }
        node.row_end
    }

    /// Finds a descendant by `|`-joined labels. On a non-root node the lookup is relative:
    /// the first segment must be this node's own label.
    pub fn sub_node(&self, path: &str) -> Option<&HeaderNode> {
        if path.is_empty() {
            return None;
        }
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        if self.is_dummy() {
            self.children.iter().find_map(|child| child.find(&segments))
        } else {
            self.find(&segments)
        }
    }

    fn find(&self, segments: &[&str]) -> Option<&HeaderNode> {
        let (first, rest) = segments.split_first()?;
        if *first != self.value {
            return None;
        }
        if rest.is_empty() {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(rest))
    }

    /// Index range `[start, end]` in `spans` holding this node's children, if any.
    fn child_bounds(&self, spans: &[Span]) -> Option<(usize, usize)> {
        let mut start = None;
        for (idx, span) in spans.iter().enumerate() {
            let inside = span.row_start > self.row_end
                && span.col_start >= self.col_start
                && span.col_end <= self.col_end;
            if !inside {
                continue;
            }
            if start.is_none() && span.col_start == self.col_start {
                start = Some(idx);
            }
            if span.col_end == self.col_end {
                return start.map(|start| (start, idx));
            }
        }
        None
    }

    fn build_children(&mut self, spans: &[Span]) {
        let Some((start, end)) = self.child_bounds(spans) else {
            return;
        };
        for span in &spans[start..=end] {
            let mut node = HeaderNode::child(&self.path, span);
            node.build_children(spans);
            self.children.push(node);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTree {
    root: HeaderNode,
}

impl HeaderTree {
    pub fn from_merge_cells(sheet: &str, column_count: usize, cells: &[MergeCell]) -> Result<Self> {
        let spans = cells
            .iter()
            .map(Span::from_merge_cell)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_spans(sheet, column_count, spans))
    }

    pub fn from_header_rows(sheet: &str, rows: &[Vec<String>], column_count: usize) -> Self {
        let spans = spans_from_header_rows(rows, column_count);
        Self::from_spans(sheet, column_count, spans)
    }

    /// Builds the tree from spans in any order; they are visited row by row, left to right.
    pub fn from_spans(sheet: &str, column_count: usize, mut spans: Vec<Span>) -> Self {
        spans.sort_by_key(|span| (span.row_start, span.col_start));
        let width = spans
            .iter()
            .map(|span| span.col_end)
            .max()
            .unwrap_or(0)
            .max(column_count);
        let mut root = HeaderNode::root(sheet, width);
        root.build_children(&spans);
        if root.children.is_empty() && !spans.is_empty() {
            warn!("No header span of '{sheet}' starts at column 1; every column is unlabelled");
        }
        let tree = Self { root };
        debug!(
            "Built header tree for '{}' from {} span(s): {} leaf column(s), depth {}",
            sheet,
            spans.len(),
            tree.leaf_count(),
            tree.depth()
        );
        trace!(
            "Leaf columns of '{}': {}",
            sheet,
            tree.leaf_paths().iter().map(|path| path.join(PATH_SEPARATOR)).join(", ")
        );
        tree
    }

    pub(crate) fn from_root(root: HeaderNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &HeaderNode {
        &self.root
    }

    pub fn sheet(&self) -> &str {
        self.root.value()
    }

    pub fn leaves(&self) -> Vec<&HeaderNode> {
        self.root.leaves()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    pub fn leaf_paths(&self) -> Vec<&[String]> {
        self.leaves().into_iter().map(HeaderNode::path).collect()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of header rows, i.e. the 0-based index of the first data row.
    pub fn rows_begin_index(&self) -> usize {
        self.root.rows_begin_index()
    }

    pub fn sub_tree(&self, path: &str) -> Option<&HeaderNode> {
        self.root.sub_node(path)
    }

    /// First leaf whose path ends with `declared`, with its position among the leaves.
    pub fn find_leaf<S: AsRef<str>>(&self, declared: &[S]) -> Option<(usize, &HeaderNode)> {
        self.leaves()
            .into_iter()
            .enumerate()
            .find(|(_, leaf)| suffix_matches(declared, leaf.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn synthesises_spans_from_rows() {
        let rows = vec![row(&["g1", "", "g2", ""]), row(&["a", "b", "c", "d"])];
        let spans = spans_from_header_rows(&rows, 4);
        let shape: Vec<(&str, usize, usize, usize)> = spans
            .iter()
            .map(|s| (s.value.as_str(), s.col_start, s.col_end, s.row_start))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("g1", 1, 2, 1),
                ("g2", 3, 4, 1),
                ("a", 1, 1, 2),
                ("b", 2, 2, 2),
                ("c", 3, 3, 2),
                ("d", 4, 4, 2),
            ]
        );
    }

    #[test]
    fn trimmed_rows_extend_to_sheet_width() {
        let rows = vec![row(&["all"]), row(&["a", "b", "c"])];
        let spans = spans_from_header_rows(&rows, 3);
        assert_eq!((spans[0].col_start, spans[0].col_end), (1, 3));
    }

    #[test]
    fn merged_spans_in_any_order_build_same_tree() {
        let ordered = vec![
            MergeCell::new("A1", "B1", "g1"),
            MergeCell::new("C1", "C1", "g2"),
            MergeCell::new("A2", "A2", "a"),
            MergeCell::new("B2", "B2", "b"),
            MergeCell::new("C2", "C2", "c"),
        ];
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        let first = HeaderTree::from_merge_cells("s", 3, &ordered).unwrap();
        let second = HeaderTree::from_merge_cells("s", 3, &shuffled).unwrap();
        assert_eq!(first, second);
        let paths: Vec<String> = first.leaf_paths().iter().map(|p| p.join("/")).collect();
        assert_eq!(paths, vec!["g1/a", "g1/b", "g2/c"]);
    }

    #[test]
    fn no_spans_leaves_root_as_single_leaf() {
        let tree = HeaderTree::from_spans("empty", 0, Vec::new());
        assert_eq!(tree.leaf_count(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.rows_begin_index(), 0);
    }

    #[test]
    fn relative_sub_node_lookup() {
        let rows = vec![row(&["g", ""]), row(&["a", "b"])];
        let tree = HeaderTree::from_header_rows("s", &rows, 2);
        let group = tree.sub_tree("g").unwrap();
        assert_eq!(group.col_range(), (1, 2));
        assert_eq!(group.sub_node("g|b").unwrap().col_range(), (2, 2));
        assert!(group.sub_node("b").is_none());
        assert!(tree.sub_tree("").is_none());
    }
}

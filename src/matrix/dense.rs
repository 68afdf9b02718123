use core::ops::Index;

/// Slice of data with a stride. Used to look at a row of a column-major matrix.
pub struct StridedVecView<'a, A: 'a> {
    pub data: &'a [A],
    pub start: usize,
    pub stride: usize,
    pub len: usize,
}

impl<'a, A: 'a> StridedVecView<'a, A> {
    pub fn new(data: &'a [A], start: usize, stride: usize, len: usize) -> Self {
        Self {
            data,
            start,
            stride,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter<'b>(&'b self) -> impl Iterator<Item = &'b A> + 'b {
        (0..self.len).map(move |pos| &self[pos])
    }
}

impl<'a, A: 'a + Clone> StridedVecView<'a, A> {
    pub fn to_vec(&self) -> Vec<A> {
        self.iter().cloned().collect()
    }
}

impl<'a, A: 'a> Index<usize> for StridedVecView<'a, A> {
    type Output = A;
    fn index(&self, pos: usize) -> &A {
        assert!(pos < self.len);
        &self.data[self.start + pos * self.stride]
    }
}

/// Store a dense matrix in a column-major way.
///
/// The split search scans one feature at a time, so the columns are contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMajorMatrix<A> {
    /// Number of rows in the matrix
    n_rows: usize,
    /// Number of columns in the matrix
    n_cols: usize,
    /// Values, one column after the other
    values: Vec<A>,
}

impl<A> ColumnMajorMatrix<A> {
    pub fn from_columns(columns: Vec<Vec<A>>) -> Self {
        let n_cols = columns.len();
        let n_rows = columns.first().map_or(0, |c| c.len());
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for column in columns {
            assert_eq!(column.len(), n_rows, "all the columns must have the same size");
            values.extend(column);
        }
        Self {
            n_rows,
            n_cols,
            values,
        }
    }

    pub fn from_rows(rows: Vec<Vec<A>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut values: Vec<A> = Vec::with_capacity(n_rows * n_cols);
        let mut rows: Vec<_> = rows
            .into_iter()
            .map(|r| {
                assert_eq!(r.len(), n_cols, "all the rows must have the same size");
                r.into_iter()
            })
            .collect();
        for _ in 0..n_cols {
            for row in &mut rows {
                values.push(row.next().expect("row length checked above"));
            }
        }
        assert_eq!(n_rows * n_cols, values.len());
        Self {
            n_rows,
            n_cols,
            values,
        }
    }

    pub fn from_function(n_rows: usize, n_cols: usize, f: impl Fn(usize, usize) -> A) -> Self {
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for col in 0..n_cols {
            for row in 0..n_rows {
                values.push(f(row, col));
            }
        }
        Self {
            n_rows,
            n_cols,
            values,
        }
    }

    pub fn column(&self, col: usize) -> &[A] {
        let start = col * self.n_rows;
        &self.values.as_slice()[start..start + self.n_rows]
    }

    pub fn columns(&self) -> impl Iterator<Item = &[A]> {
        (0..self.n_cols).map(move |col| self.column(col))
    }

    pub fn row(&self, row: usize) -> StridedVecView<'_, A> {
        assert!(row < self.n_rows);
        StridedVecView::new(&self.values, row, self.n_rows, self.n_cols)
    }

    pub fn flat(&self) -> &Vec<A> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
}

impl<A: Clone> ColumnMajorMatrix<A> {
    /// Copy of the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut values = Vec::with_capacity(rows.len() * self.n_cols);
        for col in 0..self.n_cols {
            let column = self.column(col);
            values.extend(rows.iter().map(|&row| column[row].clone()));
        }
        Self {
            n_rows: rows.len(),
            n_cols: self.n_cols,
            values,
        }
    }
}

impl<A> Index<(usize, usize)> for ColumnMajorMatrix<A> {
    type Output = A;
    fn index(&self, (row, col): (usize, usize)) -> &A {
        // No need to check for col because it fill be out of the buffer
        assert!(row < self.n_rows);
        &self.values[row + col * self.n_rows]
    }
}

use crate::{ColumnMajorMatrix, FitError, FitResult};

/// Util for parsing a CSV without headers into a dataset.
///
/// The first column of the CSV must be the target.
pub fn parse_csv(data: &str, sep: &str) -> FitResult<Dataset> {
    let mut target: Vec<f64> = Vec::new();
    let mut features: Vec<Vec<f64>> = Vec::new();
    for (n_line, l) in data.lines().enumerate() {
        if l.trim().is_empty() {
            continue;
        }
        let mut items = l.split(sep).map(str::trim);
        let first = items
            .next()
            .ok_or_else(|| FitError::Parse(format!("line {} is empty", n_line + 1)))?;
        target.push(first.parse::<f64>()?);
        let row = items.map(|e| e.parse()).collect::<Result<Vec<f64>, _>>()?;
        features.push(row);
    }
    Dataset::from_rows(features, target)
}

/// Store the raw data.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Predictor for the learning
    pub features: ColumnMajorMatrix<f64>,
    /// Target, used for the learning
    pub target: Vec<f64>,
}

impl Dataset {
    /// Check the shapes and the values before building the dataset.
    pub fn new(features: ColumnMajorMatrix<f64>, target: Vec<f64>) -> FitResult<Self> {
        let dataset = Dataset { features, target };
        dataset.check()?;
        Ok(dataset)
    }

    pub fn from_rows(rows: Vec<Vec<f64>>, target: Vec<f64>) -> FitResult<Self> {
        if rows.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        let n_cols = rows[0].len();
        if let Some((n_row, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(FitError::InvalidValue(format!(
                "row {} has {} values, expected {}",
                n_row,
                row.len(),
                n_cols
            )));
        }
        Self::new(ColumnMajorMatrix::from_rows(rows), target)
    }

    pub fn n_rows(&self) -> usize {
        self.features.n_rows()
    }

    pub fn n_features(&self) -> usize {
        self.features.n_cols()
    }

    /// Fail fast on anything the tree can't learn from.
    pub(crate) fn check(&self) -> FitResult<()> {
        if self.features.n_rows() != self.target.len() {
            return Err(FitError::ShapeMismatch {
                n_rows: self.features.n_rows(),
                n_targets: self.target.len(),
            });
        }
        if self.target.is_empty() || self.features.n_cols() == 0 {
            return Err(FitError::EmptyDataset);
        }
        if let Some(pos) = self.features.flat().iter().position(|x| !x.is_finite()) {
            let (row, col) = (pos % self.n_rows(), pos / self.n_rows());
            return Err(FitError::InvalidValue(format!(
                "feature {} of row {} is {}",
                col,
                row,
                self.features.flat()[pos]
            )));
        }
        if let Some(row) = self.target.iter().position(|x| !x.is_finite()) {
            return Err(FitError::InvalidValue(format!(
                "target of row {} is {}",
                row, self.target[row]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let data = "1\t0.5\t2\n0\t1.5\t3\n\n";
        let dataset = parse_csv(data, "\t").expect("Train data");
        assert_eq!(dataset.target, vec![1., 0.]);
        assert_eq!(dataset.features.column(0), &[0.5, 1.5]);
        assert_eq!(dataset.features.column(1), &[2., 3.]);
    }

    #[test]
    fn test_parse_csv_errors() {
        match parse_csv("1,a\n", ",") {
            Err(FitError::Parse(_)) => {}
            e => panic!("unexpected {:?}", e),
        }
        match parse_csv("1,2\n0,1,3\n", ",") {
            Err(FitError::InvalidValue(_)) => {}
            e => panic!("unexpected {:?}", e),
        }
        assert_eq!(parse_csv("", ",").unwrap_err(), FitError::EmptyDataset);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Dataset::from_rows(vec![vec![1.], vec![2.]], vec![1.]).unwrap_err();
        assert_eq!(
            err,
            FitError::ShapeMismatch {
                n_rows: 2,
                n_targets: 1
            }
        );
    }

    #[test]
    fn test_nan_is_rejected() {
        let err = Dataset::from_rows(vec![vec![1.], vec![std::f64::NAN]], vec![1., 2.]);
        match err {
            Err(FitError::InvalidValue(msg)) => assert!(msg.contains("row 1")),
            e => panic!("unexpected {:?}", e),
        }
        assert!(Dataset::from_rows(vec![vec![1.]], vec![std::f64::INFINITY]).is_err());
    }
}

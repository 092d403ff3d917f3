//! Median imputation for numeric sensor columns

use crate::error::{PumpGuardError, Result};
use polars::prelude::*;

/// A numeric column after imputation
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedColumn {
    pub values: Vec<f64>,
    /// Median used as fill value
    pub fill_value: f64,
    /// Number of entries that were missing or non-finite
    pub n_filled: usize,
}

/// Cast a column to `Float64` and replace missing entries with the median of
/// the present ones. A present value that does not parse as a number is a
/// data error, not a missing entry.
pub fn impute_median(column: &Column) -> Result<ImputedColumn> {
    let name = column.name().to_string();
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| PumpGuardError::DataError(format!("column '{}' is not numeric: {}", name, e)))?;

    let unparseable = casted.null_count().saturating_sub(column.null_count());
    if unparseable > 0 {
        return Err(PumpGuardError::DataError(format!(
            "column '{}' has {} non-numeric value(s)",
            name, unparseable
        )));
    }
    let ca = casted
        .f64()
        .map_err(|e| PumpGuardError::DataError(e.to_string()))?;

    let fill_value = median(ca.into_iter().flatten().filter(|v| v.is_finite()))
        .ok_or_else(|| PumpGuardError::DataError(format!("column '{}' has no numeric values", name)))?;

    let mut n_filled = 0;
    let values = ca
        .into_iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => x,
            _ => {
                n_filled += 1;
                fill_value
            }
        })
        .collect();

    Ok(ImputedColumn {
        values,
        fill_value,
        n_filled,
    })
}

/// Median of the given values, averaging the two middle elements for even counts.
pub fn median<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_impute_fills_nulls_with_median() {
        let series = Series::new("temp".into(), &[Some(10.0), None, Some(30.0), Some(20.0), None]);
        let column: Column = series.into();
        let imputed = impute_median(&column).unwrap();
        assert_eq!(imputed.fill_value, 20.0);
        assert_eq!(imputed.n_filled, 2);
        assert_eq!(imputed.values, vec![10.0, 20.0, 30.0, 20.0, 20.0]);
    }

    #[test]
    fn test_impute_integer_column() {
        let series = Series::new("amps".into(), &[Some(5i64), None, Some(7)]);
        let column: Column = series.into();
        let imputed = impute_median(&column).unwrap();
        assert_eq!(imputed.values, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_non_numeric_text_is_error() {
        let series = Series::new("vib".into(), &[Some("1.5"), None, Some("n/a"), Some("2.5")]);
        let column: Column = series.into();
        match impute_median(&column) {
            Err(PumpGuardError::DataError(msg)) => {
                assert!(msg.contains("'vib'"), "{}", msg);
                assert!(msg.contains("1 non-numeric"), "{}", msg);
            }
            other => panic!("expected DataError, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_text_with_gaps_is_imputed() {
        let series = Series::new("vib".into(), &[Some("1.5"), None, Some("2.5")]);
        let column: Column = series.into();
        let imputed = impute_median(&column).unwrap();
        assert_eq!(imputed.values, vec![1.5, 2.0, 2.5]);
        assert_eq!(imputed.n_filled, 1);
    }

    #[test]
    fn test_impute_all_missing_is_error() {
        let series = Series::new("vib".into(), &[None::<f64>, None]);
        let column: Column = series.into();
        assert!(matches!(impute_median(&column), Err(PumpGuardError::DataError(_))));
    }
}

//! Classification quality report

use crate::health::HealthStatus;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    /// One-vs-rest ROC AUC, macro-averaged over classes where it is defined
    pub roc_auc: Option<f64>,
    /// `confusion[true][predicted]`, indexed like `per_class`
    pub confusion: Vec<Vec<usize>>,
    pub n_samples: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn label_name(class: usize) -> String {
    HealthStatus::from_index(class)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| class.to_string())
}

impl ClassificationReport {
    /// Build the report.
    ///
    /// `classes` lists the model's class labels; `proba` has one column per
    /// entry of `classes`. Labels outside `classes` are ignored.
    pub fn compute(y_true: &[usize], y_pred: &[usize], proba: &Array2<f64>, classes: &[usize]) -> Self {
        let k = classes.len();
        let position = |label: usize| classes.iter().position(|&c| c == label);

        let mut confusion = vec![vec![0usize; k]; k];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if let (Some(ti), Some(pi)) = (position(t), position(p)) {
                confusion[ti][pi] += 1;
            }
        }

        let n_samples = y_true.len();
        let correct: usize = (0..k).map(|i| confusion[i][i]).sum();

        let per_class: Vec<ClassMetrics> = (0..k)
            .map(|i| {
                let tp = confusion[i][i];
                let support: usize = confusion[i].iter().sum();
                let predicted: usize = (0..k).map(|r| confusion[r][i]).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label_name(classes[i]),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let macro_avg = Self::average(&per_class, |_| 1.0);
        let total_support: usize = per_class.iter().map(|c| c.support).sum();
        let weighted_avg = Self::average(&per_class, |c| c.support as f64 / total_support.max(1) as f64 * k as f64);

        let roc_auc = {
            let aucs: Vec<f64> = (0..k)
                .filter_map(|i| {
                    let positives: Vec<bool> = y_true.iter().map(|&t| t == classes[i]).collect();
                    let scores: Vec<f64> = proba.column(i).to_vec();
                    roc_auc_binary(&positives, &scores)
                })
                .collect();
            if aucs.is_empty() {
                None
            } else {
                Some(aucs.iter().sum::<f64>() / aucs.len() as f64)
            }
        };

        Self {
            per_class,
            accuracy: ratio(correct, n_samples),
            macro_avg,
            weighted_avg,
            roc_auc,
            confusion,
            n_samples,
        }
    }

    fn average<F: Fn(&ClassMetrics) -> f64>(per_class: &[ClassMetrics], weight: F) -> AverageMetrics {
        let k = per_class.len().max(1) as f64;
        AverageMetrics {
            precision: per_class.iter().map(|c| weight(c) * c.precision).sum::<f64>() / k,
            recall: per_class.iter().map(|c| weight(c) * c.recall).sum::<f64>() / k,
            f1_score: per_class.iter().map(|c| weight(c) * c.f1_score).sum::<f64>() / k,
        }
    }
}

/// Binary ROC AUC via the rank-sum statistic, ties sharing their mean rank.
/// `None` if either class is absent.
pub fn roc_auc_binary(positives: &[bool], scores: &[f64]) -> Option<f64> {
    let n_pos = positives.iter().filter(|&&p| p).count();
    let n_neg = positives.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let mean_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = mean_rank;
        }
        i = j + 1;
    }

    let rank_sum: f64 = positives
        .iter()
        .zip(&ranks)
        .filter(|(p, _)| **p)
        .map(|(_, r)| r)
        .sum();
    let u = rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos * n_neg) as f64)
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.per_class {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1_score, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>12} {:>10} {:>10} {:>10.2} {:>10}", "accuracy", "", "", self.accuracy, self.n_samples)?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, avg.precision, avg.recall, avg.f1_score, self.n_samples
            )?;
        }
        match self.roc_auc {
            Some(auc) => write!(f, "\nROC AUC (one-vs-rest, macro): {:.4}", auc),
            None => write!(f, "\nROC AUC: undefined for this test set"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 2, 0];
        let proba = array![[0.9, 0.1, 0.0], [0.1, 0.8, 0.1], [0.0, 0.2, 0.8], [0.7, 0.2, 0.1]];
        let report = ClassificationReport::compute(&y, &y, &proba, &[0, 1, 2]);

        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_avg.f1_score, 1.0);
        assert_eq!(report.roc_auc, Some(1.0));
        assert_eq!(report.per_class[0].label, "HEALTHY");
        assert_eq!(report.per_class[0].support, 2);
    }

    #[test]
    fn test_per_class_values() {
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 1, 1, 1];
        let proba = array![[0.8, 0.2], [0.4, 0.6], [0.3, 0.7], [0.1, 0.9]];
        let report = ClassificationReport::compute(&y_true, &y_pred, &proba, &[0, 1]);

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.per_class[0].precision, 1.0);
        assert_eq!(report.per_class[0].recall, 0.5);
        assert!((report.per_class[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.per_class[1].recall, 1.0);
        assert_eq!(report.confusion, vec![vec![1, 1], vec![0, 2]]);
        // equal supports: weighted == macro
        assert!((report.weighted_avg.f1_score - report.macro_avg.f1_score).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_binary() {
        assert_eq!(roc_auc_binary(&[false, true], &[0.2, 0.8]), Some(1.0));
        assert_eq!(roc_auc_binary(&[true, false], &[0.2, 0.8]), Some(0.0));
        assert_eq!(roc_auc_binary(&[true, false], &[0.5, 0.5]), Some(0.5));
        assert_eq!(roc_auc_binary(&[true, true], &[0.1, 0.9]), None);
    }

    #[test]
    fn test_auc_undefined_when_single_class_in_test() {
        let y = vec![1, 1];
        let proba = array![[0.2, 0.8], [0.3, 0.7]];
        let report = ClassificationReport::compute(&y, &y, &proba, &[0, 1]);
        assert_eq!(report.roc_auc, None);
        assert!(report.to_string().contains("undefined"));
    }

    #[test]
    fn test_display_layout() {
        let y = vec![0, 1];
        let proba = array![[1.0, 0.0], [0.0, 1.0]];
        let text = ClassificationReport::compute(&y, &y, &proba, &[0, 1]).to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("WARNING"));
    }
}

//! One full analysis: validate, predict, explain, advise, record

use crate::advisor::advise;
use crate::error::Result;
use crate::hypothesis::{Hypothesis, HypothesisGenerator};
use crate::inference::{Prediction, Predictor};
use crate::sensor::SensorReading;
use crate::session::{AnalysisSession, HistoryRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Everything produced for one reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub prediction: Prediction,
    pub hypothesis: Hypothesis,
    pub recommendations: Vec<String>,
    pub record: HistoryRecord,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    predictor: Arc<Predictor>,
    hypotheses: HypothesisGenerator,
}

impl Analyzer {
    pub fn new(predictor: Arc<Predictor>, hypotheses: HypothesisGenerator) -> Self {
        Self { predictor, hypotheses }
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn hypotheses_enabled(&self) -> bool {
        self.hypotheses.is_enabled()
    }

    /// Run the full chain and append the result to `session`.
    ///
    /// An invalid reading is rejected before anything is recorded. The
    /// hypothesis step cannot fail.
    pub async fn analyze(&self, session: &mut AnalysisSession, reading: SensorReading) -> Result<AnalysisOutcome> {
        let prediction = self.evaluate(&reading)?;
        let hypothesis = self.hypotheses.generate(&reading, prediction.status, prediction.risk).await;
        let recommendations = advise(&reading);

        let record = session
            .record(&reading, prediction.status, prediction.risk, hypothesis.text.clone())
            .clone();
        info!(
            session = %session.id(),
            status = %prediction.status,
            risk = prediction.risk,
            fallback = hypothesis.is_fallback(),
            "Analysis recorded"
        );

        Ok(AnalysisOutcome {
            prediction,
            hypothesis,
            recommendations,
            record,
        })
    }

    /// Validate and predict without touching any history
    pub fn evaluate(&self, reading: &SensorReading) -> Result<Prediction> {
        reading.validate()?;
        self.predictor.predict(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactBundle;
    use crate::error::PumpGuardError;
    use crate::health::HealthStatus;
    use crate::hypothesis::FallbackReason;
    use crate::preprocessing::StandardScaler;
    use crate::training::RandomForest;
    use ndarray::array;

    fn analyzer() -> Analyzer {
        let x = array![
            [1.0, 30.0, 5.0],
            [1.5, 35.0, 6.0],
            [7.0, 40.0, 6.0],
            [7.5, 38.0, 5.5],
            [9.0, 85.0, 14.0],
            [8.0, 80.0, 13.0],
        ];
        let y = vec![0, 0, 1, 1, 2, 2];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        let mut model = RandomForest::new(20).with_random_state(42);
        model.fit(&scaled, &y).unwrap();
        let predictor = Predictor::from_bundle(ArtifactBundle::new(model, scaler)).unwrap();
        Analyzer::new(Arc::new(predictor), HypothesisGenerator::disabled())
    }

    #[tokio::test]
    async fn test_analyze_appends_one_record() {
        let analyzer = analyzer();
        let mut session = AnalysisSession::new();

        let outcome = analyzer
            .analyze(&mut session, SensorReading::new(8.0, 75.0, 13.0))
            .await
            .unwrap();

        assert_eq!(session.len(), 1);
        assert_eq!(session.records()[0], outcome.record);
        assert_eq!(outcome.record.status, outcome.prediction.status);
        assert_eq!(outcome.record.hypothesis, outcome.hypothesis.text);
        assert_eq!(outcome.recommendations.len(), 3);
        assert!(outcome.hypothesis.is_fallback());
        assert_eq!(
            outcome.hypothesis.source,
            crate::hypothesis::HypothesisSource::Fallback(FallbackReason::MissingApiKey)
        );
    }

    #[tokio::test]
    async fn test_invalid_reading_is_not_recorded() {
        let analyzer = analyzer();
        let mut session = AnalysisSession::new();

        let err = analyzer
            .analyze(&mut session, SensorReading::new(-1.0, 30.0, 5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PumpGuardError::InvalidInput(_)));

        let err = analyzer
            .analyze(&mut session, SensorReading::new(1.0, f64::NAN, 5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PumpGuardError::InvalidInput(_)));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let analyzer = analyzer();
        let mut a = AnalysisSession::new();
        let mut b = AnalysisSession::new();

        analyzer.analyze(&mut a, SensorReading::new(1.0, 30.0, 5.0)).await.unwrap();
        analyzer.analyze(&mut a, SensorReading::new(9.0, 85.0, 14.0)).await.unwrap();
        analyzer.analyze(&mut b, SensorReading::new(9.0, 85.0, 14.0)).await.unwrap();

        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
        assert_eq!(b.records_with_status(HealthStatus::Critical).len(), 1);
    }
}

//! Exhaustive ARIMA/SARIMA order search by AIC.
//!
//! Every candidate inside the bounds is enumerated in lexicographic order
//! and fitted once. Candidates whose fit fails, or whose AIC is not finite,
//! are skipped. The first candidate reaching the minimum AIC wins, so ties
//! resolve to the simplest order in enumeration order. When nothing can be
//! fitted the configured fallback order is returned and the outcome is
//! flagged as exhausted.

use crate::core::Series;
use crate::error::{ForecastError, Result};
use crate::models::arima::order::{
    model_label, ModelOrder, OrderBounds, SearchBounds, SeasonalBounds, SeasonalOrder,
};
use crate::models::traits::EstimationEngine;

/// Pruning limits and fallbacks of an order search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConstraints {
    /// Seasonal search skips candidates with `p + d + q` above this.
    pub max_order_sum: usize,
    /// Seasonal search skips candidates with `P + D + Q` above this.
    pub max_seasonal_sum: usize,
    /// Returned when no candidate could be fitted.
    pub fallback_order: ModelOrder,
    /// Seasonal `(P, D, Q)` returned when no candidate could be fitted.
    pub fallback_seasonal: (usize, usize, usize),
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            max_order_sum: 4,
            max_seasonal_sum: 3,
            fallback_order: ModelOrder::FALLBACK,
            fallback_seasonal: (1, 1, 1),
        }
    }
}

impl SearchConstraints {
    pub fn with_max_sums(mut self, order: usize, seasonal: usize) -> Self {
        self.max_order_sum = order;
        self.max_seasonal_sum = seasonal;
        self
    }

    pub fn with_fallback(mut self, order: ModelOrder, seasonal: (usize, usize, usize)) -> Self {
        self.fallback_order = order;
        self.fallback_seasonal = seasonal;
        self
    }

    fn admits(&self, order: ModelOrder, seasonal: SeasonalOrder) -> bool {
        order.sum() <= self.max_order_sum && seasonal.sum() <= self.max_seasonal_sum
    }
}

/// What happened to one candidate handed to the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CandidateStatus {
    /// Fitted with a finite AIC.
    Scored(f64),
    /// The fit failed or produced a non-finite AIC.
    Failed(String),
}

/// One row of the search score table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateScore {
    pub order: ModelOrder,
    pub seasonal: Option<SeasonalOrder>,
    pub status: CandidateStatus,
}

impl CandidateScore {
    pub fn aic(&self) -> Option<f64> {
        match self.status {
            CandidateStatus::Scored(aic) => Some(aic),
            CandidateStatus::Failed(_) => None,
        }
    }

    pub fn label(&self) -> String {
        model_label(self.order, self.seasonal)
    }
}

/// Result of an order search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    /// Selected non-seasonal order.
    pub order: ModelOrder,
    /// Selected seasonal order, present for seasonal searches.
    pub seasonal: Option<SeasonalOrder>,
    /// AIC of the selected candidate; `None` when the fallback was used.
    pub best_aic: Option<f64>,
    /// Candidates in the cross product of the bounds.
    pub enumerated: usize,
    /// Candidates skipped by the order-sum limits.
    pub pruned: usize,
    /// Candidates fitted with a finite AIC.
    pub fitted: usize,
    /// Candidates whose fit failed or whose AIC was not finite.
    pub failed: usize,
    /// Every candidate handed to the engine, in enumeration order.
    pub scores: Vec<CandidateScore>,
    /// True when no candidate could be fitted and the fallback was returned.
    pub exhausted: bool,
}

impl SearchOutcome {
    /// Number of engine fits performed.
    pub fn engine_calls(&self) -> usize {
        self.fitted + self.failed
    }

    pub fn label(&self) -> String {
        model_label(self.order, self.seasonal)
    }

    /// Scored candidates sorted by ascending AIC.
    pub fn ranked(&self) -> Vec<&CandidateScore> {
        let mut ranked: Vec<&CandidateScore> =
            self.scores.iter().filter(|s| s.aic().is_some()).collect();
        ranked.sort_by(|a, b| {
            a.aic()
                .partial_cmp(&b.aic())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Turn an exhausted search into [`ForecastError::SearchExhausted`].
    pub fn require_success(self) -> Result<Self> {
        if self.exhausted {
            return Err(ForecastError::SearchExhausted {
                candidates: self.engine_calls(),
            });
        }
        Ok(self)
    }
}

/// Best-so-far accumulator shared by both searches.
struct Tally {
    enumerated: usize,
    pruned: usize,
    fitted: usize,
    failed: usize,
    best: Option<(ModelOrder, Option<SeasonalOrder>, f64)>,
    scores: Vec<CandidateScore>,
}

impl Tally {
    fn new(enumerated: usize) -> Self {
        Self {
            enumerated,
            pruned: 0,
            fitted: 0,
            failed: 0,
            best: None,
            scores: Vec::new(),
        }
    }

    fn record(&mut self, order: ModelOrder, seasonal: Option<SeasonalOrder>, aic: Result<f64>) {
        let status = match aic {
            Ok(aic) if aic.is_finite() => {
                self.fitted += 1;
                let improves = self.best.map_or(true, |(_, _, best)| aic < best);
                if improves {
                    self.best = Some((order, seasonal, aic));
                }
                tracing::debug!(model = %model_label(order, seasonal), aic, "candidate fitted");
                CandidateStatus::Scored(aic)
            }
            Ok(aic) => {
                self.failed += 1;
                tracing::debug!(model = %model_label(order, seasonal), aic, "non-finite AIC");
                CandidateStatus::Failed(format!("non-finite AIC {}", aic))
            }
            Err(e) => {
                self.failed += 1;
                tracing::debug!(model = %model_label(order, seasonal), error = %e, "candidate failed");
                CandidateStatus::Failed(e.to_string())
            }
        };
        self.scores.push(CandidateScore {
            order,
            seasonal,
            status,
        });
    }

    fn finish(self, fallback: (ModelOrder, Option<SeasonalOrder>)) -> SearchOutcome {
        let (order, seasonal, best_aic, exhausted) = match self.best {
            Some((order, seasonal, aic)) => (order, seasonal, Some(aic), false),
            None => (fallback.0, fallback.1, None, true),
        };
        if exhausted {
            tracing::warn!(
                candidates = self.fitted + self.failed,
                fallback = %model_label(order, seasonal),
                "no candidate could be fitted; using fallback order"
            );
        } else {
            tracing::info!(
                model = %model_label(order, seasonal),
                aic = best_aic,
                fitted = self.fitted,
                failed = self.failed,
                "selected order"
            );
        }
        SearchOutcome {
            order,
            seasonal,
            best_aic,
            enumerated: self.enumerated,
            pruned: self.pruned,
            fitted: self.fitted,
            failed: self.failed,
            scores: self.scores,
            exhausted,
        }
    }
}

/// Grid search over model orders, fitting each candidate with a borrowed
/// engine.
///
/// # Example
///
/// ```
/// use tsforecast::models::arima::{CssEngine, OrderBounds, OrderSearch};
/// use tsforecast::core::Series;
///
/// let values: Vec<f64> = (0..60).map(|t| (t as f64 * 0.7).sin() + 0.05 * t as f64).collect();
/// let series = Series::from_values(values).unwrap();
///
/// let engine = CssEngine::new();
/// let outcome = OrderSearch::new(&engine).search_order(&series, OrderBounds::new(1, 1, 1));
/// assert!(OrderBounds::new(1, 1, 1).contains(outcome.order) || outcome.exhausted);
/// ```
#[derive(Debug)]
pub struct OrderSearch<'e, E: ?Sized> {
    engine: &'e E,
    constraints: SearchConstraints,
}

impl<'e, E: EstimationEngine + ?Sized> OrderSearch<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            constraints: SearchConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: SearchConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn constraints(&self) -> &SearchConstraints {
        &self.constraints
    }

    /// Search `p in 0..=max_p`, `d in 0..=max_d`, `q in 0..=max_q`.
    ///
    /// Never fails: when every candidate fails the fallback order is
    /// returned with `exhausted` set.
    #[tracing::instrument(skip_all, fields(n = series.len(), candidates = bounds.size()))]
    pub fn search_order(&self, series: &Series, bounds: OrderBounds) -> SearchOutcome {
        let mut tally = Tally::new(bounds.size());
        for order in bounds.orders() {
            let aic = self.engine.fit(series, order, None).map(|m| m.aic());
            tally.record(order, None, aic);
        }
        tally.finish((self.constraints.fallback_order, None))
    }

    /// Search the cross product of non-seasonal and seasonal orders for a
    /// fixed `period`, skipping candidates over the order-sum limits before
    /// the engine sees them.
    ///
    /// Fails only when `period < 2`.
    #[tracing::instrument(
        skip_all,
        fields(
            n = series.len(),
            period,
            candidates = bounds.size() * seasonal_bounds.size()
        )
    )]
    pub fn search_seasonal_order(
        &self,
        series: &Series,
        period: usize,
        bounds: OrderBounds,
        seasonal_bounds: SeasonalBounds,
    ) -> Result<SearchOutcome> {
        let (fp, fd, fq) = self.constraints.fallback_seasonal;
        let fallback = SeasonalOrder::new(fp, fd, fq, period)?;

        let mut tally = Tally::new(bounds.size() * seasonal_bounds.size());
        for order in bounds.orders() {
            for (sp, sd, sq) in seasonal_bounds.triples() {
                let seasonal = SeasonalOrder::new(sp, sd, sq, period)?;
                if !self.constraints.admits(order, seasonal) {
                    tally.pruned += 1;
                    continue;
                }
                let aic = self
                    .engine
                    .fit(series, order, Some(seasonal))
                    .map(|m| m.aic());
                tally.record(order, Some(seasonal), aic);
            }
        }
        Ok(tally.finish((self.constraints.fallback_order, Some(fallback))))
    }

    /// Dispatch on `bounds`: seasonal search with `period` when seasonal
    /// bounds are present, non-seasonal search otherwise.
    pub fn search(
        &self,
        series: &Series,
        bounds: &SearchBounds,
        period: usize,
    ) -> Result<SearchOutcome> {
        match bounds.seasonal {
            Some(seasonal_bounds) => {
                self.search_seasonal_order(series, period, bounds.order, seasonal_bounds)
            }
            None => Ok(self.search_order(series, bounds.order)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfidenceLevel;
    use crate::models::traits::{FitStatistics, FittedModel, PredictionPath};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Script = fn(ModelOrder, Option<SeasonalOrder>) -> Option<f64>;

    /// Engine whose AIC is a fixed function of the order; `None` fails.
    struct ScriptedEngine {
        script: Script,
        calls: AtomicUsize,
        seen: Mutex<Vec<(ModelOrder, Option<SeasonalOrder>)>>,
    }

    impl ScriptedEngine {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EstimationEngine for ScriptedEngine {
        type State = ();

        fn fit(
            &self,
            series: &Series,
            order: ModelOrder,
            seasonal: Option<SeasonalOrder>,
        ) -> Result<FittedModel<()>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((order, seasonal));
            let aic = (self.script)(order, seasonal)
                .ok_or_else(|| ForecastError::estimation(model_label(order, seasonal), "scripted"))?;
            let n = series.len();
            FittedModel::new(
                n,
                order,
                seasonal,
                FitStatistics {
                    log_likelihood: -aic / 2.0,
                    aic,
                    bic: aic,
                    sigma2: 1.0,
                },
                series.values().to_vec(),
                vec![0.0; n],
                (),
            )
        }

        fn forecast(
            &self,
            _model: &FittedModel<()>,
            horizon: usize,
            _level: ConfidenceLevel,
        ) -> Result<PredictionPath> {
            PredictionPath::new(vec![0.0; horizon], vec![-1.0; horizon], vec![1.0; horizon])
        }
    }

    fn series() -> Series {
        Series::from_values((0..40).map(|t| (t % 7) as f64).collect()).unwrap()
    }

    #[test]
    fn selects_minimum_aic() {
        let engine = ScriptedEngine::new(|o, _| {
            let p = o.p as f64 - 2.0;
            let d = o.d as f64 - 1.0;
            Some(100.0 + p * p + d * d + o.q as f64)
        });
        let bounds = OrderBounds::new(3, 2, 3);
        let outcome = OrderSearch::new(&engine).search_order(&series(), bounds);

        assert_eq!(outcome.order, ModelOrder::new(2, 1, 0));
        assert_eq!(outcome.best_aic, Some(100.0));
        assert_eq!(outcome.seasonal, None);
        assert!(!outcome.exhausted);
        assert_eq!(outcome.enumerated, bounds.size());
        assert_eq!(engine.calls(), bounds.size());
        assert_eq!(outcome.fitted, bounds.size());
        assert_eq!(outcome.pruned, 0);
        assert_eq!(outcome.ranked()[0].order, ModelOrder::new(2, 1, 0));
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let engine = ScriptedEngine::new(|o, _| Some(if o.p == 0 && o.d == 0 { 7.0 } else { 5.0 }));
        let outcome = OrderSearch::new(&engine).search_order(&series(), OrderBounds::new(2, 1, 2));
        // (0,1,0) is the first order enumerated with AIC 5.
        assert_eq!(outcome.order, ModelOrder::new(0, 1, 0));
    }

    #[test]
    fn failed_and_non_finite_candidates_are_skipped() {
        let engine = ScriptedEngine::new(|o, _| match (o.p, o.d, o.q) {
            (0, 0, 0) => Some(f64::NAN),
            (0, 0, 1) => Some(f64::NEG_INFINITY),
            (1, _, _) => None,
            (_, d, q) => Some(50.0 + d as f64 + q as f64),
        });
        let bounds = OrderBounds::new(1, 1, 1);
        let outcome = OrderSearch::new(&engine).search_order(&series(), bounds);

        assert_eq!(outcome.order, ModelOrder::new(0, 1, 0));
        assert_eq!(outcome.failed, 2 + 4);
        assert_eq!(outcome.fitted, 2);
        assert_eq!(outcome.scores.len(), bounds.size());
        assert!(matches!(outcome.scores[0].status, CandidateStatus::Failed(_)));
        assert_eq!(outcome.ranked().len(), 2);
    }

    #[test]
    fn exhaustion_falls_back() {
        let engine = ScriptedEngine::new(|_, _| None);
        let bounds = OrderBounds::new(2, 1, 2);
        let outcome = OrderSearch::new(&engine).search_order(&series(), bounds);

        assert!(outcome.exhausted);
        assert_eq!(outcome.order, ModelOrder::FALLBACK);
        assert_eq!(outcome.best_aic, None);
        assert_eq!(outcome.failed, 18);

        match outcome.require_success() {
            Err(ForecastError::SearchExhausted { candidates }) => assert_eq!(candidates, 18),
            other => panic!("expected SearchExhausted, got {:?}", other),
        }
    }

    #[test]
    fn seasonal_search_prunes_before_fitting() {
        let engine = ScriptedEngine::new(|o, s| {
            let s = s.map_or(0, |s| s.sum());
            Some(10.0 + (o.sum() + s) as f64)
        });
        let bounds = OrderBounds::new(3, 2, 3);
        let seasonal = SeasonalBounds::new(2, 1, 2);
        let outcome = OrderSearch::new(&engine)
            .search_seasonal_order(&series(), 12, bounds, seasonal)
            .unwrap();

        let admitted = bounds.orders().filter(|o| o.sum() <= 4).count()
            * seasonal.triples().filter(|(p, d, q)| p + d + q <= 3).count();
        assert_eq!(engine.calls(), admitted);
        assert_eq!(outcome.enumerated, bounds.size() * seasonal.size());
        assert_eq!(outcome.pruned + admitted, outcome.enumerated);

        let seen = engine.seen.lock().unwrap();
        assert!(seen.iter().all(|(o, s)| {
            let s = s.unwrap();
            o.sum() <= 4 && s.sum() <= 3 && s.period() == 12
        }));

        assert_eq!(outcome.order, ModelOrder::new(0, 0, 0));
        assert_eq!(outcome.seasonal, Some(SeasonalOrder::new(0, 0, 0, 12).unwrap()));
    }

    #[test]
    fn seasonal_enumeration_is_lexicographic() {
        let engine = ScriptedEngine::new(|_, _| Some(1.0));
        OrderSearch::new(&engine)
            .search_seasonal_order(&series(), 4, OrderBounds::new(1, 0, 1), SeasonalBounds::new(1, 0, 1))
            .unwrap();
        let seen = engine.seen.lock().unwrap();
        let keys: Vec<_> = seen
            .iter()
            .map(|(o, s)| {
                let s = s.unwrap();
                (o.p, o.d, o.q, s.p(), s.d(), s.q())
            })
            .collect();
        assert_eq!(keys.len(), 16);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn seasonal_exhaustion_uses_seasonal_fallback() {
        let engine = ScriptedEngine::new(|_, _| None);
        let outcome = OrderSearch::new(&engine)
            .search_seasonal_order(&series(), 7, OrderBounds::new(1, 1, 1), SeasonalBounds::new(1, 1, 1))
            .unwrap();
        assert!(outcome.exhausted);
        assert_eq!(outcome.order, ModelOrder::new(1, 1, 1));
        assert_eq!(outcome.seasonal, Some(SeasonalOrder::new(1, 1, 1, 7).unwrap()));
        assert_eq!(outcome.label(), "SARIMA(1,1,1)(1,1,1)[7]");
    }

    #[test]
    fn seasonal_search_rejects_short_period() {
        let engine = ScriptedEngine::new(|_, _| Some(1.0));
        let result = OrderSearch::new(&engine).search_seasonal_order(
            &series(),
            1,
            OrderBounds::new(1, 1, 1),
            SeasonalBounds::new(1, 1, 1),
        );
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn custom_constraints_change_pruning_and_fallback() {
        let engine = ScriptedEngine::new(|_, _| None);
        let constraints = SearchConstraints::default()
            .with_max_sums(1, 0)
            .with_fallback(ModelOrder::new(0, 1, 1), (0, 1, 1));
        let outcome = OrderSearch::new(&engine)
            .with_constraints(constraints)
            .search_seasonal_order(&series(), 4, OrderBounds::new(1, 1, 1), SeasonalBounds::new(1, 1, 1))
            .unwrap();

        // Orders with sum <= 1 are (0,0,0), (0,0,1), (0,1,0), (1,0,0).
        assert_eq!(engine.calls(), 4);
        assert_eq!(outcome.order, ModelOrder::new(0, 1, 1));
        assert_eq!(outcome.seasonal, Some(SeasonalOrder::new(0, 1, 1, 4).unwrap()));
    }

    #[test]
    fn dispatch_follows_bounds() {
        let engine = ScriptedEngine::new(|_, _| Some(3.0));
        let search = OrderSearch::new(&engine);
        let plain = search
            .search(&series(), &SearchBounds::arima().with_order(OrderBounds::new(1, 0, 0)), 12)
            .unwrap();
        assert_eq!(plain.seasonal, None);
        assert_eq!(plain.engine_calls(), 2);

        let seasonal = search.search(&series(), &SearchBounds::sarima_fast(), 4).unwrap();
        assert_eq!(seasonal.seasonal.map(|s| s.period()), Some(4));
    }
}

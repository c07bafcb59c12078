//! Model orders and search bounds.

use crate::error::{ForecastError, Result};
use std::fmt;

/// Non-seasonal order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelOrder {
    /// AR order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// MA order.
    pub q: usize,
}

impl ModelOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Fallback used when no candidate could be fitted.
    pub const FALLBACK: ModelOrder = ModelOrder::new(1, 1, 1);

    pub fn sum(&self) -> usize {
        self.p + self.d + self.q
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal order `(P, D, Q, s)` with period `s >= 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonalOrder {
    p: usize,
    d: usize,
    q: usize,
    period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        Ok(Self { p, d, q, period })
    }

    /// `(1, 1, 1, period)`, the seasonal fallback.
    pub fn fallback(period: usize) -> Result<Self> {
        Self::new(1, 1, 1, period)
    }

    /// Seasonal AR order.
    pub fn p(&self) -> usize {
        self.p
    }

    /// Seasonal differencing order.
    pub fn d(&self) -> usize {
        self.d
    }

    /// Seasonal MA order.
    pub fn q(&self) -> usize {
        self.q
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn sum(&self) -> usize {
        self.p + self.d + self.q
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})[{}]", self.p, self.d, self.q, self.period)
    }
}

/// Human-readable label such as `ARIMA(1,1,1)` or `SARIMA(1,1,1)(1,1,1)[12]`.
pub fn model_label(order: ModelOrder, seasonal: Option<SeasonalOrder>) -> String {
    match seasonal {
        Some(s) => format!("SARIMA({},{},{}){}", order.p, order.d, order.q, s),
        None => order.to_string(),
    }
}

/// Search effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMode {
    #[default]
    Full,
    /// Smaller order bounds and a capped history.
    Fast,
}

/// Inclusive upper bounds of the non-seasonal orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderBounds {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
}

impl OrderBounds {
    pub const fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            max_p,
            max_d,
            max_q,
        }
    }

    pub fn contains(&self, order: ModelOrder) -> bool {
        order.p <= self.max_p && order.d <= self.max_d && order.q <= self.max_q
    }

    /// Number of candidate orders in the cross product.
    pub fn size(&self) -> usize {
        (self.max_p + 1) * (self.max_d + 1) * (self.max_q + 1)
    }

    /// All orders in lexicographic `(p, d, q)` order.
    pub fn orders(&self) -> impl Iterator<Item = ModelOrder> + '_ {
        (0..=self.max_p).flat_map(move |p| {
            (0..=self.max_d)
                .flat_map(move |d| (0..=self.max_q).map(move |q| ModelOrder::new(p, d, q)))
        })
    }
}

impl Default for OrderBounds {
    fn default() -> Self {
        Self::new(5, 3, 5)
    }
}

/// Inclusive upper bounds of the seasonal orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonalBounds {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
}

impl SeasonalBounds {
    pub const fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            max_p,
            max_d,
            max_q,
        }
    }

    pub fn contains(&self, order: SeasonalOrder) -> bool {
        order.p <= self.max_p && order.d <= self.max_d && order.q <= self.max_q
    }

    pub fn size(&self) -> usize {
        (self.max_p + 1) * (self.max_d + 1) * (self.max_q + 1)
    }

    /// All `(P, D, Q)` triples in lexicographic order.
    pub fn triples(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..=self.max_p).flat_map(move |p| {
            (0..=self.max_d).flat_map(move |d| (0..=self.max_q).map(move |q| (p, d, q)))
        })
    }
}

impl Default for SeasonalBounds {
    fn default() -> Self {
        Self::new(2, 1, 2)
    }
}

/// Bounds of an order search. Seasonal bounds select the seasonal search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchBounds {
    pub order: OrderBounds,
    pub seasonal: Option<SeasonalBounds>,
}

impl SearchBounds {
    /// Non-seasonal search, `5/3/5`.
    pub fn arima() -> Self {
        Self {
            order: OrderBounds::default(),
            seasonal: None,
        }
    }

    /// Non-seasonal search, `3/3/3`.
    pub fn arima_fast() -> Self {
        Self {
            order: OrderBounds::new(3, 3, 3),
            seasonal: None,
        }
    }

    /// Seasonal search, `3/2/3 x 2/1/2`.
    pub fn sarima() -> Self {
        Self {
            order: OrderBounds::new(3, 2, 3),
            seasonal: Some(SeasonalBounds::default()),
        }
    }

    /// Seasonal search, `2/2/2 x 1/1/1`.
    pub fn sarima_fast() -> Self {
        Self {
            order: OrderBounds::new(2, 2, 2),
            seasonal: Some(SeasonalBounds::new(1, 1, 1)),
        }
    }

    /// Default bounds for a mode and model family.
    pub fn for_mode(mode: SearchMode, seasonal: bool) -> Self {
        match (mode, seasonal) {
            (SearchMode::Full, false) => Self::arima(),
            (SearchMode::Fast, false) => Self::arima_fast(),
            (SearchMode::Full, true) => Self::sarima(),
            (SearchMode::Fast, true) => Self::sarima_fast(),
        }
    }

    pub fn with_order(mut self, order: OrderBounds) -> Self {
        self.order = order;
        self
    }

    pub fn with_seasonal(mut self, seasonal: Option<SeasonalBounds>) -> Self {
        self.seasonal = seasonal;
        self
    }

    pub fn is_seasonal(&self) -> bool {
        self.seasonal.is_some()
    }
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self::arima()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasonal_period_must_be_at_least_two() {
        assert!(SeasonalOrder::new(1, 1, 1, 1).is_err());
        assert!(SeasonalOrder::new(1, 1, 1, 0).is_err());
        let s = SeasonalOrder::new(1, 0, 2, 12).unwrap();
        assert_eq!((s.p(), s.d(), s.q(), s.period()), (1, 0, 2, 12));
    }

    #[test]
    fn labels() {
        let order = ModelOrder::new(2, 1, 0);
        assert_eq!(order.to_string(), "ARIMA(2,1,0)");
        let seasonal = SeasonalOrder::new(1, 1, 1, 12).unwrap();
        assert_eq!(
            model_label(order, Some(seasonal)),
            "SARIMA(2,1,0)(1,1,1)[12]"
        );
        assert_eq!(model_label(order, None), "ARIMA(2,1,0)");
    }

    #[test]
    fn orders_are_lexicographic_and_complete() {
        let bounds = OrderBounds::new(1, 1, 2);
        let orders: Vec<_> = bounds.orders().collect();
        assert_eq!(orders.len(), bounds.size());
        assert_eq!(orders[0], ModelOrder::new(0, 0, 0));
        assert_eq!(orders[1], ModelOrder::new(0, 0, 1));
        assert_eq!(orders[3], ModelOrder::new(0, 1, 0));
        assert_eq!(*orders.last().unwrap(), ModelOrder::new(1, 1, 2));
        assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn default_bounds_per_mode() {
        assert_eq!(SearchBounds::for_mode(SearchMode::Full, false).order.size(), 6 * 4 * 6);
        assert_eq!(SearchBounds::for_mode(SearchMode::Fast, false).order, OrderBounds::new(3, 3, 3));

        let sarima = SearchBounds::for_mode(SearchMode::Full, true);
        assert_eq!(sarima.order, OrderBounds::new(3, 2, 3));
        assert_eq!(sarima.seasonal, Some(SeasonalBounds::new(2, 1, 2)));

        let fast = SearchBounds::for_mode(SearchMode::Fast, true);
        assert_eq!(fast.order, OrderBounds::new(2, 2, 2));
        assert_eq!(fast.seasonal, Some(SeasonalBounds::new(1, 1, 1)));
    }

    #[test]
    fn bounds_contain_orders() {
        let bounds = OrderBounds::new(2, 1, 2);
        assert!(bounds.contains(ModelOrder::new(2, 1, 0)));
        assert!(!bounds.contains(ModelOrder::new(0, 2, 0)));

        let sb = SeasonalBounds::new(1, 1, 1);
        assert!(sb.contains(SeasonalOrder::new(1, 0, 1, 4).unwrap()));
        assert!(!sb.contains(SeasonalOrder::new(2, 0, 0, 4).unwrap()));
    }
}

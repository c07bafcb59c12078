//! Sampling frequency inference and timestamp extrapolation.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Sampling frequency of a timestamped series.
///
/// Fixed steps cover sub-daily, daily and weekly data. Calendar steps are
/// used where the spacing in days varies with the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Fixed(Duration),
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn hourly() -> Self {
        Frequency::Fixed(Duration::hours(1))
    }

    pub fn daily() -> Self {
        Frequency::Fixed(Duration::days(1))
    }

    pub fn weekly() -> Self {
        Frequency::Fixed(Duration::weeks(1))
    }

    /// Parse a short alias: `H`, `D`, `W`, `M`, `Q`, `Y`.
    pub fn from_alias(alias: &str) -> Result<Self> {
        match alias.trim().to_ascii_uppercase().as_str() {
            "H" => Ok(Self::hourly()),
            "D" => Ok(Self::daily()),
            "W" => Ok(Self::weekly()),
            "M" | "MS" => Ok(Frequency::Monthly),
            "Q" | "QS" => Ok(Frequency::Quarterly),
            "Y" | "A" | "YS" => Ok(Frequency::Yearly),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown frequency alias '{}'",
                other
            ))),
        }
    }

    /// Infer a frequency from strictly increasing timestamps.
    ///
    /// Calendar frequencies are recognised first: every spacing within
    /// 28-31 days is monthly, 89-92 days quarterly, 365-366 days yearly.
    /// Otherwise the modal spacing is used when at least `tolerance` of
    /// the spacings agree with it.
    pub fn infer(timestamps: &[DateTime<Utc>], tolerance: f64) -> Result<Self> {
        if timestamps.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: timestamps.len(),
            });
        }

        let diffs: Vec<i64> = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds())
            .collect();

        let all_days_within = |lo: i64, hi: i64| {
            diffs.iter().all(|&s| {
                let days = s / 86_400;
                s % 86_400 == 0 && (lo..=hi).contains(&days)
            })
        };
        if all_days_within(28, 31) {
            return Ok(Frequency::Monthly);
        }
        if all_days_within(89, 92) {
            return Ok(Frequency::Quarterly);
        }
        if all_days_within(365, 366) {
            return Ok(Frequency::Yearly);
        }

        // BTreeMap keeps tie-breaking deterministic (smallest spacing wins).
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for &diff in &diffs {
            *counts.entry(diff).or_insert(0) += 1;
        }

        let (modal_diff, modal_count) = counts
            .iter()
            .fold(None::<(i64, usize)>, |best, (&diff, &count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((diff, count)),
            })
            .ok_or(ForecastError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let modal_ratio = modal_count as f64 / diffs.len() as f64;
        if modal_ratio < tolerance {
            return Err(ForecastError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }
        if modal_diff <= 0 {
            return Err(ForecastError::FrequencyInference(
                "non-positive spacing".to_string(),
            ));
        }

        Ok(Frequency::Fixed(Duration::seconds(modal_diff)))
    }

    /// The timestamp `steps` periods after `origin`.
    ///
    /// Calendar steps are computed from the origin directly, so a month-end
    /// origin stays anchored to month ends (Jan 31 -> Feb 29 -> Mar 31).
    pub fn advance(&self, origin: DateTime<Utc>, steps: u32) -> Result<DateTime<Utc>> {
        let overflow = || {
            ForecastError::TimestampError(format!(
                "cannot advance {} by {} steps of {}",
                origin, steps, self
            ))
        };

        let months = match self {
            Frequency::Fixed(step) => {
                let factor = i32::try_from(steps).map_err(|_| {
                    ForecastError::InvalidParameter(format!(
                        "{} steps exceeds the fixed-frequency limit of {}",
                        steps,
                        i32::MAX
                    ))
                })?;
                let offset = step.checked_mul(factor).ok_or_else(overflow)?;
                return origin.checked_add_signed(offset).ok_or_else(overflow);
            }
            Frequency::Monthly => steps,
            Frequency::Quarterly => steps.checked_mul(3).ok_or_else(overflow)?,
            Frequency::Yearly => steps.checked_mul(12).ok_or_else(overflow)?,
        };

        let naive = origin.naive_utc();
        let date = naive.date();
        let target = if is_month_end(date) {
            month_end_after(date, months)
        } else {
            date.checked_add_months(Months::new(months))
        }
        .ok_or_else(overflow)?;

        Ok(Utc.from_utc_datetime(&target.and_time(naive.time())))
    }

    /// `horizon` timestamps following `last`, one period apart.
    pub fn extrapolate(&self, last: DateTime<Utc>, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        (1..=horizon)
            .map(|k| {
                let steps = u32::try_from(k).map_err(|_| {
                    ForecastError::InvalidParameter(format!("horizon {} too large", horizon))
                })?;
                self.advance(last, steps)
            })
            .collect()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Fixed(step) => write!(f, "every {}s", step.num_seconds()),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map(|next| next.day() == 1).unwrap_or(true)
}

fn month_end_after(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    first
        .checked_add_months(Months::new(months + 1))?
        .pred_opt()
}

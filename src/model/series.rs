//! Arithmetic over period series with "not meaningful" propagation
//!
//! Any undefined operand makes the result undefined. Division by zero is
//! undefined rather than infinite.

use super::line_item::Value;
use crate::assumptions::PeriodRange;

/// Elementwise combination of two aligned series
pub fn zip_with(a: &[Value], b: &[Value], f: impl Fn(f64, f64) -> f64) -> Vec<Value> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| Some(f((*x)?, (*y)?)))
        .collect()
}

/// Elementwise map of a series
pub fn map(a: &[Value], f: impl Fn(f64) -> f64) -> Vec<Value> {
    a.iter().map(|x| x.map(&f)).collect()
}

pub fn add(a: &[Value], b: &[Value]) -> Vec<Value> {
    zip_with(a, b, |x, y| x + y)
}

pub fn sub(a: &[Value], b: &[Value]) -> Vec<Value> {
    zip_with(a, b, |x, y| x - y)
}

pub fn mul(a: &[Value], b: &[Value]) -> Vec<Value> {
    zip_with(a, b, |x, y| x * y)
}

/// Sum of several aligned series of length `len`
pub fn sum(series: &[&[Value]], len: usize) -> Vec<Value> {
    (0..len)
        .map(|i| {
            series
                .iter()
                .map(|s| s.get(i).copied().flatten())
                .try_fold(0.0, |acc, v| v.map(|v| acc + v))
        })
        .collect()
}

/// `num / den`, undefined when the denominator is zero
pub fn safe_div(num: Value, den: Value) -> Value {
    let (n, d) = (num?, den?);
    if d == 0.0 {
        None
    } else {
        Some(n / d)
    }
}

/// `value / base - 1`, undefined for a zero base
pub fn growth(value: Value, base: Value) -> Value {
    safe_div(value, base).map(|r| r - 1.0)
}

/// Elementwise ratio of two series
pub fn ratio(num: &[Value], den: &[Value]) -> Vec<Value> {
    num.iter().zip(den.iter()).map(|(n, d)| safe_div(*n, *d)).collect()
}

/// Year-over-year growth; the first period has no base
pub fn yoy_growth(series: &[Value]) -> Vec<Value> {
    (0..series.len())
        .map(|i| if i == 0 { None } else { growth(series[i], series[i - 1]) })
        .collect()
}

/// Prior-period value, undefined for the first period
pub fn prior(series: &[Value], idx: usize) -> Value {
    idx.checked_sub(1).and_then(|p| series.get(p).copied().flatten())
}

/// Period-over-period change, undefined for the first period
pub fn change(series: &[Value]) -> Vec<Value> {
    (0..series.len())
        .map(|i| Some(series[i]? - prior(series, i)?))
        .collect()
}

/// Keep values only where `keep(idx)` holds
pub fn mask(series: &[Value], keep: impl Fn(usize) -> bool) -> Vec<Value> {
    series
        .iter()
        .enumerate()
        .map(|(i, v)| if keep(i) { *v } else { None })
        .collect()
}

/// Reported values for historical periods, `forecast(idx)` for forecast periods
pub fn reported_then(
    periods: &PeriodRange,
    reported: &[Value],
    forecast: impl Fn(usize) -> Value,
) -> Vec<Value> {
    (0..periods.len())
        .map(|i| {
            if periods.is_forecast(i) {
                forecast(i)
            } else {
                reported.get(i).copied().flatten()
            }
        })
        .collect()
}

/// Balance roll-forward: historical periods take the reported balance,
/// each forecast period applies `step(idx, prior_balance)`
pub fn roll_forward(
    periods: &PeriodRange,
    reported: &[Value],
    step: impl Fn(usize, f64) -> Value,
) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(periods.len());
    for i in 0..periods.len() {
        let value = if periods.is_forecast(i) {
            prior(&out, i).and_then(|p| step(i, p))
        } else {
            reported.get(i).copied().flatten()
        };
        out.push(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_forward() {
        let periods = PeriodRange::new(2023, 2, 3);
        let reported = vec![Some(90.0), Some(100.0), None, None, None];
        let rolled = roll_forward(&periods, &reported, |_, p| Some(p + 10.0));
        assert_eq!(rolled, vec![Some(90.0), Some(100.0), Some(110.0), Some(120.0), Some(130.0)]);
    }

    #[test]
    fn test_roll_forward_without_opening_balance() {
        let periods = PeriodRange::new(2024, 1, 2);
        let rolled = roll_forward(&periods, &[None, None, None], |_, p| Some(p + 1.0));
        assert_eq!(rolled, vec![None, None, None]);
    }

    #[test]
    fn test_reported_then() {
        let periods = PeriodRange::new(2024, 1, 2);
        let values = reported_then(&periods, &[Some(5.0), Some(99.0), None], |i| Some(i as f64));
        assert_eq!(values, vec![Some(5.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_undefined_propagates() {
        let a = vec![Some(1.0), None, Some(3.0)];
        let b = vec![Some(2.0), Some(2.0), None];
        assert_eq!(add(&a, &b), vec![Some(3.0), None, None]);
    }

    #[test]
    fn test_safe_div_zero() {
        assert_eq!(safe_div(Some(5.0), Some(0.0)), None);
        assert_eq!(safe_div(Some(5.0), Some(2.0)), Some(2.5));
        assert_eq!(safe_div(None, Some(2.0)), None);
    }

    #[test]
    fn test_growth() {
        assert_eq!(growth(Some(110.0), Some(100.0)).map(|g| (g * 1e6).round()), Some(100_000.0));
        assert_eq!(growth(Some(110.0), Some(0.0)), None);
    }

    #[test]
    fn test_yoy_growth_first_period_undefined() {
        let s = vec![Some(100.0), Some(120.0), Some(0.0), Some(10.0)];
        let g = yoy_growth(&s);
        assert_eq!(g[0], None);
        assert!((g[1].unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(g[2], Some(-1.0));
        assert_eq!(g[3], None);
    }

    #[test]
    fn test_sum_and_change() {
        let a = vec![Some(1.0), Some(2.0)];
        let b = vec![Some(10.0), Some(20.0)];
        assert_eq!(sum(&[a.as_slice(), b.as_slice()], 2), vec![Some(11.0), Some(22.0)]);
        assert_eq!(change(&b), vec![None, Some(10.0)]);
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        assert_eq!(sum(&[], 2), vec![Some(0.0), Some(0.0)]);
    }
}

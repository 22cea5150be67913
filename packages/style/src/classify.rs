//! Class-break computation for choropleth bins.
//!
//! The host bins choropleth values itself; these functions reproduce the
//! same quantification methods over an in-memory sample so legends and
//! local previews can label and color bins. Breaks are interior upper
//! bounds: a value equal to a break belongs to the lower bin.

use parcel_map_style_models::QuantificationMethod;

/// Share of a partition above which head/tails stops splitting.
const HEAD_TAILS_LIMIT: f64 = 0.4;

/// Computes at most `bin_count - 1` ascending, distinct interior breaks for
/// `values`. Non-finite values are ignored; an empty sample yields no
/// breaks.
#[must_use]
pub fn class_breaks(method: QuantificationMethod, values: &[f64], bin_count: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || bin_count < 2 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let mut breaks = match method {
        QuantificationMethod::Equal => equal_breaks(&sorted, bin_count),
        QuantificationMethod::Quantiles => quantile_breaks(&sorted, bin_count),
        QuantificationMethod::Jenks => jenks_breaks(&sorted, bin_count),
        QuantificationMethod::HeadTails => head_tails_breaks(&sorted, bin_count),
    };

    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    breaks.retain(|b| *b >= min && *b < max);
    breaks.sort_by(f64::total_cmp);
    breaks.dedup();
    breaks
}

/// Index of the bin `value` falls into.
#[must_use]
pub fn bin_index(value: f64, breaks: &[f64]) -> usize {
    breaks.iter().take_while(|b| value > **b).count()
}

/// Color of the bin `value` falls into, clamped to the last color.
#[must_use]
pub fn ramp_color<'a>(colors: &'a [String], breaks: &[f64], value: f64) -> Option<&'a str> {
    let last = colors.len().checked_sub(1)?;
    colors
        .get(bin_index(value, breaks).min(last))
        .map(String::as_str)
}

#[allow(clippy::cast_precision_loss)]
fn equal_breaks(sorted: &[f64], bin_count: usize) -> Vec<f64> {
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let step = (max - min) / bin_count as f64;
    (1..bin_count).map(|i| (i as f64).mul_add(step, min)).collect()
}

#[allow(clippy::cast_precision_loss)]
fn quantile_breaks(sorted: &[f64], bin_count: usize) -> Vec<f64> {
    (1..bin_count)
        .filter_map(|i| quantile(sorted, i as f64 / bin_count as f64))
        .collect()
}

/// Linear-interpolated quantile of sorted values.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted {
        [] => None,
        [only] => Some(*only),
        _ => {
            let p = q.clamp(0.0, 1.0) * ((sorted.len() - 1) as f64);
            let lo = p.floor() as usize;
            let hi = p.ceil() as usize;
            if lo == hi {
                Some(sorted[lo])
            } else {
                let w = p - lo as f64;
                Some((sorted[hi] - sorted[lo]).mul_add(w, sorted[lo]))
            }
        }
    }
}

/// Fisher-Jenks natural breaks: the partition into `bin_count` classes
/// minimizing the summed within-class squared deviation.
#[allow(clippy::cast_precision_loss, clippy::needless_range_loop)]
fn jenks_breaks(sorted: &[f64], bin_count: usize) -> Vec<f64> {
    let n = sorted.len();
    let k = bin_count.min(n);
    if k < 2 {
        return Vec::new();
    }

    // Row `l` describes the first `l` values; column `j` the class count.
    let mut lower = vec![vec![0_usize; k + 1]; n + 1];
    let mut variance = vec![vec![0.0_f64; k + 1]; n + 1];
    for j in 1..=k {
        lower[1][j] = 1;
        for row in variance.iter_mut().skip(2) {
            row[j] = f64::INFINITY;
        }
    }

    for l in 2..=n {
        let (mut sum, mut sum_sq, mut count) = (0.0, 0.0, 0.0);
        let mut v = 0.0;
        for m in 1..=l {
            let start = l - m + 1;
            let value = sorted[start - 1];
            sum += value;
            sum_sq += value * value;
            count += 1.0;
            v = sum_sq - (sum * sum) / count;
            let before = start - 1;
            if before != 0 {
                for j in 2..=k {
                    let candidate = v + variance[before][j - 1];
                    if variance[l][j] >= candidate {
                        lower[l][j] = start;
                        variance[l][j] = candidate;
                    }
                }
            }
        }
        lower[l][1] = 1;
        variance[l][1] = v;
    }

    let mut breaks = vec![0.0; k - 1];
    let mut end = n;
    for j in (2..=k).rev() {
        let start = lower[end][j];
        let idx = start.saturating_sub(2);
        breaks[j - 2] = sorted[idx];
        end = start.saturating_sub(1).max(1);
    }
    breaks
}

/// Head/tails breaks: split at the mean, then keep splitting the head
/// (values above the mean) while it stays a minority.
#[allow(clippy::cast_precision_loss)]
fn head_tails_breaks(sorted: &[f64], bin_count: usize) -> Vec<f64> {
    let mut breaks = Vec::new();
    let mut data = sorted;
    while breaks.len() + 1 < bin_count && !data.is_empty() {
        let mean = data.iter().sum::<f64>() / data.len() as f64;
        breaks.push(mean);
        let head = &data[data.partition_point(|v| *v <= mean)..];
        if head.is_empty() || head.len() as f64 / data.len() as f64 > HEAD_TAILS_LIMIT {
            break;
        }
        data = head;
    }
    breaks
}

use std::cmp::Ordering;

/// Quantile `p` of `values` (sorted in place). At an exact rank between two
/// samples the two are averaged; otherwise the sample at the rank ceiling wins.
/// Returns `None` for an empty sample.
pub fn quantile(values: &mut [f32], p: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = values.len();
    let p = p.clamp(0.0, 1.0);
    if p >= 1.0 {
        return Some(values[n - 1]);
    }
    if p <= 0.0 {
        return Some(values[0]);
    }
    // `p` carries f32 rounding (0.9 is 0.89999998); a rank that close to an
    // integer is that integer.
    let rank = n as f64 * p as f64;
    let nearest = rank.round();
    let rank = if (rank - nearest).abs() <= rank * f32::EPSILON as f64 {
        nearest
    } else {
        rank
    };
    if rank.fract() != 0.0 {
        let i = (rank.ceil() as usize).clamp(1, n) - 1;
        Some(values[i])
    } else {
        let i = rank as usize;
        if n % 2 == 0 {
            Some((values[i - 1] + values[i]) / 2.0)
        } else {
            Some(values[i])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_has_no_quantile() {
        assert_eq!(quantile(&mut [], 0.5), None);
    }

    #[test]
    fn ninetieth_percentile_of_one_to_ten() {
        let mut v: Vec<f32> = (1..=10).rev().map(|x| x as f32).collect();
        // rank 9.0 lands exactly between the 9th and 10th samples
        assert_eq!(quantile(&mut v, 0.9), Some(9.5));
    }

    #[test]
    fn top_percentile_averages_last_two() {
        let mut v: Vec<f32> = (1..=100).map(|x| x as f32).collect();
        v[99] = 250.0;
        assert_eq!(quantile(&mut v, 0.99), Some((99.0 + 250.0) / 2.0));
    }

    #[test]
    fn odd_sample_at_exact_rank_takes_next() {
        let mut v = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        // rank 4.0 with n odd
        assert_eq!(quantile(&mut v, 0.8), Some(5.0));
    }

    #[test]
    fn fractional_rank_takes_ceiling_sample() {
        let mut v = vec![5.0, 1.0, 3.0];
        assert_eq!(quantile(&mut v, 0.5), Some(3.0));
        assert_eq!(quantile(&mut v, 1.0), Some(5.0));
        assert_eq!(quantile(&mut v, 0.0), Some(1.0));
    }
}

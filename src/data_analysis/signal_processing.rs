// src/data_analysis/signal_processing.rs
//
// Extraction of (time, value) series from decoded messages, trimming to the
// flying window and resampling onto a uniform grid.

use crate::constants::{PLATFORM_STATE_FLYING, RC_THROTTLE_CHANNEL};
use crate::data_input::messages::{
    BatteryState, Header, Imu, PlatformInfo, PoseStamped, Thrust, UInt16MultiArrayStamped,
    Vector3Stamped,
};
use crate::error::{AnalysisError, Result};
use crate::types::Series;

fn header_time(header: &Header) -> f64 {
    header.stamp.as_secs_f64()
}

/// A message that contributes one sample to a time series.
pub trait SignalSource {
    /// `(timestamp_s, value)` carried by this message.
    fn sample(&self) -> Result<(f64, f64)>;
}

impl SignalSource for Thrust {
    fn sample(&self) -> Result<(f64, f64)> {
        Ok((header_time(&self.header), self.thrust as f64))
    }
}

impl SignalSource for Imu {
    fn sample(&self) -> Result<(f64, f64)> {
        Ok((header_time(&self.header), self.linear_acceleration.z))
    }
}

impl SignalSource for BatteryState {
    fn sample(&self) -> Result<(f64, f64)> {
        Ok((header_time(&self.header), self.voltage as f64))
    }
}

impl SignalSource for PlatformInfo {
    fn sample(&self) -> Result<(f64, f64)> {
        Ok((header_time(&self.header), self.state as f64))
    }
}

impl SignalSource for UInt16MultiArrayStamped {
    fn sample(&self) -> Result<(f64, f64)> {
        let throttle = self
            .data
            .get(RC_THROTTLE_CHANNEL)
            .ok_or(AnalysisError::MissingField("rc throttle channel"))?;
        Ok((header_time(&self.header), *throttle as f64))
    }
}

impl SignalSource for PoseStamped {
    fn sample(&self) -> Result<(f64, f64)> {
        Ok((header_time(&self.header), self.position.z))
    }
}

impl SignalSource for Vector3Stamped {
    fn sample(&self) -> Result<(f64, f64)> {
        Ok((header_time(&self.header), self.vector.z))
    }
}

/// Extracts the series carried by a buffer of messages.
pub fn get_data<M: SignalSource>(messages: &[M]) -> Result<Series> {
    messages.iter().map(SignalSource::sample).collect()
}

/// Keeps the platform status samples whose state is FLYING.
pub fn interval_flying(status: &[(f64, f64)]) -> Series {
    status
        .iter()
        .copied()
        .filter(|&(_, state)| state == PLATFORM_STATE_FLYING)
        .collect()
}

/// Index of the first sample at or after `time`.
pub fn time_to_index(time: f64, data: &[(f64, f64)]) -> Option<usize> {
    data.iter().position(|&(t, _)| t >= time)
}

/// Trims `data` to the time span covered by `limit`.
///
/// The slice starts at the first sample at or after the limit's first
/// timestamp and stops before the first sample at or after its last one. If
/// no sample reaches the end of the limit the slice runs to the end of `data`.
pub fn adjust_time_limits(limit: &[(f64, f64)], data: &[(f64, f64)]) -> Series {
    let (Some(first), Some(last)) = (limit.first(), limit.last()) else {
        return Vec::new();
    };
    let Some(start) = time_to_index(first.0, data) else {
        return Vec::new();
    };
    let end = time_to_index(last.0, data).unwrap_or(data.len());
    if end <= start {
        return Vec::new();
    }
    data[start..end].to_vec()
}

/// Resamples onto a uniform grid of `freq_hz`.
///
/// The period is `1000 / freq_hz` truncated to whole milliseconds. Samples are
/// averaged into bins `[k·P, (k+1)·P)` and each bin is stamped at `k·P`. Bins
/// without samples are linearly interpolated from their neighbours; trailing
/// gaps repeat the last value and leading gaps stay NaN.
///
/// Frequencies that are not finite and positive, or whose period is below
/// 1 ms, are rejected with [`AnalysisError::InvalidFrequency`].
pub fn fz_sample(data: &[(f64, f64)], freq_hz: f64) -> Result<Series> {
    if !freq_hz.is_finite() || freq_hz <= 0.0 {
        return Err(AnalysisError::InvalidFrequency(freq_hz));
    }
    let period_ms = (1000.0 / freq_hz).trunc();
    if period_ms < 1.0 {
        return Err(AnalysisError::InvalidFrequency(freq_hz));
    }
    let (Some(first), Some(last)) = (data.first(), data.last()) else {
        return Ok(Vec::new());
    };

    let bin_of = |t: f64| (t * 1000.0 / period_ms).floor() as i64;
    let first_bin = bin_of(first.0);
    let last_bin = bin_of(last.0);
    let bin_count = (last_bin - first_bin + 1).max(1) as usize;

    let mut sums = vec![0.0; bin_count];
    let mut counts = vec![0usize; bin_count];
    for &(t, v) in data {
        if v.is_nan() {
            continue;
        }
        let Ok(bin) = usize::try_from(bin_of(t) - first_bin) else {
            continue;
        };
        if bin < bin_count {
            sums[bin] += v;
            counts[bin] += 1;
        }
    }

    let mut values: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
        .collect();
    interpolate_gaps(&mut values);

    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let t_ms = (first_bin + i as i64) as f64 * period_ms;
            (t_ms / 1000.0, v)
        })
        .collect())
}

/// Linear interpolation over NaN runs between valid values.
fn interpolate_gaps(values: &mut [f64]) {
    let mut previous: Option<usize> = None;
    for i in 0..values.len() {
        if values[i].is_nan() {
            continue;
        }
        if let Some(p) = previous {
            let span = (i - p) as f64;
            let (start, end) = (values[p], values[i]);
            for j in p + 1..i {
                let w = (j - p) as f64 / span;
                values[j] = start + (end - start) * w;
            }
        }
        previous = Some(i);
    }
    if let Some(p) = previous {
        let last = values[p];
        for v in values.iter_mut().skip(p + 1) {
            *v = last;
        }
    }
}

/// Averages `data1` inside each `[t_i, t_{i+1})` window of `data2`.
///
/// Use when `data1` is denser than `data2` over the same span. Windows with no
/// samples are skipped.
pub fn synchronize_two_data(data1: &[(f64, f64)], data2: &[(f64, f64)]) -> Series {
    let mut synchronized = Vec::new();
    let mut cursor = data1.iter().peekable();

    for window in data2.windows(2) {
        let (t_start, t_end) = (window[0].0, window[1].0);
        let mut sum = 0.0;
        let mut count = 0usize;

        while let Some(&&(t, value)) = cursor.peek() {
            if t < t_start {
                cursor.next();
            } else if t < t_end {
                sum += value;
                count += 1;
                cursor.next();
            } else {
                break;
            }
        }

        if count > 0 {
            synchronized.push((t_start, sum / count as f64));
        }
    }
    synchronized
}

/// Zero-order-hold resample of the shorter series onto the longer one's
/// timestamps. On equal lengths `long_data` is held onto `short_data`.
pub fn resize_data(long_data: &[(f64, f64)], short_data: &[(f64, f64)]) -> Series {
    let (base, source) = if long_data.len() > short_data.len() {
        (long_data, short_data)
    } else {
        (short_data, long_data)
    };
    let Some(&(_, first_value)) = source.first() else {
        return Vec::new();
    };

    let mut idx = 0;
    let mut last_value = first_value;
    base.iter()
        .map(|&(t_base, _)| {
            while idx < source.len() && source[idx].0 <= t_base {
                last_value = source[idx].1;
                idx += 1;
            }
            (t_base, last_value)
        })
        .collect()
}

/// Re-keys `data1` by the values of `data2`, pairing samples positionally:
/// `(value2, value1)`.
pub fn data1_vs_data2(data1: &[(f64, f64)], data2: &[(f64, f64)]) -> Series {
    data1
        .iter()
        .zip(data2)
        .map(|(&(_, v1), &(_, v2))| (v2, v1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rc_command_needs_throttle_channel() {
        let msg = UInt16MultiArrayStamped {
            header: Header::at(2.5),
            data: vec![1500, 1500],
        };
        assert!(matches!(
            msg.sample(),
            Err(AnalysisError::MissingField(_))
        ));

        let msg = UInt16MultiArrayStamped {
            header: Header::at(2.5),
            data: vec![1500, 1500, 1320, 1500],
        };
        assert_eq!(msg.sample().unwrap(), (2.5, 1320.0));
    }

    #[test]
    fn test_interval_flying() {
        let status = vec![(0.0, 1.0), (1.0, 3.0), (2.0, 3.0), (3.0, 4.0)];
        assert_eq!(interval_flying(&status), vec![(1.0, 3.0), (2.0, 3.0)]);
    }

    #[test]
    fn test_time_to_index() {
        let data = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        assert_eq!(time_to_index(0.5, &data), Some(1));
        assert_eq!(time_to_index(2.0, &data), Some(2));
        assert_eq!(time_to_index(2.5, &data), None);
    }

    #[test]
    fn test_adjust_time_limits() {
        let limit = vec![(1.0, 3.0), (3.0, 3.0)];
        let data: Series = (0..6).map(|i| (i as f64, i as f64 * 10.0)).collect();
        assert_eq!(
            adjust_time_limits(&limit, &data),
            vec![(1.0, 10.0), (2.0, 20.0)]
        );

        // Limit ends after the data: run to the end.
        let limit = vec![(4.0, 3.0), (9.0, 3.0)];
        assert_eq!(
            adjust_time_limits(&limit, &data),
            vec![(4.0, 40.0), (5.0, 50.0)]
        );

        assert!(adjust_time_limits(&[], &data).is_empty());
    }

    #[test]
    fn test_fz_sample_bins_and_interpolates() {
        let data = vec![(10.2, 1.0), (10.7, 3.0), (12.5, 10.0)];
        let sampled = fz_sample(&data, 1.0).unwrap();
        assert_eq!(sampled.len(), 3);
        assert_abs_diff_eq!(sampled[0].0, 10.0);
        assert_abs_diff_eq!(sampled[0].1, 2.0);
        assert_abs_diff_eq!(sampled[1].0, 11.0);
        assert_abs_diff_eq!(sampled[1].1, 6.0);
        assert_abs_diff_eq!(sampled[2].0, 12.0);
        assert_abs_diff_eq!(sampled[2].1, 10.0);
    }

    #[test]
    fn test_fz_sample_higher_rate() {
        let data = vec![(0.05, 1.0), (0.15, 2.0), (0.45, 5.0)];
        let sampled = fz_sample(&data, 10.0).unwrap();
        let times: Vec<f64> = sampled.iter().map(|s| s.0).collect();
        assert_eq!(sampled.len(), 5);
        for (i, t) in times.iter().enumerate() {
            assert_abs_diff_eq!(*t, i as f64 * 0.1, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(sampled[2].1, 3.0);
        assert_abs_diff_eq!(sampled[3].1, 4.0);
    }

    #[test]
    fn test_fz_sample_empty() {
        assert!(fz_sample(&[], 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_fz_sample_rejects_bad_frequency() {
        let data = vec![(0.0, 1.0), (1.0, 2.0)];
        for freq in [0.0, -5.0, f64::NAN, f64::INFINITY, 2000.0] {
            assert!(
                matches!(fz_sample(&data, freq), Err(AnalysisError::InvalidFrequency(_))),
                "{freq} Hz accepted"
            );
        }
        assert!(fz_sample(&data, 1000.0).is_ok());
    }

    #[test]
    fn test_interpolate_gaps_edges() {
        let mut values = vec![f64::NAN, 1.0, f64::NAN, 3.0, f64::NAN];
        interpolate_gaps(&mut values);
        assert!(values[0].is_nan());
        assert_eq!(&values[1..], &[1.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_synchronize_two_data() {
        let dense = vec![(0.1, 1.0), (0.5, 3.0), (1.2, 5.0), (2.5, 7.0)];
        let sparse = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)];
        assert_eq!(
            synchronize_two_data(&dense, &sparse),
            vec![(0.0, 2.0), (1.0, 5.0), (2.0, 7.0)]
        );
    }

    #[test]
    fn test_resize_data_holds_values() {
        let long = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)];
        let short = vec![(0.0, 5.0), (2.0, 7.0)];
        assert_eq!(
            resize_data(&long, &short),
            vec![(0.0, 5.0), (1.0, 5.0), (2.0, 7.0), (3.0, 7.0)]
        );
    }

    #[test]
    fn test_data1_vs_data2() {
        let thrust = vec![(0.0, 9.0), (1.0, 9.5)];
        let battery = vec![(0.0, 16.2), (1.0, 16.1), (2.0, 16.0)];
        assert_eq!(data1_vs_data2(&thrust, &battery), vec![(16.2, 9.0), (16.1, 9.5)]);
    }
}

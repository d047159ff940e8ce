use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

use crate::record::StationRecord;

/// Cache key for a record's Fourier amplitude spectrum.
pub const FAS_CACHE_KEY: &str = "fas_spectrum";

/// Helper that wraps the `rustfft` planner for reuse.
pub struct FftHelper {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    /// Forward transform of `input`, zero-padded or truncated to the plan size.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.size)
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());
        self.fft.process(&mut buffer);
        buffer
    }

    /// Amplitudes of the non-negative frequency half of the spectrum.
    pub fn real_amplitudes(&self, input: &[f64]) -> Vec<f64> {
        let spectrum = self.forward(input);
        spectrum
            .iter()
            .take(self.size / 2 + 1)
            .map(|c| c.norm())
            .collect()
    }
}

/// Smallest power of two that is at least `value`.
pub fn next_pow_2(value: f64) -> usize {
    if value <= 1.0 {
        return 1;
    }
    let exponent = value.log2().ceil() as u32;
    1usize.checked_shl(exponent).unwrap_or(usize::MAX)
}

/// Frequencies matching `real_amplitudes` for an `nfft`-point transform.
pub fn rfft_frequencies(nfft: usize, sampling_rate: f64) -> Vec<f64> {
    (0..=nfft / 2)
        .map(|k| k as f64 * sampling_rate / nfft as f64)
        .collect()
}

/// Fourier amplitude spectrum of a record, scaled by the sample interval.
///
/// The spectrum is stored under [`FAS_CACHE_KEY`] and reused on later calls
/// until the entry is removed from the record.
pub fn amplitude_spectrum(record: &mut StationRecord, nfft: usize) -> (Vec<f64>, Vec<f64>) {
    let freqs = rfft_frequencies(nfft, record.sampling_rate());
    if let Ok(cached) = record.get_cached(FAS_CACHE_KEY) {
        return (cached.to_vec(), freqs);
    }
    let delta = record.delta();
    let spectra: Vec<f64> = FftHelper::new(nfft)
        .real_amplitudes(record.data())
        .into_iter()
        .map(|amplitude| amplitude * delta)
        .collect();
    record.set_cached(FAS_CACHE_KEY, spectra.clone());
    (spectra, freqs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordHeader, Timestamp};

    #[test]
    fn fft_helper_returns_same_length() {
        let helper = FftHelper::new(4);
        let output = helper.forward(&[1.0, 0.0, -1.0, 0.0]);
        assert_eq!(output.len(), 4);
        assert_eq!(helper.real_amplitudes(&[1.0, 0.0, -1.0, 0.0]).len(), 3);
    }

    #[test]
    fn next_pow_2_rounds_up() {
        assert_eq!(next_pow_2(0.5), 1);
        assert_eq!(next_pow_2(5.0), 8);
        assert_eq!(next_pow_2(1024.0), 1024);
        assert_eq!(next_pow_2(1024.5), 2048);
    }

    #[test]
    fn spectrum_is_cached_on_the_record() {
        let header = RecordHeader::new("TE", "STA", "--", "HNZ", Timestamp::EPOCH, 100.0);
        let mut record = StationRecord::new(vec![1.0; 8], header);
        let (spectra, freqs) = amplitude_spectrum(&mut record, 8);
        assert_eq!(spectra.len(), 5);
        assert_eq!(freqs, vec![0.0, 12.5, 25.0, 37.5, 50.0]);
        assert!((spectra[0] - 8.0 * 0.01).abs() < 1e-12);
        assert!(record.has_cached(FAS_CACHE_KEY));

        record.set_cached(FAS_CACHE_KEY, vec![42.0]);
        let (cached, _) = amplitude_spectrum(&mut record, 8);
        assert_eq!(cached, vec![42.0]);
    }
}

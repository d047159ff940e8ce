use std::f64::consts::PI;

/// Sine waveform of `frequency` Hz sampled every `delta` seconds, starting
/// `phase_time` seconds into the wave.
pub fn sine_wave(length: usize, frequency: f64, delta: f64, phase_time: f64) -> Vec<f64> {
    (0..length)
        .map(|i| (2.0 * PI * frequency * (phase_time + i as f64 * delta)).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_wave_starts_at_phase() {
        let wave = sine_wave(4, 1.0, 0.25, 0.0);
        assert_eq!(wave.len(), 4);
        assert!(wave[0].abs() < 1e-12);
        assert!((wave[1] - 1.0).abs() < 1e-12);
    }
}

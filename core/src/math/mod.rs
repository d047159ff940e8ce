pub mod fft;
pub mod interpolate;

pub use fft::{amplitude_spectrum, next_pow_2, FftHelper};
pub use interpolate::lanczos_resample;

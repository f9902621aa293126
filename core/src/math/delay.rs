//! Cold-plasma dispersion delay.

/// Dispersion constant in s MHz^2 pc^-1 cm^3.
pub const DISPERSION_CONSTANT: f64 = 4148.808;

/// Arrival delay of `f_channel_mhz` relative to `f_ref_mhz` for a given DM.
///
/// Negative when the channel lies above the reference.
pub fn delay_seconds(dm: f64, f_channel_mhz: f64, f_ref_mhz: f64) -> f64 {
    DISPERSION_CONSTANT * dm * (f_channel_mhz.powi(-2) - f_ref_mhz.powi(-2))
}

/// Nearest whole sample for `delay_seconds`, never negative.
pub fn delay_to_samples(delay_seconds: f64, t_int: f64) -> usize {
    let samples = (delay_seconds / t_int).round();
    if samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

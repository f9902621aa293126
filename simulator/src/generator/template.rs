/// Gaussian pulse envelope with unit peak at the centre sample.
///
/// `width` is the full width at half maximum in samples; widths below 2
/// collapse to a single-sample impulse.
pub fn gaussian_profile(width: usize) -> Vec<f32> {
    if width < 2 {
        return vec![1.0];
    }
    let sigma = width as f32 / 2.355;
    let half = (3.0 * sigma).ceil() as isize;
    (-half..=half)
        .map(|k| {
            let x = k as f32 / sigma;
            (-0.5 * x * x).exp()
        })
        .collect()
}

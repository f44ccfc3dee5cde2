//! Numeric helpers shared by the cost models and the scheduler.

use crate::image::Rgb;

/// Euclidean RGB distance normalized so that black vs white on one channel is 1.
pub(crate) fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt() / 255.0
}

/// Gaussian dissimilarity `1 - exp(-v^2 / (2 sigma^2))`, in `[0, 1)`.
pub(crate) fn gaussian_dissimilarity(value: f64, sigma: f64) -> f64 {
    let denom = 2.0 * sigma * sigma;
    1.0 - (-(value * value) / denom).exp()
}

/// Difference between the absolute offsets of two matches at position `x`.
///
/// Small values mean both neighbors shift `x` by about the same amount.
pub(crate) fn offset_disagreement(prev: i32, next: i32, x: usize) -> i32 {
    let x = x as i64;
    let a = (prev as i64 - x).abs();
    let b = (next as i64 - x).abs();
    (a - b).abs().min(i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::{gaussian_dissimilarity, offset_disagreement, rgb_distance};
    use crate::image::Rgb;

    #[test]
    fn rgb_distance_is_normalized() {
        let black = Rgb::new(0, 0, 0);
        let red = Rgb::new(255, 0, 0);
        assert!((rgb_distance(black, red) - 1.0).abs() < 1e-12);
        assert_eq!(rgb_distance(red, red), 0.0);
    }

    #[test]
    fn gaussian_dissimilarity_grows_with_value() {
        assert_eq!(gaussian_dissimilarity(0.0, 0.1), 0.0);
        let near = gaussian_dissimilarity(0.05, 0.1);
        let far = gaussian_dissimilarity(0.5, 0.1);
        assert!(near < far);
        assert!(far < 1.0);
    }

    #[test]
    fn offset_disagreement_ignores_direction() {
        assert_eq!(offset_disagreement(12, 8, 10), 0);
        assert_eq!(offset_disagreement(10, 17, 10), 7);
        assert_eq!(offset_disagreement(-1, -1, 3), 0);
    }
}

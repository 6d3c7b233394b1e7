//! Reductions over sample slices

use num_traits::Float;

/// Arithmetic mean; NaN for an empty slice
pub fn mean<T: Float>(data: &[T]) -> T {
    if data.is_empty() {
        return T::nan();
    }
    let n = T::from(data.len()).unwrap_or_else(T::nan);
    data.iter().fold(T::zero(), |acc, &x| acc + x) / n
}

/// Sample variance with N-1 normalisation; zero for fewer than two samples
pub fn sample_variance<T: Float>(data: &[T]) -> T {
    if data.len() < 2 {
        return T::zero();
    }
    let mu = mean(data);
    let n_minus_one = T::from(data.len() - 1).unwrap_or_else(T::nan);
    data.iter().fold(T::zero(), |acc, &x| acc + (x - mu).powi(2)) / n_minus_one
}

/// Sample standard deviation
pub fn sample_std<T: Float>(data: &[T]) -> T {
    sample_variance(data).sqrt()
}

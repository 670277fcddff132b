use rand::Rng;

use crate::error::MelodyError;
use crate::model::vocabulary::TokenId;

/// Tolerance accepted on the sum of an input probability vector.
const SUM_TOLERANCE: f64 = 1e-3;

/// Reshapes a probability vector with a sampling temperature.
///
/// Takes the natural log of each probability, divides by the temperature,
/// then renormalizes through a softmax. At `temperature = 1.0` the input is
/// reproduced within floating-point tolerance; as the temperature goes to 0
/// the mass concentrates on the arg-max; as it grows the distribution
/// flattens toward uniform over the original support.
///
/// Zero input probabilities map to `ln(0) = -inf` and resolve to exactly
/// zero reshaped mass, never to `NaN`: the softmax subtracts the maximum
/// scaled log-probability before exponentiating.
///
/// # Errors
/// - `InvalidTemperature` if `temperature` is not strictly positive.
/// - `NumericInstability` if the vector is empty, holds negative or
///   non-finite entries, is all-zero, or does not sum to 1 within tolerance.
pub fn reshape_probabilities(
	probabilities: &[f32],
	temperature: f32,
) -> Result<Vec<f32>, MelodyError> {
	// Also rejects NaN temperatures
	if !(temperature > 0.0) {
		return Err(MelodyError::InvalidTemperature(temperature));
	}
	if probabilities.is_empty() {
		return Err(MelodyError::NumericInstability("empty probability vector".to_owned()));
	}

	let mut sum = 0.0f64;
	for &probability in probabilities {
		if !probability.is_finite() || probability < 0.0 {
			return Err(MelodyError::NumericInstability(format!(
				"invalid probability entry {}",
				probability
			)));
		}
		sum += probability as f64;
	}
	if (sum - 1.0).abs() > SUM_TOLERANCE {
		return Err(MelodyError::NumericInstability(format!(
			"probabilities sum to {}, expected 1.0",
			sum
		)));
	}

	// ln(p) / T, in f64 so extreme temperatures stay representable
	let scaled: Vec<f64> = probabilities
		.iter()
		.map(|&probability| (probability as f64).ln() / temperature as f64)
		.collect();

	let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	if max == f64::NEG_INFINITY {
		return Err(MelodyError::NumericInstability("all probabilities are zero".to_owned()));
	}

	let exponentials: Vec<f64> = scaled.iter().map(|&value| (value - max).exp()).collect();
	let total: f64 = exponentials.iter().sum();
	if !total.is_finite() || total <= 0.0 {
		return Err(MelodyError::NumericInstability(format!(
			"renormalization sum is {}",
			total
		)));
	}

	Ok(exponentials.iter().map(|&value| (value / total) as f32).collect())
}

/// Samples one index from a probability vector reshaped by `temperature`.
///
/// The draw is a single cumulative-subtraction pass over the reshaped
/// weights; indices with zero mass are never selected.
///
/// # Errors
/// Propagates the errors of [`reshape_probabilities`].
pub fn sample_with_temperature(
	probabilities: &[f32],
	temperature: f32,
) -> Result<TokenId, MelodyError> {
	let weights = reshape_probabilities(probabilities, temperature)?;

	let mut r: f32 = rand::rng().random_range(0.0..1.0);

	let mut fallback: Option<TokenId> = None;
	for (index, &weight) in weights.iter().enumerate() {
		if weight <= 0.0 {
			continue;
		}
		if r < weight {
			return Ok(index);
		}
		r -= weight;
		fallback = Some(index);
	}

	// Rounding can leave a sliver of r past the last bucket; the last index
	// with nonzero mass takes it.
	fallback.ok_or_else(|| {
		MelodyError::NumericInstability("no index with nonzero mass".to_owned())
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unit_temperature_reproduces_input() {
		let probabilities = [0.1f32, 0.2, 0.3, 0.4];
		let reshaped = reshape_probabilities(&probabilities, 1.0).unwrap();
		for (input, output) in probabilities.iter().zip(&reshaped) {
			assert!((input - output).abs() < 1e-5, "{} != {}", input, output);
		}
	}

	#[test]
	fn low_temperature_concentrates_on_argmax() {
		let probabilities = [0.1f32, 0.6, 0.3];
		let reshaped = reshape_probabilities(&probabilities, 0.01).unwrap();
		assert!(reshaped[1] > 0.999);
		assert!(reshaped[0] < 1e-3);
		assert!(reshaped[2] < 1e-3);
	}

	#[test]
	fn high_temperature_flattens_over_support() {
		let probabilities = [0.0f32, 0.7, 0.3];
		let reshaped = reshape_probabilities(&probabilities, 1000.0).unwrap();
		// Zero entries stay excluded from the support
		assert_eq!(reshaped[0], 0.0);
		assert!((reshaped[1] - 0.5).abs() < 1e-2);
		assert!((reshaped[2] - 0.5).abs() < 1e-2);
	}

	#[test]
	fn zero_entries_never_produce_nan() {
		// All mass on a single index: ln(0) entries must resolve to 0, not NaN
		let probabilities = [0.0f32, 0.0, 1.0, 0.0];
		let reshaped = reshape_probabilities(&probabilities, 0.5).unwrap();
		assert_eq!(reshaped, vec![0.0, 0.0, 1.0, 0.0]);
	}

	#[test]
	fn all_zero_vector_is_rejected() {
		let result = reshape_probabilities(&[0.0f32, 0.0], 1.0);
		assert!(matches!(result, Err(MelodyError::NumericInstability(_))));
	}

	#[test]
	fn negative_entry_is_rejected() {
		let result = reshape_probabilities(&[1.2f32, -0.2], 1.0);
		assert!(matches!(result, Err(MelodyError::NumericInstability(_))));
	}

	#[test]
	fn non_unit_sum_is_rejected() {
		let result = reshape_probabilities(&[0.5f32, 0.1], 1.0);
		assert!(matches!(result, Err(MelodyError::NumericInstability(_))));
	}

	#[test]
	fn non_positive_temperature_is_rejected() {
		for temperature in [0.0f32, -1.0, f32::NAN] {
			let result = reshape_probabilities(&[0.5f32, 0.5], temperature);
			assert!(matches!(result, Err(MelodyError::InvalidTemperature(_))));
		}
	}

	#[test]
	fn one_hot_vector_always_samples_its_index() {
		let probabilities = [0.0f32, 0.0, 1.0];
		for _ in 0..32 {
			assert_eq!(sample_with_temperature(&probabilities, 1.0).unwrap(), 2);
		}
	}

	#[test]
	fn near_greedy_sampling_picks_the_argmax() {
		let probabilities = [0.2f32, 0.1, 0.7];
		for _ in 0..32 {
			assert_eq!(sample_with_temperature(&probabilities, 0.01).unwrap(), 2);
		}
	}

	#[test]
	fn sampled_index_has_nonzero_mass() {
		let probabilities = [0.5f32, 0.0, 0.5];
		for _ in 0..64 {
			let index = sample_with_temperature(&probabilities, 2.0).unwrap();
			assert_ne!(index, 1);
		}
	}
}

use crate::error::MelodyError;

/// Input parameters for one melody generation run.
///
/// `GenerationInput` contains the caller-supplied seed and the knobs of the
/// generation loop.
///
/// # Responsibilities
/// - Track the seed (whitespace-separated surface symbols)
/// - Track loop parameters (`num_steps`, `max_window`)
/// - Keep the sampling temperature in its valid range through a setter
///
/// # Invariants
/// - `temperature` is always strictly positive
#[derive(Debug, Clone)]
pub struct GenerationInput {
	/// Whitespace-separated seed symbols, e.g. `"60 _ _ _ 62"`.
	/// May be empty to generate from the sentinel-only window.
	pub seed: String,

	/// Hard cap on the number of generation steps.
	pub num_steps: usize,

	/// Length of the context window fed to the model at each step.
	pub max_window: usize,

	/// Sampling temperature (> 0.0).
	temperature: f32,
}

impl GenerationInput {
	/// Creates an input with the given seed and default loop parameters
	/// (200 steps, a 64-token window, unit temperature).
	pub fn new<S: Into<String>>(seed: S) -> Self {
		Self {
			seed: seed.into(),
			num_steps: 200,
			max_window: 64,
			temperature: 1.0,
		}
	}

	/// Returns the current sampling temperature.
	pub fn temperature(&self) -> f32 {
		self.temperature
	}

	/// Sets the sampling temperature.
	///
	/// # Errors
	/// Returns `InvalidTemperature` if the value is not strictly positive.
	pub fn set_temperature(&mut self, temperature: f32) -> Result<(), MelodyError> {
		if !(temperature > 0.0) {
			return Err(MelodyError::InvalidTemperature(temperature));
		}
		self.temperature = temperature;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_usable() {
		let input = GenerationInput::new("60 _ 62");
		assert_eq!(input.num_steps, 200);
		assert_eq!(input.max_window, 64);
		assert_eq!(input.temperature(), 1.0);
	}

	#[test]
	fn temperature_setter_validates() {
		let mut input = GenerationInput::new("");
		assert!(input.set_temperature(0.4).is_ok());
		assert_eq!(input.temperature(), 0.4);

		assert!(input.set_temperature(0.0).is_err());
		assert!(input.set_temperature(-1.0).is_err());
		// Rejected values leave the previous temperature in place
		assert_eq!(input.temperature(), 0.4);
	}
}

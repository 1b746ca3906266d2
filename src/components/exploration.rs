use super::ConfigError;

/// A linearly decaying multiplier for exploration noise.
///
/// The multiplier starts at `initial_scale`, decays linearly over the first
/// `timesteps` environment interactions and stays at `final_scale` from then
/// on. Evaluating the schedule has no side effects; the caller owns the
/// interaction counter.
#[derive(Debug, Clone)]
pub struct LinearDecay {
    timesteps: usize,
    initial_scale: f64,
    final_scale: f64,
}
impl LinearDecay {
    pub fn new(
        timesteps: usize,
        initial_scale: f64,
        final_scale: f64,
    ) -> Result<Self, ConfigError> {
        if timesteps == 0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "exploration.timesteps",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            timesteps,
            initial_scale,
            final_scale,
        })
    }

    /// The noise multiplier at interaction step `t`.
    ///
    /// Exactly `initial_scale` at `t = 0` and exactly `final_scale` for every
    /// `t >= timesteps`, without floating-point drift at either endpoint.
    pub fn scale(
        &self,
        t: usize,
    ) -> f64 {
        if t == 0 {
            self.initial_scale
        } else if t >= self.timesteps {
            self.final_scale
        } else {
            let remaining = 1.0 - t as f64 / self.timesteps as f64;
            self.final_scale + remaining * (self.initial_scale - self.final_scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_horizon_is_rejected() {
        assert!(LinearDecay::new(0, 1.0, 0.1).is_err());
    }

    #[test]
    fn test_endpoints_are_exact() {
        let decay = LinearDecay::new(1000, 1.0, 1e-3).unwrap();

        assert_eq!(decay.scale(0), 1.0);
        assert_eq!(decay.scale(1000), 1e-3);
        assert_eq!(decay.scale(1001), 1e-3);
        assert_eq!(decay.scale(1_000_000), 1e-3);
    }

    #[test]
    fn test_midpoint() {
        let decay = LinearDecay::new(100, 1.0, 0.0).unwrap();

        assert!((decay.scale(50) - 0.5).abs() < 1e-12);
        assert!((decay.scale(75) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_non_increasing() {
        let decay = LinearDecay::new(500, 0.8, 0.05).unwrap();

        let mut previous = decay.scale(0);
        for t in 1..600 {
            let current = decay.scale(t);
            assert!(current <= previous, "scale increased at t = {t}");
            previous = current;
        }
    }
}

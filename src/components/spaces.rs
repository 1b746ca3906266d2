use {
    super::ConfigError,
    candle_core::{
        Device,
        Result,
        Tensor,
    },
    rand::Rng,
    serde::{
        Deserialize,
        Serialize,
    },
};

/// The kinds of action spaces an environment can expose.
///
/// The kind is validated once, when an agent is constructed, so the hot paths
/// never branch on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionSpace {
    /// A bounded continuous space with per-dimension closed bounds.
    Box {
        low: Vec<f64>,
        high: Vec<f64>,
    },
    /// A finite set of choices. No agent in this crate supports it; it exists
    /// so that the mismatch is reported as a capability error.
    Discrete {
        n: usize,
    },
}
impl ActionSpace {
    /// A validated bounded continuous space.
    pub fn from_bounds(
        low: Vec<f64>,
        high: Vec<f64>,
    ) -> std::result::Result<Self, ConfigError> {
        let space = Self::Box { low, high };
        space.validate()?;
        Ok(space)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self {
            Self::Box { low, high } => {
                if low.is_empty() || low.len() != high.len() {
                    return Err(ConfigError::InvalidBounds(format!(
                        "got {} lower and {} upper bounds",
                        low.len(),
                        high.len(),
                    )));
                }
                for (index, (lo, hi)) in low.iter().zip(high.iter()).enumerate() {
                    if !lo.is_finite() || !hi.is_finite() || lo > hi {
                        return Err(ConfigError::InvalidBounds(format!(
                            "dimension {index} has bounds [{lo}, {hi}]",
                        )));
                    }
                }
                Ok(())
            }
            Self::Discrete { n } => {
                if *n == 0 {
                    return Err(ConfigError::InvalidBounds(
                        "a discrete space needs at least one action".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            Self::Box { low, .. } => low.len(),
            Self::Discrete { .. } => 1,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "Box",
            Self::Discrete { .. } => "Discrete",
        }
    }

    /// One uniform draw from the space.
    pub fn sample(
        &self,
        rng: &mut impl Rng,
    ) -> Vec<f64> {
        match self {
            Self::Box { low, high } => low
                .iter()
                .zip(high.iter())
                .map(|(lo, hi)| rng.gen_range(*lo..=*hi))
                .collect(),
            Self::Discrete { n } => vec![rng.gen_range(0..*n) as f64],
        }
    }

    /// The bounds as device-resident tensors, for per-dimension clipping.
    pub fn bound_tensors(
        &self,
        device: &Device,
    ) -> Result<(Tensor, Tensor)> {
        match self {
            Self::Box { low, high } => Ok((
                Tensor::new(low.as_slice(), device)?,
                Tensor::new(high.as_slice(), device)?,
            )),
            Self::Discrete { .. } => {
                candle_core::bail!("a Discrete space has no continuous bounds")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn test_validation_rejects_bad_bounds() {
        assert!(ActionSpace::from_bounds(vec![], vec![]).is_err());
        assert!(ActionSpace::from_bounds(vec![0.0], vec![1.0, 2.0]).is_err());
        assert!(ActionSpace::from_bounds(vec![1.0], vec![-1.0]).is_err());
        assert!(ActionSpace::from_bounds(vec![f64::NAN], vec![1.0]).is_err());

        assert!(ActionSpace::from_bounds(vec![-2.0, -1.0], vec![2.0, 1.0]).is_ok());
    }

    #[test]
    fn test_samples_respect_bounds() {
        let space = ActionSpace::from_bounds(vec![-2.0, 0.0], vec![2.0, 0.5]).unwrap();
        let mut rng = thread_rng();

        for _ in 0..100 {
            let action = space.sample(&mut rng);
            assert_eq!(action.len(), 2);
            assert!((-2.0..=2.0).contains(&action[0]));
            assert!((0.0..=0.5).contains(&action[1]));
        }
    }

    #[test]
    fn test_bound_tensors_match_dims() -> Result<()> {
        let space = ActionSpace::from_bounds(vec![-1.0, -2.0, -3.0], vec![1.0, 2.0, 3.0]).unwrap();
        let (low, high) = space.bound_tensors(&Device::Cpu)?;

        assert_eq!(space.dim(), 3);
        assert_eq!(low.to_vec1::<f64>()?, vec![-1.0, -2.0, -3.0]);
        assert_eq!(high.to_vec1::<f64>()?, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_discrete_has_no_bounds() {
        let space = ActionSpace::Discrete { n: 4 };
        assert_eq!(space.kind(), "Discrete");
        assert!(space.bound_tensors(&Device::Cpu).is_err());
    }
}

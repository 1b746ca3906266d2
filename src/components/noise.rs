use {
    candle_core::{
        DType,
        Device,
        Result,
        Tensor,
    },
    serde::{
        Deserialize,
        Serialize,
    },
};

/// Specification of the noise process sampled per action selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoiseConfig {
    OrnsteinUhlenbeck {
        mu: f64,
        theta: f64,
        sigma: f64,
    },
    Gaussian {
        mean: f64,
        std: f64,
    },
}
impl NoiseConfig {
    pub fn build(
        &self,
        size_action: usize,
        device: &Device,
    ) -> Result<Noise> {
        Ok(match *self {
            Self::OrnsteinUhlenbeck { mu, theta, sigma } => {
                Noise::OrnsteinUhlenbeck(OuNoise::new(mu, theta, sigma, size_action, device)?)
            }
            Self::Gaussian { mean, std } => {
                Noise::Gaussian(GaussianNoise::new(mean, std, size_action, device)?)
            }
        })
    }
}

/// A stateful noise process producing one action-shaped sample per call.
pub enum Noise {
    OrnsteinUhlenbeck(OuNoise),
    Gaussian(GaussianNoise),
}
impl Noise {
    pub fn sample(&mut self) -> Result<Tensor> {
        match self {
            Self::OrnsteinUhlenbeck(noise) => noise.sample(),
            Self::Gaussian(noise) => noise.sample(),
        }
    }
}

/// Temporally correlated noise from an Ornstein-Uhlenbeck process.
///
/// The process state drifts toward `mu` at rate `theta` and is perturbed by
/// `sigma`-scaled white noise, which keeps consecutive samples correlated.
pub struct OuNoise {
    mu: f64,
    theta: f64,
    sigma: f64,
    state: Tensor,
}
impl OuNoise {
    pub fn new(
        mu: f64,
        theta: f64,
        sigma: f64,
        size_action: usize,
        device: &Device,
    ) -> Result<Self> {
        Ok(Self {
            mu,
            theta,
            sigma,
            state: Tensor::ones(size_action, DType::F64, device)?,
        })
    }

    pub fn sample(&mut self) -> Result<Tensor> {
        let rand = Tensor::randn_like(&self.state, 0.0, 1.0)?;
        let dx = ((self.theta * (self.mu - &self.state)?)? + (self.sigma * rand)?)?;
        self.state = (&self.state + dx)?;
        Ok(self.state.clone())
    }
}

/// Uncorrelated noise, one independent draw per call.
pub struct GaussianNoise {
    mean: f64,
    std: f64,
    template: Tensor,
}
impl GaussianNoise {
    pub fn new(
        mean: f64,
        std: f64,
        size_action: usize,
        device: &Device,
    ) -> Result<Self> {
        Ok(Self {
            mean,
            std,
            template: Tensor::zeros(size_action, DType::F64, device)?,
        })
    }

    pub fn sample(&mut self) -> Result<Tensor> {
        self.template.randn_like(self.mean, self.std)
    }
}

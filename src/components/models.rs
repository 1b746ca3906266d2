use {
    super::ConfigError,
    anyhow::Result,
    candle_core::{
        DType,
        Device,
        Module,
        Tensor,
        Var,
    },
    candle_nn::{
        func,
        linear,
        seq,
        Activation,
        Sequential,
        VarBuilder,
        VarMap,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::collections::HashMap,
};

/// Activation applied after the final linear layer of an [`MlpConfig`] network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadActivation {
    Linear,
    Tanh,
}

/// Layer sizes and head of a fully-connected ReLU network.
///
/// `dims` lists every layer width including input and output, so a policy for
/// a 3-dimensional observation and a scalar action could be `[3, 400, 300, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    pub dims: Vec<usize>,
    pub head: HeadActivation,
}
impl MlpConfig {
    pub fn new(
        dims: Vec<usize>,
        head: HeadActivation,
    ) -> Self {
        Self { dims, head }
    }

    pub fn input_dim(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    pub fn output_dim(&self) -> usize {
        self.dims.last().copied().unwrap_or(0)
    }

    /// Check the network against the input/output contract of its role.
    pub fn check_io(
        &self,
        name: &str,
        want_in: usize,
        want_out: usize,
    ) -> Result<(), ConfigError> {
        if self.dims.len() < 2 {
            return Err(ConfigError::TooFewLayers(name.to_owned()));
        }
        if self.input_dim() != want_in || self.output_dim() != want_out {
            return Err(ConfigError::WrongModelShape {
                model: name.to_owned(),
                want_in,
                want_out,
                got_in: self.input_dim(),
                got_out: self.output_dim(),
            });
        }
        Ok(())
    }

    fn build(
        &self,
        vb: &VarBuilder,
        prefix: &str,
    ) -> candle_core::Result<Sequential> {
        let mut network = seq();
        let last = self.dims.len() - 2;
        for (i, dims) in self.dims.windows(2).enumerate() {
            network = network.add(linear(
                dims[0],
                dims[1],
                vb.pp(format!("{prefix}-fc{i}")),
            )?);
            if i < last {
                network = network.add(Activation::Relu);
            }
        }
        Ok(match self.head {
            HeadActivation::Tanh => network.add(func(|xs| xs.tanh())),
            HeadActivation::Linear => network,
        })
    }
}

/// The named function approximators an agent is built from.
///
/// Actor-critic agents expect the four entries `policy`, `target_policy`,
/// `critic` and `target_critic`; a missing entry is a construction-time
/// configuration error, never a runtime one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    models: HashMap<String, MlpConfig>,
}
impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        config: MlpConfig,
    ) -> Self {
        self.models.insert(name.into(), config);
        self
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Result<&MlpConfig, ConfigError> {
        self.models
            .get(name)
            .ok_or_else(|| ConfigError::MissingModel(name.to_owned()))
    }

    /// The standard four-network set for a deterministic actor-critic agent
    /// with two hidden layers.
    pub fn actor_critic(
        size_state: usize,
        size_action: usize,
        hidden_1_size: usize,
        hidden_2_size: usize,
    ) -> Self {
        let policy = MlpConfig::new(
            vec![size_state, hidden_1_size, hidden_2_size, size_action],
            HeadActivation::Tanh,
        );
        let critic = MlpConfig::new(
            vec![size_state + size_action, hidden_1_size, hidden_2_size, 1],
            HeadActivation::Linear,
        );
        Self::new()
            .with("policy", policy.clone())
            .with("target_policy", policy)
            .with("critic", critic.clone())
            .with("target_critic", critic)
    }
}

/// One online/target pair of structurally identical networks.
///
/// The online side is trained by an optimizer; the target side can only be
/// mutated through [`NetworkPair::smooth`] and never receives a gradient.
/// Construction hard-copies the online parameters into the target, which is
/// the one-time equivalent of smoothing with coefficient 1.
pub struct NetworkPair {
    online_vars: VarMap,
    target_vars: VarMap,
    online: Sequential,
    target: Sequential,
}
impl std::fmt::Debug for NetworkPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkPair").finish_non_exhaustive()
    }
}
impl NetworkPair {
    pub fn new(
        online_config: &MlpConfig,
        target_config: &MlpConfig,
        online_name: &str,
        target_name: &str,
        device: &Device,
    ) -> Result<Self> {
        if online_config != target_config {
            return Err(ConfigError::TargetMismatch {
                online: online_name.to_owned(),
                target: target_name.to_owned(),
                online_dims: online_config.dims.clone(),
                target_dims: target_config.dims.clone(),
            }
            .into());
        }
        if online_config.dims.len() < 2 {
            return Err(ConfigError::TooFewLayers(online_name.to_owned()).into());
        }

        let online_vars = VarMap::new();
        let online = online_config.build(
            &VarBuilder::from_varmap(&online_vars, DType::F64, device),
            online_name,
        )?;

        // Built under the same prefix so parameter names line up across the
        // pair, which is what smooth() keys on.
        let target_vars = VarMap::new();
        let target = target_config.build(
            &VarBuilder::from_varmap(&target_vars, DType::F64, device),
            online_name,
        )?;

        let pair = Self {
            online_vars,
            target_vars,
            online,
            target,
        };
        pair.smooth(1.0)?;
        Ok(pair)
    }

    pub fn forward(
        &self,
        xs: &Tensor,
    ) -> candle_core::Result<Tensor> {
        self.online.forward(xs)
    }

    pub fn target_forward(
        &self,
        xs: &Tensor,
    ) -> candle_core::Result<Tensor> {
        self.target.forward(xs)
    }

    /// `target <- polyak * online + (1 - polyak) * target`, elementwise.
    ///
    /// This is a pure in-place blend of parameter values; nothing here is
    /// recorded for backpropagation.
    pub fn smooth(
        &self,
        polyak: f64,
    ) -> candle_core::Result<()> {
        let online = self.online_vars.data().lock().unwrap();
        let target = self.target_vars.data().lock().unwrap();

        for (name, target_var) in target.iter() {
            let online_var = match online.get(name) {
                Some(var) => var,
                None => candle_core::bail!("no online parameter named {name}"),
            };
            let blended = ((polyak * online_var.as_tensor())?
                + ((1.0 - polyak) * target_var.as_tensor())?)?;
            target_var.set(&blended)?;
        }
        Ok(())
    }

    /// The variables an optimizer is allowed to train.
    pub fn trainable_vars(&self) -> Vec<Var> {
        self.online_vars.all_vars()
    }

    pub fn online_parameters(&self) -> &VarMap {
        &self.online_vars
    }

    pub fn target_parameters(&self) -> &VarMap {
        &self.target_vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(varmap: &VarMap) -> HashMap<String, Vec<f64>> {
        varmap
            .data()
            .lock()
            .unwrap()
            .iter()
            .map(|(name, var)| {
                let values = var
                    .as_tensor()
                    .flatten_all()
                    .unwrap()
                    .to_vec1::<f64>()
                    .unwrap();
                (name.clone(), values)
            })
            .collect()
    }

    fn pair() -> NetworkPair {
        let config = MlpConfig::new(vec![3, 8, 2], HeadActivation::Tanh);
        NetworkPair::new(&config, &config, "policy", "target_policy", &Device::Cpu).unwrap()
    }

    #[test]
    fn test_structural_mismatch_is_rejected() {
        let online = MlpConfig::new(vec![3, 8, 2], HeadActivation::Tanh);
        let target = MlpConfig::new(vec![3, 16, 2], HeadActivation::Tanh);

        let result = NetworkPair::new(&online, &target, "policy", "target_policy", &Device::Cpu);
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ConfigError>(),
            Some(ConfigError::TargetMismatch { .. })
        ));
    }

    #[test]
    fn test_target_starts_as_exact_copy() {
        let pair = pair();
        assert_eq!(values(pair.online_parameters()), values(pair.target_parameters()));
    }

    #[test]
    fn test_smooth_with_coefficient_one_copies_online() -> candle_core::Result<()> {
        let pair = pair();

        // Drift the online side so the two parameter sets differ.
        for var in pair.online_parameters().all_vars() {
            let shifted = (var.as_tensor() + 1.5)?;
            var.set(&shifted)?;
        }
        assert_ne!(values(pair.online_parameters()), values(pair.target_parameters()));

        pair.smooth(1.0)?;
        assert_eq!(values(pair.online_parameters()), values(pair.target_parameters()));
        Ok(())
    }

    #[test]
    fn test_smooth_with_coefficient_zero_is_identity() -> candle_core::Result<()> {
        let pair = pair();
        for var in pair.online_parameters().all_vars() {
            let shifted = (var.as_tensor() * 3.0)?;
            var.set(&shifted)?;
        }

        let before = values(pair.target_parameters());
        pair.smooth(0.0)?;
        assert_eq!(values(pair.target_parameters()), before);
        Ok(())
    }

    #[test]
    fn test_smooth_blends_elementwise() -> candle_core::Result<()> {
        let pair = pair();
        for var in pair.online_parameters().all_vars() {
            var.set(&Tensor::ones_like(var.as_tensor())?)?;
        }
        for var in pair.target_parameters().all_vars() {
            var.set(&Tensor::zeros_like(var.as_tensor())?)?;
        }

        pair.smooth(0.25)?;
        for parameters in values(pair.target_parameters()).values() {
            for value in parameters {
                assert!((value - 0.25).abs() < 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_model_set_lookup() {
        let set = ModelSet::actor_critic(3, 1, 8, 8);
        assert!(set.get("policy").is_ok());
        assert!(set.get("target_critic").is_ok());
        assert!(matches!(
            set.get("value"),
            Err(ConfigError::MissingModel(_))
        ));
    }

    #[test]
    fn test_check_io() {
        let critic = MlpConfig::new(vec![4, 8, 8, 1], HeadActivation::Linear);
        assert!(critic.check_io("critic", 4, 1).is_ok());
        assert!(critic.check_io("critic", 3, 1).is_err());

        let wide = MlpConfig::new(vec![4, 8, 8, 2], HeadActivation::Linear);
        assert!(matches!(
            wide.check_io("critic", 4, 1),
            Err(ConfigError::WrongModelShape { .. })
        ));
    }
}

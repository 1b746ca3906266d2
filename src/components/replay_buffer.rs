use {
    candle_core::{
        Result,
        Tensor,
    },
    rand::{
        distributions::Uniform,
        thread_rng,
        Rng,
    },
    std::collections::VecDeque,
    unzip_n::unzip_n,
};

unzip_n!(5);

/// A transition in the replay buffer.
///
/// # Fields
///
/// * `state` - The state tensor.
/// * `action` - The action tensor.
/// * `reward` - The reward tensor.
/// * `next_state` - The next state tensor.
/// * `done` - Whether `next_state` is terminal, as a 0.0 / 1.0 tensor.
#[derive(Clone)]
pub struct Transition {
    state: Tensor,
    action: Tensor,
    reward: Tensor,
    next_state: Tensor,
    done: Tensor,
}
impl Transition {
    fn new(
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) -> Self {
        Self {
            state: state.clone(),
            action: action.clone(),
            reward: reward.clone(),
            next_state: next_state.clone(),
            done: done.clone(),
        }
    }
}

/// A uniformly sampled batch of transitions, all fields index-aligned: the
/// i-th row of every field belongs to the same transition.
pub struct TransitionBatch {
    pub states: Tensor,
    pub actions: Tensor,
    pub rewards: Tensor,
    pub next_states: Tensor,
    pub dones: Tensor,
}

/// A replay buffer for off-policy algorithms.
///
/// The replay buffer is implemented as a simple ring buffer / VecDeque.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    size: usize,
}
impl ReplayBuffer {
    /// Create a new replay buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            size: 0,
        }
    }

    /// The number of stored transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    /// Push a transition into the buffer.
    ///
    /// If the buffer is full, the oldest transition is removed to make room
    /// for the new transition.
    pub fn push(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) {
        if self.size == self.capacity {
            self.buffer.pop_front();
        } else {
            self.size += 1;
        }
        self.buffer.push_back(Transition::new(
            state, action, reward, next_state, done,
        ));
    }

    /// Sample a random batch of transitions from the buffer.
    ///
    /// When the size of the buffer is less than the batch size, `None` is
    /// returned: the caller treats this as "not enough experience yet", not
    /// as an error.
    pub fn random_batch(
        &self,
        batch_size: usize,
    ) -> Result<Option<TransitionBatch>> {
        if self.size < batch_size {
            Ok(None)
        } else {
            let transition_to_tuple =
                |t: &Transition| -> Result<(Tensor, Tensor, Tensor, Tensor, Tensor)> {
                    Ok((
                        t.state.unsqueeze(0)?,
                        t.action.unsqueeze(0)?,
                        t.reward.unsqueeze(0)?,
                        t.next_state.unsqueeze(0)?,
                        t.done.unsqueeze(0)?,
                    ))
                };

            let transitions: Vec<&Transition> = thread_rng()
                .sample_iter(Uniform::from(0..self.size))
                .take(batch_size)
                .map(|i| self.buffer.get(i).unwrap())
                .collect();

            let (states, actions, rewards, next_states, dones) = transitions
                .into_iter()
                .map(transition_to_tuple)
                .collect::<Result<Vec<(Tensor, Tensor, Tensor, Tensor, Tensor)>>>()?
                .into_iter()
                .unzip_n_vec();

            Ok(Some(TransitionBatch {
                states: Tensor::cat(&states, 0)?,
                actions: Tensor::cat(&actions, 0)?,
                rewards: Tensor::cat(&rewards, 0)?,
                next_states: Tensor::cat(&next_states, 0)?,
                dones: Tensor::cat(&dones, 0)?,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn transition(
        value: f64,
        device: &Device,
    ) -> (Tensor, Tensor, Tensor, Tensor, Tensor) {
        (
            Tensor::new(vec![value, value], device).unwrap(),
            Tensor::new(vec![value], device).unwrap(),
            Tensor::new(vec![value], device).unwrap(),
            Tensor::new(vec![value + 1.0, value + 1.0], device).unwrap(),
            Tensor::new(vec![0.0f64], device).unwrap(),
        )
    }

    #[test]
    fn test_insufficient_data_returns_none() -> Result<()> {
        let device = Device::Cpu;
        let mut buffer = ReplayBuffer::new(10);

        assert!(buffer.random_batch(1)?.is_none());

        let (s, a, r, s2, d) = transition(0.0, &device);
        buffer.push(&s, &a, &r, &s2, &d);
        assert!(buffer.random_batch(2)?.is_none());
        assert!(buffer.random_batch(1)?.is_some());
        Ok(())
    }

    #[test]
    fn test_batch_shapes_are_aligned() -> Result<()> {
        let device = Device::Cpu;
        let mut buffer = ReplayBuffer::new(10);
        for i in 0..5 {
            let (s, a, r, s2, d) = transition(i as f64, &device);
            buffer.push(&s, &a, &r, &s2, &d);
        }

        let batch = buffer.random_batch(4)?.unwrap();
        assert_eq!(batch.states.dims(), &[4, 2]);
        assert_eq!(batch.actions.dims(), &[4, 1]);
        assert_eq!(batch.rewards.dims(), &[4, 1]);
        assert_eq!(batch.next_states.dims(), &[4, 2]);
        assert_eq!(batch.dones.dims(), &[4, 1]);
        Ok(())
    }

    #[test]
    fn test_capacity_evicts_oldest() -> Result<()> {
        let device = Device::Cpu;
        let mut buffer = ReplayBuffer::new(3);
        for i in 0..5 {
            let (s, a, r, s2, d) = transition(i as f64, &device);
            buffer.push(&s, &a, &r, &s2, &d);
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());

        // Only the three most recent rewards (2, 3, 4) can still be sampled.
        let batch = buffer.random_batch(3)?.unwrap();
        for reward in batch.rewards.flatten_all()?.to_vec1::<f64>()? {
            assert!(reward >= 2.0);
        }
        Ok(())
    }
}

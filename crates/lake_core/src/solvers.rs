use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Explicit (forward) Euler stepper.
/// No step-size control: the caller picks dt small enough for the system at hand.
pub struct ForwardEuler<T: Scalar> {
    rate: Vec<T>,
}

impl<T: Scalar> ForwardEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            rate: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for ForwardEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        // y_next = y + dt * f(t, y)
        system.apply(*t, state, &mut self.rate);
        for i in 0..state.len() {
            state[i] = state[i] + dt * self.rate[i];
        }
        *t = *t + dt;
    }
}

#[cfg(test)]
mod tests {
    use super::ForwardEuler;
    use crate::traits::{DynamicalSystem, Steppable};

    struct Decay {
        rate: f64,
    }

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -self.rate * x[0];
        }
    }

    #[test]
    fn forward_euler_matches_hand_computed_steps() {
        let system = Decay { rate: 2.0 };
        let mut stepper: ForwardEuler<f64> = ForwardEuler::new(system.dimension());
        let mut t = 0.0;
        let mut state = vec![1.0];

        stepper.step(&system, &mut t, &mut state, 0.1);
        assert!((state[0] - 0.8).abs() < 1e-15);
        stepper.step(&system, &mut t, &mut state, 0.1);
        assert!((state[0] - 0.64).abs() < 1e-15);
        assert!((t - 0.2).abs() < 1e-15);
    }

    #[test]
    fn forward_euler_leaves_fixed_point_untouched() {
        let system = Decay { rate: 0.5 };
        let mut stepper: ForwardEuler<f64> = ForwardEuler::new(1);
        let mut t = 0.0;
        let mut state = vec![0.0];
        for _ in 0..100 {
            stepper.step(&system, &mut t, &mut state, 0.01);
        }
        assert_eq!(state[0], 0.0);
    }
}

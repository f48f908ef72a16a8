// Every backend records the emitted program in a `Program` field and only
// differs in how it solves it, so the emitting half is forwarded wholesale.
macro_rules! forward_model_sink {
    ($backend:ty) => {
        impl crate::ModelSink for $backend {
            fn new_binary_variable(
                &mut self,
                key: crate::VarKey,
            ) -> Result<crate::Var, crate::ModelError> {
                crate::ModelSink::new_binary_variable(&mut self.program, key)
            }

            fn add_less_equal(
                &mut self,
                key: crate::ConstraintKey,
                terms: crate::Terms,
                bound: f64,
            ) -> Result<crate::ConstraintId, crate::ModelError> {
                crate::ModelSink::add_less_equal(&mut self.program, key, terms, bound)
            }

            fn add_equal(
                &mut self,
                key: crate::ConstraintKey,
                terms: crate::Terms,
                bound: f64,
            ) -> Result<crate::ConstraintId, crate::ModelError> {
                crate::ModelSink::add_equal(&mut self.program, key, terms, bound)
            }

            fn set_objective_maximize(
                &mut self,
                terms: crate::Terms,
            ) -> Result<(), crate::ModelError> {
                crate::ModelSink::set_objective_maximize(&mut self.program, terms)
            }
        }
    };
}

/// Exhaustive reference implementation for small programs
pub mod brute_force;

/// Implementation using the microlp branch-and-bound MILP solver
#[cfg(feature = "microlp")]
pub mod microlp;

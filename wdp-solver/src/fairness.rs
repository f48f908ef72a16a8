use crate::{ConstraintKey, Instance, Model, ModelError, ModelSink, Terms, model::accumulate};
use tracing::{Level, event};

/// Cap every fairness group of `instance` at its density cap.
///
/// For each group `g` this adds `Σ_{(b, r) ∈ g} sat(b, r) <= floor(T * fairness_const)`,
/// reusing the satisfaction variables recorded in `model`. Returns the number of
/// constraints added.
pub fn add_fairness_constraints(
    instance: &Instance,
    model: &Model,
    sink: &mut impl ModelSink,
) -> Result<usize, ModelError> {
    let cap = instance.cap() as f64;

    for (group_id, group) in instance.groups().iter().enumerate() {
        let mut terms = Terms::default();
        for &(bid, request) in group.pairs() {
            let sat = model
                .sat(bid, request)
                .ok_or(ModelError::UnknownPair { bid, request })?;
            accumulate(&mut terms, sat, 1.0);
        }
        sink.add_less_equal(ConstraintKey::Fairness(group_id), terms, cap)?;
    }

    event!(
        Level::DEBUG,
        groups = instance.groups().len(),
        cap = instance.cap(),
        horizon = instance.horizon(),
        "added fairness constraints"
    );

    Ok(instance.groups().len())
}

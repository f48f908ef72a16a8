use crate::{
    BidId, ConstraintKey, Instance, Item, Map, ModelError, ModelSink, RequestId, Terms, Var,
    VarKey, add_fairness_constraints,
};
use tracing::{Level, event, instrument};

/// Counts of what the builder emitted, per variable and constraint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelStats {
    /// One per (item, bid) pair where the bid references the item
    pub assign_variables: usize,
    /// One per (bid, request) pair
    pub sat_variables: usize,
    /// One per referenced item
    pub item_constraints: usize,
    /// One per (bid, request) pair
    pub request_constraints: usize,
    /// One per bid
    pub bid_constraints: usize,
    /// One per fairness group, if fairness is enabled
    pub fairness_constraints: usize,
}

impl ModelStats {
    /// The total number of variables
    pub fn variables(&self) -> usize {
        self.assign_variables + self.sat_variables
    }

    /// The total number of constraints
    pub fn constraints(&self) -> usize {
        self.item_constraints
            + self.request_constraints
            + self.bid_constraints
            + self.fairness_constraints
    }
}

/// The handles needed to read a solution back out of a backend.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) sat: Map<(BidId, RequestId), Var>,
    pub(crate) stats: ModelStats,
}

impl Model {
    /// The satisfaction variable of a (bid, request) pair
    pub fn sat(&self, bid: BidId, request: RequestId) -> Option<Var> {
        self.sat.get(&(bid, request)).copied()
    }

    /// What was emitted
    pub fn stats(&self) -> ModelStats {
        self.stats
    }
}

// Coefficients for a repeated variable accumulate rather than overwrite
pub(crate) fn accumulate(terms: &mut Terms, var: Var, coef: f64) {
    *terms.entry(var).or_default() += coef;
}

/// Emit the winner determination program for `instance` into `sink`.
///
/// The program has an assignment variable for every (item, bid) pair the bid
/// references and a satisfaction variable for every (bid, request) pair, with:
///
/// * item capacity: `Σ_b assign(i, b) <= 1` for every referenced item,
/// * request satisfiability: `|r| sat(b, r) <= Σ_{i ∈ r} assign(i, b)`,
/// * bid exclusivity: `Σ_r sat(b, r) <= 1`,
/// * fairness (when `fairness` is set): `Σ_{(b, r) ∈ g} sat(b, r) <= cap` per group,
///
/// and maximizes `Σ utility(b, r) sat(b, r)`.
///
/// Satisfiability is one-directional: nothing forces `sat` up when every item
/// is assigned. The objective does that, since utilities are non-negative.
#[instrument(level = "debug", skip_all, fields(bids = instance.bids().len(), fairness = fairness))]
pub fn build_model(
    instance: &Instance,
    sink: &mut impl ModelSink,
    fairness: bool,
) -> Result<Model, ModelError> {
    let mut model = Model::default();

    // 1. Assignment variables, remembering which bids claim each item
    let mut claims = Map::<Item, Vec<Var>>::default();
    for (bid_id, bid) in instance.bids().iter().enumerate() {
        for item in bid.items() {
            let var = sink.new_binary_variable(VarKey::Assign { item, bid: bid_id })?;
            model.stats.assign_variables += 1;
            claims.entry(item).or_default().push(var);
        }
    }

    // 2. Each item goes to at most one bid
    for (item, vars) in claims {
        let mut terms = Terms::default();
        for var in vars {
            accumulate(&mut terms, var, 1.0);
        }
        sink.add_less_equal(ConstraintKey::Item(item), terms, 1.0)?;
        model.stats.item_constraints += 1;
    }

    // 3. Per bid, the satisfaction variables and their constraints
    for (bid_id, bid) in instance.bids().iter().enumerate() {
        let mut exclusive = Terms::default();

        for (request_id, request) in bid.requests().iter().enumerate() {
            let sat = sink.new_binary_variable(VarKey::Sat {
                bid: bid_id,
                request: request_id,
            })?;
            model.stats.sat_variables += 1;
            model.sat.insert((bid_id, request_id), sat);

            // The assignment variables already exist, so these lookups return
            // the handles created in step 1.
            let mut terms = Terms::default();
            accumulate(&mut terms, sat, request.items().len() as f64);
            for &item in request.items() {
                let assign = sink.new_binary_variable(VarKey::Assign { item, bid: bid_id })?;
                accumulate(&mut terms, assign, -1.0);
            }
            sink.add_less_equal(
                ConstraintKey::Request {
                    bid: bid_id,
                    request: request_id,
                },
                terms,
                0.0,
            )?;
            model.stats.request_constraints += 1;

            accumulate(&mut exclusive, sat, 1.0);
        }

        sink.add_less_equal(ConstraintKey::Bid(bid_id), exclusive, 1.0)?;
        model.stats.bid_constraints += 1;
    }

    // 4. Fairness caps
    if fairness {
        model.stats.fairness_constraints = add_fairness_constraints(instance, &model, sink)?;
    }

    // 5. Maximize the utility of the satisfied requests
    let mut objective = Terms::default();
    for (bid_id, request_id, utility) in instance.pairs() {
        let sat = model
            .sat(bid_id, request_id)
            .ok_or(ModelError::UnknownPair {
                bid: bid_id,
                request: request_id,
            })?;
        accumulate(&mut objective, sat, utility as f64);
    }
    sink.set_objective_maximize(objective)?;

    event!(
        Level::DEBUG,
        variables = model.stats.variables(),
        constraints = model.stats.constraints(),
        items = model.stats.item_constraints,
        "built winner determination program"
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bid, Fairness, Program, Request, Sense};

    fn instance() -> Instance {
        let bids = vec![
            Bid::new([
                Request::new([1u64, 2], 10).unwrap(),
                Request::new([2u64, 3], 6).unwrap(),
            ]),
            Bid::new([Request::new([2u64, 3], 5).unwrap()]),
            Bid::new([]),
        ];
        let fairness = Fairness {
            horizon: 10,
            groups: vec![[(0, 1), (1, 0)].into_iter().collect()],
        };
        Instance::new(bids, fairness, 0.15).unwrap()
    }

    #[test]
    fn test_counts() {
        let mut program = Program::new();
        let model = build_model(&instance(), &mut program, true).unwrap();
        let stats = model.stats();

        // bid 0 references items 1, 2, 3 once each despite two requests
        assert_eq!(stats.assign_variables, 5);
        assert_eq!(stats.sat_variables, 3);
        assert_eq!(stats.item_constraints, 3);
        assert_eq!(stats.request_constraints, 3);
        assert_eq!(stats.bid_constraints, 3);
        assert_eq!(stats.fairness_constraints, 1);

        assert_eq!(program.num_variables(), stats.variables());
        assert_eq!(program.num_constraints(), stats.constraints());
    }

    #[test]
    fn test_fairness_disabled() {
        let mut program = Program::new();
        let model = build_model(&instance(), &mut program, false).unwrap();
        assert_eq!(model.stats().fairness_constraints, 0);
        assert!(
            program
                .constraints()
                .iter()
                .all(|c| !matches!(c.key, ConstraintKey::Fairness(_)))
        );
    }

    #[test]
    fn test_request_constraint_shape() {
        let mut program = Program::new();
        build_model(&instance(), &mut program, false).unwrap();

        let constraint = program
            .constraints()
            .iter()
            .find(|c| c.key == ConstraintKey::Request { bid: 0, request: 1 })
            .unwrap();
        let sat = program
            .variable(&VarKey::Sat { bid: 0, request: 1 })
            .unwrap();
        let assign = program
            .variable(&VarKey::Assign {
                item: Item(3),
                bid: 0,
            })
            .unwrap();

        assert_eq!(constraint.sense, Sense::LessEqual);
        assert_eq!(constraint.bound, 0.0);
        assert_eq!(constraint.terms[&sat], 2.0);
        assert_eq!(constraint.terms[&assign], -1.0);
    }

    #[test]
    fn test_shared_item_capacity() {
        let mut program = Program::new();
        build_model(&instance(), &mut program, false).unwrap();

        let constraint = program
            .constraints()
            .iter()
            .find(|c| c.key == ConstraintKey::Item(Item(2)))
            .unwrap();
        assert_eq!(constraint.terms.len(), 2);
        assert_eq!(constraint.bound, 1.0);
    }

    #[test]
    fn test_objective_uses_request_utility() {
        let mut program = Program::new();
        let model = build_model(&instance(), &mut program, false).unwrap();

        let objective = program.objective();
        assert_eq!(objective[&model.sat(0, 0).unwrap()], 10.0);
        assert_eq!(objective[&model.sat(0, 1).unwrap()], 6.0);
        assert_eq!(objective[&model.sat(1, 0).unwrap()], 5.0);
    }

    #[test]
    fn test_empty_instance() {
        let mut program = Program::new();
        let model = build_model(&Instance::without_fairness(Vec::new()), &mut program, true)
            .unwrap();
        assert_eq!(model.stats(), ModelStats::default());
        assert_eq!(program.num_variables(), 0);
        assert!(program.objective().is_empty());
    }
}

use crate::{BidId, Item, Map, RequestId, Set, SolveStatus};
use std::{fmt, time::Duration};

/// A handle to a binary decision variable
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Var(pub(crate) usize);

impl Var {
    /// The canonical column index of this variable
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A handle to a registered constraint
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConstraintId(pub(crate) usize);

/// The logical identity of a decision variable.
///
/// Backends use this as the deduplication key, so touching the same key twice
/// always yields the same [`Var`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum VarKey {
    /// `item` is allocated to `bid`
    Assign {
        /// The item
        item: Item,
        /// The bid claiming it
        bid: BidId,
    },
    /// `request` of `bid` is satisfied
    Sat {
        /// The bid
        bid: BidId,
        /// The request within the bid
        request: RequestId,
    },
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Assign { item, bid } => write!(f, "assign_b{bid}_i{item}"),
            Self::Sat { bid, request } => write!(f, "sat_b{bid}_r{request}"),
        }
    }
}

/// The logical identity of a constraint, one variant per constraint family.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConstraintKey {
    /// At most one bid holds the item
    Item(Item),
    /// A request is only satisfied if all its items are assigned to its bid
    Request {
        /// The bid
        bid: BidId,
        /// The request within the bid
        request: RequestId,
    },
    /// At most one request of the bid is satisfied
    Bid(BidId),
    /// A fairness group stays within the density cap
    Fairness(usize),
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Item(item) => write!(f, "item_i{item}"),
            Self::Request { bid, request } => write!(f, "request_b{bid}_r{request}"),
            Self::Bid(bid) => write!(f, "bid_b{bid}"),
            Self::Fairness(group) => write!(f, "fairness_g{group}"),
        }
    }
}

/// A sparse linear expression, keyed by variable
pub type Terms = Map<Var, f64>;

/// The relation between a constraint's left-hand side and its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `lhs <= bound`
    LessEqual,
    /// `lhs == bound`
    Equal,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LessEqual => write!(f, "<="),
            Self::Equal => write!(f, "="),
        }
    }
}

/// A linear constraint over binary variables
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// The constraint's identity
    pub key: ConstraintKey,
    /// The left-hand side
    pub terms: Terms,
    /// The relation
    pub sense: Sense,
    /// The right-hand side
    pub bound: f64,
}

impl Constraint {
    /// Whether the 0/1 assignment `values` (indexed by column) satisfies this constraint
    pub fn holds(&self, values: &[bool]) -> bool {
        let lhs = self
            .terms
            .iter()
            .filter(|(var, _)| values.get(var.0).copied().unwrap_or(false))
            .map(|(_, coef)| coef)
            .sum::<f64>();
        match self.sense {
            Sense::LessEqual => lhs <= self.bound + TOLERANCE,
            Sense::Equal => (lhs - self.bound).abs() <= TOLERANCE,
        }
    }
}

/// Slack allowed when checking a floating point constraint
pub(crate) const TOLERANCE: f64 = 1e-9;

/// Errors raised while emitting a program or handing it to a backend
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A constraint or objective referenced a handle this program never issued
    #[error("variable handle {0:?} does not belong to this program")]
    UnknownVariable(Var),

    /// A fairness group pair had no satisfaction variable
    #[error("no satisfaction variable exists for bid {bid}, request {request}")]
    UnknownPair {
        /// The bid
        bid: BidId,
        /// The request within the bid
        request: RequestId,
    },

    /// The program is too large for the backend
    #[error("the program has {variables} variables, exceeding the backend limit of {limit}")]
    TooLarge {
        /// The number of variables in the program
        variables: usize,
        /// The backend's limit
        limit: usize,
    },

    /// The backend reported a failure of its own
    #[error("backend failure: {0}")]
    Backend(String),

    /// The solver thread could not be started or died without a result
    #[error("solve task failed: {0}")]
    Join(String),
}

/// The emitting half of the optimization backend contract.
///
/// The model builder and the fairness generator only ever talk to this trait.
pub trait ModelSink {
    /// Create (or look up) the binary variable identified by `key`
    fn new_binary_variable(&mut self, key: VarKey) -> Result<Var, ModelError>;

    /// Register `terms <= bound`
    fn add_less_equal(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        bound: f64,
    ) -> Result<ConstraintId, ModelError>;

    /// Register `terms == bound`
    fn add_equal(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        bound: f64,
    ) -> Result<ConstraintId, ModelError>;

    /// Replace the objective with `maximize terms`
    fn set_objective_maximize(&mut self, terms: Terms) -> Result<(), ModelError>;
}

/// An optimization backend: something that accepts a binary program and solves it.
///
/// Implementations may use any algorithm (and any number of threads) internally.
pub trait Backend: ModelSink {
    /// Solve the emitted program, giving up after `timeout` if one is provided.
    ///
    /// On timeout a backend should keep its best incumbent, if it has one, and
    /// report [`SolveStatus::TimedOut`].
    fn solve(
        &mut self,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<SolveStatus, ModelError>> + Send;

    /// The 0/1 value of `var` in the incumbent, if one exists
    fn value_of(&self, var: Var) -> Option<bool>;

    /// The program that was emitted into this backend
    fn program(&self) -> &Program;
}

/// A recorded binary program.
///
/// This is the in-memory form every backend builds from. It owns the key to
/// handle mapping, which is what makes variable creation idempotent.
#[derive(Debug, Clone, Default)]
pub struct Program {
    variables: Set<VarKey>,
    constraints: Vec<Constraint>,
    objective: Terms,
}

impl Program {
    /// An empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// The number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The variables with their keys, in column order
    pub fn variables(&self) -> impl Iterator<Item = (Var, &VarKey)> {
        self.variables.iter().enumerate().map(|(i, key)| (Var(i), key))
    }

    /// Look up the handle for `key` without creating it
    pub fn variable(&self, key: &VarKey) -> Option<Var> {
        self.variables.get_index_of(key).map(Var)
    }

    /// The key of a variable handle
    pub fn key(&self, var: Var) -> Option<&VarKey> {
        self.variables.get_index(var.0)
    }

    /// The constraints, in registration order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Look up a registered constraint
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.0)
    }

    /// The objective (always maximized)
    pub fn objective(&self) -> &Terms {
        &self.objective
    }

    /// The objective value of the 0/1 assignment `values`
    pub fn evaluate(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .filter(|(var, _)| values.get(var.0).copied().unwrap_or(false))
            .map(|(_, coef)| coef)
            .sum()
    }

    /// Whether `values` satisfies every constraint
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        self.constraints.iter().all(|c| c.holds(values))
    }

    /// Render a constraint as a readable equation, e.g. `2 sat_b0_r0 - assign_b0_i1 - assign_b0_i2 <= 0`
    pub fn render_constraint(&self, id: ConstraintId) -> Option<String> {
        let constraint = self.constraint(id)?;
        Some(format!(
            "{}: {} {} {}",
            constraint.key,
            self.linear(&constraint.terms),
            constraint.sense,
            constraint.bound
        ))
    }

    /// A displayable form of a linear expression over this program's variables
    pub fn linear<'a>(&'a self, terms: &'a Terms) -> Linear<'a> {
        Linear {
            program: self,
            terms,
        }
    }

    fn check(&self, terms: &Terms) -> Result<(), ModelError> {
        match terms.keys().find(|var| var.0 >= self.variables.len()) {
            Some(var) => Err(ModelError::UnknownVariable(*var)),
            None => Ok(()),
        }
    }

    fn push(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        sense: Sense,
        bound: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.check(&terms)?;
        self.constraints.push(Constraint {
            key,
            terms,
            sense,
            bound,
        });
        Ok(ConstraintId(self.constraints.len() - 1))
    }
}

impl ModelSink for Program {
    fn new_binary_variable(&mut self, key: VarKey) -> Result<Var, ModelError> {
        let (index, _) = self.variables.insert_full(key);
        Ok(Var(index))
    }

    fn add_less_equal(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        bound: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.push(key, terms, Sense::LessEqual, bound)
    }

    fn add_equal(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        bound: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.push(key, terms, Sense::Equal, bound)
    }

    fn set_objective_maximize(&mut self, terms: Terms) -> Result<(), ModelError> {
        self.check(&terms)?;
        self.objective = terms;
        Ok(())
    }
}

/// A linear expression rendered with variable names, as in `2 x - y + 3 z`
pub struct Linear<'a> {
    program: &'a Program,
    terms: &'a Terms,
}

impl fmt::Display for Linear<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }

        for (i, (var, &coef)) in self.terms.iter().enumerate() {
            let sign = if coef < 0.0 { "-" } else { "+" };
            let magnitude = coef.abs();

            if i == 0 {
                if coef < 0.0 {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {sign} ")?;
            }

            if magnitude != 1.0 {
                write!(f, "{magnitude} ")?;
            }

            match self.program.key(*var) {
                Some(key) => write!(f, "{key}")?,
                None => write!(f, "x{}", var.0)?,
            }
        }
        Ok(())
    }
}

//! Linear expressions over decision variables, and the table of named quantities.
//!
//! A quantity is a named family of [`Expression`]s over a fixed index domain: (zone, timepoint),
//! timepoint or period. Parameters are expressions with only a constant; decision variables and
//! sums of them have terms. Modules define quantities in the [`QuantityTable`] and register their
//! names with the [`ComponentRegistry`](crate::registry::ComponentRegistry).
use crate::error::ModelError;
use crate::registry::ComponentID;
use crate::timescale::{PeriodID, TimepointID};
use crate::zone::ZoneID;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A decision variable in the optimisation.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

impl Variable {
    /// The index of the column in the problem
    pub fn index(self) -> usize {
        self.0
    }
}

/// The definition of a decision variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    /// A human-readable name, for debugging
    pub name: String,
    /// The variable's minimum value
    pub min: f64,
    /// The variable's maximum value
    pub max: f64,
}

/// All the decision variables in a problem
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VariableSet(Vec<VariableDefinition>);

impl VariableSet {
    /// Add a new variable with the given bounds
    pub fn add(&mut self, name: String, min: f64, max: f64) -> Variable {
        self.0.push(VariableDefinition { name, min, max });
        Variable(self.0.len() - 1)
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no variables
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the variables and their definitions, in column order
    pub fn iter(&self) -> impl Iterator<Item = (Variable, &VariableDefinition)> {
        self.0.iter().enumerate().map(|(i, def)| (Variable(i), def))
    }
}

/// An affine expression: a sum of variables with coefficients, plus a constant.
///
/// Terms are kept sorted by variable, so two expressions built from the same terms in a different
/// order compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    terms: BTreeMap<Variable, f64>,
    constant: f64,
}

impl Expression {
    /// An expression with no terms and the given constant value
    pub fn constant(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// An expression with a single term
    pub fn term(var: Variable, coefficient: f64) -> Self {
        let mut expr = Self::default();
        expr.add_term(var, coefficient);
        expr
    }

    /// Add `coefficient * var` to the expression
    pub fn add_term(&mut self, var: Variable, coefficient: f64) {
        *self.terms.entry(var).or_insert(0.0) += coefficient;
    }

    /// The constant part of the expression
    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    /// Iterate over the variable terms, ordered by variable
    pub fn iter_terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms.iter().map(|(var, coeff)| (*var, *coeff))
    }

    /// Multiply every term and the constant by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(var, coeff)| (*var, coeff * factor))
                .collect(),
            constant: self.constant * factor,
        }
    }

    /// Evaluate the expression for the given variable values (indexed by column)
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coeff)| coeff * values[var.index()])
                .sum::<f64>()
    }
}

impl From<Variable> for Expression {
    fn from(var: Variable) -> Self {
        Self::term(var, 1.0)
    }
}

impl AddAssign<&Expression> for Expression {
    fn add_assign(&mut self, rhs: &Expression) {
        for (var, coeff) in &rhs.terms {
            self.add_term(*var, *coeff);
        }
        self.constant += rhs.constant;
    }
}

impl Add<&Expression> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: &Expression) -> Expression {
        self += rhs;
        self
    }
}

impl Sub<&Expression> for Expression {
    type Output = Expression;

    fn sub(mut self, rhs: &Expression) -> Expression {
        self += &rhs.scaled(-1.0);
        self
    }
}

impl Mul<f64> for &Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        self.scaled(rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.scaled(-1.0)
    }
}

impl<'a> std::iter::Sum<&'a Expression> for Expression {
    fn sum<I: Iterator<Item = &'a Expression>>(iter: I) -> Self {
        iter.fold(Expression::default(), |acc, expr| acc + expr)
    }
}

impl std::iter::Sum for Expression {
    fn sum<I: Iterator<Item = Expression>>(iter: I) -> Self {
        iter.fold(Expression::default(), |acc, expr| acc + &expr)
    }
}

/// A quantity indexed by (zone, timepoint), in MW
pub type ZoneTimepointQuantity = IndexMap<(ZoneID, TimepointID), Expression>;

/// A quantity indexed by timepoint (e.g. a cost in $/hour)
pub type TimepointQuantity = IndexMap<TimepointID, Expression>;

/// A quantity indexed by period (e.g. a cost in $/year)
pub type PeriodQuantity = IndexMap<PeriodID, Expression>;

/// The named quantities defined by the modules of a model
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuantityTable {
    zone_timepoint: IndexMap<ComponentID, ZoneTimepointQuantity>,
    timepoint: IndexMap<ComponentID, TimepointQuantity>,
    period: IndexMap<ComponentID, PeriodQuantity>,
}

/// Insert a quantity into `map`, failing if its name is already used anywhere in the table
macro_rules! define_quantity_method {
    ($name:ident, $field:ident, $ty:ty) => {
        #[doc = concat!("Define a new quantity of type [`", stringify!($ty), "`]")]
        pub fn $name(&mut self, id: ComponentID, quantity: $ty) -> Result<(), ModelError> {
            if self.contains(&id) {
                return Err(ModelError::DuplicateQuantity(id.to_string()));
            }

            self.$field.insert(id, quantity);
            Ok(())
        }
    };
}

impl QuantityTable {
    define_quantity_method!(define_zone_timepoint, zone_timepoint, ZoneTimepointQuantity);
    define_quantity_method!(define_timepoint, timepoint, TimepointQuantity);
    define_quantity_method!(define_period, period, PeriodQuantity);

    /// Whether a quantity of any kind has the given name
    pub fn contains(&self, id: &ComponentID) -> bool {
        self.zone_timepoint.contains_key(id)
            || self.timepoint.contains_key(id)
            || self.period.contains_key(id)
    }

    /// Get a quantity indexed by (zone, timepoint)
    pub fn zone_timepoint(&self, id: &ComponentID) -> Option<&ZoneTimepointQuantity> {
        self.zone_timepoint.get(id)
    }

    /// Get a quantity indexed by timepoint
    pub fn timepoint(&self, id: &ComponentID) -> Option<&TimepointQuantity> {
        self.timepoint.get(id)
    }

    /// Get a quantity indexed by period
    pub fn period(&self, id: &ComponentID) -> Option<&PeriodQuantity> {
        self.period.get(id)
    }
}

/// Look up the value of a quantity at an index, reporting a missing value as [`MissingData`].
///
/// [`MissingData`]: ModelError::MissingData
pub fn lookup<'a, K, Q>(
    quantity: &'a IndexMap<K, Expression>,
    id: &ComponentID,
    index: &Q,
) -> Result<&'a Expression, ModelError>
where
    K: std::hash::Hash + Eq + std::borrow::Borrow<Q>,
    Q: std::hash::Hash + Eq + std::fmt::Debug + ?Sized,
{
    quantity
        .get(index)
        .ok_or_else(|| ModelError::missing_data(id.to_string(), format!("{index:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_variables() -> (Variable, Variable) {
        let mut vars = VariableSet::default();
        (vars.add("x".into(), 0.0, 1.0), vars.add("y".into(), 0.0, 1.0))
    }

    #[test]
    fn test_expression_arithmetic() {
        let (x, y) = two_variables();
        let expr = Expression::from(x) + &Expression::term(y, 2.0) + &Expression::constant(3.0);
        let expr = expr - &Expression::term(x, 0.5);

        assert_eq!(expr.iter_terms().collect::<Vec<_>>(), [(x, 0.5), (y, 2.0)]);
        assert_eq!(expr.constant_value(), 3.0);
        assert_eq!(expr.evaluate(&[2.0, 1.0]), 6.0);
        assert_eq!((&expr * 2.0).evaluate(&[2.0, 1.0]), 12.0);
        assert_eq!((-expr).evaluate(&[2.0, 1.0]), -6.0);
    }

    #[test]
    fn test_expression_order_independent() {
        let (x, y) = two_variables();
        let a = Expression::term(x, 1.0) + &Expression::term(y, 2.0);
        let b = Expression::term(y, 2.0) + &Expression::term(x, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_expression_sum() {
        let (x, _) = two_variables();
        let exprs = [Expression::from(x), Expression::constant(4.0)];
        let total: Expression = exprs.iter().sum();
        assert_eq!(total.evaluate(&[1.0, 0.0]), 5.0);
    }

    #[test]
    fn test_quantity_table_duplicate() {
        let mut table = QuantityTable::default();
        table
            .define_timepoint("fuel".into(), TimepointQuantity::new())
            .unwrap();

        // Names are unique across all kinds of quantity
        assert_eq!(
            table.define_period("fuel".into(), PeriodQuantity::new()),
            Err(ModelError::DuplicateQuantity("fuel".into()))
        );
        assert!(table.timepoint(&"fuel".into()).is_some());
        assert!(table.period(&"fuel".into()).is_none());
    }

    #[test]
    fn test_lookup_missing() {
        let quantity = PeriodQuantity::new();
        let err = lookup(&quantity, &"costs".into(), "2030").unwrap_err();
        assert!(matches!(err, ModelError::MissingData { .. }));
    }
}

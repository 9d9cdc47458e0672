//! Assembly of the optimisation problem from model modules.
//!
//! Building a model happens in two phases. While a [`ModelBuilder`] exists, modules define
//! decision variables, quantities and constraints and register their quantities with the shared
//! power balance and cost lists. [`ModelBuilder::finalize`] then freezes the registry and builds
//! the shared equations by summing over the lists, giving a [`ModelProblem`]. As the builder is
//! consumed by `finalize`, nothing can be registered once the shared equations exist.
use crate::cost::{SystemCosts, build_system_costs};
use crate::error::ModelError;
use crate::expression::{
    Expression, PeriodQuantity, QuantityTable, TimepointQuantity, Variable, VariableSet,
    ZoneTimepointQuantity,
};
use crate::finance::{DiscountFactors, Financials};
use crate::power_balance::{PowerBalance, build_power_balance};
use crate::registry::{Bus, BusLayout, ComponentID, ComponentRegistry, CostKind, Direction};
use crate::timescale::Timescales;
use crate::zone::ZoneID;
use anyhow::{Context, Result};
use indexmap::IndexSet;
use log::{debug, info};

/// A part of the model which adds variables, quantities and constraints to the problem.
///
/// Each module declares everything it contributes in a single call to
/// [`ModelModule::declare`]. Modules must not depend on the order in which they are declared:
/// everything that affects more than one module is fixed when the [`ModelBuilder`] is created.
pub trait ModelModule {
    /// A short name for the module, used in log and error messages
    fn name(&self) -> &'static str;

    /// Add this module's contributions to the problem
    fn declare(&self, builder: &mut ModelBuilder) -> Result<()>;
}

/// A linear constraint of the form `min <= expression <= max`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// A human-readable name, for debugging
    pub name: String,
    /// The constrained expression
    pub expression: Expression,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Constraint {
    /// A constraint requiring `lhs` and `rhs` to be equal
    pub fn equality(name: String, lhs: Expression, rhs: &Expression) -> Self {
        Self {
            name,
            expression: lhs - rhs,
            min: 0.0,
            max: 0.0,
        }
    }

    /// A constraint requiring `lhs` to be no greater than `rhs`
    pub fn less_or_equal(name: String, lhs: Expression, rhs: &Expression) -> Self {
        Self {
            name,
            expression: lhs - rhs,
            min: f64::NEG_INFINITY,
            max: 0.0,
        }
    }
}

/// Collects the contributions of model modules during the registration phase
pub struct ModelBuilder<'a> {
    timescales: &'a Timescales,
    zones: &'a IndexSet<ZoneID>,
    financials: Financials,
    variables: VariableSet,
    quantities: QuantityTable,
    registry: ComponentRegistry,
    constraints: Vec<Constraint>,
}

impl<'a> ModelBuilder<'a> {
    /// Create a new builder for the given timescales and load zones.
    ///
    /// `layout` determines whether each zone has a distributed bus as well as a central one.
    pub fn new(
        timescales: &'a Timescales,
        zones: &'a IndexSet<ZoneID>,
        financials: Financials,
        layout: BusLayout,
    ) -> Self {
        Self {
            timescales,
            zones,
            financials,
            variables: VariableSet::default(),
            quantities: QuantityTable::default(),
            registry: ComponentRegistry::new(layout),
            constraints: Vec::new(),
        }
    }

    /// Let a module add its contributions to the problem
    pub fn declare<M: ModelModule + ?Sized>(&mut self, module: &M) -> Result<()> {
        debug!("Declaring module {}", module.name());
        module
            .declare(self)
            .with_context(|| format!("Failed to declare module {}", module.name()))
    }

    /// The periods and timepoints of the model
    pub fn timescales(&self) -> &'a Timescales {
        self.timescales
    }

    /// The load zones of the model
    pub fn zones(&self) -> &'a IndexSet<ZoneID> {
        self.zones
    }

    /// The bus from which demand is withdrawn.
    ///
    /// This is the distributed bus if the model has one and the central bus otherwise.
    pub fn demand_bus(&self) -> Bus {
        if self.has_distributed_bus() {
            Bus::Distributed
        } else {
            Bus::Central
        }
    }

    /// Whether each zone has a distributed bus as well as a central one
    pub fn has_distributed_bus(&self) -> bool {
        self.registry.has_distributed_bus()
    }

    /// Add a new decision variable
    pub fn add_variable(&mut self, name: String, min: f64, max: f64) -> Variable {
        self.variables.add(name, min, max)
    }

    /// Add a constraint
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Define a quantity indexed by (zone, timepoint)
    pub fn define_zone_timepoint_quantity(
        &mut self,
        id: ComponentID,
        quantity: ZoneTimepointQuantity,
    ) -> Result<(), ModelError> {
        self.quantities.define_zone_timepoint(id, quantity)
    }

    /// Define a quantity indexed by timepoint
    pub fn define_timepoint_quantity(
        &mut self,
        id: ComponentID,
        quantity: TimepointQuantity,
    ) -> Result<(), ModelError> {
        self.quantities.define_timepoint(id, quantity)
    }

    /// Define a quantity indexed by period
    pub fn define_period_quantity(
        &mut self,
        id: ComponentID,
        quantity: PeriodQuantity,
    ) -> Result<(), ModelError> {
        self.quantities.define_period(id, quantity)
    }

    /// Register a (zone, timepoint) quantity as a power injection or withdrawal at a bus
    pub fn register_power(
        &mut self,
        bus: Bus,
        direction: Direction,
        component: ComponentID,
    ) -> Result<(), ModelError> {
        self.registry.register_power(bus, direction, component)
    }

    /// Register a quantity as a cost component
    pub fn register_cost(&mut self, kind: CostKind, component: ComponentID) -> Result<(), ModelError> {
        self.registry.register_cost(kind, component)
    }

    /// End the registration phase and build the shared equations.
    ///
    /// Fails if a registered component has no quantity of the right kind or a quantity has no
    /// value for one of its indices.
    pub fn finalize(self) -> Result<ModelProblem<'a>> {
        let mut registry = self.registry;
        registry.freeze();

        let discount_factors = DiscountFactors::new(&self.financials, self.timescales);
        let balance = build_power_balance(&registry, &self.quantities, self.zones, self.timescales)
            .context("Failed to build power balance constraints")?;
        let costs = build_system_costs(
            &registry,
            &self.quantities,
            self.timescales,
            &discount_factors,
        )
        .context("Failed to build objective function")?;

        info!(
            "Built problem with {} variables, {} power balance constraints and {} other constraints",
            self.variables.len(),
            balance.len(),
            self.constraints.len()
        );

        Ok(ModelProblem {
            timescales: self.timescales,
            zones: self.zones,
            variables: self.variables,
            quantities: self.quantities,
            registry,
            discount_factors,
            constraints: self.constraints,
            balance,
            costs,
        })
    }
}

/// A fully assembled optimisation problem, ready to be solved
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProblem<'a> {
    timescales: &'a Timescales,
    zones: &'a IndexSet<ZoneID>,
    variables: VariableSet,
    quantities: QuantityTable,
    registry: ComponentRegistry,
    discount_factors: DiscountFactors,
    constraints: Vec<Constraint>,
    balance: PowerBalance,
    costs: SystemCosts,
}

impl<'a> ModelProblem<'a> {
    /// The periods and timepoints of the model
    pub fn timescales(&self) -> &'a Timescales {
        self.timescales
    }

    /// The load zones of the model
    pub fn zones(&self) -> &'a IndexSet<ZoneID> {
        self.zones
    }

    /// The decision variables
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    /// The quantities defined by the model's modules
    pub fn quantities(&self) -> &QuantityTable {
        &self.quantities
    }

    /// The frozen registry
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The discount factors used to build the objective
    pub fn discount_factors(&self) -> &DiscountFactors {
        &self.discount_factors
    }

    /// The power balance constraints
    pub fn power_balance(&self) -> &PowerBalance {
        &self.balance
    }

    /// The system costs, which make up the objective
    pub fn costs(&self) -> &SystemCosts {
        &self.costs
    }

    /// Iterate over every constraint in the problem, starting with the power balance
    pub fn iter_constraints(&self) -> impl Iterator<Item = Constraint> + '_ {
        self.balance
            .iter()
            .map(|balance| balance.to_constraint())
            .chain(self.constraints.iter().cloned())
    }
}

//! Generation projects.
//!
//! Each project has a fixed capacity in one load zone. Dispatch in each timepoint is a decision
//! variable limited by the capacity and, for variable renewables, by the capacity factor for the
//! timepoint. Generation is injected at the central bus of the project's zone.
use crate::builder::{Constraint, ModelBuilder, ModelModule};
use crate::expression::{Expression, PeriodQuantity, TimepointQuantity, ZoneTimepointQuantity};
use crate::id::define_id_type;
use crate::registry::{Bus, CostKind, Direction};
use crate::timescale::TimepointID;
use crate::units::{Dimensionless, Money, MoneyPerCapacity, MoneyPerEnergy, Power};
use crate::zone::ZoneID;
use anyhow::{Result, bail};
use indexmap::IndexMap;

define_id_type! {GeneratorID}

/// Total generation injected at the central bus of each zone
pub const ZONE_TOTAL_GENERATION: &str = "ZoneTotalGeneration";
/// Available generation which is not dispatched in each zone
pub const ZONE_TOTAL_EXCESS_GEN: &str = "ZoneTotalExcessGen";
/// Variable O&M costs in each timepoint
pub const GEN_VARIABLE_OM_COSTS: &str = "GenVariableOMCostsInTP";
/// Fixed O&M costs in each period
pub const GEN_FIXED_OM_COSTS: &str = "GenFixedOMCosts";

/// A generation project
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// The project's ID
    pub id: GeneratorID,
    /// The zone the project is in
    pub load_zone: ZoneID,
    /// Installed capacity
    pub capacity: Power,
    /// Variable O&M cost
    pub variable_om: MoneyPerEnergy,
    /// Fixed O&M cost
    pub fixed_om: MoneyPerCapacity,
    /// Maximum capacity factor in each timepoint. Timepoints which are not listed have a maximum
    /// capacity factor of one.
    pub max_capacity_factors: IndexMap<TimepointID, Dimensionless>,
}

impl Generator {
    /// The maximum capacity factor in a timepoint
    pub fn max_capacity_factor(&self, timepoint: &TimepointID) -> Dimensionless {
        self.max_capacity_factors
            .get(timepoint)
            .copied()
            .unwrap_or(Dimensionless(1.0))
    }

    /// The maximum power output in a timepoint
    pub fn available_power(&self, timepoint: &TimepointID) -> Power {
        self.capacity * self.max_capacity_factor(timepoint)
    }
}

/// A map of generators, keyed by ID
pub type GeneratorMap = IndexMap<GeneratorID, Generator>;

/// The generation projects of a model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationProjects(GeneratorMap);

impl GenerationProjects {
    /// Create from a map of generators
    pub fn new(generators: GeneratorMap) -> Self {
        Self(generators)
    }

    /// Iterate over the generators
    pub fn iter(&self) -> indexmap::map::Values<'_, GeneratorID, Generator> {
        self.0.values()
    }

    /// Get a generator by ID
    pub fn get(&self, id: &GeneratorID) -> Option<&Generator> {
        self.0.get(id)
    }

    /// Keep only the generators for which `f` returns true
    pub fn retain(&mut self, mut f: impl FnMut(&Generator) -> bool) {
        self.0.retain(|_, generator| f(generator));
    }
}

impl ModelModule for GenerationProjects {
    fn name(&self) -> &'static str {
        "generators"
    }

    fn declare(&self, builder: &mut ModelBuilder) -> Result<()> {
        let timescales = builder.timescales();
        let zones = builder.zones();

        // Start every zone and timepoint at zero so the quantities cover the full domain
        let zero: ZoneTimepointQuantity = zones
            .iter()
            .flat_map(|zone| {
                timescales
                    .iter_timepoints()
                    .map(move |tp| ((zone.clone(), tp.id.clone()), Expression::default()))
            })
            .collect();
        let mut total_generation = zero.clone();
        let mut excess_generation = zero;
        let mut variable_costs: TimepointQuantity = timescales
            .iter_timepoints()
            .map(|tp| (tp.id.clone(), Expression::default()))
            .collect();

        for generator in self.iter() {
            for tp in timescales.iter_timepoints() {
                let available = generator.available_power(&tp.id).value();
                let dispatch = builder.add_variable(
                    format!("DispatchGen[{},{}]", generator.id, tp.id),
                    0.0,
                    f64::INFINITY,
                );
                builder.add_constraint(Constraint::less_or_equal(
                    format!("Max_Dispatch[{},{}]", generator.id, tp.id),
                    dispatch.into(),
                    &Expression::constant(available),
                ));

                let key = (generator.load_zone.clone(), tp.id.clone());
                let Some(total) = total_generation.get_mut(&key) else {
                    bail!(
                        "Generator {} is in unknown load zone {}",
                        generator.id,
                        generator.load_zone
                    );
                };
                total.add_term(dispatch, 1.0);

                // Curtailment: what could have been generated but wasn't
                let excess = &mut excess_generation[&key];
                *excess += &Expression::constant(available);
                excess.add_term(dispatch, -1.0);

                variable_costs[&tp.id].add_term(dispatch, generator.variable_om.value());
            }
        }

        let fixed_cost = self
            .iter()
            .map(|generator| generator.fixed_om * generator.capacity)
            .sum::<Money>()
            .value();
        let fixed_costs: PeriodQuantity = timescales
            .iter_periods()
            .map(|period| (period.id.clone(), Expression::constant(fixed_cost)))
            .collect();

        builder.define_zone_timepoint_quantity(ZONE_TOTAL_GENERATION.into(), total_generation)?;
        builder.register_power(
            Bus::Central,
            Direction::Injection,
            ZONE_TOTAL_GENERATION.into(),
        )?;
        builder.define_zone_timepoint_quantity(ZONE_TOTAL_EXCESS_GEN.into(), excess_generation)?;

        builder.define_timepoint_quantity(GEN_VARIABLE_OM_COSTS.into(), variable_costs)?;
        builder.register_cost(CostKind::PerTimepoint, GEN_VARIABLE_OM_COSTS.into())?;
        builder.define_period_quantity(GEN_FIXED_OM_COSTS.into(), fixed_costs)?;
        builder.register_cost(CostKind::PerPeriod, GEN_FIXED_OM_COSTS.into())?;

        Ok(())
    }
}

//! Energy balance constraints.
//!
//! For every bus in the model, every load zone and every timepoint, the sum of all registered
//! injections must equal the sum of all registered withdrawals. The central bus gives
//! `Zone_Energy_Balance` and the distributed bus, if present, gives `Distributed_Energy_Balance`.
use crate::builder::Constraint;
use crate::error::ModelError;
use crate::expression::{Expression, QuantityTable, ZoneTimepointQuantity, lookup};
use crate::registry::{Bus, ComponentID, ComponentList, ComponentRegistry, Direction};
use crate::timescale::{TimepointID, Timescales};
use crate::zone::ZoneID;
use indexmap::IndexSet;
use strum::IntoEnumIterator;

/// The balance of power at one bus, in one zone and at one timepoint
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEquation {
    /// The bus
    pub bus: Bus,
    /// The load zone
    pub zone: ZoneID,
    /// The timepoint
    pub timepoint: TimepointID,
    /// The sum of all injections
    pub injections: Expression,
    /// The sum of all withdrawals
    pub withdrawals: Expression,
}

impl BalanceEquation {
    /// The name of the equation family for this bus
    pub fn family_name(&self) -> &'static str {
        match self.bus {
            Bus::Central => "Zone_Energy_Balance",
            Bus::Distributed => "Distributed_Energy_Balance",
        }
    }

    /// Convert into a linear constraint
    pub fn to_constraint(&self) -> Constraint {
        Constraint::equality(
            format!("{}[{},{}]", self.family_name(), self.zone, self.timepoint),
            self.injections.clone(),
            &self.withdrawals,
        )
    }
}

/// The energy balance equations for every bus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerBalance(Vec<BalanceEquation>);

impl PowerBalance {
    /// The number of equations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no equations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the equations, bus by bus, then by zone and timepoint
    pub fn iter(&self) -> std::slice::Iter<'_, BalanceEquation> {
        self.0.iter()
    }

    /// Get the equation for a bus, zone and timepoint
    pub fn get(&self, bus: Bus, zone: &ZoneID, timepoint: &TimepointID) -> Option<&BalanceEquation> {
        self.0
            .iter()
            .find(|eq| eq.bus == bus && eq.zone == *zone && eq.timepoint == *timepoint)
    }
}

/// Resolve the names in a list to (zone, timepoint) quantities
fn resolve_list<'a>(
    list: &'a ComponentList,
    quantities: &'a QuantityTable,
) -> Result<Vec<(&'a ComponentID, &'a ZoneTimepointQuantity)>, ModelError> {
    list.entries()?
        .iter()
        .map(|id| {
            quantities
                .zone_timepoint(id)
                .map(|quantity| (id, quantity))
                .ok_or_else(|| ModelError::UndefinedComponent {
                    list: list.name(),
                    component: id.to_string(),
                })
        })
        .collect()
}

/// Sum the values of the resolved components at one index
fn sum_at(
    components: &[(&ComponentID, &ZoneTimepointQuantity)],
    zone: &ZoneID,
    timepoint: &TimepointID,
) -> Result<Expression, ModelError> {
    let index = (zone.clone(), timepoint.clone());
    let mut total = Expression::default();
    for (id, quantity) in components {
        total += lookup(quantity, id, &index)?;
    }

    Ok(total)
}

/// Build the energy balance equations from a frozen registry.
///
/// Every registered component must be a (zone, timepoint) quantity with a value for every zone and
/// timepoint, otherwise an error is returned.
pub fn build_power_balance(
    registry: &ComponentRegistry,
    quantities: &QuantityTable,
    zones: &IndexSet<ZoneID>,
    timescales: &Timescales,
) -> Result<PowerBalance, ModelError> {
    if !registry.is_frozen() {
        return Err(ModelError::RegistryNotFrozen("Power balance"));
    }

    let mut equations = Vec::new();
    for bus in Bus::iter() {
        let Some(lists) = registry.bus_lists(bus) else {
            continue;
        };
        let injections = resolve_list(lists.list(Direction::Injection), quantities)?;
        let withdrawals = resolve_list(lists.list(Direction::Withdrawal), quantities)?;

        for zone in zones {
            for timepoint in timescales.iter_timepoints() {
                equations.push(BalanceEquation {
                    bus,
                    zone: zone.clone(),
                    timepoint: timepoint.id.clone(),
                    injections: sum_at(&injections, zone, &timepoint.id)?,
                    withdrawals: sum_at(&withdrawals, zone, &timepoint.id)?,
                });
            }
        }
    }

    Ok(PowerBalance(equations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::VariableSet;
    use crate::fixture::timescales;
    use crate::registry::BusLayout;
    use itertools::Itertools;
    use rstest::rstest;

    /// Two injections and one withdrawal, each with a single variable or constant per index
    fn quantities(zones: &IndexSet<ZoneID>, timescales: &Timescales) -> QuantityTable {
        let mut vars = VariableSet::default();
        let mut table = QuantityTable::default();
        for name in ["gen_a", "gen_b"] {
            let quantity = zones
                .iter()
                .cartesian_product(timescales.iter_timepoints())
                .map(|(zone, tp)| {
                    let var = vars.add(format!("{name}[{zone},{}]", tp.id), 0.0, f64::INFINITY);
                    ((zone.clone(), tp.id.clone()), Expression::from(var))
                })
                .collect();
            table.define_zone_timepoint(name.into(), quantity).unwrap();
        }
        let demand = zones
            .iter()
            .cartesian_product(timescales.iter_timepoints())
            .map(|(zone, tp)| ((zone.clone(), tp.id.clone()), Expression::constant(10.0)))
            .collect();
        table.define_zone_timepoint("demand".into(), demand).unwrap();

        table
    }

    fn zones() -> IndexSet<ZoneID> {
        ["north".into(), "south".into()].into_iter().collect()
    }

    fn registry(layout: BusLayout, injections: &[&str]) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new(layout);
        for id in injections {
            registry
                .register_power(Bus::Central, Direction::Injection, (*id).into())
                .unwrap();
        }
        registry
            .register_power(Bus::Central, Direction::Withdrawal, "demand".into())
            .unwrap();
        registry.freeze();
        registry
    }

    #[rstest]
    fn test_balance_sums_registered_components(timescales: Timescales) {
        let zones = zones();
        let quantities = quantities(&zones, &timescales);
        let registry = registry(BusLayout::CentralOnly, &["gen_a", "gen_b"]);
        let balance = build_power_balance(&registry, &quantities, &zones, &timescales).unwrap();

        assert_eq!(balance.len(), zones.len() * timescales.num_timepoints());
        let eq = balance
            .get(Bus::Central, &"south".into(), &"2040_night".into())
            .unwrap();
        assert_eq!(eq.family_name(), "Zone_Energy_Balance");
        assert_eq!(eq.injections.iter_terms().count(), 2);
        assert_eq!(eq.withdrawals, Expression::constant(10.0));

        // Injections of 4 and 6 balance a withdrawal of 10
        let constraint = eq.to_constraint();
        let mut values = vec![0.0; 16];
        for (var, _) in eq.injections.iter_terms() {
            values[var.index()] = if var.index() < 8 { 4.0 } else { 6.0 };
        }
        assert_eq!(constraint.expression.evaluate(&values), 0.0);
    }

    #[rstest]
    fn test_balance_independent_of_registration_order(timescales: Timescales) {
        let zones = zones();
        let quantities = quantities(&zones, &timescales);
        let forward = build_power_balance(
            &registry(BusLayout::CentralOnly, &["gen_a", "gen_b"]),
            &quantities,
            &zones,
            &timescales,
        )
        .unwrap();
        let reverse = build_power_balance(
            &registry(BusLayout::CentralOnly, &["gen_b", "gen_a"]),
            &quantities,
            &zones,
            &timescales,
        )
        .unwrap();
        assert_eq!(forward, reverse);
    }

    #[rstest]
    fn test_distributed_bus_balance(timescales: Timescales) {
        let zones = zones();
        let quantities = quantities(&zones, &timescales);
        let mut registry = ComponentRegistry::new(BusLayout::WithDistributedBus);
        registry
            .register_power(Bus::Distributed, Direction::Injection, "gen_a".into())
            .unwrap();
        registry
            .register_power(Bus::Distributed, Direction::Withdrawal, "demand".into())
            .unwrap();
        registry.freeze();

        let balance = build_power_balance(&registry, &quantities, &zones, &timescales).unwrap();
        assert_eq!(balance.len(), 2 * zones.len() * timescales.num_timepoints());

        // The central bus has nothing registered, so its equations are trivially satisfied
        let central = balance
            .get(Bus::Central, &"north".into(), &"2030_day".into())
            .unwrap();
        assert_eq!(central.injections, Expression::default());
        assert_eq!(central.withdrawals, Expression::default());
        let distributed = balance
            .get(Bus::Distributed, &"north".into(), &"2030_day".into())
            .unwrap();
        assert_eq!(distributed.family_name(), "Distributed_Energy_Balance");
        assert_eq!(distributed.withdrawals, Expression::constant(10.0));
    }

    #[rstest]
    fn test_missing_index(timescales: Timescales) {
        let zones = zones();
        let quantities = quantities(&zones, &timescales);
        let registry = registry(BusLayout::CentralOnly, &["gen_a"]);

        // A zone which the quantities don't cover
        let mut more_zones = zones.clone();
        more_zones.insert("east".into());
        assert!(matches!(
            build_power_balance(&registry, &quantities, &more_zones, &timescales),
            Err(ModelError::MissingData { .. })
        ));
    }

    #[rstest]
    fn test_not_frozen(timescales: Timescales) {
        let zones = zones();
        let registry = ComponentRegistry::new(BusLayout::CentralOnly);
        assert_eq!(
            build_power_balance(&registry, &QuantityTable::default(), &zones, &timescales),
            Err(ModelError::RegistryNotFrozen("Power balance"))
        );
    }

    #[rstest]
    fn test_component_of_wrong_kind(timescales: Timescales) {
        let zones = zones();
        let mut quantities = quantities(&zones, &timescales);
        quantities
            .define_timepoint("per_tp".into(), Default::default())
            .unwrap();
        let registry = registry(BusLayout::CentralOnly, &["per_tp"]);
        assert_eq!(
            build_power_balance(&registry, &quantities, &zones, &timescales),
            Err(ModelError::UndefinedComponent {
                list: "Zone_Power_Injections",
                component: "per_tp".into()
            })
        );
    }
}

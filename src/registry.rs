//! The registry of components contributing to shared equations.
//!
//! Modules add the names of their quantities to the lists here during the registration phase.
//! Once every module has registered its components, the registry is frozen and the power balance
//! constraints and the objective are built by summing over the lists. The lists only hold names;
//! the quantities themselves live in a [`QuantityTable`](crate::expression::QuantityTable).
use crate::error::ModelError;
use crate::id::define_id_type;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::EnumIter;

define_id_type! {ComponentID}

/// Power balance list names
const ZONE_POWER_INJECTIONS: &str = "Zone_Power_Injections";
const ZONE_POWER_WITHDRAWALS: &str = "Zone_Power_Withdrawals";
const DISTRIBUTED_POWER_INJECTIONS: &str = "Distributed_Power_Injections";
const DISTRIBUTED_POWER_WITHDRAWALS: &str = "Distributed_Power_Withdrawals";

/// Cost list names
const COST_COMPONENTS_PER_TP: &str = "Cost_Components_Per_TP";
const COST_COMPONENTS_PER_PERIOD: &str = "Cost_Components_Per_Period";

/// The bus at which power is injected or withdrawn within a load zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, derive_more::Display)]
pub enum Bus {
    /// The zone's bus on the high-voltage transmission network
    #[display("central")]
    Central,
    /// The zone's bus on the distribution network, connected to the central bus via local T&D
    #[display("distributed")]
    Distributed,
}

/// Whether power is added to or removed from a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// Power added to a bus
    Injection,
    /// Power removed from a bus
    Withdrawal,
}

/// The kind of cost component, determining how it is indexed and weighted
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum CostKind {
    /// Indexed by period, in real $/year
    #[string = "annual"]
    PerPeriod,
    /// Indexed by timepoint, in real $/hour
    #[string = "timepoint"]
    PerTimepoint,
}

impl CostKind {
    /// The name of the list holding cost components of this kind
    pub fn list_name(self) -> &'static str {
        match self {
            Self::PerPeriod => COST_COMPONENTS_PER_PERIOD,
            Self::PerTimepoint => COST_COMPONENTS_PER_TP,
        }
    }
}

/// Which buses exist in each load zone for a particular model build.
///
/// This is fixed when the builder is created so that every module sees the same answer regardless
/// of the order in which modules are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusLayout {
    /// Each zone has a single, central bus
    #[default]
    CentralOnly,
    /// Each zone has a central bus and a distributed bus
    WithDistributedBus,
}

/// An ordered, append-only list of component names.
///
/// The entries can only be read once the list is frozen, so nothing can be summed over a list
/// which is still being filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentList {
    name: &'static str,
    entries: Vec<ComponentID>,
    frozen: bool,
}

impl ComponentList {
    /// Create a new, empty list
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            frozen: false,
        }
    }

    /// The list's name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append a component to the list.
    ///
    /// Fails if the list has been frozen or the component is already present. In either case the
    /// list is left unchanged.
    pub fn register(&mut self, component: ComponentID) -> Result<(), ModelError> {
        if self.frozen {
            return Err(ModelError::RegistrationAfterFreeze {
                list: self.name,
                component: component.to_string(),
            });
        }
        if self.entries.contains(&component) {
            return Err(ModelError::DuplicateRegistration {
                list: self.name,
                component: component.to_string(),
            });
        }

        self.entries.push(component);
        Ok(())
    }

    /// Forbid any further registrations
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the list has been frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The registered components, in registration order.
    ///
    /// Fails with [`ModelError::RegistryNotFrozen`] if the list has not been frozen.
    pub fn entries(&self) -> Result<&[ComponentID], ModelError> {
        if !self.frozen {
            return Err(ModelError::RegistryNotFrozen(self.name));
        }

        Ok(&self.entries)
    }
}

/// The injection and withdrawal lists for one bus
#[derive(Debug, Clone, PartialEq)]
pub struct PowerBalanceLists {
    injections: ComponentList,
    withdrawals: ComponentList,
}

impl PowerBalanceLists {
    fn new(bus: Bus) -> Self {
        let (injections, withdrawals) = match bus {
            Bus::Central => (ZONE_POWER_INJECTIONS, ZONE_POWER_WITHDRAWALS),
            Bus::Distributed => (DISTRIBUTED_POWER_INJECTIONS, DISTRIBUTED_POWER_WITHDRAWALS),
        };

        Self {
            injections: ComponentList::new(injections),
            withdrawals: ComponentList::new(withdrawals),
        }
    }

    /// Get the list for the given direction
    pub fn list(&self, direction: Direction) -> &ComponentList {
        match direction {
            Direction::Injection => &self.injections,
            Direction::Withdrawal => &self.withdrawals,
        }
    }

    fn list_mut(&mut self, direction: Direction) -> &mut ComponentList {
        match direction {
            Direction::Injection => &mut self.injections,
            Direction::Withdrawal => &mut self.withdrawals,
        }
    }

    fn freeze(&mut self) {
        self.injections.freeze();
        self.withdrawals.freeze();
    }
}

/// All of the dynamic lists for a model build
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRegistry {
    central: PowerBalanceLists,
    distributed: Option<PowerBalanceLists>,
    per_timepoint_costs: ComponentList,
    per_period_costs: ComponentList,
}

impl ComponentRegistry {
    /// Create an empty registry with power balance lists for the buses in `layout`
    pub fn new(layout: BusLayout) -> Self {
        let distributed = match layout {
            BusLayout::CentralOnly => None,
            BusLayout::WithDistributedBus => Some(PowerBalanceLists::new(Bus::Distributed)),
        };

        Self {
            central: PowerBalanceLists::new(Bus::Central),
            distributed,
            per_timepoint_costs: ComponentList::new(CostKind::PerTimepoint.list_name()),
            per_period_costs: ComponentList::new(CostKind::PerPeriod.list_name()),
        }
    }

    /// Whether this build includes a distributed bus
    pub fn has_distributed_bus(&self) -> bool {
        self.distributed.is_some()
    }

    /// The power balance lists for a bus, if the bus exists in this build
    pub fn bus_lists(&self, bus: Bus) -> Option<&PowerBalanceLists> {
        match bus {
            Bus::Central => Some(&self.central),
            Bus::Distributed => self.distributed.as_ref(),
        }
    }

    /// Register a power component, indexed by (zone, timepoint), with a bus
    pub fn register_power(
        &mut self,
        bus: Bus,
        direction: Direction,
        component: ComponentID,
    ) -> Result<(), ModelError> {
        let lists = match bus {
            Bus::Central => &mut self.central,
            Bus::Distributed => self
                .distributed
                .as_mut()
                .ok_or_else(|| ModelError::NoDistributedBus(component.to_string()))?,
        };

        lists.list_mut(direction).register(component)
    }

    /// Register a cost component
    pub fn register_cost(&mut self, kind: CostKind, component: ComponentID) -> Result<(), ModelError> {
        match kind {
            CostKind::PerTimepoint => self.per_timepoint_costs.register(component),
            CostKind::PerPeriod => self.per_period_costs.register(component),
        }
    }

    /// Get the list of cost components of the given kind
    pub fn cost_list(&self, kind: CostKind) -> &ComponentList {
        match kind {
            CostKind::PerTimepoint => &self.per_timepoint_costs,
            CostKind::PerPeriod => &self.per_period_costs,
        }
    }

    /// Freeze every list in the registry
    pub fn freeze(&mut self) {
        self.central.freeze();
        if let Some(distributed) = self.distributed.as_mut() {
            distributed.freeze();
        }
        self.per_timepoint_costs.freeze();
        self.per_period_costs.freeze();
    }

    /// Whether the registry has been frozen
    pub fn is_frozen(&self) -> bool {
        // All lists are frozen together
        self.per_period_costs.is_frozen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use strum::IntoEnumIterator;

    #[fixture]
    fn registry() -> ComponentRegistry {
        ComponentRegistry::new(BusLayout::CentralOnly)
    }

    #[rstest]
    fn test_register_power(mut registry: ComponentRegistry) {
        registry
            .register_power(Bus::Central, Direction::Injection, "gen".into())
            .unwrap();
        registry
            .register_power(Bus::Central, Direction::Withdrawal, "load".into())
            .unwrap();
        registry
            .register_power(Bus::Central, Direction::Withdrawal, "storage".into())
            .unwrap();
        registry.freeze();

        let lists = registry.bus_lists(Bus::Central).unwrap();
        assert_eq!(
            lists.list(Direction::Injection).entries().unwrap(),
            [ComponentID::new("gen")]
        );
        assert_eq!(
            lists.list(Direction::Withdrawal).entries().unwrap(),
            [ComponentID::new("load"), ComponentID::new("storage")]
        );
    }

    #[rstest]
    fn test_register_duplicate(mut registry: ComponentRegistry) {
        registry
            .register_cost(CostKind::PerTimepoint, "fuel".into())
            .unwrap();
        assert_eq!(
            registry.register_cost(CostKind::PerTimepoint, "fuel".into()),
            Err(ModelError::DuplicateRegistration {
                list: COST_COMPONENTS_PER_TP,
                component: "fuel".into()
            })
        );

        // The same name may appear in a different list
        registry
            .register_cost(CostKind::PerPeriod, "fuel".into())
            .unwrap();
        registry.freeze();
        assert_eq!(
            registry
                .cost_list(CostKind::PerTimepoint)
                .entries()
                .unwrap()
                .len(),
            1
        );
    }

    #[rstest]
    fn test_register_after_freeze(mut registry: ComponentRegistry) {
        registry
            .register_cost(CostKind::PerPeriod, "fixed_costs".into())
            .unwrap();
        registry.freeze();
        assert!(registry.is_frozen());

        assert_eq!(
            registry.register_cost(CostKind::PerPeriod, "capital".into()),
            Err(ModelError::RegistrationAfterFreeze {
                list: COST_COMPONENTS_PER_PERIOD,
                component: "capital".into()
            })
        );
        assert!(matches!(
            registry.register_power(Bus::Central, Direction::Injection, "gen".into()),
            Err(ModelError::RegistrationAfterFreeze { .. })
        ));

        // Prior registrations are untouched
        assert_eq!(
            registry.cost_list(CostKind::PerPeriod).entries().unwrap(),
            [ComponentID::new("fixed_costs")]
        );
        assert!(
            registry
                .cost_list(CostKind::PerTimepoint)
                .entries()
                .unwrap()
                .is_empty()
        );
    }

    #[rstest]
    fn test_register_distributed_without_bus(mut registry: ComponentRegistry) {
        assert!(!registry.has_distributed_bus());
        assert!(registry.bus_lists(Bus::Distributed).is_none());
        assert_eq!(
            registry.register_power(Bus::Distributed, Direction::Withdrawal, "load".into()),
            Err(ModelError::NoDistributedBus("load".into()))
        );
    }

    #[test]
    fn test_register_distributed() {
        let mut registry = ComponentRegistry::new(BusLayout::WithDistributedBus);
        registry
            .register_power(Bus::Distributed, Direction::Withdrawal, "load".into())
            .unwrap();
        registry.freeze();

        let lists = registry.bus_lists(Bus::Distributed).unwrap();
        assert_eq!(lists.list(Direction::Withdrawal).name(), DISTRIBUTED_POWER_WITHDRAWALS);
        assert_eq!(lists.list(Direction::Withdrawal).entries().unwrap().len(), 1);
        assert!(
            registry
                .bus_lists(Bus::Central)
                .unwrap()
                .list(Direction::Withdrawal)
                .entries()
                .unwrap()
                .is_empty()
        );
    }

    #[rstest]
    fn test_entries_before_freeze(mut registry: ComponentRegistry) {
        registry
            .register_cost(CostKind::PerTimepoint, "fuel".into())
            .unwrap();
        assert_eq!(
            registry.cost_list(CostKind::PerTimepoint).entries(),
            Err(ModelError::RegistryNotFrozen(COST_COMPONENTS_PER_TP))
        );
        assert_eq!(
            registry
                .bus_lists(Bus::Central)
                .unwrap()
                .list(Direction::Injection)
                .entries(),
            Err(ModelError::RegistryNotFrozen(ZONE_POWER_INJECTIONS))
        );

        registry.freeze();
        assert_eq!(
            registry.cost_list(CostKind::PerTimepoint).entries(),
            Ok([ComponentID::new("fuel")].as_slice())
        );
    }

    #[test]
    fn test_cost_list_names() {
        let registry = ComponentRegistry::new(BusLayout::CentralOnly);
        for kind in CostKind::iter() {
            assert_eq!(registry.cost_list(kind).name(), kind.list_name());
        }
    }
}

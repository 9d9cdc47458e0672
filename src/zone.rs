//! Load zones and their electricity demand.
//!
//! Each load zone is modelled as a single bus connected to the inter-zonal network. If the model
//! also has a distributed bus (see [`crate::local_td`]), demand is withdrawn there instead, and the
//! local T&D module takes care of moving power from the central bus to the distributed bus.
use crate::builder::{ModelBuilder, ModelModule};
use crate::error::ModelError;
use crate::expression::{Expression, ZoneTimepointQuantity};
use crate::id::define_id_type;
use crate::registry::Direction;
use crate::timescale::{PeriodID, TimepointID, Timescales};
use crate::units::{Energy, Power};
use anyhow::{Result, ensure};
use indexmap::{IndexMap, IndexSet};
use log::debug;

define_id_type! {ZoneID}

/// The name of the demand quantity
pub const ZONE_DEMAND_MW: &str = "zone_demand_mw";

/// Demand for every combination of zone and timepoint
pub type DemandMap = IndexMap<(ZoneID, TimepointID), Power>;

/// The load zones of a model, with their demand
#[derive(Debug, Clone, PartialEq)]
pub struct LoadZones {
    zones: IndexSet<ZoneID>,
    demand: DemandMap,
    total_demand_in_period: IndexMap<(ZoneID, PeriodID), Energy>,
}

impl LoadZones {
    /// Create a new [`LoadZones`].
    ///
    /// Demand must be given for every combination of zone and timepoint and must be a finite,
    /// non-negative number.
    pub fn new(zones: IndexSet<ZoneID>, demand: DemandMap, timescales: &Timescales) -> Result<Self> {
        if zones.is_empty() {
            Err(ModelError::missing_data("LOAD_ZONES", "any zone"))?;
        }

        for ((zone, timepoint), value) in &demand {
            ensure!(zones.contains(zone), "Demand given for unknown zone {zone}");
            ensure!(
                timescales.timepoint(timepoint).is_some(),
                "Demand given for unknown timepoint {timepoint}"
            );
            ensure!(
                value.is_finite() && *value >= Power(0.0),
                "Demand for zone {zone} at timepoint {timepoint} must be a non-negative number"
            );
        }

        for zone in &zones {
            for timepoint in timescales.iter_timepoints() {
                if !demand.contains_key(&(zone.clone(), timepoint.id.clone())) {
                    Err(ModelError::missing_data(
                        ZONE_DEMAND_MW,
                        format!("({zone}, {})", timepoint.id),
                    ))?;
                }
            }
        }

        let total_demand_in_period = calculate_total_demand_in_period(&zones, &demand, timescales);

        Ok(Self {
            zones,
            demand,
            total_demand_in_period,
        })
    }

    /// The set of load zones
    pub fn zones(&self) -> &IndexSet<ZoneID> {
        &self.zones
    }

    /// Demand in a zone at a timepoint.
    ///
    /// # Panics
    ///
    /// If the zone or timepoint is not part of the model.
    pub fn demand(&self, zone: &ZoneID, timepoint: &TimepointID) -> Power {
        self.demand[&(zone.clone(), timepoint.clone())]
    }

    /// The total energy demand of a zone over a period.
    ///
    /// # Panics
    ///
    /// If the zone or period is not part of the model.
    pub fn zone_total_demand_in_period_mwh(&self, zone: &ZoneID, period: &PeriodID) -> Energy {
        self.total_demand_in_period[&(zone.clone(), period.clone())]
    }

    /// The total energy demand of all zones over a period
    pub fn system_demand_in_period_mwh(&self, period: &PeriodID) -> Energy {
        self.zones
            .iter()
            .map(|zone| self.zone_total_demand_in_period_mwh(zone, period))
            .sum()
    }
}

/// Sum the demand in each zone over the timepoints of each period, weighted by timepoint
fn calculate_total_demand_in_period(
    zones: &IndexSet<ZoneID>,
    demand: &DemandMap,
    timescales: &Timescales,
) -> IndexMap<(ZoneID, PeriodID), Energy> {
    let mut map = IndexMap::new();
    for zone in zones {
        for period in timescales.iter_periods() {
            let total = timescales
                .iter_timepoints_in_period(&period.id)
                .map(|tp| demand[&(zone.clone(), tp.id.clone())] * tp.weight)
                .sum();
            map.insert((zone.clone(), period.id.clone()), total);
        }
    }

    map
}

impl ModelModule for LoadZones {
    fn name(&self) -> &'static str {
        "load_zones"
    }

    fn declare(&self, builder: &mut ModelBuilder) -> Result<()> {
        let quantity: ZoneTimepointQuantity = self
            .demand
            .iter()
            .map(|(key, value)| (key.clone(), Expression::constant(value.value())))
            .collect();
        builder.define_zone_timepoint_quantity(ZONE_DEMAND_MW.into(), quantity)?;

        // Exactly one bus receives the demand
        let bus = builder.demand_bus();
        debug!("Registering {ZONE_DEMAND_MW} as a withdrawal from the {bus} bus");
        builder.register_power(bus, Direction::Withdrawal, ZONE_DEMAND_MW.into())?;

        Ok(())
    }
}

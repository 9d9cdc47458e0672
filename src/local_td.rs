//! Local transmission and distribution.
//!
//! With this module, each load zone has a distributed bus as well as a central one. End-use demand
//! is withdrawn from the distributed bus, and power is moved to it from the central bus over local
//! T&D, losing a fixed fraction of the power on the way.
use crate::builder::{ModelBuilder, ModelModule};
use crate::error::ModelError;
use crate::expression::{Expression, ZoneTimepointQuantity};
use crate::registry::{Bus, Direction};
use crate::units::Dimensionless;
use crate::zone::ZoneID;
use anyhow::{Result, ensure};
use indexmap::IndexMap;

/// Power withdrawn from the central bus into local T&D
pub const WITHDRAW_FROM_CENTRAL_GRID: &str = "WithdrawFromCentralGrid";
/// Power delivered to the distributed bus, after losses
pub const INJECT_INTO_DISTRIBUTED_GRID: &str = "InjectIntoDistributedGrid";

/// Local T&D losses for each load zone
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTD {
    loss_rates: IndexMap<ZoneID, Dimensionless>,
}

impl LocalTD {
    /// Create a new [`LocalTD`] from the loss rate of each zone.
    ///
    /// Loss rates must be in the range [0, 1).
    pub fn new(loss_rates: IndexMap<ZoneID, Dimensionless>) -> Result<Self> {
        for (zone, rate) in &loss_rates {
            ensure!(
                *rate >= Dimensionless(0.0) && *rate < Dimensionless(1.0),
                "Local T&D loss rate for zone {zone} must be at least 0 and less than 1"
            );
        }

        Ok(Self { loss_rates })
    }

    /// The loss rate for a zone, if given
    pub fn loss_rate(&self, zone: &ZoneID) -> Option<Dimensionless> {
        self.loss_rates.get(zone).copied()
    }
}

impl ModelModule for LocalTD {
    fn name(&self) -> &'static str {
        "local_td"
    }

    fn declare(&self, builder: &mut ModelBuilder) -> Result<()> {
        if !builder.has_distributed_bus() {
            Err(ModelError::NoDistributedBus(self.name().to_string()))?;
        }

        let timescales = builder.timescales();
        let mut withdrawals = ZoneTimepointQuantity::new();
        let mut injections = ZoneTimepointQuantity::new();
        for zone in builder.zones() {
            let loss_rate = self
                .loss_rate(zone)
                .ok_or_else(|| ModelError::missing_data("local_td_loss_rate", zone))?;
            for tp in timescales.iter_timepoints() {
                let var = builder.add_variable(
                    format!("{WITHDRAW_FROM_CENTRAL_GRID}[{zone},{}]", tp.id),
                    0.0,
                    f64::INFINITY,
                );
                let key = (zone.clone(), tp.id.clone());
                withdrawals.insert(key.clone(), Expression::from(var));
                injections.insert(key, Expression::term(var, 1.0 - loss_rate.value()));
            }
        }

        builder.define_zone_timepoint_quantity(WITHDRAW_FROM_CENTRAL_GRID.into(), withdrawals)?;
        builder.register_power(
            Bus::Central,
            Direction::Withdrawal,
            WITHDRAW_FROM_CENTRAL_GRID.into(),
        )?;
        builder.define_zone_timepoint_quantity(INJECT_INTO_DISTRIBUTED_GRID.into(), injections)?;
        builder.register_power(
            Bus::Distributed,
            Direction::Injection,
            INJECT_INTO_DISTRIBUTED_GRID.into(),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::Financials;
    use crate::fixture::{financials, generators, load_zones, local_td, timescales};
    use crate::generator::GenerationProjects;
    use crate::registry::BusLayout;
    use crate::timescale::Timescales;
    use crate::zone::{LoadZones, ZONE_DEMAND_MW};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(-0.1)]
    #[case(1.0)]
    fn test_bad_loss_rate(#[case] rate: f64) {
        let rates = [("north".into(), Dimensionless(rate))].into_iter().collect();
        assert!(LocalTD::new(rates).is_err());
    }

    #[rstest]
    fn test_requires_distributed_bus(
        timescales: Timescales,
        financials: Financials,
        load_zones: LoadZones,
        local_td: LocalTD,
    ) {
        let mut builder = ModelBuilder::new(
            &timescales,
            load_zones.zones(),
            financials,
            BusLayout::CentralOnly,
        );
        let err = builder.declare(&local_td).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ModelError>(),
            Some(&ModelError::NoDistributedBus("local_td".into()))
        );
    }

    #[rstest]
    fn test_missing_loss_rate(timescales: Timescales, financials: Financials, load_zones: LoadZones) {
        let local_td = LocalTD::new(
            [("north".into(), Dimensionless(0.05))]
                .into_iter()
                .collect(),
        )
        .unwrap();
        let mut builder = ModelBuilder::new(
            &timescales,
            load_zones.zones(),
            financials,
            BusLayout::WithDistributedBus,
        );
        let err = builder.declare(&local_td).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ModelError>(),
            Some(&ModelError::missing_data("local_td_loss_rate", "south"))
        );
    }

    #[rstest]
    fn test_losses_met_by_central_generation(
        timescales: Timescales,
        financials: Financials,
        load_zones: LoadZones,
        generators: GenerationProjects,
        local_td: LocalTD,
    ) {
        let mut builder = ModelBuilder::new(
            &timescales,
            load_zones.zones(),
            financials,
            BusLayout::WithDistributedBus,
        );
        builder.declare(&load_zones).unwrap();
        builder.declare(&generators).unwrap();
        builder.declare(&local_td).unwrap();
        let solution = builder.finalize().unwrap().solve().unwrap();

        let quantities = solution.problem().quantities();
        let withdrawals = quantities
            .zone_timepoint(&WITHDRAW_FROM_CENTRAL_GRID.into())
            .unwrap();
        let demand = quantities.zone_timepoint(&ZONE_DEMAND_MW.into()).unwrap();
        for (key, withdrawal) in withdrawals {
            let loss_rate = local_td.loss_rate(&key.0).unwrap().value();
            assert_approx_eq!(
                f64,
                solution.value_of(withdrawal) * (1.0 - loss_rate),
                solution.value_of(&demand[key]),
                epsilon = 1e-6
            );
        }
    }
}

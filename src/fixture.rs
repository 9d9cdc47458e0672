//! Fixtures for tests

use crate::finance::Financials;
use crate::generator::{GenerationProjects, Generator};
use crate::local_td::LocalTD;
use crate::timescale::{Period, Timepoint, Timescales};
use crate::units::{Dimensionless, Hours, MoneyPerCapacity, MoneyPerEnergy, Power};
use crate::zone::{DemandMap, LoadZones, ZoneID};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Two ten-year periods, each with a day and a night timepoint
#[fixture]
pub fn timescales() -> Timescales {
    let periods = ["2030", "2040"]
        .into_iter()
        .map(|id| Period {
            id: id.into(),
            length_years: 10.0,
        })
        .collect();
    let timepoints = ["2030", "2040"]
        .into_iter()
        .cartesian_product(["day", "night"])
        .map(|(period, label)| Timepoint {
            id: format!("{period}_{label}").into(),
            period: period.into(),
            weight: Hours(43_800.0),
            weight_in_year: Hours(4380.0),
            timestamp: format!("{period}-01-01 {label}"),
        })
        .collect();

    Timescales::new(periods, timepoints).unwrap()
}

/// One single-year period with one timepoint covering the whole year
#[fixture]
pub fn single_timepoint_timescales() -> Timescales {
    Timescales::new(
        vec![Period {
            id: "P1".into(),
            length_years: 1.0,
        }],
        vec![Timepoint {
            id: "T1".into(),
            period: "P1".into(),
            weight: Hours(8760.0),
            weight_in_year: Hours(8760.0),
            timestamp: "T1".into(),
        }],
    )
    .unwrap()
}

#[fixture]
pub fn financials() -> Financials {
    Financials {
        base_financial_year: 2020,
        dollar_year: 2020,
        discount_rate: Dimensionless(0.07),
    }
}

/// Two zones, with demand in the south twice that in the north
#[fixture]
pub fn load_zones(timescales: Timescales) -> LoadZones {
    let zones: IndexSet<ZoneID> = ["north".into(), "south".into()].into_iter().collect();
    let base_demand = [
        ("2030_day", 100.0),
        ("2030_night", 50.0),
        ("2040_day", 120.0),
        ("2040_night", 60.0),
    ];
    let demand: DemandMap = zones
        .iter()
        .enumerate()
        .cartesian_product(base_demand)
        .map(|((i, zone), (tp, value))| {
            let scale = if i == 0 { 1.0 } else { 2.0 };
            ((zone.clone(), tp.into()), Power(value * scale))
        })
        .collect();

    LoadZones::new(zones, demand, &timescales).unwrap()
}

/// Solar and gas in the north, gas only in the south
#[fixture]
pub fn generators() -> GenerationProjects {
    let solar_cf: IndexMap<_, _> = [
        ("2030_day".into(), Dimensionless(0.8)),
        ("2030_night".into(), Dimensionless(0.0)),
        ("2040_day".into(), Dimensionless(0.8)),
        ("2040_night".into(), Dimensionless(0.0)),
    ]
    .into_iter()
    .collect();
    let generators = [
        Generator {
            id: "solar_north".into(),
            load_zone: "north".into(),
            capacity: Power(500.0),
            variable_om: MoneyPerEnergy(0.0),
            fixed_om: MoneyPerCapacity(10_000.0),
            max_capacity_factors: solar_cf,
        },
        Generator {
            id: "gas_north".into(),
            load_zone: "north".into(),
            capacity: Power(400.0),
            variable_om: MoneyPerEnergy(50.0),
            fixed_om: MoneyPerCapacity(5000.0),
            max_capacity_factors: IndexMap::new(),
        },
        Generator {
            id: "gas_south".into(),
            load_zone: "south".into(),
            capacity: Power(400.0),
            variable_om: MoneyPerEnergy(60.0),
            fixed_om: MoneyPerCapacity(5000.0),
            max_capacity_factors: IndexMap::new(),
        },
    ];

    GenerationProjects::new(
        generators
            .into_iter()
            .map(|generator| (generator.id.clone(), generator))
            .collect(),
    )
}

#[fixture]
pub fn local_td() -> LocalTD {
    LocalTD::new(
        [
            ("north".into(), Dimensionless(0.05)),
            ("south".into(), Dimensionless(0.08)),
        ]
        .into_iter()
        .collect(),
    )
    .unwrap()
}

//! Fixed three-phase loads.

use lf_project::SchematicComponent;
use lf_solver::Load;
use lf_topology::Point;

use crate::common::{port, quantity};
use crate::error::{ComponentError, ComponentResult};
use crate::extract::ExtractContext;
use crate::traits::{NetworkElement, Placement, Table};

/// `PO`/`QO` are per-phase values; the network record is three-phase.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDef {
    pub name: String,
    pub p_mw: f64,
    pub q_mvar: f64,
    pub port: Point,
}

impl TryFrom<&SchematicComponent> for LoadDef {
    type Error = ComponentError;

    fn try_from(comp: &SchematicComponent) -> ComponentResult<Self> {
        Ok(Self {
            name: comp.display_name(),
            p_mw: quantity(comp, "PO")? * 3.0,
            q_mvar: quantity(comp, "QO")? * 3.0,
            port: port(comp, "IA")?,
        })
    }
}

impl NetworkElement for LoadDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement> {
        let manual = ctx.overrides.load.get(&self.name).and_then(|row| row.bus.clone());
        let bus = ctx.bus_at(manual.as_deref(), self.port)?;
        let index = ctx.network.create_load(Load {
            name: self.name.clone(),
            bus,
            p_mw: self.p_mw,
            q_mvar: self.q_mvar,
            in_service: true,
        })?;
        Ok(Placement::new(Table::Load, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{LoadOverride, OverrideTable};
    use crate::testing::{Fixture, component};
    use lf_project::Definition;

    const IA: Point = Point { x: 4, y: 8 };

    fn load() -> SchematicComponent {
        component(
            Definition::FixedLoad,
            42,
            &[("PO", "0.1 [MW]"), ("QO", "0.02 [MVAR]")],
            &[("IA", IA)],
        )
    }

    #[test]
    fn per_phase_values_are_tripled() {
        let def = LoadDef::try_from(&load()).unwrap();
        assert_eq!(def.name, "42");
        assert!((def.p_mw - 0.3).abs() < 1e-12);
        assert!((def.q_mvar - 0.06).abs() < 1e-12);
    }

    #[test]
    fn bus_from_port() {
        let mut fx = Fixture::with_buses(&[("Bus4", 0.48, IA)]);
        LoadDef::try_from(&load()).unwrap().add_to(&mut fx.context()).unwrap();
        assert_eq!(fx.network.load[0].bus, 4);
    }

    #[test]
    fn override_bus_wins() {
        let mut fx = Fixture::with_buses(&[("Bus4", 0.48, IA), ("Bus5", 0.48, Point::new(50, 50))]);
        fx.overrides.load = OverrideTable::from_rows([LoadOverride {
            name: "42".into(),
            bus: Some("Bus5".into()),
        }]);
        LoadDef::try_from(&load()).unwrap().add_to(&mut fx.context()).unwrap();
        assert_eq!(fx.network.load[0].bus, 5);
    }

    #[test]
    fn unresolved_port_is_fatal() {
        let mut fx = Fixture::default();
        fx.network.create_bus("Bus4", 0.48, Some(4)).unwrap();
        let err = LoadDef::try_from(&load())
            .unwrap()
            .add_to(&mut fx.context())
            .unwrap_err();
        assert!(matches!(err, ComponentError::Topology(_)));
    }
}

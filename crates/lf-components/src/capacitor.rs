//! Capacitor banks.

use lf_core::units::electrical::capacitor_reactive_power;
use lf_core::units::{hz, kv, microfarad, to_megavars};
use lf_project::SchematicComponent;
use lf_solver::Shunt;
use lf_topology::Point;

use crate::common::quantity;
use crate::error::{ComponentError, ComponentResult};
use crate::extract::ExtractContext;
use crate::traits::{NetworkElement, Placement, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct CapacitorDef {
    pub name: String,
    pub c_uf: f64,
    /// Port `A`, or `B` on instances without an `A` port.
    pub port: Point,
}

impl CapacitorDef {
    /// Reactive power delivered at `vn_kv` and `f_hz`, in Mvar.
    pub fn q_mvar(&self, f_hz: f64, vn_kv: f64) -> f64 {
        to_megavars(capacitor_reactive_power(
            hz(f_hz),
            microfarad(self.c_uf),
            kv(vn_kv),
        ))
    }
}

impl TryFrom<&SchematicComponent> for CapacitorDef {
    type Error = ComponentError;

    fn try_from(comp: &SchematicComponent) -> ComponentResult<Self> {
        let port = comp
            .port("A")
            .or_else(|| comp.port("B"))
            .ok_or_else(|| ComponentError::MissingPort {
                component: comp.display_name(),
                port: "A",
            })?;
        Ok(Self {
            name: comp.display_name(),
            c_uf: quantity(comp, "C")?,
            port,
        })
    }
}

impl NetworkElement for CapacitorDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement> {
        let manual = ctx
            .overrides
            .cap_bank
            .get(&self.name)
            .and_then(|row| row.bus.clone());
        let bus = ctx.bus_at(manual.as_deref(), self.port)?;
        let vn_kv = ctx
            .network
            .bus(bus)
            .map(|b| b.vn_kv)
            .ok_or(lf_solver::SolverError::UnknownBusIndex { index: bus })?;
        let q_mvar = self.q_mvar(ctx.settings.frequency_hz, vn_kv);

        // load convention: a capacitor consumes negative reactive power
        let index = ctx.network.create_shunt(Shunt {
            name: self.name.clone(),
            bus,
            p_mw: 0.0,
            q_mvar: -q_mvar,
            vn_kv,
            step: 1,
            in_service: true,
        })?;
        Ok(Placement::new(Table::Shunt, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{CapBankOverride, OverrideTable};
    use crate::testing::{Fixture, component};
    use lf_project::Definition;
    use std::f64::consts::PI;

    const A: Point = Point { x: 2, y: 2 };

    fn cap(ports: &[(&str, Point)]) -> SchematicComponent {
        component(Definition::Capacitor, 21, &[("C", "10.0 [uF]")], ports)
    }

    #[test]
    fn reactive_power_from_capacitance() {
        let def = CapacitorDef::try_from(&cap(&[("A", A)])).unwrap();
        let expected = 2.0 * PI * 60.0 * 10e-6 * (13.8e3f64).powi(2) / 1e6;
        assert!((def.q_mvar(60.0, 13.8) - expected).abs() < 1e-9);
    }

    #[test]
    fn shunt_uses_bus_voltage_and_load_sign() {
        let mut fx = Fixture::with_buses(&[("Bus3", 13.8, A)]);
        let def = CapacitorDef::try_from(&cap(&[("A", A)])).unwrap();
        def.add_to(&mut fx.context()).unwrap();

        let shunt = &fx.network.shunt[0];
        assert_eq!(shunt.bus, 3);
        assert_eq!(shunt.vn_kv, 13.8);
        assert_eq!(shunt.p_mw, 0.0);
        assert_eq!(shunt.step, 1);
        assert!(shunt.q_mvar < 0.0);
        assert!((shunt.q_mvar + def.q_mvar(60.0, 13.8)).abs() < 1e-12);
        assert_eq!(shunt.name, "21");
    }

    #[test]
    fn port_b_only_when_a_absent() {
        let b = Point::new(7, 7);
        assert_eq!(CapacitorDef::try_from(&cap(&[("B", b)])).unwrap().port, b);
        assert_eq!(
            CapacitorDef::try_from(&cap(&[("A", A), ("B", b)])).unwrap().port,
            A
        );
        assert!(matches!(
            CapacitorDef::try_from(&cap(&[])),
            Err(ComponentError::MissingPort { .. })
        ));
    }

    #[test]
    fn override_bus_sets_voltage_base() {
        let mut fx = Fixture::with_buses(&[("Bus3", 13.8, A), ("Bus4", 0.48, Point::new(30, 0))]);
        fx.overrides.cap_bank = OverrideTable::from_rows([CapBankOverride {
            name: "21".into(),
            bus: Some("Bus4".into()),
        }]);
        let def = CapacitorDef::try_from(&cap(&[("A", A)])).unwrap();
        def.add_to(&mut fx.context()).unwrap();
        assert_eq!(fx.network.shunt[0].bus, 4);
        assert_eq!(fx.network.shunt[0].vn_kv, 0.48);
    }
}

//! Voltage sources: generators and the external grid.
//!
//! Both PSCAD three-phase source models become either a PV generator or,
//! when connected to the slack bus, the network's external grid.

use lf_project::{Definition, SchematicComponent};
use lf_solver::{ExtGrid, Gen, GenOperatingPoint};
use lf_topology::Point;

use crate::common::{optional_quantity, port, quantity};
use crate::error::{ComponentError, ComponentResult};
use crate::extract::ExtractContext;
use crate::traits::{NetworkElement, Placement, Table};

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorModel {
    /// `master:source3`: setpoints in per unit of the machine's own base.
    Source3 {
        /// Rated line voltage `Vm` (kV).
        u_n_kv: f64,
        /// Rated power `MVA`.
        s_n_mva: f64,
        /// Active power `Pinit` (pu).
        p_init_pu: f64,
        /// Source voltage `Es` (kV).
        es_kv: f64,
        /// Phase angle `Ph` (degrees).
        ph_degree: f64,
    },
    /// `master:source_3`: setpoints in MW and per unit voltage.
    Source3Pu {
        p_init_mw: f64,
        v_pu: f64,
        pht_degree: f64,
        /// `Sbase`, only needed to write results back.
        s_base_mva: Option<f64>,
    },
}

impl GeneratorModel {
    pub fn p_mw(&self) -> f64 {
        match self {
            GeneratorModel::Source3 {
                s_n_mva, p_init_pu, ..
            } => p_init_pu * s_n_mva,
            GeneratorModel::Source3Pu { p_init_mw, .. } => *p_init_mw,
        }
    }

    pub fn vm_pu(&self) -> f64 {
        match self {
            GeneratorModel::Source3 { u_n_kv, es_kv, .. } => es_kv / u_n_kv,
            GeneratorModel::Source3Pu { v_pu, .. } => *v_pu,
        }
    }

    pub fn va_degree(&self) -> f64 {
        match self {
            GeneratorModel::Source3 { ph_degree, .. } => *ph_degree,
            GeneratorModel::Source3Pu { pht_degree, .. } => *pht_degree,
        }
    }

    pub fn bus_port(&self) -> &'static str {
        match self {
            GeneratorModel::Source3 { .. } => "N3",
            GeneratorModel::Source3Pu { .. } => "N",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorDef {
    pub name: String,
    pub model: GeneratorModel,
    pub port: Point,
}

impl GeneratorDef {
    /// Schematic parameters carrying a solved operating point.
    pub fn writeback_parameters(
        &self,
        op: &GenOperatingPoint,
    ) -> ComponentResult<Vec<(&'static str, String)>> {
        let params = match &self.model {
            GeneratorModel::Source3 { u_n_kv, s_n_mva, .. } => vec![
                ("Pinit", (op.p_mw / s_n_mva).to_string()),
                ("Qinit", (op.q_mvar / s_n_mva).to_string()),
                ("Ph", op.va_degree.to_string()),
                ("Es", (op.vm_pu * u_n_kv).to_string()),
            ],
            GeneratorModel::Source3Pu { s_base_mva, .. } => {
                let s_base = s_base_mva.ok_or_else(|| ComponentError::MissingParameter {
                    component: self.name.clone(),
                    key: "Sbase",
                })?;
                vec![
                    ("Pinit", (op.p_mw / s_base).to_string()),
                    ("Qinit", (op.q_mvar / s_base).to_string()),
                    ("PhT", op.va_degree.to_string()),
                    ("Vpu", op.vm_pu.to_string()),
                ]
            }
        };
        Ok(params)
    }
}

impl TryFrom<&SchematicComponent> for GeneratorDef {
    type Error = ComponentError;

    fn try_from(comp: &SchematicComponent) -> ComponentResult<Self> {
        let model = match comp.definition {
            Definition::Source3 => GeneratorModel::Source3 {
                u_n_kv: quantity(comp, "Vm")?,
                s_n_mva: quantity(comp, "MVA")?,
                p_init_pu: quantity(comp, "Pinit")?,
                es_kv: quantity(comp, "Es")?,
                ph_degree: quantity(comp, "Ph")?,
            },
            Definition::Source3Pu => GeneratorModel::Source3Pu {
                p_init_mw: quantity(comp, "Pinit")?,
                v_pu: quantity(comp, "Vpu")?,
                pht_degree: quantity(comp, "PhT")?,
                s_base_mva: optional_quantity(comp, "Sbase")?,
            },
            _ => {
                return Err(ComponentError::WrongDefinition {
                    component: comp.display_name(),
                    tag: comp.definition.tag(),
                    expected: "voltage source",
                });
            }
        };
        let port = port(comp, model.bus_port())?;
        Ok(Self {
            name: comp.display_name(),
            model,
            port,
        })
    }
}

impl NetworkElement for GeneratorDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement> {
        let row = ctx.overrides.gens.get(&self.name).cloned().unwrap_or_default();
        let bus = ctx.bus_at(row.bus.as_deref(), self.port)?;

        if bus == ctx.slack_bus_index()? {
            let index = ctx.network.create_ext_grid(ExtGrid {
                name: self.name.clone(),
                bus,
                vm_pu: self.model.vm_pu(),
                va_degree: self.model.va_degree(),
                max_q_mvar: row.max_q_mvar,
                min_q_mvar: row.min_q_mvar,
                in_service: true,
            })?;
            return Ok(Placement::new(Table::ExtGrid, index));
        }

        let index = ctx.network.create_gen(Gen {
            name: self.name.clone(),
            bus,
            p_mw: self.model.p_mw(),
            vm_pu: self.model.vm_pu(),
            max_q_mvar: row.max_q_mvar,
            min_q_mvar: row.min_q_mvar,
            in_service: true,
        })?;
        Ok(Placement::new(Table::Gen, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{GenOverride, OverrideTable};
    use crate::testing::{Fixture, component};

    const AT1: Point = Point { x: 0, y: 0 };
    const AT2: Point = Point { x: 20, y: 0 };

    fn source3(port_at: Point) -> SchematicComponent {
        component(
            Definition::Source3,
            7,
            &[
                ("Name", "G1"),
                ("Vm", "13.8 [kV]"),
                ("MVA", "100.0 [MVA]"),
                ("Pinit", "0.5 [pu]"),
                ("Es", "14.49 [kV]"),
                ("Ph", "-2.0 [deg]"),
            ],
            &[("N3", port_at)],
        )
    }

    fn source_3(port_at: Point) -> SchematicComponent {
        component(
            Definition::Source3Pu,
            8,
            &[
                ("Name", "G2"),
                ("Pinit", "12.0"),
                ("Vpu", "1.02"),
                ("PhT", "0.0"),
                ("Sbase", "50.0 [MVA]"),
            ],
            &[("N", port_at)],
        )
    }

    fn fixture() -> Fixture {
        Fixture::with_buses(&[("Bus1", 13.8, AT1), ("Bus2", 13.8, AT2)])
    }

    #[test]
    fn source3_setpoints_in_network_units() {
        let def = GeneratorDef::try_from(&source3(AT2)).unwrap();
        assert!((def.model.p_mw() - 50.0).abs() < 1e-12);
        assert!((def.model.vm_pu() - 1.05).abs() < 1e-12);
        assert_eq!(def.model.va_degree(), -2.0);
        assert_eq!(def.model.bus_port(), "N3");
    }

    #[test]
    fn off_slack_source_is_a_generator() {
        let mut fx = fixture();
        let placed = GeneratorDef::try_from(&source_3(AT2))
            .unwrap()
            .add_to(&mut fx.context())
            .unwrap();
        assert_eq!(placed, Placement::new(Table::Gen, 0));
        let g = &fx.network.gens[0];
        assert_eq!((g.bus, g.p_mw, g.vm_pu), (2, 12.0, 1.02));
        assert_eq!(g.max_q_mvar, None);
    }

    #[test]
    fn slack_source_is_the_external_grid() {
        let mut fx = fixture();
        let placed = GeneratorDef::try_from(&source3(AT1))
            .unwrap()
            .add_to(&mut fx.context())
            .unwrap();
        assert_eq!(placed.table, Table::ExtGrid);
        let grid = &fx.network.ext_grid[0];
        assert_eq!(grid.bus, 1);
        assert_eq!(grid.va_degree, -2.0);
        assert!(fx.network.gens.is_empty());
    }

    #[test]
    fn override_moves_source_and_sets_q_limits() {
        let mut fx = fixture();
        fx.overrides.gens = OverrideTable::from_rows([GenOverride {
            name: "G2".into(),
            bus: Some("Bus1".into()),
            max_q_mvar: Some(8.0),
            min_q_mvar: Some(-4.0),
        }]);
        let placed = GeneratorDef::try_from(&source_3(AT2))
            .unwrap()
            .add_to(&mut fx.context())
            .unwrap();
        assert_eq!(placed.table, Table::ExtGrid);
        let grid = &fx.network.ext_grid[0];
        assert_eq!((grid.max_q_mvar, grid.min_q_mvar), (Some(8.0), Some(-4.0)));
    }

    #[test]
    fn missing_slack_bus_is_fatal() {
        let mut fx = fixture();
        fx.settings.slack_bus = "Bus9".into();
        let err = GeneratorDef::try_from(&source3(AT2))
            .unwrap()
            .add_to(&mut fx.context())
            .unwrap_err();
        assert!(err.to_string().contains("Bus9"));
    }

    #[test]
    fn other_definitions_rejected() {
        let mut comp = source3(AT1);
        comp.definition = Definition::FixedLoad;
        let err = GeneratorDef::try_from(&comp).unwrap_err();
        assert!(matches!(err, ComponentError::WrongDefinition { .. }));
    }

    #[test]
    fn writeback_source3() {
        let def = GeneratorDef::try_from(&source3(AT2)).unwrap();
        let op = GenOperatingPoint {
            p_mw: 40.0,
            q_mvar: 10.0,
            vm_pu: 1.0,
            va_degree: 3.5,
        };
        let params = def.writeback_parameters(&op).unwrap();
        assert_eq!(
            params,
            vec![
                ("Pinit", "0.4".to_string()),
                ("Qinit", "0.1".to_string()),
                ("Ph", "3.5".to_string()),
                ("Es", "13.8".to_string()),
            ]
        );
    }

    #[test]
    fn writeback_source_3_uses_sbase() {
        let def = GeneratorDef::try_from(&source_3(AT2)).unwrap();
        let op = GenOperatingPoint {
            p_mw: 25.0,
            q_mvar: -5.0,
            vm_pu: 1.01,
            va_degree: 0.0,
        };
        let params = def.writeback_parameters(&op).unwrap();
        assert_eq!(params[0], ("Pinit", "0.5".to_string()));
        assert_eq!(params[1], ("Qinit", "-0.1".to_string()));
        assert_eq!(params[3], ("Vpu", "1.01".to_string()));

        let mut comp = source_3(AT2);
        comp.parameters.remove("Sbase");
        let def = GeneratorDef::try_from(&comp).unwrap();
        assert!(def.writeback_parameters(&op).is_err());
    }
}

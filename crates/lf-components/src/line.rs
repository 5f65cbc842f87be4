//! Overhead lines (`TLine`) and cables (`Cable`).
//!
//! Terminals and electrical data both come from the simulation build folder:
//! `main.dta` names the branch's nodes and `<name>.out` holds its constants.

use lf_project::{Definition, SchematicComponent};
use lf_solver::Line;

use crate::common::quantity;
use crate::error::{ComponentError, ComponentResult};
use crate::extract::ExtractContext;
use crate::traits::{NetworkElement, Placement, Table};

/// Thermal limit used when no override gives one.
pub const DEFAULT_MAX_I_KA: f64 = 1e9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Overhead,
    Cable,
}

impl LineKind {
    /// Network line type code.
    pub fn code(self) -> &'static str {
        match self {
            LineKind::Overhead => "ol",
            LineKind::Cable => "cs",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDef {
    pub name: String,
    pub kind: LineKind,
    pub length_km: f64,
}

impl TryFrom<&SchematicComponent> for LineDef {
    type Error = ComponentError;

    fn try_from(comp: &SchematicComponent) -> ComponentResult<Self> {
        let kind = match comp.definition {
            Definition::TLine => LineKind::Overhead,
            Definition::Cable => LineKind::Cable,
            _ => {
                return Err(ComponentError::WrongDefinition {
                    component: comp.display_name(),
                    tag: comp.definition.tag(),
                    expected: "line or cable",
                });
            }
        };
        Ok(Self {
            name: comp.display_name(),
            kind,
            length_km: quantity(comp, "Length")?,
        })
    }
}

impl NetworkElement for LineDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement> {
        let (to_bus, from_bus) = ctx.branch_buses(&self.name)?;
        let params = ctx
            .line_report(&self.name)?
            .per_km(self.length_km, ctx.settings.frequency_hz);
        let max_i_ka = ctx
            .overrides
            .line
            .get(&self.name)
            .and_then(|row| row.max_i_ka)
            .unwrap_or(DEFAULT_MAX_I_KA);

        let index = ctx.network.create_line(Line {
            name: self.name.clone(),
            from_bus,
            to_bus,
            length_km: self.length_km,
            r_ohm_per_km: params.r_ohm_per_km,
            x_ohm_per_km: params.x_ohm_per_km,
            c_nf_per_km: params.c_nf_per_km,
            max_i_ka,
            type_: self.kind.code().to_string(),
            in_service: true,
        })?;
        Ok(Placement::new(Table::Line, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_map::NodeMap;
    use crate::overrides::{LineOverride, OverrideTable};
    use crate::testing::{Fixture, component};
    use lf_topology::Point;

    const DTA: &str = "\
! Local Node Voltages
  NT_1    0.0  // Bus1(1)
  NT_2    0.0  // Bus2(1)
! Local Branch Data
! TL1
 2  0
 NT_1  NT_0  0.1
 NT_2  NT_0  0.1
";

    const OUT: &str = "\
 LOAD FLOW RXB FORMATTED DATA @ 60.0 Hz:
 ---------------------------------------

 Base of Per-Unit Quantities:  100.0 kV(L-L),  100.0 MVA

 Positive Sequence
 -----------------
 Resistance Rsq [pu]:      0.0100
 Reactance Xsq [pu]:       0.0500
 Susceptance Bsq [pu]:     0.0200
";

    fn tline(definition: Definition) -> SchematicComponent {
        component(
            definition,
            3,
            &[("Name", "TL1"), ("Length", "10.0 [km]")],
            &[],
        )
    }

    fn fixture(dir_name: &str) -> Fixture {
        let mut fx = Fixture::with_buses(&[
            ("Bus1", 100.0, Point::new(0, 0)),
            ("Bus2", 100.0, Point::new(9, 9)),
        ]);
        let dir = std::env::temp_dir().join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("TL1.out"), OUT).unwrap();
        fx.settings.build_dir = dir;
        fx.node_map = Some(NodeMap::parse(DTA));
        fx
    }

    #[test]
    fn kind_follows_definition() {
        assert_eq!(LineDef::try_from(&tline(Definition::TLine)).unwrap().kind.code(), "ol");
        assert_eq!(LineDef::try_from(&tline(Definition::Cable)).unwrap().kind.code(), "cs");
        assert!(LineDef::try_from(&tline(Definition::Bus)).is_err());
    }

    #[test]
    fn terminals_and_constants_from_build_folder() {
        let mut fx = fixture("lf_line_terminals");
        let def = LineDef::try_from(&tline(Definition::TLine)).unwrap();
        def.add_to(&mut fx.context()).unwrap();

        let line = &fx.network.line[0];
        // first node label is the to-bus
        assert_eq!((line.to_bus, line.from_bus), (1, 2));
        // z_base = 100 ohm
        assert!((line.r_ohm_per_km - 0.1).abs() < 1e-9);
        assert!((line.x_ohm_per_km - 0.5).abs() < 1e-9);
        let expected_c = 0.02 / 100.0 / 10.0 / (2.0 * std::f64::consts::PI * 60.0) * 1e9;
        assert!((line.c_nf_per_km - expected_c).abs() < 1e-6);
        assert_eq!(line.max_i_ka, DEFAULT_MAX_I_KA);
        assert_eq!(line.type_, "ol");
    }

    #[test]
    fn max_current_override() {
        let mut fx = fixture("lf_line_override");
        fx.overrides.line = OverrideTable::from_rows([LineOverride {
            name: "TL1".into(),
            max_i_ka: Some(0.8),
        }]);
        let def = LineDef::try_from(&tline(Definition::Cable)).unwrap();
        def.add_to(&mut fx.context()).unwrap();
        assert_eq!(fx.network.line[0].max_i_ka, 0.8);
    }

    #[test]
    fn missing_report_is_io_error() {
        let mut fx = fixture("lf_line_missing_report");
        std::fs::remove_file(fx.settings.build_dir.join("TL1.out")).unwrap();
        let def = LineDef::try_from(&tline(Definition::TLine)).unwrap();
        let err = def.add_to(&mut fx.context()).unwrap_err();
        assert!(matches!(err, ComponentError::Io { .. }));
    }

    #[test]
    fn node_map_read_lazily_from_build_folder() {
        let mut fx = fixture("lf_line_lazy_node_map");
        fx.node_map = None;
        std::fs::write(fx.settings.build_dir.join("main.dta"), DTA).unwrap();
        let def = LineDef::try_from(&tline(Definition::TLine)).unwrap();
        def.add_to(&mut fx.context()).unwrap();
        assert_eq!(fx.network.line.len(), 1);
    }
}

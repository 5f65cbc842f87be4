//! Shared parameter access helpers.

use lf_core::parse_quantity;
use lf_project::SchematicComponent;
use lf_topology::Point;

use crate::error::{ComponentError, ComponentResult};

/// Raw text of a required parameter.
pub fn text<'a>(comp: &'a SchematicComponent, key: &'static str) -> ComponentResult<&'a str> {
    comp.param(key)
        .ok_or_else(|| ComponentError::MissingParameter {
            component: comp.display_name(),
            key,
        })
}

/// Numeric value of a required, possibly unit-suffixed parameter.
pub fn quantity(comp: &SchematicComponent, key: &'static str) -> ComponentResult<f64> {
    let raw = text(comp, key)?;
    parse_quantity(raw).map_err(|_| ComponentError::InvalidQuantity {
        component: comp.display_name(),
        key,
        raw: raw.to_string(),
    })
}

/// Numeric value of an optional parameter; absent means `None`, malformed is an error.
pub fn optional_quantity(
    comp: &SchematicComponent,
    key: &'static str,
) -> ComponentResult<Option<f64>> {
    match comp.param(key) {
        None => Ok(None),
        Some(_) => quantity(comp, key).map(Some),
    }
}

pub fn port(comp: &SchematicComponent, name: &'static str) -> ComponentResult<Point> {
    comp.port(name).ok_or_else(|| ComponentError::MissingPort {
        component: comp.display_name(),
        port: name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_project::Definition;
    use std::collections::BTreeMap;

    fn comp() -> SchematicComponent {
        SchematicComponent {
            id: 5,
            definition: Definition::FixedLoad,
            location: Point::default(),
            vertices: vec![],
            ports: BTreeMap::from([("IA".to_string(), Point::new(3, 4))]),
            parameters: BTreeMap::from([
                ("PO".to_string(), "0.5 [MW]".to_string()),
                ("QO".to_string(), "n/a".to_string()),
            ]),
        }
    }

    #[test]
    fn quantity_reads_unit_suffixed_values() {
        assert_eq!(quantity(&comp(), "PO").unwrap(), 0.5);
    }

    #[test]
    fn quantity_errors_name_the_component() {
        let err = quantity(&comp(), "QO").unwrap_err();
        assert!(matches!(err, ComponentError::InvalidQuantity { key: "QO", .. }));
        let err = quantity(&comp(), "Tmva").unwrap_err();
        assert!(err.to_string().contains("'5'"));
    }

    #[test]
    fn optional_quantity_absent() {
        assert_eq!(optional_quantity(&comp(), "Sbase").unwrap(), None);
        assert!(optional_quantity(&comp(), "QO").is_err());
    }

    #[test]
    fn port_lookup() {
        assert_eq!(port(&comp(), "IA").unwrap(), Point::new(3, 4));
        assert!(port(&comp(), "N1").is_err());
    }
}

//! Schematic snapshot validation.

use std::collections::HashSet;

use crate::schema::{Definition, SCHEMA_VERSION, SchematicDoc};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing field: {field} on component {id}")]
    MissingField { id: u64, field: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_schematic(doc: &SchematicDoc) -> Result<(), ValidationError> {
    if doc.version > SCHEMA_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: doc.version,
        });
    }

    let mut ids = HashSet::new();
    let mut bus_names = HashSet::new();
    for comp in &doc.components {
        if !ids.insert(comp.id) {
            return Err(ValidationError::DuplicateId {
                id: comp.id.to_string(),
                context: "components".to_string(),
            });
        }

        for port in comp.definition.required_ports() {
            if comp.port(port).is_none() {
                return Err(ValidationError::MissingField {
                    id: comp.id,
                    field: format!("port {port}"),
                });
            }
        }

        match comp.definition {
            Definition::Bus => {
                let name = comp.param("Name").map(str::trim).unwrap_or_default();
                if name.is_empty() {
                    return Err(ValidationError::MissingField {
                        id: comp.id,
                        field: "Name".to_string(),
                    });
                }
                if !bus_names.insert(name) {
                    return Err(ValidationError::DuplicateId {
                        id: name.to_string(),
                        context: "bus names".to_string(),
                    });
                }
            }
            Definition::Wire if comp.vertices.len() < 2 => {
                return Err(ValidationError::InvalidValue {
                    field: format!("component {} vertices", comp.id),
                    value: comp.vertices.len().to_string(),
                    reason: "a wire needs at least two vertices".to_string(),
                });
            }
            Definition::Capacitor if comp.port("A").is_none() && comp.port("B").is_none() => {
                return Err(ValidationError::MissingField {
                    id: comp.id,
                    field: "port A or B".to_string(),
                });
            }
            _ => {}
        }
    }

    Ok(())
}

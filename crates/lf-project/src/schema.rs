//! Schematic snapshot definitions.

use std::collections::BTreeMap;

use lf_topology::Point;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One schematic canvas as exported from the drawing tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchematicDoc {
    pub version: u32,
    /// Project name; names the simulation build folder.
    pub name: String,
    #[serde(default)]
    pub components: Vec<SchematicComponent>,
}

/// Component definition tags as they appear on the canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Definition {
    #[serde(rename = "Bus")]
    Bus,
    #[serde(rename = "WireOrthogonal")]
    Wire,
    #[serde(rename = "master:multimeter")]
    Multimeter,
    #[serde(rename = "master:pin")]
    Pin,
    #[serde(rename = "master:xfmr-3p2w")]
    Transformer,
    #[serde(rename = "master:fixed_load")]
    FixedLoad,
    #[serde(rename = "master:source3")]
    Source3,
    #[serde(rename = "master:source_3")]
    Source3Pu,
    #[serde(rename = "TLine")]
    TLine,
    #[serde(rename = "Cable")]
    Cable,
    #[serde(rename = "master:capacitor")]
    Capacitor,
    /// Anything the bridge does not model (meters, breakers, annotations...).
    #[serde(other)]
    Other,
}

impl Definition {
    /// Canvas tag string.
    pub fn tag(self) -> &'static str {
        match self {
            Definition::Bus => "Bus",
            Definition::Wire => "WireOrthogonal",
            Definition::Multimeter => "master:multimeter",
            Definition::Pin => "master:pin",
            Definition::Transformer => "master:xfmr-3p2w",
            Definition::FixedLoad => "master:fixed_load",
            Definition::Source3 => "master:source3",
            Definition::Source3Pu => "master:source_3",
            Definition::TLine => "TLine",
            Definition::Cable => "Cable",
            Definition::Capacitor => "master:capacitor",
            Definition::Other => "other",
        }
    }

    /// Ports every instance of this definition must expose.
    pub fn required_ports(self) -> &'static [&'static str] {
        match self {
            Definition::Multimeter => &["A", "B"],
            Definition::Transformer => &["N1", "N2"],
            Definition::FixedLoad => &["IA"],
            Definition::Source3 => &["N3"],
            Definition::Source3Pu => &["N"],
            _ => &[],
        }
    }
}

/// A placed component: geometry plus its raw parameter dictionary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchematicComponent {
    pub id: u64,
    pub definition: Definition,
    #[serde(default)]
    pub location: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Point>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<String, Point>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl SchematicComponent {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn port(&self, name: &str) -> Option<Point> {
        self.ports.get(name).copied()
    }

    /// The `Name` parameter if non-empty, otherwise the component id.
    pub fn display_name(&self) -> String {
        match self.param("Name").map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.to_string(),
        }
    }
}

//! Branch terminals from the build folder's `main.dta`.
//!
//! Each branch is introduced by a `! <name>` header; the first token of the
//! second and third lines after it are the branch's two node labels. The
//! section between `! Local Node Voltages` and `! Local Branch Data` maps each
//! node label to its bus: `<label> 0.0 ... // <BusName>(...)`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ComponentError, ComponentResult};

const NODE_SECTION_START: &str = "! Local Node Voltages";
const NODE_SECTION_END: &str = "! Local Branch Data";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMap {
    /// Header text after `!` -> (first node label, second node label)
    branches: Vec<(String, (String, String))>,
    /// Node label -> bus name
    buses: HashMap<String, String>,
}

impl NodeMap {
    pub fn load(path: &Path) -> ComponentResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ComponentError::io(path, e))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut map = NodeMap::default();

        for (i, line) in lines.iter().enumerate() {
            let Some(header) = line.trim().strip_prefix('!') else {
                continue;
            };
            let first = lines.get(i + 2).and_then(|l| l.split_whitespace().next());
            let second = lines.get(i + 3).and_then(|l| l.split_whitespace().next());
            if let (Some(a), Some(b)) = (first, second) {
                map.branches
                    .push((header.trim().to_string(), (a.to_string(), b.to_string())));
            }
        }

        let start = lines.iter().position(|l| l.contains(NODE_SECTION_START));
        let end = lines.iter().position(|l| l.contains(NODE_SECTION_END));
        if let Some(start) = start {
            let end = end.filter(|&e| e > start).unwrap_or(lines.len());
            for line in &lines[start + 1..end] {
                if let Some((label, bus)) = parse_node_line(line) {
                    map.buses.insert(label, bus);
                }
            }
        }

        map
    }

    /// Bus names at the branch's (first, second) node labels.
    ///
    /// An exact header match wins; otherwise the last header whose first word is `name`.
    pub fn branch_buses(&self, name: &str) -> ComponentResult<(String, String)> {
        let labels = self
            .branches
            .iter()
            .rev()
            .find(|(header, _)| header == name)
            .or_else(|| {
                self.branches
                    .iter()
                    .rev()
                    .find(|(header, _)| header.split_whitespace().next() == Some(name))
            })
            .map(|(_, labels)| labels)
            .ok_or_else(|| ComponentError::UnknownBranch {
                name: name.to_string(),
            })?;

        Ok((self.bus_of(&labels.0)?, self.bus_of(&labels.1)?))
    }

    pub fn bus_of(&self, label: &str) -> ComponentResult<String> {
        self.buses
            .get(label)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownNodeLabel {
                label: label.to_string(),
            })
    }
}

/// `"  NT_12   0.0   0.0  // Bus3(kV)"` -> ("NT_12", "Bus3")
fn parse_node_line(line: &str) -> Option<(String, String)> {
    let (head, tail) = line.split_once("//")?;
    let label = head.split_whitespace().next()?;
    let bus = tail.trim_start().split('(').next()?.trim();
    if bus.is_empty() {
        return None;
    }
    Some((label.to_string(), bus.to_string()))
}

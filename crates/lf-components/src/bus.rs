//! Bus symbols.

use lf_core::digits_index;
use lf_project::SchematicComponent;

use crate::common::{quantity, text};
use crate::error::{ComponentError, ComponentResult};
use crate::extract::ExtractContext;
use crate::traits::{NetworkElement, Placement, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct BusDef {
    pub name: String,
    pub vn_kv: f64,
}

impl BusDef {
    /// Index taken from the digits in the bus name (`"Bus12"` -> 12).
    pub fn name_index(&self) -> ComponentResult<usize> {
        digits_index(&self.name).ok_or_else(|| ComponentError::NoBusDigits {
            name: self.name.clone(),
        })
    }
}

impl TryFrom<&SchematicComponent> for BusDef {
    type Error = ComponentError;

    fn try_from(comp: &SchematicComponent) -> ComponentResult<Self> {
        Ok(Self {
            name: text(comp, "Name")?.trim().to_string(),
            vn_kv: quantity(comp, "BaseKV")?,
        })
    }
}

impl NetworkElement for BusDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement> {
        let index = if ctx.settings.similar_bus_indices {
            Some(self.name_index()?)
        } else {
            None
        };
        let index = ctx.network.create_bus(self.name.clone(), self.vn_kv, index)?;
        Ok(Placement::new(Table::Bus, index))
    }
}

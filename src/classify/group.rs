use serde::{Deserialize, Serialize};

use super::{CellId, ClassId, GroupId};
use crate::NpnMap;

/// Cells sharing one exact [`Signature`](crate::Signature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGroup {
    pub(super) id: GroupId,
    pub(super) class_id: ClassId,
    /// From the group's pin order to the class's canonical order.
    pub(super) map: NpnMap,
    pub(super) cells: Vec<CellId>,
}

impl CellGroup {
    pub fn get_id(&self) -> GroupId {
        self.id
    }

    pub fn get_class_id(&self) -> ClassId {
        self.class_id
    }

    /// Transform from this group's signature to its class's canonical signature.
    pub fn get_map(&self) -> &NpnMap {
        &self.map
    }

    /// Member cells, in the order they were added.
    pub fn get_cells(&self) -> &[CellId] {
        &self.cells
    }
}

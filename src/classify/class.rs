use serde::{Deserialize, Serialize};

use super::{ClassId, GroupId};
use crate::{NpnMap, Signature};

/// Groups sharing one NPN canonical [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellClass {
    pub(super) id: ClassId,
    pub(super) signature: Signature,
    /// Non-identity transforms mapping the canonical signature onto itself.
    pub(super) idmaps: Vec<NpnMap>,
    pub(super) groups: Vec<GroupId>,
}

impl CellClass {
    pub fn get_id(&self) -> ClassId {
        self.id
    }

    pub fn get_signature(&self) -> &Signature {
        &self.signature
    }

    pub fn get_idmaps(&self) -> &[NpnMap] {
        &self.idmaps
    }

    pub fn get_groups(&self) -> &[GroupId] {
        &self.groups
    }
}

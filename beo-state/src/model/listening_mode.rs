//! Active listening mode

use beo_stream::ListeningModeRef;
use serde::{Deserialize, Serialize};

/// Sound mode the device reports as active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningMode {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl From<&ListeningModeRef> for ListeningMode {
    fn from(raw: &ListeningModeRef) -> Self {
        Self {
            id: raw.id,
            name: raw.name.clone(),
        }
    }
}

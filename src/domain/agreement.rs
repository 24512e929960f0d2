use serde::{Deserialize, Serialize};

pub type AgreementId = i64;

/// A party (customer) that owns zero or more accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    /// Assigned by the store on first save; `0` until then
    pub id: AgreementId,
    pub name: String,
}

impl Agreement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    pub fn with_id(mut self, id: AgreementId) -> Self {
        self.id = id;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identifier::Identifier;
use super::qualified_name::QualifiedTableName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(Uuid);

impl TableId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TableId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Link,
    #[default]
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOwner {
    pub username: String,
    #[serde(default)]
    pub organization: Option<String>,
}

/// A table registered on the platform, owned by one user whose username is
/// the table's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTable {
    #[serde(default)]
    pub id: TableId,
    pub name: String,
    pub owner: TableOwner,
    #[serde(default)]
    pub privacy: Privacy,
}

impl UserTable {
    pub fn new(name: impl Into<String>, owner: TableOwner) -> Self {
        Self {
            id: TableId::new(),
            name: name.into(),
            owner,
            privacy: Privacy::default(),
        }
    }

    pub fn with_privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn qualified_name(&self) -> QualifiedTableName {
        QualifiedTableName::new(
            Identifier::from_raw(self.owner.username.clone()),
            Identifier::from_raw(self.name.clone()),
        )
    }
}

/// Handle to a catalog table that a layer reads. Carries enough to address
/// the table again; the catalog stays the owner of the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffectedTable {
    pub id: TableId,
    pub schema: String,
    pub name: String,
    pub privacy: Privacy,
}

impl AffectedTable {
    pub fn is_private(&self) -> bool {
        self.privacy == Privacy::Private
    }

    pub fn qualified_name(&self) -> QualifiedTableName {
        QualifiedTableName::new(
            Identifier::from_raw(self.schema.clone()),
            Identifier::from_raw(self.name.clone()),
        )
    }
}

impl From<&UserTable> for AffectedTable {
    fn from(table: &UserTable) -> Self {
        Self {
            id: table.id,
            schema: table.owner.username.clone(),
            name: table.name.clone(),
            privacy: table.privacy,
        }
    }
}

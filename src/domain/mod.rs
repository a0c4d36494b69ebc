pub mod identifier;
pub mod layer;
pub mod qualified_name;
pub mod table;
pub mod user;

pub use identifier::{Identifier, is_identifier_char, is_plain_identifier, needs_quoting, quote_ident};
pub use layer::{Layer, LayerId, LayerKind, LayerKindError, LayerNodeStyle};
pub use qualified_name::QualifiedTableName;
pub use table::{AffectedTable, Privacy, TableId, TableOwner, UserTable};
pub use user::{ActingUser, ActingUserError};

//! sea-orm table models. Hand-maintained to match `migration`.

pub mod prelude;

pub mod booking;
pub mod event;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Ordered list of strings stored in a single JSON column.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct StringList(pub Vec<String>);

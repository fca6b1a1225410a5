use serde::{Deserialize, Serialize};

use storefront_core::{CustomerId, Entity};

/// A customer that can place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

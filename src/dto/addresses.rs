use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::Address;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    pub title: String,
    pub recipient_name: String,
    pub phone: String,
    pub detail: String,
}

impl AddressRequest {
    /// Trims every field and collects one message per blank field.
    pub fn normalized(self) -> Result<Self, Vec<String>> {
        let normalized = Self {
            title: self.title.trim().to_string(),
            recipient_name: self.recipient_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            detail: self.detail.trim().to_string(),
        };
        let mut errors = Vec::new();
        for (field, value) in [
            ("title", &normalized.title),
            ("recipient_name", &normalized.recipient_name),
            ("phone", &normalized.phone),
            ("detail", &normalized.detail),
        ] {
            if value.is_empty() {
                errors.push(format!("{field} is required"));
            }
        }
        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    /// Case-insensitive substring match on the address title.
    pub title: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AddressList {
    #[schema(value_type = Vec<Address>)]
    pub items: Vec<Address>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The caller's own account, with region names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// `dd/mm/yyyy`, empty when unset.
    pub birth_date: String,
    pub job: String,
    pub is_admin: bool,
    pub province: ProfileProvince,
    pub city: ProfileCity,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProfileProvince {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProfileCity {
    pub id: String,
    pub province_id: String,
    pub name: String,
}

/// Partial profile update; omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    /// `dd/mm/yyyy`; an empty string clears it.
    pub birth_date: Option<String>,
    pub job: Option<String>,
    pub province_id: Option<String>,
    pub city_id: Option<String>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PresenceUserDto {
    pub userid: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PresenceBucketDto {
    pub total: usize,
    pub users: Vec<PresenceUserDto>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ServerPresenceDto {
    pub online: PresenceBucketDto,
    pub offline: PresenceBucketDto,
}

use serde::{Deserialize, Serialize};

/// The only payment-provider event that changes state.
pub const USER_UPGRADED: &str = "user.upgraded";

/// Inbound payment-provider notification. Unknown `event` values are
/// accepted and ignored, so this is not a closed enum. `data` is only
/// required for `user.upgraded`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    pub user_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub is_chirpy_red: bool,
}

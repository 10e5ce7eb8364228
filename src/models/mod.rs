// src/models/mod.rs
use serde::Serialize;

use crate::connection::SwitchOutcome;
use crate::session::SessionSnapshot;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Body returned by every session action endpoint.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_switch: Option<SwitchOutcome>,
    pub session: SessionSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success_sets_flag() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, "ok");
    }

    #[test]
    fn action_response_omits_missing_hash() {
        let body = serde_json::to_value(ActionResponse {
            tx_hash: None,
            network_switch: None,
            session: SessionSnapshot::default(),
        })
        .unwrap();
        assert!(body.get("tx_hash").is_none());
        assert!(body.get("network_switch").is_none());
        assert_eq!(body["session"]["connect_button_text"], "Connect");
    }

    #[test]
    fn network_switch_reports_registration_failure_reason() {
        let body = serde_json::to_value(ActionResponse {
            tx_hash: None,
            network_switch: Some(SwitchOutcome::RegistrationFailed("denied".into())),
            session: SessionSnapshot::default(),
        })
        .unwrap();
        assert_eq!(
            body["network_switch"],
            serde_json::json!({ "result": "registration_failed", "reason": "denied" })
        );
    }
}

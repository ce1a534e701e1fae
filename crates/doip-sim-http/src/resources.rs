//! Wire resources (DTOs) for the control surface
//!
//! Link-decorated projections of the live domain objects. Instances are
//! built fresh for every request and discarded once the response is
//! written; nothing here is cached or shared.
//!
//! Field names follow the established wire format (camelCase); optional
//! fields are omitted from JSON entirely when absent.

use serde::{Deserialize, Serialize};

/// Overview document served at `/doip-simulation/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    pub platforms: Vec<Platform>,
}

/// A named simulation platform with its gateways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    /// Mirrors the domain state token (STOPPED, RUNNING, ...).
    pub status: String,
    pub url: String,
    pub gateways: Vec<Gateway>,
}

/// A platform's network entry point.
///
/// `ecus` is only populated on the dedicated gateway resource; overview and
/// platform documents list gateways without ECU detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub name: String,
    pub status: String,
    /// Bind/config failure detail, present only for failed gateways.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecus: Option<Vec<Ecu>>,
}

/// A simulated ECU with its two lookup tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ecu {
    pub name: String,
    pub url: String,
    pub configured_lookup_table: Vec<LookupEntry>,
    pub runtime_lookup_table: Vec<LookupEntry>,
}

/// One regex → response mapping. `modifiers` may be empty but is never
/// null on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupEntry {
    pub regex: String,
    pub result: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// Regex/result override applied after a base match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    pub regex: String,
    pub result: String,
}

/// Platform lifecycle action.
///
/// Unknown tokens fail deserialization; there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Stop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
        }
    }

    /// Parse a query-parameter token. Same token set as the JSON form.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Action::Start),
            "stop" => Some(Action::Stop),
            _ => None,
        }
    }
}

/// Body of a platform action request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn action_request_rejects_unknown_action() {
        assert!(serde_json::from_str::<ActionRequest>(r#"{"action":"start"}"#).is_ok());
        assert!(serde_json::from_str::<ActionRequest>(r#"{"action":"stop"}"#).is_ok());
        assert!(serde_json::from_str::<ActionRequest>(r#"{"action":"bogus"}"#).is_err());
        assert!(serde_json::from_str::<ActionRequest>(r#"{"action":""}"#).is_err());
        assert!(serde_json::from_str::<ActionRequest>(r#"{}"#).is_err());
    }

    #[test]
    fn gateway_omits_absent_optionals() {
        let gateway = Gateway {
            name: "GW".into(),
            status: "RUNNING".into(),
            error: None,
            url: "http://localhost:8080/doip-simulation/platform/X2024/gateway/GW".into(),
            ecus: None,
        };
        let json = serde_json::to_string(&gateway).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("ecus"));
    }

    #[test]
    fn lookup_entry_modifiers_default_to_empty() {
        let entry: LookupEntry =
            serde_json::from_str(r#"{"regex":"10 03","result":"50 03"}"#).unwrap();
        assert!(entry.modifiers.is_empty());

        // and serialize as an array, never null
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""modifiers":[]"#));
    }

    #[test]
    fn gateway_round_trip_preserves_structure() {
        let entry = LookupEntry {
            regex: "10 03".into(),
            result: "50 03 00 32 01 F4".into(),
            modifiers: vec![Modifier {
                regex: "22 F1 86".into(),
                result: "62 F1 86 03".into(),
            }],
        };
        let ecu = |name: &str| Ecu {
            name: name.into(),
            url: format!(
                "http://localhost:8080/doip-simulation/platform/X2024/gateway/GW/ecu/{name}"
            ),
            configured_lookup_table: vec![entry.clone()],
            runtime_lookup_table: vec![entry.clone()],
        };
        let gateway = Gateway {
            name: "GW".into(),
            status: "RUNNING".into(),
            error: None,
            url: "http://localhost:8080/doip-simulation/platform/X2024/gateway/GW".into(),
            ecus: Some(vec![ecu("EMS"), ecu("TCM")]),
        };

        let json = serde_json::to_string(&gateway).unwrap();
        assert!(json.contains("configuredLookupTable"));
        let back: Gateway = serde_json::from_str(&json).unwrap();

        let ecus = back.ecus.unwrap();
        assert_eq!(ecus.len(), 2);
        for ecu in &ecus {
            assert_eq!(ecu.configured_lookup_table[0].regex, "10 03");
            assert_eq!(ecu.runtime_lookup_table[0].modifiers.len(), 1);
            assert_eq!(ecu.runtime_lookup_table[0].modifiers[0].result, "62 F1 86 03");
        }
    }
}

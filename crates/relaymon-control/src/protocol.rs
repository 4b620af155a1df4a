use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operation requested by the remote controller.
///
/// Unrecognized operation names are preserved in [`Operation::Unknown`] so
/// the dispatcher can answer with an error response instead of failing the
/// read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    GetPlugin,
    AddPlugin,
    UpdatePlugin,
    DeletePlugin,
    GetAllPlugins,
    Unknown(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::GetPlugin => "GET_PLUGIN",
            Operation::AddPlugin => "ADD_PLUGIN",
            Operation::UpdatePlugin => "UPDATE_PLUGIN",
            Operation::DeletePlugin => "DELETE_PLUGIN",
            Operation::GetAllPlugins => "GET_ALL_PLUGINS",
            Operation::Unknown(op) => op,
        }
    }
}

impl From<String> for Operation {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GET_PLUGIN" => Operation::GetPlugin,
            "ADD_PLUGIN" => Operation::AddPlugin,
            "UPDATE_PLUGIN" => Operation::UpdatePlugin,
            "DELETE_PLUGIN" => Operation::DeletePlugin,
            "GET_ALL_PLUGINS" => Operation::GetAllPlugins,
            _ => Operation::Unknown(s),
        }
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin descriptor attached to plugin-management requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginDescriptor {
    pub name: String,
    #[serde(rename = "Type")]
    pub plugin_type: String,
    pub config: HashMap<String, serde_json::Value>,
}

/// One inbound message from the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub operation: Operation,
    pub uuid: String,
    #[serde(default)]
    pub plugin: Option<PluginDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Error,
}

/// One outbound message, correlated to its request by `uuid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    pub status: Status,
    pub uuid: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Response {
    pub fn success(uuid: &str, data: serde_json::Value) -> Self {
        Self {
            status: Status::Success,
            uuid: uuid.to_string(),
            data,
        }
    }

    pub fn error(uuid: &str, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            uuid: uuid.to_string(),
            data: serde_json::Value::String(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_wire_shape() {
        let request: Request = serde_json::from_value(json!({
            "Operation": "GET_PLUGIN",
            "Uuid": "u-1",
            "Plugin": {
                "Name": "cpu",
                "Type": "input",
                "Config": {"percpu": true}
            }
        }))
        .unwrap();

        assert_eq!(request.operation, Operation::GetPlugin);
        assert_eq!(request.uuid, "u-1");
        let plugin = request.plugin.unwrap();
        assert_eq!(plugin.name, "cpu");
        assert_eq!(plugin.plugin_type, "input");
        assert_eq!(plugin.config.get("percpu"), Some(&json!(true)));
    }

    #[test]
    fn request_without_plugin_parses() {
        let request: Request = serde_json::from_value(json!({
            "Operation": "GET_ALL_PLUGINS",
            "Uuid": "u-2"
        }))
        .unwrap();
        assert_eq!(request.operation, Operation::GetAllPlugins);
        assert!(request.plugin.is_none());
    }

    #[test]
    fn unknown_operation_is_preserved() {
        let request: Request = serde_json::from_value(json!({
            "Operation": "REBOOT_UNIVERSE",
            "Uuid": "u-3"
        }))
        .unwrap();
        assert_eq!(
            request.operation,
            Operation::Unknown("REBOOT_UNIVERSE".to_string())
        );
        assert_eq!(request.operation.as_str(), "REBOOT_UNIVERSE");
    }

    #[test]
    fn response_serializes_wire_shape() {
        let response = Response::success("u-1", json!({"plugins": []}));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"Status": "SUCCESS", "Uuid": "u-1", "Data": {"plugins": []}})
        );

        let response = Response::error("u-2", "invalid operation request");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"Status": "ERROR", "Uuid": "u-2", "Data": "invalid operation request"})
        );
    }

    #[test]
    fn operation_round_trips_through_string() {
        for op in [
            Operation::GetPlugin,
            Operation::AddPlugin,
            Operation::UpdatePlugin,
            Operation::DeletePlugin,
            Operation::GetAllPlugins,
        ] {
            let s: String = op.clone().into();
            assert_eq!(Operation::from(s), op);
        }
    }
}

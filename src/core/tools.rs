//! Static tool manifest declared to the upstream model.
//!
//! The relay only declares these functions; the browser client (or whatever
//! pharmacy system sits behind it) receives the model's tool calls through the
//! relayed frames and answers them.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Pages the assistant may navigate to.
pub const NAVIGATION_PAGES: &[&str] = &[
    "dashboard",
    "inventory",
    "cart",
    "billing",
    "orders",
    "reports",
    "settings",
];

/// Applications the assistant may open as shortcuts.
pub const APP_SHORTCUTS: &[&str] = &["youtube", "whatsapp", "gmail", "google_maps", "calculator"];

/// Payment methods accepted when generating a bill.
pub const PAYMENT_METHODS: &[&str] = &["cash", "card", "upi", "mobile_banking"];

/// A single callable function as declared to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does, written for the model
    pub description: String,
    /// OpenAPI-style parameter schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl FunctionDeclaration {
    fn new(name: &str, description: &str, parameters: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// The full pharmacy tool manifest, in declaration order.
pub fn tool_manifest() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration::new(
            "check_stock",
            "Look up current stock and availability of a medicine. Use when the user asks \
             whether a medicine is available or how much is left.",
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "medicine_name": {
                        "type": "STRING",
                        "description": "Medicine name exactly as the user said it, e.g. \"paracetamol\"."
                    }
                },
                "required": ["medicine_name"]
            })),
        ),
        FunctionDeclaration::new(
            "add_to_cart",
            "Add a medicine to the current cart.",
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "medicine_name": {
                        "type": "STRING",
                        "description": "Medicine to add."
                    },
                    "quantity": {
                        "type": "INTEGER",
                        "description": "Number of units. Use 1 when the user does not say."
                    }
                },
                "required": ["medicine_name"]
            })),
        ),
        FunctionDeclaration::new(
            "remove_from_cart",
            "Remove a medicine from the current cart.",
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "medicine_name": {
                        "type": "STRING",
                        "description": "Medicine to remove."
                    }
                },
                "required": ["medicine_name"]
            })),
        ),
        FunctionDeclaration::new(
            "clear_cart",
            "Remove every item from the current cart. Use for \"clear cart\" or \"empty cart\".",
            None,
        ),
        FunctionDeclaration::new(
            "generate_bill",
            "Finalise the current cart and generate a bill.",
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "customer_name": {
                        "type": "STRING",
                        "description": "Customer name for the bill, if given."
                    },
                    "payment_method": {
                        "type": "STRING",
                        "enum": PAYMENT_METHODS,
                        "description": "How the customer pays, if given."
                    }
                }
            })),
        ),
        FunctionDeclaration::new(
            "navigate_to",
            "Switch the pharmacy application to another page.",
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "page": {
                        "type": "STRING",
                        "enum": NAVIGATION_PAGES,
                        "description": "Destination page."
                    }
                },
                "required": ["page"]
            })),
        ),
        FunctionDeclaration::new(
            "open_app",
            "Open an external application shortcut, e.g. \"open youtube\".",
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "app": {
                        "type": "STRING",
                        "enum": APP_SHORTCUTS,
                        "description": "Application to open."
                    }
                },
                "required": ["app"]
            })),
        ),
    ]
}

/// Names of every declared tool.
pub fn tool_names() -> Vec<String> {
    tool_manifest().into_iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn find(name: &str) -> FunctionDeclaration {
        tool_manifest()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("missing tool {name}"))
    }

    #[test]
    fn test_manifest_covers_pharmacy_actions() {
        let names = tool_names();
        for expected in [
            "check_stock",
            "add_to_cart",
            "remove_from_cart",
            "clear_cart",
            "generate_bill",
            "navigate_to",
            "open_app",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_tool_names_unique() {
        let names = tool_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_required_parameters_are_declared() {
        for tool in tool_manifest() {
            let Some(params) = tool.parameters else {
                continue;
            };
            let properties = params["properties"].as_object().unwrap();
            if let Some(required) = params["required"].as_array() {
                for field in required {
                    let field = field.as_str().unwrap();
                    assert!(
                        properties.contains_key(field),
                        "{} requires undeclared {}",
                        tool.name,
                        field
                    );
                }
            }
        }
    }

    #[test]
    fn test_add_to_cart_quantity_optional() {
        let params = find("add_to_cart").parameters.unwrap();
        assert_eq!(params["required"], json!(["medicine_name"]));
        assert_eq!(params["properties"]["quantity"]["type"], "INTEGER");
    }

    #[test]
    fn test_enums_match_constants() {
        let nav = find("navigate_to").parameters.unwrap();
        assert_eq!(nav["properties"]["page"]["enum"], json!(NAVIGATION_PAGES));

        let apps = find("open_app").parameters.unwrap();
        assert!(
            apps["properties"]["app"]["enum"]
                .as_array()
                .unwrap()
                .contains(&json!("youtube"))
        );
    }

    #[test]
    fn test_clear_cart_serializes_without_parameters() {
        let value = serde_json::to_value(find("clear_cart")).unwrap();
        assert!(value.get("parameters").is_none());
        assert_eq!(value["name"], "clear_cart");
    }
}

//! Built-in node types
//!
//! Every registry starts with these. Projects can add more through a node
//! library (see [`Config::load_library`](crate::Config::load_library)).

use serde_json::json;

use crate::node::{NodeDefinition, ParameterDefinition, ParameterKind, PortDefinition, PortType};

/// Type key of the development test node
pub const TEST_NODE: &str = "test-node";

/// Type key of the empty placeholder node
pub const EMPTY_NODE: &str = "empty-node";

/// All built-in definitions, in registration order
pub fn definitions() -> Vec<NodeDefinition> {
    vec![test_node(), empty_node()]
}

/// A node exercising every port and parameter shape, for editor development
pub fn test_node() -> NodeDefinition {
    let mut text = ParameterDefinition::new("textParam", ParameterKind::Text);
    text.display_name = "Text Parameter".to_string();
    text.description = "A text parameter".to_string();
    text.default_value = Some(json!("Default text"));

    let mut number = ParameterDefinition::new("numberParam", ParameterKind::Number);
    number.display_name = "Number Parameter".to_string();
    number.description = "A number parameter".to_string();
    number.default_value = Some(json!(42));

    let mut slider = ParameterDefinition::new("sliderParam", ParameterKind::Slider);
    slider.display_name = "Slider Parameter".to_string();
    slider.description = "A slider parameter".to_string();
    slider.default_value = Some(json!(50));
    slider.min = Some(0.0);
    slider.max = Some(100.0);
    slider.step = Some(1.0);

    let mut dropdown = ParameterDefinition::new("dropdownParam", ParameterKind::Dropdown);
    dropdown.display_name = "Dropdown Parameter".to_string();
    dropdown.description = "A dropdown parameter".to_string();
    dropdown.default_value = Some(json!("option1"));
    dropdown.options = Some(vec![
        "option1".to_string(),
        "option2".to_string(),
        "option3".to_string(),
    ]);

    NodeDefinition {
        type_key: TEST_NODE.to_string(),
        category: "testing".to_string(),
        description: "A test node for development".to_string(),
        icon: None,
        inputs: vec![
            port("input1", "Input 1", "First input"),
            port("input2", "Input 2", "Second input"),
        ],
        outputs: vec![
            port("output1", "Output 1", "First output"),
            port("output2", "Output 2", "Second output"),
        ],
        parameters: vec![text, number, slider, dropdown],
    }
}

/// A node with no ports and no parameters
pub fn empty_node() -> NodeDefinition {
    NodeDefinition {
        type_key: EMPTY_NODE.to_string(),
        category: "basic".to_string(),
        description: "An empty node for testing".to_string(),
        icon: None,
        inputs: vec![],
        outputs: vec![],
        parameters: vec![],
    }
}

fn port(name: &str, display_name: &str, description: &str) -> PortDefinition {
    PortDefinition {
        name: name.to_string(),
        data_type: PortType::Any,
        display_name: display_name.to_string(),
        description: description.to_string(),
    }
}

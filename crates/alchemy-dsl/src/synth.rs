//! Node-definition synthesis.
//!
//! Turns a `node` block from the source into a canonical [`NodeDefinition`]
//! descriptor that the registry can hold.

use alchemy_core::registry::DYNAMIC_CATEGORY;
use alchemy_core::{
    NodeDefinition, ParameterDefinition, ParameterKind, PortDefinition, PortType,
    node::{display_value, numeric_value},
};
use serde_json::Value;

use crate::ast::{self, Literal, ParameterSpec, PortDecl};
use crate::error::{Error, Result};

/// Check that a definition has what synthesis needs: a name, and a name plus
/// type (or kind) on every port and parameter.
///
/// Duplicate names are not checked; the parser already keeps the last one.
pub fn validate(def: &ast::NodeDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::validation(
            "node definition must have a name",
            def.location,
        ));
    }

    let port_ok = |p: &PortDecl| !p.name.is_empty() && !p.type_name.is_empty();
    if !def.inputs.iter().all(port_ok) {
        return Err(invalid(def, "input"));
    }
    if !def.outputs.iter().all(port_ok) {
        return Err(invalid(def, "output"));
    }
    if !def
        .parameters
        .iter()
        .all(|p| !p.name.is_empty() && !p.kind_name.is_empty())
    {
        return Err(invalid(def, "parameter"));
    }

    Ok(())
}

fn invalid(def: &ast::NodeDefinition, what: &str) -> Error {
    Error::validation(
        format!("invalid {} definition in node {}", what, def.name),
        def.location,
    )
}

/// Build the descriptor for a definition. Call [`validate`] first.
pub fn synthesize(def: &ast::NodeDefinition) -> NodeDefinition {
    NodeDefinition {
        type_key: def.name.clone(),
        category: DYNAMIC_CATEGORY.to_string(),
        description: format!("Dynamically defined {} node", def.name),
        icon: None,
        inputs: def.inputs.iter().map(port).collect(),
        outputs: def.outputs.iter().map(port).collect(),
        parameters: def.parameters.iter().map(parameter).collect(),
    }
}

/// Validate, then synthesize
pub fn synthesize_validated(def: &ast::NodeDefinition) -> Result<NodeDefinition> {
    validate(def)?;
    Ok(synthesize(def))
}

fn port(decl: &PortDecl) -> PortDefinition {
    PortDefinition {
        name: decl.name.clone(),
        data_type: PortType::from_dsl(&decl.type_name),
        display_name: decl.name.clone(),
        description: format!("{} port of type {}", decl.name, decl.type_name),
    }
}

fn parameter(spec: &ParameterSpec) -> ParameterDefinition {
    let kind = ParameterKind::from_dsl(&spec.kind_name);
    let constraints: Vec<Value> = spec.constraints.iter().map(Literal::to_value).collect();

    let mut param = ParameterDefinition::new(&spec.name, kind);
    param.description = format!("Parameter {} of type {}", spec.name, spec.kind_name);
    param.default_value = constraints.first().cloned();

    if kind.is_numeric() {
        let bound = |i: usize| constraints.get(i).and_then(numeric_value);
        param.min = bound(0);
        param.max = bound(1);
        param.step = bound(2);
    } else if kind == ParameterKind::Dropdown && !constraints.is_empty() {
        param.options = Some(constraints.iter().map(display_value).collect());
    }

    param.constraints = constraints;
    param
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Location;
    use rstest::rstest;
    use serde_json::json;

    fn spec(name: &str, kind: &str, constraints: Vec<Literal>) -> ParameterSpec {
        ParameterSpec {
            name: name.into(),
            kind_name: kind.into(),
            constraints,
        }
    }

    fn blur() -> ast::NodeDefinition {
        let mut def = ast::NodeDefinition::new("Blur", Location::new(3, 5));
        def.add_input("in", "image");
        def.add_output("out", "Image");
        def.add_output("stats", "histogram");
        def.add_parameter(spec(
            "radius",
            "slider",
            vec![Literal::Number(0.0), Literal::Number(10.0), Literal::Number(1.0)],
        ));
        def
    }

    #[test]
    fn test_synthesize_descriptor() {
        let descriptor = synthesize_validated(&blur()).unwrap();

        assert_eq!(descriptor.type_key, "Blur");
        assert_eq!(descriptor.category, "dynamic");
        assert_eq!(descriptor.description, "Dynamically defined Blur node");

        let input = &descriptor.inputs[0];
        assert_eq!(input.display_name, "in");
        assert_eq!(input.data_type, PortType::Image);
        assert_eq!(input.description, "in port of type image");

        assert_eq!(descriptor.outputs[0].data_type, PortType::Image);
        assert_eq!(descriptor.outputs[1].data_type, PortType::Any);
        assert_eq!(
            descriptor.outputs[1].description,
            "stats port of type histogram"
        );
    }

    #[test]
    fn test_slider_bounds_and_default() {
        let descriptor = synthesize(&blur());
        let radius = descriptor.parameter("radius").unwrap();

        assert_eq!(radius.kind, ParameterKind::Slider);
        assert_eq!(radius.min, Some(0.0));
        assert_eq!(radius.max, Some(10.0));
        assert_eq!(radius.step, Some(1.0));
        assert_eq!(radius.default_value, Some(json!(0)));
        assert_eq!(radius.description, "Parameter radius of type slider");
        assert_eq!(radius.options, None);
    }

    #[rstest]
    #[case(vec![], None, None, None)]
    #[case(vec![Literal::Number(2.0)], Some(2.0), None, None)]
    #[case(vec![Literal::Number(1.0), Literal::Number(5.0)], Some(1.0), Some(5.0), None)]
    #[case(
        vec![Literal::Ident("low".into()), Literal::Number(5.0)],
        None,
        Some(5.0),
        None
    )]
    #[case(
        vec![Literal::String("0.5".into()), Literal::String("x".into()), Literal::Number(0.1)],
        Some(0.5),
        None,
        Some(0.1)
    )]
    fn test_numeric_bounds_are_independent(
        #[case] constraints: Vec<Literal>,
        #[case] min: Option<f64>,
        #[case] max: Option<f64>,
        #[case] step: Option<f64>,
    ) {
        let param = parameter(&spec("level", "number", constraints));
        assert_eq!(param.kind, ParameterKind::Number);
        assert_eq!((param.min, param.max, param.step), (min, max, step));
    }

    #[test]
    fn test_dropdown_options_are_stringified_in_order() {
        let param = parameter(&spec(
            "mode",
            "Dropdown",
            vec![
                Literal::String("fast".into()),
                Literal::Ident("slow".into()),
                Literal::Number(3.0),
                Literal::Number(0.5),
            ],
        ));
        assert_eq!(param.kind, ParameterKind::Dropdown);
        assert_eq!(
            param.options,
            Some(vec![
                "fast".to_string(),
                "slow".to_string(),
                "3".to_string(),
                "0.5".to_string()
            ])
        );
        assert_eq!(param.default_value, Some(json!("fast")));
        assert_eq!(param.min, None);
    }

    #[test]
    fn test_dropdown_without_constraints_has_no_options() {
        let param = parameter(&spec("mode", "dropdown", vec![]));
        assert_eq!(param.options, None);
        assert_eq!(param.default_value, None);
    }

    #[test]
    fn test_unknown_kind_defaults_to_text() {
        let param = parameter(&spec("note", "color", vec![Literal::Number(1.0)]));
        assert_eq!(param.kind, ParameterKind::Text);
        assert_eq!(param.description, "Parameter note of type color");
        assert_eq!(param.min, None);
        assert_eq!(param.default_value, Some(json!(1)));
    }

    #[test]
    fn test_validate_messages_name_the_node() {
        let unnamed = ast::NodeDefinition::new("", Location::new(1, 1));
        let err = validate(&unnamed).unwrap_err();
        assert_eq!(err.to_string(), "node definition must have a name");

        let mut bad_input = blur();
        bad_input.inputs.push(PortDecl {
            name: "mask".into(),
            type_name: String::new(),
        });
        assert_eq!(
            validate(&bad_input).unwrap_err().to_string(),
            "invalid input definition in node Blur"
        );

        let mut bad_output = blur();
        bad_output.outputs[0].name.clear();
        assert_eq!(
            validate(&bad_output).unwrap_err().to_string(),
            "invalid output definition in node Blur"
        );

        let mut bad_param = blur();
        bad_param.parameters[0].kind_name.clear();
        let err = validate(&bad_param).unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter definition in node Blur");

        let diagnostic = err.to_diagnostic();
        assert_eq!((diagnostic.line, diagnostic.column), (Some(3), Some(5)));
    }
}

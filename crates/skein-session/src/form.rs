//! The action encoder: turns a chosen action plus parameter values into
//! the text token the backend parses as structured input.
//!
//! ```text
//! ~action_move:direction=north,quietly=true
//! ```
//!
//! Some parameter names are *significant*: their valid values are the
//! names of things in the current world, not whatever the action schema
//! happened to declare. A `direction` parameter can only be a portal that
//! exists right now, so its options are recomputed from the snapshot
//! each time a form is built.

use skein_protocol::{Action, Parameter, ParameterValue, World};

use crate::SessionError;

/// Parameter names whose options come from the live world.
pub const SIGNIFICANT_PARAMETERS: [&str; 5] =
    ["character", "direction", "item", "room", "target"];

/// Parameters with this name are placeholders and never encoded.
const UNUSED_PARAMETER: &str = "unused";

/// The valid values of a significant parameter, read from `world`.
///
/// Returns `None` for names that are not significant.
pub fn significant_values(name: &str, world: &World) -> Option<Vec<String>> {
    let characters = || world.characters().map(|c| c.name.clone());
    let items = || world.items().map(|i| i.name.clone());

    let values: Vec<String> = match name {
        "character" => characters().collect(),
        "direction" => world.portals().map(|p| p.name.clone()).collect(),
        "item" => items().collect(),
        "room" => world.rooms.iter().map(|r| r.name.clone()).collect(),
        "target" => characters().chain(items()).collect(),
        _ => return None,
    };
    Some(values)
}

/// One parameter of an [`ActionForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    name: String,
    parameter: Parameter,
    options: Option<Vec<ParameterValue>>,
    value: ParameterValue,
}

impl FormField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The values this field may take, if it is restricted to a set.
    pub fn options(&self) -> Option<&[ParameterValue]> {
        self.options.as_deref()
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }
}

/// Parameter values being filled in for one action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionForm {
    action: String,
    fields: Vec<FormField>,
}

impl ActionForm {
    /// Builds a form for `action`, with every field at its default.
    ///
    /// With a world, significant non-boolean parameters are restricted to
    /// the matching names in it. Without one, every parameter keeps what
    /// its schema declared. A restricted field whose default is not one of
    /// its options starts at the first option instead, so an untouched
    /// form never encodes a value [`set`](Self::set) would reject.
    /// Parameters of unknown type and the `unused` placeholder get no
    /// field.
    pub fn new(action: &Action, world: Option<&World>) -> Self {
        let fields = action
            .parameters
            .iter()
            .filter(|(name, _)| *name != UNUSED_PARAMETER)
            .filter_map(|(name, parameter)| {
                let default = parameter.default_value()?;
                let live = match parameter {
                    Parameter::Boolean { .. } => None,
                    _ => world.and_then(|world| significant_values(name, world)),
                };
                let options: Option<Vec<ParameterValue>> = match live {
                    Some(names) => {
                        Some(names.into_iter().map(ParameterValue::String).collect())
                    }
                    None => parameter.domain(),
                };
                let value = match options.as_deref() {
                    Some(allowed @ [first, ..]) if !allowed.contains(&default) => first.clone(),
                    _ => default,
                };
                Some(FormField {
                    name: name.to_string(),
                    parameter: parameter.clone(),
                    options,
                    value,
                })
            })
            .collect();

        Self {
            action: action.name.clone(),
            fields,
        }
    }

    /// The action's name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Fields in schema declaration order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Sets one parameter.
    ///
    /// A field with options accepts exactly those values. Any other field
    /// accepts a value of its declared type.
    ///
    /// # Errors
    /// - [`SessionError::UnknownParameter`] if the form has no such field.
    /// - [`SessionError::InvalidValue`] if the value is rejected.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<(), SessionError> {
        let value = value.into();
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| SessionError::UnknownParameter(name.to_string()))?;

        match &field.options {
            Some(options) if !options.contains(&value) => {
                return Err(SessionError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("{value} is not one of the allowed values"),
                });
            }
            Some(_) => {}
            None if !value.fits(&field.parameter) => {
                return Err(SessionError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("expected a {}", field.parameter.type_name()),
                });
            }
            None => {}
        }

        field.value = value;
        Ok(())
    }

    /// Encodes the form as `~<action>:<k1>=<v1>,<k2>=<v2>`.
    pub fn encode(&self) -> String {
        let pairs: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{}={}", field.name, field.value))
            .collect();
        format!("~{}:{}", self.action, pairs.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        serde_json::from_str(
            r#"{"rooms":[
                {
                    "name": "Hall",
                    "characters": [{"name": "Bob"}],
                    "items": [{"name": "lamp"}],
                    "portals": [{"name": "north"}, {"name": "south"}]
                },
                {
                    "name": "Tower",
                    "characters": [{"name": "Ann"}],
                    "items": [{"name": "key"}]
                }
            ]}"#,
        )
        .unwrap()
    }

    fn action(json: &str) -> Action {
        serde_json::from_str(json).expect("test action should decode")
    }

    fn option_strings(form: &ActionForm, name: &str) -> Vec<String> {
        form.field(name)
            .and_then(FormField::options)
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    // ===== new() =====

    #[test]
    fn test_new_direction_enumerates_live_portals() {
        let world: World = serde_json::from_str(
            r#"{"rooms":[{"name":"Hall","portals":[{"name":"north"},{"name":"south"}]}]}"#,
        )
        .unwrap();
        let move_action = action(
            r#"{"name":"move","parameters":{"direction":{"type":"string","enum":["up"]}}}"#,
        );

        let form = ActionForm::new(&move_action, Some(&world));

        assert_eq!(option_strings(&form, "direction"), ["north", "south"]);
    }

    #[test]
    fn test_new_target_lists_characters_then_items() {
        let form = ActionForm::new(
            &action(r#"{"name":"use","parameters":{"target":{"type":"string"}}}"#),
            Some(&world()),
        );

        assert_eq!(option_strings(&form, "target"), ["Bob", "Ann", "lamp", "key"]);
    }

    #[test]
    fn test_new_significant_names_cover_every_kind() {
        let form = ActionForm::new(
            &action(
                r#"{"name":"x","parameters":{
                    "character":{"type":"string"},
                    "item":{"type":"string"},
                    "room":{"type":"string"}
                }}"#,
            ),
            Some(&world()),
        );

        assert_eq!(option_strings(&form, "character"), ["Bob", "Ann"]);
        assert_eq!(option_strings(&form, "item"), ["lamp", "key"]);
        assert_eq!(option_strings(&form, "room"), ["Hall", "Tower"]);
    }

    #[test]
    fn test_new_without_world_keeps_declared_enum() {
        let form = ActionForm::new(
            &action(r#"{"name":"move","parameters":{"direction":{"type":"string","enum":["up","down"]}}}"#),
            None,
        );

        assert_eq!(option_strings(&form, "direction"), ["up", "down"]);
    }

    #[test]
    fn test_new_boolean_significant_parameter_is_not_overridden() {
        let form = ActionForm::new(
            &action(r#"{"name":"x","parameters":{"item":{"type":"boolean"}}}"#),
            Some(&world()),
        );

        assert!(form.field("item").unwrap().options().is_none());
        assert_eq!(form.encode(), "~x:item=false");
    }

    #[test]
    fn test_new_skips_unused_and_unknown_parameters() {
        let form = ActionForm::new(
            &action(
                r#"{"name":"wait","parameters":{
                    "unused":{"type":"string"},
                    "list":{"type":"array"},
                    "turns":{"type":"number"}
                }}"#,
            ),
            None,
        );

        let names: Vec<_> = form.fields().iter().map(FormField::name).collect();
        assert_eq!(names, ["turns"]);
    }

    #[test]
    fn test_significant_values_known_for_every_significant_name() {
        let world = world();
        for name in SIGNIFICANT_PARAMETERS {
            assert!(significant_values(name, &world).is_some(), "{name}");
        }
        assert!(significant_values("speed", &world).is_none());
    }

    // ===== set() =====

    #[test]
    fn test_set_rejects_value_outside_options() {
        let mut form = ActionForm::new(
            &action(r#"{"name":"move","parameters":{"direction":{"type":"string"}}}"#),
            Some(&world()),
        );

        let result = form.set("direction", "west");

        assert!(matches!(result, Err(SessionError::InvalidValue { .. })));
        assert!(form.set("direction", "south").is_ok());
        assert_eq!(form.encode(), "~move:direction=south");
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut form = ActionForm::new(
            &action(r#"{"name":"wait","parameters":{"turns":{"type":"number"}}}"#),
            None,
        );

        assert!(matches!(
            form.set("turns", "three"),
            Err(SessionError::InvalidValue { .. })
        ));
        assert!(form.set("turns", 3.0).is_ok());
    }

    #[test]
    fn test_set_unknown_parameter_is_error() {
        let mut form = ActionForm::new(&action(r#"{"name":"look"}"#), None);

        assert!(matches!(
            form.set("direction", "north"),
            Err(SessionError::UnknownParameter(name)) if name == "direction"
        ));
    }

    // ===== encode() =====

    #[test]
    fn test_encode_uses_declaration_order_and_defaults() {
        let form = ActionForm::new(
            &action(
                r#"{"name":"action_cast","parameters":{
                    "spell":{"type":"string","default":"light"},
                    "power":{"type":"number"},
                    "quiet":{"type":"boolean","default":true},
                    "note":{"type":"string"}
                }}"#,
            ),
            None,
        );

        assert_eq!(
            form.encode(),
            "~action_cast:spell=light,power=0,quiet=true,note="
        );
    }

    #[test]
    fn test_encode_untouched_live_field_starts_at_first_option() {
        let form = ActionForm::new(
            &action(r#"{"name":"move","parameters":{"direction":{"type":"string"}}}"#),
            Some(&world()),
        );

        assert_eq!(form.encode(), "~move:direction=north");
    }

    #[test]
    fn test_encode_keeps_default_that_is_an_option() {
        let form = ActionForm::new(
            &action(
                r#"{"name":"x","parameters":{
                    "mood":{"type":"string","enum":["calm","angry"],"default":"angry"},
                    "pace":{"type":"string","enum":["slow","fast"],"default":"brisk"}
                }}"#,
            ),
            None,
        );

        assert_eq!(form.encode(), "~x:mood=angry,pace=slow");
    }

    #[test]
    fn test_encode_empty_live_domain_keeps_default() {
        let empty: World = serde_json::from_str(r#"{"rooms":[{"name":"Hall"}]}"#).unwrap();
        let form = ActionForm::new(
            &action(r#"{"name":"take","parameters":{"item":{"type":"string"}}}"#),
            Some(&empty),
        );

        assert_eq!(form.encode(), "~take:item=");
    }

    #[test]
    fn test_encode_without_parameters() {
        let form = ActionForm::new(&action(r#"{"name":"look"}"#), Some(&world()));
        assert_eq!(form.encode(), "~look:");
    }
}

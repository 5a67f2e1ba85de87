//! Spec document model.
//!
//! This module contains the struct definitions that map to the clispec
//! configuration format: objects, actions, options/positionals, env
//! bindings, constraint sets, and shared blueprint definitions.
//!
//! The pipeline's reference and variable stages operate on the raw
//! `serde_json::Value` tree; these types are deserialized from the tree
//! once references and variables have been expanded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Root document structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecDocument {
    /// Blueprints for vars, options, actions, and objects.
    pub shared_defs: SharedDefs,

    /// Options applied to every invocation.
    pub global: GlobalSpec,

    /// Opaque behavior settings, carried for external renderers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Value>,

    /// Noun-like resources, keyed by id.
    pub objects: BTreeMap<String, ObjectSpec>,

    /// Verb-like operations, keyed by id.
    pub actions: BTreeMap<String, ActionSpec>,
}

/// Shared blueprint definitions, instantiated via `$ref`.
///
/// Blueprint bodies stay untyped: they only become objects/actions/options
/// once expanded at a use site, where sibling overrides are merged in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedDefs {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub objects: BTreeMap<String, Value>,
}

/// Global scope: options present on every invocation, plus constraints
/// evaluated against them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSpec {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, FieldSpec>,

    #[serde(skip_serializing_if = "ConstraintSet::is_empty")]
    pub constraints: ConstraintSet,
}

/// A noun-like resource the CLI manages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<DisplayNames>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Action applied when the invocation names only this object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,

    /// Actions applicable to this object, inline or overridden.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, ActionSpec>,

    #[serde(skip_serializing_if = "ConstraintSet::is_empty")]
    pub constraints: ConstraintSet,
}

/// A verb-like operation applicable to one or more objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<DisplayNames>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object targeted when the invocation names only this action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_object: Option<String>,

    /// Objects this action applies to, inline or overridden.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub objects: BTreeMap<String, ObjectSpec>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, FieldSpec>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub positionals: BTreeMap<String, FieldSpec>,

    #[serde(skip_serializing_if = "ConstraintSet::is_empty")]
    pub constraints: ConstraintSet,
}

/// Display names for objects, actions, and options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayNames {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// An option or positional argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<DisplayNames>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Flag, option, or positional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,

    /// Declared value type.
    #[serde(rename = "type")]
    pub ty: TypeSpec,

    /// Whether the field must resolve to a value.
    pub required: bool,

    /// Value used when neither environment nor CLI supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Environment variable binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvBinding>,
}

/// Field kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Flag,
    Option,
    Positional,
}

/// Declared type of a field value.
///
/// Accepts either a bare name (`string`, `boolean`, `count`, `path`,
/// `dir`, `file`) or a structured form (`{kind: enum, values: [...]}`,
/// `{kind: list, of: <type>}`, `{kind: path, must_exist: true}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTypeSpec")]
pub enum TypeSpec {
    String,
    Boolean,
    Count,
    Enum { values: Vec<Value> },
    Path { must_exist: bool },
    Dir { must_exist: bool },
    File { must_exist: bool },
    List { of: Box<TypeSpec> },
}

impl Default for TypeSpec {
    fn default() -> Self {
        TypeSpec::String
    }
}

impl TypeSpec {
    /// Short name used in diagnostics (e.g. `list of string`).
    pub fn name(&self) -> String {
        match self {
            TypeSpec::String => "string".into(),
            TypeSpec::Boolean => "boolean".into(),
            TypeSpec::Count => "count".into(),
            TypeSpec::Enum { .. } => "enum".into(),
            TypeSpec::Path { .. } => "path".into(),
            TypeSpec::Dir { .. } => "dir".into(),
            TypeSpec::File { .. } => "file".into(),
            TypeSpec::List { of } => format!("list of {}", of.name()),
        }
    }
}

impl Serialize for TypeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match self {
            TypeSpec::String => serializer.serialize_str("string"),
            TypeSpec::Boolean => serializer.serialize_str("boolean"),
            TypeSpec::Count => serializer.serialize_str("count"),
            TypeSpec::Path { must_exist: false } => serializer.serialize_str("path"),
            TypeSpec::Dir { must_exist: false } => serializer.serialize_str("dir"),
            TypeSpec::File { must_exist: false } => serializer.serialize_str("file"),
            TypeSpec::Enum { values } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "enum")?;
                map.serialize_entry("values", values)?;
                map.end()
            }
            TypeSpec::Path { must_exist } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "path")?;
                map.serialize_entry("must_exist", must_exist)?;
                map.end()
            }
            TypeSpec::Dir { must_exist } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "dir")?;
                map.serialize_entry("must_exist", must_exist)?;
                map.end()
            }
            TypeSpec::File { must_exist } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "file")?;
                map.serialize_entry("must_exist", must_exist)?;
                map.end()
            }
            TypeSpec::List { of } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "list")?;
                map.serialize_entry("of", of)?;
                map.end()
            }
        }
    }
}

/// Raw wire form of [`TypeSpec`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTypeSpec {
    Name(String),
    Detailed {
        kind: String,
        #[serde(default)]
        values: Vec<Value>,
        #[serde(default)]
        of: Option<Box<RawTypeSpec>>,
        #[serde(default)]
        must_exist: bool,
    },
}

impl TryFrom<RawTypeSpec> for TypeSpec {
    type Error = String;

    fn try_from(raw: RawTypeSpec) -> Result<Self, Self::Error> {
        match raw {
            RawTypeSpec::Name(name) => match name.as_str() {
                "string" => Ok(TypeSpec::String),
                "boolean" => Ok(TypeSpec::Boolean),
                "count" => Ok(TypeSpec::Count),
                "path" => Ok(TypeSpec::Path { must_exist: false }),
                "dir" => Ok(TypeSpec::Dir { must_exist: false }),
                "file" => Ok(TypeSpec::File { must_exist: false }),
                other => Err(format!("unknown type `{other}`")),
            },
            RawTypeSpec::Detailed {
                kind,
                values,
                of,
                must_exist,
            } => match kind.as_str() {
                "enum" => {
                    if values.is_empty() {
                        return Err("enum type requires non-empty `values`".into());
                    }
                    Ok(TypeSpec::Enum { values })
                }
                "list" => {
                    let of = of.ok_or("list type requires `of`")?;
                    Ok(TypeSpec::List {
                        of: Box::new(TypeSpec::try_from(*of)?),
                    })
                }
                "path" => Ok(TypeSpec::Path { must_exist }),
                "dir" => Ok(TypeSpec::Dir { must_exist }),
                "file" => Ok(TypeSpec::File { must_exist }),
                "string" => Ok(TypeSpec::String),
                "boolean" => Ok(TypeSpec::Boolean),
                "count" => Ok(TypeSpec::Count),
                other => Err(format!("unknown type kind `{other}`")),
            },
        }
    }
}

/// Environment variable binding for a field.
///
/// Normalized from either a bare variable name (both flags false) or the
/// structured form `{var, override_cli, update}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEnvBinding")]
pub struct EnvBinding {
    /// Environment variable name.
    pub var: String,

    /// When true, a set variable beats even a CLI-supplied value.
    pub override_cli: bool,

    /// When true, the finalized value is written back to the environment.
    pub update: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnvBinding {
    Name(String),
    Full {
        var: String,
        #[serde(default)]
        override_cli: bool,
        #[serde(default)]
        update: bool,
    },
}

impl From<RawEnvBinding> for EnvBinding {
    fn from(raw: RawEnvBinding) -> Self {
        match raw {
            RawEnvBinding::Name(var) => Self {
                var,
                override_cli: false,
                update: false,
            },
            RawEnvBinding::Full {
                var,
                override_cli,
                update,
            } => Self {
                var,
                override_cli,
                update,
            },
        }
    }
}

/// Cross-field logical constraints for one scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSet {
    /// Ids that must be present.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Groups whose members may not appear together.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Vec<String>>,

    /// Groups where exactly one member must be present.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exactly_one_of: Vec<Vec<String>>,

    /// Groups where at least one member must be present.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub at_least_one_of: Vec<Vec<String>>,

    /// Custom predicates with user-facing messages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomConstraint>,
}

impl ConstraintSet {
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
            && self.conflicts.is_empty()
            && self.exactly_one_of.is_empty()
            && self.at_least_one_of.is_empty()
            && self.custom.is_empty()
    }
}

/// A custom constraint: a boolean expression over field presence/values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomConstraint {
    /// Expression such as `if present(all) then missing(limit)`.
    pub predicate: String,

    /// Message reported when the predicate evaluates false.
    pub message: String,
}

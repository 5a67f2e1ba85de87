//! Union building: the full sets of object and action ids.
//!
//! `OBJECTS` is the union of top-level object ids, ids appearing under any
//! action's `objects` map, and ids of `shared_defs.objects` blueprints that
//! were actually referenced. `ACTIONS` is the analogue with the roles
//! swapped. Pure computation over the post-resolution document; later
//! stages use the sets for default validation.

use std::collections::BTreeSet;

use crate::config::schema::{ActionSpec, ObjectSpec, SpecDocument};

const SHARED_OBJECT_PREFIX: &str = "#/shared_defs/objects/";
const SHARED_ACTION_PREFIX: &str = "#/shared_defs/actions/";

/// The complete id sets gathered from both views of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unions {
    pub objects: BTreeSet<String>,
    pub actions: BTreeSet<String>,
}

/// Compute both unions. Never fails on a well-formed merged document.
pub fn build(spec: &SpecDocument, referenced: &BTreeSet<String>) -> Unions {
    let mut unions = Unions::default();

    for (id, object) in &spec.objects {
        unions.objects.insert(id.clone());
        collect_from_object(object, &mut unions);
    }
    for (id, action) in &spec.actions {
        unions.actions.insert(id.clone());
        collect_from_action(action, &mut unions);
    }

    for pointer in referenced {
        if let Some(id) = blueprint_id(pointer, SHARED_OBJECT_PREFIX) {
            unions.objects.insert(id.to_string());
        }
        if let Some(id) = blueprint_id(pointer, SHARED_ACTION_PREFIX) {
            unions.actions.insert(id.to_string());
        }
    }

    tracing::debug!(
        objects = unions.objects.len(),
        actions = unions.actions.len(),
        "built id unions"
    );
    unions
}

fn collect_from_object(object: &ObjectSpec, unions: &mut Unions) {
    for (id, action) in &object.actions {
        unions.actions.insert(id.clone());
        collect_from_action(action, unions);
    }
}

fn collect_from_action(action: &ActionSpec, unions: &mut Unions) {
    for (id, object) in &action.objects {
        unions.objects.insert(id.clone());
        collect_from_object(object, unions);
    }
}

/// The blueprint id for pointers of the form `#/shared_defs/<kind>/<id>`.
fn blueprint_id<'a>(pointer: &'a str, prefix: &str) -> Option<&'a str> {
    let id = pointer.strip_prefix(prefix)?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(yaml: &str) -> SpecDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn gathers_ids_from_both_views() {
        let spec = spec(
            r#"
objects:
  address:
    actions:
      create: {}
actions:
  list:
    objects:
      contact: {}
"#,
        );

        let unions = build(&spec, &BTreeSet::new());
        assert_eq!(
            unions.objects,
            BTreeSet::from(["address".to_string(), "contact".to_string()])
        );
        assert_eq!(
            unions.actions,
            BTreeSet::from(["create".to_string(), "list".to_string()])
        );
    }

    #[test]
    fn referenced_blueprints_join_the_union() {
        let spec = spec("objects: {}\nactions: {}");
        let referenced = BTreeSet::from([
            "#/shared_defs/actions/create".to_string(),
            "#/shared_defs/objects/address".to_string(),
        ]);

        let unions = build(&spec, &referenced);
        assert!(unions.actions.contains("create"));
        assert!(unions.objects.contains("address"));
    }

    #[test]
    fn unreferenced_blueprints_stay_out() {
        let spec = spec(
            r#"
shared_defs:
  actions:
    archive: {}
actions:
  list: {}
"#,
        );

        let unions = build(&spec, &BTreeSet::new());
        assert!(!unions.actions.contains("archive"));
        assert!(unions.actions.contains("list"));
    }

    #[test]
    fn pointers_below_blueprint_level_are_ignored() {
        let spec = spec("objects: {}\nactions: {}");
        let referenced = BTreeSet::from([
            "#/shared_defs/options/verbose".to_string(),
            "#/shared_defs/actions/create/options".to_string(),
        ]);

        let unions = build(&spec, &referenced);
        assert!(unions.actions.is_empty());
        assert!(unions.objects.is_empty());
    }

    #[test]
    fn deeply_nested_entities_are_collected() {
        let spec = spec(
            r#"
actions:
  sync:
    objects:
      remote:
        actions:
          push: {}
"#,
        );

        let unions = build(&spec, &BTreeSet::new());
        assert!(unions.objects.contains("remote"));
        assert!(unions.actions.contains("push"));
        assert!(unions.actions.contains("sync"));
    }
}

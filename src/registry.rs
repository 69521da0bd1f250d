//! Replace properties on live objects with substitutes and put the exact
//! originals back later.
//!
//! Each installed substitute has exactly one [`ReplacementRecord`], indexed
//! both by the substitute's identity and by its `(owner, property)` slot.
//! Only the first replacement of a slot saves the original; replacing the
//! slot again swaps the substitute but keeps that first original, so a
//! single restore always recovers the true pre-replacement state.

use crate::error::InvalidTargetError;
use crate::object::{Object, PropertyDescriptor};
use crate::types::{Value, number_ops};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ReplacementRecord {
    pub owner: Object,
    pub property: String,
    /// Whether `owner` had `property` as an own property before the first
    /// replacement. Inherited and absent both count as not existing.
    pub existed: bool,
    original: Option<PropertyDescriptor>,
    pub substitute: Object,
    installed_at: u64,
}

impl ReplacementRecord {
    /// The saved own value, when there was one.
    pub fn original(&self) -> Option<&Value> {
        self.original.as_ref().map(|d| &d.value)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    /// Keyed by substitute object id.
    records: FxHashMap<u64, ReplacementRecord>,
    /// `(owner id, property)` to substitute id.
    slots: FxHashMap<(u64, String), u64>,
    next_sequence: u64,
}

fn callable(property: &str, value: &Value) -> Result<Object, InvalidTargetError> {
    match value {
        Value::Object(o) if o.is_callable() => Ok(o.clone()),
        other => Err(InvalidTargetError::NotCallable {
            property: property.to_string(),
            found: other.type_name(),
        }),
    }
}

fn installed_descriptor(current: Option<&PropertyDescriptor>, substitute: &Object) -> PropertyDescriptor {
    let value = Value::Object(substitute.clone());
    match current {
        // Writable but non-configurable: only the value may change
        Some(desc) if !desc.configurable => PropertyDescriptor {
            value,
            ..desc.clone()
        },
        Some(desc) => PropertyDescriptor::data(value, true, desc.enumerable, true),
        None => PropertyDescriptor::data_default(value),
    }
}

fn target_object(target: &Value) -> Result<&Object, InvalidTargetError> {
    match target {
        Value::Object(o) => Ok(o),
        other => Err(InvalidTargetError::NotAnObject {
            found: other.type_name(),
        }),
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if `value` is a substitute currently installed through this
    /// registry.
    pub fn is_substitute(&self, value: &Value) -> bool {
        self.record_for(value).is_some()
    }

    pub fn record_for(&self, value: &Value) -> Option<&ReplacementRecord> {
        match value {
            Value::Object(o) => self.records.get(&o.id()),
            _ => None,
        }
    }

    /// Installs `substitute` as an own property `property` of `target`.
    ///
    /// Fails without touching `target` when it is not an object, when the
    /// substitute is not a function, or when the slot cannot be written.
    pub fn replace(
        &mut self,
        target: &Value,
        property: &str,
        substitute: &Value,
    ) -> Result<(), InvalidTargetError> {
        let owner = target_object(target)?;
        let substitute = callable(property, substitute)?;
        self.install(owner, property, substitute)
    }

    fn check_replaceable(&self, owner: &Object, property: &str) -> Result<(), InvalidTargetError> {
        let locked = || InvalidTargetError::Locked {
            property: property.to_string(),
        };
        if owner.is_array() && (property == "length" || number_ops::array_index(property).is_some()) {
            return Err(locked());
        }
        let data = owner.borrow();
        match data.get_own_property(property) {
            Some(desc) if !desc.writable && !desc.configurable => Err(locked()),
            None if !data.extensible => Err(locked()),
            _ => Ok(()),
        }
    }

    fn install(
        &mut self,
        owner: &Object,
        property: &str,
        substitute: Object,
    ) -> Result<(), InvalidTargetError> {
        if let Some(record) = self.records.get(&substitute.id()) {
            if record.owner.ptr_eq(owner) && record.property == property {
                return self.reinstall(owner, property, &substitute);
            }
            return Err(InvalidTargetError::AlreadyInstalled {
                property: record.property.clone(),
            });
        }
        self.check_replaceable(owner, property)?;

        let current = owner.borrow().get_own_property(property);
        owner
            .borrow_mut()
            .insert_property(property.to_string(), installed_descriptor(current.as_ref(), &substitute));

        let slot = (owner.id(), property.to_string());
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let record = match self.slots.get(&slot).and_then(|id| self.records.remove(id)) {
            Some(previous) => {
                debug!(
                    target: "stubcore",
                    property,
                    owner = owner.id(),
                    "replacing an installed substitute; original kept"
                );
                ReplacementRecord {
                    substitute: substitute.clone(),
                    installed_at: sequence,
                    ..previous
                }
            }
            None => {
                debug!(
                    target: "stubcore",
                    property,
                    owner = owner.id(),
                    existed = current.is_some(),
                    "installed substitute"
                );
                ReplacementRecord {
                    owner: owner.clone(),
                    property: property.to_string(),
                    existed: current.is_some(),
                    original: current,
                    substitute: substitute.clone(),
                    installed_at: sequence,
                }
            }
        };
        self.slots.insert(slot, substitute.id());
        self.records.insert(substitute.id(), record);
        Ok(())
    }

    /// Puts a live substitute back into its own slot if something else was
    /// written there since. The saved original is kept.
    fn reinstall(&self, owner: &Object, property: &str, substitute: &Object) -> Result<(), InvalidTargetError> {
        let current = owner.borrow().get_own_property(property);
        if let Some(desc) = &current
            && matches!(&desc.value, Value::Object(v) if v.ptr_eq(substitute))
        {
            return Ok(());
        }
        self.check_replaceable(owner, property)?;
        owner
            .borrow_mut()
            .insert_property(property.to_string(), installed_descriptor(current.as_ref(), substitute));
        debug!(
            target: "stubcore",
            property,
            owner = owner.id(),
            "rewrote overwritten slot with its substitute"
        );
        Ok(())
    }

    /// Replaces every function-valued enumerable property visible on
    /// `target`, own or inherited, with `factory(name, original)`. Each
    /// substitute becomes an own property of `target`; prototypes are left
    /// alone. Properties already holding a live substitute are skipped.
    ///
    /// All substitutes are produced and validated before the first one is
    /// installed.
    pub fn replace_methods(
        &mut self,
        target: &Value,
        mut factory: impl FnMut(&str, &Value) -> Value,
    ) -> Result<Vec<Value>, InvalidTargetError> {
        let owner = target_object(target)?;
        let keys = owner.borrow().enumerable_keys_with_proto();
        let is_array = owner.is_array();

        let mut planned = Vec::new();
        for key in keys {
            if is_array && number_ops::array_index(&key).is_some() {
                continue;
            }
            let original = owner.get(&key);
            if !original.is_callable() || self.is_substitute(&original) {
                continue;
            }
            self.check_replaceable(owner, &key)?;
            let substitute = callable(&key, &factory(&key, &original))?;
            if self.records.contains_key(&substitute.id())
                || planned.iter().any(|(_, s): &(String, Object)| s.ptr_eq(&substitute))
            {
                return Err(InvalidTargetError::AlreadyInstalled { property: key });
            }
            planned.push((key, substitute));
        }

        let mut installed = Vec::with_capacity(planned.len());
        for (key, substitute) in planned {
            self.install(owner, &key, substitute.clone())?;
            installed.push(Value::Object(substitute));
        }
        Ok(installed)
    }

    /// Builds an object inheriting from `constructor.prototype` without
    /// calling the constructor, with every inherited method replaced by an
    /// own substitute from `factory`.
    pub fn create_stub_instance(
        &mut self,
        constructor: &Value,
        factory: impl FnMut(&str, &Value) -> Value,
    ) -> Result<Object, InvalidTargetError> {
        let ctor = callable("constructor", constructor)?;
        let instance = match ctor.get("prototype") {
            Value::Object(proto) => Object::with_prototype(&proto),
            _ => Object::plain(),
        };
        self.replace_methods(&Value::Object(instance.clone()), factory)?;
        Ok(instance)
    }

    /// Restores a single substitute, or every record whose slot lives on
    /// an object, newest first. Anything else is a no-op. Returns how many
    /// records were consumed; never fails.
    pub fn restore(&mut self, target: &Value) -> usize {
        let Value::Object(obj) = target else {
            return 0;
        };
        if self.records.contains_key(&obj.id()) {
            return usize::from(self.restore_record(obj.id()));
        }

        let mut owned: Vec<(u64, u64)> = self
            .records
            .iter()
            .filter(|(_, r)| r.owner.ptr_eq(obj))
            .map(|(id, r)| (r.installed_at, *id))
            .collect();
        owned.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        owned.into_iter()
            .filter(|&(_, id)| self.restore_record(id))
            .count()
    }

    /// Restores everything this registry installed, newest first.
    pub fn restore_all(&mut self) -> usize {
        let mut ids: Vec<(u64, u64)> = self
            .records
            .iter()
            .map(|(id, r)| (r.installed_at, *id))
            .collect();
        ids.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        ids.into_iter()
            .filter(|&(_, id)| self.restore_record(id))
            .count()
    }

    fn restore_record(&mut self, substitute_id: u64) -> bool {
        let Some(record) = self.records.remove(&substitute_id) else {
            return false;
        };
        self.slots
            .remove(&(record.owner.id(), record.property.clone()));

        let still_installed = matches!(
            record.owner.borrow().get_own_value(&record.property),
            Some(Value::Object(v)) if v.ptr_eq(&record.substitute)
        );
        if !still_installed {
            warn!(
                target: "stubcore",
                property = record.property.as_str(),
                owner = record.owner.id(),
                "slot was overwritten outside the registry; leaving it untouched"
            );
            return true;
        }

        let mut data = record.owner.borrow_mut();
        match record.original {
            Some(desc) => data.insert_property(record.property.clone(), desc),
            None => {
                data.remove_own_property(&record.property);
            }
        }
        debug!(
            target: "stubcore",
            property = record.property.as_str(),
            existed = record.existed,
            "restored"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equality::deep_equal;
    use std::cell::Cell;
    use std::rc::Rc;

    fn method(name: &str) -> Value {
        Value::Object(Object::function(name, |_, _| Value::Undefined))
    }

    fn returning(name: &str, v: f64) -> Value {
        Value::Object(Object::function(name, move |_, _| Value::Number(v)))
    }

    fn same(a: &Value, b: &Value) -> bool {
        a.strict_equals(b)
    }

    fn stub_factory(_: &str, _: &Value) -> Value {
        method("stub")
    }

    #[test]
    fn replace_then_restore_gives_back_same_reference() {
        let original = method("m");
        let obj = Object::from_entries([("method", original.clone())]);
        let target = Value::Object(obj.clone());
        let stub = method("stub");

        let mut registry = Registry::new();
        registry.replace(&target, "method", &stub).unwrap();
        assert!(same(&obj.get("method"), &stub));
        assert!(registry.is_substitute(&stub));

        assert_eq!(registry.restore(&stub), 1);
        assert!(same(&obj.get("method"), &original));
        assert!(registry.is_empty());
    }

    #[test]
    fn restoring_missing_property_removes_it_again() {
        let obj = Object::plain();
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        registry.replace(&target, "fresh", &method("stub")).unwrap();
        assert!(obj.borrow().has_own_property("fresh"));
        let record = registry.record_for(&obj.get("fresh")).unwrap();
        assert!(!record.existed);
        assert!(record.original().is_none());

        registry.restore(&target);
        assert!(!obj.borrow().has_own_property("fresh"));
    }

    #[test]
    fn restoring_inherited_method_uncovers_prototype_value() {
        let inherited = method("inherited");
        let proto = Object::from_entries([("method", inherited.clone())]);
        let obj = Object::with_prototype(&proto);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        let stub = method("stub");
        registry.replace(&target, "method", &stub).unwrap();
        assert!(obj.borrow().has_own_property("method"));
        assert!(same(&proto.get("method"), &inherited));

        registry.restore(&stub);
        assert!(!obj.borrow().has_own_property("method"));
        assert!(same(&obj.get("method"), &inherited));
    }

    #[test]
    fn restores_all_methods_of_supplied_object() {
        let method_a = method("a");
        let method_b = method("b");
        let obj = Object::from_entries([("methodA", method_a.clone()), ("methodB", method_b.clone())]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        let stubs = registry.replace_methods(&target, stub_factory).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(registry.restore(&target), 2);

        assert!(same(&obj.get("methodA"), &method_a));
        assert!(same(&obj.get("methodB"), &method_b));
    }

    #[test]
    fn only_restores_restorable_methods() {
        let stubbed = method("stubbed");
        let vanilla = method("vanilla");
        let obj = Object::from_entries([("stubbedMethod", stubbed.clone()), ("vanillaMethod", vanilla.clone())]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        registry.replace(&target, "stubbedMethod", &method("stub")).unwrap();
        assert_eq!(registry.restore(&target), 1);

        assert!(same(&obj.get("stubbedMethod"), &stubbed));
        assert!(same(&obj.get("vanillaMethod"), &vanilla));
    }

    #[test]
    fn restores_a_single_stubbed_method() {
        let original = method("m");
        let obj = Object::from_entries([("method", original.clone()), ("other", method("o"))]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        registry.replace_methods(&target, stub_factory).unwrap();
        registry.restore(&obj.get("method"));

        assert!(same(&obj.get("method"), &original));
        assert!(registry.is_substitute(&obj.get("other")));
    }

    #[test]
    fn second_replacement_keeps_true_original() {
        let original = method("m");
        let obj = Object::from_entries([("method", original.clone())]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        let first = method("first");
        let second = method("second");
        registry.replace(&target, "method", &first).unwrap();
        registry.replace(&target, "method", &second).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(!registry.is_substitute(&first));
        assert_eq!(registry.restore(&first), 0);
        assert!(same(&obj.get("method"), &second));

        assert_eq!(registry.restore(&second), 1);
        assert!(same(&obj.get("method"), &original));
    }

    #[test]
    fn second_replacement_of_missing_property_still_removes_it() {
        let obj = Object::plain();
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        registry.replace(&target, "m", &method("first")).unwrap();
        registry.replace(&target, "m", &method("second")).unwrap();
        assert_eq!(registry.restore(&target), 1);
        assert!(!obj.borrow().has_own_property("m"));
    }

    #[test]
    fn restore_twice_is_a_quiet_no_op() {
        let original = method("m");
        let obj = Object::from_entries([("method", original.clone())]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        let stub = method("stub");
        registry.replace(&target, "method", &stub).unwrap();
        assert_eq!(registry.restore(&target), 1);
        assert_eq!(registry.restore(&target), 0);
        assert_eq!(registry.restore(&stub), 0);
        assert!(same(&obj.get("method"), &original));
    }

    #[test]
    fn restoring_foreign_values_is_a_no_op() {
        let mut registry = Registry::new();
        assert_eq!(registry.restore(&Value::Undefined), 0);
        assert_eq!(registry.restore(&Value::from(3)), 0);
        assert_eq!(registry.restore(&method("never")), 0);
        assert_eq!(registry.restore(&Value::Object(Object::plain())), 0);
    }

    #[test]
    fn rejects_primitive_targets_before_mutation() {
        let mut registry = Registry::new();
        for target in [Value::Null, Value::from(3), Value::from("hi!")] {
            let err = registry.replace(&target, "m", &method("stub")).unwrap_err();
            assert!(matches!(err, InvalidTargetError::NotAnObject { .. }));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_non_function_substitute_before_mutation() {
        let original = method("m");
        let obj = Object::from_entries([("method", original.clone())]);
        let mut registry = Registry::new();

        let err = registry
            .replace(&Value::Object(obj.clone()), "method", &Value::from(42))
            .unwrap_err();
        assert_eq!(
            err,
            InvalidTargetError::NotCallable {
                property: "method".to_string(),
                found: "number",
            }
        );
        assert!(same(&obj.get("method"), &original));
        assert!(registry.is_empty());
    }

    #[test]
    fn read_only_configurable_property_is_restored_with_its_flags() {
        let original = method("m");
        let obj = Object::plain();
        obj.borrow_mut().define_own_property(
            "fixed".to_string(),
            PropertyDescriptor::data(original.clone(), false, false, true),
        );
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        let stub = method("stub");
        registry.replace(&target, "fixed", &stub).unwrap();
        assert!(same(&obj.get("fixed"), &stub));

        registry.restore(&target);
        let desc = obj.borrow().get_own_property("fixed").unwrap();
        assert!(same(&desc.value, &original));
        assert!(!desc.writable);
        assert!(!desc.enumerable);
        assert!(desc.configurable);
    }

    #[test]
    fn locked_property_is_refused() {
        let original = method("m");
        let obj = Object::plain();
        obj.borrow_mut().define_own_property(
            "frozen".to_string(),
            PropertyDescriptor::data(original.clone(), false, true, false),
        );
        let mut registry = Registry::new();
        let err = registry
            .replace(&Value::Object(obj.clone()), "frozen", &method("stub"))
            .unwrap_err();
        assert!(matches!(err, InvalidTargetError::Locked { .. }));
        assert!(same(&obj.get("frozen"), &original));
    }

    #[test]
    fn non_extensible_target_refuses_new_slot() {
        let obj = Object::plain();
        obj.prevent_extensions();
        let mut registry = Registry::new();
        let err = registry
            .replace(&Value::Object(obj.clone()), "m", &method("stub"))
            .unwrap_err();
        assert!(matches!(err, InvalidTargetError::Locked { .. }));
        assert!(!obj.borrow().has_own_property("m"));
    }

    #[test]
    fn one_substitute_cannot_occupy_two_slots() {
        let a = Value::Object(Object::from_entries([("m", method("a"))]));
        let b = Value::Object(Object::from_entries([("m", method("b"))]));
        let stub = method("stub");
        let mut registry = Registry::new();

        registry.replace(&a, "m", &stub).unwrap();
        registry.replace(&a, "m", &stub).unwrap();
        let err = registry.replace(&b, "m", &stub).unwrap_err();
        assert!(matches!(err, InvalidTargetError::AlreadyInstalled { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn externally_overwritten_slot_is_left_alone() {
        let obj = Object::from_entries([("m", method("orig"))]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();
        let stub = method("stub");
        registry.replace(&target, "m", &stub).unwrap();

        let manual = method("manual");
        obj.set("m", manual.clone());
        assert_eq!(registry.restore(&stub), 1);
        assert!(same(&obj.get("m"), &manual));
        assert!(registry.is_empty());
    }

    #[test]
    fn restoring_owner_discards_externally_overwritten_slots() {
        let original = method("orig");
        let obj = Object::from_entries([("m", original.clone()), ("n", method("n"))]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();
        let stub = method("stub");
        registry.replace(&target, "m", &stub).unwrap();
        registry.replace(&target, "n", &method("other")).unwrap();

        let manual = method("manual");
        obj.set("m", manual.clone());
        assert_eq!(registry.restore(&target), 2);
        assert!(same(&obj.get("m"), &manual));
        assert!(!registry.is_substitute(&stub));
        assert!(registry.is_empty());
    }

    #[test]
    fn replacing_again_rewrites_an_overwritten_slot() {
        let original = method("orig");
        let obj = Object::from_entries([("m", original.clone())]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();
        let stub = method("stub");
        registry.replace(&target, "m", &stub).unwrap();

        obj.set("m", method("manual"));
        registry.replace(&target, "m", &stub).unwrap();
        assert!(same(&obj.get("m"), &stub));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.restore(&target), 1);
        assert!(same(&obj.get("m"), &original));
    }

    #[test]
    fn array_targets_keep_elements_out_of_reach() {
        let arr = Value::Object(Object::array(vec![method("el")]));
        let mut registry = Registry::new();
        assert!(matches!(
            registry.replace(&arr, "0", &method("stub")),
            Err(InvalidTargetError::Locked { .. })
        ));
        registry.replace(&arr, "extra", &method("stub")).unwrap();
        assert_eq!(registry.restore(&arr), 1);
    }

    #[test]
    fn restore_all_unwinds_everything() {
        let a = Object::from_entries([("m", method("a"))]);
        let b = Object::plain();
        let before_a = a.get("m");
        let mut registry = Registry::new();
        registry.replace(&Value::Object(a.clone()), "m", &method("s1")).unwrap();
        registry.replace(&Value::Object(b.clone()), "n", &method("s2")).unwrap();

        assert_eq!(registry.restore_all(), 2);
        assert!(same(&a.get("m"), &before_a));
        assert!(!b.borrow().has_own_property("n"));
    }

    #[test]
    fn replace_methods_validates_before_installing() {
        let obj = Object::from_entries([("a", method("a")), ("b", method("b"))]);
        let target = Value::Object(obj.clone());
        let before = obj.get("a");
        let mut registry = Registry::new();

        let err = registry
            .replace_methods(&target, |name, _| {
                if name == "b" { Value::from(1) } else { method("stub") }
            })
            .unwrap_err();
        assert!(matches!(err, InvalidTargetError::NotCallable { .. }));
        assert!(same(&obj.get("a"), &before));
        assert!(registry.is_empty());
    }

    #[test]
    fn replace_methods_skips_data_and_existing_substitutes() {
        let obj = Object::from_entries([("m", method("m")), ("data", Value::from(5))]);
        let target = Value::Object(obj.clone());
        let mut registry = Registry::new();

        assert_eq!(registry.replace_methods(&target, stub_factory).unwrap().len(), 1);
        assert_eq!(registry.replace_methods(&target, stub_factory).unwrap().len(), 0);
        assert!(obj.get("data").strict_equals(&Value::from(5)));
    }

    #[test]
    fn stub_instance_stubs_existing_methods() {
        let class = Object::constructor("Class");
        let Value::Object(proto) = class.get("prototype") else {
            panic!("constructor without prototype");
        };
        proto.set("method", method("method"));

        let mut registry = Registry::new();
        let stub = registry
            .create_stub_instance(&Value::Object(class), |_, _| returning("stub", 3.0))
            .unwrap();
        let Value::Object(m) = stub.get("method") else {
            panic!("method missing");
        };
        assert!(m.call(&Value::Undefined, &[]).strict_equals(&Value::from(3)));
    }

    #[test]
    fn stub_instance_does_not_invent_methods() {
        let class = Object::constructor("Class");
        let mut registry = Registry::new();
        let stub = registry
            .create_stub_instance(&Value::Object(class), stub_factory)
            .unwrap();
        assert!(stub.get("method").is_undefined());
    }

    #[test]
    fn stub_instance_does_not_call_constructor() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let class = Object::function("Class", move |_, _| {
            seen.set(seen.get() + 1);
            Value::Undefined
        });
        let proto = Object::from_entries([("method", method("method"))]);
        class.set("prototype", Value::Object(proto));

        let mut registry = Registry::new();
        registry
            .create_stub_instance(&Value::Object(class), stub_factory)
            .unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn stub_instance_retains_non_function_values() {
        let class = Object::function("Class", |_, _| Value::Undefined);
        let proto = Object::from_entries([("type", Value::from("some-value"))]);
        class.set("prototype", Value::Object(proto));

        let mut registry = Registry::new();
        let stub = registry
            .create_stub_instance(&Value::Object(class), stub_factory)
            .unwrap();
        assert!(stub.get("type").strict_equals(&Value::from("some-value")));
    }

    #[test]
    fn stub_instance_has_no_side_effects_on_prototype() {
        let original = returning("method", -1.0);
        let proto = Object::from_entries([("method", original.clone())]);
        let class = Object::function("Class", |_, _| Value::Undefined);
        class.set("prototype", Value::Object(proto.clone()));

        let mut registry = Registry::new();
        let stub = registry
            .create_stub_instance(&Value::Object(class), stub_factory)
            .unwrap();
        assert!(!same(&stub.get("method"), &original));
        assert!(same(&proto.get("method"), &original));
        assert!(deep_equal(&proto.get("method"), &original));
    }

    #[test]
    fn stub_instance_rejects_non_function_constructors() {
        let mut registry = Registry::new();
        for class in [Value::Object(Object::plain()), Value::from(3), Value::from("hi!")] {
            let err = registry
                .create_stub_instance(&class, stub_factory)
                .unwrap_err();
            assert_eq!(
                err,
                InvalidTargetError::NotCallable {
                    property: "constructor".to_string(),
                    found: class.type_name(),
                }
            );
        }
    }
}

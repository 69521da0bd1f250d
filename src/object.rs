//! Heap objects: property tables, prototypes, and the built-in kinds the
//! comparator distinguishes.

use crate::date;
use crate::regexp::{RegExp, RegExpError};
use crate::types::{Value, number_ops};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

pub type NativeFn = Rc<dyn Fn(&Value, &[Value]) -> Value>;

#[derive(Clone)]
pub struct Function {
    pub name: String,
    behavior: NativeFn,
}

impl Function {
    pub fn new(name: &str, f: impl Fn(&Value, &[Value]) -> Value + 'static) -> Self {
        Self {
            name: name.to_string(),
            behavior: Rc::new(f),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:?})", self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorData {
    pub name: String,
    pub message: String,
}

/// Platform node (DOM-like). Children are owned, the parent link is weak.
#[derive(Debug, Default)]
pub struct HostNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    children: Vec<Object>,
    parent: Option<Weak<RefCell<ObjectData>>>,
}

#[derive(Debug)]
pub enum ObjectKind {
    Ordinary,
    Array(Vec<Value>),
    Function(Function),
    RegExp(RegExp),
    Date(f64),
    Error(ErrorData),
    Host(HostNode),
}

impl ObjectKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::RegExp(_) => "RegExp",
            ObjectKind::Date(_) => "Date",
            ObjectKind::Error(_) => "Error",
            ObjectKind::Host(_) => "HostElement",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub value: Value,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyDescriptor {
    pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value,
            writable,
            enumerable,
            configurable,
        }
    }

    pub fn data_default(value: Value) -> Self {
        Self::data(value, true, true, true)
    }
}

pub struct ObjectData {
    id: u64,
    properties: FxHashMap<String, PropertyDescriptor>,
    property_order: Vec<String>,
    prototype: Option<Object>,
    pub kind: ObjectKind,
    pub extensible: bool,
}

impl ObjectData {
    fn new(kind: ObjectKind) -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            properties: FxHashMap::default(),
            property_order: Vec::new(),
            prototype: None,
            kind,
            extensible: true,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn prototype(&self) -> Option<&Object> {
        self.prototype.as_ref()
    }

    fn array_index_descriptor(&self, key: &str) -> Option<PropertyDescriptor> {
        let ObjectKind::Array(elems) = &self.kind else {
            return None;
        };
        if key == "length" {
            return Some(PropertyDescriptor::data(
                Value::Number(elems.len() as f64),
                true,
                false,
                false,
            ));
        }
        let idx = number_ops::array_index(key)?;
        elems
            .get(idx)
            .map(|v| PropertyDescriptor::data_default(v.clone()))
    }

    pub fn get_own_property(&self, key: &str) -> Option<PropertyDescriptor> {
        if let Some(desc) = self.array_index_descriptor(key) {
            return Some(desc);
        }
        self.properties.get(key).cloned()
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key) || self.array_index_descriptor(key).is_some()
    }

    /// Own value lookup that never consults the prototype chain.
    pub fn get_own_value(&self, key: &str) -> Option<Value> {
        self.get_own_property(key).map(|d| d.value)
    }

    pub fn get_property(&self, key: &str) -> Value {
        if let Some(v) = self.get_own_value(key) {
            return v;
        }
        match &self.prototype {
            Some(proto) => proto.borrow().get_property(key),
            None => Value::Undefined,
        }
    }

    pub fn has_property(&self, key: &str) -> bool {
        if self.has_own_property(key) {
            return true;
        }
        match &self.prototype {
            Some(proto) => proto.borrow().has_property(key),
            None => false,
        }
    }

    /// Enumerable own keys: array indices first, then named keys in insertion
    /// order. Never consults the prototype chain.
    pub fn own_enumerable_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let ObjectKind::Array(elems) = &self.kind {
            keys.extend((0..elems.len()).map(|i| i.to_string()));
        }
        keys.extend(self.named_enumerable_keys().map(str::to_string));
        keys
    }

    /// Enumerable own keys that are not array indices.
    pub fn named_enumerable_keys(&self) -> impl Iterator<Item = &str> {
        self.property_order
            .iter()
            .filter(|k| self.properties.get(k.as_str()).is_some_and(|d| d.enumerable))
            .map(String::as_str)
    }


    pub fn enumerable_keys_with_proto(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut keys = Vec::new();
        for k in self.own_enumerable_keys() {
            if seen.insert(k.clone()) {
                keys.push(k);
            }
        }
        if let Some(ref proto) = self.prototype {
            for k in proto.borrow().enumerable_keys_with_proto() {
                // An own non-enumerable property still shadows the inherited one
                if !self.has_own_property(&k) && seen.insert(k.clone()) {
                    keys.push(k);
                }
            }
        }
        keys
    }

    pub fn define_own_property(&mut self, key: String, desc: PropertyDescriptor) -> bool {
        if matches!(self.kind, ObjectKind::Array(_)) && key == "length" {
            return false;
        }
        if let ObjectKind::Array(elems) = &mut self.kind
            && let Some(idx) = number_ops::array_index(&key)
        {
            if !(desc.writable && desc.enumerable && desc.configurable) {
                return false;
            }
            return write_element(elems, idx, desc.value, self.extensible);
        }
        if let Some(current) = self.get_own_property(&key) {
            if !current.configurable {
                if desc.configurable || desc.enumerable != current.enumerable {
                    return false;
                }
                if !current.writable
                    && (desc.writable || !desc.value.strict_equals(&current.value))
                {
                    return false;
                }
            }
        } else if !self.extensible {
            return false;
        }
        self.insert_property(key, desc);
        true
    }

    /// Assignment semantics for an own property: writes through a writable
    /// own slot, refuses a read-only one, and otherwise creates a default data
    /// property. Inherited read-only properties are checked by `Object::set`.
    pub fn set_own_value(&mut self, key: &str, value: Value) -> bool {
        if matches!(self.kind, ObjectKind::Array(_)) && key == "length" {
            return false;
        }
        if let ObjectKind::Array(elems) = &mut self.kind
            && let Some(idx) = number_ops::array_index(key)
        {
            return write_element(elems, idx, value, self.extensible);
        }
        if let Some(desc) = self.properties.get_mut(key) {
            if !desc.writable {
                return false;
            }
            desc.value = value;
            return true;
        }
        if !self.extensible {
            return false;
        }
        self.insert_property(key.to_string(), PropertyDescriptor::data_default(value));
        true
    }

    pub fn delete(&mut self, key: &str) -> bool {
        let configurable = match self.properties.get(key) {
            Some(desc) => desc.configurable,
            None => return self.array_index_descriptor(key).is_none(),
        };
        if !configurable {
            return false;
        }
        self.remove_own_property(key);
        true
    }

    pub fn insert_value(&mut self, key: &str, value: Value) {
        self.insert_property(key.to_string(), PropertyDescriptor::data_default(value));
    }

    /// Writes a named slot without validation. Used to put back exact saved
    /// descriptors.
    pub(crate) fn insert_property(&mut self, key: String, desc: PropertyDescriptor) {
        if !self.properties.contains_key(&key) {
            self.property_order.push(key.clone());
        }
        self.properties.insert(key, desc);
    }

    /// Drops a named slot without validation.
    pub(crate) fn remove_own_property(&mut self, key: &str) -> Option<PropertyDescriptor> {
        let removed = self.properties.remove(key)?;
        self.property_order.retain(|k| k != key);
        Some(removed)
    }
}

fn write_element(elems: &mut Vec<Value>, idx: usize, value: Value, extensible: bool) -> bool {
    if idx < elems.len() {
        elems[idx] = value;
        return true;
    }
    if !extensible {
        return false;
    }
    // No holes in this model: skipped indices are filled with undefined
    elems.resize(idx, Value::Undefined);
    elems.push(value);
    true
}

/// Shared handle to an [`ObjectData`]. Cloning the handle aliases the same
/// object; identity is handle identity.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Object(Rc::new(RefCell::new(ObjectData::new(kind))))
    }

    /// Ordinary object without a prototype.
    pub fn plain() -> Self {
        Self::new(ObjectKind::Ordinary)
    }

    pub fn with_prototype(proto: &Object) -> Self {
        let obj = Self::plain();
        obj.0.borrow_mut().prototype = Some(proto.clone());
        obj
    }

    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let obj = Self::plain();
        {
            let mut data = obj.borrow_mut();
            for (k, v) in entries {
                data.insert_property(k.into(), PropertyDescriptor::data_default(v));
            }
        }
        obj
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Self::new(ObjectKind::Array(elements))
    }

    pub fn function(name: &str, f: impl Fn(&Value, &[Value]) -> Value + 'static) -> Self {
        let func = Self::new(ObjectKind::Function(Function::new(name, f)));
        func.borrow_mut().insert_property(
            "name".to_string(),
            PropertyDescriptor::data(Value::string(name), false, false, true),
        );
        func
    }

    /// Function returning `undefined`, carrying a fresh `prototype` object
    /// the way constructor functions do.
    pub fn constructor(name: &str) -> Self {
        let ctor = Self::function(name, |_, _| Value::Undefined);
        let proto = Self::plain();
        proto.borrow_mut().insert_property(
            "constructor".to_string(),
            PropertyDescriptor::data(Value::Object(ctor.clone()), true, false, true),
        );
        ctor.borrow_mut().insert_property(
            "prototype".to_string(),
            PropertyDescriptor::data(Value::Object(proto), true, false, false),
        );
        ctor
    }

    pub fn regexp(source: &str, flags: &str) -> Result<Self, RegExpError> {
        Ok(Self::new(ObjectKind::RegExp(RegExp::new(source, flags)?)))
    }

    pub fn date(time: f64) -> Self {
        Self::new(ObjectKind::Date(date::time_clip(time)))
    }

    /// Date from local calendar fields, `month` zero-based.
    pub fn local_date(year: i32, month: i32, day: i32) -> Self {
        Self::date(date::local_time_value(
            f64::from(year),
            f64::from(month),
            f64::from(day),
            0.0,
            0.0,
            0.0,
            0.0,
        ))
    }

    pub fn error(name: &str, message: &str) -> Self {
        Self::new(ObjectKind::Error(ErrorData {
            name: name.to_string(),
            message: message.to_string(),
        }))
    }

    pub fn host_element(tag: &str) -> Self {
        Self::new(ObjectKind::Host(HostNode {
            tag: tag.to_string(),
            ..HostNode::default()
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.borrow().id
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn borrow(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Array(_))
    }

    pub fn get(&self, key: &str) -> Value {
        self.0.borrow().get_property(key)
    }

    /// Assignment. Fails on read-only own or inherited slots and on
    /// non-extensible objects lacking the key.
    pub fn set(&self, key: &str, value: Value) -> bool {
        let inherited_read_only = {
            let data = self.0.borrow();
            !data.has_own_property(key)
                && data
                    .prototype
                    .as_ref()
                    .and_then(|p| p.lookup_descriptor(key))
                    .is_some_and(|d| !d.writable)
        };
        if inherited_read_only {
            return false;
        }
        self.0.borrow_mut().set_own_value(key, value)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.0.borrow_mut().delete(key)
    }

    /// Nearest descriptor for `key` along the prototype chain.
    pub fn lookup_descriptor(&self, key: &str) -> Option<PropertyDescriptor> {
        let data = self.0.borrow();
        if let Some(desc) = data.get_own_property(key) {
            return Some(desc);
        }
        data.prototype.as_ref()?.lookup_descriptor(key)
    }

    /// Replaces the prototype. Refuses changes that would make the chain
    /// circular or that target a non-extensible object.
    pub fn set_prototype(&self, proto: Option<&Object>) -> bool {
        let mut cursor = proto.cloned();
        while let Some(p) = cursor {
            if p.ptr_eq(self) {
                return false;
            }
            cursor = p.borrow().prototype.clone();
        }
        let mut data = self.0.borrow_mut();
        if !data.extensible {
            return false;
        }
        data.prototype = proto.cloned();
        true
    }

    pub fn prevent_extensions(&self) {
        self.0.borrow_mut().extensible = false;
    }

    /// Calls a function object. Calling a non-callable yields `undefined`.
    pub fn call(&self, this: &Value, args: &[Value]) -> Value {
        let behavior = match &self.0.borrow().kind {
            ObjectKind::Function(f) => f.behavior.clone(),
            _ => return Value::Undefined,
        };
        behavior(this, args)
    }

    /// Moves `child` under this host element. Both must be host elements and
    /// `child` must not be an ancestor of (or equal to) this element.
    pub fn append_child(&self, child: &Object) -> bool {
        if !matches!(self.0.borrow().kind, ObjectKind::Host(_))
            || !matches!(child.0.borrow().kind, ObjectKind::Host(_))
        {
            return false;
        }
        let mut cursor = Some(self.clone());
        while let Some(node) = cursor {
            if node.ptr_eq(child) {
                return false;
            }
            cursor = node.parent_node();
        }
        if let Some(old_parent) = child.parent_node()
            && let ObjectKind::Host(node) = &mut old_parent.0.borrow_mut().kind
        {
            node.children.retain(|c| !c.ptr_eq(child));
        }
        if let ObjectKind::Host(node) = &mut child.0.borrow_mut().kind {
            node.parent = Some(Rc::downgrade(&self.0));
        }
        if let ObjectKind::Host(node) = &mut self.0.borrow_mut().kind {
            node.children.push(child.clone());
        }
        true
    }

    pub fn parent_node(&self) -> Option<Object> {
        match &self.0.borrow().kind {
            ObjectKind::Host(node) => node.parent.as_ref()?.upgrade().map(Object),
            _ => None,
        }
    }

    pub fn child_nodes(&self) -> Vec<Object> {
        match &self.0.borrow().kind {
            ObjectKind::Host(node) => node.children.clone(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => write!(f, "Object#{}({})", data.id, data.kind.class_name()),
            Err(_) => write!(f, "Object(<borrowed>)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

// `seen` holds the arrays currently being joined; re-entering one renders
// as empty.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, seen: &mut Vec<u64>) -> fmt::Result {
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Null => write!(f, "null"),
        Value::Boolean(b) => write!(f, "{b}"),
        Value::Number(n) => write!(f, "{}", number_ops::to_string(*n)),
        Value::String(s) => write!(f, "{s}"),
        Value::Symbol(s) => write!(f, "Symbol({})", s.description.as_deref().unwrap_or("")),
        Value::BigInt(n) => write!(f, "{n}"),
        Value::Object(obj) => {
            let data = obj.borrow();
            match &data.kind {
                ObjectKind::Ordinary => write!(f, "[object Object]"),
                ObjectKind::Array(elems) => {
                    if seen.contains(&data.id) {
                        return Ok(());
                    }
                    seen.push(data.id);
                    for (i, elem) in elems.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        if !elem.is_nullish() {
                            write_value(f, elem, seen)?;
                        }
                    }
                    seen.pop();
                    Ok(())
                }
                ObjectKind::Function(func) => write!(f, "function {}() {{}}", func.name),
                ObjectKind::RegExp(re) => write!(f, "{re}"),
                ObjectKind::Date(t) => match date::to_iso_string(*t) {
                    Some(s) => write!(f, "{s}"),
                    None => write!(f, "Invalid Date"),
                },
                ObjectKind::Error(e) if e.message.is_empty() => write!(f, "{}", e.name),
                ObjectKind::Error(e) => write!(f, "{}: {}", e.name, e.message),
                ObjectKind::Host(node) => write!(f, "[object HTML{}Element]", node.tag),
            }
        }
    }
}

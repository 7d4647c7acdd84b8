//! Shared domain types and registries for engine tests.

#![allow(dead_code)]

use serde_json::json;
use std::cell::RefCell;
use tagwalk_engine::{Engine, EngineConfig};
use tagwalk_model::{
    PayloadDecoder, PayloadEncoder, RegistryError, RegistryResult, TypeHandler, TypeRegistry,
};
use tagwalk_types::{PlainForm, Value};

/// A leaf domain type with a flat payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// A domain type holding graph values, encoded through `embed`/`extract`.
#[derive(Debug, PartialEq)]
pub struct Labelled {
    pub label: String,
    pub target: Value,
}

/// A domain type that may point back at itself. Compared by address.
#[derive(Debug)]
pub struct Person {
    pub name: RefCell<String>,
    pub friend: RefCell<Value>,
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// Two-phase handler for [`Person`].
pub struct PersonHandler;

impl TypeHandler for PersonHandler {
    fn type_id(&self) -> &str {
        "Person"
    }

    fn matches(&self, value: &Value) -> bool {
        value.as_custom::<Person>().is_some()
    }

    fn encode(&self, value: &Value, encoder: &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> {
        let person = value
            .as_custom::<Person>()
            .ok_or_else(|| RegistryError::payload("Person", "not a person"))?;
        let friend = encoder.embed(&person.friend.borrow())?;
        Ok(json!({"name": person.name.borrow().as_str(), "friend": friend}))
    }

    fn decode(&self, _payload: &PlainForm, _decoder: &mut dyn PayloadDecoder) -> RegistryResult<Value> {
        Err(RegistryError::payload("Person", "decoded through shell/fill"))
    }

    fn shell(&self) -> Option<Value> {
        Some(Value::custom(Person {
            name: RefCell::new(String::new()),
            friend: RefCell::new(Value::Null),
        }))
    }

    fn fill(
        &self,
        shell: &Value,
        payload: &PlainForm,
        decoder: &mut dyn PayloadDecoder,
    ) -> RegistryResult<()> {
        let person = shell
            .as_custom::<Person>()
            .ok_or_else(|| RegistryError::payload("Person", "shell is not a person"))?;
        let name = payload["name"]
            .as_str()
            .ok_or_else(|| RegistryError::payload("Person", "missing name"))?;
        *person.name.borrow_mut() = name.to_string();
        let friend = decoder.extract(&payload["friend"])?;
        *person.friend.borrow_mut() = friend;
        Ok(())
    }
}

pub fn person(name: &str) -> Value {
    Value::custom(Person {
        name: RefCell::new(name.to_string()),
        friend: RefCell::new(Value::Null),
    })
}

pub fn befriend(a: &Value, b: &Value) {
    let person = a.as_custom::<Person>().unwrap();
    *person.friend.borrow_mut() = b.clone();
}

pub fn register_point(registry: &mut TypeRegistry) {
    registry
        .register_plain_type(
            "Point",
            |v| v.as_custom::<Point>().is_some(),
            |v| {
                let p = v
                    .as_custom::<Point>()
                    .ok_or_else(|| RegistryError::payload("Point", "not a point"))?;
                Ok(json!({"x": p.x, "y": p.y}))
            },
            |payload| {
                let coord = |key: &str| {
                    payload[key]
                        .as_i64()
                        .ok_or_else(|| RegistryError::payload("Point", format!("missing {key}")))
                };
                Ok(Value::custom(Point {
                    x: coord("x")?,
                    y: coord("y")?,
                }))
            },
        )
        .unwrap();
}

pub fn register_labelled(registry: &mut TypeRegistry) {
    registry
        .register_type(
            "Labelled",
            |v| v.as_custom::<Labelled>().is_some(),
            |v, encoder| {
                let l = v
                    .as_custom::<Labelled>()
                    .ok_or_else(|| RegistryError::payload("Labelled", "not labelled"))?;
                Ok(json!({"label": l.label, "target": encoder.embed(&l.target)?}))
            },
            |payload, decoder| {
                let label = payload["label"].as_str().unwrap_or_default().to_string();
                let target = decoder.extract(&payload["target"])?;
                Ok(Value::custom(Labelled { label, target }))
            },
        )
        .unwrap();
}

/// Engine with built-ins plus `Point`, `Labelled` and `Person`.
pub fn domain_engine() -> Engine {
    domain_engine_with(EngineConfig::default())
}

pub fn domain_engine_with(config: EngineConfig) -> Engine {
    let mut registry = TypeRegistry::with_builtins();
    register_point(&mut registry);
    register_labelled(&mut registry);
    registry.register(PersonHandler).unwrap();
    Engine::with_config(registry, config)
}

/// Engine with an empty registry.
pub fn plain_engine() -> Engine {
    Engine::new(TypeRegistry::new())
}

/// A chain of `depth` nested single-element lists around a string.
pub fn nested_lists(depth: usize) -> Value {
    let mut value = Value::from("leaf");
    for _ in 0..depth {
        value = Value::list([value]);
    }
    value
}

//! Shared host types for integration tests

#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use beanshape_sdk::{
    class, AccessError, AccessResult, ClassBuilder, HostObject, HostValue, ScalarValue, TypeKey,
    TypeRef, TypeRegistry,
};
use parking_lot::RwLock;

/// Downcast a host object inside a member closure
pub fn downcast<T: 'static>(obj: &dyn HostObject) -> AccessResult<&T> {
    obj.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| AccessError::WrongInstance {
            expected: std::any::type_name::<T>().to_string(),
            got: obj.type_key().to_string(),
        })
}

fn int_arg(value: HostValue) -> AccessResult<i32> {
    match value {
        HostValue::Scalar(ScalarValue::Integer(v)) => Ok(v),
        other => Err(AccessError::TypeMismatch {
            expected: "integer".into(),
            got: other.type_name().into(),
        }),
    }
}

// ============================================================================
// Point
// ============================================================================

pub struct Point {
    key: TypeKey,
    pub x: RwLock<i32>,
    pub y: RwLock<i32>,
}

impl Point {
    pub fn new(key: TypeKey, x: i32, y: i32) -> Self {
        Self {
            key,
            x: RwLock::new(x),
            y: RwLock::new(y),
        }
    }
}

impl HostObject for Point {
    fn type_key(&self) -> TypeKey {
        self.key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        format!("({}, {})", self.x.read(), self.y.read())
    }
}

// ============================================================================
// Node (self-referential)
// ============================================================================

pub struct Node {
    key: TypeKey,
    pub value: String,
    pub next: Option<Arc<Node>>,
}

impl Node {
    pub fn new(key: TypeKey, value: &str, next: Option<Arc<Node>>) -> Self {
        Self {
            key,
            value: value.to_string(),
            next,
        }
    }
}

impl HostObject for Node {
    fn type_key(&self) -> TypeKey {
        self.key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        format!("Node({})", self.value)
    }
}

// ============================================================================
// Settings (annotated, writable)
// ============================================================================

pub struct Settings {
    key: TypeKey,
    pub name: RwLock<String>,
    pub level: RwLock<String>,
    pub limit: RwLock<i16>,
    pub ratio: RwLock<f64>,
    pub origin: RwLock<Option<Arc<dyn HostObject>>>,
    pub tags: Vec<String>,
    pub id: i64,
}

impl HostObject for Settings {
    fn type_key(&self) -> TypeKey {
        self.key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Bag: holder of every other shape
// ============================================================================

pub struct Bag {
    key: TypeKey,
    pub grid: HostValue,
    pub counts: Vec<(String, i32)>,
    pub points: Vec<Arc<Point>>,
}

impl HostObject for Bag {
    fn type_key(&self) -> TypeKey {
        self.key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Object whose members fail on read
pub struct Flaky {
    key: TypeKey,
}

impl HostObject for Flaky {
    fn type_key(&self) -> TypeKey {
        self.key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub registry: TypeRegistry,
    pub point: TypeKey,
    pub node: TypeKey,
    pub level: TypeKey,
    pub settings: TypeKey,
    pub bag: TypeKey,
    pub flaky: TypeKey,
    pub holder: TypeKey,
    pub empty: TypeKey,
}

impl Fixture {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::new();
        let int: TypeRef = TypeRegistry::INTEGER.into();
        let string: TypeRef = TypeRegistry::STRING.into();

        let point = registry.declare("demo::Point").unwrap();
        registry
            .define(
                point,
                ClassBuilder::record("demo::Point")
                    .extends(TypeRegistry::OBJECT)
                    .getter("x", int.clone(), |o| Ok(HostValue::from(*downcast::<Point>(o)?.x.read())))
                    .setter("x", int.clone(), |o, v| {
                        *downcast::<Point>(o)?.x.write() = int_arg(v)?;
                        Ok(())
                    })
                    .getter("y", int.clone(), |o| Ok(HostValue::from(*downcast::<Point>(o)?.y.read())))
                    .setter("y", int.clone(), |o, v| {
                        *downcast::<Point>(o)?.y.write() = int_arg(v)?;
                        Ok(())
                    })
                    .factory(move || Arc::new(Point::new(point, 0, 0))),
            )
            .unwrap();

        let node = registry.declare("demo::Node").unwrap();
        registry
            .define(
                node,
                ClassBuilder::record("demo::Node")
                    .field("value", string.clone(), |o| {
                        Ok(HostValue::from(downcast::<Node>(o)?.value.as_str()))
                    })
                    .field("next", node.into(), |o| {
                        Ok(match &downcast::<Node>(o)?.next {
                            Some(next) => HostValue::Object(next.clone()),
                            None => HostValue::Null,
                        })
                    }),
            )
            .unwrap();

        let level = registry
            .register(ClassBuilder::enumeration("demo::Level", &["LOW", "HIGH"]))
            .unwrap();

        let settings = registry
            .register(
                ClassBuilder::record("demo::Settings")
                    .display(Some("Settings"), Some("Runtime settings"))
                    .member(
                        class::getter("name", string.clone(), |o| {
                            Ok(HostValue::from(downcast::<Settings>(o)?.name.read().clone()))
                        })
                        .annotated(),
                    )
                    .setter("name", string.clone(), |o, v| {
                        let name = match v {
                            HostValue::Scalar(ScalarValue::String(s)) => s,
                            other => return Err(AccessError::TypeMismatch {
                                expected: "string".into(),
                                got: other.type_name().into(),
                            }),
                        };
                        *downcast::<Settings>(o)?.name.write() = name;
                        Ok(())
                    })
                    .member(
                        class::getter("level", level.into(), |o| {
                            Ok(HostValue::enumerant("demo::Level", &downcast::<Settings>(o)?.level.read()))
                        })
                        .annotated(),
                    )
                    .setter("level", level.into(), |o, v| match v {
                        HostValue::Enum(e) => {
                            *downcast::<Settings>(o)?.level.write() = e.variant;
                            Ok(())
                        }
                        other => Err(AccessError::TypeMismatch {
                            expected: "enum".into(),
                            got: other.type_name().into(),
                        }),
                    })
                    .member(
                        class::getter("limit", TypeRegistry::SHORT.into(), |o| {
                            Ok(HostValue::from(*downcast::<Settings>(o)?.limit.read()))
                        })
                        .described(Some("Limit"), Some("Maximum number of entries")),
                    )
                    .setter("limit", TypeRegistry::SHORT.into(), |o, v| match v {
                        HostValue::Scalar(ScalarValue::Short(s)) => {
                            *downcast::<Settings>(o)?.limit.write() = s;
                            Ok(())
                        }
                        other => Err(AccessError::TypeMismatch {
                            expected: "short".into(),
                            got: other.type_name().into(),
                        }),
                    })
                    .member(
                        class::getter("ratio", TypeRegistry::DOUBLE.into(), |o| {
                            Ok(HostValue::from(*downcast::<Settings>(o)?.ratio.read()))
                        })
                        .annotated(),
                    )
                    .setter("ratio", TypeRegistry::DOUBLE.into(), |o, v| match v {
                        HostValue::Scalar(ScalarValue::Double(d)) => {
                            *downcast::<Settings>(o)?.ratio.write() = d;
                            Ok(())
                        }
                        other => Err(AccessError::TypeMismatch {
                            expected: "double".into(),
                            got: other.type_name().into(),
                        }),
                    })
                    .member(
                        class::getter("origin", point.into(), |o| {
                            Ok(match &*downcast::<Settings>(o)?.origin.read() {
                                Some(p) => HostValue::Object(p.clone()),
                                None => HostValue::Null,
                            })
                        })
                        .annotated(),
                    )
                    .setter("origin", point.into(), |o, v| {
                        let point = match v {
                            HostValue::Null => None,
                            HostValue::Object(obj) => Some(obj),
                            other => {
                                return Err(AccessError::TypeMismatch {
                                    expected: "object".into(),
                                    got: other.type_name().into(),
                                })
                            }
                        };
                        *downcast::<Settings>(o)?.origin.write() = point;
                        Ok(())
                    })
                    .getter(
                        "tags",
                        TypeRef::generic(TypeRegistry::LIST, vec![string.clone()]),
                        |o| {
                            let tags = &downcast::<Settings>(o)?.tags;
                            Ok(HostValue::Sequence(tags.iter().map(|t| HostValue::from(t.as_str())).collect()))
                        },
                    )
                    .member(
                        class::field("id", TypeRegistry::LONG.into(), |o| Ok(HostValue::from(downcast::<Settings>(o)?.id)), None)
                            .annotated(),
                    )
                    .member(
                        class::getter("password", string.clone(), |_| Ok(HostValue::from("secret")))
                            .transient(),
                    )
                    .operation(class::operation("reset", TypeRegistry::VOID.into()).described("Restore defaults"))
                    .operation(
                        class::operation("resize", TypeRegistry::SHORT.into())
                            .described_param("limit", "New limit", TypeRegistry::SHORT.into())
                            .annotated(),
                    )
                    .operation(class::operation("describe", string.clone()))
                    .operation(class::operation("shutdown", TypeRegistry::VOID.into()).annotated().transient()),
            )
            .unwrap();

        let bag = registry
            .register(
                ClassBuilder::record("demo::Bag")
                    .field("grid", TypeRef::array_of_dims(int.clone(), 2), |o| {
                        Ok(downcast::<Bag>(o)?.grid.clone())
                    })
                    .field(
                        "counts",
                        TypeRef::generic(TypeRegistry::MAP, vec![string.clone(), int.clone()]),
                        |o| {
                            let counts = &downcast::<Bag>(o)?.counts;
                            Ok(HostValue::Map(
                                counts
                                    .iter()
                                    .map(|(k, v)| (HostValue::from(k.as_str()), HostValue::from(*v)))
                                    .collect(),
                            ))
                        },
                    )
                    .field(
                        "points",
                        TypeRef::generic(TypeRegistry::LIST, vec![point.into()]),
                        |o| {
                            let points = &downcast::<Bag>(o)?.points;
                            Ok(HostValue::Sequence(
                                points.iter().map(|p| HostValue::Object(p.clone())).collect(),
                            ))
                        },
                    ),
            )
            .unwrap();

        let flaky = registry
            .register(
                ClassBuilder::record("demo::Flaky")
                    .getter("ok", int.clone(), |_| Ok(HostValue::from(1i32)))
                    .getter("broken", int.clone(), |_| Err(AccessError::Failed("disk offline".into()))),
            )
            .unwrap();

        let holder = registry
            .register(ClassBuilder::record("demo::Holder").field(
                "items",
                TypeRef::generic(
                    TypeRegistry::LIST,
                    vec![TypeRef::Wildcard {
                        lower: vec![],
                        upper: vec![],
                    }],
                ),
                |_| Ok(HostValue::Null),
            ))
            .unwrap();

        let empty = registry
            .register(ClassBuilder::record("demo::Empty").extends(TypeRegistry::OBJECT))
            .unwrap();

        Self {
            registry,
            point,
            node,
            level,
            settings,
            bag,
            flaky,
            holder,
            empty,
        }
    }

    pub fn point(&self, x: i32, y: i32) -> Arc<Point> {
        Arc::new(Point::new(self.point, x, y))
    }

    pub fn node_chain(&self, values: &[&str]) -> Arc<Node> {
        let mut next: Option<Arc<Node>> = None;
        for value in values.iter().rev() {
            next = Some(Arc::new(Node::new(self.node, value, next)));
        }
        next.unwrap_or_else(|| Arc::new(Node::new(self.node, "", None)))
    }

    pub fn settings(&self) -> Arc<Settings> {
        Arc::new(Settings {
            key: self.settings,
            name: RwLock::new("primary".into()),
            level: RwLock::new("LOW".into()),
            limit: RwLock::new(10),
            ratio: RwLock::new(0.5),
            origin: RwLock::new(None),
            tags: vec!["a".into(), "b".into()],
            id: 7,
        })
    }

    pub fn bag(&self, grid: HostValue, counts: &[(&str, i32)], points: Vec<Arc<Point>>) -> Arc<Bag> {
        Arc::new(Bag {
            key: self.bag,
            grid,
            counts: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            points,
        })
    }

    pub fn flaky(&self) -> Arc<Flaky> {
        Arc::new(Flaky { key: self.flaky })
    }
}

/// Native int matrix from rows
pub fn int_matrix(rows: &[&[i32]]) -> HostValue {
    HostValue::array(
        rows.iter()
            .map(|row| HostValue::array(row.iter().map(|v| HostValue::from(*v)).collect()))
            .collect(),
    )
}

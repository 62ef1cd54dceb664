//! Population of record types from rows.
//!
//! A record describes itself once through [`Record::shape`]: the constructors
//! it offers (each with named parameters), whether it has a parameterless
//! constructor, and which members may be assigned from columns. Shapes are
//! cached per type for the life of the process.
//!
//! For a given result set the construction strategy is chosen once, from the
//! column names of its first row:
//!
//! 1. the constructor whose parameters all name columns of that row, preferring
//!    the one with the most parameters (declaration order breaks ties);
//! 2. otherwise the parameterless constructor (the default constructor, or a
//!    constructor registered without parameters) followed by assignment of
//!    every publicly writable member that has a same-named column;
//! 3. otherwise a [`MaterializeError::Construction`].

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, LazyLock, RwLock},
};

use crate::{
    MaterializeError, Row, Value,
    coerce::{ConversionError, FromCell},
    descriptor::{
        Access, ConstructorDescriptor, MemberDescriptor, ParameterDescriptor, TargetDescriptor,
        TargetKind,
    },
};

/// A type that can be populated from a row.
///
/// Usually derived with `#[derive(Record)]`.
pub trait Record: Sized + 'static {
    fn shape() -> RecordShape<Self>;
}

type BuildFn<T> = Box<dyn Fn(&Arguments<'_>) -> Result<T, MaterializeError> + Send + Sync>;
type AssignFn<T> = Box<dyn Fn(&mut T, &Value) -> Result<(), ConversionError> + Send + Sync>;

pub struct Constructor<T> {
    parameters: Vec<ParameterDescriptor>,
    build: BuildFn<T>,
}

pub struct Member<T> {
    descriptor: MemberDescriptor,
    assign: Option<AssignFn<T>>,
}

/// Constructor arguments, looked up by parameter name in the current row.
pub struct Arguments<'a> {
    row: &'a Row,
}

impl Arguments<'_> {
    /// Converts the column named `name`.
    ///
    /// A missing column yields the parameter type's null value.
    ///
    /// # Errors
    ///
    /// * If the column's value failed to convert
    pub fn get<V: FromCell>(&self, name: &str) -> Result<V, MaterializeError> {
        self.row.get(name).map_or_else(
            || Ok(V::null_value()),
            |cell| V::from_cell(cell).map_err(|e| MaterializeError::conversion(name, e)),
        )
    }
}

/// Describes a parameter named `name` of type `V`.
#[must_use]
pub fn param<V: FromCell>(name: &'static str) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        target: V::descriptor(),
    }
}

/// How a record type is built and populated.
pub struct RecordShape<T> {
    name: &'static str,
    constructors: Vec<Constructor<T>>,
    default: Option<fn() -> T>,
    members: Vec<Member<T>>,
}

impl<T> std::fmt::Debug for RecordShape<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordShape")
            .field("name", &self.name)
            .field("constructors", &self.constructors.len())
            .field("default", &self.default.is_some())
            .field(
                "members",
                &self
                    .members
                    .iter()
                    .map(|m| m.descriptor.name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The construction strategy chosen for one result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Index into the shape's constructors.
    Constructor(usize),
    /// Parameterless constructor, then member assignment.
    Assign,
}

impl<T: 'static> RecordShape<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            constructors: vec![],
            default: None,
            members: vec![],
        }
    }

    /// Registers a constructor taking `parameters`, in declaration order.
    #[must_use]
    pub fn constructor(
        mut self,
        parameters: Vec<ParameterDescriptor>,
        build: impl Fn(&Arguments<'_>) -> Result<T, MaterializeError> + Send + Sync + 'static,
    ) -> Self {
        self.constructors.push(Constructor {
            parameters,
            build: Box::new(build),
        });
        self
    }

    #[must_use]
    pub fn default_constructor(mut self, default: fn() -> T) -> Self {
        self.default = Some(default);
        self
    }

    /// Registers a publicly writable member.
    #[must_use]
    pub fn member<V: FromCell + 'static>(
        mut self,
        name: &'static str,
        assign: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        self.members.push(Member {
            descriptor: MemberDescriptor {
                name,
                access: Access::Public,
                target: V::descriptor(),
            },
            assign: Some(Box::new(move |record, cell| {
                assign(record, V::from_cell(cell)?);
                Ok(())
            })),
        });
        self
    }

    /// Registers a member that columns never write to.
    #[must_use]
    pub fn skipped_member<V: FromCell>(mut self, name: &'static str, access: Access) -> Self {
        self.members.push(Member {
            descriptor: MemberDescriptor {
                name,
                access,
                target: V::descriptor(),
            },
            assign: None,
        });
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> TargetDescriptor {
        TargetDescriptor {
            kind: TargetKind::Record {
                name: self.name,
                constructors: self
                    .constructors
                    .iter()
                    .map(|c| ConstructorDescriptor {
                        parameters: c.parameters.clone(),
                    })
                    .collect(),
                has_default: self.has_parameterless(),
                members: self.members.iter().map(|m| m.descriptor.clone()).collect(),
            },
            nullable: false,
        }
    }

    /// Whether a default constructor or a constructor without parameters exists.
    fn has_parameterless(&self) -> bool {
        self.default.is_some() || self.constructors.iter().any(|c| c.parameters.is_empty())
    }

    fn instantiate(&self, row: &Row) -> Result<T, MaterializeError> {
        if let Some(default) = self.default {
            return Ok(default());
        }

        let constructor = self
            .constructors
            .iter()
            .find(|c| c.parameters.is_empty())
            .ok_or_else(|| MaterializeError::Construction {
                record: self.name,
                reason: "no parameterless constructor".to_string(),
            })?;

        (constructor.build)(&Arguments { row })
    }

    /// Chooses how rows shaped like `row` are built.
    ///
    /// # Errors
    ///
    /// * If no constructor matches the columns and there is no parameterless constructor
    pub fn resolve(&self, row: &Row) -> Result<Strategy, MaterializeError> {
        let columns = row.column_names().collect::<Vec<_>>();

        let mut best: Option<(usize, usize)> = None;
        for (index, constructor) in self.constructors.iter().enumerate() {
            let arity = constructor.parameters.len();
            if arity == 0
                || !constructor
                    .parameters
                    .iter()
                    .all(|p| columns.contains(&p.name))
            {
                continue;
            }
            if best.is_none_or(|(_, best_arity)| arity > best_arity) {
                best = Some((index, arity));
            }
        }

        let strategy = match best {
            Some((index, _)) => Strategy::Constructor(index),
            None if self.has_parameterless() => Strategy::Assign,
            None => {
                return Err(MaterializeError::Construction {
                    record: self.name,
                    reason: format!(
                        "no constructor matches columns {columns:?} and there is no parameterless constructor"
                    ),
                });
            }
        };

        log::trace!("resolve: {} -> {strategy:?}", self.name);

        Ok(strategy)
    }

    /// Builds one instance from `row` using a previously resolved strategy.
    ///
    /// # Errors
    ///
    /// * If any column failed to convert to its parameter or member type
    /// * If `strategy` does not belong to this shape
    pub fn materialize(&self, strategy: Strategy, row: &Row) -> Result<T, MaterializeError> {
        match strategy {
            Strategy::Constructor(index) => {
                let constructor =
                    self.constructors
                        .get(index)
                        .ok_or_else(|| MaterializeError::Construction {
                            record: self.name,
                            reason: format!("no constructor at index {index}"),
                        })?;
                (constructor.build)(&Arguments { row })
            }
            Strategy::Assign => {
                let mut record = self.instantiate(row)?;

                for member in &self.members {
                    let Some(assign) = &member.assign else {
                        continue;
                    };
                    if let Some(cell) = row.get(member.descriptor.name) {
                        assign(&mut record, cell)
                            .map_err(|e| MaterializeError::conversion(member.descriptor.name, e))?;
                    }
                }

                Ok(record)
            }
        }
    }
}

type ShapeCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static SHAPES: LazyLock<RwLock<ShapeCache>> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the cached shape for `T`, computing it on first use.
///
/// Concurrent first uses may each compute the shape; the first one stored wins
/// and every caller receives that one.
///
/// # Panics
///
/// * If the shape cache `RwLock` was poisoned
#[must_use]
pub fn shape_of<T: Record>() -> Arc<RecordShape<T>> {
    let id = TypeId::of::<T>();

    if let Some(shape) = SHAPES.read().unwrap().get(&id).cloned() {
        return downcast(shape);
    }

    let computed: Arc<dyn Any + Send + Sync> = Arc::new(T::shape());
    log::trace!(
        "shape_of: computed shape for {}",
        std::any::type_name::<T>()
    );

    let shape = SHAPES
        .write()
        .unwrap()
        .entry(id)
        .or_insert(computed)
        .clone();

    downcast(shape)
}

fn downcast<T: 'static>(shape: Arc<dyn Any + Send + Sync>) -> Arc<RecordShape<T>> {
    match shape.downcast::<RecordShape<T>>() {
        Ok(shape) => shape,
        Err(_) => unreachable!("shape cache entry stored under the wrong TypeId"),
    }
}

/// The cached record descriptor for `T`.
#[must_use]
pub fn describe<T: Record>() -> TargetDescriptor {
    shape_of::<T>().descriptor()
}

/// Materializes a single row into `T`, resolving the strategy from that row.
///
/// # Errors
///
/// * If `T` cannot be constructed from the row's columns
/// * If any column failed to convert
pub fn materialize_row<T: Record>(row: &Row) -> Result<T, MaterializeError> {
    let shape = shape_of::<T>();
    let strategy = shape.resolve(row)?;
    shape.materialize(strategy, row)
}

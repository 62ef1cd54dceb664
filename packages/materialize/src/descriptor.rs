//! Read-only descriptions of what a caller asked to materialize.

use std::fmt;

/// Scalar column types a cell can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    #[cfg(feature = "decimal")]
    Decimal,
    Bool,
    Char,
    DateTime,
    #[cfg(feature = "uuid")]
    Uuid,
    String,
}

impl ScalarKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            #[cfg(feature = "decimal")]
            Self::Decimal => "Decimal",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::DateTime => "NaiveDateTime",
            #[cfg(feature = "uuid")]
            Self::Uuid => "Uuid",
            Self::String => "String",
        }
    }
}

/// Binary payload targets. These copy rather than borrow from the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    Bytes,
    Chars,
    Stream,
}

impl BinaryKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bytes => "Vec<u8>",
            Self::Chars => "Vec<char>",
            Self::Stream => "ByteStream",
        }
    }
}

/// Whether a record member accepts assignment from a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Publicly writable; columns of the same name are assigned.
    Public,
    /// Not visible outside the type; same-named columns are skipped.
    Restricted,
    /// Visible but not externally assignable; same-named columns are skipped.
    ReadOnly,
}

impl Access {
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::Public)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: &'static str,
    pub access: Access,
    pub target: TargetDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    pub parameters: Vec<ParameterDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub target: TargetDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Scalar(ScalarKind),
    Binary(BinaryKind),
    Record {
        name: &'static str,
        constructors: Vec<ConstructorDescriptor>,
        has_default: bool,
        members: Vec<MemberDescriptor>,
    },
}

/// Describes one requested output type.
///
/// Column targets carry their scalar or binary kind and nullability; record
/// targets carry the constructors and members available to populate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub kind: TargetKind,
    pub nullable: bool,
}

impl TargetDescriptor {
    #[must_use]
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self {
            kind: TargetKind::Scalar(kind),
            nullable: false,
        }
    }

    #[must_use]
    pub const fn binary(kind: BinaryKind) -> Self {
        Self {
            kind: TargetKind::Binary(kind),
            nullable: false,
        }
    }

    #[must_use]
    pub fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self.kind, TargetKind::Record { .. })
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match &self.kind {
            TargetKind::Scalar(kind) => kind.name(),
            TargetKind::Binary(kind) => kind.name(),
            TargetKind::Record { name, .. } => *name,
        }
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.type_name())
        } else {
            f.write_str(self.type_name())
        }
    }
}

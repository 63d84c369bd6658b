// Copyright (c) 2025 - Cowboy AI, Inc.
//! Field Schema Tables
//!
//! Every record and component type carries a compile-time table describing
//! its fields: the external (camelCase) name, the merge shape, and for
//! composite fields the table of the child type. Generic algorithms walk
//! these tables instead of inspecting values at runtime:
//!
//! - the merge engine dispatches each field to its [`strategy`],
//! - the document codec folds incoming keys case-insensitively onto the
//!   canonical names.
//!
//! Both tables and merge impls come from a single [`resource_schema!`]
//! declaration per type, so the two can never drift apart.
//!
//! ```rust,ignore
//! resource_schema! {
//!     Drive {
//!         drive_type: Scalar => "type",
//!         size: Scalar => "size",
//!     }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};

/// How a field participates in a strategic merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// `Option<T>` leaf; incoming `Some` overwrites
    Scalar,
    /// Keyed map; incoming keys are upserted
    Map,
    /// List or set; non-empty incoming replaces, empty incoming is ignored
    List,
    /// `Option<T>` object; recursed into when both sides are present
    Nested,
    /// Struct serialized inline with its parent; always recursed into
    Flatten,
}

/// One row of a schema table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// External field name (empty for [`FieldShape::Flatten`])
    pub name: &'static str,
    /// Merge shape
    pub shape: FieldShape,
    /// Schema of the element or nested type, empty for leaves
    pub children: &'static [FieldSpec],
}

impl FieldSpec {
    /// Find the spec for `key`, ignoring case and looking through flattened structs
    pub fn find(fields: &'static [FieldSpec], key: &str) -> Option<&'static FieldSpec> {
        fields.iter().find_map(|spec| match spec.shape {
            FieldShape::Flatten => Self::find(spec.children, key),
            _ if spec.name.eq_ignore_ascii_case(key) => Some(spec),
            _ => None,
        })
    }

    /// Iterate leaf rows, expanding flattened structs in place
    pub fn flatten(fields: &'static [FieldSpec]) -> Vec<&'static FieldSpec> {
        let mut out = Vec::with_capacity(fields.len());
        for spec in fields {
            if spec.shape == FieldShape::Flatten {
                out.extend(Self::flatten(spec.children));
            } else {
                out.push(spec);
            }
        }
        out
    }
}

/// Types that publish a field schema
pub trait Schema {
    /// Field table in serialization order
    const FIELDS: &'static [FieldSpec];
}

/// Field-level deep merge of `incoming` into `self`
pub trait StrategicMerge {
    fn merge_from(&mut self, incoming: Self);
}

/// Collections merged with list semantics
pub trait ListLike {
    fn is_empty_list(&self) -> bool;
}

impl<T> ListLike for Vec<T> {
    fn is_empty_list(&self) -> bool {
        self.is_empty()
    }
}

impl<T> ListLike for BTreeSet<T> {
    fn is_empty_list(&self) -> bool {
        self.is_empty()
    }
}

/// Per-shape merge rules, one unit type per [`FieldShape`] variant
pub mod strategy {
    use super::*;

    pub struct Scalar;

    impl Scalar {
        pub fn merge<T>(existing: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *existing = incoming;
            }
        }
    }

    pub struct Map;

    impl Map {
        pub fn merge<K: Ord, V>(existing: &mut BTreeMap<K, V>, incoming: BTreeMap<K, V>) {
            existing.extend(incoming);
        }
    }

    pub struct List;

    impl List {
        // An empty incoming list carries no information in Merge mode.
        pub fn merge<C: ListLike>(existing: &mut C, incoming: C) {
            if !incoming.is_empty_list() {
                *existing = incoming;
            }
        }
    }

    pub struct Nested;

    impl Nested {
        pub fn merge<T: StrategicMerge>(existing: &mut Option<T>, incoming: Option<T>) {
            let Some(incoming) = incoming else {
                return;
            };
            match existing {
                Some(current) => current.merge_from(incoming),
                None => *existing = Some(incoming),
            }
        }
    }

    pub struct Flatten;

    impl Flatten {
        pub fn merge<T: StrategicMerge>(existing: &mut T, incoming: T) {
            existing.merge_from(incoming);
        }
    }
}

/// Declare the schema table and the strategic merge impl for a struct
macro_rules! resource_schema {
    (
        $ty:ty {
            $( $field:ident : $shape:ident $(<$child:ty>)? => $wire:literal ),* $(,)?
        }
    ) => {
        impl $crate::domain::schema::Schema for $ty {
            const FIELDS: &'static [$crate::domain::schema::FieldSpec] = &[
                $(
                    $crate::domain::schema::FieldSpec {
                        name: $wire,
                        shape: $crate::domain::schema::FieldShape::$shape,
                        children: resource_schema!(@children $($child)?),
                    },
                )*
            ];
        }

        impl $crate::domain::schema::StrategicMerge for $ty {
            fn merge_from(&mut self, incoming: Self) {
                $(
                    $crate::domain::schema::strategy::$shape::merge(
                        &mut self.$field,
                        incoming.$field,
                    );
                )*
            }
        }
    };
    (@children) => { &[] };
    (@children $child:ty) => { <$child as $crate::domain::schema::Schema>::FIELDS };
}

pub(crate) use resource_schema;

// SPDX-License-Identifier: Apache-2.0

//! Declared per-screen field registries.
//!
//! A registry maps each field name a screen exposes to its kind and a typed
//! accessor. Filters, sorts and aggregates resolve field names against the
//! registry once, when a query plan is compiled, and afterwards only call
//! accessors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use adops_core::{FieldName, RecordId};

use crate::value::{FieldKind, FieldRead};

/// One row of a list screen.
pub trait Tabular: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &RecordId;
}

/// A record type whose fields are known at compile time.
pub trait HasFields: Tabular {
    const SCREEN: &'static str;

    fn field_registry() -> Result<FieldRegistry<Self>, RegistryError>;
}

pub type Getter<R> = Arc<dyn Fn(&R) -> FieldRead + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError {
    pub field: String,
    pub reason: String,
}

impl RegistryError {
    #[must_use]
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for RegistryError {}

pub struct FieldDescriptor<R> {
    name: FieldName,
    kind: FieldKind,
    searchable: bool,
    getter: Getter<R>,
}

impl<R> FieldDescriptor<R> {
    #[must_use]
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub fn searchable(&self) -> bool {
        self.searchable
    }

    pub fn read(&self, record: &R) -> FieldRead {
        (self.getter)(record)
    }

    #[must_use]
    pub fn getter(&self) -> Getter<R> {
        Arc::clone(&self.getter)
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            searchable: self.searchable,
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("searchable", &self.searchable)
            .finish_non_exhaustive()
    }
}

pub struct FieldRegistry<R> {
    fields: BTreeMap<FieldName, FieldDescriptor<R>>,
    order: Vec<FieldName>,
}

impl<R> FieldRegistry<R> {
    #[must_use]
    pub fn builder() -> RegistryBuilder<R> {
        RegistryBuilder {
            fields: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor<R>> {
        self.order.iter().filter_map(|name| self.fields.get(name))
    }

    #[must_use]
    pub fn searchable_fields(&self) -> Vec<FieldName> {
        self.fields()
            .filter(|d| d.searchable)
            .map(|d| d.name.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<R> Clone for FieldRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            order: self.order.clone(),
        }
    }
}

impl<R> fmt::Debug for FieldRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields()).finish()
    }
}

pub struct RegistryBuilder<R> {
    fields: Vec<FieldDescriptor<R>>,
    error: Option<RegistryError>,
}

impl<R> RegistryBuilder<R> {
    #[must_use]
    pub fn field<F>(mut self, name: &str, kind: FieldKind, getter: F) -> Self
    where
        F: Fn(&R) -> FieldRead + Send + Sync + 'static,
    {
        self.push(name, kind, Arc::new(getter));
        self
    }

    /// Same as [`RegistryBuilder::field`] for accessors that are already shared.
    #[must_use]
    pub fn shared_field(mut self, name: &str, kind: FieldKind, getter: Getter<R>) -> Self {
        self.push(name, kind, getter);
        self
    }

    /// Marks the most recently declared field as searchable.
    #[must_use]
    pub fn searchable(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.searchable = true;
        }
        self
    }

    pub fn build(self) -> Result<FieldRegistry<R>, RegistryError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut fields = BTreeMap::new();
        let mut order = Vec::with_capacity(self.fields.len());
        for descriptor in self.fields {
            let name = descriptor.name.clone();
            if fields.insert(name.clone(), descriptor).is_some() {
                return Err(RegistryError::new(name.as_str(), "declared more than once"));
            }
            order.push(name);
        }
        Ok(FieldRegistry { fields, order })
    }

    fn push(&mut self, name: &str, kind: FieldKind, getter: Getter<R>) {
        if self.error.is_some() {
            return;
        }
        match FieldName::new(name) {
            Ok(name) => self.fields.push(FieldDescriptor {
                name,
                kind,
                searchable: false,
                getter,
            }),
            Err(err) => self.error = Some(RegistryError::new(name, err.to_string())),
        }
    }
}

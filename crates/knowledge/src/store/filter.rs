//! Payload filters.
//!
//! `must` conditions are ANDed, `should` conditions are ORed (an empty `should`
//! list matches everything). The same filter converts to a Qdrant filter and
//! evaluates locally for the in-memory store.

use qdrant_client::qdrant;

use crate::chunk::{Category, Chunk, Priority};

/// Payload keys that carry a keyword index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Category,
    Tags,
    Priority,
    SourceFile,
}

impl PayloadField {
    pub const INDEXED: [PayloadField; 4] = [
        PayloadField::Category,
        PayloadField::Tags,
        PayloadField::Priority,
        PayloadField::SourceFile,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PayloadField::Category => "category",
            PayloadField::Tags => "tags",
            PayloadField::Priority => "priority",
            PayloadField::SourceFile => "source_file",
        }
    }
}

/// Exact keyword match on one payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: PayloadField,
    pub value: String,
}

impl Condition {
    pub fn new(field: PayloadField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Array fields (tags) match when any element equals the value.
    pub fn matches(&self, chunk: &Chunk) -> bool {
        match self.field {
            PayloadField::Category => chunk.category.as_str() == self.value,
            PayloadField::Priority => chunk.priority.as_str() == self.value,
            PayloadField::SourceFile => chunk.source_file == self.value,
            PayloadField::Tags => chunk.tags.iter().any(|t| *t == self.value),
        }
    }

    fn to_qdrant(&self) -> qdrant::Condition {
        qdrant::Condition::matches(self.field.key(), self.value.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub must: Vec<Condition>,
    pub should: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All points whose `source_file` equals `source_file`.
    pub fn by_file(source_file: &str) -> Self {
        Self::new().must(Condition::new(PayloadField::SourceFile, source_file))
    }

    /// Category/priority as `must`, tags as `should`.
    pub fn from_parts(
        category: Option<Category>,
        priority: Option<Priority>,
        tags: &[String],
    ) -> Self {
        let mut filter = Self::new();
        if let Some(category) = category {
            filter = filter.must(Condition::new(PayloadField::Category, category.as_str()));
        }
        if let Some(priority) = priority {
            filter = filter.must(Condition::new(PayloadField::Priority, priority.as_str()));
        }
        for tag in tags.iter().filter(|t| !t.trim().is_empty()) {
            filter = filter.should(Condition::new(PayloadField::Tags, tag.trim()));
        }
        filter
    }

    pub fn must(mut self, condition: Condition) -> Self {
        self.must.push(condition);
        self
    }

    pub fn should(mut self, condition: Condition) -> Self {
        self.should.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        self.must.iter().all(|c| c.matches(chunk))
            && (self.should.is_empty() || self.should.iter().any(|c| c.matches(chunk)))
    }

    /// Qdrant filter, or `None` when there is nothing to filter on.
    pub fn to_qdrant(&self) -> Option<qdrant::Filter> {
        if self.is_empty() {
            return None;
        }

        Some(qdrant::Filter {
            must: self.must.iter().map(Condition::to_qdrant).collect(),
            should: self.should.iter().map(Condition::to_qdrant).collect(),
            ..Default::default()
        })
    }
}

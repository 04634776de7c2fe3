// Component-level usage graph

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

use crate::model::Visibility;
use crate::search::AcceptedReference;

/// Reference counts on one referencing → referenced edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageCount {
    pub api: usize,
    pub internal: usize,
    pub unannotated: usize,
}

impl UsageCount {
    fn record(&mut self, visibility: Visibility) {
        match visibility {
            Visibility::Api => self.api += 1,
            Visibility::Internal => self.internal += 1,
            Visibility::Unannotated => self.unannotated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.api + self.internal + self.unannotated
    }
}

/// One referencing component and its counts against a referenced component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentUse {
    pub component: String,
    #[serde(flatten)]
    pub count: UsageCount,
}

/// Everyone using a referenced component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentUsage {
    pub component: String,
    pub total: UsageCount,
    pub used_by: Vec<ComponentUse>,
}

/// Directed graph of component usage.
///
/// Nodes are component ids; an edge runs from the referencing component to
/// the referenced one and carries the reference counts.
#[derive(Debug, Default)]
pub struct UsageSummary {
    inner: DiGraph<String, UsageCount>,
    node_map: HashMap<String, NodeIndex>,
}

impl UsageSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_references(references: &[AcceptedReference]) -> Self {
        let mut summary = Self::new();
        for reference in references {
            summary.add(reference);
        }
        summary
    }

    pub fn add(&mut self, reference: &AcceptedReference) {
        let from = self.node(&reference.source_component.id);
        let to = self.node(&reference.target_component);

        let edge = match self.inner.find_edge(from, to) {
            Some(edge) => edge,
            None => self.inner.add_edge(from, to, UsageCount::default()),
        };
        if let Some(count) = self.inner.edge_weight_mut(edge) {
            count.record(reference.visibility);
        }
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.inner.add_node(id.to_string());
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    /// Number of distinct referencing → referenced pairs
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn count(&self, from: &str, to: &str) -> Option<UsageCount> {
        let from = *self.node_map.get(from)?;
        let to = *self.node_map.get(to)?;
        let edge = self.inner.find_edge(from, to)?;
        self.inner.edge_weight(edge).copied()
    }

    /// Referenced components with their users, both sorted by id
    pub fn by_referenced(&self) -> Vec<ComponentUsage> {
        let mut usages: Vec<ComponentUsage> = self
            .inner
            .node_indices()
            .filter_map(|idx| {
                let mut used_by: Vec<ComponentUse> = self
                    .inner
                    .edges_directed(idx, petgraph::Direction::Incoming)
                    .map(|edge| ComponentUse {
                        component: self.inner[edge.source()].clone(),
                        count: *edge.weight(),
                    })
                    .collect();
                if used_by.is_empty() {
                    return None;
                }
                used_by.sort_by(|a, b| a.component.cmp(&b.component));

                let total = used_by.iter().fold(UsageCount::default(), |acc, u| UsageCount {
                    api: acc.api + u.count.api,
                    internal: acc.internal + u.count.internal,
                    unannotated: acc.unannotated + u.count.unannotated,
                });

                Some(ComponentUsage {
                    component: self.inner[idx].clone(),
                    total,
                    used_by,
                })
            })
            .collect();

        usages.sort_by(|a, b| a.component.cmp(&b.component));
        usages
    }
}

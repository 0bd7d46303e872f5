#![forbid(unsafe_code)]

use crate::model::EntityKind;

/// Visual emphasis of an edge; carries no probability or count semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeStrength {
    Contextual = 1,
    Often = 2,
    Strong = 3,
}

impl EdgeStrength {
    pub fn weight(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contextual => "contextual",
            Self::Often => "often observed",
            Self::Strong => "strong tendency",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationEdge {
    pub from: String,
    pub to: String,
    pub strength: EdgeStrength,
}

/// Diagram column a node is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlowColumn {
    Charter,
    Brief,
    Scheme,
}

impl FlowColumn {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Philosophy => Self::Charter,
            EntityKind::Conception => Self::Brief,
            EntityKind::Design => Self::Scheme,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Charter => "charter",
            Self::Brief => "brief",
            Self::Scheme => "scheme",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub column: FlowColumn,
    pub tensions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// An edge points at an id no loaded node carries.
    DanglingTarget { from: String, to: String },
}

impl IntegrityWarning {
    pub fn message(&self) -> String {
        match self {
            Self::DanglingTarget { from, to } => {
                format!("edge {from} -> {to} targets an unknown node")
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<RelationEdge>,
    pub warnings: Vec<IntegrityWarning>,
}

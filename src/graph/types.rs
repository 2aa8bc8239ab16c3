use serde::Deserialize;

/// Closed set of node categories in the ecosystem graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    App,
    Agent,
    SpecConstitution,
    SpecPrd,
    SpecPlan,
    SpecTasks,
    SupabaseTable,
    EdgeFunction,
    CronJob,
    Monitor,
    Event,
    Issue,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        Self::App,
        Self::Agent,
        Self::SpecConstitution,
        Self::SpecPrd,
        Self::SpecPlan,
        Self::SpecTasks,
        Self::SupabaseTable,
        Self::EdgeFunction,
        Self::CronJob,
        Self::Monitor,
        Self::Event,
        Self::Issue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::App => "Application",
            Self::Agent => "AI Agent",
            Self::SpecConstitution => "Constitution",
            Self::SpecPrd => "PRD",
            Self::SpecPlan => "Plan",
            Self::SpecTasks => "Tasks",
            Self::SupabaseTable => "Database Table",
            Self::EdgeFunction => "Edge Function",
            Self::CronJob => "Cron Job",
            Self::Monitor => "Monitor",
            Self::Event => "Event",
            Self::Issue => "Issue",
        }
    }

    /// Base display colour as `(r, g, b)`.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::App => (0x3e, 0xcf, 0xcf),
            Self::Agent => (0xcf, 0x6e, 0xcf),
            Self::SpecConstitution | Self::SpecPrd | Self::SpecPlan | Self::SpecTasks => {
                (0xcf, 0xcf, 0x3e)
            }
            Self::SupabaseTable => (0x6e, 0x6e, 0xcf),
            Self::EdgeFunction | Self::CronJob => (0x3e, 0xcf, 0x6e),
            Self::Monitor | Self::Event => (0xcf, 0x8f, 0x3e),
            Self::Issue => (0xcf, 0x4f, 0x4f),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    HasSpec,
    UsesTable,
    Triggers,
    Monitors,
    DependsOn,
    RelatedTo,
    CausedBy,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::HasSpec => "has spec",
            Self::UsesTable => "uses table",
            Self::Triggers => "triggers",
            Self::Monitors => "monitors",
            Self::DependsOn => "depends on",
            Self::RelatedTo => "related to",
            Self::CausedBy => "caused by",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Error,
    #[default]
    Unknown,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Importance used when a node does not carry one.
pub const DEFAULT_IMPORTANCE: f32 = 0.5;

/// A canonical node record. Never carries layout coordinates.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub importance: Option<f32>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<HealthStatus>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            slug: None,
            importance: None,
            created_at: None,
            status: None,
        }
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Importance clamped to `[0, 1]`; absent or non-finite values fall back to 0.5.
    pub fn effective_importance(&self) -> f32 {
        match self.importance {
            Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
            _ => DEFAULT_IMPORTANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default)]
    pub weight: Option<f32>,
}

impl GraphEdge {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind,
            weight: None,
        }
    }
}

/// The upstream dataset: exactly a node list and an edge list.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn count_of_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }
}

use std::collections::{BTreeSet, HashMap, HashSet};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::debug;

use crate::graph::{GraphData, GraphEdge, GraphNode, NodeKind};
use crate::layout::PositionedNode;

use super::story::{self, StoryScene};

/// Every piece of interactive state the viewer shares between the canvas and
/// the panels. Owned by the app and handed to whoever needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerState {
    selected: Option<String>,
    hovered: Option<String>,
    visible_kinds: BTreeSet<NodeKind>,
    focus: Option<String>,
    story_mode: bool,
    story_step: usize,
    search: String,
    zoom: f32,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            selected: None,
            hovered: None,
            visible_kinds: NodeKind::ALL.into_iter().collect(),
            focus: None,
            story_mode: false,
            story_step: 0,
            search: String::new(),
            zoom: 1.0,
        }
    }
}

/// Edges touching the selected node, paired with the node on the other end.
#[derive(Debug, Default)]
pub struct Connections<'a> {
    pub incoming: Vec<(&'a GraphEdge, &'a GraphNode)>,
    pub outgoing: Vec<(&'a GraphEdge, &'a GraphNode)>,
}

/// What a story navigation did, so the caller can react to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoryTransition {
    /// Moved to another scene.
    Moved,
    /// Stayed where it was.
    Unchanged,
    /// Left story mode.
    Exited,
}

impl ExplorerState {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
    }

    /// Click on a node: selects it, or clears the selection if it was already
    /// selected.
    pub fn toggle_selection(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_owned());
        }
    }

    pub fn hover(&mut self, id: Option<String>) {
        self.hovered = id;
    }

    /// Hovered node, else the selected one.
    pub fn active_node(&self) -> Option<&str> {
        self.hovered().or(self.selected())
    }

    pub fn visible_kinds(&self) -> &BTreeSet<NodeKind> {
        &self.visible_kinds
    }

    pub fn is_kind_visible(&self, kind: NodeKind) -> bool {
        self.visible_kinds.contains(&kind)
    }

    pub fn toggle_kind(&mut self, kind: NodeKind) {
        if !self.visible_kinds.remove(&kind) {
            self.visible_kinds.insert(kind);
        }
    }

    /// Replaces the visible set. Returns whether it changed.
    pub fn set_visible_kinds(&mut self, kinds: impl IntoIterator<Item = NodeKind>) -> bool {
        let kinds = kinds.into_iter().collect::<BTreeSet<_>>();
        if kinds == self.visible_kinds {
            return false;
        }
        self.visible_kinds = kinds;
        true
    }

    pub fn all_kinds_visible(&self) -> bool {
        self.visible_kinds.len() == NodeKind::ALL.len()
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn set_focus(&mut self, id: Option<String>) {
        self.focus = id;
    }

    pub fn story_mode(&self) -> bool {
        self.story_mode
    }

    pub fn story_step(&self) -> usize {
        self.story_step
    }

    pub fn current_scene(&self) -> &'static StoryScene {
        story::scene(self.story_step)
    }

    /// Turns story mode on or off; either way the tour restarts at step 0.
    pub fn set_story_mode(&mut self, enabled: bool) {
        self.story_mode = enabled;
        self.story_step = 0;
        debug!(enabled; "story mode toggled");
    }

    /// Advances the tour; stepping past the last scene leaves story mode.
    pub fn next_story_step(&mut self) -> StoryTransition {
        if !self.story_mode {
            return StoryTransition::Unchanged;
        }
        if story::is_last_step(self.story_step) {
            self.set_story_mode(false);
            return StoryTransition::Exited;
        }
        self.story_step += 1;
        debug!(step = self.story_step; "story advanced");
        StoryTransition::Moved
    }

    pub fn prev_story_step(&mut self) -> StoryTransition {
        if !self.story_mode || self.story_step == 0 {
            return StoryTransition::Unchanged;
        }
        self.story_step -= 1;
        debug!(step = self.story_step; "story went back");
        StoryTransition::Moved
    }

    /// Applies the current scene's filter and focus. Returns true when the
    /// scene moved the focus, which warrants a layout reheat.
    pub fn apply_current_scene(&mut self) -> bool {
        if !self.story_mode {
            return false;
        }
        let scene = self.current_scene();
        if let Some(kinds) = scene.visible_kinds {
            self.set_visible_kinds(kinds.iter().copied());
        }
        match scene.focus {
            Some(focus) => {
                self.focus = Some(focus.to_owned());
                true
            }
            None => false,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }

    /// Level-of-detail factor in `[0, 1]`; 1 is closest.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(0.0, 1.0);
        }
    }

    /// Positioned nodes whose kind is visible, ordered by id.
    pub fn visible_nodes<'a>(
        &self,
        positions: &'a HashMap<String, PositionedNode>,
    ) -> Vec<&'a PositionedNode> {
        let mut nodes = positions
            .values()
            .filter(|positioned| self.is_kind_visible(positioned.node.kind))
            .collect::<Vec<_>>();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }

    /// Edges whose endpoints are both positioned and of a visible kind.
    pub fn visible_edges<'a>(
        &self,
        data: &'a GraphData,
        positions: &HashMap<String, PositionedNode>,
    ) -> Vec<&'a GraphEdge> {
        let shown = |id: &str| {
            positions
                .get(id)
                .is_some_and(|positioned| self.is_kind_visible(positioned.node.kind))
        };
        data.edges
            .iter()
            .filter(|edge| shown(&edge.from) && shown(&edge.to))
            .collect()
    }

    /// Ids adjacent to the active node, in either direction.
    pub fn neighbor_ids<'a>(&self, data: &'a GraphData) -> HashSet<&'a str> {
        let Some(active) = self.active_node() else {
            return HashSet::new();
        };
        let mut neighbors = HashSet::new();
        for edge in &data.edges {
            if edge.from == active {
                neighbors.insert(edge.to.as_str());
            }
            if edge.to == active {
                neighbors.insert(edge.from.as_str());
            }
        }
        neighbors
    }

    /// Whether an edge touches the active node or one of its neighbours.
    pub fn is_edge_highlighted(&self, edge: &GraphEdge, neighbors: &HashSet<&str>) -> bool {
        let Some(active) = self.active_node() else {
            return false;
        };
        edge.from == active
            || edge.to == active
            || neighbors.contains(edge.from.as_str())
            || neighbors.contains(edge.to.as_str())
    }

    /// Nodes whose label fuzzily matches the search query, best first.
    pub fn search_matches<'a>(&self, nodes: &'a [GraphNode]) -> Vec<&'a GraphNode> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored = nodes
            .iter()
            .filter_map(|node| {
                matcher
                    .fuzzy_match(&node.label, query)
                    .map(|score| (score, node))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.label.cmp(&b.1.label)));
        scored.into_iter().map(|(_, node)| node).collect()
    }

    pub fn connections<'a>(&self, data: &'a GraphData) -> Connections<'a> {
        let mut connections = Connections::default();
        let Some(selected) = self.selected() else {
            return connections;
        };
        for edge in &data.edges {
            if edge.to == selected
                && let Some(source) = data.node(&edge.from)
            {
                connections.incoming.push((edge, source));
            }
            if edge.from == selected
                && let Some(target) = data.node(&edge.to)
            {
                connections.outgoing.push((edge, target));
            }
        }
        connections
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::graph::{EdgeKind, sample_graph};
    use crate::layout::PositionedNode;

    fn positioned(data: &GraphData) -> HashMap<String, PositionedNode> {
        data.nodes
            .iter()
            .map(|node| {
                (
                    node.id.clone(),
                    PositionedNode::new(Arc::new(node.clone()), Vec3::ZERO, Vec3::ZERO),
                )
            })
            .collect()
    }

    fn small_graph() -> GraphData {
        GraphData {
            nodes: vec![
                GraphNode::new("app", NodeKind::App, "Guardian"),
                GraphNode::new("table", NodeKind::SupabaseTable, "users"),
                GraphNode::new("issue", NodeKind::Issue, "Login failure"),
            ],
            edges: vec![
                GraphEdge::new("e1", "app", "table", EdgeKind::UsesTable),
                GraphEdge::new("e2", "issue", "app", EdgeKind::RelatedTo),
                GraphEdge::new("e3", "app", "ghost", EdgeKind::DependsOn),
            ],
        }
    }

    #[test]
    fn everything_visible_by_default() {
        let state = ExplorerState::default();
        assert!(state.all_kinds_visible());
        assert_eq!(state.zoom(), 1.0);
        assert!(state.active_node().is_none());
    }

    #[test]
    fn clicking_twice_deselects() {
        let mut state = ExplorerState::default();
        state.toggle_selection("app");
        assert_eq!(state.selected(), Some("app"));
        state.toggle_selection("table");
        assert_eq!(state.selected(), Some("table"));
        state.toggle_selection("table");
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn hover_takes_precedence_over_selection() {
        let mut state = ExplorerState::default();
        state.select(Some("app".into()));
        state.hover(Some("issue".into()));
        assert_eq!(state.active_node(), Some("issue"));
        state.hover(None);
        assert_eq!(state.active_node(), Some("app"));
    }

    #[test]
    fn toggling_a_kind_filters_nodes_and_edges() {
        let data = small_graph();
        let positions = positioned(&data);
        let mut state = ExplorerState::default();

        assert_eq!(state.visible_nodes(&positions).len(), 3);
        // The dangling edge never shows up.
        assert_eq!(state.visible_edges(&data, &positions).len(), 2);

        state.toggle_kind(NodeKind::SupabaseTable);
        assert!(!state.is_kind_visible(NodeKind::SupabaseTable));
        let ids = state
            .visible_nodes(&positions)
            .iter()
            .map(|positioned| positioned.id().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["app", "issue"]);
        let edges = state.visible_edges(&data, &positions);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, "e2");

        state.toggle_kind(NodeKind::SupabaseTable);
        assert!(state.all_kinds_visible());
    }

    #[test]
    fn set_visible_kinds_reports_change() {
        let mut state = ExplorerState::default();
        assert!(!state.set_visible_kinds(NodeKind::ALL));
        assert!(state.set_visible_kinds([NodeKind::App]));
        assert!(!state.set_visible_kinds([NodeKind::App]));
        assert_eq!(state.visible_kinds().len(), 1);
    }

    #[test]
    fn neighbours_and_edge_highlighting_follow_the_active_node() {
        let data = small_graph();
        let mut state = ExplorerState::default();
        assert!(state.neighbor_ids(&data).is_empty());

        state.select(Some("table".into()));
        let neighbors = state.neighbor_ids(&data);
        assert_eq!(neighbors, HashSet::from(["app"]));
        // e2 touches `app`, a neighbour of the selection.
        assert!(state.is_edge_highlighted(&data.edges[1], &neighbors));
    }

    #[test]
    fn connections_split_by_direction_and_skip_missing_nodes() {
        let data = small_graph();
        let mut state = ExplorerState::default();
        state.select(Some("app".into()));

        let connections = state.connections(&data);
        assert_eq!(connections.incoming.len(), 1);
        assert_eq!(connections.incoming[0].1.id, "issue");
        assert_eq!(connections.outgoing.len(), 1);
        assert_eq!(connections.outgoing[0].1.id, "table");
    }

    #[test]
    fn search_is_fuzzy_and_case_insensitive() {
        let data = small_graph();
        let mut state = ExplorerState::default();
        assert!(state.search_matches(&data.nodes).is_empty());

        state.set_search("GRD");
        let matches = state.search_matches(&data.nodes);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "app");

        state.set_search("   ");
        assert!(state.search_matches(&data.nodes).is_empty());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut state = ExplorerState::default();
        state.set_zoom(3.0);
        assert_eq!(state.zoom(), 1.0);
        state.set_zoom(-1.0);
        assert_eq!(state.zoom(), 0.0);
        state.set_zoom(f32::NAN);
        assert_eq!(state.zoom(), 0.0);
    }

    #[test]
    fn story_walks_scenes_and_exits_after_the_last() {
        let mut state = ExplorerState::default();
        assert_eq!(state.next_story_step(), StoryTransition::Unchanged);

        state.set_story_mode(true);
        assert_eq!(state.prev_story_step(), StoryTransition::Unchanged);
        assert!(!state.apply_current_scene());
        assert!(state.all_kinds_visible());

        assert_eq!(state.next_story_step(), StoryTransition::Moved);
        assert!(state.apply_current_scene());
        assert_eq!(state.focus(), Some("app-guardian"));
        assert_eq!(
            state.visible_kinds().iter().copied().collect::<Vec<_>>(),
            [NodeKind::App, NodeKind::Agent]
        );

        for _ in 0..3 {
            assert_eq!(state.next_story_step(), StoryTransition::Moved);
        }
        assert_eq!(state.story_step(), 4);
        assert_eq!(state.next_story_step(), StoryTransition::Exited);
        assert!(!state.story_mode());
        assert_eq!(state.story_step(), 0);
    }

    #[test]
    fn reentering_story_mode_restarts_the_tour() {
        let mut state = ExplorerState::default();
        state.set_story_mode(true);
        state.next_story_step();
        state.next_story_step();
        state.set_story_mode(true);
        assert_eq!(state.story_step(), 0);
    }

    #[test]
    fn story_focus_nodes_resolve_against_the_sample() {
        let data = sample_graph();
        let positions = positioned(&data);
        let mut state = ExplorerState::default();
        state.set_story_mode(true);
        while state.next_story_step() == StoryTransition::Moved {
            state.apply_current_scene();
            let focus = state.focus().expect("every later scene focuses");
            let visible = state.visible_nodes(&positions);
            assert!(visible.iter().any(|positioned| positioned.id() == focus));
        }
    }
}

use crate::graph::NodeKind;

/// One step of the guided tour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoryScene {
    pub title: &'static str,
    pub description: &'static str,
    /// Kinds made visible when the scene opens; `None` leaves the filter alone.
    pub visible_kinds: Option<&'static [NodeKind]>,
    /// Node the camera travels to when the scene opens.
    pub focus: Option<&'static str>,
}

pub const STORY_SCENES: [StoryScene; 5] = [
    StoryScene {
        title: "Welcome to Your Ecosystem",
        description: "This is your complete development ecosystem visualized as an interactive 3D knowledge graph.",
        visible_kinds: None,
        focus: None,
    },
    StoryScene {
        title: "Applications & Agents",
        description: "Your core applications and AI agents form the backbone of your system.",
        visible_kinds: Some(&[NodeKind::App, NodeKind::Agent]),
        focus: Some("app-guardian"),
    },
    StoryScene {
        title: "Spec Kit Overview",
        description: "Each project has a 4-file Spec Kit: Constitution, PRD, Plan, and Tasks.",
        visible_kinds: Some(&[
            NodeKind::App,
            NodeKind::SpecConstitution,
            NodeKind::SpecPrd,
            NodeKind::SpecPlan,
            NodeKind::SpecTasks,
        ]),
        focus: Some("spec-guardian-constitution"),
    },
    StoryScene {
        title: "Infrastructure Layer",
        description: "Database tables, edge functions, and cron jobs power your backend.",
        visible_kinds: Some(&[
            NodeKind::SupabaseTable,
            NodeKind::EdgeFunction,
            NodeKind::CronJob,
        ]),
        focus: Some("table-users"),
    },
    StoryScene {
        title: "Observability & Health",
        description: "Monitors track your system health, while issues and events show recent activity.",
        visible_kinds: Some(&[NodeKind::Monitor, NodeKind::Event, NodeKind::Issue]),
        focus: Some("monitor-uptime"),
    },
];

/// Scene for a step index, falling back to the first scene when out of range.
pub fn scene(step: usize) -> &'static StoryScene {
    STORY_SCENES.get(step).unwrap_or(&STORY_SCENES[0])
}

pub fn is_last_step(step: usize) -> bool {
    step + 1 >= STORY_SCENES.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::sample_graph;

    #[test]
    fn every_focus_node_exists_in_the_sample() {
        let data = sample_graph();
        for scene in &STORY_SCENES {
            if let Some(focus) = scene.focus {
                let node = data.node(focus).expect("focus node present");
                if let Some(kinds) = scene.visible_kinds {
                    assert!(kinds.contains(&node.kind), "{focus} hidden by its own scene");
                }
            }
        }
    }

    #[test]
    fn out_of_range_step_falls_back_to_welcome() {
        assert_eq!(scene(99).title, STORY_SCENES[0].title);
        assert!(is_last_step(4));
        assert!(!is_last_step(3));
    }
}

//! Wiring graph export for visualization and debugging.
//!
//! Turns a built container into a graph of beans (nodes) and filled slots
//! (edges), plus the slots no bean matched. DOT and Mermaid output is always
//! available; JSON and YAML need the `graph-export` feature.

use std::collections::HashMap;

#[cfg(feature = "graph-export")]
use serde::{Deserialize, Serialize};

use crate::container::BeanContainer;
use crate::error::{BeanResult, ContainerError};
use crate::instantiate::BeanId;
use crate::key::short_type_name;

const GRAPH_VERSION: &str = "1.0";

/// A bean in the wiring graph.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphNode {
    /// Unique identifier, `bean_<index>`
    pub id: String,
    /// Bean name (qualifier)
    pub name: String,
    /// Full concrete type name
    pub type_name: String,
    /// Short names of every type the bean can be injected as
    pub provides: Vec<String>,
    /// Declared slot names
    pub slots: Vec<String>,
}

/// A filled slot: `from.slot` holds `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub slot: String,
    /// Short name of the type the slot requires
    pub required: String,
}

/// A slot that no bean satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct UnresolvedEdge {
    pub from: String,
    pub slot: String,
    pub required: String,
    pub qualifier: Option<String>,
}

/// Graph-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphMetadata {
    pub bean_count: usize,
    pub wired_count: usize,
    pub unresolved_count: usize,
    pub failed_components: Vec<String>,
    /// Whether the filled slots form at least one reference cycle
    pub has_cycles: bool,
    /// Export timestamp
    pub exported_at: String,
    /// Export format version
    pub version: String,
}

/// The wiring of a built container.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, Dependency, Inject, WiringGraph};
///
/// #[derive(Default)]
/// struct Clock;
/// impl Component for Clock {}
///
/// #[derive(Default)]
/// struct Scheduler {
///     clock: Inject<Clock>,
/// }
///
/// impl Component for Scheduler {
///     fn dependencies(&self) -> Vec<Dependency<'_>> {
///         vec![Dependency::new("clock", &self.clock)]
///     }
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry
///     .register(ComponentType::of::<Scheduler>())
///     .register(ComponentType::of::<Clock>());
/// let container = BeanContainer::build(registry).unwrap();
///
/// let graph = WiringGraph::from_container(&container);
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.edges[0].slot, "clock");
///
/// let dot = graph.to_dot();
/// assert!(dot.contains("\"bean_0\" -> \"bean_1\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct WiringGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub unresolved: Vec<UnresolvedEdge>,
    pub metadata: GraphMetadata,
}

/// Export formats supported for wiring graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// DOT format for Graphviz
    Dot,
    /// Mermaid format for documentation
    Mermaid,
    /// JSON (`graph-export` feature)
    Json,
    /// YAML (`graph-export` feature)
    Yaml,
}

fn node_id(id: BeanId) -> String {
    format!("bean_{}", id.index())
}

impl WiringGraph {
    /// Builds the graph from the container's beans and its build report.
    pub fn from_container(container: &BeanContainer) -> Self {
        let nodes: Vec<GraphNode> = container
            .beans()
            .map(|bean| GraphNode {
                id: node_id(bean.id()),
                name: bean.name().to_string(),
                type_name: bean.key().display_name().to_string(),
                provides: bean.provided_keys().map(|k| k.short_name().to_string()).collect(),
                slots: bean.dependencies().iter().map(|d| d.name().to_string()).collect(),
            })
            .collect();

        let report = container.report();
        let edges: Vec<GraphEdge> = report
            .wiring
            .wired
            .iter()
            .map(|wired| GraphEdge {
                from: node_id(wired.bean),
                to: node_id(wired.target),
                slot: wired.slot.to_string(),
                required: wired.required.short_name().to_string(),
            })
            .collect();

        let unresolved: Vec<UnresolvedEdge> = report
            .wiring
            .unresolved
            .iter()
            .map(|slot| UnresolvedEdge {
                from: node_id(slot.bean),
                slot: slot.slot.to_string(),
                required: slot.required.short_name().to_string(),
                qualifier: slot.qualifier.map(str::to_string),
            })
            .collect();

        let metadata = GraphMetadata {
            bean_count: nodes.len(),
            wired_count: edges.len(),
            unresolved_count: unresolved.len(),
            failed_components: report
                .instantiation_failures
                .iter()
                .map(|f| f.component.to_string())
                .collect(),
            has_cycles: has_cycles(&edges),
            exported_at: timestamp(),
            version: GRAPH_VERSION.to_string(),
        };

        Self {
            nodes,
            edges,
            unresolved,
            metadata,
        }
    }

    /// Renders the graph in `format`.
    pub fn export(&self, format: ExportFormat) -> BeanResult<String> {
        match format {
            ExportFormat::Dot => Ok(self.to_dot()),
            ExportFormat::Mermaid => Ok(self.to_mermaid()),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Yaml => self.to_yaml(),
        }
    }

    /// DOT format for Graphviz.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph WiringGraph {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box, style=filled, fillcolor=lightblue];\n\n");

        for node in &self.nodes {
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\"];\n",
                node.id,
                dot_escape(&node.name),
                dot_escape(short_type_name(&node.type_name))
            ));
        }
        for (i, missing) in self.unresolved.iter().enumerate() {
            output.push_str(&format!(
                "  \"missing_{}\" [label=\"{}\", shape=ellipse, fillcolor=white, style=dashed];\n",
                i,
                dot_escape(&missing.required)
            ));
        }

        output.push('\n');

        for edge in &self.edges {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.from,
                edge.to,
                dot_escape(&edge.slot)
            ));
        }
        for (i, missing) in self.unresolved.iter().enumerate() {
            output.push_str(&format!(
                "  \"{}\" -> \"missing_{}\" [label=\"{}\", style=dashed];\n",
                missing.from,
                i,
                dot_escape(&missing.slot)
            ));
        }

        output.push_str("}\n");
        output
    }

    /// Mermaid flowchart.
    pub fn to_mermaid(&self) -> String {
        let mut output = String::new();
        output.push_str("graph TD\n");

        for node in &self.nodes {
            output.push_str(&format!("  {}[\"{}\"]\n", node.id, mermaid_escape(&node.name)));
        }
        for (i, missing) in self.unresolved.iter().enumerate() {
            output.push_str(&format!(
                "  missing_{}([\"{}\"])\n",
                i,
                mermaid_escape(&missing.required)
            ));
        }

        for edge in &self.edges {
            output.push_str(&format!(
                "  {} -->|{}| {}\n",
                edge.from,
                mermaid_escape(&edge.slot),
                edge.to
            ));
        }
        for (i, missing) in self.unresolved.iter().enumerate() {
            output.push_str(&format!(
                "  {} -.->|{}| missing_{}\n",
                missing.from,
                mermaid_escape(&missing.slot),
                i
            ));
        }

        if !self.unresolved.is_empty() {
            output.push_str("\n  classDef missing stroke-dasharray: 5 5\n");
            for i in 0..self.unresolved.len() {
                output.push_str(&format!("  class missing_{} missing\n", i));
            }
        }

        output
    }

    pub fn to_json(&self) -> BeanResult<String> {
        #[cfg(feature = "graph-export")]
        {
            serde_json::to_string_pretty(self)
                .map_err(|e| ContainerError::Export(format!("JSON serialization failed: {}", e)))
        }
        #[cfg(not(feature = "graph-export"))]
        {
            Err(ContainerError::Export(
                "JSON export requires the graph-export feature".to_string(),
            ))
        }
    }

    pub fn to_yaml(&self) -> BeanResult<String> {
        #[cfg(feature = "graph-export")]
        {
            serde_yaml::to_string(self)
                .map_err(|e| ContainerError::Export(format!("YAML serialization failed: {}", e)))
        }
        #[cfg(not(feature = "graph-export"))]
        {
            Err(ContainerError::Export(
                "YAML export requires the graph-export feature".to_string(),
            ))
        }
    }
}

/// Escapes a DOT double-quoted string.
fn dot_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes text placed inside a Mermaid quoted label or edge label.
fn mermaid_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("#quot;"),
            '|' => escaped.push_str("#124;"),
            '\n' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn timestamp() -> String {
    #[cfg(feature = "graph-export")]
    {
        chrono::Utc::now().to_rfc3339()
    }
    #[cfg(not(feature = "graph-export"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }
}

fn has_cycles(edges: &[GraphEdge]) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    // 1 = on the current path, 2 = finished
    let mut state: HashMap<&str, u8> = HashMap::new();
    let mut starts: Vec<&str> = adjacency.keys().copied().collect();
    starts.sort_unstable();

    for start in starts {
        if state.contains_key(start) {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        state.insert(start, 1);
        while let Some((node, next)) = stack.pop() {
            let targets = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
            if next < targets.len() {
                stack.push((node, next + 1));
                let target = targets[next];
                match state.get(target).copied() {
                    Some(1) => return true,
                    Some(_) => {}
                    None => {
                        state.insert(target, 1);
                        stack.push((target, 0));
                    }
                }
            } else {
                state.insert(node, 2);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str) -> GraphEdge {
        GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
            slot: "next".to_string(),
            required: "Node".to_string(),
        }
    }

    fn graph(edges: Vec<GraphEdge>, unresolved: Vec<UnresolvedEdge>) -> WiringGraph {
        let node = |id: &str| GraphNode {
            id: id.to_string(),
            name: id.to_uppercase(),
            type_name: "app::graph::Node".to_string(),
            provides: vec!["Node".to_string()],
            slots: vec!["next".to_string()],
        };
        WiringGraph {
            nodes: vec![node("bean_0"), node("bean_1")],
            metadata: GraphMetadata {
                bean_count: 2,
                wired_count: edges.len(),
                unresolved_count: unresolved.len(),
                failed_components: Vec::new(),
                has_cycles: has_cycles(&edges),
                exported_at: "2024-01-01T00:00:00Z".to_string(),
                version: GRAPH_VERSION.to_string(),
            },
            edges,
            unresolved,
        }
    }

    #[test]
    fn detects_cycles_only_when_present() {
        assert!(!has_cycles(&[edge("a", "b"), edge("b", "c"), edge("a", "c")]));
        assert!(has_cycles(&[edge("a", "b"), edge("b", "c"), edge("c", "a")]));
        assert!(!has_cycles(&[]));
    }

    #[test]
    fn dot_marks_unresolved_slots_dashed() {
        let missing = UnresolvedEdge {
            from: "bean_1".to_string(),
            slot: "clock".to_string(),
            required: "Clock".to_string(),
            qualifier: None,
        };
        let dot = graph(vec![edge("bean_0", "bean_1")], vec![missing]).to_dot();

        assert!(dot.starts_with("digraph WiringGraph {"));
        assert!(dot.contains("\"bean_0\" [label=\"BEAN_0\\nNode\"];"));
        assert!(dot.contains("\"bean_0\" -> \"bean_1\" [label=\"next\"];"));
        assert!(dot.contains("\"bean_1\" -> \"missing_0\" [label=\"clock\", style=dashed];"));
    }

    #[test]
    fn mermaid_labels_edges_with_slot_names() {
        let mermaid = graph(vec![edge("bean_0", "bean_1"), edge("bean_1", "bean_0")], vec![]).to_mermaid();
        assert!(mermaid.contains("bean_0 -->|next| bean_1"));
        assert!(mermaid.contains("bean_1 -->|next| bean_0"));
        assert!(!mermaid.contains("classDef"));
    }

    #[test]
    fn labels_with_quotes_are_escaped() {
        let mut quoted = graph(vec![edge("bean_0", "bean_1")], vec![]);
        quoted.nodes[0].name = "say \"hi\" \\o/".to_string();

        let dot = quoted.to_dot();
        assert!(dot.contains("\"bean_0\" [label=\"say \\\"hi\\\" \\\\o/\\nNode\"];"));

        let mermaid = quoted.to_mermaid();
        assert!(mermaid.contains("bean_0[\"say #quot;hi#quot; \\o/\"]"));
    }

    #[cfg(feature = "graph-export")]
    #[test]
    fn json_and_yaml_round_trip() {
        let original = graph(vec![edge("bean_0", "bean_1")], vec![]);
        let json = original.export(ExportFormat::Json).unwrap();
        let parsed: WiringGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);

        let yaml = original.export(ExportFormat::Yaml).unwrap();
        assert!(yaml.contains("bean_count: 2"));
    }

    #[cfg(not(feature = "graph-export"))]
    #[test]
    fn json_requires_feature() {
        let result = graph(vec![], vec![]).export(ExportFormat::Json);
        assert!(matches!(result, Err(ContainerError::Export(_))));
    }
}

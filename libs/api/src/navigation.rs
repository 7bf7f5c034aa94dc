//! Site navigation trees and node paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::{ApiError, PageId, SiteId};

/// Slash-separated path of node names from the navigation root.
///
/// The root path is `/`; empty segments are ignored when parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path of a child node.
    pub fn append(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().any(char::is_control) {
            return Err(ApiError::InvalidArgument(format!(
                "node path '{}' contains control characters",
                s.escape_default()
            )));
        }
        Ok(Self::new(s.split('/').filter(|segment| !segment.is_empty())))
    }
}

impl Serialize for NodePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Whether a node shows up in rendered navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Displayed,
    Hidden,
    /// Reserved for portal-managed nodes.
    System,
}

/// One entry of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    name: String,
    pub label: Option<String>,
    pub page_id: Option<PageId>,
    pub visibility: Visibility,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            page_id: None,
            visibility: Visibility::Displayed,
            children: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_page(mut self, page_id: PageId) -> Self {
        self.page_id = Some(page_id);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Adds a child, replacing any existing child with the same name.
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&mut self, child: Node) {
        match self.children.iter_mut().find(|c| c.name == child.name) {
            Some(existing) => *existing = child,
            None => self.children.push(child),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label, falling back to the node name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn page_id(&self) -> Option<&PageId> {
        self.page_id.as_ref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Copy of this node keeping `depth` levels of descendants that pass
    /// `filter`.
    fn pruned(&self, depth: usize, filter: &dyn Fn(&Node) -> bool) -> Node {
        let children = if depth == 0 {
            Vec::new()
        } else {
            self.children
                .iter()
                .filter(|child| filter(*child))
                .map(|child| child.pruned(depth - 1, filter))
                .collect()
        };
        Node {
            name: self.name.clone(),
            label: self.label.clone(),
            page_id: self.page_id.clone(),
            visibility: self.visibility,
            children,
        }
    }
}

/// The navigation tree of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    site_id: SiteId,
    pub priority: i32,
    nodes: Vec<Node>,
}

impl Navigation {
    pub fn new(site_id: SiteId, priority: i32) -> Self {
        Self {
            site_id,
            priority,
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        match self.nodes.iter_mut().find(|n| n.name == node.name) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
        self
    }

    pub fn site_id(&self) -> &SiteId {
        &self.site_id
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Resolves a path to a node. The root path resolves to nothing.
    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.nodes.iter().find(|n| &n.name == first)?;
        for name in rest {
            node = node.child(name)?;
        }
        Some(node)
    }

    /// Copy of this navigation with `depth` levels of nodes (1 = top level
    /// only), dropping nodes rejected by `filter` together with their subtrees.
    pub fn visit(&self, depth: usize, filter: &dyn Fn(&Node) -> bool) -> Navigation {
        let nodes = if depth == 0 {
            Vec::new()
        } else {
            self.nodes
                .iter()
                .filter(|node| filter(*node))
                .map(|node| node.pruned(depth - 1, filter))
                .collect()
        };
        Navigation {
            site_id: self.site_id.clone(),
            priority: self.priority,
            nodes,
        }
    }
}

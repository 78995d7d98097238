//! Graph operations for AuthoredScene (add, parent, validate)

use crate::error::SceneError;

use super::{AuthoredScene, NodeId, SceneNode};

impl AuthoredScene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a top-level node
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId, SceneError> {
        if self.node(parent).is_none() {
            return Err(SceneError::NodeNotFound(parent.0));
        }

        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Move a top-level node under `parent`
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        let child_node = self.node(child).ok_or(SceneError::NodeNotFound(child.0))?;
        let parent_node = self.node(parent).ok_or(SceneError::NodeNotFound(parent.0))?;

        if child_node.parent.is_some() {
            return Err(SceneError::AlreadyHasParent(child_node.name.clone()));
        }

        if self.would_create_cycle(parent, child) {
            return Err(SceneError::WouldCreateCycle {
                parent: parent_node.name.clone(),
                child: child_node.name.clone(),
            });
        }

        self.roots.retain(|r| *r != child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Fill in parent links from the children lists.
    ///
    /// Snapshots written by hand usually only list children. A node listed
    /// under two different parents is rejected.
    pub fn link_parents(&mut self) -> Result<(), SceneError> {
        for index in 0..self.nodes.len() {
            let parent = NodeId(index);
            for child in self.nodes[index].children.clone() {
                let node = self
                    .nodes
                    .get_mut(child.0)
                    .ok_or(SceneError::NodeNotFound(child.0))?;
                match node.parent {
                    None => node.parent = Some(parent),
                    Some(p) if p == parent => {}
                    Some(_) => return Err(SceneError::AlreadyHasParent(node.name.clone())),
                }
            }
        }
        Ok(())
    }

    /// Top-level nodes in authored order
    pub fn root_nodes(&self) -> Vec<NodeId> {
        if !self.roots.is_empty() {
            return self.roots.clone();
        }
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| self.nodes[id.0].parent.is_none())
            .collect()
    }

    /// Check that every reference is in range, parent and child links agree,
    /// and the hierarchy is acyclic
    pub fn validate(&self) -> Result<(), SceneError> {
        let in_range = |id: NodeId| id.0 < self.nodes.len();

        for root in &self.roots {
            if !in_range(*root) {
                return Err(SceneError::NodeNotFound(root.0));
            }
            if self.nodes[root.0].parent.is_some() {
                return Err(SceneError::InvalidHierarchy(format!(
                    "root '{}' has a parent",
                    self.nodes[root.0].name
                )));
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);

            if let Some(parent) = node.parent {
                if !in_range(parent) {
                    return Err(SceneError::NodeNotFound(parent.0));
                }
                if !self.nodes[parent.0].children.contains(&id) {
                    return Err(SceneError::InvalidHierarchy(format!(
                        "'{}' is not listed as a child of its parent '{}'",
                        node.name, self.nodes[parent.0].name
                    )));
                }
            }

            for child in &node.children {
                if !in_range(*child) {
                    return Err(SceneError::NodeNotFound(child.0));
                }
                if self.nodes[child.0].parent != Some(id) {
                    return Err(SceneError::InvalidHierarchy(format!(
                        "'{}' lists '{}' as a child but is not its parent",
                        node.name, self.nodes[child.0].name
                    )));
                }
            }

            // Walking more steps than there are nodes means a loop
            let mut current = node.parent;
            let mut steps = 0;
            while let Some(p) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(SceneError::InvalidHierarchy(format!(
                        "cycle through '{}'",
                        node.name
                    )));
                }
                current = self.nodes[p.0].parent;
            }
        }

        Ok(())
    }

    /// Check if parenting child under parent would create a cycle
    pub(crate) fn would_create_cycle(&self, parent: NodeId, child: NodeId) -> bool {
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }
}

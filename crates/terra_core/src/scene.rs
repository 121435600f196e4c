//! Scene nodes
//!
//! An entity owns its node outright. Children are reference-counted so a
//! cached template (a model or a light) can hang under many entity nodes
//! without ever being copied. Drawing them is the renderer's business.

use glam::{Quat, Vec3};
use indexmap::IndexMap;
use std::sync::Arc;

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Local +Z rotated into world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What a node stands for when handed to the renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeKind {
    #[default]
    Group,
    /// A model the asset layer loads from `source`.
    Model { source: String },
    PointLight { radius: f32, intensity: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub transform: Transform,
    children: IndexMap<String, Arc<SceneNode>>,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            transform: Transform::IDENTITY,
            children: IndexMap::new(),
        }
    }

    pub fn group(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::new(NodeKind::Group)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn child(&self, name: &str) -> Option<&Arc<SceneNode>> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Arc<SceneNode>)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Arc<SceneNode>> {
        self.children.shift_remove(name)
    }
}

/// Graft `child` under `parent` as `name`, returning the node it replaced.
pub fn set_node(
    name: impl Into<String>,
    parent: &mut SceneNode,
    child: Arc<SceneNode>,
) -> Option<Arc<SceneNode>> {
    parent.children.insert(name.into(), child)
}

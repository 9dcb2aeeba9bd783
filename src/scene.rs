use std::sync::Arc;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::material::Material;

/// Local transform of an entity relative to its parent.
///
/// Rotation is an XYZ Euler triple in radians, applied as `Rx * Ry * Rz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
        }
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z);
        Mat4::from_translation(self.position) * rotation * Mat4::from_scale(self.scale)
    }
}

/// Shape and surface drawn for an entity.
#[derive(Debug, Clone)]
pub struct Visual {
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
}

/// Stable index of an entity inside its [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node of the scene graph.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub visual: Option<Visual>,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

impl Entity {
    /// Creates an empty grouping node.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            visual: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(
        name: impl Into<String>,
        geometry: &Arc<Geometry>,
        material: &Arc<Material>,
    ) -> Self {
        Self {
            visual: Some(Visual {
                geometry: Arc::clone(geometry),
                material: Arc::clone(material),
            }),
            ..Self::group(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }
}

/// One mesh to draw this frame with its resolved world matrix.
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub entity: EntityId,
    pub world: Mat4,
    pub visual: &'a Visual,
}

/// Arena of entities forming a forest of strict trees.
///
/// Entities are only ever inserted as a new root or as a fresh child of an
/// existing node, so no entity can have two parents and no cycle can form.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Entity>,
    roots: Vec<EntityId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn add_root(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.nodes.len());
        entity.parent = None;
        entity.children.clear();
        self.nodes.push(entity);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: EntityId, mut entity: Entity) -> EntityId {
        let id = EntityId(self.nodes.len());
        entity.parent = Some(parent);
        entity.children.clear();
        self.nodes.push(entity);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.nodes[id.0]
    }

    pub fn transform(&self, id: EntityId) -> &Transform {
        &self.nodes[id.0].transform
    }

    pub fn transform_mut(&mut self, id: EntityId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, entity)| (EntityId(index), entity))
    }

    /// Copies one entity (and its subtree) under the same parent as `source`.
    pub fn duplicate(&mut self, source: EntityId) -> EntityId {
        let parent = self.nodes[source.0].parent;
        self.copy_subtree(source, parent)
    }

    fn copy_subtree(&mut self, source: EntityId, parent: Option<EntityId>) -> EntityId {
        let copy = self.nodes[source.0].clone();
        let children = copy.children.clone();
        let id = match parent {
            Some(parent) => self.add_child(parent, copy),
            None => self.add_root(copy),
        };
        for child in children {
            self.copy_subtree(child, Some(id));
        }
        id
    }

    /// Product of every ancestor's local matrix with this entity's own.
    pub fn world_matrix(&self, id: EntityId) -> Mat4 {
        let mut matrix = self.nodes[id.0].transform.matrix();
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            matrix = self.nodes[parent.0].transform.matrix() * matrix;
            cursor = self.nodes[parent.0].parent;
        }
        matrix
    }

    /// An entity is drawn only when it and all of its ancestors are visible.
    pub fn is_effectively_visible(&self, id: EntityId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !self.nodes[current.0].visible {
                return false;
            }
            cursor = self.nodes[current.0].parent;
        }
        true
    }

    /// Walks every root depth-first and collects the meshes to draw.
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        let mut items = Vec::new();
        for &root in &self.roots {
            self.collect(root, Mat4::IDENTITY, &mut items);
        }
        items
    }

    fn collect<'a>(&'a self, id: EntityId, parent_world: Mat4, items: &mut Vec<DrawItem<'a>>) {
        let entity = &self.nodes[id.0];
        if !entity.visible {
            return;
        }
        let world = parent_world * entity.transform.matrix();
        if let Some(visual) = entity.visual.as_ref() {
            items.push(DrawItem {
                entity: id,
                world,
                visual,
            });
        }
        for &child in &entity.children {
            self.collect(child, world, items);
        }
    }
}

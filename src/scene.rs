//! Scene graph stored as arenas indexed by typed ids.
//!
//! Geometries, materials and textures live beside the nodes so that meshes can
//! share them by id; the renderer keys its GPU caches on the same ids.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::geometry::{self, Geometry};
use crate::material::{BasicMaterial, Material};
use crate::math::Color;
use crate::texture::TextureData;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(NodeId);
arena_id!(GeometryId);
arena_id!(MaterialId);
arena_id!(TextureId);

/// Local transform; rotation is Euler angles in radians applied in XYZ order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }

    pub fn set_scalar(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    PointLight(PointLight),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            kind,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: &str) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: &str, geometry: GeometryId, material: MaterialId) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn point_light(name: &str, color: Color, intensity: f32) -> Self {
        Self::new(name, NodeKind::PointLight(PointLight { color, intensity }))
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A visible mesh ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub world: Mat4,
}

/// A visible point light in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightItem {
    pub position: Vec3,
    pub light: PointLight,
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    textures: Vec<TextureData>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        self.materials.push(material.into());
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn add_texture(&mut self, texture: TextureData) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> &TextureData {
        &self.textures[id.0]
    }

    /// Add a node at the top level of the scene
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Rotate a node so that its local +Z axis points at `target` (world space)
    pub fn look_at(&mut self, id: NodeId, target: Vec3) {
        let position = self.world_matrix(id).transform_point3(Vec3::ZERO);

        let mut forward = target - position;
        if forward.length_squared() == 0.0 {
            forward = Vec3::Z;
        }
        forward = forward.normalize();

        let mut right = Vec3::Y.cross(forward);
        if right.length_squared() == 0.0 {
            // Looking straight up or down; nudge off the pole
            forward = (forward + Vec3::new(0.0, 0.0, 0.0001)).normalize();
            right = Vec3::Y.cross(forward);
        }
        let right = right.normalize();
        let up = forward.cross(right);

        let mut rotation = Quat::from_mat3(&Mat3::from_cols(right, up, forward));
        if let Some(parent) = self.nodes[id.0].parent {
            let (_, parent_rotation, _) = self.world_matrix(parent).to_scale_rotation_translation();
            rotation = parent_rotation.inverse() * rotation;
        }

        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        self.nodes[id.0].transform.rotation = Vec3::new(x, y, z);
    }

    /// Attach a small wireframe sphere marking a point light's position
    pub fn add_point_light_helper(&mut self, light: NodeId, size: f32) -> NodeId {
        let color = match &self.nodes[light.0].kind {
            NodeKind::PointLight(light) => light.color,
            _ => Color::WHITE,
        };
        let geometry = self.add_geometry(geometry::sphere(size, 4, 2));
        let material = self.add_material(BasicMaterial {
            color,
            wireframe: true,
            ..Default::default()
        });
        self.add_child(light, Node::mesh("point light helper", geometry, material))
    }

    /// Visible meshes in depth-first order with their world matrices
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.walk(|id, node, world| {
            if let NodeKind::Mesh { geometry, material } = node.kind {
                items.push(DrawItem {
                    node: id,
                    geometry,
                    material,
                    world,
                });
            }
        });
        items
    }

    pub fn point_lights(&self) -> Vec<LightItem> {
        let mut lights = Vec::new();
        self.walk(|_, node, world| {
            if let NodeKind::PointLight(light) = node.kind {
                lights.push(LightItem {
                    position: world.transform_point3(Vec3::ZERO),
                    light,
                });
            }
        });
        lights
    }

    /// Visit visible nodes; a hidden node hides its whole subtree
    fn walk(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();

        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            visit(id, node, world);
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_set_scalar() {
        let mut t = Transform::default();
        t.set_scalar(0.25);
        assert_eq!(t.scale, Vec3::splat(0.25));
    }

    #[test]
    fn test_node_ids_are_sequential() {
        let mut scene = Scene::new();
        let a = scene.add(Node::group("a"));
        let b = scene.add_child(a, Node::group("b"));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(scene.node(b).parent(), Some(a));
        assert_eq!(scene.node(a).children(), &[b]);
        assert_eq!(scene.roots(), &[a]);
    }
}

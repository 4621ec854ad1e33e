use std::collections::BTreeSet;

use glam::{Mat4, Vec3};

use crate::error::MeshError;
use crate::groups::{VertexGroup, VertexGroups};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self {
            min: min.to_array(),
            max: max.to_array(),
        })
    }

    pub fn distance_squared(&self, p: Vec3) -> f32 {
        let clamped = p.clamp(Vec3::from(self.min), Vec3::from(self.max));
        (p - clamped).length_squared()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bone {
    pub name: String,
    pub deform: bool,
}

impl Bone {
    pub fn new(name: impl Into<String>, deform: bool) -> Self {
        Self {
            name: name.into(),
            deform,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<Bone>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceMesh {
    positions: Vec<[f32; 3]>,
    triangles: Vec<[u32; 3]>,
    groups: VertexGroups,
    armatures: Vec<Armature>,
    world_matrix: Option<Mat4>,
}

impl SourceMesh {
    pub fn new(positions: Vec<[f32; 3]>, triangles: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        validate_positions(&positions)?;
        for (tri_index, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if index as usize >= positions.len() {
                    return Err(MeshError::TriangleIndexOutOfRange {
                        triangle: tri_index,
                        index,
                        vertex_count: positions.len(),
                    });
                }
            }
        }
        Ok(Self {
            positions,
            triangles,
            ..Self::default()
        })
    }

    pub fn with_positions_indices(
        positions: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Result<Self, MeshError> {
        if !indices.len().is_multiple_of(3) {
            return Err(MeshError::IndexCountNotTriangles(indices.len()));
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        Self::new(positions, triangles)
    }

    pub fn with_world_matrix(mut self, matrix: Mat4) -> Self {
        self.world_matrix = Some(matrix);
        self
    }

    pub fn with_group(mut self, group: VertexGroup) -> Result<Self, MeshError> {
        self.add_group(group)?;
        Ok(self)
    }

    pub fn with_armature(mut self, armature: Armature) -> Self {
        self.armatures.push(armature);
        self
    }

    pub fn add_group(&mut self, group: VertexGroup) -> Result<(), MeshError> {
        for (vertex, weight) in group.iter() {
            if vertex >= self.positions.len() {
                return Err(MeshError::WeightVertexOutOfRange {
                    channel: group.name().to_string(),
                    vertex,
                    vertex_count: self.positions.len(),
                });
            }
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(MeshError::WeightOutOfRange {
                    channel: group.name().to_string(),
                    vertex,
                    weight,
                });
            }
        }
        self.groups
            .insert(group)
            .map_err(|group| MeshError::DuplicateChannel(group.name().to_string()))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn groups(&self) -> &VertexGroups {
        &self.groups
    }

    pub fn armatures(&self) -> &[Armature] {
        &self.armatures
    }

    pub fn world_matrix(&self) -> Option<Mat4> {
        self.world_matrix
    }

    pub fn world_positions(&self) -> Vec<Vec3> {
        to_world(&self.positions, self.world_matrix)
    }

    pub fn bone_names(&self) -> BTreeSet<&str> {
        self.armatures
            .iter()
            .flat_map(|armature| armature.bones.iter())
            .map(|bone| bone.name.as_str())
            .collect()
    }

    pub fn deform_bones(&self) -> impl Iterator<Item = &Bone> + '_ {
        self.armatures
            .iter()
            .flat_map(|armature| armature.bones.iter())
            .filter(|bone| bone.deform)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TargetMesh {
    name: String,
    positions: Vec<[f32; 3]>,
    selected: Vec<bool>,
    world_matrix: Option<Mat4>,
}

impl TargetMesh {
    pub fn new(positions: Vec<[f32; 3]>) -> Result<Self, MeshError> {
        validate_positions(&positions)?;
        let selected = vec![true; positions.len()];
        Ok(Self {
            name: String::new(),
            positions,
            selected,
            world_matrix: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_world_matrix(mut self, matrix: Mat4) -> Self {
        self.world_matrix = Some(matrix);
        self
    }

    pub fn with_selection(mut self, mask: Vec<bool>) -> Result<Self, MeshError> {
        if mask.len() != self.positions.len() {
            return Err(MeshError::SelectionLength {
                expected: self.positions.len(),
                actual: mask.len(),
            });
        }
        self.selected = mask;
        Ok(self)
    }

    pub fn select_all(&mut self) {
        self.selected.fill(true);
    }

    pub fn select_none(&mut self) {
        self.selected.fill(false);
    }

    pub fn set_selected(&mut self, vertex: usize, selected: bool) {
        if let Some(slot) = self.selected.get_mut(vertex) {
            *slot = selected;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn is_selected(&self, vertex: usize) -> bool {
        self.selected.get(vertex).copied().unwrap_or(false)
    }

    pub fn selected_vertices(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter_map(|(idx, selected)| selected.then_some(idx))
            .collect()
    }

    pub fn world_positions(&self) -> Vec<Vec3> {
        to_world(&self.positions, self.world_matrix)
    }
}

fn validate_positions(positions: &[[f32; 3]]) -> Result<(), MeshError> {
    match positions
        .iter()
        .position(|p| !Vec3::from(*p).is_finite())
    {
        Some(index) => Err(MeshError::NonFinitePosition { index }),
        None => Ok(()),
    }
}

fn to_world(positions: &[[f32; 3]], matrix: Option<Mat4>) -> Vec<Vec3> {
    match matrix {
        Some(matrix) => positions
            .iter()
            .map(|p| matrix.transform_point3(Vec3::from(*p)))
            .collect(),
        None => positions.iter().copied().map(Vec3::from).collect(),
    }
}

use std::sync::OnceLock;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::groups::{VertexGroup, VertexGroupSink};
use crate::interpolate::{interpolate_weight, SampleSite};
use crate::mesh::{SourceMesh, TargetMesh};
use crate::parallel::map_collect;
use crate::projection::{Projection, SurfaceProjector};
use crate::spatial::KdTree;


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferOptions {
    pub only_named_bones: bool,
    pub keep_empty_channels: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightChange {
    Set(f32),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWrite {
    pub channel: String,
    pub change: WeightChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAssignment {
    pub vertex: usize,
    pub writes: Vec<ChannelWrite>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
    pub copied: usize,
    pub selected: usize,
    pub used_fallback: bool,
    /// Groups that did not exist on the target before this transfer.
    pub created_channels: Vec<String>,
    pub vertices: Vec<VertexAssignment>,
}

pub struct TargetJob<'a> {
    pub mesh: &'a TargetMesh,
    pub sink: &'a mut dyn VertexGroupSink,
}

/// The nearest-vertex index is built on first use and shared by every target.
pub struct WeightTransfer<'a> {
    source: &'a SourceMesh,
    options: TransferOptions,
    projector: SurfaceProjector,
    channels: Vec<&'a VertexGroup>,
    vertex_index: OnceLock<KdTree>,
}

struct PendingVertex {
    vertex: usize,
    fallback: bool,
    weights: Vec<f32>,
}

impl<'a> WeightTransfer<'a> {
    pub fn new(source: &'a SourceMesh, options: TransferOptions) -> Self {
        let bones = source.bone_names();
        let channels = source
            .groups()
            .iter()
            .filter(|group| {
                let keep = !options.only_named_bones || bones.contains(group.name());
                if !keep {
                    tracing::debug!("skipping non-bone group '{}'", group.name());
                }
                keep
            })
            .collect();
        Self {
            source,
            options,
            projector: SurfaceProjector::from_mesh(source),
            channels,
            vertex_index: OnceLock::new(),
        }
    }

    pub fn options(&self) -> TransferOptions {
        self.options
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.iter().map(|group| group.name())
    }

    pub fn has_vertex_index(&self) -> bool {
        self.vertex_index.get().is_some()
    }

    pub fn apply<S>(&self, target: &TargetMesh, sink: &mut S) -> TransferResult
    where
        S: VertexGroupSink + ?Sized,
    {
        tracing::info!("weight group copy to '{}'", target.name());
        let selected = target.selected_vertices();
        let mut result = TransferResult {
            selected: selected.len(),
            ..TransferResult::default()
        };
        if self.source.vertex_count() == 0 {
            tracing::info!("source mesh has no vertices, nothing to copy");
            return result;
        }

        if self.options.keep_empty_channels {
            for bone in self.source.deform_bones() {
                if sink.ensure_channel(&bone.name) {
                    tracing::debug!("created empty group '{}'", bone.name);
                    result.created_channels.push(bone.name.clone());
                }
            }
        }

        let world = target.world_positions();
        let pending = map_collect(&selected, |&vertex| self.sample_vertex(vertex, world[vertex]));

        for sample in pending {
            result.used_fallback |= sample.fallback;
            let mut writes = Vec::new();
            let mut copied = false;
            for (group, weight) in self.channels.iter().zip(sample.weights) {
                let name = group.name();
                if weight > 0.0 {
                    if sink.ensure_channel(name) {
                        result.created_channels.push(name.to_string());
                    }
                    sink.set_weight(sample.vertex, name, weight);
                    writes.push(ChannelWrite {
                        channel: name.to_string(),
                        change: WeightChange::Set(weight),
                    });
                    copied = true;
                } else if sink.has_channel(name) && sink.remove_weight(sample.vertex, name) {
                    writes.push(ChannelWrite {
                        channel: name.to_string(),
                        change: WeightChange::Remove,
                    });
                }
            }
            if copied {
                result.copied += 1;
            }
            if !writes.is_empty() {
                result.vertices.push(VertexAssignment {
                    vertex: sample.vertex,
                    writes,
                });
            }
        }

        tracing::info!(
            "copied bone weights of {} vertices to '{}'",
            result.copied,
            target.name()
        );
        result
    }

    fn sample_vertex(&self, vertex: usize, position: Vec3) -> PendingVertex {
        let (site, fallback) = match self.projector.project(position) {
            Projection::Hit(hit) => (
                SampleSite::Surface {
                    corners: hit.corners.map(|idx| idx as usize),
                    barycentric: hit.barycentric,
                },
                false,
            ),
            Projection::Miss => {
                let nearest = self.vertex_index().nearest(position);
                let index = nearest.map_or(0, |nearest| nearest.id);
                (SampleSite::Vertex { index }, true)
            }
        };
        let weights = self
            .channels
            .iter()
            .map(|group| interpolate_weight(group, &site))
            .collect();
        PendingVertex {
            vertex,
            fallback,
            weights,
        }
    }

    fn vertex_index(&self) -> &KdTree {
        self.vertex_index.get_or_init(|| {
            tracing::debug!(
                "source has no triangles, building nearest-vertex index over {} vertices",
                self.projector.positions().len()
            );
            KdTree::build(
                self.projector
                    .positions()
                    .iter()
                    .enumerate()
                    .map(|(idx, position)| (*position, idx)),
            )
        })
    }
}

pub fn transfer_weights<S>(
    source: &SourceMesh,
    target: &TargetMesh,
    options: TransferOptions,
    sink: &mut S,
) -> TransferResult
where
    S: VertexGroupSink + ?Sized,
{
    WeightTransfer::new(source, options).apply(target, sink)
}

pub fn transfer_weights_to_many(
    source: &SourceMesh,
    options: TransferOptions,
    jobs: &mut [TargetJob<'_>],
) -> Vec<TransferResult> {
    let transfer = WeightTransfer::new(source, options);
    jobs.iter_mut()
        .map(|job| transfer.apply(job.mesh, &mut *job.sink))
        .collect()
}

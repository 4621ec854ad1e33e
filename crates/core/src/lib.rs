mod error;
mod groups;
mod interpolate;
mod mesh;
mod parallel;
mod projection;
mod spatial;
mod transfer;

pub use error::MeshError;
pub use groups::{VertexGroup, VertexGroupSink, VertexGroups};
pub use interpolate::{interpolate_weight, SampleSite};
pub use mesh::{Aabb, Armature, Bone, SourceMesh, TargetMesh};
pub use projection::{
    closest_point_on_triangle, project, Projection, SurfaceHit, SurfaceProjector,
};
pub use spatial::{KdTree, KdTreeBuilder, Nearest};
pub use transfer::{
    transfer_weights, transfer_weights_to_many, ChannelWrite, TargetJob, TransferOptions,
    TransferResult, VertexAssignment, WeightChange, WeightTransfer,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, mesh has {vertex_count} vertices")]
    TriangleIndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("index buffer length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),
    #[error("channel '{channel}' assigns vertex {vertex}, mesh has {vertex_count} vertices")]
    WeightVertexOutOfRange {
        channel: String,
        vertex: usize,
        vertex_count: usize,
    },
    #[error("channel '{channel}' weight {weight} on vertex {vertex} is outside [0, 1]")]
    WeightOutOfRange {
        channel: String,
        vertex: usize,
        weight: f32,
    },
    #[error("channel '{0}' is defined more than once")]
    DuplicateChannel(String),
    #[error("selection mask has {actual} entries, mesh has {expected} vertices")]
    SelectionLength { expected: usize, actual: usize },
    #[error("vertex {index} has a non-finite position")]
    NonFinitePosition { index: usize },
}

use std::path::Path;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use weightcopy_core::{
    transfer_weights_to_many, Armature, Bone, SourceMesh, TargetJob, TargetMesh, TransferOptions,
    TransferResult, VertexGroup, VertexGroupSink, VertexGroups,
};

#[derive(Debug, Deserialize)]
pub struct JobFile {
    source: SourceSpec,
    #[serde(default)]
    targets: Vec<TargetSpec>,
    #[serde(default)]
    options: TransferOptions,
}

#[derive(Debug, Deserialize)]
struct SourceSpec {
    positions: Vec<[f32; 3]>,
    #[serde(default)]
    triangles: Vec<[u32; 3]>,
    /// Column-major object-to-world matrix.
    #[serde(default)]
    world_matrix: Option<[f32; 16]>,
    #[serde(default)]
    groups: Vec<GroupSpec>,
    #[serde(default)]
    armatures: Vec<ArmatureSpec>,
}

#[derive(Debug, Deserialize)]
struct GroupSpec {
    name: String,
    #[serde(default)]
    weights: Vec<(usize, f32)>,
}

#[derive(Debug, Deserialize)]
struct ArmatureSpec {
    #[serde(default)]
    name: String,
    #[serde(default)]
    bones: Vec<BoneSpec>,
}

#[derive(Debug, Deserialize)]
struct BoneSpec {
    name: String,
    #[serde(default = "default_deform")]
    deform: bool,
}

#[derive(Debug, Deserialize)]
struct TargetSpec {
    name: String,
    positions: Vec<[f32; 3]>,
    #[serde(default)]
    selected: Option<Vec<usize>>,
    #[serde(default)]
    world_matrix: Option<[f32; 16]>,
    #[serde(default)]
    groups: Vec<GroupSpec>,
}

#[derive(Debug, Serialize)]
pub struct JobReport {
    pub targets: Vec<TargetReport>,
}

#[derive(Debug, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub result: TransferResult,
    pub groups: Vec<VertexGroup>,
}

fn default_deform() -> bool {
    true
}

pub fn load_job(path: &Path) -> Result<JobFile, String> {
    let data = std::fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
    parse_job(&data)
}

pub fn parse_job(data: &[u8]) -> Result<JobFile, String> {
    serde_json::from_slice(data).map_err(|err| err.to_string())
}

pub fn run_job(job: &JobFile) -> Result<JobReport, String> {
    let source = build_source(&job.source)?;
    let targets = job
        .targets
        .iter()
        .map(build_target)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        "source: {} vertices, {} triangles, {} groups; {} targets",
        source.vertex_count(),
        source.triangles().len(),
        source.groups().len(),
        targets.len()
    );

    let mut sinks: Vec<VertexGroups> = targets.iter().map(|(_, groups)| groups.clone()).collect();
    let results = {
        let mut jobs: Vec<TargetJob<'_>> = targets
            .iter()
            .zip(sinks.iter_mut())
            .map(|((mesh, _), sink)| TargetJob {
                mesh,
                sink: sink as &mut dyn VertexGroupSink,
            })
            .collect();
        transfer_weights_to_many(&source, job.options, &mut jobs)
    };

    let targets = targets
        .iter()
        .zip(results)
        .zip(sinks)
        .map(|(((mesh, _), result), groups)| TargetReport {
            name: mesh.name().to_string(),
            result,
            groups: groups.into_vec(),
        })
        .collect();
    Ok(JobReport { targets })
}

pub fn write_report(report: &JobReport, path: Option<&Path>) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report).map_err(|err| err.to_string())?;
    match path {
        Some(path) => {
            std::fs::write(path, json).map_err(|err| format!("{}: {err}", path.display()))?;
            tracing::info!("wrote report to {:?}", path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn build_source(spec: &SourceSpec) -> Result<SourceMesh, String> {
    let mut source = SourceMesh::new(spec.positions.clone(), spec.triangles.clone())
        .map_err(|err| format!("source: {err}"))?;
    if let Some(matrix) = spec.world_matrix {
        source = source.with_world_matrix(Mat4::from_cols_array(&matrix));
    }
    for group in &spec.groups {
        source
            .add_group(VertexGroup::with_weights(
                group.name.clone(),
                group.weights.iter().copied(),
            ))
            .map_err(|err| format!("source: {err}"))?;
    }
    for armature in &spec.armatures {
        source = source.with_armature(Armature {
            name: armature.name.clone(),
            bones: armature
                .bones
                .iter()
                .map(|bone| Bone::new(bone.name.clone(), bone.deform))
                .collect(),
        });
    }
    Ok(source)
}

fn build_target(spec: &TargetSpec) -> Result<(TargetMesh, VertexGroups), String> {
    let context = |err: weightcopy_core::MeshError| format!("target '{}': {err}", spec.name);
    let mut mesh = TargetMesh::new(spec.positions.clone())
        .map_err(context)?
        .with_name(spec.name.clone());
    if let Some(matrix) = spec.world_matrix {
        mesh = mesh.with_world_matrix(Mat4::from_cols_array(&matrix));
    }
    if let Some(selected) = &spec.selected {
        mesh.select_none();
        for &vertex in selected {
            if vertex >= mesh.vertex_count() {
                return Err(format!(
                    "target '{}': selected vertex {vertex} out of range",
                    spec.name
                ));
            }
            mesh.set_selected(vertex, true);
        }
    }

    let mut groups = VertexGroups::new();
    for group in &spec.groups {
        groups
            .insert(VertexGroup::with_weights(
                group.name.clone(),
                group.weights.iter().copied(),
            ))
            .map_err(|group| {
                format!(
                    "target '{}': group '{}' is defined more than once",
                    spec.name,
                    group.name()
                )
            })?;
    }
    Ok((mesh, groups))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"{
        "source": {
            "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
            "triangles": [[0, 1, 2]],
            "groups": [
                {"name": "spine", "weights": [[0, 1.0], [1, 1.0], [2, 1.0]]},
                {"name": "Smooth", "weights": [[0, 0.5]]}
            ],
            "armatures": [
                {"name": "rig", "bones": [{"name": "spine"}, {"name": "tail"}, {"name": "pole", "deform": false}]}
            ]
        },
        "targets": [
            {
                "name": "shirt",
                "positions": [[0.2, 0.2, 0.1], [0.1, 0.1, 0.0]],
                "selected": [0],
                "groups": [{"name": "spine", "weights": [[1, 0.3]]}]
            }
        ],
        "options": {"only_named_bones": true, "keep_empty_channels": true}
    }"#;

    #[test]
    fn runs_job_end_to_end() {
        let job = parse_job(JOB.as_bytes()).expect("job");
        let report = run_job(&job).expect("report");
        assert_eq!(report.targets.len(), 1);

        let shirt = &report.targets[0];
        assert_eq!(shirt.name, "shirt");
        assert_eq!(shirt.result.copied, 1);
        assert_eq!(shirt.result.selected, 1);
        let names: Vec<_> = shirt.groups.iter().map(VertexGroup::name).collect();
        assert_eq!(names, vec!["spine", "tail"]);
        let spine = &shirt.groups[0];
        assert!((spine.weight(0).expect("weight") - 1.0).abs() < 1.0e-4);
        assert_eq!(spine.weight(1), Some(0.3));
    }

    #[test]
    fn report_serializes() {
        let job = parse_job(JOB.as_bytes()).expect("job");
        let report = run_job(&job).expect("report");
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["targets"][0]["result"]["copied"], 1);
        assert_eq!(
            json["targets"][0]["result"]["created_channels"][0],
            "tail"
        );
    }

    #[test]
    fn sleeve_demo_runs() {
        let job = parse_job(include_bytes!("../../../demos/sleeve.json")).expect("job");
        let report = run_job(&job).expect("report");
        let sleeve = &report.targets[0];
        assert_eq!(sleeve.result.copied, 3);
        assert_eq!(sleeve.result.created_channels, vec!["upper_arm", "hand"]);
        let names: Vec<_> = sleeve.groups.iter().map(VertexGroup::name).collect();
        assert_eq!(names, vec!["forearm", "upper_arm", "hand"]);
        let forearm = &sleeve.groups[0];
        assert!((forearm.weight(0).expect("weight") - 0.08).abs() < 1.0e-4);
        assert!(forearm.weight(3).is_none());
        assert!(sleeve.groups[2].is_empty());
    }

    #[test]
    fn invalid_source_is_reported() {
        let job = parse_job(
            br#"{"source": {"positions": [[0, 0, 0]], "triangles": [[0, 1, 2]]}}"#,
        )
        .expect("job");
        let err = run_job(&job).expect_err("bad triangle");
        assert!(err.starts_with("source:"));
    }

    #[test]
    fn out_of_range_selection_is_reported() {
        let job = parse_job(
            br#"{"source": {"positions": [[0, 0, 0]]},
                 "targets": [{"name": "t", "positions": [[0, 0, 0]], "selected": [4]}]}"#,
        )
        .expect("job");
        let err = run_job(&job).expect_err("bad selection");
        assert!(err.contains("out of range"));
    }
}

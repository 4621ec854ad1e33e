use crate::groups::VertexGroup;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSite {
    Surface {
        corners: [usize; 3],
        barycentric: [f32; 3],
    },
    Vertex { index: usize },
}

/// Weight of `group` at `site`, clamped to `[0, 1]`.
pub fn interpolate_weight(group: &VertexGroup, site: &SampleSite) -> f32 {
    let weight = match *site {
        SampleSite::Surface {
            corners,
            barycentric,
        } => lerp_weight(group, corners, barycentric),
        SampleSite::Vertex { index } => group.weight_or_zero(index),
    };
    weight.clamp(0.0, 1.0)
}

fn lerp_weight(group: &VertexGroup, corners: [usize; 3], barycentric: [f32; 3]) -> f32 {
    let values = corners.map(|corner| group.weight(corner));
    if values.iter().all(Option::is_none) {
        return 0.0;
    }
    values
        .iter()
        .zip(barycentric)
        .map(|(value, bary)| value.unwrap_or(0.0) * bary)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_mode_blends_corner_weights() {
        let group = VertexGroup::with_weights("A", [(0, 1.0), (1, 0.0)]);
        let site = SampleSite::Surface {
            corners: [0, 1, 2],
            barycentric: [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
        };
        let weight = interpolate_weight(&group, &site);
        assert!((weight - 1.0 / 3.0).abs() < 1.0e-4);
    }

    #[test]
    fn surface_mode_stays_within_corner_range() {
        let group = VertexGroup::with_weights("A", [(0, 0.2), (1, 0.9), (2, 0.5)]);
        for bary in [
            [0.1, 0.2, 0.7],
            [0.8, 0.1, 0.1],
            [0.0, 1.0, 0.0],
            [0.33, 0.33, 0.34],
        ] {
            let weight = interpolate_weight(
                &group,
                &SampleSite::Surface {
                    corners: [0, 1, 2],
                    barycentric: bary,
                },
            );
            assert!((0.2 - 1.0e-6..=0.9 + 1.0e-6).contains(&weight), "{weight}");
        }
    }

    #[test]
    fn unassigned_triangle_is_exactly_zero() {
        let group = VertexGroup::with_weights("A", [(5, 1.0)]);
        let site = SampleSite::Surface {
            corners: [0, 1, 2],
            barycentric: [0.2, 0.3, 0.5],
        };
        assert_eq!(interpolate_weight(&group, &site), 0.0);
    }

    #[test]
    fn vertex_mode_copies_exact_weight() {
        let group = VertexGroup::with_weights("A", [(1, 0.37)]);
        assert_eq!(
            interpolate_weight(&group, &SampleSite::Vertex { index: 1 }),
            0.37
        );
        assert_eq!(
            interpolate_weight(&group, &SampleSite::Vertex { index: 0 }),
            0.0
        );
    }

    #[test]
    fn rounding_above_one_is_clamped() {
        let group = VertexGroup::with_weights("A", [(0, 1.0), (1, 1.0), (2, 1.0)]);
        let site = SampleSite::Surface {
            corners: [0, 1, 2],
            barycentric: [0.4, 0.4, 0.200_001],
        };
        assert_eq!(interpolate_weight(&group, &site), 1.0);
    }
}

//! School-site suitability pipeline
//!
//! Combines population density, existing schools, restricted-use
//! geometry (rivers, protected land) and an administrative boundary
//! into one layer of candidate construction sites. The pipeline is a
//! fixed sequence of eight spatial operations; each step consumes the
//! previous step's output and no step may be skipped or reordered.
//!
//! Every invocation builds fresh intermediate layers; inputs are never
//! mutated. Any failing step aborts the whole run with an error naming
//! the step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geo::Contains;
use geo_types::{Geometry, MultiLineString, MultiPoint, MultiPolygon};

use schoolsite_core::{AttributeValue, Error, Feature, Layer, Result};

use crate::vector::{
    buffer_layer, clip_to_mask, extract_by_attribute, overlay, BufferParams, FilterOp,
};

/// Segments per quarter arc for exclusion buffers. The accepted
/// precision/performance trade-off for this analysis.
const BUFFER_QUADRANT_SEGMENTS: usize = 5;

/// How the boundary mask is chosen from the boundary layer
#[derive(Debug, Clone, Copy)]
pub enum BoundarySelector<'a> {
    /// Filter the boundary layer by exact attribute equality
    Named {
        layer: &'a Layer,
        field: &'a str,
        value: &'a str,
    },
    /// Use the whole boundary layer as the mask
    WholeLayer(&'a Layer),
}

impl<'a> BoundarySelector<'a> {
    fn layer(&self) -> &'a Layer {
        match self {
            BoundarySelector::Named { layer, .. } => layer,
            BoundarySelector::WholeLayer(layer) => layer,
        }
    }
}

/// Scalar parameters controlling the pipeline
#[derive(Debug, Clone)]
pub struct SuitabilityParams {
    /// Minimum population for a candidate area (inclusive)
    pub population_threshold: f64,
    /// Exclusion distance around existing schools, in CRS units
    pub school_exclusion_distance: f64,
    /// Exclusion distance around restricted-use geometry, in CRS units
    pub restricted_exclusion_distance: f64,
    /// Attribute holding population counts on the population layer
    pub population_field: String,
}

impl Default for SuitabilityParams {
    fn default() -> Self {
        Self {
            population_threshold: 0.0,
            school_exclusion_distance: 0.0,
            restricted_exclusion_distance: 0.0,
            population_field: "population".to_string(),
        }
    }
}

/// Cooperative cancellation flag checked between pipeline steps
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// The eight ordered pipeline steps, used to tag operation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    ResolveBoundary,
    ClipPopulation,
    FilterPopulation,
    BufferSchools,
    BufferRestricted,
    MergeExclusions,
    SubtractExclusions,
    ClipToBoundary,
}

impl PipelineStep {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::ResolveBoundary => "resolve_boundary",
            PipelineStep::ClipPopulation => "clip_population",
            PipelineStep::FilterPopulation => "filter_population",
            PipelineStep::BufferSchools => "buffer_schools",
            PipelineStep::BufferRestricted => "buffer_restricted",
            PipelineStep::MergeExclusions => "merge_exclusions",
            PipelineStep::SubtractExclusions => "subtract_exclusions",
            PipelineStep::ClipToBoundary => "clip_to_boundary",
        }
    }
}

/// Identify land suitable for a new school.
///
/// The result holds polygon features that are simultaneously inside
/// the boundary mask, at or above the population threshold, and
/// outside both exclusion buffers. Buffers are closed regions:
/// geometry touching a buffer edge is not excluded.
///
/// Preconditions are checked before any geometry is touched: all three
/// parameters must be non-negative, the population and boundary layers
/// must be non-empty, and every layer must share one CRS. The schools
/// and restricted layers may be empty (their exclusion is then empty).
pub fn compute_suitable_areas(
    selector: BoundarySelector<'_>,
    population: &Layer,
    schools: &Layer,
    restricted: &Layer,
    params: &SuitabilityParams,
    cancel: Option<&CancelToken>,
) -> Result<Layer> {
    validate_params(params)?;
    validate_layers(population, schools, restricted, selector.layer())?;

    // Step 1: resolve the boundary mask
    check_cancelled(cancel)?;
    let mask = resolve_boundary(selector)?;

    // Step 2: clip population to the boundary
    check_cancelled(cancel)?;
    let clipped =
        clip_to_mask(population, &mask).map_err(retag(PipelineStep::ClipPopulation))?;

    // Step 3: keep areas at or above the population threshold
    check_cancelled(cancel)?;
    let high_population = extract_by_attribute(
        &clipped,
        &params.population_field,
        FilterOp::Gte,
        &AttributeValue::Float(params.population_threshold),
    );

    // Step 4: buffer schools and dissolve
    check_cancelled(cancel)?;
    let school_buffer = buffer_layer(
        schools,
        &BufferParams {
            distance: params.school_exclusion_distance,
            quadrant_segments: BUFFER_QUADRANT_SEGMENTS,
        },
    )
    .map_err(retag(PipelineStep::BufferSchools))?;

    // Step 5: buffer restricted geometry and dissolve
    check_cancelled(cancel)?;
    let restricted_buffer = buffer_layer(
        restricted,
        &BufferParams {
            distance: params.restricted_exclusion_distance,
            quadrant_segments: BUFFER_QUADRANT_SEGMENTS,
        },
    )
    .map_err(retag(PipelineStep::BufferRestricted))?;

    // Step 6: merge the exclusion zones into one geometry
    check_cancelled(cancel)?;
    let exclusion = overlay::union(&school_buffer, &restricted_buffer);

    // Step 7: subtract the exclusions from the high-population areas
    check_cancelled(cancel)?;
    let remaining = subtract_exclusions(&high_population, &exclusion)?;

    // Step 8: defensive re-clip, buffers may have leaked past the boundary
    check_cancelled(cancel)?;
    let mut result =
        clip_to_mask(&remaining, &mask).map_err(retag(PipelineStep::ClipToBoundary))?;
    result.name = "suitable_areas".to_string();
    Ok(result)
}

fn check_cancelled(cancel: Option<&CancelToken>) -> Result<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(Error::Cancelled),
        _ => Ok(()),
    }
}

/// Re-tag a geometry-operation error with the pipeline step it
/// happened in; other error kinds pass through unchanged.
fn retag(step: PipelineStep) -> impl Fn(Error) -> Error {
    move |e| match e {
        Error::GeometryOp { reason, .. } => Error::GeometryOp {
            step: step.name(),
            reason,
        },
        other => other,
    }
}

fn validate_params(params: &SuitabilityParams) -> Result<()> {
    let checks = [
        ("population_threshold", params.population_threshold),
        (
            "school_exclusion_distance",
            params.school_exclusion_distance,
        ),
        (
            "restricted_exclusion_distance",
            params.restricted_exclusion_distance,
        ),
    ];
    for (name, value) in checks {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidParameter {
                name,
                value: value.to_string(),
                reason: "must be a non-negative finite number".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_layers(
    population: &Layer,
    schools: &Layer,
    restricted: &Layer,
    boundary: &Layer,
) -> Result<()> {
    for layer in [population, schools, restricted, boundary] {
        layer.validate()?;
    }
    for layer in [population, boundary] {
        if layer.is_empty() {
            return Err(Error::LayerLoad {
                layer: layer.name.clone(),
                reason: "layer has no features".to_string(),
            });
        }
    }
    for layer in [schools, restricted, boundary] {
        if !layer.crs.is_equivalent(&population.crs) {
            return Err(Error::LayerLoad {
                layer: layer.name.clone(),
                reason: format!(
                    "CRS {} does not match {} of layer '{}'",
                    layer.crs, population.crs, population.name
                ),
            });
        }
    }
    Ok(())
}

/// Step 1: turn the selector into a dissolved polygon mask
fn resolve_boundary(selector: BoundarySelector<'_>) -> Result<MultiPolygon<f64>> {
    let mask_layer = match selector {
        BoundarySelector::Named {
            layer,
            field,
            value,
        } => {
            let filtered = extract_by_attribute(
                layer,
                field,
                FilterOp::Eq,
                &AttributeValue::String(value.to_string()),
            );
            if filtered.is_empty() {
                return Err(Error::NoMatch {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
            filtered
        }
        BoundarySelector::WholeLayer(layer) => layer.clone(),
    };

    let mut polygons = Vec::new();
    for (idx, feature) in mask_layer.iter().enumerate() {
        match overlay::as_multipolygon(&feature.geometry) {
            Some(mp) => polygons.extend(mp.0),
            None => {
                return Err(Error::GeometryOp {
                    step: PipelineStep::ResolveBoundary.name(),
                    reason: format!(
                        "boundary feature {} of layer '{}' is not a polygon",
                        idx, mask_layer.name
                    ),
                });
            }
        }
    }
    Ok(overlay::dissolve(polygons))
}

/// Step 7: geometric difference, feature by feature, attributes kept.
/// Features fully inside the exclusion disappear; partial overlaps are
/// cut back to their non-excluded portion.
fn subtract_exclusions(layer: &Layer, exclusion: &MultiPolygon<f64>) -> Result<Layer> {
    let mut out = Layer::new(layer.name.clone(), layer.crs.clone());
    for (idx, feature) in layer.iter().enumerate() {
        let kept = match &feature.geometry {
            Geometry::Point(p) => {
                // Interior-only containment: a point on the buffer
                // edge survives
                if exclusion.contains(p) {
                    None
                } else {
                    Some(feature.geometry.clone())
                }
            }
            Geometry::MultiPoint(mp) => {
                let outside: Vec<_> = mp
                    .0
                    .iter()
                    .filter(|p| !exclusion.contains(*p))
                    .copied()
                    .collect();
                if outside.is_empty() {
                    None
                } else {
                    Some(Geometry::MultiPoint(MultiPoint::new(outside)))
                }
            }
            Geometry::LineString(ls) => {
                subtract_lines(&MultiLineString::new(vec![ls.clone()]), exclusion)
            }
            Geometry::MultiLineString(mls) => subtract_lines(mls, exclusion),
            areal => match overlay::as_multipolygon(areal) {
                Some(subject) => {
                    let remaining = overlay::difference(&subject, exclusion);
                    if remaining.0.is_empty() {
                        None
                    } else {
                        Some(overlay::from_multipolygon(remaining))
                    }
                }
                None => {
                    return Err(Error::GeometryOp {
                        step: PipelineStep::SubtractExclusions.name(),
                        reason: format!(
                            "feature {} of layer '{}' has unsupported geometry",
                            idx, layer.name
                        ),
                    });
                }
            },
        };

        if let Some(geometry) = kept {
            out.push(Feature {
                geometry,
                properties: feature.properties.clone(),
                id: feature.id.clone(),
            });
        }
    }
    Ok(out)
}

fn subtract_lines(
    lines: &MultiLineString<f64>,
    exclusion: &MultiPolygon<f64>,
) -> Option<Geometry<f64>> {
    if exclusion.0.is_empty() {
        return Some(Geometry::MultiLineString(lines.clone()));
    }
    use geo::BooleanOps;
    let outside = exclusion.clip(lines, true);
    let kept: Vec<_> = outside.0.into_iter().filter(|ls| ls.0.len() >= 2).collect();
    if kept.is_empty() {
        None
    } else {
        Some(Geometry::MultiLineString(MultiLineString::new(kept)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Polygon};
    use schoolsite_core::Crs;

    fn rect_layer(name: &str) -> Layer {
        let mut layer = Layer::new(name, Crs::from_epsg(32633));
        layer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        ))));
        layer
    }

    #[test]
    fn test_negative_parameter_rejected() {
        let params = SuitabilityParams {
            school_exclusion_distance: -1.0,
            ..Default::default()
        };
        let boundary = rect_layer("districts");
        let population = rect_layer("population");
        let empty = Layer::new("schools", Crs::from_epsg(32633));
        let result = compute_suitable_areas(
            BoundarySelector::WholeLayer(&boundary),
            &population,
            &empty,
            &empty,
            &params,
            None,
        );
        match result {
            Err(Error::InvalidParameter { name, .. }) => {
                assert_eq!(name, "school_exclusion_distance")
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_parameter_rejected() {
        let params = SuitabilityParams {
            population_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            validate_params(&params),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            check_cancelled(Some(&token)),
            Err(Error::Cancelled)
        ));
        assert!(check_cancelled(None).is_ok());
    }

    #[test]
    fn test_step_names() {
        assert_eq!(PipelineStep::ResolveBoundary.name(), "resolve_boundary");
        assert_eq!(PipelineStep::ClipToBoundary.name(), "clip_to_boundary");
    }

    #[test]
    fn test_resolve_boundary_rejects_points() {
        let mut layer = Layer::new("districts", Crs::from_epsg(32633));
        layer.push(Feature::new(Geometry::Point(geo_types::Point::new(
            0.0, 0.0,
        ))));
        let result = resolve_boundary(BoundarySelector::WholeLayer(&layer));
        assert!(matches!(result, Err(Error::GeometryOp { step, .. }) if step == "resolve_boundary"));
    }
}

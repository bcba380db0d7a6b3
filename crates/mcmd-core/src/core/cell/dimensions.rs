use super::{Axis, GeometryError};
use tracing::warn;

/// Where a resolved box length came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DimensionSource {
    /// The structure file (or restart output) value was used.
    Read,
    /// The structure file had no value, so the user override was used.
    Override,
    /// Both were present and disagreed; the user override won.
    OverrideDiffers { read: f64, set: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDimension {
    pub value: f64,
    pub source: DimensionSource,
}

/// Chooses the length of one axis from the structure-file value and the user override.
///
/// The override is only considered when `cycle == apply_only_on_cycle`; every other
/// cycle uses the restart-derived value unconditionally. A missing value with nothing
/// to fall back on is a [`GeometryError::MissingDimension`].
pub fn resolve_dimension(
    axis: Axis,
    cycle: u64,
    read: Option<f64>,
    set: Option<f64>,
    apply_only_on_cycle: u64,
) -> Result<ResolvedDimension, GeometryError> {
    if cycle != apply_only_on_cycle {
        return read
            .map(|value| ResolvedDimension {
                value,
                source: DimensionSource::Read,
            })
            .ok_or(GeometryError::MissingDimension { axis, cycle });
    }

    match (read, set) {
        (None, Some(set)) => Ok(ResolvedDimension {
            value: set,
            source: DimensionSource::Override,
        }),
        (None, None) => Err(GeometryError::MissingDimension { axis, cycle }),
        (Some(read), Some(set)) if set != read => {
            warn!(
                "The user defined {axis}-dimension is different than the one read from the starting PDB file \
                 ({axis}-dim_PDB = {read}, {axis}-dim_user_set = {set}). Using the user defined {axis}-dimension."
            );
            Ok(ResolvedDimension {
                value: set,
                source: DimensionSource::OverrideDiffers { read, set },
            })
        }
        (Some(read), _) => Ok(ResolvedDimension {
            value: read,
            source: DimensionSource::Read,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::INITIAL_CYCLE;

    #[test]
    fn override_is_used_when_structure_has_no_dimension() {
        let resolved = resolve_dimension(Axis::X, 0, None, Some(25.0), INITIAL_CYCLE).unwrap();
        assert_eq!(resolved.value, 25.0);
        assert_eq!(resolved.source, DimensionSource::Override);
    }

    #[test]
    fn missing_read_and_override_fails_with_axis() {
        let err = resolve_dimension(Axis::Y, 0, None, None, INITIAL_CYCLE).unwrap_err();
        assert_eq!(
            err,
            GeometryError::MissingDimension {
                axis: Axis::Y,
                cycle: 0
            }
        );
        assert!(err.to_string().contains("y-dimension"));
    }

    #[test]
    fn differing_override_wins_on_initial_cycle() {
        let resolved =
            resolve_dimension(Axis::Z, 0, Some(30.0), Some(32.0), INITIAL_CYCLE).unwrap();
        assert_eq!(resolved.value, 32.0);
        assert_eq!(
            resolved.source,
            DimensionSource::OverrideDiffers {
                read: 30.0,
                set: 32.0
            }
        );
    }

    #[test]
    fn read_value_is_used_when_override_matches_or_is_absent() {
        for set in [None, Some(20.0)] {
            let resolved = resolve_dimension(Axis::X, 0, Some(20.0), set, INITIAL_CYCLE).unwrap();
            assert_eq!(resolved.value, 20.0);
            assert_eq!(resolved.source, DimensionSource::Read);
        }
    }

    #[test]
    fn later_cycles_ignore_the_override() {
        for cycle in [1, 2, 17] {
            let resolved =
                resolve_dimension(Axis::X, cycle, Some(10.0), Some(15.0), INITIAL_CYCLE).unwrap();
            assert_eq!(resolved.value, 10.0);
        }
    }

    #[test]
    fn later_cycles_without_read_value_fail() {
        assert!(matches!(
            resolve_dimension(Axis::Z, 3, None, Some(15.0), INITIAL_CYCLE),
            Err(GeometryError::MissingDimension { axis: Axis::Z, cycle: 3 })
        ));
    }
}

use super::{GeometryError, INITIAL_CYCLE};

const ANGLE_NAMES: [&str; 3] = ["alpha", "beta", "gamma"];

/// Rejects non-orthogonal boxes on the initial cycle.
///
/// Restart cycles are not checked: the engines tolerate the near-orthogonal cells
/// they write themselves. All violations, read and set, are reported together.
pub fn validate_angles(
    cycle: u64,
    read: [Option<f64>; 3],
    set: [Option<f64>; 3],
) -> Result<(), GeometryError> {
    if cycle != INITIAL_CYCLE {
        return Ok(());
    }

    let read_violations = read
        .iter()
        .zip(ANGLE_NAMES)
        .filter_map(|(angle, name)| match angle {
            Some(value) if *value != 90.0 => Some(format!("read_angle_{name}_PDB={value}")),
            _ => None,
        });
    let set_violations = set
        .iter()
        .zip(ANGLE_NAMES)
        .filter_map(|(angle, name)| match angle {
            Some(value) if *value != 90.0 => Some(format!("set_angle_{name}={value}")),
            _ => None,
        });

    let violations: Vec<String> = read_violations.chain(set_violations).collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(GeometryError::NonOrthogonal { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIGHT: [Option<f64>; 3] = [Some(90.0), Some(90.0), Some(90.0)];

    #[test]
    fn orthogonal_cell_passes_on_initial_cycle() {
        assert!(validate_angles(0, RIGHT, RIGHT).is_ok());
        assert!(validate_angles(0, [None; 3], [None; 3]).is_ok());
    }

    #[test]
    fn non_orthogonal_read_angle_fails_on_initial_cycle() {
        let err = validate_angles(0, [Some(89.0), Some(90.0), Some(90.0)], RIGHT).unwrap_err();
        assert_eq!(
            err,
            GeometryError::NonOrthogonal {
                violations: vec!["read_angle_alpha_PDB=89".to_string()]
            }
        );
    }

    #[test]
    fn every_violation_is_reported() {
        let err = validate_angles(
            0,
            [Some(90.0), Some(60.0), None],
            [None, Some(100.0), Some(120.0)],
        )
        .unwrap_err();
        match err {
            GeometryError::NonOrthogonal { violations } => {
                assert_eq!(
                    violations,
                    vec![
                        "read_angle_beta_PDB=60",
                        "set_angle_beta=100",
                        "set_angle_gamma=120"
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn restart_cycles_accept_any_angles() {
        assert!(
            validate_angles(
                1,
                [Some(95.0), Some(80.0), Some(120.0)],
                [Some(70.0), Some(110.0), Some(60.0)]
            )
            .is_ok()
        );
    }
}

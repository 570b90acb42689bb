//! Classifying scans and standardizing the project labels typed by field
//! technicians.

use log::warn;

use crate::location::Location;

/// Decide whether a scan column is a calibration scan.
///
/// The source filename is authoritative: a `.cal` or `.ref` marker means a
/// panel scan regardless of what the replication label says. A replication
/// label mentioning cal or panel is also accepted, since early seasons wrote
/// plain filenames for panel scans.
pub fn is_cal_scan(rep: &str, file_name: &str) -> bool {
    let file_name = file_name.to_lowercase();
    let rep = rep.to_lowercase();

    let marked_file = file_name.contains(".cal") || file_name.contains(".ref");
    let marked_rep = rep.contains("cal") || rep.contains("panel");

    if marked_file && !marked_rep {
        warn!(
            "calibration scan '{}' has non-calibration replication '{}'",
            file_name, rep
        );
    }

    marked_file || marked_rep
}

/// The canonical project spelling an alias belongs to, and its plot.
fn canonical_alias(raw: &str) -> Option<(&'static str, Location)> {
    let aliases: [(&[&str], &'static str, Location); 7] = [
        (
            &["csp01", "cspg01", "csp1", "cspo1", "cps01", "carbon1"],
            "CSP01",
            Location::Csp01,
        ),
        (
            &["csp02", "cspg02", "csp2", "cspo2", "cps02", "carbon2"],
            "CSP02",
            Location::Csp02,
        ),
        (
            &["csp03", "cspg03", "csp3", "cspo3", "carbon3", "cps03"],
            "CSP03",
            Location::Csp03,
        ),
        (
            &["csp03a", "cspo3a", "cspg03a", "carbon3a"],
            "CSP03A",
            Location::Csp03A,
        ),
        (
            &["bidirectionalcsp01", "csp1brdf"],
            "CSP01_BDRF",
            Location::Csp01,
        ),
        (
            &["bidirectionalcsp02", "csp2brdf"],
            "CSP02_BDRF",
            Location::Csp02,
        ),
        (
            &["bidirectionalcsp03", "csp3brdf"],
            "CSP03_BDRF",
            Location::Csp03,
        ),
    ];

    for (names, canonical, location) in aliases.iter() {
        if names.contains(&raw) {
            return Some((canonical, *location));
        }
    }

    None
}

/// Standardize a raw project label against the scan's resolved location.
///
/// Recognized aliases map to their canonical spelling. An alias belonging to
/// a different plot than the resolved location is renamed to the location's
/// canonical name, since the coordinates outrank the typed label. Names that
/// are not recognized at all are prefixed with the location so the output is
/// still self-describing.
pub fn standardize_project_name(raw: &str, location: Location) -> String {
    let lower = raw.to_lowercase();

    match canonical_alias(&lower) {
        Some((canonical, alias_loc)) => {
            if location.is_known_plot() && alias_loc != location {
                warn!(
                    "project '{}' names plot {} but scan was collected at {}, renaming",
                    raw, alias_loc, location
                );
                location.as_static_str().to_owned()
            } else {
                canonical.to_owned()
            }
        }
        None => {
            if location.is_known_plot() {
                warn!(
                    "unrecognized project '{}', prefixing with location {}",
                    raw, location
                );
                format!("{}_{}", location, raw)
            } else {
                // Nothing better to rename to.
                raw.to_owned()
            }
        }
    }
}

/// Convert replication labels to standardized target names.
///
/// Corn and soybean are the fully supported targets, with water and bare
/// soil recognized as well. Unmatched labels contribute nothing.
pub fn reps_to_targets<'a>(reps: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut targets: Vec<String> = vec![];

    for rep in reps {
        let rep = rep.to_lowercase();

        let target = if rep.contains("corn") {
            Some("Corn")
        } else if rep.contains("soy") || rep.contains("bean") {
            Some("Soybean")
        } else if rep == "water" || rep == "clearwater" {
            Some("Water")
        } else if rep == "soil" || rep == "baresoil" {
            Some("Soil")
        } else {
            None
        };

        if let Some(target) = target {
            if !targets.iter().any(|t| t == target) {
                targets.push(target.to_owned());
            }
        }
    }

    targets
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_filename_is_authoritative() {
        assert!(is_cal_scan("corn east", "scan012.Cal.Upwelling"));
        assert!(is_cal_scan("panel", "scan012.Upwelling"));
        assert!(is_cal_scan("CAL", "scan012.Ref.Upwelling"));
        assert!(!is_cal_scan("corn east", "scan012.Upwelling"));
    }

    #[test]
    fn test_standardize_recognized_alias() {
        assert_eq!(
            standardize_project_name("cspo1", Location::Csp01),
            "CSP01"
        );
        assert_eq!(
            standardize_project_name("carbon2", Location::Csp02),
            "CSP02"
        );
        assert_eq!(
            standardize_project_name("csp1brdf", Location::Csp01),
            "CSP01_BDRF"
        );
    }

    #[test]
    fn test_standardize_mismatched_plot() {
        // Label says plot 1, coordinates resolved to plot 2.
        assert_eq!(
            standardize_project_name("cspo1", Location::Csp02),
            "CSP02"
        );
    }

    #[test]
    fn test_standardize_unrecognized() {
        assert_eq!(
            standardize_project_name("fieldday", Location::Csp03),
            "CSP03_fieldday"
        );
        // No plot to rename to, keep what was typed.
        assert_eq!(
            standardize_project_name("fieldday", Location::Unknown),
            "fieldday"
        );
    }

    #[test]
    fn test_reps_to_targets() {
        let reps = ["corn west", "corn east", "soybean 1", "baresoil", "CAL"];
        let targets = reps_to_targets(reps.iter().copied());
        assert_eq!(targets, ["Corn", "Soybean", "Soil"]);
    }
}

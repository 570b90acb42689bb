//! Resolving the physical plot a scan was collected at.
//!
//! GPS coordinates are authoritative when present, but many seasons were
//! collected with the receiver off or misbehaving, so a project-name fallback
//! covers the rest. Plot rectangles are disjoint by design and checked in a
//! fixed order.

use log::warn;
use strum_macros::{EnumIter, EnumString};

/// The research plots data was collected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter)]
pub enum Location {
    /// Carbon Sequestration Program plot 1.
    #[strum(serialize = "CSP01")]
    Csp01,
    /// Carbon Sequestration Program plot 2.
    #[strum(serialize = "CSP02")]
    Csp02,
    /// Carbon Sequestration Program plot 3.
    #[strum(serialize = "CSP03")]
    Csp03,
    /// The annex north of plot 3.
    #[strum(serialize = "CSP03A")]
    Csp03A,
    /// Somewhere at the Mead site, but not a recognized plot.
    #[strum(serialize = "MEAD")]
    Mead,
    /// Location could not be determined.
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

impl Location {
    /// The canonical name used in directory trees and metadata.
    pub fn as_static_str(self) -> &'static str {
        use Location::*;

        match self {
            Csp01 => "CSP01",
            Csp02 => "CSP02",
            Csp03 => "CSP03",
            Csp03A => "CSP03A",
            Mead => "MEAD",
            Unknown => "UNKNOWN",
        }
    }

    /// True for the geofenced plots with known ground characteristics.
    pub fn is_known_plot(self) -> bool {
        match self {
            Location::Csp01 | Location::Csp02 | Location::Csp03 | Location::Csp03A => true,
            Location::Mead | Location::Unknown => false,
        }
    }

    /// Country constant for this archive.
    pub fn country(self) -> &'static str {
        match self {
            Location::Unknown => "Unknown",
            _ => "United States",
        }
    }

    /// State constant for this archive.
    pub fn state(self) -> &'static str {
        match self {
            Location::Unknown => "Unknown",
            _ => "Nebraska",
        }
    }

    /// County constant for this archive.
    pub fn county(self) -> &'static str {
        match self {
            Location::Unknown => "Unknown",
            _ => "Saunders",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_static_str())
    }
}

struct Fence {
    location: Location,
    lat: (f64, f64),
    lon: (f64, f64),
}

impl Fence {
    fn contains(&self, lat: f64, lon: f64) -> bool {
        self.lat.0 <= lat && lat <= self.lat.1 && self.lon.0 <= lon && lon <= self.lon.1
    }
}

// Surveyed plot rectangles. CSP03A is tested before CSP03 because the annex
// abuts the north edge of the plot 3 rectangle.
const FENCES: [Fence; 4] = [
    Fence {
        location: Location::Csp01,
        lat: (41.161_607, 41.169_437),
        lon: (-96.483_063, -96.473_15),
    },
    Fence {
        location: Location::Csp02,
        lat: (41.161_405, 41.168_761),
        lon: (-96.473_668, -96.463_818),
    },
    Fence {
        location: Location::Csp03A,
        lat: (41.175_47, 41.179_3),
        lon: (-96.444_978, -96.434_75),
    },
    Fence {
        location: Location::Csp03,
        lat: (41.179_37, 41.183),
        lon: (-96.444_94, -96.434_65),
    },
];

fn location_for_project(project: &str) -> Option<Location> {
    let project = project.to_lowercase();
    let project = project.as_str();

    let sets: [(&[&str], Location); 4] = [
        (
            &[
                "csp01",
                "cspo1",
                "csp1",
                "bidirectionalcsp01",
                "carbon1",
                "cspg01",
                "cps01",
            ],
            Location::Csp01,
        ),
        (
            &[
                "csp02",
                "cspo2",
                "csp2",
                "bidirectionalcsp02",
                "carbon2",
                "cspg02",
                "cps02",
                "csp2brdf",
            ],
            Location::Csp02,
        ),
        (
            &["csp03", "cspo3", "cspg03", "bidirectionalcsp03", "cps03"],
            Location::Csp03,
        ),
        (
            &["csp03a", "cspo3a", "csp3_a", "cspg03a"],
            Location::Csp03A,
        ),
    ];

    for (names, location) in sets.iter() {
        if names.contains(&project) {
            return Some(*location);
        }
    }

    if project.contains("mead") || project.contains("csp") || project.contains("cps") {
        return Some(Location::Mead);
    }

    None
}

/// Determine the plot a single scan belongs to.
///
/// Geographic bounds win when both coordinates are present and parseable,
/// then the project name, then [`Location::Unknown`] with a diagnostic.
pub fn classify(lat: &str, lon: &str, project: &str) -> Location {
    let coords = match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Some((lat, lon)),
        _ => None,
    };

    if let Some((lat, lon)) = coords {
        for fence in FENCES.iter() {
            if fence.contains(lat, lon) {
                return fence.location;
            }
        }
    }

    match location_for_project(project) {
        Some(location) => location,
        None => {
            warn!("location for project '{}' not determined", project);
            Location::Unknown
        }
    }
}

/// Determine the plot for a group of scans from their mean coordinates.
///
/// Empty cells and sentinel values are skipped before averaging, matching
/// how grouped legacy data was classified.
pub fn classify_mean(lats: &[String], lons: &[String], project: &str) -> Location {
    let lats: Vec<f64> = lats
        .iter()
        .filter_map(|val| val.parse().ok())
        .filter(|&val: &f64| val != crate::datalogger::NODATA_F64)
        .collect();
    let lons: Vec<f64> = lons
        .iter()
        .filter_map(|val| val.parse().ok())
        .filter(|&val: &f64| val != crate::datalogger::NODATA_F64)
        .collect();

    if lats.is_empty() || lons.is_empty() {
        return classify("", "", project);
    }

    let lat = lats.iter().sum::<f64>() / lats.len() as f64;
    let lon = lons.iter().sum::<f64>() / lons.len() as f64;

    classify(&lat.to_string(), &lon.to_string(), project)
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_geofence_beats_project_name() {
        assert_eq!(classify("41.165", "-96.478", "x"), Location::Csp01);
        assert_eq!(classify("41.165", "-96.470", "csp01"), Location::Csp02);
    }

    #[test]
    fn test_project_name_fallback() {
        assert_eq!(classify("", "", "csp02"), Location::Csp02);
        assert_eq!(classify("", "", "CSPO3A"), Location::Csp03A);
        assert_eq!(classify("", "", "Mead tower"), Location::Mead);
        assert_eq!(classify("", "", "cps_something"), Location::Mead);
    }

    #[test]
    fn test_unknown_location() {
        assert_eq!(classify("", "", "randomplot"), Location::Unknown);
        assert_eq!(Location::Unknown.country(), "Unknown");
    }

    #[test]
    fn test_out_of_fence_falls_back() {
        // Valid coordinates but outside every plot rectangle.
        assert_eq!(classify("40.0", "-95.0", "csp01"), Location::Csp01);
        assert_eq!(classify("40.0", "-95.0", "elsewhere"), Location::Unknown);
    }

    #[test]
    fn test_csp03a_priority() {
        assert_eq!(classify("41.177", "-96.440", "x"), Location::Csp03A);
        assert_eq!(classify("41.180", "-96.440", "x"), Location::Csp03);
    }

    #[test]
    fn test_classify_mean_skips_empty_cells() {
        let lats = vec!["".to_owned(), "41.165".to_owned()];
        let lons = vec!["".to_owned(), "-96.478".to_owned()];
        assert_eq!(classify_mean(&lats, &lons, "x"), Location::Csp01);
    }

    #[test]
    fn test_constants() {
        assert_eq!(Location::Csp01.as_static_str(), "CSP01");
        assert_eq!(Location::Csp01.state(), "Nebraska");
        assert_eq!(Location::Mead.county(), "Saunders");
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::predict::error::PredictError;
use crate::predict::propagation::Propagator;

/// A catalogued satellite and its brightness calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Satellite {
    pub name: String,
    pub title: String,
    #[schema(value_type = Vec<String>)]
    pub tle: [String; 2],
    /// Magnitude at 1000 km range and 90° phase
    #[serde(alias = "stdMag")]
    pub std_mag: f64,
    #[serde(
        default,
        alias = "launchDate",
        deserialize_with = "deserialize_launch_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub launch_date: Option<DateTime<Utc>>,
    /// Inactive satellites are only predicted when asked for by name
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Satellites by name, plus the propagation handles built from them so far
#[derive(Default)]
pub struct SatelliteCatalog {
    satellites: Vec<Satellite>,
    propagators: HashMap<String, Arc<Propagator>>,
}

impl SatelliteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_satellites(satellites: Vec<Satellite>) -> Self {
        let mut catalog = Self::new();
        for satellite in satellites {
            catalog.insert(satellite);
        }
        catalog
    }

    /// Add a satellite, replacing any entry with the same name
    pub fn insert(&mut self, satellite: Satellite) {
        self.propagators.remove(&satellite.name);
        match self.satellites.iter_mut().find(|s| s.name == satellite.name) {
            Some(existing) => *existing = satellite,
            None => self.satellites.push(satellite),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.name == name)
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn active_names(&self) -> Vec<String> {
        self.satellites
            .iter()
            .filter(|s| s.active)
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Cached propagation handle for `name`, built on first use
    pub fn propagator(&mut self, name: &str) -> Result<Arc<Propagator>, PredictError> {
        if let Some(propagator) = self.propagators.get(name) {
            return Ok(propagator.clone());
        }

        let satellite = self
            .get(name)
            .ok_or_else(|| PredictError::UnknownSatellite(name.to_string()))?;
        let propagator = Arc::new(Propagator::from_tle(
            &satellite.name,
            &satellite.tle[0],
            &satellite.tle[1],
        )?);
        self.propagators
            .insert(name.to_string(), propagator.clone());
        Ok(propagator)
    }

    #[cfg(test)]
    pub fn is_cached(&self, name: &str) -> bool {
        self.propagators.contains_key(name)
    }

    /// Add every satellite found in `*.tle`/`*.txt` files of a directory.
    ///
    /// Files that fail to parse are skipped. Returns the number of
    /// satellites added.
    pub fn load_tle_folder(
        &mut self,
        dir: &Path,
        default_std_mag: f64,
    ) -> Result<usize, PredictError> {
        if !dir.exists() {
            return Err(PredictError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut added = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .is_some_and(|ext| ext == "tle" || ext == "txt");
            if !path.is_file() || !is_tle {
                continue;
            }

            match parse_tle_file(&path, default_std_mag) {
                Ok(entries) => {
                    for (satellite, propagator) in entries {
                        let name = satellite.name.clone();
                        self.insert(satellite);
                        self.propagators.insert(name, Arc::new(propagator));
                        added += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                }
            }
        }

        log::info!("Loaded {} satellites from {}", added, dir.display());
        Ok(added)
    }
}

/// Parse a TLE file; one bad element set rejects the whole file
fn parse_tle_file(
    path: &Path,
    std_mag: f64,
) -> Result<Vec<(Satellite, Propagator)>, PredictError> {
    let content = fs::read_to_string(path)?;

    tle_sets(&content)
        .into_iter()
        .map(|set| {
            let name = set
                .name
                .map_or_else(|| format!("NORAD {}", norad_id(set.line1)), str::to_string);
            let propagator = Propagator::from_tle(&name, set.line1, set.line2)?;
            let satellite = Satellite {
                title: name.clone(),
                name,
                tle: [set.line1.to_string(), set.line2.to_string()],
                std_mag,
                launch_date: None,
                active: true,
            };
            Ok((satellite, propagator))
        })
        .collect()
}

fn norad_id(line1: &str) -> &str {
    line1.get(2..7).map(str::trim).unwrap_or("?")
}

/// One element set as it appears in a TLE file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TleSet<'a> {
    name: Option<&'a str>,
    line1: &'a str,
    line2: &'a str,
}

fn is_element_line(line: &str, number: u8) -> bool {
    line.as_bytes().starts_with(&[number, b' '])
}

/// Element sets of a file in order, with or without a name line.
/// Lines that belong to no set are ignored.
fn tle_sets(content: &str) -> Vec<TleSet<'_>> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let is_pair = |line1: &str, line2: &str| {
        is_element_line(line1, b'1') && is_element_line(line2, b'2')
    };

    let mut sets = Vec::new();
    let mut rest = lines.as_slice();
    loop {
        rest = match *rest {
            [line1, line2, ref tail @ ..] if is_pair(line1, line2) => {
                sets.push(TleSet {
                    name: None,
                    line1,
                    line2,
                });
                tail
            }
            [name, line1, line2, ref tail @ ..] if is_pair(line1, line2) => {
                // Name lines of 3LE files may carry a "0 " prefix
                let name = name.strip_prefix("0 ").unwrap_or(name).trim();
                sets.push(TleSet {
                    name: Some(name),
                    line1,
                    line2,
                });
                tail
            }
            [_, ref tail @ ..] => tail,
            [] => break,
        };
    }

    sets
}

fn deserialize_launch_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_launch_date(&s).map(Some).map_err(serde::de::Error::custom)
}

/// `YYYY-MM-DD` (UTC midnight) or RFC 3339
pub fn parse_launch_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid launch date {:?}: {}", s, e))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::predict::propagation::tests::{ISS_LINE1, ISS_LINE2};
    use chrono::TimeZone;

    pub fn iss_satellite() -> Satellite {
        Satellite {
            name: "iss".to_string(),
            title: "ISS".to_string(),
            tle: [ISS_LINE1.to_string(), ISS_LINE2.to_string()],
            std_mag: -1.8,
            launch_date: None,
            active: true,
        }
    }

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("sat-sighting-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn deserializes_yaml_records() {
        let yaml = format!(
            r#"
- name: starlink2
  title: Starlink-2
  tle: ["{l1}", "{l2}"]
  stdMag: 1.4
  launchDate: "2020-04-22"
- name: iss
  title: ISS
  tle: ["{l1}", "{l2}"]
  std_mag: -1.8
  active: false
"#,
            l1 = ISS_LINE1,
            l2 = ISS_LINE2
        );
        let satellites: Vec<Satellite> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(satellites.len(), 2);
        assert_eq!(satellites[0].std_mag, 1.4);
        assert_eq!(
            satellites[0].launch_date,
            Some(Utc.with_ymd_and_hms(2020, 4, 22, 0, 0, 0).unwrap())
        );
        assert_eq!(satellites[1].launch_date, None);
        assert!(satellites[0].active);
        assert!(!satellites[1].active);
    }

    #[test]
    fn launch_date_formats() {
        assert_eq!(
            parse_launch_date("2020-04-22T14:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2020, 4, 22, 12, 30, 0).unwrap()
        );
        assert!(parse_launch_date("April 22").is_err());
    }

    #[test]
    fn caches_propagators() {
        let mut catalog = SatelliteCatalog::from_satellites(vec![iss_satellite()]);
        assert!(!catalog.is_cached("iss"));

        let first = catalog.propagator("iss").unwrap();
        let second = catalog.propagator("iss").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(catalog.is_cached("iss"));
    }

    #[test]
    fn replacing_a_satellite_drops_its_handle() {
        let mut catalog = SatelliteCatalog::from_satellites(vec![iss_satellite()]);
        catalog.propagator("iss").unwrap();

        let mut updated = iss_satellite();
        updated.std_mag = -2.0;
        catalog.insert(updated);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("iss").unwrap().std_mag, -2.0);
        assert!(!catalog.is_cached("iss"));
    }

    #[test]
    fn unknown_and_malformed_satellites() {
        let mut broken = iss_satellite();
        broken.name = "broken".to_string();
        broken.tle[0] = "1 garbage".to_string();
        let mut catalog = SatelliteCatalog::from_satellites(vec![iss_satellite(), broken]);

        assert!(matches!(
            catalog.propagator("nope"),
            Err(PredictError::UnknownSatellite(_))
        ));
        assert!(matches!(
            catalog.propagator("broken"),
            Err(PredictError::InvalidTle { .. })
        ));
        assert!(catalog.propagator("iss").is_ok());
    }

    #[test]
    fn splits_two_and_three_line_sets() {
        let content = format!(
            "0 ISS (ZARYA)\n{l1}\n{l2}\n\n{l1}\n{l2}\njunk\n",
            l1 = ISS_LINE1,
            l2 = ISS_LINE2
        );
        let sets = tle_sets(&content);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, Some("ISS (ZARYA)"));
        assert_eq!(sets[0].line2, ISS_LINE2);
        assert_eq!(sets[1].name, None);
        assert_eq!(norad_id(sets[1].line1), "25544");
    }

    #[test]
    fn loads_tle_folder_and_skips_bad_files() {
        let dir = scratch_dir("tle");
        fs::write(
            dir.join("stations.tle"),
            format!("ISS (ZARYA)\n{}\n{}\n", ISS_LINE1, ISS_LINE2),
        )
        .unwrap();
        fs::write(
            dir.join("broken.txt"),
            format!("BAD\n{}\n{}\n", ISS_LINE1, "2 25544  51.6461 garbage"),
        )
        .unwrap();
        fs::write(dir.join("notes.md"), "ignored").unwrap();

        let mut catalog = SatelliteCatalog::new();
        let added = catalog.load_tle_folder(&dir, 3.5).unwrap();

        assert_eq!(added, 1);
        let iss = catalog.get("ISS (ZARYA)").unwrap();
        assert_eq!(iss.std_mag, 3.5);
        assert!(catalog.is_cached("ISS (ZARYA)"));
        assert!(catalog.get("BAD").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_folder_is_an_error() {
        let mut catalog = SatelliteCatalog::new();
        let result = catalog.load_tle_folder(Path::new("/nonexistent/sat-sighting"), 4.0);
        assert!(matches!(result, Err(PredictError::DirectoryNotFound(_))));
    }
}

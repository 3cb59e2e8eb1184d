use crate::evaluation::Snapshot;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Error, Write};
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CurveFormat {
    Csv,
    Tsv,
    Json,
}

const FIXED_COLUMNS: [&str; 5] = ["instances_seen", "accuracy", "kappa", "ram_hours", "seconds"];

/// Snapshots collected over a run, oldest first.
#[derive(Clone, Debug, Default)]
pub struct LearningCurve {
    entries: Vec<Snapshot>,
}

impl LearningCurve {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn export<P: AsRef<Path>>(&self, path: P, format: CurveFormat) -> Result<(), Error> {
        let mut out = BufWriter::new(File::create(path)?);
        match format {
            CurveFormat::Csv => self.write_delimited(&mut out, ',')?,
            CurveFormat::Tsv => self.write_delimited(&mut out, '\t')?,
            CurveFormat::Json => serde_json::to_writer_pretty(&mut out, &self.entries)
                .map_err(Error::other)?,
        }
        out.flush()
    }

    /// One row per snapshot. Extras missing from a row are left blank so that
    /// measurements appearing late in a run still line up.
    fn write_delimited<W: Write>(&self, out: &mut W, separator: char) -> Result<(), Error> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let extras: BTreeSet<&str> = self
            .entries
            .iter()
            .flat_map(|s| s.extras.keys().map(String::as_str))
            .collect();

        let header: Vec<&str> = FIXED_COLUMNS
            .iter()
            .copied()
            .chain(extras.iter().copied())
            .collect();
        writeln!(out, "{}", header.join(&separator.to_string()))?;

        for snapshot in &self.entries {
            let mut row = vec![
                snapshot.instances_seen.to_string(),
                snapshot.accuracy.to_string(),
                snapshot.kappa.to_string(),
                snapshot.ram_hours.to_string(),
                snapshot.seconds.to_string(),
            ];
            row.extend(
                extras
                    .iter()
                    .map(|name| snapshot.extras.get(*name).map_or(String::new(), f64::to_string)),
            );
            writeln!(out, "{}", row.join(&separator.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::str::FromStr;
    use tempfile::NamedTempFile;

    fn snapshot(seen: u64, extras: &[(&str, f64)]) -> Snapshot {
        Snapshot {
            instances_seen: seen,
            accuracy: 0.75,
            kappa: 0.5,
            ram_hours: 0.0,
            seconds: 0.5,
            extras: extras
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn curve() -> LearningCurve {
        let mut curve = LearningCurve::default();
        curve.push(snapshot(100, &[("nodes", 1.0)]));
        curve.push(snapshot(200, &[("leaves", 2.0), ("nodes", 3.0)]));
        curve
    }

    #[test]
    fn test_csv_has_union_of_extras() {
        let file = NamedTempFile::new().unwrap();
        curve().export(file.path(), CurveFormat::Csv).unwrap();
        let text = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "instances_seen,accuracy,kappa,ram_hours,seconds,leaves,nodes"
        );
        assert_eq!(lines[1], "100,0.75,0.5,0,0.5,,1");
        assert_eq!(lines[2], "200,0.75,0.5,0,0.5,2,3");
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let file = NamedTempFile::new().unwrap();
        curve().export(file.path(), CurveFormat::Tsv).unwrap();
        let text = fs::read_to_string(file.path()).unwrap();
        assert!(text.lines().next().unwrap().starts_with("instances_seen\taccuracy"));
    }

    #[test]
    fn test_json_is_an_array_of_snapshots() {
        let file = NamedTempFile::new().unwrap();
        curve().export(file.path(), CurveFormat::Json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["instances_seen"], 200);
        assert_eq!(entries[1]["extras"]["leaves"], 2.0);
    }

    #[test]
    fn test_format_names_parse() {
        assert_eq!(CurveFormat::from_str("tsv").ok(), Some(CurveFormat::Tsv));
        assert_eq!(CurveFormat::Json.to_string(), "json");
        assert!(curve().latest().is_some_and(|s| s.instances_seen == 200));
    }
}

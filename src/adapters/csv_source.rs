//! Reads a sensor-log CSV one record at a time and projects each row into
//! an [`InputSample`] via [`HasInputFields`], so the whole pipeline stays
//! streaming with bounded memory (§4.8 of the design).
//!
//! Columns `time,altitude,north_speed,east_speed,vertical_speed` are
//! required; any other columns are captured verbatim into `extra` and
//! carried through unchanged as part of the opaque `source` payload.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use csv::DeserializeRecordsIntoIter;
use serde::{Deserialize, Serialize};

use crate::sample::{HasInputFields, InputSample, RawFields};

/// One deserialized sensor-log row. `time` is wall-clock seconds; the
/// engine only ever needs `Timestamp::seconds_since`, which `f64` already
/// implements directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    pub time: f64,
    pub altitude: f64,
    pub north_speed: f64,
    pub east_speed: f64,
    pub vertical_speed: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl HasInputFields<f64> for CsvRow {
    fn input_fields(&self) -> RawFields<f64> {
        RawFields {
            time: self.time,
            altitude: self.altitude,
            north_speed: self.north_speed,
            east_speed: self.east_speed,
            vertical_speed: self.vertical_speed,
        }
    }
}

impl CsvRow {
    /// The columns an [`crate::adapters::sink::OutputSink`] mirrors back
    /// into the annotated output: the five known fields in a stable
    /// order, then any passthrough columns sorted by header name.
    pub fn passthrough_columns(&self) -> Vec<(String, String)> {
        let mut columns = vec![
            ("time".to_string(), self.time.to_string()),
            ("altitude".to_string(), self.altitude.to_string()),
            ("north_speed".to_string(), self.north_speed.to_string()),
            ("east_speed".to_string(), self.east_speed.to_string()),
            ("vertical_speed".to_string(), self.vertical_speed.to_string()),
        ];
        columns.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        columns
    }
}

/// Streams one file's rows as `InputSample<f64, CsvRow>`, one record at a
/// time, never holding the whole file in memory.
pub struct CsvSampleSource {
    records: DeserializeRecordsIntoIter<BufReader<File>, CsvRow>,
}

impl CsvSampleSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let reader = csv::Reader::from_reader(BufReader::new(file));
        Ok(Self {
            records: reader.into_deserialize(),
        })
    }
}

impl Iterator for CsvSampleSource {
    type Item = Result<InputSample<f64, CsvRow>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.next()? {
            Ok(row) => {
                let fields = row.input_fields();
                Some(Ok(InputSample::from_fields(fields, row)))
            }
            Err(err) => Some(Err(anyhow::Error::new(err).context("parsing CSV row"))),
        }
    }
}

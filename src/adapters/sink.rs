//! Writes annotated [`Output`] rows back out, either as CSV (mirroring
//! the input's passthrough columns plus the four event/phase columns) or
//! as newline-delimited JSON, selected by CLI flag (§4.8, §6).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::csv_source::CsvRow;
use crate::events::{FlightEvent, FlightPhase};
use crate::output::Output;

pub enum OutputSink {
    Csv {
        writer: csv::Writer<Box<dyn Write>>,
        header_written: bool,
    },
    Ndjson {
        writer: Box<dyn Write>,
    },
}

impl OutputSink {
    pub fn csv_to_path(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self::csv_to_writer(Box::new(BufWriter::new(file))))
    }

    pub fn csv_to_stdout() -> Self {
        Self::csv_to_writer(Box::new(io::stdout()))
    }

    fn csv_to_writer(writer: Box<dyn Write>) -> Self {
        Self::Csv {
            writer: csv::Writer::from_writer(writer),
            header_written: false,
        }
    }

    pub fn ndjson_to_path(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self::Ndjson {
            writer: Box::new(BufWriter::new(file)),
        })
    }

    pub fn ndjson_to_stdout() -> Self {
        Self::Ndjson {
            writer: Box::new(io::stdout()),
        }
    }

    /// Write one annotated row. `output.source` supplies the passthrough
    /// columns for the CSV format; the NDJSON format serializes `Output`
    /// (and therefore its flattened `source`) directly.
    pub fn write_row(&mut self, output: &Output<CsvRow>) -> Result<()> {
        match self {
            OutputSink::Csv { writer, header_written } => {
                let passthrough = output.source.passthrough_columns();
                if !*header_written {
                    let mut header: Vec<String> =
                        passthrough.iter().map(|(key, _)| key.clone()).collect();
                    header.extend(EVENT_COLUMNS.iter().map(|c| c.to_string()));
                    writer.write_record(&header).context("writing CSV header")?;
                    *header_written = true;
                }
                let mut record: Vec<String> = passthrough.into_iter().map(|(_, v)| v).collect();
                record.push(phase_label(output.phase).to_string());
                push_event(&mut record, output.events.takeoff);
                push_event(&mut record, output.events.freefall);
                push_event(&mut record, output.events.canopy);
                push_event(&mut record, output.events.landing);
                writer.write_record(&record).context("writing CSV row")
            }
            OutputSink::Ndjson { writer } => write_ndjson_row(writer, output),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self {
            OutputSink::Csv { writer, .. } => writer.flush().context("flushing CSV output"),
            OutputSink::Ndjson { writer } => writer.flush().context("flushing NDJSON output"),
        }
    }
}

const EVENT_COLUMNS: [&str; 9] = [
    "phase",
    "takeoff_index",
    "takeoff_altitude",
    "freefall_index",
    "freefall_altitude",
    "canopy_index",
    "canopy_altitude",
    "landing_index",
    "landing_altitude",
];

fn write_ndjson_row(writer: &mut Box<dyn Write>, output: &Output<CsvRow>) -> Result<()> {
    let mut serializer = serde_json::Serializer::new(&mut *writer);
    output.serialize(&mut serializer).context("serializing NDJSON row")?;
    writer.write_all(b"\n").context("writing NDJSON newline")
}

fn push_event(record: &mut Vec<String>, event: Option<FlightEvent>) {
    match event {
        Some(event) => {
            record.push(event.index.to_string());
            record.push(event.altitude.to_string());
        }
        None => {
            record.push(String::new());
            record.push(String::new());
        }
    }
}

fn phase_label(phase: FlightPhase) -> &'static str {
    match phase {
        FlightPhase::BeforeTakeoff => "before_takeoff",
        FlightPhase::Climbing => "climbing",
        FlightPhase::Freefall => "freefall",
        FlightPhase::UnderCanopy => "under_canopy",
        FlightPhase::Landed => "landed",
    }
}

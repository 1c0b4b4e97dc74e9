//! Streaming loader for OpenFlights-style airport datasets.
//!
//! The dataset is a comma-delimited text file, one airport per row, with
//! double-quoted string fields and backslash escapes:
//!
//! ```text
//! 3577,"Boeing Field King County Intl","Seattle","United States","BFI","KBFI",47.53,-122.302,21,...
//! ```
//!
//! [`AirportReader`] yields records lazily, one per line, surfacing a
//! per-record error for malformed rows instead of aborting the stream. The
//! reader owns its input, so dropping it (normal exhaustion, early break, or
//! an error) releases the underlying file either way. Files ending in `.gz`
//! are decompressed transparently.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::airport::Airport;
use crate::error::{NearportError, Result};
use crate::geodetic::Point;

/// Column count up to and including the elevation field; trailing columns
/// (timezone, DST, type, source) are tolerated but unused.
const MIN_FIELDS: usize = 9;

/// Lazy iterator of [`Airport`] records over a delimited reader.
pub struct AirportReader<R> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R: BufRead> AirportReader<R> {
    /// Wrap a buffered reader positioned at the first record.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }
}

impl AirportReader<BufReader<Box<dyn Read>>> {
    /// Open a dataset file, decompressing it when the extension is `.gz`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let raw: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            log::debug!("reading gzip-compressed dataset from {}", path.display());
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(BufReader::new(raw)))
    }
}

impl<R: BufRead> Iterator for AirportReader<R> {
    type Item = Result<Airport>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            let line = self.buffer.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            return Some(parse_record(self.line, line));
        }
    }
}

/// Load every well-formed airport that carries a three-letter IATA code and
/// valid coordinates, paired with its validated position.
///
/// Malformed rows and rows with out-of-range coordinates are logged and
/// skipped; I/O failures abort the load.
///
/// # Errors
///
/// Returns [`NearportError::Io`] when the file cannot be opened or read.
pub fn read_airports<P: AsRef<Path>>(path: P) -> Result<Vec<(Point, Airport)>> {
    let mut airports = Vec::new();
    let mut skipped = 0usize;
    for record in AirportReader::open(path)? {
        let airport = match record {
            Ok(airport) => airport,
            Err(e @ NearportError::Io(_)) => return Err(e),
            Err(e) => {
                log::warn!("skipping unparseable airport record: {}", e);
                skipped += 1;
                continue;
            }
        };
        if !airport.has_iata() {
            continue;
        }
        match airport.position() {
            Ok(point) => airports.push((point, airport)),
            Err(e) => {
                log::warn!("skipping airport {:?}: {}", airport.iata, e);
                skipped += 1;
            }
        }
    }
    log::debug!(
        "loaded {} airports ({} records skipped)",
        airports.len(),
        skipped
    );
    Ok(airports)
}

fn parse_record(line_no: usize, line: &str) -> Result<Airport> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return Err(NearportError::InvalidRecord {
            line: line_no,
            message: format!("expected at least {} fields, got {}", MIN_FIELDS, fields.len()),
        });
    }

    let number = |index: usize, what: &str| -> Result<f64> {
        fields[index]
            .parse::<f64>()
            .map_err(|_| NearportError::InvalidRecord {
                line: line_no,
                message: format!("unparseable {}: {:?}", what, fields[index]),
            })
    };

    let airport_id = fields[0]
        .parse::<u64>()
        .map_err(|_| NearportError::InvalidRecord {
            line: line_no,
            message: format!("unparseable airport id: {:?}", fields[0]),
        })?;

    Ok(Airport {
        airport_id,
        name: fields[1].clone(),
        city: fields[2].clone(),
        country: fields[3].clone(),
        iata: fields[4].clone(),
        icao: fields[5].clone(),
        latitude: number(6, "latitude")?,
        longitude: number(7, "longitude")?,
        elevation_ft: number(8, "elevation")?,
    })
}

/// Split one delimited row into fields, honoring double quotes and
/// backslash escapes inside quoted fields.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    field.push(escaped);
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

//! Find the nearest airports to a point.
//!
//! With a dataset path, loads an OpenFlights-style airports file (optionally
//! gzip compressed); without one, falls back to a small built-in set.
//!
//! ```text
//! cargo run --example nearest_airport -- [airports.dat[.gz]]
//! ```

use nearport::{Airport, Point, RTree, read_airports};

fn builtin_airports() -> Vec<(Point, Airport)> {
    let rows = [
        (3577, "Boeing Field King County Intl", "Seattle", "United States", "BFI", "KBFI", 47.5300, -122.3020, 21.0),
        (3495, "Seattle Tacoma Intl", "Seattle", "United States", "SEA", "KSEA", 47.4490, -122.3093, 433.0),
        (6457, "Renton Municipal", "Renton", "United States", "RNT", "KRNT", 47.4931, -122.2157, 32.0),
        (3824, "Snohomish County (Paine Fld)", "Everett", "United States", "PAE", "KPAE", 47.9063, -122.2816, 606.0),
        (3131, "Bangalore Intl", "Bangalore", "India", "BLR", "VOBG", 12.9500, 77.6683, 2912.0),
    ];
    rows.into_iter()
        .map(|(airport_id, name, city, country, iata, icao, latitude, longitude, elevation_ft)| {
            let airport = Airport {
                airport_id,
                name: name.to_string(),
                city: city.to_string(),
                country: country.to_string(),
                iata: iata.to_string(),
                icao: icao.to_string(),
                latitude,
                longitude,
                elevation_ft,
            };
            let point = airport.position().expect("built-in coordinates are valid");
            (point, airport)
        })
        .collect()
}

fn main() -> nearport::Result<()> {
    env_logger::init();

    let airports = match std::env::args().nth(1) {
        Some(path) => read_airports(path)?,
        None => builtin_airports(),
    };

    let index = RTree::bulk_load(airports);
    println!("indexed {} airports", index.len());

    let office = Point::new(47.6071, -122.3381)?;
    for neighbor in index.nearest(&office, 100.0, 5) {
        println!(
            "{}  {}  ({}, {})  {:.1} km",
            neighbor.payload.iata,
            neighbor.payload.name,
            neighbor.payload.city,
            neighbor.payload.country,
            neighbor.distance_km
        );
    }
    Ok(())
}

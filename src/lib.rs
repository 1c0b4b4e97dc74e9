//! In-memory nearest-airport lookup: a bulk-loaded bounding-rectangle tree
//! over great-circle distances.
//!
//! ```rust
//! use nearport::{Point, RTree};
//!
//! let index = RTree::bulk_load(vec![
//!     (Point::new(47.5300, -122.3020)?, "BFI"),
//!     (Point::new(13.1979, 77.7063)?, "BLR"),
//! ]);
//!
//! let office = Point::new(47.6071, -122.3381)?;
//! let nearest = index.nearest(&office, 10.0, 1);
//! assert_eq!(nearest[0].payload, &"BFI");
//! # Ok::<(), nearport::NearportError>(())
//! ```
//!
//! The index is built once from a complete collection of entries and never
//! mutated afterwards, so queries need no locking and may run concurrently
//! from any number of threads.

pub mod airport;
pub mod dataset;
pub mod error;
pub mod geodetic;
pub mod rtree;

pub use airport::Airport;
pub use dataset::{AirportReader, read_airports};
pub use error::{NearportError, Result};
pub use geodetic::{Geodetic, Point};
pub use rtree::{Neighbor, RTree};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{NearportError, Result};

    pub use crate::{Geodetic, Point};

    pub use crate::{Neighbor, RTree};

    pub use crate::{Airport, AirportReader, read_airports};
}

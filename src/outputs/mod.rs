//! Output writers.
//!
//! - [`table`]: CSV file of the index entries, one per fetch mode
//!
//! ```text
//! output_dir/
//! ├── thNewsRequests.csv   # index scraped by direct request
//! └── thNewsSelenium.csv   # index scraped through a browser
//! ```

pub mod table;

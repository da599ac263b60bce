/// This module provides the CSV item writer of the export engine.
pub mod csv;

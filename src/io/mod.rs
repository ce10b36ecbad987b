// External I/O operations module
pub mod gpsd; // GPS fixes from a gpsd daemon
pub mod signals; // Unix signal handling

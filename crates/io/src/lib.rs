// File I/O operations

pub mod csv;

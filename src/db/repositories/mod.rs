mod log_rows;
mod runs;

// Dataset columns: timestamp, user, x, y, color index, then anything else
pub const TIMESTAMP_COLUMN: usize = 0;
pub const X_COLUMN: usize = 2;
pub const Y_COLUMN: usize = 3;
pub const COLOR_COLUMN: usize = 4;

// The trailing timezone abbreviation is split off before parsing
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub const MIN_LABEL_WIDTH: usize = 3;
pub const FRAME_EXTENSION: &str = "png";

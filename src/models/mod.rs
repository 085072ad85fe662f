pub mod place;
pub mod prayer;

pub use place::{Coordinates, Place, MECCA};
pub use prayer::{PrayerName, RawTimings};

mod finder;
mod table;

pub use finder::{SubstituteCandidate, SubstituteFinder};
pub use table::{SubstituteEntry, SubstituteSource, SubstituteTable};

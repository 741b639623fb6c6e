pub mod beam;
pub mod fields;

pub use beam::{BeamInfo, BeamIq, PolarizationMode};
pub use fields::Fields;

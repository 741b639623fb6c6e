pub mod complex;
pub mod fft;
pub mod stats;
pub mod window;

pub use fft::FftHelper;
pub use stats::StatsHelper;
pub use window::WindowType;

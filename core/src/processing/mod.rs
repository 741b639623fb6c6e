pub mod abp;
pub mod dual_pol;
pub mod estimator;
pub mod moments_mgr;
pub mod pulse_pair;
pub mod spectral;

pub use abp::AbpEstimator;
pub use dual_pol::{fast_alt_products, DualPolProducts};
pub use estimator::build_estimator;
pub use moments_mgr::MomentsMgr;
pub use pulse_pair::PulsePairEstimator;
pub use spectral::FftEstimator;

//! Reference simulation modules: [`PreloadPredictor`] and
//! [`FrequencyCounter`].
//!
//! Neither module holds a reference to the other or to any other
//! module — per-type lookup goes through
//! [`uamp_sim_engine::SimContext::get_module_for_type`] if a future
//! module ever needs it.

mod frequency_counter;
mod preload_predictor;

pub use frequency_counter::FrequencyCounter;
pub use preload_predictor::{PreloadPredictor, PreloadPredictorConfig, PRELOAD_THRESHOLD, VERIFICATION_WINDOW_MINUTES};

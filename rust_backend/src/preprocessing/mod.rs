pub mod merge;
pub mod pipeline;

pub use merge::merge_meter_temperature;
pub use pipeline::{
    evaluate_meter_data, PipelineResult, RequestedWindow, SufficiencyPipeline,
};

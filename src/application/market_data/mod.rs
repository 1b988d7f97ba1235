pub mod candle_aggregator;
pub mod timeframe_scheduler;

pub use candle_aggregator::CandleAggregator;
pub use timeframe_scheduler::TimeframeScheduler;

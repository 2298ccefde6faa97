pub mod classifier;
pub mod replay;
pub mod sequencer;

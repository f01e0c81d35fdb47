// FlowC: Flows
// The three scheduled jobs. Every step is awaited in order; a failing
// segment substitutes its placeholder and the flow carries on.

pub mod dawn;
pub mod evening;
pub mod morning;

pub use dawn::{DawnFlow, DawnReport, HotPaperOutcome};
pub use evening::{EveningFlow, EveningReport};
pub use morning::MorningFlow;

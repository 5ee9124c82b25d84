pub mod command;
pub mod engine;
pub mod lessons;
pub mod state;
pub mod validate;
pub mod view;

pub use command::{AnnotationSpec, Command, LessonOption, PointSpec, RangeSpec, RegionSpec};
pub use engine::{BatchReport, ChartSession, ExecutionEngine, Rejection};
pub use lessons::{builtin_lessons, find_lesson};
pub use state::VisualizationState;
pub use validate::{validate, RejectReason};
pub use view::{build_view, ChartView, IndicatorView, SeriesView};

//! Charts module - Declarative chart specifications

mod chart;
mod compose;
mod encoding;
mod mark;
mod transform;
mod vegalite;

pub use chart::{Chart, RepeatCell, RepeatChart};
pub use compose::ChartSpec;
pub use encoding::{
    field, repeat, value, Aggregate, Channel, ChannelDef, Encoding, FieldDef, FieldRef, FieldType,
    RepeatRef, Scale,
};
pub use mark::{MarkDef, MarkKind};
pub use transform::{Transform, WindowOp};
pub use vegalite::{CONTINUOUS_SIZE, SCHEMA_URL};

use serde::{Deserialize, Serialize};
use super::aggregate::StrokePoint;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Command {
    /// Start a stroke at a surface-local point
    BeginStroke {
        point: StrokePoint,
    },

    /// Paint from the last point to this one
    ExtendStroke {
        point: StrokePoint,
    },

    /// Finish the current stroke
    EndStroke,

    /// Erase the surface
    Clear,

    /// Encode the surface and emit the signing payload
    Submit,

    /// Abandon signing
    Cancel,
}

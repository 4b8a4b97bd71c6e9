//! Messages exchanged with the background evaluator. The same shapes are accepted
//! by either form; only the background form actually puts them on a channel.

use super::{Deviation, StrokeEvaluation, StrokeId};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Inbound {
    #[serde(rename_all = "camelCase")]
    Init {
        #[serde(default)]
        letter: Option<String>,
        show_template: bool,
    },
    StartStroke {
        id: StrokeId,
        point: Point,
    },
    UpdateStroke {
        id: StrokeId,
        point: Point,
    },
    EndStroke {
        id: StrokeId,
    },
    CancelStroke {
        id: StrokeId,
    },
    #[serde(rename_all = "camelCase")]
    Clear {
        show_template: bool,
    },
    SetLetter {
        letter: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Outbound {
    Deviation(Deviation),
    Evaluation(StrokeEvaluation),
    /// A letter change the worker could not honour.
    Error { message: String },
}

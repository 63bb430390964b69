//! Choosing which tracked object drives guidance in a frame

use serde::{Deserialize, Serialize};

use crate::object::TrackedObject;

/// Aggregation policy over the tracked objects of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Last object in detector order
    Last,
    /// Highest confidence; ties go to the earliest
    #[default]
    MostConfident,
    /// Lowest bottom edge on screen (nearest to the camera); ties go to the earliest
    Closest,
}

impl AggregationPolicy {
    pub fn select<'a, I>(&self, candidates: I) -> Option<&'a TrackedObject>
    where
        I: IntoIterator<Item = &'a TrackedObject>,
    {
        let mut iter = candidates.into_iter();
        match self {
            AggregationPolicy::Last => iter.last(),
            AggregationPolicy::MostConfident => {
                let first = iter.next()?;
                Some(iter.fold(first, |best, obj| {
                    if obj.confidence > best.confidence {
                        obj
                    } else {
                        best
                    }
                }))
            }
            AggregationPolicy::Closest => {
                let first = iter.next()?;
                Some(iter.fold(first, |best, obj| {
                    if obj.screen_rect.bottom > best.screen_rect.bottom {
                        obj
                    } else {
                        best
                    }
                }))
            }
        }
    }
}

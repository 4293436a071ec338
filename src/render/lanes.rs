use crate::render::config::AsyncRenderConfig;

/// How a render call's index range is split across lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    /// One lane over `[0, L)`.
    Single,
    /// Lane `i` owns `{i, i + lanes, i + 2*lanes, ...}`; all lanes share one scheduling call.
    Interleaved,
    /// Lane `i` owns `[i*chunk, (i+1)*chunk)`; lanes are scheduled independently.
    Stacked,
}

/// Per-lane index mapping: `absolute = shift + local * stride`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneCtx {
    /// Lane number; the remainder lane takes the number after the main lanes.
    pub lane_id: u32,
    /// Absolute index of the lane's first frame.
    pub shift: u64,
    /// Distance between consecutive lane frames in absolute space.
    pub stride: u64,
}

impl LaneCtx {
    /// Map a lane-local index back to the absolute source index.
    pub fn absolute(self, local: u64) -> u64 {
        self.shift + local * self.stride
    }
}

/// One lane and the number of frames it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneSpec {
    /// Index mapping.
    pub ctx: LaneCtx,
    /// Frames in this lane.
    pub len: u64,
}

/// Full lane layout for a render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanePlan {
    /// Partitioning mode of the main lanes.
    pub partition: Partition,
    /// Frames per main lane (`floor(L / lanes)`).
    pub chunk: u64,
    /// Main lanes; empty when `chunk == 0`.
    pub lanes: Vec<LaneSpec>,
    /// Trailing `[chunk*lanes, L)` lane, processed after the main lanes.
    pub remainder: Option<LaneSpec>,
}

impl LanePlan {
    /// Plan `len` frames under `config` (`None` means single lane).
    pub fn new(len: u64, config: Option<&AsyncRenderConfig>) -> Self {
        let lanes = config.map(|c| c.lanes).unwrap_or(1);
        if lanes <= 1 {
            return Self {
                partition: Partition::Single,
                chunk: len,
                lanes: vec![LaneSpec {
                    ctx: LaneCtx {
                        lane_id: 0,
                        shift: 0,
                        stride: 1,
                    },
                    len,
                }],
                remainder: None,
            };
        }

        let stacked = config.is_some_and(AsyncRenderConfig::is_stacked);
        let n = u64::from(lanes);
        let chunk = len / n;
        let main_len = chunk * n;

        let main = if chunk == 0 {
            Vec::new()
        } else {
            (0..lanes)
                .map(|i| {
                    let ctx = if stacked {
                        LaneCtx {
                            lane_id: i,
                            shift: u64::from(i) * chunk,
                            stride: 1,
                        }
                    } else {
                        LaneCtx {
                            lane_id: i,
                            shift: u64::from(i),
                            stride: n,
                        }
                    };
                    LaneSpec { ctx, len: chunk }
                })
                .collect()
        };

        let remainder = (main_len < len).then_some(LaneSpec {
            ctx: LaneCtx {
                lane_id: lanes,
                shift: main_len,
                stride: 1,
            },
            len: len - main_len,
        });

        Self {
            partition: if stacked {
                Partition::Stacked
            } else {
                Partition::Interleaved
            },
            chunk,
            lanes: main,
            remainder,
        }
    }

    /// Number of lanes that will actually be scheduled, remainder included.
    pub fn scheduled_lanes(&self) -> usize {
        self.lanes.len() + usize::from(self.remainder.is_some())
    }

    /// Every absolute index the plan covers, lane by lane.
    pub fn indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.lanes
            .iter()
            .chain(self.remainder.iter())
            .flat_map(|l| (0..l.len).map(move |local| l.ctx.absolute(local)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/lanes.rs"]
mod tests;

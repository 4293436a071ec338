use super::*;

fn cfg(lanes: u32, parallel_input: bool) -> AsyncRenderConfig {
    AsyncRenderConfig {
        lanes,
        one_pixel_frame: false,
        parallel_input,
    }
}

fn sorted_indices(plan: &LanePlan) -> Vec<u64> {
    let mut v: Vec<u64> = plan.indices().collect();
    v.sort_unstable();
    v
}

#[test]
fn single_lane_for_none_and_one() {
    let p = LanePlan::new(7, None);
    assert_eq!(p.partition, Partition::Single);
    assert_eq!(p.scheduled_lanes(), 1);
    assert_eq!(p.indices().collect::<Vec<_>>(), (0..7).collect::<Vec<_>>());

    let p = LanePlan::new(7, Some(&cfg(1, true)));
    assert_eq!(p.partition, Partition::Single);
}

#[test]
fn interleaved_lanes_stride_and_remainder_tail() {
    let p = LanePlan::new(11, Some(&cfg(3, false)));
    assert_eq!(p.partition, Partition::Interleaved);
    assert_eq!(p.chunk, 3);
    let lane1: Vec<u64> = (0..p.lanes[1].len)
        .map(|l| p.lanes[1].ctx.absolute(l))
        .collect();
    assert_eq!(lane1, vec![1, 4, 7]);

    let rem = p.remainder.unwrap();
    assert_eq!(rem.ctx.shift, 9);
    assert_eq!(rem.len, 2);
    assert_eq!(rem.ctx.lane_id, 3);
}

#[test]
fn stacked_lanes_are_contiguous() {
    let p = LanePlan::new(10, Some(&cfg(4, true)));
    assert_eq!(p.partition, Partition::Stacked);
    assert_eq!(p.chunk, 2);
    assert_eq!(p.lanes[2].ctx.shift, 4);
    assert_eq!(p.lanes[2].ctx.absolute(1), 5);
    assert_eq!(p.remainder.unwrap().ctx.shift, 8);
}

#[test]
fn every_plan_covers_each_index_exactly_once() {
    for len in [0u64, 1, 2, 3, 4, 5, 9, 16, 31, 100] {
        for lanes in [1u32, 2, 3, 5, 8] {
            for stacked in [false, true] {
                let p = LanePlan::new(len, Some(&cfg(lanes, stacked)));
                assert_eq!(
                    sorted_indices(&p),
                    (0..len).collect::<Vec<_>>(),
                    "len={len} lanes={lanes} stacked={stacked}"
                );
            }
        }
    }
}

#[test]
fn more_lanes_than_frames_uses_only_remainder() {
    let p = LanePlan::new(3, Some(&cfg(5, false)));
    assert_eq!(p.chunk, 0);
    assert!(p.lanes.is_empty());
    assert_eq!(p.remainder.unwrap().len, 3);
    assert_eq!(p.scheduled_lanes(), 1);
}

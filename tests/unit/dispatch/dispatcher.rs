use super::*;
use crate::composition::dsl::{LayerBuilder, TimelineBuilder};
use crate::composition::model::Timeline;
use crate::effects::transitions::TransitionKind;
use crate::foundation::time::TimeRange;
use crate::layout::plan::layout;
use crate::layout::tracks::TrackId;

fn secs(s: f64) -> MediaTime {
    MediaTime::from_secs(s)
}

fn crossfade_timeline(effect: &str) -> Timeline {
    TimelineBuilder::new()
        .layer(
            LayerBuilder::video("a", TimeRange::from_secs(0.0, 5.0).unwrap())
                .transition(effect, secs(1.0))
                .build()
                .unwrap(),
        )
        .layer(
            LayerBuilder::video("b", TimeRange::from_secs(5.0, 10.0).unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn dispatcher(opts: DispatchOpts) -> Dispatcher {
    let plan = layout(&crossfade_timeline("crossfade")).unwrap();
    Dispatcher::new(plan, TransitionRegistry::with_builtins(), opts).unwrap()
}

#[test]
fn passthrough_frame_lists_single_source() {
    let d = dispatcher(DispatchOpts::default());
    let out = d.resolve(secs(2.0)).unwrap();
    let job = out.as_frame().unwrap();
    assert_eq!(job.sources.len(), 1);
    assert_eq!(job.sources[0].local_time, secs(2.0));
    assert_eq!(job.sources[0].track, Some(TrackId(3)));
    assert!(job.blend.is_none());
}

#[test]
fn transition_frame_carries_blend_job() {
    let d = dispatcher(DispatchOpts::default());
    let out = d.resolve(secs(4.5)).unwrap();
    let job = out.as_frame().unwrap();
    let blend = job.blend.as_ref().unwrap();
    assert_eq!(blend.kind, Some(TransitionKind::Crossfade));
    assert!((blend.progress - 0.5).abs() < 1e-9);
    assert_eq!(blend.foreground, TrackId(1));
    assert_eq!(blend.background, TrackId(2));

    // b was placed at 4s; bottom-most source first.
    assert_eq!(job.sources.len(), 2);
    assert_eq!(job.sources[0].local_time, secs(0.5));
    assert_eq!(job.sources[1].local_time, secs(4.5));
}

#[test]
fn outside_timeline_is_empty() {
    let d = dispatcher(DispatchOpts::default());
    assert_eq!(
        d.resolve(secs(9.0)).unwrap(),
        RequestOutcome::Empty { time: secs(9.0) }
    );
    assert_eq!(
        d.resolve(secs(-1.0)).unwrap(),
        RequestOutcome::Empty { time: secs(-1.0) }
    );
}

#[test]
fn cancel_and_resume() {
    let d = dispatcher(DispatchOpts::default());
    let handle = d.cancel_handle();
    d.cancel_all();
    assert!(handle.is_cancelled());
    assert!(d.resolve(secs(1.0)).unwrap().is_cancelled());
    let batch = d.dispatch(&[secs(1.0), secs(2.0)]).unwrap();
    assert!(batch.iter().all(RequestOutcome::is_cancelled));

    d.resume();
    assert!(!handle.is_cancelled());
    assert!(d.resolve(secs(1.0)).unwrap().as_frame().is_some());
}

#[test]
fn swap_plan_bumps_generation() {
    let d = dispatcher(DispatchOpts::default());
    assert_eq!(d.context().generation, 0);

    let single = TimelineBuilder::new()
        .layer(
            LayerBuilder::video("only", TimeRange::from_secs(0.0, 2.0).unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let generation = d.swap_plan(layout(&single).unwrap());
    assert_eq!(generation, 1);

    let job = d.resolve(secs(1.0)).unwrap();
    assert_eq!(job.as_frame().unwrap().generation, 1);
    assert_eq!(
        d.resolve(secs(3.0)).unwrap(),
        RequestOutcome::Empty { time: secs(3.0) }
    );
}

#[test]
fn parallel_dispatch_preserves_order() {
    let times: Vec<MediaTime> = (0..20).map(|i| secs(i as f64 * 0.5)).collect();
    let sequential = dispatcher(DispatchOpts::default()).dispatch(&times).unwrap();
    let parallel = dispatcher(DispatchOpts {
        parallel: true,
        threads: Some(2),
        chunk_size: 3,
    })
    .dispatch(&times)
    .unwrap();
    assert_eq!(sequential, parallel);
    for (t, out) in times.iter().zip(&parallel) {
        assert_eq!(out.time(), *t);
    }
}

#[test]
fn zero_threads_is_rejected() {
    let plan = layout(&crossfade_timeline("crossfade")).unwrap();
    let err = Dispatcher::new(
        plan,
        TransitionRegistry::with_builtins(),
        DispatchOpts {
            parallel: true,
            threads: Some(0),
            chunk_size: 8,
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("threads"));
}

#[test]
fn unknown_effect_fails_only_inside_transition() {
    let plan = layout(&crossfade_timeline("spin")).unwrap();
    let d = Dispatcher::new(plan, TransitionRegistry::with_builtins(), DispatchOpts::default())
        .unwrap();
    assert!(d.resolve(secs(1.0)).is_ok());
    assert!(d.resolve(secs(4.5)).is_err());
}

use std::sync::atomic::{AtomicUsize, Ordering};

use common::interfaces::TrajectoryInterface;
use coordinator::{
    playback, render, sample, Frame, FrameSink, PlaybackConfig, PlaybackError, VecSink,
};
use float_cmp::approx_eq;
use normal_modes::{ModalDecomposer, ModalDecomposition, SpringChain, TrajectoryEvaluator};

/// A trajectory that moves every degree of freedom with constant unit velocity and counts how
/// often it is queried.
struct TrivialTrajectory {
    degrees_of_freedom: usize,
    queries: AtomicUsize,
}

impl TrajectoryInterface<f64> for TrivialTrajectory {
    fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    fn position_at(&self, time: f64) -> Vec<f64> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        vec![time; self.degrees_of_freedom]
    }
}

/// Reports one position too few.
struct ShortTrajectory;

impl TrajectoryInterface<f64> for ShortTrajectory {
    fn degrees_of_freedom(&self) -> usize {
        2
    }

    fn position_at(&self, time: f64) -> Vec<f64> {
        vec![time]
    }
}

/// Fails after a fixed number of frames, standing in for a closed window.
struct ClosingSink {
    remaining: usize,
}

impl FrameSink<f64> for ClosingSink {
    fn record(&mut self, _frame: &Frame<f64>) -> Result<(), PlaybackError> {
        if self.remaining == 0 {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }
        self.remaining -= 1;
        Ok(())
    }
}

fn reference_decomposition() -> ModalDecomposition {
    let chain = SpringChain::build()
        .masses([0.5, 1.5])
        .springs([1.0, 2.0, 3.0])
        .finalize()
        .unwrap();

    ModalDecomposer::new().decompose_system(&chain).unwrap()
}

#[test]
fn playback_owns_the_clock() {
    let trajectory = TrivialTrajectory {
        degrees_of_freedom: 3,
        queries: AtomicUsize::new(0),
    };
    let config = PlaybackConfig::build().dt(0.5).frames(4).finalize();
    let mut sink = VecSink::default();

    let frames = playback(&trajectory, &config, &mut sink).unwrap();

    assert_eq!(frames, 4);
    assert_eq!(trajectory.queries.load(Ordering::Relaxed), 4);
    assert_eq!(sink.degrees_of_freedom, Some(3));
    assert!(sink.finished);

    let times: Vec<_> = sink.frames.iter().map(|frame| frame.time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5]);
    assert_eq!(sink.frames[2].positions, vec![1.0; 3]);
    assert_eq!(sink.frames[3].index, 3);
}

#[test]
fn playback_of_reference_system_starts_at_initial_displacement() {
    let decomposition = reference_decomposition();
    let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();
    let config = PlaybackConfig::<f64>::build().frames(10).finalize();
    let mut sink = VecSink::default();

    playback(&trajectory, &config, &mut sink).unwrap();

    let first = &sink.frames[0].positions;
    assert!(approx_eq!(f64, first[0], 0.1, epsilon = 1e-12), "{first:?}");
    assert!(approx_eq!(f64, first[1], 0.2, epsilon = 1e-12), "{first:?}");
    for frame in &sink.frames {
        assert_eq!(frame.positions, trajectory.position_at(frame.time));
    }
}

#[test]
fn render_matches_playback() {
    let decomposition = reference_decomposition();
    let trajectory =
        TrajectoryEvaluator::with_velocity(&decomposition, &[0.1, 0.2], &[0.0, -0.4]).unwrap();
    let config = PlaybackConfig::build().dt(0.1).start(-2.0).frames(64).finalize();

    let mut played = VecSink::default();
    let mut rendered = VecSink::default();
    assert_eq!(playback(&trajectory, &config, &mut played).unwrap(), 64);
    assert_eq!(render(&trajectory, &config, &mut rendered).unwrap(), 64);

    assert_eq!(played.frames, rendered.frames);
}

#[test]
fn sample_is_independent_of_query_order() {
    let decomposition = reference_decomposition();
    let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();
    let times = [5.0, -1.0, 0.0, 5.0, 2.25, 100.0];

    let sampled = sample(&trajectory, &times);

    assert_eq!(sampled.len(), times.len());
    assert_eq!(sampled[0], sampled[3]);
    for (time, positions) in times.iter().zip(&sampled) {
        assert_eq!(positions, &trajectory.position_at(*time));
    }
}

#[test]
fn render_requires_bounded_playback() {
    let trajectory = TrivialTrajectory {
        degrees_of_freedom: 1,
        queries: AtomicUsize::new(0),
    };
    let config = PlaybackConfig::<f64>::build().unbounded().finalize();

    let result = render(&trajectory, &config, &mut VecSink::<f64>::default());

    assert!(matches!(result, Err(PlaybackError::Unbounded)));
    assert_eq!(trajectory.queries.load(Ordering::Relaxed), 0);
}

#[test]
fn unbounded_playback_stops_when_sink_fails() {
    let trajectory = TrivialTrajectory {
        degrees_of_freedom: 2,
        queries: AtomicUsize::new(0),
    };
    let config = PlaybackConfig::<f64>::build().unbounded().finalize();

    let result = playback(&trajectory, &config, &mut ClosingSink { remaining: 7 });

    assert!(matches!(result, Err(PlaybackError::Io(_))));
    assert_eq!(trajectory.queries.load(Ordering::Relaxed), 8);
}

#[test]
fn playback_rejects_wrongly_sized_positions() {
    let config = PlaybackConfig::<f64>::build().frames(3).finalize();

    let result = playback(&ShortTrajectory, &config, &mut VecSink::default());

    assert!(matches!(
        result,
        Err(PlaybackError::DimensionMismatch {
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn playback_stops_before_time_overflows() {
    let trajectory = TrivialTrajectory {
        degrees_of_freedom: 2,
        queries: AtomicUsize::new(0),
    };
    let config = PlaybackConfig::build().dt(1e308).frames(3).finalize();
    let mut sink = VecSink::default();

    let result = playback(&trajectory, &config, &mut sink);

    assert!(matches!(result, Err(PlaybackError::TimeOverflow(2))));
    assert_eq!(sink.frames.len(), 2);
    assert!(sink.frames.iter().all(|frame| frame.time.is_finite()));
    assert_eq!(trajectory.queries.load(Ordering::Relaxed), 2);
    assert!(!sink.finished);
}

use std::time::Duration;

use common::{interfaces::TrajectoryInterface, Float};
use rayon::prelude::*;

pub mod sink;

pub use sink::{CsvSink, Frame, FrameSink, TableSink, VecSink};

/// Seconds between frames unless configured otherwise.
pub const DEFAULT_DT: f64 = 0.3;
pub const DEFAULT_FRAMES: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("failed to write frame")]
    Io(#[from] std::io::Error),
    #[error("start time and time step must be finite")]
    NonFiniteTime,
    #[error("frame {0} has no representable time")]
    TimeOverflow(usize),
    #[error("cannot render an unbounded playback")]
    Unbounded,
    #[error("frame has {found} positions, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaybackConfig<T: Float> {
    dt: T,
    start: T,
    frames: Option<usize>,
    frame_delay: Duration,
}

impl<T: Float> PlaybackConfig<T> {
    pub fn build() -> PlaybackConfigBuilder<T> {
        PlaybackConfigBuilder {
            dt: None,
            start: None,
            frames: Some(DEFAULT_FRAMES),
            frame_delay: None,
        }
    }

    pub fn dt(&self) -> T {
        self.dt
    }

    pub fn start(&self) -> T {
        self.start
    }

    /// `None` plays until the sink fails.
    pub fn frames(&self) -> Option<usize> {
        self.frames
    }

    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// The time of frame `index`, `start + index * dt`. Fails once that is no longer finite.
    pub fn frame_time(&self, index: usize) -> Result<T, PlaybackError> {
        if !self.dt.is_finite() || !self.start.is_finite() {
            return Err(PlaybackError::NonFiniteTime);
        }
        let steps: T = num::cast(index).ok_or(PlaybackError::TimeOverflow(index))?;
        let time = self.start + self.dt * steps;
        if !time.is_finite() {
            return Err(PlaybackError::TimeOverflow(index));
        }

        Ok(time)
    }

    /// Every frame time of a bounded playback.
    pub fn frame_times(&self) -> Result<Vec<T>, PlaybackError> {
        let frames = self.frames.ok_or(PlaybackError::Unbounded)?;

        (0..frames).map(|index| self.frame_time(index)).collect()
    }
}

pub struct PlaybackConfigBuilder<T: Float> {
    dt: Option<T>,
    start: Option<T>,
    frames: Option<usize>,
    frame_delay: Option<Duration>,
}

impl<T: Float> PlaybackConfigBuilder<T> {
    pub fn dt(mut self, dt: T) -> Self {
        self.dt.replace(dt);

        self
    }

    pub fn start(mut self, start: T) -> Self {
        self.start.replace(start);

        self
    }

    pub fn frames(mut self, frames: usize) -> Self {
        self.frames.replace(frames);

        self
    }

    pub fn unbounded(mut self) -> Self {
        self.frames.take();

        self
    }

    pub fn frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay.replace(frame_delay);

        self
    }

    pub fn finalize(self) -> PlaybackConfig<T> {
        PlaybackConfig {
            dt: self
                .dt
                .unwrap_or_else(|| num::cast(DEFAULT_DT).unwrap_or_else(T::one)),
            start: self.start.unwrap_or_else(T::zero),
            frames: self.frames,
            frame_delay: self.frame_delay.unwrap_or_default(),
        }
    }
}

/// Steps through time, asking `trajectory` for the positions at each frame and handing them to
/// `sink`, pausing `frame_delay` between frames. Returns the number of frames recorded.
pub fn playback<T, Tr, S>(
    trajectory: &Tr,
    config: &PlaybackConfig<T>,
    sink: &mut S,
) -> Result<usize, PlaybackError>
where
    T: Float,
    Tr: TrajectoryInterface<T> + ?Sized,
    S: FrameSink<T> + ?Sized,
{
    let degrees_of_freedom = trajectory.degrees_of_freedom();
    sink.begin(degrees_of_freedom)?;

    let mut index = 0;
    while config.frames.map_or(true, |frames| index < frames) {
        let time = config.frame_time(index)?;
        let frame = Frame {
            index,
            time,
            positions: trajectory.position_at(time),
        };
        check_frame(&frame, degrees_of_freedom)?;

        log::trace!("frame {index} at t = {time}: {:?}", frame.positions);
        sink.record(&frame)?;
        index += 1;

        if !config.frame_delay.is_zero() {
            std::thread::sleep(config.frame_delay);
        }
    }

    sink.finish()?;
    log::debug!("played back {index} frames");

    Ok(index)
}

/// Evaluates `trajectory` at every frame of a bounded playback in parallel, then hands the frames
/// to `sink` in order. Ignores `frame_delay`.
pub fn render<T, Tr, S>(
    trajectory: &Tr,
    config: &PlaybackConfig<T>,
    sink: &mut S,
) -> Result<usize, PlaybackError>
where
    T: Float,
    Tr: TrajectoryInterface<T> + Sync + ?Sized,
    S: FrameSink<T> + ?Sized,
{
    let times = config.frame_times()?;
    let count = times.len();
    let positions = sample(trajectory, &times);
    let degrees_of_freedom = trajectory.degrees_of_freedom();

    sink.begin(degrees_of_freedom)?;
    for (index, (time, positions)) in times.into_iter().zip(positions).enumerate() {
        let frame = Frame {
            index,
            time,
            positions,
        };
        check_frame(&frame, degrees_of_freedom)?;
        sink.record(&frame)?;
    }
    sink.finish()?;

    Ok(count)
}

/// Evaluates `trajectory` at each of `times` in parallel.
pub fn sample<T, Tr>(trajectory: &Tr, times: &[T]) -> Vec<Vec<T>>
where
    T: Float,
    Tr: TrajectoryInterface<T> + Sync + ?Sized,
{
    times
        .par_iter()
        .map(|&time| trajectory.position_at(time))
        .collect()
}

fn check_frame<T: Float>(frame: &Frame<T>, expected: usize) -> Result<(), PlaybackError> {
    if frame.positions.len() == expected {
        Ok(())
    } else {
        Err(PlaybackError::DimensionMismatch {
            expected,
            found: frame.positions.len(),
        })
    }
}

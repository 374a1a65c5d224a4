use std::io::Write;

use colored::{Color, Colorize};
use common::Float;

use crate::PlaybackError;

/// Colours of the masses in the table, cycled.
const MASS_COLORS: [Color; 6] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

/// The positions of every mass at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    pub index: usize,
    pub time: T,
    pub positions: Vec<T>,
}

/// A consumer of frames, e.g. a renderer.
pub trait FrameSink<T: Float> {
    /// Called once before the first frame.
    fn begin(&mut self, _degrees_of_freedom: usize) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn record(&mut self, frame: &Frame<T>) -> Result<(), PlaybackError>;

    /// Called once after the last frame of a bounded playback.
    fn finish(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// Keeps every frame in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink<T> {
    pub degrees_of_freedom: Option<usize>,
    pub frames: Vec<Frame<T>>,
    pub finished: bool,
}

impl<T: Float> FrameSink<T> for VecSink<T> {
    fn begin(&mut self, degrees_of_freedom: usize) -> Result<(), PlaybackError> {
        self.degrees_of_freedom.replace(degrees_of_freedom);
        Ok(())
    }

    fn record(&mut self, frame: &Frame<T>) -> Result<(), PlaybackError> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PlaybackError> {
        self.finished = true;
        Ok(())
    }
}

/// Writes `time,x0,x1,...` rows.
pub struct CsvSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T: Float, W: Write> FrameSink<T> for CsvSink<W> {
    fn begin(&mut self, degrees_of_freedom: usize) -> Result<(), PlaybackError> {
        write!(self.writer, "time")?;
        for mass in 0..degrees_of_freedom {
            write!(self.writer, ",x{mass}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn record(&mut self, frame: &Frame<T>) -> Result<(), PlaybackError> {
        write!(self.writer, "{:?}", frame.time)?;
        for position in &frame.positions {
            write!(self.writer, ",{position:?}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PlaybackError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes an aligned, coloured table for a terminal.
pub struct TableSink<W: Write> {
    writer: W,
}

impl<W: Write> TableSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<T: Float, W: Write> FrameSink<T> for TableSink<W> {
    fn begin(&mut self, degrees_of_freedom: usize) -> Result<(), PlaybackError> {
        write!(self.writer, "{}", format!("{:>10}", "t").bold())?;
        for mass in 0..degrees_of_freedom {
            let header = format!("{:>12}", format!("x{mass}"));
            write!(self.writer, "{}", header.bold().color(mass_color(mass)))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn record(&mut self, frame: &Frame<T>) -> Result<(), PlaybackError> {
        write!(self.writer, "{:>10.3}", frame.time)?;
        for (mass, position) in frame.positions.iter().enumerate() {
            let cell = format!("{position:>12.6}");
            write!(self.writer, "{}", cell.color(mass_color(mass)))?;
        }
        writeln!(self.writer)?;
        // Playback may be unbounded, so every row is flushed as it is written.
        self.writer.flush()?;
        Ok(())
    }
}

fn mass_color(mass: usize) -> Color {
    MASS_COLORS[mass % MASS_COLORS.len()]
}

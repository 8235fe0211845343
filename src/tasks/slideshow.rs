//! Slideshow scheduler: renders one placement per cycle, optionally redraws
//! the stats overlay, and waits in short ticks so an escape press is noticed
//! quickly.

use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::overlay::{OverlayMask, OverlaySet, build_mask};
use crate::platform::framebuffer::ScreenGeometry;
use crate::processing::layout::ImagePlacement;
use crate::render::writer::{ChannelOrder, clear, composite};
use crate::stats::{StatsSource, StatsTracker};

/// Granularity of the wait between frames.
pub const TICK: Duration = Duration::from_millis(100);

/// Something that can ask the slideshow to stop. Polled once per tick and
/// must not block.
pub trait CancelSource {
    fn cancel_requested(&mut self) -> Result<bool>;
}

/// Cancellation source for runs that never wait.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancelSource for NeverCancel {
    fn cancel_requested(&mut self) -> Result<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone)]
pub struct SlideshowOptions {
    /// Zero the frame before each composite.
    pub clear: bool,
    /// Time between frames; zero renders the first image once and stops.
    pub redraw_interval: Duration,
    pub channel_order: ChannelOrder,
    /// How long one wait tick actually sleeps.
    pub tick: Duration,
}

impl Default for SlideshowOptions {
    fn default() -> Self {
        Self {
            clear: true,
            redraw_interval: Duration::ZERO,
            channel_order: ChannelOrder::default(),
            tick: TICK,
        }
    }
}

impl SlideshowOptions {
    /// Number of ticks in one redraw interval (rounded up).
    #[must_use]
    pub fn wait_ticks(&self) -> u128 {
        self.redraw_interval.as_millis().div_ceil(TICK.as_millis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Rendering(usize),
    Waiting { next: usize },
    Terminated,
}

/// What happened during [`Slideshow::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_rendered: usize,
    pub last_index: usize,
    pub cancelled: bool,
}

struct Overlays {
    set: OverlaySet,
    source: Box<dyn StatsSource>,
    tracker: StatsTracker,
}

impl Overlays {
    fn rebuild(&mut self, screen: ScreenGeometry) -> Result<OverlayMask> {
        let snapshot = self.tracker.refresh(self.source.as_mut())?;
        let descriptors = self.set.descriptors(&snapshot);
        build_mask(&descriptors, screen)
    }
}

pub struct Slideshow<'a> {
    placements: &'a [ImagePlacement],
    screen: ScreenGeometry,
    options: SlideshowOptions,
    overlays: Option<Overlays>,
    cancel: Box<dyn CancelSource + 'a>,
}

impl<'a> Slideshow<'a> {
    /// # Errors
    /// [`Error::InvalidConfig`] when there is nothing to show.
    pub fn new(
        placements: &'a [ImagePlacement],
        screen: ScreenGeometry,
        options: SlideshowOptions,
        cancel: Box<dyn CancelSource + 'a>,
    ) -> Result<Self> {
        if placements.is_empty() {
            return Err(Error::InvalidConfig("no images to show".into()));
        }
        Ok(Self {
            placements,
            screen,
            options,
            overlays: None,
            cancel,
        })
    }

    /// Re-render `set` from fresh `source` figures on every frame.
    #[must_use]
    pub fn with_overlays(mut self, set: OverlaySet, source: Box<dyn StatsSource>) -> Self {
        self.overlays = Some(Overlays {
            set,
            source,
            tracker: StatsTracker::new(),
        });
        self
    }

    /// Drive the render/wait cycle until it terminates.
    ///
    /// # Errors
    /// Any stats, composite or cancellation failure aborts the run.
    pub fn run(&mut self, dst: &mut [u8]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut state = State::Rendering(0);
        loop {
            state = match state {
                State::Rendering(index) => {
                    self.render(index, dst)?;
                    summary.frames_rendered += 1;
                    summary.last_index = index;
                    self.after_render(index)
                }
                State::Waiting { next } => {
                    if self.wait()? {
                        info!("escape pressed, stopping slideshow");
                        summary.cancelled = true;
                        State::Terminated
                    } else {
                        State::Rendering(next)
                    }
                }
                State::Terminated => break,
            };
        }
        Ok(summary)
    }

    fn after_render(&self, index: usize) -> State {
        if self.options.redraw_interval.is_zero() {
            return State::Terminated;
        }
        State::Waiting {
            next: (index + 1) % self.placements.len(),
        }
    }

    fn render(&mut self, index: usize, dst: &mut [u8]) -> Result<()> {
        debug!(index, "rendering image");
        if self.options.clear {
            clear(dst);
        }
        let mask = match self.overlays.as_mut() {
            Some(overlays) => Some(overlays.rebuild(self.screen)?),
            None => None,
        };
        composite(
            &self.placements[index],
            mask.as_ref(),
            dst,
            self.screen,
            self.options.channel_order,
        )
    }

    /// Returns `true` when cancelled before the interval elapsed.
    fn wait(&mut self) -> Result<bool> {
        for _ in 0..self.options.wait_ticks() {
            if self.cancel.cancel_requested()? {
                return Ok(true);
            }
            thread::sleep(self.options.tick);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_follow_interval() {
        let mut opts = SlideshowOptions::default();
        assert_eq!(opts.wait_ticks(), 0);
        opts.redraw_interval = Duration::from_secs(3);
        assert_eq!(opts.wait_ticks(), 30);
        opts.redraw_interval = Duration::from_millis(150);
        assert_eq!(opts.wait_ticks(), 2);
    }

    #[test]
    fn never_cancel_never_cancels() {
        assert!(!NeverCancel.cancel_requested().unwrap());
    }
}

use glam::IVec3;
use tokio::sync::watch;
use voxcsg_world::{RenderFrame, Renderer};

/// Render hook that hands frames to the foreground loop. Only the newest
/// frame is kept; a lagging viewer skips the ones it missed.
pub struct FrameForwarder {
    tx: watch::Sender<RenderFrame>,
}

impl FrameForwarder {
    pub fn channel() -> (Self, watch::Receiver<RenderFrame>) {
        let (tx, rx) = watch::channel(RenderFrame::default());
        (Self { tx }, rx)
    }
}

impl Renderer for FrameForwarder {
    fn render(&self, frame: &RenderFrame) {
        // Stored even when the viewer is gone.
        self.tx.send_replace(frame.clone());
    }
}

/// One-line summary: voxel count and bounding box.
pub fn describe_frame(frame: &RenderFrame) -> String {
    let Some(first) = frame.coords.first() else {
        return "empty frame".to_string();
    };
    let (min, max) = frame
        .coords
        .iter()
        .fold((*first, *first), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    format!("{} voxels, bounds {} .. {}", frame.len(), fmt(min), fmt(max))
}

fn fmt(c: IVec3) -> String {
    format!("({}, {}, {})", c.x, c.y, c.z)
}

/// Foreground loop: log the newest frame whenever it changes, until the
/// forwarder is dropped. Returns the number of frames seen.
pub async fn run_viewer(mut rx: watch::Receiver<RenderFrame>) -> usize {
    let mut frames = 0;
    while rx.changed().await.is_ok() {
        frames += 1;
        let summary = describe_frame(&rx.borrow_and_update());
        log::info!("Frame {}: {}", frames, summary);
    }
    log::info!("Viewer stopped after {} frames", frames);
    frames
}

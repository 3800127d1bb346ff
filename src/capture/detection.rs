//! The detection latch.
//!
//! One transition function per sampling tick. The latch flips to `Latched`
//! synchronously inside [`DetectionMachine::on_sample`], before the caller
//! starts any capture work, so a face seen on later ticks can never produce a
//! second detection for the same activation.

/// Lifecycle of one detection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    // ---
    /// Created, never activated.
    Idle,
    /// Waiting for a face.
    Armed,
    /// A face was reported; capture work is in flight.
    Latched,
    /// Finished or cancelled.
    Stopped,
}

/// A face found by the model in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFace {
    // ---
    pub descriptor: Vec<f32>,
    pub confidence: f32,
}

/// Outcome of sampling the video source once.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    // ---
    Faces(Vec<DetectedFace>),
    NoFace,
    /// Model error or missing frame. Treated like `NoFace`.
    Failed(String),
}

/// What the loop must do after a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickAction {
    // ---
    Ignore,
    ReportNoFace,
    /// First face of this activation: capture a still and report it.
    Capture(Vec<f32>),
}

#[derive(Debug)]
pub struct DetectionMachine {
    // ---
    state: DetectionState,
}

impl Default for DetectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionMachine {
    // ---
    pub fn new() -> Self {
        Self {
            state: DetectionState::Idle,
        }
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    /// Arms the latch. Only an idle or stopped machine can be activated.
    pub fn activate(&mut self) -> bool {
        // ---
        match self.state {
            DetectionState::Idle | DetectionState::Stopped => {
                self.state = DetectionState::Armed;
                true
            }
            DetectionState::Armed | DetectionState::Latched => false,
        }
    }

    pub fn on_sample(&mut self, sample: Sample) -> TickAction {
        // ---
        let active = matches!(self.state, DetectionState::Armed | DetectionState::Latched);
        if !active {
            return TickAction::Ignore;
        }

        let faces = match sample {
            Sample::Faces(faces) if !faces.is_empty() => faces,
            Sample::Faces(_) | Sample::NoFace => return TickAction::ReportNoFace,
            Sample::Failed(reason) => {
                tracing::debug!("Sampling failed, reporting no face: {reason}");
                return TickAction::ReportNoFace;
            }
        };

        if self.state == DetectionState::Latched {
            return TickAction::Ignore;
        }

        // Only the first face counts; an empty descriptor keeps the latch armed.
        match faces.into_iter().next() {
            Some(face) if !face.descriptor.is_empty() => {
                self.state = DetectionState::Latched;
                TickAction::Capture(face.descriptor)
            }
            _ => TickAction::Ignore,
        }
    }

    /// Capture work finished. Ends a latched session.
    pub fn complete(&mut self) {
        // ---
        if self.state == DetectionState::Latched {
            self.state = DetectionState::Stopped;
        }
    }

    /// Cancels from any state. Idempotent.
    pub fn stop(&mut self) {
        self.state = DetectionState::Stopped;
    }
}

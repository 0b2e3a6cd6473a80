//! Frame-stepped parameter animation.
//!
//! A [`ParameterAnimator`] replaces the ad hoc "beat reactive" and "smooth
//! transition" counters an effect would otherwise carry: a beat calls
//! [`ParameterAnimator::trigger`] and the effect reads [`ParameterAnimator::tick`]
//! once per frame.

use std::fmt;

/// Scalar values that can be interpolated.
pub trait Animatable: Copy + PartialEq + fmt::Debug {
    /// Interpolates from `from` to `to`; `t` is in `[0, 1]` for well-behaved
    /// easing curves.
    fn lerp(from: Self, to: Self, t: f32) -> Self;

    /// Whether `current` is close enough to `target` that a decay step which
    /// no longer moves may snap onto the target.
    fn settled(current: Self, target: Self) -> bool;
}

impl Animatable for f32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        let value = from + (to - from) * t;
        if (0.0..=1.0).contains(&t) {
            // Keep rounding from stepping past either end.
            if from <= to {
                value.clamp(from, to)
            } else {
                value.clamp(to, from)
            }
        } else {
            value
        }
    }

    fn settled(current: Self, target: Self) -> bool {
        (current - target).abs() <= 1e-4 * target.abs().max(1.0)
    }
}

impl Animatable for f64 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        let t = f64::from(t);
        let value = from + (to - from) * t;
        if (0.0..=1.0).contains(&t) {
            if from <= to {
                value.clamp(from, to)
            } else {
                value.clamp(to, from)
            }
        } else {
            value
        }
    }

    fn settled(current: Self, target: Self) -> bool {
        (current - target).abs() <= 1e-9 * target.abs().max(1.0)
    }
}

impl Animatable for i32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        let (from, to) = (f64::from(from), f64::from(to));
        let value = from + (to - from) * f64::from(t);
        value.round() as i32
    }

    /// Rounding stalls a decay within reach of the target, so any stall
    /// counts as settled.
    fn settled(_current: Self, _target: Self) -> bool {
        true
    }
}

/// Progress curve applied to the normalised transition time.
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Hermite S-curve, `3t² - 2t³`.
    SmoothStep,
    /// Quadratic ease-in.
    EaseIn,
    /// Quadratic ease-out.
    EaseOut,
    /// Caller-supplied curve. Non-finite results fall back to linear.
    Custom(fn(f32) -> f32),
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let eased = match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::Custom(curve) => curve(t),
        };
        if eased.is_finite() {
            eased
        } else {
            t
        }
    }
}

/// How the animator moves towards its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationMode {
    /// Eased interpolation over a fixed number of frames.
    Transition,
    /// `current += (target - current) * rate` every frame.
    Decay { rate: f32 },
}

/// Externally visible phase of an animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimPhase {
    /// Resting at the baseline.
    Idle,
    /// Moving towards a triggered target.
    Transitioning,
    /// Sitting on the target for the configured hold window.
    Holding,
    /// Moving back to the baseline.
    Returning,
}

#[derive(Debug, Clone, Copy)]
enum Motion<T> {
    Idle,
    Transitioning { from: T, to: T, elapsed: u32, total: u32 },
    Holding { remaining: u32 },
    Returning { from: T, elapsed: u32, total: u32 },
}

/// Per-frame state machine for one animated effect parameter.
#[derive(Debug, Clone)]
pub struct ParameterAnimator<T: Animatable> {
    baseline: T,
    target: T,
    current: T,
    motion: Motion<T>,
    mode: AnimationMode,
    easing: Easing,
    hold_frames: u32,
    return_frames: Option<u32>,
}

impl<T: Animatable> ParameterAnimator<T> {
    /// Idle animator resting at `baseline`. Without a configured return the
    /// reached target becomes the new baseline.
    pub fn new(baseline: T) -> Self {
        Self {
            baseline,
            target: baseline,
            current: baseline,
            motion: Motion::Idle,
            mode: AnimationMode::Transition,
            easing: Easing::Linear,
            hold_frames: 0,
            return_frames: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Frames to stay on a reached target before returning.
    pub fn with_hold(mut self, frames: u32) -> Self {
        self.hold_frames = frames;
        self
    }

    /// Glide back to the baseline over `frames` after the hold window.
    pub fn returning_after(mut self, frames: u32) -> Self {
        self.return_frames = Some(frames);
        self
    }

    /// Switches to exponential approach; `rate` is clamped into `[0, 1]`.
    pub fn decaying(mut self, rate: f32) -> Self {
        let rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
        self.mode = AnimationMode::Decay { rate };
        self
    }

    pub fn value(&self) -> T {
        self.current
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn baseline(&self) -> T {
        self.baseline
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn phase(&self) -> AnimPhase {
        match self.mode {
            AnimationMode::Transition => match self.motion {
                Motion::Idle => AnimPhase::Idle,
                Motion::Transitioning { .. } => AnimPhase::Transitioning,
                Motion::Holding { .. } => AnimPhase::Holding,
                Motion::Returning { .. } => AnimPhase::Returning,
            },
            AnimationMode::Decay { .. } => {
                if self.current == self.target {
                    if self.current == self.baseline {
                        AnimPhase::Idle
                    } else {
                        AnimPhase::Holding
                    }
                } else if self.target == self.baseline {
                    AnimPhase::Returning
                } else {
                    AnimPhase::Transitioning
                }
            }
        }
    }

    /// Moves the resting value. An idle animator follows immediately.
    pub fn set_baseline(&mut self, baseline: T) {
        let idle = self.phase() == AnimPhase::Idle;
        self.baseline = baseline;
        if idle {
            self.current = baseline;
            self.target = baseline;
        }
    }

    /// Starts a glide to `target` from the current value, restarting any
    /// transition in progress. Zero frames jumps straight to the target. In
    /// decay mode only the target changes.
    pub fn trigger(&mut self, target: T, duration_frames: u32) {
        self.target = target;
        if let AnimationMode::Decay { .. } = self.mode {
            return;
        }

        if duration_frames == 0 {
            self.current = target;
            self.finish_transition();
        } else {
            self.motion = Motion::Transitioning {
                from: self.current,
                to: target,
                elapsed: 0,
                total: duration_frames,
            };
        }
    }

    /// Sets the value instantly and lets it settle back to the baseline.
    pub fn jump(&mut self, value: T) {
        self.current = value;
        match self.mode {
            AnimationMode::Decay { .. } => self.target = self.baseline,
            AnimationMode::Transition => {
                self.target = value;
                self.finish_transition();
            }
        }
    }

    /// Advances one frame and returns the value to use for it.
    pub fn tick(&mut self) -> T {
        match self.mode {
            AnimationMode::Decay { rate } => self.tick_decay(rate),
            AnimationMode::Transition => self.tick_transition(),
        }
        self.current
    }

    /// Drops any motion and rests at the baseline.
    pub fn reset(&mut self) {
        self.current = self.baseline;
        self.target = self.baseline;
        self.motion = Motion::Idle;
    }

    fn tick_decay(&mut self, rate: f32) {
        if rate <= 0.0 {
            return;
        }
        let next = T::lerp(self.current, self.target, rate);
        // A step that no longer moves only snaps when the target is in reach.
        self.current = if next == self.current && T::settled(self.current, self.target) {
            self.target
        } else {
            next
        };
    }

    fn tick_transition(&mut self) {
        match self.motion {
            Motion::Idle => {}
            Motion::Transitioning {
                from,
                to,
                elapsed,
                total,
            } => {
                let elapsed = elapsed + 1;
                if elapsed >= total {
                    self.current = to;
                    self.finish_transition();
                } else {
                    let t = self.easing.apply(elapsed as f32 / total as f32);
                    self.current = T::lerp(from, to, t);
                    self.motion = Motion::Transitioning {
                        from,
                        to,
                        elapsed,
                        total,
                    };
                }
            }
            Motion::Holding { remaining } => {
                if remaining <= 1 {
                    self.begin_return();
                } else {
                    self.motion = Motion::Holding {
                        remaining: remaining - 1,
                    };
                }
            }
            Motion::Returning {
                from,
                elapsed,
                total,
            } => {
                let elapsed = elapsed + 1;
                if elapsed >= total {
                    self.reset();
                } else {
                    let t = self.easing.apply(elapsed as f32 / total as f32);
                    self.current = T::lerp(from, self.baseline, t);
                    self.motion = Motion::Returning {
                        from,
                        elapsed,
                        total,
                    };
                }
            }
        }
    }

    fn finish_transition(&mut self) {
        if self.hold_frames > 0 {
            self.motion = Motion::Holding {
                remaining: self.hold_frames,
            };
        } else {
            self.begin_return();
        }
    }

    fn begin_return(&mut self) {
        match self.return_frames {
            None => {
                self.baseline = self.current;
                self.target = self.current;
                self.motion = Motion::Idle;
            }
            Some(0) => self.reset(),
            Some(total) => {
                self.target = self.baseline;
                self.motion = Motion::Returning {
                    from: self.current,
                    elapsed: 0,
                    total,
                };
            }
        }
    }
}

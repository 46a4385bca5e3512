//! The device as a step/reset/render environment.

use crate::error::Result;
use crate::sampler;
use droidlern_core::{diag, Action, Environment, Info, Observation, Reward, Size, Step};
use droidlern_device::{
    AdbTransport, Controller, Transport, DEFAULT_HOLD_MS, DEFAULT_SWIPE_LENGTH, DEFAULT_SWIPE_MS,
};
use image::RgbImage;
use std::path::PathBuf;
use tempfile::TempDir;

/// A reset procedure, run against the controller on every [`Environment::reset`].
pub type ResetCmd<T> = Box<dyn FnMut(&mut Controller<T>)>;

/// Runs one action against the controller.
///
/// In app-bound mode `Home` and `Back` are suppressed so the agent cannot
/// leave the app under test; they return `None` without touching the device.
pub fn dispatch<T: Transport>(
    controller: &Controller<T>,
    action: &Action,
    app_bound: bool,
) -> Option<String> {
    match *action {
        Action::Home | Action::Back if app_bound => {
            diag::debug("navigation key suppressed in app-bound mode");
            None
        }
        Action::Home => controller.home(),
        Action::Back => controller.back(),
        Action::Tap { pos } => controller.tap(pos),
        Action::Hold { pos } => controller.touch_hold(pos, DEFAULT_HOLD_MS),
        Action::SwipeDirectional { pos, direction } => {
            controller.swipe_point(pos, direction, DEFAULT_SWIPE_LENGTH, DEFAULT_SWIPE_MS)
        }
        Action::SwipePoints { pos, end } => controller.swipe_points(pos, end, DEFAULT_SWIPE_MS),
    }
}

/// An Android device exposed through the [`Environment`] contract.
///
/// Episodes never terminate on their own: `terminated` and `truncated` are
/// always `false`.
pub struct AndroidEnv<T: Transport = AdbTransport> {
    controller: Controller<T>,
    reward_fn: Box<dyn Reward>,
    reset_cmds: Vec<ResetCmd<T>>,
    app: Option<String>,
    scratch: TempDir,
    captures: u64,
}

impl<T: Transport> AndroidEnv<T> {
    /// Creates an environment. With `app` set, every reset relaunches that
    /// package and navigation keys are disabled.
    pub fn new(
        controller: Controller<T>,
        reward_fn: impl Reward + 'static,
        reset_cmds: Vec<ResetCmd<T>>,
        app: Option<String>,
    ) -> Result<Self> {
        let scratch = tempfile::Builder::new().prefix("droidlern-").tempdir()?;
        Ok(Self {
            controller,
            reward_fn: Box::new(reward_fn),
            reset_cmds,
            app,
            scratch,
            captures: 0,
        })
    }

    /// Appends a reset procedure.
    pub fn push_reset(&mut self, cmd: ResetCmd<T>) {
        self.reset_cmds.push(cmd);
    }

    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    pub fn controller(&self) -> &Controller<T> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<T> {
        &mut self.controller
    }

    /// Captures a screenshot and a UI dump and combines them.
    ///
    /// Both channels are best-effort: a failed screenshot gives a black image
    /// of the device size, a failed dump gives all-zero positions.
    pub fn observe(&mut self) -> Observation {
        let shot = self.staging_path("png");
        let image = self.capture_image(&shot);
        let _ = std::fs::remove_file(&shot);

        let dump = self.staging_path("xml");
        let (posx, posy) = match self.controller.get_xml(&dump) {
            Some(_) => sampler::sample_file(&dump),
            None => sampler::empty_positions(),
        };
        let _ = std::fs::remove_file(&dump);

        Observation { image, posx, posy }
    }

    fn capture_image(&self, path: &std::path::Path) -> RgbImage {
        let size = self.controller.size();
        self.controller
            .get_screenshot(path)
            .and_then(|_| match image::open(path) {
                Ok(img) => Some(img.to_rgb8()),
                Err(e) => {
                    diag::warn(&format!("could not decode screenshot: {e}"));
                    None
                }
            })
            .unwrap_or_else(|| RgbImage::new(size.width, size.height))
    }

    /// A local file name that is unique for this process and environment.
    /// The device stages files under the same base name.
    fn staging_path(&mut self, extension: &str) -> PathBuf {
        self.captures += 1;
        self.scratch.path().join(format!(
            "droidlern-{}-{}.{extension}",
            std::process::id(),
            self.captures
        ))
    }

    fn collect_reward(&mut self) -> f32 {
        self.reward_fn.reward(self.controller.get_log())
    }
}

impl<T: Transport> Environment for AndroidEnv<T> {
    type Action = Action;

    fn reset(&mut self) -> (Observation, Info) {
        for cmd in &mut self.reset_cmds {
            cmd(&mut self.controller);
        }
        if let Some(app) = &self.app {
            self.controller.open_app(app);
        }
        (self.observe(), Info::default())
    }

    fn step(&mut self, action: &Action) -> Step {
        dispatch(&self.controller, action, self.app.is_some());
        let observation = self.observe();
        let reward = self.collect_reward();
        Step {
            observation,
            reward,
            terminated: false,
            truncated: false,
            info: Info::default(),
        }
    }

    fn render(&mut self) -> RgbImage {
        self.observe().image
    }

    fn screen_size(&self) -> Size {
        self.controller.size()
    }
}

impl<T: Transport> std::fmt::Debug for AndroidEnv<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidEnv")
            .field("serial", &self.controller.serial())
            .field("app", &self.app)
            .field("reset_cmds", &self.reset_cmds.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlern_core::{Direction, Point};
    use droidlern_device::scripted::ScriptedTransport;

    fn controller() -> (ScriptedTransport, Controller<ScriptedTransport>) {
        let transport = ScriptedTransport::new(Size {
            width: 1000,
            height: 2000,
        });
        let controller = Controller::new(transport.clone(), "emulator-5554").unwrap();
        transport.clear_calls();
        (transport, controller)
    }

    #[test]
    fn dispatch_follows_the_action_table() {
        let (transport, c) = controller();
        let pos = Point::new(10, 20);
        dispatch(&c, &Action::Home, false);
        dispatch(&c, &Action::Back, false);
        dispatch(&c, &Action::Tap { pos }, false);
        dispatch(&c, &Action::Hold { pos }, false);
        dispatch(
            &c,
            &Action::SwipeDirectional {
                pos,
                direction: Direction::Left,
            },
            false,
        );
        dispatch(
            &c,
            &Action::SwipePoints {
                pos,
                end: Point::new(30, 40),
            },
            false,
        );
        assert_eq!(
            transport.calls(),
            vec![
                "shell input keyevent 3",
                "shell input keyevent 4",
                "shell input tap 10 20",
                "shell input swipe 10 20 10 20 1000",
                "shell input swipe 10 20 -390 20 400",
                "shell input swipe 10 20 30 40 400",
            ]
        );
    }

    #[test]
    fn navigation_is_suppressed_when_app_bound() {
        let (transport, c) = controller();
        assert_eq!(dispatch(&c, &Action::Home, true), None);
        assert_eq!(dispatch(&c, &Action::Back, true), None);
        assert!(transport.calls().is_empty());

        dispatch(
            &c,
            &Action::Tap {
                pos: Point::new(1, 1),
            },
            true,
        );
        assert_eq!(transport.calls(), vec!["shell input tap 1 1"]);
    }
}

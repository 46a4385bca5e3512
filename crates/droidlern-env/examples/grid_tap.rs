use droidlern_core::{Action, Cell, Environment, LogLines};
use droidlern_device::{AdbTransport, Controller};
use droidlern_env::{AndroidEnv, DiscreteWrapper};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let serial = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ANDROID_SERIAL").ok())
        .ok_or("usage: grid_tap <serial>")?;

    let controller = Controller::new(AdbTransport::default(), serial)?;
    let env = AndroidEnv::new(
        controller,
        |lines: LogLines| lines.filter(|l| l.contains("ActivityManager")).count() as f32,
        Vec::new(),
        None,
    )?;
    let mut grid = DiscreteWrapper::new(env, 10, 10)?;

    let (obs, _) = grid.reset();
    println!("{} elements on screen", obs.element_count());

    let step = grid.step(&Action::Tap {
        pos: Cell::new(5, 5),
    });
    println!(
        "reward {:.2}, {} elements on screen",
        step.reward,
        step.observation.element_count()
    );
    Ok(())
}

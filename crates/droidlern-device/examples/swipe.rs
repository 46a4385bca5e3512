use droidlern_core::{Direction, Point};
use droidlern_device::{AdbTransport, Controller, DEFAULT_SWIPE_LENGTH, DEFAULT_SWIPE_MS};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let serial = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ANDROID_SERIAL").ok())
        .ok_or("usage: swipe <serial>")?;

    let controller = Controller::new(AdbTransport::default(), serial)?;
    let size = controller.size();
    println!("{}: {}x{}", controller.serial(), size.width, size.height);

    let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);
    controller.swipe_point(center, Direction::Up, DEFAULT_SWIPE_LENGTH, DEFAULT_SWIPE_MS);
    for line in controller.get_log().take(20) {
        println!("{line}");
    }
    Ok(())
}

//! Grid action space over a pixel-coordinate environment.

use crate::error::{EnvError, Result};
use droidlern_core::{Action, Cell, Environment, Info, Observation, Point, Size, Step};
use image::RgbImage;

/// Presents an `rows × cols` grid over the wrapped environment's screen.
///
/// Positions in incoming actions are grid cells; each is replaced by the
/// pixel center of its cell before the action is handed on.
#[derive(Debug)]
pub struct DiscreteWrapper<E> {
    env: E,
    rows: u32,
    cols: u32,
}

impl<E> DiscreteWrapper<E>
where
    E: Environment<Action = Action>,
{
    pub fn new(env: E, rows: u32, cols: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EnvError::ZeroGrid);
        }
        Ok(Self { env, rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }

    /// Pixel center of `cell`, each coordinate floored.
    pub fn conv_pos(&self, cell: Cell) -> Point {
        let Size { width, height } = self.env.screen_size();
        let cy = band_center(cell.row, self.rows, height);
        let cx = band_center(cell.col, self.cols, width);
        Point::new(cx, cy)
    }
}

/// Midpoint of band `index` out of `bands` equal slices of `extent`.
fn band_center(index: u32, bands: u32, extent: u32) -> i32 {
    let (i, n, extent) = (f64::from(index), f64::from(bands), f64::from(extent));
    let start = i / n * extent;
    let end = (i + 1.0) / n * extent;
    ((start + end) / 2.0).floor() as i32
}

impl<E> Environment for DiscreteWrapper<E>
where
    E: Environment<Action = Action>,
{
    type Action = Action<Cell>;

    fn reset(&mut self) -> (Observation, Info) {
        self.env.reset()
    }

    fn step(&mut self, action: &Action<Cell>) -> Step {
        let action = action.clone().map_positions(|cell| self.conv_pos(cell));
        self.env.step(&action)
    }

    fn render(&mut self) -> RgbImage {
        self.env.render()
    }

    fn screen_size(&self) -> Size {
        self.env.screen_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlern_core::OBSERVATION_SLOTS;

    /// Records actions instead of touching a device.
    #[derive(Debug, Default)]
    struct Recorder {
        size: Option<Size>,
        seen: Vec<Action>,
        resets: usize,
    }

    impl Environment for Recorder {
        type Action = Action;

        fn reset(&mut self) -> (Observation, Info) {
            self.resets += 1;
            (blank(), Info::default())
        }

        fn step(&mut self, action: &Action) -> Step {
            self.seen.push(action.clone());
            Step {
                observation: blank(),
                reward: 0.0,
                terminated: false,
                truncated: false,
                info: Info::default(),
            }
        }

        fn render(&mut self) -> RgbImage {
            RgbImage::new(1, 1)
        }

        fn screen_size(&self) -> Size {
            self.size.unwrap_or(Size {
                width: 1000,
                height: 1000,
            })
        }
    }

    fn blank() -> Observation {
        Observation {
            image: RgbImage::new(1, 1),
            posx: vec![0; OBSERVATION_SLOTS],
            posy: vec![0; OBSERVATION_SLOTS],
        }
    }

    #[test]
    fn cell_centers_on_square_screen() {
        let wrapper = DiscreteWrapper::new(Recorder::default(), 10, 10).unwrap();
        assert_eq!(wrapper.conv_pos(Cell::new(0, 0)), Point::new(50, 50));
        assert_eq!(wrapper.conv_pos(Cell::new(9, 9)), Point::new(950, 950));
    }

    #[test]
    fn rows_map_to_height_and_columns_to_width() {
        let recorder = Recorder {
            size: Some(Size {
                width: 1080,
                height: 2340,
            }),
            ..Recorder::default()
        };
        let wrapper = DiscreteWrapper::new(recorder, 3, 4).unwrap();
        // Row 1 of 3 spans 780..1560, column 3 of 4 spans 810..1080.
        assert_eq!(wrapper.conv_pos(Cell::new(1, 3)), Point::new(945, 1170));
        // Cells 0 of 7 rows: 0..334.28 → 167.
        let wrapper = DiscreteWrapper::new(wrapper.into_inner(), 7, 1).unwrap();
        assert_eq!(wrapper.conv_pos(Cell::new(0, 0)), Point::new(540, 167));
    }

    #[test]
    fn step_converts_pos_and_end_without_touching_the_input() {
        let mut wrapper = DiscreteWrapper::new(Recorder::default(), 10, 10).unwrap();
        let action = Action::SwipePoints {
            pos: Cell::new(0, 0),
            end: Cell::new(9, 9),
        };
        let before = action.clone();
        wrapper.step(&action);
        assert_eq!(action, before);
        assert_eq!(
            wrapper.inner().seen,
            vec![Action::SwipePoints {
                pos: Point::new(50, 50),
                end: Point::new(950, 950),
            }]
        );

        wrapper.step(&Action::Home);
        assert_eq!(wrapper.inner().seen.last(), Some(&Action::Home));
    }

    #[test]
    fn reset_and_render_pass_through() {
        let mut wrapper = DiscreteWrapper::new(Recorder::default(), 2, 2).unwrap();
        wrapper.reset();
        assert_eq!(wrapper.inner().resets, 1);
        assert_eq!(wrapper.render().dimensions(), (1, 1));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert!(matches!(
            DiscreteWrapper::new(Recorder::default(), 0, 5),
            Err(EnvError::ZeroGrid)
        ));
    }
}

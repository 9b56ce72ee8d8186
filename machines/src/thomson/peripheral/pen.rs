/// Light pen or mouse, in 640x200 screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pen {
    pub x: i32,
    pub y: i32,
    pub button: bool,
}

impl Pen {
    pub const WIDTH: i32 = 640;
    pub const HEIGHT: i32 = 200;

    pub fn on_screen(&self) -> bool {
        (0..Self::WIDTH).contains(&self.x) && (0..Self::HEIGHT).contains(&self.y)
    }
}

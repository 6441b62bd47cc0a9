/// One addressable channel sample: grid position, channel index, gain.
///
/// Elements only live inside a [`Chain`](crate::chain::Chain)'s element
/// array; they are plain values with no identity of their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Horizontal grid position.
    pub x: i32,
    /// Vertical grid position.
    pub y: i32,
    /// Component index within a source pixel (0 = first channel).
    pub channel: u32,
    /// Brightness scaling forwarded to the hardware layer.
    pub gain: u16,
}

impl Element {
    /// Gain value meaning "off".
    pub const GAIN_OFF: u16 = 0;
    /// Gain value meaning "full brightness".
    pub const GAIN_FULL: u16 = u16::MAX;

    /// Element at `(x, y)` sampling `channel`, at full gain.
    pub fn new(x: i32, y: i32, channel: u32) -> Self {
        Self {
            x,
            y,
            channel,
            gain: Self::GAIN_FULL,
        }
    }
}

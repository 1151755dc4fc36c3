/// Represents a color in RGBA format.
///
/// Each channel is a floating-point value, conventionally in `[0.0, 1.0]`. Values outside that
/// range are kept as received; clamping is left to the GPU.
///
/// # Examples
///
/// ```
/// use oscscene::{Channel, Color};
///
/// // Opaque red
/// let mut red = Color::rgba(1.0, 0.0, 0.0, 1.0);
/// assert_eq!(red.to_array(), [1.0, 0.0, 0.0, 1.0]);
///
/// // Replace a single channel, leaving the rest untouched
/// red.set_channel(Channel::Alpha, 0.5);
/// assert_eq!(red.to_array(), [1.0, 0.0, 0.0, 0.5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color(pub [f32; 4]);

/// One of the four color channels, addressed by single-channel commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    #[inline]
    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }
}

impl Color {
    /// A transparent color.
    ///
    /// All channels are zero. This is also the value of a freshly zero-initialized command.
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);
    /// An opaque black color.
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    /// An opaque white color.
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);

    /// Creates a new color from four channels.
    ///
    /// # Examples
    ///
    /// ```
    /// use oscscene::Color;
    ///
    /// let teal = Color::rgba(0.0, 0.5, 0.5, 1.0);
    /// assert_eq!(teal, Color([0.0, 0.5, 0.5, 1.0]));
    /// ```
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Returns the value of a single channel.
    pub fn channel(&self, channel: Channel) -> f32 {
        self.0[channel.index()]
    }

    /// Replaces exactly one channel.
    pub fn set_channel(&mut self, channel: Channel, value: f32) {
        self.0[channel.index()] = value;
    }

    pub fn red(&self) -> f32 {
        self.0[0]
    }

    pub fn green(&self) -> f32 {
        self.0[1]
    }

    pub fn blue(&self) -> f32 {
        self.0[2]
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }

    /// Returns the color as an array of 4 `f32` values.
    pub fn to_array(&self) -> [f32; 4] {
        self.0
    }

    /// Converts to the clear color type used by render passes.
    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.0[0] as f64,
            g: self.0[1] as f64,
            b: self.0[2] as f64,
            a: self.0[3] as f64,
        }
    }
}

impl From<[f32; 4]> for Color {
    fn from(channels: [f32; 4]) -> Self {
        Self(channels)
    }
}

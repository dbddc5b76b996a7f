pub mod gray;
pub mod io;
pub mod mask;
pub mod u8;

pub use self::gray::{luma_from_rgb, luma_from_rgba, GrayBuffer, Rotation};
pub use self::mask::BinaryMask;
pub use self::u8::ImageU8;

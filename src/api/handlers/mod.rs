pub mod health;
pub use self::health::health;

pub mod verify;
pub use self::verify::verify;

//! Текстовый wire-кодек: буферизованный направленный поток и кодеки
//! значений поверх него.
//!
//! Каждое значение кодируется одним или несколькими ASCII-токенами,
//! завершёнными `\n`. Один и тот же код обхода записи работает для всех
//! трёх направлений через [`WireCodec::transfer`].

pub mod channel;
pub mod codec;
pub mod composite;
pub mod scalar;
pub mod stream;

pub use channel::{Channel, Sink, Source};
pub use codec::WireCodec;
pub use composite::MAX_ARRAY_LEN;
pub use scalar::{from_fixed, to_fixed, FIXED_ONE, MAX_STRING_LEN, STRING_CHUNK};
pub use stream::{Direction, Wire, DEFAULT_CAPACITY, MIN_CAPACITY};

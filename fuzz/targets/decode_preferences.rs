#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scanrc::{
    read_preferences,
    wire::{Direction, Wire, MIN_CAPACITY},
};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    capacity: u16,
}

fuzz_target!(|input: FuzzInput| {
    let capacity = MIN_CAPACITY + usize::from(input.capacity % 1024);
    let mut bytes: &[u8] = &input.data;
    let mut wire = Wire::with_capacity(&mut bytes, Direction::Decode, capacity);

    // Декодер не должен паниковать ни на каких данных.
    if let Ok((mut prefs, _)) = read_preferences(&mut wire) {
        let mut out = Vec::new();
        let mut wire = Wire::new(&mut out, Direction::Encode);
        // Прочитанное обязано записываться обратно, кроме вещественных вне 16.16.
        let _ = scanrc::write_preferences(&mut prefs, &mut wire);
    }
});
